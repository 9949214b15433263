/* This file is part of DarkFi (https://dark.fi)
 *
 * Copyright (C) 2020-2026 Dyne.org foundation
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::fmt;

use ethers::{
    abi::{Abi, Detokenize, Tokenize},
    contract::BaseContract,
    types::{Address, TxHash, U256},
};
use log::debug;

use crate::{provider::ProviderOrSigner, Error, Result};

/// Interface descriptions of the deployed contracts
pub mod abi;

/// CryptoDevs DAO contract handle
pub mod dao;
pub use dao::DaoHandle;

/// CryptoDevs NFT contract handle
pub mod nft;
pub use nft::NftHandle;

/// Deployed address of the CryptoDevs DAO contract on the test network.
pub const CRYPTODEV_DAO_CONTRACT_ADDRESS: &str = "0x2d2B4bD0b5C2c2E6d3a7E1E6c3C5f45D8C2b8B51";

/// Deployed address of the CryptoDevs NFT contract on the test network.
pub const CRYPTODEV_NFT_CONTRACT_ADDRESS: &str = "0x7f8C3f6D0E4A1f4e5e2b7f1F0C8d6a9B3E5C1D27";

/// Chain id the contracts are deployed on (Goerli).
pub const REQUIRED_CHAIN_ID: u64 = 5;

/// Parse a configured contract address. The zero address is refused.
pub fn parse_address(address: &str) -> Result<Address> {
    let parsed: Address = address
        .trim()
        .parse()
        .map_err(|_| Error::ContractConfig(format!("invalid contract address \"{}\"", address)))?;

    if parsed.is_zero() {
        return Err(Error::ContractConfig("contract address is the zero address".to_string()))
    }

    Ok(parsed)
}

/// Contract addresses a client talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContractAddresses {
    pub dao: Address,
    pub nft: Address,
}

impl ContractAddresses {
    pub fn new(dao: &str, nft: &str) -> Result<Self> {
        Ok(Self { dao: parse_address(dao)?, nft: parse_address(nft)? })
    }
}

/// Build a DAO contract handle bound to `client` at the given address.
pub fn dao_contract(address: Address, client: ProviderOrSigner) -> Result<DaoHandle> {
    DaoHandle::new(address, client)
}

/// Build an NFT contract handle bound to `client` at the given address.
pub fn nft_contract(address: Address, client: ProviderOrSigner) -> Result<NftHandle> {
    NftHandle::new(address, client)
}

/// An address, an ABI, and something to talk to the chain through.
/// Shared plumbing for the typed handles.
#[derive(Clone)]
pub(crate) struct BoundContract {
    name: &'static str,
    address: Address,
    base: BaseContract,
    client: ProviderOrSigner,
}

impl BoundContract {
    /// Bind `abi` at `address`, checking that every function in
    /// `required` is present.
    pub(crate) fn new(
        name: &'static str,
        address: Address,
        abi: Abi,
        required: &[&str],
        client: ProviderOrSigner,
    ) -> Result<Self> {
        if address.is_zero() {
            return Err(Error::ContractConfig(format!("{} bound to the zero address", name)))
        }

        for func in required {
            if abi.function(func).is_err() {
                return Err(Error::ContractConfig(format!("{} ABI lacks `{}`", name, func)))
            }
        }

        Ok(Self { name, address, base: abi.into(), client })
    }

    pub(crate) fn address(&self) -> Address {
        self.address
    }

    pub(crate) fn client(&self) -> &ProviderOrSigner {
        &self.client
    }

    /// Run a view function and detokenize its outputs into `D`.
    pub(crate) async fn call<T, D>(&self, func: &str, args: T) -> Result<D>
    where
        T: Tokenize + fmt::Debug + Send,
        D: Detokenize,
    {
        debug!(target: "dao::contract", "{}.{}({:?})", self.name, func, args);
        let data = self.base.encode(func, args)?;
        let output = self.client.reader().call(self.address, data).await?;

        self.base.decode_output(func, output).map_err(|e| {
            Error::ContractCallFailed(format!("{}.{}: malformed output: {}", self.name, func, e))
        })
    }

    /// Submit a state-changing function. Needs a signer.
    pub(crate) async fn send<T>(&self, func: &str, args: T) -> Result<TxHash>
    where
        T: Tokenize + fmt::Debug + Send,
    {
        let Some(signer) = self.client.signer() else { return Err(Error::SignerRequired) };

        debug!(
            target: "dao::contract",
            "{}.{}({:?}) from {:?}", self.name, func, args, signer.address(),
        );
        let data = self.base.encode(func, args)?;
        signer.send_transaction(self.address, data, U256::zero()).await
    }

    /// Wait for a submitted transaction to be mined successfully.
    pub(crate) async fn confirm(&self, tx_hash: TxHash) -> Result<()> {
        self.client.reader().wait_for_receipt(tx_hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_parsing() {
        assert!(ContractAddresses::new(
            CRYPTODEV_DAO_CONTRACT_ADDRESS,
            CRYPTODEV_NFT_CONTRACT_ADDRESS
        )
        .is_ok());
        assert!(parse_address("0x0000000000000000000000000000000000000000").is_err());
        assert!(parse_address("not an address").is_err());
        assert!(parse_address("0x1234").is_err());
    }
}

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

//! Chain access seams. The session hands these out, the contract
//! accessors consume them. The ethers-backed implementations live in
//! [`crate::eth`].

use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::{Address, Bytes, TxHash, U256};

use crate::Result;

/// Read-only access to the chain.
#[async_trait]
pub trait ReadProvider: Send + Sync {
    /// Chain id of the network the provider is attached to.
    async fn chain_id(&self) -> Result<u64>;

    /// Native currency balance of `address`, in wei.
    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Execute a read-only call against the contract at `to`.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    /// Block until the transaction is mined. Fails with
    /// [`crate::Error::TransactionReverted`] if it was mined but reverted.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<()>;
}

/// Transaction signing handle, derived from a connected wallet.
#[async_trait]
pub trait TxSigner: ReadProvider {
    /// Account the signer sends transactions from.
    fn address(&self) -> Address;

    /// The signer viewed as a plain provider.
    fn as_reader(&self) -> &dyn ReadProvider;

    /// Sign and broadcast a transaction. Returns once the node accepted it;
    /// confirmation is awaited separately with
    /// [`ReadProvider::wait_for_receipt`].
    async fn send_transaction(&self, to: Address, data: Bytes, value: U256) -> Result<TxHash>;
}

/// What a contract handle is bound to.
#[derive(Clone)]
pub enum ProviderOrSigner {
    Provider(Arc<dyn ReadProvider>),
    Signer(Arc<dyn TxSigner>),
}

impl ProviderOrSigner {
    /// Read access, available either way.
    pub fn reader(&self) -> &dyn ReadProvider {
        match self {
            Self::Provider(p) => p.as_ref(),
            Self::Signer(s) => s.as_reader(),
        }
    }

    /// Signing access, only when bound to a signer.
    pub fn signer(&self) -> Option<&dyn TxSigner> {
        match self {
            Self::Provider(_) => None,
            Self::Signer(s) => Some(s.as_ref()),
        }
    }
}

impl From<Arc<dyn ReadProvider>> for ProviderOrSigner {
    fn from(provider: Arc<dyn ReadProvider>) -> Self {
        Self::Provider(provider)
    }
}

impl From<Arc<dyn TxSigner>> for ProviderOrSigner {
    fn from(signer: Arc<dyn TxSigner>) -> Self {
        Self::Signer(signer)
    }
}

/// Handles produced by a successful wallet connection.
#[derive(Clone)]
pub struct WalletHandle {
    pub provider: Arc<dyn ReadProvider>,
    pub signer: Arc<dyn TxSigner>,
}

/// A wallet that can be asked for a connection. Each `connect()` call is
/// one prompt to the user.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Ask the wallet for an account. Fails with
    /// [`crate::Error::WalletRejected`] if the user declines.
    async fn connect(&self) -> Result<WalletHandle>;
}

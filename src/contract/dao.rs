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

use ethers::types::{Address, TxHash, U256};

use super::{
    abi::{
        dao_abi, DAO_FN_CREATE_PROPOSAL, DAO_FN_EXECUTE_PROPOSAL, DAO_FN_NUM_PROPOSALS,
        DAO_FN_OWNER, DAO_FN_PROPOSALS, DAO_FN_VOTE_ON_PROPOSAL, DAO_FN_WITHDRAW_ETHER,
        DAO_REQUIRED_FNS,
    },
    BoundContract,
};
use crate::{
    model::{RawProposal, Vote},
    provider::ProviderOrSigner,
    Result,
};

/// Output tuple of the `proposals(id)` getter.
type ProposalOutput = (U256, U256, U256, U256, bool);

/// Typed handle to the CryptoDevs DAO contract.
#[derive(Clone)]
pub struct DaoHandle {
    inner: BoundContract,
}

impl DaoHandle {
    pub fn new(address: Address, client: ProviderOrSigner) -> Result<Self> {
        let inner = BoundContract::new("DAO", address, dao_abi()?, &DAO_REQUIRED_FNS, client)?;
        Ok(Self { inner })
    }

    pub fn address(&self) -> Address {
        self.inner.address()
    }

    pub async fn owner(&self) -> Result<Address> {
        self.inner.call(DAO_FN_OWNER, ()).await
    }

    pub async fn num_proposals(&self) -> Result<U256> {
        self.inner.call(DAO_FN_NUM_PROPOSALS, ()).await
    }

    pub async fn proposal(&self, id: U256) -> Result<RawProposal> {
        let (nft_token_id, deadline, yay_votes, nay_votes, executed): ProposalOutput =
            self.inner.call(DAO_FN_PROPOSALS, id).await?;

        Ok(RawProposal { nft_token_id, deadline, yay_votes, nay_votes, executed })
    }

    /// Native currency held by the contract.
    pub async fn treasury_balance(&self) -> Result<U256> {
        self.inner.client().reader().get_balance(self.address()).await
    }

    pub async fn create_proposal(&self, nft_token_id: U256) -> Result<TxHash> {
        self.inner.send(DAO_FN_CREATE_PROPOSAL, nft_token_id).await
    }

    pub async fn vote_on_proposal(&self, id: U256, vote: Vote) -> Result<TxHash> {
        self.inner.send(DAO_FN_VOTE_ON_PROPOSAL, (id, vote.code())).await
    }

    pub async fn execute_proposal(&self, id: U256) -> Result<TxHash> {
        self.inner.send(DAO_FN_EXECUTE_PROPOSAL, id).await
    }

    pub async fn withdraw_ether(&self) -> Result<TxHash> {
        self.inner.send(DAO_FN_WITHDRAW_ETHER, ()).await
    }

    /// Wait until `tx_hash` is mined successfully.
    pub async fn confirm(&self, tx_hash: TxHash) -> Result<()> {
        self.inner.confirm(tx_hash).await
    }
}

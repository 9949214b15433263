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

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ethers::types::{TxHash, U256};
use log::{debug, error, info, warn};
use smol::lock::Mutex as AsyncMutex;

use crate::{
    contract::{dao_contract, nft_contract, ContractAddresses, DaoHandle},
    model::{Proposal, Tab, ViewState, Vote},
    provider::{ReadProvider, TxSigner, WalletConnector},
    session::{Session, SessionInfo},
    util::parse::parse_token_id,
    Error, Result,
};

/// State-changing DAO calls the view can submit.
#[derive(Clone, Copy, Debug)]
enum WriteCall {
    CreateProposal(U256),
    Vote(u64, Vote),
    Execute(u64),
    Withdraw,
}

/// Clears `loading` when dropped, so every exit path of a write
/// leaves the view usable again.
struct LoadingGuard<'a> {
    state: &'a Mutex<ViewState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).loading = false;
    }
}

/// View model of the DAO page.
///
/// Reads keep the previous value in place when they fail. Writes are
/// serialized through the `loading` flag: while one is pending, every
/// other write entry point is refused with [`Error::WriteInProgress`].
pub struct DaoView {
    session: AsyncMutex<Session>,
    addresses: ContractAddresses,
    state: Mutex<ViewState>,
    /// Alert raised by the session, withdrawn once it is ready again
    session_alert: Mutex<Option<String>>,
}

impl DaoView {
    pub fn new(
        connector: Arc<dyn WalletConnector>,
        required_chain_id: u64,
        addresses: ContractAddresses,
    ) -> Self {
        Self {
            session: AsyncMutex::new(Session::new(connector, required_chain_id)),
            addresses,
            state: Mutex::new(ViewState::default()),
            session_alert: Mutex::new(None),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut ViewState)) {
        f(&mut self.lock_state())
    }

    /// Snapshot of the current view state.
    pub fn state(&self) -> ViewState {
        self.lock_state().clone()
    }

    /// Take the pending alert, if any.
    pub fn take_alert(&self) -> Option<String> {
        self.lock_state().alert.take()
    }

    // ==================
    // Session management
    // ==================

    /// Mirror the session into the view. A network mismatch raises an
    /// alert; once the session is ready again, that alert is withdrawn
    /// unless something else replaced it in the meantime.
    fn settle_session(&self, ready: bool, err: Option<&Error>) {
        let mut raised = self.session_alert.lock().unwrap_or_else(PoisonError::into_inner);

        self.update(|s| {
            s.wallet_connected = ready;

            if let Some(e @ Error::NetworkMismatch { .. }) = err {
                let alert = e.to_string();
                s.alert = Some(alert.clone());
                *raised = Some(alert);
            } else if ready {
                if raised.is_some() && s.alert == *raised {
                    s.alert = None;
                }
                *raised = None;
            }
        });
    }

    /// Connect the wallet. Only the first call prompts, later calls
    /// reuse the session and re-check the network.
    pub async fn connect(&self) -> Result<SessionInfo> {
        let (res, ready) = {
            let mut session = self.session.lock().await;
            let res = session.connect().await;
            (res, session.is_ready())
        };

        match &res {
            Ok(info) => debug!(target: "dao::view", "Connected as {:?}", info.account),
            Err(e @ Error::NetworkMismatch { .. }) => error!(target: "dao::view", "{}", e),
            Err(e) => warn!(target: "dao::view", "Wallet not connected: {}", e),
        }

        self.settle_session(ready, res.as_ref().err());
        res
    }

    /// Forward a network switch reported by the wallet. Before any
    /// connection this changes nothing.
    pub async fn on_network_changed(&self, chain_id: u64) -> Result<()> {
        let (res, ready) = {
            let mut session = self.session.lock().await;
            let res = session.on_network_changed(chain_id);
            (res, session.is_ready())
        };

        if let Err(e) = &res {
            error!(target: "dao::view", "{}", e);
        }

        self.settle_session(ready, res.as_ref().err());
        res
    }

    /// Drop the wallet session. The next `connect()` prompts again.
    pub async fn disconnect(&self) {
        self.session.lock().await.disconnect();
        self.update(|s| s.wallet_connected = false);
    }

    async fn read_provider(&self) -> Result<Arc<dyn ReadProvider>> {
        self.session.lock().await.read_provider()
    }

    async fn signer(&self) -> Result<Arc<dyn TxSigner>> {
        self.session.lock().await.signer()
    }

    async fn dao_reader(&self) -> Result<DaoHandle> {
        dao_contract(self.addresses.dao, self.read_provider().await?.into())
    }

    // ===============
    // Read operations
    // ===============

    /// Log a failed read, or store a successful one.
    fn settle_read<T: Clone>(
        &self,
        what: &str,
        res: Result<T>,
        apply: impl FnOnce(&mut ViewState, T),
    ) -> Result<T> {
        match res {
            Ok(value) => {
                self.update(|s| apply(s, value.clone()));
                Ok(value)
            }
            Err(e) => {
                error!(target: "dao::view", "Failed reading {}: {}", what, e);
                Err(e)
            }
        }
    }

    /// Check whether the connected account owns the DAO contract.
    pub async fn refresh_owner(&self) -> Result<bool> {
        let res: Result<bool> = async {
            let signer = self.signer().await?;
            let account = signer.address();
            let dao = dao_contract(self.addresses.dao, signer.into())?;
            Ok(dao.owner().await? == account)
        }
        .await;

        self.settle_read("owner", res, |s, is_owner| s.is_owner = is_owner)
    }

    pub async fn refresh_proposal_count(&self) -> Result<u64> {
        let res: Result<u64> = async {
            let count = self.dao_reader().await?.num_proposals().await?;
            if count > U256::from(u64::MAX) {
                return Err(Error::ParseFailed("proposal count does not fit in u64"))
            }
            Ok(count.as_u64())
        }
        .await;

        self.settle_read("proposal count", res, |s, count| s.num_proposals = count)
    }

    /// Governance NFTs held by the connected account.
    pub async fn refresh_nft_balance(&self) -> Result<u64> {
        let res: Result<u64> = async {
            let signer = self.signer().await?;
            let account = signer.address();
            let nft = nft_contract(self.addresses.nft, signer.into())?;
            let balance = nft.balance_of(account).await?;
            Ok(if balance > U256::from(u64::MAX) { u64::MAX } else { balance.as_u64() })
        }
        .await;

        self.settle_read("NFT balance", res, |s, balance| s.nft_balance = balance)
    }

    pub async fn refresh_treasury_balance(&self) -> Result<U256> {
        let res = match self.dao_reader().await {
            Ok(dao) => dao.treasury_balance().await,
            Err(e) => Err(e),
        };

        self.settle_read("treasury balance", res, |s, balance| s.treasury_balance = balance)
    }

    /// Read and normalize a single proposal. Does not touch the view state.
    pub async fn fetch_proposal(&self, id: u64) -> Result<Proposal> {
        let dao = self.dao_reader().await?;
        Self::read_proposal(&dao, id).await
    }

    async fn read_proposal(dao: &DaoHandle, id: u64) -> Result<Proposal> {
        let raw = dao.proposal(U256::from(id)).await?;
        Proposal::from_raw(id, raw)
    }

    /// Fetch proposals `0..num_proposals` in order. The list is replaced
    /// only once every fetch succeeded.
    pub async fn refresh_all_proposals(&self) -> Result<usize> {
        let count = self.lock_state().num_proposals;

        let res: Result<Vec<Proposal>> = async {
            let dao = self.dao_reader().await?;
            let mut proposals = Vec::with_capacity(count as usize);
            for id in 0..count {
                proposals.push(Self::read_proposal(&dao, id).await?);
            }
            Ok(proposals)
        }
        .await;

        let proposals = self.settle_read("proposals", res, |s, list| s.proposals = list)?;
        debug!(target: "dao::view", "Loaded {} proposals", proposals.len());
        Ok(proposals.len())
    }

    // ================
    // Write operations
    // ================

    fn ensure_idle(&self) -> Result<()> {
        if self.lock_state().loading {
            return Err(Error::WriteInProgress)
        }
        Ok(())
    }

    /// Claim the single write slot.
    fn begin_write(&self) -> Result<LoadingGuard<'_>> {
        let mut state = self.lock_state();
        if state.loading {
            return Err(Error::WriteInProgress)
        }
        state.loading = true;
        Ok(LoadingGuard { state: &self.state })
    }

    fn fail_write(&self, what: &str, err: Error) -> Error {
        error!(target: "dao::view", "{} failed: {}", what, err);
        self.update(|s| s.alert = Some(err.reason()));
        err
    }

    async fn submit(&self, dao: &DaoHandle, call: WriteCall) -> Result<TxHash> {
        match call {
            WriteCall::CreateProposal(token_id) => dao.create_proposal(token_id).await,
            WriteCall::Vote(id, vote) => dao.vote_on_proposal(U256::from(id), vote).await,
            WriteCall::Execute(id) => dao.execute_proposal(U256::from(id)).await,
            WriteCall::Withdraw => dao.withdraw_ether().await,
        }
    }

    /// Submit `call` and wait for it to be mined, holding the write slot
    /// for the whole round trip.
    async fn transact(&self, what: &str, call: WriteCall) -> Result<()> {
        let guard = self.begin_write().map_err(|e| self.fail_write(what, e))?;

        let res: Result<()> = async {
            let signer = self.signer().await?;
            let dao = dao_contract(self.addresses.dao, signer.into())?;
            let tx_hash = self.submit(&dao, call).await?;
            info!(target: "dao::view", "{} submitted in {:?}", what, tx_hash);
            dao.confirm(tx_hash).await?;
            info!(target: "dao::view", "{} confirmed", what);
            Ok(())
        }
        .await;

        drop(guard);
        res.map_err(|e| self.fail_write(what, e))
    }

    /// Local preconditions of a proposal.
    fn check_create(&self, fake_nft_token_id: &str) -> Result<U256> {
        self.ensure_idle()?;
        if self.lock_state().nft_balance == 0 {
            return Err(Error::NoGovernanceNft)
        }
        parse_token_id(fake_nft_token_id)
    }

    /// Propose buying the fake marketplace NFT `fake_nft_token_id`.
    pub async fn create_proposal(&self, fake_nft_token_id: &str) -> Result<()> {
        const WHAT: &str = "createProposal";

        let token_id =
            self.check_create(fake_nft_token_id).map_err(|e| self.fail_write(WHAT, e))?;

        self.transact(WHAT, WriteCall::CreateProposal(token_id)).await?;
        let _ = self.refresh_proposal_count().await;
        Ok(())
    }

    /// Submit the create form with the pending token id input.
    pub async fn submit_create_form(&self) -> Result<()> {
        let input = self.lock_state().fake_nft_token_id.clone();
        self.create_proposal(&input).await
    }

    pub async fn vote_on_proposal(&self, proposal_id: u64, vote: Vote) -> Result<()> {
        self.ensure_idle().map_err(|e| self.fail_write("voteOnProposal", e))?;
        self.transact("voteOnProposal", WriteCall::Vote(proposal_id, vote)).await?;
        let _ = self.refresh_all_proposals().await;
        Ok(())
    }

    /// Execute a proposal past its deadline. Execution may spend treasury
    /// funds, so the balance is refreshed along with the list.
    pub async fn execute_proposal(&self, proposal_id: u64) -> Result<()> {
        self.ensure_idle().map_err(|e| self.fail_write("executeProposal", e))?;
        self.transact("executeProposal", WriteCall::Execute(proposal_id)).await?;
        let _ = self.refresh_all_proposals().await;
        let _ = self.refresh_treasury_balance().await;
        Ok(())
    }

    /// Move the treasury to the owner. Refused on-chain for anyone else.
    pub async fn withdraw_treasury(&self) -> Result<()> {
        self.ensure_idle().map_err(|e| self.fail_write("withdrawEther", e))?;
        self.transact("withdrawEther", WriteCall::Withdraw).await?;
        let _ = self.refresh_treasury_balance().await;
        Ok(())
    }

    // ========
    // Commands
    // ========

    /// Initial reads after a successful connection. Each failure is
    /// logged and does not stop the others.
    pub async fn on_connected(&self) {
        let _ = self.refresh_treasury_balance().await;
        let _ = self.refresh_nft_balance().await;
        let _ = self.refresh_proposal_count().await;
        let _ = self.refresh_owner().await;
    }

    /// Select a tab. Opening the proposal list reloads it.
    pub async fn on_tab_selected(&self, tab: Tab) {
        self.update(|s| s.selected_tab = tab);

        if tab == Tab::ViewProposals {
            let _ = self.refresh_all_proposals().await;
        }
    }

    /// Record the pending create form input.
    pub fn set_fake_nft_token_id(&self, input: &str) {
        self.update(|s| s.fake_nft_token_id = input.to_string());
    }
}

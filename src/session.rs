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

use std::sync::Arc;

use ethers::types::Address;
use log::{debug, error, info, warn};

use crate::{
    provider::{ReadProvider, TxSigner, WalletConnector, WalletHandle},
    Error, Result,
};

/// Lifecycle of a wallet session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No wallet handle yet, or the session was dropped
    #[default]
    Uninitialized,
    /// Waiting on the wallet prompt
    Connecting,
    /// Connected on the required network
    Ready,
    /// Connected, but the wallet is on the wrong network
    Stale,
}

/// Identity of a ready session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionInfo {
    pub chain_id: u64,
    pub account: Address,
}

/// A wallet connection and its network identity.
///
/// The wallet is prompted at most once per session lifetime. Later
/// `connect()` calls reuse the cached handle and only re-check the
/// network, until `disconnect()` drops it.
pub struct Session {
    connector: Arc<dyn WalletConnector>,
    required_chain_id: u64,
    state: SessionState,
    handle: Option<WalletHandle>,
    chain_id: Option<u64>,
}

impl Session {
    pub fn new(connector: Arc<dyn WalletConnector>, required_chain_id: u64) -> Self {
        Self {
            connector,
            required_chain_id,
            state: SessionState::Uninitialized,
            handle: None,
            chain_id: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Last chain id seen from the wallet.
    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    /// Connect the wallet, or reuse the cached handle, and check that it
    /// is on the required network.
    pub async fn connect(&mut self) -> Result<SessionInfo> {
        let handle = match &self.handle {
            Some(handle) => handle.clone(),
            None => {
                self.state = SessionState::Connecting;
                debug!(target: "dao::session", "Prompting wallet for a connection");

                match self.connector.connect().await {
                    Ok(handle) => {
                        self.handle = Some(handle.clone());
                        handle
                    }
                    Err(e) => {
                        warn!(target: "dao::session", "Wallet connection failed: {}", e);
                        self.state = SessionState::Uninitialized;
                        return Err(e)
                    }
                }
            }
        };

        let chain_id = match handle.provider.chain_id().await {
            Ok(id) => id,
            Err(e) => {
                error!(target: "dao::session", "Failed reading chain id: {}", e);
                self.state = SessionState::Stale;
                return Err(e)
            }
        };

        self.check_network(chain_id)?;

        let account = handle.signer.address();
        info!(target: "dao::session", "Session ready for {:?} on chain {}", account, chain_id);
        Ok(SessionInfo { chain_id, account })
    }

    /// Record a network switch reported by the wallet. Has no effect
    /// before a handle exists.
    pub fn on_network_changed(&mut self, chain_id: u64) -> Result<()> {
        if self.handle.is_none() {
            return Ok(())
        }

        self.check_network(chain_id)
    }

    fn check_network(&mut self, chain_id: u64) -> Result<()> {
        self.chain_id = Some(chain_id);

        if chain_id != self.required_chain_id {
            error!(
                target: "dao::session",
                "Wallet is on chain {}, need {}", chain_id, self.required_chain_id,
            );
            self.state = SessionState::Stale;
            let expected = self.required_chain_id;
            return Err(Error::NetworkMismatch { expected, actual: chain_id })
        }

        self.state = SessionState::Ready;
        Ok(())
    }

    /// Drop the cached handle. The next `connect()` prompts again.
    pub fn disconnect(&mut self) {
        debug!(target: "dao::session", "Dropping wallet session");
        self.handle = None;
        self.chain_id = None;
        self.state = SessionState::Uninitialized;
    }

    fn ready_handle(&self) -> Result<&WalletHandle> {
        match (self.state, &self.handle) {
            (SessionState::Ready, Some(handle)) => Ok(handle),
            (SessionState::Stale, Some(_)) => Err(Error::NetworkMismatch {
                expected: self.required_chain_id,
                actual: self.chain_id.unwrap_or_default(),
            }),
            _ => Err(Error::WalletNotConnected),
        }
    }

    /// Read-only provider of the ready session.
    pub fn read_provider(&self) -> Result<Arc<dyn ReadProvider>> {
        Ok(self.ready_handle()?.provider.clone())
    }

    /// Signing handle of the ready session.
    pub fn signer(&self) -> Result<Arc<dyn TxSigner>> {
        Ok(self.ready_handle()?.signer.clone())
    }
}

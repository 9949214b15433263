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

use std::{fmt, str::FromStr};

use ethers::types::U256;

use crate::{util::time::Timestamp, Error, Result};

/// Vote options understood by the DAO contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vote {
    Yay = 0,
    Nay = 1,
}

impl Vote {
    /// Integer code the contract expects for this vote.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl FromStr for Vote {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "YAY" => Ok(Self::Yay),
            "NAY" => Ok(Self::Nay),
            _ => Err(Error::InvalidVote(s.to_string())),
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Yay => write!(f, "YAY"),
            Self::Nay => write!(f, "NAY"),
        }
    }
}

/// Proposal fields as returned by the contract's `proposals(id)` getter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawProposal {
    pub nft_token_id: U256,
    /// Unix seconds
    pub deadline: U256,
    pub yay_votes: U256,
    pub nay_votes: U256,
    pub executed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A DAO proposal, normalized for display
pub struct Proposal {
    /// Numeric identifier, equal to the proposal's index in the contract
    pub id: u64,
    /// Token id of the fake marketplace NFT this proposal wants to buy
    pub nft_token_id: U256,
    /// End of the voting window
    pub deadline: Timestamp,
    pub yay_votes: U256,
    pub nay_votes: U256,
    pub executed: bool,
}

impl Proposal {
    pub fn from_raw(id: u64, raw: RawProposal) -> Result<Self> {
        Ok(Self {
            id,
            nft_token_id: raw.nft_token_id,
            deadline: Timestamp::from_chain(raw.deadline)?,
            yay_votes: raw.yay_votes,
            nay_votes: raw.nay_votes,
            executed: raw.executed,
        })
    }

    /// Where the proposal stands at `now`.
    pub fn status(&self, now: Timestamp) -> ProposalStatus {
        if self.executed {
            return ProposalStatus::Executed
        }

        if now < self.deadline {
            return ProposalStatus::Votable
        }

        let outcome = if self.yay_votes > self.nay_votes { Vote::Yay } else { Vote::Nay };
        ProposalStatus::Executable(outcome)
    }
}

impl fmt::Display for Proposal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = format!(
            concat!(
                "Proposal ID: {}\n",
                "Fake NFT to Purchase: {}\n",
                "Deadline: {}\n",
                "Yay Votes: {}\n",
                "Nay Votes: {}\n",
                "Executed?: {}",
            ),
            self.id,
            self.nft_token_id,
            self.deadline,
            self.yay_votes,
            self.nay_votes,
            self.executed,
        );

        write!(f, "{}", s)
    }
}

/// Time-dependent proposal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProposalStatus {
    /// Voting window still open
    Votable,
    /// Voting closed, waiting for execution with the given expected outcome
    Executable(Vote),
    /// Already executed
    Executed,
}

/// Page tabs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    None,
    CreateProposal,
    ViewProposals,
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::None => write!(f, ""),
            Self::CreateProposal => write!(f, "Create Proposal"),
            Self::ViewProposals => write!(f, "View Proposals"),
        }
    }
}

/// Everything the page renders from. Owned by a single view model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    pub wallet_connected: bool,
    /// DAO contract balance, in wei
    pub treasury_balance: U256,
    /// Governance NFTs held by the connected account
    pub nft_balance: u64,
    pub num_proposals: u64,
    pub is_owner: bool,
    pub selected_tab: Tab,
    /// Proposals ordered by id
    pub proposals: Vec<Proposal>,
    /// A write transaction is in flight
    pub loading: bool,
    /// Pending user input for the create-proposal form
    pub fake_nft_token_id: String,
    /// Message that must be shown to the user
    pub alert: Option<String>,
}

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

//! Page description derived from a [`ViewState`]. Pure, no chain access.

use std::fmt;

use crate::{
    model::{Proposal, ProposalStatus, Tab, ViewState, Vote},
    util::{parse::format_ether, time::Timestamp},
};

pub const PAGE_TITLE: &str = "Welcome to Crypto Devs!";
pub const PAGE_SUBTITLE: &str = "Welcome to the DAO!";
pub const PAGE_FOOTER: &str = "Made with \u{2764} by Crypto Devs";

pub const LOADING_TEXT: &str = "Loading... Waiting for transaction...";
pub const NO_NFT_TEXT: &str =
    "You do not own any CryptoDev NFTs.\nYou cannot create or vote on proposals.";
pub const NO_PROPOSALS_TEXT: &str = "No proposals have been created.";
pub const CREATE_FORM_LABEL: &str = "Fake NFT Token ID to Purchase:";

/// Account and DAO summary shown above the tabs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub nft_balance: u64,
    /// Treasury in ether, decimal formatted
    pub treasury: String,
    pub num_proposals: u64,
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Your CryptoDevs NFT Balance: {}", self.nft_balance)?;
        writeln!(f, "Treasury Balance: {} ETH", self.treasury)?;
        write!(f, "Total Number of Proposals: {}", self.num_proposals)
    }
}

/// What a proposal card offers at render time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardAction {
    /// Vote YAY or NAY
    Vote,
    /// Execute, with the outcome the current tally would produce
    Execute(Vote),
    /// Nothing left to do
    Executed,
}

impl From<ProposalStatus> for CardAction {
    fn from(status: ProposalStatus) -> Self {
        match status {
            ProposalStatus::Votable => Self::Vote,
            ProposalStatus::Executable(outcome) => Self::Execute(outcome),
            ProposalStatus::Executed => Self::Executed,
        }
    }
}

impl fmt::Display for CardAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Vote => write!(f, "Vote YAY | Vote NAY"),
            Self::Execute(outcome) => write!(f, "Execute Proposal ({})", outcome),
            Self::Executed => write!(f, "Proposal Executed"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalCard {
    pub proposal: Proposal,
    pub action: CardAction,
}

/// Content of the selected tab.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TabView {
    /// No tab selected
    Empty,
    /// A write is pending
    Loading,
    /// The account holds no governance NFT
    NoNft,
    /// Create form, with the pending token id input
    CreateForm { fake_nft_token_id: String },
    NoProposals,
    Proposals(Vec<ProposalCard>),
}

/// Owner-only withdrawal control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WithdrawControl {
    Hidden,
    Loading,
    Available,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub header: Header,
    pub selected_tab: Tab,
    pub content: TabView,
    pub withdraw: WithdrawControl,
    pub alert: Option<String>,
}

fn create_tab(state: &ViewState) -> TabView {
    if state.loading {
        return TabView::Loading
    }

    if state.nft_balance == 0 {
        return TabView::NoNft
    }

    TabView::CreateForm { fake_nft_token_id: state.fake_nft_token_id.clone() }
}

fn proposals_tab(state: &ViewState, now: Timestamp) -> TabView {
    if state.loading {
        return TabView::Loading
    }

    if state.proposals.is_empty() {
        return TabView::NoProposals
    }

    let cards = state
        .proposals
        .iter()
        .map(|p| ProposalCard { proposal: p.clone(), action: p.status(now).into() })
        .collect();

    TabView::Proposals(cards)
}

/// Describe the page for `state` as of `now`.
pub fn render(state: &ViewState, now: Timestamp) -> Page {
    let header = Header {
        nft_balance: state.nft_balance,
        treasury: format_ether(state.treasury_balance),
        num_proposals: state.num_proposals,
    };

    let content = match state.selected_tab {
        Tab::None => TabView::Empty,
        Tab::CreateProposal => create_tab(state),
        Tab::ViewProposals => proposals_tab(state, now),
    };

    let withdraw = match (state.is_owner, state.loading) {
        (false, _) => WithdrawControl::Hidden,
        (true, true) => WithdrawControl::Loading,
        (true, false) => WithdrawControl::Available,
    };

    Page { header, selected_tab: state.selected_tab, content, withdraw, alert: state.alert.clone() }
}

#[cfg(test)]
mod tests {
    use ethers::types::U256;

    use super::*;

    fn proposal(id: u64, deadline: u64, yay: u64, nay: u64, executed: bool) -> Proposal {
        Proposal {
            id,
            nft_token_id: U256::from(id + 10),
            deadline: Timestamp(deadline),
            yay_votes: U256::from(yay),
            nay_votes: U256::from(nay),
            executed,
        }
    }

    #[test]
    fn empty_proposal_list() {
        let state = ViewState {
            wallet_connected: true,
            selected_tab: Tab::ViewProposals,
            ..Default::default()
        };

        let page = render(&state, Timestamp(0));
        assert_eq!(page.content, TabView::NoProposals);
        assert_eq!(page.header.num_proposals, 0);
        assert_eq!(page.header.treasury, "0.0");
    }

    #[test]
    fn create_without_nft() {
        let mut state = ViewState {
            wallet_connected: true,
            nft_balance: 0,
            selected_tab: Tab::CreateProposal,
            ..Default::default()
        };

        assert_eq!(render(&state, Timestamp(0)).content, TabView::NoNft);

        state.nft_balance = 2;
        state.fake_nft_token_id = "7".to_string();
        assert_eq!(
            render(&state, Timestamp(0)).content,
            TabView::CreateForm { fake_nft_token_id: "7".to_string() }
        );
    }

    #[test]
    fn loading_hides_tabs() {
        let mut state = ViewState {
            nft_balance: 1,
            is_owner: true,
            loading: true,
            selected_tab: Tab::CreateProposal,
            proposals: vec![proposal(0, 100, 0, 0, false)],
            ..Default::default()
        };

        let page = render(&state, Timestamp(0));
        assert_eq!(page.content, TabView::Loading);
        assert_eq!(page.withdraw, WithdrawControl::Loading);

        state.selected_tab = Tab::ViewProposals;
        assert_eq!(render(&state, Timestamp(0)).content, TabView::Loading);

        state.loading = false;
        assert_eq!(render(&state, Timestamp(0)).withdraw, WithdrawControl::Available);

        state.is_owner = false;
        assert_eq!(render(&state, Timestamp(0)).withdraw, WithdrawControl::Hidden);
    }

    #[test]
    fn card_actions() {
        let state = ViewState {
            selected_tab: Tab::ViewProposals,
            treasury_balance: U256::exp10(17) * 5,
            proposals: vec![
                proposal(0, 100, 0, 0, false),
                proposal(1, 50, 2, 1, false),
                proposal(2, 50, 1, 1, false),
                proposal(3, 50, 3, 0, true),
            ],
            ..Default::default()
        };

        let page = render(&state, Timestamp(50));
        assert_eq!(page.header.treasury, "0.5");

        let TabView::Proposals(cards) = page.content else { panic!("expected proposal cards") };
        let actions: Vec<_> = cards.iter().map(|c| c.action).collect();
        assert_eq!(
            actions,
            vec![
                CardAction::Vote,
                CardAction::Execute(Vote::Yay),
                CardAction::Execute(Vote::Nay),
                CardAction::Executed,
            ]
        );
        assert_eq!(cards[1].action.to_string(), "Execute Proposal (YAY)");
        assert_eq!(cards.iter().map(|c| c.proposal.id).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }
}

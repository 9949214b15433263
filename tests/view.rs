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

use ethers::{
    types::{Address, U256},
    utils::parse_ether,
};

use cryptodevs_dao::{
    model::{RawProposal, Tab, Vote},
    render::{render, TabView, WithdrawControl},
    test_utils::{
        MockChain, MockConnector, GENESIS_TIME, NFT_PRICE, REVERT_ALREADY_VOTED,
        REVERT_DEADLINE_EXCEEDED, REVERT_NOT_OWNER, VOTING_PERIOD,
    },
    util::time::Timestamp,
    view::DaoView,
    Error,
};

const CHAIN_ID: u64 = 5;

fn raw_proposal(token_id: u64, deadline: u64, yay: u64, nay: u64) -> RawProposal {
    RawProposal {
        nft_token_id: U256::from(token_id),
        deadline: U256::from(deadline),
        yay_votes: U256::from(yay),
        nay_votes: U256::from(nay),
        executed: false,
    }
}

fn connected_view(chain: &MockChain, account: Address) -> DaoView {
    let connector = Arc::new(MockConnector::new(chain.clone(), account));
    let view = DaoView::new(connector, CHAIN_ID, chain.addresses());

    smol::block_on(async {
        view.connect().await.unwrap();
        view.on_connected().await;
    });

    view
}

#[test]
fn empty_dao_shows_no_proposals() {
    let chain = MockChain::new(CHAIN_ID);
    let view = connected_view(&chain, chain.member(1));

    smol::block_on(view.on_tab_selected(Tab::ViewProposals));

    let state = view.state();
    assert!(state.wallet_connected);
    assert_eq!(state.num_proposals, 0);
    assert!(state.proposals.is_empty());
    assert_eq!(render(&state, Timestamp(chain.now())).content, TabView::NoProposals);
}

#[test]
fn create_without_nft_is_refused_locally() {
    let chain = MockChain::new(CHAIN_ID);
    let view = connected_view(&chain, chain.member(0));

    smol::block_on(async {
        view.on_tab_selected(Tab::CreateProposal).await;
        assert_eq!(render(&view.state(), Timestamp(chain.now())).content, TabView::NoNft);

        let res = view.create_proposal("3").await;
        assert!(matches!(res, Err(Error::NoGovernanceNft)));
    });

    assert_eq!(chain.calls("createProposal"), 0);
    assert!(!view.state().loading);
    assert!(view.take_alert().is_some());
}

#[test]
fn create_proposal_increments_count() {
    let chain = MockChain::new(CHAIN_ID);
    let view = connected_view(&chain, chain.member(2));
    assert_eq!(view.state().num_proposals, 0);

    smol::block_on(async {
        view.on_tab_selected(Tab::CreateProposal).await;
        view.set_fake_nft_token_id("42");
        view.submit_create_form().await.unwrap();
    });

    let state = view.state();
    assert_eq!(state.num_proposals, 1);
    assert!(!state.loading);
    assert_eq!(state.alert, None);

    let stored = chain.proposal(0).unwrap();
    assert_eq!(stored.nft_token_id, U256::from(42));
    assert_eq!(stored.deadline, U256::from(GENESIS_TIME + VOTING_PERIOD));
}

#[test]
fn bad_token_id_never_reaches_the_chain() {
    let chain = MockChain::new(CHAIN_ID);
    let view = connected_view(&chain, chain.member(1));

    let res = smol::block_on(view.create_proposal("forty two"));
    assert!(matches!(res, Err(Error::InvalidTokenId(_))));
    assert_eq!(chain.calls("createProposal"), 0);
    assert!(!view.state().loading);
}

#[test]
fn execute_refreshes_list_and_treasury() {
    let chain = MockChain::new(CHAIN_ID);
    chain.set_treasury(parse_ether("0.5").unwrap());
    for token in 0..3 {
        chain.add_proposal(raw_proposal(token, GENESIS_TIME + VOTING_PERIOD, 0, 0));
    }
    chain.add_proposal(raw_proposal(7, GENESIS_TIME - 1, 2, 1));

    let view = connected_view(&chain, chain.member(1));
    assert_eq!(view.state().num_proposals, 4);

    chain.reset_calls();
    smol::block_on(view.execute_proposal(3)).unwrap();

    assert_eq!(chain.calls("executeProposal"), 1);
    assert_eq!(chain.calls("proposals"), 4);
    assert_eq!(chain.calls("getBalance"), 1);

    let state = view.state();
    assert!(!state.loading);
    assert_eq!(state.proposals.len(), 4);
    assert!(state.proposals[3].executed);
    assert_eq!(
        state.treasury_balance,
        parse_ether("0.5").unwrap() - parse_ether(NFT_PRICE).unwrap()
    );
}

#[test]
fn vote_tallies_by_nft_weight() {
    let chain = MockChain::new(CHAIN_ID);
    chain.add_proposal(raw_proposal(1, GENESIS_TIME + VOTING_PERIOD, 0, 0));
    let view = connected_view(&chain, chain.member(3));

    smol::block_on(async {
        view.on_tab_selected(Tab::ViewProposals).await;
        view.vote_on_proposal(0, Vote::Nay).await.unwrap();
    });

    let state = view.state();
    assert_eq!(state.proposals[0].nay_votes, U256::from(3));
    assert_eq!(state.proposals[0].yay_votes, U256::zero());
}

#[test]
fn revert_clears_loading_and_alerts() {
    let chain = MockChain::new(CHAIN_ID);
    chain.add_proposal(raw_proposal(1, GENESIS_TIME + VOTING_PERIOD, 0, 0));
    let view = connected_view(&chain, chain.member(1));

    smol::block_on(view.vote_on_proposal(0, Vote::Yay)).unwrap();

    let res = smol::block_on(view.vote_on_proposal(0, Vote::Yay));
    assert!(matches!(res, Err(Error::TransactionReverted(ref r)) if r == REVERT_ALREADY_VOTED));
    assert!(!view.state().loading);
    assert_eq!(view.take_alert().as_deref(), Some(REVERT_ALREADY_VOTED));

    chain.advance(VOTING_PERIOD);
    let voter = connected_view(&chain, chain.member(1));
    let res = smol::block_on(voter.vote_on_proposal(0, Vote::Nay));
    assert!(matches!(res, Err(Error::TransactionReverted(_))));
    assert!(!voter.state().loading);
    assert_eq!(voter.state().alert.as_deref(), Some(REVERT_DEADLINE_EXCEEDED));
}

#[test]
fn deadlines_are_seconds_on_chain() {
    let chain = MockChain::new(CHAIN_ID);
    chain.add_proposal(raw_proposal(9, GENESIS_TIME + VOTING_PERIOD, 0, 0));
    let view = connected_view(&chain, chain.member(1));

    let proposal = smol::block_on(view.fetch_proposal(0)).unwrap();
    assert_eq!(proposal.deadline.secs(), GENESIS_TIME + VOTING_PERIOD);
    assert_eq!(proposal.deadline.millis(), (GENESIS_TIME + VOTING_PERIOD) as u128 * 1000);
}

#[test]
fn proposal_list_is_replaced_atomically() {
    let chain = MockChain::new(CHAIN_ID);
    for token in 0..5 {
        chain.add_proposal(raw_proposal(token, GENESIS_TIME + VOTING_PERIOD, 0, 0));
    }
    let view = connected_view(&chain, chain.member(1));

    assert_eq!(smol::block_on(view.refresh_all_proposals()).unwrap(), 5);
    let before = view.state().proposals;

    smol::block_on(view.vote_on_proposal(4, Vote::Yay)).unwrap();
    assert_eq!(view.state().proposals[4].yay_votes, U256::one());

    chain.fail_proposal(Some(2));
    let updated = view.state().proposals;
    assert!(smol::block_on(view.refresh_all_proposals()).is_err());
    assert_eq!(view.state().proposals, updated);
    assert_ne!(updated, before);

    chain.fail_proposal(None);
    assert_eq!(smol::block_on(view.refresh_all_proposals()).unwrap(), 5);
}

#[test]
fn treasury_refresh_is_idempotent() {
    let chain = MockChain::new(CHAIN_ID);
    chain.set_treasury(parse_ether("0.5").unwrap());
    let view = connected_view(&chain, chain.member(1));

    let first = smol::block_on(view.refresh_treasury_balance()).unwrap();
    let state = view.state();
    let second = smol::block_on(view.refresh_treasury_balance()).unwrap();

    assert_eq!(first, second);
    assert_eq!(view.state(), state);
}

#[test]
fn failed_read_keeps_previous_value() {
    let chain = MockChain::new(CHAIN_ID);
    chain.set_treasury(parse_ether("1.5").unwrap());
    let view = connected_view(&chain, chain.member(1));
    assert_eq!(view.state().treasury_balance, parse_ether("1.5").unwrap());

    chain.fail_reads(true);
    chain.set_treasury(U256::zero());
    assert!(smol::block_on(view.refresh_treasury_balance()).is_err());
    assert!(smol::block_on(view.refresh_proposal_count()).is_err());

    let state = view.state();
    assert_eq!(state.treasury_balance, parse_ether("1.5").unwrap());
    assert_eq!(state.alert, None);
}

#[test]
fn second_write_is_refused_while_pending() {
    let chain = MockChain::new(CHAIN_ID);
    chain.add_proposal(raw_proposal(1, GENESIS_TIME + VOTING_PERIOD, 0, 0));
    let view = connected_view(&chain, chain.member(1));
    let release = chain.hold_confirmations();

    let (first, second) = smol::block_on(smol::future::zip(
        view.vote_on_proposal(0, Vote::Yay),
        async {
            while !view.state().loading {
                smol::future::yield_now().await;
            }

            let res = view.execute_proposal(0).await;
            release.send(()).await.unwrap();
            res
        },
    ));

    assert!(first.is_ok());
    assert!(matches!(second, Err(Error::WriteInProgress)));
    assert_eq!(chain.calls("voteOnProposal"), 1);
    assert_eq!(chain.calls("executeProposal"), 0);
    assert!(!view.state().loading);
}

#[test]
fn only_owner_withdraws() {
    let chain = MockChain::new(CHAIN_ID);
    chain.set_treasury(parse_ether("0.5").unwrap());

    let member = connected_view(&chain, chain.member(1));
    assert!(!member.state().is_owner);
    assert_eq!(render(&member.state(), Timestamp(0)).withdraw, WithdrawControl::Hidden);

    let res = smol::block_on(member.withdraw_treasury());
    assert!(matches!(res, Err(Error::TransactionReverted(_))));
    assert_eq!(member.state().alert.as_deref(), Some(REVERT_NOT_OWNER));
    assert_eq!(chain.treasury(), parse_ether("0.5").unwrap());

    let owner = connected_view(&chain, chain.owner());
    assert!(owner.state().is_owner);
    assert_eq!(render(&owner.state(), Timestamp(0)).withdraw, WithdrawControl::Available);

    smol::block_on(owner.withdraw_treasury()).unwrap();
    assert_eq!(chain.treasury(), U256::zero());
    assert_eq!(owner.state().treasury_balance, U256::zero());
}

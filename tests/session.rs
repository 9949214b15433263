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

use cryptodevs_dao::{
    model::Tab,
    session::{Session, SessionState},
    test_utils::{MockChain, MockConnector},
    view::DaoView,
    Error,
};

const CHAIN_ID: u64 = 5;

#[test]
fn wallet_is_prompted_once() {
    let chain = MockChain::new(CHAIN_ID);
    let account = chain.member(1);
    let connector = Arc::new(MockConnector::new(chain.clone(), account));
    let view = DaoView::new(connector.clone(), CHAIN_ID, chain.addresses());

    smol::block_on(async {
        let info = view.connect().await.unwrap();
        assert_eq!(info.account, account);
        assert_eq!(info.chain_id, CHAIN_ID);

        view.on_connected().await;
        view.on_tab_selected(Tab::ViewProposals).await;
        view.connect().await.unwrap();
        view.refresh_nft_balance().await.unwrap();
        view.refresh_owner().await.unwrap();
    });

    assert_eq!(connector.prompts(), 1);
    assert_eq!(view.state().nft_balance, 1);

    smol::block_on(async {
        view.disconnect().await;
        assert!(!view.state().wallet_connected);
        view.connect().await.unwrap();
    });
    assert_eq!(connector.prompts(), 2);
}

#[test]
fn wrong_network_blocks_contract_calls() {
    let chain = MockChain::new(1);
    let connector = Arc::new(MockConnector::new(chain.clone(), chain.member(1)));
    let view = DaoView::new(connector.clone(), CHAIN_ID, chain.addresses());

    smol::block_on(async {
        let res = view.connect().await;
        assert!(matches!(res, Err(Error::NetworkMismatch { expected: 5, actual: 1 })));

        view.on_connected().await;
        view.on_tab_selected(Tab::ViewProposals).await;
        assert!(matches!(
            view.refresh_treasury_balance().await,
            Err(Error::NetworkMismatch { .. })
        ));
    });

    let state = view.state();
    assert!(!state.wallet_connected);
    assert!(state.alert.is_some());
    for func in ["owner", "getNumProposals", "proposals", "balanceOf", "getBalance"] {
        assert_eq!(chain.calls(func), 0, "{} was called on the wrong network", func);
    }

    // Switching to the right network revives the cached session
    chain.set_chain_id(CHAIN_ID);
    smol::block_on(async {
        view.on_network_changed(CHAIN_ID).await.unwrap();
        view.refresh_proposal_count().await.unwrap();
    });
    assert!(view.state().wallet_connected);
    assert_eq!(chain.calls("getNumProposals"), 1);
    assert_eq!(connector.prompts(), 1);

    // And switching away makes it stale again
    let res = smol::block_on(view.on_network_changed(1));
    assert!(matches!(res, Err(Error::NetworkMismatch { .. })));
    assert!(matches!(
        smol::block_on(view.refresh_proposal_count()),
        Err(Error::NetworkMismatch { .. })
    ));
    assert_eq!(chain.calls("getNumProposals"), 1);
}

#[test]
fn rejected_prompt_leaves_session_unusable() {
    let chain = MockChain::new(CHAIN_ID);
    let connector = Arc::new(MockConnector::new(chain.clone(), chain.member(1)));
    connector.set_reject(true);
    let view = DaoView::new(connector.clone(), CHAIN_ID, chain.addresses());

    smol::block_on(async {
        assert!(matches!(view.connect().await, Err(Error::WalletRejected(_))));
        assert!(matches!(view.refresh_owner().await, Err(Error::WalletNotConnected)));
    });
    assert!(!view.state().wallet_connected);

    // The user accepts on the next attempt
    connector.set_reject(false);
    smol::block_on(view.connect()).unwrap();
    assert_eq!(connector.prompts(), 2);
    assert!(view.state().wallet_connected);
}

#[test]
fn session_states() {
    let chain = MockChain::new(CHAIN_ID);
    let connector = Arc::new(MockConnector::new(chain.clone(), chain.member(0)));
    let mut session = Session::new(connector, CHAIN_ID);
    assert_eq!(session.state(), SessionState::Uninitialized);

    // No handle yet, nothing to mark stale
    session.on_network_changed(1).unwrap();
    assert_eq!(session.state(), SessionState::Uninitialized);

    smol::block_on(session.connect()).unwrap();
    assert_eq!(session.state(), SessionState::Ready);
    assert!(session.is_ready());

    assert!(session.on_network_changed(1).is_err());
    assert_eq!(session.state(), SessionState::Stale);
    assert_eq!(session.chain_id(), Some(1));
}

#[test]
fn network_event_before_connect_changes_nothing() {
    let chain = MockChain::new(CHAIN_ID);
    let connector = Arc::new(MockConnector::new(chain.clone(), chain.member(1)));
    let view = DaoView::new(connector.clone(), CHAIN_ID, chain.addresses());

    smol::block_on(view.on_network_changed(CHAIN_ID)).unwrap();
    assert!(!view.state().wallet_connected);
    assert_eq!(connector.prompts(), 0);
    assert!(matches!(
        smol::block_on(view.refresh_treasury_balance()),
        Err(Error::WalletNotConnected)
    ));

    smol::block_on(view.on_network_changed(1)).unwrap();
    assert!(!view.state().wallet_connected);
    assert_eq!(view.state().alert, None);
}

#[test]
fn mismatch_alert_clears_after_network_switch() {
    let chain = MockChain::new(1);
    let connector = Arc::new(MockConnector::new(chain.clone(), chain.member(1)));
    let view = DaoView::new(connector.clone(), CHAIN_ID, chain.addresses());

    assert!(smol::block_on(view.connect()).is_err());
    assert!(view.state().alert.is_some());

    chain.set_chain_id(CHAIN_ID);
    smol::block_on(view.on_network_changed(CHAIN_ID)).unwrap();

    let state = view.state();
    assert!(state.wallet_connected);
    assert_eq!(state.alert, None);
}

#[test]
fn mismatch_alert_clears_after_reconnect() {
    let chain = MockChain::new(1);
    let connector = Arc::new(MockConnector::new(chain.clone(), chain.member(1)));
    let view = DaoView::new(connector.clone(), CHAIN_ID, chain.addresses());

    assert!(smol::block_on(view.connect()).is_err());
    assert!(view.state().alert.is_some());

    chain.set_chain_id(CHAIN_ID);
    smol::block_on(view.connect()).unwrap();

    let state = view.state();
    assert!(state.wallet_connected);
    assert_eq!(state.alert, None);
    assert_eq!(connector.prompts(), 1);
}

#[test]
fn reconnect_keeps_unrelated_alerts() {
    let chain = MockChain::new(CHAIN_ID);
    let connector = Arc::new(MockConnector::new(chain.clone(), chain.member(0)));
    let view = DaoView::new(connector, CHAIN_ID, chain.addresses());

    smol::block_on(async {
        view.connect().await.unwrap();
        view.on_connected().await;
        assert!(view.create_proposal("1").await.is_err());
        view.connect().await.unwrap();
    });

    assert_eq!(view.state().alert, Some(Error::NoGovernanceNft.to_string()));
}

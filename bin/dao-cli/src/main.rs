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

use log::info;
use prettytable::{format, row, Table};
use structopt_toml::{serde::Deserialize, structopt::StructOpt, StructOptToml};

use cryptodevs_dao::{
    async_cli_main, cli_desc,
    contract::{
        ContractAddresses, CRYPTODEV_DAO_CONTRACT_ADDRESS, CRYPTODEV_NFT_CONTRACT_ADDRESS,
        REQUIRED_CHAIN_ID,
    },
    eth::LocalWalletConnector,
    model::{Tab, Vote},
    render::{
        render, Page, TabView, WithdrawControl, CREATE_FORM_LABEL, LOADING_TEXT, NO_NFT_TEXT,
        NO_PROPOSALS_TEXT, PAGE_FOOTER, PAGE_SUBTITLE, PAGE_TITLE,
    },
    util::time::Timestamp,
    view::DaoView,
    Result,
};

const CONFIG_FILE: &str = "dao_cli_config.toml";
const CONFIG_FILE_CONTENTS: &str = include_str!("../dao_cli_config.toml");

const AFTER_HELP: &str = "\
On the first run the default configuration is written to \
~/.config/cryptodevs/dao_cli_config.toml (or the --config path) and the \
client exits with status 2. Review the file and run again.";

#[derive(Clone, Debug, Deserialize, StructOpt, StructOptToml)]
#[serde(default)]
#[structopt(name = "dao-cli", about = cli_desc!(), after_help = AFTER_HELP)]
struct Args {
    #[structopt(short, long)]
    /// Configuration file to use
    config: Option<String>,

    #[structopt(short, long, default_value = "http://127.0.0.1:8545")]
    /// JSON-RPC endpoint of the node
    endpoint: String,

    #[structopt(long)]
    /// Hex encoded private key of the account to use
    private_key: Option<String>,

    #[structopt(long, default_value = "5")]
    /// Chain id the contracts are deployed on
    chain_id: u64,

    #[structopt(long)]
    /// Override the DAO contract address
    dao_address: Option<String>,

    #[structopt(long)]
    /// Override the NFT contract address
    nft_address: Option<String>,

    #[structopt(subcommand)]
    /// Sub command to execute
    command: Option<Subcmd>,

    #[structopt(short, long)]
    /// Set log file to output into
    log: Option<String>,

    #[structopt(short, parse(from_occurrences))]
    /// Increase verbosity (-vvv supported)
    verbose: u8,
}

#[derive(Clone, Debug, Deserialize, StructOpt)]
enum Subcmd {
    /// Show NFT balance, treasury and proposal count
    Status,

    /// Create a proposal to buy a fake marketplace NFT
    Create {
        /// Fake NFT token id to purchase
        fake_nft_token_id: String,
    },

    /// List all proposals
    Proposals,

    /// Vote on a proposal
    Vote {
        /// Proposal id
        proposal_id: u64,

        /// YAY or NAY
        vote: String,
    },

    /// Execute a proposal past its deadline
    Execute {
        /// Proposal id
        proposal_id: u64,
    },

    /// Withdraw the DAO treasury (owner only)
    Withdraw,
}

fn print_proposals(page: &Page) {
    let TabView::Proposals(cards) = &page.content else { return };

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row!["ID", "Fake NFT", "Deadline", "Yay", "Nay", "Executed?", "Action"]);

    for card in cards {
        let p = &card.proposal;
        table.add_row(row![
            p.id,
            p.nft_token_id,
            p.deadline,
            p.yay_votes,
            p.nay_votes,
            p.executed,
            card.action
        ]);
    }

    println!("{}", table);
}

fn print_page(page: &Page) {
    println!("{}", PAGE_TITLE);
    println!("{}\n", PAGE_SUBTITLE);
    println!("{}\n", page.header);

    match &page.content {
        TabView::Empty => {}
        TabView::Loading => println!("{}", LOADING_TEXT),
        TabView::NoNft => println!("{}", NO_NFT_TEXT),
        TabView::CreateForm { fake_nft_token_id } => {
            let input = if fake_nft_token_id.is_empty() { "0" } else { fake_nft_token_id };
            println!("{} {}", CREATE_FORM_LABEL, input);
        }
        TabView::NoProposals => println!("{}", NO_PROPOSALS_TEXT),
        TabView::Proposals(_) => print_proposals(page),
    }

    match page.withdraw {
        WithdrawControl::Hidden => {}
        WithdrawControl::Loading => println!("\nWithdraw DAO ETH: Loading..."),
        WithdrawControl::Available => println!("\nWithdraw DAO ETH: run `dao-cli withdraw`"),
    }

    if let Some(alert) = &page.alert {
        eprintln!("\n{}", alert);
    }

    println!("\n{}", PAGE_FOOTER);
}

async_cli_main!(realmain);
async fn realmain(args: Args) -> Result<()> {
    if args.chain_id != REQUIRED_CHAIN_ID {
        info!(
            target: "dao-cli",
            "Using chain id {} instead of {}", args.chain_id, REQUIRED_CHAIN_ID,
        );
    }

    let addresses = ContractAddresses::new(
        args.dao_address.as_deref().unwrap_or(CRYPTODEV_DAO_CONTRACT_ADDRESS),
        args.nft_address.as_deref().unwrap_or(CRYPTODEV_NFT_CONTRACT_ADDRESS),
    )?;

    let command = args.command.clone().unwrap_or(Subcmd::Status);

    // Refuse bad input before prompting the wallet
    let vote = match &command {
        Subcmd::Vote { vote, .. } => Some(vote.parse::<Vote>()?),
        _ => None,
    };

    let connector = Arc::new(LocalWalletConnector::new(args.endpoint, args.private_key));
    let view = DaoView::new(connector, args.chain_id, addresses);

    if let Err(e) = view.connect().await {
        print_page(&render(&view.state(), Timestamp::current_time()));
        return Err(e)
    }
    view.on_connected().await;

    let result = match command {
        Subcmd::Status => Ok(()),

        Subcmd::Create { fake_nft_token_id } => {
            view.on_tab_selected(Tab::CreateProposal).await;
            view.set_fake_nft_token_id(&fake_nft_token_id);
            view.submit_create_form().await
        }

        Subcmd::Proposals => {
            view.on_tab_selected(Tab::ViewProposals).await;
            Ok(())
        }

        Subcmd::Vote { proposal_id, .. } => {
            view.on_tab_selected(Tab::ViewProposals).await;
            match vote {
                Some(vote) => view.vote_on_proposal(proposal_id, vote).await,
                None => Ok(()),
            }
        }

        Subcmd::Execute { proposal_id } => {
            view.on_tab_selected(Tab::ViewProposals).await;
            view.execute_proposal(proposal_id).await
        }

        Subcmd::Withdraw => view.withdraw_treasury().await,
    };

    print_page(&render(&view.state(), Timestamp::current_time()));
    result
}

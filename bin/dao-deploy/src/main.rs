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

use log::info;
use structopt_toml::{serde::Deserialize, structopt::StructOpt, StructOptToml};

use cryptodevs_dao::{
    async_cli_main, cli_desc,
    contract::{parse_address, CRYPTODEV_NFT_CONTRACT_ADDRESS},
    deploy::{deploy_all, Artifact, DeployPlan, DAO_CONTRACT, MARKETPLACE_CONTRACT},
    eth::LocalWalletConnector,
    provider::{ReadProvider, TxSigner},
    util::{
        parse::{format_ether, parse_ether},
        path::expand_path,
    },
    Error, Result,
};

const CONFIG_FILE: &str = "dao_deploy_config.toml";
const CONFIG_FILE_CONTENTS: &str = include_str!("../dao_deploy_config.toml");

const AFTER_HELP: &str = "\
On the first run the default configuration is written to \
~/.config/cryptodevs/dao_deploy_config.toml (or the --config path) and the \
tool exits with status 2 without deploying anything. Review the file and run \
again. Afterwards the exit status is 0 on success and 1 on failure.";

#[derive(Clone, Debug, Deserialize, StructOpt, StructOptToml)]
#[serde(default)]
#[structopt(name = "dao-deploy", about = cli_desc!(), after_help = AFTER_HELP)]
struct Args {
    #[structopt(short, long)]
    /// Configuration file to use
    config: Option<String>,

    #[structopt(short, long, default_value = "http://127.0.0.1:8545")]
    /// JSON-RPC endpoint of the network to deploy to
    endpoint: String,

    #[structopt(long)]
    /// Hex encoded private key of the deploying account
    private_key: Option<String>,

    #[structopt(long, default_value = "5")]
    /// Chain id of the network to deploy to
    chain_id: u64,

    #[structopt(short, long, default_value = "artifacts")]
    /// Hardhat artifacts directory
    artifacts: String,

    #[structopt(long)]
    /// Address of the existing CryptoDevs NFT collection
    nft_address: Option<String>,

    #[structopt(long, default_value = "0.5")]
    /// Ether sent to the DAO treasury at construction
    funding: String,

    #[structopt(short, long)]
    /// Set log file to output into
    log: Option<String>,

    #[structopt(short, parse(from_occurrences))]
    /// Increase verbosity (-vvv supported)
    verbose: u8,
}

async_cli_main!(realmain);
async fn realmain(args: Args) -> Result<()> {
    let artifacts = expand_path(&args.artifacts)?;
    let nft = args.nft_address.as_deref().unwrap_or(CRYPTODEV_NFT_CONTRACT_ADDRESS);
    let nft = parse_address(nft)?;
    let funding = parse_ether(&args.funding)?;

    let plan = DeployPlan {
        marketplace: Artifact::load_named(&artifacts, MARKETPLACE_CONTRACT)?,
        dao: Artifact::load_named(&artifacts, DAO_CONTRACT)?,
        nft,
        funding,
    };

    let connector = LocalWalletConnector::new(args.endpoint, args.private_key);
    let signer = connector.connect_signer().await?;

    let chain_id = signer.chain_id().await?;
    if chain_id != args.chain_id {
        return Err(Error::NetworkMismatch { expected: args.chain_id, actual: chain_id })
    }

    info!(
        target: "dao-deploy",
        "Deploying from {:?} on chain {}, funding the DAO with {} ETH",
        signer.address(), chain_id, format_ether(funding),
    );

    let deployment = deploy_all(&signer, &plan).await?;

    println!("Fake NFT marketplace deployed to address: {:?}", deployment.marketplace);
    println!("CryptoDevs DAO deployed to address: {:?}", deployment.dao);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_documents_first_run_exit() {
        let mut help = vec![];
        Args::clap().write_long_help(&mut help).unwrap();
        // Help text is wrapped to the terminal width
        let help = String::from_utf8(help).unwrap();
        let help = help.split_whitespace().collect::<Vec<_>>().join(" ");
        assert!(help.contains("status 2"));
        assert!(help.contains(CONFIG_FILE));
    }
}

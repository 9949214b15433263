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

//! Deployment of the fake NFT marketplace and the DAO from precompiled
//! Hardhat artifacts.

use std::{
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use ethers::{
    abi::{Abi, Token},
    contract::{ContractError, ContractFactory},
    types::{Address, Bytes, U256},
};
use log::info;
use serde::Deserialize;

use crate::{
    eth::{EthClient, EthSigner},
    Error, Result,
};

pub const MARKETPLACE_CONTRACT: &str = "FakeNFTMarketPlace";
pub const DAO_CONTRACT: &str = "CryptoDevDAO";

/// Compiled contract as written by Hardhat under
/// `artifacts/contracts/<Name>.sol/<Name>.json`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

impl Artifact {
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: Self =
            serde_json::from_str(json).map_err(|e| Error::ArtifactError(e.to_string()))?;

        if artifact.bytecode.is_empty() {
            return Err(Error::ArtifactError(format!(
                "{} has no bytecode, is it an interface?",
                artifact.contract_name
            )))
        }

        Ok(artifact)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| Error::ArtifactError(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Load `name` from a Hardhat artifacts directory.
    pub fn load_named(artifacts_dir: &Path, name: &str) -> Result<Self> {
        let artifact = Self::load(&artifact_path(artifacts_dir, name))?;
        if artifact.contract_name != name {
            return Err(Error::ArtifactError(format!(
                "expected {}, artifact holds {}",
                name, artifact.contract_name
            )))
        }
        Ok(artifact)
    }

    /// Refuse `count` constructor arguments unless the ABI takes exactly
    /// that many.
    pub fn expect_constructor_args(&self, count: usize) -> Result<()> {
        let expected = self.abi.constructor().map_or(0, |c| c.inputs.len());
        if expected != count {
            return Err(Error::ArtifactError(format!(
                "{} constructor takes {} arguments, got {}",
                self.contract_name, expected, count
            )))
        }
        Ok(())
    }
}

pub fn artifact_path(artifacts_dir: &Path, name: &str) -> PathBuf {
    artifacts_dir.join("contracts").join(format!("{}.sol", name)).join(format!("{}.json", name))
}

/// Something that can put a contract on chain.
#[async_trait]
pub trait ContractDeployer: Send + Sync {
    /// Deploy `artifact` with the given constructor arguments, sending
    /// `value` wei along. Waits for the creation to be mined and returns the
    /// new contract's address.
    async fn deploy(&self, artifact: &Artifact, args: Vec<Token>, value: U256) -> Result<Address>;
}

fn deploy_error(name: &str, err: ContractError<EthClient>) -> Error {
    if let Some(reason) = err.decode_revert::<String>() {
        return Error::TransactionReverted(reason)
    }

    if err.is_revert() {
        return Error::TransactionReverted(format!("{} constructor reverted", name))
    }

    Error::DeployFailed(format!("{}: {}", name, err))
}

#[async_trait]
impl ContractDeployer for EthSigner {
    async fn deploy(&self, artifact: &Artifact, args: Vec<Token>, value: U256) -> Result<Address> {
        let name = &artifact.contract_name;
        info!(target: "dao::deploy", "Deploying {}", name);

        let factory =
            ContractFactory::new(artifact.abi.clone(), artifact.bytecode.clone(), self.client());
        let mut deployer = factory.deploy_tokens(args).map_err(|e| deploy_error(name, e))?;
        deployer.tx.set_value(value);

        let contract = deployer.send().await.map_err(|e| deploy_error(name, e))?;
        Ok(contract.address())
    }
}

/// Everything a deployment run needs.
pub struct DeployPlan {
    pub marketplace: Artifact,
    pub dao: Artifact,
    /// Existing CryptoDevs NFT collection the DAO governs with
    pub nft: Address,
    /// Wei sent to the DAO constructor
    pub funding: U256,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deployment {
    pub marketplace: Address,
    pub dao: Address,
}

/// Deploy the marketplace, then the DAO bound to it and to the NFT
/// collection, funded with `plan.funding`.
pub async fn deploy_all(deployer: &dyn ContractDeployer, plan: &DeployPlan) -> Result<Deployment> {
    if plan.nft.is_zero() {
        return Err(Error::ContractConfig("NFT address is the zero address".to_string()))
    }

    // Nothing goes on chain unless both constructors match
    plan.marketplace.expect_constructor_args(0)?;
    plan.dao.expect_constructor_args(2)?;

    let marketplace = deployer.deploy(&plan.marketplace, vec![], U256::zero()).await?;
    info!(target: "dao::deploy", "Fake NFT marketplace deployed to address: {:?}", marketplace);

    let args = vec![Token::Address(marketplace), Token::Address(plan.nft)];
    let dao = deployer.deploy(&plan.dao, args, plan.funding).await?;
    info!(target: "dao::deploy", "CryptoDevs DAO deployed to address: {:?}", dao);

    Ok(Deployment { marketplace, dao })
}

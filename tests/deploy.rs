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

use ethers::{
    abi::Token,
    types::{Address, U256},
    utils::parse_ether,
};

use cryptodevs_dao::{
    deploy::{deploy_all, Artifact, DeployPlan, DAO_CONTRACT, MARKETPLACE_CONTRACT},
    test_utils::MockDeployer,
    Error,
};

const MARKETPLACE_JSON: &str = r#"{
    "_format": "hh-sol-artifact-1",
    "contractName": "FakeNFTMarketPlace",
    "sourceName": "contracts/FakeNFTMarketPlace.sol",
    "abi": [],
    "bytecode": "0x60806040",
    "deployedBytecode": "0x6080",
    "linkReferences": {},
    "deployedLinkReferences": {}
}"#;

const DAO_JSON: &str = r#"{
    "_format": "hh-sol-artifact-1",
    "contractName": "CryptoDevDAO",
    "sourceName": "contracts/CryptoDevDAO.sol",
    "abi": [
        {"inputs": [
            {"internalType": "address", "name": "_nftMarketplace", "type": "address"},
            {"internalType": "address", "name": "_cryptoDevsNFT", "type": "address"}
         ], "stateMutability": "payable", "type": "constructor"}
    ],
    "bytecode": "0xdeadbeef",
    "deployedBytecode": "0xdead",
    "linkReferences": {},
    "deployedLinkReferences": {}
}"#;

fn plan(nft: Address) -> DeployPlan {
    DeployPlan {
        marketplace: Artifact::from_json(MARKETPLACE_JSON).unwrap(),
        dao: Artifact::from_json(DAO_JSON).unwrap(),
        nft,
        funding: parse_ether("0.5").unwrap(),
    }
}

#[test]
fn marketplace_then_funded_dao() {
    let nft = Address::from_low_u64_be(0xaf7);
    let deployer = MockDeployer::new();

    let deployment = smol::block_on(deploy_all(&deployer, &plan(nft))).unwrap();

    let deployed = deployer.deployed();
    assert_eq!(deployed.len(), 2);
    assert_eq!(deployed[0].name, MARKETPLACE_CONTRACT);
    assert_eq!(deployed[0].value, U256::zero());
    assert!(deployed[0].args.is_empty());
    assert_eq!(deployment.marketplace, deployed[0].address);

    assert_eq!(deployed[1].name, DAO_CONTRACT);
    assert_eq!(deployed[1].value, U256::exp10(17) * 5);
    assert_eq!(deployed[1].args, vec![Token::Address(deployment.marketplace), Token::Address(nft)]);
    assert_eq!(deployment.dao, deployed[1].address);
}

#[test]
fn dao_failure_propagates() {
    let deployer = MockDeployer::failing_on(DAO_CONTRACT);
    let res = smol::block_on(deploy_all(&deployer, &plan(Address::from_low_u64_be(0xaf7))));

    assert!(matches!(res, Err(Error::TransactionReverted(_))));
    assert_eq!(deployer.deployed().len(), 1);
    assert_eq!(deployer.deployed()[0].name, MARKETPLACE_CONTRACT);
}

#[test]
fn zero_nft_address_is_refused() {
    let deployer = MockDeployer::new();
    let res = smol::block_on(deploy_all(&deployer, &plan(Address::zero())));

    assert!(matches!(res, Err(Error::ContractConfig(_))));
    assert!(deployer.deployed().is_empty());
}

#[test]
fn mismatched_constructor_deploys_nothing() {
    let deployer = MockDeployer::new();
    let mut plan = plan(Address::from_low_u64_be(0xaf7));
    plan.dao = Artifact::from_json(&MARKETPLACE_JSON.replace("FakeNFTMarketPlace", DAO_CONTRACT))
        .unwrap();

    let res = smol::block_on(deploy_all(&deployer, &plan));
    assert!(matches!(res, Err(Error::ArtifactError(_))));
    assert!(deployer.deployed().is_empty());
}

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

use ethers::abi::{parse_abi, Abi};

use crate::Result;

// Function names, as they appear in the contract interfaces.
pub const DAO_FN_OWNER: &str = "owner";
pub const DAO_FN_NUM_PROPOSALS: &str = "getNumProposals";
pub const DAO_FN_PROPOSALS: &str = "proposals";
pub const DAO_FN_CREATE_PROPOSAL: &str = "createProposal";
pub const DAO_FN_VOTE_ON_PROPOSAL: &str = "voteOnProposal";
pub const DAO_FN_EXECUTE_PROPOSAL: &str = "executeProposal";
pub const DAO_FN_WITHDRAW_ETHER: &str = "withdrawEther";
pub const NFT_FN_BALANCE_OF: &str = "balanceOf";

/// Functions the DAO handle relies on.
pub const DAO_REQUIRED_FNS: [&str; 7] = [
    DAO_FN_OWNER,
    DAO_FN_NUM_PROPOSALS,
    DAO_FN_PROPOSALS,
    DAO_FN_CREATE_PROPOSAL,
    DAO_FN_VOTE_ON_PROPOSAL,
    DAO_FN_EXECUTE_PROPOSAL,
    DAO_FN_WITHDRAW_ETHER,
];

/// Functions the NFT handle relies on.
pub const NFT_REQUIRED_FNS: [&str; 1] = [NFT_FN_BALANCE_OF];

/// Human-readable interface of the CryptoDevs DAO contract.
/// `Vote` is a Solidity enum and travels as `uint8`.
pub const CRYPTODEV_DAO_ABI: &[&str] = &[
    "function owner() external view returns (address)",
    "function getNumProposals() external view returns (uint256)",
    "function proposals(uint256) external view returns (uint256 nftTokenId, uint256 deadline, uint256 yayVotes, uint256 nayVotes, bool executed)",
    "function createProposal(uint256 _nftTokenId) external returns (uint256)",
    "function voteOnProposal(uint256 proposalIndex, uint8 vote) external",
    "function executeProposal(uint256 proposalIndex) external",
    "function withdrawEther() external",
];

/// Human-readable interface of the CryptoDevs NFT contract, the part we use.
pub const CRYPTODEV_NFT_ABI: &[&str] =
    &["function balanceOf(address owner) external view returns (uint256)"];

pub fn dao_abi() -> Result<Abi> {
    Ok(parse_abi(CRYPTODEV_DAO_ABI)?)
}

pub fn nft_abi() -> Result<Abi> {
    Ok(parse_abi(CRYPTODEV_NFT_ABI)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interfaces_parse() {
        let dao = dao_abi().unwrap();
        for func in DAO_REQUIRED_FNS {
            assert!(dao.function(func).is_ok(), "missing {}", func);
        }
        assert_eq!(dao.function(DAO_FN_PROPOSALS).unwrap().outputs.len(), 5);

        let nft = nft_abi().unwrap();
        assert!(nft.function(NFT_FN_BALANCE_OF).is_ok());
    }
}

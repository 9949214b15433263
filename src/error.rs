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

// Hello developer. Please add your error to the according subsection
// that is commented, or make a new subsection. Keep it clean.

/// Main result type used throughout the codebase.
pub type Result<T> = std::result::Result<T, Error>;

/// General library errors used throughout the codebase.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    // ==============
    // Parsing errors
    // ==============
    #[error("Parse failed: {0}")]
    ParseFailed(&'static str),

    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),

    #[error("Invalid vote \"{0}\", expected YAY or NAY")]
    InvalidVote(String),

    #[error("Invalid token id \"{0}\"")]
    InvalidTokenId(String),

    #[error("Invalid amount \"{0}\"")]
    InvalidAmount(String),

    // ===============
    // Encoding errors
    // ===============
    #[error("ABI error: {0}")]
    AbiError(String),

    #[error("serde_json error: {0}")]
    SerdeJsonError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    // =====================
    // Wallet session errors
    // =====================
    #[error("Wrong network: expected chain id {expected}, wallet is on {actual}")]
    NetworkMismatch { expected: u64, actual: u64 },

    #[error("Wallet connection rejected: {0}")]
    WalletRejected(String),

    #[error("Wallet is not connected")]
    WalletNotConnected,

    #[error("Operation requires a signer, got a read-only provider")]
    SignerRequired,

    // =======================
    // Contract handle errors
    // =======================
    #[error("Invalid contract configuration: {0}")]
    ContractConfig(String),

    #[error("Contract call failed: {0}")]
    ContractCallFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    // ==================
    // Transaction errors
    // ==================
    #[error("Transaction reverted: {0}")]
    TransactionReverted(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Another transaction is still pending")]
    WriteInProgress,

    #[error("You do not own any CryptoDevs NFTs")]
    NoGovernanceNft,

    // =================
    // Deployment errors
    // =================
    #[error("Contract artifact error: {0}")]
    ArtifactError(String),

    #[error("Deployment failed: {0}")]
    DeployFailed(String),

    // ===============
    // System errors
    // ===============
    #[error("IO error: {0:?}")]
    Io(std::io::ErrorKind),

    #[error("Set logger failed: {0}")]
    SetLoggerError(String),
}

impl Error {
    /// Text shown to the user when this error is surfaced as an alert.
    /// Contract reverts show the bare revert reason.
    pub fn reason(&self) -> String {
        match self {
            Self::TransactionReverted(reason) => reason.clone(),
            _ => self.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.kind())
    }
}

impl From<log::SetLoggerError> for Error {
    fn from(err: log::SetLoggerError) -> Self {
        Self::SetLoggerError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::SerdeJsonError(err.to_string())
    }
}

impl From<ethers::abi::Error> for Error {
    fn from(err: ethers::abi::Error) -> Self {
        Self::AbiError(err.to_string())
    }
}

impl From<ethers::contract::AbiError> for Error {
    fn from(err: ethers::contract::AbiError) -> Self {
        Self::AbiError(err.to_string())
    }
}

impl From<ethers::abi::ParseError> for Error {
    fn from(err: ethers::abi::ParseError) -> Self {
        Self::ContractConfig(err.to_string())
    }
}

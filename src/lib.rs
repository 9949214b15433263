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

pub mod error;
pub use error::{Error, Result};

/// Chain access traits
pub mod provider;

/// ethers-backed providers, signer and wallet connector
pub mod eth;

/// Wallet session lifecycle
pub mod session;

/// DAO and NFT contract handles
pub mod contract;

/// Proposals, votes and view state
pub mod model;

/// DAO view model
pub mod view;

/// Page description
pub mod render;

/// Contract deployment
pub mod deploy;

/// Utility functions
pub mod util;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

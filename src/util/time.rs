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

use std::fmt;

use chrono::{DateTime, Utc};
use ethers::types::U256;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Wrapper struct to represent UTC timestamps in seconds since the Unix epoch.
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, PartialOrd, Eq, Ord, Hash,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Generate a `Timestamp` of the current time.
    pub fn current_time() -> Self {
        Self(Utc::now().timestamp().max(0) as u64)
    }

    /// Build a `Timestamp` out of an on-chain `uint256` holding Unix seconds.
    pub fn from_chain(secs: U256) -> Result<Self> {
        if secs > U256::from(u64::MAX) {
            return Err(Error::ParseFailed("timestamp does not fit in 64 bits"))
        }

        Ok(Self(secs.as_u64()))
    }

    /// Seconds since the Unix epoch.
    pub fn secs(&self) -> u64 {
        self.0
    }

    /// Milliseconds since the Unix epoch.
    pub fn millis(&self) -> u128 {
        self.0 as u128 * 1000
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let secs = i64::try_from(self.0).ok();
        let date = match secs.and_then(|s| DateTime::<Utc>::from_timestamp(s, 0)) {
            Some(d) => d.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            None => format!("{}s", self.0),
        };

        write!(f, "{}", date)
    }
}

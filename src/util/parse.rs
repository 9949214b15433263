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

use ethers::{types::U256, utils};

use crate::{Error, Result};

/// Format a wei amount as ether, the way wallets display it: trailing zeros
/// are trimmed but one fractional digit is kept, so `0` renders as `0.0`.
pub fn format_ether(wei: U256) -> String {
    let formatted = utils::format_ether(wei);
    let trimmed = formatted.trim_end_matches('0');

    match trimmed.strip_suffix('.') {
        Some(int_part) => format!("{}.0", int_part),
        None => trimmed.to_string(),
    }
}

/// Parse a non-negative ether amount such as `0.5` into wei.
pub fn parse_ether(ether: &str) -> Result<U256> {
    let ether = ether.trim();
    if ether.is_empty() || ether.starts_with('-') {
        return Err(Error::InvalidAmount(ether.to_string()))
    }

    utils::parse_ether(ether).map_err(|_| Error::InvalidAmount(ether.to_string()))
}

/// Parse a user-supplied NFT token id. Only plain decimal integers are accepted.
pub fn parse_token_id(input: &str) -> Result<U256> {
    let input = input.trim();
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::InvalidTokenId(input.to_string()))
    }

    U256::from_dec_str(input).map_err(|_| Error::InvalidTokenId(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ether_formatting() {
        assert_eq!(format_ether(U256::zero()), "0.0");
        assert_eq!(format_ether(U256::exp10(18)), "1.0");
        assert_eq!(format_ether(U256::exp10(19)), "10.0");
        assert_eq!(format_ether(U256::exp10(17) * 5), "0.5");
        assert_eq!(format_ether(U256::from(1u64)), "0.000000000000000001");
        assert_eq!(format_ether(U256::from_dec_str("12345600000000000000").unwrap()), "12.3456");
    }

    #[test]
    fn ether_parsing() {
        assert_eq!(parse_ether("0.5").unwrap(), U256::exp10(17) * 5);
        assert_eq!(parse_ether("1").unwrap(), U256::exp10(18));
        assert_eq!(parse_ether(" 0.1 ").unwrap(), U256::exp10(17));
        assert!(parse_ether("").is_err());
        assert!(parse_ether("1.2.3").is_err());
        assert!(parse_ether("-1").is_err());
        assert!(parse_ether("0.0000000000000000001").is_err());
    }

    #[test]
    fn token_id_parsing() {
        assert_eq!(parse_token_id("42").unwrap(), U256::from(42u64));
        assert_eq!(parse_token_id(" 7 ").unwrap(), U256::from(7u64));
        assert!(parse_token_id("").is_err());
        assert!(parse_token_id("0x2a").is_err());
        assert!(parse_token_id("-1").is_err());
        assert!(parse_token_id("1e3").is_err());
    }
}

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

use ethers::types::{Address, U256};

use super::{
    abi::{nft_abi, NFT_FN_BALANCE_OF, NFT_REQUIRED_FNS},
    BoundContract,
};
use crate::{provider::ProviderOrSigner, Result};

/// Typed handle to the CryptoDevs NFT contract.
#[derive(Clone)]
pub struct NftHandle {
    inner: BoundContract,
}

impl NftHandle {
    pub fn new(address: Address, client: ProviderOrSigner) -> Result<Self> {
        let inner = BoundContract::new("NFT", address, nft_abi()?, &NFT_REQUIRED_FNS, client)?;
        Ok(Self { inner })
    }

    pub async fn balance_of(&self, owner: Address) -> Result<U256> {
        self.inner.call(NFT_FN_BALANCE_OF, owner).await
    }
}

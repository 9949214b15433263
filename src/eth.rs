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

//! ethers-backed implementations of the chain seams in [`crate::provider`].
//! The HTTP transport needs a tokio runtime to be driving the futures.

use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    abi::{self, ParamType, Token},
    middleware::SignerMiddleware,
    providers::{
        Http, JsonRpcError, Middleware, MiddlewareError, PendingTransaction, Provider, RpcError,
    },
    signers::{LocalWallet, Signer},
    types::{
        transaction::eip2718::TypedTransaction, Address, BlockId, BlockNumber, Bytes,
        TransactionReceipt, TransactionRequest, TxHash, U256, U64,
    },
};
use log::{debug, info, warn};

use crate::{
    provider::{ReadProvider, TxSigner, WalletConnector, WalletHandle},
    Error, Result,
};

/// Selector of Solidity's `Error(string)`.
const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Prefix nodes put in front of revert reasons.
const EXECUTION_REVERTED: &str = "execution reverted";

/// Signing middleware stack used for transactions and deployments.
pub type EthClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Extract a human-readable revert reason from a JSON-RPC error.
pub fn revert_reason(err: &JsonRpcError) -> Option<String> {
    if let Some(data) = err.data.as_ref().and_then(|d| d.as_str()) {
        if let Some(reason) = decode_revert_data(data) {
            return Some(reason)
        }
    }

    let msg = err.message.trim();
    if let Some(reason) = msg.strip_prefix(EXECUTION_REVERTED) {
        let reason = reason.trim_start_matches(':').trim();
        if reason.is_empty() {
            return Some(EXECUTION_REVERTED.to_string())
        }
        return Some(reason.to_string())
    }

    None
}

/// Decode hex-encoded `Error(string)` revert data.
pub fn decode_revert_data(data: &str) -> Option<String> {
    let bytes: Bytes = data.parse().ok()?;
    let payload = bytes.strip_prefix(&ERROR_STRING_SELECTOR[..])?;

    match abi::decode(&[ParamType::String], payload).ok()?.pop()? {
        Token::String(reason) => Some(reason),
        _ => None,
    }
}

fn provider_err(err: impl std::fmt::Display) -> Error {
    Error::ProviderError(err.to_string())
}

/// Read-only provider over HTTP JSON-RPC.
#[derive(Clone, Debug)]
pub struct EthProvider {
    inner: Provider<Http>,
}

impl EthProvider {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let inner = Provider::<Http>::try_from(rpc_url)?;
        Ok(Self { inner })
    }

    /// Replay a reverted transaction at its block to learn the reason.
    async fn replay_revert(&self, tx_hash: TxHash, receipt: &TransactionReceipt) -> String {
        let fallback = || EXECUTION_REVERTED.to_string();

        let tx = match self.inner.get_transaction(tx_hash).await {
            Ok(Some(tx)) => tx,
            _ => return fallback(),
        };

        let mut req = TransactionRequest::new().from(tx.from).data(tx.input).value(tx.value);
        if let Some(to) = tx.to {
            req = req.to(to);
        }
        let req: TypedTransaction = req.into();
        let block = receipt.block_number.map(|n| BlockId::Number(BlockNumber::Number(n)));

        match self.inner.call(&req, block).await {
            Ok(_) => fallback(),
            Err(e) => {
                RpcError::as_error_response(&e).and_then(revert_reason).unwrap_or_else(fallback)
            }
        }
    }
}

#[async_trait]
impl ReadProvider for EthProvider {
    async fn chain_id(&self) -> Result<u64> {
        let id = self.inner.get_chainid().await.map_err(provider_err)?;
        if id > U256::from(u64::MAX) {
            return Err(Error::ParseFailed("chain id does not fit in u64"))
        }
        Ok(id.as_u64())
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.inner.get_balance(address, None).await.map_err(provider_err)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();

        match self.inner.call(&tx, None).await {
            Ok(out) => Ok(out),
            Err(e) => match RpcError::as_error_response(&e).and_then(revert_reason) {
                Some(reason) => Err(Error::ContractCallFailed(reason)),
                None => Err(provider_err(e)),
            },
        }
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<()> {
        debug!(target: "dao::eth", "Waiting for {:?}", tx_hash);

        let receipt = PendingTransaction::new(tx_hash, &self.inner)
            .await
            .map_err(provider_err)?
            .ok_or_else(|| {
                Error::TransactionFailed(format!("{:?} was dropped from the mempool", tx_hash))
            })?;

        if receipt.status == Some(U64::from(1)) {
            debug!(target: "dao::eth", "{:?} mined in block {:?}", tx_hash, receipt.block_number);
            return Ok(())
        }

        let reason = self.replay_revert(tx_hash, &receipt).await;
        warn!(target: "dao::eth", "{:?} reverted: {}", tx_hash, reason);
        Err(Error::TransactionReverted(reason))
    }
}

/// Signing handle backed by a local private key.
#[derive(Clone, Debug)]
pub struct EthSigner {
    reader: EthProvider,
    client: Arc<EthClient>,
}

impl EthSigner {
    pub fn new(reader: EthProvider, wallet: LocalWallet) -> Self {
        let client = Arc::new(SignerMiddleware::new(reader.inner.clone(), wallet));
        Self { reader, client }
    }

    /// Broadcast `tx`, mapping node-side rejections to our errors.
    async fn submit(&self, tx: TypedTransaction) -> Result<TxHash> {
        match self.client.send_transaction(tx, None).await {
            Ok(pending) => Ok(*pending),
            Err(e) => match MiddlewareError::as_error_response(&e).and_then(revert_reason) {
                Some(reason) => Err(Error::TransactionReverted(reason)),
                None => Err(Error::TransactionFailed(e.to_string())),
            },
        }
    }

    /// The signing middleware, for contract factories.
    pub fn client(&self) -> Arc<EthClient> {
        self.client.clone()
    }
}

#[async_trait]
impl ReadProvider for EthSigner {
    async fn chain_id(&self) -> Result<u64> {
        self.reader.chain_id().await
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.reader.get_balance(address).await
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        self.reader.call(to, data).await
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<()> {
        self.reader.wait_for_receipt(tx_hash).await
    }
}

#[async_trait]
impl TxSigner for EthSigner {
    fn address(&self) -> Address {
        self.client.address()
    }

    fn as_reader(&self) -> &dyn ReadProvider {
        &self.reader
    }

    async fn send_transaction(&self, to: Address, data: Bytes, value: U256) -> Result<TxHash> {
        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).value(value).into();
        let tx_hash = self.submit(tx).await?;
        debug!(target: "dao::eth", "Submitted {:?}", tx_hash);
        Ok(tx_hash)
    }
}

/// Parse a hex private key into a wallet bound to `chain_id`.
pub fn load_wallet(private_key: &str, chain_id: u64) -> Result<LocalWallet> {
    let key = private_key.trim();
    let key = key.strip_prefix("0x").unwrap_or(key);
    let wallet: LocalWallet =
        key.parse().map_err(|_| Error::WalletRejected("unusable private key".to_string()))?;
    Ok(wallet.with_chain_id(chain_id))
}

/// Connects to a JSON-RPC endpoint with a locally held private key.
/// A missing key counts as the user declining the connection.
#[derive(Clone, Debug)]
pub struct LocalWalletConnector {
    rpc_url: String,
    private_key: Option<String>,
}

impl LocalWalletConnector {
    pub fn new(rpc_url: String, private_key: Option<String>) -> Self {
        Self { rpc_url, private_key }
    }

    /// Connect and return the concrete signer, for callers that need more
    /// than the [`TxSigner`] surface.
    pub async fn connect_signer(&self) -> Result<EthSigner> {
        let Some(private_key) = self.private_key.as_deref().filter(|k| !k.trim().is_empty())
        else {
            return Err(Error::WalletRejected("no private key configured".to_string()))
        };

        let provider = EthProvider::new(&self.rpc_url)?;
        let chain_id = provider.chain_id().await?;
        let wallet = load_wallet(private_key, chain_id)?;

        info!(target: "dao::eth", "Connected {:?} on chain {}", wallet.address(), chain_id);
        Ok(EthSigner::new(provider, wallet))
    }
}

#[async_trait]
impl WalletConnector for LocalWalletConnector {
    async fn connect(&self) -> Result<WalletHandle> {
        let signer = self.connect_signer().await?;
        let provider = Arc::new(signer.reader.clone());
        Ok(WalletHandle { provider, signer: Arc::new(signer) })
    }
}

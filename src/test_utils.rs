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

//! In-memory chain for tests. Calldata is decoded with the real contract
//! interfaces and run against a small emulation of the DAO and NFT
//! contracts, so the handles, session and view model are exercised
//! exactly as they would be against a node.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use async_trait::async_trait;
use ethers::{
    abi::{self, Abi, Token},
    types::{Address, Bytes, TxHash, U256},
    utils,
};

use crate::{
    contract::{
        abi::{dao_abi, nft_abi},
        ContractAddresses,
    },
    deploy::{Artifact, ContractDeployer},
    model::RawProposal,
    provider::{ReadProvider, TxSigner, WalletConnector, WalletHandle},
    Error, Result,
};

/// Voting window of a new proposal, in seconds.
pub const VOTING_PERIOD: u64 = 5 * 60;

/// Price the fake marketplace charges for any NFT, in ether.
pub const NFT_PRICE: &str = "0.1";

/// Starting block time of a fresh chain.
pub const GENESIS_TIME: u64 = 1_700_000_000;

pub const REVERT_NOT_A_MEMBER: &str = "NOT_A_DAO_MEMBER";
pub const REVERT_DEADLINE_EXCEEDED: &str = "DEADLINE_EXCEEDED";
pub const REVERT_ALREADY_VOTED: &str = "ALREADY_VOTED";
pub const REVERT_DEADLINE_NOT_EXCEEDED: &str = "DEADLINE_NOT_EXCEEDED";
pub const REVERT_ALREADY_EXECUTED: &str = "PROPOSAL_ALREADY_EXECUTED";
pub const REVERT_NOT_ENOUGH_FUNDS: &str = "NOT_ENOUGH_FUNDS";
pub const REVERT_NOT_OWNER: &str = "Ownable: caller is not the owner";
pub const REVERT_NOTHING_TO_WITHDRAW: &str = "Nothing to withdraw, contract balance empty";

struct MockProposal {
    raw: RawProposal,
    voters: HashSet<Address>,
}

struct ChainState {
    chain_id: u64,
    now: u64,
    owner: Address,
    treasury: U256,
    nft_balances: HashMap<Address, u64>,
    proposals: Vec<MockProposal>,
    /// Mined transactions and their revert reason, if any
    receipts: HashMap<TxHash, Option<String>>,
    next_account: u64,
    next_tx: u64,
    calls: HashMap<String, usize>,
    failing_proposal: Option<u64>,
    failing_reads: bool,
    /// When set, confirmations wait for a message on this channel
    confirm_gate: Option<smol::channel::Receiver<()>>,
}

fn proposal_index(id: &U256, len: usize) -> Option<usize> {
    if *id < U256::from(len) {
        return Some(id.as_usize())
    }
    None
}

/// Shared in-memory chain. Clones see the same state.
#[derive(Clone)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
    addresses: ContractAddresses,
    dao_abi: Abi,
    nft_abi: Abi,
}

impl MockChain {
    /// Fresh chain with the given id. The DAO owner holds no NFTs and the
    /// treasury is empty.
    pub fn new(chain_id: u64) -> Self {
        let state = ChainState {
            chain_id,
            now: GENESIS_TIME,
            owner: Address::from_low_u64_be(0x1000),
            treasury: U256::zero(),
            nft_balances: HashMap::new(),
            proposals: vec![],
            receipts: HashMap::new(),
            next_account: 0x1001,
            next_tx: 1,
            calls: HashMap::new(),
            failing_proposal: None,
            failing_reads: false,
            confirm_gate: None,
        };

        let addresses = ContractAddresses {
            dao: Address::from_low_u64_be(0xda0),
            nft: Address::from_low_u64_be(0xaf7),
        };

        Self {
            state: Arc::new(Mutex::new(state)),
            addresses,
            dao_abi: dao_abi().unwrap(),
            nft_abi: nft_abi().unwrap(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap()
    }

    pub fn addresses(&self) -> ContractAddresses {
        self.addresses
    }

    pub fn owner(&self) -> Address {
        self.lock().owner
    }

    /// A new account holding `nfts` governance NFTs.
    pub fn member(&self, nfts: u64) -> Address {
        let mut state = self.lock();
        let account = Address::from_low_u64_be(state.next_account);
        state.next_account += 1;
        state.nft_balances.insert(account, nfts);
        account
    }

    pub fn set_chain_id(&self, chain_id: u64) {
        self.lock().chain_id = chain_id;
    }

    pub fn now(&self) -> u64 {
        self.lock().now
    }

    pub fn advance(&self, secs: u64) {
        self.lock().now += secs;
    }

    pub fn treasury(&self) -> U256 {
        self.lock().treasury
    }

    pub fn set_treasury(&self, amount: U256) {
        self.lock().treasury = amount;
    }

    /// Insert a proposal directly into contract storage.
    pub fn add_proposal(&self, raw: RawProposal) -> u64 {
        let mut state = self.lock();
        state.proposals.push(MockProposal { raw, voters: HashSet::new() });
        state.proposals.len() as u64 - 1
    }

    pub fn proposal(&self, id: u64) -> Option<RawProposal> {
        self.lock().proposals.get(id as usize).map(|p| p.raw.clone())
    }

    /// Make reads of one proposal id fail.
    pub fn fail_proposal(&self, id: Option<u64>) {
        self.lock().failing_proposal = id;
    }

    /// Make every read fail.
    pub fn fail_reads(&self, fail: bool) {
        self.lock().failing_reads = fail;
    }

    /// Hold every confirmation until a message is sent on the returned
    /// channel, one message per confirmation.
    pub fn hold_confirmations(&self) -> smol::channel::Sender<()> {
        let (tx, rx) = smol::channel::unbounded();
        self.lock().confirm_gate = Some(rx);
        tx
    }

    /// How many times `func` was called or sent. The native balance query
    /// counts as `getBalance`.
    pub fn calls(&self, func: &str) -> usize {
        self.lock().calls.get(func).copied().unwrap_or(0)
    }

    pub fn reset_calls(&self) {
        self.lock().calls.clear();
    }

    /// Read-only provider over this chain.
    pub fn provider(&self) -> Arc<dyn ReadProvider> {
        Arc::new(self.clone())
    }

    /// Signer sending from `account`.
    pub fn signer(&self, account: Address) -> Arc<dyn TxSigner> {
        Arc::new(MockSigner { chain: self.clone(), account })
    }

    fn count(state: &mut ChainState, func: &str) {
        *state.calls.entry(func.to_string()).or_default() += 1;
    }

    fn decode(&self, to: Address, data: &[u8]) -> Result<(String, Vec<Token>)> {
        let abi = match to {
            a if a == self.addresses.dao => &self.dao_abi,
            a if a == self.addresses.nft => &self.nft_abi,
            _ => return Err(Error::ProviderError(format!("no contract at {:?}", to))),
        };

        if data.len() < 4 {
            return Err(Error::ProviderError("calldata too short".to_string()))
        }

        let function = abi
            .functions()
            .find(|f| f.short_signature() == data[..4])
            .ok_or_else(|| Error::ContractCallFailed("unknown selector".to_string()))?;

        let args = function.decode_input(&data[4..])?;
        Ok((function.name.clone(), args))
    }

    fn view(&self, func: &str, args: &[Token]) -> Result<Vec<Token>> {
        let mut state = self.lock();
        Self::count(&mut state, func);

        if state.failing_reads {
            return Err(Error::ProviderError("connection refused".to_string()))
        }

        let out = match (func, args) {
            ("owner", []) => vec![Token::Address(state.owner)],
            ("getNumProposals", []) => vec![Token::Uint(state.proposals.len().into())],
            ("proposals", [Token::Uint(id)]) => {
                if state.failing_proposal.map(U256::from) == Some(*id) {
                    return Err(Error::ProviderError(format!("timeout reading proposal {}", id)))
                }

                // Unset mapping entries read as zeroes
                let raw = match proposal_index(id, state.proposals.len()) {
                    Some(i) => state.proposals[i].raw.clone(),
                    None => RawProposal {
                        nft_token_id: U256::zero(),
                        deadline: U256::zero(),
                        yay_votes: U256::zero(),
                        nay_votes: U256::zero(),
                        executed: false,
                    },
                };

                vec![
                    Token::Uint(raw.nft_token_id),
                    Token::Uint(raw.deadline),
                    Token::Uint(raw.yay_votes),
                    Token::Uint(raw.nay_votes),
                    Token::Bool(raw.executed),
                ]
            }
            ("balanceOf", [Token::Address(owner)]) => {
                let nfts = state.nft_balances.get(owner).copied().unwrap_or(0);
                vec![Token::Uint(nfts.into())]
            }
            _ => return Err(Error::ContractCallFailed(format!("unsupported call {}", func))),
        };

        Ok(out)
    }

    /// Run a state-changing call. `Err` carries the revert reason.
    fn execute(
        state: &mut ChainState,
        from: Address,
        func: &str,
        args: &[Token],
    ) -> std::result::Result<(), String> {
        let nfts = state.nft_balances.get(&from).copied().unwrap_or(0);
        let now = state.now;

        match (func, args) {
            ("createProposal", [Token::Uint(nft_token_id)]) => {
                if nfts == 0 {
                    return Err(REVERT_NOT_A_MEMBER.to_string())
                }
                let raw = RawProposal {
                    nft_token_id: *nft_token_id,
                    deadline: U256::from(now + VOTING_PERIOD),
                    yay_votes: U256::zero(),
                    nay_votes: U256::zero(),
                    executed: false,
                };
                state.proposals.push(MockProposal { raw, voters: HashSet::new() });
                Ok(())
            }

            ("voteOnProposal", [Token::Uint(id), Token::Uint(vote)]) => {
                if nfts == 0 {
                    return Err(REVERT_NOT_A_MEMBER.to_string())
                }
                let i = proposal_index(id, state.proposals.len())
                    .ok_or_else(|| REVERT_DEADLINE_EXCEEDED.to_string())?;
                let proposal = &mut state.proposals[i];
                if proposal.raw.deadline <= U256::from(now) {
                    return Err(REVERT_DEADLINE_EXCEEDED.to_string())
                }
                if !proposal.voters.insert(from) {
                    return Err(REVERT_ALREADY_VOTED.to_string())
                }
                match vote.as_u64() {
                    0 => proposal.raw.yay_votes += U256::from(nfts),
                    1 => proposal.raw.nay_votes += U256::from(nfts),
                    _ => return Err("invalid vote".to_string()),
                }
                Ok(())
            }

            ("executeProposal", [Token::Uint(id)]) => {
                let price = utils::parse_ether(NFT_PRICE).map_err(|e| e.to_string())?;
                if nfts == 0 {
                    return Err(REVERT_NOT_A_MEMBER.to_string())
                }
                let treasury = state.treasury;
                let i = proposal_index(id, state.proposals.len())
                    .ok_or_else(|| REVERT_DEADLINE_NOT_EXCEEDED.to_string())?;
                let proposal = &mut state.proposals[i];
                if proposal.raw.deadline > U256::from(now) {
                    return Err(REVERT_DEADLINE_NOT_EXCEEDED.to_string())
                }
                if proposal.raw.executed {
                    return Err(REVERT_ALREADY_EXECUTED.to_string())
                }
                let purchase = proposal.raw.yay_votes > proposal.raw.nay_votes;
                if purchase && treasury < price {
                    return Err(REVERT_NOT_ENOUGH_FUNDS.to_string())
                }
                proposal.raw.executed = true;
                if purchase {
                    state.treasury -= price;
                }
                Ok(())
            }

            ("withdrawEther", []) => {
                if from != state.owner {
                    return Err(REVERT_NOT_OWNER.to_string())
                }
                if state.treasury.is_zero() {
                    return Err(REVERT_NOTHING_TO_WITHDRAW.to_string())
                }
                state.treasury = U256::zero();
                Ok(())
            }

            _ => Err(format!("unsupported transaction {}", func)),
        }
    }

    fn transact(&self, from: Address, to: Address, data: &[u8]) -> Result<TxHash> {
        let (func, args) = self.decode(to, data)?;

        let mut state = self.lock();
        Self::count(&mut state, &func);

        let tx_hash = TxHash::from_low_u64_be(state.next_tx);
        state.next_tx += 1;

        // Mined right away; the outcome is reported on confirmation
        let outcome = Self::execute(&mut state, from, &func, &args).err();
        state.receipts.insert(tx_hash, outcome);

        Ok(tx_hash)
    }
}

#[async_trait]
impl ReadProvider for MockChain {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.lock().chain_id)
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        let mut state = self.lock();
        Self::count(&mut state, "getBalance");

        if state.failing_reads {
            return Err(Error::ProviderError("connection refused".to_string()))
        }

        if address == self.addresses.dao {
            return Ok(state.treasury)
        }
        Ok(U256::zero())
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let (func, args) = self.decode(to, &data)?;
        let out = self.view(&func, &args)?;
        Ok(Bytes::from(abi::encode(&out)))
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<()> {
        let gate = self.lock().confirm_gate.clone();
        if let Some(gate) = gate {
            let _ = gate.recv().await;
        }

        match self.lock().receipts.get(&tx_hash) {
            None => Err(Error::TransactionFailed(format!("unknown transaction {:?}", tx_hash))),
            Some(None) => Ok(()),
            Some(Some(reason)) => Err(Error::TransactionReverted(reason.clone())),
        }
    }
}

/// Signer over a [`MockChain`].
pub struct MockSigner {
    chain: MockChain,
    account: Address,
}

#[async_trait]
impl ReadProvider for MockSigner {
    async fn chain_id(&self) -> Result<u64> {
        self.chain.chain_id().await
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.chain.get_balance(address).await
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        self.chain.call(to, data).await
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<()> {
        self.chain.wait_for_receipt(tx_hash).await
    }
}

#[async_trait]
impl TxSigner for MockSigner {
    fn address(&self) -> Address {
        self.account
    }

    fn as_reader(&self) -> &dyn ReadProvider {
        &self.chain
    }

    async fn send_transaction(&self, to: Address, data: Bytes, _value: U256) -> Result<TxHash> {
        self.chain.transact(self.account, to, &data)
    }
}

/// Wallet that hands out a fixed account on a [`MockChain`] and counts
/// how often it was prompted.
pub struct MockConnector {
    chain: MockChain,
    account: Address,
    prompts: AtomicUsize,
    reject: AtomicBool,
}

impl MockConnector {
    pub fn new(chain: MockChain, account: Address) -> Self {
        Self { chain, account, prompts: AtomicUsize::new(0), reject: AtomicBool::new(false) }
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    /// Have the user decline subsequent prompts.
    pub fn set_reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl WalletConnector for MockConnector {
    async fn connect(&self) -> Result<WalletHandle> {
        self.prompts.fetch_add(1, Ordering::SeqCst);

        if self.reject.load(Ordering::SeqCst) {
            return Err(Error::WalletRejected("user rejected the request".to_string()))
        }

        Ok(WalletHandle {
            provider: self.chain.provider(),
            signer: self.chain.signer(self.account),
        })
    }
}

/// A recorded contract creation.
#[derive(Clone, Debug, PartialEq)]
pub struct DeployedContract {
    pub name: String,
    pub address: Address,
    pub args: Vec<Token>,
    pub value: U256,
}

/// Deployer that records creations instead of sending them.
#[derive(Default)]
pub struct MockDeployer {
    deployed: Mutex<Vec<DeployedContract>>,
    fail_on: Option<String>,
}

impl MockDeployer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail when asked to deploy `name`.
    pub fn failing_on(name: &str) -> Self {
        Self { deployed: Mutex::new(vec![]), fail_on: Some(name.to_string()) }
    }

    pub fn deployed(&self) -> Vec<DeployedContract> {
        self.deployed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContractDeployer for MockDeployer {
    async fn deploy(&self, artifact: &Artifact, args: Vec<Token>, value: U256) -> Result<Address> {
        let name = artifact.contract_name.as_str();
        if self.fail_on.as_deref() == Some(name) {
            return Err(Error::TransactionReverted(format!("{} constructor reverted", name)))
        }

        let mut deployed = self.deployed.lock().unwrap();
        let address = Address::from_low_u64_be(0xc0de + deployed.len() as u64);
        deployed.push(DeployedContract { name: name.to_string(), address, args, value });
        Ok(address)
    }
}

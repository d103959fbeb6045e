//! In-memory node and wallet.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use bulkmint_primitives::{
    BlockchainState, Bytes, Bytes32, Coin, CoinRecord, CoinSpend, PoolItem, SpendBundle,
    TransactionRecord,
};
use bulkmint_rpc::{
    AddressCodec, Addition, BundleRuntimeExt, MintBatchRequest, MintBatchResponse, NodeRpc,
    PushTxResponse, RpcError, WalletId, WalletRpc,
};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::{HexAddressCodec, LedgerConfig, LocalRuntime};

/// Puzzle hash every coin of `wallet_id` is locked to.
pub fn wallet_puzzle_hash(wallet_id: WalletId) -> Bytes32 {
    tagged_hash(b"wallet", &wallet_id.to_be_bytes())
}

/// Puzzle hash of the token numbered `series_number` minted to `owner`.
pub fn nft_puzzle_hash(owner: Bytes32, series_number: u64) -> Bytes32 {
    let mut data = owner.to_vec();
    data.extend_from_slice(&series_number.to_be_bytes());
    tagged_hash(b"nft", &data)
}

/// Pool id the ledger tracks a bundle under.
pub fn pool_tx_id(bundle_name: Bytes32) -> Bytes32 {
    tagged_hash(b"tx", bundle_name.as_slice())
}

fn tagged_hash(tag: &[u8], data: &[u8]) -> Bytes32 {
    let mut hasher = Sha256::new();
    hasher.update(tag);
    hasher.update(data);
    Bytes32::from_slice(&hasher.finalize())
}

/// Call counters of a [`LocalLedger`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedgerStats {
    /// `select_coins` calls.
    pub select_calls: u64,
    /// `mint_batch` calls.
    pub mint_calls: u64,
    /// `push_tx` calls, accepted or not.
    pub pushes: u64,
    /// Bundles confirmed.
    pub confirmed: u64,
}

#[derive(Debug)]
struct Pending {
    bundle: SpendBundle,
    additions: Vec<Coin>,
    item: PoolItem,
    polls_left: u32,
}

#[derive(Debug, Default)]
struct LedgerState {
    height: u32,
    coins: HashMap<Bytes32, CoinRecord>,
    pool: BTreeMap<Bytes32, Pending>,
    foreign: BTreeMap<Bytes32, PoolItem>,
    /// Authority successors minted so far, mapped to the lineage parent they expect.
    authority_successors: HashMap<Bytes32, Bytes32>,
    genesis_count: u64,
    reject_next_push: Option<String>,
    stats: LedgerStats,
}

impl LedgerState {
    fn pool_cost(&self) -> u64 {
        self.pool
            .values()
            .map(|p| &p.item)
            .chain(self.foreign.values())
            .fold(0u64, |total, item| total.saturating_add(item.cost))
    }

    fn pending_removals(&self) -> HashSet<Bytes32> {
        self.pool.values().flat_map(|p| p.bundle.removal_names()).collect()
    }

    fn is_unspent(&self, name: &Bytes32) -> bool {
        self.coins.get(name).is_some_and(|record| !record.spent)
    }

    fn create(&mut self, coin: Coin, coinbase: bool) {
        let record = CoinRecord {
            coin,
            confirmed_block_index: self.height,
            spent_block_index: 0,
            spent: false,
            coinbase,
            timestamp: u64::from(self.height),
        };
        self.coins.insert(coin.name(), record);
    }

    fn confirm(&mut self, tx_id: Bytes32) {
        let Some(pending) = self.pool.remove(&tx_id) else {
            return;
        };
        self.height += 1;
        for coin in pending.bundle.removals() {
            if let Some(record) = self.coins.get_mut(&coin.name()) {
                record.spent = true;
                record.spent_block_index = self.height;
            }
        }
        for coin in pending.additions {
            self.create(coin, false);
        }
        self.stats.confirmed += 1;
        tracing::debug!(
            bundle = %pending.item.spend_bundle_name,
            height = self.height,
            "Confirmed bundle"
        );
    }
}

/// An in-memory ledger serving both the node and the wallet interfaces.
///
/// Pushed bundles stay in the pool for [`LedgerConfig::polls_until_confirmed`] lookups by
/// tx id and are confirmed on the next one. Each wallet owns the coins locked to its
/// [`wallet_puzzle_hash`].
#[derive(Debug, Default)]
pub struct LocalLedger {
    config: LedgerConfig,
    runtime: LocalRuntime,
    codec: HexAddressCodec,
    state: Mutex<LedgerState>,
}

impl LocalLedger {
    /// Creates an empty ledger.
    pub fn new(config: LedgerConfig) -> Self {
        Self { config, ..Default::default() }
    }

    /// Returns the ledger configuration.
    pub const fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Creates a confirmed coin of `amount` owned by `wallet_id`.
    pub async fn fund(&self, wallet_id: WalletId, amount: u64) -> Coin {
        let mut state = self.state.lock().await;
        state.genesis_count += 1;
        let parent = tagged_hash(b"genesis", &state.genesis_count.to_be_bytes());
        let coin = Coin::new(parent, wallet_puzzle_hash(wallet_id), amount);
        state.create(coin, true);
        coin
    }

    /// Unspent coins owned by `wallet_id`, smallest first.
    pub async fn unspent_coins(&self, wallet_id: WalletId) -> Vec<Coin> {
        let state = self.state.lock().await;
        let puzzle_hash = wallet_puzzle_hash(wallet_id);
        let mut coins: Vec<Coin> = state
            .coins
            .values()
            .filter(|record| !record.spent && record.coin.puzzle_hash == puzzle_hash)
            .map(|record| record.coin)
            .collect();
        coins.sort_by_key(|coin| (coin.amount, coin.name()));
        coins
    }

    /// Returns the record of the coin named `name`.
    pub async fn coin_record(&self, name: Bytes32) -> Option<CoinRecord> {
        self.state.lock().await.coins.get(&name).cloned()
    }

    /// Number of bundles confirmed so far.
    pub async fn height(&self) -> u32 {
        self.state.lock().await.height
    }

    /// Returns the call counters.
    pub async fn stats(&self) -> LedgerStats {
        self.state.lock().await.stats
    }

    /// Adds a pool entry from another party. It is never confirmed.
    pub async fn inject_pool_item(&self, tx_id: Bytes32, item: PoolItem) {
        self.state.lock().await.foreign.insert(tx_id, item);
    }

    /// Makes the next `push_tx` fail with `reason`.
    pub async fn reject_next_push(&self, reason: impl Into<String>) {
        self.state.lock().await.reject_next_push = Some(reason.into());
    }

    /// Checks a pushed bundle against the ledger and prices it.
    fn admit(&self, state: &LedgerState, bundle: &SpendBundle) -> Result<Pending, String> {
        let pending_removals = state.pending_removals();
        let mut seen = HashSet::new();
        let mut spent_total = 0u64;
        for coin in bundle.removals() {
            let name = coin.name();
            if !seen.insert(name) || pending_removals.contains(&name) {
                return Err("DOUBLE_SPEND".into());
            }
            match state.coins.get(&name) {
                None => return Err("UNKNOWN_UNSPENT".into()),
                Some(record) if record.spent => return Err("DOUBLE_SPEND".into()),
                Some(_) => spent_total = spent_total.saturating_add(coin.amount),
            }
        }

        let expected = LocalRuntime::expected_signature(bundle.coin_spends.iter().map(|s| &s.coin));
        if bundle.aggregated_signature != expected {
            return Err("BAD_AGGREGATE_SIGNATURE".into());
        }

        let additions = self
            .runtime
            .bundle_additions(bundle)
            .map_err(|e| format!("GENERATOR_RUNTIME_ERROR: {e}"))?;
        let created = additions.iter().fold(0u64, |total, c| total.saturating_add(c.amount));
        if created > spent_total {
            return Err("MINTING_COIN".into());
        }
        let fee = spent_total - created;

        let cost = self
            .runtime
            .bundle_cost(bundle, self.config.block_max_cost)
            .map_err(|_| "BLOCK_COST_EXCEEDS_MAX".to_string())?;

        if state.pool_cost().saturating_add(cost) > self.config.mempool_max_total_cost {
            let lowest = state
                .pool
                .values()
                .map(|p| &p.item)
                .chain(state.foreign.values())
                .filter_map(PoolItem::fee_per_cost)
                .min();
            // A bundle with no cost has no rate to outbid the pool with.
            let rate = fee.checked_div(cost);
            if lowest.is_none_or(|lowest| rate.is_none_or(|rate| rate <= lowest)) {
                return Err("INVALID_FEE_LOW_FEE".into());
            }
        }

        Ok(Pending {
            bundle: bundle.clone(),
            additions,
            item: PoolItem { spend_bundle_name: bundle.name(), cost, fee },
            polls_left: self.config.polls_until_confirmed,
        })
    }

    /// Checks a mint request against the authority lineage seen so far and decodes its
    /// targets.
    fn check_mint(
        &self,
        state: &LedgerState,
        request: &MintBatchRequest,
    ) -> Result<Vec<Bytes32>, String> {
        if request.records.is_empty() {
            return Err("no records to mint".into());
        }
        if !request.targets.is_empty() && request.targets.len() != request.records.len() {
            return Err("targets do not match records".into());
        }
        if request.funding_coin.amount < request.records.len() as u64 {
            return Err(format!(
                "funding coin holds {} for {} tokens",
                request.funding_coin.amount,
                request.records.len()
            ));
        }
        if request.authority_coin.amount != 1 {
            return Err("authority coin amount must be 1".into());
        }

        let authority = request.authority_coin.name();
        match state.authority_successors.get(&authority) {
            Some(parent) if request.authority_lineage_parent != Some(*parent) => {
                return Err("authority lineage proof does not match".into());
            }
            Some(_) => {}
            None => {
                if !state.is_unspent(&authority) {
                    return Err(format!("unknown authority coin {authority}"));
                }
                if request.authority_coin.puzzle_hash != wallet_puzzle_hash(request.wallet_id) {
                    return Err(format!("authority coin not owned by wallet {}", request.wallet_id));
                }
                if request.authority_lineage_parent.is_some() {
                    return Err("authority lineage proof does not match".into());
                }
            }
        }

        if let Some(address) = &request.royalty_address {
            self.codec.decode_address(address).map_err(|e| e.to_string())?;
        }
        request
            .targets
            .iter()
            .map(|target| self.codec.decode_address(target).map_err(|e| e.to_string()))
            .collect()
    }
}

#[async_trait]
impl NodeRpc for LocalLedger {
    async fn get_all_mempool_items(&self) -> Result<BTreeMap<Bytes32, PoolItem>, RpcError> {
        let state = self.state.lock().await;
        let mut items: BTreeMap<Bytes32, PoolItem> =
            state.pool.iter().map(|(tx_id, p)| (*tx_id, p.item.clone())).collect();
        items.extend(state.foreign.iter().map(|(tx_id, item)| (*tx_id, item.clone())));
        Ok(items)
    }

    async fn get_mempool_item_by_tx_id(&self, tx_id: Bytes32) -> Result<Option<PoolItem>, RpcError> {
        let mut state = self.state.lock().await;
        if let Some(item) = state.foreign.get(&tx_id) {
            return Ok(Some(item.clone()));
        }
        let Some(pending) = state.pool.get_mut(&tx_id) else {
            return Ok(None);
        };
        if pending.polls_left > 0 {
            pending.polls_left -= 1;
            return Ok(Some(pending.item.clone()));
        }
        state.confirm(tx_id);
        Ok(None)
    }

    async fn push_tx(&self, bundle: &SpendBundle) -> Result<PushTxResponse, RpcError> {
        let mut state = self.state.lock().await;
        state.stats.pushes += 1;
        if let Some(reason) = state.reject_next_push.take() {
            return Ok(PushTxResponse::rejected(reason));
        }

        let tx_id = pool_tx_id(bundle.name());
        if state.pool.contains_key(&tx_id) {
            return Ok(PushTxResponse::accepted());
        }

        match self.admit(&state, bundle) {
            Ok(pending) => {
                tracing::debug!(
                    bundle = %pending.item.spend_bundle_name,
                    cost = pending.item.cost,
                    fee = pending.item.fee,
                    "Admitted bundle to pool"
                );
                state.pool.insert(tx_id, pending);
                Ok(PushTxResponse::accepted())
            }
            Err(reason) => {
                tracing::debug!(bundle = %bundle.name(), %reason, "Rejected bundle");
                Ok(PushTxResponse::rejected(reason))
            }
        }
    }

    async fn get_blockchain_state(&self) -> Result<BlockchainState, RpcError> {
        let state = self.state.lock().await;
        Ok(BlockchainState {
            block_max_cost: self.config.block_max_cost,
            mempool_max_total_cost: self.config.mempool_max_total_cost,
            mempool_cost: state.pool_cost(),
        })
    }

    async fn get_coin_record_by_name(&self, name: Bytes32) -> Result<Option<CoinRecord>, RpcError> {
        Ok(self.state.lock().await.coins.get(&name).cloned())
    }
}

#[async_trait]
impl WalletRpc for LocalLedger {
    async fn select_coins(
        &self,
        amount: u64,
        wallet_id: WalletId,
        exclude: &[Coin],
    ) -> Result<Vec<Coin>, RpcError> {
        let mut state = self.state.lock().await;
        state.stats.select_calls += 1;

        let puzzle_hash = wallet_puzzle_hash(wallet_id);
        let excluded: HashSet<Bytes32> =
            exclude.iter().map(Coin::name).chain(state.pending_removals()).collect();
        let mut candidates: Vec<Coin> = state
            .coins
            .values()
            .filter(|r| !r.spent && r.coin.puzzle_hash == puzzle_hash)
            .map(|r| r.coin)
            .filter(|coin| !excluded.contains(&coin.name()))
            .collect();
        candidates.sort_by_key(|coin| (coin.amount, coin.name()));

        if let Some(coin) = candidates.iter().find(|coin| coin.amount >= amount) {
            return Ok(vec![*coin]);
        }

        let mut selected = Vec::new();
        let mut total = 0u64;
        for coin in candidates.iter().rev() {
            if total >= amount {
                break;
            }
            total = total.saturating_add(coin.amount);
            selected.push(*coin);
        }
        if total < amount || selected.is_empty() {
            return Err(RpcError::Wallet(format!(
                "insufficient funds in wallet {wallet_id}: need {amount}, have {total}"
            )));
        }
        Ok(selected)
    }

    async fn get_next_address(&self, wallet_id: WalletId, _new_address: bool) -> Result<String, RpcError> {
        Ok(self.codec.encode_address(wallet_puzzle_hash(wallet_id)))
    }

    async fn create_signed_transaction(
        &self,
        additions: &[Addition],
        coins: &[Coin],
        fee: u64,
    ) -> Result<TransactionRecord, RpcError> {
        let state = self.state.lock().await;
        let Some(first) = coins.first() else {
            return Err(RpcError::Wallet("no coins to spend".into()));
        };
        if let Some(coin) = coins.iter().find(|coin| !state.is_unspent(&coin.name())) {
            return Err(RpcError::Wallet(format!("coin {} is not spendable", coin.name())));
        }

        let available = coins.iter().fold(0u64, |total, c| total.saturating_add(c.amount));
        let needed = additions
            .iter()
            .fold(fee, |total, addition| total.saturating_add(addition.amount));
        if available < needed {
            return Err(RpcError::Wallet(format!("coins hold {available}, need {needed}")));
        }

        let creates: Vec<(Bytes32, u64)> =
            additions.iter().map(|a| (a.puzzle_hash, a.amount)).collect();
        let spends = coins
            .iter()
            .enumerate()
            .map(|(i, coin)| {
                let solution =
                    if i == 0 { LocalRuntime::solution(&creates) } else { Bytes::new() };
                CoinSpend::new(*coin, Bytes::copy_from_slice(coin.puzzle_hash.as_slice()), solution)
            })
            .collect();
        let bundle = SpendBundle::new(spends, LocalRuntime::expected_signature(coins));

        Ok(TransactionRecord {
            name: bundle.name(),
            spend_bundle: Some(bundle),
            fee_amount: fee,
            additions: creates
                .iter()
                .map(|(puzzle_hash, amount)| Coin::new(first.name(), *puzzle_hash, *amount))
                .collect(),
            removals: coins.to_vec(),
        })
    }

    async fn mint_batch(&self, request: MintBatchRequest) -> Result<MintBatchResponse, RpcError> {
        let mut state = self.state.lock().await;
        state.stats.mint_calls += 1;

        let owners = match self.check_mint(&state, &request) {
            Ok(owners) => owners,
            Err(reason) => {
                tracing::debug!(%reason, "Refused mint batch");
                return Ok(MintBatchResponse::Failure { reason });
            }
        };

        let owner_default = wallet_puzzle_hash(request.wallet_id);
        let minted = request.records.len() as u64;
        let mut creates = Vec::with_capacity(request.records.len() + 1);
        let mut commitment = request.funding_coin.puzzle_hash.to_vec();
        for (i, record) in request.records.iter().enumerate() {
            let owner = owners.get(i).copied().unwrap_or(owner_default);
            creates.push((nft_puzzle_hash(owner, request.starting_num + i as u64), 1));
            commitment.extend_from_slice(record.hash.as_slice());
            commitment.extend_from_slice(record.meta_hash.as_slice());
            commitment.extend_from_slice(record.license_hash.as_slice());
        }
        creates.push((request.change_puzzle_hash, request.funding_coin.amount - minted));

        let authority = request.authority_coin;
        let spends = vec![
            CoinSpend::new(request.funding_coin, Bytes::from(commitment), LocalRuntime::solution(&creates)),
            CoinSpend::new(
                authority,
                Bytes::copy_from_slice(authority.puzzle_hash.as_slice()),
                LocalRuntime::solution(&[(authority.puzzle_hash, 1)]),
            ),
        ];
        let signature = LocalRuntime::expected_signature([&request.funding_coin, &authority]);
        let spend_bundle = SpendBundle::new(spends, signature);

        let successor = Coin::new(authority.name(), authority.puzzle_hash, 1);
        state.authority_successors.insert(successor.name(), authority.parent_coin_info);

        tracing::debug!(
            first = request.starting_num,
            count = minted,
            bundle = %spend_bundle.name(),
            "Built mint batch"
        );
        Ok(MintBatchResponse::Success { spend_bundle })
    }
}

//! Full mint runs against the in-memory ledger.

use std::sync::Arc;

use bulkmint_local::{HexAddressCodec, LedgerConfig, LocalLedger, LocalRuntime, wallet_puzzle_hash};
use bulkmint_minter::{MintError, MintRunner, MinterConfig, read_audit_trail};
use bulkmint_primitives::{Bytes32, Coin, MintRecord, PoolItem};
use bulkmint_rpc::{AddressCodec, BundleRuntimeExt, RpcError, WalletRpc};
use bulkmint_txmgr::{
    CancelHandle, CancelSignal, ConfirmationPolicy, FeeSource, Rejection, TxError, TxManagerConfig,
};
use tempfile::TempDir;

const FUNDING: u32 = 1;
const AUTHORITY: u32 = 2;

type LocalRunner = MintRunner<LocalLedger, LocalLedger, LocalRuntime, HexAddressCodec>;

fn records(n: usize) -> Vec<MintRecord> {
    (0..n)
        .map(|i| MintRecord {
            hash: Bytes32::with_last_byte(i as u8),
            uris: vec![format!("https://example.org/{i}.png")],
            meta_hash: Bytes32::repeat_byte(0x11),
            meta_uris: Vec::new(),
            license_hash: Bytes32::repeat_byte(0x22),
            license_uris: Vec::new(),
            series_number: i as u64 + 1,
            series_total: n as u64,
        })
        .collect()
}

/// Ledger with the given funding wallet coins and a single authority coin.
async fn ledger(funding: &[u64]) -> Arc<LocalLedger> {
    let ledger = Arc::new(LocalLedger::new(LedgerConfig::default()));
    for amount in funding {
        ledger.fund(FUNDING, *amount).await;
    }
    ledger.fund(AUTHORITY, 1).await;
    ledger
}

fn runner(ledger: &Arc<LocalLedger>, config: MinterConfig, tx_config: TxManagerConfig) -> LocalRunner {
    MintRunner::new(
        Arc::clone(ledger),
        Arc::clone(ledger),
        Arc::new(LocalRuntime),
        Arc::new(HexAddressCodec),
        config,
        tx_config,
    )
}

fn default_runner(ledger: &Arc<LocalLedger>) -> LocalRunner {
    runner(ledger, MinterConfig::default(), TxManagerConfig::default())
}

#[tokio::test(start_paused = true)]
async fn sixty_records_mint_in_three_batches() {
    let ledger = ledger(&[1_000, 50]).await;
    let mut runner = runner(
        &ledger,
        MinterConfig::default(),
        TxManagerConfig::builder().confirmation_policy(ConfirmationPolicy::VerifySpent).build(),
    );

    let batches = runner.build(&records(60), &[]).await.unwrap();
    assert_eq!(batches.iter().map(|b| b.range.clone()).collect::<Vec<_>>(), [0..25, 25..50, 50..60]);

    let receipts = runner.submit(&batches, &CancelSignal::never()).await.unwrap();
    assert_eq!(receipts.len(), 3);
    assert!(receipts.iter().enumerate().all(|(i, r)| r.batch_index == i));
    assert!(receipts.iter().all(|r| r.fee == 1 && r.fee_source == FeeSource::FreeCapacity));

    let funding = ledger.unspent_coins(FUNDING).await;
    assert!(funding.iter().any(|c| c.amount == 940), "{funding:?}");
    assert_eq!(funding.iter().map(|c| c.amount).sum::<u64>(), 940 + 47);

    let authority = ledger.unspent_coins(AUTHORITY).await;
    assert_eq!(authority.len(), 1);
    assert_eq!(authority[0].amount, 1);
    assert_eq!(ledger.stats().await.confirmed, 3);

    let metrics = runner.metrics();
    assert_eq!(metrics.batches_built, 3);
    assert_eq!(metrics.batches_confirmed, 3);
    assert_eq!(metrics.records_minted, 60);
    assert_eq!(metrics.total_fees, 3);
    assert_eq!(metrics.total_cost, receipts.iter().map(|r| r.cost).sum::<u64>());
}

#[tokio::test]
async fn each_batch_spends_what_the_previous_one_left() {
    let ledger = ledger(&[1_000]).await;
    let mut runner = default_runner(&ledger);
    let batches = runner.build(&records(60), &[]).await.unwrap();

    let funding_ph = wallet_puzzle_hash(FUNDING);
    let authority_ph = wallet_puzzle_hash(AUTHORITY);
    for pair in batches.windows(2) {
        let additions = LocalRuntime.bundle_additions(&pair[0].bundle).unwrap();
        let change: Vec<&Coin> = additions.iter().filter(|c| c.puzzle_hash == funding_ph).collect();
        let successor: Vec<&Coin> = additions.iter().filter(|c| c.puzzle_hash == authority_ph).collect();
        assert_eq!(change.len(), 1);
        assert_eq!(successor.len(), 1);
        assert_eq!(successor[0].amount, 1);

        let next_removals = pair[1].bundle.removal_names();
        assert!(next_removals.contains(&change[0].name()));
        assert!(next_removals.contains(&successor[0].name()));
    }

    let nfts: usize = batches
        .iter()
        .map(|b| LocalRuntime.bundle_additions(&b.bundle).unwrap().len() - 2)
        .sum();
    assert_eq!(nfts, 60);
    assert_eq!(ledger.stats().await.mint_calls, 3);
}

#[tokio::test]
async fn no_records_selects_nothing() {
    let ledger = ledger(&[1_000]).await;
    let mut runner = default_runner(&ledger);

    assert!(runner.build(&[], &[]).await.unwrap().is_empty());
    let stats = ledger.stats().await;
    assert_eq!(stats.select_calls, 0);
    assert_eq!(stats.mint_calls, 0);
}

#[tokio::test]
async fn funding_prefers_one_covering_coin() {
    let ledger = ledger(&[5, 100]).await;
    let mut runner = default_runner(&ledger);

    let batches = runner.build(&records(10), &[]).await.unwrap();
    assert_eq!(batches.len(), 1);
    let removals = batches[0].bundle.removals();
    assert!(removals.iter().any(|c| c.amount == 100));
    assert!(!removals.iter().any(|c| c.amount == 5));
}

#[tokio::test]
async fn several_small_coins_are_ambiguous() {
    let ledger = ledger(&[3, 4, 5]).await;
    let mut runner = default_runner(&ledger);

    let err = runner.build(&records(10), &[]).await.unwrap_err();
    assert_eq!(err, MintError::AmbiguousFunding { count: 3, amount: 10 });
    assert!(err.is_fatal());
    assert_eq!(ledger.stats().await.mint_calls, 0);
}

#[tokio::test]
async fn insufficient_funds_surface_as_rpc_errors() {
    let ledger = ledger(&[5]).await;
    let mut runner = default_runner(&ledger);

    let err = runner.build(&records(10), &[]).await.unwrap_err();
    assert!(matches!(err, MintError::Rpc(RpcError::Wallet(_))), "{err}");
}

#[tokio::test]
async fn partial_targets_are_rejected_before_selection() {
    let ledger = ledger(&[1_000]).await;
    let mut runner = default_runner(&ledger);

    let targets = vec![HexAddressCodec.encode_address(Bytes32::repeat_byte(9))];
    let err = runner.build(&records(3), &targets).await.unwrap_err();
    assert_eq!(err, MintError::TargetCountMismatch { records: 3, targets: 1 });
    assert_eq!(ledger.stats().await.select_calls, 0);
}

#[tokio::test]
async fn malformed_royalty_address_is_rejected() {
    let ledger = ledger(&[1_000]).await;
    let config = MinterConfig::builder()
        .royalty_address(Some("not-an-address".into()))
        .royalty_percentage(Some(300))
        .build();
    let mut runner = runner(&ledger, config, TxManagerConfig::default());

    let err = runner.build(&records(3), &[]).await.unwrap_err();
    assert!(matches!(err, MintError::InvalidAddress(_)), "{err}");
}

#[tokio::test(start_paused = true)]
async fn targets_receive_their_tokens() {
    let ledger = ledger(&[1_000, 50]).await;
    let mut runner = default_runner(&ledger);

    let owners: Vec<Bytes32> = (0..3).map(|i| Bytes32::repeat_byte(0x40 + i)).collect();
    let targets: Vec<String> = owners.iter().map(|ph| HexAddressCodec.encode_address(*ph)).collect();
    let batches = runner.build(&records(3), &targets).await.unwrap();
    runner.submit(&batches, &CancelSignal::never()).await.unwrap();

    let additions = LocalRuntime.bundle_additions(&batches[0].bundle).unwrap();
    for (i, owner) in owners.iter().enumerate() {
        let expected = bulkmint_local::nft_puzzle_hash(*owner, i as u64 + 1);
        let nft = additions.iter().find(|c| c.puzzle_hash == expected).unwrap();
        let record = ledger.coin_record(nft.name()).await.unwrap();
        assert!(!record.spent);
    }
}

#[tokio::test(start_paused = true)]
async fn fee_override_scales_with_cost() {
    let ledger = ledger(&[1_000, 1_000_000_000_000]).await;
    let mut runner = runner(
        &ledger,
        MinterConfig::default(),
        TxManagerConfig::builder().fee_per_cost(Some(5)).build(),
    );

    let receipts = runner.run(&records(30), &[], &CancelSignal::never()).await.unwrap();
    assert_eq!(receipts.len(), 2);
    for receipt in &receipts {
        assert_eq!(receipt.fee_source, FeeSource::Override);
        assert_eq!(receipt.fee, 5 * receipt.cost);
    }
    assert!(receipts[0].cost > receipts[1].cost);
}

#[tokio::test(start_paused = true)]
async fn congested_pool_prices_the_fee() {
    let ledger = Arc::new(LocalLedger::new(
        LedgerConfig::builder().block_max_cost(1_000_000_000).build(),
    ));
    ledger.fund(FUNDING, 1_000).await;
    ledger.fund(FUNDING, 1_000_000_000_000).await;
    ledger.fund(AUTHORITY, 1).await;
    ledger
        .inject_pool_item(
            Bytes32::repeat_byte(0xee),
            PoolItem {
                spend_bundle_name: Bytes32::repeat_byte(0xef),
                cost: 1_000_000_000,
                fee: 10_000_000_000,
            },
        )
        .await;
    let mut runner = default_runner(&ledger);

    let receipts = runner.run(&records(5), &[], &CancelSignal::never()).await.unwrap();
    assert_eq!(receipts[0].fee_source, FeeSource::Congested);
    assert_eq!(receipts[0].fee, 10 * receipts[0].cost);
}

#[tokio::test(start_paused = true)]
async fn audit_trail_holds_bundles_in_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bundles.bin");
    let ledger = ledger(&[1_000]).await;
    let config = MinterConfig::builder().chunk_size(10).output_path(Some(path.clone())).build();
    let mut runner = runner(&ledger, config, TxManagerConfig::default());

    let batches = runner.build(&records(25), &[]).await.unwrap();
    let trail = read_audit_trail(&path).unwrap();
    let bundles = trail.decode_bundles().unwrap();
    assert_eq!(bundles.len(), 3);
    for (batch, bundle) in batches.iter().zip(&bundles) {
        assert_eq!(&batch.bundle, bundle);
    }
}

#[tokio::test]
async fn failed_build_writes_no_trail() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bundles.bin");
    let ledger = ledger(&[3, 4, 5]).await;
    let config = MinterConfig::builder().output_path(Some(path.clone())).build();
    let mut runner = runner(&ledger, config, TxManagerConfig::default());

    assert!(runner.build(&records(10), &[]).await.is_err());
    assert!(!path.exists());
}

#[tokio::test(start_paused = true)]
async fn cancelled_run_stops_before_the_next_batch() {
    let ledger = ledger(&[1_000, 50]).await;
    let mut runner = default_runner(&ledger);
    let batches = runner.build(&records(60), &[]).await.unwrap();

    let handle = CancelHandle::new();
    handle.cancel();
    let err = runner.submit(&batches, &handle.signal()).await.unwrap_err();
    assert_eq!(err, MintError::Cancelled { batch: 0 });
    assert_eq!(ledger.stats().await.pushes, 0);
    assert_eq!(runner.metrics().batches_confirmed, 0);
}

#[tokio::test(start_paused = true)]
async fn rejection_stops_the_run_at_its_batch() {
    let ledger = ledger(&[1_000, 50]).await;
    let mut runner = default_runner(&ledger);
    let batches = runner.build(&records(60), &[]).await.unwrap();

    runner.submit(&batches[..1], &CancelSignal::never()).await.unwrap();
    ledger.reject_next_push("DOUBLE_SPEND").await;
    let err = runner.submit(&batches[1..], &CancelSignal::never()).await.unwrap_err();
    assert_eq!(
        err,
        MintError::Submission { batch: 1, source: TxError::SubmissionRejected(Rejection::DoubleSpend) }
    );
    assert_eq!(err.batch(), Some(1));
    assert_eq!(ledger.stats().await.confirmed, 1);
}

#[tokio::test]
async fn selection_excludes_coins_a_batch_spends() {
    let ledger = ledger(&[1_000, 50]).await;
    let mut runner = default_runner(&ledger);
    let batches = runner.build(&records(10), &[]).await.unwrap();

    let fee_coins = ledger.select_coins(1, FUNDING, &batches[0].bundle.removals()).await.unwrap();
    assert_eq!(fee_coins.len(), 1);
    assert_eq!(fee_coins[0].amount, 50);
}

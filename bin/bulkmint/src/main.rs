#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/bulkmint/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

use std::sync::Arc;

use bulkmint_cli::{Cli, cancel_on_ctrlc, init_tracing};
use bulkmint_local::{HexAddressCodec, LedgerConfig, LocalLedger, LocalRuntime, RecordSet};
use bulkmint_minter::MintRunner;
use bulkmint_primitives::Bytes32;
use clap::Parser;
use eyre::{Result, WrapErr};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    let set = RecordSet::from_file_as(&cli.records, cli.record_format())
        .wrap_err_with(|| format!("loading records from {}", cli.records.display()))?;
    tracing::info!(records = set.len(), targets = !set.targets.is_empty(), "Loaded records");

    let ledger = Arc::new(LocalLedger::new(LedgerConfig::default()));
    let funding = ledger.fund(cli.funding_wallet_id, cli.funding_amount).await;
    ledger.fund(cli.authority_wallet_id, 1).await;
    ledger.fund(cli.fee_wallet_id, cli.fee_amount).await;
    tracing::debug!(coin = %funding.name(), amount = funding.amount, "Seeded funding coin");

    let mut runner = MintRunner::new(
        Arc::clone(&ledger),
        Arc::clone(&ledger),
        Arc::new(LocalRuntime),
        Arc::new(HexAddressCodec),
        cli.minter_config(),
        cli.tx_config(),
    );

    let batches = runner.build(&set.records, &set.targets).await.wrap_err("building batches")?;
    if cli.build_only {
        for batch in &batches {
            println!("{} {:?} {}", batch.index, batch.range, batch.bundle.name());
        }
        return Ok(());
    }

    let cancel = cancel_on_ctrlc();
    let receipts = runner.submit(&batches, &cancel).await.wrap_err("submitting batches")?;
    for receipt in &receipts {
        println!(
            "batch {} confirmed: bundle {} cost {} fee {}",
            receipt.batch_index, receipt.bundle_name, receipt.cost, receipt.fee
        );
    }

    let metrics = runner.metrics();
    println!(
        "minted {} records in {} batches, fees {}, avg send {:.0}ms",
        metrics.records_minted,
        metrics.batches_confirmed,
        metrics.total_fees,
        metrics.avg_send_ms()
    );
    print_balance(&ledger, cli.funding_wallet_id).await;
    Ok(())
}

async fn print_balance(ledger: &LocalLedger, wallet_id: u32) {
    let coins = ledger.unspent_coins(wallet_id).await;
    let total: u64 = coins.iter().map(|c| c.amount).sum();
    let largest = coins.iter().max_by_key(|c| c.amount).map_or(Bytes32::ZERO, |c| c.name());
    println!("wallet {wallet_id}: {} coins, {total} total, largest {largest}", coins.len());
}

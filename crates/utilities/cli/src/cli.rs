use std::path::PathBuf;

use bulkmint_local::RecordFormat;
use bulkmint_minter::MinterConfig;
use bulkmint_txmgr::TxManagerConfig;
use clap::Parser;

use crate::{FormatArg, PolicyArg, format};

/// Bulk mint CLI arguments.
///
/// Records are read from a JSON file of the form `{"records": [...]}` or from CSV, chosen by
/// `--format` or the file extension; either every record carries a `target` address or none
/// does. The mint runs against an in-memory ledger whose
/// funding wallet is seeded with `--funding-amount`.
#[derive(Parser, Debug, Clone)]
#[command(name = "bulkmint", about = "Mint tokens in batches from a single funding coin")]
pub struct Cli {
    /// Verbosity level (-v INFO, -vv DEBUG, -vvv TRACE)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// JSON or CSV file holding the records to mint
    #[arg(short = 'r', long)]
    pub records: PathBuf,

    /// Records file format, detected from the extension when omitted
    #[arg(long)]
    pub format: Option<FormatArg>,

    /// Records per batch bundle
    #[arg(long, default_value = "25", value_parser = clap::value_parser!(u64).range(1..))]
    pub chunk_size: u64,

    /// Wallet holding the funding coin
    #[arg(long, default_value = "1")]
    pub funding_wallet_id: u32,

    /// Wallet holding the authority coin
    #[arg(long, default_value = "2")]
    pub authority_wallet_id: u32,

    /// Wallet paying the fees
    #[arg(long, default_value = "1")]
    pub fee_wallet_id: u32,

    /// Royalty address, used with --royalty-percentage
    #[arg(long, requires = "royalty_percentage")]
    pub royalty_address: Option<String>,

    /// Royalty in basis points
    #[arg(long, requires = "royalty_address", value_parser = clap::value_parser!(u16).range(0..=10_000))]
    pub royalty_percentage: Option<u16>,

    /// Fixed fee per cost unit instead of pricing against the pool
    #[arg(long)]
    pub fee_per_cost: Option<u64>,

    /// Fee paid when the pool is not congested
    #[arg(long, default_value = "1")]
    pub min_fee: u64,

    /// How bundles that left the pool are treated
    #[arg(long, default_value = "assume")]
    pub confirmation: PolicyArg,

    /// Audit trail file for the built bundles
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Build the bundles (and the audit trail) without submitting them
    #[arg(long)]
    pub build_only: bool,

    /// Value of the funding coin seeded into the local ledger
    #[arg(long, default_value = "1000000000000")]
    pub funding_amount: u64,

    /// Value of the fee coin seeded into the local ledger
    #[arg(long, default_value = "1000000000000")]
    pub fee_amount: u64,
}

impl Cli {
    /// Format of the records file.
    pub fn record_format(&self) -> RecordFormat {
        format::resolve(self.format, &self.records)
    }

    /// Minter configuration from the arguments.
    pub fn minter_config(&self) -> MinterConfig {
        MinterConfig::builder()
            .chunk_size(self.chunk_size as usize)
            .funding_wallet_id(self.funding_wallet_id)
            .authority_wallet_id(self.authority_wallet_id)
            .royalty_address(self.royalty_address.clone())
            .royalty_percentage(self.royalty_percentage)
            .output_path(self.output.clone())
            .build()
    }

    /// Transaction manager configuration from the arguments.
    pub fn tx_config(&self) -> TxManagerConfig {
        TxManagerConfig::builder()
            .min_fee(self.min_fee)
            .fee_per_cost(self.fee_per_cost)
            .fee_wallet_id(self.fee_wallet_id)
            .confirmation_policy(self.confirmation.into())
            .build()
    }
}

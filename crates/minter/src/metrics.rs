//! Mint run metrics.

use std::time::Duration;

use bulkmint_txmgr::TxReceipt;

/// Counters for a mint run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MintMetrics {
    /// Batch bundles built.
    pub batches_built: u64,
    /// Batch bundles confirmed.
    pub batches_confirmed: u64,
    /// Records covered by confirmed batches.
    pub records_minted: u64,
    /// Sum of confirmed batch costs.
    pub total_cost: u64,
    /// Sum of fees paid.
    pub total_fees: u64,
    /// Send durations in milliseconds, most recent last.
    send_latencies_ms: Vec<u64>,
}

impl MintMetrics {
    /// Maximum latency samples kept.
    const MAX_SAMPLES: usize = 100;

    /// Creates empty metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a confirmed batch covering `records` records.
    pub fn record_confirmed(&mut self, receipt: &TxReceipt, records: usize, elapsed: Duration) {
        self.batches_confirmed += 1;
        self.records_minted += records as u64;
        self.total_cost = self.total_cost.saturating_add(receipt.cost);
        self.total_fees = self.total_fees.saturating_add(receipt.fee);

        if self.send_latencies_ms.len() >= Self::MAX_SAMPLES {
            self.send_latencies_ms.remove(0);
        }
        self.send_latencies_ms.push(elapsed.as_millis().try_into().unwrap_or(u64::MAX));
    }

    /// Mean send duration in milliseconds.
    pub fn avg_send_ms(&self) -> f64 {
        if self.send_latencies_ms.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.send_latencies_ms.iter().sum();
        sum as f64 / self.send_latencies_ms.len() as f64
    }

    /// Mean fee per confirmed batch.
    pub fn avg_fee(&self) -> f64 {
        if self.batches_confirmed == 0 {
            return 0.0;
        }
        self.total_fees as f64 / self.batches_confirmed as f64
    }
}

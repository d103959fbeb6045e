//! Spend evaluation for the local ledger.
//!
//! A local solution is a list of 40-byte create entries, `puzzle_hash ‖ amount` with the
//! amount big-endian. Spending a coin creates one child per entry. Signatures are 32-byte
//! digests of the spent coin's name and aggregate by XOR, so any order of aggregation
//! yields the same signature.

use bulkmint_primitives::{Bytes, Bytes32, Coin, CoinSpend};
use bulkmint_rpc::{RuntimeError, SpendRuntime};
use sha2::{Digest, Sha256};

/// Width of one create entry in a solution.
pub const CREATE_ENTRY_LEN: usize = 40;

/// Width of a local signature.
pub const SIGNATURE_LEN: usize = 32;

/// Spend evaluator for the local ledger.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalRuntime;

impl LocalRuntime {
    /// Flat cost of evaluating any spend.
    pub const SPEND_COST: u64 = 200_000;
    /// Cost per byte of puzzle reveal and solution.
    pub const COST_PER_BYTE: u64 = 12_000;
    /// Cost per created coin.
    pub const CREATE_COIN_COST: u64 = 1_800_000;

    /// Encodes the coins a spend creates as a solution.
    pub fn solution(creates: &[(Bytes32, u64)]) -> Bytes {
        let mut out = Vec::with_capacity(creates.len() * CREATE_ENTRY_LEN);
        for (puzzle_hash, amount) in creates {
            out.extend_from_slice(puzzle_hash.as_slice());
            out.extend_from_slice(&amount.to_be_bytes());
        }
        Bytes::from(out)
    }

    /// Signature authorizing the spend of `coin`.
    pub fn sign(coin: &Coin) -> Bytes {
        let mut hasher = Sha256::new();
        hasher.update(b"sig");
        hasher.update(coin.name());
        Bytes::from(hasher.finalize().to_vec())
    }

    /// Aggregate signature a bundle spending `coins` must carry.
    pub fn expected_signature<'a>(coins: impl IntoIterator<Item = &'a Coin>) -> Bytes {
        let mut acc = [0u8; SIGNATURE_LEN];
        for coin in coins {
            xor_into(&mut acc, &Self::sign(coin));
        }
        Bytes::from(acc.to_vec())
    }

    fn creates(solution: &Bytes) -> Result<Vec<(Bytes32, u64)>, String> {
        if solution.len() % CREATE_ENTRY_LEN != 0 {
            return Err(format!("solution length {} is not a multiple of 40", solution.len()));
        }
        Ok(solution
            .chunks_exact(CREATE_ENTRY_LEN)
            .map(|entry| {
                let mut amount = [0u8; 8];
                amount.copy_from_slice(&entry[32..]);
                (Bytes32::from_slice(&entry[..32]), u64::from_be_bytes(amount))
            })
            .collect())
    }
}

impl SpendRuntime for LocalRuntime {
    fn cost(&self, puzzle_reveal: &Bytes, solution: &Bytes, max_cost: u64) -> Result<u64, RuntimeError> {
        let failed = |reason: String| RuntimeError::SpendFailed { coin: "unknown".into(), reason };

        let creates = Self::creates(solution).map_err(failed)?;
        let bytes = (puzzle_reveal.len() + solution.len()) as u64;
        let cost = Self::SPEND_COST
            .saturating_add(bytes.saturating_mul(Self::COST_PER_BYTE))
            .saturating_add((creates.len() as u64).saturating_mul(Self::CREATE_COIN_COST));
        if cost > max_cost {
            return Err(failed(format!("cost {cost} exceeds {max_cost}")));
        }
        Ok(cost)
    }

    fn additions(&self, spend: &CoinSpend) -> Result<Vec<Coin>, RuntimeError> {
        let parent = spend.coin.name();
        let creates = Self::creates(&spend.solution)
            .map_err(|reason| RuntimeError::SpendFailed { coin: parent.to_string(), reason })?;
        Ok(creates.into_iter().map(|(puzzle_hash, amount)| Coin::new(parent, puzzle_hash, amount)).collect())
    }

    fn aggregate_signatures(&self, signatures: &[Bytes]) -> Result<Bytes, RuntimeError> {
        let mut acc = [0u8; SIGNATURE_LEN];
        for signature in signatures {
            if signature.len() != SIGNATURE_LEN {
                return Err(RuntimeError::Signature(format!(
                    "expected {SIGNATURE_LEN} bytes, got {}",
                    signature.len()
                )));
            }
            xor_into(&mut acc, signature);
        }
        Ok(Bytes::from(acc.to_vec()))
    }
}

fn xor_into(acc: &mut [u8; SIGNATURE_LEN], signature: &[u8]) {
    for (a, b) in acc.iter_mut().zip(signature) {
        *a ^= b;
    }
}

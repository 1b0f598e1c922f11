use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub mod constants;
pub mod error;
pub mod factory;
pub mod service;
pub mod store;
pub mod validate;

pub use error::{ChainFault, LedgerError, Rejection};
pub use factory::{Clock, FixedClock, SystemClock};
pub use service::{Head, LedgerService, Outcome, Submission};
pub use store::LedgerStore;

/// One ledger entry. Blocks are never edited after construction; the fields
/// are public so callers can read them and serialize them as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: String,
    pub amount: i64,
    pub hash: String,
    #[serde(rename = "prevHash")]
    pub prev_hash: String,
}

impl Block {
    /// Recompute the fingerprint from this block's own fields.
    pub fn compute_hash(&self) -> String {
        fingerprint(self.index, &self.timestamp, self.amount, &self.prev_hash)
    }

    pub fn is_genesis(&self) -> bool {
        self.index == constants::GENESIS_INDEX && self.prev_hash == constants::GENESIS_PREV_HASH
    }
}

/// The exact preimage fed to SHA-256: index, timestamp, amount and prev hash
/// concatenated in that order with no separators. Integers are written in
/// base 10 (negative amounts keep their leading `-`).
pub fn hash_input(index: u64, timestamp: &str, amount: i64, prev_hash: &str) -> String {
    let mut input = String::with_capacity(20 + timestamp.len() + 20 + prev_hash.len());
    input.push_str(&index.to_string());
    input.push_str(timestamp);
    input.push_str(&amount.to_string());
    input.push_str(prev_hash);
    input
}

/// Lowercase hex SHA-256 over [`hash_input`].
pub fn fingerprint(index: u64, timestamp: &str, amount: i64, prev_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(hash_input(index, timestamp, amount, prev_hash).as_bytes());
    hex::encode(hasher.finalize())
}

use thiserror::Error;

/// Failures that stop a request from producing a block at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("clock unavailable: {0}")]
    ClockUnavailable(String),

    #[error("ledger not ready: no genesis block")]
    LedgerNotReady,
}

/// Why a candidate block was not appended. This is an ordinary outcome, not
/// a failure of the ledger.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("index {found} does not follow predecessor index {previous}")]
    IndexDiscontinuity { previous: u64, found: u64 },

    #[error("prevHash does not match the predecessor's hash")]
    PrevHashMismatch,

    #[error("hash does not match the block contents")]
    HashMismatch,

    #[error("no predecessor block to link against")]
    MissingPredecessor,
}

/// Result of auditing a whole chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainFault {
    #[error("chain is empty")]
    Empty,

    #[error("first block is not a genesis block (index 0, empty prevHash)")]
    BadGenesis,

    #[error("block at position {position} rejected: {reason}")]
    Broken { position: usize, reason: Rejection },
}

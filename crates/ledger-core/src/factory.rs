//! Block construction.

use crate::constants::{GENESIS_AMOUNT, GENESIS_INDEX, GENESIS_PREV_HASH};
use crate::{fingerprint, Block, LedgerError};
use chrono::{DateTime, SecondsFormat, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of block timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Result<String, LedgerError>;
}

/// Wall clock, formatted as RFC 3339 UTC with nanoseconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<String, LedgerError> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| LedgerError::ClockUnavailable(e.to_string()))?;
        let secs = i64::try_from(since_epoch.as_secs())
            .map_err(|_| LedgerError::ClockUnavailable("seconds out of range".into()))?;
        let instant = DateTime::<Utc>::from_timestamp(secs, since_epoch.subsec_nanos())
            .ok_or_else(|| LedgerError::ClockUnavailable("instant out of range".into()))?;
        Ok(format_timestamp(instant))
    }
}

/// Always returns the same instant. Handy for reproducible digests.
#[derive(Clone, Debug)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn now(&self) -> Result<String, LedgerError> {
        Ok(self.0.clone())
    }
}

pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Build the block that follows `previous`. Only fails when the clock does.
pub fn new_block<C: Clock + ?Sized>(
    previous: &Block,
    amount: i64,
    clock: &C,
) -> Result<Block, LedgerError> {
    // An overflowed index is caught by validation, not here.
    let index = previous.index.wrapping_add(1);
    let timestamp = clock.now()?;
    let prev_hash = previous.hash.clone();
    let hash = fingerprint(index, &timestamp, amount, &prev_hash);
    Ok(Block {
        index,
        timestamp,
        amount,
        hash,
        prev_hash,
    })
}

/// Index 0, zero amount, empty prev hash; hashed like any other block.
pub fn genesis_block<C: Clock + ?Sized>(clock: &C) -> Result<Block, LedgerError> {
    let timestamp = clock.now()?;
    let hash = fingerprint(GENESIS_INDEX, &timestamp, GENESIS_AMOUNT, GENESIS_PREV_HASH);
    Ok(Block {
        index: GENESIS_INDEX,
        timestamp,
        amount: GENESIS_AMOUNT,
        hash,
        prev_hash: GENESIS_PREV_HASH.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenClock;

    impl Clock for BrokenClock {
        fn now(&self) -> Result<String, LedgerError> {
            Err(LedgerError::ClockUnavailable("no time source".into()))
        }
    }

    fn fixed() -> FixedClock {
        FixedClock("2024-01-01T00:00:00.000000000Z".into())
    }

    #[test]
    fn genesis_block_example() {
        let genesis = genesis_block(&fixed()).unwrap();
        assert_eq!(genesis.index, 0);
        assert_eq!(genesis.amount, 0);
        assert_eq!(genesis.prev_hash, "");
        assert_eq!(
            genesis.hash,
            "2645d33374f67876282a1d12270aba10cf7abad1aad74f76676eb29a641dac18"
        );
        assert!(genesis.is_genesis());
    }

    #[test]
    fn new_block_links_to_previous() {
        let genesis = genesis_block(&fixed()).unwrap();
        let block = new_block(&genesis, 50, &SystemClock).unwrap();
        assert_eq!(block.index, 1);
        assert_eq!(block.amount, 50);
        assert_eq!(block.prev_hash, genesis.hash);
        assert_eq!(block.hash, block.compute_hash());
    }

    #[test]
    fn new_block_negative_amount() {
        let genesis = genesis_block(&fixed()).unwrap();
        let block = new_block(&genesis, -20, &fixed()).unwrap();
        assert_eq!(block.amount, -20);
        assert_eq!(block.hash, block.compute_hash());
    }

    #[test]
    fn new_block_after_max_index_wraps() {
        let mut previous = genesis_block(&fixed()).unwrap();
        previous.index = u64::MAX;
        let block = new_block(&previous, 1, &fixed()).unwrap();
        assert_eq!(block.index, 0);
        assert_eq!(block.hash, block.compute_hash());
    }

    #[test]
    fn clock_failure_surfaces() {
        let genesis = genesis_block(&fixed()).unwrap();
        let err = new_block(&genesis, 1, &BrokenClock).unwrap_err();
        assert!(matches!(err, LedgerError::ClockUnavailable(_)));
        assert!(matches!(
            genesis_block(&BrokenClock),
            Err(LedgerError::ClockUnavailable(_))
        ));
    }

    #[test]
    fn system_clock_format() {
        let ts = SystemClock.now().unwrap();
        assert!(ts.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&ts).is_ok());
        // nanosecond precision: "YYYY-MM-DDTHH:MM:SS.nnnnnnnnnZ"
        assert_eq!(ts.len(), 30);
    }
}

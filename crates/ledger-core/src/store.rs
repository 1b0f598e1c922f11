//! In-memory chain storage.
//!
//! Every mutation goes through the write lock, and every extension is offered
//! as a whole replacement chain through [`LedgerStore::replace_if_longer`]'s
//! rule, so local appends and chain reconciliation share one code path.

use crate::factory::genesis_block;
use crate::service::{Outcome, Submission};
use crate::validate::check_block;
use crate::{Block, Clock, LedgerError, Rejection};
use parking_lot::RwLock;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct LedgerStore {
    blocks: RwLock<Vec<Block>>,
}

impl LedgerStore {
    /// An empty store. It rejects submissions until [`Self::ensure_genesis`] runs.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_genesis<C: Clock + ?Sized>(clock: &C) -> Result<Self, LedgerError> {
        let store = Self::new();
        store.ensure_genesis(clock)?;
        Ok(store)
    }

    /// Insert the genesis block if the store is empty. Idempotent; returns
    /// whether a block was created.
    pub fn ensure_genesis<C: Clock + ?Sized>(&self, clock: &C) -> Result<bool, LedgerError> {
        let mut blocks = self.blocks.write();
        if !blocks.is_empty() {
            return Ok(false);
        }
        let genesis = genesis_block(clock)?;
        info!(hash = %genesis.hash, timestamp = %genesis.timestamp, "genesis block created");
        blocks.push(genesis);
        Ok(true)
    }

    /// Validate `candidate` against the current tail and keep it if valid.
    pub fn append(&self, candidate: Block) -> bool {
        let mut blocks = self.blocks.write();
        let index = candidate.index;
        match offer_extension(&mut blocks, candidate) {
            Ok(()) => true,
            Err(reason) => {
                debug!(index, %reason, "append rejected");
                false
            }
        }
    }

    /// Longest-chain rule: swap in `candidate` only if it is strictly longer.
    /// The candidate is not validated here.
    pub fn replace_if_longer(&self, candidate: Vec<Block>) -> bool {
        let mut blocks = self.blocks.write();
        replace_locked(&mut blocks, candidate)
    }

    pub fn snapshot(&self) -> Vec<Block> {
        self.blocks.read().clone()
    }

    pub fn tail(&self) -> Option<Block> {
        self.blocks.read().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }

    /// Read the tail, build a candidate from it, validate and offer the
    /// extended chain, all under one write lock. The built block is returned
    /// whether or not it was kept.
    pub fn extend_with<F>(&self, build: F) -> Result<Submission, LedgerError>
    where
        F: FnOnce(&Block) -> Result<Block, LedgerError>,
    {
        let mut blocks = self.blocks.write();
        let tail = blocks.last().ok_or(LedgerError::LedgerNotReady)?;
        let candidate = build(tail)?;
        let outcome = match offer_extension(&mut blocks, candidate.clone()) {
            Ok(()) => Outcome::Accepted,
            Err(reason) => Outcome::Rejected(reason),
        };
        Ok(Submission {
            block: candidate,
            outcome,
        })
    }
}

fn offer_extension(blocks: &mut Vec<Block>, candidate: Block) -> Result<(), Rejection> {
    let tail = blocks.last().ok_or(Rejection::MissingPredecessor)?;
    check_block(&candidate, tail)?;

    let mut extended = Vec::with_capacity(blocks.len() + 1);
    extended.extend_from_slice(blocks);
    extended.push(candidate);
    // One block longer than the current chain, so the rule always accepts it.
    let replaced = replace_locked(blocks, extended);
    debug_assert!(replaced);
    Ok(())
}

fn replace_locked(blocks: &mut Vec<Block>, candidate: Vec<Block>) -> bool {
    if candidate.len() > blocks.len() {
        debug!(from = blocks.len(), to = candidate.len(), "replacing chain");
        *blocks = candidate;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::new_block;
    use crate::FixedClock;

    fn clock() -> FixedClock {
        FixedClock("2024-01-01T00:00:00.000000000Z".into())
    }

    fn store() -> LedgerStore {
        LedgerStore::with_genesis(&clock()).unwrap()
    }

    #[test]
    fn new_store_is_empty() {
        let store = LedgerStore::new();
        assert!(store.is_empty());
        assert_eq!(store.tail(), None);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn ensure_genesis_is_idempotent() {
        let store = LedgerStore::new();
        assert!(store.ensure_genesis(&clock()).unwrap());
        let first = store.snapshot();
        assert!(!store.ensure_genesis(&clock()).unwrap());
        assert_eq!(store.snapshot(), first);
        assert_eq!(store.len(), 1);
        assert!(first[0].is_genesis());
    }

    #[test]
    fn append_valid_block() {
        let store = store();
        let genesis = store.tail().unwrap();
        let block = new_block(&genesis, 50, &clock()).unwrap();
        assert!(store.append(block.clone()));
        assert_eq!(store.len(), 2);
        assert_eq!(store.tail(), Some(block));
    }

    #[test]
    fn append_invalid_block_leaves_chain() {
        let store = store();
        let genesis = store.tail().unwrap();
        let mut block = new_block(&genesis, 50, &clock()).unwrap();
        block.amount = 51;
        let before = store.snapshot();
        assert!(!store.append(block));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn append_stale_block_rejected() {
        let store = store();
        let genesis = store.tail().unwrap();
        let a = new_block(&genesis, 1, &clock()).unwrap();
        let b = new_block(&genesis, 2, &clock()).unwrap();
        assert!(store.append(a));
        assert!(!store.append(b));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn append_on_empty_store() {
        let store = LedgerStore::new();
        let genesis = genesis_block(&clock()).unwrap();
        let block = new_block(&genesis, 1, &clock()).unwrap();
        assert!(!store.append(block));
        assert!(store.is_empty());
    }

    #[test]
    fn replace_if_longer_rule() {
        let store = store();
        let genesis = store.tail().unwrap();
        let one = new_block(&genesis, 1, &clock()).unwrap();
        let two = new_block(&one, 2, &clock()).unwrap();

        // equal length: no-op
        let same_len = vec![genesis_block(&FixedClock("other".into())).unwrap()];
        let before = store.snapshot();
        assert!(!store.replace_if_longer(same_len));
        assert_eq!(store.snapshot(), before);

        let longer = vec![genesis.clone(), one.clone(), two.clone()];
        assert!(store.replace_if_longer(longer.clone()));
        assert_eq!(store.snapshot(), longer);

        // shorter: no-op
        assert!(!store.replace_if_longer(vec![genesis, one]));
        assert_eq!(store.snapshot(), longer);
        assert!(!store.replace_if_longer(Vec::new()));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn extend_with_accepts_built_block() {
        let store = store();
        let submission = store
            .extend_with(|tail| new_block(tail, 50, &clock()))
            .unwrap();
        assert_eq!(submission.outcome, Outcome::Accepted);
        assert_eq!(store.tail(), Some(submission.block));
    }

    #[test]
    fn extend_with_returns_rejected_block() {
        let store = store();
        let submission = store
            .extend_with(|tail| {
                let mut block = new_block(tail, 50, &clock())?;
                block.hash = "00".repeat(32);
                Ok(block)
            })
            .unwrap();
        assert_eq!(submission.outcome, Outcome::Rejected(Rejection::HashMismatch));
        assert_eq!(submission.block.amount, 50);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn extend_with_on_empty_store() {
        let store = LedgerStore::new();
        let err = store
            .extend_with(|tail| new_block(tail, 1, &clock()))
            .unwrap_err();
        assert_eq!(err, LedgerError::LedgerNotReady);
    }

    #[test]
    fn extend_with_propagates_build_error() {
        let store = store();
        let err = store
            .extend_with(|_| Err(LedgerError::ClockUnavailable("stopped".into())))
            .unwrap_err();
        assert!(matches!(err, LedgerError::ClockUnavailable(_)));
        assert_eq!(store.len(), 1);
    }
}

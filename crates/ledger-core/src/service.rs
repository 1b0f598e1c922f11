use crate::factory::new_block;
use crate::validate::check_chain;
use crate::{Block, ChainFault, Clock, LedgerError, LedgerStore, Rejection, SystemClock};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// The block built for a submission, tagged with whether it was kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub block: Block,
    pub outcome: Outcome,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        self.outcome == Outcome::Accepted
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected(Rejection),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Head {
    pub height: u64,
    pub hash: String,
}

/// Operations exposed to transports. Cloning shares the same store.
pub struct LedgerService<C = SystemClock> {
    store: Arc<LedgerStore>,
    clock: Arc<C>,
}

impl<C> Clone for LedgerService<C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl LedgerService<SystemClock> {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<C: Clock> LedgerService<C> {
    pub fn with_clock(store: Arc<LedgerStore>, clock: C) -> Self {
        Self {
            store,
            clock: Arc::new(clock),
        }
    }

    pub fn store(&self) -> &Arc<LedgerStore> {
        &self.store
    }

    /// The whole chain, oldest first. Empty if genesis was never created.
    pub fn get_chain(&self) -> Vec<Block> {
        self.store.snapshot()
    }

    /// Build a block for `amount` on top of the current tail and try to
    /// append it. The block comes back even when it was rejected.
    pub fn submit_entry(&self, amount: i64) -> Result<Submission, LedgerError> {
        let submission = self
            .store
            .extend_with(|tail| new_block(tail, amount, self.clock.as_ref()))?;
        match submission.outcome {
            Outcome::Accepted => info!(
                index = submission.block.index,
                amount,
                hash = %submission.block.hash,
                "entry accepted"
            ),
            Outcome::Rejected(reason) => warn!(
                index = submission.block.index,
                amount,
                %reason,
                "entry rejected"
            ),
        }
        Ok(submission)
    }

    pub fn head(&self) -> Option<Head> {
        self.store.tail().map(|tail| Head {
            height: tail.index,
            hash: tail.hash,
        })
    }

    /// Audit the current chain from genesis; returns its length when sound.
    pub fn verify(&self) -> Result<usize, ChainFault> {
        let chain = self.store.snapshot();
        check_chain(&chain)?;
        Ok(chain.len())
    }
}

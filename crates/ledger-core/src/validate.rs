use crate::{Block, ChainFault, Rejection};

/// Check `candidate` against its immediate predecessor only: index
/// continuity, hash linkage, then the recomputed fingerprint.
pub fn check_block(candidate: &Block, previous: &Block) -> Result<(), Rejection> {
    if previous.index.checked_add(1) != Some(candidate.index) {
        return Err(Rejection::IndexDiscontinuity {
            previous: previous.index,
            found: candidate.index,
        });
    }
    if candidate.prev_hash != previous.hash {
        return Err(Rejection::PrevHashMismatch);
    }
    if candidate.compute_hash() != candidate.hash {
        return Err(Rejection::HashMismatch);
    }
    Ok(())
}

pub fn is_valid(candidate: &Block, previous: &Block) -> bool {
    check_block(candidate, previous).is_ok()
}

/// Audit an entire sequence, starting from its genesis block.
pub fn check_chain(blocks: &[Block]) -> Result<(), ChainFault> {
    let genesis = blocks.first().ok_or(ChainFault::Empty)?;
    if !genesis.is_genesis() {
        return Err(ChainFault::BadGenesis);
    }
    if genesis.compute_hash() != genesis.hash {
        return Err(ChainFault::Broken {
            position: 0,
            reason: Rejection::HashMismatch,
        });
    }
    for (offset, pair) in blocks.windows(2).enumerate() {
        check_block(&pair[1], &pair[0]).map_err(|reason| ChainFault::Broken {
            position: offset + 1,
            reason,
        })?;
    }
    Ok(())
}

//! Session-scoped view of the key pool: the current key, rotation on
//! credential failures, and the failure ledger they populate.

use crate::error::SearchError;
use crate::key_pool::{FailureLedger, KeyPool};
use crate::types::{ApiKey, FailureReason};

/// Exclusive handle on a [`KeyPool`] for the duration of one session.
///
/// Both the search rounds and the enrichment batches rotate through the
/// same handle, so a key that failed during search is never reused for
/// enrichment and vice versa.
#[derive(Debug)]
pub struct KeyRotation<'a> {
    pool: &'a mut KeyPool,
    ledger: FailureLedger,
    exhausted: bool,
}

impl<'a> KeyRotation<'a> {
    /// Start a fresh session on `pool`, clearing any earlier failure state.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyPool`] if `pool` has no keys.
    pub fn begin(pool: &'a mut KeyPool) -> Result<Self, SearchError> {
        if pool.is_empty() {
            return Err(SearchError::EmptyPool);
        }
        pool.reset();
        Ok(Self {
            pool,
            ledger: FailureLedger::new(),
            exhausted: false,
        })
    }

    /// The key to use next, or `None` once every key has failed.
    pub fn current(&mut self) -> Option<ApiKey> {
        if self.exhausted {
            return None;
        }
        let index = self.pool.current().ok()?.index();
        self.pool.mark_active(index);
        self.pool.get(index).cloned()
    }

    /// Record `reason` against key `index` and move to the next key.
    ///
    /// Returns the next key's index, or `None` if the pool is now exhausted.
    pub fn record_and_advance(&mut self, index: usize, reason: FailureReason) -> Option<usize> {
        self.ledger.record(index, reason);
        self.pool.record_failure(index, reason);
        let next = self.pool.advance(index);
        match next {
            Some(next) => {
                tracing::info!(
                    failed = index + 1,
                    next = next + 1,
                    %reason,
                    "rotating to next API key"
                );
            }
            None => {
                self.exhausted = true;
                tracing::warn!(failed = index + 1, %reason, "all API keys exhausted");
            }
        }
        next
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn ledger(&self) -> &FailureLedger {
        &self.ledger
    }

    pub fn into_ledger(self) -> FailureLedger {
        self.ledger
    }
}

//! Ordered credential pool with a monotonic cursor, plus the per-session
//! failure ledger.
//!
//! Rotation never wraps: a key recorded as failed is assumed to stay bad
//! for the rest of the session, which also guarantees that a session
//! terminates after at most `len()` rounds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::types::{ApiKey, FailureReason, KeyStatus};

/// The caller's credentials for one session, in the order supplied.
#[derive(Debug, Clone, Default)]
pub struct KeyPool {
    keys: Vec<ApiKey>,
    cursor: usize,
}

impl KeyPool {
    /// Build a pool from already-decoded secrets.
    pub fn new<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = secrets
            .into_iter()
            .enumerate()
            .map(|(index, secret)| ApiKey::new(index, secret.into()))
            .collect();
        Self { keys, cursor: 0 }
    }

    /// Swap in a brand-new key set, dropping all failure state.
    pub fn replace<I, S>(&mut self, secrets: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self = Self::new(secrets);
        tracing::debug!(keys = self.keys.len(), "key pool replaced");
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[ApiKey] {
        &self.keys
    }

    pub fn get(&self, index: usize) -> Option<&ApiKey> {
        self.keys.get(index)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The key under the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyPool`] if no keys are configured.
    pub fn current(&self) -> Result<&ApiKey, SearchError> {
        self.keys.get(self.cursor).ok_or(SearchError::EmptyPool)
    }

    /// Move past `from_index`.
    ///
    /// Returns `Some(from_index + 1)` if such a key exists, otherwise `None`
    /// and the cursor stays where it is. The cursor never moves backwards.
    pub fn advance(&mut self, from_index: usize) -> Option<usize> {
        let next = from_index.checked_add(1)?;
        if next >= self.keys.len() {
            return None;
        }
        self.cursor = self.cursor.max(next);
        Some(next)
    }

    /// Mark the key at `index` as exhausted for `reason`.
    ///
    /// Returns `false` (and changes nothing) if the key was already
    /// exhausted or `index` is out of range; the first recorded reason wins.
    pub fn record_failure(&mut self, index: usize, reason: FailureReason) -> bool {
        let Some(key) = self.keys.get_mut(index) else {
            return false;
        };
        if key.status == KeyStatus::Exhausted {
            return false;
        }
        key.status = KeyStatus::Exhausted;
        key.failure_reason = Some(reason);
        true
    }

    /// Flag the key at `index` as in use, unless it already failed.
    pub(crate) fn mark_active(&mut self, index: usize) {
        if let Some(key) = self.keys.get_mut(index) {
            if key.status == KeyStatus::Untried {
                key.status = KeyStatus::Active;
            }
        }
    }

    /// Clear every status and failure reason and rewind the cursor.
    pub fn reset(&mut self) {
        for key in &mut self.keys {
            key.status = KeyStatus::Untried;
            key.failure_reason = None;
        }
        self.cursor = 0;
    }
}

/// Key index → failure reason, for one logical search session.
///
/// Ordered by index so that iteration, and everything rendered from it,
/// is independent of the order failures were recorded in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureLedger {
    entries: BTreeMap<usize, FailureReason>,
}

impl FailureLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a credential failure for `index`.
    ///
    /// Non-credential reasons are ignored, and the first reason recorded for
    /// a key is kept. Returns whether the ledger changed.
    pub fn record(&mut self, index: usize, reason: FailureReason) -> bool {
        if !reason.is_credential() || self.entries.contains_key(&index) {
            return false;
        }
        self.entries.insert(index, reason);
        true
    }

    pub fn get(&self, index: usize) -> Option<FailureReason> {
        self.entries.get(&index).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in ascending key-index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, FailureReason)> + '_ {
        self.entries.iter().map(|(index, reason)| (*index, *reason))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

//! Key set ingestion.
//!
//! A key set is plain text with one secret per line. Blank lines and `#`
//! comments are skipped, whitespace is trimmed, and repeated secrets keep
//! only their first occurrence so key positions stay stable.

use std::collections::HashSet;
use std::path::Path;

use vidscout_search::KeyPool;

use crate::error::{AppError, Result};

/// Environment variable holding a comma-separated key set.
pub const KEYS_ENV: &str = "VIDSCOUT_API_KEYS";

/// Parse a newline-separated key set.
pub fn parse_keys(text: &str) -> Vec<String> {
    dedup(
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#')),
    )
}

/// Parse a comma-separated key set, as used by [`KEYS_ENV`].
pub fn parse_key_list(text: &str) -> Vec<String> {
    dedup(text.split(',').map(str::trim).filter(|key| !key.is_empty()))
}

fn dedup<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    keys.filter(|key| seen.insert(*key))
        .map(str::to_owned)
        .collect()
}

/// Read a key set file.
///
/// # Errors
///
/// Returns [`AppError::Credentials`] if the file cannot be read.
pub fn load_key_file(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::Credentials(format!("cannot read {}: {e}", path.display())))?;
    let keys = parse_keys(&text);
    tracing::debug!(path = %path.display(), count = keys.len(), "loaded key file");
    Ok(keys)
}

/// Keys from [`KEYS_ENV`], if set.
pub fn from_env() -> Option<Vec<String>> {
    std::env::var(KEYS_ENV).ok().map(|value| parse_key_list(&value))
}

/// Resolve the key set: an explicit file wins, then the environment, then
/// `fallback` if it exists.
///
/// An empty result is returned as-is; the engine reports it when a search
/// is attempted.
///
/// # Errors
///
/// Returns [`AppError::Credentials`] if an explicit file cannot be read.
pub fn resolve(explicit: Option<&Path>, fallback: &Path) -> Result<Vec<String>> {
    if let Some(path) = explicit {
        return load_key_file(path);
    }
    if let Some(keys) = from_env() {
        tracing::debug!(count = keys.len(), "using keys from {KEYS_ENV}");
        return Ok(keys);
    }
    if fallback.is_file() {
        return load_key_file(fallback);
    }
    tracing::debug!(path = %fallback.display(), "no key file found");
    Ok(Vec::new())
}

/// One line per key, e.g. `key 2 (AIza…)`, for display.
pub fn masked_listing(pool: &KeyPool) -> Vec<String> {
    pool.keys().iter().map(ToString::to_string).collect()
}

//! Search orchestrator: key rotation, concurrent rounds, dedup, enrichment.
//!
//! A session plans nothing itself; it takes a task list, runs it in rounds
//! against a shared rotating key pool, merges and deduplicates the results,
//! enriches them in batches, and reports which keys failed and why.

pub mod dedup;
pub mod enrich;
pub mod report;
pub mod rotation;
pub mod search;
pub mod session;

pub use enrich::{EnrichmentBatcher, EnrichmentOutcome, ENRICHMENT_TASK_ID};
pub use report::summarize;
pub use rotation::KeyRotation;
pub use search::{SearchOrchestrator, SearchPhase};
pub use session::{sort_results, SearchReport};

pub(crate) use session::OrchestratorSession;

//! The vector index (§4.F): staleness detection and embedding orchestration
//! layered on `paranoid-store`'s vector table.

pub mod indexer;
pub mod staleness;

pub use indexer::{IndexSummary, Indexer, ObjectKinds};
pub use staleness::IndexMode;

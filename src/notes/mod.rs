//! Block ingestion.
//!
//! A submission is validated, linked to the repository owning its project
//! directory (created on first sight from the directory's manifest), given a
//! serial number when it is top-level, and stored as one row.

mod forest;
mod ingest;
mod resolver;
mod sequencer;

#[allow(unused_imports)]
pub use forest::BlockForest;
pub use ingest::{BlockIngestService, BlockSubmission};
pub use resolver::RepositoryResolver;
pub use sequencer::BlockSequencer;

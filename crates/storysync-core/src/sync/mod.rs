//! Incremental sync engine

mod orchestrator;
pub mod reconcile;
pub mod version;
pub mod watermark;

pub use orchestrator::{push_record, SyncJob, SyncMode, SyncOutcome, Synchronizer};
pub use reconcile::{reconcile, Reconciliation};
pub use version::{is_up_to_date, VersionCoordinator};

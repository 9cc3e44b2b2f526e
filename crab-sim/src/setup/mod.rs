//! Reference data setup
//!
//! - `storage`: redb-backed step gate and entity ledger
//! - `reconciler`: ensures the reference catalog exists remotely
//! - `standard`: the standard sets created when it does not
//! - `catalog`: typed view of the ledger used by the generators

pub mod catalog;
pub mod reconciler;
pub mod standard;
pub mod storage;

pub use catalog::Catalog;
pub use reconciler::{EntityReconciler, ReconcileReport, ReconcileStep, StepReport};
pub use storage::{SetupStateStore, SetupStep, StorageError, StorageResult, StoredEntity};

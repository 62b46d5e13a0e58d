//! Probabilitas Store
//!
//! Project workspace storage for Probabilitas.
//!
//! Provides:
//! - Project creation with generated attributes and classes
//! - Attribute/class editing and appending with association backfill
//! - Training association upserts
//! - Immutable per-project snapshots for the classifier engine
//! - JSON snapshot persistence

pub mod persistence;
pub mod store;

pub use persistence::{load_or_default, load_snapshot, save_if_changed, save_snapshot};
pub use store::{
    NewProject, ProjectSnapshot, ProjectStore, ProjectSummary, StoreSnapshot, Workspace,
    MAX_NAME_LEN,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::store::{NewProject, ProjectSnapshot, ProjectStore, Workspace};
}

//! Folder and diagram operations with their invariants.
//!
//! Services borrow a [`Store`](crate::store::Store) for the duration of a
//! call; every check runs against the store before the write it guards.

mod diagrams;
mod folders;
pub mod validation;

pub use diagrams::{DiagramService, DiagramUpdate};
pub use folders::{BootstrapReport, FolderService, FolderUpdate, ROOT_FOLDER_NAME};

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at the precision the store persists.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

//! Running recipes over a directory tree.
//!
//! This module handles:
//! - Scanning the workspace into a sorted file list
//! - Applying recipes in order and collecting the resulting changes
//! - Writing changed and created files back to disk

pub mod report;
pub mod run;
pub mod scan;

pub use report::{ChangeKind, FileChange, RunReport};
pub use run::{RunOptions, run};
pub use scan::scan;

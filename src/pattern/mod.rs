//! Path patterns for file creation.
//!
//! This module handles:
//! - Segment-based glob matching (`*`, `project-*`, `**`)
//! - Resolving a creation pattern against the directories seen in a scan

pub mod glob;
pub mod target;

pub use glob::{ConcretePath, PathPattern, Segment};
pub use target::{DirectorySet, FilePattern};

//! Conditional value rewriting.
//!
//! This module handles:
//! - Document conditions (query path equals value) and HCL comment conditions
//! - Computing replacement values, literally or through regex captures
//! - Rewriting YAML streams document by document and HCL attributes block by block

pub mod condition;
pub mod hcl;
pub mod transform;
pub mod yaml;

pub use condition::{CommentCondition, Condition, all_comments_match, all_match};
pub use hcl::ChangeHclAttribute;
pub use transform::{ValueMatcher, ValueTransform};
pub use yaml::{ChangeYamlProperty, MutationSpec, UnitOutcome};

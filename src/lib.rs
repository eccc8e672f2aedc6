//! Reconf - CLI tool for conditionally rewriting YAML and HCL configuration.
//!
//! This library provides the core functionality for reconf, including:
//! - Configuration file parsing and cascade discovery
//! - Glob-style path patterns for creating files across a directory tree
//! - Lossless YAML and HCL parsing with span-based edits
//! - Conditional property rewrites with literal or regex matching
//!
//! # Example
//!
//! ```no_run
//! use reconf_cli::config::load_merged_config;
//! use reconf_cli::recipes::compile_recipes;
//! use reconf_cli::workspace::{RunOptions, run};
//!
//! let cwd = std::env::current_dir().unwrap();
//! let config = load_merged_config(&cwd).unwrap();
//! let recipes = compile_recipes(&config).unwrap();
//!
//! let report = run(&cwd, &recipes, RunOptions { dry_run: true }).unwrap();
//! for change in &report.changes {
//!     println!("{} {}", change.kind, change.path.display());
//! }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod pattern;
pub mod query;
pub mod recipes;
pub mod rewrite;
pub mod workspace;

pub use error::{ReconfError, Result};

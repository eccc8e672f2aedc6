//! Compiled recipes for reconf.
//!
//! This module handles:
//! - Turning configured recipes into ready-to-run rewrites and file patterns
//! - Selecting the files each change recipe applies to

pub mod compiled;
pub mod selector;

pub use compiled::{CompiledRecipe, RecipeAction, compile_recipes};
pub use selector::{FileSelector, HCL_EXTENSIONS, YAML_EXTENSIONS};

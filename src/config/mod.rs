//! Configuration loading and parsing for reconf.
//!
//! This module handles:
//! - TOML and YAML config file parsing
//! - Directory cascade discovery
//! - Config merging

pub mod cascade;
pub mod parser;
pub mod template;
pub mod types;

pub use cascade::{
	CONFIG_FILE_NAMES, discover_configs, find_config_in, load_config_file, load_merged_config,
	merge_configs,
};
pub use parser::{parse_config_file, parse_config_str};
pub use template::generate_init_template;
pub use types::{
	ChangeHcl, ChangeYaml, CommentConditionConfig, ConditionConfig, Config, CreateFiles,
	LoadedConfig, MergedConfig, Recipe, RecipeWithSource,
};

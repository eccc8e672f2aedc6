use crate::config::parser::parse_config_file;
use crate::config::types::{LoadedConfig, MergedConfig, RecipeWithSource};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Config file names looked up in each directory, in order of preference.
pub const CONFIG_FILE_NAMES: [&str; 3] = [".reconf.toml", ".reconf.yaml", ".reconf.yml"];

/// The config file in `dir`, if any.
pub fn find_config_in(dir: &Path) -> Option<PathBuf> {
	CONFIG_FILE_NAMES
		.iter()
		.map(|name| dir.join(name))
		.find(|path| path.is_file())
}

/// Discover and load all config files in the cascade.
///
/// The cascade order is:
/// 1. Start from `start_dir` and look for a config file
/// 2. If found and `root = true`, stop there
/// 3. Otherwise, continue up the directory tree
///
/// Returns configs in cascade order (most specific first).
pub fn discover_configs(start_dir: &Path) -> Result<Vec<LoadedConfig>> {
	let mut configs = Vec::new();
	let mut current_dir = Some(start_dir);

	while let Some(dir) = current_dir {
		if let Some(config_path) = find_config_in(dir) {
			let config = parse_config_file(&config_path)?;
			let is_root = config.root;

			configs.push(LoadedConfig {
				config,
				path: config_path,
			});

			if is_root {
				break;
			}
		}

		current_dir = dir.parent();
	}

	Ok(configs)
}

/// Merge multiple configs into a single effective config.
///
/// Recipes are collected in cascade order.
pub fn merge_configs(configs: &[LoadedConfig]) -> MergedConfig {
	let mut merged = MergedConfig::default();

	for loaded in configs {
		for recipe in &loaded.config.recipes {
			merged.recipes.push(RecipeWithSource {
				recipe: recipe.clone(),
				source: loaded.path.clone(),
			});
		}
	}

	merged
}

/// Convenience function to discover, load, and merge configs from a directory.
pub fn load_merged_config(start_dir: &Path) -> Result<MergedConfig> {
	let configs = discover_configs(start_dir)?;
	Ok(merge_configs(&configs))
}

/// Load a single explicitly named config file, bypassing discovery.
pub fn load_config_file(path: &Path) -> Result<MergedConfig> {
	let config = parse_config_file(path)?;
	Ok(merge_configs(&[LoadedConfig {
		config,
		path: path.to_path_buf(),
	}]))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ReconfError;
	use std::fs;

	const CHANGE_REPLICAS: &str = "[[recipes]]\ntype = \"change-yaml\"\ntarget = \"spec.replicas\"\nnew_value = \"3\"\n";

	#[test]
	fn test_discover_walks_up_to_root_config() {
		let temp_dir = tempfile::tempdir().unwrap();
		let outer = temp_dir.path();
		let project = outer.join("project");
		let nested = project.join("services/api");
		fs::create_dir_all(&nested).unwrap();

		fs::write(outer.join(".reconf.toml"), CHANGE_REPLICAS).unwrap();
		fs::write(
			project.join(".reconf.toml"),
			format!("root = true\n{}", CHANGE_REPLICAS),
		)
		.unwrap();
		fs::write(nested.join(".reconf.toml"), CHANGE_REPLICAS).unwrap();

		let configs = discover_configs(&nested).unwrap();
		assert_eq!(configs.len(), 2);
		assert_eq!(configs[0].path, nested.join(".reconf.toml"));
		assert_eq!(configs[1].path, project.join(".reconf.toml"));

		let merged = merge_configs(&configs);
		assert_eq!(merged.recipes.len(), 2);
		assert_eq!(merged.recipes[1].source, project.join(".reconf.toml"));
	}

	#[test]
	fn test_toml_is_preferred_over_yaml() {
		let temp_dir = tempfile::tempdir().unwrap();
		fs::write(temp_dir.path().join(".reconf.yaml"), "root: true\n").unwrap();
		assert_eq!(
			find_config_in(temp_dir.path()),
			Some(temp_dir.path().join(".reconf.yaml"))
		);

		fs::write(temp_dir.path().join(".reconf.toml"), "root = true\n").unwrap();
		assert_eq!(
			find_config_in(temp_dir.path()),
			Some(temp_dir.path().join(".reconf.toml"))
		);
	}

	#[test]
	fn test_invalid_config_in_cascade_is_an_error() {
		let temp_dir = tempfile::tempdir().unwrap();
		fs::write(temp_dir.path().join(".reconf.toml"), "recipes = 3\n").unwrap();
		let result = discover_configs(temp_dir.path());
		assert!(matches!(result, Err(ReconfError::ConfigParseError { .. })));
	}

	#[test]
	fn test_load_config_file_tags_recipes_with_source() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("recipes.toml");
		fs::write(&path, CHANGE_REPLICAS).unwrap();

		let merged = load_config_file(&path).unwrap();
		assert_eq!(merged.recipes.len(), 1);
		assert_eq!(merged.recipes[0].source, path);

		let missing = load_config_file(&temp_dir.path().join("missing.toml"));
		assert!(matches!(missing, Err(ReconfError::ConfigReadError { .. })));
	}
}

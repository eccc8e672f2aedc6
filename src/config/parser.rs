use crate::config::types::Config;
use crate::error::{ReconfError, Result};
use std::path::Path;

/// Parse a config file from the given path.
pub fn parse_config_file(path: &Path) -> Result<Config> {
	let content = std::fs::read_to_string(path).map_err(|source| ReconfError::ConfigReadError {
		path: path.to_path_buf(),
		source,
	})?;

	parse_config_str(&content, path)
}

/// Parse a config from a string (useful for testing).
///
/// The format follows the extension of `path`: `.yaml`/`.yml` files are YAML,
/// everything else is TOML.
pub fn parse_config_str(content: &str, path: &Path) -> Result<Config> {
	let is_yaml = path
		.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| ext == "yaml" || ext == "yml");

	let config: Config = if is_yaml {
		// An empty YAML file deserializes as null, not as an empty mapping
		if content.trim().is_empty() {
			Config::default()
		} else {
			serde_yaml::from_str(content).map_err(|source| ReconfError::YamlConfigParseError {
				path: path.to_path_buf(),
				source,
			})?
		}
	} else {
		toml::from_str(content).map_err(|source| ReconfError::ConfigParseError {
			path: path.to_path_buf(),
			source,
		})?
	};

	// Validate the parsed config
	config.validate()?;

	Ok(config)
}

use std::path::PathBuf;

/// Library-level structured errors for reconf.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum ReconfError {
	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Failed to parse YAML config file: {path}")]
	YamlConfigParseError {
		path: PathBuf,
		#[source]
		source: serde_yaml::Error,
	},

	#[error("Invalid file pattern `{pattern}`: {reason}")]
	InvalidFilePattern { pattern: String, reason: String },

	#[error("`old_value` is required when `regex` is enabled (recipe `{recipe}`)")]
	MissingOldValue { recipe: String },

	#[error("Invalid regex pattern: {pattern}")]
	InvalidRegex {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Invalid glob: {pattern}")]
	InvalidGlob {
		pattern: String,
		#[source]
		source: globset::Error,
	},

	#[error("Invalid query path `{query}`: {reason}")]
	InvalidQuery { query: String, reason: String },

	#[error("File contents for `{pattern}` are not valid YAML: {reason}")]
	InvalidTemplate { pattern: String, reason: String },

	#[error("Failed to parse {path} at line {line}: {message}")]
	DocumentParse {
		path: PathBuf,
		line: usize,
		message: String,
	},

	#[error("I/O error on {path}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to walk directory tree")]
	Walk(#[from] walkdir::Error),
}

impl ReconfError {
	/// Whether this error describes invalid configuration rather than a problem
	/// with the documents being processed.
	pub fn is_configuration_error(&self) -> bool {
		matches!(
			self,
			ReconfError::ConfigReadError { .. }
				| ReconfError::ConfigParseError { .. }
				| ReconfError::YamlConfigParseError { .. }
				| ReconfError::InvalidFilePattern { .. }
				| ReconfError::MissingOldValue { .. }
				| ReconfError::InvalidRegex { .. }
				| ReconfError::InvalidGlob { .. }
				| ReconfError::InvalidQuery { .. }
				| ReconfError::InvalidTemplate { .. }
		)
	}
}

/// Result type alias using ReconfError.
pub type Result<T> = std::result::Result<T, ReconfError>;

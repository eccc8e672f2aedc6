use crate::error::{ReconfError, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Extensions considered by YAML recipes without a `file_pattern`.
pub const YAML_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Extensions considered by HCL recipes without a `file_pattern`.
pub const HCL_EXTENSIONS: &[&str] = &["tf", "tfvars", "hcl"];

/// Selects the workspace files a change recipe looks at.
#[derive(Debug, Clone)]
pub struct FileSelector {
	globs: GlobSet,
}

impl FileSelector {
	/// Build a selector from an optional glob; a blank or missing pattern
	/// falls back to matching `default_extensions` anywhere in the tree.
	pub fn new(pattern: Option<&str>, default_extensions: &[&str]) -> Result<Self> {
		let pattern = pattern.map(str::trim).filter(|p| !p.is_empty());

		let mut builder = GlobSetBuilder::new();
		match pattern {
			Some(pattern) => {
				builder.add(compile_glob(pattern)?);
			}
			None => {
				for ext in default_extensions {
					builder.add(compile_glob(&format!("**/*.{}", ext))?);
				}
			}
		}
		let globs = builder.build().map_err(|source| ReconfError::InvalidGlob {
			pattern: pattern.unwrap_or_default().to_string(),
			source,
		})?;

		Ok(FileSelector { globs })
	}

	/// Whether a workspace-relative path is selected.
	pub fn matches(&self, path: &Path) -> bool {
		self.globs.is_match(path)
	}
}

/// Compile a glob where `*` stays within one path segment.
fn compile_glob(pattern: &str) -> Result<globset::Glob> {
	GlobBuilder::new(pattern)
		.literal_separator(true)
		.build()
		.map_err(|source| ReconfError::InvalidGlob {
			pattern: pattern.to_string(),
			source,
		})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_extensions() {
		let yaml = FileSelector::new(None, YAML_EXTENSIONS).unwrap();
		assert!(yaml.matches(Path::new("app.yaml")));
		assert!(yaml.matches(Path::new("k8s/base/deploy.yml")));
		assert!(!yaml.matches(Path::new("main.tf")));

		let hcl = FileSelector::new(Some("  "), HCL_EXTENSIONS).unwrap();
		assert!(hcl.matches(Path::new("modules/app/main.tf")));
		assert!(hcl.matches(Path::new("prod.tfvars")));
		assert!(!hcl.matches(Path::new("values.yaml")));
	}

	#[test]
	fn test_explicit_pattern_replaces_defaults() {
		let selector = FileSelector::new(Some("**/k8s/**/*.yaml"), YAML_EXTENSIONS).unwrap();
		assert!(selector.matches(Path::new("k8s/deployments/app.yaml")));
		assert!(!selector.matches(Path::new("other/app.yaml")));

		let modules = FileSelector::new(Some("**/modules/*.tf"), HCL_EXTENSIONS).unwrap();
		assert!(modules.matches(Path::new("modules/main.tf")));
		assert!(!modules.matches(Path::new("modules/nested/main.tf")));
		assert!(!modules.matches(Path::new("other/main.tf")));
	}

	#[test]
	fn test_invalid_glob() {
		let err = FileSelector::new(Some("a/[b"), YAML_EXTENSIONS).unwrap_err();
		assert!(matches!(err, ReconfError::InvalidGlob { ref pattern, .. } if pattern == "a/[b"));
	}
}

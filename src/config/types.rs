use crate::error::Result;
use crate::recipes::CompiledRecipe;
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level configuration from a `.reconf.toml` (or `.reconf.yaml`) file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
	/// If true, stop the directory cascade at this file.
	#[serde(default)]
	pub root: bool,

	/// Recipes to run, in order.
	#[serde(default)]
	pub recipes: Vec<Recipe>,
}

/// One configured recipe, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Recipe {
	CreateFiles(CreateFiles),
	ChangeYaml(ChangeYaml),
	ChangeHcl(ChangeHcl),
}

/// Create a file in every directory matched by a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateFiles {
	pub name: Option<String>,

	/// Directory pattern plus a literal file name, e.g. `projects/*/config.yaml`.
	#[serde(alias = "filePattern")]
	pub file_pattern: String,

	/// Contents of every created file; must be valid YAML.
	#[serde(default, alias = "fileContents")]
	pub contents: String,
}

/// Change a YAML property in documents that satisfy all conditions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeYaml {
	pub name: Option<String>,

	/// Query path of the property to change, e.g. `spec.replicas`.
	#[serde(alias = "property_key", alias = "propertyKey")]
	pub target: String,

	#[serde(alias = "newValue")]
	pub new_value: String,

	/// Only change values equal to this (or matching it, with `regex`).
	#[serde(alias = "oldValue")]
	pub old_value: Option<String>,

	/// Treat `old_value` as a regex; `$N` in `new_value` refers to its groups.
	#[serde(default)]
	pub regex: bool,

	/// All must hold for a document to be changed.
	#[serde(default)]
	pub conditions: Vec<ConditionConfig>,

	/// Glob restricting which files are considered.
	#[serde(alias = "filePattern")]
	pub file_pattern: Option<String>,
}

/// `{ path, value }`: the scalar at `path` must equal `value`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConditionConfig {
	#[serde(alias = "key")]
	pub path: String,
	pub value: String,
}

/// Change an HCL attribute in blocks whose comments satisfy all conditions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeHcl {
	pub name: Option<String>,

	#[serde(alias = "attributeName", alias = "attribute_name")]
	pub attribute: String,

	#[serde(alias = "newValue")]
	pub new_value: String,

	#[serde(alias = "oldValue")]
	pub old_value: Option<String>,

	#[serde(default)]
	pub regex: bool,

	#[serde(default, alias = "commentConditions")]
	pub comment_conditions: Vec<CommentConditionConfig>,

	#[serde(alias = "filePattern")]
	pub file_pattern: Option<String>,
}

/// `{ pattern, value }`: `"<pattern> <value>"` must appear in the block's comments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommentConditionConfig {
	pub pattern: String,
	pub value: String,
}

impl Recipe {
	/// The recipe's `type` tag.
	pub fn kind(&self) -> &'static str {
		match self {
			Recipe::CreateFiles(_) => "create-files",
			Recipe::ChangeYaml(_) => "change-yaml",
			Recipe::ChangeHcl(_) => "change-hcl",
		}
	}

	/// The configured name, or a label derived from the recipe's settings.
	pub fn label(&self) -> String {
		let (name, subject) = match self {
			Recipe::CreateFiles(r) => (&r.name, &r.file_pattern),
			Recipe::ChangeYaml(r) => (&r.name, &r.target),
			Recipe::ChangeHcl(r) => (&r.name, &r.attribute),
		};
		match name {
			Some(name) => name.clone(),
			None => format!("{} {}", self.kind(), subject),
		}
	}

	/// Check every pattern, query and regex the recipe carries.
	pub fn validate(&self) -> Result<()> {
		CompiledRecipe::compile(self).map(|_| ())
	}
}

/// A loaded configuration with its source path for debugging/display.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The parsed configuration.
	pub config: Config,

	/// The path this config was loaded from.
	pub path: PathBuf,
}

/// Merged configuration from multiple config files in the cascade.
#[derive(Debug, Clone, Default)]
pub struct MergedConfig {
	/// All recipes from all configs, in cascade order.
	pub recipes: Vec<RecipeWithSource>,
}

/// A recipe with its source config path for debugging/display.
#[derive(Debug, Clone)]
pub struct RecipeWithSource {
	/// The recipe itself.
	pub recipe: Recipe,

	/// The config file this recipe came from.
	pub source: PathBuf,
}

impl Config {
	/// Validate all recipes in this config.
	pub fn validate(&self) -> Result<()> {
		for recipe in &self.recipes {
			recipe.validate()?;
		}
		Ok(())
	}
}

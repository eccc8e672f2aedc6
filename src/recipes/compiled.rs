use crate::config::types::{MergedConfig, Recipe, RecipeWithSource};
use crate::document::ParseError;
use crate::document::yaml::parse_stream;
use crate::error::{ReconfError, Result};
use crate::pattern::FilePattern;
use crate::query::QueryPath;
use crate::recipes::selector::{FileSelector, HCL_EXTENSIONS, YAML_EXTENSIONS};
use crate::rewrite::{
	ChangeHclAttribute, ChangeYamlProperty, CommentCondition, Condition, ValueTransform,
};
use std::path::{Path, PathBuf};

/// What a compiled recipe does.
#[derive(Debug, Clone)]
pub enum RecipeAction {
	CreateFiles {
		pattern: FilePattern,
		contents: String,
	},
	ChangeYaml {
		selector: FileSelector,
		rewrite: ChangeYamlProperty,
	},
	ChangeHcl {
		selector: FileSelector,
		rewrite: ChangeHclAttribute,
	},
}

/// A recipe with every pattern, query and regex compiled, ready to run.
#[derive(Debug, Clone)]
pub struct CompiledRecipe {
	/// Name used in logs.
	pub label: String,

	pub action: RecipeAction,

	/// Source config path (for debugging).
	pub source: PathBuf,
}

impl CompiledRecipe {
	/// Compile a recipe, reporting any configuration error it contains.
	pub fn compile(recipe: &Recipe) -> Result<Self> {
		let label = recipe.label();

		let action = match recipe {
			Recipe::CreateFiles(r) => {
				let pattern = FilePattern::parse(&r.file_pattern)?;
				parse_stream(&r.contents).map_err(|e| ReconfError::InvalidTemplate {
					pattern: r.file_pattern.clone(),
					reason: e.to_string(),
				})?;
				RecipeAction::CreateFiles {
					pattern,
					contents: r.contents.clone(),
				}
			}
			Recipe::ChangeYaml(r) => {
				let conditions = r
					.conditions
					.iter()
					.map(|c| Condition::new(&c.path, &c.value))
					.collect::<Result<Vec<_>>>()?;
				let transform =
					ValueTransform::new(r.old_value.as_deref(), &r.new_value, r.regex, &label)?;
				RecipeAction::ChangeYaml {
					selector: FileSelector::new(r.file_pattern.as_deref(), YAML_EXTENSIONS)?,
					rewrite: ChangeYamlProperty::new(
						conditions,
						QueryPath::parse(&r.target)?,
						transform,
					),
				}
			}
			Recipe::ChangeHcl(r) => {
				let conditions = r
					.comment_conditions
					.iter()
					.map(|c| CommentCondition::new(&c.pattern, &c.value))
					.collect();
				let transform =
					ValueTransform::new(r.old_value.as_deref(), &r.new_value, r.regex, &label)?;
				RecipeAction::ChangeHcl {
					selector: FileSelector::new(r.file_pattern.as_deref(), HCL_EXTENSIONS)?,
					rewrite: ChangeHclAttribute::new(&r.attribute, transform, conditions),
				}
			}
		};

		Ok(CompiledRecipe {
			label,
			action,
			source: PathBuf::new(),
		})
	}

	/// Compile a recipe from a RecipeWithSource.
	pub fn from_recipe_with_source(rws: &RecipeWithSource) -> Result<Self> {
		Ok(CompiledRecipe {
			source: rws.source.clone(),
			..Self::compile(&rws.recipe)?
		})
	}

	/// Whether this recipe rewrites the file at a workspace-relative path.
	pub fn selects(&self, path: &Path) -> bool {
		match &self.action {
			RecipeAction::CreateFiles { .. } => false,
			RecipeAction::ChangeYaml { selector, .. } | RecipeAction::ChangeHcl { selector, .. } => {
				selector.matches(path)
			}
		}
	}

	/// Rewrite file contents, returning the new text if anything changed.
	pub fn rewrite(&self, contents: &str) -> std::result::Result<Option<String>, ParseError> {
		match &self.action {
			RecipeAction::CreateFiles { .. } => Ok(None),
			RecipeAction::ChangeYaml { rewrite, .. } => rewrite.apply(contents),
			RecipeAction::ChangeHcl { rewrite, .. } => rewrite.apply(contents),
		}
	}
}

/// Compile all recipes in a merged config.
pub fn compile_recipes(config: &MergedConfig) -> Result<Vec<CompiledRecipe>> {
	config
		.recipes
		.iter()
		.map(CompiledRecipe::from_recipe_with_source)
		.collect()
}

use crate::error::{ReconfError, Result};
use crate::pattern::DirectorySet;
use crate::recipes::{CompiledRecipe, RecipeAction};
use crate::workspace::report::{ChangeKind, RunReport};
use crate::workspace::scan::scan;
use std::path::Path;
use tracing::{debug, info, warn};

/// Options for a workspace run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
	/// Compute changes without writing them.
	pub dry_run: bool,
}

/// Run every recipe, in order, over the workspace at `root`.
///
/// The workspace is scanned once. Change recipes see the contents left by
/// earlier recipes; create recipes resolve their targets against the scan.
/// Files that fail to parse are logged and skipped.
pub fn run(root: &Path, recipes: &[CompiledRecipe], options: RunOptions) -> Result<RunReport> {
	let files = scan(root)?;
	let dirs = DirectorySet::from_paths(&files);
	debug!(
		files = dirs.file_count(),
		directories = dirs.directories().count(),
		"scanned workspace"
	);

	let mut report = RunReport::default();
	for recipe in recipes {
		match &recipe.action {
			RecipeAction::CreateFiles { pattern, contents } => {
				for target in pattern.missing_targets(&dirs) {
					let path = target.to_path_buf();
					if report.get(&path).is_some() {
						continue;
					}
					info!(recipe = %recipe.label, path = %path.display(), "create file");
					report.record(path, ChangeKind::Created, contents.clone());
				}
			}
			RecipeAction::ChangeYaml { .. } | RecipeAction::ChangeHcl { .. } => {
				for path in files.iter().filter(|path| recipe.selects(path)) {
					rewrite_file(root, path, recipe, &mut report)?;
				}
			}
		}
	}

	if !options.dry_run {
		report.write(root)?;
	}
	Ok(report)
}

fn rewrite_file(
	root: &Path,
	path: &Path,
	recipe: &CompiledRecipe,
	report: &mut RunReport,
) -> Result<()> {
	let current = match report.get(path) {
		Some(change) => change.contents.clone(),
		None => match read_text(root, path)? {
			Some(text) => text,
			None => return Ok(()),
		},
	};

	match recipe.rewrite(&current) {
		Ok(Some(updated)) => {
			info!(recipe = %recipe.label, path = %path.display(), "modify file");
			report.record(path.to_path_buf(), ChangeKind::Modified, updated);
		}
		Ok(None) => debug!(recipe = %recipe.label, path = %path.display(), "no change"),
		Err(e) => {
			let err = ReconfError::DocumentParse {
				path: path.to_path_buf(),
				line: e.line,
				message: e.message,
			};
			warn!(recipe = %recipe.label, "skipping file: {}", err);
		}
	}
	Ok(())
}

/// Read a workspace file as UTF-8, or `None` if it is not text.
fn read_text(root: &Path, path: &Path) -> Result<Option<String>> {
	let full = root.join(path);
	let bytes = std::fs::read(&full).map_err(|source| ReconfError::Io { path: full, source })?;
	match String::from_utf8(bytes) {
		Ok(text) => Ok(Some(text)),
		Err(_) => {
			debug!(path = %path.display(), "skipping non-UTF-8 file");
			Ok(None)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::{LoadedConfig, merge_configs, parse_config_str};
	use crate::recipes::compile_recipes;
	use std::fs;
	use std::path::PathBuf;

	fn recipes(content: &str) -> Vec<CompiledRecipe> {
		let path = PathBuf::from(".reconf.toml");
		let config = parse_config_str(content, &path).unwrap();
		compile_recipes(&merge_configs(&[LoadedConfig { config, path }])).unwrap()
	}

	fn write(root: &Path, path: &str, contents: &str) {
		let full = root.join(path);
		fs::create_dir_all(full.parent().unwrap()).unwrap();
		fs::write(full, contents).unwrap();
	}

	#[test]
	fn test_creates_files_in_matching_directories() {
		let temp_dir = tempfile::tempdir().unwrap();
		let root = temp_dir.path();
		write(root, "projects/a/src/main.rs", "");
		write(root, "projects/b/README.md", "");
		write(root, "projects/c/config.yaml", "kind: Existing\n");
		write(root, "other/x/file.txt", "");

		let recipes = recipes(
			"[[recipes]]\ntype = \"create-files\"\nfile_pattern = \"projects/*/config.yaml\"\ncontents = \"kind: Config\\n\"\n",
		);
		let report = run(root, &recipes, RunOptions::default()).unwrap();

		let created: Vec<_> = report.changes.iter().map(|c| c.path.clone()).collect();
		assert_eq!(
			created,
			vec![
				PathBuf::from("projects/a/config.yaml"),
				PathBuf::from("projects/b/config.yaml"),
			]
		);
		assert!(report.changes.iter().all(|c| c.kind == ChangeKind::Created));
		assert_eq!(
			fs::read_to_string(root.join("projects/a/config.yaml")).unwrap(),
			"kind: Config\n"
		);
		assert_eq!(
			fs::read_to_string(root.join("projects/c/config.yaml")).unwrap(),
			"kind: Existing\n"
		);
	}

	#[test]
	fn test_change_recipes_compose() {
		let temp_dir = tempfile::tempdir().unwrap();
		let root = temp_dir.path();
		write(root, "k8s/app.yaml", "kind: Deployment\nspec:\n  replicas: 1\n");

		let recipes = recipes(
			r#"
[[recipes]]
type = "change-yaml"
target = "spec.replicas"
new_value = "2"

[[recipes]]
type = "change-yaml"
target = "spec.replicas"
old_value = "2"
new_value = "4"
"#,
		);
		let report = run(root, &recipes, RunOptions::default()).unwrap();
		assert_eq!(report.changes.len(), 1);
		assert_eq!(report.changes[0].kind, ChangeKind::Modified);
		assert_eq!(
			fs::read_to_string(root.join("k8s/app.yaml")).unwrap(),
			"kind: Deployment\nspec:\n  replicas: 4\n"
		);
	}

	#[test]
	fn test_dry_run_writes_nothing() {
		let temp_dir = tempfile::tempdir().unwrap();
		let root = temp_dir.path();
		write(root, "main.tf", "version = \"1.0.0\"\n");

		let recipes = recipes(
			"[[recipes]]\ntype = \"change-hcl\"\nattribute = \"version\"\nnew_value = \"2.0.0\"\n",
		);
		let report = run(root, &recipes, RunOptions { dry_run: true }).unwrap();
		assert_eq!(report.changes[0].contents, "version = \"2.0.0\"\n");
		assert_eq!(
			fs::read_to_string(root.join("main.tf")).unwrap(),
			"version = \"1.0.0\"\n"
		);
	}

	#[test]
	fn test_unparsable_files_are_skipped() {
		let temp_dir = tempfile::tempdir().unwrap();
		let root = temp_dir.path();
		write(root, "a/broken.yaml", "spec: [1,\n");
		write(root, "b/good.yaml", "spec:\n  replicas: 1\n");
		fs::write(root.join("b/binary.yaml"), [0xff, 0xfe, 0x00]).unwrap();

		let recipes = recipes(
			"[[recipes]]\ntype = \"change-yaml\"\ntarget = \"spec.replicas\"\nnew_value = \"3\"\n",
		);
		let report = run(root, &recipes, RunOptions::default()).unwrap();
		assert_eq!(report.changes.len(), 1);
		assert_eq!(report.changes[0].path, PathBuf::from("b/good.yaml"));
	}

	#[test]
	fn test_file_pattern_restricts_changes() {
		let temp_dir = tempfile::tempdir().unwrap();
		let root = temp_dir.path();
		write(root, "k8s/deployments/app.yaml", "spec:\n  replicas: 1\n");
		write(root, "other/app.yaml", "spec:\n  replicas: 1\n");

		let recipes = recipes(
			"[[recipes]]\ntype = \"change-yaml\"\ntarget = \"spec.replicas\"\nnew_value = \"3\"\nfile_pattern = \"**/k8s/**/*.yaml\"\n",
		);
		let report = run(root, &recipes, RunOptions::default()).unwrap();
		assert_eq!(report.changes.len(), 1);
		assert_eq!(
			fs::read_to_string(root.join("other/app.yaml")).unwrap(),
			"spec:\n  replicas: 1\n"
		);
	}
}

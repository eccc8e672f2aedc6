use crate::error::{ReconfError, Result};
use crate::pattern::glob::{ConcretePath, PathPattern, Segment};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::Path;

/// Directories and files observed while scanning a workspace.
///
/// Built as a fold over the scanned paths; every ancestor directory of every
/// file is recorded, the workspace root itself excluded.
#[derive(Debug, Clone, Default)]
pub struct DirectorySet {
	directories: HashSet<ConcretePath>,
	files: HashSet<ConcretePath>,
}

impl DirectorySet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record one existing file and all of its ancestor directories.
	pub fn with_file(mut self, path: &Path) -> Self {
		let file = ConcretePath::from_path(path);
		if file.is_empty() {
			return self;
		}
		self.directories.extend(file.ancestors());
		self.files.insert(file);
		self
	}

	/// Accumulate a directory set from every scanned file path.
	pub fn from_paths<I, P>(paths: I) -> Self
	where
		I: IntoIterator<Item = P>,
		P: AsRef<Path>,
	{
		paths
			.into_iter()
			.fold(Self::new(), |acc, path| acc.with_file(path.as_ref()))
	}

	pub fn directories(&self) -> impl Iterator<Item = &ConcretePath> {
		self.directories.iter()
	}

	pub fn contains_file(&self, file: &ConcretePath) -> bool {
		self.files.contains(file)
	}

	pub fn file_count(&self) -> usize {
		self.files.len()
	}
}

/// A validated file-creation pattern: a directory pattern plus a concrete file name.
#[derive(Debug, Clone)]
pub struct FilePattern {
	raw: String,
	directory: PathPattern,
	file_name: String,
}

impl FilePattern {
	/// Parse and validate a creation pattern such as `projects/*/config.yaml`.
	pub fn parse(pattern: &str) -> Result<Self> {
		let invalid = |reason: &str| ReconfError::InvalidFilePattern {
			pattern: pattern.to_string(),
			reason: reason.to_string(),
		};

		if pattern.trim().is_empty() {
			return Err(invalid("must be provided and not blank"));
		}
		if pattern.ends_with('/') {
			return Err(invalid(
				"must not end with a slash; specify a file name at the end",
			));
		}

		let mut segments = PathPattern::parse(pattern)?.segments().to_vec();
		if segments
			.iter()
			.any(|s| matches!(s, Segment::Literal(l) if l == ".."))
		{
			return Err(invalid("must not contain `..` segments"));
		}

		let file_name = match segments.pop() {
			Some(Segment::Literal(name)) => name,
			Some(_) => {
				return Err(invalid(
					"file name segment must be a concrete name, wildcards not supported",
				));
			}
			None => return Err(invalid("must contain a file name")),
		};

		Ok(FilePattern {
			raw: pattern.to_string(),
			directory: PathPattern::from_segments(segments),
			file_name,
		})
	}

	pub fn file_name(&self) -> &str {
		&self.file_name
	}

	/// Every file path this pattern denotes within the known directories.
	///
	/// A pattern without a directory part denotes a single root-level file.
	pub fn resolve(&self, dirs: &DirectorySet) -> BTreeSet<ConcretePath> {
		if self.directory.is_empty() {
			return BTreeSet::from([ConcretePath::new([self.file_name.as_str()])]);
		}

		dirs.directories()
			.filter(|dir| self.directory.matches(dir))
			.map(|dir| dir.join(&self.file_name))
			.collect()
	}

	/// Resolved targets that do not already exist.
	pub fn missing_targets(&self, dirs: &DirectorySet) -> BTreeSet<ConcretePath> {
		self.resolve(dirs)
			.into_iter()
			.filter(|target| !dirs.contains_file(target))
			.collect()
	}
}

impl fmt::Display for FilePattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.raw)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn dirs(files: &[&str]) -> DirectorySet {
		DirectorySet::from_paths(files.iter().map(Path::new))
	}

	fn targets(pattern: &str, files: &[&str]) -> Vec<String> {
		FilePattern::parse(pattern)
			.unwrap()
			.missing_targets(&dirs(files))
			.into_iter()
			.map(|p| p.to_string())
			.collect()
	}

	#[test]
	fn test_directory_set_records_all_ancestors() {
		let set = dirs(&["projects/project-a/config.yaml", "root.yaml"]);
		let mut directories: Vec<String> = set.directories().map(|d| d.to_string()).collect();
		directories.sort();
		assert_eq!(directories, vec!["projects", "projects/project-a"]);
		assert!(set.contains_file(&ConcretePath::parse("root.yaml")));
		assert_eq!(set.file_count(), 2);
	}

	#[test]
	fn test_rejects_blank_pattern() {
		let err = FilePattern::parse("   ").unwrap_err();
		assert!(matches!(err, ReconfError::InvalidFilePattern { .. }));
	}

	#[test]
	fn test_rejects_trailing_slash() {
		let err = FilePattern::parse("projects/*/").unwrap_err();
		assert!(err.to_string().contains("must not end with a slash"));
	}

	#[test]
	fn test_rejects_wildcard_file_name() {
		assert!(FilePattern::parse("projects/*").is_err());
		assert!(FilePattern::parse("projects/**").is_err());
		assert!(FilePattern::parse("projects/*.yaml").is_err());
	}

	#[test]
	fn test_rejects_parent_segments() {
		assert!(FilePattern::parse("../outside.yaml").is_err());
	}

	#[test]
	fn test_creates_only_where_missing() {
		let created = targets(
			"projects/*/config.yaml",
			&[
				"projects/project-a/existing.yaml",
				"projects/project-b/existing.yaml",
				"projects/project-c/existing.yaml",
				"projects/project-a/config.yaml",
			],
		);
		assert_eq!(
			created,
			vec![
				"projects/project-b/config.yaml",
				"projects/project-c/config.yaml"
			]
		);
	}

	#[test]
	fn test_existing_target_is_never_generated() {
		let created = targets(
			"projects/*/config.yaml",
			&[
				"projects/project-a/config.yaml",
				"projects/project-b/readme.md",
			],
		);
		assert_eq!(created, vec!["projects/project-b/config.yaml"]);
	}

	#[test]
	fn test_no_matching_directories_is_empty() {
		assert!(targets("projects/*/config.yaml", &["src/other.yaml"]).is_empty());
	}

	#[test]
	fn test_skips_partially_matching_directories() {
		let created = targets(
			"projects/*/config.yaml",
			&["projects/root.yaml", "projects/subdir/existing.yaml"],
		);
		assert_eq!(created, vec!["projects/subdir/config.yaml"]);
	}

	#[test]
	fn test_recursive_wildcard_at_every_depth() {
		let created = targets(
			"src/**/config.yaml",
			&[
				"src/existing.yaml",
				"src/main/existing.yaml",
				"src/main/lib/existing.yaml",
			],
		);
		assert_eq!(
			created,
			vec![
				"src/config.yaml",
				"src/main/config.yaml",
				"src/main/lib/config.yaml"
			]
		);
	}

	#[test]
	fn test_nested_resources_directories() {
		let created = targets(
			"src/**/resources/application.yaml",
			&[
				"src/resources/dummy.yaml",
				"src/main/lib/resources/dummy.yaml",
				"src/main/resources/config/resources/dummy.yaml",
			],
		);
		assert_eq!(
			created,
			vec![
				"src/main/lib/resources/application.yaml",
				"src/main/resources/application.yaml",
				"src/main/resources/config/resources/application.yaml",
				"src/resources/application.yaml",
			]
		);
	}

	#[test]
	fn test_star_and_double_star_combined() {
		let created = targets(
			"apps/*/config/**/settings.yaml",
			&[
				"apps/frontend/config/dev/dummy.yaml",
				"apps/backend/config/prod/nested/dummy.yaml",
			],
		);
		assert_eq!(
			created,
			vec![
				"apps/backend/config/prod/nested/settings.yaml",
				"apps/backend/config/prod/settings.yaml",
				"apps/backend/config/settings.yaml",
				"apps/frontend/config/dev/settings.yaml",
				"apps/frontend/config/settings.yaml",
			]
		);
	}

	#[test]
	fn test_multiple_double_stars_match_zero_segments() {
		let created = targets(
			"apps/**/config/**/settings.yaml",
			&[
				"apps/frontend/config/dev/other.yaml",
				"apps/backend/config/prod/other.yaml",
			],
		);
		assert_eq!(
			created,
			vec![
				"apps/backend/config/prod/settings.yaml",
				"apps/backend/config/settings.yaml",
				"apps/frontend/config/dev/settings.yaml",
				"apps/frontend/config/settings.yaml",
			]
		);
	}

	#[test]
	fn test_root_level_file() {
		assert_eq!(targets("root.yaml", &[]), vec!["root.yaml"]);
		assert!(targets("root.yaml", &["root.yaml"]).is_empty());
	}

	#[test]
	fn test_file_name_with_dots() {
		let created = targets(
			"config/*/application.prod.yaml",
			&["config/app1/existing.yaml"],
		);
		assert_eq!(created, vec!["config/app1/application.prod.yaml"]);
	}

	#[test]
	fn test_wildcard_within_directory_name() {
		let created = targets(
			"projects/project-*/config.yaml",
			&[
				"projects/project-a/existing.yaml",
				"projects/project-b/existing.yaml",
				"projects/other/existing.yaml",
			],
		);
		assert_eq!(
			created,
			vec![
				"projects/project-a/config.yaml",
				"projects/project-b/config.yaml"
			]
		);
	}
}

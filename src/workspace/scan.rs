use crate::error::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &[".git"];

/// List every file below `root`, as sorted root-relative paths.
pub fn scan(root: &Path) -> Result<Vec<PathBuf>> {
	let walker = WalkDir::new(root)
		.follow_links(false)
		.sort_by_file_name()
		.into_iter()
		.filter_entry(|entry| {
			entry.depth() == 0
				|| !(entry.file_type().is_dir()
					&& entry
						.file_name()
						.to_str()
						.is_some_and(|name| SKIPPED_DIRS.contains(&name)))
		});

	let mut files = Vec::new();
	for entry in walker {
		let entry = entry?;
		if !entry.file_type().is_file() {
			continue;
		}
		if let Ok(relative) = entry.path().strip_prefix(root) {
			files.push(relative.to_path_buf());
		}
	}
	files.sort();
	Ok(files)
}

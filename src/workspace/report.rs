use crate::error::{ReconfError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
	Modified,
	Created,
}

impl fmt::Display for ChangeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ChangeKind::Modified => write!(f, "M"),
			ChangeKind::Created => write!(f, "A"),
		}
	}
}

/// The final contents of one changed or created file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
	/// Workspace-relative path.
	pub path: PathBuf,
	pub kind: ChangeKind,
	pub contents: String,
}

/// Every file a run changed, in the order they were first touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
	pub changes: Vec<FileChange>,
}

impl RunReport {
	pub fn is_empty(&self) -> bool {
		self.changes.is_empty()
	}

	pub fn get(&self, path: &Path) -> Option<&FileChange> {
		self.changes.iter().find(|c| c.path == path)
	}

	/// Record new contents for `path`; a created file stays created.
	pub fn record(&mut self, path: PathBuf, kind: ChangeKind, contents: String) {
		match self.changes.iter_mut().find(|c| c.path == path) {
			Some(existing) => existing.contents = contents,
			None => self.changes.push(FileChange {
				path,
				kind,
				contents,
			}),
		}
	}

	/// Write every change below `root`, creating parent directories as needed.
	pub fn write(&self, root: &Path) -> Result<()> {
		for change in &self.changes {
			let path = root.join(&change.path);
			let io_error = |source| ReconfError::Io {
				path: path.clone(),
				source,
			};
			if let Some(parent) = path.parent() {
				std::fs::create_dir_all(parent).map_err(io_error)?;
			}
			std::fs::write(&path, &change.contents).map_err(io_error)?;
		}
		Ok(())
	}
}

use crate::error::{ReconfError, Result};
use regex::Regex;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A relative path broken into its non-empty segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConcretePath(Vec<String>);

impl ConcretePath {
	pub fn new<I, S>(segments: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		ConcretePath(
			segments
				.into_iter()
				.map(Into::into)
				.filter(|s: &String| !s.is_empty())
				.collect(),
		)
	}

	/// Split a `/`-separated string, dropping empty segments.
	pub fn parse(path: &str) -> Self {
		Self::new(path.split('/'))
	}

	/// Build from a filesystem path, keeping only normal components.
	pub fn from_path(path: &Path) -> Self {
		Self::new(path.components().filter_map(|c| match c {
			Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
			_ => None,
		}))
	}

	pub fn segments(&self) -> &[String] {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Every proper prefix of this path, longest first, excluding the empty path.
	pub fn ancestors(&self) -> impl Iterator<Item = ConcretePath> + '_ {
		(1..self.0.len())
			.rev()
			.map(|len| ConcretePath(self.0[..len].to_vec()))
	}

	pub fn join(&self, segment: &str) -> ConcretePath {
		let mut segments = self.0.clone();
		segments.push(segment.to_string());
		ConcretePath(segments)
	}

	pub fn to_path_buf(&self) -> PathBuf {
		self.0.iter().collect()
	}
}

impl fmt::Display for ConcretePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.join("/"))
	}
}

/// One segment of a wildcard path pattern.
#[derive(Debug, Clone)]
pub enum Segment {
	/// Exact match required.
	Literal(String),

	/// `*` on its own: exactly one segment with any content.
	SingleWildcard,

	/// A segment containing `*` or `?`, matched as an anchored glob.
	IntraSegmentGlob { source: String, regex: Regex },

	/// `**`: zero or more whole segments.
	RecursiveWildcard,
}

impl Segment {
	pub fn parse(segment: &str) -> Result<Self> {
		match segment {
			"**" => Ok(Segment::RecursiveWildcard),
			"*" => Ok(Segment::SingleWildcard),
			s if s.contains('*') || s.contains('?') => Ok(Segment::IntraSegmentGlob {
				source: s.to_string(),
				regex: glob_to_regex(s)?,
			}),
			s => Ok(Segment::Literal(s.to_string())),
		}
	}

	fn matches_one(&self, segment: &str) -> bool {
		match self {
			Segment::Literal(literal) => literal == segment,
			Segment::SingleWildcard => true,
			Segment::IntraSegmentGlob { regex, .. } => regex.is_match(segment),
			Segment::RecursiveWildcard => true,
		}
	}
}

impl fmt::Display for Segment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Segment::Literal(literal) => write!(f, "{}", literal),
			Segment::SingleWildcard => write!(f, "*"),
			Segment::IntraSegmentGlob { source, .. } => write!(f, "{}", source),
			Segment::RecursiveWildcard => write!(f, "**"),
		}
	}
}

/// Convert a single-segment glob into an anchored regex.
///
/// `*` becomes `.*` and `?` becomes `.`; everything else is matched literally.
fn glob_to_regex(glob: &str) -> Result<Regex> {
	let mut pattern = String::from("^");
	let mut literal = String::new();
	for c in glob.chars() {
		match c {
			'*' | '?' => {
				pattern.push_str(&regex::escape(&literal));
				literal.clear();
				pattern.push_str(if c == '*' { ".*" } else { "." });
			}
			_ => literal.push(c),
		}
	}
	pattern.push_str(&regex::escape(&literal));
	pattern.push('$');

	Regex::new(&pattern).map_err(|source| ReconfError::InvalidRegex {
		pattern: glob.to_string(),
		source,
	})
}

/// An ordered sequence of pattern segments, e.g. `src/**/config/*`.
#[derive(Debug, Clone, Default)]
pub struct PathPattern {
	segments: Vec<Segment>,
}

impl PathPattern {
	/// Parse a `/`-separated pattern. Empty segments are ignored.
	pub fn parse(pattern: &str) -> Result<Self> {
		let segments = pattern
			.split('/')
			.filter(|s| !s.is_empty())
			.map(Segment::parse)
			.collect::<Result<Vec<_>>>()?;
		Ok(PathPattern { segments })
	}

	pub fn from_segments(segments: Vec<Segment>) -> Self {
		PathPattern { segments }
	}

	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	/// Check whether a concrete path matches this pattern in full.
	pub fn matches(&self, path: &ConcretePath) -> bool {
		self.match_from(path.segments(), 0, 0)
	}

	fn match_from(&self, path: &[String], mut path_idx: usize, mut pattern_idx: usize) -> bool {
		let segments = &self.segments;

		while pattern_idx < segments.len() && path_idx < path.len() {
			let segment = &segments[pattern_idx];

			if let Segment::RecursiveWildcard = segment {
				// Consecutive `**` behave as one
				while pattern_idx + 1 < segments.len()
					&& matches!(segments[pattern_idx + 1], Segment::RecursiveWildcard)
				{
					pattern_idx += 1;
				}

				if pattern_idx + 1 == segments.len() {
					return true;
				}

				return (path_idx..=path.len())
					.any(|split| self.match_from(path, split, pattern_idx + 1));
			}

			if !segment.matches_one(&path[path_idx]) {
				return false;
			}
			path_idx += 1;
			pattern_idx += 1;
		}

		// Trailing `**` match zero remaining segments
		while pattern_idx < segments.len()
			&& matches!(segments[pattern_idx], Segment::RecursiveWildcard)
		{
			pattern_idx += 1;
		}

		pattern_idx == segments.len() && path_idx == path.len()
	}
}

impl fmt::Display for PathPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let parts: Vec<String> = self.segments.iter().map(|s| s.to_string()).collect();
		write!(f, "{}", parts.join("/"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn matches(pattern: &str, path: &str) -> bool {
		PathPattern::parse(pattern)
			.unwrap()
			.matches(&ConcretePath::parse(path))
	}

	#[test]
	fn test_literal_pattern_matches_same_path() {
		assert!(matches("a/b/c", "a/b/c"));
		assert!(!matches("a/b/c", "a/b"));
		assert!(!matches("a/b", "a/b/c"));
		assert!(!matches("a/b/c", "a/x/c"));
	}

	#[test]
	fn test_empty_segments_are_ignored() {
		assert!(matches("/a//b/", "a/b"));
		assert!(matches("a/b", "/a/b/"));
	}

	#[test]
	fn test_single_wildcard_matches_exactly_one_segment() {
		assert!(matches("a/*/z", "a/x/z"));
		assert!(!matches("a/*/z", "a/z"));
		assert!(!matches("a/*/z", "a/x/y/z"));
	}

	#[test]
	fn test_recursive_wildcard_matches_zero_or_more_segments() {
		assert!(matches("a/**/z", "a/z"));
		assert!(matches("a/**/z", "a/x/z"));
		assert!(matches("a/**/z", "a/x/y/z"));
		assert!(!matches("a/**/z", "a/x/y"));
		assert!(!matches("a/**/z", "b/z"));
	}

	#[test]
	fn test_trailing_recursive_wildcard() {
		assert!(matches("src/**", "src"));
		assert!(matches("src/**", "src/main/lib"));
		assert!(!matches("src/**", "lib/main"));
	}

	#[test]
	fn test_consecutive_recursive_wildcards_collapse() {
		assert!(matches("a/**/**/z", "a/z"));
		assert!(matches("a/**/**/z", "a/b/c/z"));
	}

	#[test]
	fn test_multiple_recursive_wildcards_backtrack() {
		let pattern = "apps/**/config/**";
		assert!(matches(pattern, "apps/frontend/config"));
		assert!(matches(pattern, "apps/frontend/config/dev"));
		assert!(matches(pattern, "apps/config/dev/nested"));
		assert!(!matches(pattern, "apps/frontend/settings"));
	}

	#[test]
	fn test_intra_segment_glob() {
		assert!(matches("projects/project-*", "projects/project-a"));
		assert!(matches("projects/project-*", "projects/project-"));
		assert!(!matches("projects/project-*", "projects/other"));
		assert!(matches("v?", "v1"));
		assert!(!matches("v?", "v10"));
	}

	#[test]
	fn test_intra_segment_glob_escapes_regex_metacharacters() {
		assert!(matches("app.(v*)", "app.(v2)"));
		assert!(!matches("app.(v*)", "appx(v2)"));
		assert!(matches("a+b*", "a+bc"));
	}

	#[test]
	fn test_empty_pattern_matches_only_empty_path() {
		assert!(matches("", ""));
		assert!(!matches("", "a"));
	}

	#[test]
	fn test_ancestors_exclude_self_and_root() {
		let path = ConcretePath::parse("a/b/c/file.yaml");
		let ancestors: Vec<String> = path.ancestors().map(|p| p.to_string()).collect();
		assert_eq!(ancestors, vec!["a/b/c", "a/b", "a"]);
	}

	#[test]
	fn test_display_round_trips_segments() {
		let pattern = PathPattern::parse("src/**/project-*/*").unwrap();
		assert_eq!(pattern.to_string(), "src/**/project-*/*");
		assert!(matches!(pattern.segments()[1], Segment::RecursiveWildcard));
		assert!(matches!(pattern.segments()[0], Segment::Literal(_)));
	}
}

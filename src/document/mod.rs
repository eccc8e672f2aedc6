//! Lossless document trees for YAML and HCL.
//!
//! This module handles:
//! - A span-annotated YAML tree over a closed set of node kinds
//! - A view of `hcl-edit` bodies, blocks and attributes with their comments
//! - Splicing scalar edits back into the original text

pub mod edit;
pub mod hcl;
pub mod yaml;

pub use edit::{TextEdit, apply_edits};

use crate::query::PathStep;

/// A byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
	pub start: usize,
	pub end: usize,
}

impl Span {
	pub fn new(start: usize, end: usize) -> Self {
		Span { start, end }
	}

	/// A zero-width span marking an insertion point.
	pub fn empty(at: usize) -> Self {
		Span { start: at, end: at }
	}

	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	pub fn slice<'a>(&self, source: &'a str) -> &'a str {
		&source[self.start..self.end]
	}
}

/// A syntax error found while building a document tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
	pub line: usize,
	pub message: String,
}

impl ParseError {
	pub(crate) fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
		let offset = offset.min(source.len());
		ParseError {
			line: source[..offset].matches('\n').count() + 1,
			message: message.into(),
		}
	}
}

/// How a scalar was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
	Plain,
	SingleQuoted,
	DoubleQuoted,
	/// `|` (literal) or `>` (folded) block scalar whose body lines start at `indent`.
	Block { folded: bool, indent: usize },
}

/// A leaf value with its decoded text and the span of its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
	pub value: String,
	pub style: ScalarStyle,
	pub span: Span,
}

/// A key/value pair inside a mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
	pub key: String,
	pub key_span: Span,
	pub value: Node,
}

/// A node of a document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
	Scalar(Scalar),
	Mapping(Vec<Entry>),
	Sequence(Vec<Node>),
	/// `*name`; never matched or rewritten.
	Alias { name: String, span: Span },
}

impl Node {
	pub fn as_scalar(&self) -> Option<&Scalar> {
		match self {
			Node::Scalar(scalar) => Some(scalar),
			_ => None,
		}
	}

	/// Look up a direct child of a mapping by key.
	#[cfg(test)]
	pub fn get(&self, key: &str) -> Option<&Node> {
		match self {
			Node::Mapping(entries) => entries.iter().find(|e| e.key == key).map(|e| &e.value),
			_ => None,
		}
	}

	/// Visit every scalar in document order together with its position path.
	pub fn walk_scalars<'a, F>(&'a self, visit: &mut F)
	where
		F: FnMut(&[PathStep], &'a Scalar),
	{
		let mut path = Vec::new();
		self.walk_inner(&mut path, visit);
	}

	fn walk_inner<'a, F>(&'a self, path: &mut Vec<PathStep>, visit: &mut F)
	where
		F: FnMut(&[PathStep], &'a Scalar),
	{
		match self {
			Node::Scalar(scalar) => visit(path, scalar),
			Node::Mapping(entries) => {
				for entry in entries {
					path.push(PathStep::Key(entry.key.clone()));
					entry.value.walk_inner(path, visit);
					path.pop();
				}
			}
			Node::Sequence(items) => {
				for (index, item) in items.iter().enumerate() {
					path.push(PathStep::Index(index));
					item.walk_inner(path, visit);
					path.pop();
				}
			}
			Node::Alias { .. } => {}
		}
	}

	/// All scalars whose position path satisfies `predicate`, in document order.
	pub fn find_scalars<P>(&self, predicate: P) -> Vec<(Vec<PathStep>, &Scalar)>
	where
		P: Fn(&[PathStep]) -> bool,
	{
		let mut found = Vec::new();
		self.walk_scalars(&mut |path, scalar| {
			if predicate(path) {
				found.push((path.to_vec(), scalar));
			}
		});
		found
	}
}

/// One independent document of a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
	pub span: Span,
	/// `None` for an empty document (e.g. a bare `---`).
	pub root: Option<Node>,
}

/// A multi-document stream, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
	pub documents: Vec<Document>,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scalar(value: &str) -> Node {
		Node::Scalar(Scalar {
			value: value.to_string(),
			style: ScalarStyle::Plain,
			span: Span::empty(0),
		})
	}

	fn entry(key: &str, value: Node) -> Entry {
		Entry {
			key: key.to_string(),
			key_span: Span::empty(0),
			value,
		}
	}

	#[test]
	fn test_walk_scalars_reports_paths_in_order() {
		let tree = Node::Mapping(vec![
			entry("kind", scalar("Deployment")),
			entry(
				"spec",
				Node::Mapping(vec![entry(
					"ports",
					Node::Sequence(vec![scalar("80"), scalar("443")]),
				)]),
			),
		]);

		let mut seen = Vec::new();
		tree.walk_scalars(&mut |path, scalar| {
			seen.push((crate::query::display_path(path), scalar.value.clone()));
		});

		assert_eq!(
			seen,
			vec![
				("$.kind".to_string(), "Deployment".to_string()),
				("$.spec.ports[0]".to_string(), "80".to_string()),
				("$.spec.ports[1]".to_string(), "443".to_string()),
			]
		);
	}

	#[test]
	fn test_find_scalars_with_predicate() {
		let tree = Node::Mapping(vec![
			entry("a", scalar("1")),
			entry("b", Node::Mapping(vec![entry("a", scalar("2"))])),
		]);
		let found = tree.find_scalars(|path| path.last() == Some(&PathStep::Key("a".into())));
		let values: Vec<_> = found.iter().map(|(_, s)| s.value.as_str()).collect();
		assert_eq!(values, vec!["1", "2"]);
		assert_eq!(tree.get("b").and_then(|b| b.get("a")), Some(&scalar("2")));
	}

	#[test]
	fn test_aliases_are_not_visited() {
		let tree = Node::Mapping(vec![
			entry("a", scalar("1")),
			entry(
				"b",
				Node::Alias {
					name: "v".to_string(),
					span: Span::empty(0),
				},
			),
		]);
		let found = tree.find_scalars(|_| true);
		assert_eq!(found.len(), 1);
		assert_eq!(tree.get("b").and_then(Node::as_scalar), None);
	}

	#[test]
	fn test_parse_error_reports_line() {
		let err = ParseError::at("a\nb\nc", 4, "boom");
		assert_eq!(err.line, 3);
		assert_eq!(err.to_string(), "line 3: boom");
	}
}

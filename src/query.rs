//! Query paths selecting positions inside a document tree.
//!
//! A query is root-relative and may start with `$`. Steps are separated by
//! `.`; `*` matches any child, `..` descends any number of levels, `[N]`
//! selects a sequence index and `['key']` a key containing dots.
//!
//! ```
//! use reconf_cli::query::{PathStep, QueryPath};
//!
//! let query = QueryPath::parse("$.spec.*.replicas").unwrap();
//! let path = [
//! 	PathStep::Key("spec".into()),
//! 	PathStep::Key("deployment".into()),
//! 	PathStep::Key("replicas".into()),
//! ];
//! assert!(query.matches(&path));
//! ```

use crate::error::{ReconfError, Result};
use std::fmt;

/// One step of a concrete position inside a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
	Key(String),
	Index(usize),
}

impl fmt::Display for PathStep {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PathStep::Key(key) => write!(f, ".{}", key),
			PathStep::Index(index) => write!(f, "[{}]", index),
		}
	}
}

/// Render a position path the way queries are written, e.g. `$.spec.ports[0]`.
pub fn display_path(path: &[PathStep]) -> String {
	let mut out = String::from("$");
	for step in path {
		out.push_str(&step.to_string());
	}
	out
}

/// One step of a parsed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStep {
	Key(String),
	Index(usize),
	/// `*` or `[*]`: any single child.
	Wildcard,
	/// `..`: zero or more steps of any kind.
	RecursiveDescent,
}

impl QueryStep {
	fn matches(&self, step: &PathStep) -> bool {
		match (self, step) {
			(QueryStep::Key(expected), PathStep::Key(actual)) => expected == actual,
			(QueryStep::Index(expected), PathStep::Index(actual)) => expected == actual,
			(QueryStep::Wildcard, _) => true,
			_ => false,
		}
	}
}

/// A parsed query path, compared by its source text.
#[derive(Debug, Clone)]
pub struct QueryPath {
	source: String,
	steps: Vec<QueryStep>,
}

impl PartialEq for QueryPath {
	fn eq(&self, other: &Self) -> bool {
		self.source == other.source
	}
}

impl Eq for QueryPath {}

impl QueryPath {
	pub fn parse(query: &str) -> Result<Self> {
		let steps = QueryParser::new(query).parse()?;
		Ok(QueryPath {
			source: query.trim().to_string(),
			steps,
		})
	}

	#[cfg(test)]
	pub fn steps(&self) -> &[QueryStep] {
		&self.steps
	}

	/// Check whether a concrete position path is selected by this query.
	pub fn matches(&self, path: &[PathStep]) -> bool {
		self.match_from(path, 0, 0)
	}

	fn match_from(&self, path: &[PathStep], mut path_idx: usize, mut step_idx: usize) -> bool {
		while step_idx < self.steps.len() {
			match &self.steps[step_idx] {
				QueryStep::RecursiveDescent => {
					return (path_idx..=path.len())
						.any(|split| self.match_from(path, split, step_idx + 1));
				}
				step => {
					if path_idx >= path.len() || !step.matches(&path[path_idx]) {
						return false;
					}
					path_idx += 1;
					step_idx += 1;
				}
			}
		}
		path_idx == path.len()
	}
}

impl fmt::Display for QueryPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.source)
	}
}

struct QueryParser<'a> {
	query: &'a str,
	chars: Vec<char>,
	pos: usize,
}

impl<'a> QueryParser<'a> {
	fn new(query: &'a str) -> Self {
		QueryParser {
			query,
			chars: query.trim().chars().collect(),
			pos: 0,
		}
	}

	fn error(&self, reason: impl Into<String>) -> ReconfError {
		ReconfError::InvalidQuery {
			query: self.query.to_string(),
			reason: reason.into(),
		}
	}

	fn peek(&self) -> Option<char> {
		self.chars.get(self.pos).copied()
	}

	fn parse(mut self) -> Result<Vec<QueryStep>> {
		let mut steps = Vec::new();
		let mut expect_step = true;

		if self.peek() == Some('$') {
			self.pos += 1;
			expect_step = false;
		}

		while let Some(c) = self.peek() {
			match c {
				'.' if self.chars.get(self.pos + 1) == Some(&'.') => {
					self.pos += 2;
					steps.push(QueryStep::RecursiveDescent);
					expect_step = true;
				}
				'.' => {
					if expect_step {
						return Err(self.error(format!("unexpected `.` at offset {}", self.pos)));
					}
					self.pos += 1;
					expect_step = true;
				}
				'[' => {
					steps.push(self.parse_bracket()?);
					expect_step = false;
				}
				_ => {
					if !expect_step {
						return Err(self.error(format!("expected `.` at offset {}", self.pos)));
					}
					steps.push(self.parse_name());
					expect_step = false;
				}
			}
		}

		if steps.is_empty() {
			return Err(self.error("must select at least one step"));
		}
		if expect_step {
			return Err(self.error("must not end with a separator"));
		}
		Ok(steps)
	}

	fn parse_name(&mut self) -> QueryStep {
		let start = self.pos;
		while let Some(c) = self.peek() {
			if c == '.' || c == '[' {
				break;
			}
			self.pos += 1;
		}
		let name: String = self.chars[start..self.pos].iter().collect();
		if name == "*" {
			QueryStep::Wildcard
		} else {
			QueryStep::Key(name)
		}
	}

	fn parse_bracket(&mut self) -> Result<QueryStep> {
		// Skip `[`
		self.pos += 1;
		let step = match self.peek() {
			Some(quote @ ('\'' | '"')) => {
				self.pos += 1;
				let start = self.pos;
				while self.peek().is_some_and(|c| c != quote) {
					self.pos += 1;
				}
				if self.peek().is_none() {
					return Err(self.error("unterminated quoted key"));
				}
				let key: String = self.chars[start..self.pos].iter().collect();
				self.pos += 1;
				QueryStep::Key(key)
			}
			Some('*') => {
				self.pos += 1;
				QueryStep::Wildcard
			}
			Some(c) if c.is_ascii_digit() => {
				let start = self.pos;
				while self.peek().is_some_and(|c| c.is_ascii_digit()) {
					self.pos += 1;
				}
				let digits: String = self.chars[start..self.pos].iter().collect();
				let index = digits
					.parse()
					.map_err(|_| self.error(format!("index `{}` is out of range", digits)))?;
				QueryStep::Index(index)
			}
			_ => return Err(self.error("expected index, `*` or quoted key inside `[]`")),
		};

		if self.peek() != Some(']') {
			return Err(self.error("missing `]`"));
		}
		self.pos += 1;
		Ok(step)
	}
}

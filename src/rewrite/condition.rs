use crate::document::Node;
use crate::error::Result;
use crate::query::QueryPath;

/// Requires the scalar at a query path to equal an expected value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
	pub query: QueryPath,
	pub expected: String,
}

impl Condition {
	pub fn new(query: &str, expected: &str) -> Result<Self> {
		Ok(Condition {
			query: QueryPath::parse(query)?,
			expected: expected.to_string(),
		})
	}

	/// Whether any scalar selected by the query equals the expected value.
	pub fn is_satisfied_by(&self, root: &Node) -> bool {
		root.find_scalars(|path| self.query.matches(path))
			.iter()
			.any(|(_, scalar)| scalar.value == self.expected)
	}
}

/// Evaluate all conditions against a document root (AND).
///
/// An empty list always holds; an empty document satisfies no condition.
pub fn all_match(root: Option<&Node>, conditions: &[Condition]) -> bool {
	if conditions.is_empty() {
		return true;
	}
	root.is_some_and(|root| conditions.iter().all(|c| c.is_satisfied_by(root)))
}

/// Requires `"<pattern> <value>"` to appear in a block's comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentCondition {
	pub pattern: String,
	pub value: String,
}

impl CommentCondition {
	pub fn new(pattern: &str, value: &str) -> Self {
		CommentCondition {
			pattern: pattern.to_string(),
			value: value.to_string(),
		}
	}

	/// The text searched for, with any leading `#` or `//` marker removed
	/// from the pattern.
	pub fn expected_text(&self) -> String {
		let pattern = self
			.pattern
			.strip_prefix('#')
			.or_else(|| self.pattern.strip_prefix("//"))
			.map_or(self.pattern.as_str(), str::trim);
		format!("{} {}", pattern, self.value)
	}
}

/// Whether every comment condition is found in `text` (AND).
pub fn all_comments_match(text: &str, conditions: &[CommentCondition]) -> bool {
	conditions.iter().all(|c| text.contains(&c.expected_text()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::document::yaml::parse_stream;

	fn root(source: &str) -> Node {
		parse_stream(source).unwrap().documents[0].root.clone().unwrap()
	}

	#[test]
	fn test_condition_on_nested_value() {
		let doc = root("kind: Deployment\nmetadata:\n  labels:\n    environment: production\n");
		assert!(Condition::new("kind", "Deployment").unwrap().is_satisfied_by(&doc));
		assert!(
			Condition::new("$.metadata.labels.environment", "production")
				.unwrap()
				.is_satisfied_by(&doc)
		);
		assert!(!Condition::new("kind", "Service").unwrap().is_satisfied_by(&doc));
		assert!(!Condition::new("missing", "x").unwrap().is_satisfied_by(&doc));
	}

	#[test]
	fn test_all_match_is_conjunction() {
		let doc = root("kind: Deployment\nmetadata:\n  name: web\n");
		let both = vec![
			Condition::new("kind", "Deployment").unwrap(),
			Condition::new("metadata.name", "web").unwrap(),
		];
		assert!(all_match(Some(&doc), &both));

		let one_wrong = vec![
			Condition::new("kind", "Deployment").unwrap(),
			Condition::new("metadata.name", "api").unwrap(),
		];
		assert!(!all_match(Some(&doc), &one_wrong));

		assert!(all_match(Some(&doc), &[]));
		assert!(all_match(None, &[]));
		assert!(!all_match(None, &both));
	}

	#[test]
	fn test_invalid_query_is_rejected() {
		assert!(Condition::new("spec.", "x").is_err());
	}

	#[test]
	fn test_comment_condition_strips_markers() {
		assert_eq!(
			CommentCondition::new("# release-channel:", "stable").expected_text(),
			"release-channel: stable"
		);
		assert_eq!(
			CommentCondition::new("// env:", "prod").expected_text(),
			"env: prod"
		);
		assert_eq!(
			CommentCondition::new("owner:", "infra").expected_text(),
			"owner: infra"
		);
	}

	#[test]
	fn test_all_comments_match() {
		let text = " release-channel: stable\n env: prod";
		let conditions = vec![
			CommentCondition::new("# release-channel:", "stable"),
			CommentCondition::new("# env:", "prod"),
		];
		assert!(all_comments_match(text, &conditions));
		assert!(!all_comments_match(" release-channel: stable\n env: dev", &conditions));
		assert!(all_comments_match("", &[]));
	}
}

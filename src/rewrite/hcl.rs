use crate::document::hcl::{self, Attribute, Block, Body, Expression, Item};
use crate::document::{ParseError, TextEdit, apply_edits};
use crate::rewrite::condition::{CommentCondition, all_comments_match};
use crate::rewrite::transform::ValueTransform;
use tracing::debug;

/// Set an HCL attribute in every block whose comments satisfy the conditions.
#[derive(Debug, Clone)]
pub struct ChangeHclAttribute {
	/// Name of the attribute to change, at any depth.
	pub attribute: String,

	/// Computes the new value.
	pub transform: ValueTransform,

	/// Checked against the nearest enclosing block; empty means always.
	pub comment_conditions: Vec<CommentCondition>,
}

impl ChangeHclAttribute {
	pub fn new(
		attribute: &str,
		transform: ValueTransform,
		comment_conditions: Vec<CommentCondition>,
	) -> Self {
		ChangeHclAttribute {
			attribute: attribute.to_string(),
			transform,
			comment_conditions,
		}
	}

	/// Rewrite an HCL file, returning the new text if anything changed.
	pub fn apply(&self, source: &str) -> Result<Option<String>, ParseError> {
		let body = hcl::parse(source)?;
		let mut edits = Vec::new();
		self.visit_body(&body, None, &mut edits);

		if edits.is_empty() {
			return Ok(None);
		}
		Ok(Some(apply_edits(source, &edits)))
	}

	fn visit_body(&self, body: &Body, enclosing: Option<&Block>, edits: &mut Vec<TextEdit>) {
		for item in &body.items {
			match item {
				Item::Block(block) => self.visit_body(&block.body, Some(block), edits),
				Item::Attribute(attribute) if attribute.name == self.attribute => {
					edits.extend(self.rewrite_attribute(attribute, enclosing));
				}
				Item::Attribute(_) => {}
			}
		}
	}

	fn conditions_hold(&self, block: Option<&Block>) -> bool {
		if self.comment_conditions.is_empty() {
			return true;
		}
		block.is_some_and(|b| all_comments_match(&b.comment_text(), &self.comment_conditions))
	}

	fn rewrite_attribute(&self, attribute: &Attribute, enclosing: Option<&Block>) -> Option<TextEdit> {
		if !self.conditions_hold(enclosing) {
			debug!(attribute = %attribute.name, "comment conditions not met");
			return None;
		}

		let (current, span, quoted) = match &attribute.value {
			Expression::QuotedLiteral { value, span } => (value, *span, true),
			Expression::Literal { value, span } => (value, *span, false),
			Expression::Other { .. } => return None,
		};
		let value = self.transform.compute_replacement(current)?;

		debug!(attribute = %attribute.name, from = %current, to = %value, "set attribute");
		let replacement = if quoted { hcl::quote(&value) } else { value };
		Some(TextEdit::new(span, replacement))
	}
}

use crate::document::yaml::{parse_stream, render_replacement};
use crate::document::{Document, ParseError, TextEdit, apply_edits};
use crate::query::{QueryPath, display_path};
use crate::rewrite::condition::{Condition, all_match};
use crate::rewrite::transform::ValueTransform;
use tracing::debug;

/// What to change once a document qualifies.
#[derive(Debug, Clone)]
pub struct MutationSpec {
	/// Selects the scalars to rewrite.
	pub target: QueryPath,

	/// Computes each scalar's new value.
	pub transform: ValueTransform,
}

/// The result of rewriting one document of a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
	ConditionsNotMet,
	TargetMissing,
	Unchanged,
	Changed(Vec<TextEdit>),
}

/// Set a YAML property in every document whose conditions all hold.
#[derive(Debug, Clone)]
pub struct ChangeYamlProperty {
	pub conditions: Vec<Condition>,
	pub mutation: MutationSpec,
}

impl ChangeYamlProperty {
	pub fn new(conditions: Vec<Condition>, target: QueryPath, transform: ValueTransform) -> Self {
		ChangeYamlProperty {
			conditions,
			mutation: MutationSpec { target, transform },
		}
	}

	/// Decide and compute the edits for a single document of `source`.
	pub fn rewrite_document(&self, source: &str, document: &Document) -> UnitOutcome {
		let root = document.root.as_ref();
		if !all_match(root, &self.conditions) {
			return UnitOutcome::ConditionsNotMet;
		}
		let Some(root) = root else {
			return UnitOutcome::TargetMissing;
		};

		let targets = root.find_scalars(|path| self.mutation.target.matches(path));
		if targets.is_empty() {
			return UnitOutcome::TargetMissing;
		}

		let edits: Vec<TextEdit> = targets
			.into_iter()
			.filter_map(|(path, scalar)| {
				let value = self.mutation.transform.compute_replacement(&scalar.value)?;
				let edit = TextEdit::new(scalar.span, render_replacement(scalar, &value));
				if edit.is_noop(source) {
					return None;
				}
				debug!(path = %display_path(&path), from = %scalar.value, to = %value, "set value");
				Some(edit)
			})
			.collect();

		if edits.is_empty() {
			UnitOutcome::Unchanged
		} else {
			UnitOutcome::Changed(edits)
		}
	}

	/// Rewrite a YAML stream, returning the new text if anything changed.
	///
	/// Each document is decided on its own; untouched documents keep their
	/// exact bytes.
	pub fn apply(&self, source: &str) -> Result<Option<String>, ParseError> {
		let stream = parse_stream(source)?;
		let mut edits = Vec::new();

		for (index, document) in stream.documents.iter().enumerate() {
			match self.rewrite_document(source, document) {
				UnitOutcome::Changed(mut unit_edits) => edits.append(&mut unit_edits),
				outcome => debug!(document = index, ?outcome, "document left unchanged"),
			}
		}

		if edits.is_empty() {
			return Ok(None);
		}
		Ok(Some(apply_edits(source, &edits)))
	}
}

use crate::document::Span;

/// Replace the text covered by `span` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
	pub span: Span,
	pub replacement: String,
}

impl TextEdit {
	pub fn new(span: Span, replacement: impl Into<String>) -> Self {
		TextEdit {
			span,
			replacement: replacement.into(),
		}
	}

	/// Whether applying this edit would leave `source` unchanged.
	pub fn is_noop(&self, source: &str) -> bool {
		self.span.slice(source) == self.replacement
	}
}

/// Apply non-overlapping edits to `source`.
///
/// Edits are applied back to front so earlier spans stay valid. An edit that
/// overlaps one already applied is dropped.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> String {
	let mut ordered: Vec<&TextEdit> = edits.iter().collect();
	ordered.sort_by(|a, b| b.span.start.cmp(&a.span.start).then(b.span.end.cmp(&a.span.end)));

	let mut out = source.to_string();
	let mut floor = usize::MAX;
	for edit in ordered {
		if edit.span.end > floor || edit.span.end > source.len() {
			continue;
		}
		out.replace_range(edit.span.start..edit.span.end, &edit.replacement);
		floor = edit.span.start;
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_apply_edits_in_any_order() {
		let source = "a: 1\nb: 2\n";
		let edits = vec![
			TextEdit::new(Span::new(3, 4), "10"),
			TextEdit::new(Span::new(8, 9), "20"),
		];
		assert_eq!(apply_edits(source, &edits), "a: 10\nb: 20\n");

		let reversed: Vec<_> = edits.into_iter().rev().collect();
		assert_eq!(apply_edits(source, &reversed), "a: 10\nb: 20\n");
	}

	#[test]
	fn test_insertion_at_empty_span() {
		let source = "key:\n";
		let edits = vec![TextEdit::new(Span::empty(4), " value")];
		assert_eq!(apply_edits(source, &edits), "key: value\n");
	}

	#[test]
	fn test_overlapping_edit_is_dropped() {
		let source = "abcdef";
		let edits = vec![
			TextEdit::new(Span::new(1, 4), "X"),
			TextEdit::new(Span::new(2, 5), "Y"),
		];
		assert_eq!(apply_edits(source, &edits), "abYf");
	}

	#[test]
	fn test_noop_detection() {
		let edit = TextEdit::new(Span::new(0, 3), "abc");
		assert!(edit.is_noop("abcdef"));
		assert!(!edit.is_noop("xyzdef"));
	}
}

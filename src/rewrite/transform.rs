use crate::error::{ReconfError, Result};
use regex::{Captures, Regex};

/// Decides which current values a recipe applies to.
#[derive(Debug, Clone)]
pub enum ValueMatcher {
	/// No `old_value`: every value is replaced.
	Any,

	/// Literal `old_value`: only an equal value is replaced.
	Exact(String),

	/// Regex `old_value`, anchored to match the whole value.
	Pattern { source: String, regex: Regex },
}

/// Computes the replacement for a scalar value.
#[derive(Debug, Clone)]
pub struct ValueTransform {
	/// Selects the values to replace.
	pub matcher: ValueMatcher,

	/// The new value; in regex mode `$N` refers to capture group N.
	pub template: String,
}

impl ValueTransform {
	/// Build a transform from recipe options.
	///
	/// `recipe` names the recipe in configuration errors.
	pub fn new(old_value: Option<&str>, new_value: &str, regex: bool, recipe: &str) -> Result<Self> {
		let old_value = old_value.filter(|v| !v.is_empty());

		let matcher = match (old_value, regex) {
			(None, true) => {
				return Err(ReconfError::MissingOldValue {
					recipe: recipe.to_string(),
				});
			}
			(None, false) => ValueMatcher::Any,
			(Some(old), false) => ValueMatcher::Exact(old.to_string()),
			(Some(old), true) => {
				let regex = Regex::new(&format!("^(?:{})$", old)).map_err(|source| {
					ReconfError::InvalidRegex {
						pattern: old.to_string(),
						source,
					}
				})?;
				ValueMatcher::Pattern {
					source: old.to_string(),
					regex,
				}
			}
		};

		Ok(ValueTransform {
			matcher,
			template: new_value.to_string(),
		})
	}

	/// The value that should replace `current`, or `None` when the matcher
	/// rejects it or nothing would change.
	pub fn compute_replacement(&self, current: &str) -> Option<String> {
		let replacement = match &self.matcher {
			ValueMatcher::Any => self.template.clone(),
			ValueMatcher::Exact(old) if old == current => self.template.clone(),
			ValueMatcher::Exact(_) => return None,
			ValueMatcher::Pattern { regex, .. } => {
				let captures = regex.captures(current)?;
				interpolate(&self.template, &captures)
			}
		};

		(replacement != current).then_some(replacement)
	}
}

/// Substitute `$N` group references in `template`.
///
/// Digits are consumed greedily while the number still names a group, so
/// `$10` is group 10 only when the pattern has ten groups. Groups that did
/// not participate expand to nothing and `\$` yields a literal `$`.
fn interpolate(template: &str, captures: &Captures<'_>) -> String {
	let group_count = captures.len();
	let chars: Vec<char> = template.chars().collect();
	let mut out = String::with_capacity(template.len());
	let mut i = 0;

	while i < chars.len() {
		match chars[i] {
			'\\' if chars.get(i + 1) == Some(&'$') => {
				out.push('$');
				i += 2;
			}
			'$' if chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) => {
				let mut group = 0usize;
				let mut j = i + 1;
				while let Some(digit) = chars.get(j).and_then(|c| c.to_digit(10)) {
					let next = group * 10 + digit as usize;
					if j > i + 1 && next >= group_count {
						break;
					}
					group = next;
					j += 1;
				}
				if let Some(m) = captures.get(group) {
					out.push_str(m.as_str());
				}
				i = j;
			}
			c => {
				out.push(c);
				i += 1;
			}
		}
	}
	out
}

//! HCL documents as seen by attribute rewrites.
//!
//! Files are parsed with `hcl-edit` and lowered into a small view holding
//! what a rewrite needs: block types and labels, attribute values classified
//! as literal or not together with their byte spans, and the comments
//! written before each block and attribute.

use crate::document::{ParseError, Span};
use hcl_edit::Span as _;
use hcl_edit::expr::Expression as HclExpression;
use hcl_edit::structure::{self as hcl_structure, BlockLabel, Structure};

type Result<T> = std::result::Result<T, ParseError>;

/// The contents of a file or of a block between `{` and `}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Body {
	pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
	Attribute(Attribute),
	Block(Block),
}

impl Item {
	/// Comment texts written directly before this item.
	pub fn leading_comments(&self) -> &[String] {
		match self {
			Item::Attribute(attribute) => &attribute.leading_comments,
			Item::Block(block) => &block.leading_comments,
		}
	}
}

/// `name = expression`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	pub name: String,
	pub value: Expression,
	pub leading_comments: Vec<String>,
}

/// `type "label" ... { body }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
	pub block_type: String,
	pub labels: Vec<String>,
	pub body: Body,
	pub leading_comments: Vec<String>,
	pub span: Span,
}

impl Block {
	/// The block's own leading comments followed by those of every item
	/// directly in its body, concatenated as written without separators.
	pub fn comment_text(&self) -> String {
		self.leading_comments
			.iter()
			.chain(self.body.items.iter().flat_map(|item| item.leading_comments()))
			.map(String::as_str)
			.collect()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
	/// A quoted string with no interpolation; `span` includes the quotes.
	QuotedLiteral { value: String, span: Span },
	/// A bare number or boolean.
	Literal { value: String, span: Span },
	/// Anything else: references, function calls, collections, templates.
	Other { span: Span },
}

impl Expression {
	pub fn span(&self) -> Span {
		match self {
			Expression::QuotedLiteral { span, .. }
			| Expression::Literal { span, .. }
			| Expression::Other { span } => *span,
		}
	}

	/// The literal value, if this expression is one.
	pub fn literal_value(&self) -> Option<&str> {
		match self {
			Expression::QuotedLiteral { value, .. } | Expression::Literal { value, .. } => Some(value),
			Expression::Other { .. } => None,
		}
	}
}

/// Parse an HCL file into its top-level body.
pub fn parse(source: &str) -> Result<Body> {
	let body = hcl_edit::parser::parse_body(source).map_err(|err| ParseError {
		line: err.location().line(),
		message: err.message().to_string(),
	})?;
	let (body, _) = Lower { source }.body(&body, 0)?;
	Ok(body)
}

/// Render `value` as a quoted HCL string.
pub fn quote(value: &str) -> String {
	let mut out = String::from("\"");
	let mut chars = value.chars().peekable();
	while let Some(c) = chars.next() {
		match c {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\t' => out.push_str("\\t"),
			'\r' => out.push_str("\\r"),
			'$' | '%' if chars.peek() == Some(&'{') => {
				out.push(c);
				out.push(c);
			}
			c => out.push(c),
		}
	}
	out.push('"');
	out
}

struct Lower<'a> {
	source: &'a str,
}

impl Lower<'_> {
	fn span_of<T: hcl_edit::Span>(&self, node: &T, what: &str) -> Result<Span> {
		node.span()
			.map(|range| Span::new(range.start, range.end))
			.ok_or_else(|| ParseError::at(self.source, 0, format!("{} has no source position", what)))
	}

	/// Lower a body whose text starts at `start`.
	///
	/// Returns the body and the offset just past its last item.
	fn body(&self, body: &hcl_structure::Body, start: usize) -> Result<(Body, usize)> {
		let mut items = Vec::new();
		let mut cursor = start;
		for structure in body.iter() {
			let (item, end) = match structure {
				Structure::Attribute(attribute) => self.attribute(attribute, cursor)?,
				Structure::Block(block) => self.block(block, cursor)?,
			};
			items.push(item);
			cursor = end;
		}
		Ok((Body { items }, cursor))
	}

	fn attribute(&self, attribute: &hcl_structure::Attribute, cursor: usize) -> Result<(Item, usize)> {
		let name = attribute.key.value().as_str();
		let key_span = self.span_of(&attribute.key, name)?;
		let value_span = self.span_of(&attribute.value, name)?;

		let item = Item::Attribute(Attribute {
			name: name.to_string(),
			value: self.expression(&attribute.value, value_span),
			leading_comments: comments_between(self.source, cursor, key_span.start),
		});
		Ok((item, value_span.end))
	}

	fn block(&self, block: &hcl_structure::Block, cursor: usize) -> Result<(Item, usize)> {
		let block_type = block.ident.value().as_str();
		let ident_span = self.span_of(&block.ident, block_type)?;
		let open = scan_to(self.source, ident_span.end, b'{')
			.ok_or_else(|| ParseError::at(self.source, ident_span.start, "block has no body"))?;
		let (body, last) = self.body(&block.body, open + 1)?;
		let close = scan_to(self.source, last, b'}')
			.ok_or_else(|| ParseError::at(self.source, open, "unclosed block"))?;

		let item = Item::Block(Block {
			block_type: block_type.to_string(),
			labels: block.labels.iter().map(label_text).collect(),
			body,
			leading_comments: comments_between(self.source, cursor, ident_span.start),
			span: Span::new(ident_span.start, close + 1),
		});
		Ok((item, close + 1))
	}

	fn expression(&self, expression: &HclExpression, span: Span) -> Expression {
		let text = span.slice(self.source);
		match expression {
			HclExpression::String(value)
				if !value.value().is_empty()
					&& text.len() >= 2
					&& text.starts_with('"')
					&& text.ends_with('"') =>
			{
				Expression::QuotedLiteral {
					value: value.value().clone(),
					span,
				}
			}
			HclExpression::Number(_) | HclExpression::Bool(_) | HclExpression::UnaryOp(_)
				if is_bare_literal(text) =>
			{
				Expression::Literal {
					value: text.to_string(),
					span,
				}
			}
			_ => Expression::Other { span },
		}
	}
}

fn label_text(label: &BlockLabel) -> String {
	match label {
		BlockLabel::Ident(ident) => ident.value().as_str().to_string(),
		BlockLabel::String(text) => text.value().clone(),
	}
}

fn is_bare_literal(text: &str) -> bool {
	if text == "true" || text == "false" {
		return true;
	}
	let digits = text.strip_prefix('-').unwrap_or(text);
	digits.starts_with(|c: char| c.is_ascii_digit()) && digits.parse::<f64>().is_ok()
}

/// Offset of the first `target` byte at or after `from`, outside comments
/// and quoted strings.
fn scan_to(source: &str, from: usize, target: u8) -> Option<usize> {
	let bytes = source.as_bytes();
	let mut i = from;
	while i < bytes.len() {
		match bytes[i] {
			b if b == target => return Some(i),
			b'"' => {
				i += 1;
				while i < bytes.len() && bytes[i] != b'"' {
					i += if bytes[i] == b'\\' { 2 } else { 1 };
				}
				i += 1;
			}
			b'#' => i = line_end(source, i),
			b'/' if bytes.get(i + 1) == Some(&b'/') => i = line_end(source, i),
			b'/' if bytes.get(i + 1) == Some(&b'*') => {
				i = source[i + 2..].find("*/").map_or(bytes.len(), |close| i + 2 + close + 2);
			}
			_ => i += 1,
		}
	}
	None
}

fn line_end(source: &str, from: usize) -> usize {
	source[from..].find('\n').map_or(source.len(), |i| from + i)
}

/// Comment texts found between two items, without their `#`, `//` or
/// `/* */` markers.
fn comments_between(source: &str, from: usize, to: usize) -> Vec<String> {
	let gap = &source[from..to];
	let bytes = gap.as_bytes();
	let mut comments = Vec::new();
	let mut i = 0;
	while i < bytes.len() {
		let marker = match bytes[i] {
			b'#' => 1,
			b'/' if matches!(bytes.get(i + 1), Some(b'/' | b'*')) => 2,
			_ => {
				i += 1;
				continue;
			}
		};
		if bytes[i] == b'/' && bytes[i + 1] == b'*' {
			let close = gap[i + 2..].find("*/").map_or(gap.len(), |c| i + 2 + c);
			comments.push(gap[i + 2..close].to_string());
			i = (close + 2).min(gap.len());
		} else {
			let end = gap[i..].find('\n').map_or(gap.len(), |e| i + e);
			comments.push(gap[i + marker..end].trim_end_matches('\r').to_string());
			i = end;
		}
	}
	comments
}

#[cfg(test)]
mod tests {
	use super::*;

	fn attribute<'a>(body: &'a Body, name: &str) -> &'a Attribute {
		body.items
			.iter()
			.find_map(|item| match item {
				Item::Attribute(a) if a.name == name => Some(a),
				_ => None,
			})
			.unwrap_or_else(|| panic!("missing attribute {}", name))
	}

	fn block(body: &Body, index: usize) -> &Block {
		let blocks: Vec<_> = body
			.items
			.iter()
			.filter_map(|item| match item {
				Item::Block(b) => Some(b),
				_ => None,
			})
			.collect();
		blocks[index]
	}

	#[test]
	fn test_parse_module_block() {
		let source = r#"module "app" {
  # release-channel: stable
  source = "registry.example.com/modules/app"

  name = "my-app"
  version = "1.0.0"
  enabled = true
}
"#;
		let body = parse(source).unwrap();
		let module = block(&body, 0);
		assert_eq!(module.block_type, "module");
		assert_eq!(module.labels, vec!["app"]);
		assert_eq!(module.span.slice(source), &source[..source.len() - 1]);

		let version = attribute(&module.body, "version");
		assert_eq!(version.value.literal_value(), Some("1.0.0"));
		assert_eq!(version.value.span().slice(source), "\"1.0.0\"");

		let enabled = attribute(&module.body, "enabled");
		assert!(matches!(enabled.value, Expression::Literal { .. }));

		let src = attribute(&module.body, "source");
		assert_eq!(src.leading_comments, vec![" release-channel: stable"]);
	}

	#[test]
	fn test_comment_text_concatenates_block_and_body_comments() {
		let source = "// owner: infra\nresource \"x\" \"y\" {\n  # env: prod\n  a = 1\n  /* tier: gold */\n  b = 2\n  # dangling\n}\n";
		let body = parse(source).unwrap();
		let resource = block(&body, 0);
		assert_eq!(resource.labels, vec!["x", "y"]);
		assert_eq!(resource.comment_text(), " owner: infra env: prod tier: gold ");
	}

	#[test]
	fn test_comments_of_previous_block_stay_with_it() {
		let source = "a {\n  x = 1\n  # inside a\n}\n# before b\nb {\n  y = 2\n}\n";
		let body = parse(source).unwrap();
		assert_eq!(block(&body, 0).comment_text(), "");
		assert_eq!(block(&body, 1).leading_comments, vec![" before b"]);
	}

	#[test]
	fn test_expression_classification() {
		let source = r#"
a = "plain"
b = "${var.x}-suffix"
c = var.region
d = 42
e = ["x", "y"]
f = ""
g = "$${literal}"
h = null
i = -1.5
"#;
		let body = parse(source).unwrap();
		assert!(matches!(attribute(&body, "a").value, Expression::QuotedLiteral { .. }));
		assert!(matches!(attribute(&body, "b").value, Expression::Other { .. }));
		assert!(matches!(attribute(&body, "c").value, Expression::Other { .. }));
		assert_eq!(attribute(&body, "d").value.literal_value(), Some("42"));
		assert!(matches!(attribute(&body, "e").value, Expression::Other { .. }));
		assert!(matches!(attribute(&body, "f").value, Expression::Other { .. }));
		assert_eq!(attribute(&body, "g").value.literal_value(), Some("${literal}"));
		assert!(matches!(attribute(&body, "h").value, Expression::Other { .. }));
		assert_eq!(attribute(&body, "i").value.literal_value(), Some("-1.5"));
	}

	#[test]
	fn test_multiline_expressions_and_heredocs() {
		let source = r#"locals {
  tags = {
    team = "core" # inline
  }
  script = <<-EOT
    echo "}"
  EOT
  after = "ok"
}
"#;
		let body = parse(source).unwrap();
		let locals = block(&body, 0);
		assert_eq!(locals.body.items.len(), 3);
		assert_eq!(attribute(&locals.body, "after").value.literal_value(), Some("ok"));
	}

	#[test]
	fn test_one_line_block_and_trailing_comment() {
		let source = "variable \"v\" { default = \"1\" }\nx = 2 # note\ny = 3\n";
		let body = parse(source).unwrap();
		let variable = block(&body, 0);
		let default = attribute(&variable.body, "default");
		assert_eq!(default.value.span().slice(source), "\"1\"");
		assert_eq!(attribute(&body, "x").value.span().slice(source), "2");
		assert_eq!(attribute(&body, "y").leading_comments, vec![" note"]);
	}

	#[test]
	fn test_parse_errors() {
		assert!(parse("a {\n  b = 1\n").is_err());
		assert!(parse("a = \"open\n").is_err());
		assert!(parse("a = (1\n").is_err());

		let err = parse("x = 1\n= 1\n").unwrap_err();
		assert!(err.line >= 1);
	}

	#[test]
	fn test_scan_skips_strings_and_comments() {
		let source = "module \"a{b\" /* { */ {";
		assert_eq!(scan_to(source, 6, b'{'), Some(source.len() - 1));
	}

	#[test]
	fn test_quote_escapes() {
		assert_eq!(quote("2.0.0"), "\"2.0.0\"");
		assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
		assert_eq!(quote("${x}"), "\"$${x}\"");
	}
}

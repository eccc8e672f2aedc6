//! A lossless YAML reader.
//!
//! The parser builds a [`Node`] tree in which every scalar remembers the byte
//! span of its source text and its quoting style, so a value can be replaced
//! in place without reformatting anything else in the file. It covers the
//! block and flow styles found in configuration files: nested mappings,
//! sequences (including compact `- key: value` items), quoted and plain
//! scalars over one or more lines, `|`/`>` block scalars, `? key` entries,
//! comments and `---` document markers.
//!
//! Anchors and tags are node properties: they stay in the source in front of
//! the value they decorate and are never part of a scalar's value or span, so
//! rewriting `a: &v 1` yields `a: &v 2`. Aliases become [`Node::Alias`].

use crate::document::{Document, Entry, Node, ParseError, Scalar, ScalarStyle, Span, Stream};

type Result<T> = std::result::Result<T, ParseError>;

/// Parse a (possibly multi-document) YAML stream.
pub fn parse_stream(source: &str) -> Result<Stream> {
	let lines = split_lines(source);
	let documents = split_documents(source, &lines)
		.into_iter()
		.map(|unit| parse_unit(source, &lines, unit))
		.collect::<Result<Vec<_>>>()?;
	Ok(Stream { documents })
}

#[derive(Debug, Clone, Copy)]
struct RawLine {
	start: usize,
	/// End of the line content, excluding `\r\n`.
	end: usize,
	indent: usize,
	blank: bool,
	comment: bool,
}

fn split_lines(source: &str) -> Vec<RawLine> {
	let mut lines = Vec::new();
	// Offsets stay relative to the full source, byte order mark included
	let (mut start, text) = match source.strip_prefix('\u{feff}') {
		Some(rest) => ('\u{feff}'.len_utf8(), rest),
		None => (0, source),
	};
	for piece in text.split_inclusive('\n') {
		let content = piece.trim_end_matches('\n').trim_end_matches('\r');
		let indent = content.len() - content.trim_start_matches(' ').len();
		let rest = &content[indent..];
		lines.push(RawLine {
			start,
			end: start + content.len(),
			indent,
			blank: rest.trim().is_empty(),
			comment: rest.starts_with('#') || (indent == 0 && rest.starts_with('%')),
		});
		start += piece.len();
	}
	lines
}

/// A range of lines forming one document.
#[derive(Debug, Clone, Copy)]
struct Unit {
	first: usize,
	last: usize,
	span_start: usize,
	explicit: bool,
	/// Content following `---` on the marker line.
	inline: Option<(usize, usize)>,
}

fn is_marker(text: &str, marker: &str) -> bool {
	text.starts_with(marker)
		&& text[marker.len()..]
			.chars()
			.next()
			.is_none_or(|c| c == ' ' || c == '\t')
}

fn split_documents(source: &str, lines: &[RawLine]) -> Vec<Unit> {
	let mut units = Vec::new();
	let mut current = Unit {
		first: 0,
		last: 0,
		span_start: 0,
		explicit: false,
		inline: None,
	};

	let has_content = |unit: &Unit| {
		unit.inline.is_some() || lines[unit.first..unit.last].iter().any(|l| !l.blank && !l.comment)
	};

	for (i, line) in lines.iter().enumerate() {
		let text = &source[line.start..line.end];
		if line.indent == 0 && is_marker(text, "---") {
			if current.explicit || has_content(&current) {
				units.push(current);
			}
			let after = &text[3..];
			let content = after.trim_start();
			let inline = (!content.is_empty() && !content.starts_with('#')).then(|| {
				let column = 3 + after.len() - content.len();
				(line.start + column, column)
			});
			current = Unit {
				first: i + 1,
				last: i + 1,
				span_start: line.start,
				explicit: true,
				inline,
			};
		} else if line.indent == 0 && is_marker(text, "...") {
			if current.explicit || has_content(&current) {
				units.push(current);
			}
			current = Unit {
				first: i + 1,
				last: i + 1,
				span_start: line.end,
				explicit: false,
				inline: None,
			};
		} else {
			current.last = i + 1;
		}
	}
	if current.explicit || has_content(&current) {
		units.push(current);
	}
	units
}

fn parse_unit(source: &str, lines: &[RawLine], unit: Unit) -> Result<Document> {
	let unit_lines = &lines[unit.first..unit.last];
	let span_end = unit_lines.last().map_or_else(
		|| unit.inline.map_or(unit.span_start, |(offset, _)| offset),
		|l| l.end,
	);
	let limit = match unit.inline {
		Some((offset, _)) => span_end.max(source[offset..].find('\n').map_or(source.len(), |i| offset + i)),
		None => span_end,
	};

	// Inline content keeps the marker line in view so it can be consumed
	let first = if unit.inline.is_some() { unit.first - 1 } else { unit.first };
	let mut parser = Parser {
		source,
		lines: &lines[first..unit.last],
		pos: unit.first - first,
		pending: unit.inline.map(|(offset, column)| Line {
			offset,
			indent: column,
			text: line_text(source, offset),
		}),
		limit,
	};

	let root = match parser.peek()? {
		Some(line) => Some(parser.parse_block(line, None)?),
		None => None,
	};
	if let Some(line) = parser.peek()? {
		return Err(ParseError::at(source, line.offset, "unexpected content"));
	}

	Ok(Document {
		span: Span::new(unit.span_start, span_end.max(limit)),
		root,
	})
}

fn line_text(source: &str, offset: usize) -> &str {
	let end = source[offset..].find('\n').map_or(source.len(), |i| offset + i);
	source[offset..end].trim_end()
}

/// A significant line, or the remainder of one after a `- ` or `---` indicator.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
	offset: usize,
	indent: usize,
	text: &'a str,
}

fn is_seq_item(text: &str) -> bool {
	text == "-" || text.starts_with("- ") || text.starts_with("-\t")
}

fn is_explicit_key(text: &str) -> bool {
	text == "?" || text.starts_with("? ") || text.starts_with("?\t")
}

fn is_explicit_value(text: &str) -> bool {
	text == ":" || text.starts_with(": ") || text.starts_with(":\t")
}

fn is_flow_indicator(b: u8) -> bool {
	matches!(b, b',' | b'[' | b']' | b'{' | b'}')
}

/// Length of the anchor and tag properties leading `text`, without and with
/// the whitespace that follows them.
fn properties_len(text: &str, flow: bool) -> (usize, usize) {
	let bytes = text.as_bytes();
	let mut tokens_end = 0;
	let mut i = 0;
	while i < bytes.len() && matches!(bytes[i], b'&' | b'!') {
		if text[i..].starts_with("!<") {
			i = text[i..].find('>').map_or(bytes.len(), |close| i + close + 1);
		} else {
			while i < bytes.len()
				&& !matches!(bytes[i], b' ' | b'\t')
				&& !(flow && is_flow_indicator(bytes[i]))
			{
				i += 1;
			}
		}
		tokens_end = i;
		while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
			i += 1;
		}
	}
	(tokens_end, i)
}

/// Index of the `:` that ends the key of a block mapping entry, if `text` is one.
fn mapping_colon(text: &str) -> Option<usize> {
	let bytes = text.as_bytes();
	let first = *bytes.first()?;
	if matches!(first, b'#' | b'[' | b'{' | b'|' | b'>') || is_seq_item(text) {
		return None;
	}

	let separator = |i: usize| {
		bytes[i] == b':' && (i + 1 == bytes.len() || bytes[i + 1] == b' ' || bytes[i + 1] == b'\t')
	};

	if first == b'"' || first == b'\'' {
		let close = closing_quote(text, 0)?;
		let mut i = close + 1;
		while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
			i += 1;
		}
		return (i < bytes.len() && separator(i)).then_some(i);
	}

	for i in 0..bytes.len() {
		if separator(i) {
			return Some(i);
		}
		if bytes[i] == b'#' && i > 0 && (bytes[i - 1] == b' ' || bytes[i - 1] == b'\t') {
			return None;
		}
	}
	None
}

/// Index of the quote closing the quoted scalar opening at `open`, on one line.
fn closing_quote(text: &str, open: usize) -> Option<usize> {
	let bytes = text.as_bytes();
	let quote = bytes[open];
	let mut i = open + 1;
	while i < bytes.len() {
		match bytes[i] {
			b'\\' if quote == b'"' => i += 2,
			b'\'' if quote == b'\'' && bytes.get(i + 1) == Some(&b'\'') => i += 2,
			b if b == quote => return Some(i),
			_ => i += 1,
		}
	}
	None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chomping {
	Strip,
	Clip,
	Keep,
}

struct Parser<'a> {
	source: &'a str,
	lines: &'a [RawLine],
	pos: usize,
	pending: Option<Line<'a>>,
	limit: usize,
}

impl<'a> Parser<'a> {
	fn error(&self, offset: usize, message: impl Into<String>) -> ParseError {
		ParseError::at(self.source, offset, message)
	}

	fn peek(&self) -> Result<Option<Line<'a>>> {
		if let Some(line) = self.pending {
			return Ok(Some(line));
		}
		for raw in &self.lines[self.pos..] {
			if raw.blank || raw.comment {
				continue;
			}
			let text = &self.source[raw.start + raw.indent..raw.end];
			if text.starts_with('\t') {
				return Err(self.error(raw.start, "tab characters are not allowed in indentation"));
			}
			return Ok(Some(Line {
				offset: raw.start + raw.indent,
				indent: raw.indent,
				text: text.trim_end(),
			}));
		}
		Ok(None)
	}

	fn advance(&mut self) {
		if self.pending.take().is_some() {
			return;
		}
		while self.pos < self.lines.len() {
			let raw = self.lines[self.pos];
			self.pos += 1;
			if !raw.blank && !raw.comment {
				break;
			}
		}
	}

	fn parse_block(&mut self, line: Line<'a>, parent: Option<usize>) -> Result<Node> {
		if is_seq_item(line.text) {
			self.parse_sequence(line.indent)
		} else if is_explicit_key(line.text) || mapping_colon(line.text).is_some() {
			self.parse_mapping(line.indent)
		} else {
			self.advance();
			self.parse_value(line.text, line.offset, parent, false)
		}
	}

	fn parse_mapping(&mut self, indent: usize) -> Result<Node> {
		let mut entries = Vec::new();
		while let Some(line) = self.peek()? {
			if line.indent < indent || (line.indent == indent && is_seq_item(line.text)) {
				break;
			}
			if line.indent > indent {
				return Err(self.error(line.offset, "unexpected indentation"));
			}
			if is_explicit_key(line.text) {
				entries.push(self.parse_explicit_entry(line, indent)?);
				continue;
			}
			let colon = mapping_colon(line.text)
				.ok_or_else(|| self.error(line.offset, "expected a mapping entry"))?;
			let (key, key_span) = self.decode_key(&line.text[..colon], line.offset)?;
			self.advance();

			let value = self.parse_value(
				&line.text[colon + 1..],
				line.offset + colon + 1,
				Some(indent),
				true,
			)?;
			entries.push(Entry {
				key,
				key_span,
				value,
			});
		}
		Ok(Node::Mapping(entries))
	}

	/// Parse `? key` and the `: value` line that follows it at `indent`.
	///
	/// Only scalar keys written on the `?` line are supported.
	fn parse_explicit_entry(&mut self, line: Line<'a>, indent: usize) -> Result<Entry> {
		let after = &line.text[1..];
		let content = after.trim_start();
		let start = line.offset + 1 + after.len() - content.len();
		let complex = content.is_empty()
			|| content.starts_with(['#', '|', '>'])
			|| is_seq_item(content)
			|| is_explicit_key(content)
			|| mapping_colon(content).is_some();
		if complex {
			return Err(self.error(line.offset, "only scalar explicit keys are supported"));
		}

		let (key_node, end) = self.parse_inline(start, false)?;
		let Node::Scalar(key) = key_node else {
			return Err(self.error(start, "only scalar explicit keys are supported"));
		};
		self.finish_inline(end)?;

		let value_line = self
			.peek()?
			.filter(|next| next.indent == indent && is_explicit_value(next.text))
			.ok_or_else(|| {
				self.error(line.offset, format!("explicit key `{}` has no value", key.value))
			})?;
		self.advance();
		let value = self.parse_value(
			&value_line.text[1..],
			value_line.offset + 1,
			Some(indent),
			true,
		)?;

		Ok(Entry {
			key: key.value,
			key_span: key.span,
			value,
		})
	}

	fn parse_sequence(&mut self, indent: usize) -> Result<Node> {
		let mut items = Vec::new();
		while let Some(line) = self.peek()? {
			if line.indent < indent || (line.indent == indent && !is_seq_item(line.text)) {
				break;
			}
			if line.indent > indent {
				return Err(self.error(line.offset, "unexpected indentation"));
			}
			self.advance();

			let after_dash = &line.text[1..];
			let content = after_dash.trim_start();
			let skipped = 1 + after_dash.len() - content.len();
			let nested = !content.starts_with('#')
				&& (is_seq_item(content)
					|| is_explicit_key(content)
					|| mapping_colon(content).is_some());

			let item = if nested {
				let inner = Line {
					offset: line.offset + skipped,
					indent: line.indent + skipped,
					text: content,
				};
				self.pending = Some(inner);
				self.parse_block(inner, Some(indent))?
			} else {
				self.parse_value(after_dash, line.offset + 1, Some(indent), false)?
			};
			items.push(item);
		}
		Ok(Node::Sequence(items))
	}

	/// Parse the value after a `key:` or `- ` indicator.
	///
	/// `rest` is the remaining text of the (already consumed) line starting at
	/// `offset`; `parent` is the indentation of the owning collection.
	fn parse_value(
		&mut self,
		rest: &'a str,
		offset: usize,
		parent: Option<usize>,
		owner_is_mapping: bool,
	) -> Result<Node> {
		let trimmed = rest.trim_start();
		let properties_start = offset + rest.len() - trimmed.len();
		let (tokens, skipped) = properties_len(trimmed, false);
		let trimmed = &trimmed[skipped..];
		let start = properties_start + skipped;

		if trimmed.is_empty() || trimmed.starts_with('#') {
			if let Some(next) = self.peek()? {
				if parent.is_none_or(|p| next.indent > p) {
					return self.parse_block(next, parent);
				}
				if owner_is_mapping && Some(next.indent) == parent && is_seq_item(next.text) {
					return self.parse_sequence(next.indent);
				}
			}
			// A filled-in value goes after `key:` or after its properties
			let at = if tokens > 0 {
				properties_start + tokens
			} else {
				offset
			};
			return Ok(Node::Scalar(Scalar {
				value: String::new(),
				style: ScalarStyle::Plain,
				span: Span::empty(at),
			}));
		}

		if trimmed.starts_with('|') || trimmed.starts_with('>') {
			return self.parse_block_scalar(trimmed, start, parent);
		}

		if trimmed.starts_with(['[', '{', '"', '\'', '*']) {
			let (node, end) = self.parse_inline(start, false)?;
			self.finish_inline(end)?;
			return Ok(node);
		}
		self.parse_plain_lines(start, parent)
	}

	/// Parse a plain scalar in block context, folding in the continuation
	/// lines indented deeper than `parent`.
	fn parse_plain_lines(&mut self, pos: usize, parent: Option<usize>) -> Result<Node> {
		let (mut scalar, end) = self.parse_plain(pos, false);
		let commented = !self.source[end..self.line_end(pos)].trim().is_empty();
		self.finish_inline(end)?;
		if commented {
			return Ok(Node::Scalar(scalar));
		}

		let min_indent = parent.map_or(0, |p| p + 1);
		let mut pieces = vec![scalar.span.slice(self.source)];
		let mut blanks = 0;
		while let Some(raw) = self.lines.get(self.pos + blanks).copied() {
			if raw.blank {
				blanks += 1;
				continue;
			}
			if raw.comment || raw.indent < min_indent {
				break;
			}
			let content = self.source[raw.start..raw.end].trim_start();
			let start = raw.end - content.len();
			if mapping_colon(content).is_some() {
				return Err(self.error(start, "mapping value inside a multi-line plain scalar"));
			}

			let (piece, piece_end) = self.parse_plain(start, false);
			pieces.extend(std::iter::repeat_n("", blanks));
			pieces.push(piece.span.slice(self.source));
			scalar.span.end = piece_end;
			self.pos += blanks + 1;
			blanks = 0;
			if !self.source[piece_end..raw.end].trim().is_empty() {
				break;
			}
		}

		if pieces.len() > 1 {
			scalar.value = fold_lines(&pieces);
		}
		Ok(Node::Scalar(scalar))
	}

	/// Check that only a comment follows `end` on its line and move past that line.
	fn finish_inline(&mut self, end: usize) -> Result<()> {
		let idx = self
			.lines
			.iter()
			.position(|l| l.start <= end && end <= l.end)
			.ok_or_else(|| self.error(end, "value runs past the end of the document"))?;
		let rest = self.source[end..self.lines[idx].end].trim_start();
		if !rest.is_empty() && !rest.starts_with('#') {
			return Err(self.error(end, format!("unexpected trailing content `{}`", rest)));
		}
		self.pos = idx + 1;
		self.pending = None;
		Ok(())
	}

	fn decode_key(&self, raw: &str, offset: usize) -> Result<(String, Span)> {
		let raw = raw.trim_end();
		let (_, skipped) = properties_len(raw, false);
		let raw = &raw[skipped..];
		let offset = offset + skipped;
		let span = Span::new(offset, offset + raw.len());
		let key = if raw.len() >= 2 && raw.starts_with('"') {
			decode_double(&raw[1..raw.len() - 1])
		} else if raw.len() >= 2 && raw.starts_with('\'') {
			decode_single(&raw[1..raw.len() - 1])
		} else {
			raw.to_string()
		};
		Ok((key, span))
	}

	fn parse_block_scalar(
		&mut self,
		header: &str,
		offset: usize,
		parent: Option<usize>,
	) -> Result<Node> {
		let folded = header.starts_with('>');
		let indicators_end = header[1..]
			.find([' ', '\t', '#'])
			.map_or(header.len(), |i| i + 1);

		let mut chomping = Chomping::Clip;
		let mut explicit = None;
		for c in header[1..indicators_end].chars() {
			match c {
				'-' => chomping = Chomping::Strip,
				'+' => chomping = Chomping::Keep,
				'1'..='9' => explicit = c.to_digit(10).map(|d| d as usize),
				_ => return Err(self.error(offset, "invalid block scalar header")),
			}
		}
		let tail = header[indicators_end..].trim_start();
		if !tail.is_empty() && !tail.starts_with('#') {
			return Err(self.error(offset, "unexpected content after block scalar header"));
		}

		let min_indent = parent.map_or(0, |p| p + 1);
		let body_indent = match explicit {
			Some(d) => parent.unwrap_or(0) + d,
			None => self.lines[self.pos..]
				.iter()
				.find(|l| !l.blank)
				.map_or(min_indent, |l| l.indent.max(min_indent)),
		};

		let mut last_content = None;
		let mut idx = self.pos;
		while idx < self.lines.len() {
			let raw = self.lines[idx];
			if !raw.blank {
				if raw.indent < body_indent {
					break;
				}
				last_content = Some(idx);
			}
			idx += 1;
		}

		let style = ScalarStyle::Block {
			folded,
			indent: body_indent.max(min_indent).max(1),
		};

		let Some(last) = last_content else {
			let header_end = offset + line_text(self.source, offset).len();
			return Ok(Node::Scalar(Scalar {
				value: String::new(),
				style,
				span: Span::empty(header_end),
			}));
		};

		let body = &self.lines[self.pos..=last];
		let lines: Vec<&str> = body
			.iter()
			.map(|raw| {
				if raw.blank {
					""
				} else {
					&self.source[raw.start + body_indent..raw.end]
				}
			})
			.collect();
		let trailing_blank = self.lines[last + 1..idx].iter().filter(|l| l.blank).count();

		let mut value = if folded {
			fold_lines(&lines)
		} else {
			lines.join("\n")
		};
		match chomping {
			Chomping::Strip => {}
			Chomping::Clip => value.push('\n'),
			Chomping::Keep => value.push_str(&"\n".repeat(1 + trailing_blank)),
		}

		let span = Span::new(body[0].start, self.lines[last].end);
		self.pos = last + 1;
		Ok(Node::Scalar(Scalar { value, style, span }))
	}

	/// Parse a value written on one line (or a flow collection spanning several).
	///
	/// Returns the node and the offset just past its source text.
	fn parse_inline(&self, pos: usize, flow: bool) -> Result<(Node, usize)> {
		let bytes = self.source.as_bytes();
		let (tokens, skipped) = properties_len(&self.source[pos..self.line_end(pos)], flow);
		if tokens > 0 {
			let next = if flow {
				self.skip_flow_space(pos + skipped)?
			} else {
				pos + skipped
			};
			let empty = match bytes.get(next) {
				None => true,
				Some(&b) if flow => matches!(b, b',' | b']' | b'}'),
				Some(&b) => b == b'#' || next >= self.line_end(pos),
			};
			if empty {
				let scalar = Scalar {
					value: String::new(),
					style: ScalarStyle::Plain,
					span: Span::empty(pos + tokens),
				};
				return Ok((Node::Scalar(scalar), pos + tokens));
			}
			return self.parse_inline(next, flow);
		}

		match bytes.get(pos) {
			Some(b'[') => self.parse_flow_sequence(pos),
			Some(b'{') => self.parse_flow_mapping(pos),
			Some(b'"') => self.parse_quoted(pos, b'"'),
			Some(b'\'') => self.parse_quoted(pos, b'\''),
			Some(b'*') => Ok(self.parse_alias(pos, flow)),
			_ => {
				let (scalar, end) = self.parse_plain(pos, flow);
				Ok((Node::Scalar(scalar), end))
			}
		}
	}

	fn parse_alias(&self, pos: usize, flow: bool) -> (Node, usize) {
		let bytes = self.source.as_bytes();
		let line_end = self.line_end(pos);
		let mut end = pos + 1;
		while end < line_end
			&& !matches!(bytes[end], b' ' | b'\t')
			&& !(flow && is_flow_indicator(bytes[end]))
		{
			end += 1;
		}
		let alias = Node::Alias {
			name: self.source[pos + 1..end].to_string(),
			span: Span::new(pos, end),
		};
		(alias, end)
	}

	fn line_end(&self, pos: usize) -> usize {
		let end = self.source[pos..]
			.find('\n')
			.map_or(self.source.len(), |i| pos + i);
		if end > pos && self.source.as_bytes()[end - 1] == b'\r' {
			end - 1
		} else {
			end
		}
	}

	fn parse_plain(&self, pos: usize, flow: bool) -> (Scalar, usize) {
		let bytes = self.source.as_bytes();
		let line_end = self.line_end(pos);
		let mut end = pos;
		let mut i = pos;
		while i < line_end {
			let b = bytes[i];
			if b == b'#' && i > pos && (bytes[i - 1] == b' ' || bytes[i - 1] == b'\t') {
				break;
			}
			if flow {
				if is_flow_indicator(b) {
					break;
				}
				if b == b':'
					&& (i + 1 >= line_end || matches!(bytes[i + 1], b' ' | b'\t' | b',' | b']' | b'}'))
				{
					break;
				}
			}
			i += 1;
			if b != b' ' && b != b'\t' {
				end = i;
			}
		}

		let scalar = Scalar {
			value: self.source[pos..end].to_string(),
			style: ScalarStyle::Plain,
			span: Span::new(pos, end),
		};
		(scalar, end)
	}

	fn parse_quoted(&self, pos: usize, quote: u8) -> Result<(Node, usize)> {
		let bytes = self.source.as_bytes();
		let mut i = pos + 1;
		let close = loop {
			if i >= self.limit {
				return Err(self.error(pos, "unterminated quoted scalar"));
			}
			match bytes[i] {
				b'\\' if quote == b'"' => i += 2,
				b'\'' if quote == b'\'' && bytes.get(i + 1) == Some(&b'\'') => i += 2,
				b if b == quote => break i,
				_ => i += 1,
			}
		};

		let raw = &self.source[pos + 1..close];
		let (value, style) = if quote == b'"' {
			(decode_double(raw), ScalarStyle::DoubleQuoted)
		} else {
			(decode_single(raw), ScalarStyle::SingleQuoted)
		};
		let scalar = Scalar {
			value,
			style,
			span: Span::new(pos, close + 1),
		};
		Ok((Node::Scalar(scalar), close + 1))
	}

	fn skip_flow_space(&self, mut i: usize) -> Result<usize> {
		let bytes = self.source.as_bytes();
		while i < self.limit {
			match bytes[i] {
				b' ' | b'\t' | b'\r' | b'\n' => i += 1,
				b'#' => i = self.line_end(i),
				_ => return Ok(i),
			}
		}
		Err(self.error(i, "unterminated flow collection"))
	}

	fn parse_flow_sequence(&self, pos: usize) -> Result<(Node, usize)> {
		let bytes = self.source.as_bytes();
		let mut items = Vec::new();
		let mut i = self.skip_flow_space(pos + 1)?;
		if bytes[i] == b']' {
			return Ok((Node::Sequence(items), i + 1));
		}
		loop {
			let (item, next) = self.parse_inline(i, true)?;
			items.push(item);
			i = self.skip_flow_space(next)?;
			match bytes[i] {
				b',' => {
					i = self.skip_flow_space(i + 1)?;
					if bytes[i] == b']' {
						return Ok((Node::Sequence(items), i + 1));
					}
				}
				b']' => return Ok((Node::Sequence(items), i + 1)),
				_ => return Err(self.error(i, "expected `,` or `]` in flow sequence")),
			}
		}
	}

	fn parse_flow_mapping(&self, pos: usize) -> Result<(Node, usize)> {
		let bytes = self.source.as_bytes();
		let mut entries = Vec::new();
		let mut i = self.skip_flow_space(pos + 1)?;
		loop {
			if bytes[i] == b'}' {
				return Ok((Node::Mapping(entries), i + 1));
			}

			let (key_node, next) = self.parse_inline(i, true)?;
			let Node::Scalar(key) = key_node else {
				return Err(self.error(i, "flow mapping keys must be scalars"));
			};

			i = self.skip_flow_space(next)?;
			let value = if bytes[i] == b':' {
				i = self.skip_flow_space(i + 1)?;
				if matches!(bytes[i], b',' | b'}') {
					Node::Scalar(Scalar {
						value: String::new(),
						style: ScalarStyle::Plain,
						span: Span::empty(i),
					})
				} else {
					let (value, next) = self.parse_inline(i, true)?;
					i = self.skip_flow_space(next)?;
					value
				}
			} else {
				Node::Scalar(Scalar {
					value: String::new(),
					style: ScalarStyle::Plain,
					span: Span::empty(i),
				})
			};

			entries.push(Entry {
				key: key.value,
				key_span: key.span,
				value,
			});

			match bytes[i] {
				b',' => i = self.skip_flow_space(i + 1)?,
				b'}' => return Ok((Node::Mapping(entries), i + 1)),
				_ => return Err(self.error(i, "expected `,` or `}` in flow mapping")),
			}
		}
	}
}

/// Join block or quoted lines with YAML line folding.
fn fold_lines(lines: &[&str]) -> String {
	let mut out = String::new();
	let mut breaks = 0;
	for line in lines {
		if line.is_empty() {
			breaks += 1;
			continue;
		}
		if !out.is_empty() || breaks > 0 {
			if breaks == 0 {
				out.push(' ');
			} else {
				out.push_str(&"\n".repeat(breaks));
			}
		}
		out.push_str(line);
		breaks = 0;
	}
	out
}

fn fold_quoted(raw: &str) -> String {
	if !raw.contains('\n') {
		return raw.to_string();
	}
	let pieces: Vec<&str> = raw.split('\n').collect();
	let last = pieces.len() - 1;
	let trimmed: Vec<&str> = pieces
		.iter()
		.enumerate()
		.map(|(i, piece)| match i {
			0 => piece.trim_end(),
			i if i == last => piece.trim_start(),
			_ => piece.trim(),
		})
		.collect();
	fold_lines(&trimmed)
}

fn decode_single(raw: &str) -> String {
	fold_quoted(raw).replace("''", "'")
}

fn decode_double(raw: &str) -> String {
	let folded = fold_quoted(raw);
	let mut out = String::with_capacity(folded.len());
	let mut chars = folded.chars();
	while let Some(c) = chars.next() {
		if c != '\\' {
			out.push(c);
			continue;
		}
		match chars.next() {
			Some('n') => out.push('\n'),
			Some('t') => out.push('\t'),
			Some('r') => out.push('\r'),
			Some('0') => out.push('\0'),
			Some('"') => out.push('"'),
			Some('\\') => out.push('\\'),
			Some('/') => out.push('/'),
			Some(' ') => out.push(' '),
			Some(kind @ ('x' | 'u' | 'U')) => {
				let width = match kind {
					'x' => 2,
					'u' => 4,
					_ => 8,
				};
				let hex: String = chars.by_ref().take(width).collect();
				match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
					Some(decoded) => out.push(decoded),
					None => {
						out.push('\\');
						out.push(kind);
						out.push_str(&hex);
					}
				}
			}
			Some(other) => {
				out.push('\\');
				out.push(other);
			}
			None => out.push('\\'),
		}
	}
	out
}

/// Render `value` as the source text replacing `scalar`, keeping its style.
pub fn render_replacement(scalar: &Scalar, value: &str) -> String {
	match scalar.style {
		ScalarStyle::Plain => {
			let text = render_plain(value);
			if scalar.span.is_empty() {
				format!(" {}", text)
			} else {
				text
			}
		}
		ScalarStyle::SingleQuoted if !value.contains('\n') => {
			format!("'{}'", value.replace('\'', "''"))
		}
		ScalarStyle::SingleQuoted | ScalarStyle::DoubleQuoted => render_double(value),
		ScalarStyle::Block { folded, indent } => {
			let body = render_block_body(value, folded, indent);
			if scalar.span.is_empty() {
				format!("\n{}", body)
			} else {
				body
			}
		}
	}
}

fn render_plain(value: &str) -> String {
	if needs_quotes(value) {
		render_double(value)
	} else {
		value.to_string()
	}
}

fn needs_quotes(value: &str) -> bool {
	let Some(first) = value.chars().next() else {
		return true;
	};
	let second = value.chars().nth(1);

	value.trim() != value
		|| value.contains(": ")
		|| value.contains(" #")
		|| value.ends_with(':')
		|| value.chars().any(char::is_control)
		|| ",[]{}#&*!|>'\"%@`".contains(first)
		|| ("-?:".contains(first) && second.is_none_or(|c| c == ' '))
		|| value.starts_with("---")
		|| value.starts_with("...")
}

fn render_double(value: &str) -> String {
	let mut out = String::from("\"");
	for c in value.chars() {
		match c {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\t' => out.push_str("\\t"),
			'\r' => out.push_str("\\r"),
			c if c.is_control() => out.push_str(&format!("\\x{:02X}", c as u32)),
			c => out.push(c),
		}
	}
	out.push('"');
	out
}

fn render_block_body(value: &str, folded: bool, indent: usize) -> String {
	let pad = " ".repeat(indent);
	let lines: Vec<String> = value
		.trim_end_matches('\n')
		.split('\n')
		.map(|line| {
			if line.is_empty() {
				String::new()
			} else {
				format!("{}{}", pad, line)
			}
		})
		.collect();
	lines.join(if folded { "\n\n" } else { "\n" })
}

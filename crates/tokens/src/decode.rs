//! Single-pass decoding of the compiler's flat token array into line/column spans.

use crate::{Category, DisplaySpan, RawToken};

/// Delimiter columns excluded from raw string-literal and line-comment values.
const DELIMITER_WIDTH: u32 = 2;

/// Decodes a flat, offset-sorted token array into display spans.
///
/// The compiler reports character offsets into the flattened source and marks
/// line boundaries with explicit `NewLine` tokens. This pass accumulates an
/// offset correction at each boundary so that columns restart at zero per
/// line, widens string-literal and single-line-comment spans by their
/// delimiter columns, and drops tokens whose kind has no display category.
///
/// Embedded newlines in token values (multi-line strings and comments) are
/// replaced with the literal two-character `\n` escape before measuring, so
/// every emitted span stays on a single logical line, consistent with the
/// one-argv-element-per-source-line encoding of the compiler invocation.
///
/// Tokens with offsets that run backwards are skipped rather than emitted
/// with a bogus column.
pub fn decode(tokens: &[RawToken]) -> Vec<DisplaySpan> {
	let mut spans = Vec::with_capacity(tokens.len());

	let mut line: u32 = 0;
	let mut offset_correction: u32 = 0;
	let mut line_start_index: u32 = 0;
	let mut prev_newline: Option<u32> = None;

	for token in tokens {
		// A line begins one past the newline that ended the previous one,
		// regardless of where its first token starts.
		if let Some(newline_index) = prev_newline.take() {
			line_start_index = newline_index + 1;
		}

		if token.kind == "NewLine" {
			line += 1;
			offset_correction += (token.index + 1).saturating_sub(line_start_index);
			prev_newline = Some(token.index);
			continue;
		}

		let value = token.value.replace('\n', "\\n");
		let mut length = value.chars().count() as u32;
		if token.kind == "StringLiteral" || token.kind == "SingleLineComment" {
			length += DELIMITER_WIDTH;
		}

		let Some(category) = Category::from_kind(&token.kind) else {
			continue;
		};
		let Some(column) = token.index.checked_sub(offset_correction) else {
			continue;
		};

		spans.push(DisplaySpan {
			line,
			column,
			length,
			category,
		});
	}

	spans
}

#[cfg(test)]
mod tests {
	use super::*;

	fn raw(kind: &str, value: &str, index: u32) -> RawToken {
		RawToken {
			kind: kind.to_string(),
			value: value.to_string(),
			index,
		}
	}

	/// Columns reset to zero after a newline marker.
	#[test]
	fn newline_resets_column() {
		// "if\nx" — keyword at 0, newline at 2, variable at 3.
		let tokens = vec![raw("If", "if", 0), raw("NewLine", "\n", 2), raw("Variable", "x", 3)];

		let spans = decode(&tokens);

		assert_eq!(
			spans,
			vec![
				DisplaySpan { line: 0, column: 0, length: 2, category: Category::Keyword },
				DisplaySpan { line: 1, column: 0, length: 1, category: Category::Variable },
			]
		);
	}

	/// String literals gain two delimiter columns over their raw value.
	#[test]
	fn string_literal_width_includes_quotes() {
		let spans = decode(&[raw("StringLiteral", "hello", 0)]);

		assert_eq!(spans.len(), 1);
		assert_eq!(spans[0].length, 7);
		assert_eq!(spans[0].category, Category::String);
	}

	/// Line comments gain two columns for the comment marker.
	#[test]
	fn line_comment_width_includes_marker() {
		let spans = decode(&[raw("SingleLineComment", " note", 0)]);

		assert_eq!(spans[0].length, 7);
		assert_eq!(spans[0].category, Category::Comment);
	}

	/// Unmapped kinds advance bookkeeping but emit nothing.
	#[test]
	fn unmapped_kinds_are_dropped() {
		// "x;\ny" — semicolon has no category.
		let tokens = vec![
			raw("Variable", "x", 0),
			raw("Semicolon", ";", 1),
			raw("NewLine", "\n", 2),
			raw("Variable", "y", 3),
		];

		let spans = decode(&tokens);

		assert_eq!(spans.len(), 2);
		assert_eq!((spans[1].line, spans[1].column), (1, 0));
	}

	/// Offsets later in a line land at their distance from the line start.
	#[test]
	fn mid_line_columns_follow_offsets() {
		// Line 0: "x = 1" / line 1: "y = 2"
		let tokens = vec![
			raw("Variable", "x", 0),
			raw("SetEquals", "=", 2),
			raw("IntLiteral", "1", 4),
			raw("NewLine", "\n", 5),
			raw("Variable", "y", 6),
			raw("SetEquals", "=", 8),
			raw("IntLiteral", "2", 10),
		];

		let spans = decode(&tokens);

		let coords: Vec<(u32, u32)> = spans.iter().map(|s| (s.line, s.column)).collect();
		assert_eq!(coords, vec![(0, 0), (0, 2), (0, 4), (1, 0), (1, 2), (1, 4)]);
	}

	/// Multi-line token values flatten to a single-line span, the embedded
	/// newline counting as the two-character escape.
	#[test]
	fn embedded_newline_widens_span() {
		let spans = decode(&[raw("StringLiteral", "a\nb", 0)]);

		assert_eq!(spans[0].line, 0);
		// "a\nb" -> "a\\nb" (4 chars) + 2 delimiters.
		assert_eq!(spans[0].length, 6);
	}

	/// Consecutive newlines (an empty line) keep later columns correct.
	#[test]
	fn empty_line_between_tokens() {
		// "x\n\ny"
		let tokens = vec![
			raw("Variable", "x", 0),
			raw("NewLine", "\n", 1),
			raw("NewLine", "\n", 2),
			raw("Variable", "y", 3),
		];

		let spans = decode(&tokens);

		assert_eq!(spans.len(), 2);
		assert_eq!((spans[1].line, spans[1].column), (2, 0));
	}

	/// Span count never exceeds raw tokens minus newline markers minus
	/// unmapped kinds.
	#[test]
	fn span_count_upper_bound() {
		let tokens = vec![
			raw("If", "if", 0),
			raw("LeftParentheses", "(", 3),
			raw("Variable", "cond", 4),
			raw("RightParentheses", ")", 8),
			raw("NewLine", "\n", 9),
			raw("Return", "return", 10),
			raw("IntLiteral", "0", 17),
			raw("Semicolon", ";", 18),
		];

		let newlines = tokens.iter().filter(|t| t.kind == "NewLine").count();
		let unmapped = tokens
			.iter()
			.filter(|t| t.kind != "NewLine" && Category::from_kind(&t.kind).is_none())
			.count();

		let spans = decode(&tokens);
		assert!(spans.len() <= tokens.len() - newlines - unmapped);
		assert_eq!(spans.len(), 4);
	}

	/// Indentation shifts columns but not the next line's correction.
	#[test]
	fn indented_line_keeps_following_lines_aligned() {
		// "x\n  y\nz"
		let tokens = vec![
			raw("Variable", "x", 0),
			raw("NewLine", "\n", 1),
			raw("Variable", "y", 4),
			raw("NewLine", "\n", 5),
			raw("Variable", "z", 6),
		];

		let spans = decode(&tokens);

		let coords: Vec<(u32, u32)> = spans.iter().map(|s| (s.line, s.column)).collect();
		assert_eq!(coords, vec![(0, 0), (1, 2), (2, 0)]);
	}

	#[test]
	fn empty_input_decodes_to_nothing() {
		assert!(decode(&[]).is_empty());
	}
}

//! Token model and display-span decoding for the Opal compiler's token stream.
//!
//! The compiler's `-tokens` mode emits a flat JSON array of lexical tokens with
//! character offsets into the flattened source. This crate deserializes that
//! stream, maps compiler-internal kind names onto a small closed set of
//! highlighting categories, and reconstructs per-line `(line, column, length)`
//! spans for the host's renderer.

use serde::Deserialize;

mod category;
mod decode;

pub use category::Category;
pub use decode::decode;

/// A lexical token as reported by the compiler.
///
/// Offsets are character indices into the source as the compiler saw it and
/// are monotonically non-decreasing across the array. A token with kind
/// `NewLine` marks the offset of the newline character itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawToken {
	/// Compiler-internal kind name, e.g. `IntLiteral` or `NewLine`.
	#[serde(rename = "type")]
	pub kind: String,
	/// Raw token text. Excludes delimiters for string literals and comments.
	pub value: String,
	/// Character offset of the token start.
	pub index: u32,
}

/// A resolved highlight span, zero-indexed, ready for the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySpan {
	pub line: u32,
	pub column: u32,
	pub length: u32,
	pub category: Category,
}

/// Errors from parsing the compiler's token output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The token JSON failed to deserialize.
	#[error("malformed token output: {0}")]
	MalformedOutput(#[from] serde_json::Error),
}

/// Parses the compiler's `-tokens` JSON array.
pub fn parse_raw_tokens(json: &str) -> Result<Vec<RawToken>, Error> {
	Ok(serde_json::from_str(json)?)
}

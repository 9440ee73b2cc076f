//! Source-text encoding for the two compiler invocation policies.
//!
//! The compiler takes the document as trailing command-line arguments, one
//! per physical source line. The batch path goes through a shell, so its
//! lines are quote-wrapped with embedded quotes doubled; the streaming path
//! passes an argv array directly and needs no quoting. Empty text encodes to
//! zero units under both policies so the compiler sees zero lines, not one
//! empty line.

/// Encodes source text for the shell-interpreted batch command string.
///
/// Each line is wrapped in double quotes with every literal `"` doubled
/// (`"` → `""`), and lines are joined by single spaces. Carriage returns are
/// stripped so CRLF documents encode identically to LF ones.
pub fn shell_quoted(text: &str) -> String {
	if text.is_empty() {
		return String::new();
	}
	let quoted: Vec<String> = text
		.split('\n')
		.map(|line| format!("\"{}\"", line.trim_end_matches('\r').replace('"', "\"\"")))
		.collect();
	quoted.join(" ")
}

/// Encodes source text as argv elements, one per physical source line.
///
/// No quoting: the host performs no shell interpretation on argv elements.
pub fn argv_lines(text: &str) -> Vec<String> {
	if text.is_empty() {
		return Vec::new();
	}
	text.split('\n')
		.map(|line| line.trim_end_matches('\r').to_string())
		.collect()
}

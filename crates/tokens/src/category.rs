//! Mapping from compiler lexical-kind names to highlighting categories.

/// Highlighting category consumed by the host renderer.
///
/// A closed set; decoded spans always carry one of these. Kinds without a
/// mapping are dropped during decoding rather than emitted with a default,
/// so punctuation and unknown kinds never wash out the highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
	Type,
	Number,
	String,
	Comment,
	Operator,
	Keyword,
	Variable,
	Function,
}

impl Category {
	/// Host-visible category name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Type => "type",
			Self::Number => "number",
			Self::String => "string",
			Self::Comment => "comment",
			Self::Operator => "operator",
			Self::Keyword => "keyword",
			Self::Variable => "variable",
			Self::Function => "function",
		}
	}

	/// Maps a compiler kind name to its display category.
	///
	/// Returns `None` for kinds that should not be highlighted (punctuation,
	/// brackets, `NewLine`, and anything the compiler adds later).
	pub fn from_kind(kind: &str) -> Option<Self> {
		Some(match kind {
			"VoidType" | "IntType" | "FloatType" | "DoubleType" | "StringType" => Self::Type,

			"IntLiteral" | "FloatLiteral" | "DoubleLiteral" => Self::Number,
			"StringLiteral" => Self::String,

			"SingleLineComment" | "MultiLineComment" => Self::Comment,

			"Add" | "Subtract" | "Multiply" | "Divide" | "PlusEquals" | "MinusEquals" => Self::Operator,
			"SetEquals" | "CompareEquals" | "NotEquals" | "LessThan" | "GreaterThan" | "LessThanEqual" | "GreaterThanEqual" => Self::Operator,
			"RightArrow" => Self::Operator,
			"PostIncrement" | "PreIncrement" | "PostDecrement" | "PreDecrement" => Self::Operator,

			"If" | "Else" | "While" | "For" | "Break" | "Continue" | "Return" => Self::Keyword,

			"Variable" => Self::Variable,
			"FunctionName" => Self::Function,

			_ => return None,
		})
	}
}

impl std::fmt::Display for Category {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

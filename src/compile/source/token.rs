use serde_json::Number;
use std::fmt::Display;

/// Symbols recognized by the [`Source`][`super::Source`] that are two
/// characters long.
///
/// These are always attempted before [`SINGLE`], so `==` is never read as
/// two `=` symbols.
pub const DOUBLE: [&str; 9] = ["!=", "%}", "**", "<=", "==", ">=", "{%", "{{", "}}"];

/// Symbols recognized by the [`Source`][`super::Source`] that are a single
/// character long.
pub const SINGLE: [&str; 16] = [
    "!", "%", "(", ")", "*", "+", ",", "-", ".", "/", "<", "=", ">", "{", "|", "}",
];

/// Beginning of a placeable - `{{`.
pub const BEGIN_PLACEABLE: &str = "{{";
/// End of a placeable - `}}`.
pub const END_PLACEABLE: &str = "}}";
/// Beginning of a tag - `{%`.
pub const BEGIN_TAG: &str = "{%";
/// End of a tag - `%}`.
pub const END_TAG: &str = "%}";
/// Separates a value from a filter - `|`.
pub const PIPE: &str = "|";

/// Types emitted by the [`Source`][`super::Source`].
///
/// Each is paired with the [`Span`][`crate::Span`] it was read from.
#[derive(Debug, PartialEq, Clone)]
pub enum Token<'source> {
    /// An operator or punctuation, such as `+`, `==` or `{%`.
    Symbol(&'static str),
    /// A decimal number, integral unless written with a period.
    Number(Number),
    /// An identifier, which may also be a keyword depending on where it
    /// appears.
    Identifier(&'source str),
    /// A quoted string literal.
    ///
    /// The content is not decoded, read it back from the span if needed.
    String,
    /// Free text between tags.
    Text(&'source str),
    /// The end of the source text.
    End,
}

impl Token<'_> {
    /// Return true if this [`Token`] is the given symbol.
    pub fn is_symbol(&self, symbol: &str) -> bool {
        matches!(self, Token::Symbol(s) if *s == symbol)
    }

    /// Return true if this [`Token`] is an identifier with the given text.
    pub fn is_identifier(&self, text: &str) -> bool {
        matches!(self, Token::Identifier(s) if *s == text)
    }
}

/// Return the symbol spelled by the start of the given text, preferring the
/// longest match.
pub fn match_symbol(text: &str) -> Option<&'static str> {
    DOUBLE
        .iter()
        .chain(SINGLE.iter())
        .find(|symbol| text.starts_with(**symbol))
        .copied()
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Symbol(symbol) => write!(f, "{symbol}"),
            Token::Number(number) => write!(f, "{number}"),
            Token::Identifier(identifier) => write!(f, "{identifier}"),
            Token::String => write!(f, "string"),
            Token::Text(_) => write!(f, "text"),
            Token::End => write!(f, "end of source"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::match_symbol;

    #[test]
    fn test_match_symbol_longest() {
        assert_eq!(match_symbol("== b"), Some("=="));
        assert_eq!(match_symbol("= b"), Some("="));
        assert_eq!(match_symbol("%)"), Some("%"));
        assert_eq!(match_symbol("%}"), Some("%}"));
        assert_eq!(match_symbol("@"), None);
    }
}

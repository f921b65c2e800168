pub mod token;

use crate::{
    diag::{Error, INVALID_SYNTAX, UNEXPECTED_CHARACTER},
    span::{Position, Span},
};
use serde_json::Number;
use token::{match_symbol, Token, BEGIN_PLACEABLE, BEGIN_TAG};

/// Result of reading a single [`Token`] from a [`Source`].
pub type TokenResult<'source> = Result<(Token<'source>, Span), Error>;

/// Provides methods to read template source text as [`Token`] instances.
///
/// The `Source` knows nothing about keywords, any identifier is returned
/// as [`Token::Identifier`] and interpreted by the parser.
#[derive(Debug, Clone)]
pub struct Source<'source> {
    /// Reference to the source text.
    pub text: &'source str,
    /// Position of the next character to be read.
    position: Position,
}

impl<'source> Source<'source> {
    /// Create a new [`Source`] over the given text.
    #[inline]
    pub fn new(text: &'source str) -> Self {
        Self {
            text,
            position: Position::default(),
        }
    }

    /// Return the [`Position`] of the next character to be read.
    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Return true when every character of the source has been consumed.
    #[inline]
    pub fn eos(&self) -> bool {
        self.position.offset >= self.text.len()
    }

    /// Return the next [`Token`] and [`Span`], skipping any whitespace before it.
    ///
    /// Quoted strings are only recognized when `string_mode` is true,
    /// otherwise a quote is an unexpected character.
    ///
    /// Returns [`Token::End`] with an empty span once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when a character that cannot begin any token is found.
    pub fn next(&mut self, string_mode: bool) -> TokenResult<'source> {
        self.bump_while(char::is_whitespace);

        let from = self.position;
        let Some(char) = self.peek_char() else {
            return Ok((Token::End, Span::empty(from)));
        };

        match char {
            '"' | '\'' if string_mode => Ok(self.lex_string(char)),
            c if c.is_ascii_digit() => self.lex_number(),
            c if is_ident_start(c) => Ok(self.lex_identifier()),
            _ => self.lex_symbol(),
        }
    }

    /// Return a [`Token::Text`] covering everything up to the next `{{` or `{%`,
    /// or up to the end of the source when neither is found.
    ///
    /// Whitespace is not skipped, and the opening symbol is not consumed. The
    /// text may be empty.
    pub fn text(&mut self) -> (Token<'source>, Span) {
        let from = self.position;
        let remaining = self.remaining();
        let length = [BEGIN_PLACEABLE, BEGIN_TAG]
            .iter()
            .filter_map(|marker| remaining.find(marker))
            .min()
            .unwrap_or(remaining.len());

        let text = &remaining[..length];
        for c in text.chars() {
            self.position = self.position.advance(c);
        }

        (Token::Text(text), Span::new(from, self.position))
    }

    /// Return a [`Token::Symbol`] for the longest symbol at the cursor.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if no known symbol begins at the cursor.
    fn lex_symbol(&mut self) -> TokenResult<'source> {
        let from = self.position;

        match match_symbol(self.remaining()) {
            Some(symbol) => {
                // Symbols are ascii, one byte per character.
                for _ in 0..symbol.len() {
                    self.bump();
                }

                Ok((Token::Symbol(symbol), Span::new(from, self.position)))
            }
            None => {
                self.bump();

                Err(Error::build(UNEXPECTED_CHARACTER)
                    .with_pointer(self.text, Span::new(from, self.position))
                    .with_help(
                        "expected an operator, an identifier, a number, \
                        or a string literal marked with `\"` or `'`",
                    ))
            }
        }
    }

    /// Return a [`Token::Number`].
    ///
    /// Digits may be followed by a period and more digits. A trailing period
    /// with no digits after it is a fraction of zero, so `796.` is `796.0`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the number cannot be represented.
    fn lex_number(&mut self) -> TokenResult<'source> {
        let from = self.position;
        self.bump_while(|c| c.is_ascii_digit());

        let mut decimal = false;
        if self.peek_char() == Some('.') {
            decimal = true;
            self.bump();
            self.bump_while(|c| c.is_ascii_digit());
        }

        let span = Span::new(from, self.position);
        let window = &self.text[span];
        let parse_float = || window.parse::<f64>().ok().and_then(Number::from_f64);
        let number = if decimal {
            parse_float()
        } else {
            window.parse::<u64>().ok().map(Number::from).or_else(parse_float)
        };

        match number {
            Some(number) => Ok((Token::Number(number), span)),
            None => Err(Error::build(INVALID_SYNTAX)
                .with_pointer(self.text, span)
                .with_help("this number is too large to be represented")),
        }
    }

    /// Return a [`Token::Identifier`].
    fn lex_identifier(&mut self) -> (Token<'source>, Span) {
        let from = self.position;
        self.bump();
        self.bump_while(is_ident_continue);

        let span = Span::new(from, self.position);
        let text = self.text;

        (Token::Identifier(&text[span]), span)
    }

    /// Return a [`Token::String`] delimited by the given quote.
    ///
    /// A backslash escapes the character after it, so the delimiter may appear
    /// inside the string as `\"` or `\'`. A string that is never closed runs
    /// to the end of the source without raising an error.
    fn lex_string(&mut self, quote: char) -> (Token<'source>, Span) {
        let from = self.position;
        self.bump();

        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some(c) if c == quote => break,
                Some(_) => continue,
                None => break,
            }
        }

        (Token::String, Span::new(from, self.position))
    }

    /// Return the text that has not been consumed yet.
    #[inline]
    fn remaining(&self) -> &'source str {
        let text = self.text;

        &text[self.position.offset..]
    }

    /// Return the next character without consuming it.
    #[inline]
    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Consume and return the next character.
    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.position = self.position.advance(c);

        Some(c)
    }

    /// Consume characters for as long as they satisfy the predicate.
    fn bump_while<F>(&mut self, predicate: F)
    where
        F: Fn(char) -> bool,
    {
        while let Some(c) = self.peek_char() {
            if !predicate(c) {
                break;
            }
            self.bump();
        }
    }
}

/// Return true if the given character is a recognized beginning identifier,
/// meaning '_' or an `xid_start`.
fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

/// Return true if the given character is a recognized continue identifier,
/// meaning an `xid_continue`.
fn is_ident_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

use super::Error;
use crate::span::{Position, Span};
use std::fmt::Display;

pub const UNEXPECTED_TOKEN: &str = "unexpected token";
pub const UNEXPECTED_CHARACTER: &str = "unexpected character";
pub const UNEXPECTED_EOF: &str = "unexpected eof";
pub const INVALID_SYNTAX: &str = "invalid syntax";

/// Return an [`Error`] explaining that the end of source was not expected.
pub fn error_eof(source: &str, at: Position) -> Error {
    Error::build(UNEXPECTED_EOF)
        .with_pointer(source, Span::empty(at))
        .with_help("expected additional tokens, did you close all tags and blocks?")
}

/// Return a string describing the expected closing keywords.
pub fn expected_closing<T>(keywords: &[T]) -> String
where
    T: Display,
{
    let names: Vec<String> = keywords.iter().map(|k| format!("`{k}`")).collect();

    format!("expected {}, did you close the block?", names.join(" or "))
}

/// Return a string describing an unrecognized tag.
pub fn expected_tag<T>(received: T) -> String
where
    T: Display,
{
    format!(
        "expected one of `if`, `for`, `set`, `macro`, `call`, `filter`, `block`, \
        `extends`, found `{received}`"
    )
}

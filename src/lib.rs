//! Quill - Template Parser
//!
//! Reads templates written in a Jinja-style language into an Abstract Syntax
//! Tree. Free text is interleaved with placeables such as `{{ name | upper }}`
//! and tags such as `{% for item in items %}..{% endfor %}`.
mod compile;
mod diag;
mod span;

pub use compile::{
    compile, token, tree, Keyword, Operator, Parser, Scope, Source, Template, TokenResult,
};
pub use diag::{
    Error, Pointer, Visual, INVALID_SYNTAX, UNEXPECTED_CHARACTER, UNEXPECTED_EOF,
    UNEXPECTED_TOKEN,
};
pub use span::{Position, Span};

use super::{
    tree::{Block, Expression, Macro},
    Scope,
};
use crate::span::Span;
use serde::Serialize;
use std::collections::BTreeMap;

/// A parsed template.
///
/// Macro and block definitions are collected into tables keyed by name,
/// the rest of the template is found in `body`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Template {
    /// The template this one extends, if any.
    pub extends: Option<Expression>,
    /// Named block definitions.
    pub blocks: BTreeMap<String, Block>,
    /// Named macro definitions.
    pub macros: BTreeMap<String, Macro>,
    /// The Abstract Syntax Tree of the template content.
    pub body: Scope,
    #[serde(flatten)]
    pub span: Span,
}

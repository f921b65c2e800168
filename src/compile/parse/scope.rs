use crate::{
    compile::tree::{Identifier, Tree},
    span::{Position, Span},
};
use serde::Serialize;

/// A distinct set of Tree instances, such as the body of a loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Scope {
    /// Names declared within this Scope.
    ///
    /// Always empty when produced by the Parser, filled by a later binding pass.
    pub variables: Vec<Identifier>,
    /// The Tree instances, in source order.
    pub body: Vec<Tree>,
    #[serde(flatten)]
    pub span: Span,
}

impl Scope {
    /// Create a new, empty Scope beginning at the given Position.
    #[inline]
    pub fn new(start: Position) -> Self {
        Self {
            variables: vec![],
            body: vec![],
            span: Span::empty(start),
        }
    }

    /// Consume the Scope, marking where it ends.
    pub fn close(mut self, end: Position) -> Self {
        self.span.end = end;

        self
    }
}

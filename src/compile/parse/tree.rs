//! The Abstract Syntax Tree.
//!
//! Every node carries the [`Span`] of source text it was read from. Nodes
//! serialize with a `type` field naming the node, followed by their fields
//! and the flattened `start` and `end` positions.
use crate::{
    compile::{Operator, Scope},
    span::Span,
};
use serde::Serialize;
use serde_json::Number;

/// Content of a template body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Tree {
    /// Raw text.
    Text(Text),
    /// Render the value of an expression, `{{ value | filter }}`.
    PutValue(PutValue),
    /// An "if" block with all of its arms.
    CaseStatement(CaseStatement),
    /// A loop.
    ForLoop(ForLoop),
    /// An assignment.
    Assign(Assign),
    /// A call to a macro that passes a body along.
    MacroCall(MacroCall),
    /// Placeholder for the content of a named block.
    CallBlock(CallBlock),
    /// Apply a filter to the rendered body.
    FilterBlock(FilterBlock),
}

impl Tree {
    /// Get the Span from the underlying Tree kind.
    pub fn span(&self) -> Span {
        match self {
            Tree::Text(text) => text.span,
            Tree::PutValue(put) => put.span,
            Tree::CaseStatement(case) => case.span,
            Tree::ForLoop(for_loop) => for_loop.span,
            Tree::Assign(assign) => assign.span,
            Tree::MacroCall(call) => call.span,
            Tree::CallBlock(block) => block.span,
            Tree::FilterBlock(filter) => filter.span,
        }
    }
}

/// Something that may be evaluated to produce a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Expression {
    /// A named value.
    Variable(Variable),
    /// A number literal.
    Number(NumberLiteral),
    /// A string literal.
    String(StringLiteral),
    /// A boolean, never written in templates but produced by the Parser.
    Boolean(BooleanLiteral),
    /// Property access, `object.property`.
    Member(Member),
    /// Function call, `function(args)`.
    FunctionCall(FunctionCall),
    /// An operation on two values.
    BinOp(BinOp),
    /// An operation on a single value.
    UnOp(UnOp),
    /// A value piped into a filter, `value | filter`.
    Filter(Filter),
}

impl Expression {
    /// Get the Span from the underlying Expression kind.
    pub fn span(&self) -> Span {
        match self {
            Expression::Variable(variable) => variable.span,
            Expression::Number(number) => number.span,
            Expression::String(string) => string.span,
            Expression::Boolean(boolean) => boolean.span,
            Expression::Member(member) => member.span,
            Expression::FunctionCall(call) => call.span,
            Expression::BinOp(op) => op.span,
            Expression::UnOp(op) => op.span,
            Expression::Filter(filter) => filter.span,
        }
    }
}

/// Target of an assignment or loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Pattern {
    /// Bind a single name.
    Variable(Variable),
    /// Destructure into several names.
    Unpack(Unpack),
}

impl Pattern {
    /// Get the Span from the underlying Pattern kind.
    pub fn span(&self) -> Span {
        match self {
            Pattern::Variable(variable) => variable.span,
            Pattern::Unpack(unpack) => unpack.span,
        }
    }
}

/// Raw text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Text {
    pub text: String,
    #[serde(flatten)]
    pub span: Span,
}

/// A name that refers to a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Variable {
    pub name: String,
    #[serde(flatten)]
    pub span: Span,
}

/// A name that is not evaluated, such as the name of a macro.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Identifier {
    pub value: String,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Number")]
pub struct NumberLiteral {
    pub value: Number,
    #[serde(flatten)]
    pub span: Span,
}

/// A string literal, with escape sequences already decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "String")]
pub struct StringLiteral {
    pub value: String,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Boolean")]
pub struct BooleanLiteral {
    pub value: bool,
    #[serde(flatten)]
    pub span: Span,
}

/// An operator along with where it was written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Operator")]
pub struct Op {
    pub value: Operator,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Member {
    pub object: Box<Expression>,
    pub property: Variable,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct FunctionCall {
    pub function: Box<Expression>,
    pub args: Vec<Expression>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct BinOp {
    pub op: Op,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct UnOp {
    pub op: Op,
    pub argument: Box<Expression>,
    #[serde(flatten)]
    pub span: Span,
}

/// A value piped into a filter inside an expression.
///
/// Not to be confused with [`FilterBlock`], which serializes under the same
/// `Filter` name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Filter {
    pub value: Box<Expression>,
    pub filter: Box<Expression>,
    #[serde(flatten)]
    pub span: Span,
}

/// Several names bound at once, `key, value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Unpack {
    pub names: Vec<Variable>,
    #[serde(flatten)]
    pub span: Span,
}

/// Render an expression, then pass the result through each filter in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct PutValue {
    pub value: Expression,
    pub filters: Vec<Expression>,
    #[serde(flatten)]
    pub span: Span,
}

/// Conditional rendering, `if`, `elif` and `else` arms in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct CaseStatement {
    pub arms: Vec<Arm>,
    #[serde(flatten)]
    pub span: Span,
}

/// A single arm of a [`CaseStatement`].
///
/// An `else` arm has a condition of `true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Arm {
    pub condition: Expression,
    pub body: Vec<Tree>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ForLoop {
    pub pattern: Pattern,
    pub iterable: Expression,
    /// Only items matching this condition are visited.
    pub filter: Option<Expression>,
    pub body: Scope,
    /// Rendered instead of the body when there is nothing to visit.
    pub alternative: Option<Vec<Tree>>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Assign {
    pub pattern: Pattern,
    pub value: Expression,
    #[serde(flatten)]
    pub span: Span,
}

/// A macro definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Macro {
    pub name: Identifier,
    pub args: Vec<Argument>,
    pub body: Scope,
    #[serde(flatten)]
    pub span: Span,
}

/// A named macro parameter with an optional default value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Argument {
    pub name: Identifier,
    pub default: Option<Expression>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct MacroCall {
    #[serde(rename = "macro")]
    pub name: Identifier,
    pub args: Vec<Expression>,
    /// Made available to the macro as the content of the call.
    pub body: Scope,
    #[serde(flatten)]
    pub span: Span,
}

/// Marks where the block of the given name is rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct CallBlock {
    pub name: Identifier,
    #[serde(flatten)]
    pub span: Span,
}

/// A named block definition, which extending templates may replace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Block {
    pub name: Identifier,
    pub body: Scope,
    #[serde(flatten)]
    pub span: Span,
}

/// Apply a filter to everything rendered by the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Filter")]
pub struct FilterBlock {
    pub filter: Expression,
    pub body: Scope,
    #[serde(flatten)]
    pub span: Span,
}

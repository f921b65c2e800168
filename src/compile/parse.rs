//! Template parser.
//!
//! Pulls Token instances from a Source as they are needed, which it uses to
//! construct a new Template containing the Abstract Syntax Tree.
//!
//! The Parser keeps everything it has read so far, so when parsing fails the
//! partial result can still be inspected through `context`, `macros` and
//! `blocks`.
pub mod scope;
pub mod tree;

mod expression;

use crate::{
    compile::{
        source::{
            token::{Token, BEGIN_PLACEABLE, BEGIN_TAG, END_PLACEABLE, END_TAG, PIPE},
            Source, TokenResult,
        },
        tree::{
            Argument, Arm, Assign, Block, BooleanLiteral, CallBlock, CaseStatement, Expression,
            FilterBlock, ForLoop, Identifier, Macro, MacroCall, Pattern, PutValue, Text, Tree,
            Unpack, Variable,
        },
        Keyword, Scope, Template,
    },
    diag::{error_eof, expected_closing, expected_tag, Error, INVALID_SYNTAX, UNEXPECTED_TOKEN},
    span::{Position, Span},
};
use log::{debug, trace, warn};
use std::{collections::BTreeMap, mem};

/// The deepest that bodies and expressions may nest inside each other.
const MAX_DEPTH: usize = 64;

/// Describes the tag that closed a body.
struct Terminator {
    /// The keyword found in the closing tag.
    keyword: Keyword,
    /// Span of the `{%` that opened the closing tag.
    open: Span,
    /// Span of the keyword.
    span: Span,
}

pub struct Parser<'source> {
    /// Source used to pull tokens instead of raw text.
    source: Source<'source>,
    /// Store a peeked token.
    buffer: Option<(Token<'source>, Span)>,
    /// Bodies that are still open, the innermost last.
    ///
    /// The first Scope is the root of the template and is never removed.
    scopes: Vec<Scope>,
    /// Macro definitions by name.
    macros: BTreeMap<String, Macro>,
    /// Block definitions by name.
    blocks: BTreeMap<String, Block>,
    /// Target of an `extends` tag.
    extends: Option<Expression>,
    /// Name of the template, used in errors.
    name: Option<String>,
    /// Number of bodies and expressions currently open.
    depth: usize,
}

impl<'source> Parser<'source> {
    /// Create a new Parser from the given string.
    #[inline]
    pub fn new(text: &'source str) -> Self {
        Self {
            source: Source::new(text),
            buffer: None,
            scopes: vec![Scope::new(Position::default())],
            macros: BTreeMap::new(),
            blocks: BTreeMap::new(),
            extends: None,
            name: None,
            depth: 0,
        }
    }

    /// Set the name of the template, which is attached to any error.
    pub fn with_name<T>(mut self, name: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(name.into());

        self
    }

    /// Return the underlying Source.
    #[inline]
    pub fn source(&self) -> &Source<'source> {
        &self.source
    }

    /// Return the innermost Scope that is still being filled.
    ///
    /// After an error, this is the body of the construct that failed.
    pub fn context(&self) -> &Scope {
        self.scopes
            .last()
            .expect("parser should always have a root scope")
    }

    /// Return the macro definitions found so far.
    #[inline]
    pub fn macros(&self) -> &BTreeMap<String, Macro> {
        &self.macros
    }

    /// Return the block definitions found so far.
    #[inline]
    pub fn blocks(&self) -> &BTreeMap<String, Block> {
        &self.blocks
    }

    /// Read the entire source, then return the Template.
    ///
    /// # Errors
    ///
    /// Returns an Error when the source contains invalid syntax.
    pub fn generate(&mut self) -> Result<Template, Error> {
        self.process()?;

        // A previous call to `process` may have failed inside a body.
        if self.scopes.len() != 1 {
            return Err(self.named(error_eof(self.source.text, self.source.position())));
        }

        let end = self.source.position();
        let body = mem::replace(&mut self.scopes[0], Scope::new(end)).close(end);

        Ok(Template {
            extends: self.extends.take(),
            blocks: mem::take(&mut self.blocks),
            macros: mem::take(&mut self.macros),
            span: body.span,
            body,
        })
    }

    /// Read the entire source into the current context.
    ///
    /// # Errors
    ///
    /// Returns an Error when the source contains invalid syntax. Whatever was
    /// read before the error remains available through `context`.
    pub fn process(&mut self) -> Result<(), Error> {
        self.process_until(&[]).map(|_| ()).map_err(|error| {
            self.buffer = None;
            self.named(error)
        })
    }

    /// Parse an expression, stopping before any of the given symbols.
    ///
    /// # Errors
    ///
    /// Returns an Error if no expression can be read.
    pub fn expression(&mut self, stops: &[&str]) -> Result<Expression, Error> {
        self.parse_expression(stops)
            .map_err(|error| self.named(error))
    }

    /// Consume and return the next token.
    ///
    /// # Errors
    ///
    /// Propagates any error reported by the underlying Source.
    pub fn next(&mut self) -> TokenResult<'source> {
        self.advance().map_err(|error| self.named(error))
    }

    /// Read text and tags into the current context until a tag beginning
    /// with one of the given keywords is found, or the source ends.
    ///
    /// Returns None when the source ends.
    fn process_until(&mut self, terminators: &[Keyword]) -> Result<Option<Terminator>, Error> {
        loop {
            debug_assert!(self.buffer.is_none(), "text must not be read past a peek");

            if let (Token::Text(text), span) = self.source.text() {
                if !text.is_empty() {
                    self.push(Tree::Text(Text {
                        text: text.to_string(),
                        span,
                    }));
                }
            }
            if self.source.eos() {
                return Ok(None);
            }

            match self.advance()? {
                (Token::Symbol(BEGIN_PLACEABLE), open) => {
                    let tree = self.parse_placeable(open)?;
                    self.push(tree);
                }
                (Token::Symbol(BEGIN_TAG), open) => {
                    let (name, span) = self.expect_identifier()?;
                    trace!("dispatching tag `{name}` at {span}");

                    match Keyword::recognize(name) {
                        Some(keyword) if terminators.contains(&keyword) => {
                            return Ok(Some(Terminator {
                                keyword,
                                open,
                                span,
                            }));
                        }
                        keyword => self.parse_tag(keyword, name, open, span)?,
                    }
                }
                (token, span) => {
                    return Err(self.unexpected(
                        &token,
                        span,
                        format!("expected `{BEGIN_PLACEABLE}` or `{BEGIN_TAG}`"),
                    ))
                }
            }
        }
    }

    /// Parse a tag, after its keyword has been read.
    ///
    /// The resulting Tree, if any, is added to the current context.
    fn parse_tag(
        &mut self,
        keyword: Option<Keyword>,
        name: &str,
        open: Span,
        span: Span,
    ) -> Result<(), Error> {
        let tree = match keyword {
            Some(Keyword::If) => self.parse_if(open)?,
            Some(Keyword::For) => self.parse_for(open)?,
            Some(Keyword::Set) => self.parse_set(open)?,
            Some(Keyword::Call) => self.parse_call(open)?,
            Some(Keyword::Filter) => self.parse_filter_block(open)?,
            Some(Keyword::Block) => self.parse_block(open)?,
            Some(Keyword::Macro) => return self.parse_macro(open),
            Some(Keyword::Extends) => return self.parse_extends(),
            _ => {
                return Err(Error::build(UNEXPECTED_TOKEN)
                    .with_pointer(self.source.text, span)
                    .with_help(expected_tag(name)))
            }
        };
        self.push(tree);

        Ok(())
    }

    /// Read a body into a new Scope until one of the given keywords closes it.
    ///
    /// The Scope spans from the current position up to the `{%` of the
    /// closing tag. The rest of the closing tag is left for the caller.
    fn parse_body(&mut self, terminators: &[Keyword]) -> Result<(Scope, Terminator), Error> {
        let at = Span::empty(self.source.position());
        self.nested(at, |parser| parser.read_body(terminators))
    }

    /// Read a body into a Scope that is pushed for its duration.
    fn read_body(&mut self, terminators: &[Keyword]) -> Result<(Scope, Terminator), Error> {
        self.scopes.push(Scope::new(self.source.position()));

        let Some(terminator) = self.process_until(terminators)? else {
            return Err(error_eof(self.source.text, self.source.position())
                .with_help(expected_closing(terminators)));
        };

        let scope = self
            .scopes
            .pop()
            .expect("parser should have a scope for the body");

        Ok((scope.close(terminator.open.start), terminator))
    }

    /// Parse a placeable.
    ///
    /// Filters written directly in the placeable are collected into a list,
    /// rather than nested as they are in other expressions.
    fn parse_placeable(&mut self, open: Span) -> Result<Tree, Error> {
        // {{ name | prepend("hello, ") | upper }}
        // |                                     |
        // from                                  to
        let value = self.parse_expression(&[PIPE, END_PLACEABLE])?;

        let mut filters = vec![];
        while self.next_is_symbol(PIPE)? {
            self.advance()?;
            filters.push(self.parse_postfix()?);
        }
        let close = self.expect_symbol(END_PLACEABLE)?;

        Ok(Tree::PutValue(PutValue {
            value,
            filters,
            span: open.combine(close),
        }))
    }

    /// Parse an "if" block, with any number of "elif" arms and an optional
    /// "else" arm.
    fn parse_if(&mut self, open: Span) -> Result<Tree, Error> {
        // {% if a %}..{% elif b %}..{% else %}..{% endif %}
        // |                                           |
        // from                                        to
        let mut arms = vec![];
        let mut arm_open = open;
        let mut condition = self.parse_expression(&[END_TAG])?;
        self.expect_symbol(END_TAG)?;

        let end = loop {
            let (scope, terminator) =
                self.parse_body(&[Keyword::Elif, Keyword::Else, Keyword::EndIf])?;
            arms.push(Arm {
                condition,
                body: scope.body,
                span: Span::new(arm_open.start, terminator.span.end),
            });

            match terminator.keyword {
                Keyword::Elif => {
                    condition = self.parse_expression(&[END_TAG])?;
                    self.expect_symbol(END_TAG)?;
                    arm_open = terminator.open;
                }
                Keyword::Else => {
                    self.expect_symbol(END_TAG)?;

                    // The else arm begins where the previous arm's body ends.
                    let boundary = terminator.open.start;
                    let (scope, end) = self.parse_body(&[Keyword::EndIf])?;
                    arms.push(Arm {
                        condition: Expression::Boolean(BooleanLiteral {
                            value: true,
                            span: Span::empty(boundary),
                        }),
                        body: scope.body,
                        span: Span::new(boundary, end.span.end),
                    });

                    break end;
                }
                _ => break terminator,
            }
        };
        self.expect_symbol(END_TAG)?;

        Ok(Tree::CaseStatement(CaseStatement {
            arms,
            span: Span::new(open.start, end.span.end),
        }))
    }

    /// Parse a "for" block.
    fn parse_for(&mut self, open: Span) -> Result<Tree, Error> {
        // {% for key, value in dict.items() if value %}..{% else %}..{% endfor %}
        let pattern = self.parse_pattern()?;
        self.expect_keyword(Keyword::In)?;
        let iterable = self.parse_expression(&["if", END_TAG])?;

        let filter = if self.next_is_keyword(Keyword::If)? {
            self.advance()?;
            Some(self.parse_expression(&[END_TAG])?)
        } else {
            None
        };
        self.expect_symbol(END_TAG)?;

        let (body, terminator) = self.parse_body(&[Keyword::Else, Keyword::EndFor])?;
        let (alternative, end) = match terminator.keyword {
            Keyword::Else => {
                self.expect_symbol(END_TAG)?;
                let (scope, end) = self.parse_body(&[Keyword::EndFor])?;
                (Some(scope.body), end)
            }
            _ => (None, terminator),
        };
        self.expect_symbol(END_TAG)?;

        Ok(Tree::ForLoop(ForLoop {
            pattern,
            iterable,
            filter,
            body,
            alternative,
            span: Span::new(open.start, end.span.end),
        }))
    }

    /// Parse a "set" tag.
    fn parse_set(&mut self, open: Span) -> Result<Tree, Error> {
        let pattern = self.parse_pattern()?;
        self.expect_symbol("=")?;
        let value = self.parse_expression(&[END_TAG])?;
        let close = self.expect_symbol(END_TAG)?;

        Ok(Tree::Assign(Assign {
            pattern,
            value,
            span: open.combine(close),
        }))
    }

    /// Parse a "macro" block and register the definition.
    ///
    /// Nothing is added to the current context.
    fn parse_macro(&mut self, open: Span) -> Result<(), Error> {
        // {% macro name(a1, a2=10) %}..{% endmacro %}
        let name = self.parse_identifier()?;
        self.expect_symbol("(")?;

        let mut args = vec![];
        while !self.next_is_symbol(")")? {
            let name = self.parse_identifier()?;
            let default = if self.next_is_symbol("=")? {
                self.advance()?;
                Some(self.parse_expression(&[",", ")"])?)
            } else {
                None
            };
            let end = default.as_ref().map_or(name.span, Expression::span);

            args.push(Argument {
                span: name.span.combine(end),
                name,
                default,
            });

            if !self.next_is_symbol(")")? {
                self.expect_symbol(",")?;
            }
        }
        self.expect_symbol(")")?;
        self.expect_symbol(END_TAG)?;

        let (body, end) = self.parse_body(&[Keyword::EndMacro])?;
        self.expect_symbol(END_TAG)?;

        let key = name.value.clone();
        let definition = Macro {
            name,
            args,
            body,
            span: Span::new(open.start, end.span.end),
        };
        debug!("registered macro `{key}`");
        if self.macros.insert(key.clone(), definition).is_some() {
            warn!("macro `{key}` was defined more than once, the last definition is kept");
        }

        Ok(())
    }

    /// Parse a "call" block.
    fn parse_call(&mut self, open: Span) -> Result<Tree, Error> {
        let name = self.parse_identifier()?;
        let args = if self.next_is_symbol("(")? {
            self.parse_arguments()?.0
        } else {
            vec![]
        };
        self.expect_symbol(END_TAG)?;

        let (body, end) = self.parse_body(&[Keyword::EndCall])?;
        self.expect_symbol(END_TAG)?;

        Ok(Tree::MacroCall(MacroCall {
            name,
            args,
            body,
            span: Span::new(open.start, end.span.end),
        }))
    }

    /// Parse a "filter" block.
    fn parse_filter_block(&mut self, open: Span) -> Result<Tree, Error> {
        let filter = self.parse_expression(&[END_TAG])?;
        self.expect_symbol(END_TAG)?;

        let (body, end) = self.parse_body(&[Keyword::EndFilter])?;
        self.expect_symbol(END_TAG)?;

        Ok(Tree::FilterBlock(FilterBlock {
            filter,
            body,
            span: Span::new(open.start, end.span.end),
        }))
    }

    /// Parse a "block" block and register the definition.
    ///
    /// Returns a CallBlock that marks where the block is rendered, spanning
    /// the whole definition.
    fn parse_block(&mut self, open: Span) -> Result<Tree, Error> {
        // {% block name %}..{% endblock name %}
        // |                                   |
        // from                                to
        let name = self.parse_identifier()?;
        self.expect_symbol(END_TAG)?;

        let (body, _) = self.parse_body(&[Keyword::EndBlock])?;
        if let (Token::Identifier(closing), span) = self.peek()? {
            if closing != name.value {
                return Err(Error::build(UNEXPECTED_TOKEN)
                    .with_pointer(self.source.text, span)
                    .with_help(format!(
                        "expected `{}` to match the name of the opening block",
                        name.value
                    )));
            }
            self.advance()?;
        }
        let close = self.expect_symbol(END_TAG)?;
        let span = open.combine(close);

        let key = name.value.clone();
        let placeholder = CallBlock {
            name: name.clone(),
            span,
        };
        debug!("registered block `{key}`");
        if self.blocks.insert(key.clone(), Block { name, body, span }).is_some() {
            warn!("block `{key}` was defined more than once, the last definition is kept");
        }

        Ok(Tree::CallBlock(placeholder))
    }

    /// Parse an "extends" tag.
    fn parse_extends(&mut self) -> Result<(), Error> {
        let target = self.parse_expression(&[END_TAG])?;
        self.expect_symbol(END_TAG)?;

        if self.extends.is_some() {
            return Err(Error::build(INVALID_SYNTAX)
                .with_pointer(self.source.text, target.span())
                .with_help("a template may only extend one other template"));
        }
        self.extends = Some(target);

        Ok(())
    }

    /// Parse the target of an assignment or loop, which is a single name or
    /// several names separated by commas.
    fn parse_pattern(&mut self) -> Result<Pattern, Error> {
        let first = self.parse_variable()?;
        if !self.next_is_symbol(",")? {
            return Ok(Pattern::Variable(first));
        }

        let mut span = first.span;
        let mut names = vec![first];
        while self.next_is_symbol(",")? {
            self.advance()?;
            let name = self.parse_variable()?;
            span = span.combine(name.span);
            names.push(name);
        }

        Ok(Pattern::Unpack(Unpack { names, span }))
    }

    /// Parse a parenthesized list of arguments.
    ///
    /// Returns the arguments and the Span of the closing parenthesis.
    fn parse_arguments(&mut self) -> Result<(Vec<Expression>, Span), Error> {
        let open = self.expect_symbol("(")?;
        self.nested(open, Self::read_arguments)
    }

    /// Read arguments after the opening parenthesis, through the closing one.
    fn read_arguments(&mut self) -> Result<(Vec<Expression>, Span), Error> {
        let mut args = vec![];
        while !self.next_is_symbol(")")? {
            args.push(self.parse_expression(&[",", ")"])?);

            if !self.next_is_symbol(")")? {
                self.expect_symbol(",")?;
            }
        }
        let close = self.expect_symbol(")")?;

        Ok((args, close))
    }

    /// Parse an Identifier.
    fn parse_identifier(&mut self) -> Result<Identifier, Error> {
        let (value, span) = self.expect_identifier()?;

        Ok(Identifier {
            value: value.to_string(),
            span,
        })
    }

    /// Parse a Variable.
    fn parse_variable(&mut self) -> Result<Variable, Error> {
        let (name, span) = self.expect_identifier()?;

        Ok(Variable {
            name: name.to_string(),
            span,
        })
    }

    /// Add a Tree to the current context.
    fn push(&mut self, tree: Tree) {
        self.scopes
            .last_mut()
            .expect("parser should always have a root scope")
            .body
            .push(tree);
    }

    /// Peek the next token.
    ///
    /// Tag content is always read with strings enabled.
    ///
    /// # Errors
    ///
    /// Propagates any error reported by the underlying Source.
    fn peek(&mut self) -> TokenResult<'source> {
        let next = match self.buffer.take() {
            Some(next) => next,
            None => self.source.next(true)?,
        };
        self.buffer = Some(next.clone());

        Ok(next)
    }

    /// Get the next token.
    ///
    /// Prefers to pull a token from the internal buffer first, but will pull from
    /// the Source when the buffer is empty.
    fn advance(&mut self) -> TokenResult<'source> {
        match self.buffer.take() {
            Some(next) => Ok(next),
            None => self.source.next(true),
        }
    }

    /// Returns true if the upcoming token is the given symbol.
    fn next_is_symbol(&mut self, symbol: &str) -> Result<bool, Error> {
        Ok(self.peek()?.0.is_symbol(symbol))
    }

    /// Returns true if the upcoming token is an identifier spelling the
    /// given keyword.
    fn next_is_keyword(&mut self, keyword: Keyword) -> Result<bool, Error> {
        Ok(match self.peek()?.0 {
            Token::Identifier(name) => Keyword::recognize(name) == Some(keyword),
            _ => false,
        })
    }

    /// Get the next token, and require that it is the given symbol.
    fn expect_symbol(&mut self, symbol: &'static str) -> Result<Span, Error> {
        match self.advance()? {
            (Token::Symbol(found), span) if found == symbol => Ok(span),
            (token, span) => Err(self.unexpected(&token, span, format!("expected `{symbol}`"))),
        }
    }

    /// Get the next token, and require that it is an identifier.
    fn expect_identifier(&mut self) -> Result<(&'source str, Span), Error> {
        match self.advance()? {
            (Token::Identifier(name), span) => Ok((name, span)),
            (token, span) => Err(self.unexpected(&token, span, "expected a name")),
        }
    }

    /// Get the next token, and require that it spells the given keyword.
    fn expect_keyword(&mut self, keyword: Keyword) -> Result<Span, Error> {
        match self.advance()? {
            (Token::Identifier(name), span) if Keyword::recognize(name) == Some(keyword) => {
                Ok(span)
            }
            (token, span) => Err(self.unexpected(&token, span, format!("expected `{keyword}`"))),
        }
    }

    /// Return an Error describing an unexpected token.
    fn unexpected<T>(&self, token: &Token, span: Span, help: T) -> Error
    where
        T: Into<String>,
    {
        let help = help.into();

        match token {
            Token::End => error_eof(self.source.text, span.start).with_help(help),
            _ => Error::build(UNEXPECTED_TOKEN)
                .with_pointer(self.source.text, span)
                .with_help(format!("{help}, found `{token}`")),
        }
    }

    /// Run `parse` one level deeper, failing at the given Span once
    /// [`MAX_DEPTH`] is reached.
    fn nested<T, F>(&mut self, span: Span, parse: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Self) -> Result<T, Error>,
    {
        if self.depth >= MAX_DEPTH {
            return Err(Error::build(INVALID_SYNTAX)
                .with_pointer(self.source.text, span)
                .with_help(format!("nested too deeply, the limit is {MAX_DEPTH} levels")));
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;

        result
    }

    /// Attach the template name to the given Error, if there is one.
    fn named(&self, error: Error) -> Error {
        match &self.name {
            Some(name) => error.with_name(name.clone()),
            None => error,
        }
    }
}

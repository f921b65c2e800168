//! Expression parsing by precedence climbing.
//!
//! Binary operators are folded by binding power (see [`Operator::binding`]),
//! with the `|` filter binding loosest of all. Unary operators apply to the
//! single postfix expression that follows them.
use super::Parser;
use crate::{
    compile::{
        source::token::{Token, PIPE},
        tree::{
            BinOp, Expression, Filter, FunctionCall, Member, NumberLiteral, Op, StringLiteral,
            UnOp, Variable,
        },
        Keyword, Operator,
    },
    diag::{Error, INVALID_SYNTAX},
    span::Span,
};

/// An operator found between two operands.
enum Infix {
    /// Pass the value on the left through the filter on the right.
    Filter,
    Binary(Operator),
}

impl Infix {
    /// Return the Infix spelled by the given token, if any.
    fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::Symbol(PIPE) => Some(Infix::Filter),
            Token::Symbol(symbol) => Operator::from_symbol(symbol).map(Infix::Binary),
            Token::Identifier(name) => Keyword::recognize(name)
                .and_then(Operator::from_keyword)
                .map(Infix::Binary),
            _ => None,
        }
    }

    /// Return the binding power, and true if the Infix associates to the right.
    fn binding(&self) -> Option<(u8, bool)> {
        match self {
            Infix::Filter => Some((1, false)),
            Infix::Binary(operator) => operator.binding(),
        }
    }
}

impl<'source> Parser<'source> {
    /// Parse a complete expression.
    ///
    /// Reading ends before the first symbol or identifier found in `stops`,
    /// or before any token that cannot continue the expression. That token
    /// is left unconsumed.
    pub(super) fn parse_expression(&mut self, stops: &[&str]) -> Result<Expression, Error> {
        self.parse_binary(stops, 0)
    }

    /// Parse a postfix expression, which is a primary expression followed by
    /// any number of member accesses and calls.
    pub(super) fn parse_postfix(&mut self) -> Result<Expression, Error> {
        let mut expression = self.parse_primary()?;

        loop {
            if self.next_is_symbol(".")? {
                self.advance()?;
                let property = self.parse_variable()?;

                expression = Expression::Member(Member {
                    span: expression.span().combine(property.span),
                    object: Box::new(expression),
                    property,
                });
            } else if self.next_is_symbol("(")? {
                let (args, close) = self.parse_arguments()?;

                expression = Expression::FunctionCall(FunctionCall {
                    span: expression.span().combine(close),
                    function: Box::new(expression),
                    args,
                });
            } else {
                break;
            }
        }

        Ok(expression)
    }

    /// Parse operands joined by infix operators that bind at least as
    /// tightly as `minimum`.
    fn parse_binary(&mut self, stops: &[&str], minimum: u8) -> Result<Expression, Error> {
        let mut left = self.parse_unary()?;

        loop {
            let (token, span) = self.peek()?;
            if is_stop(&token, stops) {
                break;
            }
            let Some(infix) = Infix::from_token(&token) else {
                break;
            };
            let Some((power, right)) = infix.binding() else {
                break;
            };
            if power < minimum {
                break;
            }
            self.advance()?;

            left = match infix {
                Infix::Filter => {
                    let filter = self.parse_postfix()?;

                    Expression::Filter(Filter {
                        span: left.span().combine(filter.span()),
                        value: Box::new(left),
                        filter: Box::new(filter),
                    })
                }
                Infix::Binary(operator) => {
                    let next = if right { power } else { power + 1 };
                    let rhs = self.nested(span, |parser| parser.parse_binary(stops, next))?;

                    Expression::BinOp(BinOp {
                        span: left.span().combine(rhs.span()),
                        op: Op {
                            value: operator,
                            span,
                        },
                        left: Box::new(left),
                        right: Box::new(rhs),
                    })
                }
            };
        }

        Ok(left)
    }

    /// Parse a unary operation, or fall through to a postfix expression.
    fn parse_unary(&mut self) -> Result<Expression, Error> {
        let (token, span) = self.peek()?;
        let operator = match token {
            Token::Symbol("-") => Operator::Subtract,
            Token::Identifier(name) if Keyword::recognize(name) == Some(Keyword::Not) => {
                Operator::Not
            }
            _ => return self.parse_postfix(),
        };
        self.advance()?;
        let argument = self.nested(span, Self::parse_unary)?;

        Ok(Expression::UnOp(UnOp {
            span: span.combine(argument.span()),
            op: Op {
                value: operator,
                span,
            },
            argument: Box::new(argument),
        }))
    }

    /// Parse a number, a string, a name or a parenthesized expression.
    ///
    /// Parentheses only group, the resulting expression spans the content
    /// between them.
    fn parse_primary(&mut self) -> Result<Expression, Error> {
        match self.advance()? {
            (Token::Number(value), span) => Ok(Expression::Number(NumberLiteral { value, span })),
            (Token::Identifier(name), span) => Ok(Expression::Variable(Variable {
                name: name.to_string(),
                span,
            })),
            (Token::String, span) => self.parse_string(span).map(Expression::String),
            (Token::Symbol("("), open) => self.nested(open, |parser| {
                let inner = parser.parse_expression(&[")"])?;
                parser.expect_symbol(")")?;

                Ok(inner)
            }),
            (token, span) => Err(self.unexpected(
                &token,
                span,
                "expected a number, a string, a name, or `(`",
            )),
        }
    }

    /// Decode the string literal covered by the given Span.
    fn parse_string(&self, span: Span) -> Result<StringLiteral, Error> {
        let literal = &self.source.text[span];
        let quote = literal.chars().next().unwrap_or_default();

        let mut value = String::with_capacity(literal.len());
        let mut chars = literal[quote.len_utf8()..].chars();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    let escaped = match chars.next() {
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some(c @ ('\\' | '"' | '\'')) => c,
                        other => {
                            let sequence = other.map(String::from).unwrap_or_default();

                            return Err(Error::build(INVALID_SYNTAX)
                                .with_pointer(self.source.text, span)
                                .with_help(format!(
                                    "unknown escape sequence `\\{sequence}`, \
                                    expected one of `\\n`, `\\r`, `\\t`, `\\\\`, `\\\"`, `\\'`"
                                )));
                        }
                    };
                    value.push(escaped);
                }
                c if c == quote => {
                    closed = true;
                    break;
                }
                c => value.push(c),
            }
        }

        if !closed {
            return Err(Error::build(INVALID_SYNTAX)
                .with_pointer(self.source.text, span)
                .with_help(format!(
                    "this might be an undelimited string, try closing it with `{quote}`"
                )));
        }

        Ok(StringLiteral { value, span })
    }
}

/// Return true if the token is a symbol or identifier found in `stops`.
fn is_stop(token: &Token, stops: &[&str]) -> bool {
    let text = match token {
        Token::Symbol(symbol) => *symbol,
        Token::Identifier(name) => *name,
        _ => return false,
    };

    stops.iter().any(|stop| *stop == text)
}

#[cfg(test)]
mod tests {
    use crate::{
        compile::{source::token::Token, tree::Expression, Parser},
        diag::{INVALID_SYNTAX, UNEXPECTED_EOF, UNEXPECTED_TOKEN},
    };

    /// Render the shape of an expression, with every operation parenthesized.
    fn shape(expression: &Expression) -> String {
        match expression {
            Expression::Variable(variable) => variable.name.clone(),
            Expression::Number(number) => number.value.to_string(),
            Expression::String(string) => format!("{:?}", string.value),
            Expression::Boolean(boolean) => boolean.value.to_string(),
            Expression::Member(member) => {
                format!("{}.{}", shape(&member.object), member.property.name)
            }
            Expression::FunctionCall(call) => {
                let args: Vec<String> = call.args.iter().map(shape).collect();
                format!("{}({})", shape(&call.function), args.join(", "))
            }
            Expression::BinOp(op) => {
                format!("({} {} {})", shape(&op.left), op.op.value, shape(&op.right))
            }
            Expression::UnOp(op) => format!("({} {})", op.op.value, shape(&op.argument)),
            Expression::Filter(filter) => {
                format!("({} | {})", shape(&filter.value), shape(&filter.filter))
            }
        }
    }

    fn parse(text: &str) -> String {
        shape(&Parser::new(text).expression(&[]).unwrap())
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(parse("a ** b ** c"), "(a ** (b ** c))");
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        assert_eq!(parse("a - b - c"), "((a - b) - c)");
    }

    #[test]
    fn test_logical_and_comparison_precedence() {
        assert_eq!(
            parse("a or b and c == d + 1"),
            "(a or (b and (c == (d + 1))))"
        );
        assert_eq!(parse("a < b != c >= d"), "(((a < b) != c) >= d)");
    }

    #[test]
    fn test_unary_binds_to_operand() {
        assert_eq!(parse("not a and b"), "((not a) and b)");
        assert_eq!(parse("-x.y(1)"), "(- x.y(1))");
        assert_eq!(parse("not not a"), "(not (not a))");
    }

    #[test]
    fn test_parentheses_group() {
        assert_eq!(parse("a * (b + c) % 2"), "((a * (b + c)) % 2)");
    }

    #[test]
    fn test_filter_binds_loosest() {
        assert_eq!(parse("a + b | f(1) | g"), "(((a + b) | f(1)) | g)");
    }

    #[test]
    fn test_decimal_operand() {
        assert_eq!(parse("1.5 * 2"), "(1.5 * 2)");
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(parse(r#"'it\'s\n'"#), r#""it's\n""#);
        assert_eq!(parse(r#""a 'b' \\ \t""#), r#""a 'b' \\ \t""#);
    }

    #[test]
    fn test_unclosed_string() {
        let error = Parser::new("'abc").expression(&[]).unwrap_err();

        assert_eq!(error.reason(), INVALID_SYNTAX);
        assert!(error.help().unwrap().contains("try closing it with `'`"));
    }

    #[test]
    fn test_unknown_escape() {
        let error = Parser::new(r#""\q""#).expression(&[]).unwrap_err();

        assert_eq!(error.reason(), INVALID_SYNTAX);
        assert!(error.help().unwrap().contains("`\\q`"));
    }

    #[test]
    fn test_missing_operand() {
        let error = Parser::new("+ a").expression(&[]).unwrap_err();
        assert_eq!(error.reason(), UNEXPECTED_TOKEN);

        let error = Parser::new("a *").expression(&[]).unwrap_err();
        assert_eq!(error.reason(), UNEXPECTED_EOF);
    }

    #[test]
    fn test_stops_before_identifier() {
        let mut parser = Parser::new("items if x");

        assert_eq!(shape(&parser.expression(&["if"]).unwrap()), "items");
        assert_eq!(parser.next().unwrap().0, Token::Identifier("if"));
    }

    #[test]
    fn test_named_errors() {
        let error = Parser::new("(a")
            .with_name("page.html")
            .expression(&[])
            .unwrap_err();

        assert_eq!(error.reason(), UNEXPECTED_EOF);
        assert_eq!(error.name(), Some("page.html"));
    }
}

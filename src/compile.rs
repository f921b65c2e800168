mod parse;
mod source;
mod template;

pub use crate::compile::{
    parse::{scope::Scope, tree, Parser},
    source::{token, Source, TokenResult},
    template::Template,
};

use crate::diag::Error;
use serde::{Serialize, Serializer};
use std::fmt::Display;

/// Compile a [`Template`] from the given text.
///
/// Provides a shortcut to parse a `Template` without creating a `Parser`.
///
/// # Examples
///
/// ```
/// use quill::compile;
///
/// let template = compile("hello, {{ name | upper }}!");
/// assert!(template.is_ok())
/// ```
pub fn compile(text: &str) -> Result<Template, Error> {
    Parser::new(text).generate()
}

/// Keywords recognized by the Parser.
///
/// The `Source` never produces keywords, the Parser looks identifiers up
/// with [`Keyword::recognize`] wherever a keyword may appear.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Keyword {
    /// Beginning of an "if" block.
    If,
    /// Starts another arm in an "if" block.
    Elif,
    /// Marks the fallback arm of an "if" block, or the alternative of a loop.
    Else,
    /// End of an "if" block.
    EndIf,
    /// Beginning of a loop.
    For,
    /// Divides the pattern from the iterable in a loop.
    In,
    /// End of a loop.
    EndFor,
    /// Beginning of a macro definition.
    Macro,
    /// End of a macro definition.
    EndMacro,
    /// Beginning of a macro call with a body.
    Call,
    /// End of a macro call.
    EndCall,
    /// Beginning of a filter block.
    Filter,
    /// End of a filter block.
    EndFilter,
    /// Beginning of an assignment.
    Set,
    /// Beginning of a "block" block.
    Block,
    /// End of a "block" block.
    EndBlock,
    /// Names the template this template extends.
    Extends,
    /// Enables negation.
    Not,
    /// Logical conjunction.
    And,
    /// Logical disjunction.
    Or,
}

impl Keyword {
    /// Return the [`Keyword`] spelled by the given identifier, if any.
    pub fn recognize(identifier: &str) -> Option<Self> {
        let keyword = match identifier {
            "if" => Keyword::If,
            "elif" => Keyword::Elif,
            "else" => Keyword::Else,
            "endif" => Keyword::EndIf,
            "for" => Keyword::For,
            "in" => Keyword::In,
            "endfor" => Keyword::EndFor,
            "macro" => Keyword::Macro,
            "endmacro" => Keyword::EndMacro,
            "call" => Keyword::Call,
            "endcall" => Keyword::EndCall,
            "filter" => Keyword::Filter,
            "endfilter" => Keyword::EndFilter,
            "set" => Keyword::Set,
            "block" => Keyword::Block,
            "endblock" => Keyword::EndBlock,
            "extends" => Keyword::Extends,
            "not" => Keyword::Not,
            "and" => Keyword::And,
            "or" => Keyword::Or,
            _ => return None,
        };

        Some(keyword)
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Keyword::If => write!(f, "if"),
            Keyword::Elif => write!(f, "elif"),
            Keyword::Else => write!(f, "else"),
            Keyword::EndIf => write!(f, "endif"),
            Keyword::For => write!(f, "for"),
            Keyword::In => write!(f, "in"),
            Keyword::EndFor => write!(f, "endfor"),
            Keyword::Macro => write!(f, "macro"),
            Keyword::EndMacro => write!(f, "endmacro"),
            Keyword::Call => write!(f, "call"),
            Keyword::EndCall => write!(f, "endcall"),
            Keyword::Filter => write!(f, "filter"),
            Keyword::EndFilter => write!(f, "endfilter"),
            Keyword::Set => write!(f, "set"),
            Keyword::Block => write!(f, "block"),
            Keyword::EndBlock => write!(f, "endblock"),
            Keyword::Extends => write!(f, "extends"),
            Keyword::Not => write!(f, "not"),
            Keyword::And => write!(f, "and"),
            Keyword::Or => write!(f, "or"),
        }
    }
}

/// Operators recognized by the Parser.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Operator {
    /// +
    Add,
    /// -
    Subtract,
    /// *
    Multiply,
    /// /
    Divide,
    /// %
    Modulo,
    /// **
    Power,
    /// >
    Greater,
    /// <
    Lesser,
    /// ==
    Equal,
    /// !=
    NotEqual,
    /// >=
    GreaterOrEqual,
    /// <=
    LesserOrEqual,
    /// and
    And,
    /// or
    Or,
    /// not
    Not,
}

impl Operator {
    /// Return the binary [`Operator`] spelled by the given symbol, if any.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let operator = match symbol {
            "+" => Operator::Add,
            "-" => Operator::Subtract,
            "*" => Operator::Multiply,
            "/" => Operator::Divide,
            "%" => Operator::Modulo,
            "**" => Operator::Power,
            ">" => Operator::Greater,
            "<" => Operator::Lesser,
            "==" => Operator::Equal,
            "!=" => Operator::NotEqual,
            ">=" => Operator::GreaterOrEqual,
            "<=" => Operator::LesserOrEqual,
            _ => return None,
        };

        Some(operator)
    }

    /// Return the binary [`Operator`] spelled by the given keyword, if any.
    pub fn from_keyword(keyword: Keyword) -> Option<Self> {
        match keyword {
            Keyword::And => Some(Operator::And),
            Keyword::Or => Some(Operator::Or),
            _ => None,
        }
    }

    /// Return the binding power of this [`Operator`] when used between two
    /// operands, and true when it associates to the right.
    ///
    /// Higher binds tighter. Filters bind loosest of all, at 1. Returns None
    /// for `not`, which only appears before its operand.
    pub fn binding(&self) -> Option<(u8, bool)> {
        let binding = match self {
            Operator::Or => (2, false),
            Operator::And => (3, false),
            Operator::Equal
            | Operator::NotEqual
            | Operator::Greater
            | Operator::Lesser
            | Operator::GreaterOrEqual
            | Operator::LesserOrEqual => (4, false),
            Operator::Add | Operator::Subtract => (5, false),
            Operator::Multiply | Operator::Divide | Operator::Modulo => (6, false),
            Operator::Power => (7, true),
            Operator::Not => return None,
        };

        Some(binding)
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Add => write!(f, "+"),
            Operator::Subtract => write!(f, "-"),
            Operator::Multiply => write!(f, "*"),
            Operator::Divide => write!(f, "/"),
            Operator::Modulo => write!(f, "%"),
            Operator::Power => write!(f, "**"),
            Operator::Greater => write!(f, ">"),
            Operator::Lesser => write!(f, "<"),
            Operator::Equal => write!(f, "=="),
            Operator::NotEqual => write!(f, "!="),
            Operator::GreaterOrEqual => write!(f, ">="),
            Operator::LesserOrEqual => write!(f, "<="),
            Operator::And => write!(f, "and"),
            Operator::Or => write!(f, "or"),
            Operator::Not => write!(f, "not"),
        }
    }
}

impl Serialize for Operator {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{Keyword, Operator};

    #[test]
    fn test_recognize_keyword() {
        assert_eq!(Keyword::recognize("endfor"), Some(Keyword::EndFor));
        assert_eq!(Keyword::recognize("not"), Some(Keyword::Not));
        assert_eq!(Keyword::recognize("endfors"), None);
        assert_eq!(Keyword::recognize("If"), None);
    }

    #[test]
    fn test_operator_spelling() {
        for symbol in ["+", "-", "*", "/", "%", "**", ">", "<", "==", "!=", ">=", "<="] {
            let operator = Operator::from_symbol(symbol).unwrap();
            assert_eq!(operator.to_string(), symbol);
        }
        assert_eq!(Operator::from_symbol("="), None);
        assert_eq!(Operator::from_keyword(Keyword::Or), Some(Operator::Or));
    }

    #[test]
    fn test_precedence_order() {
        let power = |operator: Operator| operator.binding().unwrap().0;

        assert!(power(Operator::Multiply) > power(Operator::Add));
        assert!(power(Operator::Add) > power(Operator::Equal));
        assert!(power(Operator::Equal) > power(Operator::And));
        assert!(power(Operator::And) > power(Operator::Or));
        assert_eq!(Operator::Power.binding(), Some((7, true)));
        assert_eq!(Operator::Subtract.binding(), Some((5, false)));
        assert_eq!(Operator::Not.binding(), None);
    }
}

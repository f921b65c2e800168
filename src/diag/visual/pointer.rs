use std::{
    cmp::max,
    fmt::{Formatter, Result},
};

use super::{
    super::{RESET, YELLOW},
    {get_width, Visual, BLANK, EQUAL, HIGHLIGHT, PIPE},
};
use crate::span::Span;

/// A type of `Visual` that points to a specific location within source text.
#[derive(Debug, PartialEq)]
pub struct Pointer {
    /// The line that the Pointer is pointing to.
    ///
    /// This number should be zero indexed.
    line: usize,
    /// The display column that the Pointer is pointing to.
    ///
    /// This number should be zero indexed.
    column: usize,
    /// The display width of the object being highlighted.
    length: usize,
    /// The actual line of text that is being pointed to.
    text: String,
}

impl Pointer {
    /// Create a new Visual over the given source text and Span.
    ///
    /// Spans running over several lines are highlighted up to the end of
    /// their first line.
    pub fn new(source: &str, span: Span) -> Self {
        let line = span.start.line.saturating_sub(1);
        let text = source
            .split('\n')
            .nth(line)
            .unwrap_or_default()
            .trim_end_matches('\r');

        let prefix: String = text.chars().take(span.start.column).collect();
        let column = get_width(&prefix);

        let highlighted = if span.end.line == span.start.line {
            source.get(span.start.offset..span.end.offset).unwrap_or_default()
        } else {
            &text[prefix.len()..]
        };
        let length = max(1, get_width(highlighted));

        Self {
            line,
            column,
            length,
            text: text.to_string(),
        }
    }
}

impl Visual for Pointer {
    fn display(
        &self,
        formatter: &mut Formatter<'_>,
        template: Option<&str>,
        help: Option<&str>,
    ) -> Result {
        let num = (self.line + 1).to_string();
        let col = self.column + 1;
        let pad = get_width(&num);
        let align = self.column + self.length;

        let extra = "-".repeat(3_usize.saturating_sub(self.length));
        let name = template.unwrap_or("?");
        let text = &self.text;
        let underline = HIGHLIGHT.repeat(self.length);

        write!(
            formatter,
            "\n {BLANK:pad$}--> {name}:{num}:{col}\
             \n {BLANK:pad$} {PIPE}\
             \n {num:>} {PIPE} {text}\
             \n {BLANK:pad$} {PIPE} {YELLOW}{underline:>align$}{RESET}{extra}\
             \n {BLANK:pad$} {PIPE}\n",
        )?;

        if let Some(help) = help {
            writeln!(formatter, "{BLANK:pad$} {EQUAL} help: {help}")?;
        }

        Ok(())
    }
}

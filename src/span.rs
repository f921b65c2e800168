use serde::Serialize;
use std::{
    fmt::{Display, Formatter, Result},
    ops::Index,
};

/// A location within source text.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize)]
pub struct Position {
    /// Byte offset into the source text.
    pub offset: usize,
    /// Line number, starting at 1.
    pub line: usize,
    /// Characters since the beginning of the line, starting at 0.
    pub column: usize,
}

impl Position {
    /// Create a new [`Position`].
    #[inline]
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Return the [`Position`] immediately after the given character.
    pub fn advance(self, c: char) -> Self {
        if c == '\n' {
            Self {
                offset: self.offset + c.len_utf8(),
                line: self.line + 1,
                column: 0,
            }
        } else {
            Self {
                offset: self.offset + c.len_utf8(),
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl Default for Position {
    /// The beginning of any source text.
    fn default() -> Self {
        Self::new(0, 1, 0)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}:{}", self.line, self.column + 1)
    }
}

/// Represents an area within source text.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize)]
pub struct Span {
    /// The beginning of the area, inclusive.
    pub start: Position,
    /// The ending of the area, exclusive.
    pub end: Position,
}

impl Span {
    /// Create a new [`Span`] between the given positions.
    #[inline]
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(end.offset >= start.offset, "span must not end before it starts");

        Self { start, end }
    }

    /// Create a zero-width [`Span`] located at the given [`Position`].
    #[inline]
    pub fn empty(at: Position) -> Self {
        Self { start: at, end: at }
    }

    /// Return true if this [`Span`] ends where the given `Span` begins,
    /// or this `Span` begins where the given `Span` ends.
    pub fn is_neighbor(&self, other: Self) -> bool {
        self.end.offset == other.start.offset || other.end.offset == self.start.offset
    }

    /// Combine will merge the positions of two [`Span`] instances.
    pub fn combine(self, other: Self) -> Self {
        let start = if other.start.offset < self.start.offset {
            other.start
        } else {
            self.start
        };
        let end = if other.end.offset > self.end.offset {
            other.end
        } else {
            self.end
        };

        Self { start, end }
    }

    /// Return the number of bytes covered by this [`Span`].
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    /// Return true if this [`Span`] covers no text.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Access the literal value of a [`Span`].
    ///
    /// # Panics
    ///
    /// Panics if the `Span` is out of bounds in the given source text.
    pub fn literal<'source>(&self, source: &'source str) -> &'source str {
        source
            .get(self.start.offset..self.end.offset)
            .expect("getting literal by span should not fail")
    }
}

impl Index<Span> for str {
    type Output = str;

    fn index(&self, span: Span) -> &Self::Output {
        &self[span.start.offset..span.end.offset]
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

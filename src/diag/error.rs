use super::{Pointer, RED, RESET};
use crate::{diag::Visual, span::Span};
use std::fmt::{Debug, Display, Formatter, Result};

/// Describes a syntax error, and allows adding a contextual help text and
/// visualization.
///
/// # Examples
///
/// Creating an [`Error`] that includes a [`Visual`] of type [`Pointer`]:
///
/// ```
/// use quill::{Error, Position, Span};
///
/// let source = "{% update name %}";
/// let span = Span::new(Position::new(3, 1, 3), Position::new(9, 1, 9));
///
/// Error::build("unexpected token")
///     .with_pointer(source, span)
///     .with_name("template.txt")
///     .with_help("expected one of `if`, `for`, `set`");
/// ```
///
/// When printed with `println!("{:#}", error)` the [`Error`] produces this output:
///
/// ```text
/// error: unexpected token
///   --> template.txt:1:4
///    |
///  1 | {% update name %}
///    |    ^^^^^^
///    |
///   = help: expected one of `if`, `for`, `set`
/// ```
pub struct Error {
    /// Describes the cause of the [`Error`].
    reason: String,
    /// The area of source text that caused the [`Error`].
    span: Option<Span>,
    /// A visualization to help illustrate the [`Error`].
    visual: Option<Box<dyn Visual>>,
    /// Additional information to display with the [`Error`].
    help: Option<String>,
    /// The name of the template that the [`Error`] comes from.
    name: Option<String>,
}

impl Error {
    /// Create a new [`Error`] with the given reason text.
    ///
    /// The additional fields may be populated using the various methods
    /// defined on `Error`.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill::Error;
    ///
    /// Error::build("unexpected token")
    ///     .with_help("expected `%}`, found `}}`");
    /// ```
    pub fn build<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Error {
            reason: reason.into(),
            span: None,
            name: None,
            visual: None,
            help: None,
        }
    }

    /// Set the name text, which is the name of the template that the
    /// [`Error`] is related to.
    pub fn with_name<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(text.into());

        self
    }

    /// Set the [`Visual`], which is a visualization that helps illustrate the
    /// cause of the error.
    pub fn with_visual(mut self, visual: impl Visual + 'static) -> Self {
        self.visual = Some(Box::new(visual));

        self
    }

    /// Record the offending [`Span`] and point to it with a new [`Pointer`].
    ///
    /// This is a shortcut for setting the span and passing a `Pointer` to
    /// `with_visual` yourself.
    pub fn with_pointer(mut self, source: &str, span: Span) -> Self {
        self.span = Some(span);
        self.visual = Some(Box::new(Pointer::new(source, span)));

        self
    }

    /// Set the help text, which is contextual information to accompany the
    /// reason text.
    pub fn with_help<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.help = Some(text.into());

        self
    }

    /// Return the short summary of the error.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Return the area of source text that caused the error, if known.
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    /// Return the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Return the name of the template that the error is related to.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Debug for Error {
    /// Print the full diagnostic, or the fields of the Error when the
    /// alternate flag is set.
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if f.alternate() {
            return f
                .debug_struct("Error")
                .field("reason", &self.reason)
                .field("span", &self.span)
                .field("help", &self.help)
                .field("name", &self.name)
                .field("visual", &self.visual)
                .finish();
        }

        write!(f, "{self:#}")
    }
}

impl Display for Error {
    /// Print the reason, followed by the location of the offending source.
    ///
    /// With the alternate flag, the location is rendered by the Visual when
    /// there is one.
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{RED}error{RESET}: {}", self.reason)?;

        match (&self.visual, self.span) {
            (Some(visual), _) if f.alternate() => {
                visual.display(f, self.name.as_deref(), self.help.as_deref())
            }
            (_, Some(span)) => match &self.name {
                Some(name) => write!(f, " at {name}:{span}"),
                None => write!(f, " at {span}"),
            },
            _ => Ok(()),
        }
    }
}

impl std::error::Error for Error {}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.reason == other.reason
            && self.span == other.span
            && self.help == other.help
            && self.name == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use crate::span::{Position, Span};

    #[test]
    fn test_display_plain() {
        let error = Error::build("unexpected token");

        assert!(format!("{error}").ends_with(": unexpected token"));
    }

    #[test]
    fn test_display_location() {
        let span = Span::new(Position::new(3, 1, 3), Position::new(9, 1, 9));
        let error = Error::build("unexpected token").with_pointer("{% update name %}", span);

        assert!(format!("{error}").ends_with(": unexpected token at 1:4-1:10"));
        assert!(format!("{}", error.with_name("page.html")).ends_with(" at page.html:1:4-1:10"));
    }

    #[test]
    fn test_debug_alternate_lists_fields() {
        let error = Error::build("unexpected eof").with_help("expected `%}`");
        let text = format!("{error:#?}");

        assert!(text.starts_with("Error {"));
        assert!(text.contains("reason: \"unexpected eof\""));
    }

    #[test]
    fn test_display_alternate() {
        let source = "{% update name %}";
        let span = Span::new(Position::new(3, 1, 3), Position::new(9, 1, 9));
        let error = Error::build("unexpected token")
            .with_pointer(source, span)
            .with_name("template.txt")
            .with_help("expected `if`");
        let text = format!("{error:#}");

        assert!(text.contains("--> template.txt:1:4"));
        assert!(text.contains("1 | {% update name %}"));
        assert!(text.contains("^^^^^^"));
        assert!(text.contains("= help: expected `if`"));
        assert_eq!(error.span(), Some(span));
        assert_eq!(error.name(), Some("template.txt"));
    }
}

use crate::parser::Span;
use serde::Serialize;

/// Kind of interpolation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// The node mapping is not a mapping
    InvalidComponents,
    /// A delimiter pair is missing or empty
    InvalidTags,
    /// A marker names a node the mapping does not have
    MissingNode,
    /// A close marker with no open marker of the same name before it
    UnmatchedClose,
    /// An open marker that is never closed
    MissingClose,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidComponents => "Invalid components",
            ErrorKind::InvalidTags => "Invalid tags",
            ErrorKind::MissingNode => "Missing node",
            ErrorKind::UnmatchedClose => "Unmatched close marker",
            ErrorKind::MissingClose => "Missing close marker",
        }
    }
}

/// Error raised while interpolating a mixed string
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct InterpolateError {
    pub kind: ErrorKind,
    pub message: String,
    /// The offending marker, when the error points at one
    pub span: Option<Span>,
    pub related_span: Option<Span>,
    pub related_label: Option<String>,
    pub help: Option<String>,
}

impl InterpolateError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
            related_span: None,
            related_label: None,
            help: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Add a related span (e.g. the marker that opened an unclosed region)
    pub fn with_related(mut self, span: Span) -> Self {
        self.related_span = Some(span);
        self
    }

    pub fn with_related_label(mut self, label: impl Into<String>) -> Self {
        self.related_label = Some(label.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Wrap the message with the mixed string that failed, keeping kind and spans.
    pub fn in_context(mut self, mixed_string: &str) -> Self {
        self.message = format!(
            "Interpolation Error: unable to process `{}` because of error `{}`",
            mixed_string, self.message
        );
        self
    }

    /// Render the error with the offending source line underlined.
    ///
    /// `label` names the input in the header, e.g. a file name or `<stdin>`.
    pub fn render(&self, source: &str, label: &str) -> String {
        let mut output = String::new();
        output.push('\n');

        match self.span {
            Some(span) => output.push_str(&format!(
                " input: {}:{}:{}\n",
                label,
                span.start.line + 1,
                span.start.col + 1
            )),
            None => output.push_str(&format!(" input: {}\n", label)),
        }
        output.push_str(&format!("error[{}]: {}\n", self.kind.as_str(), self.message));

        if let Some(span) = self.span {
            render_snippet(&mut output, source, &span, None);
        }
        if let Some(related) = self.related_span {
            let label = self.related_label.as_deref().unwrap_or("opened here");
            render_snippet(&mut output, source, &related, Some(label));
        }

        if let Some(ref help) = self.help {
            output.push('\n');
            output.push_str(&format!(" help: {}\n", help));
        }

        output.push('\n');
        output
    }
}

/// Write one source line with carets under `span`, plus an optional label.
fn render_snippet(output: &mut String, source: &str, span: &Span, label: Option<&str>) {
    let Some(source_line) = source.lines().nth(span.start.line) else {
        return;
    };
    let line_number = span.start.line + 1;
    let width = format!("{}", line_number).len().max(2);

    output.push_str(&format!("{:>width$} |\n", "", width = width));
    output.push_str(&format!("{:>width$} | {}\n", line_number, source_line, width = width));

    let underline_len = if span.end.line == span.start.line {
        span.end.col.saturating_sub(span.start.col).max(1)
    } else {
        source_line.chars().count().saturating_sub(span.start.col).max(1)
    };
    let spaces = " ".repeat(span.start.col);
    let carets = "^".repeat(underline_len);
    match label {
        Some(label) => output.push_str(&format!(
            "{:>width$} | {}{} {}\n",
            "", spaces, carets, label, width = width
        )),
        None => output.push_str(&format!("{:>width$} | {}{}\n", "", spaces, carets, width = width)),
    }
}

//! Error types for importing form state and for the crate as a whole

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::layout::ConfigError;
use crate::model::ElementId;
use crate::schema::SchemaError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Reasons an imported form state is rejected
///
/// An import that fails leaves the current state untouched.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("malformed form state at line {line}, column {column}: {message}")]
    Malformed {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("duplicate element id '{id}' in imported grid")]
    DuplicateId { id: ElementId },
}

impl ImportError {
    /// Wrap a JSON decoding error, keeping its location
    pub fn from_json(err: serde_json::Error) -> Self {
        let message = err.to_string();
        // serde_json appends " at line X column Y"; the location is kept separately
        let message = match message.rfind(" at line ") {
            Some(idx) => message[..idx].to_string(),
            None => message,
        };
        ImportError::Malformed {
            line: err.line(),
            column: err.column(),
            message,
        }
    }

    pub fn duplicate(id: ElementId) -> Self {
        ImportError::DuplicateId { id }
    }

    /// Location of the error in the source text, if known
    pub fn span(&self, source: &str) -> Option<Span> {
        match self {
            ImportError::Malformed { line, column, .. } => {
                let start = offset_of(source, *line, *column);
                Some(start..(start + 1).min(source.len()).max(start))
            }
            ImportError::DuplicateId { id } => {
                let needle = format!("\"{}\"", id);
                let first = source.find(&needle)?;
                let second = first + needle.len() + source[first + needle.len()..].find(&needle)?;
                Some(second..second + needle.len())
            }
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let span = match self.span(source) {
            Some(span) => span,
            None => return self.to_string(),
        };

        let label_message = match self {
            ImportError::Malformed { message, .. } => message.clone(),
            ImportError::DuplicateId { .. } => {
                "this id is already used earlier in the grid".to_string()
            }
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(label_message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| self.to_string()),
            Err(_) => self.to_string(),
        }
    }
}

/// Convert a 1-based line/column pair into a byte offset, clamped to the text
fn offset_of(source: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (idx, text) in source.split_inclusive('\n').enumerate() {
        if idx + 1 == line {
            let col = column.saturating_sub(1).min(text.len());
            return (offset + col).min(source.len());
        }
        offset += text.len();
    }
    source.len()
}

/// Errors surfaced by the library's fallible entry points
#[derive(Debug, Error)]
pub enum FormError {
    #[error("import failed: {0}")]
    Import(#[from] ImportError),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_of_line_and_column() {
        let source = "ab\ncde\nf";
        assert_eq!(offset_of(source, 1, 1), 0);
        assert_eq!(offset_of(source, 2, 2), 4);
        assert_eq!(offset_of(source, 3, 1), 7);
        assert_eq!(offset_of(source, 9, 1), source.len());
    }

    #[test]
    fn test_malformed_message_drops_location_suffix() {
        let err = serde_json::from_str::<serde_json::Value>("{,}").unwrap_err();
        let import = ImportError::from_json(err);
        let text = import.to_string();
        assert!(text.starts_with("malformed form state at line 1, column 2"));
        assert_eq!(text.matches("line").count(), 1);
    }

    #[test]
    fn test_format_points_at_source() {
        let source = "{\n  \"grid\": [[}\n";
        let err = serde_json::from_str::<serde_json::Value>(source).unwrap_err();
        let report = ImportError::from_json(err).format(source, "form.json");
        assert!(report.contains("form.json"));
        assert!(report.contains("malformed form state"));
    }

    #[test]
    fn test_duplicate_span_targets_second_occurrence() {
        let source = r#"[{"id": "a"}, {"id": "a"}]"#;
        let span = ImportError::duplicate("a".into()).span(source).unwrap();
        assert_eq!(&source[span.clone()], "\"a\"");
        assert!(span.start > 10);
    }
}

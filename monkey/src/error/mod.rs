//! Error types and reporting

use crate::parser::ParseError;
use crate::runner::format_parse_errors;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, MonkeyError>;

/// Host-level error
#[derive(Debug, Error)]
pub enum MonkeyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Source that failed to parse, with the formatted diagnostics
    #[error("{count} parse error(s):\n{message}")]
    Parse { count: usize, message: String },

    /// Program finished with an error object
    #[error("Runtime error: {message}")]
    Runtime { message: String },

    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MonkeyError {
    pub fn parse(errors: &[ParseError]) -> Self {
        Self::Parse {
            count: errors.len(),
            message: format_parse_errors(errors, 1),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }

    /// Whether the error was already shown to the user as program output
    pub fn is_program_failure(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Runtime { .. })
    }
}

/// Report parse errors with ariadne on stderr
pub fn report_parse_errors(filename: &str, source: &str, errors: &[ParseError]) -> Result<()> {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    for error in errors {
        let range: std::ops::Range<usize> = error.span.into();
        Report::build(ReportKind::Error, (filename, range.clone()))
            .with_message("Parse error")
            .with_label(
                Label::new((filename, range))
                    .with_message(&error.message)
                    .with_color(Color::Red),
            )
            .finish()
            .eprint((filename, Source::from(source)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    #[test]
    fn test_parse_error_carries_formatted_list() {
        let (_, errors) = parse_source("let x 5;");
        let err = MonkeyError::parse(&errors);
        assert!(err.is_program_failure());
        assert_eq!(
            err.to_string(),
            "1 parse error(s):\n parse error[1/1]: expected next token to be =, got INT instead"
        );
    }

    #[test]
    fn test_runtime_error_display() {
        let err = MonkeyError::runtime("identifier not found: x");
        assert_eq!(err.to_string(), "Runtime error: identifier not found: x");
    }

    #[test]
    fn test_io_error_is_not_program_failure() {
        let err = MonkeyError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert!(!err.is_program_failure());
        assert_eq!(err.to_string(), "IO error: missing");
    }

    #[test]
    fn test_report_parse_errors_succeeds() {
        let source = "let x 5;";
        let (_, errors) = parse_source(source);
        assert!(report_parse_errors("test.mk", source, &errors).is_ok());
    }
}

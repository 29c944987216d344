use std::fmt;

use miette::{NamedSource, SourceSpan};
use serde::Serialize;
use thiserror::Error;

use crate::version::Version;

/// Result of running one or both validation stages over a source text.
pub type ValidationOutcome = Result<(), ValidationError>;

/// A single validation failure: what went wrong and on which (1-based) line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub line: usize,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Failure category, independent of where it happened.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::AsRefStr, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    MissingVersionDirective,
    UnsupportedVersion,
    MalformedVersionNumber,
    UnbalancedCloseDelimiter,
    UnbalancedOpenDelimiter,
}

// ============= Validation errors (with miette diagnostics) =============

#[derive(Error, Debug, miette::Diagnostic)]
pub enum ValidationError {
    #[error("#vhot version directive not found; declare it at the top of the file")]
    #[diagnostic(
        code(vhot::missing_directive),
        help("start the file with a directive such as `#vhot 12.90`")
    )]
    MissingVersionDirective {
        line: usize,
        #[label("directive expected here")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error(
        "this source uses language features the current VHot compiler does not support; \
         a newer VHot compiler is required (current compiler version: {supported})"
    )]
    #[diagnostic(code(vhot::unsupported_version))]
    UnsupportedVersion {
        line: usize,
        declared: String,
        supported: Version,
        #[label("declared version is newer than this compiler")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("{}", malformed_message(.token))]
    #[diagnostic(code(vhot::malformed_version))]
    MalformedVersionNumber {
        line: usize,
        token: String,
        #[label("not a <major>.<minor> version")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("unexpected closing brace '}}'")]
    #[diagnostic(code(vhot::unexpected_close))]
    UnbalancedCloseDelimiter {
        line: usize,
        #[label("no matching opening brace before this")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("brace counts do not match; check the opening '{{' and closing '}}' braces")]
    #[diagnostic(code(vhot::unclosed_open))]
    UnbalancedOpenDelimiter {
        line: usize,
        depth: usize,
        #[label("this brace is never closed")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },
}

fn malformed_message(token: &str) -> String {
    if token.is_empty() {
        "missing version number in #vhot directive; expected <major>.<minor>".to_string()
    } else {
        format!("malformed version number '{token}' in #vhot directive; expected <major>.<minor>")
    }
}

fn empty_source() -> NamedSource<String> {
    NamedSource::new("input", String::new())
}

impl ValidationError {
    pub fn missing_directive() -> Self {
        Self::MissingVersionDirective {
            line: 1,
            span: SourceSpan::new(0usize.into(), 0),
            src: empty_source(),
        }
    }

    pub fn unsupported_version(
        line: usize,
        declared: impl Into<String>,
        supported: Version,
        offset: usize,
        len: usize,
    ) -> Self {
        Self::UnsupportedVersion {
            line,
            declared: declared.into(),
            supported,
            span: SourceSpan::new(offset.into(), len),
            src: empty_source(),
        }
    }

    pub fn malformed_version(
        line: usize,
        token: impl Into<String>,
        offset: usize,
        len: usize,
    ) -> Self {
        Self::MalformedVersionNumber {
            line,
            token: token.into(),
            span: SourceSpan::new(offset.into(), len),
            src: empty_source(),
        }
    }

    pub fn unexpected_close(line: usize, offset: usize) -> Self {
        Self::UnbalancedCloseDelimiter {
            line,
            span: SourceSpan::new(offset.into(), 1),
            src: empty_source(),
        }
    }

    /// `offset` points at the innermost brace left open.
    pub fn unclosed_open(line: usize, depth: usize, offset: usize) -> Self {
        Self::UnbalancedOpenDelimiter {
            line,
            depth,
            span: SourceSpan::new(offset.into(), 1),
            src: empty_source(),
        }
    }

    /// Attach source code for fancy miette diagnostics
    pub fn with_source_code(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        let name_str = name.into();
        let source_str = source.into();
        match &mut self {
            Self::MissingVersionDirective { src, .. }
            | Self::UnsupportedVersion { src, .. }
            | Self::MalformedVersionNumber { src, .. }
            | Self::UnbalancedCloseDelimiter { src, .. }
            | Self::UnbalancedOpenDelimiter { src, .. } => {
                *src = NamedSource::new(name_str, source_str);
            }
        }
        self
    }

    pub fn line(&self) -> usize {
        match self {
            Self::MissingVersionDirective { line, .. }
            | Self::UnsupportedVersion { line, .. }
            | Self::MalformedVersionNumber { line, .. }
            | Self::UnbalancedCloseDelimiter { line, .. }
            | Self::UnbalancedOpenDelimiter { line, .. } => *line,
        }
    }

    pub fn span(&self) -> SourceSpan {
        match self {
            Self::MissingVersionDirective { span, .. }
            | Self::UnsupportedVersion { span, .. }
            | Self::MalformedVersionNumber { span, .. }
            | Self::UnbalancedCloseDelimiter { span, .. }
            | Self::UnbalancedOpenDelimiter { span, .. } => *span,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingVersionDirective { .. } => ErrorKind::MissingVersionDirective,
            Self::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            Self::MalformedVersionNumber { .. } => ErrorKind::MalformedVersionNumber,
            Self::UnbalancedCloseDelimiter { .. } => ErrorKind::UnbalancedCloseDelimiter,
            Self::UnbalancedOpenDelimiter { .. } => ErrorKind::UnbalancedOpenDelimiter,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Flatten into the plain (message, line) pair handed to reporters.
    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.message(), self.line())
    }
}

// Attached source code is presentation only and does not take part in equality.
impl PartialEq for ValidationError {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
            && self.diagnostic() == other.diagnostic()
            && self.span() == other.span()
    }
}

// ============= Tests =============

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::SUPPORTED_VERSION;
    use strum::IntoEnumIterator;

    #[test]
    fn validation_error_implements_diagnostic() {
        let err = ValidationError::missing_directive();
        let diag: &dyn miette::Diagnostic = &err;
        assert!(diag.code().is_some());
    }

    #[test]
    fn every_variant_reports_its_kind() {
        let errors = [
            ValidationError::missing_directive(),
            ValidationError::unsupported_version(1, "99.0", SUPPORTED_VERSION, 6, 4),
            ValidationError::malformed_version(1, "abc", 6, 3),
            ValidationError::unexpected_close(2, 10),
            ValidationError::unclosed_open(2, 1, 10),
        ];
        let kinds: Vec<ErrorKind> = errors.iter().map(ValidationError::kind).collect();
        assert_eq!(kinds, ErrorKind::iter().collect::<Vec<_>>());
    }

    #[test]
    fn missing_directive_is_on_line_one() {
        let err = ValidationError::missing_directive();
        assert_eq!(err.line(), 1);
        assert!(err.message().contains("#vhot"));
    }

    #[test]
    fn unsupported_version_mentions_supported_version() {
        let err = ValidationError::unsupported_version(3, "99.0", SUPPORTED_VERSION, 6, 4);
        assert_eq!(err.line(), 3);
        assert!(err.message().contains("12.90"), "{}", err.message());
    }

    #[test]
    fn malformed_version_quotes_token() {
        let err = ValidationError::malformed_version(4, "x.y", 6, 3);
        assert!(err.message().contains("'x.y'"));
    }

    #[test]
    fn empty_version_token_reads_as_missing_number() {
        let err = ValidationError::malformed_version(1, "", 5, 0);
        assert_eq!(
            err.message(),
            "missing version number in #vhot directive; expected <major>.<minor>"
        );
        assert_eq!(err.kind(), ErrorKind::MalformedVersionNumber);
    }

    #[test]
    fn diagnostic_display_is_line_prefixed() {
        let diag = ValidationError::unexpected_close(2, 10).diagnostic();
        assert_eq!(diag.line, 2);
        assert_eq!(diag.to_string(), "line 2: unexpected closing brace '}'");
    }

    #[test]
    fn with_source_code_keeps_location() {
        let err = ValidationError::unclosed_open(2, 1, 10)
            .with_source_code("test.vhot", "#vhot 1.0\n{ { }\n");
        assert_eq!(err, ValidationError::unclosed_open(2, 1, 10));
        assert!(matches!(
            err,
            ValidationError::UnbalancedOpenDelimiter { depth: 1, .. }
        ));
    }

    #[test]
    fn errors_at_different_offsets_differ() {
        assert_ne!(
            ValidationError::unexpected_close(1, 0),
            ValidationError::unexpected_close(1, 3)
        );
    }

    #[test]
    fn kind_names_are_snake_case() {
        assert_eq!(
            ErrorKind::UnbalancedCloseDelimiter.as_ref(),
            "unbalanced_close_delimiter"
        );
        assert_eq!(
            serde_json::to_string(&ErrorKind::MissingVersionDirective).unwrap(),
            "\"missing_version_directive\""
        );
    }
}

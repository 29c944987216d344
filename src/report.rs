use std::fmt;

use miette::{GraphicalReportHandler, GraphicalTheme};
use serde::Serialize;

use crate::error::{ErrorKind, ValidationError, ValidationOutcome};
use crate::version::Version;

/// How a validation outcome is shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum OutputFormat {
    /// `[vhot error] line N: message`
    #[default]
    Text,
    /// miette report with the offending source line
    Fancy,
    /// one JSON object on stdout
    Json,
}

/// Which stream a rendered report belongs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum JsonReport {
    Success {
        supported_version: Version,
    },
    Failure {
        kind: ErrorKind,
        line: usize,
        message: String,
    },
}

pub fn success_message(supported: Version) -> String {
    format!("vhot: compiled successfully (language version {supported})")
}

pub fn error_line(err: &ValidationError) -> String {
    format!("[vhot error] {}", err.diagnostic())
}

/// Render a failure as a graphical miette report over `source`.
pub fn fancy(err: ValidationError, name: &str, source: &str) -> Result<String, fmt::Error> {
    let err = err.with_source_code(name, source);
    let mut out = String::new();
    GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
        .render_report(&mut out, &err)?;
    Ok(out)
}

pub fn to_json(outcome: &ValidationOutcome, supported: Version) -> serde_json::Result<String> {
    let report = match outcome {
        Ok(()) => JsonReport::Success {
            supported_version: supported,
        },
        Err(e) => JsonReport::Failure {
            kind: e.kind(),
            line: e.line(),
            message: e.message(),
        },
    };
    serde_json::to_string(&report)
}

/// Render `outcome` for a file called `name`, returning the text and the
/// stream it should be written to.
pub fn render(
    outcome: ValidationOutcome,
    format: OutputFormat,
    supported: Version,
    name: &str,
    source: &str,
) -> anyhow::Result<(Stream, String)> {
    if format == OutputFormat::Json {
        return Ok((Stream::Stdout, to_json(&outcome, supported)?));
    }
    let rendered = match outcome {
        Ok(()) => (Stream::Stdout, success_message(supported)),
        Err(e) if format == OutputFormat::Fancy => (Stream::Stderr, fancy(e, name, source)?),
        Err(e) => (Stream::Stderr, error_line(&e)),
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::validate;
    use crate::version::SUPPORTED_VERSION;

    #[test]
    fn text_success_names_supported_version() {
        let (stream, text) =
            render(Ok(()), OutputFormat::Text, SUPPORTED_VERSION, "a.vhot", "").unwrap();
        assert_eq!(stream, Stream::Stdout);
        assert_eq!(text, "vhot: compiled successfully (language version 12.90)");
    }

    #[test]
    fn text_failure_goes_to_stderr() {
        let source = "#vhot 1.0\n}\n";
        let outcome = validate(source);
        let (stream, text) =
            render(outcome, OutputFormat::Text, SUPPORTED_VERSION, "a.vhot", source).unwrap();
        assert_eq!(stream, Stream::Stderr);
        assert_eq!(text, "[vhot error] line 2: unexpected closing brace '}'");
    }

    #[test]
    fn fancy_failure_shows_code_and_file() {
        let source = "#vhot 99.0\n{}\n";
        let outcome = validate(source);
        let (stream, text) =
            render(outcome, OutputFormat::Fancy, SUPPORTED_VERSION, "new.vhot", source).unwrap();
        assert_eq!(stream, Stream::Stderr);
        assert!(text.contains("vhot::unsupported_version"), "{text}");
        assert!(text.contains("new.vhot"), "{text}");
        assert!(text.contains("#vhot 99.0"), "{text}");
    }

    #[test]
    fn json_success() {
        let json = to_json(&Ok(()), SUPPORTED_VERSION).unwrap();
        assert_eq!(json, r#"{"status":"success","supported_version":"12.90"}"#);
    }

    #[test]
    fn json_failure_carries_kind_and_line() {
        let outcome = validate("#vhot 1.0\n{ { }\n");
        let value: serde_json::Value =
            serde_json::from_str(&to_json(&outcome, SUPPORTED_VERSION).unwrap()).unwrap();
        assert_eq!(value["status"], "failure");
        assert_eq!(value["kind"], "unbalanced_open_delimiter");
        assert_eq!(value["line"], 2);
        assert!(value["message"].as_str().unwrap().contains("brace counts"));
    }

    #[test]
    fn json_always_goes_to_stdout() {
        let outcome = validate("");
        let (stream, _) =
            render(outcome, OutputFormat::Json, SUPPORTED_VERSION, "a.vhot", "").unwrap();
        assert_eq!(stream, Stream::Stdout);
    }

    #[test]
    fn format_names_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("fancy".parse::<OutputFormat>().unwrap(), OutputFormat::Fancy);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}

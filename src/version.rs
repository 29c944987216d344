use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;
use winnow::ascii::digit1;
use winnow::combinator::{alt, eof};
use winnow::prelude::*;
use winnow::stream::{LocatingSlice, Location};
use winnow::token::take_while;

use crate::config::{Config, DirectivePolicy};
use crate::error::{ValidationError, ValidationOutcome};

type Input<'a> = LocatingSlice<&'a str>;

/// Marker that opens a version directive line.
pub const DIRECTIVE_MARKER: &str = "#vhot";

/// Highest language version this compiler understands.
pub const SUPPORTED_VERSION: Version = Version(12.90);

/// A `major.minor` language version, ordered numerically.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Version(f64);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid version '{input}': expected <major>.<minor>, e.g. 12.90")]
pub struct VersionParseError {
    pub input: String,
}

impl Version {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionParseError {
            input: s.to_string(),
        };
        let text = version_number.parse(Input::new(s)).map_err(|_| invalid())?;
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Self(value)),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============= Directive grammar =============

fn version_number<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    (digit1, '.', digit1).take().parse_next(input)
}

/// Leading whitespace, the marker, then whitespace (or end of line).
fn directive_marker<'a>(input: &mut Input<'a>) -> ModalResult<()> {
    (
        take_while(0.., |c: char| c.is_whitespace()),
        DIRECTIVE_MARKER,
        alt((take_while(1.., |c: char| c.is_whitespace()).void(), eof.void())),
    )
        .void()
        .parse_next(input)
}

/// What a single source line says about the version directive. Offsets are
/// relative to the start of the line.
#[derive(Debug, PartialEq)]
enum DirectiveLine<'a> {
    NotDirective,
    Version { token: &'a str, offset: usize },
    Malformed { token: &'a str, offset: usize },
}

fn classify_line(line: &str) -> DirectiveLine<'_> {
    let mut input = Input::new(line);
    if directive_marker.parse_next(&mut input).is_err() {
        return DirectiveLine::NotDirective;
    }
    let offset = input.current_token_start();
    // Only the leading `<digits>.<digits>` counts; the rest of the line is ignored.
    match version_number.parse_next(&mut input) {
        Ok(token) => DirectiveLine::Version { token, offset },
        Err(_) => {
            let token = line[offset..].split_whitespace().next().unwrap_or("");
            DirectiveLine::Malformed { token, offset }
        }
    }
}

/// Find the version directive and check it against the supported version.
///
/// Lines are split on `\n` and numbered from 1. Under
/// [`DirectivePolicy::FirstMatch`] the first directive anywhere in the file is
/// used; under [`DirectivePolicy::FirstLine`] only line 1 is considered.
pub fn check_version(source: &str, config: &Config) -> ValidationOutcome {
    let max_lines = match config.directive_policy {
        DirectivePolicy::FirstMatch => usize::MAX,
        DirectivePolicy::FirstLine => 1,
    };

    let mut line_start = 0;
    for (index, line) in source.split('\n').take(max_lines).enumerate() {
        let line_number = index + 1;
        match classify_line(line) {
            DirectiveLine::NotDirective => {}
            DirectiveLine::Version { token, offset } => {
                let start = line_start + offset;
                let declared: Version = token.parse().map_err(|_| {
                    ValidationError::malformed_version(line_number, token, start, token.len())
                })?;
                if declared > config.supported_version {
                    tracing::debug!(
                        line = line_number,
                        declared = token,
                        supported = %config.supported_version,
                        "declared version is newer than supported"
                    );
                    return Err(ValidationError::unsupported_version(
                        line_number,
                        token,
                        config.supported_version,
                        start,
                        token.len(),
                    ));
                }
                tracing::debug!(line = line_number, declared = token, "version directive accepted");
                return Ok(());
            }
            DirectiveLine::Malformed { token, offset } => {
                return Err(ValidationError::malformed_version(
                    line_number,
                    token,
                    line_start + offset,
                    token.len(),
                ));
            }
        }
        line_start += line.len() + 1;
    }

    Err(ValidationError::missing_directive())
}

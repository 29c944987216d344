use crate::error::{ValidationError, ValidationOutcome};

/// Check that every `{` has a matching `}`.
///
/// Braces are counted wherever they appear, including inside string literals
/// and comments. A `}` with nothing open stops the scan at its line; braces
/// still open at the end are reported at the line of the last character, so a
/// trailing newline does not start a new line.
pub fn check_balance(source: &str) -> ValidationOutcome {
    // Offsets of the currently unmatched `{`; its length is the depth.
    let mut open: Vec<usize> = Vec::new();
    let mut line = 1;

    for (offset, c) in source.char_indices() {
        match c {
            '{' => open.push(offset),
            '}' => {
                if open.pop().is_none() {
                    tracing::debug!(line, offset, "closing brace with nothing open");
                    return Err(ValidationError::unexpected_close(line, offset));
                }
            }
            '\n' => line += 1,
            _ => {}
        }
    }

    match open.last() {
        Some(&innermost) => {
            let last_line = if source.ends_with('\n') { line - 1 } else { line };
            tracing::debug!(line = last_line, depth = open.len(), "braces left open at end of input");
            Err(ValidationError::unclosed_open(last_line, open.len(), innermost))
        }
        None => Ok(()),
    }
}

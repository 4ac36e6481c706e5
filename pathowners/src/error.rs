use std::fmt;

use thiserror::Error;

/// A malformed rule line, tagged with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error on line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line,
            message: message.into(),
        }
    }
}

/// Every syntax error collected across one strict build. A whole rule file
/// is validated in a single pass, so all problems are reported together
/// rather than stopping at the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors(pub Vec<SyntaxError>);

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

/// Errors returned by the strict build entry points.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseErrors),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

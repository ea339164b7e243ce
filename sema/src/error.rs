use thiserror::Error;

/// A fatal semantic error. The first one raised aborts analysis — there is no error recovery,
/// matching the reference implementation's `error_rule` (which calls `exit(1)` on the spot).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Error line {line}: {message} (rule {rule})")]
pub struct SemaError {
    pub line: u32,
    pub rule: &'static str,
    pub message: String,
}

impl SemaError {
    pub fn new(line: u32, rule: &'static str, message: impl Into<String>) -> SemaError {
        SemaError {
            line,
            rule,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SemaError>;

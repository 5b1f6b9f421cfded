use std::error;
use std::fmt;
use std::result;

/// Precondition violations reported by the fallible (`try_*`) operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A binary operation was invoked across two collections ordered by different comparators.
    ComparatorMismatch {
        left: &'static str,
        right: &'static str,
    },
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ComparatorMismatch { left, right } => write!(
                f,
                "collections have different comparison functions (`{}` vs `{}`)",
                left, right
            ),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

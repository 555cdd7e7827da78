//! Error type for the nullable-input bridge (`try_*` methods).

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    /// A required key or value was absent. The payload names the argument.
    InvalidArgument(&'static str),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::InvalidArgument(what) => write!(f, "invalid argument: {what} must be present"),
        }
    }
}

impl std::error::Error for MapError {}

/// Unwraps a nullable argument or reports it as invalid.
pub(crate) fn require<T>(arg: Option<T>, what: &'static str) -> Result<T, MapError> {
    arg.ok_or(MapError::InvalidArgument(what))
}

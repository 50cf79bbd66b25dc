use core::fmt;

/// Represents contract violations reported by the containers in this crate.
///
/// None of these are transient: they point at a caller bug, so nothing in
/// the crate retries after producing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A mutating operation was called on a frozen empty instance
    Unsupported(&'static str),

    /// An index or range boundary fell outside the live elements
    OutOfRange {
        /// The offending index (or range end)
        index: usize,
        /// Number of live elements at the time of the call
        len: usize,
    },

    /// An argument violated the operation's contract
    InvalidArgument(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(op) => write!(f, "unsupported operation on frozen container: {op}"),
            Self::OutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

/// Container result
pub type Result<T> = core::result::Result<T, Error>;

/// Panics with [`Error::Unsupported`] when `frozen` is set.
#[inline]
#[track_caller]
pub(crate) fn ensure_mutable(frozen: bool, op: &'static str) {
    if frozen {
        panic!("{}", Error::Unsupported(op));
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            Error::Unsupported("insert").to_string(),
            "unsupported operation on frozen container: insert"
        );
        assert_eq!(
            Error::OutOfRange { index: 7, len: 3 }.to_string(),
            "index 7 out of range for length 3"
        );
        assert_eq!(
            Error::InvalidArgument("array is empty").to_string(),
            "invalid argument: array is empty"
        );
    }

    #[test]
    #[should_panic(expected = "unsupported operation on frozen container: remove")]
    fn ensure_mutable_panics_when_frozen() {
        ensure_mutable(true, "remove");
    }

    #[test]
    fn ensure_mutable_passes_when_not_frozen() {
        ensure_mutable(false, "remove");
    }
}

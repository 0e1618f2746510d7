use std::collections::TryReserveError;
use std::fmt;

/// Errors reported by the fallible sort entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortError {
    /// The merge buffer for `len` elements could not be allocated.
    ///
    /// The slice still holds every element exactly once, but is only
    /// partially sorted.
    BufferAllocation {
        len: usize,
        source: TryReserveError,
    },

    /// A tuning parameter is outside the range the sorter supports.
    InvalidParams(&'static str),
}

impl fmt::Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortError::BufferAllocation { len, source } => {
                write!(
                    f,
                    "failed to allocate merge buffer for {} elements: {}",
                    len, source
                )
            }
            SortError::InvalidParams(msg) => write!(f, "invalid tuning parameters: {}", msg),
        }
    }
}

impl std::error::Error for SortError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SortError::BufferAllocation { source, .. } => Some(source),
            SortError::InvalidParams(_) => None,
        }
    }
}

use std::collections::TryReserveError;
use std::error;
use std::fmt;
use std::result;

/// An enum representing the errors reported by the trees in this crate.
///
/// Mutations never fail on duplicate or missing keys. The only runtime error is
/// `AllocationFailed`; every other variant describes a broken structural invariant found by
/// `validate`.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Memory for a new node could not be reserved.
    AllocationFailed(TryReserveError),
    /// The heights of the two subtrees of an avl node differ by more than one.
    Unbalanced { balance: i64 },
    /// The height cached in an avl node does not match its subtrees.
    HeightMismatch { stored: usize, computed: usize },
    /// The root of a red black tree is red.
    RedRoot,
    /// A red node has a red child.
    RedViolation,
    /// Two paths below the same node pass through a different number of black nodes.
    BlackHeightMismatch { left: usize, right: usize },
    /// A child does not point back to its parent, or the root has a parent.
    BrokenParentLink,
    /// An in-order traversal yielded keys that are not strictly ascending.
    OutOfOrder,
    /// The number of reachable nodes differs from the recorded length.
    LengthMismatch { expected: usize, actual: usize },
}

impl From<TryReserveError> for Error {
    fn from(err: TryReserveError) -> Error {
        Error::AllocationFailed(err)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::AllocationFailed(error) => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::AllocationFailed(error) => write!(f, "allocation failed: {}", error),
            Error::Unbalanced { balance } => write!(f, "node has balance factor {}", balance),
            Error::HeightMismatch { stored, computed } => write!(
                f,
                "node stores height {} but its subtrees give {}",
                stored, computed,
            ),
            Error::RedRoot => write!(f, "root is red"),
            Error::RedViolation => write!(f, "red node has a red child"),
            Error::BlackHeightMismatch { left, right } => write!(
                f,
                "black heights of subtrees differ ({} != {})",
                left, right,
            ),
            Error::BrokenParentLink => write!(f, "parent link is inconsistent"),
            Error::OutOfOrder => write!(f, "keys are not in ascending order"),
            Error::LengthMismatch { expected, actual } => write!(
                f,
                "expected {} nodes but found {}",
                expected, actual,
            ),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

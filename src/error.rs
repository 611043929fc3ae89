use crate::manager::ManagerId;

/// Error taxonomy for the BDD manager's public operations.
///
/// Every public `Manager` method validates its preconditions before any side effect
/// and fails with the matching variant below rather than panicking. Internal recursion
/// assumes these preconditions already hold; it never produces an error of its own.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// A handle, variable set, or variable map was created by a different manager
    /// than the one the operation was called on.
    #[error("handle belongs to manager {found:?}, but this manager is {expected:?}")]
    ManagerMismatch {
        expected: ManagerId,
        found: ManagerId,
    },

    /// A precondition on a construction parameter or argument was violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The pool would have to grow past the variant's maximum addressable node count.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// A satisfying assignment was queried for a variable that is not recorded in it.
    #[error("lookup miss: variable {0} is not present in this assignment")]
    LookupMiss(u32),
}

pub type Result<T> = std::result::Result<T, Error>;

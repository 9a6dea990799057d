use std::fmt;

// ============================================================================
// Constants
//
// Demo-driver parameters.  The grid keys are inserted leaves-first so the
// resulting tree is a perfect BST over the even keys 2..=30 (with 26-28-30
// left as a short chain); the sequential schedule is the set of keys the
// sequential driver looks up, in order, after inserting 1..=count.
// ============================================================================

pub const DOT_FIRST_FILE_NUMBER: u32 = 1000;
pub const SEQUENTIAL_COUNT: i64 = 1000;
pub const SEQUENTIAL_SCHEDULE: [i64; 8] = [1, 2, 4, 8, 12, 24, 40, 56];
pub const GRID_KEYS: [i64; 15] = [2, 6, 10, 14, 18, 22, 26, 30, 4, 12, 20, 28, 8, 24, 16];
pub const GRID_PROBE_MAX: i64 = 31;
pub const DOT_BGCOLOR: &str = "lightblue";
pub const DOT_NODE_STYLE: &str = "shape=box;color=black;fontcolor=black;style=filled;fillcolor=white";

// ============================================================================
// Error type
// ============================================================================

/// Failure signals of the dictionary operations.
///
/// A failed `find`/`min`/`max` is not an error; those return `None`.
#[derive(Debug)]
pub enum SplayError {
    /// The node arena could not grow.
    AllocationFailure,
    /// `update` or `erase` on a key that is not in the tree.
    NotFound,
    /// A violated precondition, e.g. a non-empty destination for copy/move.
    InvalidArgument(String),
    /// Writing a visualization failed.
    Io(std::io::Error),
}

impl fmt::Display for SplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplayError::AllocationFailure => write!(f, "node allocation failed"),
            SplayError::NotFound => write!(f, "key not found"),
            SplayError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            SplayError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for SplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SplayError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SplayError {
    fn from(e: std::io::Error) -> Self {
        SplayError::Io(e)
    }
}

/// A failed [`SplayTree::update`].  The satellite that could not be stored
/// is handed back to the caller.
///
/// [`SplayTree::update`]: crate::SplayTree::update
#[derive(Debug)]
pub struct UpdateError<S> {
    pub error: SplayError,
    pub sat: S,
}

impl<S> UpdateError<S> {
    pub fn into_sat(self) -> S {
        self.sat
    }
}

impl<S> fmt::Display for UpdateError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "update failed: {}", self.error)
    }
}

impl<S: fmt::Debug> std::error::Error for UpdateError<S> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

// ============================================================================
// Health-check findings
// ============================================================================

/// First invariant violation found by [`SplayTree::health_check`].
///
/// Keys are carried pre-rendered (via `Debug`) so the report does not
/// borrow the tree.
///
/// [`SplayTree::health_check`]: crate::SplayTree::health_check
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    /// Count is zero but the root is present.
    ZeroCountWithRoot,
    /// Count is nonzero but there is no root.
    CountWithoutRoot { count: usize },
    /// Count disagrees with the number of reachable nodes.
    CountMismatch { count: usize, reachable: usize },
    /// The arena holds live nodes that cannot be reached from the root.
    Unreachable { live: usize, reachable: usize },
    /// Following child links revisited a node.
    Cycle,
    /// A key lies outside the interval implied by its ancestors.
    OutOfOrder {
        key: String,
        lower: Option<String>,
        upper: Option<String>,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::ZeroCountWithRoot => {
                write!(f, "Size counter is zero but tree has non-nil root.")
            }
            Violation::CountWithoutRoot { count } => {
                write!(f, "Size counter is {} but tree has nil root.", count)
            }
            Violation::CountMismatch { count, reachable } => write!(
                f,
                "Size counter is {} but tree has {} reachable nodes.",
                count, reachable
            ),
            Violation::Unreachable { live, reachable } => write!(
                f,
                "Arena holds {} live nodes but only {} are reachable.",
                live, reachable
            ),
            Violation::Cycle => write!(f, "Child links do not form a tree (node revisited)."),
            Violation::OutOfOrder { key, lower, upper } => write!(
                f,
                "Node with key {} violates the BST property; should be in range [{}, {}].",
                key,
                lower.as_deref().unwrap_or("-inf"),
                upper.as_deref().unwrap_or("+inf")
            ),
        }
    }
}

impl std::error::Error for Violation {}

// ============================================================================
// Driver errors (command session and demo drivers)
// ============================================================================

#[derive(Debug)]
pub enum DriverError {
    /// A tree operation failed.
    Splay(SplayError),
    /// The tree failed its health check after a command.
    Health(Violation),
    /// A command could not be parsed.
    Syntax(String),
    /// A demo observed a result it did not expect.
    Unexpected(String),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Splay(e) => write!(f, "{}", e),
            DriverError::Health(v) => write!(f, "health check failed: {}", v),
            DriverError::Syntax(msg) => write!(f, "{}", msg),
            DriverError::Unexpected(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::Splay(e) => Some(e),
            DriverError::Health(v) => Some(v),
            _ => None,
        }
    }
}

impl From<SplayError> for DriverError {
    fn from(e: SplayError) -> Self {
        DriverError::Splay(e)
    }
}

impl From<Violation> for DriverError {
    fn from(v: Violation) -> Self {
        DriverError::Health(v)
    }
}

impl From<std::io::Error> for DriverError {
    fn from(e: std::io::Error) -> Self {
        DriverError::Splay(SplayError::Io(e))
    }
}

pub mod types;
pub(crate) mod arena;
pub(crate) mod topdown;
pub mod tree;
pub mod health;
pub mod render;
pub mod session;
pub mod demo;

// Re-exports for convenience
pub use types::{
    DriverError, SplayError, UpdateError, Violation,
    DOT_BGCOLOR, DOT_FIRST_FILE_NUMBER, DOT_NODE_STYLE, GRID_KEYS, GRID_PROBE_MAX,
    SEQUENTIAL_COUNT, SEQUENTIAL_SCHEDULE,
};
pub use tree::SplayTree;
pub use session::{DotNamer, Flow, Session, Tokens, HELP_TEXT};
pub use demo::{grid_single, grid_sweep, sequential, GridMode, Probe, SequentialStep};

//! Shared plumbing for the memory-scramble workspace: error types, logging,
//! and shutdown handling used by both `scramble-board` and `scramble-server`.

mod error;
mod logging;
mod shutdown;

pub use error::FlipReason;
pub use error::GameError;
pub use error::GameResult;
pub use logging::init as init_logging;
pub use shutdown::on_interrupt;

/// A zero-indexed (row, col) position on the board.
pub type Position = (usize, usize);

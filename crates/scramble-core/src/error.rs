use std::fmt;

/// The reason a [`GameError::FlipError`] was raised, matching the two
/// flip-rule violations a board can report at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipReason {
    /// The targeted card was already removed (matched away) from the board.
    Removed,
    /// The targeted card is face-up and controlled by another player.
    Controlled,
}

impl fmt::Display for FlipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlipReason::Removed => write!(f, "removed"),
            FlipReason::Controlled => write!(f, "controlled"),
        }
    }
}

/// The four error kinds a board operation can raise.
///
/// `InvalidInput` and `FlipError` are recoverable and meant to be surfaced
/// to the caller (an HTTP adapter maps them to 400 and 409 respectively).
/// `InvalidState` signals a violated internal precondition — a programmer
/// error, not a player mistake. `ParseError` is fatal at startup.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("flip-error: {0}")]
    FlipError(FlipReason),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("parse error: {0}")]
    ParseError(String),
}

impl GameError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
    pub fn removed() -> Self {
        Self::FlipError(FlipReason::Removed)
    }
    pub fn controlled() -> Self {
        Self::FlipError(FlipReason::Controlled)
    }
}

pub type GameResult<T> = Result<T, GameError>;

use thiserror::Error;

/// Shown to the user whenever a submitted form is rejected.
pub const INVALID_INPUT_MESSAGE: &str = "inputs have to be positive numbers!";

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid workout input: {0}")]
    Validation(#[from] ValidationError),

    #[error("location unavailable: {0}")]
    GeolocationUnavailable(String),

    #[error("no workout with id {0:?}")]
    NotFound(String),

    #[error("workout snapshot is corrupt: {0}")]
    PersistenceCorrupt(#[from] serde_json::Error),

    #[error("workout {0:?} was restored from a snapshot and cannot count clicks")]
    ClickUnsupported(String),

    #[error("no map location selected; click the map first")]
    NoPendingLocation,

    #[error("session was reset; start a new one")]
    SessionClosed,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is not a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("{field} must be a whole number")]
    NotWhole { field: &'static str },
}

use spacefs_lib::ids::EntryId;

use crate::guard::OperationKind;

/// failures surfaced by the engine.
///
/// `OperationInProgress`, `InvalidTarget` and `Validation` raised by the
/// engine itself are produced before any request is sent. the rest come back
/// from the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// network or authorization failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// the target vanished on the store side
    #[error("not found: {0}")]
    NotFound(String),

    /// the store or the engine rejected the request content
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("cannot start while {0} is in progress")]
    OperationInProgress(OperationKind),

    #[error("\"{0}\" is not a folder in the current directory")]
    InvalidTarget(EntryId),
}

pub type Result<T = ()> = std::result::Result<T, Error>;

impl Error {
    /// true for errors raised locally before talking to the store
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::OperationInProgress(_) | Error::InvalidTarget(_))
    }
}

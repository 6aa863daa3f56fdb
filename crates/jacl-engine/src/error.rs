//! Error types for the interpreter.

use std::collections::TryReserveError;

use jacl_core::{CoreError, ObjectId};
use jacl_dsl::LoadError;
use thiserror::Error;

use crate::sink::SinkError;

/// Result type for interpreter operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Conditions that end a game session.
///
/// Script mistakes are not errors at this level: they are reported through
/// the presentation sink and execution carries on.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The player quit or a script ran `terminate`.
    #[error("game over")]
    Quit,

    /// The game declares fewer than the two objects needed to play.
    #[error("the game must declare at least a location and a player")]
    MissingBootObject,

    /// `player` does not name an object.
    #[error("player is set to invalid object {0}")]
    BadPlayer(ObjectId),

    /// An object's parent chain is broken or cyclic.
    #[error("object {0} has an invalid or cyclic parent chain")]
    BadParent(ObjectId),

    /// Too many nested function calls.
    #[error("stack overflow: more than {0} nested calls")]
    StackOverflow(usize),

    /// The object table overflowed while loading.
    #[error("too many objects (limit {0})")]
    TooManyObjects(usize),

    /// The game file had load errors.
    #[error("{0} error(s) while loading the game")]
    Load(usize),

    /// The game file could not be read.
    #[error(transparent)]
    Read(#[from] LoadError),

    /// A buffer could not be allocated.
    #[error("out of memory")]
    OutOfMemory,

    /// The preprocessor failed.
    #[error("preprocessor: {0}")]
    Preprocess(LoadError),

    /// The presentation layer failed.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl From<CoreError> for EngineError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::BadPlayer(id) => Self::BadPlayer(id),
            CoreError::BadParent(id) => Self::BadParent(id),
            CoreError::TooManyObjects(limit) => Self::TooManyObjects(limit),
            CoreError::ObjectOutOfRange(id) => Self::BadParent(id),
            _ => Self::Load(1),
        }
    }
}

impl From<TryReserveError> for EngineError {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

impl EngineError {
    /// Process exit status for this condition.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Quit => 0,
            Self::MissingBootObject => 43,
            Self::BadPlayer(_) | Self::BadParent(_) => 44,
            Self::StackOverflow(_) => 45,
            Self::TooManyObjects(_) => 47,
            Self::Load(_) | Self::Read(_) => 48,
            Self::OutOfMemory => 49,
            Self::Preprocess(_) => 200,
            Self::Sink(_) => 1,
        }
    }
}

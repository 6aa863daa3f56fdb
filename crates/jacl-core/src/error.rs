use crate::object::ObjectId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when manipulating the world model.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An object id outside `1..=objects` was dereferenced.
    #[error("object {0} does not exist")]
    ObjectOutOfRange(ObjectId),

    /// The object table is full.
    #[error("too many objects (limit {0})")]
    TooManyObjects(usize),

    /// An object label was declared twice.
    #[error("object label \"{0}\" is already in use")]
    DuplicateLabel(String),

    /// No attribute bits remain in the user namespace.
    #[error("too many attributes, cannot declare \"{0}\"")]
    AttributeOverflow(String),

    /// Synonym rewrites form a loop.
    #[error("synonyms for \"{0}\" form a cycle")]
    SynonymCycle(String),

    /// A grammar line does not end in an `>action` word.
    #[error("grammar \"{0}\" has no action")]
    GrammarWithoutAction(String),

    /// Two grammar lines share the same words but name different actions.
    #[error("grammar \"{0}\" is already defined")]
    DuplicateGrammar(String),

    /// The player id does not name an object.
    #[error("player is set to invalid object {0}")]
    BadPlayer(ObjectId),

    /// A `parent` chain is broken or cyclic.
    #[error("object {0} has an invalid or cyclic parent chain")]
    BadParent(ObjectId),

    /// A saved game image is shorter than its header promises.
    #[error("saved game is truncated ({0} bytes)")]
    SnapshotTruncated(usize),

    /// A saved game was written by a different game.
    #[error("saved game does not match this game: expected {expected:?}, found {found:?}")]
    SnapshotMismatch {
        /// The `(objects, integers, functions, strings)` counts of the loaded game.
        expected: [i32; 4],
        /// The counts recorded in the saved game.
        found: [i32; 4],
    },
}

use std::path::PathBuf;

/// Alias for `Result<T, LoadError>`.
pub type LoadResult<T> = Result<T, LoadError>;

/// Errors that stop a game file from being read or preprocessed.
///
/// Problems inside the source text are reported as
/// [`Diagnostic`](crate::diagnostics::Diagnostic)s instead.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read or written.
    #[error("cannot access {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying failure.
        source: std::io::Error,
    },

    /// The file was processed by a newer version of the tools.
    #[error("game file was processed by version {found}, this interpreter supports {supported}")]
    NewerVersion {
        /// Version in the `#processed` header.
        found: u32,
        /// Highest version this interpreter reads.
        supported: u32,
    },

    /// An `#include` could not be resolved or is recursive.
    #[error("{0}")]
    Include(String),
}

impl LoadError {
    /// Wrap an I/O failure on `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

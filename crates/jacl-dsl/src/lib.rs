//! Game file handling: lexing, obfuscation, preprocessing and loading.

pub mod crypt;
pub mod diagnostics;
pub mod error;
pub mod language;
pub mod lexer;
pub mod loader;
pub mod preprocess;

pub use diagnostics::{Diagnostic, Severity};
pub use error::{LoadError, LoadResult};
pub use loader::{LoadOutcome, LoaderConfig, load_bytes, load_file, load_source};
pub use preprocess::{PreprocessConfig, preprocess};

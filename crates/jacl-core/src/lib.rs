//! Core types for the JACL runtime: objects, symbol tables, functions, the
//! grammar trie and the world model.
//!
//! This crate knows nothing about source text or script execution. The
//! loader in `jacl-dsl` fills a [`World`]; the interpreter in `jacl-engine`
//! mutates it.

/// System attribute bits and namespaces.
pub mod attribute;
/// Error types used throughout the crate.
pub mod error;
/// Script functions and their compiled bodies.
pub mod function;
/// The grammar trie.
pub mod grammar;
/// Objects, slots and directions.
pub mod object;
/// Containment, scope, light and route queries.
pub mod relations;
/// Saved-game images.
pub mod snapshot;
/// Typed global registries.
pub mod symbols;
/// Lexed words.
pub mod word;
/// The world model that owns objects and tables.
pub mod world;

/// Re-export attribute types.
pub use attribute::Namespace;
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export function types.
pub use function::{Function, FunctionTable, Statement};
/// Re-export grammar types.
pub use grammar::{Grammar, GrammarNode, Pattern};
/// Re-export object types.
pub use object::{NOWHERE, Object, ObjectId};
/// Re-export symbol types.
pub use symbols::SymbolTable;
/// Re-export word types.
pub use word::Word;
/// Re-export the world model.
pub use world::World;

//! The JACL interpreter.
//!
//! Runs a world loaded by `jacl-dsl`: executes script functions, parses the
//! player's commands against the game's grammar and drives the turn loop.
//! Everything the player sees or types goes through a
//! [`PresentationSink`], so the same interpreter serves a terminal, a test
//! harness or any other front end.

/// `if`, `while` and the other condition tests.
mod condition;
/// Interpreter settings.
pub mod config;
/// Error types for the interpreter.
pub mod error;
/// Function bodies and block structure.
mod executor;
/// Call frames and per-command state.
pub mod frame;
/// The interpreter and its turn loop.
pub mod interpreter;
/// Script operators.
mod operators;
/// Command parsing and dispatch.
pub mod parser;
/// Random numbers for scripts.
pub mod random;
/// The presentation boundary.
pub mod sink;
/// Resolving script words to values, text and places.
mod value;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use frame::CommandState;
pub use interpreter::{Interpreter, Pronouns};
pub use random::{RandomSource, SeededRandom};
pub use sink::{Capabilities, HeadlessSink, InputEvent, PresentationSink, SinkError, Style};

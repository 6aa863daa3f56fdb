//! Per-command and per-call state saved across function calls.

use jacl_core::{NOWHERE, ObjectId, SymbolTable, Word};

/// Number of noun slots a command can fill.
pub const NOUN_SLOTS: usize = 4;

/// Constant integer vector holding the current call's arguments.
pub const ARG: &str = "arg";
/// Constant string vector holding the arguments as written.
pub const STRING_ARG: &str = "string_arg";
/// Constant integer vector of `$integer` matches.
pub const INTEGER: &str = "integer";
/// Constant string vector of `$string` matches.
pub const STRING: &str = "$string";
/// Constant string vector of `$word` matches.
pub const WORD: &str = "$word";

/// What the parser resolved for the command being acted on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandState {
    /// The command's words after normalisation.
    pub words: Vec<Word>,
    /// The command as text.
    pub text: String,
    /// Function tried first by the `override` operator.
    pub override_function: String,
    /// Function tried second by the `override` operator.
    pub default_function: String,
    /// The single object in each slot; `nouns[3]` mirrors `arg[0]`.
    pub nouns: [ObjectId; NOUN_SLOTS],
    /// Every object matched in each slot.
    pub lists: [Vec<ObjectId>; NOUN_SLOTS],
}

impl CommandState {
    /// Forget the nouns and lists of a previous match.
    pub fn clear_nouns(&mut self) {
        self.nouns = [NOWHERE; NOUN_SLOTS];
        for list in &mut self.lists {
            list.clear();
        }
    }
}

/// The symbol-table vectors that belong to one command or call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedVectors {
    arg: Vec<i32>,
    integer: Vec<i32>,
    string_arg: Vec<String>,
    string: Vec<String>,
    word: Vec<String>,
}

impl SharedVectors {
    /// Copy the vectors out of `symbols`.
    pub fn capture(symbols: &SymbolTable) -> Self {
        Self {
            arg: symbols.cinteger_vec(ARG).to_vec(),
            integer: symbols.cinteger_vec(INTEGER).to_vec(),
            string_arg: symbols.cstring_vec(STRING_ARG).to_vec(),
            string: symbols.cstring_vec(STRING).to_vec(),
            word: symbols.cstring_vec(WORD).to_vec(),
        }
    }

    /// Put the vectors back into `symbols`.
    pub fn restore(self, symbols: &mut SymbolTable) {
        symbols.replace_cintegers(ARG, self.arg);
        symbols.replace_cintegers(INTEGER, self.integer);
        symbols.replace_cstrings(STRING_ARG, self.string_arg);
        symbols.replace_cstrings(STRING, self.string);
        symbols.replace_cstrings(WORD, self.word);
    }
}

/// Everything a function call or proxied command must leave as it found
/// it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallFrame {
    /// Name of the function that was executing.
    pub function: String,
    /// Its `self` object.
    pub self_object: ObjectId,
    pub command: CommandState,
    pub vectors: SharedVectors,
}

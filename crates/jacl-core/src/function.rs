//! Script functions compiled to statement lists at load time.

use std::rc::Rc;

use indexmap::IndexMap;
use log::warn;
use serde::Serialize;

use crate::object::{NOWHERE, ObjectId};
use crate::word::Word;

/// One line of a function body, already split into words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Source line number (1-based).
    pub line: usize,
    /// The line as it appeared in the source, trimmed.
    pub raw: String,
    /// The lexed words; the first is the operator.
    pub words: Vec<Word>,
    /// Text lines of a `print` block, up to (not including) the closing `.`.
    pub print: Option<Vec<String>>,
}

impl Statement {
    /// The operator word, if the line has one.
    pub fn operator(&self) -> Option<&str> {
        self.words.first().map(|w| w.text.as_str())
    }
}

/// A named script routine.
#[derive(Debug, Clone, Serialize)]
pub struct Function {
    /// Full name (`+take`, `examine_lamp`, ...).
    pub name: String,
    /// The implicit `self` object for `_label`-suffixed functions.
    pub self_object: ObjectId,
    /// How many times the function has been entered.
    pub call_count: i32,
    #[serde(skip)]
    pub call_count_backup: i32,
    /// Declared `static`: excluded from save, restore and undo.
    pub nosave: bool,
    /// Source line of the `{` header.
    pub line: usize,
    #[serde(skip)]
    pub body: Rc<[Statement]>,
}

impl Function {
    /// Create a function with an empty body.
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            self_object: NOWHERE,
            call_count: 0,
            call_count_backup: 0,
            nosave: false,
            line,
            body: Rc::from(Vec::new()),
        }
    }
}

/// Strip a `<arg<arg` tail from a call expression, leaving the function name.
pub fn function_name(call: &str) -> &str {
    call.split('<').next().unwrap_or(call)
}

/// All functions, in declaration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FunctionTable {
    functions: IndexMap<String, Function>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function. A second definition of the same name is ignored
    /// and `false` is returned.
    pub fn insert(&mut self, function: Function) -> bool {
        if self.functions.contains_key(&function.name) {
            warn!(
                "function {} redefined on line {}, keeping the first definition",
                function.name, function.line
            );
            return false;
        }
        self.functions.insert(function.name.clone(), function);
        true
    }

    /// Look up a function by name; a trailing `<args` part is ignored.
    pub fn resolve(&self, call: &str) -> Option<&Function> {
        self.functions.get(function_name(call))
    }

    pub fn resolve_mut(&mut self, call: &str) -> Option<&mut Function> {
        self.functions.get_mut(function_name(call))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(function_name(name))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Function> {
        self.functions.values_mut()
    }

    /// Names of all functions, for "did you mean" suggestions.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

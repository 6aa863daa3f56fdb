//! Two-pass loader: game source text to a [`World`].
//!
//! The first pass declares every name (objects, variables, constants,
//! attributes, grammar, synonyms) so that the second pass can refer to any of
//! them regardless of order. The second pass fills in object properties,
//! integer initial values and function bodies.
//!
//! Problems are collected as [`Diagnostic`]s rather than returned early, so a
//! single run reports every bad line.

use std::path::Path;
use std::rc::Rc;

use jacl_core::CoreError;
use jacl_core::attribute::{LOCATION_ATTRIBUTES, OBJECT_ATTRIBUTES};
use jacl_core::function::{Function, Statement};
use jacl_core::object::{
    self, DIRECTIONS, HEAVY, NOWHERE, Object, ObjectId, SCENERY, SLOT_COUNT, SLOT_NAMES,
};
use jacl_core::symbols::Parameter;
use jacl_core::word::Word;
use jacl_core::world::{DEFAULT_MAX_OBJECTS, World};
use log::{debug, info};

use crate::crypt;
use crate::diagnostics::{Diagnostic, render_diagnostics};
use crate::error::{LoadError, LoadResult};
use crate::language::DEFAULT_MESSAGES;
use crate::lexer::lex_line;

/// Major version reported through the `jacl_version` constant.
pub const JACL_VERSION: i32 = 2;
/// Release number reported through `jacl_release`.
pub const JACL_RELEASE: i32 = 9;
/// Build number reported through `jacl_build`.
pub const JACL_BUILD: i32 = 0;
/// Highest `#processed:<version>` header this loader accepts.
pub const PROCESSED_VERSION: u32 = 2;

/// Largest element count accepted by `integer_array` and `string_array`.
pub const MAX_ARRAY_LENGTH: usize = 65535;

/// Default bound for parameters declared without one.
const PARAMETER_BOUND: i32 = 65535;
const VOLUME_CHANNELS: usize = 8;
const FIELD_CELLS: usize = 20;

/// Names that can never be declared.
const RESERVED: &[&str] = &[
    "here", "player", "integer", "arg", "string_arg", "$word", "self", "this", "noun1", "noun2",
    "noun3", "noun4", "objects",
];

/// Keywords valid on an object property line, for suggestions.
const PROPERTY_KEYWORDS: &[&str] = &["has", "short", "definite", "long", "plural", "static", "player"];

/// Settings for a load.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Object table capacity.
    pub max_objects: usize,
    /// Highest preprocessed-file version accepted.
    pub interpreter_version: u32,
    /// Whether the presentation layer can show images.
    pub graphics_supported: bool,
    /// Whether the presentation layer can play sound.
    pub sound_supported: bool,
    /// Whether the presentation layer delivers timer events.
    pub timer_supported: bool,
    /// Title used when the game declares none.
    pub game_title: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_objects: DEFAULT_MAX_OBJECTS,
            interpreter_version: PROCESSED_VERSION,
            graphics_supported: false,
            sound_supported: false,
            timer_supported: false,
            game_title: "JACL Adventure".to_string(),
        }
    }
}

impl LoaderConfig {
    pub fn with_max_objects(mut self, max_objects: usize) -> Self {
        self.max_objects = max_objects;
        self
    }

    pub fn with_game_title(mut self, title: impl Into<String>) -> Self {
        self.game_title = title.into();
        self
    }

    /// Record which presentation features are available.
    pub fn with_capabilities(mut self, graphics: bool, sound: bool, timer: bool) -> Self {
        self.graphics_supported = graphics;
        self.sound_supported = sound;
        self.timer_supported = timer;
        self
    }
}

/// Result of loading a game (the world may be partial if errors occurred).
#[derive(Debug)]
pub struct LoadOutcome {
    pub world: World,
    /// Errors and warnings produced while loading.
    pub diagnostics: Vec<Diagnostic>,
    /// Decoded source text, for rendering diagnostics.
    pub source: String,
    /// Set when the object table overflowed; loading stopped at that line.
    pub too_many_objects: bool,
}

impl LoadOutcome {
    /// Returns `true` if any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.too_many_objects || self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Render every diagnostic against the decoded source.
    pub fn render(&self, filename: &str) -> String {
        render_diagnostics(&self.source, filename, &self.diagnostics)
    }
}

/// Load a game file from disk.
pub fn load_file(path: &Path, config: &LoaderConfig) -> LoadResult<LoadOutcome> {
    let bytes = std::fs::read(path).map_err(|e| LoadError::io(path, e))?;
    load_bytes(&bytes, config)
}

/// Load game source held in memory.
pub fn load_source(source: &str, config: &LoaderConfig) -> LoadResult<LoadOutcome> {
    load_bytes(source.as_bytes(), config)
}

/// Load raw game file bytes, which may contain obfuscated lines.
pub fn load_bytes(bytes: &[u8], config: &LoaderConfig) -> LoadResult<LoadOutcome> {
    let lines = crypt::decode_lines(bytes);
    for (_, text) in &lines {
        if let Some(found) = crypt::processed_version(text)
            && found > config.interpreter_version
        {
            return Err(LoadError::NewerVersion {
                found,
                supported: config.interpreter_version,
            });
        }
    }

    let mut loader = Loader::new(&lines, config);
    loader.create_system_symbols();
    loader.first_pass();
    if !loader.too_many_objects {
        loader.create_defaults();
        loader.second_pass();
    }
    Ok(loader.finish())
}

// ---------------------------------------------------------------------------
// Label checks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelKind {
    Object,
    Integer,
    Constant,
    String,
    ConstantString,
    Attribute,
}

impl LabelKind {
    /// The namespace name reported by `SymbolTable::namespace_of` for this
    /// kind.
    fn namespace(self) -> Option<&'static str> {
        match self {
            Self::Object => None,
            Self::Integer => Some("integer"),
            Self::Constant => Some("constant"),
            Self::String => Some("string"),
            Self::ConstantString => Some("constant string"),
            Self::Attribute => Some("attribute"),
        }
    }
}

fn is_numeric(word: &str) -> bool {
    word.parse::<i64>().is_ok()
}

/// Function body ranges are found by skipping to the closing `}`; a `}` that
/// appears inside a `print` block is text, not the end of the body.
fn body_end(lines: &[(usize, String)], start: usize) -> Option<usize> {
    let mut in_print = false;
    for (index, (_, text)) in lines.iter().enumerate().skip(start) {
        let trimmed = text.trim();
        if in_print {
            if trimmed.starts_with('.') {
                in_print = false;
            }
            continue;
        }
        if trimmed.starts_with('}') {
            return Some(index);
        }
        if first_word_is(trimmed, "print") {
            in_print = true;
        }
    }
    None
}

fn first_word_is(line: &str, keyword: &str) -> bool {
    line.split([' ', '\t', ':'])
        .next()
        .is_some_and(|w| w == keyword)
}

fn is_skipped(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.starts_with('#')
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

struct Loader<'a> {
    lines: &'a [(usize, String)],
    offsets: Vec<usize>,
    config: &'a LoaderConfig,
    world: World,
    diagnostics: Vec<Diagnostic>,
    too_many_objects: bool,
    /// Object whose properties the current pass-2 line describes.
    current_object: ObjectId,
    /// Most recently declared location, the default parent of objects.
    current_location: ObjectId,
    /// Next integer cell to initialise, per integer name.
    integer_cursor: std::collections::HashMap<String, usize>,
}

impl<'a> Loader<'a> {
    fn new(lines: &'a [(usize, String)], config: &'a LoaderConfig) -> Self {
        let mut offsets = Vec::with_capacity(lines.len());
        let mut offset = 0;
        for (_, text) in lines {
            offsets.push(offset);
            offset += text.len() + 1;
        }
        Self {
            lines,
            offsets,
            config,
            world: World::new(config.max_objects),
            diagnostics: Vec::new(),
            too_many_objects: false,
            current_object: NOWHERE,
            current_location: NOWHERE,
            integer_cursor: std::collections::HashMap::new(),
        }
    }

    fn finish(self) -> LoadOutcome {
        let source = self
            .lines
            .iter()
            .map(|(_, t)| t.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        info!(
            "loaded {} objects, {} functions, {} integer cells, {} string cells",
            self.world.object_count(),
            self.world.functions.len(),
            self.world.symbols.integer_cell_count(),
            self.world.symbols.string_cell_count()
        );
        LoadOutcome {
            world: self.world,
            diagnostics: self.diagnostics,
            source,
            too_many_objects: self.too_many_objects,
        }
    }

    fn span_of(&self, index: usize) -> (std::ops::Range<usize>, usize) {
        let (number, text) = &self.lines[index];
        let start = self.offsets[index];
        (start..start + text.len(), *number)
    }

    fn error(&mut self, index: usize, message: impl Into<String>) {
        let (span, line) = self.span_of(index);
        self.diagnostics.push(Diagnostic::error(span, line, message));
    }

    fn warning(&mut self, index: usize, message: impl Into<String>) {
        let (span, line) = self.span_of(index);
        self.diagnostics.push(Diagnostic::warning(span, line, message));
    }

    /// Report an error with a "did you mean" hint drawn from `candidates`.
    fn suggest(&mut self, index: usize, message: String, input: &str, candidates: Vec<String>) {
        let (span, line) = self.span_of(index);
        self.diagnostics.push(
            Diagnostic::error(span, line, message)
                .with_suggestion(input, candidates.iter().map(String::as_str)),
        );
    }

    // -- System symbols --

    fn create_system_symbols(&mut self) {
        let symbols = &mut self.world.symbols;
        for (name, value) in [
            ("compass", 0),
            ("total_moves", -1),
            ("time", 1),
            ("score", 0),
            ("display_mode", 0),
            ("internal_version", JACL_VERSION * 100 + JACL_RELEASE),
            ("max_rand", 100),
            ("destination", 0),
            ("interrupted", 0),
            ("debug", 0),
            ("graphics_enabled", i32::from(self.config.graphics_supported)),
            ("sound_enabled", i32::from(self.config.sound_supported)),
            ("timer_enabled", i32::from(self.config.timer_supported)),
            ("multi_prefix", 0),
            ("notify", 1),
            ("linebreaks", 1),
        ] {
            symbols.add_integer(name, value);
        }

        for (name, value) in [
            ("graphics_supported", i32::from(self.config.graphics_supported)),
            ("sound_supported", i32::from(self.config.sound_supported)),
            ("timer_supported", i32::from(self.config.timer_supported)),
            ("jacl_version", JACL_VERSION),
            ("jacl_release", JACL_RELEASE),
            ("jacl_build", JACL_BUILD),
            ("interpreter", 0),
            ("true", 1),
            ("false", 0),
            ("null", 0),
            ("nowhere", 0),
            ("heavy", HEAVY),
            ("scenery", SCENERY),
        ] {
            symbols.add_cinteger(name, value);
        }
        for (index, name) in DIRECTIONS.iter().enumerate() {
            symbols.add_cinteger(name, index as i32);
        }
        for (name, index) in SLOT_NAMES {
            symbols.add_cinteger(name, index as i32);
        }
        for _ in 0..VOLUME_CHANNELS {
            symbols.add_cinteger("volume", 100);
        }
        symbols.add_cinteger("timer", 0);
        symbols.add_cinteger("field_count", 0);

        symbols.add_string("return_value", "");
        symbols.add_cstring("function_name", "");
        for _ in 0..FIELD_CELLS {
            symbols.add_cstring("field", "");
        }
    }

    /// Symbols a game may declare itself; created only when absent.
    fn create_defaults(&mut self) {
        let symbols = &mut self.world.symbols;
        if !symbols.has_integer("status_window") {
            symbols.add_integer("status_window", 1);
        }
        if !symbols.has_string("command_prompt") {
            symbols.add_string("command_prompt", "^> ");
        }
        if !symbols.has_cstring("game_title") {
            symbols.add_cstring("game_title", &self.config.game_title);
        }
        for (name, text) in DEFAULT_MESSAGES {
            if !symbols.has_cstring(name) {
                symbols.add_cstring(name, text);
            }
        }
    }

    /// Report an illegal or colliding label. Returns `true` when the label
    /// may be declared.
    fn check_label(&mut self, index: usize, label: &str, kind: LabelKind) -> bool {
        if RESERVED.contains(&label) {
            self.error(index, format!("\"{label}\" is a reserved word and cannot be declared"));
            return false;
        }
        if is_numeric(label) {
            self.error(index, format!("\"{label}\" is a number and cannot be used as a name"));
            return false;
        }
        if kind == LabelKind::ConstantString && label == "command_prompt" {
            self.error(index, "\"command_prompt\" must be declared as a string, not a constant");
            return false;
        }
        if self.world.find_label(label).is_some() {
            self.error(index, format!("\"{label}\" is already declared as an object"));
            return false;
        }
        if let Some(existing) = self.world.symbols.namespace_of(label)
            && (kind == LabelKind::Attribute || kind.namespace() != Some(existing))
        {
            self.error(index, format!("\"{label}\" is already declared as {existing}"));
            return false;
        }
        true
    }

    /// Resolve a value word at load time: a number, a variable or constant,
    /// an attribute or an object label.
    fn load_value(&self, word: &str) -> Option<i32> {
        if word == "here" {
            return Some(self.current_location);
        }
        if let Ok(value) = word.parse::<i32>() {
            return Some(value);
        }
        let symbols = &self.world.symbols;
        if let Some(cell) = symbols.integer_resolve(word, 0) {
            return Some(cell.value);
        }
        if let Some(value) = symbols.cinteger_resolve(word, 0) {
            return Some(value);
        }
        if let Some((_, mask)) = symbols.attribute_resolve(word) {
            return i32::try_from(mask).ok();
        }
        self.world.find_label(word)
    }

    fn value_or_report(&mut self, index: usize, word: &str) -> i32 {
        match self.load_value(word) {
            Some(value) => value,
            None => {
                let candidates = self
                    .world
                    .symbols
                    .all_names()
                    .map(str::to_string)
                    .chain(self.world.objects().map(|(_, o)| o.label.clone()))
                    .collect();
                self.suggest(index, format!("unknown value \"{word}\""), word, candidates);
                0
            }
        }
    }

    fn count_or_report(&mut self, index: usize, word: Option<&Word>) -> usize {
        let Some(word) = word else {
            self.error(index, "missing array size");
            return 0;
        };
        let value = self.value_or_report(index, &word.text);
        match usize::try_from(value) {
            Ok(count) if count > MAX_ARRAY_LENGTH => {
                self.error(index, format!("array size {count} exceeds the limit of {MAX_ARRAY_LENGTH}"));
                0
            }
            Ok(count) if count > 0 => count,
            _ => {
                self.error(index, format!("array size must be positive, found {value}"));
                0
            }
        }
    }

    // -----------------------------------------------------------------------
    // Pass 1: declarations
    // -----------------------------------------------------------------------

    fn first_pass(&mut self) {
        let mut index = 0;
        while index < self.lines.len() {
            let trimmed = self.lines[index].1.trim();
            if is_skipped(trimmed) {
                index += 1;
                continue;
            }
            if trimmed.starts_with('{') {
                index = body_end(self.lines, index + 1).map_or(self.lines.len(), |end| end + 1);
                continue;
            }
            let words = lex_line(trimmed);
            self.declare(index, &words);
            if self.too_many_objects {
                return;
            }
            index += 1;
        }

        if let Err(CoreError::SynonymCycle(word)) = self.world.symbols.canonicalise_synonyms() {
            self.diagnostics.push(Diagnostic::error(
                0..0,
                0,
                format!("synonyms for \"{word}\" form a cycle"),
            ));
        }
    }

    fn declare(&mut self, index: usize, words: &[Word]) {
        let Some(keyword) = words.first() else {
            return;
        };
        let arg = |n: usize| words.get(n).map(|w| w.text.as_str());

        match keyword.text.as_str() {
            "grammar" => {
                let path: Vec<String> = words[1..].iter().map(|w| w.text.clone()).collect();
                if let Err(e) = self.world.grammar.add(&path) {
                    self.error(index, e.to_string());
                }
            }
            kind @ ("object" | "location") => {
                let Some(label) = arg(1) else {
                    self.error(index, format!("{kind} has no label"));
                    return;
                };
                if !self.check_label(index, label, LabelKind::Object) {
                    return;
                }
                let object = if kind == "location" {
                    Object::location(label)
                } else {
                    Object::new(label)
                };
                match self.world.add_object(object) {
                    Ok(_) => {}
                    Err(CoreError::TooManyObjects(max)) => {
                        self.error(index, format!("too many objects, the limit is {max}"));
                        self.too_many_objects = true;
                    }
                    Err(e) => {
                        self.error(index, e.to_string());
                    }
                }
            }
            "synonym" => match (arg(1), arg(2)) {
                (Some(original), Some(standard)) => self
                    .world
                    .symbols
                    .add_synonym(&original.to_lowercase(), &standard.to_lowercase()),
                _ => {
                    self.error(index, "synonym needs a word and its replacement");
                }
            },
            "filter" => match arg(1) {
                Some(word) => self.world.symbols.add_filter(&word.to_lowercase()),
                None => {
                    self.error(index, "filter needs a word");
                }
            },
            "parameter" => match (arg(1), arg(2)) {
                (Some(name), Some(container)) => {
                    let bound = |n: usize, default: i32| {
                        arg(n).and_then(|w| w.parse().ok()).unwrap_or(default)
                    };
                    self.world.symbols.add_parameter(Parameter {
                        name: name.to_string(),
                        container: container.to_string(),
                        low: bound(3, -PARAMETER_BOUND),
                        high: bound(4, PARAMETER_BOUND),
                    });
                }
                _ => {
                    self.error(index, "parameter needs a name and a container");
                }
            },
            "constant" => self.declare_constant(index, words),
            "attribute" => {
                for word in &words[1..] {
                    if !self.check_label(index, &word.text, LabelKind::Attribute) {
                        continue;
                    }
                    if let Err(e) = self.world.symbols.declare_attribute(&word.text) {
                        self.error(index, e.to_string());
                    }
                }
            }
            "string" => {
                let Some(name) = arg(1) else {
                    self.error(index, "string has no name");
                    return;
                };
                if !self.check_label(index, name, LabelKind::String) {
                    return;
                }
                if words.len() < 3 {
                    self.world.symbols.add_string(name, "");
                }
                for value in &words[2..] {
                    self.world.symbols.add_string(name, &value.text);
                }
            }
            "string_array" => {
                let Some(name) = arg(1) else {
                    self.error(index, "string_array has no name");
                    return;
                };
                if !self.check_label(index, name, LabelKind::String) {
                    return;
                }
                let count = self.count_or_report(index, words.get(2));
                let default = arg(3).unwrap_or("");
                for _ in 0..count {
                    self.world.symbols.add_string(name, default);
                }
            }
            "integer_array" => {
                let Some(name) = arg(1) else {
                    self.error(index, "integer_array has no name");
                    return;
                };
                if !self.check_label(index, name, LabelKind::Integer) {
                    return;
                }
                let count = self.count_or_report(index, words.get(2));
                let default = match arg(3) {
                    Some(word) => self.value_or_report(index, word),
                    None => 0,
                };
                for _ in 0..count {
                    self.world.symbols.add_integer(name, default);
                }
            }
            "integer" => {
                let Some(name) = arg(1) else {
                    self.error(index, "integer has no name");
                    return;
                };
                if !self.check_label(index, name, LabelKind::Integer) {
                    return;
                }
                // Values are assigned in the second pass, once every name
                // they may refer to exists.
                for _ in 0..words.len().saturating_sub(2).max(1) {
                    self.world.symbols.add_integer(name, 0);
                }
            }
            _ => {}
        }
    }

    fn declare_constant(&mut self, index: usize, words: &[Word]) {
        let Some(name) = words.get(1).map(|w| w.text.as_str()) else {
            self.error(index, "constant has no name");
            return;
        };
        if words.len() < 3 {
            self.error(index, format!("constant \"{name}\" has no value"));
            return;
        }
        for value in &words[2..] {
            match value.text.parse::<i32>() {
                Ok(number) if !value.quoted => {
                    if self.check_label(index, name, LabelKind::Constant) {
                        self.world.symbols.add_cinteger(name, number);
                    }
                }
                _ => {
                    if self.check_label(index, name, LabelKind::ConstantString) {
                        self.world.symbols.add_cstring(name, &value.text);
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Pass 2: properties, values and functions
    // -----------------------------------------------------------------------

    fn second_pass(&mut self) {
        let mut index = 0;
        while index < self.lines.len() {
            let trimmed = self.lines[index].1.trim();
            if is_skipped(trimmed) {
                index += 1;
                continue;
            }
            if trimmed.starts_with('{') {
                index = self.define_functions(index);
                continue;
            }
            let words = lex_line(trimmed);
            self.describe(index, &words);
            index += 1;
        }

        let count = self.world.object_count();
        self.world.symbols.add_cinteger("objects", count);
    }

    /// Compile the body starting after line `index` and register it under
    /// every name on the header. Returns the index of the next line to read.
    fn define_functions(&mut self, index: usize) -> usize {
        let header = lex_line(self.lines[index].1.trim());
        let end = body_end(self.lines, index + 1);
        if end.is_none() {
            self.error(index, "function body is never closed with '}'");
        }
        let end = end.unwrap_or(self.lines.len());
        let body: Rc<[Statement]> = self.compile_body(index + 1, end).into();

        let mut names: Vec<String> = header.iter().map(|w| w.text.clone()).collect();
        if let Some(first) = names.first_mut() {
            *first = first.trim_start_matches('{').to_string();
        }
        if names.first().is_none_or(String::is_empty) {
            self.error(index, "function has no name");
            return end + 1;
        }

        let line = self.lines[index].0;
        let mut nosave = false;
        for name in names {
            let (full_name, self_object) = if name == "static" {
                nosave = true;
                continue;
            } else if name.starts_with('+') {
                (name, NOWHERE)
            } else if let Some(explicit) = name.strip_prefix('*') {
                let owner = explicit
                    .rsplit_once('_')
                    .and_then(|(_, label)| self.world.find_label(label))
                    .unwrap_or(NOWHERE);
                (explicit.to_string(), owner)
            } else if self.current_object == NOWHERE {
                self.error(
                    index,
                    format!("function \"{name}\" is not global and no object has been declared"),
                );
                continue;
            } else {
                let label = self.world.label_of(self.current_object);
                (format!("{name}_{label}"), self.current_object)
            };

            let mut function = Function::new(full_name.clone(), line);
            function.self_object = self_object;
            function.nosave = nosave;
            function.body = Rc::clone(&body);
            if !self.world.functions.insert(function) {
                self.warning(
                    index,
                    format!("function \"{full_name}\" is already defined; this definition is ignored"),
                );
            }
        }
        end + 1
    }

    fn compile_body(&self, start: usize, end: usize) -> Vec<Statement> {
        let mut statements = Vec::new();
        let mut index = start;
        while index < end {
            let (line, text) = &self.lines[index];
            let trimmed = text.trim();
            index += 1;
            if is_skipped(trimmed) {
                continue;
            }
            let words = lex_line(trimmed);
            let print = if first_word_is(trimmed, "print") {
                let mut block = Vec::new();
                while index < end {
                    let text = self.lines[index].1.trim_end();
                    index += 1;
                    if text.trim_start().starts_with('.') {
                        break;
                    }
                    block.push(text.to_string());
                }
                Some(block)
            } else {
                None
            };
            statements.push(Statement {
                line: *line,
                raw: trimmed.to_string(),
                words,
                print,
            });
        }
        statements
    }

    fn describe(&mut self, index: usize, words: &[Word]) {
        let Some(keyword) = words.first() else {
            return;
        };
        let keyword = keyword.text.as_str();

        match keyword {
            "constant" | "string" | "string_array" | "attribute" | "parameter" | "synonym"
            | "grammar" | "filter" => {}
            "integer" => self.assign_integers(index, words),
            "integer_array" => {
                // Already initialised; keep the cursor in step for later
                // `integer` lines with the same name.
                if let Some(name) = words.get(1) {
                    let count = words
                        .get(2)
                        .and_then(|w| self.load_value(&w.text))
                        .and_then(|v| usize::try_from(v).ok())
                        .filter(|count| *count <= MAX_ARRAY_LENGTH)
                        .unwrap_or(0);
                    *self.integer_cursor.entry(name.text.clone()).or_default() += count;
                }
            }
            "object" | "location" => self.begin_object(keyword == "location", words),
            _ if self.current_object == NOWHERE => {
                self.error(index, format!("\"{keyword}\" appears before any object or location"));
            }
            _ => self.object_property(index, words),
        }
    }

    fn assign_integers(&mut self, index: usize, words: &[Word]) {
        let Some(name) = words.get(1).map(|w| w.text.clone()) else {
            return;
        };
        let mut values = Vec::with_capacity(words.len().saturating_sub(2));
        for word in &words[2..] {
            values.push(self.value_or_report(index, &word.text));
        }
        let cursor = self.integer_cursor.entry(name.clone()).or_default();
        let start = *cursor;
        *cursor += values.len().max(1);

        for (offset, value) in values.into_iter().enumerate() {
            if let Some(cell) = self.world.symbols.integer_resolve_mut(&name, start + offset) {
                cell.value = value;
                cell.backup = value;
            }
        }
    }

    fn begin_object(&mut self, is_location: bool, words: &[Word]) {
        let Some(id) = words.get(1).and_then(|w| self.world.find_label(&w.text)) else {
            // Rejected in the first pass; later property lines belong to no
            // object.
            self.current_object = NOWHERE;
            return;
        };
        // A label reused by a rejected duplicate declaration still resolves
        // to the first object; only the first declaration is described.
        if id <= self.current_object {
            self.current_object = NOWHERE;
            return;
        }
        self.current_object = id;
        if is_location {
            self.current_location = id;
        }
        let parent = self.current_location;
        let names: Vec<String> = if words.len() > 2 {
            words[2..].iter().map(|w| w.text.to_lowercase()).collect()
        } else {
            vec![words[1].text.to_lowercase()]
        };

        if let Some(obj) = self.world.get_mut(id) {
            obj.names = names;
            if is_location {
                obj.slots[object::slot::PARENT] = NOWHERE;
            } else {
                obj.slots[object::slot::PARENT] = parent;
                obj.slots[object::slot::MASS] = SCENERY;
            }
        }
    }

    fn object_property(&mut self, index: usize, words: &[Word]) {
        let id = self.current_object;
        let keyword = words[0].text.as_str();
        let arg = |n: usize| words.get(n).map(|w| w.text.as_str());

        match keyword {
            "has" => {
                for word in &words[1..] {
                    match self.world.symbols.attribute_resolve(&word.text) {
                        Some((namespace, mask)) => {
                            if let Some(obj) = self.world.get_mut(id) {
                                obj.set_attribute(namespace, mask, true);
                            }
                        }
                        None => {
                            let candidates = OBJECT_ATTRIBUTES
                                .iter()
                                .chain(LOCATION_ATTRIBUTES.iter())
                                .map(|s| s.to_string())
                                .chain(
                                    self.world
                                        .symbols
                                        .user_attribute_names(u32::MAX)
                                        .into_iter()
                                        .map(str::to_string),
                                )
                                .collect();
                            self.suggest(
                                index,
                                format!("unknown attribute \"{}\"", word.text),
                                &word.text,
                                candidates,
                            );
                        }
                    }
                }
            }
            "plural" => {
                let plurals: Vec<String> = words[1..].iter().map(|w| w.text.to_lowercase()).collect();
                if let Some(obj) = self.world.get_mut(id) {
                    obj.plurals.extend(plurals);
                }
            }
            "static" => {
                if let Some(obj) = self.world.get_mut(id) {
                    obj.nosave = true;
                }
            }
            "player" => self.world.player = id,
            "short" => match (arg(1), arg(2)) {
                (Some(article), Some(_)) => {
                    let inventory = jacl_core::word::join_words(&words[2..]);
                    if let Some(obj) = self.world.get_mut(id) {
                        obj.article = article.to_string();
                        obj.inventory = inventory;
                    }
                }
                _ => {
                    self.error(index, "short needs an article and a name");
                }
            },
            "definite" | "long" => match arg(1) {
                Some(text) => {
                    let text = text.to_string();
                    if let Some(obj) = self.world.get_mut(id) {
                        if keyword == "definite" {
                            obj.definite = text;
                        } else {
                            obj.described = text;
                        }
                    }
                }
                None => {
                    self.error(index, format!("{keyword} needs a value"));
                }
            },
            _ => self.set_slot(index, keyword, arg(1)),
        }
    }

    fn set_slot(&mut self, index: usize, keyword: &str, value: Option<&str>) {
        let slot = self
            .world
            .symbols
            .cinteger_resolve(keyword, 0)
            .and_then(|s| usize::try_from(s).ok())
            .filter(|s| *s < SLOT_COUNT);
        let Some(slot) = slot else {
            let candidates = PROPERTY_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .chain(SLOT_NAMES.iter().map(|(n, _)| n.to_string()))
                .chain(DIRECTIONS.iter().map(|d| d.to_string()))
                .collect();
            self.suggest(index, format!("unknown keyword \"{keyword}\""), keyword, candidates);
            return;
        };
        let Some(word) = value else {
            self.error(index, format!("\"{keyword}\" needs a value"));
            return;
        };
        let value = self.value_or_report(index, word);
        let id = self.current_object;
        debug!("{}.{keyword} = {value}", self.world.label_of(id));
        if let Some(obj) = self.world.get_mut(id) {
            obj.slots[slot] = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jacl_core::Namespace;
    use jacl_core::attribute;
    use jacl_core::object::slot;

    fn load(source: &str) -> LoadOutcome {
        load_source(source, &LoaderConfig::default()).unwrap()
    }

    fn errors(outcome: &LoadOutcome) -> Vec<String> {
        outcome
            .diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| d.message.clone())
            .collect()
    }

    #[test]
    fn objects_default_to_latest_location() {
        let outcome = load(
            "location kitchen\n\
             object lamp brass lamp\n\
             location hall\n\
             object rug\n",
        );
        assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
        let world = &outcome.world;
        let lamp = world.find_label("lamp").unwrap();
        let rug = world.find_label("rug").unwrap();
        let kitchen = world.find_label("kitchen").unwrap();
        let hall = world.find_label("hall").unwrap();
        assert_eq!(world.get(lamp).unwrap().parent(), kitchen);
        assert_eq!(world.get(rug).unwrap().parent(), hall);
        assert_eq!(world.get(lamp).unwrap().names, vec!["brass", "lamp"]);
        assert_eq!(world.get(rug).unwrap().names, vec!["rug"]);
        assert_eq!(world.get(lamp).unwrap().slots[slot::MASS], SCENERY);
        assert!(world.get(hall).unwrap().is_location());
        assert_eq!(world.symbols.cinteger_resolve("objects", 0), Some(4));
    }

    #[test]
    fn forward_references_resolve_in_second_pass() {
        let outcome = load(
            "location kitchen\n\
             north hall\n\
             object key\n\
             parent box\n\
             object box\n\
             location hall\n",
        );
        assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
        let world = &outcome.world;
        let kitchen = world.get(world.find_label("kitchen").unwrap()).unwrap();
        assert_eq!(kitchen.slots[0], world.find_label("hall").unwrap());
        let key = world.get(world.find_label("key").unwrap()).unwrap();
        assert_eq!(key.parent(), world.find_label("box").unwrap());
    }

    #[test]
    fn properties() {
        let outcome = load(
            "attribute SHINY\n\
             location cave\n\
             object coin gold coin\n\
             short a \"gold coin\"\n\
             definite this\n\
             long \"A coin glints.\"\n\
             has LUMINOUS SHINY\n\
             plural coins\n\
             mass 2\n\
             static\n\
             object me\n\
             player\n",
        );
        assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
        let world = &outcome.world;
        let coin = world.get(world.find_label("coin").unwrap()).unwrap();
        assert_eq!(coin.article, "a");
        assert_eq!(coin.inventory, "gold coin");
        assert_eq!(coin.definite, "this");
        assert_eq!(coin.described, "A coin glints.");
        assert!(coin.has(attribute::LUMINOUS));
        assert!(coin.has_attribute(Namespace::User, 1));
        assert_eq!(coin.plurals, vec!["coins"]);
        assert_eq!(coin.slots[slot::MASS], 2);
        assert!(coin.nosave);
        assert_eq!(world.player, world.find_label("me").unwrap());
    }

    #[test]
    fn integers_and_constants() {
        let outcome = load(
            "constant LIMIT 3\n\
             constant greeting \"hello\"\n\
             constant mixed 1 2\n\
             integer counter LIMIT 7\n\
             integer plain\n\
             integer_array grid LIMIT 5\n\
             string name\n\
             string_array lines 2 \"x\"\n\
             location cave\n",
        );
        assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
        let s = &outcome.world.symbols;
        assert_eq!(s.integer_resolve("counter", 0).unwrap().value, 3);
        assert_eq!(s.integer_resolve("counter", 1).unwrap().value, 7);
        assert_eq!(s.integer("plain"), 0);
        assert_eq!(s.integer_resolve("grid", 2).unwrap().value, 5);
        assert!(s.integer_resolve("grid", 3).is_none());
        assert_eq!(s.cstring("greeting"), "hello");
        assert_eq!(s.cinteger_vec("mixed"), &[1, 2]);
        assert_eq!(s.string_resolve("name", 0).unwrap().value, "");
        assert_eq!(s.string_resolve("lines", 1).unwrap().value, "x");
    }

    #[test]
    fn oversized_arrays_are_refused() {
        let outcome = load(
            "integer_array huge 2000000000\n\
             string_array many 65536\n\
             integer_array fits 65535\n\
             location cave\n",
        );
        assert_eq!(
            errors(&outcome),
            vec![
                "array size 2000000000 exceeds the limit of 65535",
                "array size 65536 exceeds the limit of 65535",
            ]
        );
        let s = &outcome.world.symbols;
        assert!(s.integer_resolve("huge", 0).is_none());
        assert!(s.string_resolve("many", 0).is_none());
        assert!(s.integer_resolve("fits", MAX_ARRAY_LENGTH - 1).is_some());
    }

    #[test]
    fn functions_named_by_header() {
        let outcome = load(
            "{+intro\n\
             write \"Hi^\"\n\
             }\n\
             location cave\n\
             object lamp\n\
             {examine static take *look_cave\n\
             print\n\
             A } inside a print block.\n\
             .\n\
             }\n",
        );
        assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
        let world = &outcome.world;
        let lamp = world.find_label("lamp").unwrap();
        let cave = world.find_label("cave").unwrap();

        let intro = world.functions.resolve("+intro").unwrap();
        assert_eq!(intro.self_object, NOWHERE);
        assert_eq!(intro.body.len(), 1);

        let examine = world.functions.resolve("examine_lamp").unwrap();
        assert_eq!(examine.self_object, lamp);
        assert!(!examine.nosave);
        let take = world.functions.resolve("take_lamp").unwrap();
        assert!(take.nosave);
        let look = world.functions.resolve("look_cave").unwrap();
        assert_eq!(look.self_object, cave);

        assert_eq!(examine.body.len(), 1);
        assert_eq!(
            examine.body[0].print.as_deref(),
            Some(&["A } inside a print block.".to_string()][..])
        );
    }

    #[test]
    fn object_function_before_any_object() {
        let outcome = load("{look\n}\n");
        assert_eq!(errors(&outcome).len(), 1);
        assert!(errors(&outcome)[0].contains("no object"));
    }

    #[test]
    fn illegal_labels() {
        let outcome = load(
            "integer here\n\
             integer 12\n\
             constant command_prompt \"> \"\n\
             location cave\n\
             integer cave\n\
             string score\n\
             attribute CLOSED\n",
        );
        assert_eq!(errors(&outcome).len(), 6, "{:?}", outcome.diagnostics);
        assert!(outcome.has_errors());
    }

    #[test]
    fn unknown_keyword_suggests() {
        let outcome = load("location cave\nnorht cave\nhas LUMINUS\n");
        let diags: Vec<_> = outcome.diagnostics.iter().filter(|d| d.is_error()).collect();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].line, 2);
        assert_eq!(diags[0].label.as_deref(), Some("did you mean `north`?"));
        assert_eq!(diags[1].label.as_deref(), Some("did you mean `LUMINOUS`?"));
    }

    #[test]
    fn too_many_objects_stops() {
        let config = LoaderConfig::default().with_max_objects(2);
        let outcome = load_source("location a\nobject b\nobject c\n", &config).unwrap();
        assert!(outcome.too_many_objects);
        assert!(outcome.has_errors());
    }

    #[test]
    fn unclosed_body_is_an_error() {
        let outcome = load("{+intro\nwrite \"x\"\n");
        assert!(errors(&outcome)[0].contains("never closed"));
    }

    #[test]
    fn defaults_created_when_absent() {
        let outcome = load("string command_prompt \"? \"\nconstant NO_UNDO \"Nope.^\"\nlocation cave\n");
        let s = &outcome.world.symbols;
        assert_eq!(s.string_resolve("command_prompt", 0).unwrap().value, "? ");
        assert_eq!(s.cstring("NO_UNDO"), "Nope.^");
        assert_eq!(s.cstring("THEN_WORD"), "then");
        assert_eq!(s.integer("status_window"), 1);
        assert_eq!(s.cstring("game_title"), "JACL Adventure");
        assert_eq!(s.integer("total_moves"), -1);
        assert_eq!(s.cinteger_vec("volume").len(), 8);
    }

    #[test]
    fn newer_processed_version_is_refused() {
        let result = load_source("#processed:99\nlocation cave\n", &LoaderConfig::default());
        assert!(matches!(result, Err(LoadError::NewerVersion { found: 99, .. })));
    }

    #[test]
    fn encrypted_lines_load() {
        let mut bytes = b"#processed:2\n".to_vec();
        bytes.extend(crypt::encode_lines(["location cave", "object lamp"]));
        let outcome = load_bytes(&bytes, &LoaderConfig::default()).unwrap();
        assert!(!outcome.has_errors());
        assert_eq!(outcome.world.object_count(), 2);
    }

    #[test]
    fn synonym_cycle_is_an_error() {
        let outcome = load("synonym a b\nsynonym b a\nlocation cave\n");
        assert!(errors(&outcome)[0].contains("cycle"));
    }
}

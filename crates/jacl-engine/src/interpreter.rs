//! The interpreter: world state, call stack and turn loop.

use std::fmt::Display;

use jacl_core::relations::get_here;
use jacl_core::{NOWHERE, ObjectId, Word, World};
use jacl_dsl::{LoadOutcome, LoaderConfig, load_source};
use log::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::frame::{ARG, CallFrame, CommandState, STRING_ARG, SharedVectors};
use crate::random::{RandomSource, SeededRandom};
use crate::sink::{InputEvent, PresentationSink};

/// Objects most recently referred to, for `it`, `him`, `her` and `them`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pronouns {
    pub it: ObjectId,
    pub him: ObjectId,
    pub her: ObjectId,
    pub them: Vec<ObjectId>,
}

/// A loaded game being played.
///
/// Owns the world and the presentation sink; exactly one turn runs at a
/// time through `&mut self`.
pub struct Interpreter<S: PresentationSink> {
    pub(crate) world: World,
    /// The world as loaded, for restarting.
    pristine: World,
    pub(crate) sink: S,
    pub(crate) config: EngineConfig,
    pub(crate) random: Box<dyn RandomSource>,
    pub(crate) stack: Vec<CallFrame>,
    /// Name of the function being executed.
    pub(crate) function: String,
    pub(crate) self_object: ObjectId,
    pub(crate) command: CommandState,
    pub(crate) pronouns: Pronouns,
    /// The last command matched against the grammar, for `again` and
    /// `oops`.
    pub(crate) last_segment: Option<Vec<Word>>,
    /// Word position of the last unknown word, for `oops`.
    pub(crate) oops_index: Option<usize>,
    pub(crate) undo_available: bool,
    /// `noun4` as it was when the undo state was taken.
    pub(crate) undo_noun: ObjectId,
    pub(crate) scripting: bool,
    /// Set while a walkthrough is being replayed.
    pub(crate) walking: bool,
    /// Set by `restartgame`; the restart happens once the turn unwinds.
    pub(crate) restart_requested: bool,
}

impl<S: PresentationSink> Interpreter<S> {
    /// Wrap a loaded world.
    pub fn new(mut world: World, sink: S, config: EngineConfig) -> Self {
        world.symbols.set_integer("notify", i32::from(config.notify));
        let random: Box<dyn RandomSource> = Box::new(SeededRandom::new(config.seed));
        Self {
            pristine: world.clone(),
            world,
            sink,
            config,
            random,
            stack: Vec::new(),
            function: String::new(),
            self_object: NOWHERE,
            command: CommandState::default(),
            pronouns: Pronouns::default(),
            last_segment: None,
            oops_index: None,
            undo_available: false,
            undo_noun: NOWHERE,
            scripting: false,
            walking: false,
            restart_requested: false,
        }
    }

    /// Start from a load result, refusing worlds that had load errors.
    pub fn from_outcome(outcome: LoadOutcome, sink: S, config: EngineConfig) -> EngineResult<Self> {
        if outcome.too_many_objects {
            return Err(EngineError::TooManyObjects(config.max_objects));
        }
        let errors = outcome.diagnostics.iter().filter(|d| d.is_error()).count();
        if errors > 0 {
            return Err(EngineError::Load(errors));
        }
        let world = outcome.world;
        info!(
            "loaded {} objects, {} functions, {} integers, {} strings",
            world.object_count(),
            world.functions.len(),
            world.symbols.integer_cell_count(),
            world.symbols.string_cell_count()
        );
        Ok(Self::new(world, sink, config))
    }

    /// Load game source text and wrap it.
    pub fn from_source(source: &str, sink: S, config: EngineConfig) -> EngineResult<Self> {
        let caps = sink.capabilities();
        let loader = LoaderConfig::default()
            .with_max_objects(config.max_objects)
            .with_capabilities(caps.graphics, caps.sound, caps.timer);
        let outcome = load_source(source, &loader)?;
        Self::from_outcome(outcome, sink, config)
    }

    /// Replace the random source.
    pub fn with_random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Nouns and object lists of the most recent command.
    pub fn command(&self) -> &CommandState {
        &self.command
    }

    pub fn pronouns(&self) -> &Pronouns {
        &self.pronouns
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Run the start-up functions and the first end-of-turn processing.
    pub fn boot(&mut self) -> EngineResult<()> {
        self.call("+bootstrap")?;
        self.call("+intro")?;
        if self.world.object_count() < 2 {
            return Err(EngineError::MissingBootObject);
        }
        get_here(&self.world)?;
        self.eachturn()
    }

    /// Boot, then play until the player quits or input runs out.
    pub fn run(&mut self) -> EngineResult<()> {
        match self.play() {
            Err(EngineError::Quit) => {
                info!("game ended");
                Ok(())
            }
            other => other,
        }
    }

    fn play(&mut self) -> EngineResult<()> {
        self.boot()?;
        loop {
            self.call("+bottom")?;
            self.update_status()?;
            let prompt = self.string_value("command_prompt");
            self.sink.write_text(&prompt)?;
            match self.sink.request_line()? {
                InputEvent::Line(line) => {
                    if self.scripting {
                        self.sink.write_transcript(&format!("{line}^"))?;
                    }
                    self.call("+top")?;
                    self.process_line(&line)?;
                }
                InputEvent::Timer => {
                    self.call("+timer")?;
                }
                InputEvent::SoundFinished { resource, channel } => {
                    self.call(&format!("+sound_finished<{resource}<{channel}"))?;
                }
                InputEvent::Eof => return Ok(()),
            }
        }
    }

    /// End-of-turn processing: the `eachturn` hooks, then the move counter.
    pub fn eachturn(&mut self) -> EngineResult<()> {
        self.call("+eachturn")?;
        let here = self.here()?;
        let local = format!("eachturn_{}", self.world.label_of(here));
        self.call(&local)?;
        self.call("+system_eachturn")?;
        let moves = self.integer("total_moves");
        self.set_integer("total_moves", moves.wrapping_add(1));
        self.set_integer("time", 0);
        Ok(())
    }

    /// Return the world to its loaded state and boot again.
    pub fn restart(&mut self) -> EngineResult<()> {
        info!("restarting");
        self.world = self.pristine.clone();
        self.stack.clear();
        self.function.clear();
        self.self_object = NOWHERE;
        self.command = CommandState::default();
        self.pronouns = Pronouns::default();
        self.last_segment = None;
        self.oops_index = None;
        self.undo_available = false;
        self.undo_noun = NOWHERE;
        self.restart_requested = false;
        self.boot()
    }

    /// Write the status bar from the current location, score and moves.
    pub(crate) fn update_status(&mut self) -> EngineResult<()> {
        if self.call("+update_status")?.is_some() {
            return Ok(());
        }
        let height = self.integer("status_window");
        let here = self.here()?;
        let left = self.world.get(here).map(|o| o.inventory.clone()).unwrap_or_default();
        let score = self.integer("score");
        let moves = self.integer("total_moves");
        self.sink.status_line(&left, score, moves, height)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Functions and the call stack
    // -----------------------------------------------------------------------

    /// Call a function if it exists, ignoring its absence.
    pub(crate) fn call(&mut self, call: &str) -> EngineResult<Option<i32>> {
        self.execute_function(call)
    }

    /// Run the function named by `call`, which may carry `<arg<arg`
    /// arguments. Returns `None` when no such function exists.
    pub fn execute_function(&mut self, call: &str) -> EngineResult<Option<i32>> {
        let Some(function) = self.world.functions.resolve(call) else {
            return Ok(None);
        };
        let name = function.name.clone();
        let self_object = function.self_object;
        let body = function.body.clone();

        let mut args = Vec::new();
        for text in call.split('<').skip(1).filter(|a| !a.is_empty()) {
            let value = self.argument_value(text)?;
            args.push((value, text.strip_prefix('+').unwrap_or(text).to_string()));
        }

        self.push_frame()?;
        self.world.symbols.clear_cinteger(ARG);
        self.world.symbols.clear_cstring(STRING_ARG);
        for (index, (value, text)) in args.iter().enumerate() {
            if index == 0 {
                self.command.nouns[3] = *value;
            }
            self.world.symbols.add_cinteger(ARG, *value);
            self.world.symbols.add_cstring(STRING_ARG, text);
        }
        if let Some(function) = self.world.functions.resolve_mut(&name) {
            function.call_count += 1;
        }
        self.function = name;
        self.self_object = self_object;
        self.world.symbols.clear_cstring("function_name");
        self.world.symbols.add_cstring("function_name", &self.function);
        debug!("entering {} (depth {})", self.function, self.stack.len());

        let result = self.run_body(&body);
        let leaving = std::mem::take(&mut self.function);
        self.pop_frame();
        debug!("leaving {leaving}");
        result.map(Some)
    }

    /// Save the caller's state before a call or proxied command.
    pub(crate) fn push_frame(&mut self) -> EngineResult<()> {
        if self.stack.len() >= self.config.stack_capacity {
            return Err(EngineError::StackOverflow(self.config.stack_capacity));
        }
        self.stack.push(CallFrame {
            function: self.function.clone(),
            self_object: self.self_object,
            command: self.command.clone(),
            vectors: SharedVectors::capture(&self.world.symbols),
        });
        Ok(())
    }

    pub(crate) fn pop_frame(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.world.symbols.clear_cstring("function_name");
            self.world.symbols.add_cstring("function_name", &frame.function);
            self.function = frame.function;
            self.self_object = frame.self_object;
            self.command = frame.command;
            frame.vectors.restore(&mut self.world.symbols);
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// The location the player is in.
    pub fn here(&self) -> EngineResult<ObjectId> {
        Ok(get_here(&self.world)?)
    }

    pub(crate) fn integer(&self, name: &str) -> i32 {
        self.world.symbols.integer(name)
    }

    pub(crate) fn set_integer(&mut self, name: &str, value: i32) {
        self.world.symbols.set_integer(name, value);
    }

    /// First cell of a string variable, or of a constant string.
    pub(crate) fn string_value(&self, name: &str) -> String {
        match self.world.symbols.string_resolve(name, 0) {
            Some(cell) => cell.value.clone(),
            None => self.world.symbols.cstring(name).to_string(),
        }
    }

    /// A language string.
    pub(crate) fn message(&self, name: &str) -> String {
        self.world.symbols.cstring(name).to_string()
    }

    pub(crate) fn write(&mut self, text: &str) -> EngineResult<()> {
        self.sink.write_text(text)?;
        Ok(())
    }

    /// Write a language string.
    pub(crate) fn say(&mut self, name: &str) -> EngineResult<()> {
        let text = self.message(name);
        self.write(&text)
    }

    /// Report a script error against the executing function and carry on.
    pub(crate) fn report(&mut self, message: impl Display) -> EngineResult<()> {
        warn!("in function {}: {message}", self.function);
        let text = format!("ERROR: In function \"{}\", {message}.^", self.function);
        self.write(&text)
    }
}

//! Interpreter configuration.

use jacl_core::world::DEFAULT_MAX_OBJECTS;

/// Smallest call stack the interpreter accepts.
pub const MIN_STACK_CAPACITY: usize = 32;

/// Settings for an [`Interpreter`](crate::Interpreter).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Seed for the random source; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Maximum number of nested function calls.
    pub stack_capacity: usize,
    /// Object table capacity used when loading.
    pub max_objects: usize,
    /// Initial value of the `notify` integer.
    pub notify: bool,
    /// Suppress output of the `debug` operator.
    pub release: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            stack_capacity: 64,
            max_objects: DEFAULT_MAX_OBJECTS,
            notify: true,
            release: false,
        }
    }
}

impl EngineConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the call stack capacity, never below [`MIN_STACK_CAPACITY`].
    pub fn with_stack_capacity(mut self, capacity: usize) -> Self {
        self.stack_capacity = capacity.max(MIN_STACK_CAPACITY);
        self
    }

    pub fn with_max_objects(mut self, max_objects: usize) -> Self {
        self.max_objects = max_objects;
        self
    }

    pub fn with_notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    pub fn with_release(mut self, release: bool) -> Self {
        self.release = release;
        self
    }
}

pub mod check;
pub mod export;
pub mod objects;
pub mod play;
pub mod preprocess;

use std::path::Path;

use jacl_dsl::crypt::{decode_lines, processed_version};
use jacl_dsl::diagnostics::Severity;
use jacl_dsl::{LoadError, LoadOutcome, LoaderConfig, PreprocessConfig, load_bytes};
use jacl_engine::EngineError;
use log::debug;
use thiserror::Error;

/// Why a command failed, and the process status to exit with.
#[derive(Debug, Error)]
pub enum CliError {
    /// A fatal interpreter or load condition.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The command line could not be acted on.
    #[error("{0}")]
    Usage(String),

    /// Writing results failed.
    #[error("{0}")]
    Output(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Engine(e) => e.exit_code(),
            Self::Usage(_) => 2,
            Self::Output(_) => 1,
        }
    }
}

/// Read a game file, preprocessing it in memory if it is still in authored
/// form.
fn read_game(path: &Path, source: &PreprocessConfig) -> Result<Vec<u8>, CliError> {
    let bytes = std::fs::read(path).map_err(|e| EngineError::Read(LoadError::io(path, e)))?;
    let processed = decode_lines(&bytes)
        .iter()
        .any(|(_, line)| processed_version(line).is_some());
    if processed {
        return Ok(bytes);
    }
    debug!("{} is not preprocessed; preprocessing in memory", path.display());
    jacl_dsl::preprocess::render(path, source).map_err(|e| EngineError::Preprocess(e).into())
}

/// Load a game and print its diagnostics. The outcome is returned even
/// when it has errors.
fn load_game(path: &Path, source: &PreprocessConfig, loader: &LoaderConfig) -> Result<LoadOutcome, CliError> {
    let bytes = read_game(path, source)?;
    let outcome = load_bytes(&bytes, loader).map_err(EngineError::Read)?;
    print_diagnostics(&outcome, path);
    Ok(outcome)
}

/// Load a game for inspection, failing on load errors.
fn load_world(path: &Path) -> Result<jacl_core::World, CliError> {
    let loader = LoaderConfig::default();
    let outcome = load_game(path, &PreprocessConfig::default(), &loader)?;
    check_outcome(&outcome, &loader)?;
    Ok(outcome.world)
}

fn check_outcome(outcome: &LoadOutcome, loader: &LoaderConfig) -> Result<(), CliError> {
    if outcome.too_many_objects {
        return Err(EngineError::TooManyObjects(loader.max_objects).into());
    }
    let errors = outcome.diagnostics.iter().filter(|d| d.is_error()).count();
    if errors > 0 {
        return Err(EngineError::Load(errors).into());
    }
    Ok(())
}

/// Print diagnostics to stderr using ariadne.
fn print_diagnostics(outcome: &LoadOutcome, path: &Path) {
    if outcome.diagnostics.is_empty() {
        return;
    }
    eprint!("{}", outcome.render(&path.display().to_string()));

    let count = |severity| outcome.diagnostics.iter().filter(|d| d.severity == severity).count();
    let errors = count(Severity::Error);
    let warnings = count(Severity::Warning);
    let plural = |n: usize| if n == 1 { "" } else { "s" };
    if errors > 0 {
        eprintln!("  {errors} error{}, {warnings} warning{}", plural(errors), plural(warnings));
    } else {
        eprintln!("  {warnings} warning{}", plural(warnings));
    }
}

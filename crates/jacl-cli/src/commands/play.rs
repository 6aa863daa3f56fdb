use std::path::Path;

use jacl_dsl::{LoaderConfig, PreprocessConfig};
use jacl_engine::{EngineConfig, Interpreter, PresentationSink};
use log::info;

use super::CliError;
use crate::terminal::TerminalSink;

pub fn run(game: &Path, source: PreprocessConfig, seed: Option<u64>) -> Result<(), CliError> {
    let sink = TerminalSink::new(game);
    let caps = sink.capabilities();

    let mut config = EngineConfig::new().with_release(source.release);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    let loader = LoaderConfig::default()
        .with_max_objects(config.max_objects)
        .with_capabilities(caps.graphics, caps.sound, caps.timer);

    let outcome = super::load_game(game, &source, &loader)?;
    let mut interpreter = Interpreter::from_outcome(outcome, sink, config)?;
    info!("playing {}", game.display());
    interpreter.run()?;

    Ok(())
}

use std::path::Path;

use jacl_dsl::{LoaderConfig, PreprocessConfig};

use super::CliError;

pub fn run(game: &Path, source: PreprocessConfig) -> Result<(), CliError> {
    let loader = LoaderConfig::default();
    let outcome = super::load_game(game, &source, &loader)?;
    super::check_outcome(&outcome, &loader)?;

    let world = &outcome.world;
    println!("  All checks passed for '{}'.", world.symbols.cstring("game_title"));
    println!(
        "  {} objects, {} functions, {} grammar productions",
        world.object_count(),
        world.functions.len(),
        world.grammar.production_count()
    );

    Ok(())
}

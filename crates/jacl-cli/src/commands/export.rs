use std::path::Path;

use jacl_core::World;
use jacl_core::attribute::system_attribute_names;
use serde_json::{Map, Value, json};

use super::CliError;

pub fn run(game: &Path, output: Option<&Path>) -> Result<(), CliError> {
    let world = super::load_world(game)?;
    let content = export_json(&world)?;

    if let Some(path) = output {
        std::fs::write(path, &content)
            .map_err(|e| CliError::Output(format!("cannot write to {}: {e}", path.display())))?;
        println!("  Exported to {}", path.display());
    } else {
        println!("{content}");
    }

    Ok(())
}

fn export_json(world: &World) -> Result<String, CliError> {
    let json_error = |e: serde_json::Error| CliError::Output(format!("JSON serialization error: {e}"));

    let mut objects = Vec::new();
    for (id, object) in world.objects() {
        let mut value = serde_json::to_value(object).map_err(json_error)?;
        value["id"] = json!(id);
        value["attribute_names"] = json!(system_attribute_names(object.attributes, object.is_location()));
        objects.push(value);
    }

    let integers: Map<String, Value> = world
        .symbols
        .integers()
        .map(|(name, cells)| (name.to_string(), cells.iter().map(|c| c.value).collect()))
        .collect();
    let strings: Map<String, Value> = world
        .symbols
        .strings()
        .map(|(name, cells)| (name.to_string(), cells.iter().map(|c| c.value.as_str()).collect()))
        .collect();
    let functions: Vec<_> = world.functions.iter().collect();

    let export = json!({
        "game": {
            "title": world.symbols.cstring("game_title"),
            "player": world.label_of(world.player),
            "grammar_productions": world.grammar.production_count(),
        },
        "objects": objects,
        "integers": integers,
        "strings": strings,
        "functions": functions,
    });

    serde_json::to_string_pretty(&export).map_err(json_error)
}

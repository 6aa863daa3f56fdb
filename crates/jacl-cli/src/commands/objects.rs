use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use jacl_core::NOWHERE;
use jacl_core::attribute::system_attribute_names;

use super::CliError;

pub fn run(game: &Path, locations_only: bool) -> Result<(), CliError> {
    let world = super::load_world(game)?;

    let objects: Vec<_> = world
        .objects()
        .filter(|(_, object)| !locations_only || object.is_location())
        .collect();

    if objects.is_empty() {
        println!("  No objects found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Label", "Name", "Parent", "Attributes"]);

    for (id, object) in &objects {
        let parent = match object.parent() {
            NOWHERE => "-".to_string(),
            parent => world.label_of(parent).to_string(),
        };
        let attributes = system_attribute_names(object.attributes, object.is_location()).join(" ");
        let attributes = if attributes.is_empty() { "-".to_string() } else { attributes };
        table.add_row(vec![
            id.to_string(),
            object.label.clone(),
            object.inventory.clone(),
            parent,
            attributes,
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} objects", objects.len());

    Ok(())
}

use jacl_core::attribute::{self, Namespace};
use jacl_core::object::{Object, SLOT_COUNT, slot};
use jacl_core::snapshot::{restore_from_bytes, save_to_bytes};
use jacl_core::{SymbolTable, World};
use proptest::prelude::*;

fn world_with(objects: usize, integers: &[i32], strings: &[String]) -> World {
    let mut world = World::default();
    world.add_object(Object::location("start")).unwrap();
    for i in 1..objects {
        let mut o = Object::new(format!("thing{i}"));
        o.slots[slot::PARENT] = 1;
        world.add_object(o).unwrap();
    }
    for (i, v) in integers.iter().enumerate() {
        world.symbols.add_integer(&format!("var{i}"), *v);
    }
    for (i, s) in strings.iter().enumerate() {
        world.symbols.add_string(&format!("text{i}"), s);
    }
    for _ in 0..8 {
        world.symbols.add_cinteger("volume", 100);
    }
    world.symbols.add_cinteger("timer", 0);
    world.player = 1;
    world
}

/// Everything a snapshot covers, in comparable form.
fn state(world: &World) -> (Vec<[i32; SLOT_COUNT]>, Vec<(u32, u32)>, Vec<i32>, Vec<String>) {
    (
        world.objects().map(|(_, o)| o.slots).collect(),
        world
            .objects()
            .map(|(_, o)| (o.attributes, o.user_attributes))
            .collect(),
        world.symbols.integer_cells().map(|c| c.value).collect(),
        world.symbols.string_cells().map(|c| c.value.clone()).collect(),
    )
}

proptest! {
    #[test]
    fn save_restore_round_trip(
        objects in 1usize..6,
        integers in proptest::collection::vec(any::<i32>(), 0..6),
        strings in proptest::collection::vec("[a-z ]{0,40}", 0..4),
        edits in proptest::collection::vec((0usize..6, 0usize..SLOT_COUNT, any::<i32>(), any::<u32>()), 1..10),
        new_ints in proptest::collection::vec(any::<i32>(), 0..6),
    ) {
        let mut world = world_with(objects, &integers, &strings);
        let before = state(&world);
        let bytes = save_to_bytes(&world, 0);

        let count = world.object_count();
        for (o, s, v, a) in edits {
            let id = i32::try_from(o).unwrap() % count + 1;
            let object = world.object_mut(id).unwrap();
            object.slots[s] = v;
            object.attributes = a;
            object.user_attributes = a.rotate_left(3);
        }
        for (cell, v) in world.symbols.integer_cells_mut().zip(new_ints) {
            cell.value = v;
        }
        for cell in world.symbols.string_cells_mut() {
            cell.set("changed");
        }

        restore_from_bytes(&mut world, &bytes).unwrap();
        prop_assert_eq!(state(&world), before);
    }

    #[test]
    fn setting_one_attribute_leaves_others(
        system in any::<u32>(),
        user in any::<u32>(),
        bit in 0u32..31,
        on in any::<bool>(),
        user_namespace in any::<bool>(),
    ) {
        let mut object = Object::new("box");
        object.attributes = system;
        object.user_attributes = user;
        let mask = 1u32 << bit;
        let namespace = if user_namespace { Namespace::User } else { Namespace::System };
        object.set_attribute(namespace, mask, on);

        prop_assert_eq!(object.has_attribute(namespace, mask), on);
        match namespace {
            Namespace::System => {
                prop_assert_eq!(object.attributes & !mask, system & !mask);
                prop_assert_eq!(object.user_attributes, user);
            }
            Namespace::User => {
                prop_assert_eq!(object.user_attributes & !mask, user & !mask);
                prop_assert_eq!(object.attributes, system);
            }
        }
    }

    #[test]
    fn synonym_rewrite_is_idempotent(
        pairs in proptest::collection::vec(("[a-e]", "[a-e]"), 0..8),
        words in proptest::collection::vec("[a-f]", 0..8),
    ) {
        let mut table = SymbolTable::new();
        for (from, to) in &pairs {
            table.add_synonym(from, to);
        }
        // Cyclic sets are rejected at load; only acyclic ones reach play.
        prop_assume!(table.canonicalise_synonyms().is_ok());

        let rewrite = |input: &[String]| -> Vec<String> {
            input
                .iter()
                .map(|w| table.synonym(w).unwrap_or(w.as_str()).to_string())
                .collect()
        };
        let once = rewrite(&words);
        prop_assert_eq!(rewrite(&once), once);
    }
}

#[test]
fn location_bit_matches_declaration() {
    let mut world = World::default();
    let cave = world.add_object(Object::location("cave")).unwrap();
    let rock = world.add_object(Object::new("rock")).unwrap();
    assert!(world.object(cave).unwrap().has(attribute::LOCATION));
    assert!(!world.object(rock).unwrap().has(attribute::LOCATION));
}

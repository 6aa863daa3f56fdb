//! Binary saved-game images.
//!
//! Layout, all integers little-endian `i32`:
//!
//! 1. object, integer, function and string counts;
//! 2. every integer cell value in table order;
//! 3. the call count of every function not declared `static`;
//! 4. for each object not marked `nosave`, its sixteen slots followed by the
//!    system and user attribute masks;
//! 5. every string cell as exactly 1024 bytes, NUL padded;
//! 6. the player, the fourth noun, eight channel volumes and the timer.

use log::debug;

use crate::error::{CoreError, CoreResult};
use crate::object::{ObjectId, SLOT_COUNT};
use crate::symbols::{STRING_CAPACITY, truncate_to_capacity};
use crate::world::World;

/// Number of sound channels stored in a snapshot.
pub const CHANNELS: usize = 8;

fn counts(world: &World) -> [i32; 4] {
    let clamp = |n: usize| i32::try_from(n).unwrap_or(i32::MAX);
    [
        world.object_count(),
        clamp(world.symbols.integer_cell_count()),
        clamp(world.functions.len()),
        clamp(world.symbols.string_cell_count()),
    ]
}

/// Byte length of a snapshot of `world`.
pub fn snapshot_len(world: &World) -> usize {
    let saved_functions = world.functions.iter().filter(|f| !f.nosave).count();
    let saved_objects = world.objects().filter(|(_, o)| !o.nosave).count();
    4 * (4
        + world.symbols.integer_cell_count()
        + saved_functions
        + saved_objects * (SLOT_COUNT + 2)
        + 2
        + CHANNELS
        + 1)
        + world.symbols.string_cell_count() * STRING_CAPACITY
}

fn push(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Serialise the mutable state of `world` together with the fourth noun.
pub fn save_to_bytes(world: &World, noun4: ObjectId) -> Vec<u8> {
    let mut buf = Vec::with_capacity(snapshot_len(world));

    for count in counts(world) {
        push(&mut buf, count);
    }
    for cell in world.symbols.integer_cells() {
        push(&mut buf, cell.value);
    }
    for function in world.functions.iter().filter(|f| !f.nosave) {
        push(&mut buf, function.call_count);
    }
    for (_, object) in world.objects().filter(|(_, o)| !o.nosave) {
        for slot in object.slots {
            push(&mut buf, slot);
        }
        push(&mut buf, object.attributes as i32);
        push(&mut buf, object.user_attributes as i32);
    }
    for cell in world.symbols.string_cells() {
        let mut block = [0u8; STRING_CAPACITY];
        let text = truncate_to_capacity(&cell.value).as_bytes();
        block[..text.len()].copy_from_slice(text);
        buf.extend_from_slice(&block);
    }

    push(&mut buf, world.player);
    push(&mut buf, noun4);
    for channel in 0..CHANNELS {
        push(
            &mut buf,
            world.symbols.cinteger_resolve("volume", channel).unwrap_or(100),
        );
    }
    push(&mut buf, world.symbols.cinteger_resolve("timer", 0).unwrap_or(0));

    debug!("saved {} bytes", buf.len());
    buf
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn int(&mut self) -> i32 {
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.bytes[self.pos..self.pos + 4]);
        self.pos += 4;
        i32::from_le_bytes(word)
    }

    fn string(&mut self) -> String {
        let block = &self.bytes[self.pos..self.pos + STRING_CAPACITY];
        self.pos += STRING_CAPACITY;
        let end = block.iter().position(|b| *b == 0).unwrap_or(block.len());
        String::from_utf8_lossy(&block[..end]).into_owned()
    }
}

/// Overwrite the mutable state of `world` from a snapshot, returning the
/// stored fourth noun.
///
/// The image is checked against the loaded game before anything is
/// changed.
pub fn restore_from_bytes(world: &mut World, bytes: &[u8]) -> CoreResult<ObjectId> {
    if bytes.len() < 16 {
        return Err(CoreError::SnapshotTruncated(bytes.len()));
    }
    let mut reader = Reader { bytes, pos: 0 };
    let found = [reader.int(), reader.int(), reader.int(), reader.int()];
    let expected = counts(world);
    if found != expected {
        return Err(CoreError::SnapshotMismatch { expected, found });
    }
    if bytes.len() != snapshot_len(world) {
        return Err(CoreError::SnapshotTruncated(bytes.len()));
    }

    for cell in world.symbols.integer_cells_mut() {
        cell.value = reader.int();
    }
    for function in world.functions.iter_mut().filter(|f| !f.nosave) {
        function.call_count = reader.int();
    }
    for id in world.ids() {
        let object = world.object_mut(id)?;
        if object.nosave {
            continue;
        }
        for slot in object.slots.iter_mut() {
            *slot = reader.int();
        }
        object.attributes = reader.int() as u32;
        object.user_attributes = reader.int() as u32;
    }
    for cell in world.symbols.string_cells_mut() {
        cell.value = reader.string();
    }

    world.player = reader.int();
    let noun4 = reader.int();
    for channel in 0..CHANNELS {
        let volume = reader.int();
        world.symbols.set_cinteger("volume", channel, volume);
    }
    let timer = reader.int();
    world.symbols.set_cinteger("timer", 0, timer);

    debug!("restored {} bytes", bytes.len());
    Ok(noun4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute;
    use crate::function::Function;
    use crate::object::{Object, slot};

    fn test_world() -> World {
        let mut world = World::default();
        world.add_object(Object::location("cave")).unwrap();
        let mut key = Object::new("key");
        key.slots[slot::PARENT] = 1;
        world.add_object(key).unwrap();
        let mut ghost = Object::new("ghost");
        ghost.nosave = true;
        world.add_object(ghost).unwrap();
        world.symbols.add_integer("score", 0);
        world.symbols.add_integer("total_moves", 3);
        world.symbols.add_string("name", "Ann");
        for _ in 0..CHANNELS {
            world.symbols.add_cinteger("volume", 100);
        }
        world.symbols.add_cinteger("timer", 0);
        world.functions.insert(Function::new("+take", 1));
        let mut fixed = Function::new("+fixed", 5);
        fixed.nosave = true;
        world.functions.insert(fixed);
        world.player = 2;
        world
    }

    #[test]
    fn length_matches_layout() {
        let world = test_world();
        let bytes = save_to_bytes(&world, 0);
        assert_eq!(bytes.len(), snapshot_len(&world));
        // counts + 2 ints + 1 call count + 2 objects * 18 + tail (11)
        assert_eq!(bytes.len(), 4 * (4 + 2 + 1 + 36 + 11) + STRING_CAPACITY);
    }

    #[test]
    fn restore_undoes_changes() {
        let mut world = test_world();
        let bytes = save_to_bytes(&world, 2);

        world.object_mut(2).unwrap().slots[slot::PARENT] = 0;
        world.object_mut(2).unwrap().attributes |= attribute::WORN;
        world.symbols.set_integer("score", 50);
        world.symbols.string_resolve_mut("name", 0).unwrap().set("Bob");
        world.symbols.set_cinteger("volume", 3, 20);
        world.functions.resolve_mut("+take").unwrap().call_count = 9;
        world.object_mut(3).unwrap().slots[slot::STATE] = 4;

        let noun4 = restore_from_bytes(&mut world, &bytes).unwrap();
        assert_eq!(noun4, 2);
        assert_eq!(world.object(2).unwrap().parent(), 1);
        assert!(!world.object(2).unwrap().has(attribute::WORN));
        assert_eq!(world.symbols.integer("score"), 0);
        assert_eq!(world.symbols.string_resolve("name", 0).unwrap().value, "Ann");
        assert_eq!(world.symbols.cinteger_resolve("volume", 3), Some(100));
        assert_eq!(world.functions.resolve("+take").unwrap().call_count, 0);
        // nosave objects keep their runtime state
        assert_eq!(world.object(3).unwrap().slots[slot::STATE], 4);
    }

    #[test]
    fn mismatched_game_rejected() {
        let world = test_world();
        let bytes = save_to_bytes(&world, 0);
        let mut other = test_world();
        other.symbols.add_integer("extra", 1);
        let before = other.symbols.integer("score");
        assert!(matches!(
            restore_from_bytes(&mut other, &bytes),
            Err(CoreError::SnapshotMismatch { .. })
        ));
        assert_eq!(other.symbols.integer("score"), before);
    }

    #[test]
    fn truncated_image_rejected() {
        let mut world = test_world();
        let bytes = save_to_bytes(&world, 0);
        assert!(matches!(
            restore_from_bytes(&mut world, &bytes[..bytes.len() - 1]),
            Err(CoreError::SnapshotTruncated(_))
        ));
        assert!(restore_from_bytes(&mut world, &bytes[..8]).is_err());
    }
}

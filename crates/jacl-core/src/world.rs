//! The object arena and the registries that make up a loaded game.
//!
//! Undo keeps a single backup of the mutable state; see
//! [`World::save_state`] and [`World::restore_state`].

use indexmap::IndexMap;
use log::debug;

use crate::error::{CoreError, CoreResult};
use crate::function::FunctionTable;
use crate::grammar::Grammar;
use crate::object::{NOWHERE, Object, ObjectId};
use crate::symbols::SymbolTable;

/// Default limit on the number of objects.
pub const DEFAULT_MAX_OBJECTS: usize = 1000;

/// The loaded game: objects, symbols, functions and grammar.
///
/// Objects live in an arena addressed by [`ObjectId`] starting at 1.
#[derive(Debug, Clone)]
pub struct World {
    objects: Vec<Object>,
    labels: IndexMap<String, ObjectId>,
    max_objects: usize,
    /// Typed global registries.
    pub symbols: SymbolTable,
    /// Script functions.
    pub functions: FunctionTable,
    /// The command grammar trie.
    pub grammar: Grammar,
    /// The object the player controls.
    pub player: ObjectId,
    player_backup: ObjectId,
}

impl Default for World {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OBJECTS)
    }
}

impl World {
    pub fn new(max_objects: usize) -> Self {
        Self {
            objects: Vec::new(),
            labels: IndexMap::new(),
            max_objects,
            symbols: SymbolTable::new(),
            functions: FunctionTable::new(),
            grammar: Grammar::new(),
            player: NOWHERE,
            player_backup: NOWHERE,
        }
    }

    // -----------------------------------------------------------------------
    // Objects
    // -----------------------------------------------------------------------

    /// Add an object, returning its id.
    pub fn add_object(&mut self, object: Object) -> CoreResult<ObjectId> {
        if self.labels.contains_key(&object.label) {
            return Err(CoreError::DuplicateLabel(object.label));
        }
        if self.objects.len() >= self.max_objects {
            return Err(CoreError::TooManyObjects(self.max_objects));
        }
        self.objects.push(object);
        let id = self.object_count();
        let label = self.objects[self.objects.len() - 1].label.clone();
        debug!("object {label} = {id}");
        self.labels.insert(label, id);
        Ok(id)
    }

    /// Number of objects, which is also the highest valid id.
    pub fn object_count(&self) -> ObjectId {
        ObjectId::try_from(self.objects.len()).unwrap_or(ObjectId::MAX)
    }

    pub fn is_valid(&self, id: ObjectId) -> bool {
        id >= 1 && id <= self.object_count()
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        usize::try_from(id)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.objects.get(i))
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        usize::try_from(id)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.objects.get_mut(i))
    }

    pub fn object(&self, id: ObjectId) -> CoreResult<&Object> {
        self.get(id).ok_or(CoreError::ObjectOutOfRange(id))
    }

    pub fn object_mut(&mut self, id: ObjectId) -> CoreResult<&mut Object> {
        self.get_mut(id).ok_or(CoreError::ObjectOutOfRange(id))
    }

    /// Find an object by its label.
    pub fn find_label(&self, label: &str) -> Option<ObjectId> {
        self.labels.get(label).copied()
    }

    /// All valid object ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + use<> {
        1..=self.object_count()
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.ids().zip(self.objects.iter())
    }

    /// Label of `id`, or `"nowhere"`.
    pub fn label_of(&self, id: ObjectId) -> &str {
        self.get(id).map_or("nowhere", |o| o.label.as_str())
    }

    // -----------------------------------------------------------------------
    // Undo
    // -----------------------------------------------------------------------

    /// Copy the mutable state into the undo shadows.
    pub fn save_state(&mut self) {
        for object in self.objects.iter_mut().filter(|o| !o.nosave) {
            object.save_shadow();
        }
        for function in self.functions.iter_mut() {
            function.call_count_backup = function.call_count;
        }
        self.symbols.save_backups();
        self.player_backup = self.player;
    }

    /// Return to the state recorded by [`World::save_state`].
    pub fn restore_state(&mut self) {
        for object in self.objects.iter_mut().filter(|o| !o.nosave) {
            object.restore_shadow();
        }
        for function in self.functions.iter_mut() {
            function.call_count = function.call_count_backup;
        }
        self.symbols.restore_backups();
        self.player = self.player_backup;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute;
    use crate::object::slot;

    fn test_world() -> World {
        let mut world = World::default();
        world.add_object(Object::location("cave")).unwrap();
        world.add_object(Object::new("lamp")).unwrap();
        world
    }

    #[test]
    fn ids_start_at_one() {
        let world = test_world();
        assert_eq!(world.find_label("cave"), Some(1));
        assert_eq!(world.find_label("lamp"), Some(2));
        assert_eq!(world.object_count(), 2);
        assert!(world.get(0).is_none());
        assert!(world.get(3).is_none());
        assert_eq!(world.label_of(2), "lamp");
        assert_eq!(world.label_of(0), "nowhere");
    }

    #[test]
    fn duplicate_label_rejected() {
        let mut world = test_world();
        let result = world.add_object(Object::new("lamp"));
        assert!(matches!(result, Err(CoreError::DuplicateLabel(_))));
    }

    #[test]
    fn object_limit() {
        let mut world = World::new(1);
        world.add_object(Object::new("a")).unwrap();
        assert!(matches!(
            world.add_object(Object::new("b")),
            Err(CoreError::TooManyObjects(1))
        ));
    }

    #[test]
    fn undo_restores_everything() {
        let mut world = test_world();
        world.symbols.add_integer("score", 1);
        world.symbols.add_string("name", "lamp");
        world.player = 2;
        world.save_state();

        world.object_mut(2).unwrap().slots[slot::PARENT] = 1;
        world.object_mut(2).unwrap().attributes |= attribute::LUMINOUS;
        world.symbols.set_integer("score", 10);
        world
            .symbols
            .string_resolve_mut("name", 0)
            .unwrap()
            .set("torch");
        world.player = 1;
        world.restore_state();

        assert_eq!(world.object(2).unwrap().parent(), 0);
        assert!(!world.object(2).unwrap().has(attribute::LUMINOUS));
        assert_eq!(world.symbols.integer("score"), 1);
        assert_eq!(world.symbols.string_resolve("name", 0).unwrap().value, "lamp");
        assert_eq!(world.player, 2);
    }

    #[test]
    fn nosave_objects_skip_undo() {
        let mut world = test_world();
        world.object_mut(2).unwrap().nosave = true;
        world.save_state();
        world.object_mut(2).unwrap().slots[slot::STATE] = 7;
        world.restore_state();
        assert_eq!(world.object(2).unwrap().slots[slot::STATE], 7);
    }
}

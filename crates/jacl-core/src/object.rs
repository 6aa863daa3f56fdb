//! Objects: things and places with sixteen integer slots.

use serde::Serialize;

use crate::attribute::{self, Namespace};

/// Object identifier. `0` means *nowhere*; valid objects are `1..=objects`.
pub type ObjectId = i32;

/// The id meaning "no object".
pub const NOWHERE: ObjectId = 0;

/// Number of integer slots on every object.
pub const SLOT_COUNT: usize = 16;

/// Number of exit slots on a location (north through out).
pub const DIRECTION_COUNT: usize = 12;

/// Direction value meaning "no route".
pub const DIR_NONE: i32 = -1;

/// Mass of an object too heavy to carry.
pub const HEAVY: i32 = 99;
/// Mass of fixed scenery; the default for objects.
pub const SCENERY: i32 = 100;

/// Slot indices by their well-known names.
pub mod slot {
    pub const PARENT: usize = 0;
    pub const QUANTITY: usize = 1;
    pub const CAPACITY: usize = 1;
    pub const MASS: usize = 2;
    pub const BEARING: usize = 3;
    pub const VELOCITY: usize = 4;
    pub const NEXT: usize = 5;
    pub const PREVIOUS: usize = 6;
    pub const CHILD: usize = 7;
    pub const INDEX: usize = 8;
    pub const STATUS: usize = 9;
    pub const STATE: usize = 10;
    pub const COUNTER: usize = 11;
    pub const POINTS: usize = 12;
    pub const CLASS: usize = 13;
    pub const X: usize = 14;
    pub const Y: usize = 15;
}

/// Slot names registered as constants at load time.
pub const SLOT_NAMES: [(&str, usize); 17] = [
    ("parent", slot::PARENT),
    ("quantity", slot::QUANTITY),
    ("capacity", slot::CAPACITY),
    ("mass", slot::MASS),
    ("bearing", slot::BEARING),
    ("velocity", slot::VELOCITY),
    ("next", slot::NEXT),
    ("previous", slot::PREVIOUS),
    ("child", slot::CHILD),
    ("index", slot::INDEX),
    ("status", slot::STATUS),
    ("state", slot::STATE),
    ("counter", slot::COUNTER),
    ("points", slot::POINTS),
    ("class", slot::CLASS),
    ("x", slot::X),
    ("y", slot::Y),
];

/// Compass, vertical and in/out exits, in slot order.
pub const DIRECTIONS: [&str; DIRECTION_COUNT] = [
    "north",
    "south",
    "east",
    "west",
    "northeast",
    "northwest",
    "southeast",
    "southwest",
    "up",
    "down",
    "in",
    "out",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Shadow {
    attributes: u32,
    user_attributes: u32,
    slots: [i32; SLOT_COUNT],
}

/// A thing or place in the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Object {
    /// Unique identifier used in source and scripts.
    pub label: String,
    /// Indefinite article ("a", "an", "some").
    pub article: String,
    /// Definite article ("the").
    pub definite: String,
    /// Short display name used in lists.
    pub inventory: String,
    /// Text shown when the object is described in a room.
    pub described: String,
    /// Words the player may use to refer to the object.
    pub names: Vec<String>,
    /// Words referring to several such objects at once.
    pub plurals: Vec<String>,
    /// System attribute mask.
    pub attributes: u32,
    /// Author-declared attribute mask.
    pub user_attributes: u32,
    /// The sixteen integer slots; slot 0 is `parent`.
    pub slots: [i32; SLOT_COUNT],
    /// Excluded from save, restore and undo.
    pub nosave: bool,
    #[serde(skip)]
    shadow: Shadow,
}

impl Object {
    /// Create an object with the defaults a plain `object` declaration gets.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            article: "the".to_string(),
            definite: "the".to_string(),
            inventory: label.clone(),
            described: label.clone(),
            label,
            names: Vec::new(),
            plurals: Vec::new(),
            attributes: 0,
            user_attributes: 0,
            slots: [0; SLOT_COUNT],
            nosave: false,
            shadow: Shadow::default(),
        }
    }

    /// Create a location: the `LOCATION` bit set and no parent.
    pub fn location(label: impl Into<String>) -> Self {
        let mut obj = Self::new(label);
        obj.attributes |= attribute::LOCATION;
        obj
    }

    /// Whether this object is a location.
    pub fn is_location(&self) -> bool {
        self.attributes & attribute::LOCATION != 0
    }

    /// Whether any bit of the system mask `mask` is set.
    pub fn has(&self, mask: u32) -> bool {
        self.attributes & mask != 0
    }

    /// Set or clear `mask` in the given namespace, leaving every other bit
    /// alone.
    pub fn set_attribute(&mut self, namespace: Namespace, mask: u32, on: bool) {
        let bits = match namespace {
            Namespace::System => &mut self.attributes,
            Namespace::User => &mut self.user_attributes,
        };
        if on {
            *bits |= mask;
        } else {
            *bits &= !mask;
        }
    }

    /// Whether `mask` is set in the given namespace.
    pub fn has_attribute(&self, namespace: Namespace, mask: u32) -> bool {
        let bits = match namespace {
            Namespace::System => self.attributes,
            Namespace::User => self.user_attributes,
        };
        bits & mask != 0
    }

    /// The containment parent.
    pub fn parent(&self) -> ObjectId {
        self.slots[slot::PARENT]
    }

    /// Record the current state in the undo shadow.
    pub fn save_shadow(&mut self) {
        self.shadow = Shadow {
            attributes: self.attributes,
            user_attributes: self.user_attributes,
            slots: self.slots,
        };
    }

    /// Return to the state recorded by [`Object::save_shadow`].
    pub fn restore_shadow(&mut self) {
        self.attributes = self.shadow.attributes;
        self.user_attributes = self.shadow.user_attributes;
        self.slots = self.shadow.slots;
    }

    /// Whether `word` is one of this object's names.
    pub fn answers_to(&self, word: &str) -> bool {
        self.names.iter().any(|n| n == word)
    }

    /// Whether `word` is one of this object's plural names.
    pub fn answers_to_plural(&self, word: &str) -> bool {
        self.plurals.iter().any(|n| n == word)
    }
}

/// Slot index for a direction name.
pub fn direction_index(name: &str) -> Option<usize> {
    DIRECTIONS.iter().position(|d| *d == name)
}

//! System attribute bits and attribute namespaces.
//!
//! Every object carries two 32-bit masks. The system mask has 31 predefined
//! bits; locations reuse the low fourteen bits under their own names, so
//! `VISITED` and `CLOSED` are the same bit and which name applies depends on
//! whether the object is a location.

use serde::Serialize;

/// Which attribute mask a name resolves into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Namespace {
    /// The predefined system mask (`attributes`).
    System,
    /// The author-declared mask (`user_attributes`).
    User,
}

/// Highest bit value an attribute may take (2^30).
pub const MAX_ATTRIBUTE_BIT: u32 = 1 << 30;

pub const CLOSED: u32 = 1;
pub const LOCKED: u32 = 1 << 1;
pub const DEAD: u32 = 1 << 2;
pub const IGNITABLE: u32 = 1 << 3;
pub const WORN: u32 = 1 << 4;
pub const CONCEALING: u32 = 1 << 5;
pub const LUMINOUS: u32 = 1 << 6;
pub const WEARABLE: u32 = 1 << 7;
pub const CLOSABLE: u32 = 1 << 8;
pub const LOCKABLE: u32 = 1 << 9;
pub const ANIMATE: u32 = 1 << 10;
pub const LIQUID: u32 = 1 << 11;
pub const CONTAINER: u32 = 1 << 12;
pub const SURFACE: u32 = 1 << 13;
pub const PLURAL: u32 = 1 << 14;
pub const FLAMMABLE: u32 = 1 << 15;
pub const BURNING: u32 = 1 << 16;
pub const LOCATION: u32 = 1 << 17;
pub const ON: u32 = 1 << 18;
pub const DAMAGED: u32 = 1 << 19;
pub const FEMALE: u32 = 1 << 20;
pub const POSSESSIVE: u32 = 1 << 21;
pub const OUT_OF_REACH: u32 = 1 << 22;
pub const TOUCHED: u32 = 1 << 23;
pub const SCORED: u32 = 1 << 24;
pub const SITTING: u32 = 1 << 25;
pub const NPC: u32 = 1 << 26;
pub const DONE: u32 = 1 << 27;
pub const GAS: u32 = 1 << 28;
pub const NO_TAB: u32 = 1 << 29;
pub const NOT_IMPORTANT: u32 = 1 << 30;

// Location names for the shared low bits.
pub const VISITED: u32 = CLOSED;
pub const DARK: u32 = LOCKED;
pub const ON_WATER: u32 = DEAD;
pub const UNDER_WATER: u32 = IGNITABLE;
pub const WITHOUT_AIR: u32 = WORN;
pub const OUTDOORS: u32 = CONCEALING;
pub const MID_AIR: u32 = LUMINOUS;
pub const TIGHT_ROPE: u32 = WEARABLE;
pub const POLLUTED: u32 = CLOSABLE;
pub const SOLVED: u32 = LOCKABLE;
pub const MID_WATER: u32 = ANIMATE;
pub const DARKNESS: u32 = LIQUID;
pub const MAPPED: u32 = CONTAINER;
pub const KNOWN: u32 = SURFACE;

/// Object attribute names in bit order.
pub const OBJECT_ATTRIBUTES: [&str; 31] = [
    "CLOSED",
    "LOCKED",
    "DEAD",
    "IGNITABLE",
    "WORN",
    "CONCEALING",
    "LUMINOUS",
    "WEARABLE",
    "CLOSABLE",
    "LOCKABLE",
    "ANIMATE",
    "LIQUID",
    "CONTAINER",
    "SURFACE",
    "PLURAL",
    "FLAMMABLE",
    "BURNING",
    "LOCATION",
    "ON",
    "DAMAGED",
    "FEMALE",
    "POSSESSIVE",
    "OUT_OF_REACH",
    "TOUCHED",
    "SCORED",
    "SITTING",
    "NPC",
    "DONE",
    "GAS",
    "NO_TAB",
    "NOT_IMPORTANT",
];

/// Location attribute names for the low bits, in bit order.
pub const LOCATION_ATTRIBUTES: [&str; 14] = [
    "VISITED",
    "DARK",
    "ON_WATER",
    "UNDER_WATER",
    "WITHOUT_AIR",
    "OUTDOORS",
    "MID_AIR",
    "TIGHT_ROPE",
    "POLLUTED",
    "SOLVED",
    "MID_WATER",
    "DARKNESS",
    "MAPPED",
    "KNOWN",
];

/// Look up a system attribute by name, accepting both object and location names.
pub fn system_attribute(name: &str) -> Option<u32> {
    OBJECT_ATTRIBUTES
        .iter()
        .position(|n| *n == name)
        .or_else(|| LOCATION_ATTRIBUTES.iter().position(|n| *n == name))
        .map(|bit| 1 << bit)
}

/// Names of the system attributes set in `mask`, using location names for
/// the shared bits when `is_location` is true.
pub fn system_attribute_names(mask: u32, is_location: bool) -> Vec<&'static str> {
    let mut names = Vec::new();
    for (bit, name) in OBJECT_ATTRIBUTES.iter().enumerate() {
        if mask & (1 << bit) == 0 {
            continue;
        }
        if is_location && bit < LOCATION_ATTRIBUTES.len() {
            names.push(LOCATION_ATTRIBUTES[bit]);
        } else {
            names.push(*name);
        }
    }
    names
}

//! Containment, scope, light and routing queries over a [`World`].

use std::collections::{HashMap, VecDeque};

use crate::attribute::{self, Namespace};
use crate::error::{CoreError, CoreResult};
use crate::object::{DIR_NONE, DIRECTION_COUNT, NOWHERE, ObjectId, slot};
use crate::world::World;

/// Whether a containment walk may see through closed or concealing objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Stop at closed containers and concealing objects.
    Restricted,
    /// Follow every parent link.
    Unrestricted,
}

/// Whether `child` is `parent` or lies somewhere beneath it.
///
/// A location's slot 0 is its north exit, not a container, so the walk never
/// continues upward from a location. Broken or cyclic chains yield `false`.
pub fn parent_of(world: &World, parent: ObjectId, child: ObjectId, walk: Walk) -> bool {
    if !world.is_valid(child) {
        return false;
    }
    let mut current = child;
    for _ in 0..=world.object_count() {
        if current == parent {
            return true;
        }
        let Some(object) = world.get(current) else {
            return false;
        };
        if object.is_location() {
            return false;
        }
        if current != child
            && walk == Walk::Restricted
            && object.has(attribute::CLOSED | attribute::CONCEALING)
        {
            return false;
        }
        current = object.parent();
        if current == NOWHERE {
            return parent == NOWHERE;
        }
    }
    false
}

/// Walk up from `child` to the location that ultimately holds it.
///
/// With `objects_only`, return the outermost non-location on the way
/// instead. An object with no location above it yields 0 (or itself when
/// `objects_only`).
pub fn grand_of(world: &World, child: ObjectId, objects_only: bool) -> CoreResult<ObjectId> {
    let mut current = child;
    let mut last_object = NOWHERE;
    for _ in 0..=world.object_count() {
        let object = world.get(current).ok_or(CoreError::BadParent(child))?;
        if object.is_location() {
            return Ok(if objects_only { last_object } else { current });
        }
        last_object = current;
        let next = object.parent();
        if next == NOWHERE {
            return Ok(if objects_only { last_object } else { NOWHERE });
        }
        current = next;
    }
    Err(CoreError::BadParent(child))
}

/// The location the player is in.
pub fn get_here(world: &World) -> CoreResult<ObjectId> {
    if !world.is_valid(world.player) {
        return Err(CoreError::BadPlayer(world.player));
    }
    let here = grand_of(world, world.player, false)?;
    if here == NOWHERE {
        return Err(CoreError::BadParent(world.player));
    }
    Ok(here)
}

/// Test `object` against a scope criterion.
///
/// Returns `None` when the criterion is not a scope keyword, attribute or
/// object label.
pub fn scope(world: &World, object: ObjectId, criterion: &str) -> CoreResult<Option<bool>> {
    let name = criterion.strip_prefix('*').unwrap_or(criterion);
    let here = get_here(world)?;
    let player = world.player;
    let result = match name {
        "present" => {
            object == here
                || parent_of(world, here, object, Walk::Restricted)
        }
        "here" => world.get(object).is_some_and(|o| o.parent() == here && !o.is_location()),
        "held" => object != player && parent_of(world, player, object, Walk::Restricted),
        "inside" => {
            let parent = world.get(object).map_or(NOWHERE, |o| o.parent());
            parent != here
                && parent != player
                && world.get(parent).is_some_and(|p| !p.is_location())
                && parent_of(world, here, object, Walk::Restricted)
        }
        "location" => world.get(object).is_some_and(|o| o.is_location()),
        "anywhere" => world.is_valid(object),
        _ => {
            if let Some((namespace, mask)) = world.symbols.attribute_resolve(name) {
                let Some(o) = world.get(object) else {
                    return Ok(Some(false));
                };
                match namespace {
                    Namespace::System => o.attributes & mask != 0,
                    Namespace::User => o.user_attributes & mask != 0,
                }
            } else if let Some(container) = world.find_label(name) {
                object != container && parent_of(world, container, object, Walk::Restricted)
            } else {
                return Ok(None);
            }
        }
    };
    Ok(Some(result))
}

/// Whether `location` is lit: not dark, or holding a luminous object that is
/// present there.
pub fn check_light(world: &World, location: ObjectId) -> bool {
    let Some(place) = world.get(location) else {
        return false;
    };
    if !place.has(attribute::DARK) {
        return true;
    }
    world.objects().any(|(id, o)| {
        id != location
            && o.has(attribute::LUMINOUS)
            && parent_of(world, location, id, Walk::Restricted)
    })
}

/// First step from `from` toward `to` along a shortest path of exits, or
/// [`DIR_NONE`].
///
/// With `known_only`, only locations carrying `KNOWN` are expanded.
pub fn find_route(world: &World, from: ObjectId, to: ObjectId, known_only: bool) -> i32 {
    if from == to || !world.is_valid(from) || !world.is_valid(to) {
        return DIR_NONE;
    }

    // location -> first direction taken from `from`
    let mut first_step: HashMap<ObjectId, i32> = HashMap::new();
    let mut queue = VecDeque::new();
    first_step.insert(from, DIR_NONE);
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        let Some(place) = world.get(current) else {
            continue;
        };
        if !place.is_location() {
            continue;
        }
        let inherited = first_step.get(&current).copied().unwrap_or(DIR_NONE);
        for (dir, &next) in place.slots[..DIRECTION_COUNT].iter().enumerate() {
            let Some(target) = world.get(next) else {
                continue;
            };
            if first_step.contains_key(&next) || !target.is_location() {
                continue;
            }
            if known_only && !target.has(attribute::KNOWN) {
                continue;
            }
            let step = if current == from {
                i32::try_from(dir).unwrap_or(DIR_NONE)
            } else {
                inherited
            };
            if next == to {
                return step;
            }
            first_step.insert(next, step);
            queue.push_back(next);
        }
    }
    DIR_NONE
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Straight-line distance between two points, truncated.
pub fn distance(x1: i32, y1: i32, x2: i32, y2: i32) -> i32 {
    let dx = f64::from(x2) - f64::from(x1);
    let dy = f64::from(y2) - f64::from(y1);
    dx.hypot(dy) as i32
}

/// Compass bearing in degrees (0 = north, clockwise) from the first point
/// to the second.
pub fn bearing(x1: i32, y1: i32, x2: i32, y2: i32) -> i32 {
    let dx = f64::from(x2) - f64::from(x1);
    let dy = f64::from(y2) - f64::from(y1);
    if dx == 0.0 && dy == 0.0 {
        return 0;
    }
    let degrees = dx.atan2(dy).to_degrees();
    (degrees.round() as i32).rem_euclid(360)
}

/// Advance `(x, y)` by `velocity` units along `bearing` degrees.
pub fn new_position(x: i32, y: i32, bearing: i32, velocity: i32) -> (i32, i32) {
    let radians = f64::from(bearing).to_radians();
    let v = f64::from(velocity);
    let nx = f64::from(x) + v * radians.sin();
    let ny = f64::from(y) + v * radians.cos();
    (nx.round() as i32, ny.round() as i32)
}

/// Move `object` by its own bearing and velocity slots.
pub fn advance(world: &mut World, object: ObjectId) -> CoreResult<()> {
    let o = world.object_mut(object)?;
    let (x, y) = new_position(
        o.slots[slot::X],
        o.slots[slot::Y],
        o.slots[slot::BEARING],
        o.slots[slot::VELOCITY],
    );
    o.slots[slot::X] = x;
    o.slots[slot::Y] = y;
    Ok(())
}

//! Line of sight, cover, and creature visibility
//!
//! The ray walk is canonicalised (endpoints are ordered before tracing) so
//! that visibility between two cells is symmetric by construction; plain
//! Bresenham traces slightly different cells in each direction.

use crate::core::types::Position;
use crate::creature::Creature;
use crate::world::World;

/// Cells of the Bresenham line from `a` to `b`, inclusive of both endpoints,
/// always listed starting at `a`.
pub fn line(a: Position, b: Position) -> Vec<Position> {
    // Canonical direction: trace from the lexicographically smaller endpoint
    // so (a, b) and (b, a) visit the same cell set.
    if (b.y, b.x) < (a.y, a.x) {
        let mut cells = line(b, a);
        cells.reverse();
        return cells;
    }

    let mut cells = Vec::with_capacity(a.chebyshev(b) as usize + 1);
    let dx = (b.x - a.x).abs();
    let dy = -(b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut current = a;
    loop {
        cells.push(current);
        if current == b {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            current.x += sx;
        }
        if e2 <= dx {
            err += dx;
            current.y += sy;
        }
    }
    cells
}

/// Whether `to` can be seen from `from` with the given vision radius.
///
/// A cell always sees itself; zero vision sees nothing else. Only cells
/// strictly between the endpoints can block the ray.
pub fn is_visible(world: &World, from: Position, to: Position, vision: i32) -> bool {
    if from == to {
        return true;
    }
    if from.distance_sq(to) > (vision as i64) * (vision as i64) {
        return false;
    }
    let ray = line(from, to);
    ray[1..ray.len() - 1]
        .iter()
        .all(|cell| !world.blocks_vision(*cell))
}

/// Whether `target` is behind cover relative to `observer`: the last
/// non-target cell of the sight line either blocks vision or carries a
/// cover-providing item.
pub fn behind_cover(world: &World, observer: Position, target: Position) -> bool {
    if observer == target {
        return false;
    }
    let ray = line(observer, target);
    let last = ray[ray.len() - 2];
    if world.blocks_vision(last) {
        return true;
    }
    world
        .tile_at(last)
        .map(|t| t.has_cover_item())
        .unwrap_or(false)
}

/// Creature-level visibility: geometric sight, except that a crouching
/// target behind cover stays hidden. Crime witnessing uses the geometric
/// [`is_visible`] on the crime location, not this.
pub fn can_see_creature(world: &World, observer: &Creature, target: &Creature) -> bool {
    if !is_visible(world, observer.pos, target.pos, observer.vision) {
        return false;
    }
    !(target.crouching && behind_cover(world, observer.pos, target.pos))
}

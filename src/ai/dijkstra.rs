//! Dijkstra flow-field maps and weighted step selection
//!
//! Each goal produces a local cost grid over the actor's vision window:
//! goal cells start at zero, everything else at a sentinel, and costs relax
//! through passable cells until fixpoint, 8-connected with unit steps. A
//! role combines several maps into one weighted score; the actor steps onto
//! the neighbouring cell (or stays) with the minimum combined score.
//! Positive weights attract, negative weights repel.

use ordered_float::OrderedFloat;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::types::{Position, DIRECTIONS};
use crate::creature::Creature;
use crate::world::World;

/// One goal's cost field over a (2d+1)² window centred on the actor
#[derive(Debug, Clone)]
pub struct GoalMap {
    origin: Position,
    side: i32,
    sentinel: i32,
    cost: Vec<i32>,
}

impl GoalMap {
    /// Computes the flow field for one goal predicate.
    pub fn compute<F>(world: &World, center: Position, vision: i32, is_goal: F) -> Self
    where
        F: Fn(Position) -> bool,
    {
        let side = 2 * vision + 1;
        let sentinel = side * side;
        let origin = Position::new(center.x - vision, center.y - vision);
        let mut cost = vec![sentinel; (side * side) as usize];

        for ly in 0..side {
            for lx in 0..side {
                let p = Position::new(origin.x + lx, origin.y + ly);
                if world.in_bounds(p) && is_goal(p) {
                    cost[(ly * side + lx) as usize] = 0;
                }
            }
        }

        // Relax to fixpoint. The window is small enough that repeated
        // sweeps beat maintaining a priority queue.
        let mut changed = true;
        while changed {
            changed = false;
            for ly in 0..side {
                for lx in 0..side {
                    let p = Position::new(origin.x + lx, origin.y + ly);
                    if !world.is_passable(p) {
                        continue;
                    }
                    let mut best = i32::MAX;
                    for (dx, dy) in DIRECTIONS {
                        let nx = lx + dx;
                        let ny = ly + dy;
                        if nx < 0 || ny < 0 || nx >= side || ny >= side {
                            continue;
                        }
                        best = best.min(cost[(ny * side + nx) as usize]);
                    }
                    let slot = (ly * side + lx) as usize;
                    if best != i32::MAX && best + 1 < cost[slot] {
                        cost[slot] = best + 1;
                        changed = true;
                    }
                }
            }
        }

        Self {
            origin,
            side,
            sentinel,
            cost,
        }
    }

    pub fn sentinel(&self) -> i32 {
        self.sentinel
    }

    /// Cost at a world cell; cells outside the window read as the sentinel.
    pub fn cost_at(&self, p: Position) -> i32 {
        let lx = p.x - self.origin.x;
        let ly = p.y - self.origin.y;
        if lx < 0 || ly < 0 || lx >= self.side || ly >= self.side {
            return self.sentinel;
        }
        self.cost[(ly * self.side + lx) as usize]
    }
}

/// A goal map with its role-specific weight
#[derive(Debug, Clone)]
pub struct WeightedMap {
    pub weight: f32,
    pub map: GoalMap,
}

impl WeightedMap {
    pub fn new(weight: f32, map: GoalMap) -> Self {
        Self { weight, map }
    }
}

/// Combined score of one cell under all weighted maps.
pub fn score_at(maps: &[WeightedMap], p: Position) -> f32 {
    maps.iter()
        .map(|wm| wm.weight * wm.map.cost_at(p) as f32)
        .sum()
}

/// Picks the next cell: the actor's own cell and its passable, in-bounds
/// neighbours are scored; cells holding another creature only qualify when
/// `allow_occupied` blesses the occupant (an attack target, a mount). Ties
/// break on the RNG stream. `None` means stay put.
pub fn choose_step<F>(
    world: &World,
    rng: &mut ChaCha8Rng,
    from: Position,
    maps: &[WeightedMap],
    allow_occupied: F,
) -> Option<Position>
where
    F: Fn(&Creature) -> bool,
{
    let mut candidates = vec![from];
    for neighbour in from.neighbours() {
        let Some(tile) = world.tile_at(neighbour) else {
            continue;
        };
        if !tile.is_passable() {
            continue;
        }
        if let Some(occupant) = tile.occupant() {
            let allowed = world
                .creature(occupant)
                .map(|c| allow_occupied(c))
                .unwrap_or(false);
            if !allowed {
                continue;
            }
        }
        candidates.push(neighbour);
    }

    let best = candidates
        .iter()
        .map(|p| OrderedFloat(score_at(maps, *p)))
        .min()?;
    let tied: Vec<Position> = candidates
        .into_iter()
        .filter(|p| OrderedFloat(score_at(maps, *p)) == best)
        .collect();
    let chosen = tied[rng.gen_range(0..tied.len())];
    if chosen == from {
        None
    } else {
        Some(chosen)
    }
}

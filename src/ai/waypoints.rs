//! Waypoint goal selectors
//!
//! A selector answers "where am I headed" for wandering creatures: a random
//! spot nearby, the next stop of a fixed patrol, or a random cell inside a
//! home area (a townsman's street, a shopkeeper's floor). Selectors re-pick
//! when the goal is reached, drawing from the simulation RNG stream.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{Area, Position};
use crate::world::World;

const PICK_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaypointSelector {
    /// Wander: random passable cells within a radius of wherever we are
    Random { current: Option<Position> },
    /// Walk a fixed loop of stops
    Patrol { points: Vec<Position>, next: usize },
    /// Random passable cells inside a home area
    WithinArea {
        area: Area,
        current: Option<Position>,
    },
}

impl WaypointSelector {
    pub fn random() -> Self {
        WaypointSelector::Random { current: None }
    }

    pub fn patrol(points: Vec<Position>) -> Self {
        WaypointSelector::Patrol { points, next: 0 }
    }

    pub fn within(area: Area) -> Self {
        WaypointSelector::WithinArea {
            area,
            current: None,
        }
    }

    /// The current goal cell, re-picked once reached. `None` when no
    /// suitable cell could be found this tick.
    pub fn target(
        &mut self,
        world: &World,
        rng: &mut ChaCha8Rng,
        from: Position,
        wander_radius: i32,
    ) -> Option<Position> {
        match self {
            WaypointSelector::Random { current } => {
                if current.is_none() || *current == Some(from) {
                    let reach = Area::new(
                        Position::new(from.x - wander_radius, from.y - wander_radius),
                        Position::new(from.x + wander_radius, from.y + wander_radius),
                    );
                    *current = pick_passable(world, rng, &reach, Some(from));
                }
                *current
            }
            WaypointSelector::Patrol { points, next } => {
                if points.is_empty() {
                    return None;
                }
                if points[*next] == from {
                    *next = (*next + 1) % points.len();
                }
                Some(points[*next])
            }
            WaypointSelector::WithinArea { area, current } => {
                if current.is_none() || *current == Some(from) {
                    *current = pick_passable(world, rng, area, Some(from));
                }
                *current
            }
        }
    }
}

/// Samples the area for a passable cell other than `exclude`. Gives up
/// after a bounded number of draws so a walled-in creature cannot stall
/// the tick.
fn pick_passable(
    world: &World,
    rng: &mut ChaCha8Rng,
    area: &Area,
    exclude: Option<Position>,
) -> Option<Position> {
    for _ in 0..PICK_ATTEMPTS {
        let candidate = area.random_cell(rng);
        if Some(candidate) == exclude {
            continue;
        }
        if world.is_passable(candidate) {
            return Some(candidate);
        }
    }
    None
}

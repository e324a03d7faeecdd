//! Role AI: per-variant action selection
//!
//! One planner entry point dispatches on the creature's AI tag. Each role
//! composes its goal maps with role-specific weights, picks the best step,
//! and translates that step into a concrete action: walking, a melee swing
//! when the chosen cell holds the quarry, a mount-up when it holds a free
//! horse. The turn loop clones the AI state out, plans against an immutable
//! world, and writes the state back.

use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::ai::dijkstra::{choose_step, WeightedMap};
use crate::ai::goals;
use crate::ai::waypoints::WaypointSelector;
use crate::core::context::SimulationContext;
use crate::core::types::{CreatureId, Position};
use crate::creature::Creature;
use crate::world::visibility::{can_see_creature, is_visible};
use crate::world::World;

/// Role-specific AI state, one variant per disposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AiState {
    /// Driven by the player action queue, not the planner
    Player,
    /// Harmless wildlife: wanders
    Animal { waypoints: WaypointSelector },
    /// Wildlife that hunts the player on sight
    AggressiveAnimal { waypoints: WaypointSelector },
    /// Hunts the player, shoots when armed, grabs a horse when afoot
    Bandit { waypoints: WaypointSelector },
    /// Walks its patch; flees the player once the player turns hostile
    Townsman {
        waypoints: WaypointSelector,
        player_hostile: bool,
    },
    /// Hunts whoever is on the office ledger
    Sheriff { office: usize },
    /// Keeps to the shop floor and greets customers
    Shopkeeper {
        waypoints: WaypointSelector,
        greeted: bool,
    },
    /// Rideable; wanders while riderless, carried while ridden
    Mount { waypoints: WaypointSelector },
}

/// Picks one action for one actor. `ai` is the actor's state, cloned out by
/// the turn loop so the planner can advance waypoints and dialogue flags
/// while reading the world.
pub fn decide(
    world: &World,
    ctx: &mut SimulationContext,
    id: &CreatureId,
    ai: &mut AiState,
) -> Action {
    let Some(actor) = world.creature(id) else {
        return Action::NoAction;
    };
    match ai {
        AiState::Player => Action::NoAction,
        AiState::Animal { waypoints } => wander(world, ctx, actor, waypoints),
        AiState::AggressiveAnimal { waypoints } | AiState::Bandit { waypoints } => {
            hostile(world, ctx, actor, waypoints)
        }
        AiState::Townsman {
            waypoints,
            player_hostile,
        } => townsman(world, ctx, actor, waypoints, *player_hostile),
        AiState::Sheriff { office } => sheriff(world, ctx, actor, *office),
        AiState::Shopkeeper { waypoints, greeted } => {
            shopkeeper(world, ctx, actor, waypoints, greeted)
        }
        AiState::Mount { waypoints } => {
            if actor.is_ridden() {
                // The rider spends this creature's movement.
                Action::NoAction
            } else {
                wander(world, ctx, actor, waypoints)
            }
        }
    }
}

/// Translates a chosen step into an action, reading what sits on the cell.
fn step_to_action<F>(
    world: &World,
    ctx: &mut SimulationContext,
    actor: &Creature,
    maps: &[WeightedMap],
    allow_occupied: F,
) -> Action
where
    F: Fn(&Creature) -> bool,
{
    match choose_step(world, &mut ctx.rng, actor.pos, maps, allow_occupied) {
        Some(cell) => {
            if let Some(occupant) = world.creature_at(cell) {
                if occupant.is_mount() && !occupant.is_ridden() {
                    return Action::Mount {
                        mount: occupant.id().clone(),
                    };
                }
                return Action::MeleeAttack {
                    target: occupant.id().clone(),
                };
            }
            if actor.mount.is_some() {
                Action::MountedMove { to: cell }
            } else {
                Action::Move { to: cell }
            }
        }
        None => Action::NoAction,
    }
}

/// Waypoint-only behaviour shared by animals, mounts and idle roles.
fn wander(
    world: &World,
    ctx: &mut SimulationContext,
    actor: &Creature,
    waypoints: &mut WaypointSelector,
) -> Action {
    let radius = ctx.config.wander_radius;
    let Some(goal) = waypoints.target(world, &mut ctx.rng, actor.pos, radius) else {
        return Action::NoAction;
    };
    let maps = [WeightedMap::new(
        1.0,
        goals::chase_map(world, actor.pos, actor.vision, goal),
    )];
    step_to_action(world, ctx, actor, &maps, |_| false)
}

/// The first live player creature in sight, if any.
fn visible_player<'a>(world: &'a World, actor: &Creature) -> Option<&'a Creature> {
    world
        .creatures()
        .find(|c| c.is_player() && can_see_creature(world, actor, c))
}

/// Bandits and aggressive animals: shoot when possible, close in otherwise,
/// favouring covered approaches and a free horse when afoot.
fn hostile(
    world: &World,
    ctx: &mut SimulationContext,
    actor: &Creature,
    waypoints: &mut WaypointSelector,
) -> Action {
    let Some(target) = visible_player(world, actor) else {
        return wander(world, ctx, actor, waypoints);
    };
    let quarry = target.pos;

    if let Some(weapon) = actor.ranged_weapon() {
        let in_range = actor.pos.distance_sq(quarry) <= (weapon.range as i64).pow(2)
            && is_visible(world, actor.pos, quarry, weapon.range);
        if weapon.rounds_loaded() > 0 && in_range && !actor.pos.is_adjacent(quarry) {
            return Action::RangedAttack {
                target: target.id().clone(),
            };
        }
        if weapon.rounds_loaded() == 0 && actor.inventory.iter().any(|i| i.is_ammo_for(weapon)) {
            return Action::Load;
        }
    }

    let mut maps = vec![
        WeightedMap::new(1.0, goals::chase_map(world, actor.pos, actor.vision, quarry)),
        WeightedMap::new(0.5, goals::cover_map(world, actor.pos, actor.vision, quarry)),
    ];
    let seeks_mount = actor.human && actor.mount.is_none();
    if seeks_mount {
        maps.push(WeightedMap::new(
            0.5,
            goals::mount_map(world, actor.pos, actor.vision),
        ));
    }

    let target_id = target.id().clone();
    step_to_action(world, ctx, actor, &maps, move |occupant: &Creature| {
        occupant.id() == &target_id
            || (seeks_mount && occupant.is_mount() && !occupant.is_ridden())
    })
}

/// Townsfolk: tidy the street, walk the patch, run from a hostile player.
fn townsman(
    world: &World,
    ctx: &mut SimulationContext,
    actor: &Creature,
    waypoints: &mut WaypointSelector,
    player_hostile: bool,
) -> Action {
    let underfoot = world.items_at(actor.pos);
    if !underfoot.is_empty() && underfoot.iter().all(|i| i.owner.is_none()) {
        return Action::Pickup;
    }

    let mut maps = Vec::new();
    if let Some(goal) = waypoints.target(world, &mut ctx.rng, actor.pos, ctx.config.wander_radius)
    {
        maps.push(WeightedMap::new(
            1.0,
            goals::chase_map(world, actor.pos, actor.vision, goal),
        ));
    }
    // Stray goods on the street pull an errand off course a little.
    maps.push(WeightedMap::new(
        0.5,
        goals::items_map(world, actor.pos, actor.vision, true),
    ));
    if player_hostile {
        if let Some(player) = visible_player(world, actor) {
            maps.push(WeightedMap::new(
                -1.0,
                goals::chase_map(world, actor.pos, actor.vision, player.pos),
            ));
        }
    }
    if maps.is_empty() {
        return Action::NoAction;
    }
    step_to_action(world, ctx, actor, &maps, |_| false)
}

/// The sheriff hunts the first visible name on the ledger, from cover.
fn sheriff(
    world: &World,
    ctx: &mut SimulationContext,
    actor: &Creature,
    office_idx: usize,
) -> Action {
    let Some(office) = world.offices.get(office_idx) else {
        return Action::NoAction;
    };
    let Some(criminal) = goals::bounty_target(world, office, actor) else {
        return Action::NoAction;
    };
    if actor.pos.is_adjacent(criminal.pos) {
        return Action::MeleeAttack {
            target: criminal.id().clone(),
        };
    }
    let maps = [
        WeightedMap::new(
            1.0,
            goals::chase_map(world, actor.pos, actor.vision, criminal.pos),
        ),
        WeightedMap::new(
            0.5,
            goals::cover_map(world, actor.pos, actor.vision, criminal.pos),
        ),
    ];
    let wanted = criminal.id().clone();
    step_to_action(world, ctx, actor, &maps, move |occupant: &Creature| {
        occupant.id() == &wanted
    })
}

/// Shopkeepers keep to the floor and greet whoever walks up to the counter.
fn shopkeeper(
    world: &World,
    ctx: &mut SimulationContext,
    actor: &Creature,
    waypoints: &mut WaypointSelector,
    greeted: &mut bool,
) -> Action {
    let player_adjacent = world
        .creatures()
        .any(|c| c.is_player() && c.pos.is_adjacent(actor.pos));
    if player_adjacent {
        if !*greeted {
            *greeted = true;
            ctx.messages
                .enqueue(format!("{} says: \"What'll it be, stranger?\"", actor.name));
        }
        return Action::NoAction;
    }
    *greeted = false;
    wander(world, ctx, actor, waypoints)
}

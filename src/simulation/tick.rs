//! The turn loop: one world tick
//!
//! Each tick runs the creatures in initiative order and, per creature:
//! 1. Advance the player's hunger and thirst on their cadence.
//! 2. Apply attribute effects; a creature killed by them drops its remains
//!    and does not act.
//! 3. Skip ridden mounts; their riders spend their movement.
//! 4. Obtain one action (the player queue, or the role planner) and execute
//!    it. Planner precondition failures are swallowed; player ones become a
//!    message and do not consume the turn.
//! 5. Dispatch every event the action raised before the next actor runs.
//! 6. A successful MountedMove grants the rider one extra action.
//! After the roster: reset mount movement flags, null stale mount links,
//! advance the tick counter.

use std::collections::VecDeque;

use crate::actions::{self, Action};
use crate::ai::roles;
use crate::core::context::SimulationContext;
use crate::core::types::{CreatureId, Tick};
use crate::creature::attributes::{HUNGER, THIRST};
use crate::events::Subscriber;
use crate::world::World;

/// What the driver learns from one tick
#[derive(Debug, Clone, Copy)]
pub struct TickOutcome {
    /// Index of the tick that just ran
    pub tick: Tick,
    /// Whether a queued player action was executed successfully
    pub player_turn_consumed: bool,
}

/// Runs one world tick. Player actions are drained from the queue: one when
/// the player's turn comes up, and one more after a successful MountedMove.
pub fn tick(
    world: &mut World,
    ctx: &mut SimulationContext,
    player_actions: &mut VecDeque<Action>,
) -> TickOutcome {
    // Offices added since the last tick join the bus; subscription is
    // idempotent, so re-subscribing the rest is free.
    for office in 0..world.offices.len() {
        ctx.events.subscribe(Subscriber::SheriffOffice(office));
    }

    let mut outcome = TickOutcome {
        tick: world.tick,
        player_turn_consumed: false,
    };

    for id in world.initiative_order() {
        if !world.creature(&id).map(|c| c.alive).unwrap_or(false) {
            // Died earlier this tick.
            continue;
        }

        advance_survival(world, ctx, &id);

        if let Some(creature) = world.creature_mut(&id) {
            creature.update_attributes();
        }
        let effect_death = world.creature(&id).map(|c| c.death_due()).unwrap_or(false);
        if effect_death {
            if let Err(error) = world.kill_creature(&id) {
                tracing::error!(%id, %error, "death cleanup failed");
            }
            dispatch(world, ctx);
            continue;
        }

        let (is_player, carried) = match world.creature(&id) {
            Some(c) => (c.is_player(), c.is_mount() && c.is_ridden()),
            None => continue,
        };
        if carried {
            continue;
        }

        let action = if is_player {
            player_actions.pop_front()
        } else {
            Some(plan(world, ctx, &id))
        };
        let Some(action) = action else {
            continue;
        };
        let rode = matches!(action, Action::MountedMove { .. });
        let done = run_action(world, ctx, &id, action, is_player, &mut outcome);
        dispatch(world, ctx);

        // The mount spent its turn; the rider still has their own.
        if done && rode {
            let extra = if is_player {
                player_actions.pop_front()
            } else {
                Some(plan(world, ctx, &id))
            };
            if let Some(extra) = extra {
                run_action(world, ctx, &id, extra, is_player, &mut outcome);
                dispatch(world, ctx);
            }
        }
    }

    end_of_tick(world);
    world.tick += 1;
    outcome
}

/// Hunger and thirst creep up on their configured cadence; only the player
/// carries the attributes, and only the player starves.
fn advance_survival(world: &mut World, ctx: &SimulationContext, id: &CreatureId) {
    let due = |interval: u64| interval > 0 && (world.tick + 1) % interval == 0;
    let hunger_due = due(ctx.config.hunger_interval);
    let thirst_due = due(ctx.config.thirst_interval);
    if !hunger_due && !thirst_due {
        return;
    }
    if let Some(creature) = world.creature_mut(id) {
        if hunger_due {
            if let Some(hunger) = creature.attributes.get_mut(HUNGER) {
                hunger.adjust(1);
            }
        }
        if thirst_due {
            if let Some(thirst) = creature.attributes.get_mut(THIRST) {
                thirst.adjust(1);
            }
        }
    }
}

/// One planner decision, with the AI state cloned out and written back.
fn plan(world: &mut World, ctx: &mut SimulationContext, id: &CreatureId) -> Action {
    let Some(creature) = world.creature(id) else {
        return Action::NoAction;
    };
    let mut ai = creature.ai.clone();
    let action = roles::decide(world, ctx, id, &mut ai);
    if let Some(creature) = world.creature_mut(id) {
        creature.ai = ai;
    }
    action
}

/// Executes an action under the error policy. Returns whether it succeeded.
fn run_action(
    world: &mut World,
    ctx: &mut SimulationContext,
    id: &CreatureId,
    action: Action,
    is_player: bool,
    outcome: &mut TickOutcome,
) -> bool {
    match actions::execute(world, ctx, id, action) {
        Ok(()) => {
            if is_player {
                outcome.player_turn_consumed = true;
            }
            true
        }
        Err(error) if error.is_precondition() => {
            if is_player {
                // "Never mind": surface the refusal, keep the turn.
                ctx.messages.enqueue(error.to_string());
            } else {
                tracing::trace!(%id, %error, "planner action refused");
            }
            false
        }
        Err(error) => {
            debug_assert!(false, "action failed fatally: {}", error);
            tracing::error!(%id, %error, "action failed");
            false
        }
    }
}

fn dispatch(world: &mut World, ctx: &mut SimulationContext) {
    let SimulationContext {
        events,
        rng,
        config,
        ..
    } = ctx;
    events.dispatch(world, rng, config);
}

/// Per-tick flag resets and mount reaping.
fn end_of_tick(world: &mut World) {
    for id in world.creature_ids() {
        let stale_mount = world
            .creature(&id)
            .and_then(|c| c.mount.as_ref())
            .map(|m| world.creature(m).map(|m| !m.alive).unwrap_or(true))
            .unwrap_or(false);
        let stale_rider = world
            .creature(&id)
            .and_then(|c| c.rider.as_ref())
            .map(|r| world.creature(r).map(|r| !r.alive).unwrap_or(true))
            .unwrap_or(false);
        if let Some(creature) = world.creature_mut(&id) {
            creature.moved_this_tick = false;
            if stale_mount {
                creature.mount = None;
            }
            if stale_rider {
                creature.rider = None;
            }
        }
    }
}

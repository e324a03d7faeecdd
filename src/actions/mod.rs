//! Actions: everything a creature can do with its turn
//!
//! Execution enforces each action's preconditions against the live world and
//! emits events as side effects. Precondition failures leave the world
//! untouched; the turn loop decides whether to swallow them (planner actors)
//! or surface them to the player.

pub mod attack;
pub mod items;

use crate::core::context::SimulationContext;
use crate::core::error::{GulchError, Result};
use crate::core::types::{CreatureId, Position, DIRECTIONS};
use crate::world::World;

/// One discrete thing a creature does with its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Move { to: Position },
    /// Ride the mount one step; counts as the mount's turn
    MountedMove { to: Position },
    MeleeAttack { target: CreatureId },
    RangedAttack { target: CreatureId },
    /// Lift everything on the current cell, encumbrance permitting
    Pickup,
    /// Drop the inventory item at this index onto the current cell
    Drop { item: usize },
    Consume { item: usize },
    /// Toggle the adjacent door at this cell
    Open { at: Position },
    /// Work the lock of the adjacent door with the inventory key at `key`
    Lock { at: Position, key: usize },
    /// Fill the equipped weapon from carried ammo
    Load,
    Mount { mount: CreatureId },
    Dismount,
    Pickpocket { target: CreatureId },
    Crouch,
    Standup,
    NoAction,
}

/// Executes one action for one actor. Events raised land on the context's
/// bus; the caller dispatches them before the next actor runs.
pub fn execute(
    world: &mut World,
    ctx: &mut SimulationContext,
    actor: &CreatureId,
    action: Action,
) -> Result<()> {
    let alive = world.creature(actor).map(|c| c.alive).unwrap_or(false);
    if !alive {
        return Err(GulchError::CreatureNotFound(actor.to_string()));
    }
    tracing::debug!(%actor, ?action, "executing action");
    match action {
        Action::NoAction => Ok(()),
        Action::Move { to } => move_step(world, actor, to),
        Action::MountedMove { to } => mounted_move(world, actor, to),
        Action::MeleeAttack { target } => attack::melee(world, ctx, actor, &target),
        Action::RangedAttack { target } => attack::ranged(world, ctx, actor, &target),
        Action::Pickpocket { target } => attack::pickpocket(world, ctx, actor, &target),
        Action::Pickup => items::pickup(world, ctx, actor),
        Action::Drop { item } => items::drop_item(world, ctx, actor, item),
        Action::Consume { item } => items::consume(world, ctx, actor, item),
        Action::Load => items::load(world, actor),
        Action::Open { at } => open_door(world, actor, at),
        Action::Lock { at, key } => lock_door(world, ctx, actor, at, key),
        Action::Mount { mount } => mount_up(world, actor, &mount),
        Action::Dismount => dismount(world, actor),
        Action::Crouch => set_crouch(world, actor, true),
        Action::Standup => set_crouch(world, actor, false),
    }
}

fn actor_pos(world: &World, actor: &CreatureId) -> Result<Position> {
    world
        .creature(actor)
        .map(|c| c.pos)
        .ok_or_else(|| GulchError::CreatureNotFound(actor.to_string()))
}

fn move_step(world: &mut World, actor: &CreatureId, to: Position) -> Result<()> {
    let from = actor_pos(world, actor)?;
    if world.creature(actor).and_then(|c| c.mount.as_ref()).is_some() {
        return Err(GulchError::Mounted);
    }
    if !from.is_adjacent(to) {
        return Err(GulchError::Blocked);
    }
    world.move_creature(actor, to)
}

fn mounted_move(world: &mut World, actor: &CreatureId, to: Position) -> Result<()> {
    let rider = world
        .creature(actor)
        .ok_or_else(|| GulchError::CreatureNotFound(actor.to_string()))?;
    let from = rider.pos;
    let mount_id = rider.mount.clone().ok_or(GulchError::NotMounted)?;
    let mount = world
        .creature(&mount_id)
        .ok_or_else(|| GulchError::CreatureNotFound(mount_id.to_string()))?;
    if mount.moved_this_tick {
        return Err(GulchError::MountSpent);
    }
    if !from.is_adjacent(to) {
        return Err(GulchError::Blocked);
    }
    world.move_creature(actor, to)?;
    if let Some(mount) = world.creature_mut(&mount_id) {
        mount.pos = to;
        mount.moved_this_tick = true;
    }
    Ok(())
}

fn open_door(world: &mut World, actor: &CreatureId, at: Position) -> Result<()> {
    let from = actor_pos(world, actor)?;
    if !from.is_adjacent(at) {
        return Err(GulchError::Blocked);
    }
    let door = world.door_state(at).ok_or(GulchError::NoDoor)?;
    world.toggle_door(at, !door.open)
}

fn lock_door(
    world: &mut World,
    ctx: &mut SimulationContext,
    actor: &CreatureId,
    at: Position,
    key_index: usize,
) -> Result<()> {
    use rand::Rng;

    let from = actor_pos(world, actor)?;
    if !from.is_adjacent(at) {
        return Err(GulchError::Blocked);
    }
    let door = world.door_state(at).ok_or(GulchError::NoDoor)?;
    if door.open {
        return Err(GulchError::DoorOpen);
    }
    let (key, is_player) = {
        let creature = world
            .creature(actor)
            .ok_or_else(|| GulchError::CreatureNotFound(actor.to_string()))?;
        let item = creature
            .inventory
            .get(key_index)
            .ok_or(GulchError::ItemNotFound)?;
        let key = item.components.key.ok_or(GulchError::WrongItemKind)?;
        (key, creature.is_player())
    };
    if !key.fits(door.key_id) {
        return Err(GulchError::KeyMismatch);
    }
    world.set_door_locked(at, !door.locked)?;

    // Every use risks wearing the key; a worn-out key stops being one.
    if ctx.rng.gen_bool(ctx.config.key_break_chance) {
        let wear_limit = ctx.config.key_wear_limit;
        if let Some(creature) = world.creature_mut(actor) {
            if let Some(item) = creature.inventory.get_mut(key_index) {
                if let Some(key) = item.components.key.as_mut() {
                    key.wear += 1;
                    if key.wear >= wear_limit {
                        item.components.key = None;
                        if is_player {
                            ctx.messages.enqueue(format!("the {} breaks off in the lock", item.name));
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

fn mount_up(world: &mut World, actor: &CreatureId, mount_id: &CreatureId) -> Result<()> {
    let (rider_pos, rider_human, already_mounted) = {
        let rider = world
            .creature(actor)
            .ok_or_else(|| GulchError::CreatureNotFound(actor.to_string()))?;
        (rider.pos, rider.human, rider.mount.is_some())
    };
    if already_mounted {
        return Err(GulchError::Mounted);
    }
    if !rider_human {
        return Err(GulchError::Blocked);
    }
    let mount_pos = {
        let mount = world
            .creature(mount_id)
            .ok_or_else(|| GulchError::CreatureNotFound(mount_id.to_string()))?;
        if !mount.alive || !mount.is_mount() || mount.is_ridden() {
            return Err(GulchError::Blocked);
        }
        mount.pos
    };
    if !rider_pos.is_adjacent(mount_pos) {
        return Err(GulchError::OutOfRange);
    }
    // While ridden the mount leaves the tile roster; its location shadows
    // the rider's.
    world.set_occupant(mount_pos, None)?;
    if let Some(mount) = world.creature_mut(mount_id) {
        mount.rider = Some(actor.clone());
        mount.pos = rider_pos;
    }
    if let Some(rider) = world.creature_mut(actor) {
        rider.mount = Some(mount_id.clone());
    }
    Ok(())
}

fn dismount(world: &mut World, actor: &CreatureId) -> Result<()> {
    let (rider_pos, mount_id) = {
        let rider = world
            .creature(actor)
            .ok_or_else(|| GulchError::CreatureNotFound(actor.to_string()))?;
        (rider.pos, rider.mount.clone().ok_or(GulchError::NotMounted)?)
    };
    let stall = DIRECTIONS
        .iter()
        .map(|(dx, dy)| rider_pos.offset(*dx, *dy))
        .find(|p| {
            world
                .tile_at(*p)
                .map(|t| t.is_passable() && t.occupant().is_none())
                .unwrap_or(false)
        })
        .ok_or(GulchError::Blocked)?;
    world.set_occupant(stall, Some(mount_id.clone()))?;
    if let Some(mount) = world.creature_mut(&mount_id) {
        mount.rider = None;
        mount.pos = stall;
    }
    if let Some(rider) = world.creature_mut(actor) {
        rider.mount = None;
    }
    Ok(())
}

fn set_crouch(world: &mut World, actor: &CreatureId, crouching: bool) -> Result<()> {
    let creature = world
        .creature_mut(actor)
        .ok_or_else(|| GulchError::CreatureNotFound(actor.to_string()))?;
    creature.crouching = crouching;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Position;
    use crate::creature::Creature;
    use crate::data::ContentCatalog;
    use crate::item::components::KeyComponent;
    use crate::item::Item;
    use crate::world::tile::{DoorState, Terrain};
    use crate::core::types::Icon;

    fn setup() -> (World, SimulationContext) {
        (
            World::new(10, 10),
            SimulationContext::new(1, ContentCatalog::builtin()),
        )
    }

    fn place(world: &mut World, id: &str, p: Position) -> CreatureId {
        let cid = CreatureId::new(id);
        world
            .place_creature(Creature::new(cid.clone(), id, p))
            .unwrap();
        cid
    }

    #[test]
    fn test_move_to_non_adjacent_cell_is_blocked() {
        let (mut world, mut ctx) = setup();
        let id = place(&mut world, "a", Position::new(2, 2));
        let result = execute(&mut world, &mut ctx, &id, Action::Move { to: Position::new(5, 5) });
        assert!(matches!(result, Err(GulchError::Blocked)));
    }

    #[test]
    fn test_open_and_close_door() {
        let (mut world, mut ctx) = setup();
        let id = place(&mut world, "a", Position::new(2, 1));
        let door = Position::new(2, 2);
        world.set_tile_kind(door, Terrain::Door).unwrap();

        execute(&mut world, &mut ctx, &id, Action::Open { at: door }).unwrap();
        assert!(world.is_passable(door));
        execute(&mut world, &mut ctx, &id, Action::Open { at: door }).unwrap();
        assert!(!world.is_passable(door));
    }

    #[test]
    fn test_open_locked_door_fails() {
        let (mut world, mut ctx) = setup();
        let id = place(&mut world, "a", Position::new(2, 1));
        let door = Position::new(2, 2);
        world.set_tile_kind(door, Terrain::Door).unwrap();
        world.tile_at_mut(door).unwrap().door = Some(DoorState::locked_with(7));

        let result = execute(&mut world, &mut ctx, &id, Action::Open { at: door });
        assert!(matches!(result, Err(GulchError::Locked)));
        assert!(!world.is_passable(door));
    }

    #[test]
    fn test_lock_requires_fitting_key() {
        let (mut world, mut ctx) = setup();
        let id = place(&mut world, "a", Position::new(2, 1));
        let door = Position::new(2, 2);
        world.set_tile_kind(door, Terrain::Door).unwrap();
        world.tile_at_mut(door).unwrap().door = Some(DoorState::locked_with(7));

        let mut wrong = Item::new("bent key", Icon::new('-', 11), 0.1, 50);
        wrong.components.key = Some(KeyComponent::new(3));
        let mut right = Item::new("brass key", Icon::new('-', 11), 0.1, 50);
        right.components.key = Some(KeyComponent::new(7));
        {
            let c = world.creature_mut(&id).unwrap();
            c.inventory.push(wrong);
            c.inventory.push(right);
        }

        let result = execute(&mut world, &mut ctx, &id, Action::Lock { at: door, key: 0 });
        assert!(matches!(result, Err(GulchError::KeyMismatch)));
        assert!(world.door_state(door).unwrap().locked);

        execute(&mut world, &mut ctx, &id, Action::Lock { at: door, key: 1 }).unwrap();
        assert!(!world.door_state(door).unwrap().locked);
    }

    #[test]
    fn test_mount_and_dismount_transfer_occupancy() {
        let (mut world, mut ctx) = setup();
        let rider = place(&mut world, "rider", Position::new(2, 2));
        world.creature_mut(&rider).unwrap().human = true;
        let horse_id = CreatureId::new("horse");
        let mut horse = Creature::new(horse_id.clone(), "horse", Position::new(3, 2));
        horse.ai = crate::ai::roles::AiState::Mount {
            waypoints: crate::ai::waypoints::WaypointSelector::random(),
        };
        world.place_creature(horse).unwrap();

        execute(&mut world, &mut ctx, &rider, Action::Mount { mount: horse_id.clone() }).unwrap();
        // The horse left the tile roster and shadows the rider.
        assert!(world.creature_at(Position::new(3, 2)).is_none());
        assert_eq!(world.creature(&horse_id).unwrap().pos, Position::new(2, 2));
        assert_eq!(world.creature(&horse_id).unwrap().rider, Some(rider.clone()));

        execute(&mut world, &mut ctx, &rider, Action::Dismount).unwrap();
        let horse_pos = world.creature(&horse_id).unwrap().pos;
        assert!(horse_pos.is_adjacent(Position::new(2, 2)));
        assert_eq!(
            world.creature_at(horse_pos).map(|c| c.id().clone()),
            Some(horse_id.clone())
        );
        assert!(world.creature(&rider).unwrap().mount.is_none());
    }

    #[test]
    fn test_mounted_move_carries_both_and_spends_the_mount() {
        let (mut world, mut ctx) = setup();
        let rider = place(&mut world, "rider", Position::new(2, 2));
        world.creature_mut(&rider).unwrap().human = true;
        let horse_id = CreatureId::new("horse");
        let mut horse = Creature::new(horse_id.clone(), "horse", Position::new(3, 2));
        horse.ai = crate::ai::roles::AiState::Mount {
            waypoints: crate::ai::waypoints::WaypointSelector::random(),
        };
        world.place_creature(horse).unwrap();
        execute(&mut world, &mut ctx, &rider, Action::Mount { mount: horse_id.clone() }).unwrap();

        execute(
            &mut world,
            &mut ctx,
            &rider,
            Action::MountedMove { to: Position::new(3, 2) },
        )
        .unwrap();
        assert_eq!(world.creature(&rider).unwrap().pos, Position::new(3, 2));
        assert_eq!(world.creature(&horse_id).unwrap().pos, Position::new(3, 2));
        assert!(world.creature(&horse_id).unwrap().moved_this_tick);

        // The mount's movement is spent for this tick.
        let again = execute(
            &mut world,
            &mut ctx,
            &rider,
            Action::MountedMove { to: Position::new(4, 2) },
        );
        assert!(matches!(again, Err(GulchError::MountSpent)));
    }

    #[test]
    fn test_crouch_and_standup() {
        let (mut world, mut ctx) = setup();
        let id = place(&mut world, "a", Position::new(2, 2));
        execute(&mut world, &mut ctx, &id, Action::Crouch).unwrap();
        assert!(world.creature(&id).unwrap().crouching);
        execute(&mut world, &mut ctx, &id, Action::Standup).unwrap();
        assert!(!world.creature(&id).unwrap().crouching);
    }
}

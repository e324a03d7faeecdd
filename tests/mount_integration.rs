//! Mount turn accounting across the tick loop

use std::collections::VecDeque;

use red_gulch::actions::Action;
use red_gulch::core::context::SimulationContext;
use red_gulch::core::types::{CreatureId, Position};
use red_gulch::data::ContentCatalog;
use red_gulch::simulation::tick;
use red_gulch::world::World;

fn saddle_up() -> (World, SimulationContext, VecDeque<Action>) {
    let mut world = World::new(10, 10);
    let mut ctx = SimulationContext::new(6, ContentCatalog::builtin());
    let queue = VecDeque::new();

    let rider = ctx
        .content
        .spawn_creature("player", CreatureId::new("rider"), Position::new(2, 2))
        .unwrap();
    world.place_creature(rider).unwrap();
    let horse = ctx
        .content
        .spawn_creature("horse", CreatureId::new("horse"), Position::new(3, 2))
        .unwrap();
    world.place_creature(horse).unwrap();
    (world, ctx, queue)
}

#[test]
fn test_mounted_move_carries_the_pair_and_grants_an_extra_action() {
    let (mut world, mut ctx, mut queue) = saddle_up();

    // Mounting pulls the horse off the tile roster, to the rider's cell.
    queue.push_back(Action::Mount {
        mount: CreatureId::new("horse"),
    });
    tick(&mut world, &mut ctx, &mut queue);
    assert_eq!(
        world.creature(&CreatureId::new("horse")).unwrap().pos,
        Position::new(2, 2)
    );
    assert!(world.creature_at(Position::new(3, 2)).is_none());

    // One MountedMove, then the granted extra action in the same tick.
    queue.push_back(Action::MountedMove {
        to: Position::new(3, 2),
    });
    queue.push_back(Action::Crouch);
    tick(&mut world, &mut ctx, &mut queue);

    let rider = world.creature(&CreatureId::new("rider")).unwrap();
    let horse = world.creature(&CreatureId::new("horse")).unwrap();
    assert_eq!(rider.pos, Position::new(3, 2));
    assert_eq!(horse.pos, Position::new(3, 2));
    // The extra action ran within the same tick.
    assert!(rider.crouching);
    assert!(queue.is_empty());
    // The flag resets at end of tick.
    assert!(!horse.moved_this_tick);
}

#[test]
fn test_second_mounted_move_in_a_tick_is_refused() {
    let (mut world, mut ctx, mut queue) = saddle_up();
    queue.push_back(Action::Mount {
        mount: CreatureId::new("horse"),
    });
    tick(&mut world, &mut ctx, &mut queue);

    queue.push_back(Action::MountedMove {
        to: Position::new(3, 2),
    });
    queue.push_back(Action::MountedMove {
        to: Position::new(4, 2),
    });
    tick(&mut world, &mut ctx, &mut queue);

    // The second ride was refused; the pair sits one step along.
    let rider = world.creature(&CreatureId::new("rider")).unwrap();
    assert_eq!(rider.pos, Position::new(3, 2));
    let messages = ctx.messages.drain();
    assert!(messages.iter().any(|m| m.contains("already moved")));
}

#[test]
fn test_dead_mount_frees_the_rider() {
    let (mut world, mut ctx, mut queue) = saddle_up();
    queue.push_back(Action::Mount {
        mount: CreatureId::new("horse"),
    });
    tick(&mut world, &mut ctx, &mut queue);

    world.kill_creature(&CreatureId::new("horse")).unwrap();
    tick(&mut world, &mut ctx, &mut queue);

    let rider = world.creature(&CreatureId::new("rider")).unwrap();
    assert!(rider.mount.is_none());
    // The rider still holds the cell; the horse left a carcass.
    assert!(world
        .items_at(Position::new(2, 2))
        .iter()
        .any(|i| i.is_corpse()));
}

#[test]
fn test_riderless_mount_rejoins_the_roster_when_rider_dies() {
    let (mut world, mut ctx, mut queue) = saddle_up();
    queue.push_back(Action::Mount {
        mount: CreatureId::new("horse"),
    });
    tick(&mut world, &mut ctx, &mut queue);

    world.kill_creature(&CreatureId::new("rider")).unwrap();
    tick(&mut world, &mut ctx, &mut queue);

    let horse = world.creature(&CreatureId::new("horse")).unwrap();
    assert!(horse.alive);
    assert!(horse.rider.is_none());
    // Back on the tile roster at its own cell.
    assert_eq!(
        world.creature_at(horse.pos).map(|c| c.id().clone()),
        Some(CreatureId::new("horse"))
    );
}

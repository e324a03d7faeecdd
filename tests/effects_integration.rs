//! Consumable effects across ticks: the tonic schedule

use std::collections::VecDeque;

use red_gulch::actions::{execute, Action};
use red_gulch::core::context::SimulationContext;
use red_gulch::core::types::{CreatureId, Position};
use red_gulch::creature::attributes::HP;
use red_gulch::data::ContentCatalog;
use red_gulch::simulation::tick;
use red_gulch::world::World;

fn hp_of(world: &World) -> i32 {
    world
        .creature(&CreatureId::new("player"))
        .unwrap()
        .attributes
        .value(HP)
}

#[test]
fn test_tonic_boosts_for_three_ticks_then_reverses() {
    let mut world = World::new(10, 10);
    let mut ctx = SimulationContext::new(9, ContentCatalog::builtin());
    let mut queue = VecDeque::new();

    let mut player = ctx
        .content
        .spawn_creature("player", CreatureId::new("player"), Position::new(4, 4))
        .unwrap();
    player.attributes.get_mut(HP).unwrap().value = 5;
    let tonic = ctx.content.spawn_item("snake_oil_tonic").unwrap();
    player.inventory.push(tonic);
    world.place_creature(player).unwrap();

    // Drinking queues the effect; nothing changes until the next update.
    execute(&mut world, &mut ctx, &CreatureId::new("player"), Action::Consume { item: 0 }).unwrap();
    assert_eq!(hp_of(&world), 5);

    tick(&mut world, &mut ctx, &mut queue);
    assert_eq!(hp_of(&world), 15);
    tick(&mut world, &mut ctx, &mut queue);
    assert_eq!(hp_of(&world), 15);
    tick(&mut world, &mut ctx, &mut queue);
    assert_eq!(hp_of(&world), 15);
    // Expired: the boost reverses exactly once.
    tick(&mut world, &mut ctx, &mut queue);
    assert_eq!(hp_of(&world), 5);
    tick(&mut world, &mut ctx, &mut queue);
    assert_eq!(hp_of(&world), 5);
}

#[test]
fn test_instant_consumable_sticks() {
    let mut world = World::new(10, 10);
    let mut ctx = SimulationContext::new(9, ContentCatalog::builtin());
    let mut queue = VecDeque::new();

    let mut player = ctx
        .content
        .spawn_creature("player", CreatureId::new("player"), Position::new(4, 4))
        .unwrap();
    player.attributes.get_mut(HP).unwrap().value = 5;
    let whiskey = ctx.content.spawn_item("whiskey").unwrap();
    player.inventory.push(whiskey);
    world.place_creature(player).unwrap();

    execute(&mut world, &mut ctx, &CreatureId::new("player"), Action::Consume { item: 0 }).unwrap();
    tick(&mut world, &mut ctx, &mut queue);
    // +2 hp, permanent.
    assert_eq!(hp_of(&world), 7);
    for _ in 0..25 {
        tick(&mut world, &mut ctx, &mut queue);
    }
    assert_eq!(hp_of(&world), 7);
}

#[test]
fn test_starvation_kills_the_player() {
    use red_gulch::creature::attributes::HUNGER;

    let mut world = World::new(10, 10);
    let mut ctx = SimulationContext::new(9, ContentCatalog::builtin());
    ctx.config.hunger_interval = 1;
    ctx.config.thirst_interval = 0;
    let mut queue = VecDeque::new();

    let mut player = ctx
        .content
        .spawn_creature("player", CreatureId::new("player"), Position::new(4, 4))
        .unwrap();
    player.attributes.get_mut(HUNGER).unwrap().value = 98;
    world.place_creature(player).unwrap();

    tick(&mut world, &mut ctx, &mut queue);
    assert!(world.creature(&CreatureId::new("player")).unwrap().alive);
    tick(&mut world, &mut ctx, &mut queue);
    tick(&mut world, &mut ctx, &mut queue);

    let player = world.creature(&CreatureId::new("player")).unwrap();
    assert!(!player.alive);
    // Starved folk still leave remains.
    assert!(world
        .items_at(Position::new(4, 4))
        .iter()
        .any(|i| i.is_corpse()));
}

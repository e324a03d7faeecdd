//! Property-based checks on the geometric and arithmetic cores

use proptest::prelude::*;

use red_gulch::core::types::{CreatureId, Position};
use red_gulch::creature::attributes::{Attribute, Effect};
use red_gulch::creature::Creature;
use red_gulch::world::tile::Terrain;
use red_gulch::world::visibility::is_visible;
use red_gulch::world::World;

const SIDE: i32 = 16;

/// A 16×16 world with walls scattered by the given cell indices.
fn walled_world(walls: &[u8]) -> World {
    let mut world = World::new(SIDE, SIDE);
    for w in walls {
        let p = Position::new((*w as i32) % SIDE, (*w as i32) / SIDE % SIDE);
        world.set_tile_kind(p, Terrain::Wall).unwrap();
    }
    world
}

proptest! {
    #[test]
    fn prop_visibility_is_symmetric(
        walls in proptest::collection::vec(0u8..=255, 0..40),
        ax in 0i32..SIDE, ay in 0i32..SIDE,
        bx in 0i32..SIDE, by in 0i32..SIDE,
    ) {
        let world = walled_world(&walls);
        let a = Position::new(ax, ay);
        let b = Position::new(bx, by);
        prop_assert_eq!(
            is_visible(&world, a, b, 20),
            is_visible(&world, b, a, 20)
        );
    }

    #[test]
    fn prop_a_cell_always_sees_itself(
        walls in proptest::collection::vec(0u8..=255, 0..40),
        x in 0i32..SIDE, y in 0i32..SIDE,
        vision in 0i32..20,
    ) {
        let world = walled_world(&walls);
        let p = Position::new(x, y);
        prop_assert!(is_visible(&world, p, p, vision));
    }

    #[test]
    fn prop_timed_effect_returns_to_baseline(
        start in 0i32..50,
        max in 50i32..100,
        magnitude in -20i32..=20,
        duration in 1i32..6,
    ) {
        // Stay clear of the clamp so the reversal is exact.
        prop_assume!(start + magnitude >= 0 && start + magnitude <= max);

        let mut attr = Attribute::new(start, max);
        attr.add_effect(Effect::timed(magnitude, duration));
        for _ in 0..duration {
            attr.update();
            prop_assert_eq!(attr.value, start + magnitude);
        }
        attr.update();
        prop_assert_eq!(attr.value, start);
        prop_assert!(attr.effects.is_empty());
    }

    #[test]
    fn prop_value_stays_clamped(
        start in 0i32..100,
        max in 1i32..100,
        magnitudes in proptest::collection::vec(-30i32..=30, 1..8),
    ) {
        let mut attr = Attribute::new(start.min(max), max);
        for m in &magnitudes {
            attr.add_effect(Effect::instant(*m));
            attr.update();
            prop_assert!(attr.value >= 0);
            prop_assert!(attr.value <= attr.max);
        }
    }

    #[test]
    fn prop_moves_preserve_occupancy_invariants(
        walls in proptest::collection::vec(0u8..=255, 0..60),
        steps in proptest::collection::vec(0u8..8, 1..40),
    ) {
        let mut world = walled_world(&walls);
        let start = Position::new(0, 0);
        // The corner is kept clear so placement always succeeds.
        world.set_tile_kind(start, Terrain::Ground).unwrap();
        let id = CreatureId::new("walker");
        world.place_creature(Creature::new(id.clone(), "walker", start)).unwrap();

        for s in &steps {
            let from = world.creature(&id).unwrap().pos;
            let (dx, dy) = red_gulch::core::types::DIRECTIONS[*s as usize];
            let to = from.offset(dx, dy);
            let moved = world.move_creature(&id, to).is_ok();

            let here = world.creature(&id).unwrap().pos;
            if moved {
                prop_assert_eq!(here, to);
            } else {
                prop_assert_eq!(here, from);
            }
            // Exactly one cell in the world holds the walker.
            let mut occupied = 0;
            for x in 0..SIDE {
                for y in 0..SIDE {
                    let p = Position::new(x, y);
                    if world.creature_at(p).is_some() {
                        prop_assert_eq!(p, here);
                        // Occupied implies passable.
                        prop_assert!(world.is_passable(p));
                        occupied += 1;
                    }
                }
            }
            prop_assert_eq!(occupied, 1);
        }
    }
}

//! Goal predicates: what seeds each kind of flow-field map

use crate::ai::dijkstra::GoalMap;
use crate::core::types::Position;
use crate::creature::Creature;
use crate::law::SheriffOffice;
use crate::world::visibility::{behind_cover, can_see_creature};
use crate::world::World;

/// Map toward one cell (a sighted quarry, a waypoint).
pub fn chase_map(world: &World, center: Position, vision: i32, target: Position) -> GoalMap {
    GoalMap::compute(world, center, vision, |p| p == target)
}

/// Map toward cells holding items. `unowned_only` keeps honest folk from
/// walking into thefts.
pub fn items_map(world: &World, center: Position, vision: i32, unowned_only: bool) -> GoalMap {
    GoalMap::compute(world, center, vision, |p| {
        let items = world.items_at(p);
        if items.is_empty() {
            return false;
        }
        !unowned_only || items.iter().all(|i| i.owner.is_none())
    })
}

/// Map toward cells concealed from a threat.
pub fn cover_map(world: &World, center: Position, vision: i32, threat: Position) -> GoalMap {
    GoalMap::compute(world, center, vision, |p| behind_cover(world, threat, p))
}

/// Map toward riderless mounts.
pub fn mount_map(world: &World, center: Position, vision: i32) -> GoalMap {
    GoalMap::compute(world, center, vision, |p| {
        world
            .creature_at(p)
            .map(|c| c.is_mount() && !c.is_ridden())
            .unwrap_or(false)
    })
}

/// The first wanted criminal this sheriff can currently see, in ledger
/// order, so pursuit is deterministic.
pub fn bounty_target<'a>(
    world: &'a World,
    office: &SheriffOffice,
    sheriff: &Creature,
) -> Option<&'a Creature> {
    office
        .ledger
        .entries()
        .iter()
        .filter_map(|entry| world.creature(&entry.criminal))
        .find(|criminal| criminal.alive && can_see_creature(world, sheriff, criminal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Area, CreatureId, Icon};
    use crate::creature::Creature;
    use crate::item::Item;

    #[test]
    fn test_items_map_ownership_filter() {
        let mut world = World::new(10, 10);
        world
            .place_item(Position::new(2, 2), Item::new("horseshoe", Icon::new('u', 8), 1.0, 30))
            .unwrap();
        let mut owned = Item::new("stick", Icon::new('/', 3), 1.0, 20);
        owned.owner = Some(CreatureId::new("townsman"));
        world.place_item(Position::new(6, 6), owned).unwrap();

        let center = Position::new(4, 4);
        let any = items_map(&world, center, 4, false);
        let honest = items_map(&world, center, 4, true);
        assert_eq!(any.cost_at(Position::new(2, 2)), 0);
        assert_eq!(any.cost_at(Position::new(6, 6)), 0);
        assert_eq!(honest.cost_at(Position::new(2, 2)), 0);
        assert_eq!(honest.cost_at(Position::new(6, 6)), honest.sentinel());
    }

    #[test]
    fn test_mount_map_ignores_ridden_mounts() {
        use crate::ai::roles::AiState;
        use crate::ai::waypoints::WaypointSelector;

        let mut world = World::new(10, 10);
        let mut horse = Creature::new(CreatureId::new("horse"), "horse", Position::new(2, 2));
        horse.ai = AiState::Mount {
            waypoints: WaypointSelector::random(),
        };
        world.place_creature(horse).unwrap();
        let mut ridden = Creature::new(CreatureId::new("pony"), "pony", Position::new(6, 6));
        ridden.ai = AiState::Mount {
            waypoints: WaypointSelector::random(),
        };
        ridden.rider = Some(CreatureId::new("someone"));
        world.place_creature(ridden).unwrap();

        let map = mount_map(&world, Position::new(4, 4), 4);
        assert_eq!(map.cost_at(Position::new(2, 2)), 0);
        assert_eq!(map.cost_at(Position::new(6, 6)), map.sentinel());
    }

    #[test]
    fn test_bounty_target_needs_sight() {
        use crate::world::tile::Terrain;

        let mut world = World::new(10, 10);
        let sheriff = Creature::new(CreatureId::new("sheriff"), "sheriff", Position::new(1, 1));
        world.place_creature(sheriff).unwrap();
        world
            .place_creature(Creature::new(CreatureId::new("bandit"), "bandit", Position::new(5, 5)))
            .unwrap();
        let mut office = SheriffOffice::new(
            Area::new(Position::new(0, 0), Position::new(9, 9)),
            CreatureId::new("sheriff"),
        );
        office
            .ledger
            .record(CreatureId::new("bandit"), "bandit", "Theft", 40);

        let sheriff = world.creature(&CreatureId::new("sheriff")).unwrap();
        assert!(bounty_target(&world, &office, sheriff).is_some());

        // Wall off the line of sight and the target vanishes.
        for y in 0..10 {
            world.set_tile_kind(Position::new(3, y), Terrain::Wall).unwrap();
        }
        let sheriff = world.creature(&CreatureId::new("sheriff")).unwrap();
        assert!(bounty_target(&world, &office, sheriff).is_none());
    }
}

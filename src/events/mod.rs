//! The event bus: crimes, witnesses, and their bookkeeping
//!
//! Actions emit events onto a pending queue; after each actor finishes, the
//! turn loop drains the queue through the subscriber list, so every event is
//! delivered before the next actor acts. Subscribers are a closed set of
//! tagged variants: the witness lift (which turns crimes into
//! `WitnessedCrime` events, the only way those arise), the sheriff offices,
//! and the townsfolk hostility flags. Handlers may emit further events but
//! only ever mutate ledgers and flags.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

use crate::ai::roles::AiState;
use crate::core::config::SimulationConfig;
use crate::core::types::{CreatureId, Position};
use crate::creature::Alignment;
use crate::world::visibility::is_visible;
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrimeKind {
    Attack,
    Murder,
    Theft,
    Pickpocket,
}

impl CrimeKind {
    /// Name written into bounty ledgers.
    pub fn label(self) -> &'static str {
        match self {
            CrimeKind::Attack => "Attack",
            CrimeKind::Murder => "Murder",
            CrimeKind::Theft => "Theft",
            CrimeKind::Pickpocket => "Pickpocket",
        }
    }
}

/// Payload shared by every crime event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrimeDetails {
    /// Serial number within this run, for tracing
    pub id: u64,
    pub perpetrator: CreatureId,
    pub perpetrator_name: String,
    pub location: Position,
    pub kind: CrimeKind,
    /// Worth of whatever was taken or harmed, in cents
    pub value: i64,
    pub victim: Option<CreatureId>,
    /// Name of the stolen item, for theft-like crimes
    pub item: Option<String>,
}

/// Everything that can happen on the bus. Transient values: produced by
/// action execution, dispatched synchronously, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Attack(CrimeDetails),
    Murder(CrimeDetails),
    Theft(CrimeDetails),
    Pickpocket(CrimeDetails),
    WitnessedCrime {
        observer: CreatureId,
        crime: CrimeDetails,
    },
}

impl Event {
    /// The underlying crime, for the four concrete crime events.
    pub fn crime(&self) -> Option<&CrimeDetails> {
        match self {
            Event::Attack(c) | Event::Murder(c) | Event::Theft(c) | Event::Pickpocket(c) => {
                Some(c)
            }
            Event::WitnessedCrime { .. } => None,
        }
    }
}

/// The closed set of bus subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscriber {
    /// Lifts crimes into WitnessedCrime for every qualifying observer
    WitnessLift,
    /// Sheriff office by index into the world's office list
    SheriffOffice(usize),
    /// Flips townsfolk hostile when they witness a player crime
    TownsfolkFlags,
}

#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    pending: VecDeque<Event>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a subscriber; subscribing twice is a no-op.
    pub fn subscribe(&mut self, subscriber: Subscriber) {
        if !self.subscribers.contains(&subscriber) {
            self.subscribers.push(subscriber);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Queues an event for the next dispatch.
    pub fn emit(&mut self, event: Event) {
        self.pending.push_back(event);
    }

    /// Serial for the next crime's details.
    pub fn next_crime_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drains the pending queue through every subscriber, in insertion
    /// order. Handlers may emit; emitted events are processed in the same
    /// drain, so witnessed crimes land in the same tick as their source.
    pub fn dispatch(
        &mut self,
        world: &mut World,
        rng: &mut ChaCha8Rng,
        config: &SimulationConfig,
    ) {
        while let Some(event) = self.pending.pop_front() {
            tracing::debug!(?event, "dispatching");
            let subscribers = self.subscribers.clone();
            for subscriber in subscribers {
                match subscriber {
                    Subscriber::WitnessLift => self.lift_witnesses(&event, world),
                    Subscriber::SheriffOffice(office) => {
                        record_bounty(&event, world, office, rng, config)
                    }
                    Subscriber::TownsfolkFlags => flag_townsfolk(&event, world),
                }
            }
        }
    }

    /// Emits WitnessedCrime for every live observer that qualifies: not the
    /// perpetrator, not the victim of a murder, and with line of sight to
    /// the crime location at this moment.
    fn lift_witnesses(&mut self, event: &Event, world: &World) {
        let Some(crime) = event.crime() else {
            return;
        };
        if !crime_against_the_town(crime, world) {
            return;
        }
        let mut lifted = Vec::new();
        for observer in world.creatures() {
            if observer.id() == &crime.perpetrator {
                continue;
            }
            if crime.kind == CrimeKind::Murder && Some(observer.id()) == crime.victim.as_ref() {
                continue;
            }
            if !is_visible(world, observer.pos, crime.location, observer.vision) {
                continue;
            }
            lifted.push(Event::WitnessedCrime {
                observer: observer.id().clone(),
                crime: crime.clone(),
            });
        }
        for event in lifted {
            self.emit(event);
        }
    }
}

/// Whether this crime is one the town cares about. Violence only counts
/// against neutral townsfolk (hunting animals is not murder); taking what
/// is another's always counts.
fn crime_against_the_town(crime: &CrimeDetails, world: &World) -> bool {
    match crime.kind {
        CrimeKind::Attack | CrimeKind::Murder => crime
            .victim
            .as_ref()
            .and_then(|v| world.creature(v))
            .map(|v| v.alignment == Alignment::Neutral && v.human)
            .unwrap_or(false),
        CrimeKind::Theft | CrimeKind::Pickpocket => true,
    }
}

/// Sheriff office reaction: the sheriff's own sightings inside the town
/// become ledger entries, priced by the bounty schedule.
fn record_bounty(
    event: &Event,
    world: &mut World,
    office_idx: usize,
    rng: &mut ChaCha8Rng,
    config: &SimulationConfig,
) {
    let Event::WitnessedCrime { observer, crime } = event else {
        return;
    };
    let Some(office) = world.offices.get(office_idx) else {
        return;
    };
    if &office.sheriff != observer || !office.town.contains(crime.location) {
        return;
    }
    let reward = match crime.kind {
        CrimeKind::Theft | CrimeKind::Pickpocket => crime.value * config.theft_bounty_multiplier,
        CrimeKind::Murder => rng.gen_range(config.murder_bounty_min..=config.murder_bounty_max),
        CrimeKind::Attack => config.attack_bounty,
    };
    tracing::debug!(
        criminal = %crime.perpetrator,
        crime = crime.kind.label(),
        reward,
        "bounty recorded"
    );
    world.offices[office_idx].ledger.record(
        crime.perpetrator.clone(),
        crime.perpetrator_name.clone(),
        crime.kind.label(),
        reward,
    );
}

/// Townsfolk who see the player commit a crime turn hostile, which arms
/// their flee behaviour.
fn flag_townsfolk(event: &Event, world: &mut World) {
    let Event::WitnessedCrime { observer, crime } = event else {
        return;
    };
    let player_did_it = world
        .creature(&crime.perpetrator)
        .map(|c| c.is_player())
        .unwrap_or(false);
    if !player_did_it {
        return;
    }
    if let Some(witness) = world.creature_mut(observer) {
        if let AiState::Townsman { player_hostile, .. } = &mut witness.ai {
            *player_hostile = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::Area;
    use crate::creature::Creature;
    use crate::law::SheriffOffice;
    use crate::world::tile::Terrain;
    use rand::SeedableRng;

    fn crime(kind: CrimeKind, perp: &str, victim: Option<&str>, at: Position) -> CrimeDetails {
        CrimeDetails {
            id: 1,
            perpetrator: CreatureId::new(perp),
            perpetrator_name: perp.to_string(),
            location: at,
            kind,
            value: 20,
            victim: victim.map(CreatureId::new),
            item: None,
        }
    }

    fn bus() -> EventBus {
        let mut bus = EventBus::new();
        bus.subscribe(Subscriber::WitnessLift);
        bus.subscribe(Subscriber::TownsfolkFlags);
        bus
    }

    fn neutral(id: &str, p: Position) -> Creature {
        let mut c = Creature::new(CreatureId::new(id), id, p);
        c.human = true;
        c
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let mut bus = EventBus::new();
        bus.subscribe(Subscriber::WitnessLift);
        bus.subscribe(Subscriber::WitnessLift);
        bus.subscribe(Subscriber::SheriffOffice(0));
        bus.subscribe(Subscriber::SheriffOffice(0));
        bus.subscribe(Subscriber::SheriffOffice(1));
        assert_eq!(bus.subscriber_count(), 3);
    }

    #[test]
    fn test_theft_is_witnessed_by_bystander() {
        let mut world = World::new(10, 10);
        world.place_creature(neutral("witness", Position::new(1, 1))).unwrap();
        world.place_creature(neutral("bandit", Position::new(5, 5))).unwrap();
        world.offices.push(SheriffOffice::new(
            Area::new(Position::new(0, 0), Position::new(9, 9)),
            CreatureId::new("witness"),
        ));

        let mut bus = bus();
        bus.subscribe(Subscriber::SheriffOffice(0));
        bus.emit(Event::Theft(crime(
            CrimeKind::Theft,
            "bandit",
            None,
            Position::new(5, 5),
        )));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        bus.dispatch(&mut world, &mut rng, &SimulationConfig::default());

        let entry = world.offices[0]
            .ledger
            .entry(&CreatureId::new("bandit"))
            .expect("bounty recorded");
        assert_eq!(entry.crimes, vec!["Theft".to_string()]);
        assert_eq!(entry.value, 40);
    }

    #[test]
    fn test_perpetrator_never_witnesses_own_crime() {
        let mut world = World::new(10, 10);
        world.place_creature(neutral("bandit", Position::new(5, 5))).unwrap();
        world.offices.push(SheriffOffice::new(
            Area::new(Position::new(0, 0), Position::new(9, 9)),
            CreatureId::new("bandit"),
        ));

        let mut bus = bus();
        bus.subscribe(Subscriber::SheriffOffice(0));
        bus.emit(Event::Theft(crime(
            CrimeKind::Theft,
            "bandit",
            None,
            Position::new(5, 5),
        )));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        bus.dispatch(&mut world, &mut rng, &SimulationConfig::default());

        assert!(world.offices[0].ledger.is_empty());
    }

    #[test]
    fn test_wall_prevents_witnessing() {
        let mut world = World::new(10, 10);
        for y in 0..10 {
            world.set_tile_kind(Position::new(3, y), Terrain::Wall).unwrap();
        }
        world.place_creature(neutral("sheriff", Position::new(1, 1))).unwrap();
        world.place_creature(neutral("bandit", Position::new(5, 5))).unwrap();
        world.offices.push(SheriffOffice::new(
            Area::new(Position::new(0, 0), Position::new(9, 9)),
            CreatureId::new("sheriff"),
        ));

        let mut bus = bus();
        bus.subscribe(Subscriber::SheriffOffice(0));
        bus.emit(Event::Theft(crime(
            CrimeKind::Theft,
            "bandit",
            None,
            Position::new(5, 5),
        )));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        bus.dispatch(&mut world, &mut rng, &SimulationConfig::default());

        assert!(world.offices[0].ledger.is_empty());
    }

    #[test]
    fn test_attack_on_enemy_is_not_a_crime() {
        let mut world = World::new(10, 10);
        world.place_creature(neutral("sheriff", Position::new(1, 1))).unwrap();
        let mut outlaw = neutral("outlaw", Position::new(5, 5));
        outlaw.alignment = Alignment::Enemy;
        world.place_creature(outlaw).unwrap();
        world.offices.push(SheriffOffice::new(
            Area::new(Position::new(0, 0), Position::new(9, 9)),
            CreatureId::new("sheriff"),
        ));

        let mut bus = bus();
        bus.subscribe(Subscriber::SheriffOffice(0));
        bus.emit(Event::Attack(crime(
            CrimeKind::Attack,
            "player",
            Some("outlaw"),
            Position::new(5, 5),
        )));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        bus.dispatch(&mut world, &mut rng, &SimulationConfig::default());

        assert!(world.offices[0].ledger.is_empty());
    }

    #[test]
    fn test_murder_bounty_within_schedule() {
        let mut world = World::new(10, 10);
        world.place_creature(neutral("sheriff", Position::new(1, 1))).unwrap();
        world.place_creature(neutral("victim", Position::new(5, 6))).unwrap();
        world.place_creature(neutral("bandit", Position::new(5, 5))).unwrap();
        world.offices.push(SheriffOffice::new(
            Area::new(Position::new(0, 0), Position::new(9, 9)),
            CreatureId::new("sheriff"),
        ));

        let config = SimulationConfig::default();
        let mut bus = bus();
        bus.subscribe(Subscriber::SheriffOffice(0));
        bus.emit(Event::Murder(crime(
            CrimeKind::Murder,
            "bandit",
            Some("victim"),
            Position::new(5, 6),
        )));
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        bus.dispatch(&mut world, &mut rng, &config);

        let entry = world.offices[0]
            .ledger
            .entry(&CreatureId::new("bandit"))
            .expect("bounty recorded");
        assert!(entry.value >= config.murder_bounty_min);
        assert!(entry.value <= config.murder_bounty_max);
    }

    #[test]
    fn test_townsman_flips_hostile_on_player_crime() {
        use crate::ai::waypoints::WaypointSelector;

        let mut world = World::new(10, 10);
        let mut player = neutral("player", Position::new(5, 5));
        player.alignment = Alignment::Player;
        world.place_creature(player).unwrap();
        let mut townsman = neutral("townsman", Position::new(2, 2));
        townsman.ai = AiState::Townsman {
            waypoints: WaypointSelector::random(),
            player_hostile: false,
        };
        world.place_creature(townsman).unwrap();

        let mut bus = bus();
        bus.emit(Event::Theft(crime(
            CrimeKind::Theft,
            "player",
            None,
            Position::new(5, 5),
        )));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        bus.dispatch(&mut world, &mut rng, &SimulationConfig::default());

        match &world.creature(&CreatureId::new("townsman")).unwrap().ai {
            AiState::Townsman { player_hostile, .. } => assert!(*player_hostile),
            other => panic!("unexpected ai state: {:?}", other),
        }
    }
}

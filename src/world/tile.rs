//! Tiles, terrain kinds and door state

use serde::{Deserialize, Serialize};

use crate::core::types::{CreatureId, Icon};
use crate::item::Item;

/// Terrain kinds. Doors and counter flaps are the two door kinds; their
/// passability and vision blocking are derived from door state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Ground,
    Path,
    Wall,
    /// Blocks passage, lets vision through
    Window,
    /// Shop counter: blocks passage, lets vision through
    Counter,
    Door,
    /// Swinging flap in a counter; never blocks vision
    CounterFlap,
}

impl Terrain {
    pub fn is_door(self) -> bool {
        matches!(self, Terrain::Door | Terrain::CounterFlap)
    }

    pub fn base_passable(self) -> bool {
        matches!(self, Terrain::Ground | Terrain::Path)
    }

    pub fn base_blocks_vision(self) -> bool {
        matches!(self, Terrain::Wall)
    }

    /// Door kinds start closed and unlocked.
    pub fn default_door_state(self) -> Option<DoorState> {
        match self {
            Terrain::Door => Some(DoorState::closed(true)),
            Terrain::CounterFlap => Some(DoorState::closed(false)),
            _ => None,
        }
    }

    pub fn icon(self) -> Icon {
        match self {
            Terrain::Ground => Icon::new('.', 3),
            Terrain::Path => Icon::new(',', 11),
            Terrain::Wall => Icon::new('#', 8),
            Terrain::Window => Icon::new('"', 14),
            Terrain::Counter => Icon::new('=', 9),
            Terrain::Door => Icon::new('+', 9),
            Terrain::CounterFlap => Icon::new('\'', 9),
        }
    }
}

/// Mutable state of a door tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorState {
    pub locked: bool,
    /// Lock family; −1 means no key needed
    pub key_id: i32,
    pub open: bool,
    /// Whether the closed door is opaque
    pub blocks_vision_when_closed: bool,
}

impl DoorState {
    pub fn closed(opaque: bool) -> Self {
        Self {
            locked: false,
            key_id: -1,
            open: false,
            blocks_vision_when_closed: opaque,
        }
    }

    pub fn locked_with(key_id: i32) -> Self {
        Self {
            locked: true,
            key_id,
            open: false,
            blocks_vision_when_closed: true,
        }
    }
}

/// One cell of the world
#[derive(Debug, Clone)]
pub struct Tile {
    pub terrain: Terrain,
    /// Base passability of the terrain; doors override via their state
    passable: bool,
    /// Base opacity of the terrain; doors override via their state
    blocks_vision: bool,
    pub door: Option<DoorState>,
    pub items: Vec<Item>,
    pub(crate) occupant: Option<CreatureId>,
}

impl Tile {
    pub fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            passable: terrain.base_passable(),
            blocks_vision: terrain.base_blocks_vision(),
            door: terrain.default_door_state(),
            items: Vec::new(),
            occupant: None,
        }
    }

    /// Replaces the terrain kind, resetting the derived flags and door state.
    /// Items and occupant are untouched.
    pub fn set_terrain(&mut self, terrain: Terrain) {
        self.terrain = terrain;
        self.passable = terrain.base_passable();
        self.blocks_vision = terrain.base_blocks_vision();
        self.door = terrain.default_door_state();
    }

    pub fn is_door(&self) -> bool {
        self.door.is_some()
    }

    /// Terrain-level passability; occupancy is checked separately.
    pub fn is_passable(&self) -> bool {
        match &self.door {
            Some(door) => door.open,
            None => self.passable,
        }
    }

    pub fn blocks_vision(&self) -> bool {
        match &self.door {
            Some(door) => door.blocks_vision_when_closed && !door.open,
            None => self.blocks_vision,
        }
    }

    pub fn occupant(&self) -> Option<&CreatureId> {
        self.occupant.as_ref()
    }

    pub fn has_cover_item(&self) -> bool {
        self.items.iter().any(|i| i.provides_cover())
    }

    /// Icon of the item drawn when no creature stands here.
    pub fn top_item_icon(&self) -> Option<Icon> {
        self.items.last().map(|i| i.icon)
    }
}

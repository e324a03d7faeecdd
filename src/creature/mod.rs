//! Creatures: identity, stats, equipment, and their role-specific AI tag

pub mod attributes;

use serde::{Deserialize, Serialize};

use crate::ai::roles::AiState;
use crate::core::types::{CreatureId, Icon, Position};
use crate::item::components::{DamageDice, WeaponComponent};
use crate::item::Item;
use attributes::{Attribute, Attributes, DEXTERITY, ENCUMBRANCE, HP, HUNGER, STRENGTH, THIRST};

/// Hostility tri-state; harming a Neutral is a crime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Player,
    Neutral,
    Enemy,
}

/// d20-style ability bonus: +1 per two points above 10, floored.
pub fn ability_bonus(value: i32) -> i32 {
    (value - 10).div_euclid(2)
}

/// One inhabitant of the world.
///
/// Identity is immutable; location changes only through the world's move
/// operations, which keep tile occupancy consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    id: CreatureId,
    pub name: String,
    pub pos: Position,
    pub icon: Icon,
    pub initiative: i32,
    pub attributes: Attributes,
    pub alignment: Alignment,
    pub crouching: bool,
    pub inventory: Vec<Item>,
    pub weapon: Option<Item>,
    pub armour: Option<Item>,
    /// Cash on hand, in cents
    pub money: i64,
    pub human: bool,
    /// Vision radius in cells
    pub vision: i32,
    /// Natural attack used when no weapon is equipped
    pub unarmed: DamageDice,
    /// Mount this creature is riding, if any
    pub mount: Option<CreatureId>,
    /// Rider on this creature's back, if any
    pub rider: Option<CreatureId>,
    /// Set when a mount's movement was spent this tick
    pub moved_this_tick: bool,
    /// Tombstone flag; dead creatures stay in the arena so ids keep resolving
    pub alive: bool,
    /// Role-specific AI and dialogue state
    pub ai: AiState,
}

impl Creature {
    pub fn new(id: CreatureId, name: impl Into<String>, pos: Position) -> Self {
        let mut attrs = Attributes::new();
        attrs.insert(HP, Attribute::full(10));
        attrs.insert(attributes::AC, Attribute::full(10));
        attrs.insert(STRENGTH, Attribute::full(10));
        attrs.insert(DEXTERITY, Attribute::full(10));
        attrs.insert(ENCUMBRANCE, Attribute::new(0, 50));
        Self {
            id,
            name: name.into(),
            pos,
            icon: Icon::new('c', 7),
            initiative: 0,
            attributes: attrs,
            alignment: Alignment::Neutral,
            crouching: false,
            inventory: Vec::new(),
            weapon: None,
            armour: None,
            money: 0,
            human: false,
            vision: 20,
            unarmed: DamageDice::new(1, 2, 0),
            mount: None,
            rider: None,
            moved_this_tick: false,
            alive: true,
            ai: AiState::Animal {
                waypoints: crate::ai::waypoints::WaypointSelector::random(),
            },
        }
    }

    pub fn id(&self) -> &CreatureId {
        &self.id
    }

    pub fn is_player(&self) -> bool {
        self.alignment == Alignment::Player
    }

    pub fn is_mount(&self) -> bool {
        matches!(self.ai, AiState::Mount { .. })
    }

    pub fn is_ridden(&self) -> bool {
        self.rider.is_some()
    }

    /// Death predicate. Creatures die at zero hit points; the player also
    /// dies of full hunger or full thirst.
    pub fn death_due(&self) -> bool {
        if self.attributes.get(HP).map(|a| a.is_empty()).unwrap_or(true) {
            return true;
        }
        if self.is_player() {
            for survival in [HUNGER, THIRST] {
                if let Some(a) = self.attributes.get(survival) {
                    if a.is_maxed() {
                        return true;
                    }
                }
            }
        }
        false
    }

    pub fn str_bonus(&self) -> i32 {
        ability_bonus(self.attributes.value(STRENGTH))
    }

    pub fn dex_bonus(&self) -> i32 {
        ability_bonus(self.attributes.value(DEXTERITY))
    }

    /// Armour class after equipment.
    pub fn effective_ac(&self) -> i32 {
        let base = self.attributes.value(attributes::AC);
        let armour = self
            .armour
            .as_ref()
            .and_then(|a| a.components.armour)
            .map(|a| a.ac_bonus)
            .unwrap_or(0);
        base + armour
    }

    /// Dice rolled by this creature's current attack.
    pub fn attack_dice(&self) -> DamageDice {
        self.equipped_weapon()
            .map(|w| w.damage)
            .unwrap_or(self.unarmed)
    }

    pub fn equipped_weapon(&self) -> Option<&WeaponComponent> {
        self.weapon.as_ref().and_then(|w| w.components.weapon.as_ref())
    }

    pub fn equipped_weapon_mut(&mut self) -> Option<&mut WeaponComponent> {
        self.weapon.as_mut().and_then(|w| w.components.weapon.as_mut())
    }

    /// A ranged weapon in hand, loaded or not.
    pub fn ranged_weapon(&self) -> Option<&WeaponComponent> {
        self.equipped_weapon().filter(|w| w.is_ranged())
    }

    pub fn carried_weight(&self) -> f32 {
        let held: f32 = self.inventory.iter().map(|i| i.weight).sum();
        let weapon = self.weapon.as_ref().map(|i| i.weight).unwrap_or(0.0);
        let armour = self.armour.as_ref().map(|i| i.weight).unwrap_or(0.0);
        held + weapon + armour
    }

    /// Carry capacity is the encumbrance attribute's maximum.
    pub fn carry_capacity(&self) -> f32 {
        self.attributes
            .get(ENCUMBRANCE)
            .map(|a| a.max as f32)
            .unwrap_or(0.0)
    }

    pub fn can_carry(&self, item: &Item) -> bool {
        self.carried_weight() + item.weight <= self.carry_capacity()
    }

    /// Keeps the encumbrance attribute's value tracking the carried weight.
    pub fn refresh_encumbrance(&mut self) {
        let weight = self.carried_weight().round() as i32;
        if let Some(attr) = self.attributes.get_mut(ENCUMBRANCE) {
            attr.value = weight.clamp(0, attr.max);
        }
    }

    /// One tick of attribute effect processing.
    pub fn update_attributes(&mut self) {
        self.attributes.update_all();
    }
}

//! Content tables: read-only name → record catalogs
//!
//! Items, creatures, terrain names and the world configuration are loaded
//! once at startup from TOML files and treated as constants afterwards. The
//! same tables ship compiled in, so tests and the runner work without a
//! data directory.

use ahash::AHashMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::ai::roles::AiState;
use crate::ai::waypoints::WaypointSelector;
use crate::core::error::{GulchError, Result};
use crate::core::types::{CreatureId, Icon, Position};
use crate::creature::attributes::{
    Attribute, Attributes, Effect, EffectMap, AC, DEXTERITY, ENCUMBRANCE, HP, HUNGER, STRENGTH,
    THIRST,
};
use crate::creature::{Alignment, Creature};
use crate::item::components::{
    AmmoComponent, AmmoType, ArmourComponent, ConsumableComponent, CoverComponent, DamageDice,
    KeyComponent, Magazine, ReadableComponent, WeaponComponent,
};
use crate::item::Item;
use crate::world::tile::Terrain;

/// Effect as written in content files
#[derive(Debug, Clone, Deserialize)]
pub struct EffectSpec {
    pub magnitude: i32,
    /// Ticks; −1 never expires
    pub duration: i32,
    #[serde(default)]
    pub on_max: bool,
    #[serde(default)]
    pub permanent: bool,
    #[serde(default)]
    pub compounding: bool,
}

impl EffectSpec {
    fn effect(&self) -> Effect {
        Effect {
            magnitude: self.magnitude,
            on_max: self.on_max,
            remaining: self.duration,
            activated: false,
            permanent: self.permanent,
            compounding: self.compounding,
        }
    }
}

fn effect_map(specs: &BTreeMap<String, Vec<EffectSpec>>) -> EffectMap {
    specs
        .iter()
        .map(|(attr, list)| (attr.clone(), list.iter().map(EffectSpec::effect).collect()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Normal,
    Weapon,
    Armour,
    Ammo,
    Consumable,
    Readable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemSpec {
    pub kind: ItemKind,
    pub glyph: String,
    pub colour: u8,
    pub weight: f32,
    pub value: i64,
    #[serde(default)]
    pub damage: Option<(u32, u32, i32)>,
    #[serde(default)]
    pub range: i32,
    #[serde(default)]
    pub ammo: Option<AmmoType>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub ac_bonus: i32,
    #[serde(default)]
    pub effects: Option<BTreeMap<String, Vec<EffectSpec>>>,
    #[serde(default)]
    pub on_hit: Option<BTreeMap<String, Vec<EffectSpec>>>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub key_id: Option<i32>,
    #[serde(default)]
    pub cover: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatureKind {
    Player,
    Npc,
    Enemy,
    Mount,
}

impl CreatureKind {
    fn alignment(self) -> Alignment {
        match self {
            CreatureKind::Player => Alignment::Player,
            CreatureKind::Npc | CreatureKind::Mount => Alignment::Neutral,
            CreatureKind::Enemy => Alignment::Enemy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Player,
    Animal,
    AggressiveAnimal,
    Bandit,
    Townsman,
    Sheriff,
    Shopkeeper,
    Mount,
}

impl RoleKind {
    /// Default AI composition for the role; callers pin down areas, patrol
    /// routes and office indices after spawning.
    fn ai(self) -> AiState {
        match self {
            RoleKind::Player => AiState::Player,
            RoleKind::Animal => AiState::Animal {
                waypoints: WaypointSelector::random(),
            },
            RoleKind::AggressiveAnimal => AiState::AggressiveAnimal {
                waypoints: WaypointSelector::random(),
            },
            RoleKind::Bandit => AiState::Bandit {
                waypoints: WaypointSelector::random(),
            },
            RoleKind::Townsman => AiState::Townsman {
                waypoints: WaypointSelector::random(),
                player_hostile: false,
            },
            RoleKind::Sheriff => AiState::Sheriff { office: 0 },
            RoleKind::Shopkeeper => AiState::Shopkeeper {
                waypoints: WaypointSelector::random(),
                greeted: false,
            },
            RoleKind::Mount => AiState::Mount {
                waypoints: WaypointSelector::random(),
            },
        }
    }
}

fn default_vision() -> i32 {
    20
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatureSpec {
    pub kind: CreatureKind,
    pub glyph: String,
    pub colour: u8,
    pub initiative: i32,
    pub hp: i32,
    pub ac: i32,
    pub strength: i32,
    pub dexterity: i32,
    /// Carry capacity in pounds (the encumbrance maximum)
    pub carry: i32,
    #[serde(default)]
    pub human: bool,
    #[serde(default = "default_vision")]
    pub vision: i32,
    #[serde(default)]
    pub unarmed: Option<(u32, u32, i32)>,
    #[serde(default)]
    pub money: i64,
    pub role: RoleKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TerrainSpec {
    pub kind: Terrain,
}

/// World dimensions from content
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WorldConfig {
    pub width: i32,
    pub height: i32,
}

/// The complete read-only catalog
#[derive(Debug, Clone)]
pub struct ContentCatalog {
    items: AHashMap<String, ItemSpec>,
    creatures: AHashMap<String, CreatureSpec>,
    terrain: AHashMap<String, TerrainSpec>,
    world: WorldConfig,
}

impl ContentCatalog {
    /// Loads all four tables from a data directory.
    pub fn load(dir: &Path) -> Result<Self> {
        let items = fs::read_to_string(dir.join("items.toml"))?;
        let creatures = fs::read_to_string(dir.join("creatures.toml"))?;
        let terrain = fs::read_to_string(dir.join("terrain.toml"))?;
        let world = fs::read_to_string(dir.join("world.toml"))?;
        Self::parse(&items, &creatures, &terrain, &world)
    }

    /// The compiled-in copy of the shipped tables.
    pub fn builtin() -> Self {
        Self::parse(
            include_str!("../../data/items.toml"),
            include_str!("../../data/creatures.toml"),
            include_str!("../../data/terrain.toml"),
            include_str!("../../data/world.toml"),
        )
        .expect("shipped content tables parse")
    }

    fn parse(items: &str, creatures: &str, terrain: &str, world: &str) -> Result<Self> {
        Ok(Self {
            items: toml::from_str(items)?,
            creatures: toml::from_str(creatures)?,
            terrain: toml::from_str(terrain)?,
            world: toml::from_str(world)?,
        })
    }

    pub fn world_config(&self) -> WorldConfig {
        self.world
    }

    pub fn item_spec(&self, name: &str) -> Result<&ItemSpec> {
        self.items
            .get(name)
            .ok_or_else(|| GulchError::MissingContent(format!("item: {}", name)))
    }

    pub fn creature_spec(&self, name: &str) -> Result<&CreatureSpec> {
        self.creatures
            .get(name)
            .ok_or_else(|| GulchError::MissingContent(format!("creature: {}", name)))
    }

    /// Terrain kind behind a world-gen name.
    pub fn terrain(&self, name: &str) -> Result<Terrain> {
        self.terrain
            .get(name)
            .map(|t| t.kind)
            .ok_or_else(|| GulchError::MissingContent(format!("terrain: {}", name)))
    }

    /// Builds a fresh item from its table entry.
    pub fn spawn_item(&self, name: &str) -> Result<Item> {
        let spec = self.item_spec(name)?;
        let glyph = spec.glyph.chars().next().unwrap_or('?');
        let mut item = Item::new(name, Icon::new(glyph, spec.colour), spec.weight, spec.value);
        match spec.kind {
            ItemKind::Normal => {}
            ItemKind::Weapon => {
                let (n, d, bonus) = spec.damage.unwrap_or((1, 2, 0));
                item.components.weapon = Some(WeaponComponent {
                    damage: DamageDice::new(n, d, bonus),
                    range: spec.range,
                    ammo: spec.ammo.unwrap_or(AmmoType::None),
                    magazine: spec.capacity.map(Magazine::empty),
                    on_hit: spec.on_hit.as_ref().map(effect_map).unwrap_or_default(),
                });
            }
            ItemKind::Armour => {
                item.components.armour = Some(ArmourComponent {
                    ac_bonus: spec.ac_bonus,
                });
            }
            ItemKind::Ammo => {
                item.components.ammo = Some(AmmoComponent {
                    ammo: spec
                        .ammo
                        .ok_or_else(|| GulchError::MissingContent(format!("{}: ammo type", name)))?,
                });
            }
            ItemKind::Consumable => {
                item.components.consumable = Some(ConsumableComponent {
                    effects: spec.effects.as_ref().map(effect_map).unwrap_or_default(),
                });
            }
            ItemKind::Readable => {
                item.components.readable = Some(ReadableComponent {
                    text: spec.text.clone().unwrap_or_default(),
                });
            }
        }
        if let Some(key_id) = spec.key_id {
            item.components.key = Some(KeyComponent::new(key_id));
        }
        if spec.cover {
            item.components.cover = Some(CoverComponent);
        }
        debug_assert!(item.components.is_valid(), "invalid component set: {}", name);
        Ok(item)
    }

    /// Builds a fresh creature from its table entry.
    pub fn spawn_creature(&self, name: &str, id: CreatureId, pos: Position) -> Result<Creature> {
        let spec = self.creature_spec(name)?;
        let glyph = spec.glyph.chars().next().unwrap_or('?');
        let mut c = Creature::new(id, name, pos);
        c.icon = Icon::new(glyph, spec.colour);
        c.initiative = spec.initiative;
        c.alignment = spec.kind.alignment();
        c.human = spec.human;
        c.vision = spec.vision;
        c.money = spec.money;
        if let Some((n, d, bonus)) = spec.unarmed {
            c.unarmed = DamageDice::new(n, d, bonus);
        }
        let mut attrs = Attributes::new();
        attrs.insert(HP, Attribute::full(spec.hp));
        attrs.insert(AC, Attribute::full(spec.ac));
        attrs.insert(STRENGTH, Attribute::full(spec.strength));
        attrs.insert(DEXTERITY, Attribute::full(spec.dexterity));
        attrs.insert(ENCUMBRANCE, Attribute::new(0, spec.carry));
        if spec.kind == CreatureKind::Player {
            attrs.insert(HUNGER, Attribute::new(0, 100));
            attrs.insert(THIRST, Attribute::new(0, 100));
        }
        c.attributes = attrs;
        c.ai = spec.role.ai();
        Ok(c)
    }
}

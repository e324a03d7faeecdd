//! Items: one record, composable capabilities

pub mod components;

use serde::{Deserialize, Serialize};

use crate::core::types::{CreatureId, Icon};
use components::{
    AmmoComponent, ArmourComponent, ConsumableComponent, CorpseComponent, CoverComponent,
    KeyComponent, ReadableComponent, WeaponComponent,
};

/// The optional capability records an item may carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon: Option<WeaponComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armour: Option<ArmourComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ammo: Option<AmmoComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumable: Option<ConsumableComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readable: Option<ReadableComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<CoverComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corpse: Option<CorpseComponent>,
}

impl ComponentSet {
    /// At most one primary capability per item; cover and corpse are free.
    pub fn is_valid(&self) -> bool {
        let primaries = [
            self.weapon.is_some(),
            self.armour.is_some(),
            self.ammo.is_some(),
            self.consumable.is_some(),
            self.readable.is_some(),
        ];
        primaries.iter().filter(|p| **p).count() <= 1
    }
}

/// A thing that can sit on a tile or in an inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    /// Recorded owner; `None` is unowned. Inside an inventory this always
    /// equals the holder's id.
    pub owner: Option<CreatureId>,
    pub icon: Icon,
    pub weight: f32,
    /// Worth in cents
    pub value: i64,
    pub components: ComponentSet,
}

impl Item {
    pub fn new(name: impl Into<String>, icon: Icon, weight: f32, value: i64) -> Self {
        Self {
            name: name.into(),
            owner: None,
            icon,
            weight,
            value,
            components: ComponentSet::default(),
        }
    }

    pub fn owned_by(mut self, owner: CreatureId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn provides_cover(&self) -> bool {
        self.components.cover.is_some()
    }

    pub fn is_corpse(&self) -> bool {
        self.components.corpse.is_some()
    }

    /// Ammo items represent one round each.
    pub fn is_ammo_for(&self, weapon: &WeaponComponent) -> bool {
        self.components
            .ammo
            .map(|a| a.ammo == weapon.ammo)
            .unwrap_or(false)
    }
}

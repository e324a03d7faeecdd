//! Attributes and timed effects
//!
//! Every creature stat is an `Attribute`: a clamped value, a maximum, and a
//! list of `Effect`s applied to it once per tick. The update ordering is
//! load-bearing: an effect applies on the tick it still has duration left
//! and reverses on the first tick it is seen expired, so a duration-3 boost
//! is visible for exactly three ticks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute names the kernel itself reads.
pub const HP: &str = "hp";
pub const AC: &str = "ac";
pub const STRENGTH: &str = "str";
pub const DEXTERITY: &str = "dex";
pub const ENCUMBRANCE: &str = "encumbrance";
pub const HUNGER: &str = "hunger";
pub const THIRST: &str = "thirst";

/// A timed modification to one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    /// Signed amount added to the value (or maximum) while active
    pub magnitude: i32,
    /// Apply to the maximum instead of the value
    pub on_max: bool,
    /// Ticks left; −1 never expires, 0 is expired
    pub remaining: i32,
    /// Whether the magnitude has been applied at least once
    pub activated: bool,
    /// A permanent effect is not reversed when it expires
    pub permanent: bool,
    /// A compounding effect re-applies its magnitude every tick
    pub compounding: bool,
}

impl Effect {
    /// Boost that lasts `duration` ticks and then reverses itself.
    pub fn timed(magnitude: i32, duration: i32) -> Self {
        Self {
            magnitude,
            on_max: false,
            remaining: duration,
            activated: false,
            permanent: false,
            compounding: false,
        }
    }

    /// One-shot change that sticks: fires once, swept on the next tick.
    pub fn instant(magnitude: i32) -> Self {
        Self {
            magnitude,
            on_max: false,
            remaining: 1,
            activated: false,
            permanent: true,
            compounding: false,
        }
    }

    /// Never-expiring drip, `magnitude` per tick.
    pub fn recurring(magnitude: i32) -> Self {
        Self {
            magnitude,
            on_max: false,
            remaining: -1,
            activated: false,
            permanent: true,
            compounding: true,
        }
    }

    pub fn on_max(mut self) -> Self {
        self.on_max = true;
        self
    }

    /// Fresh copy ready to be queued on an attribute. Content tables hand
    /// out effect templates; this strips any recorded activation.
    pub fn template(&self) -> Self {
        Self {
            activated: false,
            ..*self
        }
    }
}

/// Ordered effect lists keyed by attribute name, as carried by consumables
/// and weapon on-hit tables. BTreeMap keeps application order deterministic.
pub type EffectMap = BTreeMap<String, Vec<Effect>>;

/// A clamped stat with its pending effects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub value: i32,
    pub max: i32,
    pub effects: Vec<Effect>,
}

impl Attribute {
    pub fn new(value: i32, max: i32) -> Self {
        Self {
            value,
            max,
            effects: Vec::new(),
        }
    }

    /// Attribute starting at its maximum.
    pub fn full(max: i32) -> Self {
        Self::new(max, max)
    }

    pub fn add_effect(&mut self, effect: Effect) {
        self.effects.push(effect.template());
    }

    pub fn is_empty(&self) -> bool {
        self.value == 0
    }

    pub fn is_maxed(&self) -> bool {
        self.value == self.max
    }

    /// Direct damage/healing outside the effect system; clamps.
    pub fn adjust(&mut self, delta: i32) {
        self.value = (self.value + delta).clamp(0, self.max);
    }

    /// One tick of effect processing.
    ///
    /// For each effect: if it still has duration at entry, decrement a
    /// positive duration and apply the magnitude unless already applied
    /// (compounding effects re-apply every tick). If it is expired at entry,
    /// reverse the contribution unless permanent, and drop it. Apply happens
    /// before the expiry check, so a duration-1 compounding effect fires on
    /// its final tick.
    pub fn update(&mut self) {
        let mut i = 0;
        while i < self.effects.len() {
            let effect = &mut self.effects[i];
            if effect.remaining != 0 {
                if effect.remaining > 0 {
                    effect.remaining -= 1;
                }
                if !effect.activated || effect.compounding {
                    let magnitude = effect.magnitude;
                    let on_max = effect.on_max;
                    effect.activated = true;
                    if on_max {
                        self.max += magnitude;
                    } else {
                        self.value += magnitude;
                    }
                }
                i += 1;
            } else {
                let expired = self.effects.remove(i);
                if !expired.permanent && expired.activated {
                    if expired.on_max {
                        self.max -= expired.magnitude;
                    } else {
                        self.value -= expired.magnitude;
                    }
                }
            }
        }
        if self.max < 0 {
            self.max = 0;
        }
        self.value = self.value.clamp(0, self.max);
    }
}

/// A creature's named attributes, deterministic iteration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes(BTreeMap<String, Attribute>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, attribute: Attribute) {
        self.0.insert(name.into(), attribute);
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.0.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Attribute)> {
        self.0.iter()
    }

    /// Ticks every attribute's effects.
    pub fn update_all(&mut self) {
        for attribute in self.0.values_mut() {
            attribute.update();
        }
    }

    /// Current value of a named attribute, 0 when absent.
    pub fn value(&self, name: &str) -> i32 {
        self.0.get(name).map(|a| a.value).unwrap_or(0)
    }
}

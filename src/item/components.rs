//! Item capability components
//!
//! An item is a flat record plus optional capability sub-records; "is this a
//! weapon" is a null test, not a subclass check. At most one of the five
//! primary capabilities (weapon, armour, ammo, consumable, readable) may be
//! present on one item; cover and corpse ride along freely.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::creature::attributes::EffectMap;

/// Classic dice expression: roll `n` d`d` and add `bonus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageDice {
    pub n: u32,
    pub d: u32,
    pub bonus: i32,
}

impl DamageDice {
    pub fn new(n: u32, d: u32, bonus: i32) -> Self {
        Self { n, d, bonus }
    }

    /// A fixed amount with no dice.
    pub fn flat(bonus: i32) -> Self {
        Self { n: 0, d: 0, bonus }
    }

    pub fn roll(&self, rng: &mut ChaCha8Rng) -> i32 {
        let mut total = self.bonus;
        for _ in 0..self.n {
            if self.d > 0 {
                total += rng.gen_range(1..=self.d) as i32;
            }
        }
        total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmmoType {
    /// Melee weapons chamber nothing
    None,
    Bullet,
    Shell,
    Arrow,
}

/// Chambered rounds of a ranged weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Magazine {
    pub capacity: u32,
    pub loaded: u32,
}

impl Magazine {
    pub fn empty(capacity: u32) -> Self {
        Self {
            capacity,
            loaded: 0,
        }
    }

    pub fn is_full(&self) -> bool {
        self.loaded >= self.capacity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponComponent {
    pub damage: DamageDice,
    /// Cells of reach; 0 means melee only
    pub range: i32,
    pub ammo: AmmoType,
    pub magazine: Option<Magazine>,
    /// Effects applied to the victim's attributes on every hit
    #[serde(default)]
    pub on_hit: EffectMap,
}

impl WeaponComponent {
    pub fn melee(damage: DamageDice) -> Self {
        Self {
            damage,
            range: 0,
            ammo: AmmoType::None,
            magazine: None,
            on_hit: EffectMap::new(),
        }
    }

    pub fn ranged(damage: DamageDice, range: i32, ammo: AmmoType, capacity: u32) -> Self {
        Self {
            damage,
            range,
            ammo,
            magazine: Some(Magazine::empty(capacity)),
            on_hit: EffectMap::new(),
        }
    }

    pub fn is_ranged(&self) -> bool {
        self.range > 0
    }

    pub fn rounds_loaded(&self) -> u32 {
        self.magazine.map(|m| m.loaded).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmourComponent {
    pub ac_bonus: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoComponent {
    pub ammo: AmmoType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumableComponent {
    /// Attribute name → ordered effects queued when consumed
    pub effects: EffectMap,
}

/// Text with `[placeholder]` tokens resolved at read time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadableComponent {
    pub text: String,
}

impl ReadableComponent {
    /// Replaces each `[token]` with the resolver's answer; unresolved tokens
    /// are left in place, brackets and all.
    pub fn interpolate<F>(&self, resolve: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut out = String::with_capacity(self.text.len());
        let mut rest = self.text.as_str();
        while let Some(start) = rest.find('[') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match after.find(']') {
                Some(end) => {
                    let token = &after[..end];
                    match resolve(token) {
                        Some(value) => out.push_str(&value),
                        None => {
                            out.push('[');
                            out.push_str(token);
                            out.push(']');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyComponent {
    /// Lock family this key opens; −1 is a skeleton key
    pub type_id: i32,
    /// Uses survived so far; the component is removed at the wear limit
    pub wear: u8,
}

impl KeyComponent {
    pub fn new(type_id: i32) -> Self {
        Self { type_id, wear: 0 }
    }

    /// Key match rule: exact family, skeleton key, or a lock that never
    /// needed a key in the first place.
    pub fn fits(&self, door_key_id: i32) -> bool {
        self.type_id == -1 || door_key_id == -1 || self.type_id == door_key_id
    }
}

/// Marker: standing behind this item shields from ranged fire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverComponent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorpsePart {
    Body,
    Head,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpseComponent {
    /// Name of the creature this was
    pub creature: String,
    pub part: CorpsePart,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_flat_dice_roll_is_constant() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let dice = DamageDice::flat(5);
        for _ in 0..10 {
            assert_eq!(dice.roll(&mut rng), 5);
        }
    }

    #[test]
    fn test_dice_roll_within_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let dice = DamageDice::new(2, 6, 1);
        for _ in 0..100 {
            let roll = dice.roll(&mut rng);
            assert!((3..=13).contains(&roll), "roll {} out of range", roll);
        }
    }

    #[test]
    fn test_key_fit_rules() {
        let exact = KeyComponent::new(7);
        let skeleton = KeyComponent::new(-1);
        assert!(exact.fits(7));
        assert!(!exact.fits(8));
        assert!(skeleton.fits(7));
        assert!(skeleton.fits(41));
        // A lock with no key family accepts anything.
        assert!(exact.fits(-1));
    }

    #[test]
    fn test_magazine_full() {
        let mut magazine = Magazine::empty(6);
        assert!(!magazine.is_full());
        magazine.loaded = 6;
        assert!(magazine.is_full());
    }

    #[test]
    fn test_readable_interpolation() {
        let readable = ReadableComponent {
            text: "WANTED: [name], reward [reward] dollars".to_string(),
        };
        let out = readable.interpolate(|token| match token {
            "name" => Some("Black Jack".to_string()),
            "reward" => Some("500".to_string()),
            _ => None,
        });
        assert_eq!(out, "WANTED: Black Jack, reward 500 dollars");
    }

    #[test]
    fn test_readable_leaves_unknown_tokens() {
        let readable = ReadableComponent {
            text: "signed, [author]".to_string(),
        };
        let out = readable.interpolate(|_| None);
        assert_eq!(out, "signed, [author]");
    }

    #[test]
    fn test_readable_unterminated_bracket() {
        let readable = ReadableComponent {
            text: "torn page [".to_string(),
        };
        assert_eq!(readable.interpolate(|_| None), "torn page [");
    }
}

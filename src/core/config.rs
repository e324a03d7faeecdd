//! Simulation tuning constants
//!
//! All gameplay magic numbers are collected here with notes on how they
//! interact, so balance changes never require hunting through the systems.

use serde::{Deserialize, Serialize};

/// Tuning knobs for the simulation systems
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    // === VISION ===
    /// How far a creature sees, in cells (Euclidean radius).
    ///
    /// Also bounds the planner window: every goal map is (2d+1) cells on a
    /// side, so raising this has a quadratic cost per actor per tick.
    pub vision_distance: i32,

    // === COMBAT ===
    /// Penalty to the ranged to-hit roll when the target is behind cover.
    pub cover_penalty: i32,

    // === DOORS & KEYS ===
    /// Chance that a use of a key advances its wear counter.
    pub key_break_chance: f64,

    /// Wear count at which the key component is removed from the item.
    pub key_wear_limit: u8,

    // === LAW ===
    /// A recorded theft or pickpocket bounty is this multiple of the
    /// stolen item's value.
    pub theft_bounty_multiplier: i64,

    /// Bounty posted for a witnessed attack on a neutral creature, in cents.
    pub attack_bounty: i64,

    /// Murder bounties are drawn uniformly from this inclusive range, in
    /// cents. Murder is the one crime whose price the town haggles over.
    pub murder_bounty_min: i64,
    pub murder_bounty_max: i64,

    // === SURVIVAL ===
    /// Ticks between one-point hunger increases for the player.
    pub hunger_interval: u64,

    /// Ticks between one-point thirst increases for the player. Thirst
    /// outpaces hunger, which is what makes canteens worth their weight.
    pub thirst_interval: u64,

    // === WANDERING ===
    /// Radius of the box a wandering creature picks random waypoints from.
    pub wander_radius: i32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            vision_distance: 20,
            cover_penalty: 5,
            key_break_chance: 0.05,
            key_wear_limit: 3,
            theft_bounty_multiplier: 2,
            attack_bounty: 500,
            murder_bounty_min: 10_000,
            murder_bounty_max: 100_000,
            hunger_interval: 50,
            thirst_interval: 30,
            wander_radius: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vision_distance() {
        assert_eq!(SimulationConfig::default().vision_distance, 20);
    }

    #[test]
    fn test_murder_bounty_range_is_ordered() {
        let config = SimulationConfig::default();
        assert!(config.murder_bounty_min <= config.murder_bounty_max);
    }
}

//! Violence and light fingers: melee, ranged fire, pickpocketing
//!
//! To-hit rolls are d20-style: `1 + uniform(0,19) + ability bonus` against
//! the target's effective armour class. Every draw comes from the context's
//! single RNG stream, in a fixed order, so runs replay exactly.

use rand::Rng;

use crate::ai::roles::AiState;
use crate::core::context::SimulationContext;
use crate::core::error::{GulchError, Result};
use crate::core::types::CreatureId;
use crate::creature::attributes::{EffectMap, HP};
use crate::creature::Alignment;
use crate::events::{CrimeDetails, CrimeKind, Event};
use crate::world::visibility::{behind_cover, is_visible};
use crate::world::World;

struct Strike {
    hit: bool,
    damage: i32,
    killed: bool,
}

/// Applies a resolved hit to the victim and reports whether it killed.
fn land_hit(
    world: &mut World,
    target: &CreatureId,
    damage: i32,
    on_hit: &EffectMap,
) -> Result<bool> {
    let victim = world
        .creature_mut(target)
        .ok_or_else(|| GulchError::CreatureNotFound(target.to_string()))?;
    if let Some(hp) = victim.attributes.get_mut(HP) {
        hp.adjust(-damage);
    }
    for (attribute, effects) in on_hit {
        if let Some(attr) = victim.attributes.get_mut(attribute) {
            for effect in effects {
                attr.add_effect(effect.template());
            }
        }
    }
    Ok(victim.death_due())
}

/// Shared aftermath of any attack: the Attack event, the kill, and the
/// Murder event when the victim was a neutral.
fn settle_attack(
    world: &mut World,
    ctx: &mut SimulationContext,
    actor: &CreatureId,
    actor_name: &str,
    target: &CreatureId,
    strike: Strike,
) -> Result<()> {
    let (victim_pos, victim_alignment, victim_name) = {
        let victim = world
            .creature(target)
            .ok_or_else(|| GulchError::CreatureNotFound(target.to_string()))?;
        (victim.pos, victim.alignment, victim.name.clone())
    };

    let id = ctx.events.next_crime_id();
    ctx.events.emit(Event::Attack(CrimeDetails {
        id,
        perpetrator: actor.clone(),
        perpetrator_name: actor_name.to_string(),
        location: victim_pos,
        kind: CrimeKind::Attack,
        value: 0,
        victim: Some(target.clone()),
        item: None,
    }));

    let player_involved = world.creature(actor).map(|c| c.is_player()).unwrap_or(false);
    if player_involved {
        if strike.hit {
            ctx.messages
                .enqueue(format!("you hit {} for {}", victim_name, strike.damage));
        } else {
            ctx.messages.enqueue(format!("you miss {}", victim_name));
        }
    }

    if strike.killed {
        world.kill_creature(target)?;
        if victim_alignment == Alignment::Neutral {
            let id = ctx.events.next_crime_id();
            ctx.events.emit(Event::Murder(CrimeDetails {
                id,
                perpetrator: actor.clone(),
                perpetrator_name: actor_name.to_string(),
                location: victim_pos,
                kind: CrimeKind::Murder,
                value: 0,
                victim: Some(target.clone()),
                item: None,
            }));
        }
    }
    Ok(())
}

/// Melee swing at an adjacent creature. Damage is the weapon (or natural)
/// dice plus the strength bonus; weapon on-hit effects ride along.
pub fn melee(
    world: &mut World,
    ctx: &mut SimulationContext,
    actor: &CreatureId,
    target: &CreatureId,
) -> Result<()> {
    let (actor_pos, actor_name, str_bonus, dice, on_hit) = {
        let a = world
            .creature(actor)
            .ok_or_else(|| GulchError::CreatureNotFound(actor.to_string()))?;
        let on_hit = a
            .equipped_weapon()
            .map(|w| w.on_hit.clone())
            .unwrap_or_default();
        (a.pos, a.name.clone(), a.str_bonus(), a.attack_dice(), on_hit)
    };
    let (target_pos, target_ac, target_alive) = {
        let t = world
            .creature(target)
            .ok_or_else(|| GulchError::CreatureNotFound(target.to_string()))?;
        (t.pos, t.effective_ac(), t.alive)
    };
    if !target_alive {
        return Err(GulchError::NothingThere);
    }
    if !actor_pos.is_adjacent(target_pos) {
        return Err(GulchError::OutOfRange);
    }

    let roll = 1 + ctx.rng.gen_range(0..20) + str_bonus;
    let strike = if roll > target_ac {
        let damage = (dice.roll(&mut ctx.rng) + str_bonus).max(0);
        let killed = land_hit(world, target, damage, &on_hit)?;
        Strike {
            hit: true,
            damage,
            killed,
        }
    } else {
        Strike {
            hit: false,
            damage: 0,
            killed: false,
        }
    };
    tracing::debug!(%actor, %target, roll, target_ac, hit = strike.hit, "melee attack");
    settle_attack(world, ctx, actor, &actor_name, target, strike)
}

/// Gunfire. Needs a loaded ranged weapon, the target within its range and
/// line of fire; one round is spent whatever happens, and cover costs the
/// shooter a to-hit penalty.
pub fn ranged(
    world: &mut World,
    ctx: &mut SimulationContext,
    actor: &CreatureId,
    target: &CreatureId,
) -> Result<()> {
    let (actor_pos, actor_name, dex_bonus, dice, range, on_hit) = {
        let a = world
            .creature(actor)
            .ok_or_else(|| GulchError::CreatureNotFound(actor.to_string()))?;
        let weapon = a.ranged_weapon().ok_or(GulchError::NoWeapon)?;
        if weapon.rounds_loaded() == 0 {
            return Err(GulchError::NoAmmo);
        }
        (
            a.pos,
            a.name.clone(),
            a.dex_bonus(),
            weapon.damage,
            weapon.range,
            weapon.on_hit.clone(),
        )
    };
    let (target_pos, target_ac, target_alive) = {
        let t = world
            .creature(target)
            .ok_or_else(|| GulchError::CreatureNotFound(target.to_string()))?;
        (t.pos, t.effective_ac(), t.alive)
    };
    if !target_alive {
        return Err(GulchError::NothingThere);
    }
    if actor_pos.distance_sq(target_pos) > (range as i64) * (range as i64)
        || !is_visible(world, actor_pos, target_pos, range)
    {
        return Err(GulchError::OutOfRange);
    }

    // The round is spent even on a miss.
    if let Some(magazine) = world
        .creature_mut(actor)
        .and_then(|a| a.equipped_weapon_mut())
        .and_then(|w| w.magazine.as_mut())
    {
        magazine.loaded -= 1;
    }

    let cover_penalty = if behind_cover(world, actor_pos, target_pos) {
        ctx.config.cover_penalty
    } else {
        0
    };
    let roll = 1 + ctx.rng.gen_range(0..20) + dex_bonus - cover_penalty;
    let strike = if roll > target_ac {
        let damage = dice.roll(&mut ctx.rng).max(0);
        let killed = land_hit(world, target, damage, &on_hit)?;
        Strike {
            hit: true,
            damage,
            killed,
        }
    } else {
        Strike {
            hit: false,
            damage: 0,
            killed: false,
        }
    };
    tracing::debug!(%actor, %target, roll, target_ac, cover_penalty, hit = strike.hit, "ranged attack");
    settle_attack(world, ctx, actor, &actor_name, target, strike)
}

/// Light fingers on an adjacent creature: a dexterity contest. Success
/// moves one random item (or a cut of the victim's cash) and is a crime if
/// seen; failure costs the turn and sours the victim on the player.
pub fn pickpocket(
    world: &mut World,
    ctx: &mut SimulationContext,
    actor: &CreatureId,
    target: &CreatureId,
) -> Result<()> {
    let (actor_pos, actor_name, dex_bonus, is_player) = {
        let a = world
            .creature(actor)
            .ok_or_else(|| GulchError::CreatureNotFound(actor.to_string()))?;
        (a.pos, a.name.clone(), a.dex_bonus(), a.is_player())
    };
    let (target_pos, target_dex, target_alive, target_name) = {
        let t = world
            .creature(target)
            .ok_or_else(|| GulchError::CreatureNotFound(target.to_string()))?;
        (t.pos, t.dex_bonus(), t.alive, t.name.clone())
    };
    if !target_alive {
        return Err(GulchError::NothingThere);
    }
    if !actor_pos.is_adjacent(target_pos) {
        return Err(GulchError::OutOfRange);
    }

    let roll = 1 + ctx.rng.gen_range(0..20) + dex_bonus;
    if roll <= 10 + target_dex {
        // Caught in the act. No transfer, and the mark remembers.
        if is_player {
            ctx.messages
                .enqueue(format!("{} catches your hand in their pocket", target_name));
            if let Some(t) = world.creature_mut(target) {
                if let AiState::Townsman { player_hostile, .. } = &mut t.ai {
                    *player_hostile = true;
                }
            }
        }
        return Ok(());
    }

    // Lift a random item, or failing that a cut of the cash.
    let (value, item_name) = {
        let t = world
            .creature_mut(target)
            .ok_or_else(|| GulchError::CreatureNotFound(target.to_string()))?;
        if !t.inventory.is_empty() {
            let slot = ctx.rng.gen_range(0..t.inventory.len());
            let item = t.inventory.remove(slot);
            t.refresh_encumbrance();
            let value = item.value;
            let name = item.name.clone();
            let a = world
                .creature_mut(actor)
                .ok_or_else(|| GulchError::CreatureNotFound(actor.to_string()))?;
            let mut item = item;
            item.owner = Some(actor.clone());
            a.inventory.push(item);
            a.refresh_encumbrance();
            (value, Some(name))
        } else if t.money > 0 {
            let cut = ctx.rng.gen_range(1..=t.money);
            t.money -= cut;
            let a = world
                .creature_mut(actor)
                .ok_or_else(|| GulchError::CreatureNotFound(actor.to_string()))?;
            a.money += cut;
            (cut, None)
        } else {
            return Err(GulchError::NothingThere);
        }
    };

    let id = ctx.events.next_crime_id();
    ctx.events.emit(Event::Pickpocket(CrimeDetails {
        id,
        perpetrator: actor.clone(),
        perpetrator_name: actor_name,
        location: target_pos,
        kind: CrimeKind::Pickpocket,
        value,
        victim: Some(target.clone()),
        item: item_name,
    }));
    Ok(())
}

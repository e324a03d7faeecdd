//! Item-handling actions: pickup, drop, consume, load

use crate::core::context::SimulationContext;
use crate::core::error::{GulchError, Result};
use crate::core::types::CreatureId;
use crate::events::{CrimeDetails, CrimeKind, Event};
use crate::world::World;

/// Lifts everything on the actor's cell into its inventory, encumbrance
/// permitting; over-weight items stay on the ground. Ownership transfers to
/// the taker, and taking what belonged to someone else is a theft.
pub fn pickup(world: &mut World, ctx: &mut SimulationContext, actor: &CreatureId) -> Result<()> {
    let (pos, actor_name, is_player) = {
        let c = world
            .creature(actor)
            .ok_or_else(|| GulchError::CreatureNotFound(actor.to_string()))?;
        (c.pos, c.name.clone(), c.is_player())
    };
    let stack = world.take_items(pos);
    if stack.is_empty() {
        return Err(GulchError::NothingThere);
    }

    let mut leftover = Vec::new();
    let mut thefts = Vec::new();
    {
        let c = world
            .creature_mut(actor)
            .ok_or_else(|| GulchError::CreatureNotFound(actor.to_string()))?;
        for mut item in stack {
            if !c.can_carry(&item) {
                leftover.push(item);
                continue;
            }
            if let Some(owner) = &item.owner {
                if owner != actor {
                    thefts.push((item.name.clone(), item.value, owner.clone()));
                }
            }
            item.owner = Some(actor.clone());
            c.inventory.push(item);
        }
        c.refresh_encumbrance();
    }
    let left_behind = !leftover.is_empty();
    for item in leftover {
        world.place_item(pos, item)?;
    }

    for (name, value, owner) in thefts {
        let id = ctx.events.next_crime_id();
        ctx.events.emit(Event::Theft(CrimeDetails {
            id,
            perpetrator: actor.clone(),
            perpetrator_name: actor_name.clone(),
            location: pos,
            kind: CrimeKind::Theft,
            value,
            victim: Some(owner),
            item: Some(name),
        }));
    }
    if is_player && left_behind {
        ctx.messages.enqueue("some of it is too heavy to carry");
    }
    Ok(())
}

/// Moves an inventory item onto the actor's cell. The recorded owner stays,
/// so a thief's loot stays traceable. Dropping something owned by another
/// creature is, defensively, a theft too; the planner never produces it.
pub fn drop_item(
    world: &mut World,
    ctx: &mut SimulationContext,
    actor: &CreatureId,
    index: usize,
) -> Result<()> {
    let (pos, actor_name, item) = {
        let c = world
            .creature_mut(actor)
            .ok_or_else(|| GulchError::CreatureNotFound(actor.to_string()))?;
        if index >= c.inventory.len() {
            return Err(GulchError::ItemNotFound);
        }
        let item = c.inventory.remove(index);
        c.refresh_encumbrance();
        (c.pos, c.name.clone(), item)
    };
    if let Some(owner) = &item.owner {
        if owner != actor {
            let id = ctx.events.next_crime_id();
            ctx.events.emit(Event::Theft(CrimeDetails {
                id,
                perpetrator: actor.clone(),
                perpetrator_name: actor_name,
                location: pos,
                kind: CrimeKind::Theft,
                value: item.value,
                victim: Some(owner.clone()),
                item: Some(item.name.clone()),
            }));
        }
    }
    world.place_item(pos, item)
}

/// Applies a consumable's effects to the actor's attributes and destroys it.
/// The effects take hold at the next attribute update.
pub fn consume(
    world: &mut World,
    ctx: &mut SimulationContext,
    actor: &CreatureId,
    index: usize,
) -> Result<()> {
    let c = world
        .creature_mut(actor)
        .ok_or_else(|| GulchError::CreatureNotFound(actor.to_string()))?;
    let effects = c
        .inventory
        .get(index)
        .ok_or(GulchError::ItemNotFound)?
        .components
        .consumable
        .as_ref()
        .map(|consumable| consumable.effects.clone())
        .ok_or(GulchError::WrongItemKind)?;
    let item = c.inventory.remove(index);
    for (attribute, effects) in &effects {
        if let Some(attr) = c.attributes.get_mut(attribute) {
            for effect in effects {
                attr.add_effect(effect.template());
            }
        }
    }
    c.refresh_encumbrance();
    if c.is_player() {
        ctx.messages.enqueue(format!("you consume the {}", item.name));
    }
    Ok(())
}

/// Transfers rounds from carried ammo into the equipped weapon until the
/// magazine is full or the ammo runs out. Each ammo item is one round.
pub fn load(world: &mut World, actor: &CreatureId) -> Result<()> {
    let c = world
        .creature_mut(actor)
        .ok_or_else(|| GulchError::CreatureNotFound(actor.to_string()))?;
    let weapon = c
        .weapon
        .as_mut()
        .and_then(|w| w.components.weapon.as_mut())
        .ok_or(GulchError::NoWeapon)?;
    let wanted = weapon.ammo;
    let magazine = weapon.magazine.as_mut().ok_or(GulchError::NoWeapon)?;

    let mut transferred = 0;
    while !magazine.is_full() {
        let Some(slot) = c
            .inventory
            .iter()
            .position(|i| i.components.ammo.map(|a| a.ammo == wanted).unwrap_or(false))
        else {
            break;
        };
        c.inventory.remove(slot);
        magazine.loaded += 1;
        transferred += 1;
    }
    if transferred == 0 {
        return Err(GulchError::NoAmmo);
    }
    c.refresh_encumbrance();
    Ok(())
}

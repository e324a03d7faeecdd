//! Save and load: the whole world through a self-describing text encoding
//!
//! The snapshot is plain JSON: per chunk, the terrain matrix, the derived
//! passable and vision matrices (open and closed), the door-state matrix and
//! the per-cell item stacks; then the live creatures with their full
//! attribute, effect, inventory and AI state; then the sheriff offices.
//! Occupancy and mount-rider links are re-derived from creature records
//! after load, and every structural invariant is re-checked — a malformed
//! save aborts the load and leaves the caller's world untouched.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{GulchError, Result};
use crate::core::types::{Position, Tick};
use crate::creature::Creature;
use crate::item::Item;
use crate::law::SheriffOffice;
use crate::world::chunk::{Chunk, CHUNK_SIZE};
use crate::world::tile::{DoorState, Terrain, Tile};
use crate::world::World;

#[derive(Debug, Serialize, Deserialize)]
struct SavedChunk {
    terrain: Vec<Terrain>,
    passable: Vec<bool>,
    /// Blocks-vision with doors open
    vision_open: Vec<bool>,
    /// Blocks-vision with doors closed
    vision_closed: Vec<bool>,
    doors: Vec<Option<DoorState>>,
    items: Vec<Vec<Item>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WorldSnapshot {
    width: i32,
    height: i32,
    tick: Tick,
    chunks: Vec<SavedChunk>,
    creatures: Vec<Creature>,
    offices: Vec<SheriffOffice>,
}

fn saved_chunk(chunk: &Chunk) -> SavedChunk {
    let cells = (CHUNK_SIZE * CHUNK_SIZE) as usize;
    let mut saved = SavedChunk {
        terrain: Vec::with_capacity(cells),
        passable: Vec::with_capacity(cells),
        vision_open: Vec::with_capacity(cells),
        vision_closed: Vec::with_capacity(cells),
        doors: Vec::with_capacity(cells),
        items: Vec::with_capacity(cells),
    };
    for ly in 0..CHUNK_SIZE {
        for lx in 0..CHUNK_SIZE {
            let tile = chunk.tile(lx, ly);
            let terrain = tile.terrain;
            saved.terrain.push(terrain);
            saved.passable.push(terrain.base_passable());
            saved.vision_open.push(terrain.base_blocks_vision());
            saved.vision_closed.push(match &tile.door {
                Some(door) => door.blocks_vision_when_closed,
                None => terrain.base_blocks_vision(),
            });
            saved.doors.push(tile.door);
            saved.items.push(tile.items.clone());
        }
    }
    saved
}

/// Serializes the full world state.
pub fn save(world: &World) -> Result<String> {
    let snapshot = WorldSnapshot {
        width: world.width(),
        height: world.height(),
        tick: world.tick,
        chunks: world.chunks.iter().map(saved_chunk).collect(),
        creatures: world.creatures().cloned().collect(),
        offices: world.offices.clone(),
    };
    tracing::info!(
        creatures = snapshot.creatures.len(),
        offices = snapshot.offices.len(),
        "saving world"
    );
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

fn malformed(detail: impl Into<String>) -> GulchError {
    GulchError::MalformedSave(detail.into())
}

/// Rebuilds a world from a snapshot, re-deriving occupancy and re-linking
/// mounts by id. Any inconsistency fails the whole load.
pub fn load(text: &str) -> Result<World> {
    let snapshot: WorldSnapshot =
        serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;
    if snapshot.width <= 0 || snapshot.height <= 0 {
        return Err(malformed("non-positive dimensions"));
    }

    let mut world = World::new(snapshot.width, snapshot.height);
    if snapshot.chunks.len() != world.chunks.len() {
        return Err(malformed(format!(
            "expected {} chunks, found {}",
            world.chunks.len(),
            snapshot.chunks.len()
        )));
    }

    let cells = (CHUNK_SIZE * CHUNK_SIZE) as usize;
    for (index, saved) in snapshot.chunks.iter().enumerate() {
        if saved.terrain.len() != cells
            || saved.passable.len() != cells
            || saved.vision_open.len() != cells
            || saved.vision_closed.len() != cells
            || saved.doors.len() != cells
            || saved.items.len() != cells
        {
            return Err(malformed(format!("chunk {} has truncated matrices", index)));
        }
        let chunk = &mut world.chunks[index];
        for ly in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let slot = (ly * CHUNK_SIZE + lx) as usize;
                let terrain = saved.terrain[slot];
                if saved.doors[slot].is_some() != terrain.is_door() {
                    return Err(malformed(format!(
                        "chunk {} cell {}: door state does not match terrain",
                        index, slot
                    )));
                }
                if saved.passable[slot] != terrain.base_passable() {
                    return Err(malformed(format!(
                        "chunk {} cell {}: passable matrix disagrees with terrain",
                        index, slot
                    )));
                }
                let tile = chunk.tile_mut(lx, ly);
                *tile = Tile::new(terrain);
                tile.door = saved.doors[slot];
                tile.items = saved.items[slot].clone();
            }
        }
    }

    // Creatures: rebuild the arena, the id index and tile occupancy.
    let mut ids = AHashMap::new();
    for (slot, creature) in snapshot.creatures.iter().enumerate() {
        if ids.insert(creature.id().clone(), slot).is_some() {
            return Err(malformed(format!("duplicate creature id {}", creature.id())));
        }
    }
    for creature in &snapshot.creatures {
        let p = creature.pos;
        if !world.in_bounds(p) {
            return Err(malformed(format!("{} stands out of bounds", creature.id())));
        }
        // Link check, both directions.
        if let Some(mount) = &creature.mount {
            let paired = ids
                .get(mount)
                .map(|&i| snapshot.creatures[i].rider.as_ref() == Some(creature.id()))
                .unwrap_or(false);
            if !paired {
                return Err(malformed(format!("{} rides an unlinked mount", creature.id())));
            }
        }
        if let Some(rider) = &creature.rider {
            let paired = ids
                .get(rider)
                .map(|&i| snapshot.creatures[i].mount.as_ref() == Some(creature.id()))
                .unwrap_or(false);
            if !paired {
                return Err(malformed(format!("{} carries an unlinked rider", creature.id())));
            }
        }
    }
    for creature in snapshot.creatures {
        let p = creature.pos;
        let id = creature.id().clone();
        if creature.rider.is_none() {
            // Mounted pairs occupy through the rider only.
            let tile = world
                .tile_at(p)
                .ok_or_else(|| malformed(format!("{} has no tile", id)))?;
            if !tile.is_passable() || tile.occupant().is_some() {
                return Err(malformed(format!("{} stands on an invalid cell", id)));
            }
        }
        let slot = world.creatures.len();
        world.creatures.push(creature);
        world.index.insert(id.clone(), slot);
        if world.creatures[slot].rider.is_none() {
            world.set_occupant(p, Some(id))?;
        }
    }

    world.offices = snapshot.offices;
    world.tick = snapshot.tick;
    tracing::info!(tick = world.tick, "world loaded");
    Ok(world)
}

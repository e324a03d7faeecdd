//! The world: chunked tile grid plus the creature arena
//!
//! The world exclusively owns tiles and creatures. Creatures live in an
//! arena indexed by stable string id; dead ones are tombstoned in place so
//! ids keep resolving for ledgers and corpse bookkeeping. Tile occupancy is
//! only ever touched through the operations here, which keep the
//! one-creature-per-cell invariant.

pub mod chunk;
pub mod snapshot;
pub mod tile;
pub mod visibility;

use ahash::AHashMap;
use std::cmp::Reverse;

use crate::core::error::{GulchError, Result};
use crate::core::types::{CreatureId, Icon, Position, Tick};
use crate::creature::Creature;
use crate::item::components::{CorpseComponent, CorpsePart, CoverComponent};
use crate::item::Item;
use crate::law::SheriffOffice;
use chunk::{Chunk, CHUNK_SIZE};
use tile::{DoorState, Terrain, Tile};

pub struct World {
    width: i32,
    height: i32,
    chunks_w: i32,
    chunks: Vec<Chunk>,
    creatures: Vec<Creature>,
    index: AHashMap<CreatureId, usize>,
    pub offices: Vec<SheriffOffice>,
    pub tick: Tick,
}

impl World {
    /// Builds an all-ground world. The chunk grid rounds up; `in_bounds`
    /// gates the logical rectangle.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "world dimensions must be positive");
        let chunks_w = (width + CHUNK_SIZE - 1) / CHUNK_SIZE;
        let chunks_h = (height + CHUNK_SIZE - 1) / CHUNK_SIZE;
        Self {
            width,
            height,
            chunks_w,
            chunks: (0..chunks_w * chunks_h)
                .map(|_| Chunk::new(Terrain::Ground))
                .collect(),
            creatures: Vec::new(),
            index: AHashMap::new(),
            offices: Vec::new(),
            tick: 0,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, p: Position) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    // === Tiles ===

    pub fn tile_at(&self, p: Position) -> Option<&Tile> {
        if !self.in_bounds(p) {
            return None;
        }
        let chunk = &self.chunks[(p.y / CHUNK_SIZE * self.chunks_w + p.x / CHUNK_SIZE) as usize];
        Some(chunk.tile(p.x % CHUNK_SIZE, p.y % CHUNK_SIZE))
    }

    pub fn tile_at_mut(&mut self, p: Position) -> Option<&mut Tile> {
        if !self.in_bounds(p) {
            return None;
        }
        let chunk =
            &mut self.chunks[(p.y / CHUNK_SIZE * self.chunks_w + p.x / CHUNK_SIZE) as usize];
        Some(chunk.tile_mut(p.x % CHUNK_SIZE, p.y % CHUNK_SIZE))
    }

    fn tile_req(&self, p: Position) -> Result<&Tile> {
        self.tile_at(p).ok_or(GulchError::OutOfBounds(p.x, p.y))
    }

    fn tile_req_mut(&mut self, p: Position) -> Result<&mut Tile> {
        self.tile_at_mut(p).ok_or(GulchError::OutOfBounds(p.x, p.y))
    }

    pub fn set_tile_kind(&mut self, p: Position, terrain: Terrain) -> Result<()> {
        self.tile_req_mut(p)?.set_terrain(terrain);
        Ok(())
    }

    pub fn is_passable(&self, p: Position) -> bool {
        self.tile_at(p).map(|t| t.is_passable()).unwrap_or(false)
    }

    /// Out-of-bounds cells block vision.
    pub fn blocks_vision(&self, p: Position) -> bool {
        self.tile_at(p).map(|t| t.blocks_vision()).unwrap_or(true)
    }

    // === Items on tiles ===

    pub fn place_item(&mut self, p: Position, item: Item) -> Result<()> {
        self.tile_req_mut(p)?.items.push(item);
        Ok(())
    }

    pub fn items_at(&self, p: Position) -> &[Item] {
        self.tile_at(p).map(|t| t.items.as_slice()).unwrap_or(&[])
    }

    pub fn remove_item(&mut self, p: Position, index: usize) -> Result<Item> {
        let tile = self.tile_req_mut(p)?;
        if index >= tile.items.len() {
            return Err(GulchError::ItemNotFound);
        }
        Ok(tile.items.remove(index))
    }

    /// Empties the tile's item stack.
    pub fn take_items(&mut self, p: Position) -> Vec<Item> {
        self.tile_at_mut(p)
            .map(|t| std::mem::take(&mut t.items))
            .unwrap_or_default()
    }

    // === Doors ===

    pub fn door_state(&self, p: Position) -> Option<DoorState> {
        self.tile_at(p).and_then(|t| t.door)
    }

    /// Opens or closes a door. Opening a locked door fails with `Locked`;
    /// closing requires the cell to be clear of creatures.
    pub fn toggle_door(&mut self, p: Position, open: bool) -> Result<()> {
        let occupied = self.tile_req(p)?.occupant().is_some();
        let tile = self.tile_req_mut(p)?;
        let door = tile.door.as_mut().ok_or(GulchError::NoDoor)?;
        if open && door.locked {
            return Err(GulchError::Locked);
        }
        if !open && occupied {
            return Err(GulchError::Blocked);
        }
        door.open = open;
        Ok(())
    }

    /// Throws the bolt. Key matching and wear belong to the Lock action;
    /// this only refuses on open doors.
    pub fn set_door_locked(&mut self, p: Position, locked: bool) -> Result<()> {
        let tile = self.tile_req_mut(p)?;
        let door = tile.door.as_mut().ok_or(GulchError::NoDoor)?;
        if door.open {
            return Err(GulchError::DoorOpen);
        }
        door.locked = locked;
        Ok(())
    }

    // === Creatures ===

    /// Adds a creature to the arena and its tile. The cell must be free and
    /// passable; ids must be unique.
    pub fn place_creature(&mut self, creature: Creature) -> Result<()> {
        let p = creature.pos;
        assert!(
            !self.index.contains_key(creature.id()),
            "duplicate creature id: {}",
            creature.id()
        );
        if !self.in_bounds(p) {
            return Err(GulchError::OutOfBounds(p.x, p.y));
        }
        let tile = self.tile_req(p)?;
        if !tile.is_passable() || tile.occupant().is_some() {
            return Err(GulchError::Blocked);
        }
        let id = creature.id().clone();
        let idx = self.creatures.len();
        self.creatures.push(creature);
        self.index.insert(id.clone(), idx);
        self.tile_req_mut(p)?.occupant = Some(id);
        Ok(())
    }

    pub fn creature(&self, id: &CreatureId) -> Option<&Creature> {
        self.index.get(id).map(|&i| &self.creatures[i])
    }

    pub fn creature_mut(&mut self, id: &CreatureId) -> Option<&mut Creature> {
        let idx = *self.index.get(id)?;
        Some(&mut self.creatures[idx])
    }

    fn creature_req(&self, id: &CreatureId) -> Result<&Creature> {
        self.creature(id)
            .ok_or_else(|| GulchError::CreatureNotFound(id.to_string()))
    }

    pub fn creature_at(&self, p: Position) -> Option<&Creature> {
        let id = self.tile_at(p)?.occupant()?;
        self.creature(id)
    }

    /// Live creatures, arena order.
    pub fn creatures(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.iter().filter(|c| c.alive)
    }

    /// Ids of live creatures, arena order.
    pub fn creature_ids(&self) -> Vec<CreatureId> {
        self.creatures()
            .map(|c| c.id().clone())
            .collect()
    }

    /// Within-tick actor order: initiative descending, insertion order as
    /// the stable tiebreak.
    pub fn initiative_order(&self) -> Vec<CreatureId> {
        let mut order: Vec<(usize, &Creature)> = self
            .creatures
            .iter()
            .enumerate()
            .filter(|(_, c)| c.alive)
            .collect();
        order.sort_by_key(|(idx, c)| (Reverse(c.initiative), *idx));
        order.into_iter().map(|(_, c)| c.id().clone()).collect()
    }

    /// Moves a creature one cell (or further; callers enforce adjacency).
    /// The destination must be in-bounds, passable and unoccupied; the
    /// source cell is vacated atomically.
    pub fn move_creature(&mut self, id: &CreatureId, to: Position) -> Result<()> {
        let from = self.creature_req(id)?.pos;
        let dest = match self.tile_at(to) {
            Some(t) => t,
            None => return Err(GulchError::Blocked),
        };
        if !dest.is_passable() || dest.occupant().is_some() {
            return Err(GulchError::Blocked);
        }
        {
            let src = self.tile_req_mut(from)?;
            debug_assert_eq!(src.occupant.as_ref(), Some(id), "occupancy out of sync");
            src.occupant = None;
        }
        self.tile_req_mut(to)?.occupant = Some(id.clone());
        if let Some(creature) = self.creature_mut(id) {
            creature.pos = to;
        }
        Ok(())
    }

    /// Occupancy plumbing for mount transfers. Keeps the invariant checks in
    /// one place; not part of the public surface.
    pub(crate) fn set_occupant(&mut self, p: Position, id: Option<CreatureId>) -> Result<()> {
        let tile = self.tile_req_mut(p)?;
        if id.is_some() && tile.occupant.is_some() && tile.occupant != id {
            return Err(GulchError::Blocked);
        }
        tile.occupant = id;
        Ok(())
    }

    /// Tombstones a creature and drops its remains: body and head corpses,
    /// the full inventory, and its cash as a coin purse. Mount links on both
    /// sides are cleared; a surviving mount takes over the cell.
    pub fn kill_creature(&mut self, id: &CreatureId) -> Result<()> {
        let (pos, name, money, mount, rider, mut drops) = {
            let creature = self
                .creature_mut(id)
                .ok_or_else(|| GulchError::CreatureNotFound(id.to_string()))?;
            creature.alive = false;
            let mut drops = std::mem::take(&mut creature.inventory);
            if let Some(weapon) = creature.weapon.take() {
                drops.push(weapon);
            }
            if let Some(armour) = creature.armour.take() {
                drops.push(armour);
            }
            let money = creature.money;
            creature.money = 0;
            (
                creature.pos,
                creature.name.clone(),
                money,
                creature.mount.take(),
                creature.rider.take(),
                drops,
            )
        };
        tracing::debug!(victim = %id, %pos, "creature died");

        if self.tile_at(pos).and_then(|t| t.occupant()) == Some(id) {
            self.set_occupant(pos, None)?;
        }

        let mut body = Item::new(
            format!("body of {}", name),
            Icon::new('%', 1),
            40.0,
            0,
        );
        body.components.corpse = Some(CorpseComponent {
            creature: name.clone(),
            part: CorpsePart::Body,
        });
        body.components.cover = Some(CoverComponent);
        let mut head = Item::new(format!("head of {}", name), Icon::new('%', 1), 4.0, 0);
        head.components.corpse = Some(CorpseComponent {
            creature: name.clone(),
            part: CorpsePart::Head,
        });

        let mut remains = vec![body, head];
        remains.append(&mut drops);
        if money > 0 {
            remains.push(Item::new("coin purse", Icon::new('$', 11), 0.2, money));
        }
        for item in remains {
            self.place_item(pos, item)?;
        }

        // Unlink the other half of a mount pair.
        if let Some(mount_id) = mount {
            let mut restore_at = None;
            if let Some(mount) = self.creature_mut(&mount_id) {
                mount.rider = None;
                if mount.alive {
                    restore_at = Some(mount.pos);
                }
            }
            // The dead rider vacated the cell; the mount takes it.
            if let Some(cell) = restore_at {
                self.set_occupant(cell, Some(mount_id))?;
            }
        }
        if let Some(rider_id) = rider {
            if let Some(rider) = self.creature_mut(&rider_id) {
                rider.mount = None;
            }
        }
        Ok(())
    }

    // === Rendering interface ===

    /// Terminal adapter view of one cell: terrain icon plus an optional
    /// overlay (occupant, else top item).
    pub fn cell_view(&self, p: Position) -> Option<(Icon, Option<Icon>)> {
        let tile = self.tile_at(p)?;
        let terrain = match tile.door {
            Some(door) if door.open => Icon::new('/', 9),
            _ => tile.terrain.icon(),
        };
        let overlay = match tile.occupant() {
            Some(id) => self.creature(id).map(|c| c.icon),
            None => tile.top_item_icon(),
        };
        Some((terrain, overlay))
    }
}

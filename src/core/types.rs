//! Core type definitions used throughout the kernel

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a creature.
///
/// Identity is assigned at spawn time and never changes; the bounty ledger,
/// mount links and save files all key on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatureId(pub String);

impl CreatureId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CreatureId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// The eight king-move offsets, in fixed visitation order.
pub const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Integer grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// King-move distance: the number of 8-connected steps between two cells.
    pub fn chebyshev(self, other: Self) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Squared Euclidean distance, used for vision and weapon range checks.
    pub fn distance_sq(self, other: Self) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// True when `other` is one of the eight neighbouring cells.
    pub fn is_adjacent(self, other: Self) -> bool {
        self != other && self.chebyshev(other) == 1
    }

    /// The eight neighbours in the fixed [`DIRECTIONS`] order.
    pub fn neighbours(self) -> [Position; 8] {
        let mut out = [self; 8];
        for (i, (dx, dy)) in DIRECTIONS.iter().enumerate() {
            out[i] = self.offset(*dx, *dy);
        }
        out
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned inclusive rectangle of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub min: Position,
    pub max: Position,
}

impl Area {
    /// Builds the rectangle spanning both corners, whichever order they come in.
    pub fn new(a: Position, b: Position) -> Self {
        Self {
            min: Position::new(a.x.min(b.x), a.y.min(b.y)),
            max: Position::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x + 1
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y + 1
    }

    /// Uniformly random cell within the rectangle.
    pub fn random_cell(&self, rng: &mut ChaCha8Rng) -> Position {
        Position::new(
            rng.gen_range(self.min.x..=self.max.x),
            rng.gen_range(self.min.y..=self.max.y),
        )
    }
}

/// Display icon exposed to the terminal adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    /// Unicode codepoint of the glyph
    pub codepoint: u32,
    /// Terminal colour index
    pub colour: u8,
}

impl Icon {
    pub fn new(glyph: char, colour: u8) -> Self {
        Self {
            codepoint: glyph as u32,
            colour,
        }
    }
}

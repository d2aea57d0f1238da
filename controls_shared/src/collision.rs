//! Hazard classification of world positions.
//!
//! The collision map itself belongs to the game; the input core only asks
//! read-only questions about single positions through [`HazardQuery`].
//! [`TileHazardMap`] is a small grid implementation used by the demo client
//! and tests.

use anyhow::bail;

use crate::math::Vec2;

/// World units per tile.
pub const TILE_SIZE: f32 = 32.0;

bitflags::bitflags! {
    /// Collision flags of a map position.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CollisionFlags: u32 {
        const SOLID = 1 << 0;
        const DEATH = 1 << 1;
        const NOHOOK = 1 << 2;
    }
}

/// Read-only hazard lookup against the current map.
pub trait HazardQuery {
    /// Freeze duration in ticks applied at `pos`, 0 if none.
    fn freeze_duration_at(&self, pos: Vec2) -> u32;

    fn collision_at(&self, pos: Vec2) -> CollisionFlags;

    /// Whether `pos` is a teleport or checkpoint-teleport trigger.
    fn is_teleport(&self, pos: Vec2) -> bool;

    /// A hazard is an active freeze, a lethal tile or a teleport trigger.
    fn is_hazard(&self, pos: Vec2) -> bool {
        self.freeze_duration_at(pos) > 0
            || self.collision_at(pos).contains(CollisionFlags::DEATH)
            || self.is_teleport(pos)
    }
}

/// Contents of one map tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tile {
    #[default]
    Air,
    Solid,
    Death,
    /// Freeze for the given number of ticks.
    Freeze(u32),
    Teleport,
    CheckpointTeleport,
}

/// Dense tile grid; positions outside the grid read as air.
#[derive(Debug, Clone)]
pub struct TileHazardMap {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl TileHazardMap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Air; width * height],
        }
    }

    /// Builds a map from rows of characters.
    ///
    /// `.` air, `#` solid, `x` death, `f` freeze, `t` teleport,
    /// `c` checkpoint teleport.
    pub fn from_rows(rows: &[&str], freeze_ticks: u32) -> anyhow::Result<Self> {
        let height = rows.len();
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut map = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                let tile = match c {
                    '.' | ' ' => Tile::Air,
                    '#' => Tile::Solid,
                    'x' => Tile::Death,
                    'f' => Tile::Freeze(freeze_ticks),
                    't' => Tile::Teleport,
                    'c' => Tile::CheckpointTeleport,
                    other => bail!("unknown tile {other:?} at ({x}, {y})"),
                };
                map.set(x, y, tile);
            }
        }
        Ok(map)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        if x < self.width && y < self.height {
            self.tiles[y * self.width + x] = tile;
        }
    }

    /// Tile under a world position.
    pub fn tile_at(&self, pos: Vec2) -> Tile {
        let tx = (pos.x / TILE_SIZE).floor();
        let ty = (pos.y / TILE_SIZE).floor();
        if tx < 0.0 || ty < 0.0 {
            return Tile::Air;
        }
        let (tx, ty) = (tx as usize, ty as usize);
        if tx >= self.width || ty >= self.height {
            return Tile::Air;
        }
        self.tiles[ty * self.width + tx]
    }
}

impl HazardQuery for TileHazardMap {
    fn freeze_duration_at(&self, pos: Vec2) -> u32 {
        match self.tile_at(pos) {
            Tile::Freeze(ticks) => ticks,
            _ => 0,
        }
    }

    fn collision_at(&self, pos: Vec2) -> CollisionFlags {
        match self.tile_at(pos) {
            Tile::Solid => CollisionFlags::SOLID,
            Tile::Death => CollisionFlags::DEATH,
            _ => CollisionFlags::empty(),
        }
    }

    fn is_teleport(&self, pos: Vec2) -> bool {
        matches!(
            self.tile_at(pos),
            Tile::Teleport | Tile::CheckpointTeleport
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center(x: usize, y: usize) -> Vec2 {
        Vec2::new(
            x as f32 * TILE_SIZE + TILE_SIZE / 2.0,
            y as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        )
    }

    #[test]
    fn hazard_classification() {
        let map = TileHazardMap::from_rows(&[".#xftc"], 3).unwrap();
        let hazards: Vec<bool> = (0..6).map(|x| map.is_hazard(center(x, 0))).collect();
        assert_eq!(hazards, vec![false, false, true, true, true, true]);
        assert_eq!(map.freeze_duration_at(center(3, 0)), 3);
    }

    #[test]
    fn zero_length_freeze_is_not_a_hazard() {
        let map = TileHazardMap::from_rows(&["f"], 0).unwrap();
        assert!(!map.is_hazard(center(0, 0)));
    }

    #[test]
    fn outside_reads_as_air() {
        let map = TileHazardMap::from_rows(&["x"], 0).unwrap();
        assert_eq!(map.tile_at(Vec2::new(-1.0, 5.0)), Tile::Air);
        assert_eq!(map.tile_at(Vec2::new(100.0, 5.0)), Tile::Air);
    }

    #[test]
    fn unknown_tile_rejected() {
        assert!(TileHazardMap::from_rows(&["?"], 0).is_err());
    }
}

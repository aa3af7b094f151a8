//! Square tile grid with terrain and single-unit occupancy.

use skirmish_core::{CellCoord, PlacementError, Terrain, UnitId};

/// Terrain and occupant of a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    /// Terrain covering the tile.
    pub terrain: Terrain,
    /// Living unit standing on the tile, if any.
    pub occupant: Option<UnitId>,
}

/// Fixed-size square battlefield.
///
/// Terrain and occupancy are stored densely in row-major order. The grid only
/// holds weak back-references to units; the roster owns unit state.
#[derive(Clone, Debug, Default)]
pub struct Battlefield {
    size: u32,
    terrain: Vec<Terrain>,
    occupancy: Vec<Option<UnitId>>,
}

impl Battlefield {
    /// Creates a battlefield of `size` by `size` tiles.
    ///
    /// Terrain beyond the provided slice defaults to plain; surplus entries are ignored.
    pub(crate) fn new(size: u32, terrain: &[Terrain]) -> Self {
        let capacity = usize::try_from(u64::from(size) * u64::from(size)).unwrap_or(0);
        let mut tiles = vec![Terrain::Plain; capacity];
        for (slot, kind) in tiles.iter_mut().zip(terrain.iter().copied()) {
            *slot = kind;
        }
        Self {
            size,
            terrain: tiles,
            occupancy: vec![None; capacity],
        }
    }

    /// Edge length of the grid in tiles.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Reports whether the tile lies on the grid.
    #[must_use]
    pub fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.row() < self.size && cell.column() < self.size
    }

    /// Looks up a tile.
    pub fn tile_at(&self, cell: CellCoord) -> Result<Tile, PlacementError> {
        let index = self.index(cell).ok_or(PlacementError::OutOfBounds)?;
        Ok(Tile {
            terrain: self.terrain[index],
            occupant: self.occupancy[index],
        })
    }

    /// Terrain covering the tile, if it lies on the grid.
    #[must_use]
    pub fn terrain_at(&self, cell: CellCoord) -> Option<Terrain> {
        self.index(cell).map(|index| self.terrain[index])
    }

    /// Unit standing on the tile, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<UnitId> {
        self.index(cell).and_then(|index| self.occupancy[index])
    }

    /// Reports whether a unit stands on the tile. Off-grid tiles are never occupied.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.occupant(cell).is_some()
    }

    /// Reports whether the tile is water.
    #[must_use]
    pub fn is_water(&self, cell: CellCoord) -> bool {
        self.terrain_at(cell) == Some(Terrain::Water)
    }

    /// Iterates every tile coordinate in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.size)
            .flat_map(move |row| (0..self.size).map(move |column| CellCoord::new(row, column)))
    }

    /// Row-major terrain of every tile.
    #[must_use]
    pub fn terrain(&self) -> &[Terrain] {
        &self.terrain
    }

    /// Records `unit` on the tile.
    pub(crate) fn place(&mut self, unit: UnitId, cell: CellCoord) -> Result<(), PlacementError> {
        let index = self.index(cell).ok_or(PlacementError::OutOfBounds)?;
        let slot = &mut self.occupancy[index];
        if slot.is_some() {
            return Err(PlacementError::Occupied);
        }
        *slot = Some(unit);
        Ok(())
    }

    /// Clears the tile only when it still references `unit`.
    pub(crate) fn vacate(&mut self, unit: UnitId, cell: CellCoord) -> bool {
        match self.index(cell) {
            Some(index) if self.occupancy[index] == Some(unit) => {
                self.occupancy[index] = None;
                true
            }
            _ => false,
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.size).ok()?;
        Some(row * width + column)
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded blob terrain generator.
//!
//! A battlefield starts as open plain. A random number of blobs is then
//! grown one tile at a time: each blob picks a plain starting tile and expands
//! from a random tile it already covers into a random plain neighbour,
//! stopping early once it runs out of room.

use skirmish_core::{CellCoord, Command, Dice, Terrain};
use tracing::debug;

const NEIGHBOURS: [(i32, i32); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Tuning knobs for blob generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainConfig {
    /// Fewest blobs attempted per map.
    pub min_blobs: u32,
    /// Most blobs attempted per map.
    pub max_blobs: u32,
    /// Smallest blob size in tiles.
    pub min_blob_size: u32,
    /// Largest blob size in tiles.
    pub max_blob_size: u32,
    /// Attempts to find a plain starting tile before a blob is abandoned.
    pub start_attempts: u32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            min_blobs: 10,
            max_blobs: 20,
            min_blob_size: 4,
            max_blob_size: 9,
            start_attempts: 100,
        }
    }
}

/// Generates battlefield terrain.
#[derive(Clone, Debug, Default)]
pub struct TerrainGenerator {
    config: TerrainConfig,
}

impl TerrainGenerator {
    /// Creates a generator with the provided tuning.
    #[must_use]
    pub fn new(config: TerrainConfig) -> Self {
        Self { config }
    }

    /// Emits the command that configures a freshly generated battlefield.
    pub fn handle<D>(&self, size: u32, dice: &mut D, out: &mut Vec<Command>)
    where
        D: Dice + ?Sized,
    {
        let terrain = self.generate(size, dice);
        out.push(Command::ConfigureBattlefield { size, terrain });
    }

    /// Produces row-major terrain for a `size` by `size` grid.
    pub fn generate<D>(&self, size: u32, dice: &mut D) -> Vec<Terrain>
    where
        D: Dice + ?Sized,
    {
        let width = size as usize;
        let mut map = vec![Terrain::Plain; width * width];
        if width == 0 {
            return map;
        }

        let blobs =
            dice.between(self.config.min_blobs, self.config.max_blobs, "terrain blob count");
        let mut grown = 0;
        for _ in 0..blobs {
            let kind =
                Terrain::BLOB_KINDS[dice.index(Terrain::BLOB_KINDS.len(), "terrain blob kind")];
            let target_size = dice.between(
                self.config.min_blob_size,
                self.config.max_blob_size,
                "terrain blob size",
            );
            let Some(start) = self.find_start(&map, size, dice) else {
                continue;
            };
            grown += 1;
            grow_blob(&mut map, size, start, kind, target_size, dice);
        }
        debug!(size, blobs, grown, "terrain generated");
        map
    }

    fn find_start<D>(&self, map: &[Terrain], size: u32, dice: &mut D) -> Option<CellCoord>
    where
        D: Dice + ?Sized,
    {
        let width = size as usize;
        let mut candidate = None;
        for _ in 0..self.config.start_attempts.max(1) {
            let row = dice.index(width, "terrain start row");
            let column = dice.index(width, "terrain start column");
            let cell = CellCoord::new(row as u32, column as u32);
            candidate = Some(cell);
            if map[row * width + column] == Terrain::Plain {
                break;
            }
        }
        candidate.filter(|cell| map[index(size, *cell)] == Terrain::Plain)
    }
}

fn grow_blob<D>(
    map: &mut [Terrain],
    size: u32,
    start: CellCoord,
    kind: Terrain,
    target_size: u32,
    dice: &mut D,
) where
    D: Dice + ?Sized,
{
    let mut tiles = vec![start];
    map[index(size, start)] = kind;

    for _ in 1..target_size {
        let base = tiles[dice.index(tiles.len(), "terrain grow base")];
        let mut directions = NEIGHBOURS;
        for slot in (1..directions.len()).rev() {
            let swap = dice.index(slot + 1, "terrain grow shuffle");
            directions.swap(slot, swap);
        }

        let next = directions.iter().find_map(|&(row_delta, column_delta)| {
            base.offset(row_delta, column_delta, size)
                .filter(|cell| map[index(size, *cell)] == Terrain::Plain)
        });
        let Some(next) = next else {
            break;
        };
        map[index(size, next)] = kind;
        tiles.push(next);
    }
}

fn index(size: u32, cell: CellCoord) -> usize {
    cell.row() as usize * size as usize + cell.column() as usize
}

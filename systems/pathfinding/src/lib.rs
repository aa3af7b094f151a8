#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Breadth-first pathfinding over the eight-connected battlefield grid.

use std::collections::VecDeque;

use skirmish_core::{CellCoord, UnitId, UnitSnapshot};
use skirmish_world::{query, Battlefield, World};
use tracing::trace;

/// Neighbour enumeration order: east, west, south, north, then the diagonals
/// south-east, south-west, north-east, north-west.
///
/// The first path discovered in this order wins ties between equally short routes.
pub const DIRECTIONS: [(i32, i32); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Tiles a mover may not enter, and tiles that pinch a diagonal step.
///
/// Any `Fn(CellCoord) -> bool` acts as an obstacle map whose corners block
/// exactly like its tiles.
pub trait Obstacles {
    /// Whether the mover may not step onto `cell`.
    fn blocks_entry(&self, cell: CellCoord) -> bool;

    /// Whether `cell` counts against a diagonal step that passes beside it.
    ///
    /// A diagonal step is refused only when both of its corner tiles block.
    fn blocks_corner(&self, cell: CellCoord) -> bool {
        self.blocks_entry(cell)
    }
}

impl<F> Obstacles for F
where
    F: Fn(CellCoord) -> bool,
{
    fn blocks_entry(&self, cell: CellCoord) -> bool {
        self(cell)
    }
}

/// Reusable breadth-first search workspace.
#[derive(Debug, Default)]
pub struct Pathfinder {
    parents: Vec<Option<usize>>,
    visited: Vec<bool>,
    queue: VecDeque<CellCoord>,
}

impl Pathfinder {
    /// Finds the shortest route from `from` to `to`.
    ///
    /// The returned steps exclude `from` and end on `to`. The obstacles decide
    /// which tiles may be entered, so callers that path toward an occupied tile
    /// must leave that tile unblocked. Returns `None` when no route exists.
    pub fn find_path<O>(
        &mut self,
        size: u32,
        from: CellCoord,
        to: CellCoord,
        obstacles: O,
    ) -> Option<Vec<CellCoord>>
    where
        O: Obstacles,
    {
        self.find_path_to(size, from, obstacles, |cell| cell == to)
    }

    /// Finds the shortest route from `from` to the first tile satisfying `is_goal`.
    ///
    /// An empty path is returned when `from` already satisfies the goal.
    pub fn find_path_to<O, G>(
        &mut self,
        size: u32,
        from: CellCoord,
        obstacles: O,
        is_goal: G,
    ) -> Option<Vec<CellCoord>>
    where
        O: Obstacles,
        G: Fn(CellCoord) -> bool,
    {
        let width = usize::try_from(size).ok()?;
        let cell_count = width.checked_mul(width)?;
        let start = index(width, size, from)?;

        if is_goal(from) {
            return Some(Vec::new());
        }

        self.parents.clear();
        self.parents.resize(cell_count, None);
        self.visited.clear();
        self.visited.resize(cell_count, false);
        self.queue.clear();

        self.visited[start] = true;
        self.queue.push_back(from);

        while let Some(cell) = self.queue.pop_front() {
            let Some(current) = index(width, size, cell) else {
                continue;
            };
            for (row_delta, column_delta) in DIRECTIONS {
                let Some(next) = cell.offset(row_delta, column_delta, size) else {
                    continue;
                };
                let Some(next_index) = index(width, size, next) else {
                    continue;
                };
                if self.visited[next_index] || obstacles.blocks_entry(next) {
                    continue;
                }
                if row_delta != 0 && column_delta != 0 {
                    let vertical = cell.offset(row_delta, 0, size);
                    let horizontal = cell.offset(0, column_delta, size);
                    let corner_blocked = |corner: Option<CellCoord>| {
                        corner.map_or(true, |corner| obstacles.blocks_corner(corner))
                    };
                    if corner_blocked(vertical) && corner_blocked(horizontal) {
                        continue;
                    }
                }

                self.visited[next_index] = true;
                self.parents[next_index] = Some(current);
                if is_goal(next) {
                    let path = self.unwind(width, next_index, start);
                    trace!(?from, goal = ?next, steps = path.len(), "path found");
                    return Some(path);
                }
                self.queue.push_back(next);
            }
        }

        trace!(?from, "no path");
        None
    }

    fn unwind(&self, width: usize, goal: usize, start: usize) -> Vec<CellCoord> {
        let mut path = Vec::new();
        let mut cursor = goal;
        while cursor != start {
            path.push(coord(width, cursor));
            match self.parents[cursor] {
                Some(parent) => cursor = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }
}

/// Obstacles met by one unit on the current battlefield.
///
/// Off-grid tiles and tiles held by any other living unit are blocked. Water
/// blocks units that neither fly nor are water-adaptive. Only units pinch a
/// diagonal step; water corners never do.
#[derive(Debug)]
pub struct BlockingRule<'a> {
    battlefield: &'a Battlefield,
    mover: UnitId,
    crosses_water: bool,
}

impl BlockingRule<'_> {
    fn held_by_other(&self, cell: CellCoord) -> bool {
        matches!(self.battlefield.occupant(cell), Some(occupant) if occupant != self.mover)
    }
}

impl Obstacles for BlockingRule<'_> {
    fn blocks_entry(&self, cell: CellCoord) -> bool {
        if !self.battlefield.in_bounds(cell) {
            return true;
        }
        if !self.crosses_water && self.battlefield.is_water(cell) {
            return true;
        }
        self.held_by_other(cell)
    }

    fn blocks_corner(&self, cell: CellCoord) -> bool {
        !self.battlefield.in_bounds(cell) || self.held_by_other(cell)
    }
}

/// Builds the obstacle map for `mover` on the current battlefield.
pub fn blocking_rule<'a>(world: &'a World, mover: &UnitSnapshot) -> BlockingRule<'a> {
    BlockingRule {
        battlefield: query::battlefield(world),
        mover: mover.id,
        crosses_water: mover.archetype().crosses_water(),
    }
}

fn index(width: usize, size: u32, cell: CellCoord) -> Option<usize> {
    if cell.row() >= size || cell.column() >= size {
        return None;
    }
    let row = usize::try_from(cell.row()).ok()?;
    let column = usize::try_from(cell.column()).ok()?;
    Some(row * width + column)
}

fn coord(width: usize, index: usize) -> CellCoord {
    let row = u32::try_from(index / width).unwrap_or(u32::MAX);
    let column = u32::try_from(index % width).unwrap_or(u32::MAX);
    CellCoord::new(row, column)
}

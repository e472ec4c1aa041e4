//! Static walkability grid and the corridor enemies follow.

use path_defence_core::{CellCoord, Heading, PlacementError, TowerId, WorldPoint};

/// Single cell of the play area.
///
/// A cell is walkable when a tower may still be built on it: path cells and
/// occupied cells never are.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridCell {
    walkable: bool,
    occupant: Option<TowerId>,
}

impl GridCell {
    /// Reports whether a tower may be placed on the cell.
    #[must_use]
    pub const fn walkable(&self) -> bool {
        self.walkable
    }

    /// Tower occupying the cell, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<TowerId> {
        self.occupant
    }
}

/// Dense cell grid with the corridor carved at construction time.
#[derive(Clone, Debug)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cell_size: f32,
    cells: Vec<GridCell>,
    path_cells: Vec<CellCoord>,
    waypoints: Vec<WorldPoint>,
    exit_heading: Heading,
}

impl Grid {
    /// Builds the grid and marks every corridor cell as unwalkable.
    pub(crate) fn new(columns: u32, rows: u32, cell_size: f32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut grid = Self {
            columns,
            rows,
            cell_size,
            cells: vec![
                GridCell {
                    walkable: true,
                    occupant: None,
                };
                capacity
            ],
            path_cells: corridor(columns, rows),
            waypoints: Vec::new(),
            exit_heading: Heading::EAST,
        };

        for index in 0..grid.path_cells.len() {
            let cell = grid.path_cells[index];
            if let Some(slot) = grid.index(cell).and_then(|index| grid.cells.get_mut(index)) {
                slot.walkable = false;
            }
        }

        grid.waypoints = grid
            .path_cells
            .iter()
            .map(|cell| grid.center_of(*cell))
            .collect();
        if let [.., before_last, last] = grid.waypoints.as_slice() {
            grid.exit_heading = Heading::between(*before_last, *last).unwrap_or(Heading::EAST);
        }

        grid
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square cell expressed in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Right boundary of the play area; enemies past it have escaped.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_size
    }

    /// Retrieves the cell at `cell`, or `None` when out of bounds.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<&GridCell> {
        self.index(cell).and_then(|index| self.cells.get(index))
    }

    /// Reports whether a tower may be placed at `cell`. Out of bounds is never walkable.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.cell(cell).is_some_and(GridCell::walkable)
    }

    /// Tower occupying `cell`, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<TowerId> {
        self.cell(cell).and_then(GridCell::occupant)
    }

    /// Ordered waypoints (cell centers) of the corridor.
    #[must_use]
    pub fn path(&self) -> &[WorldPoint] {
        &self.waypoints
    }

    /// Ordered cells of the corridor.
    #[must_use]
    pub fn path_cells(&self) -> &[CellCoord] {
        &self.path_cells
    }

    /// Direction of the final corridor segment.
    #[must_use]
    pub const fn exit_heading(&self) -> Heading {
        self.exit_heading
    }

    /// Center of `cell` in world units.
    #[must_use]
    pub fn center_of(&self, cell: CellCoord) -> WorldPoint {
        let half = self.cell_size / 2.0;
        WorldPoint::new(
            cell.column() as f32 * self.cell_size + half,
            cell.row() as f32 * self.cell_size + half,
        )
    }

    /// Cell containing `point`, or `None` when the point lies outside the grid.
    #[must_use]
    pub fn cell_at(&self, point: WorldPoint) -> Option<CellCoord> {
        if !(point.x() >= 0.0 && point.y() >= 0.0) {
            return None;
        }

        let column = (point.x() / self.cell_size).floor();
        let row = (point.y() / self.cell_size).floor();
        if column >= self.columns as f32 || row >= self.rows as f32 {
            return None;
        }

        Some(CellCoord::new(column as u32, row as u32))
    }

    /// Verifies that a tower could be placed at `cell` without mutating the grid.
    pub(crate) fn check_placement(&self, cell: CellCoord) -> Result<(), PlacementError> {
        let slot = self.cell(cell).ok_or(PlacementError::OutOfBounds)?;
        if slot.occupant.is_some() {
            return Err(PlacementError::Occupied);
        }
        if !slot.walkable {
            return Err(PlacementError::Unwalkable);
        }
        Ok(())
    }

    /// Marks `cell` as occupied by `tower`.
    pub(crate) fn occupy(&mut self, cell: CellCoord, tower: TowerId) -> Result<(), PlacementError> {
        self.check_placement(cell)?;
        let slot = self
            .index(cell)
            .and_then(|index| self.cells.get_mut(index))
            .ok_or(PlacementError::OutOfBounds)?;
        slot.walkable = false;
        slot.occupant = Some(tower);
        Ok(())
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Carves a left-to-right corridor: along the upper third row to the middle
/// column, down to the lower third row, then on to the right edge.
fn corridor(columns: u32, rows: u32) -> Vec<CellCoord> {
    if columns == 0 || rows == 0 {
        return Vec::new();
    }

    let upper = rows / 3;
    let lower = rows - 1 - rows / 3;
    let bend = columns / 2;

    let mut cells = Vec::new();
    cells.extend((0..=bend).map(|column| CellCoord::new(column, upper)));
    cells.extend((upper + 1..=lower).map(|row| CellCoord::new(bend, row)));
    cells.extend((bend + 1..columns).map(|column| CellCoord::new(column, lower)));
    cells
}

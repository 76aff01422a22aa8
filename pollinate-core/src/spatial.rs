//! Uniform grid over the field used to narrow radius queries.
//!
//! Flowers never move, so the grid is filled once when the field is built.
//! Queries return candidate ids in ascending order; the caller still applies
//! the exact distance test, which keeps results identical to a full scan.

use glam::Vec2;

use crate::entity::FlowerId;

/// Upper bound on cells per axis. Finer cell sizes are widened to fit.
pub const MAX_GRID_COLUMNS: usize = 1024;

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    columns: usize,
    cells: Vec<Vec<FlowerId>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32, field_size: f32) -> Self {
        let cell_size = cell_size.max(field_size / MAX_GRID_COLUMNS as f32);
        let columns = ((field_size / cell_size).ceil() as usize).clamp(1, MAX_GRID_COLUMNS);
        let cell_count = columns.saturating_mul(columns);
        SpatialGrid {
            cell_size,
            columns,
            cells: vec![Vec::new(); cell_count],
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Column/row of the cell covering a coordinate, clamped to the grid so
    /// points on the far edge land in the last cell.
    fn axis_cell(&self, coordinate: f32) -> usize {
        let cell = (coordinate / self.cell_size).floor();
        cell.clamp(0.0, (self.columns - 1) as f32) as usize
    }

    pub fn insert(&mut self, id: FlowerId, position: Vec2) {
        let index = self.axis_cell(position.y) * self.columns + self.axis_cell(position.x);
        self.cells[index].push(id);
    }

    /// All ids stored in cells overlapping the square around `center`.
    pub fn candidates(&self, center: Vec2, radius: f32) -> Vec<FlowerId> {
        let (min_x, max_x) = (self.axis_cell(center.x - radius), self.axis_cell(center.x + radius));
        let (min_y, max_y) = (self.axis_cell(center.y - radius), self.axis_cell(center.y + radius));

        let mut result = Vec::new();
        for row in min_y..=max_y {
            for column in min_x..=max_x {
                result.extend_from_slice(&self.cells[row * self.columns + column]);
            }
        }
        result.sort_unstable();
        result
    }
}

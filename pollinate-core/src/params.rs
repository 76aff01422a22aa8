use crate::drone::DroneLaunch;
use crate::error::SimulationError;
use crate::spatial::MAX_GRID_COLUMNS;

/// Startup parameters of a run. All values are fixed for the lifetime of a
/// [`Simulation`](crate::Simulation).
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    /// Side length of the square field; coordinates live in `[0, field_size]`.
    pub field_size: f32,
    pub flower_count: usize,
    pub vision_radius: f32,
    pub pollination_radius: f32,
    /// Distance a drone travels per tick.
    pub drone_speed: f32,
    pub min_cluster_points: usize,
    pub drone_count: usize,
    /// Cluster cores must be at least `exclusion_multiplier * pollination_radius` apart.
    pub exclusion_multiplier: f32,
    pub launch: DroneLaunch,
    /// Seed for the random source. `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Cell size of the optional spatial grid; `None` scans every flower.
    pub grid_cell_size: Option<f32>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            field_size: 1100.0,
            flower_count: 4500,
            vision_radius: 50.0,
            pollination_radius: 25.0,
            drone_speed: 2.0,
            min_cluster_points: 3,
            drone_count: 6,
            exclusion_multiplier: 1.5,
            launch: DroneLaunch::BottomRow,
            seed: None,
            grid_cell_size: None,
        }
    }
}

impl SimulationParams {
    pub fn exclusion_radius(&self) -> f32 {
        self.exclusion_multiplier * self.pollination_radius
    }

    /// Rejects parameter sets the simulation cannot run with.
    pub fn validate(&self) -> Result<(), SimulationError> {
        positive("field_size", self.field_size)?;
        positive("vision_radius", self.vision_radius)?;
        positive("pollination_radius", self.pollination_radius)?;
        positive("drone_speed", self.drone_speed)?;
        positive("exclusion_multiplier", self.exclusion_multiplier)?;
        if let Some(cell_size) = self.grid_cell_size {
            positive("grid_cell_size", cell_size)?;
            let min_cell_size = self.field_size / MAX_GRID_COLUMNS as f32;
            if cell_size < min_cell_size {
                return Err(SimulationError::invalid(
                    "grid_cell_size",
                    format!("must be at least {min_cell_size} ({MAX_GRID_COLUMNS} cells per side), got {cell_size}"),
                ));
            }
        }
        if self.min_cluster_points < 1 {
            return Err(SimulationError::invalid(
                "min_cluster_points",
                "must be at least 1",
            ));
        }
        if self.flower_count == 0 {
            return Err(SimulationError::invalid("flower_count", "must be greater than 0"));
        }
        if self.drone_count == 0 {
            return Err(SimulationError::invalid("drone_count", "must be greater than 0"));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), SimulationError> {
    // NaN fails this comparison as well
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::invalid(
            field,
            format!("must be a positive number, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimulationParams::default().validate().is_ok());
        assert_eq!(SimulationParams::default().exclusion_radius(), 37.5);
    }

    #[test]
    fn rejects_non_positive_values() {
        let cases: Vec<(&str, SimulationParams)> = vec![
            ("field_size", SimulationParams { field_size: 0.0, ..Default::default() }),
            ("vision_radius", SimulationParams { vision_radius: -1.0, ..Default::default() }),
            ("pollination_radius", SimulationParams { pollination_radius: f32::NAN, ..Default::default() }),
            ("drone_speed", SimulationParams { drone_speed: 0.0, ..Default::default() }),
            ("exclusion_multiplier", SimulationParams { exclusion_multiplier: -1.5, ..Default::default() }),
            ("min_cluster_points", SimulationParams { min_cluster_points: 0, ..Default::default() }),
            ("flower_count", SimulationParams { flower_count: 0, ..Default::default() }),
            ("drone_count", SimulationParams { drone_count: 0, ..Default::default() }),
            ("grid_cell_size", SimulationParams { grid_cell_size: Some(0.0), ..Default::default() }),
        ];

        for (expected, params) in cases {
            match params.validate() {
                Err(SimulationError::InvalidConfig { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected InvalidConfig for {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_grid_cells_finer_than_the_column_limit() {
        for cell_size in [1e-30, 1e-3] {
            let params = SimulationParams {
                field_size: 1100.0,
                grid_cell_size: Some(cell_size),
                ..Default::default()
            };
            match params.validate() {
                Err(SimulationError::InvalidConfig { field, .. }) => assert_eq!(field, "grid_cell_size"),
                other => panic!("expected InvalidConfig for cell size {cell_size}, got {other:?}"),
            }
        }

        let finest_allowed = SimulationParams {
            field_size: 1100.0,
            grid_cell_size: Some(1100.0 / MAX_GRID_COLUMNS as f32),
            ..Default::default()
        };
        assert!(finest_allowed.validate().is_ok());
    }
}

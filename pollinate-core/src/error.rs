use thiserror::Error;

use crate::entity::DroneId;

/// Errors raised while building a simulation. Once a [`Simulation`](crate::Simulation)
/// exists, ticking it cannot fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("{drone} was given a zero-length heading")]
    DegenerateHeading { drone: DroneId },
}

impl SimulationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

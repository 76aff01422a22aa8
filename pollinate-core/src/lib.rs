//! Core of the drone pollination simulation: flowers scattered over a square
//! field, drones sweeping it with a bounded random walk, and greedy
//! density-based clustering of the flowers they discover.

pub mod cluster;
pub mod drone;
pub mod entity;
pub mod error;
pub mod field;
pub mod flower;
pub mod params;
pub mod scan;
pub mod scheduler;
pub mod simulation;
pub mod snapshot;
pub mod spatial;

pub use cluster::{Cluster, ClusterDecision, ClusterPolicy, ClusterRegistry, Clusterer};
pub use drone::{Drone, DroneLaunch, MAX_TURN_ANGLE, TURN_PROBABILITY};
pub use entity::{ClusterId, DroneId, FlowerId};
pub use error::SimulationError;
pub use field::Field;
pub use flower::{Flower, FlowerState};
pub use params::SimulationParams;
pub use spatial::MAX_GRID_COLUMNS;
pub use scan::{scan, ScanReport};
pub use scheduler::{RunSummary, Scheduler, StopReason, TickOutcome};
pub use simulation::{Simulation, TickReport};
pub use snapshot::{ClusterView, Counters, DroneView, FlowerView, Snapshot};

// Re-exported so callers can build layouts without depending on glam directly.
pub use glam::Vec2;

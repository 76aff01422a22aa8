use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a flower inside its [`Field`](crate::Field).
///
/// Ids are minted by the field in creation order and are never reused, so the
/// natural ordering of ids is the scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlowerId(u32);

impl FlowerId {
    pub fn new(index: usize) -> Self {
        FlowerId(index as u32)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Index of a drone in the simulation's tick order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DroneId(u32);

impl DroneId {
    pub fn new(index: usize) -> Self {
        DroneId(index as u32)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Position of a cluster record in the append-only registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClusterId(u32);

impl ClusterId {
    pub fn new(index: usize) -> Self {
        ClusterId(index as u32)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FlowerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "flower#{}", self.0)
    }
}

impl fmt::Display for DroneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "drone#{}", self.0)
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cluster#{}", self.0)
    }
}

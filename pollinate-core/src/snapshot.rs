use serde::{Deserialize, Serialize};

/// Running totals shown next to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counters {
    pub total: usize,
    pub discovered: usize,
    pub clustered: usize,
    pub clusters: usize,
}

impl Counters {
    /// Share of all flowers discovered so far, in percent.
    pub fn seen_percentage(&self) -> f64 {
        percentage(self.discovered, self.total)
    }

    /// Share of discovered flowers that are clustered, in percent. Zero while
    /// nothing has been discovered.
    pub fn clustered_percentage(&self) -> f64 {
        percentage(self.clustered, self.discovered)
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowerView {
    pub position: [f32; 2],
    pub discovered: bool,
    pub clustered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterView {
    pub core: [f32; 2],
    pub members: Vec<[f32; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneView {
    pub position: [f32; 2],
    pub heading: [f32; 2],
}

/// Read-only copy of the simulation state after a tick, handed to whatever
/// renders or records the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub field_size: f32,
    pub vision_radius: f32,
    pub pollination_radius: f32,
    pub flowers: Vec<FlowerView>,
    pub clusters: Vec<ClusterView>,
    pub drones: Vec<DroneView>,
    pub counters: Counters,
}

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Discovery lifecycle of a flower. Transitions only go forward:
/// `Unseen -> Seen { clustered: false } -> Seen { clustered: true }`. The
/// flag is only raised by the scan that discovers the flower, right after its
/// clustering decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlowerState {
    #[default]
    Unseen,
    Seen { clustered: bool },
}

/// A stationary point of interest in the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Flower {
    position: Vec2,
    state: FlowerState,
}

impl Flower {
    pub fn new(position: Vec2) -> Self {
        Flower {
            position,
            state: FlowerState::Unseen,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn state(&self) -> FlowerState {
        self.state
    }

    pub fn is_discovered(&self) -> bool {
        matches!(self.state, FlowerState::Seen { .. })
    }

    pub fn is_clustered(&self) -> bool {
        matches!(self.state, FlowerState::Seen { clustered: true })
    }

    /// Moves the flower out of `Unseen`. Returns `false` and leaves the state
    /// untouched if it was already discovered.
    pub(crate) fn discover(&mut self, clustered: bool) -> bool {
        match self.state {
            FlowerState::Unseen => {
                self.state = FlowerState::Seen { clustered };
                true
            }
            FlowerState::Seen { .. } => false,
        }
    }

    /// Raises the clustered flag of a discovered flower. Returns `false` if
    /// the flower is unseen or already clustered.
    pub(crate) fn mark_clustered(&mut self) -> bool {
        match self.state {
            FlowerState::Seen { clustered: false } => {
                self.state = FlowerState::Seen { clustered: true };
                true
            }
            _ => false,
        }
    }
}

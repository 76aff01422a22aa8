use std::f32::consts::{FRAC_PI_4, TAU};

use glam::Vec2;
use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entity::DroneId;
use crate::error::SimulationError;

/// Chance per tick that a drone turns.
pub const TURN_PROBABILITY: f64 = 0.10;
/// Largest angle, either way, of a single turn.
pub const MAX_TURN_ANGLE: f32 = FRAC_PI_4;

/// Where drones start when a run begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DroneLaunch {
    /// Evenly spaced along the bottom edge: `x = size / count * i`, `y = size - 1`.
    #[default]
    BottomRow,
    /// Uniformly random over the field.
    Random,
}

impl DroneLaunch {
    pub fn positions<R: Rng + ?Sized>(&self, count: usize, field_size: f32, rng: &mut R) -> Vec<Vec2> {
        match self {
            DroneLaunch::BottomRow => {
                let spacing = field_size / count as f32;
                let y = (field_size - 1.0).max(0.0);
                (0..count).map(|i| Vec2::new(spacing * i as f32, y)).collect()
            }
            DroneLaunch::Random => (0..count)
                .map(|_| Vec2::new(rng.gen_range(0.0..field_size), rng.gen_range(0.0..field_size)))
                .collect(),
        }
    }
}

/// A mobile agent doing a bounded random walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drone {
    id: DroneId,
    position: Vec2,
    heading: Vec2,
}

impl Drone {
    /// Creates a drone with the given heading, normalised to unit length.
    pub fn new(id: DroneId, position: Vec2, heading: Vec2) -> Result<Self, SimulationError> {
        let heading = heading
            .try_normalize()
            .ok_or(SimulationError::DegenerateHeading { drone: id })?;
        Ok(Drone { id, position, heading })
    }

    pub fn with_random_heading<R: Rng + ?Sized>(id: DroneId, position: Vec2, rng: &mut R) -> Self {
        Drone {
            id,
            position,
            heading: random_unit(rng),
        }
    }

    pub fn id(&self) -> DroneId {
        self.id
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn heading(&self) -> Vec2 {
        self.heading
    }

    /// Advances the drone by one tick.
    ///
    /// The drone moves first, then reflects on each axis whose new coordinate
    /// left `[0, field_size]`, then is clamped back into the field. Finally it
    /// may turn by up to [`MAX_TURN_ANGLE`].
    pub fn advance<R: Rng + ?Sized>(&mut self, field_size: f32, speed: f32, rng: &mut R) {
        self.position += self.heading * speed;

        let bounds = 0.0..=field_size;
        if !bounds.contains(&self.position.x) {
            self.heading.x = -self.heading.x;
        }
        if !bounds.contains(&self.position.y) {
            self.heading.y = -self.heading.y;
        }
        self.position = self.position.clamp(Vec2::ZERO, Vec2::splat(field_size));

        if rng.gen_bool(TURN_PROBABILITY) {
            let angle = rng.gen_range(-MAX_TURN_ANGLE..=MAX_TURN_ANGLE);
            self.heading = rotate(self.heading, angle);
        }
        self.renormalize(rng);
    }

    fn renormalize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self.heading.try_normalize() {
            Some(unit) => self.heading = unit,
            None => {
                warn!("{} lost its heading ({:?}), picking a new one", self.id, self.heading);
                self.heading = random_unit(rng);
            }
        }
    }
}

fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
}

fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let angle = rng.gen_range(0.0..TAU);
    Vec2::new(angle.cos(), angle.sin())
}

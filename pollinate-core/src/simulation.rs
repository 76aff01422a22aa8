use glam::Vec2;
use log::{info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cluster::{ClusterPolicy, ClusterRegistry};
use crate::drone::Drone;
use crate::entity::{ClusterId, DroneId};
use crate::error::SimulationError;
use crate::field::Field;
use crate::params::SimulationParams;
use crate::scan::scan;
use crate::snapshot::{ClusterView, Counters, DroneView, FlowerView, Snapshot};

/// What changed during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub discovered: usize,
    pub formed: Vec<ClusterId>,
}

/// The whole simulation state: field, cluster registry, drones and the random
/// source, owned by whoever drives the loop.
#[derive(Debug, Clone)]
pub struct Simulation {
    params: SimulationParams,
    field: Field,
    registry: ClusterRegistry,
    drones: Vec<Drone>,
    rng: StdRng,
    tick: u64,
}

impl Simulation {
    /// Builds a run with randomly scattered flowers and drones placed by
    /// `params.launch`.
    pub fn new(params: SimulationParams) -> Result<Self, SimulationError> {
        params.validate()?;
        let mut rng = seeded_rng(params.seed);

        let field = Field::generate(params.field_size, params.flower_count, &mut rng);
        let drones = params
            .launch
            .positions(params.drone_count, params.field_size, &mut rng)
            .into_iter()
            .enumerate()
            .map(|(i, position)| Drone::with_random_heading(DroneId::new(i), position, &mut rng))
            .collect();

        info!(
            "Field of {0}x{0} with {1} flowers, {2} drones launched {3:?}",
            params.field_size, params.flower_count, params.drone_count, params.launch
        );
        Ok(Self::assemble(params, field, drones, rng))
    }

    /// Builds a run from explicit flower positions and drone
    /// `(position, heading)` pairs. The counts in `params` are replaced by
    /// the lengths of the layout.
    pub fn from_layout(
        mut params: SimulationParams,
        flowers: Vec<Vec2>,
        drones: Vec<(Vec2, Vec2)>,
    ) -> Result<Self, SimulationError> {
        params.flower_count = flowers.len();
        params.drone_count = drones.len();
        params.validate()?;

        let field = Field::from_positions(params.field_size, flowers);
        if field.flowers().iter().any(|f| !field.contains_point(f.position())) {
            return Err(SimulationError::invalid("flowers", "every flower must lie inside the field"));
        }

        let drones = drones
            .into_iter()
            .enumerate()
            .map(|(i, (position, heading))| {
                if !field.contains_point(position) {
                    return Err(SimulationError::invalid("drones", "every drone must start inside the field"));
                }
                Drone::new(DroneId::new(i), position, heading)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rng = seeded_rng(params.seed);
        Ok(Self::assemble(params, field, drones, rng))
    }

    fn assemble(params: SimulationParams, field: Field, drones: Vec<Drone>, rng: StdRng) -> Self {
        let field = match params.grid_cell_size {
            Some(cell_size) => field.with_spatial_grid(cell_size),
            None => field,
        };
        let registry = ClusterRegistry::new(ClusterPolicy::new(
            params.pollination_radius,
            params.min_cluster_points,
            params.exclusion_multiplier,
        ));
        Simulation {
            params,
            field,
            registry,
            drones,
            rng,
            tick: 0,
        }
    }

    /// Runs one tick: each drone, in index order, moves and then scans.
    pub fn step(&mut self) -> TickReport {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        let Self { params, field, registry, drones, rng, .. } = self;
        for drone in drones.iter_mut() {
            drone.advance(params.field_size, params.drone_speed, rng);
            let scanned = scan(drone, field, registry, params.vision_radius);
            report.discovered += scanned.discovered.len();
            report.formed.extend(scanned.formed);
        }

        trace!(
            "tick {}: {} discovered, {} clusters formed",
            report.tick,
            report.discovered,
            report.formed.len()
        );
        report
    }

    /// Runs `ticks` ticks back to back.
    pub fn run_for(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn registry(&self) -> &ClusterRegistry {
        &self.registry
    }

    pub fn drones(&self) -> &[Drone] {
        &self.drones
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn counters(&self) -> Counters {
        Counters {
            total: self.field.len(),
            discovered: self.field.discovered_count(),
            clustered: self.field.clustered_count(),
            clusters: self.registry.len(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let flowers = self
            .field
            .flowers()
            .iter()
            .map(|flower| FlowerView {
                position: flower.position().to_array(),
                discovered: flower.is_discovered(),
                clustered: flower.is_clustered(),
            })
            .collect();

        let clusters = self
            .registry
            .clusters()
            .iter()
            .map(|cluster| ClusterView {
                core: cluster.core_position().to_array(),
                members: cluster
                    .members()
                    .iter()
                    .map(|id| self.field.position(*id).to_array())
                    .collect(),
            })
            .collect();

        let drones = self
            .drones
            .iter()
            .map(|drone| DroneView {
                position: drone.position().to_array(),
                heading: drone.heading().to_array(),
            })
            .collect();

        Snapshot {
            tick: self.tick,
            field_size: self.params.field_size,
            vision_radius: self.params.vision_radius,
            pollination_radius: self.params.pollination_radius,
            flowers,
            clusters,
            drones,
            counters: self.counters(),
        }
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drone::DroneLaunch;

    fn small_params() -> SimulationParams {
        SimulationParams {
            field_size: 200.0,
            flower_count: 600,
            vision_radius: 20.0,
            pollination_radius: 10.0,
            drone_speed: 2.0,
            min_cluster_points: 3,
            drone_count: 3,
            exclusion_multiplier: 2.0,
            launch: DroneLaunch::Random,
            seed: Some(99),
            grid_cell_size: None,
        }
    }

    #[test]
    fn new_rejects_invalid_params() {
        let params = SimulationParams { drone_count: 0, ..small_params() };
        assert!(matches!(
            Simulation::new(params),
            Err(SimulationError::InvalidConfig { field: "drone_count", .. })
        ));
    }

    #[test]
    fn new_rejects_a_grid_too_fine_to_allocate() {
        let params = SimulationParams {
            grid_cell_size: Some(1e-30),
            flower_count: 10,
            ..small_params()
        };
        assert!(matches!(
            Simulation::new(params),
            Err(SimulationError::InvalidConfig { field: "grid_cell_size", .. })
        ));
    }

    #[test]
    fn step_reports_match_counters() {
        let mut sim = Simulation::new(small_params()).unwrap();
        let mut discovered = 0;
        let mut formed = 0;
        for expected_tick in 1..=300 {
            let report = sim.step();
            assert_eq!(report.tick, expected_tick);
            discovered += report.discovered;
            formed += report.formed.len();
        }
        assert_eq!(sim.counters().discovered, discovered);
        assert_eq!(sim.counters().clusters, formed);
        assert!(discovered > 0);
    }

    #[test]
    fn snapshot_mirrors_state() {
        let mut sim = Simulation::new(small_params()).unwrap();
        sim.run_for(50);
        let snapshot = sim.snapshot();

        assert_eq!(snapshot.tick, 50);
        assert_eq!(snapshot.flowers.len(), 600);
        assert_eq!(snapshot.drones.len(), 3);
        assert_eq!(snapshot.clusters.len(), sim.registry().len());
        assert_eq!(
            snapshot.flowers.iter().filter(|f| f.discovered).count(),
            snapshot.counters.discovered
        );
        assert_eq!(
            snapshot.flowers.iter().filter(|f| f.clustered).count(),
            snapshot.counters.clustered
        );
    }

    #[test]
    fn layout_outside_the_field_is_rejected() {
        let result = Simulation::from_layout(
            small_params(),
            vec![Vec2::new(250.0, 10.0)],
            vec![(Vec2::new(10.0, 10.0), Vec2::X)],
        );
        assert!(matches!(result, Err(SimulationError::InvalidConfig { field: "flowers", .. })));

        let result = Simulation::from_layout(
            small_params(),
            vec![Vec2::new(20.0, 10.0)],
            vec![(Vec2::new(10.0, 10.0), Vec2::ZERO)],
        );
        assert!(matches!(result, Err(SimulationError::DegenerateHeading { .. })));
    }
}

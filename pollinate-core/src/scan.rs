use log::trace;

use crate::cluster::{ClusterDecision, Clusterer};
use crate::drone::Drone;
use crate::entity::{ClusterId, FlowerId};
use crate::field::Field;

/// What a single scan changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Flowers discovered by this scan, in discovery order.
    pub discovered: Vec<FlowerId>,
    /// Clusters formed by this scan, in formation order.
    pub formed: Vec<ClusterId>,
}

/// Discovers every unseen flower within `vision_radius` of the drone.
///
/// Flowers are visited in id order. Each one is marked discovered, then
/// classified by `clusterer`, so a cluster formed early in the scan can
/// exclude flowers discovered later in the same scan.
pub fn scan<C>(drone: &Drone, field: &mut Field, clusterer: &mut C, vision_radius: f32) -> ScanReport
where
    C: Clusterer + ?Sized,
{
    let mut report = ScanReport::default();

    for id in field.within(drone.position(), vision_radius) {
        if field.flower(id).map_or(true, |flower| flower.is_discovered()) {
            continue;
        }

        field.discover(id, false);
        let decision = clusterer.classify(field, id);
        if decision.is_clustered() {
            field.mark_clustered(id);
        }
        report.discovered.push(id);
        if let ClusterDecision::Formed(cluster) = decision {
            report.formed.push(cluster);
        }
    }

    if !report.discovered.is_empty() {
        trace!(
            "{} discovered {} flowers, formed {} clusters",
            drone.id(),
            report.discovered.len(),
            report.formed.len()
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{ClusterPolicy, ClusterRegistry};
    use crate::entity::DroneId;
    use crate::flower::FlowerState;
    use glam::Vec2;

    /// Records the order flowers are offered in and never clusters them.
    #[derive(Default)]
    struct Recorder {
        offered: Vec<FlowerId>,
    }

    impl Clusterer for Recorder {
        fn classify(&mut self, field: &Field, candidate: FlowerId) -> ClusterDecision {
            let flower = field.flower(candidate).unwrap();
            assert_eq!(flower.state(), FlowerState::Seen { clustered: false });
            self.offered.push(candidate);
            ClusterDecision::Sparse
        }
    }

    fn drone_at(position: Vec2) -> Drone {
        Drone::new(DroneId::new(0), position, Vec2::Y).unwrap()
    }

    #[test]
    fn offers_each_flower_in_range_once() {
        let mut field = Field::from_positions(
            100.0,
            [Vec2::new(10.0, 10.0), Vec2::new(90.0, 90.0), Vec2::new(12.0, 9.0)],
        );
        let mut recorder = Recorder::default();
        let drone = drone_at(Vec2::new(10.0, 10.0));

        let report = scan(&drone, &mut field, &mut recorder, 5.0);
        assert_eq!(recorder.offered, vec![FlowerId::new(0), FlowerId::new(2)]);
        assert_eq!(report.discovered, recorder.offered);
        assert!(report.formed.is_empty());

        let again = scan(&drone, &mut field, &mut recorder, 5.0);
        assert!(again.discovered.is_empty());
        assert_eq!(recorder.offered.len(), 2);
        assert_eq!(field.discovered_count(), 2);
        assert_eq!(field.clustered_count(), 0);
    }

    #[test]
    fn stores_the_decision_on_the_flower() {
        let mut field = Field::from_positions(
            100.0,
            [Vec2::new(50.0, 50.0), Vec2::new(51.0, 50.0), Vec2::new(50.0, 52.0)],
        );
        let mut registry = ClusterRegistry::new(ClusterPolicy::new(10.0, 3, 1.5));
        let report = scan(&drone_at(Vec2::new(50.0, 50.0)), &mut field, &mut registry, 20.0);

        assert_eq!(report.formed, vec![ClusterId::new(0)]);
        assert!(field.flowers().iter().all(|f| f.is_clustered()));
        assert_eq!(field.clustered_count(), 3);
    }
}

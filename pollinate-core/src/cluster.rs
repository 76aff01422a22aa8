//! Incremental, single-pass clustering of newly discovered flowers.
//!
//! Every newly discovered flower is offered to a [`Clusterer`]. The registry
//! implementation greedily accepts a flower as a cluster core when enough
//! flowers surround it and no accepted core is nearby. Accepted clusters are
//! never merged, edited or removed, so the result depends on discovery order.

use glam::Vec2;
use log::debug;

use crate::entity::{ClusterId, FlowerId};
use crate::field::Field;

/// Radii and thresholds of the clustering decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterPolicy {
    pub pollination_radius: f32,
    pub min_cluster_points: usize,
    /// Minimum distance between two cluster cores.
    pub exclusion_radius: f32,
}

impl ClusterPolicy {
    pub fn new(pollination_radius: f32, min_cluster_points: usize, exclusion_multiplier: f32) -> Self {
        ClusterPolicy {
            pollination_radius,
            min_cluster_points,
            exclusion_radius: pollination_radius * exclusion_multiplier,
        }
    }
}

/// An immutable snapshot of the flowers around a core at formation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    id: ClusterId,
    core: FlowerId,
    core_position: Vec2,
    // ascending, so membership checks can binary search
    members: Vec<FlowerId>,
}

impl Cluster {
    pub fn id(&self) -> ClusterId {
        self.id
    }

    pub fn core(&self) -> FlowerId {
        self.core
    }

    pub fn core_position(&self) -> Vec2 {
        self.core_position
    }

    pub fn members(&self) -> &[FlowerId] {
        &self.members
    }

    pub fn contains(&self, flower: FlowerId) -> bool {
        self.members.binary_search(&flower).is_ok()
    }
}

/// Outcome of offering a newly discovered flower to a [`Clusterer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterDecision {
    /// The flower became the core of a new cluster.
    Formed(ClusterId),
    /// The flower lies too close to an existing core, and is one of that
    /// cluster's recorded members. It counts as clustered, so the clustered
    /// percentage includes members found after their core, not only cores.
    Joined(ClusterId),
    /// The flower lies too close to an existing core it does not belong to.
    Excluded,
    /// Too few flowers around it to anchor a cluster.
    Sparse,
}

impl ClusterDecision {
    pub fn is_clustered(&self) -> bool {
        matches!(self, ClusterDecision::Formed(_) | ClusterDecision::Joined(_))
    }
}

/// Capability handed to a scan to classify each newly discovered flower.
///
/// The candidate is already `Seen { clustered: false }` when `classify` runs;
/// the scan raises the clustered flag afterwards when the decision asks for it.
pub trait Clusterer {
    fn classify(&mut self, field: &Field, candidate: FlowerId) -> ClusterDecision;
}

/// Append-only collection of the clusters formed during a run.
#[derive(Debug, Clone)]
pub struct ClusterRegistry {
    policy: ClusterPolicy,
    clusters: Vec<Cluster>,
}

impl ClusterRegistry {
    pub fn new(policy: ClusterPolicy) -> Self {
        ClusterRegistry {
            policy,
            clusters: Vec::new(),
        }
    }

    pub fn policy(&self) -> &ClusterPolicy {
        &self.policy
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn get(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Clusters whose core is strictly closer than the exclusion radius.
    pub fn excluding(&self, position: Vec2) -> impl Iterator<Item = &Cluster> + '_ {
        let limit = self.policy.exclusion_radius;
        self.clusters
            .iter()
            .filter(move |cluster| cluster.core_position.distance(position) < limit)
    }
}

impl Clusterer for ClusterRegistry {
    fn classify(&mut self, field: &Field, candidate: FlowerId) -> ClusterDecision {
        let position = field.position(candidate);

        let mut excluded = false;
        for cluster in self.excluding(position) {
            if cluster.contains(candidate) {
                return ClusterDecision::Joined(cluster.id);
            }
            excluded = true;
        }
        if excluded {
            return ClusterDecision::Excluded;
        }

        let members = field.within(position, self.policy.pollination_radius);
        if members.len() < self.policy.min_cluster_points {
            return ClusterDecision::Sparse;
        }

        let id = ClusterId::new(self.clusters.len());
        debug!(
            "{} formed around {} at ({:.1}, {:.1}) with {} members",
            id,
            candidate,
            position.x,
            position.y,
            members.len()
        );
        self.clusters.push(Cluster {
            id,
            core: candidate,
            core_position: position,
            members,
        });
        ClusterDecision::Formed(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ClusterPolicy {
        ClusterPolicy::new(10.0, 3, 1.5)
    }

    #[test]
    fn dense_flower_forms_a_cluster() {
        let field = Field::from_positions(
            100.0,
            [
                Vec2::new(50.0, 50.0),
                Vec2::new(52.0, 51.0),
                Vec2::new(47.0, 49.0),
                Vec2::new(80.0, 80.0),
            ],
        );
        let mut registry = ClusterRegistry::new(policy());

        let decision = registry.classify(&field, FlowerId::new(0));
        assert_eq!(decision, ClusterDecision::Formed(ClusterId::new(0)));

        let cluster = &registry.clusters()[0];
        assert_eq!(cluster.core(), FlowerId::new(0));
        assert_eq!(
            cluster.members(),
            &[FlowerId::new(0), FlowerId::new(1), FlowerId::new(2)]
        );
    }

    #[test]
    fn sparse_flower_is_not_clustered() {
        let field = Field::from_positions(100.0, [Vec2::new(10.0, 10.0), Vec2::new(15.0, 10.0)]);
        let mut registry = ClusterRegistry::new(policy());
        assert_eq!(registry.classify(&field, FlowerId::new(0)), ClusterDecision::Sparse);
        assert!(registry.is_empty());
    }

    #[test]
    fn members_count_undiscovered_flowers_and_the_core() {
        let field = Field::from_positions(100.0, [Vec2::new(10.0, 10.0), Vec2::new(20.0, 10.0)]);
        let mut registry = ClusterRegistry::new(ClusterPolicy::new(10.0, 2, 1.5));
        assert!(registry.classify(&field, FlowerId::new(0)).is_clustered());
    }

    #[test]
    fn second_core_inside_exclusion_radius_is_rejected() {
        // Two dense groups 12 apart: both qualify on density, exclusion radius is 15.
        let field = Field::from_positions(
            100.0,
            [
                Vec2::new(30.0, 30.0),
                Vec2::new(31.0, 30.0),
                Vec2::new(30.0, 31.0),
                Vec2::new(42.0, 30.0),
                Vec2::new(43.0, 30.0),
                Vec2::new(42.0, 31.0),
            ],
        );
        let mut registry = ClusterRegistry::new(policy());

        assert!(registry.classify(&field, FlowerId::new(0)).is_clustered());
        assert_eq!(field.within(Vec2::new(42.0, 30.0), 10.0).len(), 3);
        assert_eq!(registry.classify(&field, FlowerId::new(3)), ClusterDecision::Excluded);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn recorded_member_joins_without_changing_the_cluster() {
        let field = Field::from_positions(
            100.0,
            [Vec2::new(30.0, 30.0), Vec2::new(32.0, 30.0), Vec2::new(30.0, 33.0)],
        );
        let mut registry = ClusterRegistry::new(policy());
        registry.classify(&field, FlowerId::new(0));
        let before = registry.clusters().to_vec();

        assert_eq!(
            registry.classify(&field, FlowerId::new(1)),
            ClusterDecision::Joined(ClusterId::new(0))
        );
        assert_eq!(registry.clusters(), before.as_slice());
    }

    #[test]
    fn core_exactly_at_exclusion_radius_is_allowed() {
        let field = Field::from_positions(
            100.0,
            [
                Vec2::new(20.0, 20.0),
                Vec2::new(21.0, 20.0),
                Vec2::new(20.0, 21.0),
                Vec2::new(40.0, 20.0),
                Vec2::new(41.0, 20.0),
                Vec2::new(40.0, 21.0),
            ],
        );
        let mut registry = ClusterRegistry::new(ClusterPolicy::new(10.0, 3, 2.0));
        assert!(registry.classify(&field, FlowerId::new(0)).is_clustered());
        assert_eq!(
            registry.classify(&field, FlowerId::new(3)),
            ClusterDecision::Formed(ClusterId::new(1))
        );
    }
}

use glam::Vec2;
use rand::Rng;

use crate::entity::FlowerId;
use crate::flower::Flower;
use crate::spatial::SpatialGrid;

/// The square domain and the flowers in it.
///
/// The field owns every flower. Flowers are created once and only their
/// discovery state changes afterwards, which the field tracks in running
/// counters.
#[derive(Debug, Clone)]
pub struct Field {
    size: f32,
    flowers: Vec<Flower>,
    grid: Option<SpatialGrid>,
    discovered: usize,
    clustered: usize,
}

impl Field {
    /// Scatters `count` flowers uniformly over `[0, size)²`.
    pub fn generate<R: Rng + ?Sized>(size: f32, count: usize, rng: &mut R) -> Self {
        let positions: Vec<Vec2> = (0..count)
            .map(|_| Vec2::new(rng.gen_range(0.0..size), rng.gen_range(0.0..size)))
            .collect();
        Self::from_positions(size, positions)
    }

    pub fn from_positions(size: f32, positions: impl IntoIterator<Item = Vec2>) -> Self {
        Field {
            size,
            flowers: positions.into_iter().map(Flower::new).collect(),
            grid: None,
            discovered: 0,
            clustered: 0,
        }
    }

    /// Indexes the flowers into a uniform grid. Radius queries return the same
    /// ids, in the same order, as without the grid.
    pub fn with_spatial_grid(mut self, cell_size: f32) -> Self {
        let mut grid = SpatialGrid::new(cell_size, self.size);
        for (index, flower) in self.flowers.iter().enumerate() {
            grid.insert(FlowerId::new(index), flower.position());
        }
        self.grid = Some(grid);
        self
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.flowers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flowers.is_empty()
    }

    pub fn has_spatial_grid(&self) -> bool {
        self.grid.is_some()
    }

    pub fn flowers(&self) -> &[Flower] {
        &self.flowers
    }

    pub fn flower(&self, id: FlowerId) -> Option<&Flower> {
        self.flowers.get(id.index())
    }

    pub fn ids(&self) -> impl Iterator<Item = FlowerId> + '_ {
        (0..self.flowers.len()).map(FlowerId::new)
    }

    /// Position of a flower minted by this field.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this field.
    pub fn position(&self, id: FlowerId) -> Vec2 {
        self.flowers[id.index()].position()
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        (0.0..=self.size).contains(&point.x) && (0.0..=self.size).contains(&point.y)
    }

    /// Ids of all flowers within `radius` of `center` (inclusive), ascending,
    /// regardless of discovery state.
    pub fn within(&self, center: Vec2, radius: f32) -> Vec<FlowerId> {
        let radius_sq = radius * radius;
        let in_range = |id: &FlowerId| self.position(*id).distance_squared(center) <= radius_sq;

        match &self.grid {
            Some(grid) => grid.candidates(center, radius).into_iter().filter(in_range).collect(),
            None => self.ids().filter(in_range).collect(),
        }
    }

    /// Records the discovery of a flower and its clustering outcome. Returns
    /// `false` if the flower had already been discovered.
    pub(crate) fn discover(&mut self, id: FlowerId, clustered: bool) -> bool {
        let newly = self.flowers[id.index()].discover(clustered);
        if newly {
            self.discovered += 1;
            if clustered {
                self.clustered += 1;
            }
        }
        newly
    }

    pub(crate) fn mark_clustered(&mut self, id: FlowerId) -> bool {
        let raised = self.flowers[id.index()].mark_clustered();
        if raised {
            self.clustered += 1;
        }
        raised
    }

    pub fn discovered_count(&self) -> usize {
        self.discovered
    }

    pub fn clustered_count(&self) -> usize {
        self.clustered
    }
}

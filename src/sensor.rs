// Breadth-first board sensing and feature normalization
//
// A traversal starts at a candidate next cell and walks the board outwards.
// Every cell it reaches adds `weight / distance` to the slot of its category,
// so nearby things dominate the feature vector. Occupied cells (obstacles and
// snakes) are sensed but stop the walk.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::board::{BoardGraph, BoardState, CellKind};

/// Number of slots in a feature vector
pub const NUM_FEATURES: usize = 9;

/// Feature slots in network input order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Empty = 0,
    MaxDistance,
    /// Kept for input-width compatibility, never written
    MinDistance,
    Food,
    Obstacle,
    Head,
    Body,
    Tail,
    Own,
}

impl Feature {
    pub fn slot(self) -> usize {
        self as usize
    }
}

pub type FeatureVector = [f64; NUM_FEATURES];

/// How strongly each category is sensed at distance 1
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SenseWeights {
    pub empty: f64,
    pub food: f64,
    pub obstacle: f64,
    pub head: f64,
    pub body: f64,
    pub tail: f64,
    pub own: f64,
}

impl Default for SenseWeights {
    fn default() -> Self {
        SenseWeights {
            empty: 0.5,
            food: 0.5,
            obstacle: 1.0,
            head: 1.0,
            body: 0.5,
            tail: 1.0,
            own: 0.5,
        }
    }
}

impl SenseWeights {
    fn for_kind(&self, kind: CellKind) -> (Feature, f64) {
        match kind {
            CellKind::Empty => (Feature::Empty, self.empty),
            CellKind::Food => (Feature::Food, self.food),
            CellKind::Obstacle => (Feature::Obstacle, self.obstacle),
            CellKind::Head => (Feature::Head, self.head),
            CellKind::Body => (Feature::Body, self.body),
            CellKind::Tail => (Feature::Tail, self.tail),
        }
    }
}

/// BFS sensor with a scratch buffer reused across traversals
#[derive(Debug, Clone)]
pub struct SensorAggregator {
    weights: SenseWeights,
    parent: Vec<Option<usize>>,
    distance: Vec<u32>,
    frontier: VecDeque<usize>,
}

impl SensorAggregator {
    pub fn new(graph: &BoardGraph, weights: SenseWeights) -> Self {
        SensorAggregator {
            weights,
            parent: vec![None; graph.len()],
            distance: vec![0; graph.len()],
            frontier: VecDeque::with_capacity(graph.len()),
        }
    }

    /// Walks the board from `start` and returns the raw feature sums
    ///
    /// `start` is seeded with distance 1 and is its own parent. Each cell is
    /// discovered at most once; terminal cells are sensed but not expanded.
    pub fn aggregate(&mut self, graph: &BoardGraph, state: &BoardState, start: usize) -> FeatureVector {
        self.parent.fill(None);
        self.distance.fill(0);
        self.frontier.clear();

        let mut features = [0.0; NUM_FEATURES];

        self.parent[start] = Some(start);
        self.distance[start] = 1;
        self.frontier.push_back(start);

        while let Some(index) = self.frontier.pop_front() {
            let dist = self.distance[index];
            self.sense(&mut features, state, index, dist);

            if state.cell(index).terminal {
                continue;
            }

            for next in graph.neighbors(index).iter().flatten().copied() {
                if self.parent[next].is_none() {
                    self.parent[next] = Some(index);
                    self.distance[next] = dist + 1;
                    self.frontier.push_back(next);
                }
            }
        }

        features
    }

    fn sense(&self, features: &mut FeatureVector, state: &BoardState, index: usize, dist: u32) {
        let cell = state.cell(index);
        let fade = 1.0 / f64::from(dist);

        let (slot, weight) = self.weights.for_kind(cell.kind);
        features[slot.slot()] += weight * fade;

        if cell.own {
            features[Feature::Own.slot()] += self.weights.own * fade;
        }

        let max = &mut features[Feature::MaxDistance.slot()];
        if f64::from(dist) > *max {
            *max = f64::from(dist);
        }
    }

    /// Distance of a cell from the last traversal's start (start = 1)
    pub fn distance(&self, index: usize) -> Option<u32> {
        self.parent[index].map(|_| self.distance[index])
    }

    /// Cell through which the last traversal discovered `index`
    pub fn parent(&self, index: usize) -> Option<usize> {
        self.parent[index]
    }
}

/// Divides every feature by a fixed per-slot scale
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureNormalizer {
    scales: FeatureVector,
}

impl FeatureNormalizer {
    /// Scales must be nonzero; Config::validate enforces this for loaded configs
    pub fn new(scales: FeatureVector) -> Self {
        FeatureNormalizer { scales }
    }

    /// Scales tuned for a board of the given size
    pub fn for_board(width: usize, height: usize) -> Self {
        FeatureNormalizer::new(default_scales(width, height))
    }

    pub fn normalize(&self, features: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; NUM_FEATURES];
        for (i, value) in out.iter_mut().enumerate() {
            *value = features[i] / self.scales[i];
        }
        out
    }
}

/// Empty cells are scaled by a tenth of the board area, the rest are fixed
pub fn default_scales(width: usize, height: usize) -> FeatureVector {
    [
        (width * height) as f64 / 10.0,
        15.0,
        10.0,
        1.0,
        1.0,
        1.0,
        2.0,
        1.5,
        2.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Map, SnakeInfo};

    const EPS: f64 = 1e-12;

    fn state_with(graph: &BoardGraph, snakes: Vec<(&str, Vec<usize>)>, food: Vec<usize>, obstacles: Vec<usize>) -> BoardState {
        let map = Map {
            width: None,
            height: None,
            world_tick: 0,
            snake_infos: snakes
                .into_iter()
                .map(|(id, positions)| SnakeInfo {
                    id: id.to_string(),
                    name: id.to_string(),
                    points: 0,
                    positions,
                    tail_protected_for_game_ticks: 0,
                })
                .collect(),
            food_positions: food,
            obstacle_positions: obstacles,
        };
        let mut state = BoardState::new(graph);
        state.refresh(graph, &map, "me").unwrap();
        state
    }

    fn manhattan(graph: &BoardGraph, a: usize, b: usize) -> u32 {
        let (ax, ay) = graph.coords(a);
        let (bx, by) = graph.coords(b);
        (ax.abs_diff(bx) + ay.abs_diff(by)) as u32
    }

    #[test]
    fn test_open_board_distances_are_manhattan_plus_one() {
        let graph = BoardGraph::new(7, 5);
        // our snake sits in a corner, out of the way of most paths
        let state = state_with(&graph, vec![("me", vec![graph.index_of(6, 4)])], vec![], vec![]);
        let mut sensor = SensorAggregator::new(&graph, SenseWeights::default());

        let start = graph.index_of(2, 2);
        sensor.aggregate(&graph, &state, start);

        for index in 0..graph.len() {
            assert_eq!(sensor.distance(index), Some(manhattan(&graph, start, index) + 1));
        }
        assert_eq!(sensor.parent(start), Some(start));
    }

    #[test]
    fn test_sums_are_decayed_by_distance() {
        // 1x4 corridor: start | empty | food | own head
        let graph = BoardGraph::new(4, 1);
        let state = state_with(&graph, vec![("me", vec![3])], vec![2], vec![]);
        let mut sensor = SensorAggregator::new(&graph, SenseWeights::default());

        let features = sensor.aggregate(&graph, &state, 0);

        assert!((features[Feature::Empty.slot()] - (0.5 / 1.0 + 0.5 / 2.0)).abs() < EPS);
        assert!((features[Feature::Food.slot()] - 0.5 / 3.0).abs() < EPS);
        // a one-cell snake is marked as tail
        assert!((features[Feature::Tail.slot()] - 1.0 / 4.0).abs() < EPS);
        assert!((features[Feature::Own.slot()] - 0.5 / 4.0).abs() < EPS);
        assert_eq!(features[Feature::MaxDistance.slot()], 4.0);
        assert_eq!(features[Feature::MinDistance.slot()], 0.0);
    }

    #[test]
    fn test_traversal_stops_at_terminal_cells() {
        // 1x5 corridor with an obstacle in the middle
        let graph = BoardGraph::new(5, 1);
        let state = state_with(&graph, vec![("me", vec![4])], vec![], vec![2]);
        let mut sensor = SensorAggregator::new(&graph, SenseWeights::default());

        let features = sensor.aggregate(&graph, &state, 0);

        assert_eq!(sensor.distance(2), Some(3));
        assert_eq!(sensor.distance(3), None);
        assert_eq!(sensor.distance(4), None);
        assert!((features[Feature::Obstacle.slot()] - 1.0 / 3.0).abs() < EPS);
        assert_eq!(features[Feature::Tail.slot()], 0.0);
        assert_eq!(features[Feature::MaxDistance.slot()], 3.0);
    }

    #[test]
    fn test_enclosing_snake_is_sensed_but_not_crossed() {
        // 4x3 board, start at (1,1) boxed in by an enemy snake whose head is above it
        let graph = BoardGraph::new(4, 3);
        let ring = vec![1, 2, 6, 10, 9, 8, 4, 0];
        let state = state_with(&graph, vec![("them", ring), ("me", vec![11])], vec![], vec![]);
        let mut sensor = SensorAggregator::new(&graph, SenseWeights::default());

        let features = sensor.aggregate(&graph, &state, graph.index_of(1, 1));

        assert!((features[Feature::Head.slot()] - 1.0 / 2.0).abs() < EPS);
        assert!((features[Feature::Body.slot()] - 3.0 * 0.5 / 2.0).abs() < EPS);
        assert!((features[Feature::Empty.slot()] - 0.5).abs() < EPS);
        assert_eq!(features[Feature::Tail.slot()], 0.0);
        assert_eq!(features[Feature::Own.slot()], 0.0);
        assert_eq!(features[Feature::MaxDistance.slot()], 2.0);
        assert_eq!(sensor.distance(0), None);
        assert_eq!(sensor.distance(7), None);
    }

    #[test]
    fn test_scratch_is_reset_between_traversals() {
        let graph = BoardGraph::new(5, 1);
        let state = state_with(&graph, vec![("me", vec![2])], vec![], vec![]);
        let mut sensor = SensorAggregator::new(&graph, SenseWeights::default());

        let left = sensor.aggregate(&graph, &state, 0);
        let right = sensor.aggregate(&graph, &state, 4);

        assert_eq!(sensor.distance(0), None);
        assert_eq!(sensor.distance(4), Some(1));
        assert_eq!(left, right);

        let again = sensor.aggregate(&graph, &state, 0);
        assert_eq!(left, again);
    }

    #[test]
    fn test_normalize_divides_by_scales() {
        let normalizer = FeatureNormalizer::for_board(46, 34);
        let raw = [156.4, 15.0, 0.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];

        let normalized = normalizer.normalize(&raw);

        assert!((normalized[0] - 1.0).abs() < EPS);
        assert!((normalized[1] - 1.0).abs() < EPS);
        assert_eq!(normalized[2], 0.0);
        assert!((normalized[6] - 2.5).abs() < EPS);
        assert!((normalized[7] - 4.0).abs() < EPS);
        assert!((normalized[8] - 3.5).abs() < EPS);
    }
}

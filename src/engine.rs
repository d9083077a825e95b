// Move selection: score the four cells around our head and pick the best
//
// For every open neighbour the board is sensed from that cell, the features are
// normalized and the network turns them into a Q-value. Blocked directions get
// BLOCKED_SCORE. Directions are scanned Up, Down, Left, Right and only a strictly
// greater score replaces the current best, so ties go to the earlier direction.

use log::{debug, warn};
use serde::Serialize;

use crate::board::{BoardGraph, BoardState};
use crate::config::Config;
use crate::error::EngineError;
use crate::network::Network;
use crate::sensor::{FeatureNormalizer, FeatureVector, SensorAggregator, NUM_FEATURES};
use crate::types::{Direction, Map};

/// Score given to a direction that leaves the board or runs into something
pub const BLOCKED_SCORE: f64 = -1e10;

/// Outcome of one move selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub direction: Direction,
    /// Q-values in Up, Down, Left, Right order
    pub scores: [f64; 4],
}

#[derive(Debug, Clone)]
pub struct Engine {
    graph: BoardGraph,
    state: BoardState,
    sensor: SensorAggregator,
    normalizer: FeatureNormalizer,
    network: Network,
}

impl Engine {
    /// Builds the board graph and declares the network from configuration
    ///
    /// Weights start at zero until `set_parameters` is called.
    pub fn new(config: &Config) -> Result<Self, EngineError> {
        let network = Network::with_layers(
            NUM_FEATURES,
            &config.network.layers,
            config.network.activation,
        );
        let graph = BoardGraph::new(config.board.width, config.board.height);
        let sensor = SensorAggregator::new(&graph, config.senses);
        let normalizer = FeatureNormalizer::new(config.normalization.scales);

        Engine::from_parts(graph, sensor, normalizer, network)
    }

    /// Assembles an engine from its components, checking the network fits the features
    pub fn from_parts(
        graph: BoardGraph,
        sensor: SensorAggregator,
        normalizer: FeatureNormalizer,
        network: Network,
    ) -> Result<Self, EngineError> {
        if network.input_width() != NUM_FEATURES {
            return Err(EngineError::ShapeMismatch {
                context: "network input width".to_string(),
                expected: NUM_FEATURES,
                found: network.input_width(),
            });
        }
        if network.output_width() != 1 {
            return Err(EngineError::ShapeMismatch {
                context: "network output width".to_string(),
                expected: 1,
                found: network.output_width(),
            });
        }

        let state = BoardState::new(&graph);
        Ok(Engine {
            graph,
            state,
            sensor,
            normalizer,
            network,
        })
    }

    pub fn graph(&self) -> &BoardGraph {
        &self.graph
    }

    pub fn board(&self) -> &BoardState {
        &self.state
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn set_parameters(&mut self, values: &[f64]) -> Result<(), EngineError> {
        self.network.load_parameters(values)
    }

    /// Refreshes the board from `map` and picks the best direction for `own_id`
    pub fn select_move(&mut self, map: &Map, own_id: &str) -> Result<Decision, EngineError> {
        self.state.refresh(&self.graph, map, own_id)?;
        let head = self.state.own_head().ok_or_else(|| EngineError::MissingOwnHead {
            player_id: own_id.to_string(),
            matches: 0,
        })?;

        let mut scores = [BLOCKED_SCORE; 4];
        let mut first_open = None;
        for dir in Direction::all() {
            if let Some(next) = self.graph.neighbor(head, dir) {
                if !self.state.cell(next).terminal {
                    first_open = first_open.or(Some(dir));
                    let q = self.q_value(next)?;
                    if q.is_finite() {
                        scores[dir.index()] = q;
                    } else {
                        warn!("Non-finite Q-value {} for {}, treating it as blocked", q, dir);
                    }
                }
            }
        }

        // an open cell always beats a blocked one, even when no score rose above BLOCKED_SCORE
        let mut direction = first_open.unwrap_or(Direction::Up);
        let mut best = BLOCKED_SCORE;
        for dir in Direction::all() {
            if scores[dir.index()] > best {
                best = scores[dir.index()];
                direction = dir;
            }
        }

        debug!("Q-values (U/D/L/R): {:?}, chose {}", scores, direction);
        Ok(Decision { direction, scores })
    }

    /// Normalized features sensed from `start` on the current board
    pub fn features(&mut self, start: usize) -> FeatureVector {
        let raw = self.sensor.aggregate(&self.graph, &self.state, start);
        self.normalizer.normalize(&raw)
    }

    /// Network score of moving onto `start`
    pub fn q_value(&mut self, start: usize) -> Result<f64, EngineError> {
        let features = self.features(start);
        let output = self.network.forward(&features)?;
        output.first().copied().ok_or(EngineError::ShapeMismatch {
            context: "network output".to_string(),
            expected: 1,
            found: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Activation;
    use crate::sensor::SenseWeights;
    use crate::types::SnakeInfo;

    fn small_engine(width: usize, height: usize) -> Engine {
        let mut config = Config::default_hardcoded();
        config.board.width = width;
        config.board.height = height;
        Engine::new(&config).unwrap()
    }

    fn map_with(snakes: Vec<(&str, Vec<usize>)>, food: Vec<usize>, obstacles: Vec<usize>) -> Map {
        Map {
            width: None,
            height: None,
            world_tick: 1,
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
        }
    }

    #[test]
    fn test_network_with_wrong_input_width_is_rejected() {
        let graph = BoardGraph::new(3, 3);
        let sensor = SensorAggregator::new(&graph, SenseWeights::default());
        let network = Network::with_layers(8, &[1], Activation::Tanh);
        let result = Engine::from_parts(graph, sensor, FeatureNormalizer::for_board(3, 3), network);
        assert!(matches!(result, Err(EngineError::ShapeMismatch { expected: 9, found: 8, .. })));
    }

    #[test]
    fn test_zero_weights_pick_up_when_all_open() {
        let mut engine = small_engine(5, 5);
        let decision = engine.select_move(&map_with(vec![("me", vec![12])], vec![], vec![]), "me").unwrap();

        assert_eq!(decision.direction, Direction::Up);
        assert_eq!(decision.scores, [0.0; 4]);
    }

    #[test]
    fn test_edges_and_obstacles_score_blocked() {
        let mut engine = small_engine(5, 5);
        // head in the top-left corner with an obstacle to the right
        let decision = engine.select_move(&map_with(vec![("me", vec![0])], vec![], vec![1]), "me").unwrap();

        assert_eq!(decision.scores[Direction::Up.index()], BLOCKED_SCORE);
        assert_eq!(decision.scores[Direction::Left.index()], BLOCKED_SCORE);
        assert_eq!(decision.scores[Direction::Right.index()], BLOCKED_SCORE);
        assert_eq!(decision.direction, Direction::Down);
    }

    #[test]
    fn test_fully_blocked_head_answers_up() {
        let mut engine = small_engine(3, 3);
        // own body wraps around the head at (1,1)
        let snake = vec![4, 1, 0, 3, 6, 7, 8, 5];
        let decision = engine.select_move(&map_with(vec![("me", snake)], vec![], vec![]), "me").unwrap();

        assert_eq!(decision.scores, [BLOCKED_SCORE; 4]);
        assert_eq!(decision.direction, Direction::Up);
    }

    #[test]
    fn test_non_finite_scores_never_steer_into_an_obstacle() {
        let graph = BoardGraph::new(3, 3);
        let sensor = SensorAggregator::new(&graph, SenseWeights::default());
        // tiny scales overflow the features to infinity, so inf - inf reaches the activation
        let normalizer = FeatureNormalizer::new([1e-310; NUM_FEATURES]);
        let mut network = Network::with_layers(NUM_FEATURES, &[1], Activation::Tanh);
        let mut params = vec![0.0; network.parameter_count()];
        params[0] = 1.0;
        params[1] = -1.0;
        network.load_parameters(&params).unwrap();
        let mut engine = Engine::from_parts(graph, sensor, normalizer, network).unwrap();

        let decision = engine.select_move(&map_with(vec![("me", vec![4])], vec![], vec![1]), "me").unwrap();

        assert_eq!(decision.scores, [BLOCKED_SCORE; 4]);
        assert_eq!(decision.direction, Direction::Down);
    }

    #[test]
    fn test_non_finite_parameters_leave_engine_unchanged() {
        let mut engine = small_engine(5, 5);
        let mut params = vec![0.5; engine.network().parameter_count()];
        params[3] = f64::NAN;

        assert!(matches!(
            engine.set_parameters(&params),
            Err(EngineError::NonFiniteParameter { index: 3, .. })
        ));
        assert!(engine.network().parameters().iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_missing_own_snake_fails_fast() {
        let mut engine = small_engine(4, 4);
        let result = engine.select_move(&map_with(vec![("other", vec![5])], vec![], vec![]), "me");
        assert!(matches!(result, Err(EngineError::MissingOwnHead { .. })));
    }
}

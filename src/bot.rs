// Session state for one agent
//
// The Bot owns the move engine together with everything the server tells us
// about the current game: our player id, how long we have survived and the
// final standing. The message router calls the `on_*` methods; the process
// loop reads the result once the connection closes.

use log::{info, warn};
use std::fmt;

use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::types::{Direction, Map, PlayerRank};

/// Outcome of one game, printed to stdout for the parameter search driving us
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    pub points: i64,
    pub age: u32,
    pub is_alive: bool,
    pub game_link: String,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.points,
            self.age,
            u8::from(self.is_alive),
            self.game_link
        )
    }
}

pub struct Bot {
    engine: Engine,
    name: String,
    player_id: Option<String>,
    age: u32,
    points: i64,
    rank: Option<u32>,
    is_alive: bool,
    game_link: String,
    death_reason: Option<String>,
    debug_logger: DebugLogger,
}

impl Bot {
    /// Creates a new Bot from configuration; network weights start at zero
    pub fn new(config: &Config) -> Result<Self, EngineError> {
        Ok(Bot {
            engine: Engine::new(config)?,
            name: config.server.player_name.clone(),
            player_id: None,
            age: 0,
            points: 0,
            rank: None,
            is_alive: false,
            game_link: String::new(),
            death_reason: None,
            debug_logger: DebugLogger::disabled(),
        })
    }

    pub fn with_debug_logger(mut self, debug_logger: DebugLogger) -> Self {
        self.debug_logger = debug_logger;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn rank(&self) -> Option<u32> {
        self.rank
    }

    pub fn death_reason(&self) -> Option<&str> {
        self.death_reason.as_deref()
    }

    /// Loads a flat parameter vector into the network
    pub fn set_parameters(&mut self, values: &[f64]) -> Result<(), EngineError> {
        self.engine.set_parameters(values)?;
        info!("Loaded {} network parameters", values.len());
        Ok(())
    }

    /// Picks our next move for a map update
    pub fn get_next_move(&mut self, map: &Map) -> Result<Direction, EngineError> {
        self.age += 1;

        let player_id = self.player_id.as_deref().ok_or(EngineError::UnregisteredPlayer)?;
        let decision = self.engine.select_move(map, player_id)?;
        self.debug_logger.log_move(player_id, map, &decision);

        info!(
            "Snake is making move {} at worldtick: {}",
            decision.direction, map.world_tick
        );
        Ok(decision.direction)
    }

    /// Forgets everything learned from the previous connection
    ///
    /// Called before each new job so a failed session can never report the
    /// previous game's result.
    pub fn reset_session(&mut self) {
        self.player_id = None;
        self.game_link.clear();
        self.reset_game();
    }

    fn reset_game(&mut self) {
        self.age = 0;
        self.points = 0;
        self.rank = None;
        self.is_alive = false;
        self.death_reason = None;
    }

    pub fn on_game_starting(&mut self) {
        info!("Game is starting");
        self.reset_game();
    }

    pub fn on_player_registered(&mut self, player_id: &str) {
        self.player_id = Some(player_id.to_string());
        info!("Player was successfully registered");
    }

    pub fn on_game_link(&mut self, game_link: &str) {
        self.game_link = game_link.to_string();
        info!("Watch game at: {}", game_link);
    }

    pub fn on_snake_dead(&mut self, death_reason: &str) {
        info!("Our snake has died, reason was: {}", death_reason);
        self.death_reason = Some(death_reason.to_string());
    }

    pub fn on_game_ended(&mut self) {
        info!("Game has ended");
    }

    pub fn on_tournament_ended(&mut self) {
        info!("Tournament has ended");
    }

    pub fn on_invalid_player_name(&mut self) {
        warn!("The player name '{}' is invalid, try another?", self.name);
    }

    /// Stores our standing from the final ranking, matched by display name
    pub fn on_game_result(&mut self, player_ranks: &[PlayerRank]) {
        info!("Game result:");
        for player in player_ranks {
            info!(
                "{}.\t{} pts\t{} ({})",
                player.rank,
                player.points,
                player.player_name,
                if player.alive { "alive" } else { "dead" }
            );
        }

        match player_ranks.iter().find(|p| p.player_name == self.name) {
            Some(ours) => {
                self.rank = Some(ours.rank);
                self.points = ours.points;
                self.is_alive = ours.alive;
            }
            None => warn!("No result for player '{}' in game result", self.name),
        }
    }

    pub fn result(&self) -> GameResult {
        GameResult {
            points: self.points,
            age: self.age,
            is_alive: self.is_alive,
            game_link: self.game_link.clone(),
        }
    }
}

// Replay module for analyzing logged decisions
//
// This module provides functionality to:
// 1. Parse JSONL debug logs
// 2. Re-run move selection on each logged map with a given parameter vector
// 3. Compare logged vs replayed moves
// 4. Generate a summary report

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::engine::Engine;
use crate::types::{Direction, Map};

/// Represents a single log entry from the debug JSONL file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogEntry {
    pub world_tick: i64,
    pub player_id: String,
    pub chosen_move: String,
    #[serde(default)]
    pub q_values: Vec<f64>,
    pub map: Map,
    pub timestamp: String,
}

/// Result of replaying a single entry
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub world_tick: i64,
    pub original_move: Direction,
    pub replayed_move: Direction,
    pub matches: bool,
    pub replayed_scores: [f64; 4],
    pub computation_time_us: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    engine: Engine,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a replay engine whose network carries `parameters`
    pub fn new(config: &Config, parameters: &[f64], verbose: bool) -> Result<Self, String> {
        let mut engine = Engine::new(config).map_err(|e| format!("Invalid network configuration: {}", e))?;
        engine
            .set_parameters(parameters)
            .map_err(|e| format!("Parameters do not fit the network: {}", e))?;

        Ok(ReplayEngine { engine, verbose })
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogEntry>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line).map_err(|e| {
                format!(
                    "Failed to parse JSON on line {}: {}",
                    line_num + 1,
                    e
                )
            })?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Replays one entry on the given engine and compares the result
    fn replay_with(engine: &mut Engine, entry: &LogEntry, verbose: bool) -> Result<ReplayResult, String> {
        let original_move: Direction = entry.chosen_move.parse()?;

        let start_time = Instant::now();
        let decision = engine
            .select_move(&entry.map, &entry.player_id)
            .map_err(|e| format!("Failed to replay world tick {}: {}", entry.world_tick, e))?;
        let computation_time_us = start_time.elapsed().as_micros();

        let matches = original_move == decision.direction;

        if verbose {
            if matches {
                info!(
                    "Tick {}: ✓ MATCH - {} (scores: {:?}, time: {}us)",
                    entry.world_tick, decision.direction, decision.scores, computation_time_us
                );
            } else {
                warn!(
                    "Tick {}: ✗ MISMATCH - Original: {}, Replayed: {} (scores: {:?}, time: {}us)",
                    entry.world_tick, original_move, decision.direction, decision.scores, computation_time_us
                );
            }
        }

        Ok(ReplayResult {
            world_tick: entry.world_tick,
            original_move,
            replayed_move: decision.direction,
            matches,
            replayed_scores: decision.scores,
            computation_time_us,
        })
    }

    /// Replays a single log entry
    pub fn replay_entry(&self, entry: &LogEntry) -> Result<ReplayResult, String> {
        let mut engine = self.engine.clone();
        Self::replay_with(&mut engine, entry, self.verbose)
    }

    /// Replays all entries in parallel, one engine copy per worker
    /// Entries that fail to replay are logged and skipped; results come back in tick order
    pub fn replay_all(&self, entries: &[LogEntry]) -> Vec<ReplayResult> {
        let mut results: Vec<ReplayResult> = entries
            .par_iter()
            .map_init(
                || self.engine.clone(),
                |engine, entry| match Self::replay_with(engine, entry, self.verbose) {
                    Ok(result) => Some(result),
                    Err(e) => {
                        warn!("{}", e);
                        None
                    }
                },
            )
            .flatten()
            .collect();

        results.sort_by_key(|r| r.world_tick);
        results
    }

    /// Replays specific world ticks from a log file
    pub fn replay_ticks(&self, entries: &[LogEntry], ticks: &[i64]) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for tick in ticks {
            let entry = entries
                .iter()
                .find(|e| e.world_tick == *tick)
                .ok_or_else(|| format!("World tick {} not found in log file", tick))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("{}", e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Mismatched results in world tick order
    pub fn mismatches(results: &[ReplayResult]) -> Vec<&ReplayResult> {
        let mut mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        mismatches.sort_by_key(|r| r.world_tick);
        mismatches
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Ticks:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results.iter().map(|r| r.computation_time_us as f64).sum::<f64>()
                / results.len() as f64;
            println!("Average Computation Time:   {:.1}us\n", avg_time);
        }

        let mismatches = Self::mismatches(results);
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Tick {}: {} → {} (scores U/D/L/R: {:?})",
                    result.world_tick,
                    result.original_move,
                    result.replayed_move,
                    result.replayed_scores
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were logged
    pub fn validate_expected_moves(
        &self,
        entries: &[LogEntry],
        expected_moves: &[(i64, Vec<Direction>)], // (tick, acceptable_moves)
    ) -> Result<(), String> {
        for (tick, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.world_tick == *tick)
                .ok_or_else(|| format!("World tick {} not found in log", tick))?;

            let actual_move: Direction = entry.chosen_move.parse()?;

            if !acceptable.contains(&actual_move) {
                return Err(format!(
                    "Tick {}: Expected one of {:?}, but got {}",
                    tick,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    actual_move
                ));
            }
        }

        Ok(())
    }
}

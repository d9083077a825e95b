// Game server API types
// Positions are indices into the row-major board array: x + y * width

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Board snapshot carried by every map update
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Map {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<usize>,
    #[serde(default)]
    pub world_tick: i64,
    pub snake_infos: Vec<SnakeInfo>,
    pub food_positions: Vec<usize>,
    pub obstacle_positions: Vec<usize>,
}

/// One snake on the board, positions ordered head first, tail last.
/// Dead snakes are reported with an empty position list.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnakeInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub points: i64,
    pub positions: Vec<usize>,
    #[serde(default)]
    pub tail_protected_for_game_ticks: i64,
}

/// Final standing of one player, as sent in the game result event
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRank {
    pub player_name: String,
    #[serde(default)]
    pub player_id: String,
    #[serde(default)]
    pub rank: u32,
    pub points: i64,
    pub alive: bool,
}

/// The four possible movement directions, in tie-break priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns all directions in scan order
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    /// Position of this direction in scan order and in adjacency arrays
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    /// Converts direction to the label expected by the server
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_direction() {
        assert_eq!("UP".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("down".parse::<Direction>().unwrap(), Direction::Down);
        assert_eq!("Left".parse::<Direction>().unwrap(), Direction::Left);
        assert_eq!("RIGHT".parse::<Direction>().unwrap(), Direction::Right);
        assert!("north".parse::<Direction>().is_err());
    }

    #[test]
    fn test_direction_indices_follow_scan_order() {
        for (i, dir) in Direction::all().iter().enumerate() {
            assert_eq!(dir.index(), i);
        }
    }

    #[test]
    fn test_map_parses_server_fields() {
        let map: Map = serde_json::from_value(json!({
            "type": "se.cygni.snake.api.model.Map",
            "width": 46,
            "height": 34,
            "worldTick": 7,
            "snakeInfos": [
                { "id": "a", "name": "Neurotic", "points": 3, "positions": [10, 11],
                  "tailProtectedForGameTicks": 0 }
            ],
            "foodPositions": [5],
            "obstaclePositions": [100, 101]
        }))
        .unwrap();

        assert_eq!(map.width, Some(46));
        assert_eq!(map.world_tick, 7);
        assert_eq!(map.snake_infos[0].positions, vec![10, 11]);
        assert_eq!(map.obstacle_positions.len(), 2);
    }

    #[test]
    fn test_map_missing_required_field_is_rejected() {
        let result = serde_json::from_value::<Map>(json!({
            "snakeInfos": [],
            "foodPositions": []
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_position_is_rejected() {
        let result = serde_json::from_value::<Map>(json!({
            "snakeInfos": [],
            "foodPositions": [-1],
            "obstaclePositions": []
        }));
        assert!(result.is_err());
    }
}

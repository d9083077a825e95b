// Routes inbound server messages to the Bot
//
// Routing is synchronous and does no I/O: it updates the session and returns
// the actions the client loop should carry out.

use log::{debug, warn};
use serde_json::Value;

use crate::bot::Bot;
use crate::messages;
use crate::types::{Map, PlayerRank};

/// Side effects requested by a routed message
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Send this message to the server
    Send(Value),
    /// Start sending heart beats for this player id
    StartHeartbeat(String),
    /// Close the connection
    Close,
}

const TRAINING_VENUE: &str = "training";
const TRAINING_MODE: &str = "TRAINING";

fn str_field<'a>(message: &'a Value, field: &str) -> Result<&'a str, String> {
    message[field]
        .as_str()
        .ok_or_else(|| format!("Message is missing string field '{}'", field))
}

/// Applies one message to the bot and returns what to do next
pub fn route(bot: &mut Bot, message: &Value, venue: &str) -> Result<Vec<Action>, String> {
    let message_type = str_field(message, "type")?;
    debug!("Received message of type {}", message_type);

    let actions = match message_type {
        messages::GAME_ENDED => {
            bot.on_game_ended();
            if venue == TRAINING_VENUE {
                vec![Action::Close]
            } else {
                vec![]
            }
        }
        messages::TOURNAMENT_ENDED => {
            bot.on_tournament_ended();
            vec![Action::Close]
        }
        messages::MAP_UPDATE => {
            let map: Map = serde_json::from_value(message["map"].clone())
                .map_err(|e| format!("Failed to parse map update: {}", e))?;
            let direction = bot
                .get_next_move(&map)
                .map_err(|e| format!("No move for world tick {}: {}", map.world_tick, e))?;
            vec![Action::Send(messages::register_move(direction.as_str(), message))]
        }
        messages::SNAKE_DEAD => {
            bot.on_snake_dead(message["deathReason"].as_str().unwrap_or("unknown"));
            vec![]
        }
        messages::GAME_STARTING => {
            bot.on_game_starting();
            vec![]
        }
        messages::PLAYER_REGISTERED => {
            let player_id = str_field(message, "receivingPlayerId")?;
            bot.on_player_registered(player_id);

            let mut actions = Vec::new();
            if message["gameMode"].as_str() == Some(TRAINING_MODE) {
                debug!("Requesting a game start");
                actions.push(Action::Send(messages::start_game()));
            }
            actions.push(Action::StartHeartbeat(player_id.to_string()));
            actions
        }
        messages::INVALID_PLAYER_NAME => {
            bot.on_invalid_player_name();
            vec![]
        }
        messages::HEART_BEAT_RESPONSE => vec![],
        messages::GAME_LINK_EVENT => {
            bot.on_game_link(str_field(message, "url")?);
            vec![]
        }
        messages::GAME_RESULT_EVENT => {
            let ranks: Vec<PlayerRank> = serde_json::from_value(message["playerRanks"].clone())
                .map_err(|e| format!("Failed to parse player ranks: {}", e))?;
            bot.on_game_result(&ranks);
            vec![]
        }
        other => {
            warn!("Unable to route message, did not match any known type: {}", other);
            vec![]
        }
    };

    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;

    fn bot() -> Bot {
        Bot::new(&Config::default_hardcoded()).unwrap()
    }

    #[test]
    fn test_message_without_type_is_an_error() {
        assert!(route(&mut bot(), &json!({ "foo": 1 }), "training").is_err());
    }

    #[test]
    fn test_unknown_type_is_ignored() {
        let actions = route(&mut bot(), &json!({ "type": "something.Else" }), "training").unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn test_game_ended_closes_only_in_training() {
        let msg = json!({ "type": messages::GAME_ENDED });
        assert_eq!(route(&mut bot(), &msg, "training").unwrap(), vec![Action::Close]);
        assert!(route(&mut bot(), &msg, "tournament").unwrap().is_empty());
    }

    #[test]
    fn test_tournament_ended_closes() {
        let msg = json!({ "type": messages::TOURNAMENT_ENDED });
        assert_eq!(route(&mut bot(), &msg, "arena").unwrap(), vec![Action::Close]);
    }

    #[test]
    fn test_player_registered_in_training_mode_starts_game_and_heartbeat() {
        let mut bot = bot();
        let msg = json!({
            "type": messages::PLAYER_REGISTERED,
            "receivingPlayerId": "p-7",
            "gameMode": "TRAINING"
        });

        let actions = route(&mut bot, &msg, "training").unwrap();

        assert_eq!(
            actions,
            vec![
                Action::Send(messages::start_game()),
                Action::StartHeartbeat("p-7".to_string())
            ]
        );
        assert_eq!(bot.player_id(), Some("p-7"));
    }

    #[test]
    fn test_player_registered_in_tournament_only_starts_heartbeat() {
        let msg = json!({
            "type": messages::PLAYER_REGISTERED,
            "receivingPlayerId": "p-7",
            "gameMode": "TOURNAMENT"
        });
        let actions = route(&mut bot(), &msg, "tournament").unwrap();
        assert_eq!(actions, vec![Action::StartHeartbeat("p-7".to_string())]);
    }

    #[test]
    fn test_map_update_without_map_is_rejected() {
        let mut bot = bot();
        bot.on_player_registered("p-1");
        let msg = json!({ "type": messages::MAP_UPDATE, "gameTick": 1 });
        assert!(route(&mut bot, &msg, "training").is_err());
    }

    #[test]
    fn test_snake_dead_records_reason() {
        let mut bot = bot();
        let msg = json!({ "type": messages::SNAKE_DEAD, "deathReason": "CollisionWithWall" });
        route(&mut bot, &msg, "training").unwrap();
        assert_eq!(bot.death_reason(), Some("CollisionWithWall"));
    }
}

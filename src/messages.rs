// Game server protocol messages
// Every message is a JSON object tagged by its fully-qualified `type`

use serde_json::{json, Value};

// Inbound
pub const GAME_ENDED: &str = "se.cygni.snake.api.event.GameEndedEvent";
pub const TOURNAMENT_ENDED: &str = "se.cygni.snake.api.event.TournamentEndedEvent";
pub const MAP_UPDATE: &str = "se.cygni.snake.api.event.MapUpdateEvent";
pub const SNAKE_DEAD: &str = "se.cygni.snake.api.event.SnakeDeadEvent";
pub const GAME_STARTING: &str = "se.cygni.snake.api.event.GameStartingEvent";
pub const PLAYER_REGISTERED: &str = "se.cygni.snake.api.response.PlayerRegistered";
pub const INVALID_PLAYER_NAME: &str = "se.cygni.snake.api.exception.InvalidPlayerName";
pub const HEART_BEAT_RESPONSE: &str = "se.cygni.snake.api.response.HeartBeatResponse";
pub const GAME_LINK_EVENT: &str = "se.cygni.snake.api.event.GameLinkEvent";
pub const GAME_RESULT_EVENT: &str = "se.cygni.snake.api.event.GameResultEvent";

// Outbound
pub const CLIENT_INFO: &str = "se.cygni.snake.api.request.ClientInfo";
pub const REGISTER_PLAYER: &str = "se.cygni.snake.api.request.RegisterPlayer";
pub const START_GAME: &str = "se.cygni.snake.api.request.StartGame";
pub const REGISTER_MOVE: &str = "se.cygni.snake.api.request.RegisterMove";
pub const HEART_BEAT_REQUEST: &str = "se.cygni.snake.api.request.HeartBeatRequest";

pub fn client_info() -> Value {
    json!({
        "type": CLIENT_INFO,
        "language": "Rust",
        "languageVersion": "2021",
        "operatingSystem": std::env::consts::OS,
        "operatingSystemVersion": "",
        "clientVersion": env!("CARGO_PKG_VERSION"),
    })
}

/// Registration with the settings used when we start our own training games
pub fn player_registration(player_name: &str) -> Value {
    json!({
        "type": REGISTER_PLAYER,
        "playerName": player_name,
        "gameSettings": {
            "maxNoofPlayers": 5,
            "startSnakeLength": 1,
            "timeInMsPerTick": 250,
            "obstaclesEnabled": true,
            "foodEnabled": true,
            "headToTailConsumes": true,
            "tailConsumeGrows": false,
            "addFoodLikelihood": 15,
            "removeFoodLikelihood": 5,
            "spontaneousGrowthEveryNWorldTick": 3,
            "trainingGame": false,
            "pointsPerLength": 1,
            "pointsPerFood": 2,
            "pointsPerCausedDeath": 5,
            "pointsPerNibble": 10,
            "noofRoundsTailProtectedAfterNibble": 3,
        },
    })
}

pub fn start_game() -> Value {
    json!({ "type": START_GAME })
}

/// Answer to a map update; tick, player and game ids are echoed back
pub fn register_move(direction: &str, map_update: &Value) -> Value {
    json!({
        "type": REGISTER_MOVE,
        "direction": direction,
        "gameTick": map_update["gameTick"],
        "receivingPlayerId": map_update["receivingPlayerId"],
        "gameId": map_update["gameId"],
    })
}

pub fn heart_beat(player_id: &str) -> Value {
    json!({
        "type": HEART_BEAT_REQUEST,
        "receivingPlayerId": player_id,
    })
}

// Websocket session with the game server
//
// One call to `run_game` connects, registers, and plays until the server
// ends the game or the socket closes. All writes go through a single channel
// drained by a writer task; the heart beat task only holds a sender and the
// player id, never the Bot.

use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::bot::{Bot, GameResult};
use crate::config::ServerConfig;
use crate::messages;
use crate::router::{self, Action};

/// Sends a heart beat every `period` until the outbound channel closes
fn spawn_heartbeat(outbound: UnboundedSender<String>, player_id: String, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            if outbound.send(messages::heart_beat(&player_id).to_string()).is_err() {
                break;
            }
        }
    })
}

/// Plays one game against the server described by `server`
pub async fn run_game(bot: &mut Bot, server: &ServerConfig) -> Result<(), String> {
    let url = server.url();
    info!("Connecting to {}", url);

    let (ws_stream, _) = connect_async(url.as_str())
        .await
        .map_err(|e| format!("Failed to connect to {}: {}", url, e))?;
    let (mut write, mut read) = ws_stream.split();

    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        while let Some(text) = outbound_rx.recv().await {
            if let Err(e) = write.send(Message::Text(text)).await {
                error!("Failed to send message: {}", e);
                break;
            }
        }
        let _ = write.close().await;
    });

    let send = |outbound: &UnboundedSender<String>, message: Value| {
        if outbound.send(message.to_string()).is_err() {
            warn!("Outbound channel closed, dropping message");
        }
    };

    send(&outbound, messages::client_info());
    send(&outbound, messages::player_registration(bot.name()));

    let period = Duration::from_millis(server.heartbeat_period_ms);
    let mut heartbeat: Option<JoinHandle<()>> = None;

    'session: while let Some(frame) = read.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!("Websocket error: {}", e);
                break;
            }
        };

        let message: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring unparsable message: {}", e);
                continue;
            }
        };

        let actions = match router::route(bot, &message, &server.venue) {
            Ok(actions) => actions,
            Err(e) => {
                error!("{}", e);
                continue;
            }
        };

        for action in actions {
            match action {
                Action::Send(reply) => send(&outbound, reply),
                Action::StartHeartbeat(player_id) => {
                    if let Some(previous) = heartbeat.take() {
                        previous.abort();
                    }
                    heartbeat = Some(spawn_heartbeat(outbound.clone(), player_id, period));
                }
                Action::Close => break 'session,
            }
        }
    }

    if let Some(task) = heartbeat {
        task.abort();
        let _ = task.await;
    }
    drop(outbound);
    writer
        .await
        .map_err(|e| format!("Writer task failed: {}", e))?;

    info!("Websocket closed, shutting down");
    Ok(())
}

/// Loads one parameter job and plays one game with it
///
/// The session is reset first, so the result returned always belongs to this
/// job. Any failure to load the parameters or finish the session is an error.
pub async fn play_job(bot: &mut Bot, parameters: &[f64], server: &ServerConfig) -> Result<GameResult, String> {
    bot.set_parameters(parameters)
        .map_err(|e| format!("Parameters do not fit the network: {}", e))?;
    bot.reset_session();

    run_game(bot, server).await?;
    Ok(bot.result())
}

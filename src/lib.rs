// Library exports for the Neurotic snake bot
// This allows the replay tool and other utilities to use the core bot logic

pub mod board;
pub mod bot;
pub mod client;
pub mod config;
pub mod debug_logger;
pub mod engine;
pub mod error;
pub mod matrix;
pub mod messages;
pub mod network;
pub mod params;
pub mod replay;
pub mod router;
pub mod sensor;
pub mod types;

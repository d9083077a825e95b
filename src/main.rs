use log::{error, info};
use std::env;
use std::io;
use std::process;

use neurotic_snake::bot::Bot;
use neurotic_snake::client;
use neurotic_snake::config::Config;
use neurotic_snake::debug_logger::DebugLogger;
use neurotic_snake::params::ParameterReader;

// Reads parameter jobs from stdin, plays one game per job and prints
// "points age alive game_link" for each to stdout. Logs go to stderr.
fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting Neurotic snake...");

    // Load configuration once at startup
    let config = Config::load_or_default();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            process::exit(1);
        }
    };

    let debug_logger = runtime.block_on(DebugLogger::new(
        config.debug.enabled,
        &config.debug.log_file_path,
    ));

    let mut bot = match Bot::new(&config) {
        Ok(bot) => bot.with_debug_logger(debug_logger),
        Err(e) => {
            error!("Invalid network configuration: {}", e);
            process::exit(1);
        }
    };

    info!(
        "Network expects {} parameters",
        bot.engine().network().parameter_count()
    );

    let stdin = io::stdin();
    let mut reader = ParameterReader::new(stdin.lock());

    loop {
        info!("Waiting for job parameters");
        let parameters = match reader.next_job() {
            Ok(Some(parameters)) => parameters,
            Ok(None) => {
                info!("Got no parameters");
                break;
            }
            Err(e) => {
                error!("{}", e);
                process::exit(1);
            }
        };

        // a failed job prints no result line and ends the process
        match runtime.block_on(client::play_job(&mut bot, &parameters, &config.server)) {
            Ok(result) => println!("{}", result),
            Err(e) => {
                error!("Job failed: {}", e);
                process::exit(1);
            }
        }
    }
}

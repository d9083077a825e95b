// Emits one random parameter job for the configured network
//
// Usage:
//   cargo run --bin random_params -- [--seed N] [--scale S] [--config <path>]
//
// The output can be piped straight into the bot to smoke-test a session:
//   cargo run --bin random_params | cargo run --bin neurotic-snake

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::env;
use std::process;

use neurotic_snake::config::Config;
use neurotic_snake::params::format_job;

fn parse_arg<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i + 1).map(|v| v.parse::<T>()) {
        Some(Ok(value)) => value,
        _ => {
            eprintln!("Error: {} requires a valid argument", flag);
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut seed: Option<u64> = None;
    let mut scale = 1.0_f64;
    let mut config_path = "Snake.toml".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                seed = Some(parse_arg(&args, i, "--seed"));
                i += 1;
            }
            "--scale" => {
                scale = parse_arg(&args, i, "--scale");
                i += 1;
            }
            "--config" => {
                config_path = parse_arg(&args, i, "--config");
                i += 1;
            }
            other => {
                eprintln!("Error: Unknown option '{}'", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    if scale.is_nan() || scale <= 0.0 {
        eprintln!("Error: --scale must be positive");
        process::exit(1);
    }

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        Config::default_hardcoded()
    });

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::seed_from_u64(rand::random()),
    };

    let values: Vec<f64> = (0..config.parameter_count())
        .map(|_| rng.random_range(-scale..scale))
        .collect();

    println!("{}", format_job(&values));
    // a trailing zero count ends the bot's job loop after one game
    println!("0");
}

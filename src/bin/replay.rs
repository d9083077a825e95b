// Standalone replay tool for analyzing decision logs
//
// Usage:
//   cargo run --bin replay -- <log_file> --params <params_file> [options]
//
// Options:
//   --all                  Replay all logged ticks
//   --ticks <t1,t2>        Replay specific world ticks (comma-separated)
//   --validate             Check logged moves against expected ones
//   --verbose              Show detailed output for each tick
//   --config <path>        Path to Snake.toml (default: Snake.toml)

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::process;

use neurotic_snake::config::Config;
use neurotic_snake::params::ParameterReader;
use neurotic_snake::replay::ReplayEngine;
use neurotic_snake::types::Direction;

fn print_usage() {
    eprintln!("Neurotic Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> --params <params_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --params <path>         Parameter job file (count followed by values)");
    eprintln!("  --all                   Replay all ticks in the log");
    eprintln!("  --ticks <T1,T2,...>     Replay specific world ticks (comma-separated)");
    eprintln!("  --validate <T:M,...>    Validate expected moves (format: tick:move,...)");
    eprintln!("  --verbose               Show detailed output for each tick");
    eprintln!("  --config <path>         Path to Snake.toml (default: Snake.toml)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  replay neurotic_debug.jsonl --params best.txt --all");
    eprintln!("  replay neurotic_debug.jsonl --params best.txt --ticks 5,10,15");
    eprintln!("  replay neurotic_debug.jsonl --params best.txt --validate 5:up,10:right|down");
}

fn parse_ticks(s: &str) -> Result<Vec<i64>, String> {
    s.split(',')
        .map(|t| {
            t.trim()
                .parse::<i64>()
                .map_err(|e| format!("Invalid tick '{}': {}", t, e))
        })
        .collect()
}

fn parse_expected_moves(s: &str) -> Result<Vec<(i64, Vec<Direction>)>, String> {
    s.split(',')
        .map(|pair| {
            let parts: Vec<&str> = pair.trim().split(':').collect();
            if parts.len() != 2 {
                return Err(format!("Invalid format '{}'. Expected 'tick:move'", pair));
            }

            let tick = parts[0]
                .parse::<i64>()
                .map_err(|e| format!("Invalid tick '{}': {}", parts[0], e))?;

            // Support multiple acceptable moves separated by '|'
            let moves: Result<Vec<Direction>, String> =
                parts[1].split('|').map(|m| m.trim().parse()).collect();

            Ok((tick, moves?))
        })
        .collect()
}

fn load_parameters(path: &str) -> Result<Vec<f64>, String> {
    let file = File::open(path).map_err(|e| format!("Failed to open parameter file: {}", e))?;
    ParameterReader::new(BufReader::new(file))
        .next_job()?
        .ok_or_else(|| format!("Parameter file '{}' holds no parameters", path))
}

enum Mode {
    All,
    Ticks(String),
    Validate(String),
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(if args.contains(&"--help".to_string()) {
            0
        } else {
            1
        });
    }

    let log_file = &args[1];
    let mut config_path = "Snake.toml".to_string();
    let mut params_path: Option<String> = None;
    let mut verbose = false;
    let mut mode = None;

    let value_of = |i: usize, flag: &str| -> String {
        match args.get(i + 1) {
            Some(value) => value.clone(),
            None => {
                eprintln!("Error: {} requires an argument", flag);
                process::exit(1);
            }
        }
    };

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--all" => mode = Some(Mode::All),
            "--ticks" => {
                mode = Some(Mode::Ticks(value_of(i, "--ticks")));
                i += 1;
            }
            "--validate" => {
                mode = Some(Mode::Validate(value_of(i, "--validate")));
                i += 1;
            }
            "--params" => {
                params_path = Some(value_of(i, "--params"));
                i += 1;
            }
            "--config" => {
                config_path = value_of(i, "--config");
                i += 1;
            }
            "--verbose" => verbose = true,
            _ => {
                eprintln!("Error: Unknown option '{}'", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let mode = match mode {
        Some(mode) => mode,
        None => {
            eprintln!("Error: Must specify --all, --ticks, or --validate");
            print_usage();
            process::exit(1);
        }
    };

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    // Validation only inspects logged moves, so it runs with zero weights when no file is given
    let parameters = match &params_path {
        Some(path) => load_parameters(path).unwrap_or_else(|e| {
            eprintln!("Error loading parameters: {}", e);
            process::exit(1);
        }),
        None if matches!(mode, Mode::Validate(_)) => vec![0.0; config.parameter_count()],
        None => {
            eprintln!("Error: --params is required for replay");
            process::exit(1);
        }
    };

    println!("Loaded configuration from: {}", config_path);
    println!("Replay log file: {}", log_file);
    println!();

    let engine = match ReplayEngine::new(&config, &parameters, verbose) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let entries = match engine.load_log_file(log_file) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error loading log file: {}", e);
            process::exit(1);
        }
    };

    if entries.is_empty() {
        eprintln!("Error: Log file is empty");
        process::exit(1);
    }

    println!("Loaded {} log entries\n", entries.len());

    match mode {
        Mode::All => {
            println!("Replaying all {} ticks...\n", entries.len());
            let results = engine.replay_all(&entries);
            engine.print_report(&results);
        }
        Mode::Ticks(arg) => {
            let ticks = parse_ticks(&arg).unwrap_or_else(|e| {
                eprintln!("Error parsing ticks: {}", e);
                process::exit(1);
            });

            println!("Replaying {} specific tick(s)...\n", ticks.len());
            match engine.replay_ticks(&entries, &ticks) {
                Ok(results) => engine.print_report(&results),
                Err(e) => {
                    eprintln!("Error during replay: {}", e);
                    process::exit(1);
                }
            }
        }
        Mode::Validate(arg) => {
            let expected_moves = parse_expected_moves(&arg).unwrap_or_else(|e| {
                eprintln!("Error parsing expected moves: {}", e);
                process::exit(1);
            });

            println!("Validating {} expected move(s)...\n", expected_moves.len());
            match engine.validate_expected_moves(&entries, &expected_moves) {
                Ok(()) => println!("✓ All expected moves validated successfully!"),
                Err(e) => {
                    eprintln!("✗ Validation failed: {}", e);
                    process::exit(1);
                }
            }
        }
    }
}

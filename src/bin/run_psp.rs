//! Discard-poker PSP experiment binary.
//!
//! Samples random discard games, runs PSP on each of them several times and
//! writes the outcomes, together with exact game statistics and theoretical
//! complexity bounds, to a JSON file.
//!
//! Usage:
//!   cargo run --release --bin run_psp -- [OPTIONS]
//!
//! Options:
//!   --config <FILE>      Experiment configuration JSON file (optional)
//!   --epsilon <VALUE>    Target epsilon
//!   --delta <VALUE>      Target delta
//!   --games <N>          Games sampled per discard count
//!   --runs <N>           PSP runs per game
//!   --threads <N>        Number of threads (default: auto)
//!   --table <FILE>       CSV hand score table (default: built-in evaluator)
//!   --floor              Floor hand scores before comparing
//!   --output <FILE>      Output file (default: psp_results.json)
//!   --seed <N>           Random seed (optional)
//!   --verbose            Log every PSP round

use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;

use psp_sampler::games::discard::{
    DiscardGame, DiscardPoker, ExperimentConfig, ExperimentOutput, GameRecord, GameStats,
    HandScorer, PayoffOracle, RunRecord,
};
use psp_sampler::psp::{ComplexityBounds, PspSolver};

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let mut config_file: Option<String> = None;
    let mut epsilon: Option<f64> = None;
    let mut delta: Option<f64> = None;
    let mut games: Option<usize> = None;
    let mut runs: Option<usize> = None;
    let mut threads: Option<usize> = None;
    let mut table: Option<PathBuf> = None;
    let mut floor = false;
    let mut output_file = "psp_results.json".to_string();
    let mut seed: Option<u64> = None;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(args[i].clone());
                }
            }
            "--epsilon" | "-e" => {
                i += 1;
                if i < args.len() {
                    epsilon = args[i].parse().ok();
                }
            }
            "--delta" | "-d" => {
                i += 1;
                if i < args.len() {
                    delta = args[i].parse().ok();
                }
            }
            "--games" | "-g" => {
                i += 1;
                if i < args.len() {
                    games = args[i].parse().ok();
                }
            }
            "--runs" | "-r" => {
                i += 1;
                if i < args.len() {
                    runs = args[i].parse().ok();
                }
            }
            "--threads" | "-t" => {
                i += 1;
                if i < args.len() {
                    threads = args[i].parse().ok();
                }
            }
            "--table" => {
                i += 1;
                if i < args.len() {
                    table = Some(PathBuf::from(&args[i]));
                }
            }
            "--floor" | "-f" => {
                floor = true;
            }
            "--output" | "-o" => {
                i += 1;
                if i < args.len() {
                    output_file = args[i].clone();
                }
            }
            "--seed" | "-s" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().ok();
                }
            }
            "--verbose" | "-v" => {
                verbose = true;
            }
            "--help" | "-h" => {
                print_help();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                return;
            }
        }
        i += 1;
    }

    init_logging(verbose);

    // Load or create configuration
    let mut config = match &config_file {
        Some(path) => {
            println!("Loading configuration from: {}", path);
            match ExperimentConfig::from_json_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Error loading config: {}", e);
                    return;
                }
            }
        }
        None => ExperimentConfig::default(),
    };

    if let Some(eps) = epsilon {
        config.psp.target_epsilon = eps;
    }
    if let Some(d) = delta {
        config.psp.target_delta = d;
    }
    if let Some(n) = games {
        config.games_per_setting = n;
    }
    if let Some(n) = runs {
        config.runs_per_game = n;
    }
    if let Some(n) = threads {
        config.psp.num_threads = Some(n);
    }
    if table.is_some() {
        config.score_table = table;
    }
    if floor {
        config.floor = true;
    }
    if seed.is_some() {
        config.seed = seed;
        config.psp.seed = seed;
    }

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        return;
    }

    println!("=================================================");
    println!("  Progressive Sampling with Pruning");
    println!("=================================================");
    println!();
    println!("Experiment: {}", config.name);
    println!(
        "Epsilon: {} | Delta: {} | c: {} | beta: {}",
        config.psp.target_epsilon, config.psp.target_delta, config.psp.c, config.psp.beta
    );
    println!("Discard counts: {:?}", config.discard_counts);
    println!("Games per setting: {}", config.games_per_setting);
    println!("Runs per game: {}", config.runs_per_game);
    println!("Scores: {}{}", config.score_source(), if config.floor { " (floored)" } else { "" });
    println!("Output: {}", output_file);
    println!();

    let start_time = Instant::now();
    let records = match run_experiment(&config) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Experiment failed: {}", e);
            std::process::exit(1);
        }
    };
    let elapsed = start_time.elapsed().as_secs_f64();

    print_summary(&records);

    let output = ExperimentOutput::new(&config, records, elapsed);
    println!();
    println!("Exporting results to {}...", output_file);
    match output.save_json(&output_file) {
        Ok(_) => println!("Results saved successfully!"),
        Err(e) => eprintln!("Error saving results: {}", e),
    }

    println!("Total time: {:.2}s", elapsed);
}

fn run_experiment(config: &ExperimentConfig) -> Result<Vec<GameRecord>, Box<dyn Error>> {
    let scorer = Arc::new(HandScorer::new(config.score_source()));
    println!("Loading hand scores...");
    scorer.load()?;

    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let total = config.discard_counts.len() * config.games_per_setting * config.runs_per_game;
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut records = Vec::new();
    for &k in &config.discard_counts {
        for game_index in 0..config.games_per_setting {
            progress.set_message(format!("k={} game {}", k, game_index + 1));

            let game = DiscardGame::sample(&mut rng, k, config.bet_grid.clone())?;
            let poker = DiscardPoker::new(game, PayoffOracle::new(Arc::clone(&scorer), config.score_mode()));

            let stats = if config.exact_stats {
                Some(GameStats::exact(&poker)?)
            } else {
                None
            };

            let mut psp = config.psp.clone();
            psp.seed = psp.seed.map(|s| s.wrapping_add(records.len() as u64));
            let mut solver = PspSolver::new(poker, psp)?;

            let mut record = GameRecord::new(solver.game().game(), solver.schedule().len());
            if let Some(stats) = &stats {
                record.bounds = Some(ComplexityBounds::compute(solver.config(), &stats.variances()));
            }

            for _ in 0..config.runs_per_game {
                let outcome = solver.run()?;
                record.runs.push(RunRecord::from_outcome(&outcome, stats.as_ref()));
                progress.inc(1);
            }

            log::info!(
                "k={} game {}: {} profiles, mean samples {:.0}, mean queries {:.0}",
                k,
                game_index + 1,
                record.size_of_game,
                record.mean_sample_complexity(),
                record.mean_simulation_complexity()
            );

            record.stats = stats;
            records.push(record);
        }
    }
    progress.finish_with_message("done");

    Ok(records)
}

fn print_summary(records: &[GameRecord]) {
    println!();
    println!("=== Summary ===");
    println!();
    println!(
        "{:>3} {:>8} {:>6} {:>12} {:>14} {:>14} {:>12}",
        "k", "profiles", "rounds", "samples", "queries", "hoeffding", "predicted"
    );
    for record in records {
        let (hoeffding, predicted) = match &record.bounds {
            Some(bounds) => (
                format!("{:.0}", bounds.hoeffding_queries),
                format!("{}", bounds.predicted_queries),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        println!(
            "{:>3} {:>8} {:>6} {:>12.0} {:>14.0} {:>14} {:>12}",
            record.discard_count,
            record.size_of_game,
            record.schedule_length,
            record.mean_sample_complexity(),
            record.mean_simulation_complexity(),
            hoeffding,
            predicted
        );
    }

    let violations: usize = records
        .iter()
        .flat_map(|r| r.runs.iter())
        .filter_map(|run| run.bound_violations)
        .sum();
    if records.iter().any(|r| r.stats.is_some()) {
        println!();
        println!("Profiles outside their reported epsilon: {}", violations);
    }
}

fn init_logging(verbose: bool) {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    if let Err(e) = simplelog::TermLogger::init(
        level,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logger: {}", e);
    }
}

fn print_help() {
    println!("Discard-poker PSP experiments");
    println!();
    println!("Usage: run_psp [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <FILE>      Experiment configuration JSON file");
    println!("  -e, --epsilon <VALUE>    Target epsilon (default: 0.1)");
    println!("  -d, --delta <VALUE>      Target delta (default: 0.1)");
    println!("  -g, --games <N>          Games sampled per discard count");
    println!("  -r, --runs <N>           PSP runs per game");
    println!("  -t, --threads <N>        Number of threads (default: auto)");
    println!("  --table <FILE>           CSV hand score table (columns hands,value)");
    println!("  -f, --floor              Floor hand scores before comparing");
    println!("  -o, --output <FILE>      Output file (default: psp_results.json)");
    println!("  -s, --seed <N>           Random seed");
    println!("  -v, --verbose            Log every PSP round");
    println!("  -h, --help               Show this help");
    println!();
    println!("Examples:");
    println!("  # Two games per discard count with the built-in evaluator");
    println!("  run_psp --games 2 --seed 42");
    println!();
    println!("  # Floored scores from a precomputed table");
    println!("  run_psp --table ranks.csv --floor --epsilon 0.05");
}

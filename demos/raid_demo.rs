//! Raid demo: agents learn to cross a defended grid.
//!
//! Run:
//! ```sh
//! cargo run --example raid_demo -- --ticks 20000 --structures 12 --table raid_table.json
//! ```
//!
//! Logging honours `RUST_LOG`, e.g. `RUST_LOG=raidmind=info`.

use std::env;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use raidmind::grid::{GridEnvironment, GridMap, Position};
use raidmind::rl::{LearningTable, QLearner, Simulation, SimulationConfig};

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("raidmind=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let ticks: u64 = arg_value(&args, "--ticks")
        .and_then(|s| s.parse().ok())
        .unwrap_or(20_000);
    let seed: u64 = arg_value(&args, "--seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let structures: usize = arg_value(&args, "--structures")
        .and_then(|s| s.parse().ok())
        .unwrap_or(12);
    let obstacles: usize = arg_value(&args, "--obstacles")
        .and_then(|s| s.parse().ok())
        .unwrap_or(20);
    let table_path = arg_value(&args, "--table");

    let config = SimulationConfig {
        seed,
        ..SimulationConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(seed);
    let mut map = GridMap::with_horizontal_path(config.map_width, config.map_height, config.cell_size);
    map.add_random_obstacles(obstacles, &mut rng);
    let mut placed = 0;
    for _ in 0..structures * 20 {
        if placed == structures {
            break;
        }
        let pos = Position::new(
            rng.gen_range(1..map.width() - 1),
            rng.gen_range(0..map.height()),
        );
        if map.place_structure(pos) {
            placed += 1;
        }
    }

    let table = match table_path {
        Some(path) => LearningTable::load_or_default(path),
        None => LearningTable::new(),
    };
    let learner = match QLearner::with_table(table, &config.learning, seed.wrapping_add(1)) {
        Ok(learner) => learner,
        Err(e) => {
            eprintln!("Invalid learning configuration: {}", e);
            std::process::exit(2);
        }
    };

    println!("=== Raid Demo ===\n");
    println!("{}", map);
    println!("  Structures: {}", placed);
    println!("  Known states: {}", learner.table().len());
    println!();

    let mut sim = Simulation::with_learner(config, map, learner);
    for _ in 0..ticks {
        let result = sim.step();
        if result.tick % 1000 == 0 {
            println!("{}", sim.stats());
        }
        if result.game_over {
            break;
        }
    }

    println!();
    println!("{}", sim.final_stats());
    println!("{}", sim.learner().stats());

    if let Some(path) = table_path {
        if let Err(e) = sim.save_learning_table(path) {
            eprintln!("Failed to save learning table: {}", e);
            std::process::exit(1);
        }
    }
}

fn arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

//! # Caverns Main Entry Point
//!
//! Builds a world from a seed, feeds it a scripted or random run of player
//! commands, and prints the final map and a summary.

use caverns::{
    CavernsError, CavernsResult, Direction, InputHandler, PlayerCommand, TurnOutcome, World,
};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Command line arguments for the caverns simulation.
#[derive(Parser, Debug)]
#[command(name = "caverns")]
#[command(about = "Headless turn-based roguelike simulation")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of random commands to play when no key script is given
    #[arg(short, long, default_value_t = 200)]
    turns: u32,

    /// Key script to play instead of random commands, e.g. "ddsg>"
    #[arg(short, long)]
    keys: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> CavernsResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;
    log::info!("Starting caverns v{}", caverns::VERSION);

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut world = World::new(seed)?;

    let commands = match &args.keys {
        Some(keys) => InputHandler::new().parse_script(keys)?,
        None => random_commands(seed, args.turns),
    };
    let played = play(&mut world, &commands)?;
    log::info!("Played {} of {} commands", played, commands.len());

    println!("{}", world.render_ascii());
    let summary = world.summary();
    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| CavernsError::InvalidState(format!("summary encoding failed: {}", e)))?;
        println!("{}", json);
    } else {
        println!(
            "Seed {} | level {} | HP {}/{} | {:?}",
            summary.seed,
            summary.depth,
            summary.player_hp,
            summary.player_max_hp,
            summary.completion_state
        );
        for message in &summary.recent_messages {
            println!("  {}", message);
        }
    }

    Ok(())
}

/// Initializes env_logger at the given level unless `RUST_LOG` overrides it.
fn initialize_logging(log_level: &str) -> CavernsResult<()> {
    let level = match log_level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        other => {
            return Err(CavernsError::Config(format!(
                "unknown log level '{}'",
                other
            )))
        }
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .init();
    Ok(())
}

/// Applies commands until they run out or the game ends. Returns how many
/// were applied.
fn play(world: &mut World, commands: &[PlayerCommand]) -> CavernsResult<usize> {
    let mut played = 0;
    for &command in commands {
        if world.is_over() {
            break;
        }
        let outcome = world.apply(command)?;
        if outcome == TurnOutcome::Blocked {
            log::debug!("{} was blocked", command.name());
        }
        played += 1;
    }
    Ok(played)
}

/// A wandering player: mostly steps, with the odd pickup, rest or descent.
fn random_commands(seed: u64, count: u32) -> Vec<PlayerCommand> {
    let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);
    (0..count)
        .map(|_| match rng.gen_range(0..10) {
            0 => PlayerCommand::PickUp,
            1 => PlayerCommand::Rest,
            2 => PlayerCommand::Descend,
            _ => PlayerCommand::Move(Direction::ALL[rng.gen_range(0..Direction::ALL.len())]),
        })
        .collect()
}

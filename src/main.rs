use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use log::LevelFilter;
use std::fs;
use std::path::{Path, PathBuf};

use shadowing::loop_control::{BoundaryOutcome, LoopController, ManualClock};
use shadowing::{groups_from_json_with_config, score_attempt_with_config, segments_from_json_with_config, EngineConfig, TokenStatus};

/// Shadowing practice engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML engine configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log engine internals
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a timed-text JSON file and print its word segments as JSON
    Segments { captions: PathBuf },

    /// Print the practice groups of a timed-text JSON file
    Groups {
        captions: PathBuf,
        /// Duration bound for captions without sentence punctuation
        #[arg(long)]
        max_duration: Option<f64>,
    },

    /// Score a spoken attempt against a target sentence
    Score {
        #[arg(short, long)]
        target: String,
        #[arg(short, long)]
        spoken: String,
    },

    /// Run the loop controller over a range on a simulated clock
    Simulate {
        #[arg(long)]
        start: f64,
        #[arg(long)]
        end: f64,
        /// Number of traversals
        #[arg(short, long)]
        repeat: Option<u32>,
        /// Loop until the step limit when no repeat count is given
        #[arg(long)]
        loop_forever: bool,
        /// Simulated seconds between position updates
        #[arg(long, default_value_t = 0.05)]
        step: f64,
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
        #[arg(long, default_value_t = 10_000)]
        max_steps: usize,
    },
}

fn init_logger(debug: bool) {
    let env = Env::default().filter_or("RUST_LOG", "warn,shadowing=info");
    let mut builder = Builder::from_env(env);
    if debug {
        builder.filter_module("shadowing", LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("Failed to load config '{}'", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn read_captions(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read captions '{}'", path.display()))
}

fn print_segments(path: &Path, config: &EngineConfig) -> Result<()> {
    let segments = segments_from_json_with_config(&read_captions(path)?, config)
        .with_context(|| format!("Failed to parse captions '{}'", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&segments)?);
    Ok(())
}

fn print_groups(path: &Path, max_duration: Option<f64>, config: &EngineConfig) -> Result<()> {
    let mut config = config.clone();
    if max_duration.is_some() {
        config.segmenter.fallback_max_duration_seconds = max_duration;
        config.validate()?;
    }
    let groups = groups_from_json_with_config(&read_captions(path)?, &config)
        .with_context(|| format!("Failed to parse captions '{}'", path.display()))?;

    for (i, group) in groups.iter().enumerate() {
        println!(
            "{:>3}  {:>8.3} - {:>8.3}  {}",
            i,
            group.start_seconds(),
            group.end_seconds(),
            group.text()
        );
    }
    Ok(())
}

fn print_score(target: &str, spoken: &str, config: &EngineConfig) {
    let evaluation = score_attempt_with_config(target, spoken, config);
    for token in &evaluation.tokens {
        let mark = match token.status {
            TokenStatus::Correct => "ok",
            TokenStatus::Partial => "~",
            TokenStatus::Wrong => "x",
        };
        println!("{:>3}  {}", mark, token.text);
    }
    match evaluation.rating {
        Some(rating) => println!("score {:.0}%: {}", evaluation.score * 100.0, rating),
        None => println!("nothing to score"),
    }
}

struct SimulateArgs {
    start: f64,
    end: f64,
    repeat: Option<u32>,
    loop_forever: bool,
    step: f64,
    speed: f64,
    max_steps: usize,
}

fn simulate(args: SimulateArgs, config: &EngineConfig) -> Result<()> {
    if !(args.step > 0.0) {
        bail!("--step must be positive");
    }
    if !(args.speed > 0.0) {
        bail!("--speed must be positive");
    }

    let mut controller = LoopController::new(config.playback.clone());
    controller.attach(ManualClock::new());
    controller.set_speed(args.speed);
    controller.set_loop_forever(args.loop_forever);

    let Some(generation) = controller.play_range(args.start, args.end, args.repeat) else {
        bail!("no clock attached");
    };
    let state = *controller.loop_state();
    println!(
        "generation {}: {:.3}..{:.3} {:?} at {}x",
        generation, state.range_start, state.range_end, state.mode, args.speed
    );

    for step in 1..=args.max_steps {
        if let Some(clock) = controller.clock_mut() {
            clock.advance(args.step);
        }
        let elapsed = step as f64 * args.step;
        match controller.on_time_update() {
            BoundaryOutcome::Within | BoundaryOutcome::AwaitingSeek => {}
            BoundaryOutcome::Repeated { remaining } => match remaining {
                Some(n) => println!("{:>9.3}s  repeat, {} left", elapsed, n),
                None => println!("{:>9.3}s  repeat", elapsed),
            },
            BoundaryOutcome::Stopped { position } => {
                println!("{:>9.3}s  stopped, parked at {:.3}", elapsed, position);
                return Ok(());
            }
            BoundaryOutcome::Idle | BoundaryOutcome::Stale => break,
        }
    }

    println!(
        "still playing after {} steps at {:.3}",
        args.max_steps,
        controller.position().unwrap_or_default()
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.debug);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Segments { captions } => print_segments(&captions, &config)?,
        Commands::Groups {
            captions,
            max_duration,
        } => print_groups(&captions, max_duration, &config)?,
        Commands::Score { target, spoken } => print_score(&target, &spoken, &config),
        Commands::Simulate {
            start,
            end,
            repeat,
            loop_forever,
            step,
            speed,
            max_steps,
        } => simulate(
            SimulateArgs {
                start,
                end,
                repeat,
                loop_forever,
                step,
                speed,
                max_steps,
            },
            &config,
        )?,
    }
    Ok(())
}

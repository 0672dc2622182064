use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use water_sort::config::DEFAULT_MAX_ATTEMPTS;
use water_sort::console::{Style, format_state, format_status};
use water_sort::*;

#[derive(Parser, Debug)]
#[command(name = "water-sort", about = "Generate and check water-sort puzzles")]
struct Cli {
    /// Print without ANSI colors
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    Uniform,
    Minimum,
    Whole,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AcceptArg {
    First,
    Solvable,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a puzzle
    Generate {
        #[arg(long, short = 'n', default_value_t = 6)]
        bottles: usize,
        #[arg(long, short = 'c', default_value_t = 4)]
        capacity: usize,
        #[arg(long, short = 'k', default_value_t = 4)]
        colors: usize,
        #[arg(long, short = 'e', default_value_t = 8)]
        empty: usize,
        #[arg(long, short = 's')]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value_t = PolicyArg::Whole)]
        policy: PolicyArg,
        #[arg(long, value_enum, default_value_t = AcceptArg::Solvable)]
        accept: AcceptArg,
        #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
        attempts: usize,
        /// Require more bottles than colors
        #[arg(long)]
        strict: bool,
        /// Discard `empty` top cells after filling, like the early generator
        #[arg(long)]
        discard_tops: bool,
        #[arg(long, default_value_t = config::DEFAULT_SEARCH_CAP)]
        cap: usize,
        #[arg(long, default_value = "NORMAL")]
        mode: GameMode,
        /// Generate this many puzzles in parallel, seeded from `seed` upwards
        #[arg(long, default_value_t = 1)]
        count: u64,
        /// Write the puzzle as a game record
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Check whether an arrangement is solvable
    Check {
        #[arg(long, short = 'c')]
        capacity: usize,
        #[arg(long, default_value_t = config::DEFAULT_SEARCH_CAP)]
        cap: usize,
        /// One bottle per argument, bottom first, e.g. ABBA or "-" for empty
        #[arg(name = "BOTTLES", required = true)]
        bottles: Vec<String>,
    },

    /// Replay a game record and report the final state
    Replay {
        file: PathBuf,
        #[arg(long, short = 'c')]
        capacity: usize,
        #[arg(long, default_value = "NORMAL")]
        mode: GameMode,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Generate {
            bottles,
            capacity,
            colors,
            empty,
            seed,
            policy,
            accept,
            attempts,
            strict,
            discard_tops,
            cap,
            mode,
            count,
            export,
        } => {
            let config = Config::builder(bottles, capacity, colors, empty)
                .color_policy(match policy {
                    PolicyArg::Uniform => ColorPolicy::Uniform,
                    PolicyArg::Minimum => ColorPolicy::GuaranteedMinimum,
                    PolicyArg::Whole => ColorPolicy::WholeBottles,
                })
                .acceptance(match accept {
                    AcceptArg::First => AcceptancePolicy::AcceptFirst,
                    AcceptArg::Solvable => AcceptancePolicy::RequireSolvable {
                        max_attempts: attempts,
                    },
                })
                .carve_policy(if discard_tops {
                    CarvePolicy::DiscardTops
                } else {
                    CarvePolicy::FreeSpace
                })
                .require_spare_bottle(strict)
                .search_cap(cap)
                .mode(mode)
                .build()
                .context("invalid puzzle configuration")?;
            run_generate(&config, seed, count, export, cli.plain)
        }
        Commands::Check {
            capacity,
            cap,
            bottles,
        } => run_check(capacity, cap, &bottles, cli.plain),
        Commands::Replay {
            file,
            capacity,
            mode,
        } => run_replay(&file, capacity, mode, cli.plain),
    }
}

fn run_generate(
    config: &Config,
    seed: Option<u64>,
    count: u64,
    export: Option<PathBuf>,
    plain: bool,
) -> Result<()> {
    if count > 1 {
        let start = seed.unwrap_or(0);
        let Some(seeds) = batch_seeds(start, count) else {
            bail!("{} seeds starting at {} do not fit in a u64", count, start);
        };
        for (seed, result) in seeds.iter().zip(generate_batch(config, &seeds)) {
            match result {
                Ok(state) => {
                    println!("{}", format_status(Style::Success, &format!("seed {}", seed), plain));
                    println!("{}", format_state(&state, config.get_mode(), plain));
                }
                Err(e) => println!("{}", format_status(Style::Failure, &format!("seed {}: {}", seed, e), plain)),
            }
        }
        return Ok(());
    }

    let game = match GameEngine::from_config(config, seed) {
        Ok(game) => game,
        Err(GenerationError::Unsolvable { attempts }) => {
            println!(
                "{}",
                format_status(
                    Style::Failure,
                    &format!("Generated puzzle is not solvable ({} attempts).", attempts),
                    plain
                )
            );
            return Ok(());
        }
        Err(e) => return Err(e).context("failed to generate a puzzle"),
    };
    println!("{}", format_state(game.get_state(), game.get_mode(), plain));

    if let Some(path) = export {
        let record = GameRecord::from_game(&game);
        std::fs::write(&path, record.to_string())
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!(
            "{}",
            format_status(Style::Info, &format!("Game exported to {}.", path.display()), plain)
        );
    }
    Ok(())
}

/// `count` consecutive seeds from `start`, or `None` if they would pass
/// `u64::MAX`.
fn batch_seeds(start: u64, count: u64) -> Option<Vec<u64>> {
    if count == 0 {
        return Some(Vec::new());
    }
    let last = start.checked_add(count - 1)?;
    Some((start..=last).collect())
}

fn run_check(capacity: usize, cap: usize, bottles: &[String], plain: bool) -> Result<()> {
    let Some(state) = PuzzleState::new_from_repr(bottles.iter().map(String::as_str), capacity) else {
        bail!("bottles must be letters A-Z and fit capacity {}", capacity);
    };
    println!("{}", format_state(&state, GameMode::Normal, plain));
    let outcome = Solver::new(state, cap).run();
    let (style, message) = match outcome {
        SearchOutcome::Solved { expansions } => {
            (Style::Success, format!("Solvable ({} states expanded).", expansions))
        }
        SearchOutcome::Exhausted { expansions } => (
            Style::Failure,
            format!("Not solvable ({} states expanded).", expansions),
        ),
        SearchOutcome::CapReached { expansions } => (
            Style::Warning,
            format!("Gave up after {} states, treating as not solvable.", expansions),
        ),
    };
    println!("{}", format_status(style, &message, plain));
    Ok(())
}

fn run_replay(file: &Path, capacity: usize, mode: GameMode, plain: bool) -> Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let record = GameRecord::parse(&text)?;
    let game = record.replay(capacity, mode)?;
    println!("{}", format_state(game.get_state(), game.get_mode(), plain));
    println!(
        "{}",
        format_status(
            Style::Info,
            &format!("Replayed {} moves.", game.get_history().len()),
            plain
        )
    );
    if game.is_solved() != record.solved {
        println!(
            "{}",
            format_status(
                Style::Warning,
                &format!("Record says solved={}, replay says solved={}.", record.solved, game.is_solved()),
                plain
            )
        );
    }
    let style = if game.is_solved() { Style::Success } else { Style::Info };
    let message = if game.is_solved() { "Game solved." } else { "Game not solved." };
    println!("{}", format_status(style, message, plain));
    Ok(())
}

//! Match command - play games between two robots
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_settings(), play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hexfill_core::{GameRunner, NoSource, Robot, RobotKind, Seat, Settings};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// First robot (see `hexfill list`)
    #[arg(long)]
    pub first: RobotKind,

    /// Second robot
    #[arg(long)]
    pub second: RobotKind,

    /// Number of games to play (will alternate seats)
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Settings JSON file; defaults to the 95x15 nine-color board
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Palette size, overriding the settings file
    #[arg(long)]
    pub colors: Option<usize>,

    /// Maximum moves per game, both seats counted
    #[arg(long, default_value = "2000")]
    pub max_turns: usize,

    /// Evaluate lookahead on one thread
    #[arg(long)]
    pub sequential: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    /// Robots in seat order
    seats: [RobotKind; 2],
    scores: [usize; 2],
    turns: usize,
    winner: Option<RobotKind>,
    finished: bool,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    first: RobotKind,
    second: RobotKind,
    games: Vec<GameRecord>,
    first_wins: usize,
    second_wins: usize,
    draws: usize,
    avg_turns: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// 1. Load the settings
/// 2. Play the match (multiple games)
/// 3. Report results
pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    let settings = load_settings(&args)?;

    tracing::info!(
        "Starting match: {} vs {} ({} games, {}x{}, {} colors)",
        args.first,
        args.second,
        args.games,
        settings.columns,
        settings.rows,
        settings.num_colors
    );

    let results = play_match(&settings, &args, seed)?;

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Settings from the file, if any, with command-line overrides applied
fn load_settings(args: &MatchArgs) -> Result<Settings> {
    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings: {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(n) = args.colors {
        settings = settings.with_colors(n);
    }
    settings.validate()?;
    Ok(settings)
}

/// Play all games in the match
fn play_match(settings: &Settings, args: &MatchArgs, seed: Option<u64>) -> Result<MatchResults> {
    let mut rng = create_rng(seed);
    let mut runner = GameRunner::new(rng.gen()).with_max_turns(args.max_turns);
    let mut games = Vec::with_capacity(args.games);
    let progress = create_progress(args)?;

    for game_num in 0..args.games {
        // Alternate seats for fairness
        let seats = if game_num % 2 == 1 {
            [args.second, args.first]
        } else {
            [args.first, args.second]
        };

        let record = play_single_game(&mut runner, settings, seats, game_num + 1, args, &mut rng)?;

        tracing::debug!(
            "Game {}: {:?} in {} turns",
            record.game_number,
            record.scores,
            record.turns
        );

        games.push(record);
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    Ok(compute_match_statistics(args.first, args.second, games))
}

/// Report match results
fn report_results(results: &MatchResults, args: &MatchArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play a single game with `seats[0]` moving first
fn play_single_game(
    runner: &mut GameRunner,
    settings: &Settings,
    seats: [RobotKind; 2],
    game_number: usize,
    args: &MatchArgs,
    rng: &mut ChaCha8Rng,
) -> Result<GameRecord> {
    let mut robots = seats.map(|kind| {
        let robot = Robot::new(kind, settings, rng.gen());
        if args.sequential {
            robot.sequential()
        } else {
            robot
        }
    });
    let [a, b] = &mut robots;
    let outcome = runner.play(settings, [a, b], &mut NoSource)?;

    Ok(GameRecord {
        game_number,
        seats,
        scores: outcome.scores,
        turns: outcome.turns,
        winner: outcome.winner.map(|seat: Seat| seats[seat.index()]),
        finished: outcome.finished,
    })
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(
    first: RobotKind,
    second: RobotKind,
    games: Vec<GameRecord>,
) -> MatchResults {
    let first_wins = games.iter().filter(|g| g.winner == Some(first)).count();
    let second_wins = if first == second {
        0
    } else {
        games.iter().filter(|g| g.winner == Some(second)).count()
    };
    let draws = games.iter().filter(|g| g.winner.is_none()).count();

    let total_turns: usize = games.iter().map(|g| g.turns).sum();
    let avg_turns = if games.is_empty() {
        0.0
    } else {
        total_turns as f32 / games.len() as f32
    };

    MatchResults {
        first,
        second,
        games,
        first_wins,
        second_wins,
        draws,
        avg_turns,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Progress bar on stderr, only for text output to a terminal
fn create_progress(args: &MatchArgs) -> Result<Option<ProgressBar>> {
    if args.json || !std::io::stderr().is_terminal() {
        return Ok(None);
    }
    let pb = ProgressBar::new(args.games as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} games ({eta})")?
            .progress_chars("#>-"),
    );
    Ok(Some(pb))
}

fn win_rate(wins: usize, total: usize) -> f32 {
    if total > 0 {
        wins as f32 / total as f32
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        first: String,
        second: String,
        scores: [usize; 2],
        turns: usize,
        winner: Option<String>,
        finished: bool,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        first: String,
        second: String,
        total_games: usize,
        first_wins: usize,
        second_wins: usize,
        draws: usize,
        avg_turns: f32,
        first_win_rate: f32,
        games: Vec<JsonGame>,
    }

    let total = results.games.len();
    let output = JsonOutput {
        first: results.first.to_string(),
        second: results.second.to_string(),
        total_games: total,
        first_wins: results.first_wins,
        second_wins: results.second_wins,
        draws: results.draws,
        avg_turns: results.avg_turns,
        first_win_rate: win_rate(results.first_wins, total),
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                first: g.seats[0].to_string(),
                second: g.seats[1].to_string(),
                scores: g.scores,
                turns: g.turns,
                winner: g.winner.map(|k| k.to_string()),
                finished: g.finished,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Match Results ===");
    println!("Total games: {}", total);
    println!(
        "{:<12} {} ({:.1}%)",
        format!("{}:", results.first),
        results.first_wins,
        win_rate(results.first_wins, total) * 100.0
    );
    println!(
        "{:<12} {} ({:.1}%)",
        format!("{}:", results.second),
        results.second_wins,
        win_rate(results.second_wins, total) * 100.0
    );
    println!(
        "{:<12} {} ({:.1}%)",
        "Draws:",
        results.draws,
        win_rate(results.draws, total) * 100.0
    );
    println!("Avg turns:   {:.1}", results.avg_turns);

    println!("\nGame details:");
    for game in &results.games {
        let winner = game.winner.map_or("nobody".to_string(), |k| k.to_string());
        let cap = if game.finished { "" } else { " (turn cap)" };
        println!(
            "  Game {}: {} {} - {} {}, {} wins in {} turns{}",
            game.game_number,
            game.seats[0],
            game.scores[0],
            game.scores[1],
            game.seats[1],
            winner,
            game.turns,
            cap
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(game_number: usize, winner: Option<RobotKind>, turns: usize) -> GameRecord {
        GameRecord {
            game_number,
            seats: [RobotKind::Greedy, RobotKind::Random],
            scores: [0, 0],
            turns,
            winner,
            finished: winner.is_some(),
        }
    }

    #[test]
    fn test_compute_match_statistics_empty() {
        let results = compute_match_statistics(RobotKind::Greedy, RobotKind::Random, vec![]);
        assert_eq!(results.first_wins, 0);
        assert_eq!(results.second_wins, 0);
        assert_eq!(results.draws, 0);
        assert_eq!(results.avg_turns, 0.0);
    }

    #[test]
    fn test_compute_match_statistics() {
        let games = vec![
            record(1, Some(RobotKind::Greedy), 10),
            record(2, Some(RobotKind::Random), 20),
            record(3, Some(RobotKind::Greedy), 30),
            record(4, None, 40),
        ];

        let results = compute_match_statistics(RobotKind::Greedy, RobotKind::Random, games);
        assert_eq!(results.first_wins, 2);
        assert_eq!(results.second_wins, 1);
        assert_eq!(results.draws, 1);
        assert_eq!(results.avg_turns, 25.0);
    }

    #[test]
    fn test_mirror_match_counts_wins_once() {
        let games = vec![
            record(1, Some(RobotKind::Greedy), 10),
            record(2, Some(RobotKind::Greedy), 10),
        ];
        let results = compute_match_statistics(RobotKind::Greedy, RobotKind::Greedy, games);
        assert_eq!(results.first_wins, 2);
        assert_eq!(results.second_wins, 0);
    }

    #[test]
    fn test_create_rng_deterministic() {
        let mut rng1 = create_rng(Some(42));
        let mut rng2 = create_rng(Some(42));
        assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
    }

    #[test]
    fn test_win_rate() {
        assert_eq!(win_rate(0, 0), 0.0);
        assert_eq!(win_rate(1, 4), 0.25);
    }
}

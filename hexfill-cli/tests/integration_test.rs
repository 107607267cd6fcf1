//! Integration tests for HEXFILL
//!
//! Tests the full stack: engine passes, robots, the runner and the binary

use std::process::Command;
use std::sync::Arc;

use hexfill_core::{
    classify, distances, Board, Class, ExternalPlayer, Game, GameRunner, HexGrid, NoSource,
    Player, Robot, RobotKind, Scratch, Seat, Settings, Turn, UNREACHABLE,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn small_settings() -> Settings {
    Settings::default().with_size(25, 9).with_colors(6)
}

fn hexfill() -> Command {
    Command::new(env!("CARGO_BIN_EXE_hexfill"))
}

// ============================================================================
// ENGINE TESTS
// ============================================================================

#[test]
fn test_classification_tracks_live_scores() {
    let settings = small_settings();
    let mut game = Game::new(settings.clone(), 21).unwrap();
    let mut robots = [
        Robot::new(RobotKind::Greedy, &settings, 1).sequential(),
        Robot::new(RobotKind::Frontier, &settings, 2).sequential(),
    ];
    for seat in Seat::BOTH {
        robots[seat.index()].start(game.origins(seat));
    }
    let mut scratch = Scratch::new(game.grid());

    while !game.is_over() && game.turns() < 40 {
        let seat = game.to_move();
        let Turn::Chosen(color) =
            robots[seat.index()].take_turn(game.board(), game.color(seat.opponent()))
        else {
            panic!("robot pended");
        };
        game.apply_move(seat, color).unwrap();

        if game.turns() >= 2 {
            classify(game.board(), game.origins(Seat::First), &mut scratch);
            assert_eq!(scratch.count(Class::Mine), game.scores()[0]);
            assert_eq!(scratch.count(Class::His), game.scores()[1]);
        }
    }
}

#[test]
fn test_distances_zero_on_own_territory() {
    let settings = small_settings();
    let grid = Arc::new(settings.grid());
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let board = Board::random(grid.clone(), settings.num_colors, &mut rng);
    let origins = grid.default_origins();
    let mut scratch = Scratch::new(&grid);
    classify(&board, origins, &mut scratch);
    distances(&board, &mut scratch);

    assert_eq!(scratch.distance(origins.mine), Some(0));
    assert_eq!(scratch.opponent_distance(origins.theirs), Some(0));
    assert_eq!(scratch.distance(origins.theirs), None);
    for i in grid.valid_cells() {
        if scratch.class(i) == Class::Border {
            assert_eq!(scratch.distances()[i], 1);
        }
        assert_ne!(scratch.distances()[i], UNREACHABLE - 1);
    }
}

#[test]
fn test_isolated_grid_geometry() {
    let grid = HexGrid::new(95, 15);
    let origins = grid.default_origins();
    assert_eq!(grid.coordinates(origins.mine), (1, 14));
    assert_eq!(grid.coordinates(origins.theirs), (93, 0));
    assert_eq!(grid.valid_count(), 95 * 15 - 48);
}

// ============================================================================
// RUNNER TESTS
// ============================================================================

#[test]
fn test_every_robot_plays_against_greedy() {
    let settings = small_settings();
    let points = settings.points_to_win_on(&settings.grid());
    let mut runner = GameRunner::new(100);
    for kind in RobotKind::ALL {
        let mut robot = Robot::new(kind, &settings, 5).sequential();
        let mut greedy = Robot::new(RobotKind::Greedy, &settings, 6).sequential();
        let outcome = runner
            .play(&settings, [&mut robot, &mut greedy], &mut NoSource)
            .unwrap();
        assert!(outcome.turns > 0, "{} never moved", kind);
        if outcome.finished {
            let winner = outcome.winner.unwrap();
            assert!(outcome.scores[winner.index()] >= points);
        }
        assert!(outcome.scores.iter().sum::<usize>() <= settings.grid().valid_count());
    }
}

#[test]
fn test_external_player_abandons_without_source() {
    let settings = small_settings();
    let mut human = ExternalPlayer::new("human", settings.num_colors);
    let mut robot = Robot::new(RobotKind::Greedy, &settings, 1);
    let outcome = GameRunner::new(0)
        .play(&settings, [&mut robot, &mut human], &mut NoSource)
        .unwrap();
    assert_eq!(outcome.turns, 1);
    assert!(!outcome.finished);
    assert!(human.is_pending());
    assert_eq!(human.name(), "human");
}

// ============================================================================
// BINARY TESTS
// ============================================================================

#[test]
fn test_cli_list() {
    let output = hexfill().arg("list").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), RobotKind::ALL.len());
    assert!(stdout.lines().any(|l| l == "greedy"));
}

#[test]
fn test_cli_play_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.json");
    small_settings().save(&path).unwrap();

    let output = hexfill()
        .args(["--seed", "3", "play", "--first", "greedy", "--second", "random"])
        .args(["--games", "2", "--json", "--settings"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_games"], 2);
    assert_eq!(json["games"][0]["first"], "greedy");
    assert_eq!(json["games"][1]["first"], "random");
}

#[test]
fn test_cli_play_is_reproducible() {
    let run = || {
        hexfill()
            .args(["--seed", "9", "play", "--first", "hub", "--second", "cycle"])
            .args(["--games", "1", "--json", "--colors", "5", "--max-turns", "30"])
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn test_cli_rejects_unknown_robot() {
    let output = hexfill()
        .args(["play", "--first", "nobody", "--second", "greedy"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_cli_init_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hexfill.json");
    let output = hexfill().arg("init").arg("--output").arg(&path).output().unwrap();
    assert!(output.status.success());
    assert_eq!(Settings::load(&path).unwrap(), Settings::default());
}

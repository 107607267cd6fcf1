//! Game runner - plays a single game between two players

use serde::Serialize;
use tracing::{info, warn};

use crate::board::Color;
use crate::error::Result;
use crate::game::{Game, Seat};
use crate::robot::{Player, Turn};
use crate::settings::Settings;

/// Times a pending player is asked again after a rejected color
const MAX_RESUME_ATTEMPTS: usize = 8;

// ============================================================================
// MOVE SOURCE
// ============================================================================

/// Supplies colors for pending turns, e.g. from a keyboard or a socket.
/// Returning `None` abandons the game.
pub trait MoveSource {
    fn next_color(&mut self, seat: Seat, game: &Game) -> Option<Color>;
}

impl<F> MoveSource for F
where
    F: FnMut(Seat, &Game) -> Option<Color>,
{
    fn next_color(&mut self, seat: Seat, game: &Game) -> Option<Color> {
        self(seat, game)
    }
}

/// Source for games between robots, which never pend
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSource;

impl MoveSource for NoSource {
    fn next_color(&mut self, _seat: Seat, _game: &Game) -> Option<Color> {
        None
    }
}

// ============================================================================
// OUTCOME
// ============================================================================

/// Outcome of a single game
#[derive(Clone, Debug, Serialize)]
pub struct GameOutcome {
    pub scores: [usize; 2],
    /// Moves applied, both seats counted
    pub turns: usize,
    pub winner: Option<Seat>,
    /// Colors actually played, after illegal-move substitution
    pub moves: Vec<(Seat, Color)>,
    /// False when the turn cap was hit or a pending seat was abandoned
    pub finished: bool,
}

impl GameOutcome {
    fn from_game(game: &Game, moves: Vec<(Seat, Color)>) -> Self {
        let finished = game.is_over();
        Self {
            scores: game.scores(),
            turns: game.turns(),
            // an unfinished game goes to whoever is ahead
            winner: if finished { game.winner() } else { game.leader() },
            moves,
            finished,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

// ============================================================================
// RUNNER
// ============================================================================

/// Plays games to completion, drawing a fresh board seed for each
pub struct GameRunner {
    max_turns: usize,
    seed_counter: u64,
}

impl GameRunner {
    pub fn new(seed: u64) -> Self {
        Self {
            max_turns: 2000,
            seed_counter: seed,
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Play one game on a fresh random board
    pub fn play(
        &mut self,
        settings: &Settings,
        players: [&mut dyn Player; 2],
        source: &mut dyn MoveSource,
    ) -> Result<GameOutcome> {
        let seed = self.next_seed();
        let game = Game::new(settings.clone(), seed)?;
        self.play_game(game, players, source)
    }

    /// Play an already set up game to the end or the turn cap
    pub fn play_game(
        &self,
        mut game: Game,
        mut players: [&mut dyn Player; 2],
        source: &mut dyn MoveSource,
    ) -> Result<GameOutcome> {
        for seat in Seat::BOTH {
            players[seat.index()].start(game.origins(seat));
        }

        let mut moves = Vec::new();
        while !game.is_over() && game.turns() < self.max_turns {
            let seat = game.to_move();
            let player = &mut *players[seat.index()];
            let opponent_color = game.color(seat.opponent());

            let color = match player.take_turn(game.board(), opponent_color) {
                Turn::Chosen(c) => c,
                Turn::Pending => match resolve(player, seat, &game, source) {
                    Some(c) => c,
                    None => {
                        warn!(seat = seat.index(), player = player.name(), "game abandoned");
                        break;
                    }
                },
            };

            game.apply_move(seat, color)?;
            moves.push((seat, game.color(seat)));
        }

        let outcome = GameOutcome::from_game(&game, moves);
        info!(
            first = players[0].name(),
            second = players[1].name(),
            scores = ?outcome.scores,
            turns = outcome.turns,
            finished = outcome.finished,
            "game complete"
        );
        Ok(outcome)
    }

    /// Get next seed and increment counter
    fn next_seed(&mut self) -> u64 {
        let seed = self.seed_counter;
        self.seed_counter = self.seed_counter.wrapping_add(1);
        seed
    }

    /// Reset seed counter
    pub fn reset_seed(&mut self, seed: u64) {
        self.seed_counter = seed;
    }
}

/// Feed colors from `source` into a pending player until one is accepted
fn resolve(
    player: &mut dyn Player,
    seat: Seat,
    game: &Game,
    source: &mut dyn MoveSource,
) -> Option<Color> {
    for _ in 0..MAX_RESUME_ATTEMPTS {
        let offered = source.next_color(seat, game)?;
        match player.resume(offered) {
            Ok(c) => return Some(c),
            Err(e) => warn!(seat = seat.index(), color = offered, error = %e, "rejected color"),
        }
    }
    None
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::{ExternalPlayer, Robot, RobotKind};

    fn small() -> Settings {
        Settings::default().with_size(21, 8).with_colors(5)
    }

    #[test]
    fn test_robots_play_to_completion() {
        let settings = small();
        let mut a = Robot::new(RobotKind::Greedy, &settings, 1).sequential();
        let mut b = Robot::new(RobotKind::Cycle, &settings, 2).sequential();
        let mut runner = GameRunner::new(7);
        let outcome = runner.play(&settings, [&mut a, &mut b], &mut NoSource).unwrap();

        assert!(outcome.finished);
        assert_eq!(outcome.turns, outcome.moves.len());
        let winner = outcome.winner.unwrap();
        assert!(outcome.scores[winner.index()] >= settings.points_to_win_on(&settings.grid()));
    }

    #[test]
    fn test_same_seed_same_game() {
        let settings = small();
        let run = || {
            let mut a = Robot::new(RobotKind::Hub, &settings, 3).sequential();
            let mut b = Robot::new(RobotKind::Scatter, &settings, 4).sequential();
            GameRunner::new(11)
                .play(&settings, [&mut a, &mut b], &mut NoSource)
                .unwrap()
        };
        let (x, y) = (run(), run());
        assert_eq!(x.moves, y.moves);
        assert_eq!(x.scores, y.scores);
    }

    #[test]
    fn test_reset_seed_repeats_board() {
        let settings = small();
        let mut runner = GameRunner::new(0);
        let mut a = ExternalPlayer::new("a", 5);
        let mut b = ExternalPlayer::new("b", 5);
        // abandoned immediately, only the starting board matters
        let x = runner.play(&settings, [&mut a, &mut b], &mut NoSource).unwrap();
        runner.reset_seed(0);
        let y = runner.play(&settings, [&mut a, &mut b], &mut NoSource).unwrap();
        assert_eq!(x.scores, y.scores);
        assert!(!x.finished);
        assert_eq!(x.turns, 0);
    }

    #[test]
    fn test_turn_cap() {
        let settings = small();
        let mut a = Robot::new(RobotKind::Random, &settings, 1);
        let mut b = Robot::new(RobotKind::Random, &settings, 2);
        let outcome = GameRunner::new(3)
            .with_max_turns(4)
            .play(&settings, [&mut a, &mut b], &mut NoSource)
            .unwrap();
        assert_eq!(outcome.turns, 4);
        assert!(!outcome.finished);
    }

    #[test]
    fn test_pending_player_resumed_from_source() {
        let settings = small();
        let mut human = ExternalPlayer::new("human", 5);
        let mut robot = Robot::new(RobotKind::Greedy, &settings, 9).sequential();
        let mut offers = 0usize;
        // offer the opponent's color first, then the next legal one
        let mut source = |seat: Seat, game: &Game| {
            offers += 1;
            let opponent = game.color(seat.opponent());
            if offers % 2 == 1 {
                Some(opponent)
            } else {
                Some((opponent + 1) % 5)
            }
        };
        let outcome = GameRunner::new(5)
            .with_max_turns(20)
            .play(&settings, [&mut human, &mut robot], &mut source)
            .unwrap();

        let human_turns = outcome
            .moves
            .iter()
            .filter(|(seat, _)| *seat == Seat::First)
            .count();
        assert!(human_turns > 0);
        assert!(!human.is_pending());
        assert_eq!(offers, 2 * human_turns);
    }
}

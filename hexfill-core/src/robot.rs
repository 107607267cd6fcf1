//! Players: built-in robots and externally driven seats

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{Board, Color};
use crate::classify::{classify, Class};
use crate::distance::distances;
use crate::error::{FillerError, Result};
use crate::eval::{DistanceEvaluator, ExpandEvaluator};
use crate::game::validate_move;
use crate::grid::{CellIndex, HexGrid, Origins};
use crate::lookahead::Lookahead;
use crate::scratch::Scratch;
use crate::settings::Settings;
use crate::strategy::TurnView;

// ============================================================================
// PLAYER INTERFACE
// ============================================================================

/// Outcome of asking a player for a move
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    Chosen(Color),
    /// The color will arrive later through [`Player::resume`]
    Pending,
}

pub trait Player: Send {
    fn name(&self) -> &str;

    /// Called once before the first turn with this player's view of the origins
    fn start(&mut self, origins: Origins);

    fn take_turn(&mut self, board: &Board, opponent_color: Color) -> Turn;

    /// Deliver the color for a pending turn
    fn resume(&mut self, color: Color) -> Result<Color>;
}

// ============================================================================
// ROBOT KINDS
// ============================================================================

/// Built-in robot strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RobotKind {
    /// Any legal color
    Random,
    /// Walks the palette in order
    Cycle,
    /// Most cells now
    Greedy,
    /// Any color on the border
    Scatter,
    /// Heads for the centre
    Hub,
    /// Expands early, then raids the board edge
    Raider,
    /// Expands until the borders touch, then fights for the emptiest quarter
    Frontier,
    /// Alternates filling in and expanding
    Pulse,
    /// Hugs the board edge
    Rim,
    /// Fills in close to home
    Homebody,
    /// Denies the opponent his best color
    Spoiler,
    /// Races for the two spare corners
    Corners,
    /// Stretches toward the centre and across the board
    Stretch,
    /// Plurality vote of several primitives
    Voter,
    /// Larger vote that also weighs the opponent's options
    Council,
    /// Shortest route to the centre
    Pathfinder,
    /// Shortest routes through a chain of goals
    Navigator,
    /// Like Navigator, preferring route colors that grab most
    Planner,
    /// One-ply lookahead for the furthest border
    Reach,
    /// One-ply lookahead on the distance balance
    Strategist,
}

impl RobotKind {
    pub const ALL: [RobotKind; 20] = [
        RobotKind::Random,
        RobotKind::Cycle,
        RobotKind::Greedy,
        RobotKind::Scatter,
        RobotKind::Hub,
        RobotKind::Raider,
        RobotKind::Frontier,
        RobotKind::Pulse,
        RobotKind::Rim,
        RobotKind::Homebody,
        RobotKind::Spoiler,
        RobotKind::Corners,
        RobotKind::Stretch,
        RobotKind::Voter,
        RobotKind::Council,
        RobotKind::Pathfinder,
        RobotKind::Navigator,
        RobotKind::Planner,
        RobotKind::Reach,
        RobotKind::Strategist,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RobotKind::Random => "random",
            RobotKind::Cycle => "cycle",
            RobotKind::Greedy => "greedy",
            RobotKind::Scatter => "scatter",
            RobotKind::Hub => "hub",
            RobotKind::Raider => "raider",
            RobotKind::Frontier => "frontier",
            RobotKind::Pulse => "pulse",
            RobotKind::Rim => "rim",
            RobotKind::Homebody => "homebody",
            RobotKind::Spoiler => "spoiler",
            RobotKind::Corners => "corners",
            RobotKind::Stretch => "stretch",
            RobotKind::Voter => "voter",
            RobotKind::Council => "council",
            RobotKind::Pathfinder => "pathfinder",
            RobotKind::Navigator => "navigator",
            RobotKind::Planner => "planner",
            RobotKind::Reach => "reach",
            RobotKind::Strategist => "strategist",
        }
    }

    /// Look up a kind by name, ignoring case
    pub fn from_name(name: &str) -> Option<RobotKind> {
        registry().get(name.to_ascii_lowercase().as_str()).copied()
    }

    /// Whether the kind reads distances on its own turn
    pub fn uses_distances(self) -> bool {
        matches!(
            self,
            RobotKind::Pathfinder | RobotKind::Navigator | RobotKind::Planner
        )
    }

    /// Whether the kind only looks at its own color
    fn ignores_board(self) -> bool {
        matches!(self, RobotKind::Random | RobotKind::Cycle)
    }
}

fn registry() -> &'static FxHashMap<&'static str, RobotKind> {
    static REGISTRY: OnceLock<FxHashMap<&'static str, RobotKind>> = OnceLock::new();
    REGISTRY.get_or_init(|| RobotKind::ALL.iter().map(|&k| (k.name(), k)).collect())
}

impl fmt::Display for RobotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RobotKind {
    type Err = FillerError;

    fn from_str(s: &str) -> Result<Self> {
        RobotKind::from_name(s).ok_or_else(|| FillerError::UnknownRobot(s.to_string()))
    }
}

// ============================================================================
// ROBOT
// ============================================================================

/// Frontier's game phases
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Apart,
    Touching,
    EndGame,
}

/// Per-game memory of a robot
#[derive(Clone, Debug, Default)]
struct Memory {
    phase: Phase,
    toggle: bool,
    goals: Vec<CellIndex>,
}

/// A computer player
pub struct Robot {
    kind: RobotKind,
    num_colors: usize,
    points_to_win: Option<usize>,
    rng: ChaCha8Rng,
    scratch: Option<Scratch>,
    origins: Option<Origins>,
    memory: Memory,
    lookahead: Lookahead,
}

impl Robot {
    pub fn new(kind: RobotKind, settings: &Settings, seed: u64) -> Self {
        Self {
            kind,
            num_colors: settings.num_colors,
            points_to_win: settings.points_to_win,
            rng: ChaCha8Rng::seed_from_u64(seed),
            scratch: None,
            origins: None,
            memory: Memory::default(),
            lookahead: Lookahead::new(settings.num_colors),
        }
    }

    /// Evaluate lookahead branches on the calling thread only
    pub fn sequential(mut self) -> Self {
        self.lookahead = self.lookahead.with_parallel(false);
        self
    }

    fn choose(&mut self, board: &Board, opponent_color: Color) -> Color {
        let grid = board.grid();
        let origins = *self.origins.get_or_insert_with(|| grid.default_origins());
        let my_color = board.get(origins.mine);
        let points_to_win = self
            .points_to_win
            .unwrap_or_else(|| grid.valid_count() / 2 + 1);

        if self.scratch.as_ref().map_or(true, |s| s.len() != board.len()) {
            self.scratch = Some(Scratch::new(grid));
        }
        let Robot {
            kind,
            num_colors,
            rng,
            scratch,
            memory,
            lookahead,
            ..
        } = self;
        let scratch = scratch.get_or_insert_with(|| Scratch::new(grid));

        if !kind.ignores_board() {
            classify(board, origins, scratch);
            if kind.uses_distances() {
                distances(board, scratch);
            }
        }
        if memory.goals.is_empty() {
            memory.goals = goals(*kind, grid, origins);
        }

        let mut view = TurnView {
            board,
            scratch,
            origins,
            my_color,
            opponent_color,
            num_colors: *num_colors,
            points_to_win,
        };
        let choice = decide(*kind, memory, &mut view, lookahead, rng)
            .filter(|&c| c != opponent_color);

        match choice {
            Some(c) => c,
            None => {
                debug!(robot = kind.name(), "no preference, choosing randomly");
                view.random(rng).unwrap_or(my_color)
            }
        }
    }
}

/// Fixed target cells for the goal-driven kinds
fn goals(kind: RobotKind, grid: &HexGrid, origins: Origins) -> Vec<CellIndex> {
    let (mx, my) = grid.coordinates(origins.mine);
    let (tx, ty) = grid.coordinates(origins.theirs);
    match kind {
        RobotKind::Corners => vec![grid.nearest_valid(tx, my), grid.nearest_valid(mx, ty)],
        RobotKind::Stretch | RobotKind::Navigator | RobotKind::Planner => vec![
            grid.centre(),
            grid.nearest_valid((mx * 2 + tx) / 3, ty),
            grid.nearest_valid(tx, (my + ty) / 3),
        ],
        _ => Vec::new(),
    }
}

/// Frontier's target: the middle of the quarter with the most free cells
fn emptiest_quarter(view: &TurnView) -> CellIndex {
    let grid = view.board.grid();
    let (columns, rows) = (grid.columns(), grid.rows());
    let mut quarters = [0usize; 4];
    for i in grid.valid_cells() {
        if view.scratch.class(i) == Class::Free {
            let (x, y) = grid.coordinates(i);
            let xh = usize::from(x >= columns / 2);
            let yh = usize::from(y >= rows / 2);
            quarters[xh * 2 + yh] += 1;
        }
    }
    let mut fave = 0;
    for q in 1..4 {
        if quarters[q] > quarters[fave] {
            fave = q;
        }
    }
    let x = if fave / 2 == 0 { columns / 4 } else { columns * 3 / 4 };
    let y = if fave % 2 == 0 { rows / 4 } else { rows * 3 / 4 };
    grid.nearest_valid(x, y)
}

/// Shared goal chain of Navigator and Planner. The two later goals are
/// reordered so the closer one is tried first.
fn route_goals(
    memory: &mut Memory,
    view: &mut TurnView,
    rng: &mut ChaCha8Rng,
    pick: fn(&mut TurnView, CellIndex, &mut ChaCha8Rng) -> Option<Color>,
) -> Option<Color> {
    if let Some(c) = view.most_if_win() {
        return Some(c);
    }
    if let Some(c) = pick(view, memory.goals[0], rng) {
        return Some(c);
    }
    let d1 = view.scratch.distance(memory.goals[1]);
    let d2 = view.scratch.distance(memory.goals[2]);
    let open = |d: Option<u32>| matches!(d, Some(d) if d > 0);
    if open(d1) || open(d2) {
        let swap = match (d1, d2) {
            (Some(a), Some(b)) if a > 0 => b < a,
            (Some(a), _) if a > 0 => false,
            _ => true,
        };
        if swap {
            memory.goals.swap(1, 2);
        }
        if let Some(c) = pick(view, memory.goals[1], rng) {
            return Some(c);
        }
        if let Some(c) = pick(view, memory.goals[2], rng) {
            return Some(c);
        }
    }
    view.expand()
        .or_else(|| view.most_free(rng))
        .or_else(|| view.most(rng))
}

fn decide(
    kind: RobotKind,
    memory: &mut Memory,
    view: &mut TurnView,
    lookahead: &Lookahead,
    rng: &mut ChaCha8Rng,
) -> Option<Color> {
    let centre = view.board.grid().centre();
    match kind {
        RobotKind::Random => view.random(rng),
        RobotKind::Cycle => view.cycle(),
        RobotKind::Greedy => view.most(rng),
        RobotKind::Scatter => view.random_border(rng),
        RobotKind::Hub => view.target(centre).or_else(|| view.most(rng)),
        RobotKind::Raider => {
            let attempt = if view.score() < view.points_to_win * 4 / 7 {
                view.expand()
            } else {
                view.furthest_border().or_else(|| view.most_free(rng))
            };
            attempt.or_else(|| view.most(rng))
        }
        RobotKind::Frontier => {
            let shared = view.scratch.count(Class::SharedBorder);
            if memory.phase == Phase::Apart && shared > 0 {
                memory.phase = Phase::Touching;
            }
            if memory.phase == Phase::Touching
                && (view.real_score() >= view.points_to_win || shared == 0)
            {
                memory.phase = Phase::EndGame;
            }
            let attempt = match memory.phase {
                Phase::Apart => view.expand(),
                Phase::Touching => view.target(emptiest_quarter(view)),
                Phase::EndGame => view.most_free(rng),
            };
            attempt.or_else(|| view.most(rng))
        }
        RobotKind::Pulse => {
            memory.toggle = !memory.toggle;
            let attempt = if memory.toggle {
                view.dont_expand()
            } else {
                view.expand()
            };
            attempt.or_else(|| view.most(rng))
        }
        RobotKind::Rim => view
            .border()
            .or_else(|| view.expand())
            .or_else(|| view.most(rng)),
        RobotKind::Homebody => view
            .dont_expand()
            .filter(|&c| c != view.my_color)
            .or_else(|| view.most(rng)),
        RobotKind::Spoiler => view
            .most_if_win()
            .or_else(|| match view.opponent_most(rng) {
                Some(c) if c == view.my_color => view.expand(),
                other => other,
            })
            .or_else(|| view.most(rng)),
        RobotKind::Corners => view
            .most_if_win()
            .or_else(|| view.goal(memory.goals[0]))
            .or_else(|| view.goal(memory.goals[1]))
            .or_else(|| view.most(rng)),
        RobotKind::Stretch => view
            .goal(memory.goals[0])
            .or_else(|| view.goal(memory.goals[1]))
            .or_else(|| view.goal(memory.goals[2]))
            .or_else(|| view.expand())
            .or_else(|| view.smart_most(rng)),
        RobotKind::Voter => view.most_if_win().or_else(|| {
            let theirs = view.origins.theirs;
            let votes = [
                view.furthest_border(),
                view.most(rng),
                view.expand(),
                view.target(theirs),
                view.target(centre),
            ];
            view.vote(&votes)
        }),
        RobotKind::Council => view.most_if_win().or_else(|| {
            let theirs = view.origins.theirs;
            let votes = [
                view.furthest_border(),
                view.smart_most(rng),
                view.expand(),
                view.target(theirs),
                view.target(centre),
                view.opponent_most(rng),
            ];
            view.vote(&votes)
        }),
        RobotKind::Pathfinder => view
            .best_goal(centre, rng)
            .or_else(|| view.smart_most(rng)),
        RobotKind::Navigator => route_goals(memory, view, rng, |v, g, r| v.best_goal(g, r)),
        RobotKind::Planner => route_goals(memory, view, rng, |v, g, r| v.most_best_goal(g, r)),
        RobotKind::Reach => lookahead
            .choose(
                view.board,
                view.origins,
                view.my_color,
                view.opponent_color,
                &ExpandEvaluator,
                rng,
            )
            .or_else(|| view.most(rng)),
        RobotKind::Strategist => {
            let win = view.most_if_win();
            if view.undecided_cells() == 0 {
                return view.most(rng);
            }
            win.or_else(|| {
                lookahead.with_distance(true).choose(
                    view.board,
                    view.origins,
                    view.my_color,
                    view.opponent_color,
                    &DistanceEvaluator,
                    rng,
                )
            })
        }
    }
}

impl Player for Robot {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn start(&mut self, origins: Origins) {
        self.origins = Some(origins);
        self.memory = Memory::default();
    }

    fn take_turn(&mut self, board: &Board, opponent_color: Color) -> Turn {
        Turn::Chosen(self.choose(board, opponent_color))
    }

    fn resume(&mut self, _color: Color) -> Result<Color> {
        Err(FillerError::NotPending)
    }
}

// ============================================================================
// EXTERNAL PLAYER
// ============================================================================

/// A seat whose colors come from outside: a person at a keyboard or a
/// remote peer. Every turn is pending until [`Player::resume`] delivers a
/// legal color.
#[derive(Clone, Debug)]
pub struct ExternalPlayer {
    name: String,
    num_colors: usize,
    pending: Option<Color>,
}

impl ExternalPlayer {
    pub fn new(name: impl Into<String>, num_colors: usize) -> Self {
        Self {
            name: name.into(),
            num_colors,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Player for ExternalPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self, _origins: Origins) {
        self.pending = None;
    }

    fn take_turn(&mut self, _board: &Board, opponent_color: Color) -> Turn {
        self.pending = Some(opponent_color);
        Turn::Pending
    }

    fn resume(&mut self, color: Color) -> Result<Color> {
        let opponent = self.pending.ok_or(FillerError::NotPending)?;
        let color = validate_move(color, opponent, self.num_colors)?;
        self.pending = None;
        Ok(color)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Game, Seat};

    fn small() -> Settings {
        Settings::default().with_size(31, 11).with_colors(6)
    }

    #[test]
    fn test_registry_round_trip() {
        for kind in RobotKind::ALL {
            assert_eq!(RobotKind::from_name(kind.name()), Some(kind));
            assert_eq!(kind.to_string().parse::<RobotKind>(), Ok(kind));
        }
        assert_eq!(RobotKind::from_name("STRATEGIST"), Some(RobotKind::Strategist));
        assert_eq!(
            "nobody".parse::<RobotKind>(),
            Err(FillerError::UnknownRobot("nobody".to_string()))
        );
    }

    #[test]
    fn test_every_robot_plays_legally() {
        let settings = small();
        for kind in RobotKind::ALL {
            let mut game = Game::new(settings.clone(), 17).unwrap();
            let mut robots = [
                Robot::new(kind, &settings, 1),
                Robot::new(RobotKind::Greedy, &settings, 2),
            ];
            for seat in Seat::BOTH {
                robots[seat.index()].start(game.origins(seat));
            }
            for _ in 0..12 {
                let seat = game.to_move();
                let opponent = game.color(seat.opponent());
                let color = match robots[seat.index()].take_turn(game.board(), opponent) {
                    Turn::Chosen(c) => c,
                    Turn::Pending => panic!("{} left its turn pending", kind),
                };
                assert!(
                    validate_move(color, opponent, settings.num_colors).is_ok(),
                    "{} chose {} against {}",
                    kind,
                    color,
                    opponent
                );
                game.apply_move(seat, color).unwrap();
                if game.is_over() {
                    break;
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_moves() {
        let settings = small();
        let game = Game::new(settings.clone(), 4).unwrap();
        for kind in [RobotKind::Scatter, RobotKind::Strategist, RobotKind::Navigator] {
            let play = || {
                let mut robot = Robot::new(kind, &settings, 99);
                robot.start(game.origins(Seat::First));
                robot.take_turn(game.board(), game.color(Seat::Second))
            };
            assert_eq!(play(), play());
        }
    }

    #[test]
    fn test_robot_is_never_pending() {
        let mut robot = Robot::new(RobotKind::Greedy, &small(), 0);
        assert_eq!(robot.resume(1), Err(FillerError::NotPending));
    }

    #[test]
    fn test_external_player_resume() {
        let game = Game::new(small(), 2).unwrap();
        let opponent = game.color(Seat::Second);
        let mut human = ExternalPlayer::new("human", 6);
        human.start(game.origins(Seat::First));
        assert_eq!(human.resume(0), Err(FillerError::NotPending));

        assert_eq!(human.take_turn(game.board(), opponent), Turn::Pending);
        assert_eq!(human.resume(opponent), Err(FillerError::OpponentColor(opponent)));
        assert!(human.is_pending());
        assert!(matches!(
            human.resume(6),
            Err(FillerError::ColorOutOfRange { .. })
        ));
        let legal = (opponent + 1) % 6;
        assert_eq!(human.resume(legal), Ok(legal));
        assert!(!human.is_pending());
    }

    #[test]
    fn test_goal_cells_are_valid() {
        let grid = small().grid();
        let origins = grid.default_origins();
        for kind in [RobotKind::Corners, RobotKind::Stretch, RobotKind::Navigator] {
            let cells = goals(kind, &grid, origins);
            assert!(!cells.is_empty());
            assert!(cells.iter().all(|&g| grid.valid(g)));
        }
        assert!(goals(RobotKind::Greedy, &grid, origins).is_empty());
    }
}

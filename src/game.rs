//! Game state: playfield, active piece, bag, scoring, gravity.

use crate::pieces::TetrominoKind;
use crate::puzzle::{GoalKind, Puzzle, PuzzleError};
use crate::{ConfigError, GameConfig};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Points for clearing n rows at once, indexed by n.
const LINE_SCORES: [u32; 5] = [0, 100, 400, 900, 1600];

/// Points per cell descended by a soft-drop command.
const SOFT_DROP_SCORE: u32 = 1;
/// Points per cell covered by a hard drop.
const HARD_DROP_SCORE: u32 = 2;

/// Cleared lines needed to advance one level.
const LINES_PER_LEVEL: u32 = 10;

/// Gravity interval at level 1, the shortening per level, and the floor.
const BASE_FALL_MS: u64 = 2000;
const FALL_STEP_MS: u64 = 200;
const MIN_FALL_MS: u64 = 150;

/// Wall kick offsets tried in order when a rotation is blocked in place.
const WALL_KICKS: [(i32, i32); 5] = [(0, 0), (-1, 0), (1, 0), (-2, 0), (2, 0)];

/// Single cell: either empty or locked with a piece's color identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Filled(TetrominoKind),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }

    pub fn kind(self) -> Option<TetrominoKind> {
        match self {
            Self::Empty => None,
            Self::Filled(kind) => Some(kind),
        }
    }
}

/// The falling piece: kind, rotation index and anchor position.
///
/// Only the session mutates it; observers read kind/rotation/position or the
/// absolute cell list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    kind: TetrominoKind,
    rotation: u8,
    x: i32,
    y: i32,
}

impl Piece {
    pub fn kind(&self) -> TetrominoKind {
        self.kind
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    /// Anchor position (column, row) of the bounding box.
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Absolute (column, row) of each of the four occupied cells.
    pub fn cells(&self) -> [(i32, i32); 4] {
        let mut out = [(0, 0); 4];
        for (slot, (dx, dy)) in out.iter_mut().zip(self.kind.cells(self.rotation)) {
            *slot = (self.x + i32::from(dx), self.y + i32::from(dy));
        }
        out
    }

    fn shifted(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    fn rotated_cw(self) -> Self {
        Self {
            rotation: (self.rotation + 1) % self.kind.rotation_states(),
            ..self
        }
    }
}

/// Playfield: grid of cells. y=0 is the top row; rows are stored [0..height].
#[derive(Debug, Clone)]
pub struct Playfield {
    width: usize,
    height: usize,
    rows: VecDeque<Vec<Cell>>,
}

impl Playfield {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        let rows = (0..height).map(|_| vec![Cell::Empty; width]).collect();
        Self {
            width,
            height,
            rows,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at (x, y); `None` when out of bounds.
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    /// One row of cells, top row first; `None` past the bottom.
    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        self.rows.get(y).map(Vec::as_slice)
    }

    /// Overwrite a cell. Out-of-bounds writes are rejected.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width {
            return false;
        }
        match self.rows.get_mut(y as usize) {
            Some(row) => {
                row[x as usize] = cell;
                true
            }
            None => false,
        }
    }

    /// True iff every cell the piece occupies is in bounds and empty.
    pub fn can_place(&self, piece: &Piece) -> bool {
        piece
            .cells()
            .iter()
            .all(|&(x, y)| self.get(x, y).is_some_and(Cell::is_empty))
    }

    /// Mark every cell the piece occupies as filled with its color.
    ///
    /// Rejected without touching the grid when the placement is not valid;
    /// callers check [`can_place`](Self::can_place) first.
    pub fn lock(&mut self, piece: &Piece) -> bool {
        if !self.can_place(piece) {
            return false;
        }
        for (x, y) in piece.cells() {
            self.set(x, y, Cell::Filled(piece.kind));
        }
        true
    }

    /// Remove every completely filled row, shifting the rows above down and
    /// inserting empty rows at the top. Returns the number removed (0..=4
    /// per lock, since a piece spans at most four rows).
    pub fn clear_full_rows(&mut self) -> u32 {
        let before = self.rows.len();
        self.rows.retain(|row| row.iter().any(|cell| cell.is_empty()));
        let cleared = before - self.rows.len();
        for _ in 0..cleared {
            self.rows.push_front(vec![Cell::Empty; self.width]);
        }
        cleared as u32
    }

    /// Game-over probe: any locked cell in the top (spawn) row.
    pub fn is_top_row_blocked(&self) -> bool {
        self.rows
            .front()
            .is_some_and(|row| row.iter().any(|cell| !cell.is_empty()))
    }
}

/// Bag of 7 tetrominoes: one of each kind in random order, then refill.
#[derive(Debug, Clone)]
pub struct Bag {
    queue: Vec<TetrominoKind>,
    rng: u32,
}

impl Bag {
    pub fn new(seed: u32) -> Self {
        let mut bag = Self {
            queue: Vec::with_capacity(7),
            // An all-zero state would never leave zero.
            rng: if seed == 0 { 1 } else { seed },
        };
        bag.refill();
        bag
    }

    fn next_rand(&mut self) -> u32 {
        self.rng = self.rng.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        self.rng >> 16
    }

    fn refill(&mut self) {
        let mut all = TetrominoKind::ALL.to_vec();
        // Fisher–Yates shuffle
        for i in (1..all.len()).rev() {
            let j = (self.next_rand() as usize) % (i + 1);
            all.swap(i, j);
        }
        self.queue.extend(all);
    }

    pub fn next(&mut self) -> TetrominoKind {
        if self.queue.is_empty() {
            self.refill();
        }
        self.queue.remove(0)
    }
}

/// Discrete commands accepted between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    RotateCw,
    SoftDrop,
    HardDrop,
    Pause,
    Resume,
    Quit,
}

/// Session lifecycle. `GameOver` and `Quit` are terminal for play; a
/// game-over session still accepts [`Session::restart`] and `Quit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Paused,
    GameOver,
    Quit,
}

/// Why the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    /// The stack reached the spawn region.
    ToppedOut,
    /// Every puzzle goal was achieved.
    PuzzleComplete,
    /// A puzzle's piece budget was exceeded.
    PieceLimit,
}

/// One game from start to game over: owns the playfield, the falling piece,
/// the bag and all counters. Single-threaded; drive it with
/// [`apply`](Self::apply) and [`update`](Self::update).
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    playfield: Playfield,
    piece: Option<Piece>,
    next_pieces: Vec<TetrominoKind>,
    bag: Bag,
    score: u32,
    level: u32,
    lines_cleared: u32,
    pieces_used: u32,
    status: Status,
    over_reason: Option<GameOverReason>,
    fall_interval: Duration,
    last_fall: Instant,
    puzzle: Option<Puzzle>,
}

impl Session {
    pub fn new(config: GameConfig, now: Instant) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(config, None, now))
    }

    /// Start a puzzle session: the puzzle's grid is loaded before the first
    /// piece spawns and its goals are tracked on every lock.
    pub fn with_puzzle(
        config: GameConfig,
        puzzle: Puzzle,
        now: Instant,
    ) -> Result<Self, PuzzleError> {
        config.validate()?;
        puzzle.validate()?;
        let (width, height) = puzzle.dimensions();
        if width != config.width as usize || height != config.height as usize {
            return Err(PuzzleError::DimensionMismatch {
                expected: (config.width as usize, config.height as usize),
                found: (width, height),
            });
        }
        Ok(Self::assemble(config, Some(puzzle), now))
    }

    fn assemble(config: GameConfig, puzzle: Option<Puzzle>, now: Instant) -> Self {
        let mut playfield = Playfield::new(config.width as usize, config.height as usize);
        if let Some(puzzle) = &puzzle {
            for (y, row) in puzzle.grid().iter().enumerate() {
                for (x, cell) in row.iter().enumerate() {
                    if let Some(kind) = cell.as_deref().and_then(TetrominoKind::from_color_name) {
                        playfield.set(x as i32, y as i32, Cell::Filled(kind));
                    }
                }
            }
        }

        let mut bag = Bag::new(config.seed);
        let next_pieces = (0..config.preview_count).map(|_| bag.next()).collect();
        let level = config.initial_level;

        let mut session = Self {
            playfield,
            piece: None,
            next_pieces,
            bag,
            score: 0,
            level,
            lines_cleared: 0,
            pieces_used: 0,
            status: Status::Running,
            over_reason: None,
            fall_interval: fall_interval_for(level),
            last_fall: now,
            puzzle,
            config,
        };
        session.spawn_next();
        session
    }

    /// Reset to the starting state (same config, same bag seed, puzzle grid
    /// and goals restored). Accepted from any status except `Quit`.
    pub fn restart(&mut self, now: Instant) {
        if self.status == Status::Quit {
            return;
        }
        let mut puzzle = self.puzzle.take();
        if let Some(puzzle) = &mut puzzle {
            puzzle.reset_progress();
        }
        *self = Self::assemble(self.config.clone(), puzzle, now);
    }

    /// Apply one command. Illegal moves and rotations are silent no-ops;
    /// after game over only `Quit` is accepted.
    pub fn apply(&mut self, command: Command, now: Instant) {
        match (self.status, command) {
            (Status::Quit, _) => {}
            (_, Command::Quit) => self.status = Status::Quit,
            (Status::GameOver, _) => {}
            (Status::Paused, Command::Pause | Command::Resume) => {
                self.status = Status::Running;
                // Frozen while paused; gravity picks up from here.
                self.last_fall = now;
            }
            (Status::Paused, _) => {}
            (Status::Running, Command::Pause) => self.status = Status::Paused,
            (Status::Running, Command::Resume) => {}
            (Status::Running, Command::MoveLeft) => {
                self.try_shift(-1, 0);
            }
            (Status::Running, Command::MoveRight) => {
                self.try_shift(1, 0);
            }
            (Status::Running, Command::RotateCw) => self.rotate_cw(),
            (Status::Running, Command::SoftDrop) => self.soft_drop(),
            (Status::Running, Command::HardDrop) => self.hard_drop(),
        }
    }

    /// Advance gravity by elapsed time: one descent per interval, locking
    /// when the piece cannot fall further. Call once per frame.
    pub fn update(&mut self, now: Instant) {
        while self.status == Status::Running
            && now.duration_since(self.last_fall) >= self.fall_interval
        {
            self.last_fall += self.fall_interval;
            self.gravity_step();
        }
    }

    fn gravity_step(&mut self) {
        if !self.try_shift(0, 1) {
            self.lock_piece();
        }
    }

    fn try_shift(&mut self, dx: i32, dy: i32) -> bool {
        if let Some(piece) = self.piece {
            let moved = piece.shifted(dx, dy);
            if self.playfield.can_place(&moved) {
                self.piece = Some(moved);
                return true;
            }
        }
        false
    }

    /// Rotate clockwise, trying each wall kick offset in priority order.
    /// Rejected outright if none fits.
    fn rotate_cw(&mut self) {
        if let Some(piece) = self.piece {
            let rotated = piece.rotated_cw();
            for (dx, dy) in WALL_KICKS {
                let kicked = rotated.shifted(dx, dy);
                if self.playfield.can_place(&kicked) {
                    self.piece = Some(kicked);
                    return;
                }
            }
        }
    }

    fn soft_drop(&mut self) {
        if self.try_shift(0, 1) {
            self.score += SOFT_DROP_SCORE;
        } else {
            self.lock_piece();
        }
    }

    fn hard_drop(&mut self) {
        let mut distance = 0u32;
        while self.try_shift(0, 1) {
            distance += 1;
        }
        self.score += distance * HARD_DROP_SCORE;
        self.lock_piece();
    }

    fn lock_piece(&mut self) {
        let piece = match self.piece.take() {
            Some(piece) => piece,
            None => return,
        };
        if !self.playfield.lock(&piece) {
            // Unreachable through move/rotate/drop, which only ever leave
            // the piece on placeable cells.
            warn!("discarding piece that no longer fits at {:?}", piece.position());
            return;
        }
        debug!(
            "locked {:?} at {:?}, rotation {}",
            piece.kind(),
            piece.position(),
            piece.rotation()
        );
        self.pieces_used += 1;

        let cleared = self.playfield.clear_full_rows();
        if cleared > 0 {
            self.score += LINE_SCORES[(cleared as usize).min(4)];
            self.lines_cleared += cleared;
            info!("cleared {cleared} lines ({} total)", self.lines_cleared);
            self.update_level();
        }

        self.update_puzzle_goals();
        if self.status != Status::Running {
            return;
        }
        self.spawn_next();
    }

    fn update_level(&mut self) {
        let level = self.config.initial_level + self.lines_cleared / LINES_PER_LEVEL;
        if level != self.level {
            self.level = level;
            self.fall_interval = fall_interval_for(level);
            info!("level up: {level}");
        }
    }

    fn spawn_next(&mut self) {
        let kind = self.next_pieces.remove(0);
        self.next_pieces.push(self.bag.next());

        let x = self.playfield.width() as i32 / 2 - kind.spawn_width() / 2;
        let piece = Piece {
            kind,
            rotation: 0,
            x,
            y: 0,
        };
        if self.playfield.can_place(&piece) {
            debug!("spawned {kind:?} at column {x}");
            self.piece = Some(piece);
        } else {
            self.game_over(GameOverReason::ToppedOut);
        }
    }

    fn game_over(&mut self, reason: GameOverReason) {
        self.status = Status::GameOver;
        self.over_reason = Some(reason);
        self.piece = None;
        info!("game over: {reason:?}");
    }

    /// Refresh puzzle goal progress; ends the session when every goal is
    /// achieved or a piece budget is blown.
    fn update_puzzle_goals(&mut self) {
        let Some(puzzle) = self.puzzle.as_mut() else {
            return;
        };
        let mut piece_limit_exceeded = false;
        for goal in puzzle.goals_mut() {
            let value = match goal.kind() {
                GoalKind::ClearLines => self.lines_cleared,
                GoalKind::Score => self.score,
                GoalKind::MaxPieces => self.pieces_used,
                GoalKind::Pattern {
                    pattern,
                    pattern_x,
                    pattern_y,
                } => {
                    let mut matches = 0;
                    for (y, row) in pattern.iter().enumerate() {
                        for (x, want) in row.iter().enumerate() {
                            let Some(want) = want.as_deref() else {
                                continue;
                            };
                            let cell = self
                                .playfield
                                .get(pattern_x + x as i32, pattern_y + y as i32);
                            let found = cell.and_then(Cell::kind).map(TetrominoKind::color_name);
                            if found.is_some_and(|name| name.eq_ignore_ascii_case(want)) {
                                matches += 1;
                            }
                        }
                    }
                    matches
                }
            };
            goal.update(value);
            if matches!(goal.kind(), GoalKind::MaxPieces) && goal.progress() > goal.target() {
                piece_limit_exceeded = true;
            }
        }
        let completed = puzzle.is_completed();
        if piece_limit_exceeded {
            self.game_over(GameOverReason::PieceLimit);
        } else if completed {
            self.game_over(GameOverReason::PuzzleComplete);
        }
    }

    // Read-only queries for rendering/input collaborators.

    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    pub fn active_piece(&self) -> Option<&Piece> {
        self.piece.as_ref()
    }

    /// Row the active piece would land on if hard-dropped, for ghost
    /// rendering.
    pub fn ghost_y(&self) -> Option<i32> {
        let piece = self.piece?;
        let mut ghost = piece;
        loop {
            let below = ghost.shifted(0, 1);
            if !self.playfield.can_place(&below) {
                return Some(ghost.y);
            }
            ghost = below;
        }
    }

    /// Upcoming pieces, soonest first.
    pub fn preview(&self) -> &[TetrominoKind] {
        &self.next_pieces
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn pieces_used(&self) -> u32 {
        self.pieces_used
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_over(&self) -> bool {
        matches!(self.status, Status::GameOver | Status::Quit)
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.over_reason
    }

    /// Current gravity interval, shortening as the level rises.
    pub fn fall_interval(&self) -> Duration {
        self.fall_interval
    }

    pub fn puzzle(&self) -> Option<&Puzzle> {
        self.puzzle.as_ref()
    }
}

fn fall_interval_for(level: u32) -> Duration {
    let ms = BASE_FALL_MS
        .saturating_sub(FALL_STEP_MS * u64::from(level.saturating_sub(1)))
        .max(MIN_FALL_MS);
    Duration::from_millis(ms)
}

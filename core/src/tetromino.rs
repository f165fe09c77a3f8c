use crate::*;
use ndarray::{arr2, s, Array2};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::time::Duration;

const LINE_SCORE: u32 = 100;
const DROP_START: Duration = Duration::from_millis(1000);
const DROP_STEP: Duration = Duration::from_millis(50);
const DROP_FLOOR: Duration = Duration::from_millis(100);

/// The seven piece templates and their palette colors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// 0/1 occupancy matrix in its spawn orientation, `[row, col]`.
    pub fn template(self) -> Array2<u8> {
        match self {
            PieceKind::I => arr2(&[[1, 1, 1, 1]]),
            PieceKind::J => arr2(&[[1, 0, 0], [1, 1, 1]]),
            PieceKind::L => arr2(&[[0, 0, 1], [1, 1, 1]]),
            PieceKind::O => arr2(&[[1, 1], [1, 1]]),
            PieceKind::S => arr2(&[[0, 1, 1], [1, 1, 0]]),
            PieceKind::T => arr2(&[[0, 1, 0], [1, 1, 1]]),
            PieceKind::Z => arr2(&[[1, 1, 0], [0, 1, 1]]),
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            PieceKind::I => "#00f0f0",
            PieceKind::J => "#0000f0",
            PieceKind::L => "#f0a000",
            PieceKind::O => "#f0f000",
            PieceKind::S => "#00f000",
            PieceKind::T => "#a000f0",
            PieceKind::Z => "#f00000",
        }
    }
}

/// Clockwise rotation: transpose, then reverse each row.
fn rotate_cw(shape: &Array2<u8>) -> Array2<u8> {
    shape.t().slice(s![.., ..;-1]).to_owned()
}

/// The single active falling piece; replaced on lock.
#[derive(Clone, Debug, PartialEq)]
pub struct Tetromino {
    pub kind: PieceKind,
    shape: Array2<u8>,
    pub x: Coord,
    pub y: Coord,
}

impl Tetromino {
    fn spawn(kind: PieceKind, cols: usize) -> Self {
        let shape = kind.template();
        let x = cols as Coord / 2 - shape.ncols() as Coord / 2;
        Self { kind, shape, x, y: 0 }
    }

    /// Absolute board coordinates of every occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = Point> {
        occupied_cells(&self.shape, self.x, self.y)
    }
}

fn occupied_cells(shape: &Array2<u8>, x: Coord, y: Coord) -> impl Iterator<Item = Point> {
    shape
        .indexed_iter()
        .filter(|&(_, &filled)| filled != 0)
        .map(move |((row, col), _)| (x + col as Coord, y + row as Coord))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TetrominoConfig {
    pub cols: usize,
    pub rows: usize,
}

impl TetrominoConfig {
    pub fn new(cols: usize, rows: usize) -> Result<Self> {
        let config = Self { cols, rows };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // the widest template is four cells
        if self.cols < 4 || self.rows < 4 {
            return Err(GameError::InvalidSize);
        }
        Ok(())
    }

    pub const fn standard() -> Self {
        Self { cols: 10, rows: 20 }
    }
}

impl Default for TetrominoConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Outcome of a translation, rotation, or gravity step
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    NoChange,
    Moved,
    Locked { lines_cleared: u32 },
}

impl MoveOutcome {
    pub const fn has_update(self) -> bool {
        use MoveOutcome::*;
        match self {
            NoChange => false,
            Moved => true,
            Locked { .. } => true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TetrominoGame {
    config: TetrominoConfig,
    board: Grid<Option<PieceKind>>,
    piece: Option<Tetromino>,
    rng: SmallRng,
    score: u32,
    drop_interval: Duration,
    phase: GamePhase,
}

impl TetrominoGame {
    pub fn new(config: TetrominoConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut game = Self {
            config,
            board: Grid::new(config.cols, config.rows),
            piece: None,
            rng: SmallRng::seed_from_u64(seed),
            score: 0,
            drop_interval: DROP_START,
            phase: GamePhase::Running,
        };
        game.spawn_piece();
        Ok(game)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn drop_interval(&self) -> Duration {
        self.drop_interval
    }

    pub fn piece(&self) -> Option<&Tetromino> {
        self.piece.as_ref()
    }

    pub fn cell_at(&self, coords: Point) -> Option<PieceKind> {
        self.board.get(coords)
    }

    /// One gravity tick.
    pub fn step(&mut self) -> MoveOutcome {
        self.move_piece(0, 1)
    }

    pub fn shift_left(&mut self) -> MoveOutcome {
        self.move_piece(-1, 0)
    }

    pub fn shift_right(&mut self) -> MoveOutcome {
        self.move_piece(1, 0)
    }

    pub fn soft_drop(&mut self) -> MoveOutcome {
        self.move_piece(0, 1)
    }

    /// Translate the active piece. Illegal lateral moves are rejected with no
    /// state change; a failed downward move locks the piece instead.
    pub fn move_piece(&mut self, dx: Coord, dy: Coord) -> MoveOutcome {
        if self.phase.is_final() {
            return MoveOutcome::NoChange;
        }
        let Some(mut piece) = self.piece.take() else {
            return MoveOutcome::NoChange;
        };

        if !self.collides(&piece.shape, piece.x + dx, piece.y + dy) {
            piece.x += dx;
            piece.y += dy;
            self.piece = Some(piece);
            MoveOutcome::Moved
        } else if dy > 0 {
            self.lock(piece)
        } else {
            self.piece = Some(piece);
            MoveOutcome::NoChange
        }
    }

    /// Rotate clockwise; rejected unchanged if the rotated shape collides.
    /// There is no wall-kick compensation.
    pub fn rotate(&mut self) -> MoveOutcome {
        if self.phase.is_final() {
            return MoveOutcome::NoChange;
        }
        let Some(mut piece) = self.piece.take() else {
            return MoveOutcome::NoChange;
        };

        let rotated = rotate_cw(&piece.shape);
        let outcome = if !self.collides(&rotated, piece.x, piece.y) {
            piece.shape = rotated;
            MoveOutcome::Moved
        } else {
            MoveOutcome::NoChange
        };
        self.piece = Some(piece);
        outcome
    }

    pub fn snapshot(&self) -> TetrominoSnapshot {
        let rows = (0..self.config.rows)
            .map(|y| {
                (0..self.config.cols)
                    .map(|x| self.board.get((x as Coord, y as Coord)))
                    .collect()
            })
            .collect();

        TetrominoSnapshot {
            rows,
            piece_kind: self.piece.as_ref().map(|piece| piece.kind),
            piece_cells: self
                .piece
                .as_ref()
                .map(|piece| piece.cells().collect())
                .unwrap_or_default(),
            score: self.score,
            drop_interval_ms: self.drop_interval.as_millis() as u64,
            phase: self.phase,
        }
    }

    fn collides(&self, shape: &Array2<u8>, x: Coord, y: Coord) -> bool {
        occupied_cells(shape, x, y).any(|(px, py)| {
            px < 0
                || px >= self.config.cols as Coord
                || py >= self.config.rows as Coord
                || self.board.get((px, py)).is_some()
        })
    }

    fn draw_kind(&mut self) -> PieceKind {
        PieceKind::ALL[self.rng.random_range(0..PieceKind::ALL.len())]
    }

    /// A freshly spawned piece that already collides ends the game.
    fn spawn_piece(&mut self) {
        let kind = self.draw_kind();
        self.spawn_exact(kind);
    }

    fn spawn_exact(&mut self, kind: PieceKind) {
        let piece = Tetromino::spawn(kind, self.config.cols);
        if self.collides(&piece.shape, piece.x, piece.y) {
            log::debug!("spawn of {:?} blocked, game over", kind);
            self.piece = None;
            self.phase = GamePhase::Lost;
        } else {
            self.piece = Some(piece);
        }
    }

    fn lock(&mut self, piece: Tetromino) -> MoveOutcome {
        for coords in piece.cells() {
            // cells still above the top edge are dropped by the grid
            self.board.set(coords, Some(piece.kind));
        }

        let lines_cleared = self.clear_full_rows();
        if lines_cleared > 0 {
            self.score += LINE_SCORE * lines_cleared;
            self.drop_interval = self.drop_interval.saturating_sub(DROP_STEP).max(DROP_FLOOR);
            log::debug!(
                "cleared {} lines, score {}, drop interval {:?}",
                lines_cleared,
                self.score,
                self.drop_interval
            );
        }

        self.spawn_piece();
        MoveOutcome::Locked { lines_cleared }
    }

    /// Removes every fully occupied row bottom-up and prepends empty rows at
    /// the top, so the row count never changes.
    fn clear_full_rows(&mut self) -> u32 {
        let (cols, rows) = (self.config.cols, self.config.rows);
        let full: SmallVec<[usize; 4]> = (0..rows)
            .filter(|&y| (0..cols).all(|x| self.board.get((x as Coord, y as Coord)).is_some()))
            .collect();

        for &cleared in &full {
            for y in (1..=cleared).rev() {
                for x in 0..cols {
                    let above = self.board.get((x as Coord, y as Coord - 1));
                    self.board.set((x as Coord, y as Coord), above);
                }
            }
            for x in 0..cols {
                self.board.set((x as Coord, 0), None);
            }
        }

        full.len() as u32
    }

    #[cfg(test)]
    fn board_mut(&mut self) -> &mut Grid<Option<PieceKind>> {
        &mut self.board
    }

    #[cfg(test)]
    fn force_piece(&mut self, kind: PieceKind) {
        self.spawn_exact(kind);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TetrominoSnapshot {
    /// Row-major locked board, `rows[y][x]`.
    pub rows: Vec<Vec<Option<PieceKind>>>,
    pub piece_kind: Option<PieceKind>,
    pub piece_cells: Vec<Point>,
    pub score: u32,
    pub drop_interval_ms: u64,
    pub phase: GamePhase,
}

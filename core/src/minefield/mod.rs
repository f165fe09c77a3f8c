use crate::*;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub use generator::*;

mod generator;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinefieldConfig {
    pub size: (usize, usize),
    pub mines: usize,
}

impl MinefieldConfig {
    pub fn new(size: (usize, usize), mines: usize) -> Result<Self> {
        let config = Self { size, mines };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.size;
        if width == 0 || height == 0 {
            return Err(GameError::InvalidSize);
        }
        if self.mines > width * height {
            return Err(GameError::TooManyMines);
        }
        Ok(())
    }

    pub const fn beginner() -> Self {
        Self {
            size: (9, 9),
            mines: 10,
        }
    }

    pub const fn intermediate() -> Self {
        Self {
            size: (16, 16),
            mines: 40,
        }
    }

    pub const fn expert() -> Self {
        Self {
            size: (30, 16),
            mines: 99,
        }
    }

    pub const fn total_cells(&self) -> usize {
        self.size.0 * self.size.1
    }
}

/// Mine placement for one board, independent of any player-visible state.
#[derive(Clone, Debug, PartialEq)]
pub struct MineLayout {
    mask: Grid<bool>,
    count: usize,
}

impl MineLayout {
    pub(crate) fn from_mask(mask: Grid<bool>, count: usize) -> Self {
        Self { mask, count }
    }

    pub fn from_mine_coords(size: (usize, usize), mine_coords: &[Point]) -> Result<Self> {
        let mut mask: Grid<bool> = Grid::new(size.0, size.1);
        let mut count = 0;

        for &coords in mine_coords {
            if !mask.contains(coords) {
                return Err(GameError::InvalidCoords);
            }
            if !mask.get(coords) {
                mask.set(coords, true);
                count += 1;
            }
        }

        Ok(Self { mask, count })
    }

    pub fn config(&self) -> MinefieldConfig {
        MinefieldConfig {
            size: self.size(),
            mines: self.count,
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.mask.width(), self.mask.height())
    }

    pub fn total_cells(&self) -> usize {
        self.mask.len()
    }

    pub fn safe_cells(&self) -> usize {
        self.total_cells() - self.count
    }

    pub fn mine_count(&self) -> usize {
        self.count
    }

    pub fn contains_mine(&self, coords: Point) -> bool {
        self.mask.get(coords)
    }

    pub fn adjacent_mines(&self, coords: Point) -> u8 {
        self.mask
            .neighbors(coords)
            .filter(|&pos| self.mask.get(pos))
            .count() as u8
    }
}

/// Player-visible state of a single board cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Closed,
    Open(u8),
    Flag,
    // only shown once the game is lost:
    Mine,
}

impl Tile {
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open(_))
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::Closed
    }
}

/// Outcome of revealing a cell
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    Exploded,
    Won,
}

impl RevealOutcome {
    /// Whether this outcome could have caused an update to the board
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            Exploded => true,
            Won => true,
        }
    }
}

/// Outcome of toggling a flag
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Flagged,
    Unflagged,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        use FlagOutcome::*;
        match self {
            NoChange => false,
            Flagged => true,
            Unflagged => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MinefieldGame {
    layout: MineLayout,
    tiles: Grid<Tile>,
    open_count: usize,
    flag_count: usize,
    exploded: Option<Point>,
    phase: GamePhase,
}

impl MinefieldGame {
    pub fn new(layout: MineLayout) -> Self {
        let (width, height) = layout.size();
        Self {
            layout,
            tiles: Grid::new(width, height),
            open_count: 0,
            flag_count: 0,
            exploded: None,
            phase: GamePhase::Ready,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn size(&self) -> (usize, usize) {
        self.layout.size()
    }

    pub fn total_mines(&self) -> usize {
        self.layout.mine_count()
    }

    /// How many flags may still be placed; bounded to `0..=mines`.
    pub fn flags_left(&self) -> usize {
        self.layout.mine_count().saturating_sub(self.flag_count)
    }

    pub fn tile_at(&self, coords: Point) -> Tile {
        self.tiles.get(coords)
    }

    pub fn exploded(&self) -> Option<Point> {
        self.exploded
    }

    /// Open a closed cell. A mine loses the game and uncovers every other
    /// mine; a zero-neighbor cell floods its connected region open.
    pub fn reveal(&mut self, coords: Point) -> RevealOutcome {
        use RevealOutcome::*;

        if self.phase.is_final() || !self.tiles.contains(coords) {
            return NoChange;
        }
        if self.tiles.get(coords) != Tile::Closed {
            return NoChange;
        }

        if self.layout.contains_mine(coords) {
            log::debug!("hit mine at {:?}", coords);
            self.exploded = Some(coords);
            self.reveal_mines();
            self.phase = GamePhase::Lost;
            return Exploded;
        }

        let count = self.open_tile(coords);
        if count == 0 {
            self.flood_open(coords);
        }

        if self.open_count == self.layout.safe_cells() {
            self.phase = GamePhase::Won;
            Won
        } else {
            self.mark_started();
            Revealed
        }
    }

    /// Place or remove a flag. Open cells reject the toggle, and placing is
    /// refused once the flag budget is spent.
    pub fn toggle_flag(&mut self, coords: Point) -> FlagOutcome {
        use FlagOutcome::*;

        if self.phase.is_final() || !self.tiles.contains(coords) {
            return NoChange;
        }

        match self.tiles.get(coords) {
            Tile::Closed if self.flags_left() > 0 => {
                self.tiles.set(coords, Tile::Flag);
                self.flag_count += 1;
                self.mark_started();
                Flagged
            }
            Tile::Flag => {
                self.tiles.set(coords, Tile::Closed);
                self.flag_count -= 1;
                Unflagged
            }
            _ => NoChange,
        }
    }

    pub fn snapshot(&self) -> MinefieldSnapshot {
        let (width, height) = self.size();
        let rows = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| self.tiles.get((x as Coord, y as Coord)))
                    .collect()
            })
            .collect();

        MinefieldSnapshot {
            rows,
            flags_left: self.flags_left(),
            total_mines: self.total_mines(),
            exploded: self.exploded,
            phase: self.phase,
        }
    }

    fn open_tile(&mut self, coords: Point) -> u8 {
        let count = self.layout.adjacent_mines(coords);
        self.tiles.set(coords, Tile::Open(count));
        self.open_count += 1;
        count
    }

    /// Opens the connected zero region around `start` with an explicit work
    /// list; the open flag gates re-entry, so termination is structural.
    fn flood_open(&mut self, start: Point) {
        let mut visited: HashSet<Point> = HashSet::from([start]);
        let mut to_visit: VecDeque<_> = self
            .tiles
            .neighbors(start)
            .filter(|&pos| self.tiles.get(pos) == Tile::Closed)
            .collect();

        while let Some(coords) = to_visit.pop_front() {
            if !visited.insert(coords) {
                continue;
            }
            if self.tiles.get(coords) != Tile::Closed {
                continue;
            }

            let count = self.open_tile(coords);
            log::trace!("flood opened {:?}, neighbor mines {}", coords, count);

            if count == 0 {
                to_visit.extend(
                    self.tiles
                        .neighbors(coords)
                        .filter(|&pos| self.tiles.get(pos) == Tile::Closed)
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    fn mark_started(&mut self) {
        if self.phase.is_ready() {
            self.phase = GamePhase::Running;
        }
    }

    /// Uncovers every mine after a loss, flagged or not.
    fn reveal_mines(&mut self) {
        let (width, height) = self.size();
        for x in 0..width {
            for y in 0..height {
                let coords = (x as Coord, y as Coord);
                if self.layout.contains_mine(coords) {
                    self.tiles.set(coords, Tile::Mine);
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinefieldSnapshot {
    /// Row-major tile grid, `rows[y][x]`.
    pub rows: Vec<Vec<Tile>>,
    pub flags_left: usize,
    pub total_mines: usize,
    pub exploded: Option<Point>,
    pub phase: GamePhase,
}

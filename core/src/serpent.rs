use crate::*;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Movement cadence of the serpent.
pub const SERPENT_TICK: Duration = Duration::from_millis(100);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerpentConfig {
    pub cols: usize,
    pub rows: usize,
}

impl SerpentConfig {
    pub fn new(cols: usize, rows: usize) -> Result<Self> {
        let config = Self { cols, rows };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // one cell for the serpent, one for the apple
        if self.cols == 0 || self.rows == 0 || self.cols * self.rows < 2 {
            return Err(GameError::InvalidSize);
        }
        Ok(())
    }

    pub const fn standard() -> Self {
        Self { cols: 32, rows: 24 }
    }

    pub const fn total_cells(&self) -> usize {
        self.cols * self.rows
    }
}

impl Default for SerpentConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Outcome of one movement tick
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// No committed velocity yet, nothing moved
    Idle,
    Moved,
    Ate,
    Crashed,
}

impl StepOutcome {
    pub const fn has_update(self) -> bool {
        use StepOutcome::*;
        match self {
            Idle => false,
            Moved => true,
            Ate => true,
            Crashed => true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SerpentGame {
    config: SerpentConfig,
    /// Head at the front; insertion order is body order.
    body: VecDeque<Point>,
    /// Occupancy mirror of `body` for O(1) collision and spawn checks.
    occupied: Grid<bool>,
    velocity: Point,
    buffered: Point,
    apple: Point,
    score: u32,
    rng: SmallRng,
    phase: GamePhase,
}

impl SerpentGame {
    pub fn new(config: SerpentConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let head = (config.cols as Coord / 2, config.rows as Coord / 2);
        let mut occupied = Grid::new(config.cols, config.rows);
        occupied.set(head, true);

        let mut game = Self {
            config,
            body: VecDeque::from([head]),
            occupied,
            velocity: (0, 0),
            buffered: (0, 0),
            apple: head,
            score: 0,
            rng: SmallRng::seed_from_u64(seed),
            phase: GamePhase::Running,
        };
        game.respawn_apple();
        Ok(game)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn head(&self) -> Point {
        // the body always holds at least the starting segment
        self.body.front().copied().unwrap_or((0, 0))
    }

    pub fn apple(&self) -> Point {
        self.apple
    }

    /// Buffer the direction for the next tick. A 180° reversal of the
    /// velocity currently in effect is rejected outright.
    pub fn buffer_direction(&mut self, direction: Point) -> bool {
        if self.phase.is_final() {
            return false;
        }
        let (vx, vy) = self.velocity;
        if self.velocity != (0, 0) && direction == (-vx, -vy) {
            return false;
        }
        self.buffered = direction;
        true
    }

    /// Commit the buffered velocity and advance one cell. Wall collision is
    /// checked before self collision; the tail only counts while it still
    /// occupies its cell this tick.
    pub fn step(&mut self) -> StepOutcome {
        if self.phase.is_final() {
            return StepOutcome::Idle;
        }
        self.velocity = self.buffered;
        if self.velocity == (0, 0) {
            return StepOutcome::Idle;
        }

        let (hx, hy) = self.head();
        let head = (hx + self.velocity.0, hy + self.velocity.1);

        if !self.occupied.contains(head) {
            log::debug!("serpent hit the wall at {:?}", head);
            self.phase = GamePhase::Lost;
            return StepOutcome::Crashed;
        }
        if self.occupied.get(head) {
            log::debug!("serpent hit itself at {:?}", head);
            self.phase = GamePhase::Lost;
            return StepOutcome::Crashed;
        }

        self.body.push_front(head);
        self.occupied.set(head, true);

        if head == self.apple {
            self.score += 1;
            if !self.respawn_apple() {
                self.phase = GamePhase::Won;
            }
            StepOutcome::Ate
        } else {
            if let Some(tail) = self.body.pop_back() {
                self.occupied.set(tail, false);
            }
            StepOutcome::Moved
        }
    }

    pub fn snapshot(&self) -> SerpentSnapshot {
        SerpentSnapshot {
            cols: self.config.cols,
            rows: self.config.rows,
            body: self.body.iter().copied().collect(),
            apple: self.apple,
            score: self.score,
            phase: self.phase,
        }
    }

    /// Places the apple uniformly among cells the body does not occupy.
    /// Returns false when the body covers the whole board.
    fn respawn_apple(&mut self) -> bool {
        if self.body.len() >= self.config.total_cells() {
            return false;
        }
        loop {
            let candidate = (
                self.rng.random_range(0..self.config.cols as Coord),
                self.rng.random_range(0..self.config.rows as Coord),
            );
            if !self.occupied.get(candidate) {
                self.apple = candidate;
                return true;
            }
        }
    }

    #[cfg(test)]
    fn set_apple(&mut self, apple: Point) {
        self.apple = apple;
    }

    #[cfg(test)]
    fn set_body(&mut self, segments: &[Point]) {
        self.occupied = Grid::new(self.config.cols, self.config.rows);
        self.body = segments.iter().copied().collect();
        for &segment in segments {
            self.occupied.set(segment, true);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerpentSnapshot {
    pub cols: usize,
    pub rows: usize,
    /// Head first.
    pub body: Vec<Point>,
    pub apple: Point,
    pub score: u32,
    pub phase: GamePhase,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> SerpentGame {
        SerpentGame::new(SerpentConfig::standard(), 3).unwrap()
    }

    #[test]
    fn eating_the_apple_ahead_grows_by_one() {
        let mut game = game();
        let (hx, hy) = game.head();
        game.set_apple((hx + 1, hy));

        assert!(game.buffer_direction((1, 0)));
        assert_eq!(game.step(), StepOutcome::Ate);
        assert_eq!(game.len(), 2);
        assert_eq!(game.score(), 1);
        assert_eq!(game.head(), (hx + 1, hy));
    }

    #[test]
    fn constant_length_without_apple() {
        let mut game = game();
        game.set_apple((0, 0));
        let (hx, hy) = game.head();

        game.buffer_direction((0, 1));
        assert_eq!(game.step(), StepOutcome::Moved);
        assert_eq!(game.len(), 1);
        assert_eq!(game.head(), (hx, hy + 1));
    }

    #[test]
    fn reversal_is_rejected_at_input_time() {
        let mut game = game();
        game.set_apple((0, 0));
        game.buffer_direction((1, 0));
        game.step();

        assert!(!game.buffer_direction((-1, 0)));
        let (hx, hy) = game.head();
        assert_eq!(game.step(), StepOutcome::Moved);
        // still travelling rightward
        assert_eq!(game.head(), (hx + 1, hy));
    }

    #[test]
    fn perpendicular_turns_are_accepted() {
        let mut game = game();
        game.set_apple((0, 0));
        game.buffer_direction((1, 0));
        game.step();

        assert!(game.buffer_direction((0, -1)));
        let (hx, hy) = game.head();
        game.step();
        assert_eq!(game.head(), (hx, hy - 1));
    }

    #[test]
    fn zero_velocity_means_no_movement() {
        let mut game = game();
        let head = game.head();

        assert_eq!(game.step(), StepOutcome::Idle);
        assert_eq!(game.head(), head);
    }

    #[test]
    fn leaving_the_grid_ends_the_game() {
        let mut game = game();
        game.set_apple((0, 0));
        game.buffer_direction((1, 0));

        loop {
            match game.step() {
                StepOutcome::Moved | StepOutcome::Ate => continue,
                outcome => {
                    assert_eq!(outcome, StepOutcome::Crashed);
                    break;
                }
            }
        }
        assert_eq!(game.phase(), GamePhase::Lost);
        // frozen afterwards
        assert_eq!(game.step(), StepOutcome::Idle);
        assert!(!game.buffer_direction((0, 1)));
    }

    #[test]
    fn running_into_the_body_ends_the_game() {
        let mut game = game();
        game.set_apple((0, 0));
        game.set_body(&[(4, 4), (5, 4), (5, 5), (4, 5)]);

        game.buffer_direction((0, 1));
        assert_eq!(game.step(), StepOutcome::Crashed);
        assert_eq!(game.phase(), GamePhase::Lost);
    }

    #[test]
    fn apple_never_respawns_on_the_body() {
        for seed in 0..32 {
            let mut game = SerpentGame::new(SerpentConfig { cols: 2, rows: 2 }, seed).unwrap();
            game.set_body(&[(0, 0), (1, 0), (1, 1)]);

            assert!(game.respawn_apple());
            assert_eq!(game.apple(), (0, 1));
        }
    }

    #[test]
    fn filling_the_board_wins() {
        let mut game = SerpentGame::new(SerpentConfig { cols: 3, rows: 1 }, 1).unwrap();
        game.set_body(&[(1, 0), (2, 0)]);
        game.set_apple((0, 0));

        game.buffer_direction((-1, 0));
        assert_eq!(game.step(), StepOutcome::Ate);
        assert_eq!(game.phase(), GamePhase::Won);
        assert_eq!(game.len(), 3);
    }
}

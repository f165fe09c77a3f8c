use crate::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use web_time::Instant;

/// Bounded catch-up so a long stall cannot burst into hundreds of steps.
const MAX_CATCHUP_TICKS: u32 = 8;

/// Fixed-cadence tick source. The session arms one per game and polls it
/// from the embedder's frame loop; dropping it releases the schedule, so a
/// torn-down game can never receive a stale tick.
#[derive(Copy, Clone, Debug)]
pub struct Ticker {
    interval: Duration,
    last: Instant,
}

impl Ticker {
    pub fn start(interval: Duration) -> Self {
        Self {
            interval,
            last: Instant::now(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Re-arm with a new cadence without disturbing the current phase.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn poll(&mut self) -> u32 {
        self.poll_at(Instant::now())
    }

    /// Whole ticks elapsed since the last poll, at most one batch of
    /// `MAX_CATCHUP_TICKS`; the remainder keeps accumulating.
    pub fn poll_at(&mut self, now: Instant) -> u32 {
        if self.interval.is_zero() {
            return 0;
        }
        let elapsed = now.saturating_duration_since(self.last);
        let due = elapsed.as_nanos() / self.interval.as_nanos();
        if due == 0 {
            return 0;
        }
        if due > u128::from(MAX_CATCHUP_TICKS) {
            // drop the backlog instead of replaying a frozen tab
            self.last = now;
            MAX_CATCHUP_TICKS
        } else {
            let due = due as u32;
            self.last += self.interval * due;
            due
        }
    }
}

/// Which game to launch, with its board/screen configuration.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameSpec {
    Minefield(MinefieldConfig),
    Tetromino(TetrominoConfig),
    Serpent(SerpentConfig),
    Shooter(ShooterConfig),
    Combat(CombatConfig),
}

/// The one live game a session owns.
#[derive(Clone, Debug)]
pub enum ActiveGame {
    Minefield(MinefieldGame),
    Tetromino(TetrominoGame),
    Serpent(SerpentGame),
    Shooter(ShooterGame),
    Combat(CombatGame),
}

impl ActiveGame {
    /// Step cadence; the mine field is pointer-driven and has none.
    fn cadence(&self) -> Option<Duration> {
        match self {
            ActiveGame::Minefield(_) => None,
            ActiveGame::Tetromino(game) => Some(game.drop_interval()),
            ActiveGame::Serpent(_) => Some(SERPENT_TICK),
            ActiveGame::Shooter(_) => Some(SHOOTER_FRAME),
            ActiveGame::Combat(_) => Some(COMBAT_FRAME),
        }
    }

    fn phase(&self) -> GamePhase {
        match self {
            ActiveGame::Minefield(game) => game.phase(),
            ActiveGame::Tetromino(game) => game.phase(),
            ActiveGame::Serpent(game) => game.phase(),
            ActiveGame::Shooter(game) => game.phase(),
            ActiveGame::Combat(game) => game.phase(),
        }
    }
}

/// Renderable view of whatever game is active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SceneSnapshot {
    Minefield(MinefieldSnapshot),
    Tetromino(TetrominoSnapshot),
    Serpent(SerpentSnapshot),
    Shooter(ShooterSnapshot),
    Combat(CombatSnapshot),
}

/// Owns at most one live game and its ticker. Launching a game first tears
/// the previous one down completely, so no listener or timer outlives its
/// session.
#[derive(Clone, Debug, Default)]
pub struct Session {
    game: Option<ActiveGame>,
    ticker: Option<Ticker>,
    ticks: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn launch(&mut self, spec: GameSpec, seed: u64) -> Result<()> {
        self.teardown();

        let game = match spec {
            GameSpec::Minefield(config) => {
                config.validate()?;
                let layout = RandomMineGenerator::new(seed).generate(config);
                ActiveGame::Minefield(MinefieldGame::new(layout))
            }
            GameSpec::Tetromino(config) => {
                ActiveGame::Tetromino(TetrominoGame::new(config, seed)?)
            }
            GameSpec::Serpent(config) => ActiveGame::Serpent(SerpentGame::new(config, seed)?),
            GameSpec::Shooter(config) => ActiveGame::Shooter(ShooterGame::new(config, seed)?),
            GameSpec::Combat(config) => ActiveGame::Combat(CombatGame::new(config, seed)?),
        };

        log::debug!("session launched {:?} with seed {}", spec, seed);
        self.ticker = game.cadence().map(Ticker::start);
        self.game = Some(game);
        Ok(())
    }

    /// Releases the ticker and the game state; immediate and total.
    pub fn teardown(&mut self) {
        self.ticker = None;
        self.game = None;
        self.ticks = 0;
    }

    pub fn is_active(&self) -> bool {
        self.game.is_some()
    }

    pub fn game(&self) -> Option<&ActiveGame> {
        self.game.as_ref()
    }

    pub fn phase(&self) -> Option<GamePhase> {
        self.game.as_ref().map(ActiveGame::phase)
    }

    /// Ticks stepped since launch.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn key_down(&mut self, intent: Intent) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        match game {
            ActiveGame::Minefield(_) => {}
            ActiveGame::Tetromino(game) => {
                match intent {
                    Intent::MoveLeft => {
                        game.shift_left();
                    }
                    Intent::MoveRight => {
                        game.shift_right();
                    }
                    Intent::MoveDown => {
                        game.soft_drop();
                    }
                    Intent::Rotate | Intent::MoveUp => {
                        game.rotate();
                    }
                    Intent::Fire => {}
                };
            }
            ActiveGame::Serpent(game) => {
                match intent {
                    Intent::MoveLeft => game.buffer_direction((-1, 0)),
                    Intent::MoveRight => game.buffer_direction((1, 0)),
                    Intent::MoveUp => game.buffer_direction((0, -1)),
                    Intent::MoveDown => game.buffer_direction((0, 1)),
                    Intent::Rotate | Intent::Fire => false,
                };
            }
            ActiveGame::Shooter(game) => game.key_down(intent),
            ActiveGame::Combat(_) => {}
        }
        self.sync_cadence();
    }

    pub fn key_up(&mut self, intent: Intent) {
        match self.game.as_mut() {
            Some(ActiveGame::Shooter(game)) => game.key_up(intent),
            _ => {}
        }
    }

    /// Primary reveals, secondary flags; only the mine field listens.
    pub fn pointer(&mut self, button: PointerButton, cell: Point) {
        match self.game.as_mut() {
            Some(ActiveGame::Minefield(game)) => match button {
                PointerButton::Primary => {
                    game.reveal(cell);
                }
                PointerButton::Secondary => {
                    game.toggle_flag(cell);
                }
            },
            _ => {}
        }
    }

    /// Poll the ticker and run every due step. Returns the steps taken.
    pub fn pump(&mut self) -> u32 {
        self.pump_at(Instant::now())
    }

    pub fn pump_at(&mut self, now: Instant) -> u32 {
        let due = match self.ticker.as_mut() {
            Some(ticker) => ticker.poll_at(now),
            None => return 0,
        };
        for _ in 0..due {
            self.step_active();
        }
        self.sync_cadence();
        due
    }

    /// Run exactly one step regardless of the clock.
    pub fn step(&mut self) {
        self.step_active();
        self.sync_cadence();
    }

    pub fn snapshot(&self) -> Option<SceneSnapshot> {
        self.game.as_ref().map(|game| match game {
            ActiveGame::Minefield(game) => SceneSnapshot::Minefield(game.snapshot()),
            ActiveGame::Tetromino(game) => SceneSnapshot::Tetromino(game.snapshot()),
            ActiveGame::Serpent(game) => SceneSnapshot::Serpent(game.snapshot()),
            ActiveGame::Shooter(game) => SceneSnapshot::Shooter(game.snapshot()),
            ActiveGame::Combat(game) => SceneSnapshot::Combat(game.snapshot()),
        })
    }

    fn step_active(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        match game {
            ActiveGame::Minefield(_) => {}
            ActiveGame::Tetromino(game) => {
                game.step();
            }
            ActiveGame::Serpent(game) => {
                game.step();
            }
            ActiveGame::Shooter(game) => game.step(),
            ActiveGame::Combat(game) => game.step(),
        }
        self.ticks += 1;
    }

    /// The tetromino drop interval shrinks after line clears; keep the
    /// ticker cadence in step with it.
    fn sync_cadence(&mut self) {
        if let (Some(ActiveGame::Tetromino(game)), Some(ticker)) =
            (self.game.as_ref(), self.ticker.as_mut())
        {
            ticker.set_interval(game.drop_interval());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_counts_whole_intervals() {
        let interval = Duration::from_millis(100);
        let mut ticker = Ticker::start(interval);
        let armed = ticker.last;

        assert_eq!(ticker.poll_at(armed + Duration::from_millis(99)), 0);
        assert_eq!(ticker.poll_at(armed + Duration::from_millis(250)), 2);
        // phase is preserved: 50ms of the 250 are still banked
        assert_eq!(ticker.poll_at(armed + Duration::from_millis(310)), 1);
    }

    #[test]
    fn ticker_caps_catchup_after_a_stall() {
        let mut ticker = Ticker::start(Duration::from_millis(10));
        let armed = ticker.last;

        assert_eq!(ticker.poll_at(armed + Duration::from_secs(60)), 8);
        // backlog was dropped, not replayed
        assert_eq!(ticker.poll_at(armed + Duration::from_secs(60)), 0);
    }

    #[test]
    fn ticker_ignores_time_running_backwards() {
        let mut ticker = Ticker::start(Duration::from_millis(10));
        let armed = ticker.last;

        assert_eq!(ticker.poll_at(armed), 0);
    }

    #[test]
    fn launch_replaces_the_previous_session() {
        let mut session = Session::new();
        session
            .launch(GameSpec::Serpent(SerpentConfig::standard()), 1)
            .unwrap();
        session.step();
        assert_eq!(session.ticks(), 1);

        session
            .launch(GameSpec::Shooter(ShooterConfig::standard()), 1)
            .unwrap();
        assert_eq!(session.ticks(), 0);
        assert!(matches!(session.game(), Some(ActiveGame::Shooter(_))));
        assert_eq!(
            session.ticker.map(|ticker| ticker.interval()),
            Some(SHOOTER_FRAME)
        );
    }

    #[test]
    fn teardown_releases_game_and_ticker() {
        let mut session = Session::new();
        session
            .launch(GameSpec::Combat(CombatConfig::standard()), 9)
            .unwrap();

        session.teardown();

        assert!(!session.is_active());
        assert!(session.ticker.is_none());
        assert_eq!(session.pump(), 0);
        assert!(session.snapshot().is_none());
    }

    #[test]
    fn minefield_sessions_have_no_cadence() {
        let mut session = Session::new();
        session
            .launch(GameSpec::Minefield(MinefieldConfig::beginner()), 3)
            .unwrap();

        assert!(session.ticker.is_none());
        assert_eq!(session.pump(), 0);
        assert_eq!(session.ticks(), 0);
    }

    #[test]
    fn pump_runs_due_steps() {
        let mut session = Session::new();
        session
            .launch(GameSpec::Serpent(SerpentConfig::standard()), 1)
            .unwrap();
        let armed = session.ticker.unwrap().last;

        let due = session.pump_at(armed + Duration::from_millis(350));

        assert_eq!(due, 3);
        assert_eq!(session.ticks(), 3);
    }

    #[test]
    fn invalid_configs_leave_the_session_empty() {
        let mut session = Session::new();

        let result = session.launch(
            GameSpec::Serpent(SerpentConfig { cols: 0, rows: 0 }),
            1,
        );

        assert_eq!(result, Err(GameError::InvalidSize));
        assert!(!session.is_active());
    }

    #[test]
    fn key_routing_reaches_the_active_game() {
        let mut session = Session::new();
        session
            .launch(GameSpec::Serpent(SerpentConfig::standard()), 1)
            .unwrap();

        session.key_down(Intent::MoveRight);
        session.step();

        let Some(SceneSnapshot::Serpent(snapshot)) = session.snapshot() else {
            panic!("expected a serpent snapshot");
        };
        assert_eq!(snapshot.body[0].0, SerpentConfig::standard().cols as Coord / 2 + 1);
    }
}

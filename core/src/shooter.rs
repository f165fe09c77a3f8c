use crate::*;
use glam::Vec2;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Frame cadence of the shooter simulation.
pub const SHOOTER_FRAME: Duration = Duration::from_millis(16);

const PLAYER_SIZE: Vec2 = Vec2::new(50.0, 50.0);
const PLAYER_SPEED: f32 = 7.0;
const PLAYER_FLOOR_MARGIN: f32 = 100.0;
const BULLET_SIZE: Vec2 = Vec2::new(5.0, 15.0);
const BULLET_SPEED: f32 = 10.0;
const ENEMY_MIN_SIZE: f32 = 40.0;
const ENEMY_SIZE_SPREAD: f32 = 20.0;
const ENEMY_SPAWN_MARGIN: f32 = 50.0;
const ENEMY_BASE_SPEED: f32 = 3.0;
const ENEMY_SPEED_SPREAD: f32 = 2.0;
const ENEMY_SPEED_RAMP: f32 = 0.001;
const SPAWN_BASE_CHANCE: f64 = 0.02;
const SPAWN_RAMP: f64 = 0.0001;
const KILL_SCORE: u32 = 10;
const BURST_PARTICLES: usize = 15;
const BURST_SPREAD: f32 = 10.0;
const PARTICLE_DECAY: f32 = 0.05;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShooterConfig {
    pub width: u32,
    pub height: u32,
}

impl ShooterConfig {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let config = Self { width, height };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width < PLAYER_SIZE.x as u32 || self.height < PLAYER_FLOOR_MARGIN as u32 {
            return Err(GameError::InvalidSize);
        }
        Ok(())
    }

    pub const fn standard() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }

    fn width_f(&self) -> f32 {
        self.width as f32
    }

    fn height_f(&self) -> f32 {
        self.height as f32
    }
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Renderer color token for an explosion burst.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurstColor {
    White,
    Gray,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Decays from 1.0 to removal at 0.
    pub life: f32,
    pub color: BurstColor,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub rect: Rect,
    pub speed: f32,
}

#[derive(Clone, Debug)]
pub struct ShooterGame {
    config: ShooterConfig,
    player: Rect,
    bullets: Vec<Rect>,
    enemies: Vec<Enemy>,
    particles: Vec<Particle>,
    keys: KeyState,
    score: u32,
    rng: SmallRng,
    phase: GamePhase,
}

impl ShooterGame {
    pub fn new(config: ShooterConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let player = Rect {
            pos: Vec2::new(
                config.width_f() / 2.0,
                config.height_f() - PLAYER_FLOOR_MARGIN,
            ),
            size: PLAYER_SIZE,
        };
        Ok(Self {
            config,
            player,
            bullets: Vec::new(),
            enemies: Vec::new(),
            particles: Vec::new(),
            keys: KeyState::new(),
            score: 0,
            rng: SmallRng::seed_from_u64(seed),
            phase: GamePhase::Running,
        })
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn player(&self) -> Rect {
        self.player
    }

    pub fn bullets(&self) -> &[Rect] {
        &self.bullets
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Fire is edge-triggered; holding the key does not autofire.
    pub fn key_down(&mut self, intent: Intent) {
        if self.phase.is_final() {
            return;
        }
        let fresh = self.keys.press(intent);
        if fresh && intent == Intent::Fire {
            self.fire();
        }
    }

    pub fn key_up(&mut self, intent: Intent) {
        self.keys.release(intent);
    }

    /// One frame: move, spawn, collide, cull.
    pub fn step(&mut self) {
        if self.phase.is_final() {
            return;
        }

        self.move_player();
        self.advance_bullets();
        self.maybe_spawn_enemy();
        self.advance_enemies();
        self.collide_bullets();
        self.advance_particles();
    }

    pub fn snapshot(&self) -> ShooterSnapshot {
        ShooterSnapshot {
            player: self.player,
            bullets: self.bullets.clone(),
            enemies: self.enemies.iter().map(|enemy| enemy.rect).collect(),
            particles: self.particles.clone(),
            score: self.score,
            phase: self.phase,
        }
    }

    fn fire(&mut self) {
        self.bullets.push(Rect {
            pos: Vec2::new(
                self.player.pos.x + self.player.size.x / 2.0 - BULLET_SIZE.x / 2.0,
                self.player.pos.y,
            ),
            size: BULLET_SIZE,
        });
    }

    fn move_player(&mut self) {
        if self.keys.is_held(Intent::MoveLeft) {
            self.player.pos.x -= PLAYER_SPEED;
        }
        if self.keys.is_held(Intent::MoveRight) {
            self.player.pos.x += PLAYER_SPEED;
        }
        let max_x = self.config.width_f() - self.player.size.x;
        self.player.pos.x = self.player.pos.x.clamp(0.0, max_x);
    }

    fn advance_bullets(&mut self) {
        for bullet in &mut self.bullets {
            bullet.pos.y -= BULLET_SPEED;
        }
        self.bullets.retain(|bullet| bullet.pos.y >= 0.0);
    }

    /// Spawn chance grows with score, so the field thickens as the run goes.
    fn maybe_spawn_enemy(&mut self) {
        let chance = SPAWN_BASE_CHANCE + self.score as f64 * SPAWN_RAMP;
        if !self.rng.random_bool(chance.min(1.0)) {
            return;
        }

        let size = Vec2::new(
            ENEMY_MIN_SIZE + self.rng.random::<f32>() * ENEMY_SIZE_SPREAD,
            ENEMY_MIN_SIZE + self.rng.random::<f32>() * ENEMY_SIZE_SPREAD,
        );
        let x = self.rng.random::<f32>() * (self.config.width_f() - ENEMY_SPAWN_MARGIN);
        let speed = ENEMY_BASE_SPEED
            + self.rng.random::<f32>() * ENEMY_SPEED_SPREAD
            + self.score as f32 * ENEMY_SPEED_RAMP;

        self.enemies.push(Enemy {
            rect: Rect {
                pos: Vec2::new(x, -size.y),
                size,
            },
            speed,
        });
    }

    fn advance_enemies(&mut self) {
        for enemy in &mut self.enemies {
            enemy.rect.pos.y += enemy.speed;
        }

        let mut hit_player = None;
        for enemy in &self.enemies {
            if enemy.rect.overlaps(&self.player) {
                hit_player = Some(self.player.center());
                break;
            }
        }
        if let Some(center) = hit_player {
            log::debug!("player rammed, final score {}", self.score);
            self.burst(center, BurstColor::White);
            self.phase = GamePhase::Lost;
        }

        let floor = self.config.height_f();
        self.enemies.retain(|enemy| enemy.rect.pos.y <= floor);
    }

    /// Every bullet against every enemy, once per frame per pair.
    fn collide_bullets(&mut self) {
        let mut i = 0;
        'bullets: while i < self.bullets.len() {
            for j in 0..self.enemies.len() {
                if self.bullets[i].overlaps(&self.enemies[j].rect) {
                    let midpoint =
                        (self.bullets[i].center() + self.enemies[j].rect.center()) / 2.0;
                    self.bullets.remove(i);
                    self.enemies.remove(j);
                    self.score += KILL_SCORE;
                    self.burst(midpoint, BurstColor::Gray);
                    continue 'bullets;
                }
            }
            i += 1;
        }
    }

    fn advance_particles(&mut self) {
        for particle in &mut self.particles {
            particle.pos += particle.vel;
            particle.life -= PARTICLE_DECAY;
        }
        self.particles.retain(|particle| particle.life > 0.0);
    }

    fn burst(&mut self, center: Vec2, color: BurstColor) {
        for _ in 0..BURST_PARTICLES {
            let vel = Vec2::new(
                (self.rng.random::<f32>() - 0.5) * BURST_SPREAD,
                (self.rng.random::<f32>() - 0.5) * BURST_SPREAD,
            );
            self.particles.push(Particle {
                pos: center,
                vel,
                life: 1.0,
                color,
            });
        }
    }

    #[cfg(test)]
    fn push_enemy(&mut self, rect: Rect, speed: f32) {
        self.enemies.push(Enemy { rect, speed });
    }

    #[cfg(test)]
    fn push_bullet(&mut self, rect: Rect) {
        self.bullets.push(rect);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShooterSnapshot {
    pub player: Rect,
    pub bullets: Vec<Rect>,
    pub enemies: Vec<Rect>,
    pub particles: Vec<Particle>,
    pub score: u32,
    pub phase: GamePhase,
}

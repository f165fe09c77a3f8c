use crate::*;
use glam::Vec2;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Frame cadence of the background combat simulation.
pub const COMBAT_FRAME: Duration = Duration::from_millis(16);

const GRAVITY: f32 = 0.5;
const WALK_SPEED: f32 = 3.0;
const JUMP_IMPULSE: f32 = -12.0;
const AGENT_SIZE: Vec2 = Vec2::new(20.0, 60.0);
const ENGAGE_RANGE: f32 = 40.0;
const FAR_RANGE: f32 = 100.0;
const STRIKE_RANGE_X: f32 = 60.0;
const STRIKE_RANGE_Y: f32 = 50.0;
const STRIKE_DAMAGE: u32 = 10;
const KNOCKBACK_LIFT: f32 = -5.0;
const KNOCKBACK_PUSH: f32 = 10.0;
const ATTACK_COOLDOWN: u32 = 60;
const SWING_FLOOR: u32 = 40;
const JUMP_CHANCE: f64 = 0.01;
const FAR_JUMP_CHANCE: f64 = 0.02;
const FULL_HEALTH: u32 = 100;
// grounding tolerance below a platform's top edge
const LANDING_SLACK: f32 = 10.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatConfig {
    pub width: u32,
    pub height: u32,
}

impl CombatConfig {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let config = Self { width, height };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width < 2 * AGENT_SIZE.x as u32 || self.height < 2 * AGENT_SIZE.y as u32 {
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

impl Default for CombatConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Per-step decision of an agent, resolved before physics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    /// Too far from the opponent, walk toward it
    Approach,
    /// In range, hold position until the cooldown expires
    Engage,
    /// Cooldown expired, swing this step
    Attack,
    /// Ungrounded; decisions suspended, only drift and gravity apply
    Airborne,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stickman {
    pub pos: Vec2,
    pub vel: Vec2,
    pub grounded: bool,
    pub facing_right: bool,
    pub attacking: bool,
    pub attack_cooldown: u32,
    pub hp: u32,
}

impl Stickman {
    fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            grounded: false,
            facing_right: true,
            attacking: false,
            attack_cooldown: 0,
            hp: FULL_HEALTH,
        }
    }

    fn decide(&self, opponent: &Stickman) -> AgentState {
        if !self.grounded {
            return AgentState::Airborne;
        }
        let distance = (opponent.pos.x - self.pos.x).abs();
        if distance > ENGAGE_RANGE {
            AgentState::Approach
        } else if self.attack_cooldown == 0 {
            AgentState::Attack
        } else {
            AgentState::Engage
        }
    }
}

#[derive(Clone, Debug)]
pub struct CombatGame {
    config: CombatConfig,
    platforms: Vec<Rect>,
    agents: [Stickman; 2],
    rng: SmallRng,
    phase: GamePhase,
}

impl CombatGame {
    pub fn new(config: CombatConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let (w, h) = (config.width_f(), config.height_f());
        let platforms = vec![
            // ground
            Rect::new(0.0, h - 20.0, w, 20.0),
            Rect::new(w * 0.2, h * 0.7, 200.0, 20.0),
            Rect::new(w * 0.6, h * 0.6, 200.0, 20.0),
            Rect::new(w * 0.4, h * 0.4, 200.0, 20.0),
            Rect::new(w * 0.1, h * 0.3, 150.0, 20.0),
            Rect::new(w * 0.7, h * 0.25, 150.0, 20.0),
        ];

        Ok(Self {
            config,
            platforms,
            agents: [Stickman::new(100.0, 100.0), Stickman::new(w - 100.0, 100.0)],
            rng: SmallRng::seed_from_u64(seed),
            phase: GamePhase::Running,
        })
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn agents(&self) -> &[Stickman; 2] {
        &self.agents
    }

    pub fn platforms(&self) -> &[Rect] {
        &self.platforms
    }

    /// Advance both agents one step, first then second, so a knockback
    /// landed this step already affects the victim's own update.
    pub fn step(&mut self) {
        let (first, second) = self.agents.split_at_mut(1);
        step_agent(
            &mut first[0],
            &mut second[0],
            &self.platforms,
            self.config,
            &mut self.rng,
        );
        step_agent(
            &mut second[0],
            &mut first[0],
            &self.platforms,
            self.config,
            &mut self.rng,
        );
    }

    pub fn snapshot(&self) -> CombatSnapshot {
        CombatSnapshot {
            agents: self.agents,
            platforms: self.platforms.clone(),
            phase: self.phase,
        }
    }
}

fn step_agent(
    actor: &mut Stickman,
    opponent: &mut Stickman,
    platforms: &[Rect],
    config: CombatConfig,
    rng: &mut SmallRng,
) {
    let dx = opponent.pos.x - actor.pos.x;
    let distance = dx.abs();

    match actor.decide(opponent) {
        AgentState::Airborne => {} // keep drifting
        AgentState::Approach => {
            actor.vel.x = if dx > 0.0 { WALK_SPEED } else { -WALK_SPEED };
            actor.facing_right = dx > 0.0;
        }
        AgentState::Engage => {
            actor.vel.x = 0.0;
        }
        AgentState::Attack => {
            actor.vel.x = 0.0;
            actor.attacking = true;
            actor.attack_cooldown = ATTACK_COOLDOWN;
            let in_reach = (opponent.pos.y - actor.pos.y).abs() < STRIKE_RANGE_Y
                && distance < STRIKE_RANGE_X;
            if in_reach {
                opponent.vel.y = KNOCKBACK_LIFT;
                opponent.vel.x = if actor.facing_right {
                    KNOCKBACK_PUSH
                } else {
                    -KNOCKBACK_PUSH
                };
                opponent.hp = opponent.hp.saturating_sub(STRIKE_DAMAGE);
                log::trace!("strike landed, opponent hp {}", opponent.hp);
            }
        }
    }

    // occasional jump, more likely when far from the opponent
    if actor.grounded
        && (rng.random_bool(JUMP_CHANCE) || (distance > FAR_RANGE && rng.random_bool(FAR_JUMP_CHANCE)))
    {
        actor.vel.y = JUMP_IMPULSE;
        actor.grounded = false;
    }

    actor.vel.y += GRAVITY;
    actor.pos += actor.vel;

    if actor.attack_cooldown > 0 {
        actor.attack_cooldown -= 1;
    }
    if actor.attack_cooldown < SWING_FLOOR {
        actor.attacking = false;
    }

    // landing resolves only against downward motion
    actor.grounded = false;
    for platform in platforms {
        let feet = actor.pos.y + AGENT_SIZE.y;
        let over = actor.pos.x + AGENT_SIZE.x > platform.pos.x
            && actor.pos.x < platform.pos.x + platform.size.x;
        let landing = feet > platform.pos.y
            && feet < platform.pos.y + platform.size.y + LANDING_SLACK
            && actor.vel.y >= 0.0;
        if over && landing {
            actor.pos.y = platform.pos.y - AGENT_SIZE.y;
            actor.vel.y = 0.0;
            actor.grounded = true;
        }
    }

    actor.pos.x = actor.pos.x.clamp(0.0, config.width_f());

    // falling past the viewport is a boundary convention, not a failure
    if actor.pos.y > config.height_f() {
        actor.pos.y = 0.0;
        actor.vel = Vec2::ZERO;
        actor.pos.x = rng.random::<f32>() * config.width_f();
        actor.hp = FULL_HEALTH;
        log::trace!("agent fell out, respawned at x {}", actor.pos.x);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatSnapshot {
    pub agents: [Stickman; 2],
    pub platforms: Vec<Rect>,
    pub phase: GamePhase,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> CombatGame {
        CombatGame::new(CombatConfig::standard(), 5).unwrap()
    }

    fn grounded_pair(gap: f32) -> CombatGame {
        let mut game = game();
        let floor = 600.0 - 20.0 - AGENT_SIZE.y;
        game.agents[0].pos = Vec2::new(300.0, floor);
        game.agents[1].pos = Vec2::new(300.0 + gap, floor);
        game.agents[0].grounded = true;
        game.agents[1].grounded = true;
        game
    }

    #[test]
    fn agents_fall_and_land_on_a_platform() {
        let mut game = game();

        for _ in 0..300 {
            game.step();
        }

        for agent in game.agents() {
            assert!(agent.pos.y <= 600.0);
            // resting means no accumulated vertical velocity
            assert!(agent.vel.y.abs() < GRAVITY + 0.01 || !agent.grounded);
        }
    }

    #[test]
    fn distant_agents_approach_each_other() {
        let mut game = grounded_pair(400.0);

        game.step();

        let [left, right] = game.agents();
        assert!(left.facing_right);
        assert!(!right.facing_right);
        assert_eq!(left.vel.x, WALK_SPEED);
        assert_eq!(right.vel.x, -WALK_SPEED);
    }

    #[test]
    fn close_agents_halt_and_strike() {
        let mut game = grounded_pair(30.0);
        // an airborne victim cannot retaliate or cancel the push
        game.agents[1].grounded = false;

        game.step();

        let [striker, victim] = game.agents();
        assert!(striker.attacking);
        assert_eq!(striker.vel.x, 0.0);
        assert_eq!(striker.attack_cooldown, ATTACK_COOLDOWN - 1);
        assert_eq!(victim.vel.x, KNOCKBACK_PUSH);
        // knockback lift minus one step of gravity
        assert!(victim.vel.y < 0.0);
        assert_eq!(victim.hp, FULL_HEALTH - STRIKE_DAMAGE);
    }

    #[test]
    fn engage_holds_until_the_cooldown_expires() {
        let mut game = grounded_pair(30.0);
        game.step();
        let hp_after_first = game.agents()[1].hp;

        // the swing is spent; the next steps must not strike again
        for _ in 0..10 {
            game.step();
        }

        assert_eq!(game.agents()[1].hp, hp_after_first);
    }

    #[test]
    fn swing_pose_clears_partway_through_the_cooldown() {
        let mut game = grounded_pair(30.0);
        game.step();
        assert!(game.agents()[0].attacking);

        let mut steps = 0;
        while game.agents()[0].attacking {
            game.step();
            steps += 1;
            assert!(steps < ATTACK_COOLDOWN);
        }

        assert!(game.agents()[0].attack_cooldown < SWING_FLOOR + 1);
    }

    #[test]
    fn falling_out_respawns_at_the_top() {
        let mut game = game();
        game.agents[0].pos = Vec2::new(400.0, 601.0);
        game.agents[0].vel = Vec2::new(0.0, 30.0);
        game.agents[0].hp = 40;

        game.step();

        let fallen = &game.agents()[0];
        assert!(fallen.pos.y <= 1.0);
        assert_eq!(fallen.vel.y, 0.0);
        assert!(fallen.pos.x >= 0.0 && fallen.pos.x <= 800.0);
        assert_eq!(fallen.hp, FULL_HEALTH);
    }

    #[test]
    fn airborne_agents_suspend_decisions() {
        let mut game = game();
        game.agents[0].pos = Vec2::new(100.0, 100.0);
        game.agents[0].vel = Vec2::new(0.0, 0.0);
        game.agents[0].grounded = false;

        game.step();

        // no walking impulse was applied mid-air
        assert_eq!(game.agents()[0].vel.x, 0.0);
        assert_eq!(game.agents()[0].vel.y, GRAVITY);
    }

    #[test]
    fn horizontal_position_is_clamped_to_the_arena() {
        let mut game = game();
        game.agents[0].pos = Vec2::new(1.0, 100.0);
        game.agents[0].vel = Vec2::new(-50.0, 0.0);
        game.agents[0].grounded = false;

        game.step();

        assert_eq!(game.agents()[0].pos.x, 0.0);
    }
}

//! Predictive hazard avoidance.
//!
//! Best-effort and local: the server decides what actually happens. Each
//! tick the avoidance pass may rewrite the outgoing direction of the active
//! actor if its position is hazardous and another direction is predicted to
//! lead somewhere safe. Corrections are rate limited by a cooldown that can
//! never go below [`MIN_CORRECTION_DELAY`].

use std::time::{Duration, Instant};

use controls_shared::{
    collision::HazardQuery,
    config::AvoidConfig,
    input::ActionSnapshot,
    math::Vec2,
};
use tracing::debug;

use crate::view::LocalCharacter;

/// Absolute floor for the delay between two corrections.
pub const MIN_CORRECTION_DELAY: Duration = Duration::from_millis(500);

/// Period of the activity gate.
pub const ACTIVITY_CHECK_PERIOD: Duration = Duration::from_millis(100);

/// Directions tried in order when correcting.
pub const CANDIDATE_DIRECTIONS: [i32; 3] = [0, -1, 1];

/// Result of one avoidance evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvoidOutcome {
    /// Disabled, cooling down, or the actor is idle.
    Idle,
    /// Evaluated; nothing was changed.
    NoAction,
    /// Direction rewritten to the contained value.
    Corrected(i32),
}

/// Cooldown state. Starts as "never fired" and is never reset by rounds.
#[derive(Debug, Clone, Default)]
pub struct HazardAvoidance {
    last_correction: Option<Instant>,
    last_activity_check: Option<Instant>,
}

impl HazardAvoidance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_correction(&self) -> Option<Instant> {
        self.last_correction
    }

    /// Effective delay between corrections.
    pub fn correction_delay(cfg: &AvoidConfig) -> Duration {
        MIN_CORRECTION_DELAY.max(Duration::from_millis(cfg.delay_ms))
    }

    pub fn cooldown_elapsed(&self, now: Instant, cfg: &AvoidConfig) -> bool {
        match self.last_correction {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= Self::correction_delay(cfg),
        }
    }

    /// Activity gate. At most one passing check per
    /// [`ACTIVITY_CHECK_PERIOD`]; an idle actor leaves the gate untouched.
    pub fn is_active(&mut self, now: Instant, input: &ActionSnapshot) -> bool {
        if let Some(last) = self.last_activity_check {
            if now.saturating_duration_since(last) < ACTIVITY_CHECK_PERIOD {
                return false;
            }
        }
        if !input.wants_motion() {
            return false;
        }
        self.last_activity_check = Some(now);
        true
    }

    /// Runs the gated correction for the active actor.
    pub fn avoid(
        &mut self,
        now: Instant,
        input: &mut ActionSnapshot,
        character: Option<&LocalCharacter>,
        world: &dyn HazardQuery,
        cfg: &AvoidConfig,
    ) -> AvoidOutcome {
        if !cfg.enabled || !self.cooldown_elapsed(now, cfg) || !self.is_active(now, input) {
            return AvoidOutcome::Idle;
        }
        let Some(character) = character else {
            return AvoidOutcome::NoAction;
        };
        if !in_danger(world, character) {
            return AvoidOutcome::NoAction;
        }
        match try_avoid(input, character, world, cfg) {
            Some(direction) => {
                self.last_correction = Some(now);
                debug!(direction, "avoided hazard: changed direction");
                AvoidOutcome::Corrected(direction)
            }
            None => AvoidOutcome::NoAction,
        }
    }
}

/// Where the character is predicted to be after `ticks` holding `direction`.
pub fn predict_position(
    character: &LocalCharacter,
    direction: i32,
    ticks: u32,
    cfg: &AvoidConfig,
) -> Vec2 {
    let t = ticks as f32;
    character.pos + character.vel * t + Vec2::new(direction as f32 * cfg.probe_speed * t, 0.0)
}

/// Whether the character currently stands on a hazard.
pub fn in_danger(world: &dyn HazardQuery, character: &LocalCharacter) -> bool {
    world.is_hazard(character.pos)
}

/// Commits the first candidate direction predicted to be safe.
pub fn try_avoid(
    input: &mut ActionSnapshot,
    character: &LocalCharacter,
    world: &dyn HazardQuery,
    cfg: &AvoidConfig,
) -> Option<i32> {
    let current = input.direction;
    let safe = CANDIDATE_DIRECTIONS
        .into_iter()
        .filter(|&dir| dir != current)
        .find(|&dir| !world.is_hazard(predict_position(character, dir, cfg.lookahead_ticks, cfg)))?;
    input.direction = safe;
    Some(safe)
}

/// Whether the outgoing hook must be dropped this tick.
///
/// Independent of the correction cooldown; only looks at the current spot.
pub fn hook_assist(
    character: Option<&LocalCharacter>,
    world: &dyn HazardQuery,
    cfg: &AvoidConfig,
) -> bool {
    if !cfg.enabled || !cfg.hook_assist {
        return false;
    }
    let danger = character.is_some_and(|c| in_danger(world, c));
    if danger {
        debug!("hook disabled (danger)");
    }
    danger
}

#[cfg(test)]
mod tests {
    use super::*;
    use controls_shared::{
        collision::{TileHazardMap, TILE_SIZE},
        weapon::Weapon,
    };

    // freeze in the middle, safe ground on the left, death on the right
    fn map() -> TileHazardMap {
        TileHazardMap::from_rows(&["..fx"], 10).unwrap()
    }

    fn character_at_tile(x: usize) -> LocalCharacter {
        LocalCharacter {
            pos: Vec2::new(x as f32 * TILE_SIZE + 16.0, 16.0),
            vel: Vec2::ZERO,
            weapon: Weapon::Gun,
            ammo: 10,
        }
    }

    fn cfg() -> AvoidConfig {
        AvoidConfig {
            enabled: true,
            lookahead_ticks: 4,
            probe_speed: 10.0,
            hook_assist: true,
            ..AvoidConfig::default()
        }
    }

    #[test]
    fn delay_floor_cannot_be_lowered() {
        let mut c = cfg();
        c.delay_ms = 100;
        assert_eq!(HazardAvoidance::correction_delay(&c), MIN_CORRECTION_DELAY);
        c.delay_ms = 900;
        assert_eq!(HazardAvoidance::correction_delay(&c), Duration::from_millis(900));
    }

    #[test]
    fn corrects_towards_safe_side() {
        let world = map();
        let ch = character_at_tile(2);
        let mut input = ActionSnapshot {
            direction: 1,
            ..ActionSnapshot::default()
        };
        let mut avoid = HazardAvoidance::new();
        let out = avoid.avoid(Instant::now(), &mut input, Some(&ch), &world, &cfg());
        assert_eq!(out, AvoidOutcome::Corrected(-1));
        assert_eq!(input.direction, -1);
    }

    #[test]
    fn no_safe_candidate_leaves_cooldown_alone() {
        let world = TileHazardMap::from_rows(&["ffff"], 10).unwrap();
        let ch = character_at_tile(1);
        let mut input = ActionSnapshot {
            direction: 1,
            ..ActionSnapshot::default()
        };
        let mut avoid = HazardAvoidance::new();
        let out = avoid.avoid(Instant::now(), &mut input, Some(&ch), &world, &cfg());
        assert_eq!(out, AvoidOutcome::NoAction);
        assert_eq!(input.direction, 1);
        assert!(avoid.last_correction().is_none());
    }

    #[test]
    fn idle_actor_not_corrected() {
        let world = map();
        let ch = character_at_tile(2);
        let mut input = ActionSnapshot::default();
        let mut avoid = HazardAvoidance::new();
        let out = avoid.avoid(Instant::now(), &mut input, Some(&ch), &world, &cfg());
        assert_eq!(out, AvoidOutcome::Idle);
        assert_eq!(input.direction, 0);
    }

    #[test]
    fn activity_gate_has_its_own_period() {
        let mut avoid = HazardAvoidance::new();
        let t0 = Instant::now();
        let moving = ActionSnapshot {
            jump: 1,
            ..ActionSnapshot::default()
        };
        assert!(avoid.is_active(t0, &moving));
        assert!(!avoid.is_active(t0 + Duration::from_millis(50), &moving));
        assert!(avoid.is_active(t0 + Duration::from_millis(100), &moving));
    }

    #[test]
    fn idle_check_does_not_hold_the_gate() {
        let mut avoid = HazardAvoidance::new();
        let t0 = Instant::now();
        let moving = ActionSnapshot {
            direction: 1,
            ..ActionSnapshot::default()
        };
        assert!(!avoid.is_active(t0, &ActionSnapshot::default()));
        assert!(avoid.is_active(t0 + Duration::from_millis(10), &moving));
    }

    #[test]
    fn corrections_respect_cooldown() {
        let world = map();
        let ch = character_at_tile(2);
        let c = cfg();
        let mut avoid = HazardAvoidance::new();
        let t0 = Instant::now();
        let mut corrections = Vec::new();
        for ms in (0..2000).step_by(20) {
            let now = t0 + Duration::from_millis(ms);
            let mut input = ActionSnapshot {
                direction: 1,
                ..ActionSnapshot::default()
            };
            if let AvoidOutcome::Corrected(_) = avoid.avoid(now, &mut input, Some(&ch), &world, &c) {
                corrections.push(now);
            }
        }
        assert!(corrections.len() >= 3);
        for pair in corrections.windows(2) {
            assert!(pair[1] - pair[0] >= MIN_CORRECTION_DELAY);
        }
    }

    #[test]
    fn hook_assist_only_in_danger() {
        let world = map();
        assert!(hook_assist(Some(&character_at_tile(2)), &world, &cfg()));
        assert!(!hook_assist(Some(&character_at_tile(0)), &world, &cfg()));
        assert!(!hook_assist(None, &world, &cfg()));
        let mut c = cfg();
        c.enabled = false;
        assert!(!hook_assist(Some(&character_at_tile(2)), &world, &c));
    }
}

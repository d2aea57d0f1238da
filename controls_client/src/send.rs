//! Send suppression.
//!
//! A snapshot goes out when it changed, when the minimum rate (playing) or
//! heartbeat (frozen) interval ran out, or when the held weapon needs input
//! resubmitted every tick while moving. Nothing else triggers a send.

use std::time::{Duration, Instant};

use bytes::Bytes;
use controls_shared::{
    config::DummyConfig,
    input::{advance_counter, release_counter, ActionSnapshot},
};
use tracing::trace;

use crate::view::GameView;

#[derive(Debug, Clone, Default)]
pub struct SendPolicy {
    last_send: Option<Instant>,
    /// Edge-change snapshot, independent of send timing.
    fast_input: ActionSnapshot,
}

impl SendPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_send(&self) -> Option<Instant> {
        self.last_send
    }

    pub fn reset(&mut self) {
        self.last_send = None;
    }

    /// Whether more than `interval` passed since the last send.
    pub fn interval_elapsed(&self, now: Instant, interval: Duration) -> bool {
        match self.last_send {
            None => true,
            Some(last) => now > last + interval,
        }
    }

    /// Send decision for a frozen (chatting / in-menu) actor.
    pub fn frozen_send_due(&self, flags_changed: bool, now: Instant, heartbeat: Duration) -> bool {
        flags_changed || self.interval_elapsed(now, heartbeat)
    }

    /// Send decision for a playing actor.
    pub fn playing_send_due(
        &self,
        flags_changed: bool,
        outgoing: &ActionSnapshot,
        previous: &ActionSnapshot,
        now: Instant,
        min_interval: Duration,
        view: &GameView,
    ) -> bool {
        let continuous = view
            .local_character
            .is_some_and(|c| c.weapon.needs_continuous_input())
            && outgoing.wants_motion();
        flags_changed
            || outgoing.actions_differ(previous)
            || self.interval_elapsed(now, min_interval)
            || continuous
    }

    /// Records the send and produces the wire record.
    pub fn commit(&mut self, now: Instant, outgoing: &ActionSnapshot) -> Bytes {
        self.last_send = Some(now);
        trace!(?outgoing, "input snapshot sent");
        outgoing.to_bytes()
    }

    /// Stores `candidate` as the new fast-path snapshot and reports whether
    /// any action edge changed since the previous one.
    pub fn check_new_input(&mut self, candidate: ActionSnapshot) -> bool {
        let changed = self.fast_input.actions_differ(&candidate);
        self.fast_input = candidate;
        changed
    }
}

/// Mirrors the active actor's movement onto the shadow buffer.
///
/// Counters advance by the edges the active actor gained this tick instead
/// of being copied, so the shadow's own parity history stays intact. Fire is
/// left to the explicit control values when those are enabled.
pub fn mirror_shadow(
    shadow: &mut ActionSnapshot,
    input: &ActionSnapshot,
    previous: &ActionSnapshot,
    cfg: &DummyConfig,
) {
    shadow.direction = input.direction;
    shadow.hook = input.hook;
    shadow.jump = input.jump;
    shadow.player_flags = input.player_flags;
    shadow.target_x = input.target_x;
    shadow.target_y = input.target_y;
    shadow.wanted_weapon = input.wanted_weapon;

    if !cfg.control {
        shadow.fire = advance_counter(shadow.fire, input.fire - previous.fire);
    }
    shadow.next_weapon = advance_counter(shadow.next_weapon, input.next_weapon - previous.next_weapon);
    shadow.prev_weapon = advance_counter(shadow.prev_weapon, input.prev_weapon - previous.prev_weapon);
}

/// Drives the shadow buffer from the fixed control values.
pub fn control_shadow(shadow: &mut ActionSnapshot, cfg: &DummyConfig) {
    shadow.jump = cfg.jump;
    if cfg.fire != 0 {
        shadow.fire = cfg.fire;
    } else {
        release_counter(&mut shadow.fire);
    }
    shadow.hook = cfg.hook;
}

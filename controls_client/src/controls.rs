//! The controls component.
//!
//! Wires the store, aim, avoidance, autoswitch and send policy together.
//! Motion events arrive through [`Controls::on_cursor_move`] at any rate;
//! once per tick [`Controls::snap_input`] runs the assists on the active
//! actor and decides whether a record goes out.

use std::{str::FromStr, time::Instant};

use anyhow::bail;
use bytes::Bytes;
use controls_shared::{
    collision::HazardQuery,
    config::ControlsConfig,
    input::{ActionSnapshot, ActorSlot, StatusFlags},
    math::Vec2,
    net::InputTransport,
    weapon::Weapon,
};
use tracing::debug;

use crate::{
    aim::{AbsoluteStick, AimController, CursorKind},
    autoswitch,
    hazard::{self, HazardAvoidance},
    send::{self, SendPolicy},
    store::{HeldAction, InputSnapshotStore, Side},
    view::GameView,
};

/// A bindable key action fed in by the command front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Left,
    Right,
    Jump,
    Hook,
    Fire,
    ShowHookColl,
    SelectWeapon(Weapon),
    NextWeapon,
    PrevWeapon,
}

impl FromStr for KeyAction {
    type Err = anyhow::Error;

    /// Parses the `+name` form used in key bindings.
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let name = s.strip_prefix('+').unwrap_or(s);
        Ok(match name {
            "left" => KeyAction::Left,
            "right" => KeyAction::Right,
            "jump" => KeyAction::Jump,
            "hook" => KeyAction::Hook,
            "fire" => KeyAction::Fire,
            "showhookcoll" => KeyAction::ShowHookColl,
            "weapon1" => KeyAction::SelectWeapon(Weapon::Hammer),
            "weapon2" => KeyAction::SelectWeapon(Weapon::Gun),
            "weapon3" => KeyAction::SelectWeapon(Weapon::Shotgun),
            "weapon4" => KeyAction::SelectWeapon(Weapon::Grenade),
            "weapon5" => KeyAction::SelectWeapon(Weapon::Laser),
            "nextweapon" => KeyAction::NextWeapon,
            "prevweapon" => KeyAction::PrevWeapon,
            other => bail!("unknown key action {other:?}"),
        })
    }
}

pub struct Controls {
    cfg: ControlsConfig,
    active: ActorSlot,
    pub store: InputSnapshotStore,
    pub aim: AimController,
    avoidance: HazardAvoidance,
    send: SendPolicy,
}

impl Controls {
    pub fn new(cfg: ControlsConfig) -> Self {
        Self {
            cfg,
            active: ActorSlot::Primary,
            store: InputSnapshotStore::new(),
            aim: AimController::new(),
            avoidance: HazardAvoidance::new(),
            send: SendPolicy::new(),
        }
    }

    pub fn config(&self) -> &ControlsConfig {
        &self.cfg
    }

    pub fn config_mut(&mut self) -> &mut ControlsConfig {
        &mut self.cfg
    }

    pub fn active_slot(&self) -> ActorSlot {
        self.active
    }

    /// Selects which actor the keys and mouse control.
    pub fn set_active_slot(&mut self, slot: ActorSlot) {
        self.active = slot;
    }

    pub fn input(&self) -> &ActionSnapshot {
        self.store.input(self.active)
    }

    /// Outgoing buffer for the actor not under direct control.
    pub fn shadow_input(&self) -> &ActionSnapshot {
        self.store.shadow()
    }

    pub fn last_send(&self) -> Option<Instant> {
        self.send.last_send()
    }

    pub fn avoidance(&self) -> &HazardAvoidance {
        &self.avoidance
    }

    /// Round or connection reset. Avoidance cooldowns survive it.
    pub fn on_reset(&mut self) {
        for slot in ActorSlot::ALL {
            self.store.reset_actor(slot);
        }
        self.store.ammo.clear();
        self.send.reset();
    }

    pub fn on_player_death(&mut self) {
        self.store.record_death();
    }

    /// Server told us we picked up a weapon (raw protocol id).
    pub fn on_weapon_pickup(&mut self, raw_weapon: i32) {
        // the server only reports real weapon ids; anything else wraps
        let weapon = Weapon::from_raw(raw_weapon);
        let slot = self.active;
        let mut input = *self.store.input(slot);
        autoswitch::on_pickup(&self.cfg.weapons, &mut input, &mut self.store.ammo, weapon);
        *self.store.input_mut(slot) = input;
    }

    /// A key bound to `action` changed state.
    pub fn on_key(&mut self, action: KeyAction, pressed: bool, view: &GameView) {
        let slot = self.active;
        let state_blocked = view.ddrace_input_compat && view.spectator.active;
        let counter_blocked = state_blocked || view.spectator_menu_active;

        match action {
            KeyAction::Left | KeyAction::Right if !state_blocked => {
                let side = if action == KeyAction::Left {
                    Side::Left
                } else {
                    Side::Right
                };
                self.store.set_direction_key(slot, side, pressed);
            }
            KeyAction::Jump if !state_blocked => {
                self.store.set_held(slot, HeldAction::Jump, pressed);
            }
            KeyAction::Hook if !state_blocked => {
                if self.store.set_held(slot, HeldAction::Hook, pressed) && pressed {
                    self.capture_action_moment(slot);
                }
            }
            KeyAction::ShowHookColl if !state_blocked => {
                self.store.set_show_hook_coll(slot, pressed);
            }
            KeyAction::Fire if !counter_blocked => {
                if self.store.set_held(slot, HeldAction::Fire, pressed) && pressed {
                    self.capture_action_moment(slot);
                }
            }
            KeyAction::SelectWeapon(weapon) => {
                self.store.select_weapon(slot, weapon, pressed);
            }
            KeyAction::NextWeapon | KeyAction::PrevWeapon => {
                if !counter_blocked {
                    let held = if action == KeyAction::NextWeapon {
                        HeldAction::NextWeapon
                    } else {
                        HeldAction::PrevWeapon
                    };
                    self.store.set_held(slot, held, pressed);
                }
                self.store.clear_wanted_weapon(slot);
            }
            _ => {}
        }
    }

    fn capture_action_moment(&mut self, slot: ActorSlot) {
        if self.cfg.mouse.sub_tick_aiming {
            self.aim.capture_action_moment(slot);
        }
    }

    /// Raw motion event. Returns whether it was consumed.
    pub fn on_cursor_move(
        &mut self,
        delta: Vec2,
        kind: CursorKind,
        view: &GameView,
        stick: Option<&dyn AbsoluteStick>,
    ) -> bool {
        self.aim
            .apply_motion(self.active, delta, kind, &self.cfg, view, stick)
    }

    /// Fast-path edge detection between full sends.
    pub fn check_new_input(&mut self) -> bool {
        let slot = self.active;
        let mut candidate = *self.store.input(slot);
        candidate.direction = self.store.derived_direction(slot);
        if self.cfg.mouse.sub_tick_aiming {
            let offset = self.aim.offset(slot);
            candidate.target_x = offset.x as i32;
            candidate.target_y = offset.y as i32;
        }
        self.send.check_new_input(candidate)
    }

    /// Per-tick evaluation. Returns the record to transmit, if any.
    pub fn snap_input(
        &mut self,
        now: Instant,
        view: &GameView,
        world: &dyn HazardQuery,
    ) -> Option<Bytes> {
        let slot = self.active;
        let flags = view.status_flags(self.store.show_hook_coll(slot));
        self.store.input_mut(slot).player_flags = flags;
        let flags_changed = self.store.last(slot).player_flags != flags;
        self.store.last_mut(slot).player_flags = flags;

        let mut input = *self.store.input(slot);
        autoswitch::update(&self.cfg.weapons, view, &mut input, &mut self.store.ammo);
        *self.store.input_mut(slot) = input;

        let outgoing;
        let send;
        if !flags.is_playing() {
            if !view.ddrace_input_compat {
                self.store.reset_actor(slot);
            }
            // keep the target so others still see where we look
            let (x, y) = self.aim.transmit_target(slot, &self.cfg, view, false);
            self.store.input_mut(slot).set_target(x, y);
            outgoing = *self.store.input(slot);
            send = self
                .send
                .frozen_send_due(flags_changed, now, self.cfg.send.heartbeat());
        } else {
            let direction = self.store.derived_direction(slot);
            self.store.input_mut(slot).direction = direction;

            let character = view.local_character.as_ref();
            let mut input = *self.store.input(slot);
            self.avoidance
                .avoid(now, &mut input, character, world, &self.cfg.avoid);
            let drop_hook = hazard::hook_assist(character, world, &self.cfg.avoid);

            let (x, y) = self
                .aim
                .transmit_target(slot, &self.cfg, view, self.cfg.mouse.sub_tick_aiming);
            input.set_target(x, y);
            *self.store.input_mut(slot) = input;

            self.drive_shadow(slot);

            let mut out = input;
            if drop_hook {
                out.hook = 0;
            }
            send = self.send.playing_send_due(
                flags_changed,
                &out,
                self.store.last(slot),
                now,
                self.cfg.send.min_interval(),
                view,
            );
            outgoing = out;
        }

        if self.drives_shadow() {
            self.complete_shadow(slot, view);
        }
        self.aim.update_target_pos(slot, view);
        *self.store.last_mut(slot) = outgoing;

        if !send {
            return None;
        }
        Some(self.send.commit(now, &outgoing))
    }

    fn drive_shadow(&mut self, slot: ActorSlot) {
        let dummy = &self.cfg.dummy;
        if dummy.copy_moves {
            let input = *self.store.input(slot);
            let previous = *self.store.last(slot);
            send::mirror_shadow(self.store.shadow_mut(), &input, &previous, dummy);
            let shadow = *self.store.shadow();
            *self.store.input_mut(slot.other()) = shadow;
        }
        if dummy.control {
            send::control_shadow(self.store.shadow_mut(), dummy);
        }
    }

    /// Fills in what the control values never touch so the shadow record
    /// stands on its own: a mode bit and a non-zero target.
    fn complete_shadow(&mut self, slot: ActorSlot, view: &GameView) {
        let other = slot.other();
        let shadow = self.store.shadow();
        if shadow.target_x == 0 && shadow.target_y == 0 {
            let (x, y) = self.aim.transmit_target(other, &self.cfg, view, false);
            self.store.shadow_mut().set_target(x, y);
        }
        let shadow = self.store.shadow_mut();
        if !shadow.player_flags.intersects(StatusFlags::MODE) {
            shadow.player_flags |= StatusFlags::PLAYING;
        }
        let shadow = *shadow;
        *self.store.input_mut(other) = shadow;
    }

    /// Whether the shadow slot is being driven and needs its own record.
    pub fn drives_shadow(&self) -> bool {
        self.cfg.dummy.copy_moves || self.cfg.dummy.control
    }

    /// Runs one tick and hands any produced records to `transport`.
    ///
    /// Returns whether the active actor's record was sent.
    pub async fn tick<T: InputTransport + ?Sized>(
        &mut self,
        now: Instant,
        view: &GameView,
        world: &dyn HazardQuery,
        transport: &mut T,
    ) -> anyhow::Result<bool> {
        let Some(payload) = self.snap_input(now, view, world) else {
            return Ok(false);
        };
        transport.send_input(self.active, payload).await?;
        if self.drives_shadow() {
            let shadow = self.store.shadow().to_bytes();
            transport.send_input(self.active.other(), shadow).await?;
        }
        debug!(slot = ?self.active, "input sent");
        Ok(true)
    }
}

//! Current and previous action snapshots for both actor slots.
//!
//! All held-state mutation goes through [`InputSnapshotStore::set_held`],
//! which only ever counts observed transitions. The only direct writes are
//! the one-shot weapon selection and the reset path.

use controls_shared::{
    input::{direction_from_keys, release_counter, toggle_counter, ActionSnapshot, ActorSlot},
    weapon::Weapon,
};

use crate::autoswitch::AmmoTelemetry;

/// Snapshot fields driven by held keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeldAction {
    Jump,
    Hook,
    Fire,
    NextWeapon,
    PrevWeapon,
}

/// Raw directional key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Default)]
struct ActorInput {
    input: ActionSnapshot,
    last: ActionSnapshot,
    left: bool,
    right: bool,
    show_hook_coll: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InputSnapshotStore {
    actors: [ActorInput; 2],
    /// Outgoing buffer for the slot that is not being controlled.
    shadow: ActionSnapshot,
    pub ammo: AmmoTelemetry,
}

impl InputSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self, slot: ActorSlot) -> &ActionSnapshot {
        &self.actors[slot.index()].input
    }

    pub fn input_mut(&mut self, slot: ActorSlot) -> &mut ActionSnapshot {
        &mut self.actors[slot.index()].input
    }

    /// Snapshot produced by the previous evaluation of `slot`.
    pub fn last(&self, slot: ActorSlot) -> &ActionSnapshot {
        &self.actors[slot.index()].last
    }

    pub fn last_mut(&mut self, slot: ActorSlot) -> &mut ActionSnapshot {
        &mut self.actors[slot.index()].last
    }

    pub fn shadow(&self) -> &ActionSnapshot {
        &self.shadow
    }

    pub fn shadow_mut(&mut self) -> &mut ActionSnapshot {
        &mut self.shadow
    }

    pub fn set_direction_key(&mut self, slot: ActorSlot, side: Side, held: bool) {
        let actor = &mut self.actors[slot.index()];
        match side {
            Side::Left => actor.left = held,
            Side::Right => actor.right = held,
        }
    }

    pub fn direction_keys(&self, slot: ActorSlot) -> (bool, bool) {
        let actor = &self.actors[slot.index()];
        (actor.left, actor.right)
    }

    /// Direction implied by the raw keys right now.
    pub fn derived_direction(&self, slot: ActorSlot) -> i32 {
        let (left, right) = self.direction_keys(slot);
        direction_from_keys(left, right)
    }

    pub fn show_hook_coll(&self, slot: ActorSlot) -> bool {
        self.actors[slot.index()].show_hook_coll
    }

    pub fn set_show_hook_coll(&mut self, slot: ActorSlot, held: bool) {
        self.actors[slot.index()].show_hook_coll = held;
    }

    /// Records the held state of an action. Returns whether the field moved.
    ///
    /// Jump and hook are plain levels; the rest count transitions modulo
    /// the state mask.
    pub fn set_held(&mut self, slot: ActorSlot, action: HeldAction, held: bool) -> bool {
        let input = self.input_mut(slot);
        match action {
            HeldAction::Jump => set_level(&mut input.jump, held),
            HeldAction::Hook => set_level(&mut input.hook, held),
            HeldAction::Fire => toggle_counter(&mut input.fire, held),
            HeldAction::NextWeapon => toggle_counter(&mut input.next_weapon, held),
            HeldAction::PrevWeapon => toggle_counter(&mut input.prev_weapon, held),
        }
    }

    /// Explicit weapon selection; only a press selects.
    pub fn select_weapon(&mut self, slot: ActorSlot, weapon: Weapon, pressed: bool) {
        if pressed {
            self.input_mut(slot).wanted_weapon = weapon.wanted_id();
        }
    }

    /// Clears any pending explicit selection so it cannot fight a cycle.
    pub fn clear_wanted_weapon(&mut self, slot: ActorSlot) {
        self.input_mut(slot).wanted_weapon = 0;
    }

    /// Freezes `slot`: stop moving, release fire, forget the directional keys.
    ///
    /// Works from the previous snapshot so that the receiver sees a clean
    /// release rather than whatever was typed meanwhile.
    pub fn reset_actor(&mut self, slot: ActorSlot) {
        let actor = &mut self.actors[slot.index()];
        actor.last.direction = 0;
        release_counter(&mut actor.last.fire);
        actor.last.jump = 0;
        actor.input = actor.last;
        actor.left = false;
        actor.right = false;
    }

    /// Ammo known from a previous life is meaningless after a death.
    pub fn record_death(&mut self) {
        self.ammo.clear();
    }
}

fn set_level(field: &mut i32, held: bool) -> bool {
    let value = held as i32;
    let changed = *field != value;
    *field = value;
    changed
}

//! Per-tick player action record.
//!
//! An [`ActionSnapshot`] is what the client transmits to the server for one
//! actor. Momentary actions (fire, weapon cycling) are carried as edge
//! counters: the low bit is the held state and every press or release adds
//! one, masked by [`INPUT_STATE_MASK`] so the value stays representable on
//! the wire while parity survives wraparound.

/// Modulus mask for edge counters. Must keep bit 0.
pub const INPUT_STATE_MASK: i32 = 0x3f;

/// Returns the held state carried by an edge counter.
pub fn is_held(counter: i32) -> bool {
    counter & 1 != 0
}

/// Adds `delta` transitions to a counter, keeping it within the mask.
///
/// `delta` may be negative when it was computed across a wraparound; the
/// two's complement mask still lands on the right residue.
pub fn advance_counter(counter: i32, delta: i32) -> i32 {
    counter.wrapping_add(delta) & INPUT_STATE_MASK
}

/// Counts one transition if `held` differs from the counter's low bit.
///
/// Returns whether the counter changed.
pub fn toggle_counter(counter: &mut i32, held: bool) -> bool {
    let changed = is_held(*counter) != held;
    if changed {
        *counter += 1;
    }
    *counter &= INPUT_STATE_MASK;
    changed
}

/// Synthesizes a release edge if the counter says "held".
pub fn release_counter(counter: &mut i32) {
    toggle_counter(counter, false);
}

bitflags::bitflags! {
    /// Player status flags sent alongside the input.
    ///
    /// `PLAYING`, `IN_MENU` and `CHATTING` are the mutually exclusive mode
    /// bits; the rest decorate whichever mode is set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StatusFlags: u32 {
        const PLAYING = 1 << 0;
        const IN_MENU = 1 << 1;
        const CHATTING = 1 << 2;
        const SCOREBOARD = 1 << 3;
        const AIM = 1 << 4;
        const SPEC_CAM = 1 << 5;
    }
}

impl StatusFlags {
    /// The mode bits, exactly one of which is set on a derived value.
    pub const MODE: Self = Self::PLAYING.union(Self::IN_MENU).union(Self::CHATTING);

    pub fn is_playing(self) -> bool {
        self.contains(Self::PLAYING)
    }
}

/// One of the two simultaneously controlled actor slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActorSlot {
    #[default]
    Primary = 0,
    Shadow = 1,
}

impl ActorSlot {
    pub const ALL: [ActorSlot; 2] = [ActorSlot::Primary, ActorSlot::Shadow];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The slot not selected by `self`.
    pub fn other(self) -> Self {
        match self {
            ActorSlot::Primary => ActorSlot::Shadow,
            ActorSlot::Shadow => ActorSlot::Primary,
        }
    }
}

/// Movement direction derived from the two directional keys.
pub fn direction_from_keys(left: bool, right: bool) -> i32 {
    match (left, right) {
        (true, false) => -1,
        (false, true) => 1,
        _ => 0,
    }
}

/// Input for one actor for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionSnapshot {
    /// -1, 0 or 1.
    pub direction: i32,
    pub target_x: i32,
    pub target_y: i32,
    /// Level field, 0 or 1.
    pub jump: i32,
    /// Edge counter.
    pub fire: i32,
    /// Level field, 0 or 1.
    pub hook: i32,
    pub player_flags: StatusFlags,
    /// Requested weapon id + 1, 0 for no request.
    pub wanted_weapon: i32,
    /// Edge counter.
    pub next_weapon: i32,
    /// Edge counter.
    pub prev_weapon: i32,
}

impl ActionSnapshot {
    /// Sets the aim target, remapping `(0, 0)` to `(1, 0)` so the receiver
    /// can always derive a facing.
    pub fn set_target(&mut self, x: i32, y: i32) {
        self.target_x = x;
        self.target_y = y;
        if self.target_x == 0 && self.target_y == 0 {
            self.target_x = 1;
        }
    }

    /// Whether any action field differs; aim target and flags are ignored.
    pub fn actions_differ(&self, other: &Self) -> bool {
        self.direction != other.direction
            || self.jump != other.jump
            || self.fire != other.fire
            || self.hook != other.hook
            || self.wanted_weapon != other.wanted_weapon
            || self.next_weapon != other.next_weapon
            || self.prev_weapon != other.prev_weapon
    }

    /// Whether the actor is trying to move this tick.
    pub fn wants_motion(&self) -> bool {
        self.direction != 0 || self.jump != 0 || self.hook != 0
    }
}

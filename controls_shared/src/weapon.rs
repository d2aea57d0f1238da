//! Weapon ids as the protocol numbers them.

/// Number of weapon slots.
pub const NUM_WEAPONS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weapon {
    Hammer = 0,
    Gun = 1,
    Shotgun = 2,
    Grenade = 3,
    Laser = 4,
    Ninja = 5,
}

impl Weapon {
    pub const ALL: [Weapon; NUM_WEAPONS] = [
        Weapon::Hammer,
        Weapon::Gun,
        Weapon::Shotgun,
        Weapon::Grenade,
        Weapon::Laser,
        Weapon::Ninja,
    ];

    /// Maps a raw id from the server onto a slot, wrapping out-of-range ids
    /// and folding negatives onto the hammer.
    pub fn from_raw(id: i32) -> Self {
        let idx = (id % NUM_WEAPONS as i32).max(0) as usize;
        Self::ALL[idx]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Value for `ActionSnapshot::wanted_weapon`, where 0 means "no request".
    pub fn wanted_id(self) -> i32 {
        self as i32 + 1
    }

    /// Weapons that never run dry and so never trigger an out-of-ammo switch.
    pub fn is_self_sufficient(self) -> bool {
        matches!(self, Weapon::Hammer | Weapon::Ninja)
    }

    /// Weapons that require continuous input resubmission while moving.
    pub fn needs_continuous_input(self) -> bool {
        self == Weapon::Ninja
    }
}

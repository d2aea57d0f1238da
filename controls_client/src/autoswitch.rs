//! Weapon fallback when the held weapon runs dry.
//!
//! Ammo is only known for the weapon currently held (from the simulation
//! snapshot) or as a placeholder after a pickup. The placeholder can make
//! the scan pick a weapon that is actually empty; that approximation is
//! accepted.

use controls_shared::{
    config::WeaponConfig,
    input::{is_held, ActionSnapshot},
    weapon::{Weapon, NUM_WEAPONS},
};
use tracing::debug;

use crate::view::GameView;

/// Ammo recorded for a freshly picked up weapon whose count is unknown.
pub const PICKUP_AMMO_SENTINEL: i32 = 10;

/// Last known ammo per weapon slot, 0 meaning unknown or empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmmoTelemetry {
    counts: [i32; NUM_WEAPONS],
}

impl AmmoTelemetry {
    pub fn get(&self, weapon: Weapon) -> i32 {
        self.counts[weapon.index()]
    }

    pub fn set(&mut self, weapon: Weapon, ammo: i32) {
        self.counts[weapon.index()] = ammo;
    }

    pub fn record_pickup(&mut self, weapon: Weapon) {
        self.set(weapon, PICKUP_AMMO_SENTINEL);
    }

    pub fn clear(&mut self) {
        self.counts = [0; NUM_WEAPONS];
    }
}

/// Handles a weapon pickup notification from the server.
pub fn on_pickup(
    cfg: &WeaponConfig,
    input: &mut ActionSnapshot,
    ammo: &mut AmmoTelemetry,
    weapon: Weapon,
) {
    if cfg.autoswitch_on_pickup {
        input.wanted_weapon = weapon.wanted_id();
    }
    ammo.record_pickup(weapon);
}

/// Per-tick out-of-ammo check. Returns the weapon requested, if any.
pub fn update(
    cfg: &WeaponConfig,
    view: &GameView,
    input: &mut ActionSnapshot,
    ammo: &mut AmmoTelemetry,
) -> Option<Weapon> {
    if !cfg.autoswitch_out_of_ammo || view.unlimited_ammo {
        return None;
    }
    let character = view.local_character?;
    ammo.set(character.weapon, character.ammo);

    if character.ammo != 0 || !is_held(input.fire) || character.weapon.is_self_sufficient() {
        return None;
    }

    let fallback = fallback_weapon(ammo, character.weapon)?;
    input.wanted_weapon = fallback.wanted_id();
    debug!(from = ?character.weapon, to = ?fallback, "out of ammo, switching weapon");
    Some(fallback)
}

/// Highest weapon above the gun tier with known ammo, skipping `current`.
pub fn fallback_weapon(ammo: &AmmoTelemetry, current: Weapon) -> Option<Weapon> {
    [Weapon::Laser, Weapon::Grenade, Weapon::Shotgun]
        .into_iter()
        .filter(|&w| w != current)
        .find(|&w| ammo.get(w) > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::LocalCharacter;
    use controls_shared::math::Vec2;

    fn view_with(weapon: Weapon, ammo: i32) -> GameView {
        GameView {
            local_character: Some(LocalCharacter {
                pos: Vec2::ZERO,
                vel: Vec2::ZERO,
                weapon,
                ammo,
            }),
            ..GameView::default()
        }
    }

    fn enabled() -> WeaponConfig {
        WeaponConfig {
            autoswitch_on_pickup: true,
            autoswitch_out_of_ammo: true,
        }
    }

    #[test]
    fn pickup_requests_and_records_sentinel() {
        let mut input = ActionSnapshot::default();
        let mut ammo = AmmoTelemetry::default();
        on_pickup(&enabled(), &mut input, &mut ammo, Weapon::Grenade);
        assert_eq!(input.wanted_weapon, 4);
        assert_eq!(ammo.get(Weapon::Grenade), PICKUP_AMMO_SENTINEL);

        let mut input = ActionSnapshot::default();
        let cfg = WeaponConfig {
            autoswitch_on_pickup: false,
            ..enabled()
        };
        on_pickup(&cfg, &mut input, &mut ammo, Weapon::Laser);
        assert_eq!(input.wanted_weapon, 0);
        assert_eq!(ammo.get(Weapon::Laser), PICKUP_AMMO_SENTINEL);
    }

    #[test]
    fn empty_while_firing_picks_highest() {
        let mut ammo = AmmoTelemetry::default();
        ammo.set(Weapon::Shotgun, 3);
        ammo.set(Weapon::Laser, 2);
        let mut input = ActionSnapshot {
            fire: 1,
            ..ActionSnapshot::default()
        };
        let got = update(&enabled(), &view_with(Weapon::Grenade, 0), &mut input, &mut ammo);
        assert_eq!(got, Some(Weapon::Laser));
        assert_eq!(input.wanted_weapon, Weapon::Laser.wanted_id());
        assert_eq!(ammo.get(Weapon::Grenade), 0);
    }

    #[test]
    fn current_weapon_skipped() {
        let mut ammo = AmmoTelemetry::default();
        ammo.set(Weapon::Shotgun, 3);
        let mut input = ActionSnapshot {
            fire: 1,
            ..ActionSnapshot::default()
        };
        let got = update(&enabled(), &view_with(Weapon::Laser, 0), &mut input, &mut ammo);
        assert_eq!(got, Some(Weapon::Shotgun));
    }

    #[test]
    fn nothing_qualifies_leaves_request_unset() {
        let mut ammo = AmmoTelemetry::default();
        ammo.set(Weapon::Gun, 10);
        let mut input = ActionSnapshot {
            fire: 1,
            ..ActionSnapshot::default()
        };
        assert_eq!(update(&enabled(), &view_with(Weapon::Shotgun, 0), &mut input, &mut ammo), None);
        assert_eq!(input.wanted_weapon, 0);
    }

    #[test]
    fn no_switch_unless_firing_or_for_self_sufficient() {
        let mut ammo = AmmoTelemetry::default();
        ammo.set(Weapon::Laser, 5);
        let mut input = ActionSnapshot::default();
        assert_eq!(update(&enabled(), &view_with(Weapon::Grenade, 0), &mut input, &mut ammo), None);
        input.fire = 1;
        assert_eq!(update(&enabled(), &view_with(Weapon::Hammer, 0), &mut input, &mut ammo), None);
        assert_eq!(update(&enabled(), &view_with(Weapon::Ninja, 0), &mut input, &mut ammo), None);
    }

    #[test]
    fn unlimited_ammo_disables_tracking() {
        let mut ammo = AmmoTelemetry::default();
        let mut view = view_with(Weapon::Grenade, 7);
        view.unlimited_ammo = true;
        let mut input = ActionSnapshot::default();
        update(&enabled(), &view, &mut input, &mut ammo);
        assert_eq!(ammo.get(Weapon::Grenade), 0);
    }
}

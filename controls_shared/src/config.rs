//! Configuration system.
//!
//! Loads controls configuration from JSON strings/files. Every field has a
//! default, so a document only needs the options it changes.

use std::{path::Path, time::Duration};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Root configuration for the input core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub mouse: MouseConfig,
    pub dyncam: DyncamConfig,
    pub send: SendConfig,
    pub weapons: WeaponConfig,
    pub avoid: AvoidConfig,
    pub dummy: DummyConfig,
    /// Fixed tick rate of the client loop.
    pub tick_hz: u32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            mouse: MouseConfig::default(),
            dyncam: DyncamConfig::default(),
            send: SendConfig::default(),
            weapons: WeaponConfig::default(),
            avoid: AvoidConfig::default(),
            dummy: DummyConfig::default(),
            tick_hz: 50,
        }
    }
}

/// Pointer and joystick aiming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseConfig {
    /// Mouse sensitivity in percent.
    pub sens: u32,
    /// Joystick sensitivity in percent.
    pub controller_sens: u32,
    /// Joystick stick position sets the aim directly.
    pub controller_absolute: bool,
    pub min_distance: u32,
    pub max_distance: u32,
    /// Camera follow factor in percent, 0 disables following.
    pub follow_factor: u32,
    pub dead_zone: u32,
    /// 0 off, 1 clamp to the visible screen, 2 clamp to a square box.
    pub limit_to_screen: u8,
    /// Rescale the transmitted target to a 1000 unit radius.
    pub scale_distance: bool,
    /// Send the aim captured at the moment of fire/hook.
    pub sub_tick_aiming: bool,
}

impl Default for MouseConfig {
    fn default() -> Self {
        Self {
            sens: 200,
            controller_sens: 100,
            controller_absolute: false,
            min_distance: 0,
            max_distance: 400,
            follow_factor: 0,
            dead_zone: 0,
            limit_to_screen: 0,
            scale_distance: false,
            sub_tick_aiming: false,
        }
    }
}

/// Dynamic camera profile; replaces the mouse distances when enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DyncamConfig {
    pub enabled: bool,
    /// Sensitivity override in percent, 0 keeps the per-device value.
    pub sens: u32,
    pub min_distance: u32,
    pub max_distance: u32,
    pub follow_factor: u32,
    pub dead_zone: u32,
}

impl Default for DyncamConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sens: 0,
            min_distance: 0,
            max_distance: 1000,
            follow_factor: 60,
            dead_zone: 300,
        }
    }
}

/// Distances of whichever aiming profile is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimProfile {
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction, not percent.
    pub follow_factor: f32,
    pub dead_zone: f32,
}

impl ControlsConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parse config {}", path.display()))
    }

    /// The aiming profile selected by the dyncam switch.
    pub fn aim_profile(&self) -> AimProfile {
        if self.dyncam.enabled {
            AimProfile {
                min_distance: self.dyncam.min_distance as f32,
                max_distance: self.dyncam.max_distance as f32,
                follow_factor: self.dyncam.follow_factor as f32 / 100.0,
                dead_zone: self.dyncam.dead_zone as f32,
            }
        } else {
            AimProfile {
                min_distance: self.mouse.min_distance as f32,
                max_distance: self.mouse.max_distance as f32,
                follow_factor: self.mouse.follow_factor as f32 / 100.0,
                dead_zone: self.mouse.dead_zone as f32,
            }
        }
    }
}

/// Send-rate limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendConfig {
    /// Minimum send rate while playing, even without changes.
    pub min_rate_hz: u32,
    /// Heartbeat period while chatting or in a menu.
    pub heartbeat_ms: u64,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            min_rate_hz: 25,
            heartbeat_ms: 1000,
        }
    }
}

impl SendConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(1) / self.min_rate_hz.max(1)
    }

    pub fn heartbeat(&self) -> Duration {
        Duration::from_millis(self.heartbeat_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub autoswitch_on_pickup: bool,
    pub autoswitch_out_of_ammo: bool,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            autoswitch_on_pickup: true,
            autoswitch_out_of_ammo: false,
        }
    }
}

/// Hazard avoidance and hook assist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvoidConfig {
    pub enabled: bool,
    /// Requested delay between corrections; never effective below 500 ms.
    pub delay_ms: u64,
    pub lookahead_ticks: u32,
    /// Horizontal distance one tick of a held direction covers in a probe.
    pub probe_speed: f32,
    pub hook_assist: bool,
}

impl Default for AvoidConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delay_ms: 0,
            lookahead_ticks: 5,
            probe_speed: 10.0,
            hook_assist: false,
        }
    }
}

/// Shadow actor driving.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DummyConfig {
    /// Mirror the active actor's movement onto the other slot.
    pub copy_moves: bool,
    /// Drive jump/fire/hook of the other slot from the fixed values below.
    pub control: bool,
    pub jump: i32,
    pub fire: i32,
    pub hook: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ControlsConfig::from_json_str(
            r#"{ "mouse": { "max_distance": 600 }, "avoid": { "enabled": true } }"#,
        )
        .unwrap();
        assert_eq!(cfg.mouse.max_distance, 600);
        assert_eq!(cfg.mouse.sens, 200);
        assert!(cfg.avoid.enabled);
        assert_eq!(cfg.avoid.lookahead_ticks, 5);
        assert_eq!(cfg.send.min_rate_hz, 25);
    }

    #[test]
    fn profile_follows_dyncam_switch() {
        let mut cfg = ControlsConfig::default();
        assert_eq!(cfg.aim_profile().max_distance, 400.0);
        cfg.dyncam.enabled = true;
        let p = cfg.aim_profile();
        assert_eq!(p.max_distance, 1000.0);
        assert!((p.follow_factor - 0.6).abs() < 1e-6);
    }

    #[test]
    fn send_intervals() {
        let send = SendConfig::default();
        assert_eq!(send.min_interval(), Duration::from_millis(40));
        assert_eq!(send.heartbeat(), Duration::from_secs(1));
    }
}

//! `controls_client`
//!
//! Client-side input core:
//! - Edge-counted action snapshots for two actor slots
//! - Aim offset integration and clamping
//! - Send suppression (change, heartbeat, minimum rate)
//! - Predictive hazard avoidance and hook assist
//! - Out-of-ammo weapon fallback

pub mod aim;
pub mod autoswitch;
pub mod controls;
pub mod hazard;
pub mod send;
pub mod store;
pub mod view;

pub use controls::{Controls, KeyAction};

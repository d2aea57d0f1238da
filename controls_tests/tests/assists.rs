//! Hazard avoidance, hook assist and weapon autoswitch driven through full ticks.

use std::time::{Duration, Instant};

use controls_client::{view::GameView, Controls, KeyAction};
use controls_shared::{
    collision::TileHazardMap,
    config::ControlsConfig,
    math::Vec2,
    weapon::Weapon,
};
use controls_tests::{init_tracing, playing_view, tile_center, RecordingTransport};

// freeze strip at tiles 6 and 7
const COURSE: [&str; 1] = ["......ff........"];

fn course() -> anyhow::Result<TileHazardMap> {
    TileHazardMap::from_rows(&COURSE, 50)
}

fn avoiding(delay_ms: u64) -> ControlsConfig {
    let mut cfg = ControlsConfig::default();
    cfg.avoid.enabled = true;
    cfg.avoid.delay_ms = delay_ms;
    cfg
}

fn frozen_view() -> GameView {
    playing_view(tile_center(6, 0))
}

/// Ticks every 20 ms for `duration` with the right key held and returns the
/// instants at which a correction fired.
async fn corrections_over(
    controls: &mut Controls,
    view: &GameView,
    map: &TileHazardMap,
    duration: Duration,
) -> anyhow::Result<Vec<Instant>> {
    let mut transport = RecordingTransport::default();
    controls.on_key(KeyAction::Right, true, view);
    let t0 = Instant::now();
    let mut fired = Vec::new();
    let mut step = 0u32;
    loop {
        let now = t0 + Duration::from_millis(20) * step;
        if now - t0 >= duration {
            break;
        }
        let before = controls.avoidance().last_correction();
        controls.tick(now, view, map, &mut transport).await?;
        if controls.avoidance().last_correction() != before {
            fired.push(now);
        }
        step += 1;
    }
    Ok(fired)
}

#[tokio::test]
async fn corrections_respect_the_minimum_spacing() -> anyhow::Result<()> {
    init_tracing();
    let map = course()?;
    let mut controls = Controls::new(avoiding(0));
    let fired = corrections_over(&mut controls, &frozen_view(), &map, Duration::from_secs(2)).await?;

    assert_eq!(fired.len(), 4);
    for pair in fired.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(500));
    }
    Ok(())
}

#[tokio::test]
async fn configured_delay_above_the_floor_is_honoured() -> anyhow::Result<()> {
    init_tracing();
    let map = course()?;
    let mut controls = Controls::new(avoiding(800));
    let fired = corrections_over(&mut controls, &frozen_view(), &map, Duration::from_secs(2)).await?;

    assert_eq!(fired.len(), 3);
    for pair in fired.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(800));
    }
    Ok(())
}

#[tokio::test]
async fn correction_reaches_the_same_tick_record() -> anyhow::Result<()> {
    init_tracing();
    let map = course()?;
    let mut controls = Controls::new(avoiding(0));
    let view = frozen_view();
    let mut transport = RecordingTransport::default();

    controls.on_key(KeyAction::Right, true, &view);
    assert!(controls.tick(Instant::now(), &view, &map, &mut transport).await?);

    // standing still stays frozen, so stepping back left is the first way out
    assert_eq!(transport.sent[0].1.direction, -1);
    Ok(())
}

#[tokio::test]
async fn first_safe_candidate_wins() -> anyhow::Result<()> {
    init_tracing();
    let map = course()?;
    let mut controls = Controls::new(avoiding(0));
    let mut view = frozen_view();
    if let Some(ch) = view.local_character.as_mut() {
        // drifting right fast enough to leave the strip on its own
        ch.vel = Vec2::new(10.0, 0.0);
    }
    let mut transport = RecordingTransport::default();

    controls.on_key(KeyAction::Right, true, &view);
    controls.tick(Instant::now(), &view, &map, &mut transport).await?;

    assert_eq!(transport.sent[0].1.direction, 0);
    Ok(())
}

#[tokio::test]
async fn safe_ground_is_left_alone() -> anyhow::Result<()> {
    init_tracing();
    let map = course()?;
    let mut controls = Controls::new(avoiding(0));
    let view = playing_view(tile_center(2, 0));
    let mut transport = RecordingTransport::default();

    controls.on_key(KeyAction::Right, true, &view);
    controls.tick(Instant::now(), &view, &map, &mut transport).await?;

    assert_eq!(transport.sent[0].1.direction, 1);
    assert_eq!(controls.avoidance().last_correction(), None);
    Ok(())
}

#[tokio::test]
async fn hook_is_dropped_on_the_wire_only() -> anyhow::Result<()> {
    init_tracing();
    let map = course()?;
    let mut cfg = avoiding(0);
    cfg.avoid.hook_assist = true;
    let mut controls = Controls::new(cfg);
    let view = frozen_view();
    let mut transport = RecordingTransport::default();

    controls.on_key(KeyAction::Hook, true, &view);
    controls.tick(Instant::now(), &view, &map, &mut transport).await?;

    assert_eq!(transport.sent[0].1.hook, 0);
    assert_eq!(controls.input().hook, 1);
    Ok(())
}

fn out_of_ammo_cfg() -> ControlsConfig {
    let mut cfg = ControlsConfig::default();
    cfg.weapons.autoswitch_on_pickup = false;
    cfg.weapons.autoswitch_out_of_ammo = true;
    cfg
}

fn empty_gun_view() -> GameView {
    let mut view = playing_view(tile_center(2, 0));
    if let Some(ch) = view.local_character.as_mut() {
        ch.weapon = Weapon::Gun;
        ch.ammo = 0;
    }
    view
}

#[tokio::test]
async fn empty_weapon_switches_to_picked_up_one() -> anyhow::Result<()> {
    init_tracing();
    let map = course()?;
    let mut controls = Controls::new(out_of_ammo_cfg());
    let view = empty_gun_view();
    let mut transport = RecordingTransport::default();

    controls.on_weapon_pickup(Weapon::Grenade as i32);
    assert_eq!(controls.input().wanted_weapon, 0);

    controls.on_key(KeyAction::Fire, true, &view);
    controls.tick(Instant::now(), &view, &map, &mut transport).await?;

    assert_eq!(transport.sent[0].1.wanted_weapon, Weapon::Grenade.wanted_id());
    Ok(())
}

#[tokio::test]
async fn no_known_ammo_means_no_request() -> anyhow::Result<()> {
    init_tracing();
    let map = course()?;
    let mut controls = Controls::new(out_of_ammo_cfg());
    let view = empty_gun_view();
    let mut transport = RecordingTransport::default();

    controls.on_weapon_pickup(Weapon::Laser as i32);
    controls.on_player_death();
    controls.on_key(KeyAction::Fire, true, &view);
    controls.tick(Instant::now(), &view, &map, &mut transport).await?;

    assert_eq!(transport.sent[0].1.wanted_weapon, 0);
    Ok(())
}

#[test]
fn pickup_requests_the_new_weapon_by_default() {
    let mut controls = Controls::new(ControlsConfig::default());
    controls.on_weapon_pickup(Weapon::Shotgun as i32);
    assert_eq!(controls.input().wanted_weapon, Weapon::Shotgun.wanted_id());
}

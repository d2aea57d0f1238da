//! Scripted input client.
//!
//! Usage:
//!   cargo run -p controls_client -- [--addr 127.0.0.1:40000] [--config controls.json] [--ticks 250]
//!
//! Drives the controls component with a scripted player walking right across
//! a small course that has a freeze strip in the middle. Every record the
//! send policy lets through goes to `--addr` over UDP, or is only logged when
//! no address is given.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use controls_client::{
    aim::CursorKind,
    view::{GameView, LocalCharacter},
    Controls, KeyAction,
};
use controls_shared::prelude::*;
use tracing::info;

const COURSE: [&str; 3] = [
    "..............................",
    "..............ff..............",
    "##############################",
];

/// Walking speed of the scripted character in units per tick.
const WALK_SPEED: f32 = 6.0;

struct Args {
    addr: Option<SocketAddr>,
    config: Option<String>,
    ticks: u32,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut out = Args {
        addr: None,
        config: None,
        ticks: 250,
    };
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--addr" if i + 1 < args.len() => {
                out.addr = Some(args[i + 1].parse().context("parse --addr")?);
                i += 2;
            }
            "--config" if i + 1 < args.len() => {
                out.config = Some(args[i + 1].clone());
                i += 2;
            }
            "--ticks" if i + 1 < args.len() => {
                out.ticks = args[i + 1].parse().context("parse --ticks")?;
                i += 2;
            }
            _ => i += 1,
        }
    }
    Ok(out)
}

/// Transport that only logs what would have been sent.
struct LogTransport;

#[async_trait]
impl InputTransport for LogTransport {
    async fn send_input(&mut self, slot: ActorSlot, payload: Bytes) -> anyhow::Result<()> {
        let snap = ActionSnapshot::decode(&payload)?;
        info!(
            ?slot,
            direction = snap.direction,
            fire = snap.fire,
            jump = snap.jump,
            target_x = snap.target_x,
            target_y = snap.target_y,
            "would send"
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args()?;
    let cfg = match &args.config {
        Some(path) => ControlsConfig::load(path)?,
        None => {
            let mut cfg = ControlsConfig::default();
            cfg.avoid.enabled = true;
            cfg
        }
    };
    info!(tick_hz = cfg.tick_hz, avoid = cfg.avoid.enabled, "Starting client");

    let mut transport: Box<dyn InputTransport> = match args.addr {
        Some(peer) => {
            let bind = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
            let udp = UdpInputTransport::connect(bind, peer).await?;
            info!(peer = %udp.peer_addr(), "Sending input over UDP");
            Box::new(udp)
        }
        None => Box::new(LogTransport),
    };

    let map = TileHazardMap::from_rows(&COURSE, 50).context("build course")?;
    let tick_interval = Duration::from_secs(1) / cfg.tick_hz.max(1);
    let mut controls = Controls::new(cfg);

    let mut view = GameView {
        has_game_info: true,
        map_width: map.width() as u32,
        map_height: map.height() as u32,
        screen_size: Vec2::new(1600.0, 900.0),
        local_character: Some(LocalCharacter {
            pos: Vec2::new(TILE_SIZE * 1.5, TILE_SIZE * 1.5),
            vel: Vec2::ZERO,
            weapon: Weapon::Gun,
            ammo: 10,
        }),
        ..GameView::default()
    };

    controls.on_key(KeyAction::Right, true, &view);
    let mut sent = 0u32;
    let mut frozen_ticks = 0u32;

    for tick in 0..args.ticks {
        // a few motion events per tick, sweeping the aim in a circle
        let angle = tick as f32 * 0.05;
        for _ in 0..3 {
            let delta = Vec2::new(-angle.sin(), angle.cos()) * 4.0;
            controls.on_cursor_move(delta, CursorKind::Mouse, &view, None);
        }
        if tick % 25 == 0 {
            controls.on_key(KeyAction::Fire, true, &view);
        } else if tick % 25 == 2 {
            controls.on_key(KeyAction::Fire, false, &view);
        }

        if controls
            .tick(Instant::now(), &view, &map, transport.as_mut())
            .await?
        {
            sent += 1;
        }

        if let Some(ch) = view.local_character.as_mut() {
            if map.is_hazard(ch.pos) {
                frozen_ticks += 1;
            } else {
                ch.pos.x += controls.input().direction as f32 * WALK_SPEED;
            }
        }

        tokio::time::sleep(tick_interval).await;
    }

    info!(ticks = args.ticks, sent, frozen_ticks, "Session finished");
    Ok(())
}

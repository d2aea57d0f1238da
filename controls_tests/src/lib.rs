//! Fixtures shared by the integration tests.

use async_trait::async_trait;
use bytes::Bytes;
use controls_client::view::{GameView, LocalCharacter};
use controls_shared::{
    collision::TILE_SIZE,
    input::{ActionSnapshot, ActorSlot},
    math::Vec2,
    net::InputTransport,
    weapon::Weapon,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Transport that decodes and keeps everything handed to it.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub sent: Vec<(ActorSlot, ActionSnapshot)>,
}

#[async_trait]
impl InputTransport for RecordingTransport {
    async fn send_input(&mut self, slot: ActorSlot, payload: Bytes) -> anyhow::Result<()> {
        self.sent.push((slot, ActionSnapshot::decode(&payload)?));
        Ok(())
    }
}

/// Centre of tile (`x`, `y`).
pub fn tile_center(x: usize, y: usize) -> Vec2 {
    Vec2::new(
        x as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        y as f32 * TILE_SIZE + TILE_SIZE / 2.0,
    )
}

/// A playing view with the local character standing at `pos`.
pub fn playing_view(pos: Vec2) -> GameView {
    GameView {
        has_game_info: true,
        map_width: 16,
        map_height: 4,
        screen_size: Vec2::new(1600.0, 900.0),
        local_character: Some(LocalCharacter {
            pos,
            vel: Vec2::ZERO,
            weapon: Weapon::Gun,
            ammo: 10,
        }),
        ..GameView::default()
    }
}

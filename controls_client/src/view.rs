//! Read-only game state the input core consults each frame.
//!
//! Everything here is owned by collaborators (chat, menus, camera, the
//! simulation snapshot); the core copies what it needs per call.

use controls_shared::{input::StatusFlags, math::Vec2, weapon::Weapon};

/// Spectating state of the local client.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpectatorView {
    pub active: bool,
    /// Spectating without a followed player.
    pub free_view: bool,
    /// `position` is meaningful.
    pub use_position: bool,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub zoom: f32,
    /// Dyncam target offset minus the current camera offset.
    pub dyncam_offset_delta: Vec2,
    /// Camera is in the spectator camera type.
    pub spec_cam: bool,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            dyncam_offset_delta: Vec2::ZERO,
            spec_cam: false,
        }
    }
}

/// The locally controlled character from the latest simulation snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalCharacter {
    pub pos: Vec2,
    /// World units per tick.
    pub vel: Vec2,
    pub weapon: Weapon,
    pub ammo: i32,
}

/// Per-frame context handed to the controls component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameView {
    pub has_game_info: bool,
    pub paused: bool,
    pub chat_active: bool,
    pub menu_active: bool,
    pub scoreboard_active: bool,
    /// Spectator target selection menu is open.
    pub spectator_menu_active: bool,
    pub spectator: SpectatorView,
    pub camera: CameraView,
    pub local_character: Option<LocalCharacter>,
    pub unlimited_ammo: bool,
    /// Server runs the legacy race input handling.
    pub ddrace_input_compat: bool,
    /// Server accepts the decorator player flags.
    pub server_player_flags: bool,
    /// Map size in tiles.
    pub map_width: u32,
    pub map_height: u32,
    /// Visible world extent at zoom 1.
    pub screen_size: Vec2,
}

impl GameView {
    /// Spectating without following anyone.
    pub fn is_free_view(&self) -> bool {
        self.spectator.active && self.spectator.free_view
    }

    pub fn local_pos(&self) -> Vec2 {
        self.local_character.map(|c| c.pos).unwrap_or_default()
    }

    /// Derives the status flags for the outgoing snapshot.
    pub fn status_flags(&self, show_hook_coll: bool) -> StatusFlags {
        let mut flags = if self.chat_active {
            StatusFlags::CHATTING
        } else if self.menu_active {
            StatusFlags::IN_MENU
        } else {
            StatusFlags::PLAYING
        };
        if self.scoreboard_active {
            flags |= StatusFlags::SCOREBOARD;
        }
        if self.server_player_flags && show_hook_coll {
            flags |= StatusFlags::AIM;
        }
        if self.server_player_flags && self.camera.spec_cam {
            flags |= StatusFlags::SPEC_CAM;
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_wins_over_menu() {
        let view = GameView {
            chat_active: true,
            menu_active: true,
            scoreboard_active: true,
            ..GameView::default()
        };
        let flags = view.status_flags(false);
        assert_eq!(flags, StatusFlags::CHATTING | StatusFlags::SCOREBOARD);
        assert!(!flags.is_playing());
    }

    #[test]
    fn decorators_need_server_support() {
        let mut view = GameView::default();
        view.camera.spec_cam = true;
        assert_eq!(view.status_flags(true), StatusFlags::PLAYING);
        view.server_player_flags = true;
        assert_eq!(
            view.status_flags(true),
            StatusFlags::PLAYING | StatusFlags::AIM | StatusFlags::SPEC_CAM
        );
    }
}

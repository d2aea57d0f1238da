//! Aim offset integration.
//!
//! Each actor keeps a persistent offset from its character that raw motion
//! events move around. Motion can arrive many times between two ticks; the
//! next tick reads whatever the offset is by then.

use controls_shared::{
    collision::TILE_SIZE,
    config::ControlsConfig,
    input::ActorSlot,
    math::Vec2,
};

use crate::view::GameView;

/// Camera distance the follow factor is expressed against.
pub const CAMERA_MAX_DISTANCE: f32 = 200.0;

/// Offsets shorter than this are treated as having no direction.
const MIN_OFFSET_LENGTH: f32 = 0.001;

/// Free-view aim may leave the map by this many tiles on every side.
const FREE_VIEW_MARGIN_TILES: f32 = 201.0;

/// Canonical distance the transmitted target is rescaled to.
const SCALED_TARGET_DISTANCE: f32 = 1000.0;

/// Source of a relative motion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKind {
    Mouse,
    Joystick,
}

impl TryFrom<u8> for CursorKind {
    type Error = anyhow::Error;

    fn try_from(raw: u8) -> anyhow::Result<Self> {
        match raw {
            0 => Ok(CursorKind::Mouse),
            1 => Ok(CursorKind::Joystick),
            other => anyhow::bail!("unknown cursor kind {other}"),
        }
    }
}

/// A device that can report an absolute, normalized stick direction.
pub trait AbsoluteStick {
    fn absolute(&self) -> Option<Vec2>;
}

/// Smallest allowed aim radius for the active profile.
pub fn min_distance(cfg: &ControlsConfig) -> f32 {
    cfg.aim_profile().min_distance
}

/// Largest allowed aim radius for the active profile.
pub fn max_distance(cfg: &ControlsConfig) -> f32 {
    let p = cfg.aim_profile();
    let follow = if p.follow_factor != 0.0 {
        CAMERA_MAX_DISTANCE / p.follow_factor + p.dead_zone
    } else {
        p.max_distance
    };
    follow.min(p.max_distance)
}

/// Sensitivity factor for a motion source.
pub fn sensitivity(cfg: &ControlsConfig, kind: CursorKind) -> f32 {
    if cfg.dyncam.enabled && cfg.dyncam.sens != 0 {
        return cfg.dyncam.sens as f32 / 100.0;
    }
    match kind {
        CursorKind::Mouse => cfg.mouse.sens as f32 / 100.0,
        CursorKind::Joystick => cfg.mouse.controller_sens as f32 / 100.0,
    }
}

#[derive(Debug, Clone, Default)]
pub struct AimController {
    offset: [Vec2; 2],
    offset_on_action: [Vec2; 2],
    target_pos: [Vec2; 2],
}

impl AimController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self, slot: ActorSlot) -> Vec2 {
        self.offset[slot.index()]
    }

    pub fn set_offset(&mut self, slot: ActorSlot, offset: Vec2) {
        self.offset[slot.index()] = offset;
    }

    /// World position the actor aims at, refreshed by [`Self::update_target_pos`].
    pub fn target_pos(&self, slot: ActorSlot) -> Vec2 {
        self.target_pos[slot.index()]
    }

    /// Applies one motion event. Returns whether the event was consumed.
    pub fn apply_motion(
        &mut self,
        slot: ActorSlot,
        delta: Vec2,
        kind: CursorKind,
        cfg: &ControlsConfig,
        view: &GameView,
        stick: Option<&dyn AbsoluteStick>,
    ) -> bool {
        if view.has_game_info && view.paused {
            return false;
        }

        if kind == CursorKind::Joystick
            && cfg.mouse.controller_absolute
            && view.has_game_info
            && !view.spectator.active
        {
            if let Some(dir) = stick.and_then(|s| s.absolute()) {
                self.offset[slot.index()] = dir * max_distance(cfg);
            }
            return true;
        }

        let mut factor = sensitivity(cfg, kind);
        if view.is_free_view() {
            factor *= view.camera.zoom;
        }

        self.offset[slot.index()] += delta * factor;
        self.clamp(slot, cfg, view);
        true
    }

    /// Brings the offset back into its valid region.
    pub fn clamp(&mut self, slot: ActorSlot, cfg: &ControlsConfig, view: &GameView) {
        let pos = &mut self.offset[slot.index()];

        if view.is_free_view() {
            let margin = FREE_VIEW_MARGIN_TILES * TILE_SIZE;
            pos.x = pos.x.clamp(
                -margin,
                (view.map_width as f32 + FREE_VIEW_MARGIN_TILES) * TILE_SIZE,
            );
            pos.y = pos.y.clamp(
                -margin,
                (view.map_height as f32 + FREE_VIEW_MARGIN_TILES) * TILE_SIZE,
            );
            return;
        }

        let max = max_distance(cfg);
        let min = min_distance(cfg).min(max);

        let mut len = pos.length();
        if len < MIN_OFFSET_LENGTH {
            *pos = Vec2::new(MIN_OFFSET_LENGTH, 0.0);
            len = MIN_OFFSET_LENGTH;
        }
        if len < min {
            *pos = pos.normalize_pre_length(len) * min;
        }
        len = pos.length();
        if len > max {
            *pos = pos.normalize_pre_length(len) * max;
        }

        if cfg.mouse.limit_to_screen != 0 {
            let half_height = view.screen_size.y / 2.0;
            let half_width = if cfg.mouse.limit_to_screen == 2 {
                half_height
            } else {
                view.screen_size.x / 2.0
            };
            pos.y = pos.y.clamp(-half_height, half_height);
            pos.x = pos.x.clamp(-half_width, half_width);
        }
    }

    /// Remembers the offset at the moment of a fire/hook press.
    pub fn capture_action_moment(&mut self, slot: ActorSlot) {
        self.offset_on_action[slot.index()] = self.offset[slot.index()];
    }

    /// Takes the captured action-moment offset, if any.
    pub fn take_action_moment(&mut self, slot: ActorSlot) -> Option<Vec2> {
        let captured = std::mem::take(&mut self.offset_on_action[slot.index()]);
        (!captured.is_zero()).then_some(captured)
    }

    /// Target coordinates for the outgoing snapshot.
    ///
    /// With `use_action_moment` a captured fire/hook offset wins once.
    pub fn transmit_target(
        &mut self,
        slot: ActorSlot,
        cfg: &ControlsConfig,
        view: &GameView,
        use_action_moment: bool,
    ) -> (i32, i32) {
        let mut pos = if use_action_moment {
            self.take_action_moment(slot)
                .unwrap_or(self.offset[slot.index()])
        } else {
            self.offset[slot.index()]
        };

        if cfg.mouse.scale_distance && !view.spectator.active {
            let max = cfg.aim_profile().max_distance;
            // angle binds use tiny or huge distances; leave those alone
            if max > 5.0 && max < SCALED_TARGET_DISTANCE {
                pos *= SCALED_TARGET_DISTANCE / max;
            }
        }

        (pos.x as i32, pos.y as i32)
    }

    /// Recomputes the world-space aim point, compensating for dyncam lag.
    pub fn update_target_pos(&mut self, slot: ActorSlot, view: &GameView) {
        let offset = self.offset[slot.index()];
        self.target_pos[slot.index()] = if view.has_game_info && !view.spectator.active {
            let delta = view.camera.dyncam_offset_delta;
            view.local_pos() + offset - delta + delta / view.camera.zoom
        } else if view.spectator.active && view.spectator.use_position {
            view.spectator.position + offset
        } else {
            offset
        };
    }
}

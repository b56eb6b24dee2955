//! Assembled/scattered cross-fade.
//!
//! A single progress value per scene eases toward 0 (tree) or 1 (cloud). Every
//! particle's rendered pose is derived from its static assembled pose, its live
//! physics position and that progress value.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::color;
use crate::config::BlendConfig;
use crate::instance::Pose;
use crate::particle::{Particle, Role};

/// Which shape the user asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphState {
    #[default]
    Assembled,
    Scattered,
}

impl MorphState {
    pub fn toggled(self) -> Self {
        match self {
            MorphState::Assembled => MorphState::Scattered,
            MorphState::Scattered => MorphState::Assembled,
        }
    }

    /// Progress value this state eases toward.
    pub fn target(self) -> f32 {
        match self {
            MorphState::Assembled => 0.0,
            MorphState::Scattered => 1.0,
        }
    }
}

/// Scene-wide blend progress.
#[derive(Clone, Debug)]
pub struct Morph {
    state: MorphState,
    progress: f32,
    config: BlendConfig,
}

impl Morph {
    pub fn new(config: BlendConfig) -> Self {
        Self {
            state: MorphState::Assembled,
            progress: 0.0,
            config,
        }
    }

    pub fn state(&self) -> MorphState {
        self.state
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn config(&self) -> &BlendConfig {
        &self.config
    }

    pub fn set_state(&mut self, state: MorphState) {
        if state != self.state {
            log::info!("Morph target changed: {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    pub fn toggle(&mut self) {
        self.set_state(self.state.toggled());
    }

    /// Pin progress to a value, bypassing the ease. Clamped to `[0, 1]`.
    pub fn set_progress(&mut self, progress: f32) {
        self.progress = progress.clamp(0.0, 1.0);
    }

    /// Ease progress toward the current target.
    ///
    /// The step fraction is clamped so a long frame lands on the target
    /// instead of overshooting it.
    pub fn advance(&mut self, dt: f32) -> f32 {
        let target = self.state.target();
        let alpha = (dt * self.config.rate).clamp(0.0, 1.0);
        self.progress = (self.progress + (target - self.progress) * alpha).clamp(0.0, 1.0);
        self.progress
    }

    /// Whether scattered-mode physics should run this frame.
    pub fn is_active(&self) -> bool {
        self.progress > self.config.activation_threshold
    }

    /// Snapshot the per-frame blend inputs.
    pub fn frame(&self, time: f32) -> BlendFrame {
        BlendFrame {
            progress: self.progress,
            scattered: self.state == MorphState::Scattered,
            physics_active: self.is_active(),
            time,
        }
    }
}

/// Per-frame inputs shared by every particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendFrame {
    pub progress: f32,
    /// The user has asked for the scattered shape.
    pub scattered: bool,
    /// Physics ran this frame, so live positions are meaningful.
    pub physics_active: bool,
    /// Elapsed scene time in seconds, for twinkle.
    pub time: f32,
}

/// Rendered pose of one particle.
pub fn blend_particle(particle: &Particle, frame: &BlendFrame, config: &BlendConfig) -> Pose {
    let t = frame.progress;
    let is_accent = particle.role == Role::Accent;

    let target = if frame.physics_active {
        particle.physics.position
    } else {
        particle.assembled_position
    };
    let position = particle.assembled_position.lerp(target, t);

    let euler = if is_accent && frame.scattered {
        particle.scatter_rotation
    } else {
        particle.assembled_rotation.lerp(particle.scatter_rotation, t)
    };
    let rotation = Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z);

    let scale = if is_accent {
        let s = particle.base_scale;
        s + (s * config.accent_scale - s) * t
    } else {
        particle.base_scale
    };

    Pose {
        position,
        rotation,
        scale,
        color: blend_color(particle, frame, config),
    }
}

fn blend_color(particle: &Particle, frame: &BlendFrame, config: &BlendConfig) -> Vec3 {
    let mut color = particle.assembled_color;

    if !frame.scattered {
        let twinkle = (frame.time * particle.twinkle_speed + particle.twinkle_phase).sin();
        let amplitude = match particle.role {
            Role::Foliage => config.foliage_twinkle,
            Role::Accent => config.accent_twinkle,
        };
        color = color::offset_hsl(color, 0.0, 0.0, amplitude * twinkle);
    }

    if let Some(accent) = particle.scatter_accent_color {
        if particle.role == Role::Accent {
            color = color.lerp(accent, frame.progress);
        }
    }

    color
}

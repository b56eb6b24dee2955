//! Scene configuration.
//!
//! Every knob of the simulation lives here with a default that reproduces the
//! reference look. Configurations can be loaded from JSON; missing fields fall
//! back to their defaults.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// Tree silhouette dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Total tree height in world units.
    pub height: f32,
    /// Canopy radius at the base of the tree.
    pub base_radius: f32,
    /// Outer radius of the scatter shell for non-accent groups.
    pub scatter_radius: f32,
    /// Fraction of the height above which foliage is trimmed to leave room for the star.
    pub canopy_trim: f32,
    /// Inner/outer radius of the scatter shell used by accent particles.
    pub accent_scatter_shell: [f32; 2],
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            height: 11.0,
            base_radius: 4.5,
            scatter_radius: 25.0,
            canopy_trim: 0.92,
            accent_scatter_shell: [5.0, 20.0],
        }
    }
}

impl TreeConfig {
    /// Shell bounds `[min, max]` for non-accent groups.
    pub fn scatter_shell(&self) -> [f32; 2] {
        [self.scatter_radius * 0.5, self.scatter_radius]
    }

    /// Highest y a trimmed (foliage-like) particle may occupy.
    pub fn canopy_ceiling(&self) -> f32 {
        self.height * self.canopy_trim
    }
}

/// Particle counts per group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleCounts {
    pub foliage: usize,
    pub cube_accents: usize,
    pub ribbon: usize,
    pub garland: usize,
    pub ornaments: usize,
    /// Split between hearts (floor half) and dots (remainder).
    pub accents: usize,
}

impl Default for ParticleCounts {
    fn default() -> Self {
        Self {
            foliage: 7500,
            cube_accents: 1000,
            ribbon: 2000,
            garland: 1500,
            ornaments: 350,
            accents: 2000,
        }
    }
}

impl ParticleCounts {
    /// Number of heart particles.
    pub fn hearts(&self) -> usize {
        self.accents / 2
    }

    /// Number of dot particles.
    pub fn dots(&self) -> usize {
        self.accents - self.hearts()
    }

    pub fn total(&self) -> usize {
        self.foliage + self.cube_accents + self.ribbon + self.garland + self.ornaments + self.accents
    }
}

/// Scattered-mode physics constants.
///
/// Damping is applied once per frame and integration is scaled to a 60 fps
/// baseline, so both are frame-rate dependent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub spring_strength: f32,
    pub repulsion_strength: f32,
    pub repulsion_radius: f32,
    /// Floor on the distance used for the inverse-square falloff.
    pub min_repulsion_distance: f32,
    /// Per-frame velocity multiplier.
    pub damping: f32,
    /// Upward drift for accent particles.
    pub float_speed: f32,
    /// Accent particles above this height wrap to `wrap_floor`.
    pub wrap_ceiling: f32,
    pub wrap_floor: f32,
    /// Frame rate the integration step is normalized to.
    pub baseline_fps: f32,
    /// Pointer (NDC) to interaction point scale, x and y.
    pub pointer_scale: [f32; 2],
    /// Depth of the interaction point.
    pub pointer_depth: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            spring_strength: 0.005,
            repulsion_strength: 15.0,
            repulsion_radius: 6.0,
            min_repulsion_distance: 0.1,
            damping: 0.96,
            float_speed: 0.1,
            wrap_ceiling: 15.0,
            wrap_floor: -5.0,
            baseline_fps: 60.0,
            pointer_scale: [20.0, 10.0],
            pointer_depth: 5.0,
        }
    }
}

/// Assembled/scattered blend constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    /// Exponential ease rate (per second).
    pub rate: f32,
    /// Physics runs only while progress is above this value.
    pub activation_threshold: f32,
    /// Accent scale multiplier when fully scattered.
    pub accent_scale: f32,
    pub foliage_twinkle: f32,
    pub accent_twinkle: f32,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            rate: 2.5,
            activation_threshold: 0.01,
            accent_scale: 3.5,
            foliage_twinkle: 0.05,
            accent_twinkle: 0.15,
        }
    }
}

/// Top-level scene configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for particle generation.
    pub seed: u64,
    pub tree: TreeConfig,
    pub counts: ParticleCounts,
    pub physics: PhysicsConfig,
    pub blend: BlendConfig,
    /// Whether the accent (hearts and dots) groups start enabled.
    pub accents_enabled: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: 0x5DEECE66D,
            tree: TreeConfig::default(),
            counts: ParticleCounts::default(),
            physics: PhysicsConfig::default(),
            blend: BlendConfig::default(),
            accents_enabled: true,
        }
    }
}

impl SceneConfig {
    /// Parse a configuration from JSON text and validate it.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: SceneConfig =
            serde_json::from_str(text).context("Failed to parse scene configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&text)
    }

    /// Reject configurations the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        let tree = &self.tree;
        ensure!(tree.height > 0.0, "tree.height must be positive");
        ensure!(tree.base_radius > 0.0, "tree.base_radius must be positive");
        ensure!(tree.scatter_radius > 0.0, "tree.scatter_radius must be positive");
        ensure!(
            tree.canopy_trim > 0.0 && tree.canopy_trim <= 1.0,
            "tree.canopy_trim must be in (0, 1]"
        );
        let [inner, outer] = tree.accent_scatter_shell;
        ensure!(
            inner >= 0.0 && inner <= outer,
            "tree.accent_scatter_shell must satisfy 0 <= inner <= outer"
        );

        let physics = &self.physics;
        ensure!(
            physics.damping > 0.0 && physics.damping <= 1.0,
            "physics.damping must be in (0, 1]"
        );
        ensure!(physics.repulsion_radius >= 0.0, "physics.repulsion_radius must be non-negative");
        ensure!(
            physics.min_repulsion_distance > 0.0,
            "physics.min_repulsion_distance must be positive"
        );
        ensure!(
            physics.wrap_floor < physics.wrap_ceiling,
            "physics.wrap_floor must be below physics.wrap_ceiling"
        );
        ensure!(physics.baseline_fps > 0.0, "physics.baseline_fps must be positive");

        let blend = &self.blend;
        ensure!(blend.rate > 0.0, "blend.rate must be positive");
        ensure!(
            (0.0..1.0).contains(&blend.activation_threshold),
            "blend.activation_threshold must be in [0, 1)"
        );
        Ok(())
    }
}

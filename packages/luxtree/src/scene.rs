//! The morphing tree scene.
//!
//! Owns every particle group, the morph progress, the crown star and the slow
//! spin of the whole tree. One call to [`TreeScene::update`] runs a complete
//! simulation step: ease progress, advance physics, blend poses and write the
//! instance buffers.

use glam::{Mat4, Quat, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::blend::{self, BlendFrame, Morph, MorphState};
use crate::config::{BlendConfig, PhysicsConfig, SceneConfig};
use crate::generator;
use crate::geometry::{GeometryDesc, MaterialDesc};
use crate::input::FrameInput;
use crate::particle::{ParticleGroup, ParticleKind};
use crate::perf_profiling::{self, BufferStats};
use crate::physics;

/// Vertical offset of the tree group in the world.
const ROOT_OFFSET: Vec3 = Vec3::new(0.0, -5.0, 0.0);
/// Scene spin in radians per second of elapsed time.
const ROOT_SPIN_RATE: f32 = 0.1;

/// The star on top of the tree.
#[derive(Clone, Debug, PartialEq)]
pub struct CrownStar {
    pub position: Vec3,
    /// Accumulated yaw in radians.
    pub yaw: f32,
    pub scale: f32,
}

impl CrownStar {
    const BOB_HEIGHT: f32 = 0.5;
    const BOB_AMPLITUDE: f32 = 0.1;
    const SPIN_RATE: f32 = 0.5;

    fn new(tree_height: f32) -> Self {
        Self {
            position: Vec3::new(0.0, tree_height, 0.0),
            yaw: 0.0,
            scale: 0.7,
        }
    }

    fn update(&mut self, tree_height: f32, elapsed: f32, dt: f32) {
        self.position.y = tree_height + Self::BOB_HEIGHT + elapsed.sin() * Self::BOB_AMPLITUDE;
        self.yaw += dt * Self::SPIN_RATE;
    }

    pub fn geometry(&self) -> GeometryDesc {
        GeometryDesc::star()
    }

    pub fn material(&self) -> MaterialDesc {
        MaterialDesc::star()
    }

    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_rotation_y(self.yaw),
            self.position,
        )
    }
}

/// Aggregate numbers for reporting.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneSummary {
    pub frame: u64,
    pub elapsed: f32,
    pub state: MorphState,
    pub progress: f32,
    pub accents_enabled: bool,
    pub total_particles: usize,
    /// Mean distance between live scatter positions and their homes.
    pub mean_home_offset: f32,
}

pub struct TreeScene {
    config: SceneConfig,
    groups: Vec<ParticleGroup>,
    morph: Morph,
    star: CrownStar,
    accents_enabled: bool,
    elapsed: f32,
    frame: u64,
    last_stats: Option<BufferStats>,
}

impl TreeScene {
    /// Generate every group from the configured seed and attach instance buffers.
    pub fn new(config: SceneConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let counts = &config.counts;

        let groups: Vec<ParticleGroup> = ParticleKind::ALL
            .into_iter()
            .map(|kind| {
                let count = match kind {
                    ParticleKind::Foliage => counts.foliage,
                    ParticleKind::CubeAccent => counts.cube_accents,
                    ParticleKind::Ribbon => counts.ribbon,
                    ParticleKind::Garland => counts.garland,
                    ParticleKind::Ornament => counts.ornaments,
                    ParticleKind::Heart => counts.hearts(),
                    ParticleKind::Dot => counts.dots(),
                };
                let particles = generator::generate(kind, count, &config.tree, &mut rng);
                let mut group = ParticleGroup::new(kind, particles);
                group.attach_buffer();
                group.visible = !kind.is_accent() || config.accents_enabled;
                group
            })
            .collect();

        log::info!(
            "Built tree scene: {} particles in {} groups (seed {})",
            counts.total(),
            groups.len(),
            config.seed
        );
        for group in &groups {
            log::debug!("  {}: {}", group.kind.name(), group.len());
        }
        perf_profiling::reset_frame_counter();

        Self {
            morph: Morph::new(config.blend.clone()),
            star: CrownStar::new(config.tree.height),
            accents_enabled: config.accents_enabled,
            config,
            groups,
            elapsed: 0.0,
            frame: 0,
            last_stats: None,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn groups(&self) -> &[ParticleGroup] {
        &self.groups
    }

    pub fn group(&self, kind: ParticleKind) -> Option<&ParticleGroup> {
        self.groups.iter().find(|g| g.kind == kind)
    }

    pub fn group_mut(&mut self, kind: ParticleKind) -> Option<&mut ParticleGroup> {
        self.groups.iter_mut().find(|g| g.kind == kind)
    }

    pub fn morph(&self) -> &Morph {
        &self.morph
    }

    /// Direct access to the blend progress, for hosts that drive it themselves.
    pub fn morph_mut(&mut self) -> &mut Morph {
        &mut self.morph
    }

    pub fn star(&self) -> &CrownStar {
        &self.star
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn accents_enabled(&self) -> bool {
        self.accents_enabled
    }

    /// Show or hide the accent lights. Hidden groups keep their state but are not updated.
    pub fn set_accents_enabled(&mut self, enabled: bool) {
        if enabled == self.accents_enabled {
            return;
        }
        log::info!("Accent particles {}", if enabled { "enabled" } else { "disabled" });
        self.accents_enabled = enabled;
        for group in self.groups.iter_mut().filter(|g| g.kind.is_accent()) {
            group.visible = enabled;
        }
    }

    /// World transform of the tree group: lowered and slowly spinning.
    pub fn root_transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(
            Quat::from_rotation_y(self.elapsed * ROOT_SPIN_RATE),
            ROOT_OFFSET,
        )
    }

    /// Run one simulation step.
    pub fn update(&mut self, input: &FrameInput) {
        self.frame += 1;
        self.elapsed = input.elapsed;

        self.morph.set_state(input.state);
        self.morph.advance(input.dt);
        let frame = self.morph.frame(input.elapsed);
        let point = physics::interaction_point(input.pointer, &self.config.physics);

        let accents_enabled = self.accents_enabled;
        let physics_config = &self.config.physics;
        let blend_config = self.morph.config();
        for group in &mut self.groups {
            if group.kind.is_accent() && !accents_enabled {
                continue;
            }
            crate::perf_time!(
                group.kind.name(),
                update_group(group, &frame, point, input.dt, physics_config, blend_config)
            );
        }

        self.star.update(self.config.tree.height, input.elapsed, input.dt);

        if perf_profiling::should_log_stats() {
            self.log_stats();
        }
    }

    fn log_stats(&mut self) {
        let stats = BufferStats {
            groups: self
                .groups
                .iter()
                .map(|g| (g.kind.name(), g.len(), g.buffer().map_or(0, |b| b.capacity())))
                .collect(),
            active_particles: self
                .groups
                .iter()
                .filter(|g| g.visible)
                .map(|g| g.len())
                .sum(),
        };
        stats.log(self.frame);
        if let Some(warning) = self.last_stats.as_ref().and_then(|prev| stats.check_growth(prev)) {
            log::warn!("{}", warning);
        }
        self.last_stats = Some(stats);
    }

    /// Totals over the visible groups only.
    pub fn summary(&self) -> SceneSummary {
        let (offset_sum, count) = self
            .groups
            .iter()
            .filter(|g| g.visible)
            .flat_map(|g| g.particles())
            .fold((0.0_f64, 0_usize), |(sum, n), p| {
                (sum + p.physics.position.distance(p.scatter_home) as f64, n + 1)
            });
        SceneSummary {
            frame: self.frame,
            elapsed: self.elapsed,
            state: self.morph.state(),
            progress: self.morph.progress(),
            accents_enabled: self.accents_enabled,
            total_particles: count,
            mean_home_offset: if count == 0 {
                0.0
            } else {
                (offset_sum / count as f64) as f32
            },
        }
    }
}

/// Physics, blend and instance write for one group.
///
/// A group without an instance buffer is skipped entirely.
fn update_group(
    group: &mut ParticleGroup,
    frame: &BlendFrame,
    point: Vec3,
    dt: f32,
    physics_config: &PhysicsConfig,
    blend_config: &BlendConfig,
) {
    let (particles, buffer) = group.parts_mut();
    let Some(buffer) = buffer else {
        return;
    };

    let mut resets = 0usize;
    for (index, particle) in particles.iter_mut().enumerate() {
        if frame.physics_active {
            let home = particle.scatter_home;
            let role = particle.role;
            if !physics::step(&mut particle.physics, home, role, point, dt, physics_config) {
                resets += 1;
            }
        }
        let pose = blend::blend_particle(particle, frame, blend_config);
        buffer.write(index, &pose);
    }
    buffer.mark_dirty();

    if resets > 0 {
        log::warn!("{}: reset {} particles with non-finite physics state", group.kind.name(), resets);
    }
}

//! Particle records and the groups that own them.
//!
//! A group is a fixed-size arena of particles sharing one geometry, one
//! material and one instance buffer. Static fields are written once by the
//! generator; only the physics state changes after construction.

use glam::Vec3;

use crate::geometry::{GeometryDesc, MaterialDesc};
use crate::instance::InstanceBuffer;

/// Behavioral role of a particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Part of the tree body: subtle twinkle, fixed scale.
    Foliage,
    /// Hidden light: drifts upward, grows and recolors when scattered.
    Accent,
}

/// Placement category; one per group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    /// Volumetric needle fill.
    Foliage,
    /// Small cubes on the outer canopy shell.
    CubeAccent,
    /// Broad red spiral.
    Ribbon,
    /// Thin gold counter-spiral.
    Garland,
    /// Baubles on the canopy surface.
    Ornament,
    /// Hidden lights rendered as hollow hearts.
    Heart,
    /// Hidden lights rendered as dots.
    Dot,
}

impl ParticleKind {
    /// Update and draw order.
    pub const ALL: [ParticleKind; 7] = [
        ParticleKind::Foliage,
        ParticleKind::CubeAccent,
        ParticleKind::Ribbon,
        ParticleKind::Garland,
        ParticleKind::Ornament,
        ParticleKind::Heart,
        ParticleKind::Dot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ParticleKind::Foliage => "foliage",
            ParticleKind::CubeAccent => "cube_accents",
            ParticleKind::Ribbon => "ribbon",
            ParticleKind::Garland => "garland",
            ParticleKind::Ornament => "ornaments",
            ParticleKind::Heart => "hearts",
            ParticleKind::Dot => "dots",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn role(self) -> Role {
        match self {
            ParticleKind::Heart | ParticleKind::Dot => Role::Accent,
            _ => Role::Foliage,
        }
    }

    /// Hidden accent lights, switchable as a whole.
    pub fn is_accent(self) -> bool {
        self.role() == Role::Accent
    }

    /// Categories trimmed below the crown and oriented outward from the trunk.
    pub fn is_foliage_like(self) -> bool {
        matches!(self, ParticleKind::Foliage | ParticleKind::CubeAccent)
    }

    pub fn geometry(self) -> GeometryDesc {
        match self {
            ParticleKind::Foliage | ParticleKind::Ribbon | ParticleKind::Garland => {
                GeometryDesc::leaf()
            }
            ParticleKind::CubeAccent => GeometryDesc::cube_leaf(),
            ParticleKind::Ornament => GeometryDesc::ornament(),
            ParticleKind::Heart => GeometryDesc::heart(),
            ParticleKind::Dot => GeometryDesc::dot(),
        }
    }

    pub fn material(self) -> MaterialDesc {
        match self {
            ParticleKind::Foliage => MaterialDesc::foliage(),
            ParticleKind::CubeAccent => MaterialDesc::cube_leaf(),
            ParticleKind::Ribbon => MaterialDesc::ribbon(),
            ParticleKind::Garland => MaterialDesc::garland(),
            ParticleKind::Ornament => MaterialDesc::ornament(),
            ParticleKind::Heart | ParticleKind::Dot => MaterialDesc::accent(),
        }
    }
}

/// Live scattered-mode state, advanced only by the physics integrator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsState {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// One particle slot.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Position in the tree shape.
    pub assembled_position: Vec3,
    /// Euler angles (XYZ, radians) in the tree shape.
    pub assembled_rotation: Vec3,
    pub base_scale: f32,
    /// Linear RGB.
    pub assembled_color: Vec3,
    /// Spring target in the scattered cloud.
    pub scatter_home: Vec3,
    /// Euler angles (XYZ, radians) in the scattered cloud.
    pub scatter_rotation: Vec3,
    /// Color blended toward while scattering (accents only).
    pub scatter_accent_color: Option<Vec3>,
    pub twinkle_phase: f32,
    pub twinkle_speed: f32,
    pub role: Role,
    pub physics: PhysicsState,
}

/// A named, fixed-size collection of particles drawn with one instanced call.
#[derive(Clone, Debug)]
pub struct ParticleGroup {
    pub kind: ParticleKind,
    pub geometry: GeometryDesc,
    pub material: MaterialDesc,
    /// Whether the group is drawn this frame.
    pub visible: bool,
    particles: Vec<Particle>,
    buffer: Option<InstanceBuffer>,
}

impl ParticleGroup {
    /// Wrap generated particles. The group starts without an instance buffer.
    pub fn new(kind: ParticleKind, particles: Vec<Particle>) -> Self {
        Self {
            kind,
            geometry: kind.geometry(),
            material: kind.material(),
            visible: true,
            particles,
            buffer: None,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Attach an instance buffer sized to the group.
    pub fn attach_buffer(&mut self) {
        self.buffer = Some(InstanceBuffer::new(self.particles.len(), true));
    }

    pub fn detach_buffer(&mut self) -> Option<InstanceBuffer> {
        self.buffer.take()
    }

    pub fn buffer(&self) -> Option<&InstanceBuffer> {
        self.buffer.as_ref()
    }

    pub fn buffer_mut(&mut self) -> Option<&mut InstanceBuffer> {
        self.buffer.as_mut()
    }

    /// Split borrow for the per-frame pass: particles and buffer together.
    pub(crate) fn parts_mut(&mut self) -> (&mut [Particle], Option<&mut InstanceBuffer>) {
        (&mut self.particles, self.buffer.as_mut())
    }
}

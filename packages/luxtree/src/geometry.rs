//! Static geometry and material descriptors for each particle group.
//!
//! The renderer builds GPU meshes from these; the simulation never reads them.
//! Extruded shapes carry their 2D outlines so the renderer can triangulate
//! them without knowing how they were authored.

use glam::{Vec2, Vec3};

use crate::color;

/// Segments used when flattening each cubic curve of an outline.
const CURVE_SEGMENTS: usize = 12;

/// Bevel applied to an extruded outline.
#[derive(Clone, Debug, PartialEq)]
pub struct Bevel {
    pub thickness: f32,
    pub size: f32,
    pub segments: u32,
}

/// Shape of the mesh shared by every instance of a group.
#[derive(Clone, Debug, PartialEq)]
pub enum GeometryDesc {
    Cone {
        radius: f32,
        height: f32,
        radial_segments: u32,
    },
    Cuboid {
        size: f32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    /// A flat outline extruded along +Z and centered on its bounding box.
    Extrusion {
        outline: Vec<Vec2>,
        holes: Vec<Vec<Vec2>>,
        depth: f32,
        bevel: Option<Bevel>,
        /// Rotation about X applied after centering.
        rotate_x: f32,
    },
}

impl GeometryDesc {
    /// Three-sided cone used for needles, ribbon and garland.
    pub fn leaf() -> Self {
        GeometryDesc::Cone {
            radius: 0.12,
            height: 0.4,
            radial_segments: 3,
        }
    }

    pub fn cube_leaf() -> Self {
        GeometryDesc::Cuboid { size: 0.12 }
    }

    pub fn ornament() -> Self {
        GeometryDesc::Sphere {
            radius: 0.2,
            width_segments: 16,
            height_segments: 16,
        }
    }

    pub fn dot() -> Self {
        GeometryDesc::Sphere {
            radius: 0.08,
            width_segments: 8,
            height_segments: 8,
        }
    }

    /// Hollow heart outline, flipped to face the camera.
    pub fn heart() -> Self {
        GeometryDesc::Extrusion {
            outline: heart_outline(1.0, 0.0),
            holes: vec![heart_outline(0.75, 0.15)],
            depth: 0.1,
            bevel: None,
            rotate_x: std::f32::consts::PI,
        }
    }

    /// Five-point crown star.
    pub fn star() -> Self {
        GeometryDesc::Extrusion {
            outline: star_outline(5, 1.0, 0.45),
            holes: Vec::new(),
            depth: 0.3,
            bevel: Some(Bevel {
                thickness: 0.1,
                size: 0.05,
                segments: 3,
            }),
            rotate_x: 0.0,
        }
    }
}

/// Surface parameters for a group's shared material.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialDesc {
    /// Base color; `None` lets instance colors drive the surface alone.
    pub color: Option<Vec3>,
    pub roughness: f32,
    pub metalness: f32,
    pub emissive: Vec3,
    pub emissive_intensity: f32,
    pub tone_mapped: bool,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            color: None,
            roughness: 1.0,
            metalness: 0.0,
            emissive: Vec3::ZERO,
            emissive_intensity: 1.0,
            tone_mapped: true,
        }
    }
}

impl MaterialDesc {
    pub fn foliage() -> Self {
        Self {
            color: Some(color::from_hex(0x064e3b)),
            roughness: 0.7,
            metalness: 0.1,
            ..Default::default()
        }
    }

    pub fn cube_leaf() -> Self {
        Self {
            color: Some(color::from_hex(0x0f766e)),
            roughness: 0.6,
            metalness: 0.2,
            ..Default::default()
        }
    }

    pub fn ribbon() -> Self {
        Self {
            color: Some(color::from_hex(0x990000)),
            roughness: 0.3,
            metalness: 0.6,
            emissive: color::from_hex(0x330000),
            ..Default::default()
        }
    }

    pub fn garland() -> Self {
        Self {
            color: Some(color::from_hex(0xFFD700)),
            roughness: 0.1,
            metalness: 1.0,
            emissive: color::from_hex(0xFFD700),
            emissive_intensity: 0.4,
            ..Default::default()
        }
    }

    pub fn ornament() -> Self {
        Self {
            roughness: 0.2,
            metalness: 0.9,
            ..Default::default()
        }
    }

    /// Self-lit material for hearts and dots; skips tone mapping so it blooms.
    pub fn accent() -> Self {
        Self {
            roughness: 0.1,
            metalness: 0.8,
            emissive: Vec3::ONE,
            emissive_intensity: 1.5,
            tone_mapped: false,
            ..Default::default()
        }
    }

    pub fn star() -> Self {
        let gold = color::from_hex(0xFDB813);
        Self {
            color: Some(gold),
            roughness: 0.1,
            metalness: 1.0,
            emissive: gold,
            emissive_intensity: 2.0,
            ..Default::default()
        }
    }
}

/// Alternating outer/inner vertices of a star, first point straight down.
pub fn star_outline(points: usize, outer_radius: f32, inner_radius: f32) -> Vec<Vec2> {
    let angle_offset = -std::f32::consts::FRAC_PI_2;
    (0..points * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer_radius } else { inner_radius };
            let angle = (i as f32 / points as f32) * std::f32::consts::PI + angle_offset;
            Vec2::new(angle.cos() * radius, angle.sin() * radius)
        })
        .collect()
}

/// Heart made of four cubic curves, scaled by `s` and raised by `lift`.
///
/// The curve starts and ends at the bottom tip `(0, lift)`.
pub fn heart_outline(s: f32, lift: f32) -> Vec<Vec2> {
    let p = |x: f32, y: f32| Vec2::new(x * s, y * s + lift);
    let tip = Vec2::new(0.0, lift);
    let curves = [
        [tip, tip, p(-0.6, 0.4), p(-0.6, 0.7)],
        [p(-0.6, 0.7), p(-0.6, 1.1), p(-0.2, 1.3), p(0.0, 1.0)],
        [p(0.0, 1.0), p(0.2, 1.3), p(0.6, 1.1), p(0.6, 0.7)],
        [p(0.6, 0.7), p(0.6, 0.4), tip, tip],
    ];

    let mut points = Vec::with_capacity(curves.len() * CURVE_SEGMENTS + 1);
    points.push(tip);
    for [p0, p1, p2, p3] in curves {
        for step in 1..=CURVE_SEGMENTS {
            let t = step as f32 / CURVE_SEGMENTS as f32;
            points.push(cubic_bezier(p0, p1, p2, p3, t));
        }
    }
    points
}

fn cubic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

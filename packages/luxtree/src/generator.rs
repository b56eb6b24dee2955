//! Particle generation.
//!
//! Builds the static data of every particle in a group: where it sits in the
//! tree, how it is oriented and colored there, and where its spring anchor lies
//! in the scattered cloud. Generation only reads its random source, so the same
//! seed always produces the same group.

use std::f32::consts::{FRAC_PI_4, PI, TAU};

use glam::Vec3;
use rand::Rng;

use crate::color;
use crate::config::TreeConfig;
use crate::particle::{Particle, ParticleKind, PhysicsState};

const RIBBON_TURNS: f32 = 2.5;
const RIBBON_OFFSET: f32 = 0.2;
const GARLAND_TURNS: f32 = 4.0;
const GARLAND_OFFSET: f32 = 0.1;
/// Cube accents stay in the outer 15% of the canopy radius.
const SURFACE_SHELL: f32 = 0.85;
/// Hidden accents stay in the inner 80% of the canopy radius.
const HIDDEN_FILL: f32 = 0.8;
/// Half-width of the initial random velocity per axis.
const INITIAL_JITTER: f32 = 0.05;

const RIBBON_RED: u32 = 0x990000;
const GOLD: u32 = 0xFFD700;
const ORNAMENT_RED: u32 = 0xD00000;
const WARM_WHITE: u32 = 0xFFF7E6;
const ACCENT_PALETTE: [u32; 5] = [0xF0ABFC, 0xD946EF, 0x8B5CF6, 0xA855F7, 0xEC4899];

/// Generate `count` particles of one category.
pub fn generate<R: Rng + ?Sized>(
    kind: ParticleKind,
    count: usize,
    tree: &TreeConfig,
    rng: &mut R,
) -> Vec<Particle> {
    (0..count).map(|_| generate_one(kind, tree, rng)).collect()
}

fn generate_one<R: Rng + ?Sized>(kind: ParticleKind, tree: &TreeConfig, rng: &mut R) -> Particle {
    let height_fraction: f32 = rng.gen();
    let y = height_fraction * tree.height;
    let radius = (1.0 - height_fraction) * tree.base_radius;
    let angle = rng.gen::<f32>() * TAU;

    let placement = place(kind, tree, rng, height_fraction, y, radius, angle);

    let shell = if kind.is_accent() {
        tree.accent_scatter_shell
    } else {
        tree.scatter_shell()
    };
    let scatter_home = scatter_point(rng, shell[0], shell[1], scatter_center(tree));

    let velocity = Vec3::new(
        rng.gen_range(-INITIAL_JITTER..INITIAL_JITTER),
        rng.gen_range(-INITIAL_JITTER..INITIAL_JITTER),
        rng.gen_range(-INITIAL_JITTER..INITIAL_JITTER),
    );

    let assembled_rotation = if kind.is_foliage_like() {
        // Tilt up/out and face along the trunk tangent.
        Vec3::new(-FRAC_PI_4 + rng.gen::<f32>() * 0.2, angle, 0.0)
    } else {
        random_euler(rng)
    };
    let scatter_rotation = random_euler(rng);

    Particle {
        assembled_position: placement.position,
        assembled_rotation,
        base_scale: placement.scale,
        assembled_color: placement.color,
        scatter_home,
        scatter_rotation,
        scatter_accent_color: placement.accent_color,
        twinkle_phase: rng.gen::<f32>() * TAU,
        twinkle_speed: 0.5 + rng.gen::<f32>() * 2.0,
        role: kind.role(),
        physics: PhysicsState {
            position: scatter_home,
            velocity,
        },
    }
}

/// Assembled position, scale and colors for one particle.
struct Placement {
    position: Vec3,
    scale: f32,
    color: Vec3,
    accent_color: Option<Vec3>,
}

fn place<R: Rng + ?Sized>(
    kind: ParticleKind,
    tree: &TreeConfig,
    rng: &mut R,
    height_fraction: f32,
    y: f32,
    radius: f32,
    angle: f32,
) -> Placement {
    let on_circle = |a: f32, r: f32, y: f32| Vec3::new(a.cos() * r, y, a.sin() * r);
    let trimmed_y = y.min(tree.canopy_ceiling());

    match kind {
        ParticleKind::Foliage => {
            let offset = rng.gen::<f32>() * radius;
            Placement {
                position: on_circle(angle, offset, trimmed_y),
                color: color::from_hsl(
                    0.38 + rng.gen::<f32>() * 0.05,
                    0.8,
                    0.15 + rng.gen::<f32>() * 0.2,
                ),
                scale: 0.5 + rng.gen::<f32>() * 0.8,
                accent_color: None,
            }
        }
        ParticleKind::CubeAccent => {
            let offset = radius * (SURFACE_SHELL + rng.gen::<f32>() * (1.0 - SURFACE_SHELL));
            Placement {
                position: on_circle(angle, offset, trimmed_y),
                color: color::from_hsl(
                    0.42 + rng.gen::<f32>() * 0.05,
                    0.7,
                    0.25 + rng.gen::<f32>() * 0.15,
                ),
                scale: 0.5 + rng.gen::<f32>() * 0.4,
                accent_color: None,
            }
        }
        ParticleKind::Ribbon => {
            let spiral = height_fraction * TAU * RIBBON_TURNS;
            Placement {
                position: on_circle(spiral, radius + RIBBON_OFFSET, y),
                color: color::from_hex(RIBBON_RED),
                scale: 0.8,
                accent_color: None,
            }
        }
        ParticleKind::Garland => {
            let spiral = -height_fraction * TAU * GARLAND_TURNS + PI;
            Placement {
                position: on_circle(spiral, radius + GARLAND_OFFSET, y),
                color: color::from_hex(GOLD),
                scale: 0.4,
                accent_color: None,
            }
        }
        ParticleKind::Ornament => {
            let hex = if rng.gen::<f32>() > 0.6 { GOLD } else { ORNAMENT_RED };
            Placement {
                position: on_circle(angle, radius, y),
                color: color::from_hex(hex),
                scale: 0.8 + rng.gen::<f32>() * 0.5,
                accent_color: None,
            }
        }
        ParticleKind::Heart | ParticleKind::Dot => {
            let offset = rng.gen::<f32>() * radius * HIDDEN_FILL;
            let pick = ACCENT_PALETTE[rng.gen_range(0..ACCENT_PALETTE.len())];
            Placement {
                position: on_circle(angle, offset, y),
                color: color::from_hex(WARM_WHITE),
                scale: if kind == ParticleKind::Heart { 0.3 } else { 0.2 },
                accent_color: Some(color::from_hex(pick)),
            }
        }
    }
}

/// Center of the scatter shells: halfway up the trunk.
pub fn scatter_center(tree: &TreeConfig) -> Vec3 {
    Vec3::new(0.0, tree.height / 2.0, 0.0)
}

/// Random point in a spherical shell around `center`.
///
/// Direction is uniform on the sphere; the radius uses a cube-root spread so
/// the cloud does not clump near the inner wall.
pub fn scatter_point<R: Rng + ?Sized>(rng: &mut R, min_radius: f32, max_radius: f32, center: Vec3) -> Vec3 {
    let theta = TAU * rng.gen::<f32>();
    let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    let r = min_radius + rng.gen::<f32>().cbrt() * (max_radius - min_radius);

    center
        + Vec3::new(
            r * phi.sin() * theta.cos(),
            r * phi.sin() * theta.sin(),
            r * phi.cos(),
        )
}

fn random_euler<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(
        rng.gen::<f32>() * PI,
        rng.gen::<f32>() * PI,
        rng.gen::<f32>() * PI,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Role;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tree() -> TreeConfig {
        TreeConfig::default()
    }

    fn horizontal_radius(p: Vec3) -> f32 {
        (p.x * p.x + p.z * p.z).sqrt()
    }

    /// Canopy radius at the particle's (untrimmed) height, with a small margin.
    fn canopy_radius_at(y: f32, tree: &TreeConfig) -> f32 {
        (1.0 - y / tree.height) * tree.base_radius + 1e-4
    }

    #[test]
    fn test_foliage_is_trimmed_below_crown() {
        let tree = tree();
        let mut rng = StdRng::seed_from_u64(1);
        for kind in [ParticleKind::Foliage, ParticleKind::CubeAccent] {
            for p in generate(kind, 2000, &tree, &mut rng) {
                assert!(p.assembled_position.y >= 0.0);
                assert!(p.assembled_position.y <= tree.canopy_ceiling());
            }
        }
    }

    #[test]
    fn test_foliage_fills_canopy_volume() {
        let tree = tree();
        let mut rng = StdRng::seed_from_u64(2);
        let particles = generate(ParticleKind::Foliage, 500, &tree, &mut rng);
        let inner = particles
            .iter()
            .filter(|p| horizontal_radius(p.assembled_position) < 1.0)
            .count();
        assert!(inner > 0, "volumetric fill should reach the trunk");
        for p in &particles {
            assert_eq!(p.role, Role::Foliage);
            assert!(p.scatter_accent_color.is_none());
            assert!(p.base_scale >= 0.5 && p.base_scale < 1.3);
        }
    }

    #[test]
    fn test_cube_accents_hug_the_surface() {
        let tree = tree();
        let mut rng = StdRng::seed_from_u64(3);
        for p in generate(ParticleKind::CubeAccent, 500, &tree, &mut rng) {
            let r = horizontal_radius(p.assembled_position);
            // Untrimmed particles: compare against the shell at their own height.
            if p.assembled_position.y < tree.canopy_ceiling() {
                let outer = canopy_radius_at(p.assembled_position.y, &tree);
                assert!(r <= outer);
                assert!(r >= outer * SURFACE_SHELL - 1e-3);
            }
        }
    }

    #[test]
    fn test_ribbon_and_garland_follow_spirals() {
        let tree = tree();
        let mut rng = StdRng::seed_from_u64(4);
        for p in generate(ParticleKind::Ribbon, 200, &tree, &mut rng) {
            let expected = canopy_radius_at(p.assembled_position.y, &tree) + RIBBON_OFFSET;
            assert!((horizontal_radius(p.assembled_position) - expected).abs() < 1e-3);
            assert_eq!(p.assembled_color, color::from_hex(RIBBON_RED));
            assert_eq!(p.base_scale, 0.8);
        }
        for p in generate(ParticleKind::Garland, 200, &tree, &mut rng) {
            let expected = canopy_radius_at(p.assembled_position.y, &tree) + GARLAND_OFFSET;
            assert!((horizontal_radius(p.assembled_position) - expected).abs() < 1e-3);
            assert_eq!(p.assembled_color, color::from_hex(GOLD));
        }
    }

    #[test]
    fn test_garland_at_base_starts_opposite_ribbon() {
        // At height fraction 0 the garland angle is pi: the point sits on -X.
        let tree = tree();
        let mut rng = StdRng::seed_from_u64(5);
        let near_base = generate(ParticleKind::Garland, 2000, &tree, &mut rng)
            .into_iter()
            .filter(|p| p.assembled_position.y < 0.01)
            .collect::<Vec<_>>();
        for p in near_base {
            assert!(p.assembled_position.x < 0.0);
        }
    }

    #[test]
    fn test_ornament_palette_split() {
        let tree = tree();
        let mut rng = StdRng::seed_from_u64(6);
        let particles = generate(ParticleKind::Ornament, 2000, &tree, &mut rng);
        let gold = particles
            .iter()
            .filter(|p| p.assembled_color == color::from_hex(GOLD))
            .count();
        let red = particles
            .iter()
            .filter(|p| p.assembled_color == color::from_hex(ORNAMENT_RED))
            .count();
        assert_eq!(gold + red, particles.len());
        let gold_share = gold as f32 / particles.len() as f32;
        assert!((gold_share - 0.4).abs() < 0.05, "gold share {}", gold_share);
    }

    #[test]
    fn test_hidden_accents() {
        let tree = tree();
        let mut rng = StdRng::seed_from_u64(7);
        let palette: Vec<Vec3> = ACCENT_PALETTE.iter().map(|&h| color::from_hex(h)).collect();
        let center = scatter_center(&tree);
        for p in generate(ParticleKind::Heart, 300, &tree, &mut rng) {
            assert_eq!(p.role, Role::Accent);
            assert_eq!(p.base_scale, 0.3);
            assert_eq!(p.assembled_color, color::from_hex(WARM_WHITE));
            let accent = p.scatter_accent_color.expect("accents carry a scatter color");
            assert!(palette.contains(&accent));

            let r = horizontal_radius(p.assembled_position);
            assert!(r <= canopy_radius_at(p.assembled_position.y, &tree) * HIDDEN_FILL + 1e-3);

            let d = p.scatter_home.distance(center);
            assert!(d >= 5.0 - 1e-3 && d <= 20.0 + 1e-3);
        }
        for p in generate(ParticleKind::Dot, 10, &tree, &mut rng) {
            assert_eq!(p.base_scale, 0.2);
        }
    }

    #[test]
    fn test_seeded_foliage_group_of_ten() {
        let tree = tree();
        let mut rng = StdRng::seed_from_u64(42);
        let particles = generate(ParticleKind::Foliage, 10, &tree, &mut rng);
        assert_eq!(particles.len(), 10);

        let [min, max] = tree.scatter_shell();
        let center = scatter_center(&tree);
        for p in &particles {
            assert!(p.assembled_position.y >= 0.0 && p.assembled_position.y <= tree.height);
            let d = p.scatter_home.distance(center);
            assert!(d >= min - 1e-3 && d <= max + 1e-3, "distance {}", d);
            assert_eq!(p.physics.position, p.scatter_home);
            assert!(p.physics.velocity.abs().max_element() <= INITIAL_JITTER);
        }
    }

    #[test]
    fn test_same_seed_same_group() {
        let tree = tree();
        let a = generate(ParticleKind::Ornament, 50, &tree, &mut StdRng::seed_from_u64(9));
        let b = generate(ParticleKind::Ornament, 50, &tree, &mut StdRng::seed_from_u64(9));
        let c = generate(ParticleKind::Ornament, 50, &tree, &mut StdRng::seed_from_u64(10));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_foliage_faces_trunk_tangent() {
        let tree = tree();
        let mut rng = StdRng::seed_from_u64(11);
        for p in generate(ParticleKind::Foliage, 100, &tree, &mut rng) {
            let rot = p.assembled_rotation;
            assert!(rot.x >= -FRAC_PI_4 && rot.x <= -FRAC_PI_4 + 0.2);
            assert_eq!(rot.z, 0.0);
            // Yaw matches the placement angle.
            let pos = p.assembled_position;
            if horizontal_radius(pos) > 1e-3 {
                let angle = pos.z.atan2(pos.x).rem_euclid(TAU);
                assert!((angle - rot.y).abs() < 1e-3 || (angle - rot.y).abs() > TAU - 1e-3);
            }
        }
    }

    #[test]
    fn test_scatter_point_respects_degenerate_shell() {
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..100 {
            let p = scatter_point(&mut rng, 3.0, 3.0, Vec3::ZERO);
            assert!((p.length() - 3.0).abs() < 1e-4);
        }
    }
}

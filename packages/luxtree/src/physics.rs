//! Scattered-mode physics.
//!
//! Each particle is pulled back to its home by a spring and pushed away from
//! the interaction point by an inverse-square force. Accent particles also
//! drift upward and wrap from the top of the scene back to the bottom.
//! Particles never interact with each other.

use glam::{Vec2, Vec3};

use crate::config::PhysicsConfig;
use crate::particle::{PhysicsState, Role};

/// Below this distance the push direction is undefined and the push is skipped.
const DIRECTION_EPSILON: f32 = 1e-6;

/// Map a pointer in normalized device coordinates to the interaction point.
pub fn interaction_point(pointer: Vec2, config: &PhysicsConfig) -> Vec3 {
    Vec3::new(
        pointer.x * config.pointer_scale[0],
        pointer.y * config.pointer_scale[1],
        config.pointer_depth,
    )
}

/// Velocity change from the interaction point for a particle at `position`.
pub fn repulsion(position: Vec3, point: Vec3, config: &PhysicsConfig) -> Vec3 {
    let offset = position - point;
    let distance = offset.length();
    if distance >= config.repulsion_radius || distance < DIRECTION_EPSILON {
        return Vec3::ZERO;
    }
    let falloff = distance.max(config.min_repulsion_distance);
    (offset / distance) * (config.repulsion_strength / (falloff * falloff))
}

/// Advance one particle by one frame.
///
/// Returns `false` when the step produced a non-finite state; the particle is
/// then snapped back to `home` at rest.
pub fn step(
    state: &mut PhysicsState,
    home: Vec3,
    role: Role,
    point: Vec3,
    dt: f32,
    config: &PhysicsConfig,
) -> bool {
    let mut velocity = state.velocity;
    let mut position = state.position;

    velocity += (home - position) * config.spring_strength;
    velocity += repulsion(position, point, config);

    if role == Role::Accent {
        velocity.y += config.float_speed * dt * 0.1;
        if position.y > config.wrap_ceiling {
            position.y = config.wrap_floor;
            velocity.y = 0.0;
        }
    }

    velocity *= config.damping;
    position += velocity * (dt * config.baseline_fps);

    if position.is_finite() && velocity.is_finite() {
        state.position = position;
        state.velocity = velocity;
        true
    } else {
        log::debug!("Non-finite physics state at dt={:.4}, resetting particle to home", dt);
        state.position = home;
        state.velocity = Vec3::ZERO;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    fn at_rest(position: Vec3) -> PhysicsState {
        PhysicsState {
            position,
            velocity: Vec3::ZERO,
        }
    }

    /// A point far from everything, so repulsion never applies.
    const FAR: Vec3 = Vec3::new(1000.0, 1000.0, 1000.0);

    #[test]
    fn test_interaction_point_projection() {
        let p = interaction_point(Vec2::new(0.5, -1.0), &config());
        assert_eq!(p, Vec3::new(10.0, -10.0, 5.0));
    }

    #[test]
    fn test_spring_pulls_toward_home() {
        let cfg = config();
        let home = Vec3::new(10.0, 0.0, 0.0);
        let mut state = at_rest(Vec3::ZERO);
        assert!(step(&mut state, home, Role::Foliage, FAR, 1.0 / 60.0, &cfg));

        // velocity = 10 * 0.005 * 0.96, one baseline step.
        assert!((state.velocity.x - 0.048).abs() < 1e-6);
        assert!((state.position.x - 0.048).abs() < 1e-5);
    }

    #[test]
    fn test_spring_settles_at_home() {
        let cfg = config();
        let home = Vec3::new(3.0, -2.0, 7.0);
        let mut state = at_rest(Vec3::ZERO);
        for _ in 0..5000 {
            step(&mut state, home, Role::Foliage, FAR, 1.0 / 60.0, &cfg);
        }
        assert!(state.position.distance(home) < 1e-2);
    }

    #[test]
    fn test_repulsion_pushes_away() {
        let cfg = config();
        let point = Vec3::ZERO;
        let push = repulsion(Vec3::new(2.0, 0.0, 0.0), point, &cfg);
        // 15 / 2^2 along +X.
        assert!((push - Vec3::new(3.75, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_repulsion_outside_radius_is_zero() {
        let cfg = config();
        assert_eq!(repulsion(Vec3::new(6.5, 0.0, 0.0), Vec3::ZERO, &cfg), Vec3::ZERO);
    }

    #[test]
    fn test_repulsion_at_zero_distance_is_skipped() {
        let cfg = config();
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(repulsion(p, p, &cfg), Vec3::ZERO);

        let mut state = at_rest(p);
        assert!(step(&mut state, p, Role::Foliage, p, 1.0 / 60.0, &cfg));
        assert_eq!(state.position, p);
    }

    #[test]
    fn test_repulsion_is_clamped_near_point() {
        let cfg = config();
        let push = repulsion(Vec3::new(1e-4, 0.0, 0.0), Vec3::ZERO, &cfg);
        let cap = cfg.repulsion_strength / (cfg.min_repulsion_distance * cfg.min_repulsion_distance);
        assert!((push.length() - cap).abs() < 1e-2);
    }

    #[test]
    fn test_accent_drifts_up_and_wraps() {
        let cfg = config();
        let dt = 1.0 / 60.0;

        let mut state = at_rest(Vec3::ZERO);
        step(&mut state, Vec3::ZERO, Role::Accent, FAR, dt, &cfg);
        assert!(state.velocity.y > 0.0);

        let mut foliage = at_rest(Vec3::ZERO);
        step(&mut foliage, Vec3::ZERO, Role::Foliage, FAR, dt, &cfg);
        assert_eq!(foliage.velocity, Vec3::ZERO);

        let mut high = PhysicsState {
            position: Vec3::new(0.0, 15.5, 0.0),
            velocity: Vec3::new(0.0, 1.0, 0.0),
        };
        step(&mut high, Vec3::new(0.0, 15.5, 0.0), Role::Accent, FAR, dt, &cfg);
        assert!(high.position.y < -4.0, "wrapped to {}", high.position.y);

        // Foliage is never wrapped.
        let mut tall = at_rest(Vec3::new(0.0, 20.0, 0.0));
        step(&mut tall, Vec3::new(0.0, 20.0, 0.0), Role::Foliage, FAR, dt, &cfg);
        assert!(tall.position.y > 15.0);
    }

    #[test]
    fn test_zero_dt_does_not_move() {
        let cfg = config();
        let mut state = PhysicsState {
            position: Vec3::new(1.0, 1.0, 1.0),
            velocity: Vec3::new(5.0, 5.0, 5.0),
        };
        step(&mut state, Vec3::ZERO, Role::Accent, Vec3::ZERO, 0.0, &cfg);
        assert_eq!(state.position, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_stays_finite_across_delta_range() {
        let cfg = config();
        let point = interaction_point(Vec2::new(0.1, 0.3), &cfg);
        for i in 0..=10 {
            let dt = i as f32 * 0.01;
            for role in [Role::Foliage, Role::Accent] {
                let mut state = at_rest(point);
                let home = Vec3::new(4.0, 8.0, -12.0);
                for _ in 0..2000 {
                    step(&mut state, home, role, point, dt, &cfg);
                    assert!(state.position.is_finite(), "dt={} position", dt);
                    assert!(state.velocity.is_finite(), "dt={} velocity", dt);
                }
            }
        }
    }

    #[test]
    fn test_non_finite_state_resets_to_home() {
        let cfg = config();
        let home = Vec3::new(1.0, 2.0, 3.0);
        let mut state = PhysicsState {
            position: Vec3::splat(f32::MAX),
            velocity: Vec3::splat(f32::MAX),
        };
        assert!(!step(&mut state, home, Role::Foliage, FAR, 0.1, &cfg));
        assert_eq!(state.position, home);
        assert_eq!(state.velocity, Vec3::ZERO);
    }
}

//! Morphing particle tree.
//!
//! Thousands of instanced particles form a tree and scatter into a
//! spring-driven cloud that flees the pointer. The crate owns the simulation
//! and writes per-instance transforms and colors; rendering is left to the
//! host.

pub mod blend;
pub mod cli;
pub mod color;
pub mod config;
pub mod generator;
pub mod geometry;
pub mod input;
pub mod instance;
pub mod particle;
pub mod perf_profiling;
pub mod physics;
pub mod scene;

pub use blend::{Morph, MorphState};
pub use config::SceneConfig;
pub use input::FrameInput;
pub use particle::{Particle, ParticleGroup, ParticleKind, Role};
pub use scene::TreeScene;

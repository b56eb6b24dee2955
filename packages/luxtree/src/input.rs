//! Frame inputs and recorded input scripts.
//!
//! The frame driver hands the scene a [`FrameInput`] once per display refresh.
//! For headless runs, an [`InputScript`] replays toggle events and a sampled
//! pointer path over time.

use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::blend::MorphState;

/// Everything the simulation needs from the outside for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInput {
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Seconds since the scene started.
    pub elapsed: f32,
    /// Pointer in normalized device coordinates (`[-1, 1]` on both axes).
    pub pointer: Vec2,
    pub state: MorphState,
}

impl FrameInput {
    pub fn new(dt: f32, elapsed: f32, pointer: Vec2, state: MorphState) -> Self {
        Self {
            dt,
            elapsed,
            pointer,
            state,
        }
    }
}

/// A pointer trajectory sampled at a fixed rate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerPath {
    pub samples: Vec<[f32; 2]>,
    pub sample_rate: f32,
}

impl PointerPath {
    pub fn new(samples: Vec<[f32; 2]>, sample_rate: f32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration(&self) -> f32 {
        if self.sample_rate <= 0.0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate
    }

    /// Linearly interpolated pointer at `time`; holds the last sample past the end.
    pub fn sample(&self, time: f32) -> Vec2 {
        let (Some(first), Some(last)) = (self.samples.first(), self.samples.last()) else {
            return Vec2::ZERO;
        };
        if time <= 0.0 || self.sample_rate <= 0.0 {
            return Vec2::from_array(*first);
        }

        let index = time * self.sample_rate;
        let i = index as usize;
        let frac = index.fract();

        if i + 1 >= self.samples.len() {
            return Vec2::from_array(*last);
        }

        let v0 = Vec2::from_array(self.samples[i]);
        let v1 = Vec2::from_array(self.samples[i + 1]);
        v0.lerp(v1, frac)
    }
}

/// A timed switch of the assembled/scattered toggle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToggleEvent {
    pub time: f32,
    pub state: MorphState,
}

/// A timed switch of the accent particles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccentEvent {
    pub time: f32,
    pub enabled: bool,
}

/// Recorded inputs for a headless run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputScript {
    pub toggles: Vec<ToggleEvent>,
    pub accents: Vec<AccentEvent>,
    pub pointer: PointerPath,
}

impl InputScript {
    pub fn from_json(text: &str) -> Result<Self> {
        let mut script: InputScript =
            serde_json::from_str(text).context("Failed to parse input script")?;
        script
            .toggles
            .sort_by(|a, b| a.time.total_cmp(&b.time));
        script
            .accents
            .sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input script {}", path.display()))?;
        Self::from_json(&text)
    }

    /// Toggle state in effect at `time`.
    pub fn state_at(&self, time: f32) -> MorphState {
        self.toggles
            .iter()
            .take_while(|event| event.time <= time)
            .last()
            .map(|event| event.state)
            .unwrap_or_default()
    }

    /// Accent switch in effect at `time`, if any event has fired yet.
    pub fn accents_at(&self, time: f32) -> Option<bool> {
        self.accents
            .iter()
            .take_while(|event| event.time <= time)
            .last()
            .map(|event| event.enabled)
    }

    /// Latest time any scripted input changes.
    pub fn duration(&self) -> f32 {
        let last_toggle = self.toggles.last().map_or(0.0, |e| e.time);
        let last_accent = self.accents.last().map_or(0.0, |e| e.time);
        last_toggle.max(last_accent).max(self.pointer.duration())
    }

    /// Build the frame input for a fixed-step run.
    pub fn frame(&self, frame_index: usize, dt: f32) -> FrameInput {
        let elapsed = (frame_index + 1) as f32 * dt;
        FrameInput::new(dt, elapsed, self.pointer.sample(elapsed), self.state_at(elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_interpolates() {
        let path = PointerPath::new(vec![[0.0, 0.0], [1.0, -1.0]], 10.0);
        let p = path.sample(0.05);
        assert!((p - Vec2::new(0.5, -0.5)).length() < 1e-5);
        assert_eq!(path.sample(5.0), Vec2::new(1.0, -1.0));
        assert_eq!(path.sample(-1.0), Vec2::ZERO);
    }

    #[test]
    fn test_empty_pointer_path_is_centered() {
        assert_eq!(PointerPath::default().sample(1.0), Vec2::ZERO);
        assert_eq!(PointerPath::default().duration(), 0.0);
    }

    #[test]
    fn test_state_at() {
        let script = InputScript::from_json(
            r#"{
                "toggles": [
                    { "time": 3.0, "state": "assembled" },
                    { "time": 1.0, "state": "scattered" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(script.state_at(0.5), MorphState::Assembled);
        assert_eq!(script.state_at(1.0), MorphState::Scattered);
        assert_eq!(script.state_at(2.9), MorphState::Scattered);
        assert_eq!(script.state_at(3.5), MorphState::Assembled);
        assert_eq!(script.duration(), 3.0);
    }

    #[test]
    fn test_accents_at() {
        let script = InputScript::from_json(
            r#"{ "accents": [ { "time": 2.0, "enabled": false } ] }"#,
        )
        .unwrap();
        assert_eq!(script.accents_at(1.0), None);
        assert_eq!(script.accents_at(2.0), Some(false));
    }

    #[test]
    fn test_frame_sampling() {
        let script = InputScript {
            toggles: vec![ToggleEvent {
                time: 0.5,
                state: MorphState::Scattered,
            }],
            accents: Vec::new(),
            pointer: PointerPath::new(vec![[0.2, 0.4]], 1.0),
        };
        let frame = script.frame(59, 1.0 / 60.0);
        assert!((frame.elapsed - 1.0).abs() < 1e-5);
        assert_eq!(frame.state, MorphState::Scattered);
        assert_eq!(frame.pointer, Vec2::new(0.2, 0.4));
    }

    #[test]
    fn test_rejects_malformed_script() {
        assert!(InputScript::from_json(r#"{ "toggles": [ { "time": "soon" } ] }"#).is_err());
    }
}

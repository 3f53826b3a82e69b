//! Data-driven game balance
//!
//! Every gameplay constant lives here so levels can be rebalanced from JSON
//! without touching the simulation. Missing fields fall back to defaults.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::difficulty::DifficultyPolicy;

/// Reasons a tuning file is rejected
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
    TuningError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Forward/lateral movement and jumping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    pub start_speed: f32,
    /// Forward speed gained per second of running
    pub acceleration: f32,
    pub max_speed: f32,
    /// Lateral acceleration at full steer
    pub lateral_force: f32,
    pub tilt_sensitivity: f32,
    /// Upward impulse applied on jump
    pub jump_force: f32,
    /// Falling below this height kills the orb
    pub fall_threshold: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            start_speed: 5.0,
            acceleration: 0.05,
            max_speed: 15.0,
            lateral_force: 75.0,
            tilt_sensitivity: 2.0,
            jump_force: 5.0,
            fall_threshold: -1.0,
        }
    }
}

/// Touch gesture recognition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureTuning {
    /// Minimum upward travel (px) for a swipe to count as a jump
    pub min_swipe_distance: f32,
    /// Maximum duration (s) of a jump swipe
    pub max_swipe_time: f32,
    /// Steer per pixel of horizontal drag
    pub swipe_sensitivity: f32,
}

impl Default for GestureTuning {
    fn default() -> Self {
        Self {
            min_swipe_distance: 100.0,
            max_swipe_time: 1.0,
            swipe_sensitivity: 0.1,
        }
    }
}

/// Track pool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackTuning {
    pub initial_segments: usize,
    pub segment_length: f32,
    /// Half of the drivable track width
    pub half_width: f32,
}

impl Default for TrackTuning {
    fn default() -> Self {
        Self {
            initial_segments: 5,
            segment_length: 10.0,
            half_width: 2.5,
        }
    }
}

/// Score-to-variant mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    /// Points per difficulty tier
    pub score_step: f64,
    pub policy: DifficultyPolicy,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            score_step: 1000.0,
            policy: DifficultyPolicy::Deterministic,
        }
    }
}

/// Session score, coins and streaks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreTuning {
    pub score_per_second: f64,
    pub base_coin_score: f64,
    pub speed_increase_per_coin: f32,
    /// Streak window at zero speed (s)
    pub streak_base_window: f32,
    /// Streak window never shrinks below this (s)
    pub streak_min_window: f32,
    /// Seconds of window lost per unit of forward speed
    pub streak_reduction_factor: f32,
    pub streak_bonus_threshold: u32,
    pub streak_bonus_score: f64,
    pub streak_bonus_speed: f32,
}

impl Default for ScoreTuning {
    fn default() -> Self {
        Self {
            score_per_second: 10.0,
            base_coin_score: 10.0,
            speed_increase_per_coin: 0.05,
            streak_base_window: 1.0,
            streak_min_window: 0.3,
            streak_reduction_factor: 0.03,
            streak_bonus_threshold: 5,
            streak_bonus_score: 50.0,
            streak_bonus_speed: 0.25,
        }
    }
}

/// Power-up pickups placed on the track
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpTuning {
    pub invincibility_duration: f32,
    pub magnet_duration: f32,
    pub magnet_radius: f32,
    pub magnet_strength: f32,
}

impl Default for PowerUpTuning {
    fn default() -> Self {
        Self {
            invincibility_duration: 5.0,
            magnet_duration: 8.0,
            magnet_radius: 5.0,
            magnet_strength: 10.0,
        }
    }
}

/// Revive allowance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviveTuning {
    pub max_revives: u32,
}

impl Default for ReviveTuning {
    fn default() -> Self {
        Self { max_revives: 1 }
    }
}

/// Follow camera
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub offset: Vec3,
    pub smooth_time: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 3.0, -6.0),
            smooth_time: 0.125,
        }
    }
}

/// Complete balance sheet for a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerTuning {
    pub movement: MovementTuning,
    pub gestures: GestureTuning,
    pub track: TrackTuning,
    pub difficulty: DifficultyTuning,
    pub score: ScoreTuning,
    pub power_ups: PowerUpTuning,
    pub revive: ReviveTuning,
    pub camera: CameraTuning,
}

impl RunnerTuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a tuning file from disk
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!(
            "Loaded tuning ({} segments, step {})",
            tuning.track.initial_segments,
            tuning.difficulty.score_step
        );
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let m = &self.movement;
        if !m.max_speed.is_finite() || m.max_speed < 0.0 {
            return Err(invalid(
                "movement.max_speed",
                format!("must be finite and non-negative, got {}", m.max_speed),
            ));
        }
        if !m.start_speed.is_finite() || m.start_speed < 0.0 || m.start_speed > m.max_speed {
            return Err(invalid(
                "movement.start_speed",
                format!("must be in [0, max_speed={}], got {}", m.max_speed, m.start_speed),
            ));
        }
        if !m.acceleration.is_finite() {
            return Err(invalid("movement.acceleration", "must be finite"));
        }
        if !m.jump_force.is_finite() || m.jump_force <= 0.0 {
            return Err(invalid(
                "movement.jump_force",
                format!("must be positive, got {}", m.jump_force),
            ));
        }
        if self.track.initial_segments == 0 {
            return Err(invalid("track.initial_segments", "must be at least 1"));
        }
        if self.track.segment_length <= 0.0 {
            return Err(invalid("track.segment_length", "must be positive"));
        }
        if self.difficulty.score_step <= 0.0 {
            return Err(invalid("difficulty.score_step", "must be positive"));
        }
        let s = &self.score;
        if s.streak_min_window > s.streak_base_window {
            return Err(invalid(
                "score.streak_min_window",
                "must not exceed score.streak_base_window",
            ));
        }
        if s.streak_bonus_threshold == 0 {
            return Err(invalid("score.streak_bonus_threshold", "must be at least 1"));
        }
        Ok(())
    }
}

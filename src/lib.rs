//! Mighty Orb - endless-runner gameplay core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (track streaming, locomotion, economy, revive)
//! - `collab`: Interfaces to the outside world (ads, audio, particles, HUD)
//! - `audio`: Cue dispatch with rate limiting in front of the audio sink
//! - `settings`: Persisted player preferences
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod collab;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{ControlScheme, Settings};
pub use tuning::RunnerTuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (64 Hz, exactly representable so time sums stay exact)
    pub const SIM_DT: f32 = 1.0 / 64.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame fed to the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Steering inputs at or below this magnitude are ignored
    pub const INPUT_DEADZONE: f32 = 0.1;
    /// Horizontal pixels a touch must travel before it becomes a drag
    pub const DRAG_START_THRESHOLD: f32 = 10.0;

    /// Coins closer than this to the orb are collected by the magnet directly
    pub const MAGNET_CAPTURE_DISTANCE: f32 = 0.5;
    /// Minimum interval between two coin pickup sounds (seconds)
    pub const COIN_SFX_COOLDOWN: f32 = 0.1;

    /// Height the orb is placed at when revived
    pub const RESPAWN_HEIGHT: f32 = 2.0;
}

/// Critically damped spring toward `target` (Game Programming Gems 4, ch. 1.10).
///
/// `velocity` is carried between calls by the caller.
#[inline]
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    // Prevent overshooting
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = if dt > 0.0 { (output - target) / dt } else { 0.0 };
    }
    output
}

//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Timers keyed to simulation time, never wall clock
//! - No rendering, audio or platform dependencies (collaborators are injected)

pub mod camera;
pub mod difficulty;
pub mod input;
pub mod physics;
pub mod player;
pub mod powerup;
pub mod revive;
pub mod score;
pub mod state;
pub mod tick;
pub mod timers;
pub mod track;

pub use camera::FollowCamera;
pub use difficulty::{DifficultyModel, DifficultyPolicy};
pub use input::{FrameControls, FusedInput, InputFusion, PointerPhase, PointerSample};
pub use physics::{Contact, ForceMode, PhysicsBody, RigidBody};
pub use player::{DeathCause, LocomotionState, PlayerState};
pub use powerup::{
    EffectHooks, EffectRegistry, PowerUpEffect, PowerUpKind, PowerUpRuntime, PowerUpTag,
};
pub use revive::{AdRequest, RevivePhase, ReviveFlow};
pub use score::{CoinOutcome, ScoreEconomy, ScoreState};
pub use state::{GameEvent, GameSession};
pub use tick::FrameInput;
pub use timers::{Deferred, Scheduler, TimerToken};
pub use track::{
    ObstacleKind, Segment, SegmentVariant, SpawnKind, SpawnPoint, SpawnRef, SpawnTemplate,
    TrackSegmentPool, default_variants,
};

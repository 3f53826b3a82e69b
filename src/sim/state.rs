//! Session state
//!
//! `GameSession` owns every gameplay system for one run plus the injected
//! collaborators. The frame loop and fixed tick live in `tick.rs`.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::camera::FollowCamera;
use super::difficulty::DifficultyModel;
use super::input::InputFusion;
use super::physics::{Contact, PhysicsBody};
use super::player::{DeathCause, PlayerState};
use super::powerup::{PowerUpEffect, PowerUpKind, PowerUpRuntime};
use super::revive::{AdRequest, RevivePhase, ReviveFlow};
use super::score::ScoreEconomy;
use super::timers::{Deferred, Scheduler};
use super::track::{SegmentVariant, SpawnRef, TrackSegmentPool, default_variants};
use crate::audio::{CueDispatcher, SoundCue};
use crate::collab::{AdOutcome, AdService, Collaborators, HudSink, ParticleSink};
use crate::settings::Settings;
use crate::tuning::{RunnerTuning, TuningError};

/// Things that happened during a frame, drained by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Jumped,
    Landed,
    CoinCollected { coins: u32, position: Vec3, streak: u32 },
    StreakBonus { streak: u32, bonus: f64 },
    PowerUpStarted(PowerUpKind),
    PowerUpEnded(PowerUpKind),
    ObstacleSmashed { position: Vec3 },
    SegmentRecycled { segment_id: u32, variant: usize, anchor_z: f32 },
    PlayerDied(DeathCause),
    Revived { position: Vec3 },
    GameOver { final_score: u64 },
}

/// Last values pushed to the HUD
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct HudShown {
    pub score: Option<u64>,
    pub coins: Option<u32>,
    pub revive_prompt: bool,
    pub game_over: bool,
}

/// One endless run
pub struct GameSession {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) tuning: RunnerTuning,
    pub(crate) player: PlayerState,
    pub(crate) body: Box<dyn PhysicsBody>,
    pub(crate) economy: ScoreEconomy,
    pub(crate) track: TrackSegmentPool,
    pub(crate) difficulty: DifficultyModel,
    pub(crate) input: InputFusion,
    pub(crate) power_ups: PowerUpRuntime,
    pub(crate) revive: ReviveFlow,
    pub(crate) timers: Scheduler<Deferred>,
    pub(crate) cues: CueDispatcher,
    pub(crate) particles: Box<dyn ParticleSink>,
    pub(crate) hud: Box<dyn HudSink>,
    pub(crate) ads: Box<dyn AdService>,
    pub(crate) camera: FollowCamera,
    /// Simulation time (seconds), frozen while game over
    pub(crate) time: f64,
    /// Unscaled time for gesture timing
    pub(crate) real_time: f64,
    pub(crate) accumulator: f32,
    /// Fixed steps run so far
    pub time_ticks: u64,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) hud_shown: HudShown,
    /// Host-reported contacts waiting for the next fixed step
    pub(crate) pending_contacts: Vec<Contact>,
    pub(crate) contact_scratch: Vec<Contact>,
}

impl GameSession {
    /// New run over the built-in segment catalogue
    pub fn new(
        tuning: RunnerTuning,
        settings: &Settings,
        collaborators: Collaborators,
        body: Box<dyn PhysicsBody>,
        seed: u64,
    ) -> Result<Self, TuningError> {
        let variants = default_variants(&tuning.power_ups);
        Self::with_variants(tuning, variants, settings, collaborators, body, seed)
    }

    /// New run over a custom segment catalogue ordered easiest to hardest
    pub fn with_variants(
        tuning: RunnerTuning,
        variants: Vec<SegmentVariant>,
        settings: &Settings,
        collaborators: Collaborators,
        body: Box<dyn PhysicsBody>,
        seed: u64,
    ) -> Result<Self, TuningError> {
        tuning.validate()?;
        if variants.is_empty() {
            return Err(TuningError::Invalid {
                field: "variants",
                reason: "at least one segment variant is required".into(),
            });
        }

        let Collaborators {
            mut ads,
            audio,
            particles,
            hud,
        } = collaborators;
        ads.initialize();

        let mut track = TrackSegmentPool::new(variants);
        track.initialize(tuning.track.initial_segments, tuning.track.segment_length);

        let camera = FollowCamera::new(&tuning.camera, body.position());
        let input = InputFusion::new(
            settings.control_scheme(),
            tuning.gestures.clone(),
            tuning.movement.tilt_sensitivity,
        );

        log::info!("Session started (seed {})", seed);
        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: PlayerState::new(tuning.movement.start_speed),
            body,
            economy: ScoreEconomy::new(tuning.score.clone()),
            track,
            difficulty: DifficultyModel::new(
                tuning.difficulty.score_step,
                tuning.difficulty.policy,
            ),
            input,
            power_ups: PowerUpRuntime::default(),
            revive: ReviveFlow::new(tuning.revive.max_revives),
            timers: Scheduler::new(),
            cues: CueDispatcher::new(audio),
            particles,
            hud,
            ads,
            camera,
            time: 0.0,
            real_time: 0.0,
            accumulator: 0.0,
            time_ticks: 0,
            events: Vec::new(),
            hud_shown: HudShown::default(),
            pending_contacts: Vec::new(),
            contact_scratch: Vec::new(),
            tuning,
        })
    }

    pub fn tuning(&self) -> &RunnerTuning {
        &self.tuning
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn body(&self) -> &dyn PhysicsBody {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> &mut dyn PhysicsBody {
        self.body.as_mut()
    }

    pub fn track(&self) -> &TrackSegmentPool {
        &self.track
    }

    pub fn economy(&self) -> &ScoreEconomy {
        &self.economy
    }

    pub fn power_ups(&self) -> &PowerUpRuntime {
        &self.power_ups
    }

    /// Register hooks for custom power-up kinds
    pub fn power_ups_mut(&mut self) -> &mut PowerUpRuntime {
        &mut self.power_ups
    }

    pub fn camera(&self) -> &FollowCamera {
        &self.camera
    }

    pub fn cues_mut(&mut self) -> &mut CueDispatcher {
        &mut self.cues
    }

    /// Simulation seconds elapsed
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn phase(&self) -> RevivePhase {
        self.revive.phase()
    }

    /// True from death until a successful revive
    pub fn is_game_over(&self) -> bool {
        self.revive.is_game_over()
    }

    pub fn time_scale(&self) -> f32 {
        self.revive.time_scale()
    }

    pub fn displayed_score(&self) -> u64 {
        self.economy.displayed()
    }

    /// Take every event buffered since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Collect a coin spawn point. Returns false if it was already taken,
    /// is not a coin, or the orb is dead.
    pub fn collect_coin(&mut self, at: SpawnRef) -> bool {
        if self.player.is_dead() {
            return false;
        }
        let position = match self.track.spawn(at) {
            Some(spawn) if spawn.active && spawn.kind.is_coin() => spawn.position,
            _ => return false,
        };
        self.track.take(at);

        let outcome = self
            .economy
            .on_coin(self.time, &mut self.player, self.tuning.movement.max_speed);
        self.cues.play(SoundCue::CoinCollect, self.time, &mut self.timers);
        self.particles.play_coin_effect(position);
        self.events.push(GameEvent::CoinCollected {
            coins: self.player.coins,
            position,
            streak: outcome.streak,
        });
        if let Some(bonus) = outcome.bonus {
            self.events.push(GameEvent::StreakBonus {
                streak: outcome.streak,
                bonus,
            });
        }
        true
    }

    /// Start a power-up now, ending whatever was running
    pub fn start_power_up(&mut self, effect: PowerUpEffect) {
        let replaced = self
            .power_ups
            .start(effect, &mut self.player, &mut self.timers, self.time);
        if let Some(old) = replaced {
            self.events.push(GameEvent::PowerUpEnded(old.kind));
        }
        if self.power_ups.active().is_some_and(|a| a.effect == effect) {
            self.events.push(GameEvent::PowerUpStarted(effect.kind));
        }
    }

    /// "Watch ad" pressed on the revive prompt
    pub fn request_revive_ad(&mut self) -> AdRequest {
        let request = self.revive.request_ad(self.ads.as_mut());
        if let AdRequest::Resolved(outcome) = request {
            self.apply_ad_outcome(outcome);
        }
        request
    }

    /// Revive turned down: straight to final game over
    pub fn decline_revive(&mut self) {
        if self.revive.decline() == Some(RevivePhase::GameOverFinal) {
            self.finish_run();
        }
    }

    pub(crate) fn apply_ad_outcome(&mut self, outcome: AdOutcome) {
        match self.revive.resolve(outcome) {
            Some(RevivePhase::Playing) => self.revive_player(),
            Some(RevivePhase::GameOverFinal) => self.finish_run(),
            _ => log::debug!("Ad outcome {:?} arrived with no revive pending", outcome),
        }
    }

    fn revive_player(&mut self) {
        let position = self.player.revive(self.body.as_mut());
        self.input.reset();
        self.accumulator = 0.0;
        self.pending_contacts.clear();
        self.cues.play(SoundCue::ResumeMusic, self.time, &mut self.timers);
        self.events.push(GameEvent::Revived { position });
        log::info!("Orb revived at z={}", position.z);
    }

    /// Freeze the orb and move the revive flow out of `Playing`
    pub(crate) fn kill_player(&mut self, cause: DeathCause) {
        if !self.player.kill(self.body.as_mut(), cause) {
            return;
        }
        self.events.push(GameEvent::PlayerDied(cause));
        self.cues.play(SoundCue::PauseMusic, self.time, &mut self.timers);
        if self.revive.on_player_died() == Some(RevivePhase::GameOverFinal) {
            self.finish_run();
        }
    }

    fn finish_run(&mut self) {
        let final_score = self.economy.displayed();
        self.events.push(GameEvent::GameOver { final_score });
        log::info!("Game over, final score {}", final_score);
    }

    /// Push HUD values that changed since the last frame
    pub(crate) fn sync_hud(&mut self) {
        let score = self.economy.displayed();
        if self.hud_shown.score != Some(score) {
            self.hud.set_score(score);
            self.hud_shown.score = Some(score);
        }
        let coins = self.player.coins;
        if self.hud_shown.coins != Some(coins) {
            self.hud.set_coins(coins);
            self.hud_shown.coins = Some(coins);
        }
        let phase = self.revive.phase();
        let revive_prompt = phase == RevivePhase::AwaitingRevive;
        if self.hud_shown.revive_prompt != revive_prompt {
            self.hud.set_revive_prompt_visible(revive_prompt);
            self.hud_shown.revive_prompt = revive_prompt;
        }
        let game_over = phase == RevivePhase::GameOverFinal;
        if self.hud_shown.game_over != game_over {
            self.hud.set_game_over_visible(game_over, score);
            self.hud_shown.game_over = game_over;
        }
    }
}

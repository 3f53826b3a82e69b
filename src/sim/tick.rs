//! Frame loop and fixed timestep tick
//!
//! `frame` runs once per rendered frame: it drains the ad reply, samples
//! input, feeds scaled time to the fixed-step accumulator and updates the
//! camera and HUD. `fixed_tick` advances gameplay by exactly one step.

use super::input::FrameControls;
use super::physics::Contact;
use super::player::DeathCause;
use super::state::{GameEvent, GameSession};
use super::timers::Deferred;
use super::track::SpawnKind;
use crate::audio::SoundCue;
use crate::consts::*;

/// Everything the host hands over for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub controls: FrameControls,
    /// Contacts detected by the host since the last frame
    pub contacts: Vec<Contact>,
}

impl GameSession {
    /// Advance one rendered frame of `frame_dt` real seconds
    pub fn frame(&mut self, input: &FrameInput, frame_dt: f32) {
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.real_time += frame_dt as f64;

        // Ad replies land here, never mid-tick
        if let Some(outcome) = self.revive.poll() {
            self.apply_ad_outcome(outcome);
        }

        if !self.is_game_over() {
            let fused = self
                .input
                .sample(&input.controls, self.player.is_grounded(), self.real_time);
            self.player.apply_controls(fused);
            self.pending_contacts.extend_from_slice(&input.contacts);
        }

        let scaled_dt = frame_dt * self.time_scale();
        self.accumulator += scaled_dt;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS && !self.is_game_over() {
            self.fixed_tick(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if self.is_game_over() {
            self.accumulator = 0.0;
        }

        self.track.advance_rotation(scaled_dt);
        self.camera.update(self.body.position(), scaled_dt);
        self.sync_hud();
    }

    /// Advance the simulation by one fixed step
    pub fn fixed_tick(&mut self, dt: f32) {
        if self.is_game_over() {
            return;
        }
        self.time += dt as f64;
        self.time_ticks += 1;

        for (token, action) in self.timers.drain_due(self.time) {
            match action {
                Deferred::PowerUpExpired => {
                    if let Some(ended) = self.power_ups.on_expired(token, &mut self.player) {
                        self.events.push(GameEvent::PowerUpEnded(ended.kind));
                    }
                }
                Deferred::CoinSfxReady => self.cues.on_coin_cooldown_elapsed(),
            }
        }

        if self
            .player
            .fixed_update(self.body.as_mut(), &self.tuning.movement, dt)
        {
            self.events.push(GameEvent::Jumped);
            self.cues.play(SoundCue::Jump, self.time, &mut self.timers);
        }
        self.body.step(dt);

        let mut contacts = std::mem::take(&mut self.contact_scratch);
        contacts.append(&mut self.pending_contacts);
        self.body.drain_contacts(&mut contacts);
        for contact in contacts.drain(..) {
            self.dispatch_contact(contact);
        }
        self.contact_scratch = contacts;

        if self
            .player
            .has_fallen(self.body.as_ref(), self.tuning.movement.fall_threshold)
        {
            self.kill_player(DeathCause::FellOffTrack);
        }
        if self.player.is_dead() {
            return;
        }

        self.pull_coins(dt);
        self.economy.accrue(dt);

        let recycled = self.track.tick(
            self.body.position().z,
            self.economy.session_score(),
            &self.difficulty,
            &mut self.rng,
        );
        self.events
            .extend(recycled.into_iter().map(|r| GameEvent::SegmentRecycled {
                segment_id: r.segment_id,
                variant: r.variant,
                anchor_z: r.anchor_z,
            }));
    }

    fn dispatch_contact(&mut self, contact: Contact) {
        if self.player.is_dead() {
            return;
        }
        let at = match contact {
            Contact::Track => {
                if self.player.on_track_contact() {
                    self.events.push(GameEvent::Landed);
                    self.cues.play(SoundCue::Land, self.time, &mut self.timers);
                }
                return;
            }
            Contact::Spawn(at) => at,
        };

        // Stale (recycled) or already consumed
        let Some((kind, position)) = self
            .track
            .spawn(at)
            .filter(|s| s.active)
            .map(|s| (s.kind, s.position))
        else {
            return;
        };

        match kind {
            SpawnKind::Coin => {
                self.collect_coin(at);
            }
            SpawnKind::Obstacle(_) if self.player.invincible => {
                if self.track.take(at).is_some() {
                    self.events.push(GameEvent::ObstacleSmashed { position });
                    log::debug!("Obstacle smashed at z={}", position.z);
                }
            }
            SpawnKind::Obstacle(_) => self.kill_player(DeathCause::HitObstacle),
            SpawnKind::PowerUp(effect) => {
                if self.track.take(at).is_some() {
                    self.start_power_up(effect);
                }
            }
        }
    }

    /// Coin magnet: capture close coins, drag the rest toward the orb
    fn pull_coins(&mut self, dt: f32) {
        let Some(field) = self.player.magnet else { return };
        let center = self.body.position();
        let max_step = field.strength * dt;

        for (at, position) in self
            .track
            .live_spawns_within(center, field.radius, SpawnKind::is_coin)
        {
            let to_orb = center - position;
            let distance = to_orb.length();
            if distance <= MAGNET_CAPTURE_DISTANCE {
                self.collect_coin(at);
            } else {
                let step = max_step.min(distance);
                self.track.translate(at, to_orb / distance * step);
            }
        }
    }
}

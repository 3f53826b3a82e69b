//! Sound cue dispatch
//!
//! The simulation names cues; the injected `AudioSink` decides how they
//! sound. Coin pickups are rate limited so a magnet sweep does not stack
//! dozens of identical clips.

use crate::collab::AudioSink;
use crate::consts::COIN_SFX_COOLDOWN;
use crate::sim::timers::{Deferred, Scheduler};

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Jump launched
    Jump,
    /// Back on the track after a jump
    Land,
    /// Coin collected (rate limited)
    CoinCollect,
    /// Orb died
    PauseMusic,
    /// Orb revived
    ResumeMusic,
}

/// Routes cues to the audio sink
pub struct CueDispatcher {
    sink: Box<dyn AudioSink>,
    coin_ready: bool,
    muted: bool,
}

impl CueDispatcher {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            coin_ready: true,
            muted: false,
        }
    }

    /// Mute/unmute all cues
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_coin_ready(&self) -> bool {
        self.coin_ready
    }

    /// Play a cue. `now` is simulation time; the coin cooldown is scheduled on `timers`.
    pub fn play(&mut self, cue: SoundCue, now: f64, timers: &mut Scheduler<Deferred>) {
        if self.muted {
            return;
        }

        match cue {
            SoundCue::Jump => self.sink.play_jump(),
            SoundCue::Land => self.sink.play_land(),
            SoundCue::CoinCollect => {
                if !self.coin_ready {
                    log::debug!("Coin sound suppressed by cooldown");
                    return;
                }
                self.coin_ready = false;
                timers.schedule(now + COIN_SFX_COOLDOWN as f64, Deferred::CoinSfxReady);
                self.sink.play_coin_collect();
            }
            SoundCue::PauseMusic => self.sink.pause_music(),
            SoundCue::ResumeMusic => self.sink.resume_music(),
        }
    }

    /// Cooldown timer fired
    pub fn on_coin_cooldown_elapsed(&mut self) {
        self.coin_ready = true;
    }
}

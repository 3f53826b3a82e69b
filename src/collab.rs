//! Interfaces to the world outside the simulation
//!
//! Ads, audio, particles and the HUD are injected into the session at
//! construction. The core only calls out through these traits and never
//! waits on them.

use std::sync::{Arc, Mutex};

use glam::Vec3;

/// Result of a rewarded ad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdOutcome {
    Succeeded,
    FailedOrSkipped,
}

/// Single-slot mailbox the ad provider writes into from any thread.
///
/// The session drains it at the start of a frame, so a reward never
/// mutates the game in the middle of a tick.
#[derive(Debug, Clone, Default)]
pub struct RewardSlot {
    inner: Arc<Mutex<Option<AdOutcome>>>,
}

impl RewardSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a one-shot reply for a single ad request
    pub fn reply(&self) -> RewardReply {
        RewardReply {
            slot: self.inner.clone(),
        }
    }

    /// Take the pending outcome, if one arrived
    pub fn take(&self) -> Option<AdOutcome> {
        match self.inner.lock() {
            Ok(mut pending) => pending.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

/// Completion handle passed to the ad provider. Consumed on use.
#[derive(Debug)]
pub struct RewardReply {
    slot: Arc<Mutex<Option<AdOutcome>>>,
}

impl RewardReply {
    pub fn complete(self, outcome: AdOutcome) {
        let mut pending = match self.slot.lock() {
            Ok(pending) => pending,
            Err(poisoned) => poisoned.into_inner(),
        };
        if pending.is_some() {
            log::warn!("Ad outcome {:?} dropped, previous outcome not yet consumed", outcome);
            return;
        }
        *pending = Some(outcome);
    }
}

/// Rewarded-ad provider
pub trait AdService {
    fn initialize(&mut self);
    /// Whether an ad is loaded and can be shown right now
    fn is_ready(&self) -> bool;
    /// Show an ad; the provider completes `reply` later, possibly from another thread
    fn request_reward(&mut self, reply: RewardReply);
}

/// Fire-and-forget sound output
pub trait AudioSink {
    fn play_jump(&mut self);
    fn play_land(&mut self);
    fn play_coin_collect(&mut self);
    fn pause_music(&mut self);
    fn resume_music(&mut self);
}

/// Fire-and-forget particle output
pub trait ParticleSink {
    fn play_coin_effect(&mut self, position: Vec3);
}

/// Display outputs. The core writes, never reads.
pub trait HudSink {
    fn set_score(&mut self, score: u64);
    fn set_coins(&mut self, coins: u32);
    fn set_revive_prompt_visible(&mut self, visible: bool);
    fn set_game_over_visible(&mut self, visible: bool, final_score: u64);
}

/// Ad provider that never has an ad loaded
#[derive(Debug, Default)]
pub struct NoAds;

impl AdService for NoAds {
    fn initialize(&mut self) {}

    fn is_ready(&self) -> bool {
        false
    }

    fn request_reward(&mut self, reply: RewardReply) {
        reply.complete(AdOutcome::FailedOrSkipped);
    }
}

/// Discards every cue
#[derive(Debug, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn play_jump(&mut self) {}
    fn play_land(&mut self) {}
    fn play_coin_collect(&mut self) {}
    fn pause_music(&mut self) {}
    fn resume_music(&mut self) {}
}

impl ParticleSink for Silent {
    fn play_coin_effect(&mut self, _position: Vec3) {}
}

/// HUD that writes to the log
#[derive(Debug, Default)]
pub struct LogHud;

impl HudSink for LogHud {
    fn set_score(&mut self, score: u64) {
        log::trace!("Score : {}", score);
    }

    fn set_coins(&mut self, coins: u32) {
        log::debug!("Coins : {}", coins);
    }

    fn set_revive_prompt_visible(&mut self, visible: bool) {
        log::info!("Revive prompt {}", if visible { "shown" } else { "hidden" });
    }

    fn set_game_over_visible(&mut self, visible: bool, final_score: u64) {
        if visible {
            log::info!("Game over panel shown, final score {}", final_score);
        }
    }
}

/// Everything the session talks to
pub struct Collaborators {
    pub ads: Box<dyn AdService>,
    pub audio: Box<dyn AudioSink>,
    pub particles: Box<dyn ParticleSink>,
    pub hud: Box<dyn HudSink>,
}

impl Collaborators {
    /// No ads, no sound, HUD to the log
    pub fn headless() -> Self {
        Self {
            ads: Box::new(NoAds),
            audio: Box::new(Silent),
            particles: Box::new(Silent),
            hud: Box::new(LogHud),
        }
    }
}

/// Recording fakes shared by the simulation tests
#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Jump,
        Land,
        Coin,
        PauseMusic,
        ResumeMusic,
        CoinEffect(Vec3),
        Score(u64),
        Coins(u32),
        RevivePrompt(bool),
        GameOverPanel(bool, u64),
        AdRequested,
    }

    pub type CallLog = Rc<RefCell<Vec<Call>>>;

    pub struct Recorder(pub CallLog);

    impl AudioSink for Recorder {
        fn play_jump(&mut self) {
            self.0.borrow_mut().push(Call::Jump);
        }
        fn play_land(&mut self) {
            self.0.borrow_mut().push(Call::Land);
        }
        fn play_coin_collect(&mut self) {
            self.0.borrow_mut().push(Call::Coin);
        }
        fn pause_music(&mut self) {
            self.0.borrow_mut().push(Call::PauseMusic);
        }
        fn resume_music(&mut self) {
            self.0.borrow_mut().push(Call::ResumeMusic);
        }
    }

    impl ParticleSink for Recorder {
        fn play_coin_effect(&mut self, position: Vec3) {
            self.0.borrow_mut().push(Call::CoinEffect(position));
        }
    }

    impl HudSink for Recorder {
        fn set_score(&mut self, score: u64) {
            self.0.borrow_mut().push(Call::Score(score));
        }
        fn set_coins(&mut self, coins: u32) {
            self.0.borrow_mut().push(Call::Coins(coins));
        }
        fn set_revive_prompt_visible(&mut self, visible: bool) {
            self.0.borrow_mut().push(Call::RevivePrompt(visible));
        }
        fn set_game_over_visible(&mut self, visible: bool, final_score: u64) {
            self.0.borrow_mut().push(Call::GameOverPanel(visible, final_score));
        }
    }

    /// Ad provider whose replies are completed by the test
    pub struct ScriptedAds {
        pub ready: bool,
        pub log: CallLog,
        pub pending: Rc<RefCell<Option<RewardReply>>>,
    }

    impl AdService for ScriptedAds {
        fn initialize(&mut self) {}

        fn is_ready(&self) -> bool {
            self.ready
        }

        fn request_reward(&mut self, reply: RewardReply) {
            self.log.borrow_mut().push(Call::AdRequested);
            *self.pending.borrow_mut() = Some(reply);
        }
    }

    /// Collaborators wired to one shared call log
    pub fn recording(
        ads_ready: bool,
    ) -> (Collaborators, CallLog, Rc<RefCell<Option<RewardReply>>>) {
        let log: CallLog = Rc::new(RefCell::new(Vec::new()));
        let pending = Rc::new(RefCell::new(None));
        let collab = Collaborators {
            ads: Box::new(ScriptedAds {
                ready: ads_ready,
                log: log.clone(),
                pending: pending.clone(),
            }),
            audio: Box::new(Recorder(log.clone())),
            particles: Box::new(Recorder(log.clone())),
            hud: Box::new(Recorder(log.clone())),
        };
        (collab, log, pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_slot_delivers_once() {
        let slot = RewardSlot::new();
        assert_eq!(slot.take(), None);
        slot.reply().complete(AdOutcome::Succeeded);
        assert_eq!(slot.take(), Some(AdOutcome::Succeeded));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_reward_slot_from_other_thread() {
        let slot = RewardSlot::new();
        let reply = slot.reply();
        std::thread::spawn(move || reply.complete(AdOutcome::FailedOrSkipped))
            .join()
            .unwrap();
        assert_eq!(slot.take(), Some(AdOutcome::FailedOrSkipped));
    }

    #[test]
    fn test_reward_slot_keeps_first_outcome() {
        let slot = RewardSlot::new();
        slot.reply().complete(AdOutcome::Succeeded);
        slot.reply().complete(AdOutcome::FailedOrSkipped);
        assert_eq!(slot.take(), Some(AdOutcome::Succeeded));
    }
}

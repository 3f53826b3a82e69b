//! Death, rewarded-ad revive and final game over

use crate::collab::{AdOutcome, AdService, RewardSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevivePhase {
    Playing,
    /// Frozen, revive prompt showing
    AwaitingRevive,
    /// Terminal for the session
    GameOverFinal,
}

/// Result of asking for a revive ad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdRequest {
    /// Not awaiting a revive, or a request is already out
    Ignored,
    /// Outcome will arrive through the reward slot
    Pending,
    /// Answered on the spot (ad not ready)
    Resolved(AdOutcome),
}

/// Revive state machine plus the pending ad reply
#[derive(Debug)]
pub struct ReviveFlow {
    phase: RevivePhase,
    revives_used: u32,
    max_revives: u32,
    slot: RewardSlot,
    in_flight: bool,
}

impl ReviveFlow {
    pub fn new(max_revives: u32) -> Self {
        Self {
            phase: RevivePhase::Playing,
            revives_used: 0,
            max_revives,
            slot: RewardSlot::new(),
            in_flight: false,
        }
    }

    pub fn phase(&self) -> RevivePhase {
        self.phase
    }

    /// True from death until a successful revive
    pub fn is_game_over(&self) -> bool {
        self.phase != RevivePhase::Playing
    }

    /// Global simulation time scale
    pub fn time_scale(&self) -> f32 {
        if self.is_game_over() { 0.0 } else { 1.0 }
    }

    pub fn revives_used(&self) -> u32 {
        self.revives_used
    }

    pub fn revives_left(&self) -> u32 {
        self.max_revives.saturating_sub(self.revives_used)
    }

    pub fn is_request_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Leave `Playing` after a death. Returns the new phase, or `None` if
    /// the flow was not playing.
    pub fn on_player_died(&mut self) -> Option<RevivePhase> {
        if self.phase != RevivePhase::Playing {
            return None;
        }
        self.phase = if self.revives_left() > 0 {
            RevivePhase::AwaitingRevive
        } else {
            log::info!("No revives left");
            RevivePhase::GameOverFinal
        };
        Some(self.phase)
    }

    /// Ask the ad service for a reward
    pub fn request_ad(&mut self, ads: &mut dyn AdService) -> AdRequest {
        if self.phase != RevivePhase::AwaitingRevive || self.in_flight {
            return AdRequest::Ignored;
        }
        if !ads.is_ready() {
            log::warn!("Rewarded ad not ready, treating as failed");
            return AdRequest::Resolved(AdOutcome::FailedOrSkipped);
        }
        self.in_flight = true;
        ads.request_reward(self.slot.reply());
        log::info!("Rewarded ad requested");
        AdRequest::Pending
    }

    /// Reply delivered since the last poll, if any
    pub fn poll(&mut self) -> Option<AdOutcome> {
        let outcome = self.slot.take()?;
        if !self.in_flight {
            log::debug!("Ignoring ad reply with no request outstanding");
            return None;
        }
        Some(outcome)
    }

    /// Apply an ad outcome. Returns the new phase, or `None` if nothing was awaiting.
    pub fn resolve(&mut self, outcome: AdOutcome) -> Option<RevivePhase> {
        if self.phase != RevivePhase::AwaitingRevive {
            return None;
        }
        self.in_flight = false;
        self.phase = match outcome {
            AdOutcome::Succeeded => {
                self.revives_used += 1;
                RevivePhase::Playing
            }
            AdOutcome::FailedOrSkipped => RevivePhase::GameOverFinal,
        };
        Some(self.phase)
    }

    /// Player turned the revive down
    pub fn decline(&mut self) -> Option<RevivePhase> {
        self.resolve(AdOutcome::FailedOrSkipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::testing::ScriptedAds;
    use crate::collab::NoAds;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scripted() -> ScriptedAds {
        ScriptedAds {
            ready: true,
            log: Rc::new(RefCell::new(Vec::new())),
            pending: Rc::new(RefCell::new(None)),
        }
    }

    #[test]
    fn test_death_freezes_and_prompts() {
        let mut flow = ReviveFlow::new(1);
        assert_eq!(flow.time_scale(), 1.0);
        assert_eq!(flow.on_player_died(), Some(RevivePhase::AwaitingRevive));
        assert!(flow.is_game_over());
        assert_eq!(flow.time_scale(), 0.0);
        assert_eq!(flow.on_player_died(), None);
    }

    #[test]
    fn test_ad_success_revives_once() {
        let mut flow = ReviveFlow::new(1);
        let mut ads = scripted();
        flow.on_player_died();

        assert_eq!(flow.request_ad(&mut ads), AdRequest::Pending);
        assert_eq!(flow.request_ad(&mut ads), AdRequest::Ignored);
        assert_eq!(flow.poll(), None);

        let reply = ads.pending.borrow_mut().take();
        if let Some(reply) = reply {
            reply.complete(AdOutcome::Succeeded);
        }
        let outcome = flow.poll();
        assert_eq!(outcome, Some(AdOutcome::Succeeded));
        assert_eq!(flow.resolve(AdOutcome::Succeeded), Some(RevivePhase::Playing));
        assert!(!flow.is_game_over());
        assert_eq!(flow.revives_left(), 0);

        // Second death has no revive left
        assert_eq!(flow.on_player_died(), Some(RevivePhase::GameOverFinal));
        assert_eq!(flow.request_ad(&mut ads), AdRequest::Ignored);
    }

    #[test]
    fn test_ad_not_ready_fails_immediately() {
        let mut flow = ReviveFlow::new(1);
        flow.on_player_died();
        assert_eq!(
            flow.request_ad(&mut NoAds),
            AdRequest::Resolved(AdOutcome::FailedOrSkipped)
        );
        assert!(!flow.is_request_in_flight());
    }

    #[test]
    fn test_decline_is_final() {
        let mut flow = ReviveFlow::new(3);
        flow.on_player_died();
        assert_eq!(flow.decline(), Some(RevivePhase::GameOverFinal));
        assert_eq!(flow.resolve(AdOutcome::Succeeded), None);
        assert_eq!(flow.time_scale(), 0.0);
    }

    #[test]
    fn test_late_reply_after_decline_is_dropped() {
        let mut flow = ReviveFlow::new(1);
        let mut ads = scripted();
        flow.on_player_died();
        flow.request_ad(&mut ads);
        flow.decline();
        let reply = ads.pending.borrow_mut().take();
        if let Some(reply) = reply {
            reply.complete(AdOutcome::Succeeded);
        }
        assert_eq!(flow.poll(), None);
        assert_eq!(flow.phase(), RevivePhase::GameOverFinal);
    }
}

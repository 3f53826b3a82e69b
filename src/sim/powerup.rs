//! Time-boxed power-ups
//!
//! One slot. Starting a power-up while another is running ends the old one
//! on the spot and cancels its expiry; there is no stacking and no queue.
//! Each kind is a pair of plain functions over `PlayerState` looked up in a
//! small registry, so new kinds only need a registration.

use serde::{Deserialize, Serialize};

use super::player::{MagnetField, PlayerState};
use super::timers::{Deferred, Scheduler, TimerToken};

/// What a power-up does
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Obstacles shatter on contact instead of killing
    Invincibility,
    /// Coins inside `radius` are pulled toward the orb at `strength` units/sec
    CoinMagnet { radius: f32, strength: f32 },
    /// Host-defined effect, handled by hooks registered under the same id
    Custom { id: u16 },
}

/// Registry key for a kind (parameters stripped)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpTag {
    Invincibility,
    CoinMagnet,
    Custom(u16),
}

impl PowerUpKind {
    pub fn tag(&self) -> PowerUpTag {
        match self {
            PowerUpKind::Invincibility => PowerUpTag::Invincibility,
            PowerUpKind::CoinMagnet { .. } => PowerUpTag::CoinMagnet,
            PowerUpKind::Custom { id } => PowerUpTag::Custom(*id),
        }
    }
}

/// A power-up as placed on the track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpEffect {
    pub kind: PowerUpKind,
    /// Seconds of simulation time
    pub duration: f32,
}

pub type EffectHook = fn(&mut PlayerState, &PowerUpKind);

/// Activate/deactivate pair for one kind
#[derive(Clone, Copy)]
pub struct EffectHooks {
    pub activate: EffectHook,
    pub deactivate: EffectHook,
}

fn invincibility_on(player: &mut PlayerState, _: &PowerUpKind) {
    player.invincible = true;
}

fn invincibility_off(player: &mut PlayerState, _: &PowerUpKind) {
    player.invincible = false;
}

fn magnet_on(player: &mut PlayerState, kind: &PowerUpKind) {
    if let PowerUpKind::CoinMagnet { radius, strength } = *kind {
        player.magnet = Some(MagnetField { radius, strength });
        log::info!("Coin magnet on (radius {}, strength {})", radius, strength);
    }
}

fn magnet_off(player: &mut PlayerState, _: &PowerUpKind) {
    player.magnet = None;
    log::info!("Coin magnet off");
}

/// Hooks by kind
#[derive(Clone)]
pub struct EffectRegistry {
    hooks: Vec<(PowerUpTag, EffectHooks)>,
}

impl Default for EffectRegistry {
    fn default() -> Self {
        let mut registry = Self { hooks: Vec::new() };
        registry.register(
            PowerUpTag::Invincibility,
            EffectHooks {
                activate: invincibility_on,
                deactivate: invincibility_off,
            },
        );
        registry.register(
            PowerUpTag::CoinMagnet,
            EffectHooks {
                activate: magnet_on,
                deactivate: magnet_off,
            },
        );
        registry
    }
}

impl EffectRegistry {
    /// Add or replace the hooks for `tag`
    pub fn register(&mut self, tag: PowerUpTag, hooks: EffectHooks) {
        match self.hooks.iter_mut().find(|(t, _)| *t == tag) {
            Some(entry) => entry.1 = hooks,
            None => self.hooks.push((tag, hooks)),
        }
    }

    pub fn get(&self, tag: PowerUpTag) -> Option<EffectHooks> {
        self.hooks.iter().find(|(t, _)| *t == tag).map(|(_, h)| *h)
    }
}

/// The power-up currently running
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivePowerUp {
    pub effect: PowerUpEffect,
    pub started_at: f64,
    pub token: TimerToken,
}

/// Single-slot activator
#[derive(Clone, Default)]
pub struct PowerUpRuntime {
    registry: EffectRegistry,
    active: Option<ActivePowerUp>,
}

impl PowerUpRuntime {
    pub fn new(registry: EffectRegistry) -> Self {
        Self {
            registry,
            active: None,
        }
    }

    pub fn registry_mut(&mut self) -> &mut EffectRegistry {
        &mut self.registry
    }

    pub fn active(&self) -> Option<&ActivePowerUp> {
        self.active.as_ref()
    }

    /// Seconds left on the running power-up
    pub fn remaining(&self, now: f64) -> Option<f32> {
        self.active
            .map(|a| (a.started_at + a.effect.duration as f64 - now).max(0.0) as f32)
    }

    /// Start `effect`, ending whatever was running.
    ///
    /// Returns the effect that was cut short, if any.
    pub fn start(
        &mut self,
        effect: PowerUpEffect,
        player: &mut PlayerState,
        timers: &mut Scheduler<Deferred>,
        now: f64,
    ) -> Option<PowerUpEffect> {
        let replaced = self.stop(player, timers);

        let Some(hooks) = self.registry.get(effect.kind.tag()) else {
            log::warn!("No hooks registered for power-up {:?}, ignoring", effect.kind);
            return replaced;
        };
        (hooks.activate)(player, &effect.kind);
        let token = timers.schedule(now + effect.duration as f64, Deferred::PowerUpExpired);
        self.active = Some(ActivePowerUp {
            effect,
            started_at: now,
            token,
        });
        log::debug!("Power-up {:?} started for {}s", effect.kind, effect.duration);
        replaced
    }

    /// End the running power-up early and cancel its expiry
    pub fn stop(
        &mut self,
        player: &mut PlayerState,
        timers: &mut Scheduler<Deferred>,
    ) -> Option<PowerUpEffect> {
        let active = self.active.take()?;
        timers.cancel(active.token);
        self.deactivate(player, &active.effect);
        Some(active.effect)
    }

    /// Expiry callback. Only ends the power-up that scheduled `token`.
    pub fn on_expired(
        &mut self,
        token: TimerToken,
        player: &mut PlayerState,
    ) -> Option<PowerUpEffect> {
        match self.active {
            Some(active) if active.token == token => {
                self.active = None;
                self.deactivate(player, &active.effect);
                Some(active.effect)
            }
            _ => {
                log::debug!("Stale power-up expiry ignored");
                None
            }
        }
    }

    fn deactivate(&self, player: &mut PlayerState, effect: &PowerUpEffect) {
        if let Some(hooks) = self.registry.get(effect.kind.tag()) {
            (hooks.deactivate)(player, &effect.kind);
        }
    }
}

//! Deferred actions keyed to simulation time
//!
//! Replaces coroutine-style waits: schedule a payload for an absolute
//! simulation time, cancel it by token, and drain whatever is due once per tick.

/// Deferred actions the session schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// The active power-up's time is up (checked against its token)
    PowerUpExpired,
    /// Coin pickup sound may play again
    CoinSfxReady,
}

/// Identity of a scheduled action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

#[derive(Debug, Clone)]
struct Scheduled<T> {
    token: TimerToken,
    at: f64,
    payload: T,
}

/// Pending deferred actions, fired in expiry order
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    pending: Vec<Scheduled<T>>,
    next_token: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_token: 1,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` to fire once simulation time reaches `at`
    pub fn schedule(&mut self, at: f64, payload: T) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.pending.push(Scheduled { token, at, payload });
        token
    }

    /// Cancel a pending action. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.token != token);
        self.pending.len() != before
    }

    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.pending.iter().any(|s| s.token == token)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every action due at `now`.
    ///
    /// Ordered by expiry time, ties broken by scheduling order.
    pub fn drain_due(&mut self, now: f64) -> Vec<(TimerToken, T)> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].at <= now {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.at.total_cmp(&b.at).then(a.token.cmp(&b.token)));
        due.into_iter().map(|s| (s.token, s.payload)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_expiry_order() {
        let mut timers = Scheduler::new();
        timers.schedule(3.0, "c");
        timers.schedule(1.0, "a");
        timers.schedule(2.0, "b");

        assert!(timers.drain_due(0.5).is_empty());
        let fired: Vec<_> = timers.drain_due(2.5).into_iter().map(|(_, p)| p).collect();
        assert_eq!(fired, vec!["a", "b"]);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_ties_fire_in_schedule_order() {
        let mut timers = Scheduler::new();
        for i in 0..5 {
            timers.schedule(1.0, i);
        }
        let fired: Vec<_> = timers.drain_due(1.0).into_iter().map(|(_, p)| p).collect();
        assert_eq!(fired, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_cancelled_never_fires() {
        let mut timers = Scheduler::new();
        let keep = timers.schedule(1.0, "keep");
        let drop = timers.schedule(1.0, "drop");
        assert!(timers.cancel(drop));
        assert!(!timers.cancel(drop));
        assert!(timers.is_pending(keep));

        let fired = timers.drain_due(10.0);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0], (keep, "keep"));
        assert!(timers.is_empty());
    }
}

//! Score economy: time-based accrual, coin value and coin streaks

use super::player::PlayerState;
use crate::tuning::ScoreTuning;

/// Running score for one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreState {
    pub session_score: f64,
    /// Consecutive coins inside the streak window
    pub streak: u32,
    pub last_coin_at: Option<f64>,
}

/// What one coin pickup did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoinOutcome {
    /// Streak count including this coin (before any bonus reset)
    pub streak: u32,
    /// Window used to judge this coin
    pub window: f32,
    /// Bonus score if this coin completed a streak
    pub bonus: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ScoreEconomy {
    tuning: ScoreTuning,
    state: ScoreState,
}

impl ScoreEconomy {
    pub fn new(tuning: ScoreTuning) -> Self {
        Self {
            tuning,
            state: ScoreState::default(),
        }
    }

    pub fn state(&self) -> &ScoreState {
        &self.state
    }

    pub fn session_score(&self) -> f64 {
        self.state.session_score
    }

    /// Whole points shown to the player
    pub fn displayed(&self) -> u64 {
        self.state.session_score.max(0.0).floor() as u64
    }

    /// Distance points for `dt` seconds alive
    pub fn accrue(&mut self, dt: f32) {
        self.state.session_score += self.tuning.score_per_second * dt as f64;
    }

    /// Streak window at `speed`: shrinks as the orb gets faster
    pub fn streak_window(&self, speed: f32) -> f32 {
        let t = &self.tuning;
        (t.streak_base_window - speed * t.streak_reduction_factor).max(t.streak_min_window)
    }

    /// Credit one collected coin at simulation time `now`.
    ///
    /// The window is judged at the speed the orb had before this coin's boost.
    pub fn on_coin(&mut self, now: f64, player: &mut PlayerState, max_speed: f32) -> CoinOutcome {
        let window = self.streak_window(player.forward_speed);
        let t = &self.tuning;
        let s = &mut self.state;

        s.session_score += t.base_coin_score;
        player.coins += 1;
        player.increase_forward_speed(t.speed_increase_per_coin, max_speed);

        let in_window = s.last_coin_at.is_some_and(|last| now - last <= window as f64);
        s.streak = if in_window { s.streak + 1 } else { 1 };
        s.last_coin_at = Some(now);
        let streak = s.streak;

        let bonus = (t.streak_bonus_threshold > 0 && streak >= t.streak_bonus_threshold).then(|| {
            s.session_score += t.streak_bonus_score;
            player.increase_forward_speed(t.streak_bonus_speed, max_speed);
            s.streak = 0;
            t.streak_bonus_score
        });
        if let Some(bonus) = bonus {
            log::info!("Coin streak of {} (+{} bonus)", streak, bonus);
        }

        CoinOutcome { streak, window, bonus }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_SPEED: f32 = 15.0;

    fn economy(threshold: u32) -> ScoreEconomy {
        ScoreEconomy::new(ScoreTuning {
            streak_bonus_threshold: threshold,
            ..Default::default()
        })
    }

    #[test]
    fn test_accrual_and_floor() {
        let mut economy = economy(5);
        for _ in 0..64 {
            economy.accrue(1.0 / 64.0);
        }
        assert_eq!(economy.session_score(), 10.0);
        assert_eq!(economy.displayed(), 10);
        economy.accrue(0.09);
        assert_eq!(economy.displayed(), 10);
    }

    #[test]
    fn test_window_shrinks_with_speed_to_minimum() {
        let economy = economy(5);
        assert!((economy.streak_window(5.0) - 0.85).abs() < 1e-6);
        assert!((economy.streak_window(10.0) - 0.7).abs() < 1e-6);
        assert_eq!(economy.streak_window(100.0), 0.3);
    }

    #[test]
    fn test_coin_value_and_speed() {
        let mut economy = economy(5);
        let mut player = PlayerState::new(5.0);
        let outcome = economy.on_coin(1.0, &mut player, MAX_SPEED);
        assert_eq!(economy.session_score(), 10.0);
        assert_eq!(player.coins, 1);
        assert!((player.forward_speed - 5.05).abs() < 1e-6);
        assert_eq!(outcome.streak, 1);
        assert_eq!(outcome.bonus, None);
    }

    #[test]
    fn test_streak_of_three_awards_bonus_once() {
        let mut economy = economy(3);
        let mut player = PlayerState::new(5.0);
        let eps = 1e-3;

        assert_eq!(economy.on_coin(0.0, &mut player, MAX_SPEED).streak, 1);
        assert_eq!(economy.on_coin(0.5, &mut player, MAX_SPEED).streak, 2);

        let window = economy.streak_window(player.forward_speed) as f64;
        let third = economy.on_coin(0.5 + window - eps, &mut player, MAX_SPEED);
        assert_eq!(third.streak, 3);
        assert_eq!(third.bonus, Some(50.0));
        assert_eq!(economy.state().streak, 0);
        assert_eq!(economy.session_score(), 80.0);
        // 3 coins + bonus speed
        assert!((player.forward_speed - (5.0 + 0.15 + 0.25)).abs() < 1e-5);

        // Late coin starts over
        let late = economy.on_coin(10.0, &mut player, MAX_SPEED);
        assert_eq!(late.streak, 1);
        assert_eq!(late.bonus, None);
        assert_eq!(economy.session_score(), 90.0);
    }

    #[test]
    fn test_coin_just_outside_window_resets() {
        let mut economy = economy(5);
        let mut player = PlayerState::new(5.0);
        economy.on_coin(0.0, &mut player, MAX_SPEED);
        let window = economy.streak_window(player.forward_speed) as f64;
        assert_eq!(economy.on_coin(window + 1e-3, &mut player, MAX_SPEED).streak, 1);
    }

    #[test]
    fn test_speed_boost_respects_cap() {
        let mut economy = economy(5);
        let mut player = PlayerState::new(14.99);
        economy.on_coin(0.0, &mut player, MAX_SPEED);
        assert_eq!(player.forward_speed, MAX_SPEED);
    }
}

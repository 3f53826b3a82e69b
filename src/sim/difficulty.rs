//! Score to segment-variant mapping
//!
//! Variants are ordered easiest to hardest. Every `score_step` points unlocks
//! the next tier.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// How a variant is picked once the tier ceiling is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DifficultyPolicy {
    /// Always the hardest unlocked tier
    #[default]
    Deterministic,
    /// Uniform over every unlocked tier, so easy segments keep showing up
    RandomBelowCeiling,
}

/// Maps cumulative score to a variant index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyModel {
    pub score_step: f64,
    pub policy: DifficultyPolicy,
}

impl DifficultyModel {
    pub fn new(score_step: f64, policy: DifficultyPolicy) -> Self {
        Self { score_step, policy }
    }

    /// Highest unlocked tier for `score`, clamped to `[0, variant_count - 1]`
    pub fn clamped_tier(&self, score: f64, variant_count: usize) -> usize {
        if variant_count == 0 {
            return 0;
        }
        let ceiling = (score / self.score_step).floor();
        // NaN and negatives collapse to the easiest tier
        if !(ceiling >= 0.0) {
            return 0;
        }
        ceiling.min((variant_count - 1) as f64) as usize
    }

    /// Pick the variant for the next spawned segment.
    ///
    /// Only the randomized policy draws from `rng`.
    pub fn variant_index_for_score<R: Rng + ?Sized>(
        &self,
        score: f64,
        variant_count: usize,
        rng: &mut R,
    ) -> usize {
        if variant_count == 0 {
            debug_assert!(false, "difficulty model asked to pick from zero variants");
            log::error!("No segment variants to pick from, using variant 0");
            return 0;
        }
        let tier = self.clamped_tier(score, variant_count);
        match self.policy {
            DifficultyPolicy::Deterministic => tier,
            DifficultyPolicy::RandomBelowCeiling => rng.random_range(0..=tier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_deterministic_tiers() {
        let model = DifficultyModel::new(1000.0, DifficultyPolicy::Deterministic);
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(model.variant_index_for_score(0.0, 3, &mut rng), 0);
        assert_eq!(model.variant_index_for_score(999.9, 3, &mut rng), 0);
        assert_eq!(model.variant_index_for_score(1000.0, 3, &mut rng), 1);
        assert_eq!(model.variant_index_for_score(2500.0, 3, &mut rng), 2);
        assert_eq!(model.variant_index_for_score(1.0e9, 3, &mut rng), 2);
    }

    #[test]
    fn test_step_of_800() {
        let model = DifficultyModel::new(800.0, DifficultyPolicy::Deterministic);
        assert_eq!(model.clamped_tier(799.0, 4), 0);
        assert_eq!(model.clamped_tier(800.0, 4), 1);
        assert_eq!(model.clamped_tier(1600.0, 4), 2);
    }

    #[test]
    fn test_random_policy_covers_unlocked_tiers_only() {
        let model = DifficultyModel::new(1000.0, DifficultyPolicy::RandomBelowCeiling);
        let mut rng = Pcg32::seed_from_u64(42);
        let mut seen = [false; 4];
        for _ in 0..500 {
            let idx = model.variant_index_for_score(2100.0, 4, &mut rng);
            assert!(idx <= 2);
            seen[idx] = true;
        }
        assert!(seen[0] && seen[1] && seen[2]);
        assert!(!seen[3]);
    }

    #[test]
    fn test_random_policy_is_seed_deterministic() {
        let model = DifficultyModel::new(1000.0, DifficultyPolicy::RandomBelowCeiling);
        let mut a = Pcg32::seed_from_u64(7);
        let mut b = Pcg32::seed_from_u64(7);
        for score in [0.0, 1500.0, 3000.0, 9000.0] {
            assert_eq!(
                model.variant_index_for_score(score, 5, &mut a),
                model.variant_index_for_score(score, 5, &mut b)
            );
        }
    }

    #[test]
    fn test_negative_score_is_easiest() {
        let model = DifficultyModel::new(1000.0, DifficultyPolicy::Deterministic);
        assert_eq!(model.clamped_tier(-50.0, 3), 0);
    }

    proptest! {
        #[test]
        fn prop_index_in_range(
            score in 0.0f64..1.0e7,
            n in 1usize..16,
            seed in any::<u64>(),
            random in any::<bool>(),
        ) {
            let policy = if random {
                DifficultyPolicy::RandomBelowCeiling
            } else {
                DifficultyPolicy::Deterministic
            };
            let model = DifficultyModel::new(800.0, policy);
            let mut rng = Pcg32::seed_from_u64(seed);
            let idx = model.variant_index_for_score(score, n, &mut rng);
            prop_assert!(idx < n);
        }

        #[test]
        fn prop_tier_monotonic(a in 0.0f64..1.0e6, b in 0.0f64..1.0e6, n in 1usize..16) {
            let model = DifficultyModel::new(1000.0, DifficultyPolicy::Deterministic);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(model.clamped_tier(lo, n) <= model.clamped_tier(hi, n));
        }
    }
}

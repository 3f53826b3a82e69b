//! Endless track streaming
//!
//! A fixed number of segments sit end to end along +Z. When the orb has
//! run more than one segment length past the front segment's anchor, that
//! segment is moved to the back of the queue, re-skinned with a variant
//! picked from the current score, and all its spawn points are reset.
//! Segments are reused in place; nothing is allocated after `initialize`
//! beyond the occasional spawn-list growth for a larger variant.

use std::collections::VecDeque;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyModel;
use super::powerup::{PowerUpEffect, PowerUpKind};
use crate::tuning::PowerUpTuning;

/// Names one spawn point of one segment placement.
///
/// The serial changes every time a segment is recycled, so references
/// held across a recycle stop resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpawnRef {
    pub serial: u64,
    pub index: usize,
}

/// Obstacle behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Static,
    /// Barrier spinning about the vertical axis (radians/sec)
    Rotating { rate: f32 },
}

/// What sits at a spawn point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpawnKind {
    Coin,
    Obstacle(ObstacleKind),
    PowerUp(PowerUpEffect),
}

impl SpawnKind {
    pub fn is_coin(&self) -> bool {
        matches!(self, SpawnKind::Coin)
    }

    /// Cosmetic spin (radians/sec)
    fn spin_rate(&self) -> f32 {
        match self {
            SpawnKind::Coin => 10f32.to_radians(),
            SpawnKind::Obstacle(ObstacleKind::Rotating { rate }) => *rate,
            SpawnKind::Obstacle(ObstacleKind::Static) => 0.0,
            SpawnKind::PowerUp(_) => 100f32.to_radians(),
        }
    }
}

/// Spawn point layout inside a variant, relative to the segment anchor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnTemplate {
    pub kind: SpawnKind,
    pub offset: Vec3,
}

/// One difficulty tier of segment content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentVariant {
    pub name: String,
    pub spawns: Vec<SpawnTemplate>,
}

/// Live spawn point on a placed segment
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPoint {
    pub kind: SpawnKind,
    /// World position (coins drift under magnet pull)
    pub position: Vec3,
    /// Cosmetic rotation angle (radians)
    pub rotation: f32,
    pub active: bool,
}

/// A placed slice of track
#[derive(Debug, Clone)]
pub struct Segment {
    /// Stable slot identity, survives recycling
    pub id: u32,
    /// Placement identity, new on every recycle
    pub serial: u64,
    pub anchor: Vec3,
    pub length: f32,
    pub variant: usize,
    pub spawns: Vec<SpawnPoint>,
}

impl Segment {
    pub fn end_z(&self) -> f32 {
        self.anchor.z + self.length
    }

    /// Reposition and refill from `variant`, reusing the spawn allocation
    fn place(
        &mut self,
        serial: u64,
        anchor: Vec3,
        length: f32,
        variant_index: usize,
        variant: &SegmentVariant,
    ) {
        self.serial = serial;
        self.anchor = anchor;
        self.length = length;
        self.variant = variant_index;
        self.spawns.clear();
        self.spawns.extend(variant.spawns.iter().map(|t| SpawnPoint {
            kind: t.kind,
            position: anchor + t.offset,
            rotation: 0.0,
            active: true,
        }));
    }
}

/// Result of recycling one segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recycled {
    pub segment_id: u32,
    pub variant: usize,
    pub anchor_z: f32,
}

/// Bounded FIFO of track segments
#[derive(Debug, Clone)]
pub struct TrackSegmentPool {
    segments: VecDeque<Segment>,
    variants: Vec<SegmentVariant>,
    segment_length: f32,
    next_anchor: Vec3,
    next_serial: u64,
}

impl TrackSegmentPool {
    /// Empty pool over a variant catalogue ordered easiest to hardest
    pub fn new(variants: Vec<SegmentVariant>) -> Self {
        if variants.is_empty() {
            log::warn!("Track created without variants, segments will be empty");
        }
        Self {
            segments: VecDeque::new(),
            variants,
            segment_length: 0.0,
            next_anchor: Vec3::ZERO,
            next_serial: 1,
        }
    }

    /// Lay `segment_count` easiest-variant segments end to end from the origin
    pub fn initialize(&mut self, segment_count: usize, segment_length: f32) {
        self.segments.clear();
        self.segment_length = segment_length;
        self.next_anchor = Vec3::ZERO;

        for id in 0..segment_count {
            let mut segment = Segment {
                id: id as u32,
                serial: 0,
                anchor: Vec3::ZERO,
                length: segment_length,
                variant: 0,
                spawns: Vec::new(),
            };
            let serial = self.allocate_serial();
            let anchor = self.next_anchor;
            segment.place(serial, anchor, segment_length, 0, self.variant(0));
            self.next_anchor.z += segment_length;
            self.segments.push_back(segment);
        }
        log::info!(
            "Track initialized: {} segments of {} units",
            segment_count,
            segment_length
        );
    }

    fn allocate_serial(&mut self) -> u64 {
        let serial = self.next_serial;
        self.next_serial += 1;
        serial
    }

    fn variant(&self, index: usize) -> &SegmentVariant {
        static EMPTY: SegmentVariant = SegmentVariant {
            name: String::new(),
            spawns: Vec::new(),
        };
        self.variants.get(index).unwrap_or(&EMPTY)
    }

    /// Recycle every segment the orb has left behind.
    ///
    /// A segment is behind once `player_z - segment_length` exceeds its anchor.
    /// The new segment's variant comes from `difficulty` applied to `score`.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        player_z: f32,
        score: f64,
        difficulty: &DifficultyModel,
        rng: &mut R,
    ) -> Vec<Recycled> {
        let mut recycled = Vec::new();
        if self.segments.is_empty() {
            debug_assert!(false, "track pool ticked while empty");
            log::error!("Track pool is empty, skipping streaming");
            return recycled;
        }

        // One full lap at most: the newest segment always ends ahead of the orb afterwards
        for _ in 0..self.segments.len() {
            let Some(front) = self.segments.front() else { break };
            if player_z - self.segment_length <= front.anchor.z {
                break;
            }
            let Some(mut segment) = self.segments.pop_front() else { break };

            let variant = difficulty.variant_index_for_score(score, self.variants.len(), rng);
            let serial = self.allocate_serial();
            let anchor = self.next_anchor;
            segment.place(serial, anchor, self.segment_length, variant, self.variant(variant));
            self.next_anchor.z += self.segment_length;

            log::debug!(
                "Recycled segment {} to z={} as variant {}",
                segment.id,
                anchor.z,
                variant
            );
            recycled.push(Recycled {
                segment_id: segment.id,
                variant,
                anchor_z: anchor.z,
            });
            self.segments.push_back(segment);
        }
        recycled
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment_length(&self) -> f32 {
        self.segment_length
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    /// Oldest segment (next to be recycled)
    pub fn front(&self) -> Option<&Segment> {
        self.segments.front()
    }

    /// Newest segment
    pub fn back(&self) -> Option<&Segment> {
        self.segments.back()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Segment whose span contains `z`
    pub fn segment_at(&self, z: f32) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|s| z >= s.anchor.z && z < s.end_z())
    }

    pub fn spawn(&self, at: SpawnRef) -> Option<&SpawnPoint> {
        self.segments
            .iter()
            .find(|s| s.serial == at.serial)
            .and_then(|s| s.spawns.get(at.index))
    }

    fn spawn_mut(&mut self, at: SpawnRef) -> Option<&mut SpawnPoint> {
        self.segments
            .iter_mut()
            .find(|s| s.serial == at.serial)
            .and_then(|s| s.spawns.get_mut(at.index))
    }

    /// Deactivate a spawn point, returning what it held.
    ///
    /// Returns `None` if it was already inactive or no longer exists, so each
    /// coin or pickup is consumed exactly once.
    pub fn take(&mut self, at: SpawnRef) -> Option<SpawnKind> {
        let spawn = self.spawn_mut(at)?;
        if !spawn.active {
            return None;
        }
        spawn.active = false;
        Some(spawn.kind)
    }

    /// Move a live spawn point (magnet pull)
    pub fn translate(&mut self, at: SpawnRef, delta: Vec3) {
        if let Some(spawn) = self.spawn_mut(at) {
            if spawn.active {
                spawn.position += delta;
            }
        }
    }

    /// Active spawn points within `radius` of `center` that match `filter`
    pub fn live_spawns_within(
        &self,
        center: Vec3,
        radius: f32,
        filter: impl Fn(&SpawnKind) -> bool,
    ) -> Vec<(SpawnRef, Vec3)> {
        let radius_sq = radius * radius;
        self.segments
            .iter()
            .flat_map(|segment| {
                segment
                    .spawns
                    .iter()
                    .enumerate()
                    .map(move |(index, spawn)| (segment.serial, index, spawn))
            })
            .filter(|(_, _, spawn)| {
                spawn.active
                    && filter(&spawn.kind)
                    && spawn.position.distance_squared(center) <= radius_sq
            })
            .map(|(serial, index, spawn)| (SpawnRef { serial, index }, spawn.position))
            .collect()
    }

    /// Spin coins, pickups and rotating barriers
    pub fn advance_rotation(&mut self, dt: f32) {
        for segment in &mut self.segments {
            for spawn in &mut segment.spawns {
                let rate = spawn.kind.spin_rate();
                if rate != 0.0 {
                    spawn.rotation = (spawn.rotation + rate * dt).rem_euclid(std::f32::consts::TAU);
                }
            }
        }
    }
}

/// Built-in catalogue: coins only, then a static obstacle, then a rotating barrier
pub fn default_variants(power_ups: &PowerUpTuning) -> Vec<SegmentVariant> {
    let coin = |x: f32, z: f32| SpawnTemplate {
        kind: SpawnKind::Coin,
        offset: Vec3::new(x, 0.5, z),
    };
    let invincibility = PowerUpEffect {
        kind: PowerUpKind::Invincibility,
        duration: power_ups.invincibility_duration,
    };
    let magnet = PowerUpEffect {
        kind: PowerUpKind::CoinMagnet {
            radius: power_ups.magnet_radius,
            strength: power_ups.magnet_strength,
        },
        duration: power_ups.magnet_duration,
    };

    vec![
        SegmentVariant {
            name: "coin run".into(),
            spawns: vec![coin(0.0, 2.0), coin(0.0, 4.0), coin(0.0, 6.0), coin(0.0, 8.0)],
        },
        SegmentVariant {
            name: "single block".into(),
            spawns: vec![
                coin(-1.5, 2.0),
                coin(-1.5, 3.0),
                coin(-1.5, 4.0),
                SpawnTemplate {
                    kind: SpawnKind::Obstacle(ObstacleKind::Static),
                    offset: Vec3::new(1.0, 0.5, 5.0),
                },
                SpawnTemplate {
                    kind: SpawnKind::PowerUp(invincibility),
                    offset: Vec3::new(0.0, 0.5, 8.0),
                },
            ],
        },
        SegmentVariant {
            name: "spinner".into(),
            spawns: vec![
                coin(1.5, 1.0),
                coin(1.5, 2.0),
                coin(1.5, 3.0),
                SpawnTemplate {
                    kind: SpawnKind::Obstacle(ObstacleKind::Rotating {
                        rate: 100f32.to_radians(),
                    }),
                    offset: Vec3::new(0.0, 0.5, 5.0),
                },
                SpawnTemplate {
                    kind: SpawnKind::Obstacle(ObstacleKind::Static),
                    offset: Vec3::new(-1.5, 0.5, 7.0),
                },
                SpawnTemplate {
                    kind: SpawnKind::PowerUp(magnet),
                    offset: Vec3::new(1.5, 0.5, 9.0),
                },
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::difficulty::DifficultyPolicy;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn pool() -> TrackSegmentPool {
        let mut pool = TrackSegmentPool::new(default_variants(&PowerUpTuning::default()));
        pool.initialize(5, 10.0);
        pool
    }

    fn assert_contiguous(pool: &TrackSegmentPool) {
        let segments: Vec<_> = pool.segments().collect();
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end_z(), pair[1].anchor.z);
        }
    }

    #[test]
    fn test_initialize_lays_easy_segments_from_origin() {
        let pool = pool();
        assert_eq!(pool.len(), 5);
        let anchors: Vec<f32> = pool.segments().map(|s| s.anchor.z).collect();
        assert_eq!(anchors, vec![0.0, 10.0, 20.0, 30.0, 40.0]);
        assert!(pool.segments().all(|s| s.variant == 0));
        assert!(pool.segments().all(|s| s.spawns.iter().all(|p| p.active)));
    }

    #[test]
    fn test_no_recycle_until_one_length_past_front() {
        let mut pool = pool();
        let model = DifficultyModel::new(1000.0, DifficultyPolicy::Deterministic);
        let mut rng = Pcg32::seed_from_u64(1);

        assert!(pool.tick(10.0, 0.0, &model, &mut rng).is_empty());
        let recycled = pool.tick(10.5, 0.0, &model, &mut rng);
        assert_eq!(recycled.len(), 1);
        assert_eq!(recycled[0].segment_id, 0);
        assert_eq!(recycled[0].anchor_z, 50.0);
        assert_eq!(pool.front().map(|s| s.id), Some(1));
        assert_eq!(pool.back().map(|s| s.id), Some(0));
        assert_contiguous(&pool);
    }

    #[test]
    fn test_recycled_segment_uses_score_variant_and_resets_spawns() {
        let mut pool = pool();
        let model = DifficultyModel::new(1000.0, DifficultyPolicy::Deterministic);
        let mut rng = Pcg32::seed_from_u64(1);

        // Consume a coin on the front segment before it is recycled
        let front_serial = pool.front().map(|s| s.serial).unwrap();
        let coin = SpawnRef { serial: front_serial, index: 0 };
        assert_eq!(pool.take(coin), Some(SpawnKind::Coin));

        pool.tick(11.0, 2500.0, &model, &mut rng);
        let back = pool.back().unwrap();
        assert_eq!(back.variant, 2);
        assert!(back.spawns.iter().all(|p| p.active));
        assert_eq!(back.spawns[0].position, Vec3::new(1.5, 0.5, 51.0));
        // Old reference no longer resolves
        assert!(pool.spawn(coin).is_none());
        assert_eq!(pool.take(coin), None);
    }

    #[test]
    fn test_big_jump_recycles_in_order() {
        let mut pool = pool();
        let model = DifficultyModel::new(1000.0, DifficultyPolicy::Deterministic);
        let mut rng = Pcg32::seed_from_u64(1);

        let recycled = pool.tick(35.0, 0.0, &model, &mut rng);
        let ids: Vec<u32> = recycled.iter().map(|r| r.segment_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(pool.len(), 5);
        assert_contiguous(&pool);
    }

    #[test]
    fn test_take_is_once_only() {
        let mut pool = pool();
        let serial = pool.front().unwrap().serial;
        let at = SpawnRef { serial, index: 1 };
        assert_eq!(pool.take(at), Some(SpawnKind::Coin));
        assert_eq!(pool.take(at), None);
    }

    #[test]
    fn test_live_spawns_within_filters() {
        let mut pool = pool();
        let near = pool.live_spawns_within(Vec3::new(0.0, 0.5, 3.0), 1.5, SpawnKind::is_coin);
        assert_eq!(near.len(), 2);
        pool.take(near[0].0);
        let near = pool.live_spawns_within(Vec3::new(0.0, 0.5, 3.0), 1.5, SpawnKind::is_coin);
        assert_eq!(near.len(), 1);
    }

    #[test]
    fn test_rotation_only_spins_moving_kinds() {
        let mut pool = TrackSegmentPool::new(default_variants(&PowerUpTuning::default()));
        pool.initialize(1, 10.0);
        pool.advance_rotation(1.0);
        let front = pool.front().unwrap();
        assert!(front.spawns.iter().all(|s| s.rotation > 0.0));
    }

    #[test]
    fn test_segment_at() {
        let pool = pool();
        assert_eq!(pool.segment_at(25.0).map(|s| s.id), Some(2));
        assert!(pool.segment_at(-1.0).is_none());
        assert!(pool.segment_at(50.0).is_none());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "track pool ticked while empty")]
    fn test_empty_pool_tick_is_fatal_in_debug() {
        let mut pool = TrackSegmentPool::new(default_variants(&PowerUpTuning::default()));
        let model = DifficultyModel::new(1000.0, DifficultyPolicy::Deterministic);
        let mut rng = Pcg32::seed_from_u64(1);
        pool.tick(100.0, 0.0, &model, &mut rng);
    }

    proptest! {
        #[test]
        fn prop_length_and_contiguity_hold(
            steps in proptest::collection::vec(0.0f32..25.0, 1..60),
            scores in proptest::collection::vec(0.0f64..5000.0, 60),
            seed in any::<u64>(),
        ) {
            let mut pool = pool();
            let model = DifficultyModel::new(800.0, DifficultyPolicy::RandomBelowCeiling);
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut z = 0.0f32;
            let mut last_serial = pool.back().unwrap().serial;
            for (i, step) in steps.iter().enumerate() {
                z += step;
                pool.tick(z, scores[i], &model, &mut rng);
                prop_assert_eq!(pool.len(), 5);
                let segments: Vec<_> = pool.segments().collect();
                for pair in segments.windows(2) {
                    prop_assert_eq!(pair[0].end_z(), pair[1].anchor.z);
                    prop_assert!(pair[0].serial < pair[1].serial);
                }
                prop_assert!(pool.back().unwrap().serial >= last_serial);
                last_serial = pool.back().unwrap().serial;
                prop_assert!(pool.segments().all(|s| s.variant < pool.variant_count()));
            }
        }
    }
}

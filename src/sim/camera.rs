//! Chase camera

use glam::Vec3;

use crate::smooth_damp;
use crate::tuning::CameraTuning;

/// Trails the orb at a fixed offset with a critically damped spring
#[derive(Debug, Clone)]
pub struct FollowCamera {
    pub position: Vec3,
    velocity: Vec3,
    pub offset: Vec3,
    pub smooth_time: f32,
}

impl FollowCamera {
    /// Camera already settled behind `target`
    pub fn new(tuning: &CameraTuning, target: Vec3) -> Self {
        Self {
            position: target + tuning.offset,
            velocity: Vec3::ZERO,
            offset: tuning.offset,
            smooth_time: tuning.smooth_time,
        }
    }

    pub fn update(&mut self, target: Vec3, dt: f32) {
        let desired = target + self.offset;
        self.position = Vec3::new(
            smooth_damp(self.position.x, desired.x, &mut self.velocity.x, self.smooth_time, dt),
            smooth_damp(self.position.y, desired.y, &mut self.velocity.y, self.smooth_time, dt),
            smooth_damp(self.position.z, desired.z, &mut self.velocity.z, self.smooth_time, dt),
        );
    }
}

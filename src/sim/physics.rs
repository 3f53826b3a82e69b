//! Rigid-body seam
//!
//! The simulation drives the orb through `PhysicsBody` only: read and write
//! velocity, push forces, toggle kinematic mode, step the integrator and
//! collect the contacts it reports. `RigidBody` is a small reference
//! integrator over a flat track floor for headless runs and tests.

use glam::Vec3;

use super::track::SpawnRef;

/// How a force vector is applied (mirrors common engine semantics)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceMode {
    /// Continuous force, scaled by mass and dt
    Force,
    /// Continuous acceleration, scaled by dt, ignores mass
    Acceleration,
    /// Instant momentum change, scaled by mass
    Impulse,
    /// Instant velocity change, ignores mass
    VelocityChange,
}

/// Collision or trigger reported by the physics layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Touched track geometry
    Track,
    /// Touched a spawn point (coin, obstacle or pickup) on a segment
    Spawn(SpawnRef),
}

/// Opaque rigid-body integrator driving the orb
pub trait PhysicsBody {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);
    fn set_angular_velocity(&mut self, angular_velocity: Vec3);
    fn apply_force(&mut self, force: Vec3, mode: ForceMode);
    fn is_kinematic(&self) -> bool;
    /// Kinematic bodies ignore forces and stop reporting contacts
    fn set_kinematic(&mut self, kinematic: bool);
    /// Integrate one fixed step
    fn step(&mut self, dt: f32);
    /// Move contacts produced since the last call into `out`
    fn drain_contacts(&mut self, out: &mut Vec<Contact>);
}

/// Flat walkable strip centred on x = 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackFloor {
    pub height: f32,
    pub half_width: f32,
}

/// Bodies this far below the floor surface are still snapped back onto it
const FLOOR_SNAP: f32 = 0.05;

/// Sphere integrated with semi-implicit Euler
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
    pub radius: f32,
    pub gravity: Vec3,
    /// Linear drag coefficient (velocity *= 1 - drag * dt)
    pub drag: f32,
    pub floor: Option<TrackFloor>,
    kinematic: bool,
    resting: bool,
    pending_accel: Vec3,
    contacts: Vec<Contact>,
}

impl RigidBody {
    /// Orb resting on the track at the origin
    pub fn orb(radius: f32, half_width: f32) -> Self {
        Self {
            position: Vec3::new(0.0, radius, 0.0),
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 1.0,
            radius,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            drag: 0.0,
            floor: Some(TrackFloor {
                height: 0.0,
                half_width,
            }),
            kinematic: false,
            resting: true,
            pending_accel: Vec3::ZERO,
            contacts: Vec::new(),
        }
    }

    /// Whether the body is currently supported by the floor
    pub fn is_resting(&self) -> bool {
        self.resting
    }
}

impl PhysicsBody for RigidBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.resting = false;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn set_angular_velocity(&mut self, angular_velocity: Vec3) {
        self.angular_velocity = angular_velocity;
    }

    fn apply_force(&mut self, force: Vec3, mode: ForceMode) {
        if self.kinematic {
            return;
        }
        let inv_mass = if self.mass > 0.0 { 1.0 / self.mass } else { 0.0 };
        match mode {
            ForceMode::Force => self.pending_accel += force * inv_mass,
            ForceMode::Acceleration => self.pending_accel += force,
            ForceMode::Impulse => self.velocity += force * inv_mass,
            ForceMode::VelocityChange => self.velocity += force,
        }
        // Upward pushes leave the floor; the next snap reports a landing
        if force.y > 0.0 {
            self.resting = false;
        }
    }

    fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    fn set_kinematic(&mut self, kinematic: bool) {
        self.kinematic = kinematic;
        if kinematic {
            self.pending_accel = Vec3::ZERO;
            self.contacts.clear();
        }
    }

    fn step(&mut self, dt: f32) {
        if self.kinematic {
            return;
        }
        let prev_bottom = self.position.y - self.radius;

        self.velocity += (self.gravity + self.pending_accel) * dt;
        self.pending_accel = Vec3::ZERO;
        if self.drag > 0.0 {
            self.velocity *= (1.0 - self.drag * dt).clamp(0.0, 1.0);
        }
        self.position += self.velocity * dt;

        let Some(floor) = self.floor else {
            self.resting = false;
            return;
        };
        let bottom = self.position.y - self.radius;
        let over_track = self.position.x.abs() <= floor.half_width;
        let crossed = prev_bottom >= floor.height - FLOOR_SNAP && bottom <= floor.height;
        if over_track && crossed && self.velocity.y <= 0.0 {
            self.position.y = floor.height + self.radius;
            self.velocity.y = 0.0;
            if !self.resting {
                self.contacts.push(Contact::Track);
            }
            self.resting = true;
        } else {
            self.resting = false;
        }
    }

    fn drain_contacts(&mut self, out: &mut Vec<Contact>) {
        out.append(&mut self.contacts);
    }
}

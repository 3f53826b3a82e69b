//! Input fusion
//!
//! Keyboard, device tilt and touch gestures are merged into one steering
//! value in [-1, 1] and an edge-triggered jump request. Keyboard steering
//! wins whenever it is outside the deadzone; otherwise the configured
//! touch scheme steers. Jump swipes are recognised in both schemes.
//!
//! Pointer positions are in pixels with y pointing up.

use glam::Vec2;

use crate::consts::{DRAG_START_THRESHOLD, INPUT_DEADZONE};
use crate::settings::ControlScheme;
use crate::tuning::GestureTuning;

/// Phase of the primary touch this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Began,
    Moved,
    Stationary,
    Ended,
    Canceled,
}

/// Primary touch sample for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub phase: PointerPhase,
    pub position: Vec2,
}

/// Raw device state for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameControls {
    /// Horizontal keyboard axis in [-1, 1]
    pub keyboard_axis: f32,
    /// Jump key held (edges are detected here)
    pub jump_held: bool,
    /// Raw device tilt along x
    pub tilt_x: f32,
    pub pointer: Option<PointerSample>,
}

/// Result of fusion for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FusedInput {
    pub steer: f32,
    /// True for exactly one frame per recognised jump
    pub jump_requested: bool,
}

#[derive(Debug, Clone, Copy)]
struct Touch {
    start: Vec2,
    started_at: f64,
}

/// Stateful gesture recogniser
#[derive(Debug, Clone)]
pub struct InputFusion {
    scheme: ControlScheme,
    gestures: GestureTuning,
    tilt_sensitivity: f32,
    touch: Option<Touch>,
    dragging: bool,
    prev_jump_held: bool,
}

impl InputFusion {
    pub fn new(scheme: ControlScheme, gestures: GestureTuning, tilt_sensitivity: f32) -> Self {
        log::info!("Current control scheme loaded: {}", scheme.as_str());
        Self {
            scheme,
            gestures,
            tilt_sensitivity,
            touch: None,
            dragging: false,
            prev_jump_held: false,
        }
    }

    pub fn scheme(&self) -> ControlScheme {
        self.scheme
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Forget any touch in progress (used on revive)
    pub fn reset(&mut self) {
        self.touch = None;
        self.dragging = false;
    }

    /// Fuse one frame of input. `now` is unscaled frame time in seconds.
    pub fn sample(&mut self, controls: &FrameControls, grounded: bool, now: f64) -> FusedInput {
        let mut jump_requested = false;

        // Keyboard
        let keyboard = controls.keyboard_axis.clamp(-1.0, 1.0);
        let keyboard_steer = (keyboard.abs() > INPUT_DEADZONE).then_some(keyboard);
        let jump_pressed = controls.jump_held && !self.prev_jump_held;
        self.prev_jump_held = controls.jump_held;
        if jump_pressed && grounded {
            jump_requested = true;
        }

        // Touch
        let mut touch_steer = None;
        if let Some(pointer) = controls.pointer {
            match pointer.phase {
                PointerPhase::Began => {
                    self.touch = Some(Touch {
                        start: pointer.position,
                        started_at: now,
                    });
                    self.dragging = false;
                }
                PointerPhase::Moved | PointerPhase::Stationary => {
                    if self.scheme == ControlScheme::SwipeDrag {
                        touch_steer = self.track_drag(pointer);
                    }
                }
                PointerPhase::Ended => {
                    if let Some(touch) = self.touch.take() {
                        if !self.dragging
                            && grounded
                            && self.is_jump_swipe(touch, pointer.position, now)
                        {
                            jump_requested = true;
                        }
                    }
                    self.dragging = false;
                }
                PointerPhase::Canceled => {
                    self.touch = None;
                    self.dragging = false;
                }
            }
        }

        // Tilt
        let tilt_steer = if self.scheme == ControlScheme::Tilt {
            let tilt = controls.tilt_x * self.tilt_sensitivity;
            (tilt.abs() > INPUT_DEADZONE).then(|| tilt.clamp(-1.0, 1.0))
        } else {
            None
        };

        let steer = keyboard_steer.or(touch_steer).or(tilt_steer).unwrap_or(0.0);
        FusedInput {
            steer,
            jump_requested,
        }
    }

    /// Drag steering: mostly-horizontal travel past the threshold starts a drag
    fn track_drag(&mut self, pointer: PointerSample) -> Option<f32> {
        let touch = self.touch?;
        let delta = pointer.position - touch.start;
        if pointer.phase == PointerPhase::Moved
            && delta.x.abs() > DRAG_START_THRESHOLD
            && delta.x.abs() > delta.y.abs()
        {
            self.dragging = true;
        }
        self.dragging
            .then(|| (delta.x * self.gestures.swipe_sensitivity).clamp(-1.0, 1.0))
    }

    /// Fast, long, mostly-vertical upward swipe
    fn is_jump_swipe(&self, touch: Touch, end: Vec2, now: f64) -> bool {
        let duration = now - touch.started_at;
        let delta = end - touch.start;
        duration < self.gestures.max_swipe_time as f64
            && delta.y > self.gestures.min_swipe_distance
            && delta.y.abs() > delta.x.abs()
    }
}

//! Platform-neutral input: held actions, mouse motion and toggle edge detection.

use std::collections::HashSet;

use crate::Vec2;
use crate::camera::Movement;

/// Logical actions the demo reacts to; the platform maps physical keys onto these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    MoveForward,
    MoveBack,
    StrafeLeft,
    StrafeRight,
    MoveDown,
    MoveUp,
    ToggleDayNight,
    ToggleFog,
    ToggleOverlay,
}

/// Input gathered between two frames.
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Action>,
    mouse_delta: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, action: Action, pressed: bool) {
        if pressed {
            self.held.insert(action);
        } else {
            self.held.remove(&action);
        }
    }

    #[inline]
    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Accumulate raw mouse motion in pixels.
    pub fn add_mouse_delta(&mut self, dx: f32, dy: f32) {
        self.mouse_delta += Vec2::new(dx, dy);
    }

    /// Motion since the last call; resets the accumulator.
    pub fn take_mouse_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.mouse_delta)
    }

    pub fn movement(&self) -> Movement {
        let axis = |pos: Action, neg: Action| {
            f32::from(u8::from(self.is_held(pos))) - f32::from(u8::from(self.is_held(neg)))
        };
        Movement {
            forward: axis(Action::MoveForward, Action::MoveBack),
            right: axis(Action::StrafeRight, Action::StrafeLeft),
            up: axis(Action::MoveUp, Action::MoveDown),
        }
    }

    /// Forget everything, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
        self.mouse_delta = Vec2::ZERO;
    }
}

/// Fires once per press of a held key.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToggleLatch {
    pressed: bool,
}

impl ToggleLatch {
    /// Returns `true` only on the frame the key goes down.
    pub fn update(&mut self, held: bool) -> bool {
        let fired = held && !self.pressed;
        self.pressed = held;
        fired
    }
}

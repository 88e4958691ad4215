//! Keyboard + gamepad input source
//!
//! Keyboard: arrows or WASD steer, Space/Z jump, X/Left Shift run,
//! Enter starts, P pauses, Escape quits.
//! Gamepad buttons are OR'd in; the left stick feeds the tilt axis after
//! its resting drift is calibrated out.

use macroquad::prelude::*;

use crate::error::CollaboratorError;
use crate::input::{Buttons, Gamepad, InputSource, InputState, InputTracker, TiltCalibrator};

/// Resting stick samples averaged at startup
const STICK_CALIBRATION_SAMPLES: u32 = 10;
/// Stick deflection read as centered after calibration
const STICK_DEADZONE: f32 = 0.05;
/// Deflection past the deadzone that maps to full speed
const STICK_RANGE: f32 = 0.9;

const KEY_MAP: &[(KeyCode, Buttons)] = &[
    (KeyCode::Left, Buttons::LEFT),
    (KeyCode::A, Buttons::LEFT),
    (KeyCode::Right, Buttons::RIGHT),
    (KeyCode::D, Buttons::RIGHT),
    (KeyCode::Up, Buttons::UP),
    (KeyCode::W, Buttons::UP),
    (KeyCode::Down, Buttons::DOWN),
    (KeyCode::S, Buttons::DOWN),
    (KeyCode::Space, Buttons::JUMP),
    (KeyCode::Z, Buttons::JUMP),
    (KeyCode::X, Buttons::RUN),
    (KeyCode::LeftShift, Buttons::RUN),
    (KeyCode::Enter, Buttons::START),
    (KeyCode::P, Buttons::PAUSE),
    (KeyCode::Escape, Buttons::QUIT),
];

pub struct HostInput {
    gamepad: Gamepad,
    tracker: InputTracker,
    stick: TiltCalibrator,
}

impl HostInput {
    pub fn new() -> Self {
        let mut stick = TiltCalibrator::with_samples(STICK_CALIBRATION_SAMPLES);
        stick.deadzone = STICK_DEADZONE;
        stick.max = STICK_RANGE;
        Self {
            gamepad: Gamepad::new(),
            tracker: InputTracker::new(),
            stick,
        }
    }

    fn keyboard(&self) -> Buttons {
        KEY_MAP
            .iter()
            .filter(|(key, _)| is_key_down(*key))
            .fold(Buttons::empty(), |held, (_, b)| held | *b)
    }

    fn stick_tilt(&mut self) -> f32 {
        if !self.gamepad.has_gamepad() {
            return 0.0;
        }
        let raw = self.gamepad.stick_x();
        if !self.stick.is_calibrated() {
            self.stick.feed(raw);
            return 0.0;
        }
        self.stick.axis(raw)
    }
}

impl Default for HostInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for HostInput {
    fn poll(&mut self) -> Result<InputState, CollaboratorError> {
        self.gamepad.poll();
        let held = self.keyboard() | self.gamepad.buttons();
        let tilt = self.stick_tilt();
        Ok(self.tracker.sample(held, tilt))
    }
}

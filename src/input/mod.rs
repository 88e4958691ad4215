//! Input sampling
//!
//! Button snapshots with edge detection, the `InputSource` collaborator
//! trait, and tilt calibration for analog steering.
//!
//! Native: gamepads through gilrs
//! WASM: keyboard only (see `host`)

mod gamepad;
mod state;
mod tilt;

pub use gamepad::{apply_deadzone, Gamepad, STICK_DEADZONE};
pub use state::*;
pub use tilt::{TiltCalibrator, CALIBRATION_SAMPLES, TILT_DEADZONE, TILT_MAX};

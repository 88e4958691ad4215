//! Gamepad support
//!
//! Native: Uses gilrs crate for cross-platform gamepad input
//! WASM: No gamepad; the browser build plays with the keyboard only
//!
//! Layout follows the workshop board: D-pad or left stick steers, South
//! jumps, West runs, Start starts/restarts and Select pauses.

use super::state::Buttons;

/// Stick deflection below this is treated as centered
pub const STICK_DEADZONE: f32 = 0.15;

/// Vertical stick deflection that counts as a D-pad press
#[cfg_attr(target_arch = "wasm32", allow(dead_code))]
const STICK_DPAD_THRESHOLD: f32 = 0.5;

/// Remove the deadzone and rescale the rest to 0..=1
pub fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    if value.abs() < deadzone {
        0.0
    } else {
        let sign = value.signum();
        let scaled = (value.abs() - deadzone) / (1.0 - deadzone);
        sign * scaled.min(1.0)
    }
}

// ============================================================================
// WASM Implementation (keyboard only)
// ============================================================================

#[cfg(target_arch = "wasm32")]
mod platform {
    use super::*;

    pub struct Gamepad;

    impl Gamepad {
        pub fn new() -> Self {
            Self
        }

        pub fn poll(&mut self) {}

        pub fn has_gamepad(&self) -> bool {
            false
        }

        pub fn buttons(&self) -> Buttons {
            Buttons::empty()
        }

        pub fn stick_x(&self) -> f32 {
            0.0
        }
    }
}

// ============================================================================
// Native Implementation (gilrs)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
mod platform {
    use super::*;
    use gilrs::{Axis, Button as GilrsButton, Gilrs};

    pub struct Gamepad {
        /// None when the platform backend failed to start
        gilrs: Option<Gilrs>,
    }

    impl Gamepad {
        pub fn new() -> Self {
            let gilrs = match Gilrs::new() {
                Ok(g) => Some(g),
                Err(e) => {
                    log::warn!("Gamepad support unavailable: {}", e);
                    None
                }
            };
            Self { gilrs }
        }

        pub fn poll(&mut self) {
            let Some(gilrs) = self.gilrs.as_mut() else { return };
            // Process gilrs events to update internal state
            while let Some(event) = gilrs.next_event() {
                if let gilrs::EventType::Connected = event.event {
                    log::info!("Gamepad connected: {}", gilrs.gamepad(event.id).name());
                }
            }
        }

        pub fn has_gamepad(&self) -> bool {
            self.gilrs.as_ref().is_some_and(|g| g.gamepads().next().is_some())
        }

        fn active_gamepad(&self) -> Option<gilrs::Gamepad<'_>> {
            self.gilrs.as_ref()?.gamepads().next().map(|(_, gp)| gp)
        }

        pub fn buttons(&self) -> Buttons {
            let Some(gp) = self.active_gamepad() else { return Buttons::empty() };
            let mut held = Buttons::empty();

            if gp.is_pressed(GilrsButton::DPadLeft) { held |= Buttons::LEFT; }
            if gp.is_pressed(GilrsButton::DPadRight) { held |= Buttons::RIGHT; }
            if gp.is_pressed(GilrsButton::DPadUp) { held |= Buttons::UP; }
            if gp.is_pressed(GilrsButton::DPadDown) { held |= Buttons::DOWN; }
            if gp.is_pressed(GilrsButton::South) { held |= Buttons::JUMP; }
            if gp.is_pressed(GilrsButton::West) { held |= Buttons::RUN; }
            if gp.is_pressed(GilrsButton::Start) { held |= Buttons::START; }
            if gp.is_pressed(GilrsButton::Select) { held |= Buttons::PAUSE; }

            // Left stick up/down acts as the D-pad for top-down games
            let y = apply_deadzone(gp.value(Axis::LeftStickY), STICK_DPAD_THRESHOLD);
            if y > 0.0 { held |= Buttons::UP; }
            if y < 0.0 { held |= Buttons::DOWN; }

            held
        }

        /// Raw left stick horizontal deflection in -1.0..=1.0. Drift is
        /// left in; callers calibrate it out.
        pub fn stick_x(&self) -> f32 {
            let Some(gp) = self.active_gamepad() else { return 0.0 };
            gp.value(Axis::LeftStickX)
        }
    }
}

pub use platform::Gamepad;

impl Default for Gamepad {
    fn default() -> Self {
        Self::new()
    }
}

//! Input state snapshots
//!
//! One `InputState` is sampled per frame. It carries the buttons held this
//! frame plus the buttons held last frame, which is all the history the core
//! keeps: enough to tell "pressed this frame" from "held".

use std::collections::VecDeque;

use bitflags::bitflags;

use crate::error::CollaboratorError;

bitflags! {
    /// Digital inputs, one bit per button
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u16 {
        const LEFT  = 1 << 0;
        const RIGHT = 1 << 1;
        const UP    = 1 << 2;
        const DOWN  = 1 << 3;
        const JUMP  = 1 << 4;
        const RUN   = 1 << 5;
        const START = 1 << 6;
        const PAUSE = 1 << 7;
        /// Leaves the frame loop; never seen by gameplay
        const QUIT  = 1 << 8;
    }
}

/// Buttons and analog tilt for a single frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputState {
    held: Buttons,
    previous: Buttons,
    /// Horizontal tilt in -1.0..=1.0 (0 when no analog source)
    tilt: f32,
}

impl InputState {
    pub fn new(held: Buttons, previous: Buttons, tilt: f32) -> Self {
        let tilt = if tilt.is_finite() { tilt.clamp(-1.0, 1.0) } else { 0.0 };
        Self { held, previous, tilt }
    }

    /// Nothing held, nothing pressed
    pub fn idle() -> Self {
        Self::default()
    }

    /// Buttons that went down this frame (nothing held last frame)
    pub fn pressing(buttons: Buttons) -> Self {
        Self::new(buttons, Buttons::empty(), 0.0)
    }

    /// Buttons held both this frame and last frame
    pub fn holding(buttons: Buttons) -> Self {
        Self::new(buttons, buttons, 0.0)
    }

    pub fn with_tilt(mut self, tilt: f32) -> Self {
        self.tilt = if tilt.is_finite() { tilt.clamp(-1.0, 1.0) } else { 0.0 };
        self
    }

    pub fn buttons(&self) -> Buttons {
        self.held
    }

    /// Is the button currently down?
    pub fn held(&self, b: Buttons) -> bool {
        self.held.intersects(b)
    }

    /// Did the button go down this frame?
    pub fn pressed(&self, b: Buttons) -> bool {
        self.held.intersects(b) && !self.previous.intersects(b)
    }

    /// Did the button come up this frame?
    pub fn released(&self, b: Buttons) -> bool {
        !self.held.intersects(b) && self.previous.intersects(b)
    }

    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    /// Horizontal axis in -1.0..=1.0. Digital left/right wins over tilt.
    pub fn horizontal(&self) -> f32 {
        match (self.held(Buttons::LEFT), self.held(Buttons::RIGHT)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            (true, true) => 0.0,
            (false, false) => self.tilt,
        }
    }

    /// Vertical axis in -1.0..=1.0 (negative is up)
    pub fn vertical(&self) -> f32 {
        match (self.held(Buttons::UP), self.held(Buttons::DOWN)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.held(Buttons::QUIT)
    }
}

/// Turns raw per-frame button reads into `InputState`s with edge history.
/// Input sources embed one of these.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputTracker {
    last: Buttons,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(&mut self, held: Buttons, tilt: f32) -> InputState {
        let state = InputState::new(held, self.last, tilt);
        self.last = held;
        state
    }
}

/// Input collaborator. Must return promptly; the frame waits on it.
pub trait InputSource {
    fn poll(&mut self) -> Result<InputState, CollaboratorError>;
}

impl<S: InputSource + ?Sized> InputSource for &mut S {
    fn poll(&mut self) -> Result<InputState, CollaboratorError> {
        (**self).poll()
    }
}

/// Replays a fixed list of raw frames, then reports idle input
/// (or Quit, when built with `then_quit`).
#[derive(Debug, Default)]
pub struct ScriptedInput {
    frames: VecDeque<(Buttons, f32)>,
    tracker: InputTracker,
    quit_when_done: bool,
}

impl ScriptedInput {
    pub fn new<I: IntoIterator<Item = Buttons>>(frames: I) -> Self {
        Self {
            frames: frames.into_iter().map(|b| (b, 0.0)).collect(),
            tracker: InputTracker::new(),
            quit_when_done: false,
        }
    }

    pub fn with_tilt<I: IntoIterator<Item = (Buttons, f32)>>(frames: I) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            tracker: InputTracker::new(),
            quit_when_done: false,
        }
    }

    pub fn then_quit(mut self) -> Self {
        self.quit_when_done = true;
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Result<InputState, CollaboratorError> {
        let (held, tilt) = match self.frames.pop_front() {
            Some(frame) => frame,
            None if self.quit_when_done => (Buttons::QUIT, 0.0),
            None => (Buttons::empty(), 0.0),
        };
        Ok(self.tracker.sample(held, tilt))
    }
}

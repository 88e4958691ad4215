//! Game state machine
//!
//! ```text
//!   Title --Start--> Playing --Pause--> Paused
//!                     |  ^----Pause-------'
//!          lives == 0 |  | win condition
//!                     v  v
//!               GameOver  Won --Restart--> Title
//!                  '----------Restart-----> Title
//! ```
//!
//! Every other (state, trigger) pair leaves the state unchanged. There is
//! no automatic restart: GameOver and Won wait for an explicit Restart.

/// The single active game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    #[default]
    Title,
    Playing,
    Paused,
    GameOver,
    Won,
}

/// Things that can move the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Start pressed on the title screen
    Start,
    /// Pause pressed (toggles)
    Pause,
    /// Last life lost
    PlayerDied,
    /// Win condition met
    GoalReached,
    /// Start pressed on a finished game
    Restart,
}

impl GameState {
    /// The state after `trigger`, or `None` when the trigger does not apply
    pub fn transition(self, trigger: Trigger) -> Option<GameState> {
        use GameState::*;
        match (self, trigger) {
            (Title, Trigger::Start) => Some(Playing),
            (Playing, Trigger::Pause) => Some(Paused),
            (Paused, Trigger::Pause) => Some(Playing),
            (Playing, Trigger::PlayerDied) => Some(GameOver),
            (Playing, Trigger::GoalReached) => Some(Won),
            (GameOver, Trigger::Restart) | (Won, Trigger::Restart) => Some(Title),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GameState::Title => "PRESS START",
            GameState::Playing => "",
            GameState::Paused => "PAUSED",
            GameState::GameOver => "GAME OVER",
            GameState::Won => "LEVEL COMPLETE",
        }
    }
}

//! Arbiter mode and owned state

use serde::{Deserialize, Serialize};

/// Progress of a voice-requested color search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchPhase {
    /// Search mode entered but suspended by a steering command
    NotStarted,
    /// Spinning, classifying frames, pausing after finds
    Active,
}

/// Top-level behavior of the robot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Keep the last commanded speeds
    Follow,
    /// Steer away from obstacles
    Avoid,
    /// Look for a red, green or blue blob
    Search(SearchPhase),
}

impl Mode {
    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            Mode::Follow => "\x1b[36m",                      // Cyan
            Mode::Avoid => "\x1b[31m",                       // Red
            Mode::Search(SearchPhase::Active) => "\x1b[33m", // Yellow
            Mode::Search(SearchPhase::NotStarted) => "\x1b[90m",
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for mode
    pub fn emoji(&self) -> &'static str {
        match self {
            Mode::Follow => "🎙",
            Mode::Avoid => "🚧",
            Mode::Search(_) => "🔍",
        }
    }

    pub fn is_search_active(&self) -> bool {
        *self == Mode::Search(SearchPhase::Active)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mode::Follow => "FOLLOW",
            Mode::Avoid => "AVOID",
            Mode::Search(SearchPhase::Active) => "SEARCH",
            Mode::Search(SearchPhase::NotStarted) => "SEARCH(idle)",
        };
        write!(f, "{}", name)
    }
}

/// Left/right wheel velocity pair, always within [-bound, bound]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelSpeeds {
    pub left: f64,
    pub right: f64,
}

impl WheelSpeeds {
    pub const STOPPED: WheelSpeeds = WheelSpeeds { left: 0.0, right: 0.0 };

    /// Clamp both wheels into [-bound, bound]
    pub fn bounded(left: f64, right: f64, bound: f64) -> Self {
        Self {
            left: left.clamp(-bound, bound),
            right: right.clamp(-bound, bound),
        }
    }

    /// Same speed on both wheels
    pub fn straight(speed: f64, bound: f64) -> Self {
        Self::bounded(speed, speed, bound)
    }

    /// Counter-clockwise spin in place
    pub fn spin_left(speed: f64, bound: f64) -> Self {
        Self::bounded(-speed, speed, bound)
    }

    /// Clockwise spin in place
    pub fn spin_right(speed: f64, bound: f64) -> Self {
        Self::bounded(speed, -speed, bound)
    }
}

/// Everything the arbiter carries from one tick to the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbiterState {
    pub mode: Mode,
    /// Ticks left in the post-find pause
    pub pause_counter: u32,
    /// Last speeds written to the motors
    pub speeds: WheelSpeeds,
}

impl Default for ArbiterState {
    fn default() -> Self {
        Self {
            mode: Mode::Follow,
            pause_counter: 0,
            speeds: WheelSpeeds::STOPPED,
        }
    }
}

impl ArbiterState {
    pub fn search_active(&self) -> bool {
        self.mode.is_search_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = ArbiterState::default();
        assert_eq!(state.mode, Mode::Follow);
        assert_eq!(state.pause_counter, 0);
        assert_eq!(state.speeds, WheelSpeeds::STOPPED);
        assert!(!state.search_active());
    }

    #[test]
    fn test_speeds_are_clamped() {
        let speeds = WheelSpeeds::bounded(10.0, -10.0, 6.28);
        assert_eq!(speeds.left, 6.28);
        assert_eq!(speeds.right, -6.28);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Avoid.to_string(), "AVOID");
        assert_eq!(Mode::Search(SearchPhase::Active).to_string(), "SEARCH");
    }
}

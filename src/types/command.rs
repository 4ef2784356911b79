//! Discrete signals fed to the arbiter

use serde::{Deserialize, Serialize};

/// Command recognized in a spoken utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoiceCommand {
    Straight,
    Left,
    Right,
    Stop,
    Search,
    /// No actionable keyword; prior motor state is kept
    None,
}

impl VoiceCommand {
    /// STRAIGHT/LEFT/RIGHT/STOP set the wheels directly
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            VoiceCommand::Straight | VoiceCommand::Left | VoiceCommand::Right | VoiceCommand::Stop
        )
    }
}

impl std::fmt::Display for VoiceCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VoiceCommand::Straight => "STRAIGHT",
            VoiceCommand::Left => "LEFT",
            VoiceCommand::Right => "RIGHT",
            VoiceCommand::Stop => "STOP",
            VoiceCommand::Search => "SEARCH",
            VoiceCommand::None => "NONE",
        };
        write!(f, "{}", name)
    }
}

/// Dominant color in the camera sample region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorVerdict {
    Red,
    Green,
    Blue,
    None,
}

impl ColorVerdict {
    /// Lowercase name used in console lines and filenames
    pub fn name(&self) -> &'static str {
        match self {
            ColorVerdict::Red => "red",
            ColorVerdict::Green => "green",
            ColorVerdict::Blue => "blue",
            ColorVerdict::None => "none",
        }
    }

    /// ANSI escape for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            ColorVerdict::Red => "\x1b[31m",
            ColorVerdict::Green => "\x1b[32m",
            ColorVerdict::Blue => "\x1b[34m",
            ColorVerdict::None => "",
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Snapshot filename, one per color; repeat finds overwrite it
    pub fn filename(&self) -> Option<&'static str> {
        match self {
            ColorVerdict::Red => Some("red_blob.ppm"),
            ColorVerdict::Green => Some("green_blob.ppm"),
            ColorVerdict::Blue => Some("blue_blob.ppm"),
            ColorVerdict::None => None,
        }
    }

    pub fn is_found(&self) -> bool {
        *self != ColorVerdict::None
    }
}

impl std::fmt::Display for ColorVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_commands() {
        assert!(VoiceCommand::Straight.is_motion());
        assert!(VoiceCommand::Stop.is_motion());
        assert!(!VoiceCommand::Search.is_motion());
        assert!(!VoiceCommand::None.is_motion());
    }

    #[test]
    fn test_found_verdicts() {
        assert!(ColorVerdict::Green.is_found());
        assert!(!ColorVerdict::None.is_found());
        assert_eq!(ColorVerdict::None.filename(), None);
        assert_eq!(ColorVerdict::Blue.to_string(), "BLUE");
    }
}

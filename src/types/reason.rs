//! Reason codes for tick decisions and collaborator failures

use serde::{Deserialize, Serialize};

/// Why the arbiter chose this tick's wheel speeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R1xx: Voice
    // =========================================================================
    /// Heard "straight"
    R101_VOICE_STRAIGHT,
    /// Heard "left"
    R102_VOICE_LEFT,
    /// Heard "right"
    R103_VOICE_RIGHT,
    /// Heard "stop"
    R104_VOICE_STOP,
    /// Heard "search", color search armed
    R105_SEARCH_REQUESTED,

    // =========================================================================
    // R2xx: Avoidance
    // =========================================================================
    /// Obstacle on the left flank, turning right
    R201_AVOID_LEFT_FLANK,
    /// Obstacle on the right flank, turning left
    R201_AVOID_RIGHT_FLANK,
    /// Escalated but no flank sensor triggered, driving straight
    R202_AVOID_FALLBACK_STRAIGHT,

    // =========================================================================
    // R3xx: Search
    // =========================================================================
    /// Holding still right after a find
    R301_SEARCH_SETTLING,
    /// Spinning out the remainder of the pause
    R302_SEARCH_COOLDOWN_SPIN,
    /// No camera image this tick
    R303_SEARCH_NO_FRAME,
    /// Frame classified, nothing found, spinning
    R304_SEARCH_SCANNING,
    /// Dominant color found, frame saved
    R305_SEARCH_FOUND,

    // =========================================================================
    // R4xx: Follow
    // =========================================================================
    /// Keeping the last commanded speeds
    R401_FOLLOW_HOLD,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R101_VOICE_STRAIGHT => "R101_VOICE_STRAIGHT",
            Self::R102_VOICE_LEFT => "R102_VOICE_LEFT",
            Self::R103_VOICE_RIGHT => "R103_VOICE_RIGHT",
            Self::R104_VOICE_STOP => "R104_VOICE_STOP",
            Self::R105_SEARCH_REQUESTED => "R105_SEARCH_REQUESTED",
            Self::R201_AVOID_LEFT_FLANK => "R201_AVOID_LEFT_FLANK",
            Self::R201_AVOID_RIGHT_FLANK => "R201_AVOID_RIGHT_FLANK",
            Self::R202_AVOID_FALLBACK_STRAIGHT => "R202_AVOID_FALLBACK_STRAIGHT",
            Self::R301_SEARCH_SETTLING => "R301_SEARCH_SETTLING",
            Self::R302_SEARCH_COOLDOWN_SPIN => "R302_SEARCH_COOLDOWN_SPIN",
            Self::R303_SEARCH_NO_FRAME => "R303_SEARCH_NO_FRAME",
            Self::R304_SEARCH_SCANNING => "R304_SEARCH_SCANNING",
            Self::R305_SEARCH_FOUND => "R305_SEARCH_FOUND",
            Self::R401_FOLLOW_HOLD => "R401_FOLLOW_HOLD",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R101_VOICE_STRAIGHT => "Voice: drive straight",
            Self::R102_VOICE_LEFT => "Voice: turn left",
            Self::R103_VOICE_RIGHT => "Voice: turn right",
            Self::R104_VOICE_STOP => "Voice: stop",
            Self::R105_SEARCH_REQUESTED => "Voice: start color search",
            Self::R201_AVOID_LEFT_FLANK => "Obstacle left - veering right",
            Self::R201_AVOID_RIGHT_FLANK => "Obstacle right - veering left",
            Self::R202_AVOID_FALLBACK_STRAIGHT => "Obstacle ahead - driving straight",
            Self::R301_SEARCH_SETTLING => "Settling after find",
            Self::R302_SEARCH_COOLDOWN_SPIN => "Resuming spin after find",
            Self::R303_SEARCH_NO_FRAME => "No camera image",
            Self::R304_SEARCH_SCANNING => "Scanning for color",
            Self::R305_SEARCH_FOUND => "Color blob found",
            Self::R401_FOLLOW_HOLD => "Holding commanded speeds",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

/// Camera frame and frame store failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum FrameReason {
    /// Pixel buffer length does not match width × height
    R501_FRAME_SIZE_MISMATCH,
    /// Writing the bitmap failed
    R502_FRAME_STORE_IO,
    /// Frame has no pixels
    R503_FRAME_EMPTY,
}

impl FrameReason {
    /// Get code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::R501_FRAME_SIZE_MISMATCH => "R501_FRAME_SIZE_MISMATCH",
            Self::R502_FRAME_STORE_IO => "R502_FRAME_STORE_IO",
            Self::R503_FRAME_EMPTY => "R503_FRAME_EMPTY",
        }
    }

    /// Get description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R501_FRAME_SIZE_MISMATCH => "Pixel buffer does not match frame size",
            Self::R502_FRAME_STORE_IO => "Failed to write frame",
            Self::R503_FRAME_EMPTY => "Frame has no pixels",
        }
    }
}

impl std::fmt::Display for FrameReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

impl std::error::Error for FrameReason {}

/// Scenario and config loading failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum LoadReason {
    /// File could not be read
    R601_LOAD_READ_ERROR,
    /// JSON did not match the expected shape
    R602_LOAD_PARSE_ERROR,
    /// A scenario frame has zero width or height
    R603_LOAD_INVALID_FRAME,
    /// Config values out of range
    R604_LOAD_INVALID_CONFIG,
}

impl LoadReason {
    /// Get code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::R601_LOAD_READ_ERROR => "R601_LOAD_READ_ERROR",
            Self::R602_LOAD_PARSE_ERROR => "R602_LOAD_PARSE_ERROR",
            Self::R603_LOAD_INVALID_FRAME => "R603_LOAD_INVALID_FRAME",
            Self::R604_LOAD_INVALID_CONFIG => "R604_LOAD_INVALID_CONFIG",
        }
    }

    /// Get description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R601_LOAD_READ_ERROR => "Failed to read file",
            Self::R602_LOAD_PARSE_ERROR => "Failed to parse JSON",
            Self::R603_LOAD_INVALID_FRAME => "Invalid frame in scenario",
            Self::R604_LOAD_INVALID_CONFIG => "Config value out of range",
        }
    }
}

impl std::fmt::Display for LoadReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

impl std::error::Error for LoadReason {}

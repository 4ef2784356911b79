//! Output structures for terminal display

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ColorVerdict, Mode, ReasonCode, VoiceCommand, WheelSpeeds};

/// Output structure for each tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickOutput {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Tick number, starting at 1
    pub tick: u64,
    /// Mode after this tick's transitions
    pub mode: Mode,
    /// Speeds handed to the motors
    pub speeds: WheelSpeeds,
    /// Why these speeds
    pub reason: ReasonCode,
    /// Command interpreted this tick, if an utterance was finalized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<VoiceCommand>,
    /// Color found this tick
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<ColorVerdict>,
    /// Pause counter after this tick
    pub pause_counter: u32,
    /// Largest proximity reading
    pub max_proximity: f64,
}

impl TickOutput {
    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.mode.color_code();
        let reset = Mode::color_reset();
        let emoji = self.mode.emoji();

        format!(
            "{}{} #{} mode={} | L={:+.2} R={:+.2} | prox={:.0} | pause={} | {}{}",
            color,
            emoji,
            self.tick,
            self.mode,
            self.speeds.left,
            self.speeds.right,
            self.max_proximity,
            self.pause_counter,
            self.reason.code(),
            reset
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "tick={} | mode={} | left={:.3} | right={:.3} | prox={:.1} | pause={} | reason={}",
            self.tick,
            self.mode,
            self.speeds.left,
            self.speeds.right,
            self.max_proximity,
            self.pause_counter,
            self.reason.code()
        )
    }

    /// Worth printing when not verbose
    pub fn is_notable(&self, previous_mode: Option<Mode>) -> bool {
        self.command.is_some() || self.found.is_some() || previous_mode != Some(self.mode)
    }
}

/// A saved color find
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindEvent {
    pub timestamp: DateTime<Utc>,
    pub tick: u64,
    pub color: ColorVerdict,
    /// Where the frame was written; None if the store failed
    pub path: Option<String>,
    /// SHA-256 of the saved frame
    pub digest: String,
}

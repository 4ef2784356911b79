//! Behavior arbiter: per-tick state machine
//!
//! Precedence within one tick:
//! 1. Voice override - steering commands set speeds, SEARCH arms the search
//! 2. Obstacle escalation - any reading above threshold forces AVOID
//! 3. Mode body - AVOID steers away, SEARCH(active) scans/pauses, FOLLOW holds
//!
//! AVOID releases to FOLLOW for the next tick once every reading is below
//! threshold. After a find the pause counter restarts at pause_ticks; the
//! robot holds still while it is above settle_ticks, then spins until it
//! reaches zero and classification resumes.

use chrono::Utc;

use crate::core::ColorClassifier;
use crate::types::{
    ArbiterConfig, ArbiterState, CameraFrame, ColorVerdict, Mode, ProximityReading, ReasonCode,
    SearchPhase, SensorSnapshot, TickOutput, VoiceCommand, WheelSpeeds,
};

/// Behavior arbiter engine
#[derive(Debug)]
pub struct BehaviorArbiter {
    config: ArbiterConfig,
    classifier: ColorClassifier,
    state: ArbiterState,
    /// Ticks evaluated so far
    tick: u64,
}

impl Default for BehaviorArbiter {
    fn default() -> Self {
        Self::new(ArbiterConfig::default())
    }
}

impl BehaviorArbiter {
    /// Create new arbiter in FOLLOW, stopped
    pub fn new(config: ArbiterConfig) -> Self {
        Self::from_state(config, ArbiterState::default())
    }

    /// Resume from an existing state
    pub fn from_state(config: ArbiterConfig, state: ArbiterState) -> Self {
        let classifier = ColorClassifier::with_dominance_factor(config.dominance_factor);
        Self { config, classifier, state, tick: 0 }
    }

    /// Evaluate one tick. `command` is Some only when an utterance was
    /// finalized this tick.
    pub fn tick(&mut self, snapshot: &SensorSnapshot, command: Option<VoiceCommand>) -> TickOutput {
        self.tick += 1;
        let previous_mode = self.state.mode;

        let voice_reason = command.and_then(|c| self.apply_voice(c));

        let max_proximity = snapshot.proximity.max();
        if max_proximity > self.config.obstacle_threshold {
            self.state.mode = Mode::Avoid;
        }

        let mut found = None;
        let reason = match self.state.mode {
            Mode::Avoid => self.avoid(&snapshot.proximity),
            Mode::Search(SearchPhase::Active) => {
                let (reason, verdict) = self.search(snapshot.frame.as_ref());
                found = verdict;
                reason
            }
            Mode::Follow | Mode::Search(SearchPhase::NotStarted) => {
                voice_reason.unwrap_or(ReasonCode::R401_FOLLOW_HOLD)
            }
        };

        if self.state.mode != previous_mode {
            tracing::debug!(
                tick = self.tick,
                from = %previous_mode,
                to = %self.state.mode,
                "mode transition"
            );
        }

        TickOutput {
            timestamp: Utc::now(),
            tick: self.tick,
            mode: self.state.mode,
            speeds: self.state.speeds,
            reason,
            command,
            found,
            pause_counter: self.state.pause_counter,
            max_proximity,
        }
    }

    /// Step 1: NONE leaves everything untouched
    fn apply_voice(&mut self, command: VoiceCommand) -> Option<ReasonCode> {
        if command == VoiceCommand::Search {
            self.state.mode = Mode::Search(SearchPhase::Active);
            return Some(ReasonCode::R105_SEARCH_REQUESTED);
        }
        if !command.is_motion() {
            return None;
        }

        let cruise = self.config.cruise_speed();
        let bound = self.config.max_speed;
        let (speeds, reason) = match command {
            VoiceCommand::Straight => (WheelSpeeds::straight(cruise, bound), ReasonCode::R101_VOICE_STRAIGHT),
            VoiceCommand::Left => (WheelSpeeds::spin_left(cruise, bound), ReasonCode::R102_VOICE_LEFT),
            VoiceCommand::Right => (WheelSpeeds::spin_right(cruise, bound), ReasonCode::R103_VOICE_RIGHT),
            _ => (WheelSpeeds::STOPPED, ReasonCode::R104_VOICE_STOP),
        };

        self.state.speeds = speeds;
        if self.state.mode.is_search_active() {
            self.state.mode = Mode::Search(SearchPhase::NotStarted);
        }
        Some(reason)
    }

    /// AVOID body
    fn avoid(&mut self, proximity: &ProximityReading) -> ReasonCode {
        let threshold = self.config.obstacle_threshold;
        let cruise = self.config.cruise_speed();
        let bound = self.config.max_speed;

        let (speeds, reason) = if proximity.left_flank_above(threshold) {
            (WheelSpeeds::spin_right(cruise, bound), ReasonCode::R201_AVOID_LEFT_FLANK)
        } else if proximity.right_flank_above(threshold) {
            (WheelSpeeds::spin_left(cruise, bound), ReasonCode::R201_AVOID_RIGHT_FLANK)
        } else {
            (WheelSpeeds::straight(cruise, bound), ReasonCode::R202_AVOID_FALLBACK_STRAIGHT)
        };
        self.state.speeds = speeds;

        if proximity.max() < threshold {
            self.state.mode = Mode::Follow;
        }
        reason
    }

    /// SEARCH(active) body
    fn search(&mut self, frame: Option<&CameraFrame>) -> (ReasonCode, Option<ColorVerdict>) {
        let bound = self.config.max_speed;
        let spin = WheelSpeeds::spin_left(self.config.search_speed, bound);

        self.state.pause_counter = self.state.pause_counter.saturating_sub(1);

        if self.state.pause_counter > self.config.settle_ticks() {
            self.state.speeds = WheelSpeeds::STOPPED;
            return (ReasonCode::R301_SEARCH_SETTLING, None);
        }
        if self.state.pause_counter > 0 {
            self.state.speeds = spin;
            return (ReasonCode::R302_SEARCH_COOLDOWN_SPIN, None);
        }
        let Some(frame) = frame else {
            self.state.speeds = WheelSpeeds::STOPPED;
            return (ReasonCode::R303_SEARCH_NO_FRAME, None);
        };

        let verdict = self.classifier.classify(frame);
        if !verdict.is_found() {
            self.state.speeds = spin;
            return (ReasonCode::R304_SEARCH_SCANNING, None);
        }
        self.state.speeds = WheelSpeeds::STOPPED;
        self.state.pause_counter = self.config.pause_ticks();
        (ReasonCode::R305_SEARCH_FOUND, Some(verdict))
    }

    /// Get current state
    pub fn state(&self) -> &ArbiterState {
        &self.state
    }

    /// Get current mode
    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Get last speeds
    pub fn speeds(&self) -> WheelSpeeds {
        self.state.speeds
    }

    pub fn pause_counter(&self) -> u32 {
        self.state.pause_counter
    }

    pub fn config(&self) -> &ArbiterConfig {
        &self.config
    }

    /// Get tick count
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Reset arbiter to initial state
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }
}

// =============================================================================
// TESTS
// =============================================================================

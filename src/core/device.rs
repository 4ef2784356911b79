//! Simulator device layer seam and a scripted implementation
//!
//! `ScriptedDevice` replays a JSON scenario: per-tick proximity readings,
//! optional camera frames and utterances. Utterances are delivered through
//! the audio queue, the same path a microphone would use.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::{AudioSender, ColorClassifier};
use crate::types::{CameraFrame, LoadReason, ProximityReading, WheelSpeeds};
use crate::PROXIMITY_SENSOR_COUNT;

/// Drive motor selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motor {
    Left,
    Right,
}

/// Poll/command primitives of the simulated robot
pub trait DeviceLayer {
    /// Advance one timestep; false once the simulator terminates
    fn step(&mut self, time_step_ms: u32) -> bool;

    fn read_proximity(&mut self) -> ProximityReading;

    fn read_camera_frame(&mut self) -> Option<CameraFrame>;

    fn set_velocity(&mut self, motor: Motor, velocity: f64);
}

/// Camera image description in a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameSpec {
    /// Whole frame one color
    Solid { width: usize, height: usize, rgb: [u8; 3] },
    /// Background with `rgb` covering the classifier's sample region
    Blob { width: usize, height: usize, background: [u8; 3], rgb: [u8; 3] },
}

impl FrameSpec {
    pub fn render(&self) -> CameraFrame {
        match *self {
            FrameSpec::Solid { width, height, rgb } => CameraFrame::solid(width, height, rgb),
            FrameSpec::Blob { width, height, background, rgb } => {
                let (xs, ys) = ColorClassifier::sample_region(width, height);
                CameraFrame::from_fn(width, height, |x, y| {
                    if xs.contains(&x) && ys.contains(&y) {
                        rgb
                    } else {
                        background
                    }
                })
            }
        }
    }

    fn is_valid(&self) -> bool {
        match *self {
            FrameSpec::Solid { width, height, .. } | FrameSpec::Blob { width, height, .. } => {
                width > 0 && height > 0
            }
        }
    }
}

/// One scripted simulation step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTick {
    #[serde(default)]
    pub proximity: [f64; PROXIMITY_SENSOR_COUNT],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<FrameSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utterance: Option<String>,
}

/// Scripted world for the tick loop
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub ticks: Vec<ScenarioTick>,
    /// Start over after the last tick instead of terminating
    #[serde(default)]
    pub repeat: bool,
}

impl Scenario {
    /// Load and validate a JSON scenario
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadReason> {
        let json = std::fs::read_to_string(path)
            .map_err(|_| LoadReason::R601_LOAD_READ_ERROR)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, LoadReason> {
        let scenario: Scenario = serde_json::from_str(json)
            .map_err(|_| LoadReason::R602_LOAD_PARSE_ERROR)?;
        let frames_ok = scenario
            .ticks
            .iter()
            .filter_map(|t| t.frame.as_ref())
            .all(FrameSpec::is_valid);
        if !frames_ok {
            return Err(LoadReason::R603_LOAD_INVALID_FRAME);
        }
        Ok(scenario)
    }

    /// No obstacles, no camera, `ticks` steps long
    pub fn open_field(ticks: usize) -> Self {
        Self {
            ticks: vec![ScenarioTick::default(); ticks],
            repeat: false,
        }
    }

    /// Open field that never ends
    pub fn endless() -> Self {
        Self {
            ticks: vec![ScenarioTick::default()],
            repeat: true,
        }
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}

/// Device layer backed by a scenario
#[derive(Debug)]
pub struct ScriptedDevice {
    scenario: Scenario,
    position: Option<usize>,
    audio: Option<AudioSender>,
    velocity_log: Vec<(Motor, f64)>,
    velocities: WheelSpeeds,
    elapsed_ms: u64,
}

impl ScriptedDevice {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            position: None,
            audio: None,
            velocity_log: Vec::new(),
            velocities: WheelSpeeds::STOPPED,
            elapsed_ms: 0,
        }
    }

    /// Deliver scripted utterances into this audio queue
    pub fn with_audio(mut self, audio: AudioSender) -> Self {
        self.audio = Some(audio);
        self
    }

    fn current(&self) -> Option<&ScenarioTick> {
        self.position.and_then(|p| self.scenario.ticks.get(p))
    }

    /// Every set_velocity call, in order
    pub fn velocity_log(&self) -> &[(Motor, f64)] {
        &self.velocity_log
    }

    /// Last velocity written to each wheel
    pub fn velocities(&self) -> WheelSpeeds {
        self.velocities
    }

    /// Simulated time
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}

impl DeviceLayer for ScriptedDevice {
    fn step(&mut self, time_step_ms: u32) -> bool {
        let mut next = self.position.map_or(0, |p| p + 1);
        if next >= self.scenario.len() {
            if !self.scenario.repeat || self.scenario.is_empty() {
                return false;
            }
            next = 0;
        }
        self.position = Some(next);
        self.elapsed_ms += time_step_ms as u64;

        let utterance = self.current().and_then(|t| t.utterance.clone());
        if let (Some(text), Some(audio)) = (utterance, self.audio.as_ref()) {
            audio.send_utterance(&text);
        }
        true
    }

    fn read_proximity(&mut self) -> ProximityReading {
        self.current()
            .map(|t| ProximityReading::new(t.proximity))
            .unwrap_or_default()
    }

    fn read_camera_frame(&mut self) -> Option<CameraFrame> {
        self.current()
            .and_then(|t| t.frame.as_ref())
            .map(FrameSpec::render)
    }

    fn set_velocity(&mut self, motor: Motor, velocity: f64) {
        self.velocity_log.push((motor, velocity));
        match motor {
            Motor::Left => self.velocities.left = velocity,
            Motor::Right => self.velocities.right = velocity,
        }
    }
}

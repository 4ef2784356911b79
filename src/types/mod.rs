//! Core types for the rover arbiter

mod command;
mod config;
mod output;
mod reason;
mod sensor;
mod state;

pub use command::{ColorVerdict, VoiceCommand};
pub use config::ArbiterConfig;
pub use output::{FindEvent, TickOutput};
pub use reason::{FrameReason, LoadReason, ReasonCode};
pub use sensor::{CameraFrame, ProximityReading, SensorSnapshot};
pub use state::{ArbiterState, Mode, SearchPhase, WheelSpeeds};

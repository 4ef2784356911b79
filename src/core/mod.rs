//! Core modules for the rover arbiter

pub mod voice;
pub mod classifier;
pub mod arbiter;
pub mod motor;
pub mod device;
pub mod speech;
pub mod store;
pub mod report;
pub mod driver;
pub mod api;

pub use voice::VoiceCommandInterpreter;
pub use classifier::{ChannelSums, ColorClassifier};
pub use arbiter::BehaviorArbiter;
pub use motor::MotorCommandSink;
pub use device::{DeviceLayer, FrameSpec, Motor, Scenario, ScenarioTick, ScriptedDevice};
pub use speech::{audio_queue, AudioChunk, AudioReceiver, AudioSender, Recognition, SpeechRecognizer, TranscriptRecognizer};
pub use store::{default_snapshot_dir, frame_path, FrameStore, PpmFrameStore};
pub use report::ConsoleReporter;
pub use driver::TickDriver;
pub use api::{create_router, run_server, Telemetry};

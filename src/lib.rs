//! Rover arbiter: reactive control loop for a two-wheeled simulator robot
//!
//! One tick per simulation step: proximity sensors + voice commands + camera
//! color statistics → BehaviorArbiter → wheel velocities.

pub mod core;
pub mod types;

// =============================================================================
// TIMING [C] - simulator fixed timestep
// =============================================================================

/// Simulation timestep (milliseconds)
pub const TIME_STEP_MS: u32 = 64;

/// Post-find settle window: hold still while the pause counter is above
/// SETTLE_WINDOW_MS / TIME_STEP_MS
pub const SETTLE_WINDOW_MS: u32 = 640;

/// Full pause after a successful find, restarts the counter at
/// PAUSE_WINDOW_MS / TIME_STEP_MS ticks
pub const PAUSE_WINDOW_MS: u32 = 1280;

// =============================================================================
// SPEEDS [C] - e-puck wheel limits (rad/s)
// =============================================================================

/// Hard wheel velocity bound
pub const MAX_SPEED: f64 = 6.28;

/// Spin-in-place speed while searching for a color
pub const SEARCH_SPEED: f64 = 4.0;

/// Fraction of MAX_SPEED used for voice steering and avoidance
pub const CRUISE_FRACTION: f64 = 0.5;

// =============================================================================
// SENSING [C]
// =============================================================================

/// Number of proximity sensors (ps0..ps7)
pub const PROXIMITY_SENSOR_COUNT: usize = 8;

/// Reading above which an obstacle is present
pub const OBSTACLE_THRESHOLD: f64 = 80.0;

/// A channel wins only if its sum exceeds each other channel by this factor
pub const DOMINANCE_FACTOR: u64 = 3;

/// Largest dominance factor a config may ask for
pub const MAX_DOMINANCE_FACTOR: u64 = 1000;

// =============================================================================
// VOICE [C]
// =============================================================================

/// Microphone sample rate (Hz)
pub const AUDIO_SAMPLE_RATE: u32 = 16000;

/// Samples per captured audio block
pub const AUDIO_BLOCK_SIZE: usize = 8000;

/// Audio chunks buffered between capture and the tick loop
pub const AUDIO_QUEUE_CAPACITY: usize = 64;

/// Restricted recognizer vocabulary
pub const COMMAND_GRAMMAR: [&str; 5] = ["straight", "left", "right", "stop", "search"];

// =============================================================================
// FIND LOG [C]
// =============================================================================

/// Find events kept in memory; the oldest is evicted first
pub const FIND_LOG_CAPACITY: usize = 256;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "0.1.0";

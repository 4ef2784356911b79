//! Per-tick sensor data

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::FrameReason;
use crate::PROXIMITY_SENSOR_COUNT;

/// Bytes per pixel in the simulator camera buffer (BGRA)
const BYTES_PER_PIXEL: usize = 4;

/// Eight proximity readings, ps0..ps7.
///
/// Indices 0-2 face the right flank, 5-7 the left flank.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProximityReading(pub [f64; PROXIMITY_SENSOR_COUNT]);

impl ProximityReading {
    pub fn new(values: [f64; PROXIMITY_SENSOR_COUNT]) -> Self {
        Self(values)
    }

    /// Largest reading across all sensors
    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(f64::MIN, f64::max)
    }

    /// Any of ps0..ps2 above threshold
    pub fn right_flank_above(&self, threshold: f64) -> bool {
        self.0[0..3].iter().any(|v| *v > threshold)
    }

    /// Any of ps5..ps7 above threshold
    pub fn left_flank_above(&self, threshold: f64) -> bool {
        self.0[5..8].iter().any(|v| *v > threshold)
    }
}

/// Camera image in the simulator's native BGRA layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFrame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl CameraFrame {
    /// Wrap a raw BGRA buffer, checking it matches the dimensions
    pub fn from_bgra(width: usize, height: usize, data: Vec<u8>) -> Result<Self, FrameReason> {
        if data.len() != width * height * BYTES_PER_PIXEL {
            return Err(FrameReason::R501_FRAME_SIZE_MISMATCH);
        }
        Ok(Self { width, height, data })
    }

    /// Build a frame by evaluating `f(x, y) -> [r, g, b]` per pixel
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> [u8; 3],
    {
        let mut data = Vec::with_capacity(width * height * BYTES_PER_PIXEL);
        for y in 0..height {
            for x in 0..width {
                let [r, g, b] = f(x, y);
                data.extend_from_slice(&[b, g, r, 0xff]);
            }
        }
        Self { width, height, data }
    }

    /// Single-color frame
    pub fn solid(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        Self::from_fn(width, height, |_, _| rgb)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * BYTES_PER_PIXEL
    }

    pub fn red(&self, x: usize, y: usize) -> u8 {
        self.data[self.offset(x, y) + 2]
    }

    pub fn green(&self, x: usize, y: usize) -> u8 {
        self.data[self.offset(x, y) + 1]
    }

    pub fn blue(&self, x: usize, y: usize) -> u8 {
        self.data[self.offset(x, y)]
    }

    /// SHA-256 of the pixel buffer, hex encoded
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.width as u64).to_le_bytes());
        hasher.update((self.height as u64).to_le_bytes());
        hasher.update(&self.data);
        let hash: [u8; 32] = hasher.finalize().into();
        hash.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Everything the arbiter sees in one tick
#[derive(Debug, Clone, Default)]
pub struct SensorSnapshot {
    pub proximity: ProximityReading,
    /// Absent when the camera produced no image this step
    pub frame: Option<CameraFrame>,
}

impl SensorSnapshot {
    pub fn new(proximity: ProximityReading, frame: Option<CameraFrame>) -> Self {
        Self { proximity, frame }
    }

    /// Proximity only, no camera image
    pub fn blind(proximity: ProximityReading) -> Self {
        Self { proximity, frame: None }
    }
}

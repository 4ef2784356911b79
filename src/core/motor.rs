//! Motor command sink

use crate::core::{DeviceLayer, Motor};
use crate::types::WheelSpeeds;

/// Writes the arbiter's speeds to both drive motors every tick
#[derive(Debug, Default)]
pub struct MotorCommandSink;

impl MotorCommandSink {
    pub fn new() -> Self {
        Self
    }

    /// Left then right; speeds are already bounded by the arbiter
    pub fn apply<D: DeviceLayer + ?Sized>(&self, device: &mut D, speeds: WheelSpeeds) {
        device.set_velocity(Motor::Left, speeds.left);
        device.set_velocity(Motor::Right, speeds.right);
    }
}

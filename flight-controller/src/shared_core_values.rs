use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use shared_definitions::telemetry::HoldStatusWord;

use crate::control::flight_controllers::AxisCommands;
use crate::telemetry::{AltitudeHoldSample, TelemetrySink};
use crate::util::math::vectors::RotationVector3D;

pub struct AtomicF32(AtomicU32);
impl AtomicF32 {
    pub const fn new(val: f32) -> Self {
        Self(AtomicU32::new(val.to_bits()))
    }
    pub fn load(&self, order: Ordering) -> f32 {
        f32::from_bits(self.0.load(order))
    }
    pub fn store(&self, val: f32, order: Ordering) {
        self.0.store(val.to_bits(), order)
    }
}

pub struct AtomicRotationVector3D {
    roll: AtomicF32,
    pitch: AtomicF32,
    yaw: AtomicF32,
}

impl AtomicRotationVector3D {
    pub const fn new() -> Self {
        Self {
            roll: AtomicF32::new(0.0),
            pitch: AtomicF32::new(0.0),
            yaw: AtomicF32::new(0.0),
        }
    }
    pub fn store(&self, vector: RotationVector3D) {
        self.roll.store(vector.roll, Ordering::Relaxed);
        self.pitch.store(vector.pitch, Ordering::Relaxed);
        self.yaw.store(vector.yaw, Ordering::Relaxed);
    }
    pub fn read(&self) -> RotationVector3D {
        RotationVector3D {
            roll: self.roll.load(Ordering::Relaxed),
            pitch: self.pitch.load(Ordering::Relaxed),
            yaw: self.yaw.load(Ordering::Relaxed),
        }
    }
}

pub struct AtomicAxisCommands {
    roll: AtomicF32,
    pitch: AtomicF32,
    yaw: AtomicF32,
    throttle: AtomicF32,
}

impl AtomicAxisCommands {
    pub const fn new() -> Self {
        Self {
            roll: AtomicF32::new(0.0),
            pitch: AtomicF32::new(0.0),
            yaw: AtomicF32::new(0.0),
            throttle: AtomicF32::new(0.0),
        }
    }
    pub fn store(&self, commands: AxisCommands) {
        self.roll.store(commands.roll, Ordering::Relaxed);
        self.pitch.store(commands.pitch, Ordering::Relaxed);
        self.yaw.store(commands.yaw, Ordering::Relaxed);
        self.throttle.store(commands.throttle, Ordering::Relaxed);
    }
    pub fn read(&self) -> AxisCommands {
        AxisCommands {
            roll: self.roll.load(Ordering::Relaxed),
            pitch: self.pitch.load(Ordering::Relaxed),
            yaw: self.yaw.load(Ordering::Relaxed),
            throttle: self.throttle.load(Ordering::Relaxed),
        }
    }
}

pub struct AtomicAltitudeHoldSample {
    height: AtomicF32,
    height_rate: AtomicF32,
    height_setpoint: AtomicF32,
    height_rate_setpoint: AtomicF32,
    throttle: AtomicF32,
    status: AtomicU8,
}

impl AtomicAltitudeHoldSample {
    pub const fn new() -> Self {
        Self {
            height: AtomicF32::new(0.0),
            height_rate: AtomicF32::new(0.0),
            height_setpoint: AtomicF32::new(0.0),
            height_rate_setpoint: AtomicF32::new(0.0),
            throttle: AtomicF32::new(0.0),
            status: AtomicU8::new(0),
        }
    }
    pub fn store(&self, sample: &AltitudeHoldSample) {
        self.height.store(sample.height, Ordering::Relaxed);
        self.height_rate.store(sample.height_rate, Ordering::Relaxed);
        self.height_setpoint
            .store(sample.height_setpoint, Ordering::Relaxed);
        self.height_rate_setpoint
            .store(sample.height_rate_setpoint, Ordering::Relaxed);
        self.throttle.store(sample.throttle, Ordering::Relaxed);
        self.status.store(sample.status.into(), Ordering::Relaxed);
    }
    pub fn read(&self) -> AltitudeHoldSample {
        AltitudeHoldSample {
            height: self.height.load(Ordering::Relaxed),
            height_rate: self.height_rate.load(Ordering::Relaxed),
            height_setpoint: self.height_setpoint.load(Ordering::Relaxed),
            height_rate_setpoint: self.height_rate_setpoint.load(Ordering::Relaxed),
            throttle: self.throttle.load(Ordering::Relaxed),
            status: HoldStatusWord::from(self.status.load(Ordering::Relaxed)),
        }
    }
}

/// Values the control tick publishes for slower consumers. Each field is
/// written independently and lock-free; readers may see fields from
/// neighbouring ticks, which is fine for telemetry.
pub struct AtomicTelemetry {
    pub loop_exec_time_us: AtomicU32,
    pub rotation_rate: AtomicRotationVector3D,
    pub axis_commands: AtomicAxisCommands,
    pub altitude_hold: AtomicAltitudeHoldSample,
    pub altitude_hold_samples: AtomicU32,
}

impl AtomicTelemetry {
    pub const fn new() -> Self {
        AtomicTelemetry {
            loop_exec_time_us: AtomicU32::new(0),
            rotation_rate: AtomicRotationVector3D::new(),
            axis_commands: AtomicAxisCommands::new(),
            altitude_hold: AtomicAltitudeHoldSample::new(),
            altitude_hold_samples: AtomicU32::new(0),
        }
    }
}

impl TelemetrySink for &AtomicTelemetry {
    fn push_altitude_hold(&mut self, sample: &AltitudeHoldSample) {
        self.altitude_hold.store(sample);
        self.altitude_hold_samples.fetch_add(1, Ordering::Relaxed);
    }
}

pub static SHARED_TELEMETRY: AtomicTelemetry = AtomicTelemetry::new();

#[cfg(test)]
mod tests {
    use super::*;
    use shared_definitions::controller::{FlightMode, HoldSwitches};

    #[test]
    fn test_atomic_f32_round_trip() {
        let value = AtomicF32::new(1.5);
        assert_eq!(value.load(Ordering::Relaxed), 1.5);
        value.store(-0.25, Ordering::Relaxed);
        assert_eq!(value.load(Ordering::Relaxed), -0.25);
    }

    #[test]
    fn test_shared_telemetry_counts_altitude_samples() {
        let telemetry = AtomicTelemetry::new();
        let sample = AltitudeHoldSample {
            height: 3.0,
            height_rate: 0.1,
            height_setpoint: 3.5,
            height_rate_setpoint: 0.5,
            throttle: 0.55,
            status: HoldStatusWord::from_state(FlightMode::Attitude, HoldSwitches::ALTITUDE_HOLD),
        };

        let mut sink = &telemetry;
        sink.push_altitude_hold(&sample);
        sink.push_altitude_hold(&sample);

        assert_eq!(telemetry.altitude_hold_samples.load(Ordering::Relaxed), 2);
        assert_eq!(telemetry.altitude_hold.read(), sample);
    }
}

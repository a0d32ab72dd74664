use core::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use shared_definitions::telemetry::HoldStatusWord;

use crate::shared_core_values::AtomicTelemetry;

/// Altitude hold internals, sent at a decimated rate while the hold is
/// engaged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeHoldSample {
    pub height: f32,
    pub height_rate: f32,
    pub height_setpoint: f32,
    pub height_rate_setpoint: f32,
    pub throttle: f32,
    pub status: HoldStatusWord,
}

/// Receiver of telemetry produced inside the control tick. Implementations
/// must not block: store, queue or drop.
pub trait TelemetrySink {
    fn push_altitude_hold(&mut self, sample: &AltitudeHoldSample);
}

/// Discards everything.
pub struct NoTelemetry;

impl TelemetrySink for NoTelemetry {
    fn push_altitude_hold(&mut self, _sample: &AltitudeHoldSample) {}
}

/// Keeps every sample, for bench runs and tests.
impl TelemetrySink for Vec<AltitudeHoldSample> {
    fn push_altitude_hold(&mut self, sample: &AltitudeHoldSample) {
        self.push(*sample);
    }
}

pub fn telemetry_thread(telemetry_data: &AtomicTelemetry, keep_running: &AtomicBool, period: Duration) {
    while keep_running.load(Ordering::Relaxed) {
        let altitude_hold = telemetry_data.altitude_hold.read();
        log::info!(
            "
                Iteration Time: {:?}us
                Rotation rate {:?}
                Axis commands {:?}
                Altitude hold ({} samples) {:?}",
            telemetry_data.loop_exec_time_us.load(Ordering::Relaxed),
            telemetry_data.rotation_rate.read(),
            telemetry_data.axis_commands.read(),
            telemetry_data.altitude_hold_samples.load(Ordering::Relaxed),
            altitude_hold,
        );
        std::thread::sleep(period);
    }
}

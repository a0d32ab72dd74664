//! Configuration contract between the slow configuration path and the
//! control tick.
//!
//! The tick only ever sees an immutable [`ControlConfig`] snapshot; new
//! values are published whole through [`store::ConfigStore`].

pub mod constants;
pub mod store;

use crate::control::pid::{PidParams, PidParamsError};
use crate::util::error::ConfigError;
use constants::*;

/// The eight control loops of the cascade, one PID each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopId {
    RollAttitude,
    PitchAttitude,
    RollRate,
    PitchRate,
    YawRate,
    Heading,
    AltitudePosition,
    AltitudeVelocity,
}

impl LoopId {
    pub const COUNT: usize = 8;

    pub const ALL: [LoopId; LoopId::COUNT] = [
        LoopId::RollAttitude,
        LoopId::PitchAttitude,
        LoopId::RollRate,
        LoopId::PitchRate,
        LoopId::YawRate,
        LoopId::Heading,
        LoopId::AltitudePosition,
        LoopId::AltitudeVelocity,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlConfig {
    pub pid: [PidParams; LoopId::COUNT],
    /// Radians of attitude per unit of stick.
    pub attitude_scaling: f32,
    /// Radians per second of body rate per unit of stick.
    pub rate_scaling: f32,
    /// Metres of height offset per unit of throttle stick away from the
    /// reference throttle.
    pub altitude_command_scaling: f32,
    /// Fraction of the height offset applied when altitude hold runs in
    /// velocity mode.
    pub altitude_velocity_gain: f32,
    /// Altitude hold telemetry goes out every this many engaged ticks.
    pub telemetry_decimation: u32,
    pub loop_rate_hz: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        let mut pid = [PidParams::default(); LoopId::COUNT];
        pid[LoopId::RollAttitude.index()] = ATTITUDE_PID;
        pid[LoopId::PitchAttitude.index()] = ATTITUDE_PID;
        pid[LoopId::RollRate.index()] = ROLL_PITCH_RATE_PID;
        pid[LoopId::PitchRate.index()] = ROLL_PITCH_RATE_PID;
        pid[LoopId::YawRate.index()] = YAW_RATE_PID;
        pid[LoopId::Heading.index()] = HEADING_PID;
        pid[LoopId::AltitudePosition.index()] = ALTITUDE_POSITION_PID;
        pid[LoopId::AltitudeVelocity.index()] = ALTITUDE_VELOCITY_PID;

        ControlConfig {
            pid,
            attitude_scaling: DEFAULT_MAX_ATTITUDE_DEG.to_radians(),
            rate_scaling: DEFAULT_MAX_RATE_DPS.to_radians(),
            altitude_command_scaling: ALTITUDE_COMMAND_SCALING_M,
            altitude_velocity_gain: ALTITUDE_VELOCITY_GAIN,
            telemetry_decimation: ALTITUDE_TELEMETRY_DECIMATION,
            loop_rate_hz: DEFAULT_LOOP_RATE_HZ,
        }
    }
}

impl ControlConfig {
    pub fn pid(&self, loop_id: LoopId) -> &PidParams {
        &self.pid[loop_id.index()]
    }

    pub fn pid_mut(&mut self, loop_id: LoopId) -> &mut PidParams {
        &mut self.pid[loop_id.index()]
    }

    /// Sets the rate scaling from the body rate wanted at full stick.
    pub fn with_max_rate_dps(mut self, max_rate_dps: f32) -> Self {
        self.rate_scaling = max_rate_dps.to_radians();
        self
    }

    pub fn max_rate_dps(&self) -> f32 {
        self.rate_scaling.to_degrees()
    }

    /// Sets the attitude scaling from the bank angle wanted at full stick.
    pub fn with_max_attitude_deg(mut self, max_attitude_deg: f32) -> Self {
        self.attitude_scaling = max_attitude_deg.to_radians();
        self
    }

    pub fn max_attitude_deg(&self) -> f32 {
        self.attitude_scaling.to_degrees()
    }

    pub fn nominal_dt(&self) -> f32 {
        1.0 / self.loop_rate_hz
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for loop_id in LoopId::ALL {
            self.pid(loop_id).validate().map_err(|error| match error {
                PidParamsError::NonFiniteGain(field, value) => ConfigError::NonFiniteGain {
                    loop_id,
                    field,
                    value,
                },
                PidParamsError::InvalidLimit(field, value) => ConfigError::InvalidLimit {
                    loop_id,
                    field,
                    value,
                },
            })?;
        }

        let scalings = [
            ("attitude_scaling", self.attitude_scaling),
            ("rate_scaling", self.rate_scaling),
            ("altitude_command_scaling", self.altitude_command_scaling),
            ("altitude_velocity_gain", self.altitude_velocity_gain),
        ];
        if let Some((field, value)) = scalings.into_iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::NonFiniteScaling { field, value });
        }

        if self.telemetry_decimation == 0 {
            return Err(ConfigError::ZeroTelemetryDecimation);
        }
        if !self.loop_rate_hz.is_finite() || self.loop_rate_hz <= 0.0 {
            return Err(ConfigError::InvalidLoopRate(self.loop_rate_hz));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(ControlConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_loop_ids_index_the_table_in_order() {
        for (position, loop_id) in LoopId::ALL.iter().enumerate() {
            assert_eq!(loop_id.index(), position);
        }
    }

    #[test]
    fn test_scaling_helpers_round_trip_units() {
        let config = ControlConfig::default()
            .with_max_rate_dps(180.0)
            .with_max_attitude_deg(30.0);
        assert!((config.rate_scaling - core::f32::consts::PI).abs() < 1e-6);
        assert!((config.max_rate_dps() - 180.0).abs() < 1e-3);
        assert!((config.max_attitude_deg() - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_nan_gain_is_rejected() {
        let mut config = ControlConfig::default();
        config.pid_mut(LoopId::YawRate).derivative = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFiniteGain {
                loop_id: LoopId::YawRate,
                field: "derivative",
                ..
            })
        ));
    }

    #[test]
    fn test_negative_limit_is_rejected() {
        let mut config = ControlConfig::default();
        config.pid_mut(LoopId::AltitudeVelocity).output_limit = -1.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidLimit {
                loop_id: LoopId::AltitudeVelocity,
                field: "output_limit",
                value: -1.0,
            })
        );
    }

    #[test]
    fn test_bad_scalars_are_rejected() {
        let mut config = ControlConfig::default();
        config.rate_scaling = f32::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFiniteScaling {
                field: "rate_scaling",
                ..
            })
        ));

        let mut config = ControlConfig::default();
        config.telemetry_decimation = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTelemetryDecimation));

        let mut config = ControlConfig::default();
        config.loop_rate_hz = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidLoopRate(0.0)));
    }
}

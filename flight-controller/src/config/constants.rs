use crate::control::pid::PidParams;

// Control loop
pub const DEFAULT_LOOP_RATE_HZ: f32 = 500.0_f32;

// Pilot stick scaling, full stick deflection maps to these
pub const DEFAULT_MAX_RATE_DPS: f32 = 300.0_f32;
pub const DEFAULT_MAX_ATTITUDE_DEG: f32 = 45.0_f32;

// Altitude hold
pub const ALTITUDE_COMMAND_SCALING_M: f32 = 10.0_f32; // height offset for a full throttle stick
pub const ALTITUDE_VELOCITY_GAIN: f32 = 0.1_f32;
pub const ALTITUDE_TELEMETRY_DECIMATION: u32 = 5;

// Default gains
pub const ATTITUDE_PID: PidParams = PidParams {
    proportional: 5.0,
    integral: 0.0,
    derivative: 0.0,
    integral_limit: 0.5,
    output_limit: 5.2,
};

pub const ROLL_PITCH_RATE_PID: PidParams = PidParams {
    proportional: 0.25,
    integral: 0.5,
    derivative: 0.003,
    integral_limit: 0.4,
    output_limit: 1.0,
};

pub const YAW_RATE_PID: PidParams = PidParams {
    proportional: 0.4,
    integral: 0.2,
    derivative: 0.0,
    integral_limit: 0.4,
    output_limit: 1.0,
};

pub const HEADING_PID: PidParams = PidParams {
    proportional: 2.0,
    integral: 0.05,
    derivative: 0.0,
    integral_limit: 0.5,
    output_limit: 1.0,
};

pub const ALTITUDE_POSITION_PID: PidParams = PidParams {
    proportional: 1.0,
    integral: 0.05,
    derivative: 0.0,
    integral_limit: 2.0,
    output_limit: 2.0,
};

pub const ALTITUDE_VELOCITY_PID: PidParams = PidParams {
    proportional: 0.2,
    integral: 0.05,
    derivative: 0.0,
    integral_limit: 1.0,
    output_limit: 0.3,
};

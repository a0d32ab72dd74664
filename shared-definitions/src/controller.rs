use bitflags::bitflags;

/// Flight modes ordered by how much of the cascade the flight computer
/// closes on its own. Anything at or above `Attitude` runs the attitude
/// loop in front of the rate loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FlightMode {
    #[default]
    Rate = 0,
    Attitude = 1,
    /// Attitude command supplied by the autopilot instead of the sticks.
    Navigation = 2,
}

impl FlightMode {
    pub fn uses_attitude_loop(self) -> bool {
        self >= FlightMode::Attitude
    }
}

impl TryFrom<u8> for FlightMode {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FlightMode::Rate),
            1 => Ok(FlightMode::Attitude),
            2 => Ok(FlightMode::Navigation),
            _ => Err(()),
        }
    }
}

/// Normalized stick positions. Roll, pitch and yaw span `-1.0..=1.0`,
/// throttle spans `0.0..=1.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PilotCommand {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub throttle: f32,
}

bitflags! {
    /// Hold switches as decoded from the receiver aux channels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HoldSwitches: u8 {
        const HEADING_HOLD = 1 << 0;
        const ALTITUDE_HOLD = 1 << 1;
        /// Throttle stick offset commands a climb rate instead of a height offset.
        const ALTITUDE_VELOCITY = 1 << 2;
    }
}

impl Default for HoldSwitches {
    fn default() -> Self {
        HoldSwitches::empty()
    }
}

impl HoldSwitches {
    pub fn heading_hold(&self) -> bool {
        self.contains(HoldSwitches::HEADING_HOLD)
    }

    pub fn altitude_hold(&self) -> bool {
        self.contains(HoldSwitches::ALTITUDE_HOLD)
    }

    pub fn altitude_velocity_mode(&self) -> bool {
        self.contains(HoldSwitches::ALTITUDE_VELOCITY)
    }
}

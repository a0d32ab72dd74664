use bitfield_struct::bitfield;

use crate::controller::{FlightMode, HoldSwitches};

/// Status byte sent along with the altitude hold telemetry record.
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct HoldStatusWord {
    pub heading_hold: bool,
    pub altitude_hold: bool,
    pub altitude_velocity_mode: bool,
    #[bits(2)]
    pub flight_mode: u8,
    #[bits(3)]
    __: u8,
}

impl HoldStatusWord {
    pub fn from_state(mode: FlightMode, switches: HoldSwitches) -> Self {
        HoldStatusWord::new()
            .with_heading_hold(switches.heading_hold())
            .with_altitude_hold(switches.altitude_hold())
            .with_altitude_velocity_mode(switches.altitude_velocity_mode())
            .with_flight_mode(mode as u8)
    }

    pub fn mode(&self) -> Option<FlightMode> {
        FlightMode::try_from(self.flight_mode()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_word_packing() {
        let word = HoldStatusWord::from_state(
            FlightMode::Navigation,
            HoldSwitches::ALTITUDE_HOLD | HoldSwitches::ALTITUDE_VELOCITY,
        );
        assert_eq!(u8::from(word), 0b0001_0110);
        assert!(!word.heading_hold());
        assert!(word.altitude_hold());
        assert_eq!(word.mode(), Some(FlightMode::Navigation));
    }
}

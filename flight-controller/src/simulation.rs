//! Crude rigid-body stand-in for the vehicle, used by the bench binary to
//! close the loop without hardware.

use std::sync::{Arc, Mutex, PoisonError};

use shared_definitions::controller::{FlightMode, HoldSwitches, PilotCommand};

use crate::control::control_loops::{FlightSample, FlightSensors, MainControlLoopOutCommands};
use crate::control::flight_controllers::{AxisCommands, FlightControlLawsInput};
use crate::util::math::angles::wrap_two_pi;
use crate::util::math::vectors::{RotationVector2D, RotationVector3D};

const ANGULAR_AUTHORITY: f32 = 40.0; // rad/s² per unit of axis command
const ANGULAR_DRAG: f32 = 4.0;
const HOVER_THROTTLE: f32 = 0.5;
const VERTICAL_AUTHORITY: f32 = 20.0; // m/s² per unit of throttle above hover
const VERTICAL_DRAG: f32 = 1.5;

/// What the pilot does over the course of a bench run.
#[derive(Debug, Clone, Copy)]
pub struct PilotScript {
    pub arm_at: f32,
    pub heading_hold_at: f32,
    pub altitude_hold_at: f32,
    pub release_sticks_at: f32,
}

impl Default for PilotScript {
    fn default() -> Self {
        PilotScript {
            arm_at: 0.2,
            heading_hold_at: 1.0,
            altitude_hold_at: 1.5,
            release_sticks_at: 2.5,
        }
    }
}

impl PilotScript {
    fn sample_at(&self, time: f32) -> (bool, PilotCommand, HoldSwitches) {
        let mut holds = HoldSwitches::empty();
        if time >= self.heading_hold_at {
            holds |= HoldSwitches::HEADING_HOLD;
        }
        if time >= self.altitude_hold_at {
            holds |= HoldSwitches::ALTITUDE_HOLD;
        }

        let sticks_held = time < self.release_sticks_at;
        let pilot = PilotCommand {
            roll: if sticks_held { 0.2 } else { 0.0 },
            pitch: if sticks_held { -0.1 } else { 0.0 },
            yaw: if sticks_held { 0.3 } else { 0.0 },
            throttle: if time >= self.altitude_hold_at { 0.55 } else { HOVER_THROTTLE },
        };
        (time >= self.arm_at, pilot, holds)
    }
}

/// State is kept in the control frame; readings are reported the way the
/// estimator and gyro report them, pitch inverted.
#[derive(Debug, Default, Clone)]
pub struct SimulatedVehicle {
    time: f32,
    script: PilotScript,
    rotation: RotationVector2D,
    rotation_rate: RotationVector3D,
    heading: f32,
    height: f32,
    height_rate: f32,
}

impl SimulatedVehicle {
    pub fn new(script: PilotScript, heading: f32) -> Self {
        SimulatedVehicle {
            script,
            heading: wrap_two_pi(heading),
            ..Default::default()
        }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn sample(&self) -> FlightSample {
        let (armed, pilot, holds) = self.script.sample_at(self.time);
        FlightSample {
            armed,
            input: FlightControlLawsInput {
                flight_mode: FlightMode::Attitude,
                pilot,
                measured_rotation: RotationVector2D {
                    roll: self.rotation.roll,
                    pitch: -self.rotation.pitch,
                },
                measured_rotation_rate: RotationVector3D {
                    roll: self.rotation_rate.roll,
                    pitch: -self.rotation_rate.pitch,
                    yaw: self.rotation_rate.yaw,
                },
                heading: self.heading,
                height: self.height,
                height_rate: self.height_rate,
                holds,
                ..Default::default()
            },
        }
    }

    pub fn apply(&mut self, command: &MainControlLoopOutCommands, dt: f32) {
        let axis = match command {
            MainControlLoopOutCommands::UpdateAxisCommands(axis) => *axis,
            MainControlLoopOutCommands::KillMotors => AxisCommands::default(),
        };

        let angular_acceleration = RotationVector3D {
            roll: axis.roll,
            pitch: axis.pitch,
            yaw: axis.yaw,
        } * ANGULAR_AUTHORITY
            - self.rotation_rate * ANGULAR_DRAG;
        self.rotation_rate = self.rotation_rate + angular_acceleration * dt;
        self.rotation.roll += self.rotation_rate.roll * dt;
        self.rotation.pitch += self.rotation_rate.pitch * dt;
        self.heading = wrap_two_pi(self.heading + self.rotation_rate.yaw * dt);

        // Sitting on the ground until there is more than hover thrust.
        let vertical_acceleration = match command {
            MainControlLoopOutCommands::KillMotors => 0.0,
            _ => (axis.throttle - HOVER_THROTTLE) * VERTICAL_AUTHORITY - self.height_rate * VERTICAL_DRAG,
        };
        self.height_rate += vertical_acceleration * dt;
        self.height += self.height_rate * dt;
        if self.height < 0.0 {
            self.height = 0.0;
            self.height_rate = self.height_rate.max(0.0);
        }

        self.time += dt;
    }
}

impl FlightSensors for SimulatedVehicle {
    fn read_sample(&mut self) -> FlightSample {
        self.sample()
    }
}

impl FlightSensors for Arc<Mutex<SimulatedVehicle>> {
    fn read_sample(&mut self) -> FlightSample {
        self.lock().unwrap_or_else(PoisonError::into_inner).sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_arms_and_engages_holds_in_order() {
        let script = PilotScript::default();
        let (armed, _, holds) = script.sample_at(0.0);
        assert!(!armed);
        assert!(holds.is_empty());

        let (armed, _, holds) = script.sample_at(1.2);
        assert!(armed);
        assert!(holds.heading_hold());
        assert!(!holds.altitude_hold());

        let (_, pilot, holds) = script.sample_at(3.0);
        assert!(holds.altitude_hold());
        assert_eq!(pilot.roll, 0.0);
    }

    #[test]
    fn test_killed_motors_leave_vehicle_on_ground() {
        let mut vehicle = SimulatedVehicle::new(PilotScript::default(), 0.0);
        for _ in 0..100 {
            vehicle.apply(&MainControlLoopOutCommands::KillMotors, 0.002);
        }
        assert_eq!(vehicle.height(), 0.0);
        assert!((vehicle.time() - 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_pitch_is_reported_in_sensor_frame() {
        let mut vehicle = SimulatedVehicle::new(PilotScript::default(), 0.0);
        let command = MainControlLoopOutCommands::UpdateAxisCommands(AxisCommands {
            pitch: 1.0,
            throttle: HOVER_THROTTLE,
            ..Default::default()
        });
        vehicle.apply(&command, 0.01);
        let sample = vehicle.sample();
        assert!(sample.input.measured_rotation_rate.pitch < 0.0);
        assert!(sample.input.measured_rotation.pitch < 0.0);
    }
}

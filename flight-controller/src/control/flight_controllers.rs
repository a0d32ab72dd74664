//! Per-tick control law: attitude → rate cascade, heading hold and
//! altitude hold, assembled into the four axis commands for the mixer.

use shared_definitions::controller::{FlightMode, HoldSwitches, PilotCommand};
use shared_definitions::telemetry::HoldStatusWord;

use super::holds::{AltitudeHold, HeadingHold, HoldEdge};
use super::pid::{is_valid_iteration_time, PidState};
use crate::config::{ControlConfig, LoopId};
use crate::telemetry::{AltitudeHoldSample, TelemetrySink};
use crate::util::math::vectors::{RotationVector2D, RotationVector3D};

/// Everything the control law consumes on one tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlightControlLawsInput {
    pub flight_mode: FlightMode,
    pub pilot: PilotCommand,
    /// Attitude command used in modes above `Attitude`.
    pub autopilot_attitude: RotationVector2D,
    /// Estimated roll/pitch, radians, estimator frame.
    pub measured_rotation: RotationVector2D,
    /// Gyro rates, radians per second, sensor frame.
    pub measured_rotation_rate: RotationVector3D,
    /// Magnetic heading, radians.
    pub heading: f32,
    pub height: f32,
    pub height_rate: f32,
    pub holds: HoldSwitches,
    pub hold_integrators: bool,
}

/// Axis commands handed to the mixer.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct AxisCommands {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub throttle: f32,
}

/// The eight loop states, each touched only through its own `LoopId`.
#[derive(Debug, Default, Clone)]
pub struct PidBank {
    states: [PidState; LoopId::COUNT],
    pending_resets: [bool; LoopId::COUNT],
}

impl PidBank {
    pub fn get(&self, loop_id: LoopId) -> &PidState {
        &self.states[loop_id.index()]
    }

    pub fn update(
        &mut self,
        loop_id: LoopId,
        setpoint: f32,
        measurement: f32,
        iteration_time: f32,
        hold_integral: bool,
        config: &ControlConfig,
    ) -> f32 {
        let index = loop_id.index();
        if self.pending_resets[index] && is_valid_iteration_time(iteration_time) {
            self.pending_resets[index] = false;
            self.states[index].reset_state();
        }
        self.states[index].update(
            setpoint,
            measurement,
            iteration_time,
            hold_integral,
            config.pid(loop_id),
        )
    }

    /// Resets one loop. On a tick whose `iteration_time` cannot be used the
    /// reset waits for the next usable tick, so the loop keeps holding its
    /// previous output in the meantime.
    pub fn reset_state(&mut self, loop_id: LoopId, iteration_time: f32) {
        let index = loop_id.index();
        if is_valid_iteration_time(iteration_time) {
            self.pending_resets[index] = false;
            self.states[index].reset_state();
        } else {
            self.pending_resets[index] = true;
        }
    }

    pub fn reset_integrals(&mut self) {
        self.states.iter_mut().for_each(PidState::reset_integral);
    }

    pub fn reset_states(&mut self) {
        self.states.iter_mut().for_each(PidState::reset_state);
        self.pending_resets = [false; LoopId::COUNT];
    }
}

#[derive(Debug, Default, Clone)]
pub struct FlightControlLaws {
    pids: PidBank,
    attitude_command: RotationVector2D,
    attitude_output: RotationVector2D,
    rate_command: RotationVector3D,
    height_rate_setpoint: f32,
    heading_hold: HeadingHold,
    altitude_hold: AltitudeHold,
}

impl FlightControlLaws {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one control tick.
    ///
    /// `iteration_time` is the time since the previous tick in seconds. If
    /// it is not positive every loop holds its previous output; engagement
    /// edges are still tracked and their loop resets run on the next tick
    /// with a usable `iteration_time`.
    pub fn get_next_output(
        &mut self,
        input: &FlightControlLawsInput,
        config: &ControlConfig,
        iteration_time: f32,
        telemetry: &mut impl TelemetrySink,
    ) -> AxisCommands {
        let hold = input.hold_integrators;
        let dt = iteration_time;

        // Attitude command
        match input.flight_mode {
            FlightMode::Rate => {}
            FlightMode::Attitude => {
                self.attitude_command = RotationVector2D {
                    roll: input.pilot.roll,
                    pitch: input.pilot.pitch,
                } * config.attitude_scaling;
            }
            FlightMode::Navigation => self.attitude_command = input.autopilot_attitude,
        }

        // Attitude loop
        if input.flight_mode.uses_attitude_loop() {
            let measured = input.measured_rotation.to_control_frame();
            self.attitude_output = RotationVector2D {
                roll: self.pids.update(
                    LoopId::RollAttitude,
                    self.attitude_command.roll,
                    measured.roll,
                    dt,
                    hold,
                    config,
                ),
                pitch: self.pids.update(
                    LoopId::PitchAttitude,
                    self.attitude_command.pitch,
                    measured.pitch,
                    dt,
                    hold,
                    config,
                ),
            };
        }

        // Roll/pitch rate command
        let planar_rate_command = match input.flight_mode {
            FlightMode::Rate => {
                RotationVector2D {
                    roll: input.pilot.roll,
                    pitch: input.pilot.pitch,
                } * config.rate_scaling
            }
            _ => self.attitude_output,
        };
        self.rate_command.roll = planar_rate_command.roll;
        self.rate_command.pitch = planar_rate_command.pitch;

        self.rate_command.yaw = self.heading_hold_yaw_rate(input, config, dt);

        // Rate loop
        let measured_rate = RotationVector2D::from(&input.measured_rotation_rate).to_control_frame();
        let roll = self.pids.update(
            LoopId::RollRate,
            self.rate_command.roll,
            measured_rate.roll,
            dt,
            hold,
            config,
        );
        let pitch = self.pids.update(
            LoopId::PitchRate,
            self.rate_command.pitch,
            measured_rate.pitch,
            dt,
            hold,
            config,
        );
        let yaw = self.pids.update(
            LoopId::YawRate,
            self.rate_command.yaw,
            input.measured_rotation_rate.yaw,
            dt,
            hold,
            config,
        );

        let throttle = self.altitude_hold_throttle(input, config, dt, telemetry);

        AxisCommands {
            roll,
            pitch,
            yaw,
            throttle,
        }
    }

    fn heading_hold_yaw_rate(&mut self, input: &FlightControlLawsInput, config: &ControlConfig, dt: f32) -> f32 {
        if self.heading_hold.update_engagement(input.holds.heading_hold()) != HoldEdge::None {
            self.pids.reset_state(LoopId::Heading, dt);
            self.pids.reset_state(LoopId::YawRate, dt);
        }
        self.heading_hold.track(input.heading);
        if self.heading_hold.reference().is_none() {
            self.heading_hold.capture_reference(input.heading);
        }

        if self.heading_hold.is_engaged() {
            let (setpoint, measurement) = self.heading_hold.loop_setpoint(input.heading);
            self.pids.update(
                LoopId::Heading,
                setpoint,
                measurement,
                dt,
                input.hold_integrators,
                config,
            )
        } else {
            self.heading_hold.capture_reference(input.heading);
            input.pilot.yaw * config.rate_scaling
        }
    }

    fn altitude_hold_throttle(
        &mut self,
        input: &FlightControlLawsInput,
        config: &ControlConfig,
        dt: f32,
        telemetry: &mut impl TelemetrySink,
    ) -> f32 {
        let edge = self.altitude_hold.update_engagement(input.holds.altitude_hold());
        if !self.altitude_hold.is_engaged() {
            return input.pilot.throttle;
        }

        if edge == HoldEdge::Engaged {
            self.pids.reset_state(LoopId::AltitudePosition, dt);
            self.pids.reset_state(LoopId::AltitudeVelocity, dt);
            self.altitude_hold.engage(input.height, input.pilot.throttle);
            // Nothing to hold yet, the throttle was on the stick until now.
            if !is_valid_iteration_time(dt) {
                return self.altitude_hold.reference_throttle();
            }
        }

        let height_offset = self.altitude_hold.height_offset(
            input.pilot.throttle,
            input.holds.altitude_velocity_mode(),
            config,
        );
        let height_setpoint = self.altitude_hold.height_setpoint(height_offset);

        self.height_rate_setpoint = self.pids.update(
            LoopId::AltitudePosition,
            height_setpoint,
            input.height,
            dt,
            input.hold_integrators,
            config,
        );
        let throttle = self.altitude_hold.reference_throttle()
            + self.pids.update(
                LoopId::AltitudeVelocity,
                self.height_rate_setpoint,
                input.height_rate,
                dt,
                input.hold_integrators,
                config,
            );

        if self.altitude_hold.telemetry_due(config.telemetry_decimation) {
            telemetry.push_altitude_hold(&AltitudeHoldSample {
                height: input.height,
                height_rate: input.height_rate,
                height_setpoint,
                height_rate_setpoint: self.height_rate_setpoint,
                throttle,
                status: HoldStatusWord::from_state(input.flight_mode, input.holds),
            });
        }

        throttle
    }

    /// Keeps the laws ready to take over while the motors are off: every
    /// loop zeroed, both holds disengaged and the heading reference following
    /// the aircraft. A hold switch that is already on when the motors start
    /// then engages on the first live tick.
    pub fn standby(&mut self, input: &FlightControlLawsInput) {
        self.zero_states();
        self.attitude_output = RotationVector2D::default();
        self.rate_command = RotationVector3D::default();
        self.height_rate_setpoint = 0.0;
        self.heading_hold = HeadingHold::new();
        self.heading_hold.track(input.heading);
        self.heading_hold.capture_reference(input.heading);
        self.altitude_hold = AltitudeHold::new();
    }

    /// Zeroes every integrator.
    pub fn zero_integrators(&mut self) {
        self.pids.reset_integrals();
    }

    /// Zeroes every loop state.
    pub fn zero_states(&mut self) {
        self.pids.reset_states();
    }

    pub fn loop_state(&self, loop_id: LoopId) -> &PidState {
        self.pids.get(loop_id)
    }

    pub fn attitude_command(&self) -> RotationVector2D {
        self.attitude_command
    }

    pub fn rate_command(&self) -> RotationVector3D {
        self.rate_command
    }

    /// Last height-rate setpoint produced by the altitude position loop.
    pub fn height_rate_setpoint(&self) -> f32 {
        self.height_rate_setpoint
    }

    pub fn heading_hold(&self) -> &HeadingHold {
        &self.heading_hold
    }

    pub fn altitude_hold(&self) -> &AltitudeHold {
        &self.altitude_hold
    }
}

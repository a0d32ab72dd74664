//! Cascaded control laws for a multicopter flight computer.
//!
//! Pilot sticks, autopilot setpoints and estimates go in, four axis
//! commands (roll, pitch, yaw, throttle) come out once per control tick.
//! Sensor fusion, receiver decoding, mixing and configuration storage live
//! elsewhere and talk to this crate through [`config::store::ConfigStore`],
//! [`control::control_loops::FlightSensors`] and
//! [`telemetry::TelemetrySink`].

pub mod config;
pub mod control;
pub mod shared_core_values;
pub mod simulation;
pub mod telemetry;
pub mod threads;
pub mod util;

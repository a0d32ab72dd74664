pub mod controller;
pub mod telemetry;

use core::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::{
    config::store::ConfigStore,
    control::flight_controllers::{AxisCommands, FlightControlLaws, FlightControlLawsInput},
    shared_core_values::AtomicTelemetry,
    util::time::get_current_system_time_us,
};

const US_IN_SECOND: f32 = 1_000_000.0_f32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MainControlLoopOutCommands {
    KillMotors,
    UpdateAxisCommands(AxisCommands),
}

/// One reading of everything the flight loop needs from the outside.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlightSample {
    pub armed: bool,
    pub input: FlightControlLawsInput,
}

/// Source of pilot input, estimates and switches for the flight loop.
pub trait FlightSensors {
    fn read_sample(&mut self) -> FlightSample;
}

/// Owns the control law state between ticks and adapts the outside world
/// (clock, configuration store, arming) to it.
pub struct FlightLoop<'a> {
    config_store: &'a ConfigStore,
    control_laws: FlightControlLaws,
    previous_time_us: Option<u64>,
    config_generation: Option<u32>,
    armed: bool,
}

impl<'a> FlightLoop<'a> {
    pub fn new(config_store: &'a ConfigStore) -> Self {
        FlightLoop {
            config_store,
            control_laws: FlightControlLaws::new(),
            previous_time_us: None,
            config_generation: None,
            armed: false,
        }
    }

    pub fn control_laws(&self) -> &FlightControlLaws {
        &self.control_laws
    }

    pub fn step(
        &mut self,
        sample: &FlightSample,
        current_time_us: u64,
        telemetry_data: &AtomicTelemetry,
    ) -> MainControlLoopOutCommands {
        // One snapshot for the whole tick.
        let snapshot = self.config_store.snapshot();
        if self.config_generation != Some(snapshot.generation) {
            log::info!(
                "Flight loop using configuration generation {} (armed: {})",
                snapshot.generation,
                self.armed
            );
            self.config_generation = Some(snapshot.generation);
        }

        if !sample.armed {
            if self.armed {
                log::info!("Motors disarmed");
            }
            self.armed = false;
            self.previous_time_us = None;
            self.control_laws.standby(&sample.input);
            return MainControlLoopOutCommands::KillMotors;
        }

        if !self.armed {
            log::info!("Motors armed");
            self.armed = true;
        }

        let iteration_time = match self.previous_time_us {
            Some(previous_time_us) => {
                current_time_us.saturating_sub(previous_time_us) as f32 / US_IN_SECOND
            }
            None => snapshot.config.nominal_dt(),
        };
        self.previous_time_us = Some(current_time_us);

        let mut telemetry_sink = telemetry_data;
        let axis_commands = self.control_laws.get_next_output(
            &sample.input,
            &snapshot.config,
            iteration_time,
            &mut telemetry_sink,
        );

        //Store telemetry data
        telemetry_data.loop_exec_time_us.store(
            (iteration_time * US_IN_SECOND).round() as u32,
            Ordering::Relaxed,
        );
        telemetry_data
            .rotation_rate
            .store(sample.input.measured_rotation_rate);
        telemetry_data.axis_commands.store(axis_commands);

        MainControlLoopOutCommands::UpdateAxisCommands(axis_commands)
    }
}

/// Runs the flight loop at the configured rate until `keep_running` goes
/// false.
pub fn start_flight_controllers(
    config_store: &ConfigStore,
    sensors: &mut impl FlightSensors,
    telemetry_data: &AtomicTelemetry,
    keep_running: &AtomicBool,
    mut controllers_out_callback: impl FnMut(MainControlLoopOutCommands),
) {
    let mut flight_loop = FlightLoop::new(config_store);

    while keep_running.load(Ordering::Relaxed) {
        let tick_start_us = get_current_system_time_us();

        let sample = sensors.read_sample();
        let command = flight_loop.step(&sample, tick_start_us, telemetry_data);
        controllers_out_callback(command);

        let period_us = (config_store.snapshot().config.nominal_dt() * US_IN_SECOND) as u64;
        let elapsed_us = get_current_system_time_us().saturating_sub(tick_start_us);
        if elapsed_us < period_us {
            std::thread::sleep(Duration::from_micros(period_us - elapsed_us));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ControlConfig, LoopId};
    use crate::control::pid::PidParams;
    use shared_definitions::controller::PilotCommand;

    fn armed_roll_sample(roll: f32) -> FlightSample {
        FlightSample {
            armed: true,
            input: FlightControlLawsInput {
                pilot: PilotCommand {
                    roll,
                    throttle: 0.5,
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    fn integrating_store() -> ConfigStore {
        let mut config = ControlConfig::default();
        config.rate_scaling = 1.0;
        *config.pid_mut(LoopId::RollRate) = PidParams::new(0.0, 1.0, 0.0);
        ConfigStore::new(config).unwrap()
    }

    #[test]
    fn test_disarmed_kills_motors_and_clears_state() {
        let store = integrating_store();
        let telemetry = AtomicTelemetry::new();
        let mut flight_loop = FlightLoop::new(&store);

        flight_loop.step(&armed_roll_sample(1.0), 0, &telemetry);
        flight_loop.step(&armed_roll_sample(1.0), 2_000, &telemetry);
        assert_ne!(flight_loop.control_laws().loop_state(LoopId::RollRate).integral(), 0.0);

        let disarmed = FlightSample {
            armed: false,
            ..armed_roll_sample(1.0)
        };
        assert_eq!(
            flight_loop.step(&disarmed, 4_000, &telemetry),
            MainControlLoopOutCommands::KillMotors
        );
        assert_eq!(flight_loop.control_laws().loop_state(LoopId::RollRate).integral(), 0.0);
    }

    #[test]
    fn test_dt_comes_from_clock() {
        let store = integrating_store();
        let telemetry = AtomicTelemetry::new();
        let mut flight_loop = FlightLoop::new(&store);

        // First armed tick integrates over the nominal period.
        flight_loop.step(&armed_roll_sample(1.0), 10_000, &telemetry);
        let nominal = store.snapshot().config.nominal_dt();
        let integral = flight_loop.control_laws().loop_state(LoopId::RollRate).integral();
        assert!((integral - nominal).abs() < 1e-6);

        flight_loop.step(&armed_roll_sample(1.0), 20_000, &telemetry);
        let integral = flight_loop.control_laws().loop_state(LoopId::RollRate).integral();
        assert!((integral - (nominal + 0.01)).abs() < 1e-6);
        assert_eq!(telemetry.loop_exec_time_us.load(Ordering::Relaxed), 10_000);
    }

    #[test]
    fn test_repeated_timestamp_holds_output() {
        let store = integrating_store();
        let telemetry = AtomicTelemetry::new();
        let mut flight_loop = FlightLoop::new(&store);

        let first = flight_loop.step(&armed_roll_sample(1.0), 5_000, &telemetry);
        let repeated = flight_loop.step(&armed_roll_sample(-1.0), 5_000, &telemetry);
        assert_eq!(first, repeated);
    }

    #[test]
    fn test_new_configuration_applies_on_next_tick() {
        let store = integrating_store();
        let telemetry = AtomicTelemetry::new();
        let mut flight_loop = FlightLoop::new(&store);
        flight_loop.step(&armed_roll_sample(0.5), 0, &telemetry);

        store
            .update(|config| *config.pid_mut(LoopId::RollRate) = PidParams::new(2.0, 0.0, 0.0))
            .unwrap();

        match flight_loop.step(&armed_roll_sample(0.5), 2_000, &telemetry) {
            MainControlLoopOutCommands::UpdateAxisCommands(commands) => {
                assert!((commands.roll - 1.0).abs() < 1e-6)
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    struct ScriptedSensors {
        ticks: u32,
        stop_after: u32,
        keep_running: &'static AtomicBool,
    }

    impl FlightSensors for ScriptedSensors {
        fn read_sample(&mut self) -> FlightSample {
            self.ticks += 1;
            if self.ticks >= self.stop_after {
                self.keep_running.store(false, Ordering::Relaxed);
            }
            armed_roll_sample(0.1)
        }
    }

    #[test]
    fn test_start_flight_controllers_runs_until_stopped() {
        static KEEP_RUNNING: AtomicBool = AtomicBool::new(true);
        let mut config = ControlConfig::default();
        config.loop_rate_hz = 1000.0;
        let store = ConfigStore::new(config).unwrap();
        let telemetry = AtomicTelemetry::new();
        let mut sensors = ScriptedSensors {
            ticks: 0,
            stop_after: 5,
            keep_running: &KEEP_RUNNING,
        };

        let mut commands = Vec::new();
        start_flight_controllers(&store, &mut sensors, &telemetry, &KEEP_RUNNING, |command| {
            commands.push(command)
        });

        assert_eq!(commands.len(), 5);
        assert!(commands
            .iter()
            .all(|command| matches!(command, MainControlLoopOutCommands::UpdateAxisCommands(_))));
    }
}

use core::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::{
    config::{store::CONTROL_CONFIG, LoopId},
    control::control_loops::start_flight_controllers,
    shared_core_values::SHARED_TELEMETRY,
    simulation::{PilotScript, SimulatedVehicle},
    telemetry::telemetry_thread,
};

const THREAD_STACK_SIZE: usize = 64 * 1024;
const TELEMETRY_PERIOD: Duration = Duration::from_millis(250);

static KEEP_RUNNING: AtomicBool = AtomicBool::new(true);

pub fn flight_thread(vehicle: Arc<Mutex<SimulatedVehicle>>) {
    let mut sensors = vehicle.clone();
    start_flight_controllers(
        &CONTROL_CONFIG,
        &mut sensors,
        &SHARED_TELEMETRY,
        &KEEP_RUNNING,
        move |command| {
            let dt = CONTROL_CONFIG.snapshot().config.nominal_dt();
            vehicle
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .apply(&command, dt);
        },
    );
}

/// Stands in for the configuration shell: retunes yaw half-way through
/// the run, the way a pilot would from the ground station.
pub fn configuration_thread(retune_after: Duration) {
    std::thread::sleep(retune_after);
    if !KEEP_RUNNING.load(Ordering::Relaxed) {
        return;
    }
    let result = CONTROL_CONFIG.update(|config| {
        let yaw = config.pid_mut(LoopId::YawRate);
        yaw.proportional *= 1.25;
        yaw.integral *= 1.25;
    });
    if let Err(error) = result {
        log::error!("Yaw retune failed: {}", error);
    }
}

/// Runs flight, telemetry and configuration threads against a simulated
/// vehicle for `duration`.
pub fn run_bench(duration: Duration) {
    let vehicle = Arc::new(Mutex::new(SimulatedVehicle::new(
        PilotScript::default(),
        359.0_f32.to_radians(),
    )));
    KEEP_RUNNING.store(true, Ordering::Relaxed);

    std::thread::scope(|scope| {
        let spawned = [
            std::thread::Builder::new()
                .name("flight".into())
                .stack_size(THREAD_STACK_SIZE)
                .spawn_scoped(scope, {
                    let vehicle = vehicle.clone();
                    move || flight_thread(vehicle)
                }),
            std::thread::Builder::new()
                .name("telemetry".into())
                .stack_size(THREAD_STACK_SIZE)
                .spawn_scoped(scope, || {
                    telemetry_thread(&SHARED_TELEMETRY, &KEEP_RUNNING, TELEMETRY_PERIOD)
                }),
            std::thread::Builder::new()
                .name("configuration".into())
                .stack_size(THREAD_STACK_SIZE)
                .spawn_scoped(scope, move || configuration_thread(duration / 2)),
        ];
        for result in spawned.iter() {
            if let Err(error) = result {
                log::error!("Failed to start thread: {}", error);
            }
        }

        std::thread::sleep(duration);
        KEEP_RUNNING.store(false, Ordering::Relaxed);
    });

    let vehicle = vehicle.lock().unwrap_or_else(PoisonError::into_inner);
    log::info!(
        "Bench finished after {:.2}s simulated: heading {:.1} deg, height {:.2} m",
        vehicle.time(),
        vehicle.heading().to_degrees(),
        vehicle.height()
    );
}

use std::time::Duration;

use flight_control_laws::{threads, util::logger};

const BENCH_DURATION: Duration = Duration::from_secs(4);

fn main() {
    if let Err(error) = logger::initialize_default() {
        eprintln!("Logger already initialized: {}", error);
    }

    log::info!("Running");
    threads::run_bench(BENCH_DURATION);
}

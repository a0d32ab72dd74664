use std::time::Instant;

use once_cell::sync::Lazy;

static BOOT_TIME: Lazy<Instant> = Lazy::new(Instant::now);

/// Microseconds since the first call, monotonic.
pub fn get_current_system_time_us() -> u64 {
    BOOT_TIME.elapsed().as_micros() as u64
}

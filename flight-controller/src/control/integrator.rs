/// Limits `value` to `±limit`. Unlike `f32::clamp` this never panics on a
/// bad limit, it just lets the value through.
pub fn constraint_value(value: f32, limit: f32) -> f32 {
    value.max(-limit).min(limit)
}

/// Error accumulator for the integral term, clamped so it can never wind
/// up past `±limit`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Integrator {
    current_value: f32,
}

impl Integrator {
    pub fn new() -> Self {
        Integrator {
            current_value: 0.0_f32,
        }
    }

    pub fn add_new_value(&mut self, value: f32, interval_seconds: f32, limit: f32) -> f32 {
        self.current_value = constraint_value(self.current_value + value * interval_seconds, limit);
        self.current_value
    }

    pub fn get_current_value(&self) -> f32 {
        self.current_value
    }

    pub fn reset(&mut self) {
        self.current_value = 0.0_f32;
    }
}

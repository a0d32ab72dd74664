//! Single-axis PID primitive.
//!
//! The gains live in [`PidParams`] and belong to the configuration, the
//! memory lives in [`PidState`] and belongs to whichever loop owns it. A
//! `PidState` knows nothing about axes or modes.

use super::integrator::{constraint_value, Integrator};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidParams {
    pub proportional: f32,
    pub integral: f32,
    pub derivative: f32,
    /// Bound on the accumulated `error * dt`, before the integral gain.
    pub integral_limit: f32,
    pub output_limit: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PidParamsError {
    #[error("{0} gain is not finite: {1}")]
    NonFiniteGain(&'static str, f32),

    #[error("{0} must be finite and non-negative, got {1}")]
    InvalidLimit(&'static str, f32),
}

/// A loop may only integrate or differentiate over a positive, finite step.
pub fn is_valid_iteration_time(iteration_length: f32) -> bool {
    iteration_length > 0.0 && iteration_length.is_finite()
}

impl Default for PidParams {
    fn default() -> Self {
        PidParams::new(0.0, 0.0, 0.0)
    }
}

impl PidParams {
    /// Gains with no effective integral or output limit.
    pub const fn new(proportional: f32, integral: f32, derivative: f32) -> Self {
        PidParams {
            proportional,
            integral,
            derivative,
            integral_limit: f32::MAX,
            output_limit: f32::MAX,
        }
    }

    pub const fn with_limits(mut self, integral_limit: f32, output_limit: f32) -> Self {
        self.integral_limit = integral_limit;
        self.output_limit = output_limit;
        self
    }

    pub fn validate(&self) -> Result<(), PidParamsError> {
        let gains = [
            ("proportional", self.proportional),
            ("integral", self.integral),
            ("derivative", self.derivative),
        ];
        for (field, value) in gains {
            if !value.is_finite() {
                return Err(PidParamsError::NonFiniteGain(field, value));
            }
        }

        let limits = [
            ("integral_limit", self.integral_limit),
            ("output_limit", self.output_limit),
        ];
        for (field, value) in limits {
            if !value.is_finite() || value < 0.0 {
                return Err(PidParamsError::InvalidLimit(field, value));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PidState {
    error_integrator: Integrator,
    previous_measurement: Option<f32>,
    last_output: f32,
}

impl PidState {
    pub fn new() -> Self {
        PidState::default()
    }

    /// Runs one step of the loop and returns the clamped output.
    ///
    /// The derivative acts on the measurement, not on the error, so a step
    /// in the setpoint does not kick the output. The first call after
    /// creation or [`reset_state`](Self::reset_state) has nothing to
    /// differentiate against and contributes no derivative.
    ///
    /// A non-positive (or non-finite) `iteration_length` is a caller bug.
    /// It is absorbed: nothing is integrated or differentiated, the state is
    /// left untouched and the previous output is returned again.
    pub fn update(
        &mut self,
        setpoint: f32,
        measurement: f32,
        iteration_length: f32,
        hold_integral: bool,
        params: &PidParams,
    ) -> f32 {
        if !is_valid_iteration_time(iteration_length) {
            return self.last_output;
        }

        let error = setpoint - measurement;
        if !hold_integral {
            self.error_integrator
                .add_new_value(error, iteration_length, params.integral_limit);
        }

        let change_rate = match self.previous_measurement {
            Some(previous) => (previous - measurement) / iteration_length,
            None => 0.0_f32,
        };
        self.previous_measurement = Some(measurement);

        let proportional_output = error * params.proportional;
        let integral_output = self.error_integrator.get_current_value() * params.integral;
        let derivative_output = change_rate * params.derivative;

        self.last_output = constraint_value(
            proportional_output + integral_output + derivative_output,
            params.output_limit,
        );
        self.last_output
    }

    pub fn reset_integral(&mut self) {
        self.error_integrator.reset();
    }

    /// Forgets everything, the next update behaves like a fresh controller.
    pub fn reset_state(&mut self) {
        *self = PidState::default();
    }

    pub fn integral(&self) -> f32 {
        self.error_integrator.get_current_value()
    }

    pub fn last_output(&self) -> f32 {
        self.last_output
    }
}

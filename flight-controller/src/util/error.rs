use crate::config::LoopId;

/// Reasons a configuration snapshot is refused before it can reach the
/// control tick.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{loop_id:?} {field} gain is not finite: {value}")]
    NonFiniteGain {
        loop_id: LoopId,
        field: &'static str,
        value: f32,
    },

    #[error("{loop_id:?} {field} must be finite and non-negative, got {value}")]
    InvalidLimit {
        loop_id: LoopId,
        field: &'static str,
        value: f32,
    },

    #[error("{field} must be finite, got {value}")]
    NonFiniteScaling { field: &'static str, value: f32 },

    #[error("telemetry decimation must be at least 1")]
    ZeroTelemetryDecimation,

    #[error("loop rate must be finite and positive, got {0} Hz")]
    InvalidLoopRate(f32),
}

//! Engagement tracking for heading hold and altitude hold.
//!
//! Both holds compare the switch state against the value stored on the
//! previous tick, so a flag that flickers faster than the loop rate still
//! produces at most one edge per tick.
//!
//! Heading hold resets its loops on both edges, altitude hold only when it
//! engages. Throttle goes straight back to the stick when altitude hold
//! drops out.

use crate::config::ControlConfig;
use crate::util::math::angles::{shortest_difference, wrap_two_pi, HeadingUnwrapper};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldEdge {
    None,
    Engaged,
    Disengaged,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EdgeDetector {
    previous: bool,
}

impl EdgeDetector {
    pub fn update(&mut self, engaged: bool) -> HoldEdge {
        let edge = match (self.previous, engaged) {
            (false, true) => HoldEdge::Engaged,
            (true, false) => HoldEdge::Disengaged,
            _ => HoldEdge::None,
        };
        self.previous = engaged;
        edge
    }

    pub fn is_engaged(&self) -> bool {
        self.previous
    }
}

/// Heading hold keeps a reference heading that follows the aircraft while
/// the hold is off, so engaging always means "hold what I'm pointing at".
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadingHold {
    engagement: EdgeDetector,
    reference: Option<f32>,
    unwrapper: HeadingUnwrapper,
}

impl HeadingHold {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_engagement(&mut self, engaged: bool) -> HoldEdge {
        let edge = self.engagement.update(engaged);
        match edge {
            HoldEdge::Engaged => log::info!("Heading hold engaged, reference {:?} rad", self.reference),
            HoldEdge::Disengaged => log::info!("Heading hold disengaged"),
            HoldEdge::None => {}
        }
        edge
    }

    pub fn is_engaged(&self) -> bool {
        self.engagement.is_engaged()
    }

    /// Feeds the latest wrapped heading, returns it in a continuous frame.
    pub fn track(&mut self, heading: f32) -> f32 {
        self.unwrapper.update(heading)
    }

    pub fn capture_reference(&mut self, heading: f32) {
        self.reference = Some(wrap_two_pi(heading));
    }

    /// `None` until a heading has been captured.
    pub fn reference(&self) -> Option<f32> {
        self.reference
    }

    /// Shortest signed error from `heading` to the reference, zero while no
    /// reference has been captured.
    pub fn heading_error(&self, heading: f32) -> f32 {
        self.reference
            .map_or(0.0, |reference| shortest_difference(reference, heading))
    }

    /// Setpoint and measurement for the heading loop, both expressed in the
    /// continuous frame so the loop sees neither a wrapped error nor a 2π
    /// jump in its measurement.
    pub fn loop_setpoint(&self, heading: f32) -> (f32, f32) {
        let continuous = self.unwrapper.current();
        (continuous + self.heading_error(heading), continuous)
    }
}

/// Altitude hold state: the height captured at engagement and the throttle
/// the vehicle was hovering at.
#[derive(Debug, Default, Clone, Copy)]
pub struct AltitudeHold {
    engagement: EdgeDetector,
    height_reference: f32,
    reference_throttle: f32,
    telemetry_counter: u32,
}

impl AltitudeHold {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_engagement(&mut self, engaged: bool) -> HoldEdge {
        let edge = self.engagement.update(engaged);
        if edge == HoldEdge::Disengaged {
            log::info!("Altitude hold disengaged, throttle back to the stick");
        }
        edge
    }

    pub fn is_engaged(&self) -> bool {
        self.engagement.is_engaged()
    }

    pub fn engage(&mut self, height: f32, throttle: f32) {
        self.height_reference = height;
        self.reference_throttle = throttle;
        log::info!(
            "Altitude hold engaged at {:.2} m, reference throttle {:.3}",
            height,
            throttle
        );
    }

    pub fn height_reference(&self) -> f32 {
        self.height_reference
    }

    pub fn reference_throttle(&self) -> f32 {
        self.reference_throttle
    }

    /// Height offset commanded by moving the throttle stick away from the
    /// reference throttle.
    ///
    /// In velocity mode the offset is scaled down by
    /// `altitude_velocity_gain` but is not accumulated across ticks: the
    /// stick still commands an offset, only a smaller one.
    pub fn height_offset(&self, throttle: f32, velocity_mode: bool, config: &ControlConfig) -> f32 {
        let command_offset = (throttle - self.reference_throttle) * config.altitude_command_scaling;
        match velocity_mode {
            true => command_offset * config.altitude_velocity_gain,
            false => command_offset,
        }
    }

    pub fn height_setpoint(&self, height_offset: f32) -> f32 {
        self.height_reference + height_offset
    }

    /// True on the first engaged tick and every `decimation` ticks after.
    /// The counter keeps running across engagements.
    pub fn telemetry_due(&mut self, decimation: u32) -> bool {
        let due = self.telemetry_counter % decimation.max(1) == 0;
        self.telemetry_counter = self.telemetry_counter.wrapping_add(1);
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-5,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_edge_detector_reports_each_transition_once() {
        let mut detector = EdgeDetector::default();
        assert_eq!(detector.update(false), HoldEdge::None);
        assert_eq!(detector.update(true), HoldEdge::Engaged);
        assert_eq!(detector.update(true), HoldEdge::None);
        assert_eq!(detector.update(false), HoldEdge::Disengaged);
        assert_eq!(detector.update(false), HoldEdge::None);
        assert_eq!(detector.update(true), HoldEdge::Engaged);
    }

    #[test]
    fn test_heading_error_wraps_across_north() {
        let mut hold = HeadingHold::new();
        hold.capture_reference(1.0_f32.to_radians());
        assert_close(hold.heading_error(359.0_f32.to_radians()), 2.0_f32.to_radians());
    }

    #[test]
    fn test_reference_is_wrapped() {
        let mut hold = HeadingHold::new();
        hold.capture_reference(-0.5);
        assert_eq!(HeadingHold::new().reference(), None);
        assert_close(hold.reference().unwrap(), core::f32::consts::TAU - 0.5);
    }

    #[test]
    fn test_loop_setpoint_is_in_continuous_frame() {
        let mut hold = HeadingHold::new();
        hold.track(358.0_f32.to_radians());
        hold.capture_reference(358.0_f32.to_radians());
        hold.track(2.0_f32.to_radians());

        let (setpoint, measurement) = hold.loop_setpoint(2.0_f32.to_radians());
        assert_close(measurement, 362.0_f32.to_radians());
        assert_close(setpoint - measurement, -4.0_f32.to_radians());
    }

    #[test]
    fn test_height_offset_position_mode() {
        let config = ControlConfig::default();
        let mut hold = AltitudeHold::new();
        hold.engage(12.0, 0.5);
        let offset = hold.height_offset(0.6, false, &config);
        assert_close(offset, 1.0);
        assert_close(hold.height_setpoint(offset), 13.0);
    }

    #[test]
    fn test_height_offset_velocity_mode_does_not_accumulate() {
        let config = ControlConfig::default();
        let mut hold = AltitudeHold::new();
        hold.engage(0.0, 0.5);
        let first = hold.height_offset(0.6, true, &config);
        let second = hold.height_offset(0.6, true, &config);
        assert_close(first, 0.1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_telemetry_decimation() {
        let mut hold = AltitudeHold::new();
        let due: Vec<bool> = (0..11).map(|_| hold.telemetry_due(5)).collect();
        assert_eq!(
            due,
            vec![true, false, false, false, false, true, false, false, false, false, true]
        );
    }
}

//! Automation timelines for unit parameters.
//!
//! An [`AudioParam`] holds a static value plus an ordered list of
//! [`AutomationEvent`]s. The rendering engine consumes the timeline; this
//! crate only writes it, and can evaluate it with [`AudioParam::value_at`]
//! for inspection and tests.
//!
//! ## Segment Semantics
//!
//! - **Set**: the value jumps at the event time and holds.
//! - **Linear**: ramps in a straight line from the previous event.
//! - **Exponential**: ramps geometrically from the previous event. A ramp
//!   whose start is zero, or whose endpoints differ in sign, holds the start
//!   value until the event time.
//!
//! ```rust
//! use thump_core::{AudioParam, ParamName};
//!
//! let mut gain = AudioParam::new(ParamName::Gain, 0.0, 0.0, f64::MAX);
//! gain.set_value_at_time(0.0, 1.0).unwrap();
//! gain.linear_ramp_to_value_at_time(1.0, 2.0).unwrap();
//! assert!((gain.value_at(1.5) - 0.5).abs() < 1e-12);
//! ```

use crate::error::AutomationError;
use crate::unit::ParamName;

/// How an automation event reaches its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AutomationKind {
    /// Jump to the value at the event time.
    Set,
    /// Linear ramp from the previous event.
    Linear,
    /// Exponential ramp from the previous event.
    Exponential,
}

impl AutomationKind {
    /// Short lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Linear => "linear",
            Self::Exponential => "exponential",
        }
    }
}

/// A single point on an automation timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutomationEvent {
    /// Time in seconds on the scheduler clock.
    pub time: f64,
    /// Target value reached at `time`.
    pub value: f64,
    /// Segment type ending at this point.
    pub kind: AutomationKind,
}

/// A named, automatable control input of a processing unit.
#[derive(Clone, Debug)]
pub struct AudioParam {
    name: ParamName,
    value: f64,
    default_value: f64,
    min: f64,
    max: f64,
    events: Vec<AutomationEvent>,
}

impl AudioParam {
    /// Creates a parameter at `default_value`, clamped on `set_value` to `[min, max]`.
    pub fn new(name: ParamName, default_value: f64, min: f64, max: f64) -> Self {
        Self {
            name,
            value: default_value,
            default_value,
            min,
            max,
            events: Vec::new(),
        }
    }

    /// Parameter name.
    pub fn name(&self) -> ParamName {
        self.name
    }

    /// Static value used when no automation applies.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Value the parameter was created with.
    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    /// Sets the static value, clamped to the nominal range. NaN is ignored.
    pub fn set_value(&mut self, value: f64) {
        if !value.is_nan() {
            self.value = value.clamp(self.min, self.max);
        }
    }

    /// Scheduled events in time order.
    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    /// Jumps to `value` at `time`.
    pub fn set_value_at_time(&mut self, value: f64, time: f64) -> Result<(), AutomationError> {
        self.insert(value, time, AutomationKind::Set)
    }

    /// Ramps linearly from the previous event to `value` at `time`.
    pub fn linear_ramp_to_value_at_time(
        &mut self,
        value: f64,
        time: f64,
    ) -> Result<(), AutomationError> {
        self.insert(value, time, AutomationKind::Linear)
    }

    /// Ramps exponentially from the previous event to `value` at `time`.
    ///
    /// `value` must be strictly positive.
    pub fn exponential_ramp_to_value_at_time(
        &mut self,
        value: f64,
        time: f64,
    ) -> Result<(), AutomationError> {
        if value <= 0.0 {
            return Err(AutomationError::NonPositiveExponentialTarget(value));
        }
        self.insert(value, time, AutomationKind::Exponential)
    }

    /// Removes every event at or after `time`. Returns how many were removed.
    pub fn cancel_scheduled_values(&mut self, time: f64) -> usize {
        let before = self.events.len();
        self.events.retain(|e| e.time < time);
        before - self.events.len()
    }

    /// Evaluates the timeline at `time`.
    pub fn value_at(&self, time: f64) -> f64 {
        // Index of the first event strictly after `time`.
        let next = self.events.partition_point(|e| e.time <= time);

        let Some(upcoming) = self.events.get(next) else {
            return self.events.last().map_or(self.value, |e| e.value);
        };

        let (t0, v0) = match next.checked_sub(1) {
            Some(prev) => (self.events[prev].time, self.events[prev].value),
            None => match upcoming.kind {
                // No anchor before the first ramp: hold the static value.
                AutomationKind::Set => return self.value,
                _ => (0.0, self.value),
            },
        };

        let span = upcoming.time - t0;
        let frac = if span > 0.0 { (time - t0) / span } else { 1.0 };
        let v1 = upcoming.value;

        match upcoming.kind {
            AutomationKind::Set => v0,
            AutomationKind::Linear => v0 + (v1 - v0) * frac,
            AutomationKind::Exponential => {
                if v0 == 0.0 || v0.signum() != v1.signum() {
                    v0
                } else {
                    v0 * (v1 / v0).powf(frac)
                }
            }
        }
    }

    fn insert(
        &mut self,
        value: f64,
        time: f64,
        kind: AutomationKind,
    ) -> Result<(), AutomationError> {
        if !time.is_finite() || time < 0.0 {
            return Err(AutomationError::InvalidTime(time));
        }
        if !value.is_finite() {
            return Err(AutomationError::InvalidValue(value));
        }
        // Equal times keep insertion order.
        let idx = self.events.partition_point(|e| e.time <= time);
        self.events.insert(idx, AutomationEvent { time, value, kind });
        Ok(())
    }
}

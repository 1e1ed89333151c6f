//! ADSR envelope written as gain automation.
//!
//! Unlike a per-sample envelope generator, the [`EnvelopeScheduler`] never
//! runs: it reads the clock once per call and writes the whole curve onto
//! the gain parameter's automation timeline.
//!
//! ```text
//!   gain
//!   peak ┤    ╱╲
//!        │   ╱  ╲_____________
//!   S·pk ┤  ╱                 │
//!        │ ╱                  │
//!     0  ┼╱───────────────────┴──▶ time
//!        t    t+A   t+A+D     t'+R
//!        set  lin   exp       set
//! ```
//!
//! `start` writes the first three points; `stop` writes the drop to zero
//! after the release time, measured from a fresh clock reading. Exponential
//! segments cannot reach zero, so their targets are floored at
//! [`MIN_EXPONENTIAL_TARGET`].

use std::sync::Arc;

use crate::clock::Clock;
use crate::error::AutomationError;
use crate::param::AudioParam;

/// Smallest target handed to an exponential ramp.
pub const MIN_EXPONENTIAL_TARGET: f64 = 1e-4;

/// Longest attack, decay, or release, in seconds.
pub const MAX_ENVELOPE_TIME: f64 = 3600.0;

/// Attack/decay/sustain/release profile.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Envelope {
    /// Seconds from silence to peak.
    pub attack: f64,
    /// Seconds from peak to sustain level.
    pub decay: f64,
    /// Sustain level as a fraction of peak, in `[0, 1]`.
    pub sustain: f64,
    /// Seconds from stop to silence.
    pub release: f64,
}

impl Default for Envelope {
    /// 10 ms attack, 100 ms decay, full sustain, 500 ms release.
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 1.0,
            release: 0.5,
        }
    }
}

impl Envelope {
    /// Creates an envelope, sanitised as in [`merge`](Self::merge).
    pub fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        let mut env = Self::default();
        env.merge(EnvelopeUpdate {
            attack: Some(attack),
            decay: Some(decay),
            sustain: Some(sustain),
            release: Some(release),
        });
        env
    }

    /// Applies the fields set in `update`; unset fields keep their value.
    ///
    /// Non-finite values are ignored, times are clamped to
    /// `[0, MAX_ENVELOPE_TIME]`, and sustain is clamped to `[0, 1]`.
    pub fn merge(&mut self, update: EnvelopeUpdate) {
        fn time(v: Option<f64>, current: f64) -> f64 {
            match v {
                Some(v) if v.is_finite() => v.clamp(0.0, MAX_ENVELOPE_TIME),
                _ => current,
            }
        }
        self.attack = time(update.attack, self.attack);
        self.decay = time(update.decay, self.decay);
        self.release = time(update.release, self.release);
        if let Some(s) = update.sustain.filter(|s| s.is_finite()) {
            self.sustain = s.clamp(0.0, 1.0);
        }
    }

    /// Attack plus decay.
    pub fn onset(&self) -> f64 {
        self.attack + self.decay
    }
}

/// Partial envelope change; `None` fields are left alone.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnvelopeUpdate {
    /// New attack, if any.
    pub attack: Option<f64>,
    /// New decay, if any.
    pub decay: Option<f64>,
    /// New sustain, if any.
    pub sustain: Option<f64>,
    /// New release, if any.
    pub release: Option<f64>,
}

impl EnvelopeUpdate {
    /// Sets attack.
    pub fn attack(mut self, seconds: f64) -> Self {
        self.attack = Some(seconds);
        self
    }

    /// Sets decay.
    pub fn decay(mut self, seconds: f64) -> Self {
        self.decay = Some(seconds);
        self
    }

    /// Sets sustain.
    pub fn sustain(mut self, level: f64) -> Self {
        self.sustain = Some(level);
        self
    }

    /// Sets release.
    pub fn release(mut self, seconds: f64) -> Self {
        self.release = Some(seconds);
        self
    }
}

impl From<Envelope> for EnvelopeUpdate {
    fn from(env: Envelope) -> Self {
        Self {
            attack: Some(env.attack),
            decay: Some(env.decay),
            sustain: Some(env.sustain),
            release: Some(env.release),
        }
    }
}

/// Writes envelope curves onto a gain parameter against a shared clock.
#[derive(Clone)]
pub struct EnvelopeScheduler {
    clock: Arc<dyn Clock>,
    envelope: Envelope,
}

impl core::fmt::Debug for EnvelopeScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EnvelopeScheduler")
            .field("envelope", &self.envelope)
            .finish_non_exhaustive()
    }
}

impl EnvelopeScheduler {
    /// Creates a scheduler with the default envelope.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            envelope: Envelope::default(),
        }
    }

    /// Current envelope.
    pub fn envelope(&self) -> Envelope {
        self.envelope
    }

    /// Merges `update` into the envelope.
    pub fn update(&mut self, update: EnvelopeUpdate) {
        self.envelope.merge(update);
    }

    /// Current clock reading.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Writes the attack and decay segments starting `offset` seconds from now.
    ///
    /// Points at or after the start time are cancelled first, so a retrigger
    /// replaces the pending curve instead of interleaving with it. Returns
    /// the start time.
    pub fn schedule_start(&self, gain: &mut AudioParam, peak: f64, offset: f64) -> f64 {
        let t = start_time(self.clock.now(), offset);
        let peak = if peak.is_finite() { peak.max(0.0) } else { 0.0 };
        let env = self.envelope;
        let sustain = (env.sustain * peak).max(MIN_EXPONENTIAL_TARGET);

        gain.cancel_scheduled_values(t);
        scheduled("envelope_start", gain.set_value_at_time(0.0, t));
        scheduled("envelope_start", gain.linear_ramp_to_value_at_time(peak, t + env.attack));
        scheduled(
            "envelope_start",
            gain.exponential_ramp_to_value_at_time(sustain, t + env.onset()),
        );

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "envelope_start: t={t:.4}s peak={peak:.3} sustain={sustain:.4} at {:.4}s",
            t + env.onset()
        );
        t
    }

    /// Writes the release segment, `offset` seconds from a fresh clock reading.
    ///
    /// Returns the time the gain reaches zero.
    pub fn schedule_stop(&self, gain: &mut AudioParam, offset: f64) -> f64 {
        let t = start_time(self.clock.now(), offset);
        let end = t + self.envelope.release;
        scheduled("envelope_stop", gain.set_value_at_time(0.0, end));

        #[cfg(feature = "tracing")]
        tracing::debug!("envelope_stop: t={t:.4}s silent at {end:.4}s");
        end
    }
}

/// Logs an automation point the timeline refused, such as one whose time overflowed.
#[inline]
fn scheduled(_op: &str, result: Result<(), AutomationError>) {
    if let Err(_err) = result {
        #[cfg(feature = "tracing")]
        tracing::warn!("{_op}: point dropped, {_err}");
    }
}

fn start_time(now: f64, offset: f64) -> f64 {
    let offset = if offset.is_finite() { offset } else { 0.0 };
    (now + offset).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::param::AutomationKind;
    use crate::unit::ParamName;

    fn setup(at: f64) -> (EnvelopeScheduler, AudioParam, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(at));
        let sched = EnvelopeScheduler::new(clock.clone());
        (sched, AudioParam::new(ParamName::Gain, 0.0, f64::MIN, f64::MAX), clock)
    }

    #[test]
    fn merge_keeps_unset_fields() {
        let mut env = Envelope::default();
        env.merge(EnvelopeUpdate::default().attack(0.2).sustain(0.4));
        assert_eq!(env.attack, 0.2);
        assert_eq!(env.sustain, 0.4);
        assert_eq!(env.decay, 0.1);
        assert_eq!(env.release, 0.5);
    }

    #[test]
    fn merge_sanitises() {
        let env = Envelope::new(-1.0, f64::NAN, 3.0, 0.25);
        assert_eq!(env.attack, 0.0);
        assert_eq!(env.decay, Envelope::default().decay);
        assert_eq!(env.sustain, 1.0);
        assert_eq!(env.release, 0.25);
    }

    #[test]
    fn huge_times_are_capped() {
        let env = Envelope::new(f64::MAX, 1e300, 0.5, f64::MAX);
        assert_eq!(env.attack, MAX_ENVELOPE_TIME);
        assert_eq!(env.decay, MAX_ENVELOPE_TIME);
        assert_eq!(env.release, MAX_ENVELOPE_TIME);

        let (mut sched, mut gain, _) = setup(1.0);
        sched.update(EnvelopeUpdate::from(env));
        sched.schedule_start(&mut gain, 1.0, 0.0);
        let end = sched.schedule_stop(&mut gain, 0.0);
        let ev = gain.events();
        assert_eq!(ev.len(), 4);
        assert_eq!(ev[2].time, 1.0 + 2.0 * MAX_ENVELOPE_TIME);
        assert_eq!(end, 1.0 + MAX_ENVELOPE_TIME);
        assert!(ev.iter().all(|e| e.time.is_finite()));
    }

    #[test]
    fn start_writes_three_points() {
        let (mut sched, mut gain, _) = setup(2.0);
        sched.update(EnvelopeUpdate::default().attack(0.1).decay(0.2).sustain(0.5));
        let t = sched.schedule_start(&mut gain, 1.0, 0.0);
        assert_eq!(t, 2.0);

        let ev = gain.events();
        assert_eq!(ev.len(), 3);
        assert_eq!((ev[0].time, ev[0].value, ev[0].kind), (2.0, 0.0, AutomationKind::Set));
        assert!((ev[1].time - 2.1).abs() < 1e-12);
        assert_eq!((ev[1].value, ev[1].kind), (1.0, AutomationKind::Linear));
        assert!((ev[2].time - 2.3).abs() < 1e-12);
        assert_eq!((ev[2].value, ev[2].kind), (0.5, AutomationKind::Exponential));
    }

    #[test]
    fn zero_sustain_is_floored() {
        let (mut sched, mut gain, _) = setup(0.0);
        sched.update(EnvelopeUpdate::default().sustain(0.0));
        sched.schedule_start(&mut gain, 1.0, 0.0);
        assert_eq!(gain.events()[2].value, MIN_EXPONENTIAL_TARGET);

        let (sched, mut gain, _) = setup(0.0);
        sched.schedule_start(&mut gain, 0.0, 0.0);
        assert_eq!(gain.events().len(), 3);
        assert_eq!(gain.events()[2].value, MIN_EXPONENTIAL_TARGET);
    }

    #[test]
    fn stop_rereads_the_clock() {
        let (sched, mut gain, clock) = setup(1.0);
        sched.schedule_start(&mut gain, 1.0, 0.0);
        clock.advance(0.5);
        let end = sched.schedule_stop(&mut gain, 0.25);
        assert!((end - (1.5 + 0.25 + 0.5)).abs() < 1e-12);
        let last = gain.events().last().copied().unwrap();
        assert_eq!((last.value, last.kind), (0.0, AutomationKind::Set));
    }

    #[test]
    fn retrigger_replaces_pending_curve() {
        let (sched, mut gain, clock) = setup(0.0);
        sched.schedule_start(&mut gain, 1.0, 0.0);
        sched.schedule_stop(&mut gain, 1.0);
        assert_eq!(gain.events().len(), 4);

        clock.set(0.05);
        sched.schedule_start(&mut gain, 1.0, 0.0);
        let ev = gain.events();
        // The first trigger's set@0 and linear@0.01 precede the retrigger and
        // survive; its decay point and the pending release are replaced.
        assert_eq!(ev.len(), 5);
        let kinds: Vec<AutomationKind> = ev.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AutomationKind::Set,
                AutomationKind::Linear,
                AutomationKind::Set,
                AutomationKind::Linear,
                AutomationKind::Exponential,
            ]
        );
        let expected = [0.0, 0.01, 0.05, 0.06, 0.16];
        for (e, t) in ev.iter().zip(expected) {
            assert!((e.time - t).abs() < 1e-12, "{} != {t}", e.time);
        }
        assert!(ev.iter().all(|e| e.time < 1.0), "release point cancelled");
    }

    #[test]
    fn negative_offsets_clamp_to_zero() {
        let (sched, mut gain, _) = setup(0.1);
        assert_eq!(sched.schedule_start(&mut gain, 1.0, -5.0), 0.0);
        assert_eq!(gain.events()[0].time, 0.0);
    }
}

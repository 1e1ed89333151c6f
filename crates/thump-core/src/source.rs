//! Source lifecycle tracking.
//!
//! Generators in the graph are one-shot (see [`Generator`]). The tracker
//! keeps one entry per generator node, in registration order, and turns the
//! strict platform rules into idempotent start/stop:
//!
//! ```text
//!   Armed ──start──▶ Running ──stop──▶ Stopped
//!     │  stop: no-op    │ start: no-op    │ start/stop: no-op
//! ```
//!
//! `Stopped` is terminal. Restarting a sound means removing the node and
//! adding a fresh unit under the same name, or swapping a never-started
//! generator in through `update_node`. Either re-arms it.

use std::collections::BTreeMap;

use crate::graph::Node;
use crate::unit::Generator;

/// Lifecycle state of a tracked source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SourceState {
    /// Registered, waiting for the next batch start.
    #[default]
    Armed,
    /// Generator started.
    Running,
    /// Generator stopped for good.
    Stopped,
}

impl SourceState {
    /// Lowercase state name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Armed => "armed",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

#[derive(Clone, Debug)]
struct TrackedSource {
    name: String,
    state: SourceState,
}

impl TrackedSource {
    fn start(&mut self, generator: &mut dyn Generator, when: f64) -> bool {
        if self.state != SourceState::Armed {
            return false;
        }
        match generator.start(when) {
            Ok(()) => {
                self.state = SourceState::Running;
                true
            }
            Err(_err) => {
                // Already started outside the tracker; treat as running.
                #[cfg(feature = "tracing")]
                tracing::debug!("source_start: '{}' {_err}", self.name);
                self.state = SourceState::Running;
                false
            }
        }
    }

    fn stop(&mut self, generator: &mut dyn Generator, when: f64) -> bool {
        if self.state != SourceState::Running {
            return false;
        }
        let stopped = generator.stop(when).is_ok();
        self.state = SourceState::Stopped;
        stopped
    }
}

/// Insertion-ordered set of generator nodes and their lifecycle states.
#[derive(Clone, Debug, Default)]
pub struct SourceTracker {
    entries: Vec<TrackedSource>,
}

impl SourceTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` as armed. Re-registering resets it to armed.
    pub fn register(&mut self, name: &str) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.state = SourceState::Armed,
            None => self.entries.push(TrackedSource {
                name: name.to_owned(),
                state: SourceState::Armed,
            }),
        }
    }

    /// Forgets `name`. Returns true if it was tracked.
    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        before != self.entries.len()
    }

    /// State of `name`, if tracked.
    pub fn state(&self, name: &str) -> Option<SourceState> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.state)
    }

    /// True if `name` is tracked.
    pub fn contains(&self, name: &str) -> bool {
        self.state(name).is_some()
    }

    /// Tracked names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Number of tracked sources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Starts `name` through `generator` if armed. Returns true if it started.
    pub fn start(&mut self, name: &str, generator: &mut dyn Generator, when: f64) -> bool {
        self.entries
            .iter_mut()
            .find(|e| e.name == name)
            .is_some_and(|e| e.start(generator, when))
    }

    /// Stops `name` through `generator` if running. Returns true if it stopped.
    pub fn stop(&mut self, name: &str, generator: &mut dyn Generator, when: f64) -> bool {
        self.entries
            .iter_mut()
            .find(|e| e.name == name)
            .is_some_and(|e| e.stop(generator, when))
    }

    /// Starts every armed source in registration order. Returns how many started.
    ///
    /// Names with no matching generator node are skipped.
    pub(crate) fn start_all(&mut self, when: f64, nodes: &mut BTreeMap<String, Node>) -> usize {
        let mut started = 0;
        for entry in &mut self.entries {
            if entry.state != SourceState::Armed {
                continue;
            }
            if let Some(generator) = nodes
                .get_mut(&entry.name)
                .and_then(|n| n.unit.generator_mut())
            {
                started += usize::from(entry.start(generator, when));
            }
        }
        started
    }

    /// Stops every running source in registration order. Returns how many stopped.
    pub(crate) fn stop_all(&mut self, when: f64, nodes: &mut BTreeMap<String, Node>) -> usize {
        let mut stopped = 0;
        for entry in &mut self.entries {
            if entry.state != SourceState::Running {
                continue;
            }
            if let Some(generator) = nodes
                .get_mut(&entry.name)
                .and_then(|n| n.unit.generator_mut())
            {
                stopped += usize::from(entry.stop(generator, when));
            }
        }
        stopped
    }
}

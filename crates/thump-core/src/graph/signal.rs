//! Signal graph: mutation API and source batch control.

use std::collections::BTreeMap;

use crate::source::{SourceState, SourceTracker};
use crate::unit::{Generator, Target, Unit};

use super::node::Node;

/// Logs a rejected edit. Mutations never fail, so this is the only trace.
#[inline]
fn reject(_op: &str, _detail: core::fmt::Arguments<'_>) {
    #[cfg(feature = "tracing")]
    tracing::debug!("{_op}: ignored, {_detail}");
}

/// A directed connection as reported by [`SignalGraph::edges`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    /// Source node name.
    pub from: String,
    /// Destination node name.
    pub to: String,
    /// Where the edge lands on the destination.
    pub target: Target,
}

/// Named, mutable directed graph of processing units.
///
/// # Usage
///
/// 1. Create with [`new()`](Self::new)
/// 2. Add units: [`add_node()`](Self::add_node)
/// 3. Wire: [`connect()`](Self::connect) / [`disconnect()`](Self::disconnect)
/// 4. Reconfigure in place: [`update_node()`](Self::update_node)
/// 5. Drive generators: [`start_sources()`](Self::start_sources),
///    [`stop_sources()`](Self::stop_sources)
#[derive(Clone, Debug, Default)]
pub struct SignalGraph {
    nodes: BTreeMap<String, Node>,
    sources: SourceTracker,
}

impl SignalGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Node mutations ---

    /// Adds `unit` under `name`. No-op if the name is taken.
    ///
    /// Generator units are registered with the source tracker, armed for the
    /// next batch start.
    pub fn add_node(&mut self, name: impl Into<String>, unit: Unit) {
        let name = name.into();
        if self.nodes.contains_key(&name) {
            reject("graph_add", format_args!("'{name}' already exists"));
            return;
        }
        if unit.is_source() {
            self.sources.register(&name);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: {} node '{name}'", unit.kind_name());
        self.nodes.insert(name, Node::new(unit));
    }

    /// Removes `name` and every edge touching it. No-op if absent.
    ///
    /// Downstream edges are severed first, then upstream edges, then the
    /// unit's own routes, and only then is the entry dropped.
    pub fn remove_node(&mut self, name: &str) {
        let Some(node) = self.nodes.get(name) else {
            reject("graph_remove", format_args!("unknown node '{name}'"));
            return;
        };

        let downstream: Vec<(String, Target)> =
            node.next.iter().map(|(k, t)| (k.clone(), *t)).collect();
        let upstream: Vec<(String, Target)> =
            node.prev.iter().map(|(k, t)| (k.clone(), *t)).collect();

        for (dest, target) in downstream {
            self.sever(name, &dest, target);
        }
        for (src, target) in upstream {
            self.sever(&src, name, target);
        }

        if let Some(mut node) = self.nodes.remove(name) {
            node.unit.detach();
        }
        self.sources.unregister(name);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_remove: node '{name}'");
    }

    /// Runs `mutator` on the unit under `name`. No-op if absent.
    ///
    /// The mutation is arbitrary. If it swaps the processor for one of a
    /// different kind, source registration follows the new kind. A fresh,
    /// never-started generator swapped in for a spent one is re-armed.
    pub fn update_node<F>(&mut self, name: &str, mutator: F)
    where
        F: FnOnce(&mut Unit),
    {
        let Some(node) = self.nodes.get_mut(name) else {
            reject("graph_update", format_args!("unknown node '{name}'"));
            return;
        };
        mutator(&mut node.unit);

        let fresh = node.unit.generator().map(|g| g.start_time().is_none());
        match (fresh, self.sources.state(name)) {
            (Some(_), None) => self.sources.register(name),
            (Some(true), Some(SourceState::Running | SourceState::Stopped)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("graph_update: re-armed fresh source '{name}'");
                self.sources.register(name);
            }
            (None, Some(_)) => {
                self.sources.unregister(name);
            }
            _ => {}
        }
    }

    /// Connects `src` to `dest` at `target`.
    ///
    /// No-op if either node is missing, or if `target` names a parameter
    /// `dest` does not expose. An existing `src → dest` edge with a different
    /// target is replaced.
    pub fn connect(&mut self, src: &str, dest: &str, target: Target) {
        if !self.can_wire("graph_connect", src, dest, target) {
            return;
        }

        match self.nodes.get(src).and_then(|n| n.next.get(dest)).copied() {
            Some(existing) if existing == target => return,
            Some(existing) => self.sever(src, dest, existing),
            None => {}
        }

        if let Some(node) = self.nodes.get_mut(src) {
            node.unit.route(dest, target);
            node.next.insert(dest.to_owned(), target);
        }
        if let Some(node) = self.nodes.get_mut(dest) {
            node.prev.insert(src.to_owned(), target);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_connect: {src} → {dest} ({target})");
    }

    /// Disconnects the `src → dest` edge at `target`.
    ///
    /// No-op if either node is missing, the parameter is not exposed, or the
    /// recorded edge lands on a different target.
    pub fn disconnect(&mut self, src: &str, dest: &str, target: Target) {
        if !self.can_wire("graph_disconnect", src, dest, target) {
            return;
        }
        let recorded = self.nodes.get(src).and_then(|n| n.next.get(dest)).copied();
        if recorded != Some(target) {
            reject(
                "graph_disconnect",
                format_args!("no {src} → {dest} edge at {target}"),
            );
            return;
        }
        self.sever(src, dest, target);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_disconnect: {src} → {dest} ({target})");
    }

    fn can_wire(&self, op: &str, src: &str, dest: &str, target: Target) -> bool {
        if !self.nodes.contains_key(src) {
            reject(op, format_args!("unknown node '{src}'"));
            return false;
        }
        let Some(dest_node) = self.nodes.get(dest) else {
            reject(op, format_args!("unknown node '{dest}'"));
            return false;
        };
        if let Target::Param(param) = target {
            if !dest_node.unit.has_param(param) {
                reject(
                    op,
                    format_args!("'{dest}' ({}) has no {param}", dest_node.unit.kind_name()),
                );
                return false;
            }
        }
        true
    }

    /// Removes both adjacency entries and the unit route, without validation.
    fn sever(&mut self, src: &str, dest: &str, target: Target) {
        if let Some(node) = self.nodes.get_mut(src) {
            node.unit.unroute(dest, target);
            node.next.remove(dest);
        }
        if let Some(node) = self.nodes.get_mut(dest) {
            node.prev.remove(src);
        }
    }

    // --- Sources ---

    /// Starts every armed source at `when`, in registration order.
    pub fn start_sources(&mut self, when: f64) -> usize {
        let started = self.sources.start_all(when, &mut self.nodes);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_sources: started {started} at {when:.4}s");
        started
    }

    /// Stops every running source at `when`, in registration order.
    pub fn stop_sources(&mut self, when: f64) -> usize {
        let stopped = self.sources.stop_all(when, &mut self.nodes);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_sources: stopped {stopped} at {when:.4}s");
        stopped
    }

    /// Starts one source if armed. Returns true if it started.
    pub fn start_source(&mut self, name: &str, when: f64) -> bool {
        match self
            .nodes
            .get_mut(name)
            .and_then(|n| n.unit.generator_mut())
        {
            Some(generator) => self.sources.start(name, generator, when),
            None => false,
        }
    }

    /// Stops one source if running. Returns true if it stopped.
    pub fn stop_source(&mut self, name: &str, when: f64) -> bool {
        match self
            .nodes
            .get_mut(name)
            .and_then(|n| n.unit.generator_mut())
        {
            Some(generator) => self.sources.stop(name, generator, when),
            None => false,
        }
    }

    // --- Introspection ---

    /// Source lifecycle tracker.
    pub fn sources(&self) -> &SourceTracker {
        &self.sources
    }

    /// True if a node is named `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Node under `name`.
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    /// Unit under `name`.
    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.nodes.get(name).map(|n| &n.unit)
    }

    /// Node names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every edge, ordered by source then destination name.
    pub fn edges(&self) -> Vec<Edge> {
        self.nodes
            .iter()
            .flat_map(|(from, node)| {
                node.next.iter().map(move |(to, target)| Edge {
                    from: from.clone(),
                    to: to.clone(),
                    target: *target,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AudioContext;
    use crate::source::SourceState;
    use crate::unit::{FilterType, GainStage, Generator, ParamName, Processor, Route};
    use crate::waveform::Waveform;

    fn patch() -> SignalGraph {
        let (ctx, _) = AudioContext::offline(48000.0);
        let mut g = SignalGraph::new();
        g.add_node("osc", ctx.oscillator(Waveform::Saw, 110.0));
        g.add_node("lfo", ctx.constant(200.0));
        g.add_node("filter", ctx.biquad(FilterType::Lowpass, 800.0));
        g.add_node("amp", ctx.gain(0.5));
        g
    }

    fn assert_symmetric(g: &SignalGraph) {
        for name in g.names() {
            let node = g.node(name).unwrap();
            for (dest, target) in node.next() {
                assert_eq!(g.node(dest).unwrap().prev().get(name), Some(target));
            }
            for (src, target) in node.prev() {
                assert_eq!(g.node(src).unwrap().next().get(name), Some(target));
            }
            let routed: Vec<(String, Target)> = node
                .unit()
                .routes()
                .iter()
                .map(|r| (r.dest.clone(), r.target))
                .collect();
            let recorded: Vec<(String, Target)> =
                node.next().iter().map(|(d, t)| (d.clone(), *t)).collect();
            assert_eq!(routed.len(), recorded.len(), "routes of {name}");
            for pair in &recorded {
                assert!(routed.contains(pair), "{name} missing route {pair:?}");
            }
        }
    }

    #[test]
    fn duplicate_add_keeps_original() {
        let mut g = patch();
        g.add_node("amp", Unit::new(Processor::Destination));
        assert_eq!(g.unit("amp").unwrap().kind_name(), "gain");
        assert_eq!(g.len(), 4);
    }

    #[test]
    fn generators_are_registered_on_add() {
        let g = patch();
        assert_eq!(g.sources().names().collect::<Vec<_>>(), vec!["osc", "lfo"]);
        assert_eq!(g.sources().state("osc"), Some(SourceState::Armed));
    }

    #[test]
    fn connect_records_both_directions() {
        let mut g = patch();
        g.connect("osc", "filter", Target::Input);
        g.connect("lfo", "filter", Target::Param(ParamName::Frequency));
        g.connect("filter", "amp", Target::Input);

        assert_eq!(g.node("osc").unwrap().next().get("filter"), Some(&Target::Input));
        assert_eq!(
            g.node("filter").unwrap().prev().get("lfo"),
            Some(&Target::Param(ParamName::Frequency))
        );
        assert_eq!(g.edges().len(), 3);
        assert_symmetric(&g);
    }

    #[test]
    fn connect_to_missing_param_is_noop() {
        let mut g = patch();
        g.connect("lfo", "amp", Target::Param(ParamName::Frequency));
        g.connect("ghost", "amp", Target::Param(ParamName::Gain));
        g.connect("osc", "ghost", Target::Input);
        assert!(g.edges().is_empty());
        assert!(g.node("lfo").unwrap().unit().routes().is_empty());
    }

    #[test]
    fn reconnect_with_new_target_replaces_edge() {
        let mut g = patch();
        g.connect("lfo", "filter", Target::Input);
        g.connect("lfo", "filter", Target::Param(ParamName::Q));
        assert_eq!(
            g.node("lfo").unwrap().unit().routes(),
            &[Route {
                dest: "filter".into(),
                target: Target::Param(ParamName::Q)
            }]
        );
        assert_eq!(g.edges().len(), 1);
        assert_symmetric(&g);
    }

    #[test]
    fn disconnect_requires_matching_target() {
        let mut g = patch();
        g.connect("osc", "filter", Target::Input);
        g.disconnect("osc", "filter", Target::Param(ParamName::Frequency));
        assert_eq!(g.edges().len(), 1);
        g.disconnect("osc", "filter", Target::Input);
        assert!(g.edges().is_empty());
        assert_symmetric(&g);
    }

    #[test]
    fn remove_node_cleans_every_reference() {
        let mut g = patch();
        g.connect("osc", "filter", Target::Input);
        g.connect("lfo", "filter", Target::Param(ParamName::Frequency));
        g.connect("filter", "amp", Target::Input);
        g.connect("filter", "filter", Target::Param(ParamName::Q));

        g.remove_node("filter");

        assert!(!g.contains("filter"));
        for name in g.names() {
            let node = g.node(name).unwrap();
            assert!(!node.next().contains_key("filter"));
            assert!(!node.prev().contains_key("filter"));
            assert!(node.unit().routes().iter().all(|r| r.dest != "filter"));
        }
        assert!(g.edges().is_empty());
    }

    #[test]
    fn remove_source_unregisters_it() {
        let mut g = patch();
        g.remove_node("osc");
        g.remove_node("osc");
        assert!(!g.sources().contains("osc"));
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn update_node_mutates_in_place() {
        let mut g = patch();
        g.update_node("filter", |unit| {
            if let Some(freq) = unit.param_mut(ParamName::Frequency) {
                freq.set_value(1234.0);
            }
        });
        g.update_node("ghost", |_| panic!("must not run"));
        let freq = g
            .unit("filter")
            .and_then(|u| u.param(ParamName::Frequency))
            .map(|p| p.value());
        assert_eq!(freq, Some(1234.0));
    }

    #[test]
    fn update_node_tracks_kind_changes() {
        let mut g = patch();
        g.update_node("osc", |unit| {
            *unit.processor_mut() = Processor::Gain(GainStage::new(1.0));
        });
        assert!(!g.sources().contains("osc"));
    }

    #[test]
    fn update_node_rearms_fresh_generator() {
        let (ctx, _) = AudioContext::offline(48000.0);
        let mut g = patch();
        g.start_sources(0.0);
        g.stop_sources(1.0);
        assert_eq!(g.sources().state("osc"), Some(SourceState::Stopped));

        // Tweaking the spent oscillator leaves it stopped.
        g.update_node("osc", |unit| {
            if let Some(freq) = unit.param_mut(ParamName::Frequency) {
                freq.set_value(220.0);
            }
        });
        assert_eq!(g.sources().state("osc"), Some(SourceState::Stopped));

        let fresh = ctx.oscillator(Waveform::Square, 55.0);
        g.update_node("osc", |unit| *unit.processor_mut() = fresh.processor().clone());
        assert_eq!(g.sources().state("osc"), Some(SourceState::Armed));

        g.start_sources(2.0);
        assert_eq!(g.sources().state("osc"), Some(SourceState::Running));
        let start = g.unit("osc").and_then(Unit::generator).and_then(|s| s.start_time());
        assert_eq!(start, Some(2.0));
        // The constant source was never swapped and stays spent.
        assert_eq!(g.sources().state("lfo"), Some(SourceState::Stopped));
    }

    #[test]
    fn batch_start_and_stop() {
        let mut g = patch();
        assert_eq!(g.start_sources(1.0), 2);
        assert_eq!(g.start_sources(2.0), 0);
        assert_eq!(
            g.unit("osc").and_then(|u| u.generator()).and_then(|s| s.start_time()),
            Some(1.0)
        );
        assert_eq!(g.stop_sources(3.0), 2);
        assert_eq!(g.stop_sources(4.0), 0);
        assert!(!g.stop_source("osc", 5.0));
        assert_eq!(g.sources().state("lfo"), Some(SourceState::Stopped));
    }
}

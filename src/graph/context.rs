/*
Audio Environment
=================

Everything that makes sound goes through an explicit environment handle: it
owns the hardware-facing clock, builds nodes and automates their parameters.
Components receive the handle at construction instead of reaching for a
global, so several independent synths can share one environment and tests can
drive a clock that only moves when they render.

Signal Flow (pull-based):
-------------------------

    [BufferSource] ──→ [Lowpass] ──→ [Gain] ──→ [Destination] ──→ out
    [BufferSource] ───────────────→ [Gain]

Each block the destination pulls from its inputs. Nodes are processed in
dependency order (inputs before the node reading them); a node's input is the
sum of the outputs of everything connected to it.

Time:
-----

The clock is the number of frames rendered so far. `current_time()` is
frames / sample_rate, so scheduled start/stop/automation times become exact
frame positions and land with sample accuracy whatever moment they were
requested at.

Disposal:
---------

Buffer sources are one-shot. Once a source is past its stop time (or its
buffer runs out) the environment removes it and disconnects it; nobody has to
free it explicitly.

The processing order is cached and only rebuilt after a connection or a
disposal changes the graph, so a steady block renders without allocating.
*/

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{
    buffer::AudioBuffer,
    node::{Node, NodeId, ParamRef},
    param::ParamEvent,
};
use crate::MAX_BLOCK_SIZE;

/// Clock, node factory and parameter automation of an audio output graph
pub trait AudioEnv {
    fn sample_rate(&self) -> f32;

    /// Output-device time in seconds
    fn current_time(&self) -> f64;

    /// The node whose input is what gets heard
    fn destination(&self) -> NodeId;

    fn create_gain(&self) -> NodeId;

    /// Resonant low-pass filter (cutoff: `Frequency`, resonance: `Q`)
    fn create_lowpass(&self) -> NodeId;

    /// One-shot playback of `buffer`
    fn create_buffer_source(&self, buffer: AudioBuffer) -> NodeId;

    /// Route the output of `from` into the input of `to`
    fn connect(&self, from: NodeId, to: NodeId);

    fn start(&self, node: NodeId, when: f64);

    fn stop(&self, node: NodeId, when: f64);

    /// Set a parameter immediately, discarding its automation
    fn set_value(&self, param: ParamRef, value: f32);

    fn set_value_at_time(&self, param: ParamRef, value: f32, time: f64);

    fn linear_ramp_to_value_at_time(&self, param: ParamRef, value: f32, end_time: f64);

    fn cancel_scheduled_values(&self, param: ParamRef, from: f64);

    /// Sample a parameter's timeline
    fn value_at(&self, param: ParamRef, time: f64) -> f32;
}

/// Shared handle to an in-process audio graph
///
/// Clones refer to the same graph. Render it from a device callback, or
/// offline in tests where time advances only as blocks are rendered.
#[derive(Clone)]
pub struct AudioContext {
    inner: Arc<Mutex<Graph>>,
}

struct Graph {
    sample_rate: f32,
    frame: u64,
    next_id: u32,
    destination: NodeId,
    nodes: HashMap<NodeId, Node>,
    outputs: HashMap<NodeId, Vec<f32>>,
    mix: Vec<f32>,
    scratch: Vec<f32>,
    /// Nodes reachable from the destination, inputs first
    order: Vec<NodeId>,
    order_dirty: bool,
    visited: HashSet<NodeId>,
    stack: Vec<(NodeId, bool)>,
    finished: Vec<NodeId>,
}

impl AudioContext {
    pub fn new(sample_rate: f32) -> Self {
        let destination = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(destination, Node::destination());

        Self {
            inner: Arc::new(Mutex::new(Graph {
                sample_rate,
                frame: 0,
                next_id: 1,
                destination,
                nodes,
                outputs: HashMap::new(),
                mix: Vec::with_capacity(MAX_BLOCK_SIZE),
                scratch: vec![0.0; MAX_BLOCK_SIZE],
                order: Vec::new(),
                order_dirty: true,
                visited: HashSet::new(),
                stack: Vec::new(),
                finished: Vec::new(),
            })),
        }
    }

    /// Render mono output, advancing the clock by `out.len()` frames
    pub fn render(&self, out: &mut [f32]) {
        let mut graph = self.graph();
        for block in out.chunks_mut(MAX_BLOCK_SIZE) {
            graph.render_block(block);
        }
    }

    /// Frames rendered so far
    pub fn frame(&self) -> u64 {
        self.graph().frame
    }

    /// Live nodes, including the destination
    pub fn node_count(&self) -> usize {
        self.graph().nodes.len()
    }

    /// Buffer sources not yet disposed
    pub fn active_sources(&self) -> usize {
        self.graph().nodes.values().filter(|node| node.is_source()).count()
    }

    /// Scheduled automation events of a parameter (empty for unknown params)
    pub fn scheduled_events(&self, param: ParamRef) -> Vec<ParamEvent> {
        self.graph()
            .nodes
            .get(&param.node)
            .and_then(|node| node.param(param.kind))
            .map(|p| p.events().to_vec())
            .unwrap_or_default()
    }

    fn graph(&self) -> MutexGuard<'_, Graph> {
        // A panic while rendering leaves the graph usable; keep going
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_param(&self, param: ParamRef, f: impl FnOnce(&mut super::param::AudioParam)) {
        let mut graph = self.graph();
        match graph
            .nodes
            .get_mut(&param.node)
            .and_then(|node| node.param_mut(param.kind))
        {
            Some(p) => f(p),
            None => tracing::warn!(node = %param.node, kind = ?param.kind, "no such parameter"),
        }
    }
}

impl Graph {
    fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    fn to_frame(&self, time: f64) -> u64 {
        (time * self.sample_rate as f64).ceil().max(0.0) as u64
    }

    fn current_time(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }

    fn rebuild_order(&mut self) {
        self.order.clear();
        self.visited.clear();
        self.stack.clear();
        self.stack.push((self.destination, false));

        while let Some((id, expanded)) = self.stack.pop() {
            if expanded {
                self.order.push(id);
                continue;
            }
            if !self.visited.insert(id) {
                continue;
            }
            self.stack.push((id, true));
            if let Some(node) = self.nodes.get(&id) {
                for input in node.inputs.iter().rev() {
                    if !self.visited.contains(input) {
                        self.stack.push((*input, false));
                    }
                }
            }
        }

        self.order_dirty = false;
        tracing::trace!(nodes = self.order.len(), "render order rebuilt");
    }

    fn render_block(&mut self, out: &mut [f32]) {
        let len = out.len();

        if self.order_dirty {
            self.rebuild_order();
        }

        for index in 0..self.order.len() {
            let id = self.order[index];
            let mut mix = std::mem::take(&mut self.mix);
            mix.clear();
            mix.resize(len, 0.0);

            if let Some(node) = self.nodes.get(&id) {
                for input in &node.inputs {
                    if let Some(buffer) = self.outputs.get(input) {
                        for (m, s) in mix.iter_mut().zip(buffer.iter()) {
                            *m += *s;
                        }
                    }
                }
            }

            let mut output = self.outputs.remove(&id).unwrap_or_default();
            output.clear();
            output.resize(len, 0.0);

            if let Some(node) = self.nodes.get_mut(&id) {
                node.process(&mut output, &mix, self.frame, self.sample_rate, &mut self.scratch);
            }

            self.outputs.insert(id, output);
            self.mix = mix;
        }

        match self.outputs.get(&self.destination) {
            Some(rendered) => out.copy_from_slice(&rendered[..len]),
            None => out.fill(0.0),
        }

        self.frame += len as u64;
        self.collect_finished();

        let now = self.current_time();
        for node in self.nodes.values_mut() {
            node.prune(now);
        }
    }

    fn collect_finished(&mut self) {
        let frame = self.frame;
        self.finished.clear();
        self.finished.extend(
            self.nodes
                .iter()
                .filter(|(_, node)| node.is_finished(frame))
                .map(|(id, _)| *id),
        );

        if self.finished.is_empty() {
            return;
        }

        for id in &self.finished {
            self.nodes.remove(id);
            self.outputs.remove(id);
        }
        for node in self.nodes.values_mut() {
            node.inputs.retain(|input| !self.finished.contains(input));
        }
        self.order_dirty = true;

        tracing::trace!(disposed = self.finished.len(), frame, "disposed finished sources");
    }
}

impl AudioEnv for AudioContext {
    fn sample_rate(&self) -> f32 {
        self.graph().sample_rate
    }

    fn current_time(&self) -> f64 {
        self.graph().current_time()
    }

    fn destination(&self) -> NodeId {
        self.graph().destination
    }

    fn create_gain(&self) -> NodeId {
        self.graph().add(Node::gain())
    }

    fn create_lowpass(&self) -> NodeId {
        self.graph().add(Node::lowpass())
    }

    fn create_buffer_source(&self, buffer: AudioBuffer) -> NodeId {
        self.graph().add(Node::buffer_source(buffer))
    }

    fn connect(&self, from: NodeId, to: NodeId) {
        let mut graph = self.graph();
        if !graph.nodes.contains_key(&from) {
            tracing::warn!(%from, %to, "connect from unknown node");
            return;
        }
        match graph.nodes.get_mut(&to) {
            Some(node) => {
                node.inputs.push(from);
                graph.order_dirty = true;
            }
            None => tracing::warn!(%from, %to, "connect to unknown node"),
        }
    }

    fn start(&self, node: NodeId, when: f64) {
        let mut graph = self.graph();
        let frame = graph.to_frame(when);
        let started = graph.nodes.get_mut(&node).is_some_and(|n| n.start(frame));
        if !started {
            tracing::warn!(%node, when, "start ignored: not a live source");
        }
    }

    fn stop(&self, node: NodeId, when: f64) {
        let mut graph = self.graph();
        let frame = graph.to_frame(when);
        let stopped = graph.nodes.get_mut(&node).is_some_and(|n| n.stop(frame));
        if !stopped {
            tracing::warn!(%node, when, "stop ignored: not a live source");
        }
    }

    fn set_value(&self, param: ParamRef, value: f32) {
        self.with_param(param, |p| p.set_value(value));
    }

    fn set_value_at_time(&self, param: ParamRef, value: f32, time: f64) {
        self.with_param(param, |p| p.set_value_at_time(value, time));
    }

    fn linear_ramp_to_value_at_time(&self, param: ParamRef, value: f32, end_time: f64) {
        self.with_param(param, |p| p.linear_ramp_to_value_at_time(value, end_time));
    }

    fn cancel_scheduled_values(&self, param: ParamRef, from: f64) {
        self.with_param(param, |p| p.cancel_scheduled_values(from));
    }

    fn value_at(&self, param: ParamRef, time: f64) -> f32 {
        let graph = self.graph();
        match graph.nodes.get(&param.node).and_then(|node| node.param(param.kind)) {
            Some(p) => p.value_at(time),
            None => {
                tracing::warn!(node = %param.node, kind = ?param.kind, "no such parameter");
                0.0
            }
        }
    }
}

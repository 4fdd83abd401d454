use std::fmt;

use super::{buffer::AudioBuffer, param::AudioParam};
use crate::dsp::filter::SVFilter;

/// Handle to a node owned by an audio environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Refer to one of this node's automatable parameters
    pub fn param(self, kind: ParamKind) -> ParamRef {
        ParamRef { node: self, kind }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Automatable parameters exposed by graph nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Gain node multiplier
    Gain,
    /// Low-pass cutoff in Hz
    Frequency,
    /// Low-pass resonance
    Q,
}

/// A specific parameter on a specific node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamRef {
    pub node: NodeId,
    pub kind: ParamKind,
}

// Defaults for freshly created nodes
pub(crate) const DEFAULT_GAIN: f32 = 1.0;
pub(crate) const DEFAULT_LOWPASS_FREQUENCY: f32 = 350.0;
pub(crate) const DEFAULT_LOWPASS_Q: f32 = 1.0;

/// One-shot sample playback, scheduled in frames
pub(crate) struct BufferSource {
    buffer: AudioBuffer,
    cursor: usize,
    start_frame: Option<u64>,
    stop_frame: Option<u64>,
}

impl BufferSource {
    fn new(buffer: AudioBuffer) -> Self {
        Self {
            buffer,
            cursor: 0,
            start_frame: None,
            stop_frame: None,
        }
    }

    fn render(&mut self, out: &mut [f32], frame: u64) {
        let samples = self.buffer.samples();
        for (i, sample) in out.iter_mut().enumerate() {
            let now = frame + i as u64;
            let started = self.start_frame.is_some_and(|start| now >= start);
            let stopped = self.stop_frame.is_some_and(|stop| now >= stop);

            *sample = if started && !stopped && self.cursor < samples.len() {
                let value = samples[self.cursor];
                self.cursor += 1;
                value
            } else {
                0.0
            };
        }
    }

    /// Nothing more will ever come out of this source
    fn is_finished(&self, frame: u64) -> bool {
        let stopped = self.stop_frame.is_some_and(|stop| frame >= stop);
        let exhausted = self.start_frame.is_some() && self.cursor >= self.buffer.len();
        stopped || exhausted
    }
}

pub(crate) enum NodeKind {
    Destination,
    Gain {
        gain: AudioParam,
    },
    Lowpass {
        filter: SVFilter,
        frequency: AudioParam,
        q: AudioParam,
    },
    BufferSource(BufferSource),
}

pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) inputs: Vec<NodeId>,
}

impl Node {
    pub(crate) fn destination() -> Self {
        Self::with_kind(NodeKind::Destination)
    }

    pub(crate) fn gain() -> Self {
        Self::with_kind(NodeKind::Gain {
            gain: AudioParam::new(DEFAULT_GAIN),
        })
    }

    pub(crate) fn lowpass() -> Self {
        Self::with_kind(NodeKind::Lowpass {
            filter: SVFilter::lowpass(DEFAULT_LOWPASS_FREQUENCY, DEFAULT_LOWPASS_Q),
            frequency: AudioParam::new(DEFAULT_LOWPASS_FREQUENCY),
            q: AudioParam::new(DEFAULT_LOWPASS_Q),
        })
    }

    pub(crate) fn buffer_source(buffer: AudioBuffer) -> Self {
        Self::with_kind(NodeKind::BufferSource(BufferSource::new(buffer)))
    }

    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            inputs: Vec::new(),
        }
    }

    pub(crate) fn param(&self, kind: ParamKind) -> Option<&AudioParam> {
        match (&self.kind, kind) {
            (NodeKind::Gain { gain }, ParamKind::Gain) => Some(gain),
            (NodeKind::Lowpass { frequency, .. }, ParamKind::Frequency) => Some(frequency),
            (NodeKind::Lowpass { q, .. }, ParamKind::Q) => Some(q),
            _ => None,
        }
    }

    pub(crate) fn param_mut(&mut self, kind: ParamKind) -> Option<&mut AudioParam> {
        match (&mut self.kind, kind) {
            (NodeKind::Gain { gain }, ParamKind::Gain) => Some(gain),
            (NodeKind::Lowpass { frequency, .. }, ParamKind::Frequency) => Some(frequency),
            (NodeKind::Lowpass { q, .. }, ParamKind::Q) => Some(q),
            _ => None,
        }
    }

    pub(crate) fn is_source(&self) -> bool {
        matches!(self.kind, NodeKind::BufferSource(_))
    }

    /// Schedule playback start. Returns false for nodes that cannot start.
    pub(crate) fn start(&mut self, frame: u64) -> bool {
        match &mut self.kind {
            NodeKind::BufferSource(source) => {
                source.start_frame = Some(frame);
                true
            }
            _ => false,
        }
    }

    /// Schedule playback stop. Returns false for nodes that cannot stop.
    pub(crate) fn stop(&mut self, frame: u64) -> bool {
        match &mut self.kind {
            NodeKind::BufferSource(source) => {
                source.stop_frame = Some(frame);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn is_finished(&self, frame: u64) -> bool {
        match &self.kind {
            NodeKind::BufferSource(source) => source.is_finished(frame),
            _ => false,
        }
    }

    /// Render one block. `input` holds the sum of all connected inputs.
    pub(crate) fn process(
        &mut self,
        out: &mut [f32],
        input: &[f32],
        frame: u64,
        sample_rate: f32,
        scratch: &mut [f32],
    ) {
        let block_time = frame as f64 / sample_rate as f64;

        match &mut self.kind {
            NodeKind::Destination => out.copy_from_slice(input),
            NodeKind::Gain { gain } => {
                let gains = &mut scratch[..out.len()];
                gain.fill(block_time, sample_rate, gains);
                for ((o, i), g) in out.iter_mut().zip(input).zip(gains.iter()) {
                    *o = *i * *g;
                }
            }
            NodeKind::Lowpass {
                filter,
                frequency,
                q,
            } => {
                // Cutoff and Q move at block boundaries
                filter.set_cutoff(frequency.value_at(block_time));
                filter.set_q(q.value_at(block_time));
                out.copy_from_slice(input);
                filter.render(out, sample_rate);
            }
            NodeKind::BufferSource(source) => source.render(out, frame),
        }
    }

    /// Drop automation that ended before `now`
    pub(crate) fn prune(&mut self, now: f64) {
        match &mut self.kind {
            NodeKind::Gain { gain } => gain.prune(now),
            NodeKind::Lowpass { frequency, q, .. } => {
                frequency.prune(now);
                q.prune(now);
            }
            NodeKind::Destination | NodeKind::BufferSource(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_plays_between_start_and_stop() {
        let buffer = AudioBuffer::new(vec![1.0; 64], 48_000.0);
        let mut node = Node::buffer_source(buffer);
        node.start(4);
        node.stop(10);

        let mut out = vec![0.0; 16];
        node.process(&mut out, &[0.0; 16], 0, 48_000.0, &mut [0.0; 16]);

        assert_eq!(&out[..4], &[0.0; 4]);
        assert_eq!(&out[4..10], &[1.0; 6]);
        assert_eq!(&out[10..], &[0.0; 6]);
        assert!(node.is_finished(16));
    }

    #[test]
    fn test_source_finishes_when_exhausted() {
        let buffer = AudioBuffer::new(vec![0.5; 8], 48_000.0);
        let mut node = Node::buffer_source(buffer);
        node.start(0);

        let mut out = vec![0.0; 16];
        node.process(&mut out, &[0.0; 16], 0, 48_000.0, &mut [0.0; 16]);

        assert_eq!(&out[..8], &[0.5; 8]);
        assert_eq!(&out[8..], &[0.0; 8]);
        assert!(node.is_finished(16));
    }

    #[test]
    fn test_unstarted_source_is_silent_and_alive() {
        let mut node = Node::buffer_source(AudioBuffer::new(vec![1.0; 8], 48_000.0));
        let mut out = vec![1.0; 8];
        node.process(&mut out, &[0.0; 8], 0, 48_000.0, &mut [0.0; 8]);

        assert!(out.iter().all(|&s| s == 0.0));
        assert!(!node.is_finished(8));
    }

    #[test]
    fn test_gain_follows_automation() {
        let mut node = Node::gain();
        if let Some(gain) = node.param_mut(ParamKind::Gain) {
            gain.set_value(0.25);
        }

        let mut out = vec![0.0; 8];
        node.process(&mut out, &[2.0; 8], 0, 48_000.0, &mut [0.0; 8]);
        assert!(out.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_params_belong_to_their_nodes() {
        let gain = Node::gain();
        let lowpass = Node::lowpass();

        assert!(gain.param(ParamKind::Gain).is_some());
        assert!(gain.param(ParamKind::Frequency).is_none());
        assert!(lowpass.param(ParamKind::Frequency).is_some());
        assert!(lowpass.param(ParamKind::Q).is_some());
        assert!(lowpass.param(ParamKind::Gain).is_none());
    }
}

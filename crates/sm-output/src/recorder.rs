//! In-memory transports: a recorder for inspection and a tee for sending to
//! two transports at once.

use std::collections::VecDeque;

use sm_core::{FrameIndex, SourceId, Vec3};
use sm_engine::{FrameOutput, GroupEvent, OutputTransport, ParamUpdate, TransportStats};

/// Owned copy of one [`FrameOutput`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedFrame {
    pub frame:     FrameIndex,
    pub time:      f64,
    pub positions: Vec<(SourceId, Vec3)>,
    pub params:    Vec<ParamUpdate>,
}

impl RecordedFrame {
    pub fn position(&self, id: SourceId) -> Option<Vec3> {
        self.positions.iter().find(|(s, _)| *s == id).map(|(_, p)| *p)
    }
}

/// Keeps what it is sent, optionally only the most recent frames.
#[derive(Clone, Debug, Default)]
pub struct RecordingTransport {
    frames: VecDeque<RecordedFrame>,
    events: Vec<GroupEvent>,
    limit:  Option<usize>,
    stats:  TransportStats,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` frames, dropping the oldest.
    pub fn with_limit(limit: usize) -> Self {
        Self { limit: Some(limit), ..Self::default() }
    }

    pub fn frames(&self) -> impl ExactSizeIterator<Item = &RecordedFrame> + '_ {
        self.frames.iter()
    }

    pub fn last_frame(&self) -> Option<&RecordedFrame> {
        self.frames.back()
    }

    pub fn events(&self) -> &[GroupEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.events.clear();
    }
}

impl OutputTransport for RecordingTransport {
    fn send_frame(&mut self, frame: &FrameOutput<'_>) {
        if self.limit == Some(0) {
            return;
        }
        if self.limit.is_some_and(|l| self.frames.len() >= l) {
            self.frames.pop_front();
        }
        self.frames.push_back(RecordedFrame {
            frame:     frame.frame,
            time:      frame.time,
            positions: frame.positions.to_vec(),
            params:    frame.params.to_vec(),
        });
        self.stats.sent += (frame.positions.len() + frame.params.len()) as u64;
    }

    fn send_group_event(&mut self, event: &GroupEvent) {
        self.events.push(event.clone());
        self.stats.sent += 1;
    }

    fn stats(&self) -> TransportStats {
        self.stats
    }
}

/// Forwards everything to two transports.  Stats are summed.
pub struct Tee<A, B>(pub A, pub B);

impl<A: OutputTransport, B: OutputTransport> OutputTransport for Tee<A, B> {
    fn send_frame(&mut self, frame: &FrameOutput<'_>) {
        self.0.send_frame(frame);
        self.1.send_frame(frame);
    }

    fn send_group_event(&mut self, event: &GroupEvent) {
        self.0.send_group_event(event);
        self.1.send_group_event(event);
    }

    fn stats(&self) -> TransportStats {
        let (a, b) = (self.0.stats(), self.1.stats());
        TransportStats { sent: a.sent + b.sent, failed: a.failed + b.failed }
    }
}

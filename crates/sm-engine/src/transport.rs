//! Output transport boundary.
//!
//! The engine hands each finished frame to an [`OutputTransport`] and never
//! looks at the result: delivery is fire-and-forget and failures are counted
//! by the transport itself, never propagated into the frame loop.

use sm_core::{FrameIndex, Orientation, SourceId, Vec3};

/// A named-parameter change for one source.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ParamUpdate {
    Aperture { id: SourceId, value: f64 },
    Orientation { id: SourceId, value: Orientation },
}

impl ParamUpdate {
    pub fn id(&self) -> SourceId {
        match self {
            ParamUpdate::Aperture { id, .. } | ParamUpdate::Orientation { id, .. } => *id,
        }
    }
}

/// Group membership change, sent ahead of the frame it happened in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupEvent {
    Added { group: String, id: SourceId },
    Removed { group: String, id: SourceId },
}

/// Everything the renderer needs for one frame.
#[derive(Copy, Clone, Debug)]
pub struct FrameOutput<'a> {
    pub frame:     FrameIndex,
    /// Simulated seconds at the end of this frame.
    pub time:      f64,
    /// Every active source, ascending id.
    pub positions: &'a [(SourceId, Vec3)],
    /// Sources whose aperture or orientation changed since last sent.
    pub params:    &'a [ParamUpdate],
}

/// Delivery counters.  One message counts once, whether it carried a
/// position, a parameter or a group event.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportStats {
    pub sent:   u64,
    pub failed: u64,
}

/// Receives finished frames from the engine.
///
/// `send_group_event` and `stats` have default implementations so a
/// transport that only cares about positions need only implement
/// `send_frame`.
///
/// # Example: print every tenth frame
///
/// ```rust,ignore
/// struct Printer;
///
/// impl OutputTransport for Printer {
///     fn send_frame(&mut self, frame: &FrameOutput<'_>) {
///         if frame.frame.0 % 10 == 0 {
///             println!("{}: {} sources", frame.frame, frame.positions.len());
///         }
///     }
/// }
/// ```
pub trait OutputTransport {
    fn send_frame(&mut self, frame: &FrameOutput<'_>);

    fn send_group_event(&mut self, _event: &GroupEvent) {}

    fn stats(&self) -> TransportStats {
        TransportStats::default()
    }
}

impl<T: OutputTransport + ?Sized> OutputTransport for Box<T> {
    fn send_frame(&mut self, frame: &FrameOutput<'_>) {
        (**self).send_frame(frame);
    }

    fn send_group_event(&mut self, event: &GroupEvent) {
        (**self).send_group_event(event);
    }

    fn stats(&self) -> TransportStats {
        (**self).stats()
    }
}

/// `None` discards; `Some` forwards.
impl<T: OutputTransport> OutputTransport for Option<T> {
    fn send_frame(&mut self, frame: &FrameOutput<'_>) {
        if let Some(t) = self {
            t.send_frame(frame);
        }
    }

    fn send_group_event(&mut self, event: &GroupEvent) {
        if let Some(t) = self {
            t.send_group_event(event);
        }
    }

    fn stats(&self) -> TransportStats {
        self.as_ref().map(T::stats).unwrap_or_default()
    }
}

/// A transport that discards everything.  Use when only engine state is of
/// interest.
pub struct NullTransport;

impl OutputTransport for NullTransport {
    fn send_frame(&mut self, _frame: &FrameOutput<'_>) {}
}

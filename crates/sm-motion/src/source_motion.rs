//! `SourceMotion`: the per-source set of motion components and its
//! per-frame aggregation.
//!
//! # Slots
//!
//! A source holds an insertion-ordered list of named slots.  A slot is
//! either a component the source owns outright, or a handle to a component
//! owned by a macro:
//!
//! ```text
//!   SourceMotion(SourceId(4))
//!     "wobble"         Local(Trajectory)
//!     "concentration"  Shared(MacroId(1))   ──▶ Macro#1.shared["concentration"]
//! ```
//!
//! Handles are resolved through [`SharedComponents`] at aggregation time.
//! Replacing a slot keeps its position in the order, so aggregation order
//! only changes when slots are added or removed.

use sm_core::{MacroId, MotionDelta, MotionState, SourceId};
use tracing::warn;

use crate::{ComponentFault, Motion, MotionComponent};

// ── Slot ──────────────────────────────────────────────────────────────────────

/// One named entry in a [`SourceMotion`].
#[derive(Clone, Debug)]
pub enum Slot {
    /// Owned by this source.
    Local(MotionComponent),
    /// Owned by the macro; looked up under the slot's own key.
    Shared(MacroId),
}

/// Read access to macro-owned components during aggregation.
pub trait SharedComponents {
    fn resolve(&self, owner: MacroId, key: &str) -> Option<&MotionComponent>;
}

/// A [`SharedComponents`] with no macros, for sources outside any group.
pub struct NoShared;

impl SharedComponents for NoShared {
    fn resolve(&self, _owner: MacroId, _key: &str) -> Option<&MotionComponent> {
        None
    }
}

// ── Aggregate ─────────────────────────────────────────────────────────────────

/// Result of aggregating one source for one frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Aggregate {
    /// Sum of every contribution, channel by channel.
    pub delta:         MotionDelta,
    /// Components that returned a delta (including all-zero ones).
    pub contributions: usize,
    /// Components that faulted and were skipped.
    pub faults:        usize,
}

// ── SourceMotion ──────────────────────────────────────────────────────────────

/// All motion components acting on one source.
#[derive(Clone, Debug)]
pub struct SourceMotion {
    source: SourceId,
    slots:  Vec<(String, Slot)>,
}

impl SourceMotion {
    pub fn new(source: SourceId) -> Self {
        Self { source, slots: Vec::new() }
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot keys in aggregation order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.slots.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&Slot> {
        self.slots.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    /// Mutable access to a locally owned component.  Shared slots return
    /// `None`; mutate those through their macro.
    pub fn local_mut(&mut self, key: &str) -> Option<&mut MotionComponent> {
        self.slots.iter_mut().find(|(k, _)| k == key).and_then(|(_, s)| match s {
            Slot::Local(c) => Some(c),
            Slot::Shared(_) => None,
        })
    }

    /// Install `slot` under `key`, replacing in place if the key exists.
    /// Returns the replaced slot.
    pub fn insert_slot(&mut self, key: &str, slot: Slot) -> Option<Slot> {
        match self.slots.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, slot)),
            None => {
                self.slots.push((key.to_owned(), slot));
                None
            }
        }
    }

    /// Install a locally owned component.
    pub fn insert(&mut self, key: &str, component: impl Into<MotionComponent>) -> Option<Slot> {
        self.insert_slot(key, Slot::Local(component.into()))
    }

    /// Install a handle to the component `owner` holds under `key`.
    pub fn insert_shared(&mut self, key: &str, owner: MacroId) -> Option<Slot> {
        self.insert_slot(key, Slot::Shared(owner))
    }

    pub fn remove(&mut self, key: &str) -> Option<Slot> {
        let idx = self.slots.iter().position(|(k, _)| k == key)?;
        Some(self.slots.remove(idx).1)
    }

    /// Drop every handle pointing at `owner`.  Returns how many were removed.
    pub fn remove_shared_from(&mut self, owner: MacroId) -> usize {
        let before = self.slots.len();
        self.slots
            .retain(|(_, s)| !matches!(s, Slot::Shared(m) if *m == owner));
        before - self.slots.len()
    }

    /// Advance every enabled local component by one frame.  Shared
    /// components are advanced once by their macro, not here.
    pub fn begin_frame(&mut self, time: f64, dt: f64) {
        for (_, slot) in &mut self.slots {
            if let Slot::Local(c) = slot {
                c.begin_frame(time, dt);
            }
        }
    }

    /// Sum every enabled component's contribution for this frame.
    ///
    /// Faulting components are logged and skipped for this frame only;
    /// the rest still contribute.  `state` is never modified.
    pub fn aggregate<S: SharedComponents + ?Sized>(
        &self,
        state:  &MotionState,
        time:   f64,
        dt:     f64,
        shared: &S,
    ) -> Aggregate {
        let mut out = Aggregate::default();

        for (key, slot) in &self.slots {
            let component = match slot {
                Slot::Local(c) => c,
                Slot::Shared(owner) => match shared.resolve(*owner, key) {
                    Some(c) => c,
                    None => continue,
                },
            };

            let result = component.calculate_delta(self.source, state, time, dt).and_then(|d| match d {
                Some(delta) => match delta.non_finite_channel() {
                    Some(channel) => Err(ComponentFault::NonFinite { channel }),
                    None => Ok(Some(delta)),
                },
                None => Ok(None),
            });

            match result {
                Ok(Some(delta)) => {
                    out.delta.accumulate(&delta);
                    out.contributions += 1;
                }
                Ok(None) => {}
                Err(fault) => {
                    warn!(
                        source = %self.source,
                        component = key.as_str(),
                        kind = %component.kind(),
                        error = %fault,
                        "motion component fault; no contribution this frame"
                    );
                    out.faults += 1;
                }
            }
        }

        out
    }
}

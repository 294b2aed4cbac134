//! Fixed-capacity source table.
//!
//! # Layout
//!
//! Structure-of-Arrays, every `Vec` exactly `capacity` long; the `SourceId`
//! value is the index into all of them:
//!
//! ```ignore
//! let pos = registry.state(id)?.position;   // O(1)
//! ```
//!
//! | Field    | Contents                                              |
//! |----------|-------------------------------------------------------|
//! | `active` | slot is in use                                        |
//! | `states` | authoritative `MotionState`                           |
//! | `group`  | owning macro, if any                                  |
//! | `sent`   | orientation/aperture last handed to the transport     |
//!
//! Freed slots are reused lowest-id first.

use sm_core::{MacroId, MotionState, Orientation, SourceId};

use crate::{EngineError, EngineResult, ParamUpdate};

#[derive(Copy, Clone, Debug, PartialEq)]
struct SentParams {
    orientation: Orientation,
    aperture:    f64,
}

/// Authoritative per-source state, owned by the engine.
#[derive(Debug)]
pub struct SourceRegistry {
    active: Vec<bool>,
    states: Vec<MotionState>,
    group:  Vec<Option<MacroId>>,
    sent:   Vec<Option<SentParams>>,
    len:    usize,
}

impl SourceRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            active: vec![false; capacity],
            states: vec![MotionState::default(); capacity],
            group:  vec![None; capacity],
            sent:   vec![None; capacity],
            len:    0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.active.len()
    }

    /// Active sources.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Free slots.
    #[inline]
    pub fn available(&self) -> usize {
        self.capacity() - self.len
    }

    #[inline]
    pub fn contains(&self, id: SourceId) -> bool {
        self.active.get(id.index()).copied().unwrap_or(false)
    }

    /// Active ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.active
            .iter()
            .enumerate()
            .filter(|(_, a)| **a)
            .map(|(i, _)| SourceId(i as u32))
    }

    pub fn state(&self, id: SourceId) -> Option<&MotionState> {
        self.contains(id).then(|| &self.states[id.index()])
    }

    pub fn state_mut(&mut self, id: SourceId) -> Option<&mut MotionState> {
        if self.contains(id) {
            Some(&mut self.states[id.index()])
        } else {
            None
        }
    }

    pub fn group_of(&self, id: SourceId) -> Option<MacroId> {
        if self.contains(id) { self.group[id.index()] } else { None }
    }

    pub(crate) fn set_group(&mut self, id: SourceId, group: Option<MacroId>) {
        if self.contains(id) {
            self.group[id.index()] = group;
        }
    }

    // ── Allocation ────────────────────────────────────────────────────────

    /// Occupy one slot per entry of `initial`, lowest free ids first.
    ///
    /// All-or-nothing: if there is not room for every entry nothing is
    /// allocated.
    pub fn allocate(&mut self, initial: &[MotionState]) -> EngineResult<Vec<SourceId>> {
        if initial.len() > self.available() {
            return Err(EngineError::Capacity {
                requested: initial.len(),
                available: self.available(),
            });
        }

        let mut ids = Vec::with_capacity(initial.len());
        let mut states = initial.iter();
        for (i, active) in self.active.iter_mut().enumerate() {
            if *active {
                continue;
            }
            let Some(state) = states.next() else { break };
            *active = true;
            self.states[i] = *state;
            self.group[i] = None;
            self.sent[i] = None;
            ids.push(SourceId(i as u32));
        }
        self.len += ids.len();
        Ok(ids)
    }

    /// Free `id`'s slot.  Returns `false` if it was not active.
    pub fn release(&mut self, id: SourceId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let i = id.index();
        self.active[i] = false;
        self.states[i] = MotionState::default();
        self.group[i] = None;
        self.sent[i] = None;
        self.len -= 1;
        true
    }

    // ── Output bookkeeping ────────────────────────────────────────────────

    /// Append an update for every channel that differs from what was last
    /// sent (everything, for sources never sent), and mark it sent.
    pub(crate) fn collect_param_updates(&mut self, out: &mut Vec<ParamUpdate>) {
        for i in 0..self.active.len() {
            if !self.active[i] {
                continue;
            }
            let id = SourceId(i as u32);
            let now = SentParams {
                orientation: self.states[i].orientation,
                aperture:    self.states[i].aperture,
            };
            let last = self.sent[i];
            if last.is_none_or(|l| l.orientation != now.orientation) {
                out.push(ParamUpdate::Orientation { id, value: now.orientation });
            }
            if last.is_none_or(|l| l.aperture != now.aperture) {
                out.push(ParamUpdate::Aperture { id, value: now.aperture });
            }
            self.sent[i] = Some(now);
        }
    }
}

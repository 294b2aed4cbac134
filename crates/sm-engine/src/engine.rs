//! The `Engine` struct and its frame loop.

use std::collections::BTreeMap;
use std::sync::mpsc::Receiver;

use sm_core::error::require_non_negative;
use sm_core::{
    ConfigError, EngineConfig, FormationRng, FrameIndex, MacroId, MotionState, Orientation,
    SimClock, SourceId, Vec3,
};
use sm_motion::{
    Aggregate, ComponentKind, Concentration, ConcentrationStatus, Easing, ManualRotation, Motion,
    MotionComponent, Slot, SourceMotion,
};
use tracing::{debug, info, warn};

use crate::command::{self, Command, CommandSender};
use crate::{
    EngineError, EngineResult, FormationRegistry, FrameOutput, GroupEvent, Macro, MacroSource,
    MacroSpec, MacroTable, OutputTransport, ParamUpdate, SourceRegistry,
};

// ── Target ────────────────────────────────────────────────────────────────────

/// What a component operation addresses: one source, or a macro's shared
/// components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Source(SourceId),
    Macro(String),
}

impl From<SourceId> for Target {
    fn from(id: SourceId) -> Self {
        Target::Source(id)
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Target::Macro(name.to_owned())
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Target::Macro(name)
    }
}

// ── FrameReport ───────────────────────────────────────────────────────────────

/// Summary of one [`Engine::update`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameReport {
    /// Frames completed, including this one.
    pub frame:             FrameIndex,
    /// Simulated seconds at the end of the frame.
    pub time:              f64,
    /// Sources that received a non-empty delta.
    pub sources_updated:   usize,
    /// Component faults skipped during aggregation.
    pub faults:            usize,
    pub commands_applied:  usize,
    pub commands_rejected: usize,
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// The motion composition engine.
///
/// Owns every source's authoritative state and motion components, the macro
/// table and the output transport.  [`update`][Self::update] runs one frame:
///
/// 0. **Commands**: apply everything queued through a [`CommandSender`].
/// 1. **Clock**: advance by `dt`.
/// 2. **Advance**: `begin_frame` on every enabled shared component (once per
///    macro) and every enabled local component.
/// 3. **Compute** (optionally parallel with the `parallel` feature): each
///    source's aggregate delta against the pre-frame registry.
/// 4. **Apply** (sequential, ascending `SourceId`): add each delta to state.
/// 5. **Send**: pending group events, then the frame.
///
/// Create via [`EngineBuilder`][crate::EngineBuilder].
pub struct Engine<T: OutputTransport> {
    config:     EngineConfig,
    clock:      SimClock,
    registry:   SourceRegistry,
    /// Keyed by id so iteration is ascending.
    motions:    BTreeMap<SourceId, SourceMotion>,
    macros:     MacroTable,
    formations: FormationRegistry,
    transport:  T,
    /// Membership changes since the last frame.
    events:     Vec<GroupEvent>,
    commands:   Receiver<Command>,
    sender:     CommandSender,
    // Reused output buffers.
    positions:  Vec<(SourceId, Vec3)>,
    params:     Vec<ParamUpdate>,
}

impl<T: OutputTransport> Engine<T> {
    pub(crate) fn new(config: EngineConfig, formations: FormationRegistry, transport: T) -> Self {
        let (sender, commands) = command::channel();
        Self {
            clock:      SimClock::new(config.frame_rate),
            registry:   SourceRegistry::new(config.max_sources),
            motions:    BTreeMap::new(),
            macros:     MacroTable::default(),
            formations,
            transport,
            events:     Vec::new(),
            commands,
            sender,
            positions:  Vec::with_capacity(config.max_sources),
            params:     Vec::new(),
            config,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Simulated seconds elapsed.
    pub fn time(&self) -> f64 {
        self.clock.elapsed_secs
    }

    /// Frames completed.
    pub fn frame(&self) -> FrameIndex {
        self.clock.frame
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn state(&self, id: SourceId) -> Option<&MotionState> {
        self.registry.state(id)
    }

    pub fn source_ids(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.registry.ids()
    }

    pub fn source_count(&self) -> usize {
        self.registry.len()
    }

    pub fn motion(&self, id: SourceId) -> Option<&SourceMotion> {
        self.motions.get(&id)
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    pub fn macro_members(&self, name: &str) -> EngineResult<&[SourceId]> {
        self.macros
            .get(name)
            .map(Macro::members)
            .ok_or_else(|| EngineError::MacroNotFound(name.to_owned()))
    }

    /// Name of the macro `id` belongs to.
    pub fn macro_of(&self, id: SourceId) -> Option<&str> {
        self.registry
            .group_of(id)
            .and_then(|g| self.macros.by_id(g))
            .map(Macro::name)
    }

    pub fn formations(&self) -> &FormationRegistry {
        &self.formations
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// A handle for queueing configuration changes from other threads.
    pub fn command_sender(&self) -> CommandSender {
        self.sender.clone()
    }

    // ── Sources ───────────────────────────────────────────────────────────

    /// Register a source at the lowest free id.
    pub fn add_source(&mut self, initial: MotionState) -> EngineResult<SourceId> {
        check_state(&initial)?;
        let ids = self.registry.allocate(&[initial])?;
        let id = ids[0];
        self.motions.insert(id, SourceMotion::new(id));
        debug!(source = %id, "source added");
        Ok(id)
    }

    /// Remove a source, leaving its macro if it was in one.
    pub fn remove_source(&mut self, id: SourceId) -> EngineResult<()> {
        if !self.registry.contains(id) {
            return Err(EngineError::SourceNotFound(id));
        }
        if let Some(m) = self.registry.group_of(id).and_then(|g| self.macros.by_id_mut(g)) {
            m.remove_member(id);
            self.events.push(GroupEvent::Removed { group: m.name().to_owned(), id });
        }
        self.motions.remove(&id);
        self.registry.release(id);
        debug!(source = %id, "source removed");
        Ok(())
    }

    pub fn set_aperture(&mut self, id: SourceId, aperture: f64) -> EngineResult<()> {
        require_non_negative("aperture", aperture)?;
        let state = self.registry.state_mut(id).ok_or(EngineError::SourceNotFound(id))?;
        state.aperture = aperture;
        Ok(())
    }

    // ── Macros ────────────────────────────────────────────────────────────

    /// Create a macro.  On any error nothing has changed: no ids allocated,
    /// no memberships, and the name is still free.
    pub fn create_macro(&mut self, spec: MacroSpec) -> EngineResult<MacroId> {
        let MacroSpec { name, source, behavior, params } = spec;
        self.macros.check_name(&name)?;
        let shared = behavior.shared_components(&params)?;
        let id = self.macros.peek_next_id();

        let members = match source {
            MacroSource::Count { count, formation, layout } => {
                layout.validate()?;
                let generator = self
                    .formations
                    .get(&formation)
                    .ok_or_else(|| EngineError::UnknownFormation(formation.clone()))?;
                if count > self.registry.available() {
                    return Err(EngineError::Capacity {
                        requested: count,
                        available: self.registry.available(),
                    });
                }
                let mut rng = FormationRng::new(self.config.seed, id);
                let positions = generator.generate(count, &layout, &mut rng);
                if positions.len() != count {
                    return Err(ConfigError::Invalid(format!(
                        "formation {formation:?} produced {} positions for {count} sources",
                        positions.len()
                    ))
                    .into());
                }
                if positions.iter().any(|p| !p.is_finite()) {
                    return Err(ConfigError::NonFinite { param: "formation position" }.into());
                }

                let initial: Vec<MotionState> = positions.into_iter().map(MotionState::at).collect();
                let ids = self.registry.allocate(&initial)?;
                for &sid in &ids {
                    self.motions.insert(sid, SourceMotion::new(sid));
                }
                ids
            }
            MacroSource::Existing(ids) => {
                let ids = unique(&ids);
                self.check_joinable(&ids, shared.iter().map(|(k, _)| k.as_str()))?;
                ids
            }
        };

        let mut m = Macro::new(id, name, behavior, params, Vec::new());
        let centroid = self.centroid_of(&members);
        for (key, mut component) in shared {
            component.bind_group_center(centroid);
            m.insert_shared(&key, component);
        }
        for &sid in &members {
            attach(&mut self.registry, &mut self.motions, &mut self.events, &mut m, sid);
        }
        info!(
            group = m.name(),
            id = %id,
            members = members.len(),
            behavior = %behavior,
            "macro created"
        );
        self.macros.insert(m);
        Ok(id)
    }

    /// Tear down a macro.  Shared components go with it; members lose their
    /// handles.  With `release_sources` the members are removed as well.
    ///
    /// Returns the former members.  The name is retired.
    pub fn delete_macro(&mut self, name: &str, release_sources: bool) -> EngineResult<Vec<SourceId>> {
        let m = self
            .macros
            .remove(name)
            .ok_or_else(|| EngineError::MacroNotFound(name.to_owned()))?;
        for &sid in m.members() {
            detach(&mut self.registry, &mut self.motions, &mut self.events, &m, sid);
            if release_sources {
                self.motions.remove(&sid);
                self.registry.release(sid);
            }
        }
        info!(group = name, members = m.members().len(), released = release_sources, "macro deleted");
        Ok(m.members().to_vec())
    }

    /// Rename a macro.  `from` is retired; members keep their handles.
    pub fn rename_macro(&mut self, from: &str, to: &str) -> EngineResult<()> {
        let id = self.macros.rename(from, to)?;
        if let Some(m) = self.macros.by_id(id) {
            for &sid in m.members() {
                self.events.push(GroupEvent::Removed { group: from.to_owned(), id: sid });
                self.events.push(GroupEvent::Added { group: to.to_owned(), id: sid });
            }
        }
        info!(from, to, "macro renamed");
        Ok(())
    }

    /// Add existing sources to a macro.  They receive handles to every
    /// shared component, which records where each one joins; component
    /// centers bound at install time are not recomputed.  A source that owns
    /// a component under one of the macro's keys is a `KeyConflict`.
    pub fn add_macro_members(&mut self, name: &str, ids: &[SourceId]) -> EngineResult<()> {
        let gid = self.macro_id(name)?;
        let ids = unique(ids);
        let keys: Vec<String> = self
            .macros
            .by_id(gid)
            .map(|m| m.shared_keys().map(str::to_owned).collect())
            .unwrap_or_default();
        self.check_joinable(&ids, keys.iter().map(String::as_str))?;
        let m = self
            .macros
            .by_id_mut(gid)
            .ok_or_else(|| EngineError::MacroNotFound(name.to_owned()))?;
        for sid in ids {
            attach(&mut self.registry, &mut self.motions, &mut self.events, m, sid);
        }
        Ok(())
    }

    /// Take sources out of a macro.  They stay registered.
    pub fn remove_macro_members(&mut self, name: &str, ids: &[SourceId]) -> EngineResult<()> {
        let ids = unique(ids);
        let m = self
            .macros
            .get_mut(name)
            .ok_or_else(|| EngineError::MacroNotFound(name.to_owned()))?;
        for &sid in &ids {
            if !self.registry.contains(sid) {
                return Err(EngineError::SourceNotFound(sid));
            }
            if !m.contains(sid) {
                return Err(EngineError::NotInMacro { id: sid, group: name.to_owned() });
            }
        }
        for sid in ids {
            detach(&mut self.registry, &mut self.motions, &mut self.events, m, sid);
            m.remove_member(sid);
        }
        Ok(())
    }

    // ── Components ────────────────────────────────────────────────────────

    /// Install `component` under `key`, replacing any previous one.  The
    /// component records where each source it acts on sits now.
    ///
    /// On a macro the component is bound to the current member centroid
    /// and every member receives a handle to it.  A member that owns a
    /// component under the same `key` is an error; nothing is installed.
    pub fn set_component(
        &mut self,
        target:    impl Into<Target>,
        key:       &str,
        component: impl Into<MotionComponent>,
    ) -> EngineResult<()> {
        let mut component = component.into();
        match target.into() {
            Target::Source(id) => {
                let state = self.registry.state(id).ok_or(EngineError::SourceNotFound(id))?;
                component.bind_sources(&[(id, state.position)]);
                let sm = self.motions.get_mut(&id).ok_or(EngineError::SourceNotFound(id))?;
                sm.insert(key, component);
            }
            Target::Macro(name) => {
                let gid = self.macro_id(&name)?;
                let members = self.macro_members(&name)?.to_vec();
                self.check_no_local(&members, key)?;
                component.bind_group_center(self.centroid_of(&members));
                component.bind_sources(&self.positions_of(&members));
                if let Some(m) = self.macros.by_id_mut(gid) {
                    m.insert_shared(key, component);
                }
                for sid in members {
                    if let Some(sm) = self.motions.get_mut(&sid) {
                        sm.insert_shared(key, gid);
                    }
                }
            }
        }
        Ok(())
    }

    /// Remove the component under `key`.  On a macro, members' handles to
    /// it go too.
    pub fn clear_component(&mut self, target: impl Into<Target>, key: &str) -> EngineResult<()> {
        match target.into() {
            Target::Source(id) => {
                let sm = self.motions.get_mut(&id).ok_or(EngineError::SourceNotFound(id))?;
                sm.remove(key).ok_or_else(|| EngineError::ComponentNotFound(key.to_owned()))?;
            }
            Target::Macro(name) => {
                let m = self
                    .macros
                    .get_mut(&name)
                    .ok_or_else(|| EngineError::MacroNotFound(name.clone()))?;
                m.remove_shared(key).ok_or_else(|| EngineError::ComponentNotFound(key.to_owned()))?;
                let gid = m.id();
                for sid in m.members() {
                    if let Some(sm) = self.motions.get_mut(sid) {
                        if matches!(sm.get(key), Some(Slot::Shared(o)) if *o == gid) {
                            sm.remove(key);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Enable or disable a component.  A disabled component keeps its
    /// progress and resumes from it when re-enabled.
    pub fn set_component_enabled(
        &mut self,
        target:  impl Into<Target>,
        key:     &str,
        enabled: bool,
    ) -> EngineResult<()> {
        self.component_mut(&target.into(), key)?.set_enabled(enabled);
        Ok(())
    }

    pub fn set_concentration(&mut self, target: impl Into<Target>, key: &str, factor: f64) -> EngineResult<()> {
        self.concentration_mut(&target.into(), key)?.set_factor(factor)?;
        Ok(())
    }

    pub fn animate_concentration(
        &mut self,
        target:   impl Into<Target>,
        key:      &str,
        factor:   f64,
        duration: f64,
        easing:   Easing,
    ) -> EngineResult<()> {
        self.concentration_mut(&target.into(), key)?
            .animate_to(factor, duration, easing)?;
        Ok(())
    }

    pub fn toggle_concentration(&mut self, target: impl Into<Target>, key: &str) -> EngineResult<()> {
        self.concentration_mut(&target.into(), key)?.toggle();
        Ok(())
    }

    pub fn concentration_status(&self, target: impl Into<Target>, key: &str) -> EngineResult<ConcentrationStatus> {
        let c = self.component(&target.into(), key)?;
        c.as_concentration().map(Concentration::status).ok_or_else(|| {
            EngineError::WrongComponentKind {
                key:      key.to_owned(),
                expected: ComponentKind::Concentration,
                found:    c.kind(),
            }
        })
    }

    pub fn set_rotation_target(
        &mut self,
        target:      impl Into<Target>,
        key:         &str,
        orientation: Orientation,
    ) -> EngineResult<()> {
        let c = self.component_mut(&target.into(), key)?;
        let found = c.kind();
        let rotation: &mut ManualRotation = c.as_manual_rotation_mut().ok_or_else(|| {
            EngineError::WrongComponentKind {
                key:      key.to_owned(),
                expected: ComponentKind::ManualRotation,
                found,
            }
        })?;
        rotation.set_target(orientation)?;
        Ok(())
    }

    // ── Frame loop ────────────────────────────────────────────────────────

    /// Run one frame of `dt` seconds (`None`: `1 / frame_rate`).
    ///
    /// A negative or non-finite `dt` is rejected before anything happens,
    /// queued commands included.
    pub fn update(&mut self, dt: Option<f64>) -> EngineResult<FrameReport> {
        let dt = dt.unwrap_or_else(|| self.clock.default_dt());
        if !dt.is_finite() || dt < 0.0 {
            return Err(EngineError::InvalidDt(dt));
        }

        // ── Step 0: queued commands ───────────────────────────────────────
        let (commands_applied, commands_rejected) = self.drain_commands();

        // ── Step 1: clock ─────────────────────────────────────────────────
        self.clock.advance(dt);
        let time = self.clock.elapsed_secs;

        // ── Step 2: advance progress, once per instance ───────────────────
        for m in self.macros.iter_mut() {
            for c in m.shared_components_mut() {
                c.begin_frame(time, dt);
            }
        }
        for sm in self.motions.values_mut() {
            sm.begin_frame(time, dt);
        }

        // ── Step 3: compute (read-only) ───────────────────────────────────
        let aggregates = self.compute_aggregates(time, dt);

        // ── Step 4: apply (sequential, ascending id) ──────────────────────
        let mut sources_updated = 0;
        let mut faults = 0;
        for (id, agg) in aggregates {
            faults += agg.faults;
            if agg.delta.is_empty() {
                continue;
            }
            if let Some(state) = self.registry.state_mut(id) {
                state.apply(&agg.delta);
                sources_updated += 1;
            }
        }

        // ── Step 5: output ────────────────────────────────────────────────
        for event in self.events.drain(..) {
            self.transport.send_group_event(&event);
        }
        self.positions.clear();
        self.positions.extend(
            self.registry
                .ids()
                .filter_map(|id| self.registry.state(id).map(|s| (id, s.position))),
        );
        self.params.clear();
        self.registry.collect_param_updates(&mut self.params);
        self.transport.send_frame(&FrameOutput {
            frame:     self.clock.frame,
            time,
            positions: &self.positions,
            params:    &self.params,
        });

        let report = FrameReport {
            frame: self.clock.frame,
            time,
            sources_updated,
            faults,
            commands_applied,
            commands_rejected,
        };
        debug!(
            frame = %report.frame,
            time,
            updated = sources_updated,
            faults,
            "frame complete"
        );
        Ok(report)
    }

    /// Call [`update`][Self::update] `n` times with the default `dt`.
    pub fn run_frames(&mut self, n: u64) -> EngineResult<Vec<FrameReport>> {
        (0..n).map(|_| self.update(None)).collect()
    }

    /// Aggregate every source against the current registry.
    ///
    /// With the `parallel` feature the sources are spread over Rayon's pool;
    /// the result is sorted back into ascending id.
    fn compute_aggregates(&self, time: f64, dt: f64) -> Vec<(SourceId, Aggregate)> {
        let registry = &self.registry;
        let shared   = &self.macros;

        #[cfg(not(feature = "parallel"))]
        {
            self.motions
                .iter()
                .filter_map(|(&id, sm)| {
                    let state = registry.state(id)?;
                    Some((id, sm.aggregate(state, time, dt, shared)))
                })
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let mut out: Vec<(SourceId, Aggregate)> = self
                .motions
                .par_iter()
                .filter_map(|(&id, sm)| {
                    let state = registry.state(id)?;
                    Some((id, sm.aggregate(state, time, dt, shared)))
                })
                .collect();
            out.sort_unstable_by_key(|(id, _)| *id);
            out
        }
    }

    fn drain_commands(&mut self) -> (usize, usize) {
        let mut applied = 0;
        let mut rejected = 0;
        while let Ok(cmd) = self.commands.try_recv() {
            match self.apply(cmd) {
                Ok(())  => applied += 1,
                Err(e) => {
                    warn!(error = %e, "queued command rejected");
                    rejected += 1;
                }
            }
        }
        (applied, rejected)
    }

    // ── Internal helpers ──────────────────────────────────────────────────

    fn macro_id(&self, name: &str) -> EngineResult<MacroId> {
        self.macros
            .get(name)
            .map(Macro::id)
            .ok_or_else(|| EngineError::MacroNotFound(name.to_owned()))
    }

    /// Every id exists, belongs to no macro and owns nothing under `keys`.
    fn check_joinable<'k>(
        &self,
        ids:  &[SourceId],
        keys: impl Iterator<Item = &'k str>,
    ) -> EngineResult<()> {
        for &sid in ids {
            if !self.registry.contains(sid) {
                return Err(EngineError::SourceNotFound(sid));
            }
            if let Some(group) = self.macro_of(sid) {
                return Err(EngineError::AlreadyInMacro { id: sid, group: group.to_owned() });
            }
        }
        for key in keys {
            self.check_no_local(ids, key)?;
        }
        Ok(())
    }

    /// No source in `ids` owns a component under `key`.
    fn check_no_local(&self, ids: &[SourceId], key: &str) -> EngineResult<()> {
        for &sid in ids {
            if let Some(Slot::Local(_)) = self.motions.get(&sid).and_then(|sm| sm.get(key)) {
                return Err(EngineError::KeyConflict { id: sid, key: key.to_owned() });
            }
        }
        Ok(())
    }

    fn positions_of(&self, ids: &[SourceId]) -> Vec<(SourceId, Vec3)> {
        ids.iter()
            .filter_map(|&id| self.registry.state(id).map(|s| (id, s.position)))
            .collect()
    }

    fn centroid_of(&self, ids: &[SourceId]) -> Vec3 {
        Vec3::centroid(ids.iter().filter_map(|id| self.registry.state(*id)).map(|s| s.position))
            .unwrap_or(Vec3::ZERO)
    }

    /// The component under `key`, following a member's shared handle to its
    /// macro.
    fn component(&self, target: &Target, key: &str) -> EngineResult<&MotionComponent> {
        let not_found = || EngineError::ComponentNotFound(key.to_owned());
        match target {
            Target::Source(id) => {
                let sm = self.motions.get(id).ok_or(EngineError::SourceNotFound(*id))?;
                match sm.get(key).ok_or_else(not_found)? {
                    Slot::Local(c) => Ok(c),
                    Slot::Shared(owner) => self
                        .macros
                        .by_id(*owner)
                        .and_then(|m| m.shared(key))
                        .ok_or_else(not_found),
                }
            }
            Target::Macro(name) => self
                .macros
                .get(name)
                .ok_or_else(|| EngineError::MacroNotFound(name.clone()))?
                .shared(key)
                .ok_or_else(not_found),
        }
    }

    fn component_mut(&mut self, target: &Target, key: &str) -> EngineResult<&mut MotionComponent> {
        let not_found = || EngineError::ComponentNotFound(key.to_owned());
        match target {
            Target::Source(id) => {
                let sm = self.motions.get_mut(id).ok_or(EngineError::SourceNotFound(*id))?;
                let owner = match sm.get(key).ok_or_else(not_found)? {
                    Slot::Local(_) => None,
                    Slot::Shared(owner) => Some(*owner),
                };
                match owner {
                    None => sm.local_mut(key).ok_or_else(not_found),
                    Some(owner) => self
                        .macros
                        .by_id_mut(owner)
                        .and_then(|m| m.shared_mut(key))
                        .ok_or_else(not_found),
                }
            }
            Target::Macro(name) => self
                .macros
                .get_mut(name)
                .ok_or_else(|| EngineError::MacroNotFound(name.clone()))?
                .shared_mut(key)
                .ok_or_else(not_found),
        }
    }

    fn concentration_mut(&mut self, target: &Target, key: &str) -> EngineResult<&mut Concentration> {
        let c = self.component_mut(target, key)?;
        let found = c.kind();
        c.as_concentration_mut().ok_or_else(|| EngineError::WrongComponentKind {
            key:      key.to_owned(),
            expected: ComponentKind::Concentration,
            found,
        })
    }
}

// ── Membership helpers ────────────────────────────────────────────────────────
//
// Free functions over the individual fields so a `&mut Macro` borrowed from
// the table can be passed alongside the rest of the engine.

fn attach(
    registry: &mut SourceRegistry,
    motions:  &mut BTreeMap<SourceId, SourceMotion>,
    events:   &mut Vec<GroupEvent>,
    m:        &mut Macro,
    id:       SourceId,
) {
    registry.set_group(id, Some(m.id()));
    if let Some(sm) = motions.get_mut(&id) {
        for key in m.shared_keys() {
            sm.insert_shared(key, m.id());
        }
    }
    let position = registry.state(id).map_or(Vec3::ZERO, |s| s.position);
    m.push_member(id, position);
    events.push(GroupEvent::Added { group: m.name().to_owned(), id });
}

fn detach(
    registry: &mut SourceRegistry,
    motions:  &mut BTreeMap<SourceId, SourceMotion>,
    events:   &mut Vec<GroupEvent>,
    m:        &Macro,
    id:       SourceId,
) {
    registry.set_group(id, None);
    if let Some(sm) = motions.get_mut(&id) {
        sm.remove_shared_from(m.id());
    }
    events.push(GroupEvent::Removed { group: m.name().to_owned(), id });
}

fn unique(ids: &[SourceId]) -> Vec<SourceId> {
    let mut out = Vec::with_capacity(ids.len());
    for &id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

fn check_state(state: &MotionState) -> EngineResult<()> {
    if !state.position.is_finite() {
        return Err(ConfigError::NonFinite { param: "position" }.into());
    }
    if !state.orientation.is_finite() {
        return Err(ConfigError::NonFinite { param: "orientation" }.into());
    }
    require_non_negative("aperture", state.aperture)?;
    Ok(())
}

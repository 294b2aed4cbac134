//! Macros: named source groups that share a behavior and group-level
//! components.
//!
//! # Ownership
//!
//! A macro *owns* its shared components.  Members only hold
//! `Slot::Shared(macro_id)` handles, resolved through [`MacroTable`] when a
//! frame is aggregated.  Handles carry the [`MacroId`], never the name, so a
//! rename touches no member.
//!
//! # Behaviors
//!
//! | Label         | Shared component                    | Parameters (default)           |
//! |---------------|-------------------------------------|--------------------------------|
//! | `static`      | none                                | none                           |
//! | `orbit`       | `rotation`: yaw about the centroid  | `speed` rad/s (0.5)            |
//! | `concentrate` | `concentration` on the centroid     | `factor` (0.0), `rate` (8.0)   |
//! | `circuit`     | `trajectory`: circle, group-wide    | `radius` (1.0), `speed` (0.25) |

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use sm_core::{ConfigError, MacroId, SourceId, Vec3};
use sm_motion::concentration::DEFAULT_RATE;
use sm_motion::{
    AlgorithmicRotation, Concentration, MacroTrajectory, Motion, MotionComponent, Shape,
    SharedComponents, Trajectory,
};

use crate::{EngineError, EngineResult, FormationParams};

// ── Behavior ──────────────────────────────────────────────────────────────────

/// Group behavior label chosen at creation.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Behavior {
    #[default]
    Static,
    Orbit,
    Concentrate,
    Circuit,
}

impl Behavior {
    pub fn as_str(self) -> &'static str {
        match self {
            Behavior::Static      => "static",
            Behavior::Orbit       => "orbit",
            Behavior::Concentrate => "concentrate",
            Behavior::Circuit     => "circuit",
        }
    }

    /// Parameter names this behavior accepts.
    pub fn parameter_names(self) -> &'static [&'static str] {
        match self {
            Behavior::Static      => &[],
            Behavior::Orbit       => &["speed"],
            Behavior::Concentrate => &["factor", "rate"],
            Behavior::Circuit     => &["radius", "speed"],
        }
    }

    /// Build the shared components this behavior installs, keyed by slot
    /// name.  Unknown parameter names are rejected.
    pub fn shared_components(
        self,
        params: &BTreeMap<String, f64>,
    ) -> EngineResult<Vec<(String, MotionComponent)>> {
        let allowed = self.parameter_names();
        if let Some(bad) = params.keys().find(|k| !allowed.contains(&k.as_str())) {
            return Err(ConfigError::UnknownName { kind: "parameter", name: bad.clone() }.into());
        }
        let get = |name: &str, default: f64| params.get(name).copied().unwrap_or(default);

        let component: MotionComponent = match self {
            Behavior::Static => return Ok(Vec::new()),
            Behavior::Orbit => AlgorithmicRotation::yaw(get("speed", 0.5))?.into(),
            Behavior::Concentrate => Concentration::new(get("factor", 0.0))?
                .with_rate(get("rate", DEFAULT_RATE))?
                .into(),
            Behavior::Circuit => {
                let shape = Shape::circle(get("radius", 1.0))?;
                MacroTrajectory::new(Trajectory::new(shape, get("speed", 0.25))?).into()
            }
        };
        Ok(vec![(self.slot_key().to_owned(), component)])
    }

    fn slot_key(self) -> &'static str {
        match self {
            Behavior::Static      => "",
            Behavior::Orbit       => "rotation",
            Behavior::Concentrate => "concentration",
            Behavior::Circuit     => "trajectory",
        }
    }
}

impl FromStr for Behavior {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static"      => Ok(Behavior::Static),
            "orbit"       => Ok(Behavior::Orbit),
            "concentrate" => Ok(Behavior::Concentrate),
            "circuit"     => Ok(Behavior::Circuit),
            other => Err(EngineError::UnknownBehavior(other.to_owned())),
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── MacroSpec ─────────────────────────────────────────────────────────────────

/// Where a new macro's members come from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MacroSource {
    /// Allocate `count` new sources placed by the named formation.
    Count {
        count:     usize,
        formation: String,
        #[cfg_attr(feature = "serde", serde(default))]
        layout:    FormationParams,
    },
    /// Group sources that already exist.
    Existing(Vec<SourceId>),
}

/// Everything needed to create a macro.
///
/// ```rust,ignore
/// let spec = MacroSpec::with_count("ring", 8, "circle")
///     .layout(FormationParams { radius: 3.0, ..Default::default() })
///     .behavior(Behavior::Orbit)
///     .param("speed", 0.25);
/// engine.create_macro(spec)?;
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacroSpec {
    pub name:     String,
    pub source:   MacroSource,
    #[cfg_attr(feature = "serde", serde(default))]
    pub behavior: Behavior,
    #[cfg_attr(feature = "serde", serde(default))]
    pub params:   BTreeMap<String, f64>,
}

impl MacroSpec {
    pub fn with_count(name: &str, count: usize, formation: &str) -> Self {
        Self {
            name:     name.to_owned(),
            source:   MacroSource::Count {
                count,
                formation: formation.to_owned(),
                layout:    FormationParams::default(),
            },
            behavior: Behavior::Static,
            params:   BTreeMap::new(),
        }
    }

    pub fn with_members(name: &str, members: Vec<SourceId>) -> Self {
        Self {
            name:     name.to_owned(),
            source:   MacroSource::Existing(members),
            behavior: Behavior::Static,
            params:   BTreeMap::new(),
        }
    }

    /// Set the formation layout.  No effect for `Existing` sources.
    pub fn layout(mut self, params: FormationParams) -> Self {
        if let MacroSource::Count { layout, .. } = &mut self.source {
            *layout = params;
        }
        self
    }

    pub fn behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn param(mut self, name: &str, value: f64) -> Self {
        self.params.insert(name.to_owned(), value);
        self
    }
}

// ── Macro ─────────────────────────────────────────────────────────────────────

/// A live macro.
#[derive(Clone, Debug)]
pub struct Macro {
    id:       MacroId,
    name:     String,
    behavior: Behavior,
    params:   BTreeMap<String, f64>,
    members:  Vec<SourceId>,
    shared:   Vec<(String, MotionComponent)>,
}

impl Macro {
    pub(crate) fn new(
        id:       MacroId,
        name:     String,
        behavior: Behavior,
        params:   BTreeMap<String, f64>,
        members:  Vec<SourceId>,
    ) -> Self {
        Self { id, name, behavior, params, members, shared: Vec::new() }
    }

    pub fn id(&self) -> MacroId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn behavior(&self) -> Behavior {
        self.behavior
    }

    pub fn params(&self) -> &BTreeMap<String, f64> {
        &self.params
    }

    /// Members in the order they joined.
    pub fn members(&self) -> &[SourceId] {
        &self.members
    }

    pub fn contains(&self, id: SourceId) -> bool {
        self.members.contains(&id)
    }

    /// Shared component keys in install order.
    pub fn shared_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.shared.iter().map(|(k, _)| k.as_str())
    }

    pub fn shared(&self, key: &str) -> Option<&MotionComponent> {
        self.shared.iter().find(|(k, _)| k == key).map(|(_, c)| c)
    }

    pub fn shared_mut(&mut self, key: &str) -> Option<&mut MotionComponent> {
        self.shared.iter_mut().find(|(k, _)| k == key).map(|(_, c)| c)
    }

    pub(crate) fn shared_components_mut(&mut self) -> impl Iterator<Item = &mut MotionComponent> + '_ {
        self.shared.iter_mut().map(|(_, c)| c)
    }

    /// Install or replace in place.
    pub(crate) fn insert_shared(&mut self, key: &str, component: MotionComponent) {
        match self.shared.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = component,
            None => self.shared.push((key.to_owned(), component)),
        }
    }

    pub(crate) fn remove_shared(&mut self, key: &str) -> Option<MotionComponent> {
        let idx = self.shared.iter().position(|(k, _)| k == key)?;
        Some(self.shared.remove(idx).1)
    }

    /// Add `id`, binding every shared component to where it sits now.
    pub(crate) fn push_member(&mut self, id: SourceId, position: Vec3) {
        if self.contains(id) {
            return;
        }
        self.members.push(id);
        for (_, c) in &mut self.shared {
            c.bind_sources(&[(id, position)]);
        }
    }

    pub(crate) fn remove_member(&mut self, id: SourceId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != id);
        for (_, c) in &mut self.shared {
            c.unbind_source(id);
        }
        self.members.len() != before
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

// ── MacroTable ────────────────────────────────────────────────────────────────

/// Every live macro plus the names that can no longer be used.
#[derive(Default)]
pub struct MacroTable {
    by_id:   BTreeMap<MacroId, Macro>,
    by_name: HashMap<String, MacroId>,
    retired: HashSet<String>,
    next_id: u32,
}

impl MacroTable {
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Macro> {
        self.by_name.get(name).and_then(|id| self.by_id.get(id))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Macro> {
        let id = *self.by_name.get(name)?;
        self.by_id.get_mut(&id)
    }

    pub fn by_id(&self, id: MacroId) -> Option<&Macro> {
        self.by_id.get(&id)
    }

    pub fn by_id_mut(&mut self, id: MacroId) -> Option<&mut Macro> {
        self.by_id.get_mut(&id)
    }

    /// Live names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_retired(&self, name: &str) -> bool {
        self.retired.contains(name)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Macro> + '_ {
        self.by_id.values_mut()
    }

    /// `Ok` if a new macro may take `name`.
    pub fn check_name(&self, name: &str) -> EngineResult<()> {
        if name.is_empty() {
            return Err(ConfigError::Invalid("macro name must not be empty".into()).into());
        }
        if self.by_name.contains_key(name) {
            return Err(EngineError::MacroExists(name.to_owned()));
        }
        if self.retired.contains(name) {
            return Err(EngineError::MacroNameRetired(name.to_owned()));
        }
        Ok(())
    }

    /// The id the next [`insert`][Self::insert] will use.
    pub fn peek_next_id(&self) -> MacroId {
        MacroId(self.next_id)
    }

    /// Register `m` under its name.  The caller has already passed
    /// [`check_name`][Self::check_name] and built `m` with
    /// [`peek_next_id`][Self::peek_next_id].
    pub(crate) fn insert(&mut self, m: Macro) {
        self.next_id += 1;
        self.by_name.insert(m.name.clone(), m.id);
        self.by_id.insert(m.id, m);
    }

    /// Remove the macro and retire its name.
    pub(crate) fn remove(&mut self, name: &str) -> Option<Macro> {
        let id = self.by_name.remove(name)?;
        self.retired.insert(name.to_owned());
        self.by_id.remove(&id)
    }

    /// Move `from` to `to`, retiring `from`.
    pub(crate) fn rename(&mut self, from: &str, to: &str) -> EngineResult<MacroId> {
        self.check_name(to)?;
        let id = self
            .by_name
            .remove(from)
            .ok_or_else(|| EngineError::MacroNotFound(from.to_owned()))?;
        self.retired.insert(from.to_owned());
        self.by_name.insert(to.to_owned(), id);
        if let Some(m) = self.by_id.get_mut(&id) {
            m.set_name(to.to_owned());
        }
        Ok(id)
    }
}

impl SharedComponents for MacroTable {
    fn resolve(&self, owner: MacroId, key: &str) -> Option<&MotionComponent> {
        self.by_id.get(&owner).and_then(|m| m.shared(key))
    }
}

//! Fluent builder for constructing an [`Engine`].

use sm_core::EngineConfig;

use crate::{Engine, EngineResult, FormationGenerator, FormationRegistry, NullTransport, OutputTransport};

/// Fluent builder for [`Engine<T>`].
///
/// # Optional inputs (have defaults)
///
/// | Method                   | Default                          |
/// |--------------------------|----------------------------------|
/// | `.transport(t)`          | [`NullTransport`]                |
/// | `.formation(name, g)`    | built-in generators only         |
/// | `.formations(registry)`  | `FormationRegistry::with_builtins()` |
///
/// # Example
///
/// ```rust,ignore
/// let mut engine = EngineBuilder::new(EngineConfig::default())
///     .transport(UdpOscTransport::connect(OscConfig::default())?)
///     .formation("arc", |n, p: &FormationParams, _: &mut FormationRng| arc(n, p))
///     .build()?;
/// engine.update(None)?;
/// ```
pub struct EngineBuilder<T: OutputTransport> {
    config:     EngineConfig,
    formations: FormationRegistry,
    transport:  T,
}

impl EngineBuilder<NullTransport> {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            formations: FormationRegistry::with_builtins(),
            transport:  NullTransport,
        }
    }
}

impl<T: OutputTransport> EngineBuilder<T> {
    /// Send frames to `transport` instead.
    pub fn transport<U: OutputTransport>(self, transport: U) -> EngineBuilder<U> {
        EngineBuilder {
            config:     self.config,
            formations: self.formations,
            transport,
        }
    }

    /// Register an extra formation generator, or replace a built-in.
    pub fn formation<G: FormationGenerator + 'static>(mut self, name: &str, generator: G) -> Self {
        self.formations.register(name, generator);
        self
    }

    /// Replace the whole formation table.
    pub fn formations(mut self, formations: FormationRegistry) -> Self {
        self.formations = formations;
        self
    }

    /// Validate the configuration and return a ready engine.
    pub fn build(self) -> EngineResult<Engine<T>> {
        self.config.validate()?;
        Ok(Engine::new(self.config, self.formations, self.transport))
    }
}

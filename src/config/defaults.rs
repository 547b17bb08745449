use super::scope::{ScopedConfig, Tunable};

/// The values every unset tunable falls back to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultConfig {
    pub enabled: bool,
    pub max_streams: u32,
    pub max_header_list_size: u32,
    pub window_size: u32,
    pub min_workers: u32,
    pub max_workers: u32,
}

impl DefaultConfig {
    /// Compiled-in defaults
    pub const BUILTIN: DefaultConfig = DefaultConfig {
        enabled: false,
        max_streams: 100,
        max_header_list_size: 16 * 1024,
        window_size: 64 * 1024,
        min_workers: 10,
        max_workers: 256,
    };

    /// The default for one tunable; the enable flag reads as 1 or 0
    pub fn value(&self, tunable: Tunable) -> u32 {
        match tunable {
            Tunable::Enabled => u32::from(self.enabled),
            Tunable::MaxStreams => self.max_streams,
            Tunable::MaxHeaderListSize => self.max_header_list_size,
            Tunable::WindowSize => self.window_size,
            Tunable::MinWorkers => self.min_workers,
            Tunable::MaxWorkers => self.max_workers,
        }
    }
}

impl Default for DefaultConfig {
    fn default() -> Self {
        Self::BUILTIN
    }
}

/// Every tunable of a scope, resolved to a concrete value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub enabled: bool,
    pub max_streams: u32,
    pub max_header_list_size: u32,
    pub window_size: u32,
    pub min_workers: u32,
    pub max_workers: u32,
}

/// Resolves scope values against an injected default record
///
/// # Examples
///
/// ```
/// use muxbuf::config::{ConfigResolver, ScopeKind, ScopedConfig, Tunable};
///
/// let resolver = ConfigResolver::default();
/// let scope = ScopedConfig::new(ScopeKind::Server, None);
/// assert_eq!(resolver.get(&scope, Tunable::MaxStreams), 100);
/// assert!(!resolver.resolve(&scope).enabled);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigResolver {
    defaults: DefaultConfig,
}

impl ConfigResolver {
    /// Creates a resolver falling back to `defaults`
    pub fn new(defaults: DefaultConfig) -> Self {
        Self { defaults }
    }

    /// The default record unset tunables resolve to
    pub fn defaults(&self) -> &DefaultConfig {
        &self.defaults
    }

    /// The scope's value if set, else the default
    pub fn get(&self, scope: &ScopedConfig, tunable: Tunable) -> u32 {
        scope
            .value(tunable)
            .unwrap_or_else(|| self.defaults.value(tunable))
    }

    /// Like [`ConfigResolver::get`], looking the tunable up by name
    ///
    /// Returns `None` when no tunable has that name.
    pub fn get_by_name(&self, scope: &ScopedConfig, name: &str) -> Option<u32> {
        Tunable::from_name(name).map(|tunable| self.get(scope, tunable))
    }

    /// Resolves every tunable of the scope at once
    pub fn resolve(&self, scope: &ScopedConfig) -> ResolvedConfig {
        ResolvedConfig {
            enabled: self.get(scope, Tunable::Enabled) != 0,
            max_streams: self.get(scope, Tunable::MaxStreams),
            max_header_list_size: self.get(scope, Tunable::MaxHeaderListSize),
            window_size: self.get(scope, Tunable::WindowSize),
            min_workers: self.get(scope, Tunable::MinWorkers),
            max_workers: self.get(scope, Tunable::MaxWorkers),
        }
    }
}

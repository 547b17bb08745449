use crate::{MuxError, Result};
use std::fmt;

/// Kind of configuration context a scope belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// A whole virtual server
    Server,
    /// A directory below a server
    Directory,
}

impl ScopeKind {
    fn prefix(self) -> &'static str {
        match self {
            ScopeKind::Server => "srv",
            ScopeKind::Directory => "dir",
        }
    }
}

/// The protocol tunables a scope can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tunable {
    /// Whether the multiplexed protocol is offered at all
    Enabled,
    /// Maximum number of concurrently open streams per session
    MaxStreams,
    /// Maximum accepted size of a request header list
    MaxHeaderListSize,
    /// Initial flow-control window announced to the client
    WindowSize,
    /// Minimum worker threads per process
    MinWorkers,
    /// Maximum worker threads per process
    MaxWorkers,
}

impl Tunable {
    /// All tunables, in declaration order
    pub const ALL: [Tunable; 6] = [
        Tunable::Enabled,
        Tunable::MaxStreams,
        Tunable::MaxHeaderListSize,
        Tunable::WindowSize,
        Tunable::MinWorkers,
        Tunable::MaxWorkers,
    ];

    /// Short identifier, used in logs and by [`Tunable::from_name`]
    pub fn name(self) -> &'static str {
        match self {
            Tunable::Enabled => "enabled",
            Tunable::MaxStreams => "max_streams",
            Tunable::MaxHeaderListSize => "max_header_list_size",
            Tunable::WindowSize => "window_size",
            Tunable::MinWorkers => "min_workers",
            Tunable::MaxWorkers => "max_workers",
        }
    }

    /// Looks a tunable up by its short identifier
    pub fn from_name(name: &str) -> Option<Tunable> {
        Tunable::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for Tunable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Protocol settings for one configuration scope
///
/// Every tunable starts out unset. A directive sets exactly one of them, and
/// [`ScopedConfig::merge`] layers a narrower scope over a broader one.
/// Unset values are resolved against a default record by
/// [`ConfigResolver`](super::ConfigResolver).
///
/// # Examples
///
/// ```
/// use muxbuf::config::{ScopeKind, ScopedConfig, Tunable};
///
/// let mut server = ScopedConfig::new(ScopeKind::Server, Some("www.example.org"));
/// server.set(Tunable::MaxStreams, "50").unwrap();
///
/// let mut dir = ScopedConfig::new(ScopeKind::Directory, Some("/static"));
/// dir.set(Tunable::WindowSize, "32768").unwrap();
///
/// let merged = ScopedConfig::merge(&server, &dir);
/// assert_eq!(merged.value(Tunable::MaxStreams), Some(50));
/// assert_eq!(merged.value(Tunable::WindowSize), Some(32768));
/// assert_eq!(merged.name(), "merged[dir[/static], srv[www.example.org]]");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopedConfig {
    name: String,
    enabled: Option<bool>,
    max_streams: Option<u32>,
    max_header_list_size: Option<u32>,
    window_size: Option<u32>,
    min_workers: Option<u32>,
    max_workers: Option<u32>,
}

impl ScopedConfig {
    /// Creates a scope with every tunable unset
    pub fn new(kind: ScopeKind, identity: Option<&str>) -> Self {
        let identity = identity.unwrap_or("unknown");
        Self {
            name: format!("{}[{}]", kind.prefix(), identity),
            ..Default::default()
        }
    }

    /// Diagnostic name of the scope
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parses `raw` into the tunable's type and stores it
    ///
    /// The enable flag is true for `On` in any letter case and false for any
    /// other word. Numeric tunables take a non-negative 32-bit integer; any
    /// other text is rejected and the scope is left unchanged.
    pub fn set(&mut self, tunable: Tunable, raw: &str) -> Result<()> {
        let raw = raw.trim();
        if tunable == Tunable::Enabled {
            self.enabled = Some(raw.eq_ignore_ascii_case("on"));
            return Ok(());
        }

        let value = raw.parse::<u32>().map_err(|e| MuxError::InvalidValue {
            directive: tunable.name().to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })?;
        if let Some(slot) = self.numeric_slot_mut(tunable) {
            *slot = Some(value);
        }
        Ok(())
    }

    /// Builds a new scope where `add`'s explicit values win over `base`'s
    pub fn merge(base: &ScopedConfig, add: &ScopedConfig) -> ScopedConfig {
        ScopedConfig {
            name: format!("merged[{}, {}]", add.name, base.name),
            enabled: add.enabled.or(base.enabled),
            max_streams: add.max_streams.or(base.max_streams),
            max_header_list_size: add.max_header_list_size.or(base.max_header_list_size),
            window_size: add.window_size.or(base.window_size),
            min_workers: add.min_workers.or(base.min_workers),
            max_workers: add.max_workers.or(base.max_workers),
        }
    }

    /// The explicit value of a tunable, or `None` if it was never set
    ///
    /// The enable flag reads as 1 or 0.
    pub fn value(&self, tunable: Tunable) -> Option<u32> {
        match tunable {
            Tunable::Enabled => self.enabled.map(u32::from),
            Tunable::MaxStreams => self.max_streams,
            Tunable::MaxHeaderListSize => self.max_header_list_size,
            Tunable::WindowSize => self.window_size,
            Tunable::MinWorkers => self.min_workers,
            Tunable::MaxWorkers => self.max_workers,
        }
    }

    /// Whether the scope sets the tunable explicitly
    pub fn is_set(&self, tunable: Tunable) -> bool {
        self.value(tunable).is_some()
    }

    fn numeric_slot_mut(&mut self, tunable: Tunable) -> Option<&mut Option<u32>> {
        match tunable {
            Tunable::Enabled => None,
            Tunable::MaxStreams => Some(&mut self.max_streams),
            Tunable::MaxHeaderListSize => Some(&mut self.max_header_list_size),
            Tunable::WindowSize => Some(&mut self.window_size),
            Tunable::MinWorkers => Some(&mut self.min_workers),
            Tunable::MaxWorkers => Some(&mut self.max_workers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_scope_is_unset() {
        let scope = ScopedConfig::new(ScopeKind::Server, Some("example"));
        assert_eq!(scope.name(), "srv[example]");
        for tunable in Tunable::ALL {
            assert!(!scope.is_set(tunable), "{tunable} should start unset");
        }
    }

    #[test]
    fn test_missing_identity_uses_placeholder() {
        let scope = ScopedConfig::new(ScopeKind::Directory, None);
        assert_eq!(scope.name(), "dir[unknown]");
    }

    #[test]
    fn test_enable_flag_parsing() {
        let mut scope = ScopedConfig::new(ScopeKind::Server, None);
        scope.set(Tunable::Enabled, "oN").unwrap();
        assert_eq!(scope.value(Tunable::Enabled), Some(1));

        scope.set(Tunable::Enabled, "yes").unwrap();
        assert_eq!(scope.value(Tunable::Enabled), Some(0));
    }

    #[test]
    fn test_malformed_integer_is_rejected() {
        let mut scope = ScopedConfig::new(ScopeKind::Server, None);
        scope.set(Tunable::MaxStreams, "40").unwrap();

        let err = scope.set(Tunable::MaxStreams, "12abc").unwrap_err();
        assert!(matches!(err, MuxError::InvalidValue { .. }));
        assert!(scope.set(Tunable::MaxWorkers, "-1").is_err());

        // The earlier value survives the rejected directive
        assert_eq!(scope.value(Tunable::MaxStreams), Some(40));
        assert!(!scope.is_set(Tunable::MaxWorkers));
    }

    #[test]
    fn test_merge_does_not_touch_inputs() {
        let mut base = ScopedConfig::new(ScopeKind::Server, Some("a"));
        base.set(Tunable::MinWorkers, "4").unwrap();
        let mut add = ScopedConfig::new(ScopeKind::Directory, Some("b"));
        add.set(Tunable::MinWorkers, "8").unwrap();

        let base_before = base.clone();
        let add_before = add.clone();
        let merged = ScopedConfig::merge(&base, &add);

        assert_eq!(merged.value(Tunable::MinWorkers), Some(8));
        assert_eq!(base, base_before);
        assert_eq!(add, add_before);
    }

    #[test]
    fn test_tunable_names_round_trip() {
        for tunable in Tunable::ALL {
            assert_eq!(Tunable::from_name(tunable.name()), Some(tunable));
        }
        assert_eq!(Tunable::from_name("max_frame_size"), None);
    }
}

use super::scope::{ScopedConfig, Tunable};
use crate::{MuxError, Result};

/// A configuration directive and the tunable it sets
#[derive(Debug, Clone, Copy)]
pub struct Directive {
    pub name: &'static str,
    pub tunable: Tunable,
    pub help: &'static str,
}

/// Every directive the resolver understands
pub const DIRECTIVES: &[Directive] = &[
    Directive {
        name: "H2Engine",
        tunable: Tunable::Enabled,
        help: "on to enable HTTP/2 protocol handling",
    },
    Directive {
        name: "H2MaxSessionStreams",
        tunable: Tunable::MaxStreams,
        help: "maximum number of open streams per session",
    },
    Directive {
        name: "H2InitialWindowSize",
        tunable: Tunable::WindowSize,
        help: "initial window size on client DATA",
    },
    Directive {
        name: "H2MaxHeaderListSize",
        tunable: Tunable::MaxHeaderListSize,
        help: "maximum acceptable size of request headers",
    },
    Directive {
        name: "H2MinWorkers",
        tunable: Tunable::MinWorkers,
        help: "minimum number of worker threads per child",
    },
    Directive {
        name: "H2MaxWorkers",
        tunable: Tunable::MaxWorkers,
        help: "maximum number of worker threads per child",
    },
];

/// Finds a directive by name, ignoring letter case
pub fn lookup(name: &str) -> Option<&'static Directive> {
    DIRECTIVES.iter().find(|d| d.name.eq_ignore_ascii_case(name))
}

/// Applies one `name value` directive to a scope
pub fn apply(scope: &mut ScopedConfig, name: &str, value: &str) -> Result<()> {
    let directive = lookup(name).ok_or_else(|| MuxError::UnknownDirective(name.to_string()))?;
    scope.set(directive.tunable, value).map_err(|e| match e {
        MuxError::InvalidValue { value, reason, .. } => MuxError::InvalidValue {
            directive: directive.name.to_string(),
            value,
            reason,
        },
        other => other,
    })
}

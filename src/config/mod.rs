//! Scoped protocol configuration
//!
//! Tunables are set per scope by directives, layered with
//! [`ScopedConfig::merge`] and resolved against a default record by a
//! [`ConfigResolver`].

pub mod defaults;
pub mod directives;
pub mod file;
pub mod scope;
mod tests;

pub use defaults::{ConfigResolver, DefaultConfig, ResolvedConfig};
pub use directives::{DIRECTIVES, Directive};
pub use file::ConfigFile;
pub use scope::{ScopeKind, ScopedConfig, Tunable};

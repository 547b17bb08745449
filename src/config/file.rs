use super::directives;
use super::scope::{ScopeKind, ScopedConfig};
use crate::{MuxError, Result};
use std::path::Path;
use tracing::debug;

/// Directives read from a configuration file
///
/// Lines outside any block configure the server scope. Lines inside a
/// `<Directory path>` ... `</Directory>` block configure that directory's
/// scope. `#` starts a comment.
///
/// # Examples
///
/// ```
/// use muxbuf::config::{ConfigFile, ConfigResolver, Tunable};
///
/// let file = ConfigFile::parse(
///     "example.org",
///     "H2MaxSessionStreams 50\n\
///      <Directory /downloads>\n\
///          H2InitialWindowSize 32768\n\
///      </Directory>\n",
/// ).unwrap();
///
/// let resolver = ConfigResolver::default();
/// let scope = file.resolve_for("/downloads/big.iso");
/// assert_eq!(resolver.get(&scope, Tunable::MaxStreams), 50);
/// assert_eq!(resolver.get(&scope, Tunable::WindowSize), 32768);
/// assert_eq!(resolver.get(&scope, Tunable::MinWorkers), 10);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigFile {
    server: ScopedConfig,
    directories: Vec<(String, ScopedConfig)>,
}

impl ConfigFile {
    /// Parses configuration text for the server named `server_name`
    pub fn parse(server_name: &str, text: &str) -> Result<Self> {
        let mut server = ScopedConfig::new(ScopeKind::Server, Some(server_name));
        let mut directories: Vec<(String, ScopedConfig)> = Vec::new();
        let mut open: Option<(usize, String, ScopedConfig)> = None;

        for (index, raw_line) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = match raw_line.find('#') {
                Some(pos) => &raw_line[..pos],
                None => raw_line,
            }
            .trim();
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix("</") {
                if !rest.trim_end_matches('>').trim().eq_ignore_ascii_case("directory") {
                    return Err(parse_error(line_no, format!("unexpected closing tag '{line}'")));
                }
                let (_, path, scope) = open
                    .take()
                    .ok_or_else(|| parse_error(line_no, "</Directory> without open block"))?;
                directories.push((path, scope));
                continue;
            }

            if let Some(rest) = line.strip_prefix('<') {
                let inner = rest
                    .strip_suffix('>')
                    .ok_or_else(|| parse_error(line_no, "block tag is missing '>'"))?;
                let (tag, path) = split_word(inner);
                if !tag.eq_ignore_ascii_case("directory") {
                    return Err(parse_error(line_no, format!("unsupported block '{tag}'")));
                }
                if path.is_empty() {
                    return Err(parse_error(line_no, "<Directory> needs a path"));
                }
                if open.is_some() {
                    return Err(parse_error(line_no, "<Directory> blocks cannot nest"));
                }
                let path = path.trim_matches('"').to_string();
                let scope = ScopedConfig::new(ScopeKind::Directory, Some(&path));
                open = Some((line_no, path, scope));
                continue;
            }

            let (name, value) = split_word(line);
            if value.is_empty() {
                return Err(parse_error(line_no, format!("directive '{name}' needs a value")));
            }
            let scope = match open.as_mut() {
                Some((_, _, scope)) => scope,
                None => &mut server,
            };
            directives::apply(scope, name, value).map_err(|e| parse_error(line_no, e.to_string()))?;
            debug!(scope = scope.name(), directive = name, value, "Applied directive");
        }

        if let Some((line_no, path, _)) = open {
            return Err(parse_error(line_no, format!("<Directory {path}> is never closed")));
        }

        Ok(Self {
            server,
            directories,
        })
    }

    /// Reads and parses a configuration file
    pub fn load(server_name: &str, path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(server_name, &text)
    }

    /// The server scope
    pub fn server(&self) -> &ScopedConfig {
        &self.server
    }

    /// The scope of the directory block declared for exactly `path`
    pub fn directory(&self, path: &str) -> Option<&ScopedConfig> {
        self.directories
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, scope)| scope)
    }

    /// The effective scope for a request path
    ///
    /// Directory scopes whose path prefixes `request_path` are merged over
    /// the server scope, shorter paths first.
    pub fn resolve_for(&self, request_path: &str) -> ScopedConfig {
        let mut matching: Vec<&(String, ScopedConfig)> = self
            .directories
            .iter()
            .filter(|(path, _)| path_matches(path, request_path))
            .collect();
        matching.sort_by_key(|(path, _)| path.len());

        matching
            .into_iter()
            .fold(self.server.clone(), |merged, (_, scope)| {
                ScopedConfig::merge(&merged, scope)
            })
    }
}

fn path_matches(dir: &str, request_path: &str) -> bool {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        return true;
    }
    match request_path.strip_prefix(dir) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn split_word(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (line, ""),
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> MuxError {
    MuxError::Parse {
        line,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use crate::MuxError;
    use crate::config::{
        ConfigFile, ConfigResolver, DefaultConfig, ScopeKind, ScopedConfig, Tunable,
    };

    #[test]
    fn test_defaults() {
        let resolver = ConfigResolver::default();
        let scope = ScopedConfig::new(ScopeKind::Server, None);
        let resolved = resolver.resolve(&scope);

        assert!(!resolved.enabled);
        assert_eq!(resolved.max_streams, 100);
        assert_eq!(resolved.max_header_list_size, 16 * 1024);
        assert_eq!(resolved.window_size, 64 * 1024);
        assert_eq!(resolved.min_workers, 10);
        assert_eq!(resolved.max_workers, 256);
    }

    #[test]
    fn test_merge_falls_back_through_base_to_defaults() {
        let resolver = ConfigResolver::default();

        let mut base = ScopedConfig::new(ScopeKind::Server, Some("base"));
        base.set(Tunable::MaxStreams, "50").unwrap();
        let mut add = ScopedConfig::new(ScopeKind::Directory, Some("/add"));
        add.set(Tunable::WindowSize, "32768").unwrap();

        let merged = ScopedConfig::merge(&base, &add);
        assert_eq!(resolver.get(&merged, Tunable::MaxStreams), 50);
        assert_eq!(resolver.get(&merged, Tunable::WindowSize), 32768);
        assert_eq!(resolver.get(&merged, Tunable::MinWorkers), 10);
        assert_eq!(merged.name(), "merged[dir[/add], srv[base]]");
    }

    #[test]
    fn test_injected_defaults() {
        let resolver = ConfigResolver::new(DefaultConfig {
            enabled: true,
            max_workers: 32,
            ..DefaultConfig::BUILTIN
        });
        let scope = ScopedConfig::new(ScopeKind::Server, None);

        assert_eq!(resolver.defaults().max_workers, 32);
        assert!(resolver.resolve(&scope).enabled);
        assert_eq!(resolver.get(&scope, Tunable::MaxWorkers), 32);
        assert_eq!(resolver.get(&scope, Tunable::MaxStreams), 100);
    }

    #[test]
    fn test_get_by_unknown_name_is_unset() {
        let resolver = ConfigResolver::default();
        let scope = ScopedConfig::new(ScopeKind::Server, None);
        assert_eq!(resolver.get_by_name(&scope, "max_streams"), Some(100));
        assert_eq!(resolver.get_by_name(&scope, "push_diary_size"), None);
    }

    #[test]
    fn test_file_directory_blocks_merge_by_prefix() {
        let text = "\
# server wide
H2Engine on
H2MaxSessionStreams 50

<Directory /media>
    H2InitialWindowSize 32768
</Directory>

<Directory /media/video>
    H2MaxSessionStreams 8   # few, large streams
</Directory>
";
        let file = ConfigFile::parse("media.example", text).unwrap();
        let resolver = ConfigResolver::default();

        let root = file.resolve_for("/index.html");
        assert_eq!(resolver.get(&root, Tunable::MaxStreams), 50);
        assert_eq!(resolver.get(&root, Tunable::WindowSize), 64 * 1024);

        let video = file.resolve_for("/media/video/clip.mp4");
        assert!(resolver.resolve(&video).enabled);
        assert_eq!(resolver.get(&video, Tunable::MaxStreams), 8);
        assert_eq!(resolver.get(&video, Tunable::WindowSize), 32768);

        // "/mediafiles" is not below "/media"
        let other = file.resolve_for("/mediafiles/a");
        assert_eq!(resolver.get(&other, Tunable::WindowSize), 64 * 1024);

        assert!(file.directory("/media").is_some());
        assert_eq!(file.server().name(), "srv[media.example]");
    }

    #[test]
    fn test_block_tags_tolerate_inner_whitespace() {
        let text = "<Directory /static >\nH2MaxWorkers 12\n</Directory >\n<directory /api>\nH2MinWorkers 3\n</ directory>\n";
        let file = ConfigFile::parse("s", text).unwrap();

        let resolver = ConfigResolver::default();
        assert_eq!(resolver.get(&file.resolve_for("/static/app.js"), Tunable::MaxWorkers), 12);
        assert_eq!(resolver.get(&file.resolve_for("/api/v1"), Tunable::MinWorkers), 3);
    }

    #[test]
    fn test_file_errors_carry_line_numbers() {
        let err = ConfigFile::parse("s", "H2Engine on\nH2MaxWorkers many\n").unwrap_err();
        assert!(matches!(err, MuxError::Parse { line: 2, .. }));

        let err = ConfigFile::parse("s", "H2Bogus 1\n").unwrap_err();
        assert!(matches!(err, MuxError::Parse { line: 1, .. }));

        let err = ConfigFile::parse("s", "<Directory /a>\nH2MinWorkers 2\n").unwrap_err();
        assert!(matches!(err, MuxError::Parse { line: 1, .. }));

        let err = ConfigFile::parse("s", "</Directory>\n").unwrap_err();
        assert!(matches!(err, MuxError::Parse { line: 1, .. }));

        let err = ConfigFile::parse("s", "H2MaxWorkers\n").unwrap_err();
        assert!(matches!(err, MuxError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_load_from_disk() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "H2MinWorkers 4").unwrap();
        writeln!(file, "H2MaxWorkers 16").unwrap();

        let config = ConfigFile::load("disk", file.path()).unwrap();
        let resolver = ConfigResolver::default();
        let resolved = resolver.resolve(config.server());
        assert_eq!(resolved.min_workers, 4);
        assert_eq!(resolved.max_workers, 16);

        let missing = ConfigFile::load("disk", "/nonexistent/muxbuf.conf");
        assert!(matches!(missing, Err(MuxError::Io(_))));
    }
}

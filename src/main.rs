use color_eyre::eyre::{Result, WrapErr};
use muxbuf::config::{ConfigFile, ConfigResolver};
use muxbuf::session::{MuxServer, SessionConfig};
use muxbuf::transport::TransportKind;
use std::net::SocketAddr;

use tracing::info;

const SERVER_NAME: &str = "localhost";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("muxbuf=info")
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage(&args[0]);
    }

    let encrypted = args.iter().skip(1).any(|a| a == "--encrypted");
    let positional: Vec<&String> = args.iter().skip(1).filter(|a| !a.starts_with("--")).collect();

    let port = match positional.first() {
        Some(p) => p
            .parse::<u16>()
            .wrap_err_with(|| format!("Invalid port '{p}'"))?,
        None => 8080,
    };

    let config_file = match positional.get(1) {
        Some(path) => ConfigFile::load(SERVER_NAME, path.as_str())
            .wrap_err_with(|| format!("Failed to load configuration from {path}"))?,
        None => ConfigFile::parse(SERVER_NAME, "")?,
    };

    let resolver = ConfigResolver::default();
    let resolved = resolver.resolve(config_file.server());
    info!(
        scope = config_file.server().name(),
        enabled = resolved.enabled,
        max_streams = resolved.max_streams,
        window_size = resolved.window_size,
        min_workers = resolved.min_workers,
        max_workers = resolved.max_workers,
        "Resolved server configuration"
    );

    let config = SessionConfig {
        bind_addr: SocketAddr::from(([127, 0, 0, 1], port)),
        transport_kind: if encrypted {
            TransportKind::Encrypted
        } else {
            TransportKind::Plain
        },
        ..Default::default()
    };
    let (config, buffer_settings) = config.apply_scope(config_file.server(), &resolver);

    info!(address = %config.bind_addr, max_connections = config.max_connections, "Starting session server");

    let server = MuxServer::new(config, buffer_settings);
    server.run().await.wrap_err("Failed to run session server")?;

    Ok(())
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} [port] [config-file] [--encrypted]");
    eprintln!("  port:         Port to bind to (default: 8080)");
    eprintln!("  config-file:  File with H2* directives and <Directory> blocks");
    eprintln!("  --encrypted:  Treat connections as encrypted (buffer output unless H2Engine is off)");
    eprintln!();
    eprintln!("Directives:");
    for directive in muxbuf::config::DIRECTIVES {
        eprintln!("  {:<22} {}", directive.name, directive.help);
    }
    std::process::exit(1);
}

//! Web server command.

use console::style;

use adstream::config::{Settings, DEFAULT_PORT};
use adstream::storage::csv_path;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: Option<&str>) -> anyhow::Result<()> {
    let default_port = settings.port.unwrap_or(DEFAULT_PORT);
    let (host, port) = match bind {
        Some(bind) => parse_bind_address(bind, default_port)?,
        None => ("127.0.0.1".to_string(), default_port),
    };

    let data_file = csv_path(&settings.data_dir, &settings.dataset);
    if !data_file.exists() {
        println!(
            "{} {} does not exist yet. Run 'adstream collect' first.",
            style("!").yellow(),
            data_file.display()
        );
    }

    println!(
        "{} Starting AdStream Finder server at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    if settings.production {
        println!(
            "  Serving frontend from {}",
            settings.public_dir.display()
        );
    }
    println!("  Press Ctrl+C to stop");

    adstream::server::serve(settings, &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "3030" -> 127.0.0.1:3030
/// - Just a host: "0.0.0.0" -> 0.0.0.0:{default_port}
/// - Host and port: "0.0.0.0:3030" -> 0.0.0.0:3030
fn parse_bind_address(bind: &str, default_port: u16) -> anyhow::Result<(String, u16)> {
    let bind = bind.trim();
    if bind.is_empty() {
        anyhow::bail!("Empty bind address");
    }

    // Try parsing as just a port number
    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }

    // Try parsing as host:port
    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
    }

    // Must be just a host, use default port
    Ok((bind.to_string(), default_port))
}

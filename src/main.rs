use color_eyre::eyre::{Result, WrapErr, bail};
use sockguard::ListeningSocket;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Port bound when none is given on the command line
const DEFAULT_PORT: i32 = 8080;

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Initialize logging; RUST_LOG overrides the default filter
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sockguard=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().collect();
    let port = match args.get(1) {
        Some(arg) => arg
            .parse::<i32>()
            .wrap_err_with(|| format!("Invalid port argument: {arg}"))?,
        None => DEFAULT_PORT,
    };

    let mut socket = ListeningSocket::bind(port).wrap_err("Unable to create server socket")?;

    // Check that the socket is listening on the requested port
    let listening_on = socket.local_port();
    if i32::from(listening_on) != port {
        socket.close();
        bail!("Server socket listening on port {listening_on} instead of {port}");
    }
    info!(port = listening_on, "Server socket bound");

    if !socket.close() {
        bail!("Unable to close server socket");
    }

    info!("Server socket closed");
    Ok(())
}

//! `trickle` command-line entry point.
//!
//! ```bash
//! trickle --port 8080 --backlog 200 --root ./public
//! TRICKLE_PORT=9000 TRICKLE_LOG=debug trickle
//! ```
//!
//! The server runs on its own thread; the main thread waits for `SIGINT` or
//! `SIGTERM` and then asks the server to stop.

use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use tracing::{Level, error, info};
use trickle::{
    DEFAULT_BACKLOG, DEFAULT_PORT, DEFAULT_REQUEST_BUFFER_SIZE, DEFAULT_RESPONSE_BUFFER_SIZE,
    DEFAULT_SERVER_NAME, Server, ServerBuilder, ServerConfig,
};

/// Single-threaded, readiness-driven file server.
#[derive(Debug, Parser)]
#[command(name = "trickle", version, about)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "TRICKLE_PORT")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0", env = "TRICKLE_HOST")]
    host: IpAddr,

    /// Maximum number of pending, not yet accepted connections
    #[arg(short, long, default_value_t = DEFAULT_BACKLOG, env = "TRICKLE_BACKLOG")]
    backlog: u32,

    /// Directory request paths are resolved against
    #[arg(short, long, default_value = ".", env = "TRICKLE_ROOT")]
    root: PathBuf,

    /// Size in bytes of each connection's request buffer
    #[arg(long, default_value_t = DEFAULT_REQUEST_BUFFER_SIZE, value_parser = parse_buffer_size)]
    request_buffer: usize,

    /// Size in bytes of each connection's response buffer
    #[arg(long, default_value_t = DEFAULT_RESPONSE_BUFFER_SIZE, value_parser = parse_buffer_size)]
    response_buffer: usize,

    /// Value of the `Server` response header
    #[arg(long, default_value = DEFAULT_SERVER_NAME)]
    server_name: String,

    /// Maximum log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", env = "TRICKLE_LOG")]
    log_level: Level,
}

impl Args {
    fn to_config(&self) -> ServerConfig {
        ServerBuilder::new()
            .host(self.host)
            .port(self.port)
            .backlog(self.backlog)
            .root(&self.root)
            .request_buffer_size(self.request_buffer)
            .response_buffer_size(self.response_buffer)
            .server_name(&self.server_name)
            .build()
    }
}

fn parse_buffer_size(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("buffer size must be greater than zero".to_owned()),
        Ok(size) => Ok(size),
        Err(e) => Err(e.to_string()),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_target(false)
        .init();

    let server = match Server::bind(args.to_config()) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, cause = ?std::error::Error::source(&e), "could not start");
            return ExitCode::FAILURE;
        }
    };

    let mut signals = match Signals::new([SIGINT, SIGTERM]) {
        Ok(signals) => signals,
        Err(e) => {
            error!(error = %e, "could not install signal handlers");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = server.shutdown_handle();
    let worker = match thread::Builder::new()
        .name("trickle-server".into())
        .spawn(move || server.run())
    {
        Ok(worker) => worker,
        Err(e) => {
            error!(error = %e, "could not spawn the server thread");
            return ExitCode::FAILURE;
        }
    };

    let signals_handle = signals.handle();
    let watcher = thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            info!(signal, "interrupt received, shutting down");
            shutdown.shutdown();
        }
    });

    let outcome = worker.join();

    // The server may have stopped on its own; release the signal watcher either way.
    signals_handle.close();
    let _ = watcher.join();

    match outcome {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
        Err(_) => {
            error!("server thread panicked");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_map_onto_config() {
        let args = Args::try_parse_from([
            "trickle",
            "--port",
            "9000",
            "--backlog",
            "16",
            "--root",
            "/tmp",
            "--response-buffer",
            "4096",
            "--server-name",
            "t",
        ])
        .unwrap();

        let config = args.to_config();
        assert_eq!(config.address().port(), 9000);
        assert_eq!(config.backlog(), 16);
        assert_eq!(config.response_buffer_size(), 4096);
        assert_eq!(config.request_buffer_size(), DEFAULT_REQUEST_BUFFER_SIZE);
        assert_eq!(config.server_name(), "t");
    }

    #[test]
    fn zero_buffer_size_is_rejected() {
        assert!(Args::try_parse_from(["trickle", "--request-buffer", "0"]).is_err());
    }
}

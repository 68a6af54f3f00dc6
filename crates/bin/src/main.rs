//! Stripboard server binary.
//!
//! Runs the board synchronization daemon: a TCP listener that keeps the
//! authoritative per-room strip and spacer collections and fans mutations
//! out to every connected session viewing the same room.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use stripboard_server::core::BoardCore;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Stripboard command line arguments.
#[derive(Parser, Debug)]
#[command(name = "stripboard")]
#[command(about = "Realtime flight progress board synchronization server")]
struct Args {
	/// Address to listen on
	#[arg(short, long, value_name = "ADDR")]
	listen: Option<SocketAddr>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	info!("starting stripboard");

	let addr = args.listen.unwrap_or_else(|| {
		SocketAddr::from((Ipv4Addr::UNSPECIFIED, stripboard_proto::DEFAULT_PORT))
	});

	let core = BoardCore::new();
	let shutdown = CancellationToken::new();

	let signal_shutdown = shutdown.clone();
	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			info!("interrupt received, shutting down");
			signal_shutdown.cancel();
		}
	});

	stripboard_server::ipc::serve(addr, core, shutdown).await?;

	Ok(())
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::fmt::format::FmtSpan;
	use tracing_subscriber::prelude::*;

	// Support STRIPBOARD_LOG_DIR for smoke testing
	if let Some(log_dir) = std::env::var("STRIPBOARD_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let pid = std::process::id();
		let log_path = log_dir.join(format!("stripboard.{}.log", pid));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
				if verbose {
					EnvFilter::new("stripboard=trace,debug")
				} else {
					EnvFilter::new("stripboard=debug,info")
				}
			});

			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_span_events(FmtSpan::CLOSE)
				.with_target(true);

			tracing_subscriber::registry()
				.with(filter)
				.with(file_layer)
				.init();

			tracing::info!(path = ?log_path, "tracing initialized");
			return;
		}
	}

	// Fallback to stderr-only logging
	tracing_subscriber::fmt()
		.with_max_level(if verbose {
			tracing::Level::DEBUG
		} else {
			tracing::Level::INFO
		})
		.init();
}

//! `callbook` binary: list, resolve, and watch an address-book export.

mod cli;
mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let settings = Settings::load(cli.config.as_deref()).context("loading configuration")?;
	commands::run(cli, settings).await
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::fmt::format::FmtSpan;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("callbook=trace,callbook_contacts=debug,callbook_worker=debug,info")
			} else {
				EnvFilter::new("warn")
			}
		})
	};

	// CALLBOOK_LOG_DIR redirects logs to a per-process file.
	if let Some(log_dir) = std::env::var("CALLBOOK_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("callbook.{}.log", std::process::id()));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(std::sync::Mutex::new(file))
				.with_ansi(false)
				.with_span_events(FmtSpan::CLOSE)
				.with_target(true);

			tracing_subscriber::registry().with(filter()).with(file_layer).init();
			tracing::info!(path = ?log_path, "callbook tracing initialized");
			return;
		}
	}

	tracing_subscriber::fmt().with_env_filter(filter()).with_writer(std::io::stderr).init();
}

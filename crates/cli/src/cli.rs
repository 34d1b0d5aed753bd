use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "callbook")]
#[command(about = "Resolve spoken names against an address-book export")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Configuration file (defaults to <config dir>/callbook/config.toml)
	#[arg(long, short = 'c', value_name = "PATH", global = true)]
	pub config: Option<PathBuf>,

	/// Address-book export, a JSON array of contacts (overrides [source] path)
	#[arg(long, value_name = "PATH", global = true)]
	pub contacts: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
	/// Print every contact in the published snapshot
	List {
		/// Emit JSON instead of text
		#[arg(long)]
		json: bool,
	},
	/// Resolve candidate names, most likely first
	Resolve {
		/// Candidate names; the first one is the ranking reference
		#[arg(required = true, value_name = "NAME")]
		names: Vec<String>,

		/// Only accept exact matches
		#[arg(long)]
		exact: bool,

		/// Print call candidates instead of contact records
		#[arg(long)]
		candidates: bool,

		/// Emit JSON instead of text
		#[arg(long)]
		json: bool,
	},
	/// Print snapshot updates on every change to the export until interrupted
	Watch {
		/// Poll interval in milliseconds (overrides [watch] poll_interval_ms)
		#[arg(long, value_name = "MS")]
		interval_ms: Option<u64>,
	},
}

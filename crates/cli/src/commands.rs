use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use callbook_contacts::{CacheEvent, CallCandidate, ContactService, JsonFileSource, PollingNotifier, candidates_for};
use callbook_primitives::{CacheSnapshot, ContactRecord, MatchHint, Query, QueryResult};
use tokio::sync::broadcast::error::RecvError;

use crate::cli::{Cli, Command};
use crate::config::Settings;

/// Runs one subcommand against a freshly started service, then shuts it down.
pub async fn run(cli: Cli, settings: Settings) -> anyhow::Result<()> {
	let path = settings.contacts_path(cli.contacts.as_deref())?;
	let service = ContactService::start(Arc::new(JsonFileSource::new(&path)), settings.service.clone());

	let outcome = match cli.command {
		Command::List { json } => list(&service, json).await,
		Command::Resolve {
			names,
			exact,
			candidates,
			json,
		} => {
			let hint = if exact { MatchHint::Exact } else { MatchHint::AutoFallback };
			resolve(&service, Query::new(names, hint), candidates, json).await
		}
		Command::Watch { interval_ms } => match settings.poll_interval(interval_ms) {
			Ok(interval) => watch(&service, &path, interval).await,
			Err(error) => Err(error.into()),
		},
	};

	let report = service.shutdown().await;
	if report.timed_out() {
		tracing::warn!("service shutdown timed out");
	}
	outcome
}

async fn list(service: &ContactService, json: bool) -> anyhow::Result<()> {
	let snapshot = service.snapshot().await;
	let mut out = std::io::stdout().lock();
	if json {
		serde_json::to_writer_pretty(&mut out, &*snapshot).context("writing snapshot")?;
		writeln!(out)?;
	} else {
		write_snapshot(&mut out, &snapshot)?;
	}
	Ok(())
}

async fn resolve(service: &ContactService, query: Query, candidates: bool, json: bool) -> anyhow::Result<()> {
	let result = service.resolve(query).await;
	let mut out = std::io::stdout().lock();
	match (candidates, json) {
		(true, true) => {
			serde_json::to_writer_pretty(&mut out, &candidates_for(&result)).context("writing candidates")?;
			writeln!(out)?;
		}
		(true, false) => write_candidates(&mut out, &candidates_for(&result))?,
		(false, true) => {
			serde_json::to_writer_pretty(&mut out, &result).context("writing result")?;
			writeln!(out)?;
		}
		(false, false) => write_result(&mut out, &result)?,
	}
	Ok(())
}

async fn watch(service: &ContactService, path: &Path, interval: std::time::Duration) -> anyhow::Result<()> {
	let mut events = service.subscribe_events();
	service.watch(Arc::new(PollingNotifier::spawn(path, interval)));

	let snapshot = service.snapshot().await;
	println!("watching {} (snapshot v{}, {} contacts)", path.display(), snapshot.version(), snapshot.len());

	loop {
		tokio::select! {
			signal = tokio::signal::ctrl_c() => {
				signal.context("listening for ctrl-c")?;
				break;
			}
			event = events.recv() => match event {
				Ok(CacheEvent::SnapshotPublished { version, len }) => println!("snapshot v{version}: {len} contacts"),
				Ok(CacheEvent::RefreshFailed { version, reason }) => eprintln!("snapshot v{version}: refresh failed: {reason}"),
				Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "watch output lagged"),
				Err(RecvError::Closed) => break,
			},
		}
	}
	service.unwatch();
	Ok(())
}

fn write_record(out: &mut impl Write, record: &ContactRecord) -> std::io::Result<()> {
	let numbers: Vec<String> = record
		.phone_numbers()
		.iter()
		.map(|phone| format!("{} {}", phone.label.as_str(), phone.number))
		.collect();
	writeln!(out, "{}\t{}", record.display_name(), numbers.join(", "))
}

pub(crate) fn write_snapshot(out: &mut impl Write, snapshot: &CacheSnapshot) -> std::io::Result<()> {
	writeln!(out, "snapshot v{}: {} contacts", snapshot.version(), snapshot.len())?;
	for record in snapshot.records() {
		write_record(out, record)?;
	}
	Ok(())
}

pub(crate) fn write_result(out: &mut impl Write, result: &QueryResult) -> std::io::Result<()> {
	writeln!(
		out,
		"{} match: {} contacts (snapshot v{})",
		result.match_type.as_str(),
		result.records.len(),
		result.snapshot_version
	)?;
	for record in &result.records {
		write_record(out, record)?;
	}
	Ok(())
}

pub(crate) fn write_candidates(out: &mut impl Write, candidates: &[CallCandidate]) -> std::io::Result<()> {
	for candidate in candidates {
		let target = candidate.dial_target().unwrap_or_default();
		writeln!(out, "{}\t{}", candidate.name, target)?;
	}
	Ok(())
}

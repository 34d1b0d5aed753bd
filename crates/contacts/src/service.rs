//! Public entry point: one explicitly constructed contact service.
//!
//! Callers never touch the cache directly. Every operation is enqueued on the
//! coordinator and answered through a future or a callback run on a spawned
//! task, so no caller thread blocks on the coordinator.
//!
//! No error crosses this boundary. A failed fetch, an empty cache, a missing
//! match, and a reply lost to a stopped coordinator all surface as empty
//! results; the distinction is only visible in logs and [`CacheEvent`]s.

use std::sync::Arc;

use callbook_primitives::{CacheSnapshot, ContactRecord, MatchHint, MatchType, Query, QueryResult};
use callbook_worker::{
	ActorEventReceiver, ActorHandle, ActorPort, ActorSendError, ActorSpec, RestartPolicy, ShutdownReport, TaskClass, spawn_actor,
};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::config::ServiceConfig;
use crate::coordinator::{CacheCmd, CacheEvent, CoordinatorActor};
use crate::notifier::{ChangeCallback, ChangeNotifier, Subscription};
use crate::source::ContactSource;

/// Contact cache and name resolution behind a single serialized coordinator.
pub struct ContactService {
	coordinator: ActorHandle<CacheCmd, CacheEvent>,
	port: ActorPort<CacheCmd>,
	subscription: Mutex<Option<Subscription>>,
	config: ServiceConfig,
}

impl ContactService {
	/// Starts the coordinator. The initial snapshot is empty until the
	/// start-up refresh, which is the first thing the coordinator does.
	pub fn start(source: Arc<dyn ContactSource>, config: ServiceConfig) -> Self {
		let matcher = config.matcher();
		let spec = ActorSpec::new("contacts.coordinator", TaskClass::Interactive, move || {
			CoordinatorActor::new(Arc::clone(&source), matcher)
		})
		.mailbox_capacity(config.mailbox_capacity.max(1))
		.event_buffer(config.event_buffer.max(1))
		.restart(RestartPolicy::default());

		let coordinator = spawn_actor(spec);
		let port = coordinator.port();
		tracing::info!(max_recipients = matcher.max_recipients, "contact service started");
		Self {
			coordinator,
			port,
			subscription: Mutex::new(None),
			config,
		}
	}

	pub fn config(&self) -> &ServiceConfig {
		&self.config
	}

	/// Enqueues a re-fetch of the source. Commands enqueued afterwards observe
	/// the refreshed snapshot.
	pub async fn refresh_snapshot(&self) {
		if let Err(error) = self.port.send(CacheCmd::Refresh).await {
			tracing::warn!(%error, "refresh dropped");
		}
	}

	/// Snapshot in effect when the command is processed.
	pub async fn snapshot(&self) -> Arc<CacheSnapshot> {
		request_snapshot(&self.port).await
	}

	/// Callback form of [`ContactService::snapshot`].
	pub fn get_snapshot<F>(&self, callback: F)
	where
		F: FnOnce(Arc<CacheSnapshot>) + Send + 'static,
	{
		let port = self.port.clone();
		callbook_worker::spawn(TaskClass::Interactive, async move {
			callback(request_snapshot(&port).await);
		});
	}

	/// Resolves a query against exactly one snapshot.
	pub async fn resolve(&self, query: Query) -> QueryResult {
		request_resolve(&self.port, query).await
	}

	/// Callback form of [`ContactService::resolve`].
	pub fn resolve_names<F>(&self, names: Vec<String>, hint: MatchHint, callback: F)
	where
		F: FnOnce(MatchType, Vec<ContactRecord>) + Send + 'static,
	{
		let port = self.port.clone();
		callbook_worker::spawn(TaskClass::Interactive, async move {
			let result = request_resolve(&port, Query::new(names, hint)).await;
			callback(result.match_type, result.records);
		});
	}

	/// Refreshes on every signal from `notifier`. A previous registration is
	/// revoked first, so at most one subscription is live.
	pub fn watch(&self, notifier: Arc<dyn ChangeNotifier>) {
		let mut slot = self.subscription.lock();
		if let Some(mut previous) = slot.take() {
			previous.revoke();
		}
		*slot = Some(Subscription::new(notifier, refresh_trigger(self.port.clone())));
	}

	/// Revokes the change subscription, if any.
	pub fn unwatch(&self) {
		let previous = self.subscription.lock().take();
		if let Some(mut previous) = previous {
			previous.revoke();
		}
	}

	pub fn is_watching(&self) -> bool {
		self.subscription.lock().as_ref().is_some_and(Subscription::is_active)
	}

	/// Broadcast of snapshot publications and refresh failures.
	pub fn subscribe_events(&self) -> ActorEventReceiver<CacheEvent> {
		self.coordinator.subscribe()
	}

	/// Revokes the change subscription and stops the coordinator, letting
	/// queued commands finish within the configured timeout.
	pub async fn shutdown(&self) -> ShutdownReport {
		self.unwatch();
		let report = self.coordinator.shutdown_graceful_or_force(self.config.shutdown_timeout()).await;
		tracing::info!(completed = report.completed(), timed_out = report.timed_out(), "contact service stopped");
		report
	}
}

/// Builds the notifier callback. It never blocks the signalling thread: a
/// full mailbox hands the enqueue to a background task.
fn refresh_trigger(port: ActorPort<CacheCmd>) -> ChangeCallback {
	Arc::new(move || match port.try_send(CacheCmd::Refresh) {
		Ok(()) => tracing::trace!("contacts.watch.refresh"),
		Err(ActorSendError::Full) => {
			let port = port.clone();
			callbook_worker::spawn(TaskClass::Background, async move {
				if let Err(error) = port.send(CacheCmd::Refresh).await {
					tracing::debug!(%error, "deferred refresh dropped");
				}
			});
		}
		Err(ActorSendError::Closed) => tracing::debug!("change signal after coordinator stopped"),
	})
}

async fn request_snapshot(port: &ActorPort<CacheCmd>) -> Arc<CacheSnapshot> {
	let (reply, rx) = oneshot::channel();
	if let Err(error) = port.send(CacheCmd::Snapshot { reply }).await {
		tracing::warn!(%error, "snapshot request not accepted");
		return Arc::new(CacheSnapshot::empty());
	}
	match rx.await {
		Ok(snapshot) => snapshot,
		Err(_) => {
			tracing::warn!("snapshot reply lost; coordinator stopped mid-request");
			Arc::new(CacheSnapshot::empty())
		}
	}
}

async fn request_resolve(port: &ActorPort<CacheCmd>, query: Query) -> QueryResult {
	let hint = query.hint;
	let (reply, rx) = oneshot::channel();
	if let Err(error) = port.send(CacheCmd::Resolve { query, reply }).await {
		tracing::warn!(%error, "resolve request not accepted");
		return QueryResult::empty(hint, 0);
	}
	match rx.await {
		Ok(result) => result,
		Err(_) => {
			tracing::warn!("resolve reply lost; coordinator stopped mid-request");
			QueryResult::empty(hint, 0)
		}
	}
}

#[cfg(test)]
mod tests;

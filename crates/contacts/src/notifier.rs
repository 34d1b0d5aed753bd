//! Store-changed signals and the subscription handle the service owns.
//!
//! # Invariants
//!
//! - Callbacks run outside every internal lock, so a callback may subscribe
//!   or unsubscribe without deadlocking.
//! - `unsubscribe` is idempotent; unknown ids are ignored.
//! - A [`Subscription`] unsubscribes exactly once, on `revoke` or on drop.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use callbook_worker::TaskClass;
use parking_lot::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Callback invoked when the contact store changes.
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// Identifies one registration with a [`ChangeNotifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Source of "contact store changed" signals.
pub trait ChangeNotifier: Send + Sync + 'static {
	fn subscribe(&self, callback: ChangeCallback) -> SubscriptionId;

	fn unsubscribe(&self, id: SubscriptionId);
}

#[derive(Default)]
struct CallbackRegistry {
	next_id: AtomicU64,
	entries: Mutex<Vec<(SubscriptionId, ChangeCallback)>>,
}

impl CallbackRegistry {
	fn add(&self, callback: ChangeCallback) -> SubscriptionId {
		let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
		self.entries.lock().push((id, callback));
		id
	}

	fn remove(&self, id: SubscriptionId) {
		self.entries.lock().retain(|(entry, _)| *entry != id);
	}

	fn len(&self) -> usize {
		self.entries.lock().len()
	}

	fn fire(&self) {
		let callbacks: Vec<ChangeCallback> = self.entries.lock().iter().map(|(_, cb)| Arc::clone(cb)).collect();
		for callback in callbacks {
			callback();
		}
	}
}

/// In-process notifier. [`LocalNotifier::notify`] fires every callback.
#[derive(Default)]
pub struct LocalNotifier {
	registry: CallbackRegistry,
}

impl LocalNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	/// Signals a store change to all subscribers.
	pub fn notify(&self) {
		self.registry.fire();
	}

	pub fn subscriber_count(&self) -> usize {
		self.registry.len()
	}
}

impl ChangeNotifier for LocalNotifier {
	fn subscribe(&self, callback: ChangeCallback) -> SubscriptionId {
		self.registry.add(callback)
	}

	fn unsubscribe(&self, id: SubscriptionId) {
		self.registry.remove(id);
	}
}

/// Modification stamp of a watched file. `None` while the file is absent.
type FileStamp = Option<(SystemTime, u64)>;

fn file_stamp(path: &std::path::Path) -> FileStamp {
	let meta = std::fs::metadata(path).ok()?;
	Some((meta.modified().ok()?, meta.len()))
}

/// Notifier that polls a file's modification time and length.
///
/// Polling stops when the notifier is dropped.
pub struct PollingNotifier {
	registry: Arc<CallbackRegistry>,
	cancel: CancellationToken,
}

impl PollingNotifier {
	/// Starts polling `path` every `interval`.
	pub fn spawn(path: impl Into<PathBuf>, interval: Duration) -> Self {
		let path = path.into();
		let registry = Arc::new(CallbackRegistry::default());
		let cancel = CancellationToken::new();

		let task_registry = Arc::clone(&registry);
		let task_cancel = cancel.clone();
		callbook_worker::spawn(TaskClass::Background, async move {
			let mut last = read_stamp(path.clone()).await;
			let mut ticker = tokio::time::interval(interval);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
			ticker.tick().await;

			loop {
				tokio::select! {
					_ = task_cancel.cancelled() => break,
					_ = ticker.tick() => {}
				}
				let stamp = read_stamp(path.clone()).await;
				if stamp != last {
					tracing::debug!(path = %path.display(), "contacts.watch.changed");
					last = stamp;
					task_registry.fire();
				}
			}
			tracing::trace!(path = %path.display(), "contacts.watch.stopped");
		});

		Self { registry, cancel }
	}

	pub fn subscriber_count(&self) -> usize {
		self.registry.len()
	}
}

async fn read_stamp(path: PathBuf) -> FileStamp {
	callbook_worker::spawn_blocking(TaskClass::IoBlocking, move || file_stamp(&path)).await.ok().flatten()
}

impl Drop for PollingNotifier {
	fn drop(&mut self) {
		self.cancel.cancel();
	}
}

impl ChangeNotifier for PollingNotifier {
	fn subscribe(&self, callback: ChangeCallback) -> SubscriptionId {
		self.registry.add(callback)
	}

	fn unsubscribe(&self, id: SubscriptionId) {
		self.registry.remove(id);
	}
}

/// Owned registration with a notifier. Dropping it unsubscribes.
pub struct Subscription {
	notifier: Arc<dyn ChangeNotifier>,
	id: Option<SubscriptionId>,
}

impl Subscription {
	pub fn new(notifier: Arc<dyn ChangeNotifier>, callback: ChangeCallback) -> Self {
		let id = notifier.subscribe(callback);
		tracing::trace!(?id, "contacts.subscription.open");
		Self { notifier, id: Some(id) }
	}

	pub fn is_active(&self) -> bool {
		self.id.is_some()
	}

	/// Unsubscribes. Later calls do nothing.
	pub fn revoke(&mut self) {
		if let Some(id) = self.id.take() {
			self.notifier.unsubscribe(id);
			tracing::trace!(?id, "contacts.subscription.revoke");
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.revoke();
	}
}

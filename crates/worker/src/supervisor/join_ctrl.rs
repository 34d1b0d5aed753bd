use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Where the supervisor task stands from the joiners' point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinPhase {
	/// Handle is parked and the next joiner takes it.
	Parked,
	/// One joiner owns the handle; others wait on the phase channel.
	Joining,
	Done,
}

/// Lets any number of shutdown callers join one supervisor task.
///
/// # Invariants
///
/// - At most one caller awaits the [`JoinHandle`] at a time.
/// - A joiner that times out parks the handle again so later joiners can take it.
/// - The handle lock is never held across an await.
pub(super) struct JoinCtrl {
	handle: Mutex<Option<JoinHandle<()>>>,
	phase: watch::Sender<JoinPhase>,
}

impl JoinCtrl {
	pub(super) fn new(handle: JoinHandle<()>) -> Self {
		let (phase, _) = watch::channel(JoinPhase::Parked);
		Self {
			handle: Mutex::new(Some(handle)),
			phase,
		}
	}

	fn take_handle(&self) -> Option<JoinHandle<()>> {
		let taken = self.handle.lock().take();
		if taken.is_some() {
			self.phase.send_replace(JoinPhase::Joining);
		}
		taken
	}

	fn park(&self, handle: JoinHandle<()>) {
		*self.handle.lock() = Some(handle);
		self.phase.send_replace(JoinPhase::Parked);
	}

	fn finish(&self) {
		self.phase.send_replace(JoinPhase::Done);
	}

	/// Waits until the current leader finishes or parks the handle.
	async fn wait_for_leader(&self) {
		let mut rx = self.phase.subscribe();
		let _ = rx.wait_for(|phase| *phase != JoinPhase::Joining).await;
	}

	/// Joins the supervisor task without a deadline.
	pub(super) async fn join_forever(&self) {
		loop {
			if *self.phase.borrow() == JoinPhase::Done {
				return;
			}
			match self.take_handle() {
				Some(handle) => {
					let _ = handle.await;
					self.finish();
					return;
				}
				None => self.wait_for_leader().await,
			}
		}
	}

	/// Joins with a deadline. Returns `true` if the task completed.
	pub(super) async fn join_with_timeout(&self, timeout: Duration) -> bool {
		let deadline = tokio::time::Instant::now() + timeout;
		loop {
			if *self.phase.borrow() == JoinPhase::Done {
				return true;
			}
			match self.take_handle() {
				Some(mut handle) => {
					tokio::select! {
						_ = &mut handle => {
							self.finish();
							return true;
						}
						_ = tokio::time::sleep_until(deadline) => {
							self.park(handle);
							return false;
						}
					}
				}
				None => {
					tokio::select! {
						_ = self.wait_for_leader() => {}
						_ = tokio::time::sleep_until(deadline) => return false,
					}
				}
			}
		}
	}
}

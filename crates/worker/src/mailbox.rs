//! Bounded FIFO mailbox with backpressure.
//!
//! One mailbox feeds one actor. Messages leave in the order they were
//! accepted; there are no priorities and nothing is dropped or coalesced.
//! Closing the mailbox rejects new messages while the receiver drains what
//! was already accepted.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Mailbox send error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxSendError {
	/// Mailbox is closed.
	Closed,
	/// Queue is at capacity and a non-waiting send was used.
	Full,
}

impl std::fmt::Display for MailboxSendError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Closed => write!(f, "mailbox closed"),
			Self::Full => write!(f, "mailbox full"),
		}
	}
}

impl std::error::Error for MailboxSendError {}

struct MailboxState<T> {
	queue: VecDeque<T>,
	closed: bool,
}

struct MailboxInner<T> {
	capacity: usize,
	state: Mutex<MailboxState<T>>,
	notify_recv: Notify,
	notify_send: Notify,
}

/// Bounded FIFO mailbox.
pub struct Mailbox<T> {
	inner: Arc<MailboxInner<T>>,
}

/// Multi-producer mailbox sender.
pub struct MailboxSender<T> {
	inner: Arc<MailboxInner<T>>,
}

/// Mailbox receiver. Clones share one queue.
pub struct MailboxReceiver<T> {
	inner: Arc<MailboxInner<T>>,
}

impl<T> Clone for MailboxSender<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> Clone for MailboxReceiver<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> Mailbox<T> {
	/// Creates a mailbox holding at most `capacity` queued messages.
	///
	/// # Panics
	///
	/// Panics if `capacity` is zero.
	pub fn new(capacity: usize) -> Self {
		assert!(capacity > 0, "mailbox capacity must be > 0");
		Self {
			inner: Arc::new(MailboxInner {
				capacity,
				state: Mutex::new(MailboxState {
					queue: VecDeque::with_capacity(capacity),
					closed: false,
				}),
				notify_recv: Notify::new(),
				notify_send: Notify::new(),
			}),
		}
	}

	pub fn sender(&self) -> MailboxSender<T> {
		MailboxSender {
			inner: Arc::clone(&self.inner),
		}
	}

	pub fn receiver(&self) -> MailboxReceiver<T> {
		MailboxReceiver {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> MailboxSender<T> {
	/// Closes the mailbox. The receiver drains queued messages, then sees `None`.
	pub fn close(&self) {
		self.inner.state.lock().closed = true;
		self.inner.notify_recv.notify_waiters();
		self.inner.notify_send.notify_waiters();
	}

	pub fn is_closed(&self) -> bool {
		self.inner.state.lock().closed
	}

	/// Enqueues without waiting.
	pub fn try_send(&self, msg: T) -> Result<(), MailboxSendError> {
		let mut state = self.inner.state.lock();
		if state.closed {
			return Err(MailboxSendError::Closed);
		}
		if state.queue.len() >= self.inner.capacity {
			return Err(MailboxSendError::Full);
		}
		state.queue.push_back(msg);
		drop(state);
		self.inner.notify_recv.notify_one();
		Ok(())
	}

	/// Enqueues, waiting for capacity when the queue is full.
	pub async fn send(&self, msg: T) -> Result<(), MailboxSendError> {
		loop {
			// Register before checking capacity so a dequeue between the check
			// and the await still wakes us.
			let notified = self.inner.notify_send.notified();
			tokio::pin!(notified);
			notified.as_mut().enable();

			{
				let mut state = self.inner.state.lock();
				if state.closed {
					return Err(MailboxSendError::Closed);
				}
				if state.queue.len() < self.inner.capacity {
					state.queue.push_back(msg);
					drop(state);
					self.inner.notify_recv.notify_one();
					return Ok(());
				}
			}

			notified.await;
		}
	}

}

impl<T> MailboxReceiver<T> {
	/// Receives the oldest message. Returns `None` once closed and drained.
	pub async fn recv(&self) -> Option<T> {
		loop {
			let notified = self.inner.notify_recv.notified();
			tokio::pin!(notified);
			notified.as_mut().enable();

			{
				let mut state = self.inner.state.lock();
				if let Some(msg) = state.queue.pop_front() {
					drop(state);
					self.inner.notify_send.notify_one();
					return Some(msg);
				}
				if state.closed {
					return None;
				}
			}

			notified.await;
		}
	}
}

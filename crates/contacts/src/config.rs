use std::time::Duration;

use callbook_primitives::MAX_RECIPIENT_COUNT;
use serde::{Deserialize, Serialize};

/// Tunables for a [`ContactService`](crate::ContactService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
	/// Result cap. Values above the recipient limit are clamped to it.
	pub max_recipients: usize,
	/// Coordinator mailbox capacity.
	pub mailbox_capacity: usize,
	/// Cache events buffered per subscriber before a slow one starts lagging.
	pub event_buffer: usize,
	/// How long shutdown waits for queued commands before cancelling.
	pub shutdown_timeout_ms: u64,
}

impl Default for ServiceConfig {
	fn default() -> Self {
		Self {
			max_recipients: MAX_RECIPIENT_COUNT,
			mailbox_capacity: 256,
			event_buffer: 64,
			shutdown_timeout_ms: 2_000,
		}
	}
}

impl ServiceConfig {
	pub fn matcher(&self) -> callbook_matcher::Config {
		callbook_matcher::Config {
			max_recipients: self.max_recipients.min(MAX_RECIPIENT_COUNT),
		}
	}

	pub fn shutdown_timeout(&self) -> Duration {
		Duration::from_millis(self.shutdown_timeout_ms)
	}
}

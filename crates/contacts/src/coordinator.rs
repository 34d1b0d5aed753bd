//! Serialized owner of the contact cache.
//!
//! Every refresh, snapshot read, and query is one command in a single FIFO
//! mailbox, applied by one actor.
//!
//! # Invariants
//!
//! - A query reads exactly one snapshot, start to finish.
//! - A refresh never interleaves with a query.
//! - Commands are applied in enqueue order with no priorities.

use std::sync::Arc;

use async_trait::async_trait;
use callbook_primitives::{CacheSnapshot, Query, QueryResult};
use callbook_worker::{Actor, ActorContext, ActorFlow};
use tokio::sync::oneshot;

use crate::cache::ContactCache;
use crate::source::ContactSource;

/// Commands accepted by the coordinator.
#[derive(Debug)]
pub enum CacheCmd {
	/// Re-fetch the source and publish a new snapshot.
	Refresh,
	/// Reply with the snapshot in effect.
	Snapshot { reply: oneshot::Sender<Arc<CacheSnapshot>> },
	/// Resolve names against the snapshot in effect.
	Resolve { query: Query, reply: oneshot::Sender<QueryResult> },
}

/// Events broadcast after cache changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
	SnapshotPublished { version: u64, len: usize },
	/// The fetch failed and an empty snapshot was published in its place.
	RefreshFailed { version: u64, reason: String },
}

pub(crate) struct CoordinatorActor {
	cache: ContactCache,
	matcher: callbook_matcher::Config,
}

impl CoordinatorActor {
	pub(crate) fn new(source: Arc<dyn ContactSource>, matcher: callbook_matcher::Config) -> Self {
		Self {
			cache: ContactCache::new(source),
			matcher,
		}
	}

	async fn refresh(&mut self, ctx: &ActorContext<CacheEvent>) {
		match self.cache.refresh().await {
			Ok(snapshot) => ctx.emit(CacheEvent::SnapshotPublished {
				version: snapshot.version(),
				len: snapshot.len(),
			}),
			Err(error) => ctx.emit(CacheEvent::RefreshFailed {
				version: self.cache.current_snapshot().version(),
				reason: error.to_string(),
			}),
		}
	}
}

#[async_trait]
impl Actor for CoordinatorActor {
	type Cmd = CacheCmd;
	type Evt = CacheEvent;

	async fn on_start(&mut self, ctx: &mut ActorContext<Self::Evt>) -> Result<(), String> {
		tracing::debug!(generation = ctx.generation(), "contacts.coordinator.start");
		self.refresh(ctx).await;
		Ok(())
	}

	async fn handle(&mut self, cmd: Self::Cmd, ctx: &mut ActorContext<Self::Evt>) -> Result<ActorFlow, String> {
		match cmd {
			CacheCmd::Refresh => self.refresh(ctx).await,
			CacheCmd::Snapshot { reply } => {
				let _ = reply.send(self.cache.current_snapshot());
			}
			CacheCmd::Resolve { query, reply } => {
				let snapshot = self.cache.current_snapshot();
				let result = callbook_matcher::resolve(&snapshot, &query, &self.matcher);
				tracing::debug!(
					names = query.names.len(),
					match_type = result.match_type.as_str(),
					records = result.records.len(),
					version = result.snapshot_version,
					"contacts.coordinator.resolve"
				);
				if reply.send(result).is_err() {
					tracing::trace!("resolve caller went away before the reply");
				}
			}
		}
		Ok(ActorFlow::Continue)
	}
}

//! Snapshot cache over a [`ContactSource`].

use std::sync::Arc;

use callbook_primitives::CacheSnapshot;

use crate::error::SourceError;
use crate::source::ContactSource;

/// Holds the published snapshot and rebuilds it from the source on refresh.
///
/// The cache is owned by the coordinator actor and never shared, so the
/// snapshot reference needs no lock.
pub struct ContactCache {
	source: Arc<dyn ContactSource>,
	current: Arc<CacheSnapshot>,
	next_version: u64,
}

impl ContactCache {
	/// Creates a cache holding the empty version-0 snapshot.
	pub fn new(source: Arc<dyn ContactSource>) -> Self {
		Self {
			source,
			current: Arc::new(CacheSnapshot::empty()),
			next_version: 1,
		}
	}

	/// Fetches, filters, sorts, and publishes a new snapshot.
	///
	/// On fetch failure an empty snapshot is published and the error is
	/// returned for reporting only.
	pub async fn refresh(&mut self) -> Result<Arc<CacheSnapshot>, SourceError> {
		let version = self.next_version;
		self.next_version = self.next_version.wrapping_add(1);

		match self.source.fetch_all().await {
			Ok(raw) => {
				let fetched = raw.len();
				let snapshot = Arc::new(CacheSnapshot::build(version, raw));
				tracing::debug!(version, fetched, records = snapshot.len(), "contacts.cache.publish");
				self.current = Arc::clone(&snapshot);
				Ok(snapshot)
			}
			Err(error) => {
				tracing::warn!(version, %error, "contact fetch failed; publishing empty snapshot");
				self.current = Arc::new(CacheSnapshot::build(version, Vec::new()));
				Err(error)
			}
		}
	}

	/// Snapshot in effect right now.
	pub fn current_snapshot(&self) -> Arc<CacheSnapshot> {
		Arc::clone(&self.current)
	}
}

#[cfg(test)]
mod tests {
	use callbook_primitives::{ContactRecord, RawContact};
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::source::StaticSource;

	fn names(snapshot: &CacheSnapshot) -> Vec<&str> {
		snapshot.records().iter().map(ContactRecord::display_name).collect()
	}

	#[tokio::test]
	async fn refresh_filters_phoneless_entries_and_sorts_by_length() {
		let source = Arc::new(StaticSource::new(vec![
			RawContact::new("남궁", "민수").with_phone("mobile", "1"),
			RawContact::new("이", "").with_phone("home", "2"),
			RawContact::new("박", "지성"),
			RawContact::new("최", "강").with_phone("work", "3"),
		]));
		let mut cache = ContactCache::new(source);
		assert_eq!(cache.current_snapshot().version(), 0);

		let snapshot = cache.refresh().await.unwrap();
		assert_eq!(snapshot.version(), 1);
		assert_eq!(names(&snapshot), ["이", "최강", "남궁민수"]);
		assert!(Arc::ptr_eq(&snapshot, &cache.current_snapshot()));
	}

	#[tokio::test]
	async fn failed_fetch_publishes_empty_snapshot() {
		let source = Arc::new(StaticSource::new(vec![RawContact::new("Kim", "").with_phone("mobile", "1")]));
		let mut cache = ContactCache::new(source.clone());
		cache.refresh().await.unwrap();
		assert_eq!(cache.current_snapshot().len(), 1);

		source.fail_with("denied");
		assert!(cache.refresh().await.is_err());
		let current = cache.current_snapshot();
		assert!(current.is_empty());
		assert_eq!(current.version(), 2);
	}

	#[tokio::test]
	async fn unchanged_source_refreshes_to_identical_content() {
		let source = Arc::new(StaticSource::new(vec![
			RawContact::new("b", "b").with_phone("mobile", "1"),
			RawContact::new("a", "a").with_phone("mobile", "2"),
			RawContact::new("c", "").with_phone("mobile", "3"),
		]));
		let mut cache = ContactCache::new(source);

		let first = cache.refresh().await.unwrap();
		let second = cache.refresh().await.unwrap();
		assert!(first.same_content(&second));
		assert_eq!(second.version(), first.version() + 1);
	}
}

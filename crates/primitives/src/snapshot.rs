//! Immutable, fully-formed views of the contact cache.

use serde::Serialize;

use crate::record::{ContactRecord, RawContact};

/// One published generation of the contact cache.
///
/// # Invariants
///
/// - Every record has at least one phone number.
/// - Records are sorted ascending by display-name length; equal lengths keep
///   source order.
/// - A snapshot is never mutated after construction. Refreshing builds a new
///   one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheSnapshot {
	version: u64,
	records: Vec<ContactRecord>,
}

impl CacheSnapshot {
	/// The snapshot in effect before the first refresh.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Builds a snapshot from raw source entries.
	///
	/// Entries without phone numbers are dropped.
	pub fn build(version: u64, raw: impl IntoIterator<Item = RawContact>) -> Self {
		let mut records: Vec<ContactRecord> = raw.into_iter().filter_map(ContactRecord::from_raw).collect();
		records.sort_by_key(ContactRecord::display_len);
		Self { version, records }
	}

	/// Monotonic generation number; 0 for the initial empty snapshot.
	pub fn version(&self) -> u64 {
		self.version
	}

	pub fn records(&self) -> &[ContactRecord] {
		&self.records
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Returns whether two snapshots hold the same ordered records,
	/// regardless of version.
	pub fn same_content(&self, other: &Self) -> bool {
		self.records == other.records
	}
}

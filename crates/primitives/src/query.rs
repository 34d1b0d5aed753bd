//! Name-resolution queries and their results.

use serde::{Deserialize, Serialize};

use crate::record::ContactRecord;

/// Hard cap on records returned by one query.
pub const MAX_RECIPIENT_COUNT: usize = 70;

/// Caller preference for how far resolution may fall back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchHint {
	/// Only exact display-name matches are acceptable.
	Exact,
	/// Fall back to partial matching when no exact match exists.
	#[default]
	AutoFallback,
}

/// Phase that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
	Exact,
	Partial,
}

impl MatchType {
	/// Tag used for an empty answer to a query with the given hint.
	pub const fn for_hint(hint: MatchHint) -> Self {
		match hint {
			MatchHint::Exact => Self::Exact,
			MatchHint::AutoFallback => Self::Partial,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Exact => "exact",
			Self::Partial => "partial",
		}
	}
}

/// Candidate names to resolve, most likely first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
	pub names: Vec<String>,
	#[serde(default)]
	pub hint: MatchHint,
}

impl Query {
	pub fn new<I, S>(names: I, hint: MatchHint) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			names: names.into_iter().map(Into::into).collect(),
			hint,
		}
	}

	/// Name used as the ranking reference in the partial phase.
	pub fn reference(&self) -> Option<&str> {
		self.names.first().map(String::as_str)
	}
}

/// Outcome of one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
	pub match_type: MatchType,
	pub records: Vec<ContactRecord>,
	/// Version of the snapshot that answered the query.
	pub snapshot_version: u64,
}

impl QueryResult {
	/// Empty answer tagged the way the hint asks for.
	pub fn empty(hint: MatchHint, snapshot_version: u64) -> Self {
		Self {
			match_type: MatchType::for_hint(hint),
			records: Vec::new(),
			snapshot_version,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}

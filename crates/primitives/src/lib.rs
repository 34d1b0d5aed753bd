//! Core contact types: records, snapshots, queries, and name normalization.

/// Emoji and whitespace stripping, display names, grapheme lengths.
pub mod normalize;
/// Name-resolution queries and results.
pub mod query;
/// Raw and normalized contact records.
pub mod record;
/// Immutable cache snapshots.
pub mod snapshot;

pub use query::{MAX_RECIPIENT_COUNT, MatchHint, MatchType, Query, QueryResult};
pub use record::{ContactRecord, PhoneLabel, PhoneNumber, RawContact, RawPhoneNumber};
pub use snapshot::CacheSnapshot;

use callbook_primitives::{CacheSnapshot, MatchHint, MatchType, Query, QueryResult};

use crate::{Config, exact_scan, partial_scan, rank};

/// Resolves `query` against one snapshot.
///
/// Never fails: an empty snapshot or an unmatched name yields an empty
/// result tagged `exact` for an exact hint and `partial` otherwise.
pub fn resolve(snapshot: &CacheSnapshot, query: &Query, config: &Config) -> QueryResult {
	let records = snapshot.records();
	let version = snapshot.version();

	let exact = exact_scan(records, &query.names, config.max_recipients);
	if !exact.is_empty() || query.hint == MatchHint::Exact {
		tracing::trace!(version, names = query.names.len(), matched = exact.len(), "matcher.exact");
		return QueryResult {
			match_type: MatchType::Exact,
			records: exact.into_iter().map(|idx| records[idx].clone()).collect(),
			snapshot_version: version,
		};
	}

	let Some(reference) = query.reference() else {
		return QueryResult::empty(query.hint, version);
	};

	let pool = partial_scan(records, &query.names);
	let pooled = pool.len();
	let ranked = rank(records, pool, reference, config.max_recipients);
	tracing::trace!(version, names = query.names.len(), pooled, kept = ranked.len(), "matcher.partial");

	QueryResult {
		match_type: MatchType::Partial,
		records: ranked.into_iter().map(|idx| records[idx].clone()).collect(),
		snapshot_version: version,
	}
}

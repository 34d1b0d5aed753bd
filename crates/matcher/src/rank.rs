use std::cmp::Ordering;

use callbook_primitives::ContactRecord;
use callbook_primitives::normalize::grapheme_len;

/// Length disparity between two names: `max(a / b, b / a)`.
///
/// Lower is more similar and 1.0 means equal length. A zero length on either
/// side yields infinity so such records rank last.
pub fn similarity_ratio(reference_len: usize, candidate_len: usize) -> f64 {
	if reference_len == 0 || candidate_len == 0 {
		return f64::INFINITY;
	}
	let reference = reference_len as f64;
	let candidate = candidate_len as f64;
	(reference / candidate).max(candidate / reference)
}

/// Orders pooled snapshot indices by similarity to `reference` and keeps the
/// best `limit`.
///
/// Ties on ratio fall back to display name order. The sort is stable, so
/// records with identical names keep snapshot order.
pub fn rank(records: &[ContactRecord], mut pool: Vec<usize>, reference: &str, limit: usize) -> Vec<usize> {
	let reference_len = grapheme_len(reference);
	let compare = |lhs: &usize, rhs: &usize| -> Ordering {
		let lhs = &records[*lhs];
		let rhs = &records[*rhs];
		similarity_ratio(reference_len, lhs.display_len())
			.total_cmp(&similarity_ratio(reference_len, rhs.display_len()))
			.then_with(|| lhs.display_name().cmp(rhs.display_name()))
	};

	#[cfg(feature = "parallel_sort")]
	{
		use rayon::prelude::*;
		pool.par_sort_by(compare);
	}
	#[cfg(not(feature = "parallel_sort"))]
	pool.sort_by(compare);

	pool.truncate(limit);
	pool
}

use callbook_primitives::ContactRecord;
use callbook_primitives::normalize::partial_key;

/// Pools snapshot indices that partially match any candidate.
///
/// Both sides are compared with whitespace and emoji removed. A record
/// matches when either stripped string contains the other, so abbreviations
/// work in both directions. Empty stripped strings never match. Each
/// candidate contributes its own matches, so a record matched by two
/// candidates is pooled twice. The pool is not capped here; ranking needs
/// every candidate before truncation.
pub fn partial_scan<S: AsRef<str>>(records: &[ContactRecord], names: &[S]) -> Vec<usize> {
	let mut pool = Vec::new();

	for name in names {
		let key = partial_key(name.as_ref());
		if key.is_empty() {
			continue;
		}

		for (idx, record) in records.iter().enumerate() {
			let candidate = record.partial_key();
			if candidate.is_empty() {
				continue;
			}
			if candidate.contains(key.as_str()) || key.contains(candidate) {
				pool.push(idx);
			}
		}
	}

	pool
}

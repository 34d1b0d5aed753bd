use callbook_primitives::ContactRecord;
use callbook_primitives::normalize::exact_key;

/// Collects snapshot indices whose emoji-stripped display name equals an
/// emoji-stripped candidate.
///
/// Candidates are scanned in order and records in snapshot order. Scanning
/// stops entirely once `capacity` indices are collected. A record named by
/// several candidates is collected once per candidate, and every copy counts
/// toward `capacity`.
pub fn exact_scan<S: AsRef<str>>(records: &[ContactRecord], names: &[S], capacity: usize) -> Vec<usize> {
	let mut matches = Vec::new();

	'names: for name in names {
		if matches.len() >= capacity {
			break;
		}
		let key = exact_key(name.as_ref());

		for (idx, record) in records.iter().enumerate() {
			if record.exact_key() != key {
				continue;
			}
			matches.push(idx);
			if matches.len() >= capacity {
				break 'names;
			}
		}
	}

	matches
}

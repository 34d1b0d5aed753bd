//! Contact name resolution against a cache snapshot.
//!
//! Resolution runs in two phases. The exact phase compares emoji-stripped
//! display names for equality and stops at the recipient cap. When it finds
//! nothing and the caller allows fallback, the partial phase pools every
//! record whose whitespace- and emoji-stripped name contains, or is contained
//! in, a stripped candidate. The pool is then ranked by length ratio against
//! the first candidate and truncated.
//!
//! ```text
//! Start -> ExactScan -> ExactFound ------------------------------> Exact(records)
//!                    -> ExactEmpty, hint = exact ----------------> Exact([])
//!                    -> ExactEmpty, hint = auto -> PartialScan -> Rank -> Truncate -> Partial(records)
//! ```
//!
//! Exact matching keeps whitespace while partial matching ignores it.

mod exact;
mod partial;
mod rank;
mod resolve;

pub use exact::exact_scan;
pub use partial::partial_scan;
pub use rank::{rank, similarity_ratio};
pub use resolve::resolve;

use callbook_primitives::MAX_RECIPIENT_COUNT;

/// Resolution limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
	/// Maximum records returned by one resolution.
	pub max_recipients: usize,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			max_recipients: MAX_RECIPIENT_COUNT,
		}
	}
}

//! Name normalization used for contact matching.
//!
//! All lengths and emoji decisions work on extended grapheme clusters, so a
//! composed Hangul syllable or a skin-toned emoji counts as one character.

use std::borrow::Cow;
use std::ops::RangeInclusive;

use unicode_segmentation::UnicodeSegmentation;

/// Code-point intervals treated as emoji.
pub const EMOJI_RANGES: [RangeInclusive<char>; 6] = [
	// Emoticons
	'\u{1F600}'..='\u{1F64F}',
	// Miscellaneous symbols and pictographs
	'\u{1F300}'..='\u{1F5FF}',
	// Transport and map symbols
	'\u{1F680}'..='\u{1F6FF}',
	// Miscellaneous symbols
	'\u{2600}'..='\u{26FF}',
	// Dingbats
	'\u{2700}'..='\u{27BF}',
	// Variation selectors
	'\u{FE00}'..='\u{FE0F}',
];

/// Returns whether one grapheme cluster falls inside [`EMOJI_RANGES`].
///
/// Clusters are ordered by their scalar sequence, so a cluster whose leading
/// scalar sits inside an interval is in range, and a cluster that starts with
/// the upper bound is in range only when that bound is its sole scalar.
pub fn is_emoji_cluster(cluster: &str) -> bool {
	let mut scalars = cluster.chars();
	let Some(first) = scalars.next() else {
		return false;
	};
	let single = scalars.next().is_none();

	EMOJI_RANGES
		.iter()
		.any(|range| first >= *range.start() && (first < *range.end() || (first == *range.end() && single)))
}

/// Removes every emoji grapheme cluster from `text`.
pub fn strip_emoji(text: &str) -> Cow<'_, str> {
	if !text.graphemes(true).any(is_emoji_cluster) {
		return Cow::Borrowed(text);
	}
	Cow::Owned(text.graphemes(true).filter(|cluster| !is_emoji_cluster(cluster)).collect())
}

/// Removes every ASCII space (U+0020) from `text`. Tabs, newlines and other
/// Unicode spaces are kept.
pub fn strip_whitespace(text: &str) -> Cow<'_, str> {
	if !text.contains(' ') {
		return Cow::Borrowed(text);
	}
	Cow::Owned(text.replace(' ', ""))
}

/// Builds the display name used as the sole matching key.
///
/// Family name comes first with no separator, matching how names are written
/// in the address books this crate ingests.
pub fn display_name(family: &str, given: &str) -> String {
	let mut name = String::with_capacity(family.len() + given.len());
	name.push_str(family);
	name.push_str(given);
	name
}

/// Counts user-perceived characters.
pub fn grapheme_len(text: &str) -> usize {
	text.graphemes(true).count()
}

/// Key compared during the exact phase: emoji removed, whitespace kept.
pub fn exact_key(name: &str) -> String {
	strip_emoji(name).into_owned()
}

/// Key compared during the partial phase: whitespace and emoji removed.
pub fn partial_key(name: &str) -> String {
	let compact = strip_whitespace(name);
	strip_emoji(&compact).into_owned()
}

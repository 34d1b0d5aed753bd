//! Contact records as ingested from an address book.

use serde::{Deserialize, Serialize};

use crate::normalize::{display_name, exact_key, grapheme_len, partial_key};

/// One address-book entry exactly as a contact source yields it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContact {
	/// Source-side identifier, when the source has one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(default)]
	pub family_name: String,
	#[serde(default)]
	pub given_name: String,
	#[serde(default)]
	pub phone_numbers: Vec<RawPhoneNumber>,
}

impl RawContact {
	/// Creates a raw contact without an identifier.
	pub fn new(family_name: impl Into<String>, given_name: impl Into<String>) -> Self {
		Self {
			id: None,
			family_name: family_name.into(),
			given_name: given_name.into(),
			phone_numbers: Vec::new(),
		}
	}

	/// Appends one phone number.
	#[must_use]
	pub fn with_phone(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
		self.phone_numbers.push(RawPhoneNumber {
			label: Some(label.into()),
			value: value.into(),
		});
		self
	}
}

/// A phone number with the label string the source attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPhoneNumber {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	pub value: String,
}

/// Normalized phone label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneLabel {
	Mobile,
	Home,
	Other,
}

impl PhoneLabel {
	/// Maps a source label onto the normalized set.
	///
	/// Platform wrappers such as `_$!<Mobile>!$_` are peeled before matching,
	/// and comparison ignores ASCII case.
	pub fn from_source(raw: Option<&str>) -> Self {
		let Some(raw) = raw else {
			return Self::Other;
		};
		let inner = raw.trim().trim_start_matches("_$!<").trim_end_matches(">!$_").trim();
		match inner.to_ascii_lowercase().as_str() {
			"mobile" | "cell" | "iphone" => Self::Mobile,
			"home" => Self::Home,
			_ => Self::Other,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Mobile => "mobile",
			Self::Home => "home",
			Self::Other => "other",
		}
	}
}

/// Labeled phone number inside a [`ContactRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PhoneNumber {
	pub label: PhoneLabel,
	pub number: String,
}

/// Immutable contact entry held by a snapshot.
///
/// The display name and both match keys are derived once at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
	#[serde(skip_serializing_if = "Option::is_none")]
	id: Option<String>,
	family_name: String,
	given_name: String,
	display_name: String,
	phone_numbers: Vec<PhoneNumber>,
	#[serde(skip)]
	display_len: usize,
	#[serde(skip)]
	exact_key: String,
	#[serde(skip)]
	partial_key: String,
}

impl ContactRecord {
	/// Builds a record from a raw entry.
	///
	/// Returns `None` when the entry has no phone number; such entries are
	/// never part of a snapshot.
	pub fn from_raw(raw: RawContact) -> Option<Self> {
		if raw.phone_numbers.is_empty() {
			return None;
		}

		let display_name = display_name(&raw.family_name, &raw.given_name);
		let phone_numbers = raw
			.phone_numbers
			.into_iter()
			.map(|phone| PhoneNumber {
				label: PhoneLabel::from_source(phone.label.as_deref()),
				number: phone.value,
			})
			.collect();

		Some(Self {
			id: raw.id,
			display_len: grapheme_len(&display_name),
			exact_key: exact_key(&display_name),
			partial_key: partial_key(&display_name),
			family_name: raw.family_name,
			given_name: raw.given_name,
			display_name,
			phone_numbers,
		})
	}

	pub fn id(&self) -> Option<&str> {
		self.id.as_deref()
	}

	pub fn family_name(&self) -> &str {
		&self.family_name
	}

	pub fn given_name(&self) -> &str {
		&self.given_name
	}

	/// Family name followed by given name.
	pub fn display_name(&self) -> &str {
		&self.display_name
	}

	/// Phone numbers in source order. Never empty.
	pub fn phone_numbers(&self) -> &[PhoneNumber] {
		&self.phone_numbers
	}

	/// Display name length in grapheme clusters.
	pub fn display_len(&self) -> usize {
		self.display_len
	}

	/// Emoji-stripped display name.
	pub fn exact_key(&self) -> &str {
		&self.exact_key
	}

	/// Emoji- and whitespace-stripped display name.
	pub fn partial_key(&self) -> &str {
		&self.partial_key
	}
}

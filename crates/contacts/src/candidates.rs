//! Call candidates handed to the voice agent.
//!
//! Candidates are plain values; nothing here holds a reference back to the
//! agent or the service.

use callbook_primitives::{ContactRecord, PhoneLabel, QueryResult};
use serde::Serialize;

/// Origin of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
	Contact,
}

/// The two number labels the agent distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateLabel {
	Mobile,
	Home,
}

impl From<PhoneLabel> for CandidateLabel {
	/// Anything that is not a mobile number is offered as home.
	fn from(label: PhoneLabel) -> Self {
		match label {
			PhoneLabel::Mobile => Self::Mobile,
			PhoneLabel::Home | PhoneLabel::Other => Self::Home,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateNumber {
	pub label: CandidateLabel,
	pub number: String,
}

/// One person the agent may offer to call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallCandidate {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: CandidateKind,
	pub contacts: Vec<CandidateNumber>,
}

impl CallCandidate {
	pub fn from_record(record: &ContactRecord) -> Self {
		Self {
			name: record.display_name().to_string(),
			kind: CandidateKind::Contact,
			contacts: record
				.phone_numbers()
				.iter()
				.map(|phone| CandidateNumber {
					label: phone.label.into(),
					number: phone.number.clone(),
				})
				.collect(),
		}
	}

	/// `tel://` URL for the first number, if any.
	pub fn dial_target(&self) -> Option<String> {
		self.contacts.first().map(|contact| format!("tel://{}", contact.number))
	}
}

/// Projects a resolution result into candidates, keeping result order.
pub fn candidates_for(result: &QueryResult) -> Vec<CallCandidate> {
	result.records.iter().map(CallCandidate::from_record).collect()
}

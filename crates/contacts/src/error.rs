//! Error types for contact sources.

use std::path::PathBuf;

use thiserror::Error;

/// Errors a [`ContactSource`](crate::ContactSource) can report.
///
/// These never reach service callers. The cache degrades to an empty
/// snapshot and logs the error instead.
#[derive(Debug, Error)]
pub enum SourceError {
	/// The backing store could not be reached.
	#[error("contact store unavailable: {0}")]
	Unavailable(String),

	/// The platform refused access to the contact store.
	#[error("contact store access denied")]
	PermissionDenied,

	/// Error reading an address-book export.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// An address-book export was not valid JSON for the expected shape.
	#[error("failed to parse {path}: {error}")]
	Parse {
		/// Path to the file that failed to parse.
		path: PathBuf,
		/// The underlying JSON error.
		error: serde_json::Error,
	},
}

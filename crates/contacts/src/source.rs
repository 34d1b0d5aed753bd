//! Contact stores the cache can fetch from.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use callbook_primitives::RawContact;
use callbook_worker::TaskClass;
use parking_lot::RwLock;

use crate::error::SourceError;

/// Read access to the device address book.
#[async_trait]
pub trait ContactSource: Send + Sync + 'static {
	/// Returns every entry currently in the store, in store order.
	async fn fetch_all(&self) -> Result<Vec<RawContact>, SourceError>;
}

/// In-memory source with swappable contents.
#[derive(Debug)]
pub struct StaticSource {
	state: RwLock<Result<Vec<RawContact>, String>>,
}

impl StaticSource {
	pub fn new(contacts: Vec<RawContact>) -> Self {
		Self {
			state: RwLock::new(Ok(contacts)),
		}
	}

	/// Replaces the contents returned by later fetches.
	pub fn replace(&self, contacts: Vec<RawContact>) {
		*self.state.write() = Ok(contacts);
	}

	/// Makes later fetches fail with [`SourceError::Unavailable`].
	pub fn fail_with(&self, reason: impl Into<String>) {
		*self.state.write() = Err(reason.into());
	}
}

impl Default for StaticSource {
	fn default() -> Self {
		Self::new(Vec::new())
	}
}

#[async_trait]
impl ContactSource for StaticSource {
	async fn fetch_all(&self) -> Result<Vec<RawContact>, SourceError> {
		self.state.read().clone().map_err(SourceError::Unavailable)
	}
}

/// Source backed by a JSON array of [`RawContact`] on disk.
///
/// The file is re-read on every fetch, on the blocking pool.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
	path: PathBuf,
}

impl JsonFileSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

#[async_trait]
impl ContactSource for JsonFileSource {
	async fn fetch_all(&self) -> Result<Vec<RawContact>, SourceError> {
		let path = self.path.clone();
		callbook_worker::spawn_blocking(TaskClass::IoBlocking, move || read_export(&path))
			.await
			.map_err(|err| SourceError::Unavailable(format!("export reader task failed: {err}")))?
	}
}

fn read_export(path: &Path) -> Result<Vec<RawContact>, SourceError> {
	let bytes = std::fs::read(path).map_err(|error| match error.kind() {
		ErrorKind::PermissionDenied => SourceError::PermissionDenied,
		_ => SourceError::Io {
			path: path.to_path_buf(),
			error,
		},
	})?;
	let contacts: Vec<RawContact> = serde_json::from_slice(&bytes).map_err(|error| SourceError::Parse {
		path: path.to_path_buf(),
		error,
	})?;
	tracing::debug!(path = %path.display(), entries = contacts.len(), "contacts.export.read");
	Ok(contacts)
}

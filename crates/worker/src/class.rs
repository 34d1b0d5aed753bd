/// Execution classes attached to every spawned task for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Work a caller is actively waiting on, such as resolving a spoken name.
	Interactive,
	/// Work that may lag behind, such as refreshing after a store change.
	Background,
	/// Blocking I/O moved off the async workers, such as reading an export file.
	IoBlocking,
}

impl TaskClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
			Self::IoBlocking => "io_blocking",
		}
	}
}

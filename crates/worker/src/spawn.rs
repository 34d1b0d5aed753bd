use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

use crate::TaskClass;

static FALLBACK: OnceLock<Runtime> = OnceLock::new();

/// Runtime used when a spawn comes from outside tokio, for example from a
/// platform change-notification thread.
fn fallback_runtime() -> &'static Runtime {
	FALLBACK.get_or_init(|| {
		Builder::new_multi_thread()
			.enable_all()
			.worker_threads(2)
			.thread_name("callbook-worker")
			.build()
			.expect("failed to build callbook-worker fallback runtime")
	})
}

fn target() -> Handle {
	Handle::try_current().unwrap_or_else(|_| fallback_runtime().handle().clone())
}

/// Spawns `fut` on the ambient runtime, tagged with `class`.
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(class = class.as_str(), "worker.task.spawn");
	target().spawn(fut)
}

/// Moves blocking `work` to the blocking pool, tagged with `class`.
pub fn spawn_blocking<F, R>(class: TaskClass, work: F) -> JoinHandle<R>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	tracing::trace!(class = class.as_str(), "worker.task.spawn_blocking");
	target().spawn_blocking(work)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn thread_name() -> Option<String> {
		std::thread::current().name().map(str::to_owned)
	}

	#[test]
	fn plain_thread_spawns_land_on_fallback_runtime() {
		let task = std::thread::spawn(|| spawn(TaskClass::Background, async { thread_name() }))
			.join()
			.unwrap();
		let ran_on = fallback_runtime().block_on(task).unwrap();
		assert_eq!(ran_on.as_deref(), Some("callbook-worker"));
	}

	#[tokio::test]
	async fn ambient_runtime_is_preferred() {
		let ran_on = spawn(TaskClass::Interactive, async { thread_name() }).await.unwrap();
		assert_ne!(ran_on.as_deref(), Some("callbook-worker"));

		let read = spawn_blocking(TaskClass::IoBlocking, || "export").await.unwrap();
		assert_eq!(read, "export");
	}
}

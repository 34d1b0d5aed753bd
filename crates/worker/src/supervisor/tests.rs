use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::oneshot;

use super::*;

/// Echoes every command as an event and stops on 0.
#[derive(Default)]
struct EchoActor;

#[async_trait]
impl Actor for EchoActor {
	type Cmd = u32;
	type Evt = u32;

	async fn handle(&mut self, cmd: Self::Cmd, ctx: &mut ActorContext<Self::Evt>) -> Result<ActorFlow, String> {
		ctx.emit(cmd);
		if cmd == 0 { Ok(ActorFlow::Stop) } else { Ok(ActorFlow::Continue) }
	}
}

#[tokio::test]
async fn commands_are_handled_in_send_order() {
	let handle = spawn_actor(ActorSpec::new("echo", TaskClass::Interactive, EchoActor::default));
	let mut events = handle.subscribe();

	for cmd in [3, 1, 2, 0] {
		handle.send(cmd).await.unwrap();
	}

	let mut seen = Vec::new();
	for _ in 0..4 {
		seen.push(events.recv().await.unwrap());
	}
	assert_eq!(seen, [3, 1, 2, 0]);

	let report = handle.shutdown(ShutdownMode::Graceful { timeout: Duration::from_secs(1) }).await;
	assert!(report.completed());
	assert_eq!(report.last_exit(), Some(&ActorExit::Stopped));
}

#[tokio::test]
async fn graceful_shutdown_drains_queued_commands() {
	let handle = spawn_actor(ActorSpec::new("echo", TaskClass::Interactive, EchoActor::default));
	let mut events = handle.subscribe();
	for cmd in 1..=5 {
		handle.send(cmd).await.unwrap();
	}

	let report = handle.shutdown(ShutdownMode::Graceful { timeout: Duration::from_secs(1) }).await;
	assert!(report.completed());
	assert_eq!(report.last_exit(), Some(&ActorExit::MailboxClosed));

	let mut drained = Vec::new();
	while let Ok(evt) = events.try_recv() {
		drained.push(evt);
	}
	assert_eq!(drained, [1, 2, 3, 4, 5]);
	assert_eq!(handle.send(6).await, Err(ActorSendError::Closed));
}

struct FailingActor {
	starts: Arc<AtomicUsize>,
}

#[async_trait]
impl Actor for FailingActor {
	type Cmd = ();
	type Evt = ();

	async fn on_start(&mut self, _ctx: &mut ActorContext<Self::Evt>) -> Result<(), String> {
		self.starts.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}

	async fn handle(&mut self, _cmd: Self::Cmd, _ctx: &mut ActorContext<Self::Evt>) -> Result<ActorFlow, String> {
		Err("boom".to_string())
	}
}

fn failing_spec(starts: &Arc<AtomicUsize>, restart: RestartPolicy) -> ActorSpec<FailingActor> {
	let starts = Arc::clone(starts);
	ActorSpec::new("failing", TaskClass::Background, move || FailingActor {
		starts: Arc::clone(&starts),
	})
	.restart(restart)
}

#[tokio::test]
async fn handler_failure_restarts_a_fresh_instance() {
	let starts = Arc::new(AtomicUsize::new(0));
	let handle = spawn_actor(failing_spec(
		&starts,
		RestartPolicy::OnFailure {
			max_restarts: 2,
			backoff: Duration::from_millis(1),
		},
	));

	for _ in 0..3 {
		handle.send(()).await.unwrap();
	}
	let report = handle.shutdown(ShutdownMode::Graceful { timeout: Duration::from_secs(1) }).await;

	assert!(report.completed());
	assert_eq!(starts.load(Ordering::SeqCst), 3);
	assert_eq!(handle.restart_count(), 2);
	assert_eq!(handle.generation(), 3);
	assert_eq!(report.last_exit(), Some(&ActorExit::HandlerFailed("boom".to_string())));
}

#[tokio::test]
async fn never_policy_does_not_restart() {
	let starts = Arc::new(AtomicUsize::new(0));
	let handle = spawn_actor(failing_spec(&starts, RestartPolicy::Never));

	handle.send(()).await.unwrap();
	let report = handle.shutdown(ShutdownMode::Graceful { timeout: Duration::from_secs(1) }).await;

	assert!(report.completed());
	assert_eq!(starts.load(Ordering::SeqCst), 1);
	assert_eq!(handle.restart_count(), 0);
	assert!(report.last_exit().is_some_and(ActorExit::is_failure));
}

struct StartupFailure;

#[async_trait]
impl Actor for StartupFailure {
	type Cmd = ();
	type Evt = ();

	async fn on_start(&mut self, _ctx: &mut ActorContext<Self::Evt>) -> Result<(), String> {
		Err("no source".to_string())
	}

	async fn handle(&mut self, _cmd: Self::Cmd, _ctx: &mut ActorContext<Self::Evt>) -> Result<ActorFlow, String> {
		Ok(ActorFlow::Continue)
	}
}

#[tokio::test]
async fn startup_failure_is_reported() {
	let handle = spawn_actor(ActorSpec::new("startup", TaskClass::Background, || StartupFailure).restart(RestartPolicy::Never));
	let report = handle.shutdown(ShutdownMode::Graceful { timeout: Duration::from_secs(1) }).await;
	assert_eq!(report.last_exit(), Some(&ActorExit::StartupFailed("no source".to_string())));
}

/// Blocks inside `handle` until released.
struct StuckActor;

#[async_trait]
impl Actor for StuckActor {
	type Cmd = oneshot::Receiver<()>;
	type Evt = ();

	async fn handle(&mut self, cmd: Self::Cmd, _ctx: &mut ActorContext<Self::Evt>) -> Result<ActorFlow, String> {
		let _ = cmd.await;
		Ok(ActorFlow::Continue)
	}
}

#[tokio::test]
async fn graceful_timeout_falls_back_to_cancel() {
	let handle = spawn_actor(ActorSpec::new("stuck", TaskClass::Background, || StuckActor));
	let (_release, gate) = oneshot::channel();
	handle.send(gate).await.unwrap();
	tokio::time::sleep(Duration::from_millis(10)).await;

	let report = handle.shutdown(ShutdownMode::Graceful { timeout: Duration::from_millis(20) }).await;
	assert!(report.timed_out());

	let report = handle.shutdown_graceful_or_force(Duration::from_millis(20)).await;
	assert!(report.completed());
	assert_eq!(report.last_exit(), Some(&ActorExit::Cancelled));
}

#[tokio::test]
async fn concurrent_shutdowns_all_complete() {
	let handle = Arc::new(spawn_actor(ActorSpec::new("echo", TaskClass::Interactive, EchoActor::default)));
	handle.send(7).await.unwrap();

	let mut joins = Vec::new();
	for _ in 0..4 {
		let handle = Arc::clone(&handle);
		joins.push(tokio::spawn(async move {
			handle.shutdown(ShutdownMode::Graceful { timeout: Duration::from_secs(1) }).await.completed()
		}));
	}
	for join in joins {
		assert!(join.await.unwrap());
	}
}

#[tokio::test]
async fn port_reports_closed_once_handle_drops() {
	let handle = spawn_actor(ActorSpec::new("echo", TaskClass::Interactive, EchoActor::default).mailbox_capacity(1));
	let port = handle.port();
	let mut events = handle.subscribe();

	port.try_send(9).unwrap();
	assert_eq!(events.recv().await.unwrap(), 9);

	drop(handle);
	assert!(port.is_closed());
	assert_eq!(port.try_send(1), Err(ActorSendError::Closed));
	assert_eq!(port.send(1).await, Err(ActorSendError::Closed));
}

#[test]
fn restart_policy_only_restarts_failures_within_budget() {
	let policy = RestartPolicy::OnFailure {
		max_restarts: 1,
		backoff: Duration::from_millis(5),
	};
	assert_eq!(policy.restart_delay(&ActorExit::Panicked, 0), Some(Duration::from_millis(5)));
	assert_eq!(policy.restart_delay(&ActorExit::Panicked, 1), None);
	assert_eq!(policy.restart_delay(&ActorExit::MailboxClosed, 0), None);
	assert_eq!(RestartPolicy::Never.restart_delay(&ActorExit::Panicked, 0), None);
}

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::TaskClass;
use crate::mailbox::{Mailbox, MailboxReceiver, MailboxSendError, MailboxSender};

mod join_ctrl;

use join_ctrl::JoinCtrl;

/// Continuation directive from one command handling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorFlow {
	Continue,
	Stop,
}

/// Why one actor instance ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorExit {
	/// The handler returned [`ActorFlow::Stop`].
	Stopped,
	/// The mailbox was closed and fully drained.
	MailboxClosed,
	Cancelled,
	StartupFailed(String),
	HandlerFailed(String),
	Panicked,
	JoinFailed(String),
}

impl ActorExit {
	pub fn is_failure(&self) -> bool {
		matches!(self, Self::StartupFailed(_) | Self::HandlerFailed(_) | Self::Panicked | Self::JoinFailed(_))
	}
}

/// Supervisor restart policy.
#[derive(Debug, Clone)]
pub enum RestartPolicy {
	Never,
	/// Restart a fresh instance after a failure, up to `max_restarts` times.
	OnFailure { max_restarts: usize, backoff: Duration },
}

impl RestartPolicy {
	fn restart_delay(&self, exit: &ActorExit, restarts: usize) -> Option<Duration> {
		match self {
			Self::Never => None,
			Self::OnFailure { max_restarts, backoff } => (exit.is_failure() && restarts < *max_restarts).then_some(*backoff),
		}
	}
}

impl Default for RestartPolicy {
	fn default() -> Self {
		Self::OnFailure {
			max_restarts: 3,
			backoff: Duration::from_millis(50),
		}
	}
}

/// Shutdown mode for supervised actors.
#[derive(Debug, Clone, Copy)]
pub enum ShutdownMode {
	/// Cancel the running instance, abandoning queued commands.
	Immediate,
	/// Close the mailbox and let queued commands finish within `timeout`.
	Graceful { timeout: Duration },
}

/// Outcome of [`ActorHandle::shutdown`].
#[derive(Debug, Clone)]
pub struct ShutdownReport {
	completed: bool,
	timed_out: bool,
	last_exit: Option<ActorExit>,
}

impl ShutdownReport {
	pub fn completed(&self) -> bool {
		self.completed
	}

	pub fn timed_out(&self) -> bool {
		self.timed_out
	}

	pub fn last_exit(&self) -> Option<&ActorExit> {
		self.last_exit.as_ref()
	}
}

/// Actor driven by the supervisor, one command at a time.
#[async_trait]
pub trait Actor: Send + 'static {
	type Cmd: Send + 'static;
	type Evt: Clone + Send + 'static;

	/// Runs before the first command of every generation.
	async fn on_start(&mut self, _ctx: &mut ActorContext<Self::Evt>) -> Result<(), String> {
		Ok(())
	}

	async fn on_stop(&mut self, _ctx: &mut ActorContext<Self::Evt>) {}

	async fn handle(&mut self, cmd: Self::Cmd, ctx: &mut ActorContext<Self::Evt>) -> Result<ActorFlow, String>;
}

/// Per-generation context handed to actor callbacks.
pub struct ActorContext<Evt> {
	events: broadcast::Sender<Evt>,
	generation: u64,
	cancel: CancellationToken,
}

impl<Evt> ActorContext<Evt>
where
	Evt: Clone + Send + 'static,
{
	fn new(events: broadcast::Sender<Evt>, generation: u64, cancel: CancellationToken) -> Self {
		Self { events, generation, cancel }
	}

	/// Broadcasts one event to subscribers. Events without subscribers are dropped.
	pub fn emit(&self, evt: Evt) {
		let _ = self.events.send(evt);
	}

	/// Instance number, starting at 1 and bumped on every restart.
	pub fn generation(&self) -> u64 {
		self.generation
	}
}

/// Builder for one supervised actor.
pub struct ActorSpec<A>
where
	A: Actor,
{
	name: String,
	class: TaskClass,
	mailbox_capacity: usize,
	event_buffer: usize,
	restart: RestartPolicy,
	factory: Arc<dyn Fn() -> A + Send + Sync>,
}

impl<A> ActorSpec<A>
where
	A: Actor,
{
	/// Creates a spec; `factory` builds a fresh instance for every generation.
	pub fn new(name: impl Into<String>, class: TaskClass, factory: impl Fn() -> A + Send + Sync + 'static) -> Self {
		Self {
			name: name.into(),
			class,
			mailbox_capacity: 128,
			event_buffer: 64,
			restart: RestartPolicy::default(),
			factory: Arc::new(factory),
		}
	}

	/// # Panics
	///
	/// Panics if `capacity` is zero.
	#[must_use]
	pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
		assert!(capacity > 0, "mailbox capacity must be > 0");
		self.mailbox_capacity = capacity;
		self
	}

	/// # Panics
	///
	/// Panics if `size` is zero.
	#[must_use]
	pub fn event_buffer(mut self, size: usize) -> Self {
		assert!(size > 0, "event buffer size must be > 0");
		self.event_buffer = size;
		self
	}

	#[must_use]
	pub fn restart(mut self, restart: RestartPolicy) -> Self {
		self.restart = restart;
		self
	}
}

/// Error returned when sending to a stopped actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorSendError {
	Closed,
	/// Only returned by [`ActorPort::try_send`].
	Full,
}

impl From<MailboxSendError> for ActorSendError {
	fn from(err: MailboxSendError) -> Self {
		match err {
			MailboxSendError::Closed => Self::Closed,
			MailboxSendError::Full => Self::Full,
		}
	}
}

impl std::fmt::Display for ActorSendError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Closed => write!(f, "actor mailbox closed"),
			Self::Full => write!(f, "actor mailbox full"),
		}
	}
}

impl std::error::Error for ActorSendError {}

/// Cloneable command enqueue port.
///
/// Unlike [`ActorHandle`], dropping a port never stops the actor, so ports
/// can be moved into callbacks owned by other components.
pub struct ActorPort<Cmd> {
	tx: MailboxSender<Cmd>,
}

impl<Cmd> Clone for ActorPort<Cmd> {
	fn clone(&self) -> Self {
		Self { tx: self.tx.clone() }
	}
}

impl<Cmd> ActorPort<Cmd>
where
	Cmd: Send + 'static,
{
	/// Enqueues without waiting.
	pub fn try_send(&self, cmd: Cmd) -> Result<(), ActorSendError> {
		Ok(self.tx.try_send(cmd)?)
	}

	/// Enqueues, waiting for mailbox capacity.
	pub async fn send(&self, cmd: Cmd) -> Result<(), ActorSendError> {
		Ok(self.tx.send(cmd).await?)
	}

	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}
}

struct ActorState {
	generation: AtomicU64,
	restarts: AtomicUsize,
	last_exit: Mutex<Option<ActorExit>>,
}

/// Owning handle for one supervised actor. Dropping it cancels the actor.
pub struct ActorHandle<Cmd, Evt>
where
	Cmd: Send + 'static,
	Evt: Clone + Send + 'static,
{
	name: String,
	tx: MailboxSender<Cmd>,
	events: broadcast::Sender<Evt>,
	cancel: CancellationToken,
	state: Arc<ActorState>,
	join_ctrl: Arc<JoinCtrl>,
}

impl<Cmd, Evt> Drop for ActorHandle<Cmd, Evt>
where
	Cmd: Send + 'static,
	Evt: Clone + Send + 'static,
{
	fn drop(&mut self) {
		self.cancel.cancel();
		self.tx.close();
	}
}

impl<Cmd, Evt> ActorHandle<Cmd, Evt>
where
	Cmd: Send + 'static,
	Evt: Clone + Send + 'static,
{
	/// Generation of the running instance; 0 before the first start.
	pub fn generation(&self) -> u64 {
		self.state.generation.load(Ordering::Acquire)
	}

	pub fn restart_count(&self) -> usize {
		self.state.restarts.load(Ordering::Acquire)
	}

	pub fn subscribe(&self) -> broadcast::Receiver<Evt> {
		self.events.subscribe()
	}

	/// Enqueues one command, waiting for mailbox capacity.
	pub async fn send(&self, cmd: Cmd) -> Result<(), ActorSendError> {
		Ok(self.tx.send(cmd).await?)
	}

	/// Returns a port that enqueues into this actor's mailbox.
	pub fn port(&self) -> ActorPort<Cmd> {
		ActorPort { tx: self.tx.clone() }
	}

	/// Requests cancellation and closes the mailbox.
	pub fn cancel(&self) {
		self.cancel.cancel();
		self.tx.close();
	}

	pub fn last_exit(&self) -> Option<ActorExit> {
		self.state.last_exit.lock().clone()
	}

	pub async fn shutdown(&self, mode: ShutdownMode) -> ShutdownReport {
		match mode {
			ShutdownMode::Immediate => {
				self.cancel();
				self.join_ctrl.join_forever().await;
				ShutdownReport {
					completed: true,
					timed_out: false,
					last_exit: self.last_exit(),
				}
			}
			ShutdownMode::Graceful { timeout } => {
				self.tx.close();
				let completed = self.join_ctrl.join_with_timeout(timeout).await;
				ShutdownReport {
					completed,
					timed_out: !completed,
					last_exit: self.last_exit(),
				}
			}
		}
	}

	/// Tries a graceful shutdown first and cancels if it times out.
	pub async fn shutdown_graceful_or_force(&self, timeout: Duration) -> ShutdownReport {
		let report = self.shutdown(ShutdownMode::Graceful { timeout }).await;
		if report.timed_out() {
			tracing::warn!(actor = %self.name, "graceful shutdown timed out; forcing immediate");
			return self.shutdown(ShutdownMode::Immediate).await;
		}
		report
	}
}

/// Spawns a supervised actor.
pub fn spawn_actor<A>(spec: ActorSpec<A>) -> ActorHandle<A::Cmd, A::Evt>
where
	A: Actor,
{
	let mailbox = Mailbox::new(spec.mailbox_capacity);
	let tx = mailbox.sender();
	let rx = mailbox.receiver();

	let (events, _) = broadcast::channel(spec.event_buffer);
	let cancel = CancellationToken::new();
	let state = Arc::new(ActorState {
		generation: AtomicU64::new(0),
		restarts: AtomicUsize::new(0),
		last_exit: Mutex::new(None),
	});

	let task_state = Arc::clone(&state);
	let task_cancel = cancel.clone();
	let task_events = events.clone();
	let task_name = spec.name.clone();
	let task_class = spec.class;
	let task_factory = Arc::clone(&spec.factory);
	let task_restart = spec.restart.clone();

	let supervisor_task = crate::spawn(task_class, async move {
		let mut restarts = 0usize;
		let mut generation = 0u64;
		loop {
			if task_cancel.is_cancelled() {
				*task_state.last_exit.lock() = Some(ActorExit::Cancelled);
				break;
			}

			generation = generation.wrapping_add(1);
			task_state.generation.store(generation, Ordering::Release);
			let ctx = ActorContext::new(task_events.clone(), generation, task_cancel.child_token());
			let actor = (task_factory)();

			let child = crate::spawn(task_class, run_instance(actor, rx.clone(), ctx));
			let exit = match child.await {
				Ok(exit) => exit,
				Err(err) if err.is_panic() => ActorExit::Panicked,
				Err(err) if err.is_cancelled() => ActorExit::Cancelled,
				Err(err) => ActorExit::JoinFailed(err.to_string()),
			};
			*task_state.last_exit.lock() = Some(exit.clone());

			tracing::debug!(
				actor = %task_name,
				class = task_class.as_str(),
				generation,
				restarts,
				exit = ?exit,
				"worker.actor.exit"
			);

			if task_cancel.is_cancelled() {
				break;
			}
			let Some(backoff) = task_restart.restart_delay(&exit, restarts) else {
				break;
			};

			restarts = restarts.wrapping_add(1);
			task_state.restarts.store(restarts, Ordering::Release);
			tracing::warn!(actor = %task_name, generation, restarts, exit = ?exit, "worker.actor.restart");
			if backoff > Duration::ZERO {
				tokio::select! {
					_ = task_cancel.cancelled() => break,
					_ = tokio::time::sleep(backoff) => {}
				}
			}
		}
	});

	ActorHandle {
		name: spec.name,
		tx,
		events,
		cancel,
		state,
		join_ctrl: Arc::new(JoinCtrl::new(supervisor_task)),
	}
}

async fn run_instance<A>(mut actor: A, rx: MailboxReceiver<A::Cmd>, mut ctx: ActorContext<A::Evt>) -> ActorExit
where
	A: Actor,
{
	let token = ctx.cancel.clone();

	let started = tokio::select! {
		biased;
		_ = token.cancelled() => false,
		res = actor.on_start(&mut ctx) => match res {
			Ok(()) => true,
			Err(err) => return ActorExit::StartupFailed(err),
		},
	};
	if !started {
		return ActorExit::Cancelled;
	}

	let exit = loop {
		let cmd = tokio::select! {
			biased;
			_ = token.cancelled() => break ActorExit::Cancelled,
			msg = rx.recv() => {
				let Some(cmd) = msg else {
					break ActorExit::MailboxClosed;
				};
				cmd
			}
		};

		let flow = tokio::select! {
			biased;
			_ = token.cancelled() => break ActorExit::Cancelled,
			res = actor.handle(cmd, &mut ctx) => res,
		};

		match flow {
			Ok(ActorFlow::Continue) => {}
			Ok(ActorFlow::Stop) => break ActorExit::Stopped,
			Err(err) => break ActorExit::HandlerFailed(err),
		}
	};

	actor.on_stop(&mut ctx).await;
	exit
}

#[cfg(test)]
mod tests;

//! Serialized actor runtime.
//!
//! Every stateful service in the workspace runs as one supervised actor: a
//! single task draining a bounded FIFO [`Mailbox`], so commands are applied in
//! the order they were enqueued and never concurrently.
//!
//! # Invariants
//!
//! - An actor instance handles one command at a time.
//! - Commands leave the mailbox in send order. Nothing is reordered or dropped.
//! - A restarted actor is built fresh from its factory and never sees the
//!   previous generation's state.
//! - Dropping an [`ActorHandle`] cancels the actor; dropping an [`ActorPort`] does not.

mod class;
pub mod mailbox;
mod spawn;
mod supervisor;

pub use class::TaskClass;
pub use mailbox::{Mailbox, MailboxReceiver, MailboxSendError, MailboxSender};
pub use spawn::{spawn, spawn_blocking};
pub use supervisor::{
	Actor, ActorContext, ActorExit, ActorFlow, ActorHandle, ActorPort, ActorSendError, ActorSpec, RestartPolicy, ShutdownMode, ShutdownReport,
	spawn_actor,
};

/// Event stream returned by [`ActorHandle::subscribe`].
pub type ActorEventReceiver<Evt> = tokio::sync::broadcast::Receiver<Evt>;

//! Contact cache and name-resolution service.
//!
//! A [`ContactService`] owns one coordinator actor that holds the published
//! [`CacheSnapshot`](callbook_primitives::CacheSnapshot). Refreshes come from
//! explicit calls or from a [`ChangeNotifier`]; queries are resolved by
//! `callbook-matcher` against whichever snapshot is in effect when the query
//! reaches the front of the mailbox.

pub mod cache;
pub mod candidates;
mod config;
mod coordinator;
mod error;
pub mod notifier;
mod service;
pub mod source;

pub use cache::ContactCache;
pub use candidates::{CallCandidate, CandidateKind, CandidateLabel, CandidateNumber, candidates_for};
pub use config::ServiceConfig;
pub use coordinator::{CacheCmd, CacheEvent};
pub use error::SourceError;
pub use notifier::{ChangeCallback, ChangeNotifier, LocalNotifier, PollingNotifier, Subscription, SubscriptionId};
pub use service::ContactService;
pub use source::{ContactSource, JsonFileSource, StaticSource};

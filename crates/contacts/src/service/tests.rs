use std::time::Duration;

use callbook_primitives::RawContact;
use pretty_assertions::assert_eq;
use tokio::sync::broadcast::error::RecvError;

use super::*;
use crate::notifier::LocalNotifier;
use crate::source::StaticSource;

fn contact(family: &str, given: &str) -> RawContact {
	RawContact::new(family, given).with_phone("mobile", "010-1234-5678")
}

fn names(records: &[ContactRecord]) -> Vec<&str> {
	records.iter().map(ContactRecord::display_name).collect()
}

fn start(contacts: Vec<RawContact>) -> (Arc<StaticSource>, ContactService) {
	let source = Arc::new(StaticSource::new(contacts));
	let service = ContactService::start(source.clone(), ServiceConfig::default());
	(source, service)
}

async fn next_failure(events: &mut ActorEventReceiver<CacheEvent>) -> Option<CacheEvent> {
	tokio::time::timeout(Duration::from_secs(2), async {
		loop {
			match events.recv().await {
				Ok(evt @ CacheEvent::RefreshFailed { .. }) => return Some(evt),
				Ok(_) => continue,
				Err(_) => return None,
			}
		}
	})
	.await
	.ok()
	.flatten()
}

#[tokio::test]
async fn start_publishes_the_first_snapshot_before_any_command() {
	let (_source, service) = start(vec![contact("홍", "길동"), contact("이", ""), RawContact::new("박", "무전화")]);

	let snapshot = service.snapshot().await;
	assert_eq!(snapshot.version(), 1);
	assert_eq!(names(snapshot.records()), ["이", "홍길동"]);
	service.shutdown().await;
}

#[tokio::test]
async fn resolve_prefers_exact_and_falls_back_to_ranked_partial() {
	let (_source, service) = start(vec![contact("김", "철수"), contact("김", "철수부장"), contact("김", "")]);

	let exact = service.resolve(Query::new(["김철수"], MatchHint::AutoFallback)).await;
	assert_eq!(exact.match_type, MatchType::Exact);
	assert_eq!(names(&exact.records), ["김철수"]);

	let partial = service.resolve(Query::new(["김철"], MatchHint::AutoFallback)).await;
	assert_eq!(partial.match_type, MatchType::Partial);
	// Reference length 2: 김철수 scores 1.5, 김 scores 2.0, 김철수부장 scores 2.5.
	assert_eq!(names(&partial.records), ["김철수", "김", "김철수부장"]);

	let strict = service.resolve(Query::new(["김철"], MatchHint::Exact)).await;
	assert_eq!(strict.match_type, MatchType::Exact);
	assert!(strict.is_empty());
	service.shutdown().await;
}

#[tokio::test]
async fn callback_forms_deliver_on_spawned_tasks() {
	let (_source, service) = start(vec![contact("Park", "")]);

	let (tx, rx) = oneshot::channel();
	service.resolve_names(vec!["Park".to_string()], MatchHint::Exact, move |match_type, records| {
		let _ = tx.send((match_type, records.len()));
	});
	assert_eq!(rx.await.unwrap(), (MatchType::Exact, 1));

	let (tx, rx) = oneshot::channel();
	service.get_snapshot(move |snapshot| {
		let _ = tx.send(snapshot.len());
	});
	assert_eq!(rx.await.unwrap(), 1);
	service.shutdown().await;
}

#[tokio::test]
async fn each_query_sees_one_snapshot_around_a_refresh() {
	let (source, service) = start(vec![contact("Lee", "")]);
	assert_eq!(service.snapshot().await.version(), 1);

	source.replace(vec![contact("Lee", ""), contact("Lee", "Jr")]);
	let (before_tx, before_rx) = oneshot::channel();
	let (after_tx, after_rx) = oneshot::channel();
	service
		.port
		.try_send(CacheCmd::Resolve {
			query: Query::new(["Lee"], MatchHint::AutoFallback),
			reply: before_tx,
		})
		.unwrap();
	service.port.try_send(CacheCmd::Refresh).unwrap();
	service
		.port
		.try_send(CacheCmd::Resolve {
			query: Query::new(["LeeJr", "Lee"], MatchHint::AutoFallback),
			reply: after_tx,
		})
		.unwrap();
	let before = before_rx.await.unwrap();
	let after = after_rx.await.unwrap();

	assert_eq!(before.snapshot_version, 1);
	assert_eq!(names(&before.records), ["Lee"]);
	assert_eq!(after.snapshot_version, 2);
	assert_eq!(names(&after.records), ["LeeJr", "Lee"]);
	service.shutdown().await;
}

#[tokio::test]
async fn refreshing_an_unchanged_source_keeps_content() {
	let (_source, service) = start(vec![contact("b", "b"), contact("a", ""), contact("c", "cc")]);
	let first = service.snapshot().await;
	service.refresh_snapshot().await;
	let second = service.snapshot().await;

	assert!(first.same_content(&second));
	assert_eq!(second.version(), first.version() + 1);
	service.shutdown().await;
}

#[tokio::test]
async fn source_failure_publishes_empty_snapshot_and_reports_it() {
	let (source, service) = start(vec![contact("Choi", "")]);
	assert_eq!(service.snapshot().await.len(), 1);
	let mut events = service.subscribe_events();

	source.fail_with("permission revoked");
	service.refresh_snapshot().await;

	let failure = next_failure(&mut events).await;
	assert!(matches!(failure, Some(CacheEvent::RefreshFailed { version: 2, reason }) if reason.contains("permission revoked")));

	let result = service.resolve(Query::new(["Choi"], MatchHint::AutoFallback)).await;
	assert_eq!(result.match_type, MatchType::Partial);
	assert!(result.is_empty());
	service.shutdown().await;
}

#[tokio::test]
async fn change_signal_enqueues_a_refresh() {
	let (source, service) = start(vec![contact("Han", "")]);
	let notifier = Arc::new(LocalNotifier::new());
	service.watch(notifier.clone());
	assert_eq!(service.snapshot().await.len(), 1);

	source.replace(vec![contact("Han", ""), contact("Seo", "")]);
	notifier.notify();

	let snapshot = service.snapshot().await;
	assert_eq!(snapshot.version(), 2);
	assert_eq!(snapshot.len(), 2);
	service.shutdown().await;
}

#[tokio::test]
async fn rewatching_keeps_a_single_live_subscription() {
	let (_source, service) = start(Vec::new());
	let first = Arc::new(LocalNotifier::new());
	let second = Arc::new(LocalNotifier::new());

	service.watch(first.clone());
	service.watch(first.clone());
	assert_eq!(first.subscriber_count(), 1);

	service.watch(second.clone());
	assert_eq!(first.subscriber_count(), 0);
	assert_eq!(second.subscriber_count(), 1);
	assert!(service.is_watching());

	service.unwatch();
	service.unwatch();
	assert_eq!(second.subscriber_count(), 0);
	assert!(!service.is_watching());
	service.shutdown().await;
}

#[tokio::test]
async fn configured_cap_limits_results() {
	let source = Arc::new(StaticSource::new((0..5).map(|idx| contact("Jung", &format!("{idx}"))).collect()));
	let config = ServiceConfig {
		max_recipients: 2,
		..ServiceConfig::default()
	};
	let service = ContactService::start(source, config);

	let result = service.resolve(Query::new(["Jung"], MatchHint::AutoFallback)).await;
	assert_eq!(result.match_type, MatchType::Partial);
	assert_eq!(result.records.len(), 2);
	service.shutdown().await;
}

#[tokio::test]
async fn event_buffer_bounds_what_a_slow_subscriber_keeps() {
	let source = Arc::new(StaticSource::new(vec![contact("Han", "")]));
	let config = ServiceConfig {
		event_buffer: 1,
		..ServiceConfig::default()
	};
	let service = ContactService::start(source, config);
	service.snapshot().await;

	let mut events = service.subscribe_events();
	for _ in 0..3 {
		service.refresh_snapshot().await;
	}
	assert_eq!(service.snapshot().await.version(), 4);

	assert!(matches!(events.recv().await, Err(RecvError::Lagged(2))));
	assert!(matches!(events.recv().await, Ok(CacheEvent::SnapshotPublished { version: 4, len: 1 })));
	service.shutdown().await;
}

#[tokio::test]
async fn stopped_service_answers_empty_and_releases_subscription() {
	let (_source, service) = start(vec![contact("Yoon", "")]);
	let notifier = Arc::new(LocalNotifier::new());
	service.watch(notifier.clone());

	let report = service.shutdown().await;
	assert!(report.completed());
	assert_eq!(notifier.subscriber_count(), 0);

	let result = service.resolve(Query::new(["Yoon"], MatchHint::Exact)).await;
	assert_eq!(result.match_type, MatchType::Exact);
	assert!(result.is_empty());
	assert!(service.snapshot().await.is_empty());
}

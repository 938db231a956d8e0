use time::{
	Duration, OffsetDateTime,
	macros::{date, datetime},
};

use epg_domain::Channel;
use epg_service::Error;

use super::{document, event, memory, memory_service, seed};

#[tokio::test]
async fn document_view_hides_events_past_the_cutoff() {
	let index = memory();
	let now = OffsetDateTime::now_utc();

	seed(
		&index,
		vec![document(
			"series-ep",
			"Episode 12",
			vec![
				event(Channel::Tv3, now - Duration::days(1)),
				event(Channel::Tv3, now + Duration::days(2)),
				event(Channel::Tv3, now + Duration::days(5)),
			],
		)],
	)
	.await;

	let service = memory_service(&index);
	let guest = service.document("series-ep", "guest").await.expect("Guest view failed.");
	let admin = service.document("series-ep", "admin").await.expect("Admin view failed.");

	assert_eq!(guest.title.as_deref(), Some("Episode 12"));
	assert_eq!(guest.events.len(), 2);
	assert_eq!(admin.events.len(), 3);
	assert!(guest.events.iter().all(|event| event.media_id == "series-ep"));
}

#[tokio::test]
async fn unknown_documents_are_not_found() {
	let service = memory_service(&memory());
	let err = service.document("missing", "admin").await.expect_err("Lookup must fail.");

	assert!(matches!(err, Error::NotFound { .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn upserted_documents_are_prepared_for_the_index() {
	let index = memory();
	let service = memory_service(&index);
	let late = datetime!(2024-01-10 22:00 UTC);
	let early = datetime!(2024-01-10 05:00 UTC);

	service
		.upsert_document(document(
			"doc-1",
			"Replay",
			vec![event(Channel::Tv2, late), event(Channel::Tv1, early)],
		))
		.await
		.expect("Upsert failed.");

	assert_eq!(index.document_count(), 1);

	let view = service.document("doc-1", "admin").await.expect("Lookup failed.");
	let starts: Vec<_> = view.events.iter().map(|event| event.start).collect();
	let days: Vec<_> = view.events.iter().map(|event| event.guide_day).collect();

	assert_eq!(starts, vec![early, late]);
	assert_eq!(days, vec![Some(date!(2024 - 01 - 09)), Some(date!(2024 - 01 - 10))]);
	assert!(view.events.iter().all(|event| event.media_id == "doc-1"));

	// A second upsert replaces the first.
	service
		.upsert_document(document("doc-1", "Replay", vec![event(Channel::Tv1, late)]))
		.await
		.expect("Second upsert failed.");

	let view = service.document("doc-1", "admin").await.expect("Lookup failed.");

	assert_eq!(index.document_count(), 1);
	assert_eq!(view.events.len(), 1);
}

#[tokio::test]
async fn duplicate_events_are_rejected_on_upsert() {
	let index = memory();
	let service = memory_service(&index);
	let at = datetime!(2024-01-10 20:00 UTC);
	let err = service
		.upsert_document(document(
			"doc-1",
			"Twice",
			vec![event(Channel::Tv1, at), event(Channel::Tv1, at)],
		))
		.await
		.expect_err("Upsert must be rejected.");

	assert!(matches!(err, Error::InvalidRequest { .. }), "unexpected error: {err:?}");
	assert_eq!(index.document_count(), 0);
}

use std::{
	sync::{Arc, atomic::Ordering},
	time::Duration as StdDuration,
};

use time::{
	Duration, OffsetDateTime,
	macros::{date, datetime},
};

use epg_domain::{Channel, SearchForm, SortOrder, TimeBound};
use epg_service::{CatalogIndex, Error, Indexes, SearchRequest};

use super::{
	FailingSuggestions, FaultyCatalog, build_service, document, event, memory, memory_service,
	seed, starts, test_config,
};

fn request(form: Option<SearchForm>, order: SortOrder, offset: u64, max: u32) -> SearchRequest {
	SearchRequest {
		form,
		order,
		offset,
		max: Some(max),
		profile: None,
		role: "guest".to_string(),
	}
}

fn ids(events: &[epg_domain::Event]) -> Vec<&str> {
	events.iter().map(|event| event.media_id.as_str()).collect()
}

#[tokio::test]
async fn time_range_bounds_are_honored_exactly() {
	let index = memory();
	let from = datetime!(2024-01-10 20:00 UTC);
	let to = from + Duration::HOUR;
	let ms = Duration::MILLISECOND;

	seed(
		&index,
		vec![document(
			"range",
			"Late Show",
			[from - ms, from, from + ms, to - ms, to, to + ms]
				.into_iter()
				.map(|start| event(Channel::Tv1, start))
				.collect(),
		)],
	)
	.await;

	let service = memory_service(&index);
	let inclusive = SearchForm {
		start: Some(TimeBound::inclusive(from)),
		stop: Some(TimeBound::inclusive(to)),
		..SearchForm::default()
	};
	let exclusive = SearchForm {
		start: Some(TimeBound::exclusive(from)),
		stop: Some(TimeBound::exclusive(to)),
		..SearchForm::default()
	};
	let page = service
		.search_schedule(request(Some(inclusive), SortOrder::Asc, 0, 10))
		.await
		.expect("Inclusive search failed.");
	let found: Vec<_> = page.items.iter().map(|event| event.start).collect();

	assert_eq!(found, vec![from, from + ms, to - ms, to]);

	let page = service
		.search_schedule(request(Some(exclusive), SortOrder::Asc, 0, 10))
		.await
		.expect("Exclusive search failed.");
	let found: Vec<_> = page.items.iter().map(|event| event.start).collect();

	assert_eq!(found, vec![from + ms, to - ms]);
}

#[tokio::test]
async fn pages_concatenate_to_the_unpaginated_result() {
	let index = memory();
	let base = datetime!(2024-01-10 06:00 UTC);
	let docs = (0..7_i64)
		.map(|i| {
			let events = (0..3_i64)
				.map(|j| event(Channel::Tv1, base + Duration::minutes(i * 10 + j * 25)))
				.collect();

			document(&format!("media-{i}"), "Rerun", events)
		})
		.collect();

	seed(&index, docs).await;

	let service = memory_service(&index);

	for order in [SortOrder::Asc, SortOrder::Desc] {
		let full = service
			.search_schedule(request(None, order, 0, 1_000))
			.await
			.expect("Unpaginated search failed.");

		assert_eq!(full.items.len(), 21);
		assert_eq!(full.total, Some(7));
		assert!(full.items.windows(2).all(|pair| match order {
			SortOrder::Asc => pair[0].start <= pair[1].start,
			SortOrder::Desc => pair[0].start >= pair[1].start,
		}));

		for max in [1, 2, 3, 5, 8] {
			let mut collected = Vec::new();
			let mut offset = 0;

			loop {
				let page = service
					.search_schedule(request(None, order, offset, max))
					.await
					.expect("Paged search failed.");

				assert!(page.items.len() <= max as usize);

				if page.items.is_empty() {
					break;
				}

				offset += page.items.len() as u64;

				collected.extend(page.items);
			}

			assert_eq!(starts(&collected), starts(&full.items), "order {order:?}, max {max}");
		}
	}
}

#[tokio::test]
async fn restricted_roles_see_only_the_near_schedule() {
	let index = memory();
	let now = OffsetDateTime::now_utc();

	seed(
		&index,
		vec![
			document(
				"near",
				"Tonight",
				vec![
					event(Channel::Tv1, now + Duration::days(1)),
					event(Channel::Tv1, now + Duration::days(2)),
				],
			),
			document(
				"far",
				"Next Week",
				vec![
					event(Channel::Tv2, now + Duration::days(4)),
					event(Channel::Tv2, now + Duration::days(10)),
				],
			),
		],
	)
	.await;

	let service = memory_service(&index);

	for order in [SortOrder::Asc, SortOrder::Desc] {
		let guest = service
			.search_schedule(request(None, order, 0, 10))
			.await
			.expect("Guest search failed.");

		assert_eq!(ids(&guest.items), vec!["near", "near"]);

		let admin = service
			.search_schedule(SearchRequest { role: "Admin".to_string(), ..request(None, order, 0, 10) })
			.await
			.expect("Admin search failed.");

		assert_eq!(admin.items.len(), 4);
	}
}

#[tokio::test]
async fn events_must_satisfy_every_dimension_themselves() {
	let index = memory();

	seed(
		&index,
		vec![
			document(
				"split",
				"Morning And Evening",
				vec![
					event(Channel::Tv1, datetime!(2024-01-10 08:00 UTC)),
					event(Channel::Tv2, datetime!(2024-01-10 20:00 UTC)),
				],
			),
			document("hit", "Evening", vec![event(Channel::Tv1, datetime!(2024-01-10 19:30 UTC))]),
		],
	)
	.await;

	let service = memory_service(&index);
	let form = SearchForm {
		channels: vec![Channel::Tv1],
		start: Some(TimeBound::inclusive(datetime!(2024-01-10 19:00 UTC))),
		stop: Some(TimeBound::inclusive(datetime!(2024-01-10 21:00 UTC))),
		..SearchForm::default()
	};
	let page = service
		.search_schedule(request(Some(form), SortOrder::Asc, 0, 10))
		.await
		.expect("Search failed.");

	// Both documents match at the index level; only one event satisfies the whole form.
	assert_eq!(ids(&page.items), vec!["hit"]);
	assert_eq!(page.total, Some(2));
}

#[tokio::test]
async fn guide_day_groups_early_hours_with_the_previous_day() {
	let index = memory();

	seed(
		&index,
		vec![document(
			"night",
			"Night Owls",
			vec![
				event(Channel::Radio1, datetime!(2024-01-10 05:30 UTC)),
				event(Channel::Radio1, datetime!(2024-01-10 23:00 UTC)),
				event(Channel::Radio1, datetime!(2024-01-11 05:30 UTC)),
				event(Channel::Radio1, datetime!(2024-01-11 06:00 UTC)),
			],
		)],
	)
	.await;

	let service = memory_service(&index);
	let form = SearchForm { guide_day: Some(date!(2024 - 01 - 10)), ..SearchForm::default() };
	let page = service
		.search_schedule(request(Some(form), SortOrder::Asc, 0, 10))
		.await
		.expect("Search failed.");
	let found: Vec<_> = page.items.iter().map(|event| event.start).collect();

	assert_eq!(found, vec![datetime!(2024-01-10 23:00 UTC), datetime!(2024-01-11 05:30 UTC)]);
}

#[tokio::test]
async fn failed_count_leaves_total_unknown() {
	let index = memory();

	seed(&index, vec![document("a", "A", vec![event(Channel::Tv1, datetime!(2024-01-10 20:00 UTC))])])
		.await;

	let service =
		FaultyCatalog { fail_count: true, ..FaultyCatalog::new(index) }.into_service(test_config());
	let page = service
		.search_schedule(request(None, SortOrder::Asc, 0, 10))
		.await
		.expect("Search must survive a failed count.");

	assert_eq!(page.items.len(), 1);
	assert_eq!(page.total, None);
}

#[tokio::test]
async fn unreachable_index_is_a_retrieval_failure() {
	let service =
		FaultyCatalog { fail_fetch: true, ..FaultyCatalog::new(memory()) }.into_service(test_config());
	let err = service
		.search_schedule(request(None, SortOrder::Asc, 0, 10))
		.await
		.expect_err("Search must fail.");

	assert!(matches!(err, Error::Retrieval { .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn slow_index_times_out() {
	let mut cfg = test_config();

	cfg.index.query_timeout_ms = 20;

	let service = FaultyCatalog {
		delay: Some(StdDuration::from_millis(500)),
		..FaultyCatalog::new(memory())
	}
	.into_service(cfg);
	let err = service
		.search_schedule(request(None, SortOrder::Asc, 0, 10))
		.await
		.expect_err("Search must time out.");

	assert!(matches!(err, Error::Retrieval { .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn malformed_documents_are_skipped() {
	let index = memory();
	let at = datetime!(2024-01-10 20:00 UTC);

	seed(
		&index,
		vec![
			document("a", "A", vec![event(Channel::Tv1, at)]),
			document("bad", "B", vec![event(Channel::Tv1, at + Duration::MINUTE)]),
			document("c", "C", vec![event(Channel::Tv1, at + Duration::HOUR)]),
		],
	)
	.await;

	let service = FaultyCatalog { corrupt: Some("bad".to_string()), ..FaultyCatalog::new(index) }
		.into_service(test_config());
	let page = service
		.search_schedule(request(None, SortOrder::Asc, 0, 10))
		.await
		.expect("Search failed.");

	assert_eq!(ids(&page.items), vec!["a", "c"]);
}

#[tokio::test]
async fn full_pages_stop_paging_the_index() {
	let index = memory();
	let base = datetime!(2024-01-10 06:00 UTC);

	seed(
		&index,
		(0..50_i64)
			.map(|i| {
				document(
					&format!("media-{i:02}"),
					"Bulletin",
					vec![event(Channel::Tv1, base + Duration::minutes(i))],
				)
			})
			.collect(),
	)
	.await;

	let mut cfg = test_config();

	cfg.search.fetch_floor = 5;

	let catalog = FaultyCatalog::new(index);
	let fetches = catalog.fetches.clone();
	let service = catalog.into_service(cfg);
	let first = service
		.search_schedule(request(None, SortOrder::Asc, 0, 5))
		.await
		.expect("Search failed.");

	assert_eq!(ids(&first.items), vec!["media-00", "media-01", "media-02", "media-03", "media-04"]);
	assert_eq!(fetches.load(Ordering::SeqCst), 1);

	fetches.store(0, Ordering::SeqCst);

	let second = service
		.search_schedule(request(None, SortOrder::Asc, 5, 5))
		.await
		.expect("Search failed.");

	assert_eq!(ids(&second.items), vec!["media-05", "media-06", "media-07", "media-08", "media-09"]);
	assert_eq!(fetches.load(Ordering::SeqCst), 2);
	assert_eq!(second.total, Some(50));
}

#[tokio::test]
async fn zero_max_only_counts() {
	let index = memory();

	seed(&index, vec![document("a", "A", vec![event(Channel::Tv1, datetime!(2024-01-10 20:00 UTC))])])
		.await;

	let catalog = FaultyCatalog::new(index);
	let fetches = catalog.fetches.clone();
	let service = catalog.into_service(test_config());
	let page = service
		.search_schedule(request(None, SortOrder::Asc, 0, 0))
		.await
		.expect("Search failed.");

	assert!(page.items.is_empty());
	assert_eq!(page.total, Some(1));
	assert_eq!(fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oversized_pages_are_rejected() {
	let service = memory_service(&memory());
	let err = service
		.search_schedule(request(None, SortOrder::Asc, 0, 1_001))
		.await
		.expect_err("Search must be rejected.");

	assert!(matches!(err, Error::InvalidRequest { .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn contradictory_forms_are_rejected() {
	let service = memory_service(&memory());
	let form = SearchForm {
		guide_day: Some(date!(2024 - 01 - 10)),
		start: Some(TimeBound::inclusive(datetime!(2024-01-10 06:00 UTC))),
		..SearchForm::default()
	};
	let err = service
		.search_schedule(request(Some(form), SortOrder::Asc, 0, 10))
		.await
		.expect_err("Search must be rejected.");

	assert!(matches!(err, Error::InvalidRequest { .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn first_page_searches_are_remembered_as_suggestions() {
	let index = memory();

	seed(
		&index,
		vec![document("jazz", "Jazz Night", vec![event(Channel::Radio2, datetime!(2024-01-10 21:00 UTC))])],
	)
	.await;

	let service = memory_service(&index);
	let form = SearchForm { text: Some(" Jazz ".to_string()), ..SearchForm::default() };
	let page = service
		.search_schedule(SearchRequest {
			profile: Some("radio".to_string()),
			..request(Some(form), SortOrder::Asc, 0, 10)
		})
		.await
		.expect("Search failed.");

	assert_eq!(ids(&page.items), vec!["jazz"]);
	assert!(super::wait_until(|| !index.suggestion_entries().is_empty()).await);

	let entries = index.suggestion_entries();

	assert_eq!(entries.len(), 1);
	assert_eq!(entries[0].text, "Jazz");
	assert_eq!(entries[0].input, "radio|Jazz");
	assert_eq!(entries[0].profile.as_deref(), Some("radio"));
}

#[tokio::test]
async fn failed_captures_leave_the_page_untouched() {
	let index = memory();

	seed(
		&index,
		vec![document("jazz", "Jazz Night", vec![event(Channel::Radio2, datetime!(2024-01-10 21:00 UTC))])],
	)
	.await;

	for panics in [false, true] {
		let store = Arc::new(FailingSuggestions::new(panics));
		let upserts = Arc::clone(&store.upserts);
		let catalog: Arc<dyn CatalogIndex> = index.clone();
		let service = build_service(test_config(), Indexes::new(catalog, store));
		let form = SearchForm { text: Some("jazz".to_string()), ..SearchForm::default() };
		let page = service
			.search_schedule(SearchRequest {
				profile: Some("radio".to_string()),
				..request(Some(form), SortOrder::Asc, 0, 10)
			})
			.await
			.expect("Search must not depend on suggestion capture.");

		assert_eq!(ids(&page.items), vec!["jazz"]);
		assert_eq!(page.total, Some(1));
		assert!(super::wait_until(|| upserts.load(Ordering::SeqCst) >= 1).await);

		// The service keeps answering once the capture task has failed.
		let again = service
			.search_schedule(request(None, SortOrder::Asc, 0, 10))
			.await
			.expect("Follow-up search failed.");

		assert_eq!(ids(&again.items), vec!["jazz"]);
	}
}

#[tokio::test]
async fn later_pages_and_textless_searches_are_not_remembered() {
	let index = memory();
	let at = datetime!(2024-01-10 21:00 UTC);

	seed(
		&index,
		vec![document(
			"jazz",
			"Jazz Night",
			vec![event(Channel::Radio2, at), event(Channel::Radio2, at + Duration::DAY)],
		)],
	)
	.await;

	let service = memory_service(&index);
	let with_text = SearchForm { text: Some("jazz".to_string()), ..SearchForm::default() };
	let without_text = SearchForm { channels: vec![Channel::Radio2], ..SearchForm::default() };
	let later = service
		.search_schedule(request(Some(with_text), SortOrder::Asc, 1, 10))
		.await
		.expect("Search failed.");
	let textless = service
		.search_schedule(request(Some(without_text), SortOrder::Asc, 0, 10))
		.await
		.expect("Search failed.");

	assert_eq!(later.items.len(), 1);
	assert_eq!(textless.items.len(), 2);

	tokio::time::sleep(StdDuration::from_millis(50)).await;

	assert!(index.suggestion_entries().is_empty());
}

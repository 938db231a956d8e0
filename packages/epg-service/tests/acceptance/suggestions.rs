use std::sync::Arc;

use epg_service::{Error, Indexes, SuggestRequest};

use super::{MissingSuggestions, build_service, memory, memory_service, test_config};

fn request(text: &str, profile: Option<&str>, max: u32) -> SuggestRequest {
	SuggestRequest { text: text.to_string(), profile: profile.map(str::to_string), max: Some(max) }
}

#[tokio::test]
async fn closest_completions_rank_first() {
	let index = memory();
	let service = memory_service(&index);

	for text in ["appelflap", "appels", "appel"] {
		service.record_suggestion(text, None).await.expect("Record failed.");
	}

	let found = service.suggest(request("appel", None, 10)).await.expect("Suggest failed.");

	assert_eq!(found.items, vec!["appel", "appels", "appelflap"]);
	assert_eq!(found.total, Some(3));

	let capped = service.suggest(request("appel", None, 2)).await.expect("Suggest failed.");

	assert_eq!(capped.items, vec!["appel", "appels"]);
	assert_eq!(capped.total, Some(3));
}

#[tokio::test]
async fn suggestions_stay_within_their_profile() {
	let index = memory();
	let service = memory_service(&index);

	service.record_suggestion("jazz", Some("radio")).await.expect("Record failed.");

	let radio = service.suggest(request("jaz", Some("radio"), 10)).await.expect("Suggest failed.");
	let anonymous = service.suggest(request("jaz", None, 10)).await.expect("Suggest failed.");
	let tv = service.suggest(request("jaz", Some("tv"), 10)).await.expect("Suggest failed.");

	assert_eq!(radio.items, vec!["jazz"]);
	assert!(anonymous.items.is_empty());
	assert!(tv.items.is_empty());
}

#[tokio::test]
async fn profile_case_does_not_leak_completion_keys() {
	let index = memory();
	let service = memory_service(&index);

	service.record_suggestion("jazz", Some("radio")).await.expect("Record failed.");

	let upper = service.suggest(request("jaz", Some("Radio"), 10)).await.expect("Suggest failed.");
	let shouting =
		service.suggest(request("JAZ", Some("RADIO"), 10)).await.expect("Suggest failed.");

	assert_eq!(upper.items, vec!["jazz"]);
	assert_eq!(shouting.items, vec!["jazz"]);
}

#[tokio::test]
async fn anonymous_lookups_skip_profiled_entries() {
	let index = memory();
	let service = memory_service(&index);

	service.record_suggestion("jazz", Some("radio")).await.expect("Record failed.");
	service.record_suggestion("radar love", None).await.expect("Record failed.");

	let found = service.suggest(request("rad", None, 10)).await.expect("Suggest failed.");

	assert_eq!(found.items, vec!["radar love"]);
	assert_eq!(found.total, Some(1));
}

#[tokio::test]
async fn blank_profiles_behave_like_no_profile() {
	let index = memory();
	let service = memory_service(&index);

	service.record_suggestion("Journaal", Some("  ")).await.expect("Record failed.");

	let found = service.suggest(request("jour", None, 10)).await.expect("Suggest failed.");
	let blank = service.suggest(request("jour", Some(""), 10)).await.expect("Suggest failed.");

	assert_eq!(found.items, vec!["Journaal"]);
	assert_eq!(blank.items, vec!["Journaal"]);
	assert_eq!(index.suggestion_entries()[0].profile, None);
}

#[tokio::test]
async fn recording_twice_keeps_one_entry() {
	let index = memory();
	let service = memory_service(&index);

	service.record_suggestion("Nieuwsuur", None).await.expect("Record failed.");

	let first = index.suggestion_entries()[0].sort_date;

	service.record_suggestion("nieuwsuur", None).await.expect("Record failed.");

	let entries = index.suggestion_entries();

	assert_eq!(entries.len(), 1);
	assert!(entries[0].sort_date >= first);
}

#[tokio::test]
async fn blank_input_suggests_nothing() {
	let index = memory();
	let service = memory_service(&index);

	service.record_suggestion("jazz", None).await.expect("Record failed.");

	let found = service.suggest(request("   ", None, 10)).await.expect("Suggest failed.");

	assert!(found.items.is_empty());

	let err = service.record_suggestion("  ", None).await.expect_err("Record must be rejected.");

	assert!(matches!(err, Error::InvalidRequest { .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn missing_suggestion_index_suggests_nothing() {
	let service =
		build_service(test_config(), Indexes::new(memory(), Arc::new(MissingSuggestions)));
	let found = service.suggest(request("jazz", None, 10)).await.expect("Suggest failed.");

	assert!(found.items.is_empty());
	assert_eq!(found.total, None);
}

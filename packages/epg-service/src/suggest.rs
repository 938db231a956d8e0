use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use epg_domain::{
	Suggestions,
	suggestion::{self, SuggestionEntry},
};

use crate::{EpgService, Error, Result, SuggestionIndex, bounded};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestRequest {
	pub text: String,
	#[serde(default)]
	pub profile: Option<String>,
	#[serde(default)]
	pub max: Option<u32>,
}

impl EpgService {
	/// Previously searched texts starting with `req.text`, closest first.
	pub async fn suggest(&self, req: SuggestRequest) -> Result<Suggestions> {
		let text = req.text.trim();
		let max = req.max.unwrap_or(self.cfg.suggestions.default_max);

		if text.is_empty() || max == 0 {
			return Ok(Suggestions::default());
		}

		let profile = suggestion::effective_profile(req.profile.as_deref());
		let key = suggestion::completion_key(text, profile);
		let size = max.max(self.cfg.suggestions.candidate_pool);
		let Some(inputs) = bounded(
			self.query_timeout(),
			"suggestion lookup",
			self.indexes.suggestions.complete(&key, size),
		)
		.await?
		else {
			tracing::debug!("Suggestion index is missing. Returning no suggestions.");

			return Ok(Suggestions::default());
		};
		// Without a profile the prefix also matches `profile|...` keys of other profiles.
		let candidates: Vec<String> = inputs
			.iter()
			.filter(|input| profile.is_some() || !input.contains(suggestion::PROFILE_SEPARATOR))
			.map(|input| suggestion::strip_profile(input, profile).to_string())
			.collect();
		let total = candidates.len() as u64;
		let mut items = rank_by_distance(text, candidates);

		items.truncate(max as usize);

		Ok(Suggestions { items, total: Some(total) })
	}

	/// Remembers `text` for `profile`, refreshing the entry if it already exists.
	pub async fn record_suggestion(&self, text: &str, profile: Option<&str>) -> Result<()> {
		if text.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "suggestion text must not be empty.".to_string(),
			});
		}

		let entry = SuggestionEntry::new(text, profile, OffsetDateTime::now_utc());

		record_entry(self.indexes.suggestions.as_ref(), &entry, self.query_timeout()).await
	}
}

pub(crate) async fn record_entry(
	index: &dyn SuggestionIndex,
	entry: &SuggestionEntry,
	timeout: Duration,
) -> Result<()> {
	bounded(timeout, "suggestion record", index.upsert_entry(entry)).await
}

/// Stable sort by edit distance to `input`, ignoring case.
pub fn rank_by_distance(input: &str, candidates: Vec<String>) -> Vec<String> {
	let input = input.to_lowercase();
	let mut scored: Vec<_> = candidates
		.into_iter()
		.map(|candidate| (levenshtein_distance(&input, &candidate.to_lowercase()), candidate))
		.collect();

	scored.sort_by_key(|(distance, _)| *distance);

	scored.into_iter().map(|(_, candidate)| candidate).collect()
}

fn levenshtein_distance(a: &str, b: &str) -> usize {
	let a: Vec<char> = a.chars().collect();
	let b: Vec<char> = b.chars().collect();

	if a.is_empty() {
		return b.len();
	}
	if b.is_empty() {
		return a.len();
	}

	let mut prev: Vec<usize> = (0..=b.len()).collect();
	let mut curr = vec![0; b.len() + 1];

	for (i, a_char) in a.iter().enumerate() {
		curr[0] = i + 1;

		for (j, b_char) in b.iter().enumerate() {
			let cost = usize::from(a_char != b_char);

			curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
		}

		std::mem::swap(&mut prev, &mut curr);
	}

	prev[b.len()]
}

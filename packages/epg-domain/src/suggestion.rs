use time::OffsetDateTime;
use unicode_normalization::UnicodeNormalization;

/// Joins a profile and the query text in a completion key.
pub const PROFILE_SEPARATOR: char = '|';

/// A remembered search term. Re-recording the same term replaces the entry, which is how its
/// sort date is refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionEntry {
	pub id: String,
	/// Completion input, `profile|text` or plain `text`.
	pub input: String,
	pub text: String,
	pub profile: Option<String>,
	pub sort_date: OffsetDateTime,
}
impl SuggestionEntry {
	pub fn new(text: &str, profile: Option<&str>, sort_date: OffsetDateTime) -> Self {
		let profile = effective_profile(profile);
		let text = text.trim().to_string();

		Self {
			id: suggestion_id(&text, profile),
			input: completion_key(&text, profile),
			text,
			profile: profile.map(str::to_string),
			sort_date,
		}
	}
}

/// Blank profiles behave exactly like an absent profile.
pub fn effective_profile(profile: Option<&str>) -> Option<&str> {
	profile.map(str::trim).filter(|profile| !profile.is_empty())
}

pub fn completion_key(text: &str, profile: Option<&str>) -> String {
	match effective_profile(profile) {
		Some(profile) => format!("{profile}{PROFILE_SEPARATOR}{text}"),
		None => text.to_string(),
	}
}

/// Recovers the suggested text from a completion candidate.
pub fn strip_profile<'a>(candidate: &'a str, profile: Option<&str>) -> &'a str {
	let Some(profile) = effective_profile(profile) else {
		return candidate;
	};

	// Completion compares keys case-insensitively, so the prefix must be matched the same way.
	let Some((head, rest)) = candidate.split_at_checked(profile.len()) else {
		return candidate;
	};

	if head.to_lowercase() != profile.to_lowercase() {
		return candidate;
	}

	rest.strip_prefix(PROFILE_SEPARATOR).unwrap_or(candidate)
}

pub fn normalize_text(text: &str) -> String {
	let composed: String = text.nfkc().collect();

	composed.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

pub fn suggestion_id(text: &str, profile: Option<&str>) -> String {
	let mut hasher = blake3::Hasher::new();

	hasher.update(effective_profile(profile).unwrap_or_default().as_bytes());
	hasher.update(&[0]);
	hasher.update(normalize_text(text).as_bytes());

	hasher.finalize().to_hex().to_string()
}

use serde_json::Value;
use time::OffsetDateTime;

/// One document returned by a catalog fetch, in sort order.
#[derive(Debug, sqlx::FromRow)]
pub struct CatalogRow {
	pub doc_id: String,
	pub sort_key: Option<OffsetDateTime>,
	pub body: Value,
}

#[derive(Debug, sqlx::FromRow)]
pub struct SuggestionRow {
	pub suggestion_id: String,
	pub input: String,
	pub text: String,
	pub profile: Option<String>,
	pub sort_date: OffsetDateTime,
}

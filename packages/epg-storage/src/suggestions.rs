use sqlx::PgExecutor;
use time::OffsetDateTime;

use epg_domain::SuggestionEntry;

use crate::{Error, Result, db::Tables, models::SuggestionRow};

const UNDEFINED_TABLE: &str = "42P01";

pub async fn upsert_suggestion<'e, E>(
	executor: E,
	tables: &Tables,
	entry: &SuggestionEntry,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(&format!(
		"\
INSERT INTO {suggestions} (suggestion_id, input, text, profile, sort_date)
VALUES ($1,$2,$3,$4,$5)
ON CONFLICT (suggestion_id) DO UPDATE
SET
\tinput = EXCLUDED.input,
\ttext = EXCLUDED.text,
\tprofile = EXCLUDED.profile,
\tsort_date = EXCLUDED.sort_date",
		suggestions = tables.suggestions,
	))
	.bind(entry.id.as_str())
	.bind(entry.input.as_str())
	.bind(entry.text.as_str())
	.bind(entry.profile.as_deref())
	.bind(entry.sort_date)
	.execute(executor)
	.await?;

	Ok(())
}

/// Completion inputs starting with `prefix`, compared case-insensitively, most recent first.
///
/// Returns `None` when the suggestion table does not exist.
pub async fn complete<'e, E>(
	executor: E,
	tables: &Tables,
	prefix: &str,
	size: u32,
) -> Result<Option<Vec<String>>>
where
	E: PgExecutor<'e>,
{
	let pattern = format!("{}%", escape_like(&prefix.to_lowercase()));
	let result = sqlx::query_scalar::<_, String>(&format!(
		"\
SELECT input
FROM {suggestions}
WHERE lower(input) LIKE $1 ESCAPE '\\'
ORDER BY sort_date DESC, input ASC
LIMIT $2",
		suggestions = tables.suggestions,
	))
	.bind(pattern)
	.bind(i64::from(size))
	.fetch_all(executor)
	.await;

	match result {
		Ok(inputs) => Ok(Some(inputs)),
		Err(sqlx::Error::Database(err)) if err.code().as_deref() == Some(UNDEFINED_TABLE) =>
			Ok(None),
		Err(err) => Err(Error::Sqlx(err)),
	}
}

pub async fn get_suggestion<'e, E>(
	executor: E,
	tables: &Tables,
	suggestion_id: &str,
) -> Result<Option<SuggestionRow>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, SuggestionRow>(&format!(
		"\
SELECT suggestion_id, input, text, profile, sort_date
FROM {suggestions}
WHERE suggestion_id = $1",
		suggestions = tables.suggestions,
	))
	.bind(suggestion_id)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

/// Deletes every entry whose sort date is at or before `cutoff` and returns how many went.
pub async fn delete_before<'e, E>(executor: E, tables: &Tables, cutoff: OffsetDateTime) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(&format!(
		"DELETE FROM {suggestions} WHERE sort_date <= $1",
		suggestions = tables.suggestions,
	))
	.bind(cutoff)
	.execute(executor)
	.await?;

	Ok(result.rows_affected())
}

fn escape_like(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());

	for c in raw.chars() {
		if matches!(c, '\\' | '%' | '_') {
			out.push('\\');
		}

		out.push(c);
	}

	out
}

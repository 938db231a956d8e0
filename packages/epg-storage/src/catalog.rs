//! Catalog documents and their flattened event rows.
//!
//! Each document is stored once as its JSON body plus the columns the query translator filters on.
//! Event-scoped predicates become `EXISTS` subqueries over the event table, one per leaf, so a
//! conjunction may be satisfied by different events of the same document.

use sqlx::{PgConnection, PgExecutor, Postgres, QueryBuilder};
use time::OffsetDateTime;

use epg_domain::{CatalogDocument, IndexQuery, SortOrder, Term};

use crate::{Result, db::Tables, models::CatalogRow};

/// Replaces a document and all of its event rows. Run it inside a transaction.
pub async fn upsert_document(
	conn: &mut PgConnection,
	tables: &Tables,
	doc: &CatalogDocument,
) -> Result<()> {
	let body = doc.to_source()?;
	let now = OffsetDateTime::now_utc();

	sqlx::query(&format!(
		"\
INSERT INTO {catalog} (
\tdoc_id,
\tmedia_type,
\ttitle,
\tancestors,
\tbroadcasters,
\tfirst_start,
\tlast_start,
\tbody,
\tupdated_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
ON CONFLICT (doc_id) DO UPDATE
SET
\tmedia_type = EXCLUDED.media_type,
\ttitle = EXCLUDED.title,
\tancestors = EXCLUDED.ancestors,
\tbroadcasters = EXCLUDED.broadcasters,
\tfirst_start = EXCLUDED.first_start,
\tlast_start = EXCLUDED.last_start,
\tbody = EXCLUDED.body,
\tupdated_at = EXCLUDED.updated_at",
		catalog = tables.catalog,
	))
	.bind(doc.id.as_str())
	.bind(doc.media_type.as_str())
	.bind(doc.title.as_deref())
	.bind(&doc.ancestors)
	.bind(&doc.broadcasters)
	.bind(doc.first_start())
	.bind(doc.last_start())
	.bind(&body)
	.bind(now)
	.execute(&mut *conn)
	.await?;

	sqlx::query(&format!("DELETE FROM {events} WHERE doc_id = $1", events = tables.events))
		.bind(doc.id.as_str())
		.execute(&mut *conn)
		.await?;

	let insert = format!(
		"\
INSERT INTO {events} (doc_id, channel, net, start_at, duration_ms, guide_day)
VALUES ($1,$2,$3,$4,$5,$6)",
		events = tables.events,
	);

	for event in &doc.events {
		sqlx::query(&insert)
			.bind(doc.id.as_str())
			.bind(event.channel.as_str())
			.bind(event.net.as_deref())
			.bind(event.start)
			.bind(event.duration_ms)
			.bind(event.guide_day)
			.execute(&mut *conn)
			.await?;
	}

	Ok(())
}

/// Documents matching `query`, ordered by their sort key and then by id.
///
/// The sort key is the earliest event start for ascending order and the latest one for descending
/// order. Documents without events come last either way.
pub async fn fetch_documents<'e, E>(
	executor: E,
	tables: &Tables,
	query: &IndexQuery,
	order: SortOrder,
	from: u64,
	size: u32,
) -> Result<Vec<CatalogRow>>
where
	E: PgExecutor<'e>,
{
	let (key, direction) = match order {
		SortOrder::Asc => ("first_start", "ASC"),
		SortOrder::Desc => ("last_start", "DESC"),
	};
	let mut builder = QueryBuilder::<Postgres>::new(format!(
		"SELECT d.doc_id, d.{key} AS sort_key, d.body FROM {catalog} d WHERE ",
		catalog = tables.catalog,
	));

	push_query(&mut builder, query, tables);
	builder.push(format!(" ORDER BY d.{key} {direction} NULLS LAST, d.doc_id ASC LIMIT "));
	builder.push_bind(i64::from(size));
	builder.push(" OFFSET ");
	builder.push_bind(i64::try_from(from).unwrap_or(i64::MAX));

	let rows = builder.build_query_as::<CatalogRow>().fetch_all(executor).await?;

	Ok(rows)
}

pub async fn count_documents<'e, E>(executor: E, tables: &Tables, query: &IndexQuery) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let mut builder = QueryBuilder::<Postgres>::new(format!(
		"SELECT count(*) FROM {catalog} d WHERE ",
		catalog = tables.catalog,
	));

	push_query(&mut builder, query, tables);

	let count: i64 = builder.build_query_scalar::<i64>().fetch_one(executor).await?;

	Ok(u64::try_from(count).unwrap_or_default())
}

/// Appends `query` as a boolean SQL expression over the catalog alias `d`.
pub fn push_query(builder: &mut QueryBuilder<'_, Postgres>, query: &IndexQuery, tables: &Tables) {
	match query {
		IndexQuery::MatchAll => {
			builder.push("TRUE");
		},
		IndexQuery::And(clauses) => push_group(builder, clauses, " AND ", "TRUE", tables),
		IndexQuery::Or(clauses) => push_group(builder, clauses, " OR ", "FALSE", tables),
		IndexQuery::Term(term) => push_term(builder, term, tables),
		IndexQuery::StartRange { from, to } => {
			push_event_exists(builder, tables);

			if let Some(from) = from {
				builder.push(" AND e.start_at >= ");
				builder.push_bind(*from);
			}
			if let Some(to) = to {
				builder.push(" AND e.start_at <= ");
				builder.push_bind(*to);
			}

			builder.push(")");
		},
		IndexQuery::TitleContains(text) => {
			builder.push("(d.title IS NOT NULL AND strpos(lower(d.title), ");
			builder.push_bind(text.trim().to_lowercase());
			builder.push(") > 0)");
		},
	}
}

fn push_group(
	builder: &mut QueryBuilder<'_, Postgres>,
	clauses: &[IndexQuery],
	separator: &str,
	empty: &str,
	tables: &Tables,
) {
	if clauses.is_empty() {
		builder.push(empty);

		return;
	}

	builder.push("(");

	for (idx, clause) in clauses.iter().enumerate() {
		if idx > 0 {
			builder.push(separator);
		}

		push_query(builder, clause, tables);
	}

	builder.push(")");
}

fn push_term(builder: &mut QueryBuilder<'_, Postgres>, term: &Term, tables: &Tables) {
	match term {
		Term::Id(id) => {
			builder.push("d.doc_id = ");
			builder.push_bind(id.clone());
		},
		Term::Channel(channel) => {
			push_event_exists(builder, tables);
			builder.push(" AND e.channel = ");
			builder.push_bind(channel.as_str());
			builder.push(")");
		},
		Term::Net(net) => {
			push_event_exists(builder, tables);
			builder.push(" AND e.net = ");
			builder.push_bind(net.clone());
			builder.push(")");
		},
		Term::Broadcaster(broadcaster) => {
			builder.push_bind(broadcaster.clone());
			builder.push(" = ANY(d.broadcasters)");
		},
		Term::MediaType(media_type) => {
			builder.push("d.media_type = ");
			builder.push_bind(media_type.as_str());
		},
		Term::Ancestor(ancestor) => {
			builder.push_bind(ancestor.clone());
			builder.push(" = ANY(d.ancestors)");
		},
		Term::GuideDay(day) => {
			push_event_exists(builder, tables);
			builder.push(" AND e.guide_day = ");
			builder.push_bind(*day);
			builder.push(")");
		},
	}
}

/// Opens `EXISTS (... WHERE e.doc_id = d.doc_id`; the caller appends conditions and closes it.
fn push_event_exists(builder: &mut QueryBuilder<'_, Postgres>, tables: &Tables) {
	builder.push(format!(
		"EXISTS (SELECT 1 FROM {events} e WHERE e.doc_id = d.doc_id",
		events = tables.events,
	));
}

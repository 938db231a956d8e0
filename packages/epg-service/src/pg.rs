use time::OffsetDateTime;

use epg_domain::{CatalogDocument, IndexQuery, SortOrder, SuggestionEntry};
use epg_storage::{catalog, db::Db, suggestions};

use crate::{BoxFuture, CatalogHit, CatalogIndex, Error, Result, SuggestionIndex};

/// PostgreSQL-backed catalog and suggestion index.
pub struct PgIndex {
	db: Db,
}
impl PgIndex {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	pub fn db(&self) -> &Db {
		&self.db
	}
}

impl CatalogIndex for PgIndex {
	fn fetch<'a>(
		&'a self,
		query: &'a IndexQuery,
		order: SortOrder,
		from: u64,
		size: u32,
	) -> BoxFuture<'a, Result<Vec<CatalogHit>>> {
		Box::pin(async move {
			let rows =
				catalog::fetch_documents(&self.db.pool, &self.db.tables, query, order, from, size)
					.await
					.map_err(Error::retrieval)?;

			Ok(rows
				.into_iter()
				.map(|row| CatalogHit { id: row.doc_id, sort_key: row.sort_key, source: row.body })
				.collect())
		})
	}

	fn count<'a>(&'a self, query: &'a IndexQuery) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			catalog::count_documents(&self.db.pool, &self.db.tables, query)
				.await
				.map_err(Error::retrieval)
		})
	}

	fn upsert_document<'a>(&'a self, doc: &'a CatalogDocument) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut tx = self.db.pool.begin().await.map_err(Error::storage)?;

			catalog::upsert_document(&mut tx, &self.db.tables, doc)
				.await
				.map_err(Error::storage)?;
			tx.commit().await.map_err(Error::storage)?;

			Ok(())
		})
	}
}

impl SuggestionIndex for PgIndex {
	fn complete<'a>(
		&'a self,
		prefix: &'a str,
		size: u32,
	) -> BoxFuture<'a, Result<Option<Vec<String>>>> {
		Box::pin(async move {
			suggestions::complete(&self.db.pool, &self.db.tables, prefix, size)
				.await
				.map_err(Error::retrieval)
		})
	}

	fn upsert_entry<'a>(&'a self, entry: &'a SuggestionEntry) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			suggestions::upsert_suggestion(&self.db.pool, &self.db.tables, entry)
				.await
				.map_err(Error::storage)
		})
	}

	fn delete_older_than<'a>(&'a self, cutoff: OffsetDateTime) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			suggestions::delete_before(&self.db.pool, &self.db.tables, cutoff)
				.await
				.map_err(Error::storage)
		})
	}
}

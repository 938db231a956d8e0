//! In-memory [`CatalogIndex`] and [`SuggestionIndex`] for tests and embedding.
//!
//! Queries are evaluated with [`IndexQuery::matches_document`], so event-scoped leaves match
//! independently exactly as they do against PostgreSQL.

use std::{
	cmp::Ordering,
	collections::HashMap,
	sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use time::OffsetDateTime;

use epg_domain::{CatalogDocument, GuideZone, IndexQuery, SortOrder, SuggestionEntry};

use crate::{BoxFuture, CatalogHit, CatalogIndex, Error, Result, SuggestionIndex};

pub struct MemoryIndex {
	zone: GuideZone,
	documents: RwLock<HashMap<String, CatalogDocument>>,
	suggestions: RwLock<HashMap<String, SuggestionEntry>>,
}
impl MemoryIndex {
	pub fn new(zone: GuideZone) -> Self {
		Self {
			zone,
			documents: RwLock::new(HashMap::new()),
			suggestions: RwLock::new(HashMap::new()),
		}
	}

	pub fn document_count(&self) -> usize {
		read(&self.documents).len()
	}

	/// Current suggestion entries, most recent first.
	pub fn suggestion_entries(&self) -> Vec<SuggestionEntry> {
		let mut entries: Vec<_> = read(&self.suggestions).values().cloned().collect();

		entries.sort_by(|a, b| b.sort_date.cmp(&a.sort_date).then_with(|| a.input.cmp(&b.input)));

		entries
	}

	fn matching(&self, query: &IndexQuery) -> Vec<CatalogDocument> {
		read(&self.documents)
			.values()
			.filter(|doc| query.matches_document(doc, &self.zone))
			.cloned()
			.collect()
	}
}

impl CatalogIndex for MemoryIndex {
	fn fetch<'a>(
		&'a self,
		query: &'a IndexQuery,
		order: SortOrder,
		from: u64,
		size: u32,
	) -> BoxFuture<'a, Result<Vec<CatalogHit>>> {
		Box::pin(async move {
			let mut keyed: Vec<_> =
				self.matching(query).into_iter().map(|doc| (sort_key(&doc, order), doc)).collect();

			keyed.sort_by(|(a_key, a), (b_key, b)| {
				compare_keys(*a_key, *b_key, order).then_with(|| a.id.cmp(&b.id))
			});

			keyed
				.into_iter()
				.skip(usize::try_from(from).unwrap_or(usize::MAX))
				.take(size as usize)
				.map(|(sort_key, doc)| {
					let source = doc.to_source().map_err(Error::retrieval)?;

					Ok(CatalogHit { id: doc.id, sort_key, source })
				})
				.collect()
		})
	}

	fn count<'a>(&'a self, query: &'a IndexQuery) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move { Ok(self.matching(query).len() as u64) })
	}

	fn upsert_document<'a>(&'a self, doc: &'a CatalogDocument) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			write(&self.documents).insert(doc.id.clone(), doc.clone());

			Ok(())
		})
	}
}

impl SuggestionIndex for MemoryIndex {
	fn complete<'a>(
		&'a self,
		prefix: &'a str,
		size: u32,
	) -> BoxFuture<'a, Result<Option<Vec<String>>>> {
		Box::pin(async move {
			let prefix = prefix.to_lowercase();
			let mut hits: Vec<_> = read(&self.suggestions)
				.values()
				.filter(|entry| entry.input.to_lowercase().starts_with(&prefix))
				.map(|entry| (entry.sort_date, entry.input.clone()))
				.collect();

			hits.sort_by(|(a_date, a_input), (b_date, b_input)| {
				b_date.cmp(a_date).then_with(|| a_input.cmp(b_input))
			});

			Ok(Some(hits.into_iter().take(size as usize).map(|(_, input)| input).collect()))
		})
	}

	fn upsert_entry<'a>(&'a self, entry: &'a SuggestionEntry) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			write(&self.suggestions).insert(entry.id.clone(), entry.clone());

			Ok(())
		})
	}

	fn delete_older_than<'a>(&'a self, cutoff: OffsetDateTime) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			let mut suggestions = write(&self.suggestions);
			let before = suggestions.len();

			suggestions.retain(|_, entry| entry.sort_date > cutoff);

			Ok((before - suggestions.len()) as u64)
		})
	}
}

fn sort_key(doc: &CatalogDocument, order: SortOrder) -> Option<OffsetDateTime> {
	match order {
		SortOrder::Asc => doc.first_start(),
		SortOrder::Desc => doc.last_start(),
	}
}

fn compare_keys(a: Option<OffsetDateTime>, b: Option<OffsetDateTime>, order: SortOrder) -> Ordering {
	match (a, b) {
		(Some(a), Some(b)) => match order {
			SortOrder::Asc => a.cmp(&b),
			SortOrder::Desc => b.cmp(&a),
		},
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	}
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
	lock.read().unwrap_or_else(|err| err.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
	lock.write().unwrap_or_else(|err| err.into_inner())
}

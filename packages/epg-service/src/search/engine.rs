//! Fetch, flatten and repaginate.
//!
//! The index stores documents; callers page through events. Documents are streamed in sort-key
//! order and every admitted event is kept in a bounded, ordered buffer of `offset + max` entries.
//! Because a document's sort key bounds all of its event starts, streaming can stop as soon as the
//! buffer is full and the next key cannot beat the last buffered event.

use std::{time::Duration, vec::IntoIter};

use time::OffsetDateTime;

use epg_domain::{CatalogDocument, Event, IndexQuery, Page, SortOrder, VisibilityWindow};

use crate::{CatalogHit, CatalogIndex, Result, bounded, search::compile::CompiledForm};

pub(crate) struct Repaginate<'a> {
	pub(crate) index: &'a dyn CatalogIndex,
	pub(crate) compiled: &'a CompiledForm,
	pub(crate) window: &'a VisibilityWindow,
	pub(crate) order: SortOrder,
	pub(crate) offset: u64,
	pub(crate) max: u32,
	pub(crate) fetch_floor: u32,
	pub(crate) timeout: Duration,
}

#[derive(Debug, Default)]
struct Tally {
	documents: usize,
	malformed: usize,
	skipped: usize,
}

pub(crate) async fn repaginate(args: Repaginate<'_>) -> Result<Page<Event>> {
	let Repaginate { index, compiled, window, order, offset, max, fetch_floor, timeout } = args;
	let query = &compiled.query;

	if max == 0 {
		let total = count_or_none(bounded(timeout, "count query", index.count(query)).await);

		return Ok(Page::empty(offset, max, total));
	}

	let width = max.max(fetch_floor);
	let (first, total) = tokio::join!(
		bounded(timeout, "catalog fetch", index.fetch(query, order, 0, width)),
		bounded(timeout, "count query", index.count(query)),
	);
	let total = count_or_none(total);
	let mut stream = DocumentStream::new(index, query, order, width, timeout, first?);
	let keep = usize::try_from(offset.saturating_add(u64::from(max))).unwrap_or(usize::MAX);
	let mut kept: Vec<Event> = Vec::new();
	let mut tally = Tally::default();

	while let Some(hit) = stream.next().await? {
		// Keyless documents have no events and sort last.
		if hit.sort_key.is_none()
			|| (kept.len() >= keep && !can_improve(hit.sort_key, kept.last(), order))
		{
			break;
		}

		tally.documents += 1;

		let doc = match CatalogDocument::from_source(hit.source) {
			Ok(doc) => doc,
			Err(err) => {
				tally.malformed += 1;

				tracing::warn!(doc_id = %hit.id, error = %err, "Skipping malformed catalog document.");

				continue;
			},
		};
		let mut contributed = 0_usize;

		for event in doc.visible_events(window).iter() {
			if !compiled.admits(&doc, event) {
				continue;
			}

			insert_ordered(&mut kept, event.clone(), order);

			contributed += 1;
		}

		kept.truncate(keep);

		if contributed == 0 {
			tally.skipped += 1;

			tracing::debug!(doc_id = %doc.id, "Index match contributed no events.");
		}
		// Later documents sort at or beyond this key.
		if kept.len() >= keep && !can_improve(hit.sort_key, kept.last(), order) {
			break;
		}
	}

	tracing::debug!(
		documents = tally.documents,
		malformed = tally.malformed,
		skipped = tally.skipped,
		pages = stream.pages,
		"Schedule search consumed index pages."
	);

	let start = usize::try_from(offset).unwrap_or(usize::MAX);
	let items = kept.into_iter().skip(start).collect();

	Ok(Page { items, offset, max, total })
}

fn count_or_none(result: Result<u64>) -> Option<u64> {
	match result {
		Ok(total) => Some(total),
		Err(err) => {
			tracing::warn!(error = %err, "Count query failed. Returning page without total.");

			None
		},
	}
}

/// Whether a document with `sort_key` may still place an event before `boundary`.
fn can_improve(
	sort_key: Option<OffsetDateTime>,
	boundary: Option<&Event>,
	order: SortOrder,
) -> bool {
	let (Some(key), Some(boundary)) = (sort_key, boundary) else {
		return false;
	};

	match order {
		SortOrder::Asc => key < boundary.start,
		SortOrder::Desc => key > boundary.start,
	}
}

/// Inserts after every event that sorts equal, so ties keep their arrival order.
fn insert_ordered(kept: &mut Vec<Event>, event: Event, order: SortOrder) {
	let at = match order {
		SortOrder::Asc => kept.partition_point(|other| other.start <= event.start),
		SortOrder::Desc => kept.partition_point(|other| other.start >= event.start),
	};

	kept.insert(at, event);
}

/// Lazily pages through index hits; a short page ends the stream.
struct DocumentStream<'a> {
	index: &'a dyn CatalogIndex,
	query: &'a IndexQuery,
	order: SortOrder,
	width: u32,
	timeout: Duration,
	buffer: IntoIter<CatalogHit>,
	next_from: u64,
	exhausted: bool,
	pages: usize,
}
impl<'a> DocumentStream<'a> {
	fn new(
		index: &'a dyn CatalogIndex,
		query: &'a IndexQuery,
		order: SortOrder,
		width: u32,
		timeout: Duration,
		first: Vec<CatalogHit>,
	) -> Self {
		let mut stream = Self {
			index,
			query,
			order,
			width,
			timeout,
			buffer: Vec::new().into_iter(),
			next_from: 0,
			exhausted: false,
			pages: 0,
		};

		stream.load(first);

		stream
	}

	async fn next(&mut self) -> Result<Option<CatalogHit>> {
		loop {
			if let Some(hit) = self.buffer.next() {
				return Ok(Some(hit));
			}
			if self.exhausted {
				return Ok(None);
			}

			let page = bounded(
				self.timeout,
				"catalog fetch",
				self.index.fetch(self.query, self.order, self.next_from, self.width),
			)
			.await?;

			self.load(page);
		}
	}

	fn load(&mut self, page: Vec<CatalogHit>) {
		self.pages += 1;
		self.exhausted = page.len() < self.width as usize;
		self.next_from += page.len() as u64;
		self.buffer = page.into_iter();
	}
}

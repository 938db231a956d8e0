use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use epg_domain::{CatalogDocument, Event, IndexQuery, MediaType, SortOrder, Term};

use crate::{EpgService, Error, Result, bounded};

/// A catalog document as a given role may see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentView {
	pub id: String,
	pub media_type: MediaType,
	pub title: Option<String>,
	pub ancestors: Vec<String>,
	pub broadcasters: Vec<String>,
	/// Visible events only, ordered by start.
	pub events: Vec<Event>,
}

impl EpgService {
	pub async fn document(&self, id: &str, role: &str) -> Result<DocumentView> {
		let query = IndexQuery::Term(Term::Id(id.to_string()));
		let hits = bounded(
			self.query_timeout(),
			"catalog fetch",
			self.indexes.catalog.fetch(&query, SortOrder::Asc, 0, 1),
		)
		.await?;
		let Some(hit) = hits.into_iter().next() else {
			return Err(Error::NotFound { message: format!("document {id} does not exist.") });
		};
		let doc = CatalogDocument::from_source(hit.source).map_err(|err| {
			tracing::warn!(doc_id = %id, error = %err, "Catalog document is malformed.");

			Error::NotFound { message: format!("document {id} is unreadable.") }
		})?;
		let window = self.visibility().window(role, OffsetDateTime::now_utc());
		let events = doc.visible_events(&window).to_vec();

		Ok(DocumentView {
			id: doc.id,
			media_type: doc.media_type,
			title: doc.title,
			ancestors: doc.ancestors,
			broadcasters: doc.broadcasters,
			events,
		})
	}

	/// Prepares `doc` for the index and writes it, replacing any previous version.
	pub async fn upsert_document(&self, mut doc: CatalogDocument) -> Result<()> {
		doc.prepare(self.zone())?;

		bounded(self.query_timeout(), "catalog upsert", self.indexes.catalog.upsert_document(&doc))
			.await?;

		tracing::debug!(doc_id = %doc.id, events = doc.events.len(), "Catalog document upserted.");

		Ok(())
	}
}

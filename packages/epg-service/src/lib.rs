pub mod document;
pub mod memory;
pub mod pg;
pub mod retention;
pub mod search;
pub mod suggest;

mod error;

pub use document::DocumentView;
pub use error::{Error, Result};
pub use memory::MemoryIndex;
pub use pg::PgIndex;
pub use retention::{RetentionHandle, RetentionSchedule};
pub use search::SearchRequest;
pub use suggest::SuggestRequest;

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use serde_json::Value;
use time::OffsetDateTime;

use epg_config::Config;
use epg_domain::{
	CatalogDocument, GuideZone, IndexQuery, SortOrder, SuggestionEntry, VisibilityPolicy,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One catalog document as returned by the index, before decoding.
#[derive(Debug, Clone)]
pub struct CatalogHit {
	pub id: String,
	/// Earliest event start for ascending fetches, latest for descending ones.
	pub sort_key: Option<OffsetDateTime>,
	pub source: Value,
}

/// Document-level access to the catalog replica.
///
/// `fetch` returns documents ordered by their sort key (absent keys last), then by id, so that
/// paging with `from` is stable while the replica does not change.
pub trait CatalogIndex
where
	Self: Send + Sync,
{
	fn fetch<'a>(
		&'a self,
		query: &'a IndexQuery,
		order: SortOrder,
		from: u64,
		size: u32,
	) -> BoxFuture<'a, Result<Vec<CatalogHit>>>;

	fn count<'a>(&'a self, query: &'a IndexQuery) -> BoxFuture<'a, Result<u64>>;

	fn upsert_document<'a>(&'a self, doc: &'a CatalogDocument) -> BoxFuture<'a, Result<()>>;
}

pub trait SuggestionIndex
where
	Self: Send + Sync,
{
	/// Completion inputs starting with `prefix` (case-insensitive). `None` means the suggestion
	/// index itself is missing.
	fn complete<'a>(
		&'a self,
		prefix: &'a str,
		size: u32,
	) -> BoxFuture<'a, Result<Option<Vec<String>>>>;

	fn upsert_entry<'a>(&'a self, entry: &'a SuggestionEntry) -> BoxFuture<'a, Result<()>>;

	/// Removes entries with `sort_date <= cutoff` and returns how many were removed.
	fn delete_older_than<'a>(&'a self, cutoff: OffsetDateTime) -> BoxFuture<'a, Result<u64>>;
}

#[derive(Clone)]
pub struct Indexes {
	pub catalog: Arc<dyn CatalogIndex>,
	pub suggestions: Arc<dyn SuggestionIndex>,
}
impl Indexes {
	pub fn new(catalog: Arc<dyn CatalogIndex>, suggestions: Arc<dyn SuggestionIndex>) -> Self {
		Self { catalog, suggestions }
	}

	/// Uses one backend for both the catalog and the suggestion store.
	pub fn shared<T>(index: Arc<T>) -> Self
	where
		T: CatalogIndex + SuggestionIndex + 'static,
	{
		Self { catalog: index.clone(), suggestions: index }
	}
}

pub struct EpgService {
	pub cfg: Config,
	pub indexes: Indexes,
	zone: GuideZone,
	visibility: VisibilityPolicy,
}
impl EpgService {
	pub fn new(cfg: Config, indexes: Indexes) -> Result<Self> {
		let zone = GuideZone::from_config(&cfg.guide)?;
		let visibility = VisibilityPolicy::from_config(&cfg.visibility);

		Ok(Self { cfg, indexes, zone, visibility })
	}

	pub fn zone(&self) -> &GuideZone {
		&self.zone
	}

	pub fn visibility(&self) -> &VisibilityPolicy {
		&self.visibility
	}

	pub(crate) fn query_timeout(&self) -> Duration {
		Duration::from_millis(self.cfg.index.query_timeout_ms)
	}
}

/// Awaits one index round trip, turning an elapsed timeout into a retrieval failure.
pub(crate) async fn bounded<T>(
	timeout: Duration,
	what: &'static str,
	fut: BoxFuture<'_, Result<T>>,
) -> Result<T> {
	match tokio::time::timeout(timeout, fut).await {
		Ok(result) => result,
		Err(_) => Err(Error::Retrieval {
			message: format!("{what} timed out after {} ms.", timeout.as_millis()),
		}),
	}
}

pub mod compile;

mod engine;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::runtime::Handle;

use epg_domain::{Event, Page, SearchForm, SortOrder, SuggestionEntry};

use crate::{EpgService, Error, Result, suggest};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
	#[serde(default)]
	pub form: Option<SearchForm>,
	#[serde(default)]
	pub order: SortOrder,
	#[serde(default)]
	pub offset: u64,
	/// Page size; the configured default when absent.
	#[serde(default)]
	pub max: Option<u32>,
	#[serde(default)]
	pub profile: Option<String>,
	/// Already-resolved caller role.
	pub role: String,
}

impl EpgService {
	pub async fn search_schedule(&self, req: SearchRequest) -> Result<Page<Event>> {
		let max = req.max.unwrap_or(self.cfg.search.default_max);

		if max > self.cfg.search.max_page_size {
			return Err(Error::InvalidRequest {
				message: format!(
					"max must be at most {}; got {max}.",
					self.cfg.search.max_page_size
				),
			});
		}

		let form = req.form.map(SearchForm::validated).transpose()?;
		let has_form = form.is_some();
		let compiled = compile::compile(form, *self.zone());
		let window = self.visibility().window(&req.role, OffsetDateTime::now_utc());
		let page = engine::repaginate(engine::Repaginate {
			index: self.indexes.catalog.as_ref(),
			compiled: &compiled,
			window: &window,
			order: req.order,
			offset: req.offset,
			max,
			fetch_floor: self.cfg.search.fetch_floor,
			timeout: self.query_timeout(),
		})
		.await?;

		tracing::debug!(
			role = %req.role,
			offset = req.offset,
			max,
			items = page.items.len(),
			total = ?page.total,
			"Schedule search finished."
		);

		if has_form && req.offset == 0 && !page.items.is_empty() {
			self.capture(compiled.form(), req.profile.as_deref());
		}

		Ok(page)
	}

	/// Remembers the form's free text as a suggestion without delaying the response.
	fn capture(&self, form: &SearchForm, profile: Option<&str>) {
		if !self.cfg.suggestions.capture {
			return;
		}

		let Some(text) = form.free_text() else {
			return;
		};
		let Ok(handle) = Handle::try_current() else {
			tracing::warn!("No async runtime available. Skipping suggestion capture.");

			return;
		};
		let entry = SuggestionEntry::new(text, profile, OffsetDateTime::now_utc());
		let index = Arc::clone(&self.indexes.suggestions);
		let timeout = self.query_timeout();

		handle.spawn(async move {
			match suggest::record_entry(index.as_ref(), &entry, timeout).await {
				Ok(()) => tracing::debug!(input = %entry.input, "Captured search suggestion."),
				Err(err) => tracing::warn!(
					error = %err,
					input = %entry.input,
					"Suggestion capture failed."
				),
			}
		});
	}
}

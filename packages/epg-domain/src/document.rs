use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, Duration, OffsetDateTime};

use crate::{
	Error, Result,
	channel::{Channel, MediaType},
	guide::GuideZone,
	visibility::{VisibilityWindow, VisibleEvents},
};

/// One media item in the catalog replica together with its embedded schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
	pub id: String,
	pub media_type: MediaType,
	#[serde(default)]
	pub title: Option<String>,
	/// Ancestor identifiers, nearest first.
	#[serde(default)]
	pub ancestors: Vec<String>,
	#[serde(default)]
	pub broadcasters: Vec<String>,
	#[serde(default)]
	pub events: Vec<Event>,
}
impl CatalogDocument {
	/// Decodes an index hit and binds every event to its owning document.
	pub fn from_source(source: Value) -> serde_json::Result<Self> {
		let mut doc: Self = serde_json::from_value(source)?;

		doc.bind_events();

		Ok(doc)
	}

	pub fn to_source(&self) -> serde_json::Result<Value> {
		serde_json::to_value(self)
	}

	/// Brings a document into index shape: events ordered by start, back-references bound, guide
	/// days filled in. Rejects two events sharing a channel and start instant.
	pub fn prepare(&mut self, zone: &GuideZone) -> Result<()> {
		if self.id.trim().is_empty() {
			return Err(Error::InvalidDocument {
				id: self.id.clone(),
				message: "id must be non-empty.".to_string(),
			});
		}

		self.events.sort_by_key(|event| event.start);

		let mut seen = HashSet::with_capacity(self.events.len());

		for event in &mut self.events {
			event.start = truncate_millis(event.start);

			if !seen.insert((event.channel, event.start)) {
				return Err(Error::InvalidDocument {
					id: self.id.clone(),
					message: format!(
						"duplicate event on {} at {}.",
						event.channel,
						event.start.unix_timestamp()
					),
				});
			}
			if event.duration_ms < 0 {
				return Err(Error::InvalidDocument {
					id: self.id.clone(),
					message: "event duration must be zero or greater.".to_string(),
				});
			}
			if event.guide_day.is_none() {
				event.guide_day = Some(zone.guide_day(event.start));
			}
		}

		self.bind_events();

		Ok(())
	}

	pub fn visible_events<'a>(&'a self, window: &'a VisibilityWindow) -> VisibleEvents<'a> {
		VisibleEvents::new(&self.events, window)
	}

	pub fn is_descendant_of(&self, ancestor: &str) -> bool {
		self.ancestors.iter().any(|id| id == ancestor)
	}

	pub fn has_broadcaster(&self, broadcaster: &str) -> bool {
		self.broadcasters.iter().any(|value| value == broadcaster)
	}

	pub fn title_contains(&self, text: &str) -> bool {
		let needle = text.trim().to_lowercase();

		self.title.as_deref().is_some_and(|title| title.to_lowercase().contains(&needle))
	}

	pub fn first_start(&self) -> Option<OffsetDateTime> {
		self.events.iter().map(|event| event.start).min()
	}

	pub fn last_start(&self) -> Option<OffsetDateTime> {
		self.events.iter().map(|event| event.start).max()
	}

	fn bind_events(&mut self) {
		for event in &mut self.events {
			event.media_id.clone_from(&self.id);
		}
	}
}

/// A single scheduled broadcast of a media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
	/// Owning document. Bound on load, never trusted from the source.
	#[serde(default)]
	pub media_id: String,
	pub channel: Channel,
	#[serde(default)]
	pub net: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub start: OffsetDateTime,
	pub duration_ms: i64,
	#[serde(default, with = "crate::time_serde::date")]
	pub guide_day: Option<Date>,
}
impl Event {
	/// The stored guide day, or the one derived from the start instant.
	pub fn guide_day_in(&self, zone: &GuideZone) -> Date {
		self.guide_day.unwrap_or_else(|| zone.guide_day(self.start))
	}
}

pub fn truncate_millis(instant: OffsetDateTime) -> OffsetDateTime {
	let nanos = instant.nanosecond();

	instant - Duration::nanoseconds(i64::from(nanos % 1_000_000))
}

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
	Error, Result,
	channel::{Channel, MediaType},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
	#[default]
	Asc,
	Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBound {
	#[serde(with = "crate::time_serde")]
	pub instant: OffsetDateTime,
	#[serde(default = "default_inclusive")]
	pub inclusive: bool,
}
impl TimeBound {
	pub fn inclusive(instant: OffsetDateTime) -> Self {
		Self { instant, inclusive: true }
	}

	pub fn exclusive(instant: OffsetDateTime) -> Self {
		Self { instant, inclusive: false }
	}
}

/// Caller constraints for a schedule search. Every present dimension must hold for an event,
/// except that `broadcaster` and `net` are alternatives when both are given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchForm {
	#[serde(default)]
	pub text: Option<String>,
	#[serde(default)]
	pub channels: Vec<Channel>,
	#[serde(default)]
	pub net: Option<String>,
	#[serde(default)]
	pub broadcaster: Option<String>,
	#[serde(default)]
	pub media_type: Option<MediaType>,
	#[serde(default)]
	pub ancestor: Option<String>,
	#[serde(default)]
	pub start: Option<TimeBound>,
	#[serde(default)]
	pub stop: Option<TimeBound>,
	#[serde(default, with = "crate::time_serde::date")]
	pub guide_day: Option<Date>,
}
impl SearchForm {
	/// Trims values, collapses repeated channels, and rejects contradictory forms.
	pub fn validated(mut self) -> Result<Self> {
		self.text = self.text.take().map(|text| text.trim().to_string()).filter(|t| !t.is_empty());

		for (label, value) in [
			("net", &mut self.net),
			("broadcaster", &mut self.broadcaster),
			("ancestor", &mut self.ancestor),
		] {
			if let Some(raw) = value.as_mut() {
				let trimmed = raw.trim();

				if trimmed.is_empty() {
					return Err(Error::InvalidForm {
						message: format!("{label} must not be empty when provided."),
					});
				}

				*raw = trimmed.to_string();
			}
		}

		let mut seen = Vec::with_capacity(self.channels.len());

		self.channels.retain(|channel| {
			if seen.contains(channel) {
				false
			} else {
				seen.push(*channel);

				true
			}
		});

		if self.guide_day.is_some() && (self.start.is_some() || self.stop.is_some()) {
			return Err(Error::InvalidForm {
				message: "guide_day cannot be combined with start or stop.".to_string(),
			});
		}

		if let (Some(start), Some(stop)) = (self.start, self.stop)
			&& start.instant > stop.instant
		{
			return Err(Error::InvalidForm { message: "start must not be after stop.".to_string() });
		}

		Ok(self)
	}

	pub fn free_text(&self) -> Option<&str> {
		self.text.as_deref().map(str::trim).filter(|text| !text.is_empty())
	}

	pub fn has_time_range(&self) -> bool {
		self.start.is_some() || self.stop.is_some()
	}
}

fn default_inclusive() -> bool {
	true
}

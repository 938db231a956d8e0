//! Role-based temporal visibility.
//!
//! Restricted roles only see events that start before `now + window`. The window is computed once
//! per request and handed to whoever exposes events; it is never looked up ambiently.

use std::{collections::HashSet, ops::Range};

use time::{Duration, OffsetDateTime, PrimitiveDateTime};

use crate::document::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleClass {
	Privileged,
	Restricted,
}

#[derive(Debug, Clone)]
pub struct VisibilityPolicy {
	privileged_roles: HashSet<String>,
	restricted_window: Duration,
	privileged_window: Option<Duration>,
}
impl VisibilityPolicy {
	pub fn new<I, S>(
		privileged_roles: I,
		restricted_window_days: i64,
		privileged_window_days: Option<i64>,
	) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		Self {
			privileged_roles: privileged_roles
				.into_iter()
				.map(|role| role.as_ref().trim().to_lowercase())
				.collect(),
			restricted_window: days(restricted_window_days),
			privileged_window: privileged_window_days.map(days),
		}
	}

	pub fn from_config(cfg: &epg_config::Visibility) -> Self {
		Self::new(
			&cfg.privileged_roles,
			cfg.restricted_window_days,
			cfg.privileged_window_days,
		)
	}

	pub fn classify(&self, role: &str) -> RoleClass {
		if self.privileged_roles.contains(&role.trim().to_lowercase()) {
			RoleClass::Privileged
		} else {
			RoleClass::Restricted
		}
	}

	pub fn window(&self, role: &str, now: OffsetDateTime) -> VisibilityWindow {
		match self.classify(role) {
			RoleClass::Privileged => match self.privileged_window {
				Some(window) => VisibilityWindow::after(now, window),
				None => VisibilityWindow::unlimited(),
			},
			RoleClass::Restricted => VisibilityWindow::after(now, self.restricted_window),
		}
	}
}

fn days(count: i64) -> Duration {
	Duration::seconds(count.saturating_mul(86_400))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityWindow {
	cutoff: Option<OffsetDateTime>,
}
impl VisibilityWindow {
	pub fn unlimited() -> Self {
		Self { cutoff: None }
	}

	pub fn until(cutoff: OffsetDateTime) -> Self {
		Self { cutoff: Some(cutoff) }
	}

	/// Cutoff at `now + window`. A cutoff beyond the last representable instant hides nothing; one
	/// before the first hides everything.
	pub fn after(now: OffsetDateTime, window: Duration) -> Self {
		match now.checked_add(window) {
			Some(cutoff) => Self::until(cutoff),
			None if window.is_positive() => Self::unlimited(),
			None => Self::until(PrimitiveDateTime::MIN.assume_utc()),
		}
	}

	pub fn cutoff(&self) -> Option<OffsetDateTime> {
		self.cutoff
	}

	pub fn admits(&self, event: &Event) -> bool {
		self.cutoff.is_none_or(|cutoff| event.start < cutoff)
	}
}

/// The visible part of an event slice ordered by start.
///
/// Ordering queries (`first`, `last`, `range`) answer for the visible subset only. `count` walks
/// the slice; it never reports the underlying length.
#[derive(Debug, Clone, Copy)]
pub struct VisibleEvents<'a> {
	events: &'a [Event],
	window: &'a VisibilityWindow,
}
impl<'a> VisibleEvents<'a> {
	pub fn new(events: &'a [Event], window: &'a VisibilityWindow) -> Self {
		Self { events, window }
	}

	pub fn iter(&self) -> impl DoubleEndedIterator<Item = &'a Event> + use<'a> {
		let window = self.window;

		self.events.iter().filter(move |event| window.admits(event))
	}

	pub fn first(&self) -> Option<&'a Event> {
		self.iter().next()
	}

	pub fn last(&self) -> Option<&'a Event> {
		self.iter().next_back()
	}

	pub fn count(&self) -> usize {
		self.iter().count()
	}

	pub fn is_empty(&self) -> bool {
		self.first().is_none()
	}

	/// Visible events starting in `[from, to)`.
	pub fn range(&self, from: OffsetDateTime, to: OffsetDateTime) -> VisibleEvents<'a> {
		let Range { start, end } = self.bounds(from, to);

		Self { events: &self.events[start..end], window: self.window }
	}

	pub fn to_vec(&self) -> Vec<Event> {
		self.iter().cloned().collect()
	}

	fn bounds(&self, from: OffsetDateTime, to: OffsetDateTime) -> Range<usize> {
		let start = self.events.partition_point(|event| event.start < from);
		let end = self.events.partition_point(|event| event.start < to).max(start);

		start..end
	}
}

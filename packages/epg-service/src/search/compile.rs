//! Search form compilation.
//!
//! The compiled [`IndexQuery`] is only a pre-filter: its event-scoped leaves may be satisfied by
//! different events of one document. [`CompiledForm::admits`] re-tests each event against the
//! original form and is the filter that decides what callers see.

use time::{Duration, OffsetDateTime};

use epg_domain::{
	CatalogDocument, Event, GuideZone, IndexQuery, SearchForm, Term, TimeBound,
	document::truncate_millis,
};

#[derive(Debug, Clone)]
pub struct CompiledForm {
	pub query: IndexQuery,
	form: SearchForm,
	zone: GuideZone,
}
impl CompiledForm {
	pub fn form(&self) -> &SearchForm {
		&self.form
	}

	pub fn admits(&self, doc: &CatalogDocument, event: &Event) -> bool {
		let form = &self.form;

		if !form.channels.is_empty() && !form.channels.contains(&event.channel) {
			return false;
		}

		let by_broadcaster = form.broadcaster.as_deref().map(|b| doc.has_broadcaster(b));
		let by_net = form.net.as_deref().map(|net| event.net.as_deref() == Some(net));

		match (by_broadcaster, by_net) {
			(Some(false), Some(false)) | (Some(false), None) | (None, Some(false)) =>
				return false,
			_ => {},
		}

		if form.media_type.is_some_and(|media_type| doc.media_type != media_type) {
			return false;
		}
		if form.ancestor.as_deref().is_some_and(|ancestor| !doc.is_descendant_of(ancestor)) {
			return false;
		}
		if form.start.is_some_and(|bound| !after_start(event.start, bound)) {
			return false;
		}
		if form.stop.is_some_and(|bound| !before_stop(event.start, bound)) {
			return false;
		}
		if form.guide_day.is_some_and(|day| event.guide_day_in(&self.zone) != day) {
			return false;
		}
		if form.free_text().is_some_and(|text| !doc.title_contains(text)) {
			return false;
		}

		true
	}
}

/// Compiles a validated form. An absent form matches everything.
pub fn compile(form: Option<SearchForm>, zone: GuideZone) -> CompiledForm {
	let form = form.unwrap_or_default();
	let mut clauses = Vec::new();

	if !form.channels.is_empty() {
		clauses.push(IndexQuery::or(
			form.channels.iter().map(|channel| IndexQuery::Term(Term::Channel(*channel))).collect(),
		));
	}

	match (&form.broadcaster, &form.net) {
		(Some(broadcaster), Some(net)) => clauses.push(IndexQuery::or(vec![
			IndexQuery::Term(Term::Broadcaster(broadcaster.clone())),
			IndexQuery::Term(Term::Net(net.clone())),
		])),
		(Some(broadcaster), None) =>
			clauses.push(IndexQuery::Term(Term::Broadcaster(broadcaster.clone()))),
		(None, Some(net)) => clauses.push(IndexQuery::Term(Term::Net(net.clone()))),
		(None, None) => {},
	}

	if let Some(media_type) = form.media_type {
		clauses.push(IndexQuery::Term(Term::MediaType(media_type)));
	}
	if let Some(ancestor) = &form.ancestor {
		clauses.push(IndexQuery::Term(Term::Ancestor(ancestor.clone())));
	}
	if form.has_time_range() {
		clauses.push(IndexQuery::StartRange {
			from: form.start.map(index_lower_bound),
			to: form.stop.map(index_upper_bound),
		});
	}
	if let Some(day) = form.guide_day {
		clauses.push(IndexQuery::Term(Term::GuideDay(day)));
	}
	if let Some(text) = form.free_text() {
		clauses.push(IndexQuery::TitleContains(text.to_string()));
	}

	CompiledForm { query: IndexQuery::and(clauses), form, zone }
}

/// Closed lower bound at millisecond precision.
fn index_lower_bound(bound: TimeBound) -> OffsetDateTime {
	let truncated = truncate_millis(bound.instant);

	if bound.inclusive { truncated } else { truncated + Duration::milliseconds(1) }
}

/// Closed upper bound at millisecond precision. An exclusive bound with a sub-millisecond
/// remainder still admits its own truncated millisecond.
fn index_upper_bound(bound: TimeBound) -> OffsetDateTime {
	let truncated = truncate_millis(bound.instant);

	if bound.inclusive || truncated != bound.instant {
		truncated
	} else {
		truncated - Duration::milliseconds(1)
	}
}

fn after_start(start: OffsetDateTime, bound: TimeBound) -> bool {
	if bound.inclusive { start >= bound.instant } else { start > bound.instant }
}

fn before_stop(start: OffsetDateTime, bound: TimeBound) -> bool {
	if bound.inclusive { start <= bound.instant } else { start < bound.instant }
}

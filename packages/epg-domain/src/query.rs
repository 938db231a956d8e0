//! Index-level query predicates.
//!
//! An [`IndexQuery`] is evaluated per document. Event-scoped leaves (channel, net, start range,
//! guide day) hold when *any* event of the document satisfies them, each leaf on its own. A
//! document can therefore match `channel AND range` through two different events; callers must
//! re-test events in process.

use time::{Date, OffsetDateTime};

use crate::{
	channel::{Channel, MediaType},
	document::CatalogDocument,
	guide::GuideZone,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexQuery {
	MatchAll,
	And(Vec<IndexQuery>),
	Or(Vec<IndexQuery>),
	Term(Term),
	/// Closed range on event start instants.
	StartRange { from: Option<OffsetDateTime>, to: Option<OffsetDateTime> },
	/// Case-insensitive substring of the document title.
	TitleContains(String),
}
impl IndexQuery {
	pub fn and(mut clauses: Vec<IndexQuery>) -> Self {
		match clauses.len() {
			0 => Self::MatchAll,
			1 => clauses.remove(0),
			_ => Self::And(clauses),
		}
	}

	pub fn or(mut clauses: Vec<IndexQuery>) -> Self {
		match clauses.len() {
			1 => clauses.remove(0),
			_ => Self::Or(clauses),
		}
	}

	pub fn matches_document(&self, doc: &CatalogDocument, zone: &GuideZone) -> bool {
		match self {
			Self::MatchAll => true,
			Self::And(clauses) => clauses.iter().all(|clause| clause.matches_document(doc, zone)),
			Self::Or(clauses) => clauses.iter().any(|clause| clause.matches_document(doc, zone)),
			Self::Term(term) => term.matches_document(doc, zone),
			Self::StartRange { from, to } => doc.events.iter().any(|event| {
				from.is_none_or(|from| event.start >= from) && to.is_none_or(|to| event.start <= to)
			}),
			Self::TitleContains(text) => doc.title_contains(text),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
	Id(String),
	Channel(Channel),
	Net(String),
	Broadcaster(String),
	MediaType(MediaType),
	Ancestor(String),
	GuideDay(Date),
}
impl Term {
	pub fn matches_document(&self, doc: &CatalogDocument, zone: &GuideZone) -> bool {
		match self {
			Self::Id(id) => &doc.id == id,
			Self::Channel(channel) => doc.events.iter().any(|event| event.channel == *channel),
			Self::Net(net) => doc.events.iter().any(|event| event.net.as_deref() == Some(net)),
			Self::Broadcaster(broadcaster) => doc.has_broadcaster(broadcaster),
			Self::MediaType(media_type) => doc.media_type == *media_type,
			Self::Ancestor(ancestor) => doc.is_descendant_of(ancestor),
			Self::GuideDay(day) => doc.events.iter().any(|event| event.guide_day_in(zone) == *day),
		}
	}
}

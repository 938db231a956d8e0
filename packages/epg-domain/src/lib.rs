pub mod channel;
pub mod document;
pub mod form;
pub mod guide;
pub mod page;
pub mod query;
pub mod suggestion;
pub mod time_serde;
pub mod visibility;

mod error;

pub use channel::{Channel, MediaType};
pub use document::{CatalogDocument, Event};
pub use error::{Error, Result};
pub use form::{SearchForm, SortOrder, TimeBound};
pub use guide::GuideZone;
pub use page::{Page, Suggestions};
pub use query::{IndexQuery, Term};
pub use suggestion::SuggestionEntry;
pub use visibility::{RoleClass, VisibilityPolicy, VisibilityWindow, VisibleEvents};

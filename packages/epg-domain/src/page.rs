use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
	pub items: Vec<T>,
	pub offset: u64,
	pub max: u32,
	/// Estimated number of matches; absent when the count could not be obtained.
	pub total: Option<u64>,
}
impl<T> Page<T> {
	pub fn empty(offset: u64, max: u32, total: Option<u64>) -> Self {
		Self { items: Vec::new(), offset, max, total }
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestions {
	pub items: Vec<String>,
	pub total: Option<u64>,
}

//! Optional calendar dates as `YYYY-MM-DD` strings.

use serde::{Deserialize as _, Deserializer, Serializer};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn format(value: Date) -> String {
	value.format(DATE_FORMAT).unwrap_or_else(|_| value.to_string())
}

pub fn parse(raw: &str) -> Result<Date, time::error::Parse> {
	Date::parse(raw, DATE_FORMAT)
}

pub fn serialize<S>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	match value {
		Some(value) => serializer.serialize_str(&format(*value)),
		None => serializer.serialize_none(),
	}
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<String>::deserialize(deserializer)?;

	match raw {
		Some(value) => parse(&value).map(Some).map_err(serde::de::Error::custom),
		None => Ok(None),
	}
}

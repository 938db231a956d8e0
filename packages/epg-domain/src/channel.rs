use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
	#[serde(rename = "TV1")]
	Tv1,
	#[serde(rename = "TV2")]
	Tv2,
	#[serde(rename = "TV3")]
	Tv3,
	#[serde(rename = "KIDS")]
	Kids,
	#[serde(rename = "NEWS")]
	News,
	#[serde(rename = "SPORT")]
	Sport,
	#[serde(rename = "CULTURE")]
	Culture,
	#[serde(rename = "RADIO1")]
	Radio1,
	#[serde(rename = "RADIO2")]
	Radio2,
	#[serde(rename = "RADIO3")]
	Radio3,
	#[serde(rename = "RADIO4")]
	Radio4,
	#[serde(rename = "RADIO5")]
	Radio5,
	#[serde(rename = "WEB")]
	Web,
}
impl Channel {
	pub const ALL: [Self; 13] = [
		Self::Tv1,
		Self::Tv2,
		Self::Tv3,
		Self::Kids,
		Self::News,
		Self::Sport,
		Self::Culture,
		Self::Radio1,
		Self::Radio2,
		Self::Radio3,
		Self::Radio4,
		Self::Radio5,
		Self::Web,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Tv1 => "TV1",
			Self::Tv2 => "TV2",
			Self::Tv3 => "TV3",
			Self::Kids => "KIDS",
			Self::News => "NEWS",
			Self::Sport => "SPORT",
			Self::Culture => "CULTURE",
			Self::Radio1 => "RADIO1",
			Self::Radio2 => "RADIO2",
			Self::Radio3 => "RADIO3",
			Self::Radio4 => "RADIO4",
			Self::Radio5 => "RADIO5",
			Self::Web => "WEB",
		}
	}
}
impl fmt::Display for Channel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for Channel {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		let code = raw.trim();

		Self::ALL
			.into_iter()
			.find(|channel| channel.as_str().eq_ignore_ascii_case(code))
			.ok_or_else(|| Error::UnknownCode { kind: "channel", code: raw.to_string() })
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
	Broadcast,
	Clip,
	Segment,
	Trailer,
	Movie,
	Series,
	Season,
	Podcast,
	Album,
	Track,
}
impl MediaType {
	pub const ALL: [Self; 10] = [
		Self::Broadcast,
		Self::Clip,
		Self::Segment,
		Self::Trailer,
		Self::Movie,
		Self::Series,
		Self::Season,
		Self::Podcast,
		Self::Album,
		Self::Track,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Broadcast => "BROADCAST",
			Self::Clip => "CLIP",
			Self::Segment => "SEGMENT",
			Self::Trailer => "TRAILER",
			Self::Movie => "MOVIE",
			Self::Series => "SERIES",
			Self::Season => "SEASON",
			Self::Podcast => "PODCAST",
			Self::Album => "ALBUM",
			Self::Track => "TRACK",
		}
	}
}
impl fmt::Display for MediaType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for MediaType {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		let code = raw.trim();

		Self::ALL
			.into_iter()
			.find(|media_type| media_type.as_str().eq_ignore_ascii_case(code))
			.ok_or_else(|| Error::UnknownCode { kind: "media type", code: raw.to_string() })
	}
}

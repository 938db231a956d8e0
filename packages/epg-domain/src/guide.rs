//! Guide days: the local calendar day an event is listed under.
//!
//! A guide day starts at 06:00 local time, so a broadcast at 02:30 on a Saturday belongs to
//! Friday's guide. Local time is a fixed standard offset, optionally shifted by one hour during
//! EU summer time (last Sunday of March 01:00 UTC until last Sunday of October 01:00 UTC).

use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset, util};

use crate::{Error, Result};

pub const GUIDE_DAY_START_HOUR: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideZone {
	standard: UtcOffset,
	eu_summer_time: bool,
}
impl GuideZone {
	pub fn new(utc_offset_minutes: i16, eu_summer_time: bool) -> Result<Self> {
		let standard = UtcOffset::from_whole_seconds(i32::from(utc_offset_minutes) * 60)
			.map_err(|err| Error::InvalidZone { message: err.to_string() })?;

		Ok(Self { standard, eu_summer_time })
	}

	pub fn from_config(cfg: &epg_config::Guide) -> Result<Self> {
		Self::new(cfg.utc_offset_minutes, cfg.eu_summer_time)
	}

	pub fn utc() -> Self {
		Self { standard: UtcOffset::UTC, eu_summer_time: false }
	}

	pub fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
		if !self.eu_summer_time || !in_eu_summer_time(instant) {
			return self.standard;
		}

		UtcOffset::from_whole_seconds(self.standard.whole_seconds() + 3_600)
			.unwrap_or(self.standard)
	}

	pub fn guide_day(&self, instant: OffsetDateTime) -> Date {
		let local = instant.to_offset(self.offset_at(instant));
		let date = local.date();

		if local.hour() < GUIDE_DAY_START_HOUR { date.previous_day().unwrap_or(date) } else { date }
	}
}

fn in_eu_summer_time(instant: OffsetDateTime) -> bool {
	let utc = instant.to_offset(UtcOffset::UTC);
	let year = utc.year();
	let (Some(begin), Some(end)) =
		(switch_instant(year, Month::March), switch_instant(year, Month::October))
	else {
		return false;
	};

	utc >= begin && utc < end
}

fn switch_instant(year: i32, month: Month) -> Option<OffsetDateTime> {
	let last = Date::from_calendar_date(year, month, util::days_in_year_month(year, month)).ok()?;
	let sunday = last - Duration::days(i64::from(last.weekday().number_days_from_sunday()));
	let at = Time::from_hms(1, 0, 0).ok()?;

	Some(PrimitiveDateTime::new(sunday, at).assume_utc())
}

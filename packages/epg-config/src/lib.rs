mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Guide, Index, Postgres, Retention, Search, Service, Storage, Suggestions, Visibility,
};

use std::{fs, path::Path};

use regex::Regex;

const IDENTIFIER_PATTERN: &str = r"^[a-z_][a-z0-9_]{0,47}$";
/// Upper bound for every day count; keeps `now ± days` inside the representable date range.
pub const MAX_DAYS: i64 = 36_500;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	for (label, name) in
		[("index.catalog", &cfg.index.catalog), ("index.suggestions", &cfg.index.suggestions)]
	{
		if !is_identifier(name) {
			return Err(Error::Validation {
				message: format!(
					"{label} must be a lowercase identifier of at most 48 characters."
				),
			});
		}
	}

	if cfg.index.catalog == cfg.index.suggestions {
		return Err(Error::Validation {
			message: "index.catalog and index.suggestions must differ.".to_string(),
		});
	}
	if cfg.index.query_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "index.query_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.search.fetch_floor == 0 {
		return Err(Error::Validation {
			message: "search.fetch_floor must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_page_size == 0 {
		return Err(Error::Validation {
			message: "search.max_page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_max > cfg.search.max_page_size {
		return Err(Error::Validation {
			message: "search.default_max must not exceed search.max_page_size.".to_string(),
		});
	}
	if !(-14 * 60..=14 * 60).contains(&i32::from(cfg.guide.utc_offset_minutes)) {
		return Err(Error::Validation {
			message: "guide.utc_offset_minutes must be within -840 and 840.".to_string(),
		});
	}
	if cfg.visibility.restricted_window_days < 0 {
		return Err(Error::Validation {
			message: "visibility.restricted_window_days must be zero or greater.".to_string(),
		});
	}

	for (label, days) in [
		("visibility.restricted_window_days", Some(cfg.visibility.restricted_window_days)),
		("visibility.privileged_window_days", cfg.visibility.privileged_window_days),
		("retention.ttl_days", Some(cfg.retention.ttl_days)),
	] {
		if days.is_some_and(|days| days > MAX_DAYS) {
			return Err(Error::Validation {
				message: format!("{label} must be at most {MAX_DAYS}."),
			});
		}
	}

	if let Some(days) = cfg.visibility.privileged_window_days
		&& days < cfg.visibility.restricted_window_days
	{
		return Err(Error::Validation {
			message:
				"visibility.privileged_window_days must not be shorter than visibility.restricted_window_days."
					.to_string(),
		});
	}

	if cfg.visibility.privileged_roles.iter().any(|role| role.trim().is_empty()) {
		return Err(Error::Validation {
			message: "visibility.privileged_roles must not contain empty names.".to_string(),
		});
	}
	if cfg.suggestions.default_max == 0 {
		return Err(Error::Validation {
			message: "suggestions.default_max must be greater than zero.".to_string(),
		});
	}
	if cfg.retention.ttl_days <= 0 {
		return Err(Error::Validation {
			message: "retention.ttl_days must be greater than zero.".to_string(),
		});
	}
	if cfg.retention.interval_seconds == 0 {
		return Err(Error::Validation {
			message: "retention.interval_seconds must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn is_identifier(name: &str) -> bool {
	Regex::new(IDENTIFIER_PATTERN).map(|re| re.is_match(name)).unwrap_or(false)
}

fn normalize(cfg: &mut Config) {
	cfg.index.catalog = cfg.index.catalog.trim().to_string();
	cfg.index.suggestions = cfg.index.suggestions.trim().to_string();

	for role in &mut cfg.visibility.privileged_roles {
		*role = role.trim().to_lowercase();
	}
}

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub index: Index,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub guide: Guide,
	#[serde(default)]
	pub visibility: Visibility,
	#[serde(default)]
	pub suggestions: Suggestions,
	#[serde(default)]
	pub retention: Retention,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Names of the index collections. With the PostgreSQL backend these are table names; the
/// catalog's event rows live in `<catalog>_events`.
#[derive(Debug, Clone, Deserialize)]
pub struct Index {
	pub catalog: String,
	pub suggestions: String,
	#[serde(default = "default_query_timeout_ms")]
	pub query_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	/// Lower bound on the number of documents requested per index round trip.
	pub fetch_floor: u32,
	pub default_max: u32,
	pub max_page_size: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self { fetch_floor: 100, default_max: 50, max_page_size: 1_000 }
	}
}

/// Time zone used to bucket events into guide days.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Guide {
	pub utc_offset_minutes: i16,
	pub eu_summer_time: bool,
}
impl Default for Guide {
	fn default() -> Self {
		Self { utc_offset_minutes: 60, eu_summer_time: true }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Visibility {
	pub privileged_roles: Vec<String>,
	pub restricted_window_days: i64,
	/// Absent means privileged roles see the whole schedule.
	pub privileged_window_days: Option<i64>,
}
impl Default for Visibility {
	fn default() -> Self {
		Self {
			privileged_roles: vec!["admin".to_string(), "superuser".to_string()],
			restricted_window_days: 3,
			privileged_window_days: None,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Suggestions {
	pub default_max: u32,
	pub candidate_pool: u32,
	pub capture: bool,
}
impl Default for Suggestions {
	fn default() -> Self {
		Self { default_max: 10, candidate_pool: 50, capture: true }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Retention {
	pub ttl_days: i64,
	pub interval_seconds: u64,
}
impl Default for Retention {
	fn default() -> Self {
		Self { ttl_days: 14, interval_seconds: 3_600 }
	}
}

fn default_query_timeout_ms() -> u64 {
	5_000
}

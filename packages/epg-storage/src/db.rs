use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{Error, Result, schema};

const MAX_IDENTIFIER_LEN: usize = 48;

/// Table names backing one catalog and its suggestion store.
///
/// Names are interpolated into SQL, so they are checked here even though configuration validates
/// them as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
	pub catalog: String,
	pub events: String,
	pub suggestions: String,
}
impl Tables {
	pub fn new(catalog: &str, suggestions: &str) -> Result<Self> {
		for name in [catalog, suggestions] {
			if !is_identifier(name) {
				return Err(Error::InvalidArgument(format!(
					"{name:?} is not a valid table name."
				)));
			}
		}

		let events = format!("{catalog}_events");

		if events == suggestions {
			return Err(Error::InvalidArgument(
				"suggestion table collides with the catalog event table.".to_string(),
			));
		}

		Ok(Self { catalog: catalog.to_string(), events, suggestions: suggestions.to_string() })
	}

	pub fn from_config(cfg: &epg_config::Index) -> Result<Self> {
		Self::new(&cfg.catalog, &cfg.suggestions)
	}
}

pub struct Db {
	pub pool: PgPool,
	pub tables: Tables,
}
impl Db {
	pub async fn connect(cfg: &epg_config::Postgres, tables: Tables) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;

		Ok(Self { pool, tables })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema(&self.tables);
		let lock_id: i64 = 5_330_417;
		// Advisory locks are held per connection; the transaction pins one and releases it on end.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)").bind(lock_id).execute(&mut *tx).await?;

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		Ok(())
	}
}

fn is_identifier(name: &str) -> bool {
	let mut chars = name.chars();

	name.len() <= MAX_IDENTIFIER_LEN
		&& chars.next().is_some_and(|c| c.is_ascii_lowercase() || c == '_')
		&& chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

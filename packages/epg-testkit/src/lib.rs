//! Scratch PostgreSQL databases holding an EPG schema, for integration tests.
//!
//! Each [`TestDatabase`] is created from the maintenance database reachable through `EPG_PG_DSN`
//! and dropped again by [`TestDatabase::cleanup`], or on drop as a fallback.

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection,
	postgres::{PgConnectOptions, PgConnection},
};
use uuid::Uuid;

use epg_config::Postgres;
use epg_storage::db::{Db, Tables};

const DSN_VAR: &str = "EPG_PG_DSN";
const MAINTENANCE_DBS: [&str; 2] = ["postgres", "template1"];
const POOL_MAX_CONNS: u32 = 2;

pub fn env_dsn() -> Option<String> {
	env::var(DSN_VAR).ok()
}

/// Table names most tests use.
pub fn guide_tables() -> Result<Tables> {
	Ok(Tables::new("guide", "guide_suggestions")?)
}

pub struct TestDatabase {
	name: String,
	postgres: Postgres,
	maintenance: Maintenance,
	dropped: bool,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::InvalidDsn(err.to_string()))?;
		let maintenance = Maintenance::locate(&base).await?;
		let name = format!("epg_test_{}", Uuid::new_v4().simple());

		maintenance.create(&name).await?;

		let dsn = base.database(&name).to_url_lossy().to_string();
		let postgres = Postgres { dsn, pool_max_conns: POOL_MAX_CONNS };

		Ok(Self { name, postgres, maintenance, dropped: false })
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn dsn(&self) -> &str {
		&self.postgres.dsn
	}

	pub fn postgres(&self) -> &Postgres {
		&self.postgres
	}

	/// Connects without touching the schema.
	pub async fn connect(&self, tables: Tables) -> Result<Db> {
		Ok(Db::connect(&self.postgres, tables).await?)
	}

	/// Connects and creates the catalog, event and suggestion tables.
	pub async fn bootstrap(&self, tables: Tables) -> Result<Db> {
		let db = self.connect(tables).await?;

		db.ensure_schema().await?;

		Ok(db)
	}

	pub async fn cleanup(mut self) -> Result<()> {
		self.maintenance.drop_database(&self.name).await?;
		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		// Drop may run inside a runtime that cannot block, so use a private one on its own thread.
		let name = self.name.clone();
		let maintenance = self.maintenance.clone();
		let worker = thread::spawn(move || {
			let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build();
			let outcome = match runtime {
				Ok(runtime) => runtime.block_on(maintenance.drop_database(&name)),
				Err(err) => {
					eprintln!("Leaking scratch database {name}: {err}.");

					return;
				},
			};

			if let Err(err) = outcome {
				eprintln!("Leaking scratch database {name}: {err}.");
			}
		});

		let _ = worker.join();
	}
}

/// Connection to a database that may create and drop others.
#[derive(Clone)]
struct Maintenance {
	options: PgConnectOptions,
}
impl Maintenance {
	async fn locate(base: &PgConnectOptions) -> Result<Self> {
		let mut failures = Vec::new();

		for database in MAINTENANCE_DBS {
			let options = base.clone().database(database);

			match PgConnection::connect_with(&options).await {
				Ok(conn) => {
					let _ = conn.close().await;

					return Ok(Self { options });
				},
				Err(err) => failures.push(format!("{database}: {err}")),
			}
		}

		Err(Error::NoMaintenanceDb(failures.join("; ")))
	}

	async fn create(&self, name: &str) -> Result<()> {
		let mut conn = self.open(name).await?;

		sqlx::query(&format!(r#"CREATE DATABASE "{name}""#))
			.execute(&mut conn)
			.await
			.map_err(|source| Error::Scratch { name: name.to_string(), source })?;

		Ok(())
	}

	async fn drop_database(&self, name: &str) -> Result<()> {
		let mut conn = self.open(name).await?;

		// Pools left open by the test would otherwise block the drop.
		let _ = sqlx::query(
			"SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
			 WHERE datname = $1 AND pid <> pg_backend_pid()",
		)
		.bind(name)
		.fetch_all(&mut conn)
		.await;

		sqlx::query(&format!(r#"DROP DATABASE IF EXISTS "{name}""#))
			.execute(&mut conn)
			.await
			.map_err(|source| Error::Scratch { name: name.to_string(), source })?;

		Ok(())
	}

	async fn open(&self, name: &str) -> Result<PgConnection> {
		PgConnection::connect_with(&self.options)
			.await
			.map_err(|source| Error::Scratch { name: name.to_string(), source })
	}
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid base DSN: {0}")]
	InvalidDsn(String),
	#[error("No maintenance database reachable: {0}")]
	NoMaintenanceDb(String),
	#[error("Scratch database {name}: {source}")]
	Scratch { name: String, source: sqlx::Error },
	#[error(transparent)]
	Storage(#[from] epg_storage::Error),
}

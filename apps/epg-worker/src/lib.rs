use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use epg_service::{EpgService, Indexes, PgIndex};
use epg_storage::db::{Db, Tables};

#[derive(Debug, Parser)]
#[command(
	version = epg_cli::VERSION,
	rename_all = "kebab",
	styles = epg_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = epg_config::load(&args.config)?;

	init_tracing(&config);

	let tables = Tables::from_config(&config.index)?;
	let db = Db::connect(&config.storage.postgres, tables).await?;

	db.ensure_schema().await?;

	let index = Arc::new(PgIndex::new(db));
	let service = EpgService::new(config, Indexes::shared(index))?;
	let retention = service.start_retention();

	tracing::info!(
		ttl_days = service.cfg.retention.ttl_days,
		interval_seconds = service.cfg.retention.interval_seconds,
		"Suggestion retention started."
	);

	tokio::signal::ctrl_c().await?;

	tracing::info!("Shutdown requested.");

	retention.shutdown().await;

	Ok(())
}

fn init_tracing(config: &epg_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}

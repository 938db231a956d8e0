use clap::Parser;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = epg_worker::Args::parse();

	epg_worker::run(args).await
}

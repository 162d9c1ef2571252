use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = remit_lookup::Args::parse();

	remit_lookup::run(args).await
}

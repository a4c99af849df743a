mod cli;
mod commands;
mod platform;

use clap::Parser;
use zeppelin_logging::zeppelin_error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    platform::logging::initialize(cli.log, cli.verbose);

    let config = platform::settings::resolve(&cli.connection)?;
    if let Err(err) = commands::run(config, &cli.connection, cli.command).await {
        zeppelin_error!("command failed: {err:#}");
        return Err(err);
    }
    Ok(())
}

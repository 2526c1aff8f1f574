use std::{path::PathBuf, process::ExitCode};

use cinder_crypto::{HashingSettings, PasswordHasher};
use cinder_fs::toml::FromToml;
use cinder_telemetry::Telemetry;
use clap::Parser;
use cmd::Command;
use color_eyre::eyre::eyre;
use config::Config;
use garde::Validate;
use tracing::info;

mod cmd;
mod config;

/// Hash and verify passwords with PBKDF2.
#[derive(Debug, Parser)]
#[command(name = "cinder", version, about)]
struct Cli {
    /// Configuration file, defaults to `config/cinder.toml`.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let cfg = {
        let _g = Telemetry::bootstrap();

        let cfg = Config::from_toml_path_or_default(cli.config).await?;
        cfg.validate().map_err(|report| eyre!("invalid config: {report}"))?;
        cfg
    };

    Telemetry::new(&cfg.telemetry).init()?;
    info!(config = %cfg, "starting");

    let hasher = PasswordHasher::new(HashingSettings::try_from(cfg.hashing)?);
    cli.command.run(hasher).await
}

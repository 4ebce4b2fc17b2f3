use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use super::context::CliContext;
use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::{
    apply_env_overrides, init_logging, load_config, load_local_env_overrides, LoadedConfig,
};
use crate::metrics;

pub async fn run() -> Result<()> {
    load_local_env_overrides();
    let cli = CliArgs::parse();

    init_logging(&cli.log_level, cli.debug)?;
    let _metrics_server = metrics::spawn_metrics_server(cli.metrics_port);

    info!(
        build_date = env!("KINSHIP_BUILD_DATE"),
        git = env!("KINSHIP_GIT_HASH"),
        "Starting Kinship v{}",
        env!("CARGO_PKG_VERSION")
    );

    let LoadedConfig { mut config, path } = load_config(cli.config.as_ref()).await?;
    apply_env_overrides(&mut config);
    let cli_context = CliContext::new(config, path, cli.metrics_port);

    match dispatch(&cli, &cli_context).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {}", err);
            Err(err)
        }
    }
}

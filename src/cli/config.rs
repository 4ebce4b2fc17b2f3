use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use tokio::fs;

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;
use crate::Config;

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration (file plus environment overrides)
    Show,

    /// Validate the configuration file
    Validate,
}

pub async fn cmd_config(args: ConfigArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let path = ctx.config_path().to_path_buf();
    match args.action {
        ConfigAction::Show => {
            if !output.emit(ctx.config())? {
                println!("Current configuration ({}):", path.display());
                print!("{}", serde_yaml::to_string(ctx.config())?);
            }
        }
        ConfigAction::Validate => {
            let config = if fs::try_exists(&path).await? {
                let raw = fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_yaml::from_str::<Config>(&raw)
                    .with_context(|| format!("parsing {}", path.display()))?
            } else {
                println!(
                    "No configuration file at {}; checking defaults",
                    path.display()
                );
                Config::default()
            };

            let problems = config.problems();
            if !problems.is_empty() {
                for problem in &problems {
                    eprintln!("- {}", problem);
                }
                bail!("{} has {} problem(s)", path.display(), problems.len());
            }
            println!("Configuration {} is valid", path.display());
        }
    }

    Ok(())
}

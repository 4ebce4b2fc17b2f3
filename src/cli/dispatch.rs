use super::config::cmd_config;
use super::env::CliArgs;
use super::friends::cmd_friends;
use super::recommend::cmd_recommend;
use super::serve::cmd_serve;
use super::users::cmd_users;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Serve(args) => cmd_serve(args, ctx).await,
        Commands::Recommend(args) => cmd_recommend(args, ctx, cli.output.clone()).await,
        Commands::Users(args) => cmd_users(args, ctx, cli.output.clone()).await,
        Commands::Friends(args) => cmd_friends(args, ctx, cli.output.clone()).await,
        Commands::Config(args) => cmd_config(args, ctx, cli.output.clone()).await,
    }
}

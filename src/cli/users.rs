use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use kinship_core_types::{User, UserId, UserProfile};
use kinship_graph_store::{GraphStore, GraphWriter};
use tracing::info;

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;

#[derive(Args, Clone, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub action: UsersAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum UsersAction {
    /// List registered users, optionally filtered by username or email
    List {
        /// Case-insensitive substring to match
        #[arg(long)]
        query: Option<String>,

        /// Maximum rows to print (defaults to search.default_limit)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Register a new user
    Add {
        username: String,
        email: String,

        /// Interest tag (repeat for multiple)
        #[arg(long = "interest", value_name = "TAG")]
        interests: Vec<String>,
    },

    /// Show one user with friends and pending requests
    Show { user_id: String },
}

pub async fn cmd_users(args: UsersArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let store = ctx.store().await?;
    match args.action {
        UsersAction::List { query, limit } => {
            let users = match query {
                Some(query) => {
                    let limit = ctx.config().search.clamp(limit);
                    store.search_users(&query, limit).await?
                }
                None => {
                    let mut users = store.list_users().await?;
                    if let Some(limit) = limit {
                        users.truncate(limit);
                    }
                    users
                }
            };
            let profiles: Vec<UserProfile> = users.iter().map(User::profile).collect();
            if !output.emit(&profiles)? {
                print_profiles(&profiles);
            }
        }
        UsersAction::Add {
            username,
            email,
            interests,
        } => {
            let user = User::register(&username, &email, &interests)?;
            let stored = store
                .insert_user(user)
                .await
                .with_context(|| format!("registering {}", username))?;
            info!(user = %stored.id, "user registered");
            let profile = stored.profile();
            if !output.emit(&profile)? {
                println!("Registered {} ({})", profile.username, profile.id);
            }
        }
        UsersAction::Show { user_id } => {
            let user = store.get_user(&UserId::from(user_id)).await?;
            if !output.emit(&user)? {
                println!("{} <{}>", user.username, user.email);
                println!("- ID: {}", user.id);
                println!("- Joined: {}", user.created_at.to_rfc3339());
                println!("- Interests: {}", join_or_dash(user.interests.iter()));
                println!("- Friends: {}", join_or_dash(user.friends.iter()));
                println!(
                    "- Pending requests: {}",
                    join_or_dash(user.friend_requests.iter())
                );
            }
        }
    }
    Ok(())
}

fn print_profiles(profiles: &[UserProfile]) {
    println!(
        "{:<36} {:<20} {:<28} {}",
        "ID", "USERNAME", "EMAIL", "INTERESTS"
    );
    for profile in profiles {
        println!(
            "{:<36} {:<20} {:<28} {}",
            profile.id,
            profile.username,
            profile.email,
            join_or_dash(profile.interests.iter())
        );
    }
}

fn join_or_dash<I, T>(items: I) -> String
where
    I: Iterator<Item = T>,
    T: std::fmt::Display,
{
    let joined = items.map(|item| item.to_string()).collect::<Vec<_>>().join(",");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}

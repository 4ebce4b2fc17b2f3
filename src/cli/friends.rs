use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use kinship_core_types::UserId;
use kinship_friend_requests::FriendRequests;
use serde_json::json;

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;

#[derive(Args, Clone, Debug)]
pub struct FriendsArgs {
    #[command(subcommand)]
    pub action: FriendsAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum FriendsAction {
    /// Send a friend request from FROM to TO
    Request { from: String, to: String },

    /// Accept the request REQUESTER sent to USER
    Accept { user: String, requester: String },

    /// Decline the request REQUESTER sent to USER
    Decline { user: String, requester: String },

    /// Withdraw the request REQUESTER sent to RECIPIENT
    Cancel { requester: String, recipient: String },

    /// End the friendship between USER and FRIEND
    Remove { user: String, friend: String },

    /// Print the relation between two users
    Status { a: String, b: String },
}

pub async fn cmd_friends(args: FriendsArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let service = FriendRequests::new(ctx.store().await?);
    let (action, a, b) = match args.action {
        FriendsAction::Request { from, to } => {
            service.send_request(&id(&from), &id(&to)).await?;
            ("requested", from, to)
        }
        FriendsAction::Accept { user, requester } => {
            service
                .accept_request(&id(&user), &id(&requester))
                .await?;
            ("accepted", user, requester)
        }
        FriendsAction::Decline { user, requester } => {
            service
                .decline_request(&id(&user), &id(&requester))
                .await?;
            ("declined", user, requester)
        }
        FriendsAction::Cancel {
            requester,
            recipient,
        } => {
            service
                .cancel_request(&id(&requester), &id(&recipient))
                .await?;
            ("cancelled", requester, recipient)
        }
        FriendsAction::Remove { user, friend } => {
            service
                .remove_friend(&id(&user), &id(&friend))
                .await?;
            ("removed", user, friend)
        }
        FriendsAction::Status { a, b } => {
            let relation = service
                .relation(&id(&a), &id(&b))
                .await
                .with_context(|| format!("reading relation between {} and {}", a, b))?;
            if !output.emit(&json!({ "a": a, "b": b, "relation": relation }))? {
                println!("{} / {}: {}", a, b, relation);
            }
            return Ok(());
        }
    };

    if !output.emit(&json!({ "action": action, "a": a, "b": b }))? {
        println!("{}: {} -> {}", action, a, b);
    }
    Ok(())
}

fn id(raw: &str) -> UserId {
    UserId::from(raw.trim())
}

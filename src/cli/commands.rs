use clap::Subcommand;

use super::config::ConfigArgs;
use super::friends::FriendsArgs;
use super::recommend::RecommendArgs;
use super::serve::ServeArgs;
use super::users::UsersArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),

    /// Print ranked friend suggestions for a user
    Recommend(RecommendArgs),

    /// Register, list and inspect users
    Users(UsersArgs),

    /// Send, accept and remove friend requests
    Friends(FriendsArgs),

    /// Inspect the active configuration
    Config(ConfigArgs),
}

pub mod app;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod friends;
pub mod output;
pub mod recommend;
pub mod runtime;
pub mod serve;
pub mod users;

pub use serve::{cmd_serve, ServeArgs};

pub mod cli;
pub mod config;
pub mod persist;

pub use cli::{Cli, Commands};
pub use config::SwmmConfig;

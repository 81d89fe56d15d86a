use std::error::Error;

use config::CrossbarConfig;
use state::CrossbarState;
use tracing_subscriber::EnvFilter;

pub mod api;
pub mod cli;
pub mod command;
pub mod config;
pub mod entity;
pub mod matrix;
pub mod state;
pub mod widgets;

pub const VERSION: f32 = 0.1;
pub const CONFIG_VERSION: f32 = 0.1;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = CrossbarConfig::from_file("./config.ron")?;
    let state = CrossbarState::init(cfg)?;

    api::init(state).await?;

    Ok(())
}

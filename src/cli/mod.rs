//! CLI module for the ShareLM gateway
//!
//! - `serve`: run the HTTP gateway
//! - `add-key`: register an API key directly in the configured key store

pub mod add_key;
pub mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// ShareLM gateway - API key admission and rate limiting in front of a model server
#[derive(Parser)]
#[command(name = "sharelm-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to configs/api_config.*)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the gateway HTTP server
    Serve,

    /// Register an API key without going through the HTTP admin endpoint
    AddKey(add_key::AddKeyArgs),
}

impl Cli {
    /// Load `.env`, then the layered configuration
    pub fn load_config(&self) -> anyhow::Result<AppConfig> {
        dotenvy::dotenv().ok();
        Ok(AppConfig::load_from(self.config.as_deref())?)
    }
}

//! Add-key command - offline provisioning into the configured key store

use clap::Args;

use crate::config::AppConfig;
use crate::domain::api_key::ProvisionOutcome;
use crate::infrastructure::api_key::{ApiKeyGenerator, KeyStore};

#[derive(Args, Debug)]
pub struct AddKeyArgs {
    /// Owner recorded with the key
    #[arg(long, alias = "user-id")]
    pub owner: String,

    /// Key to register; a random one is generated when omitted
    #[arg(long)]
    pub key: Option<String>,
}

/// Register the key and print it, or report that it already exists
pub async fn run(config: AppConfig, args: AddKeyArgs) -> anyhow::Result<()> {
    let key_store = crate::open_key_store(&config).await?;
    let outcome = add_key(&key_store, &args).await?;

    println!("{}\t{}", outcome.status(), outcome.key());
    Ok(())
}

async fn add_key(key_store: &KeyStore, args: &AddKeyArgs) -> anyhow::Result<ProvisionOutcome> {
    let outcome = key_store
        .provision(&args.owner, args.key.as_deref(), &ApiKeyGenerator::default())
        .await?;
    Ok(outcome)
}

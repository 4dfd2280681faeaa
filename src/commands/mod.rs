// Provider bootstrap
pub mod invoke;
pub mod schema;
pub mod serve;

use anyhow::{Context as AnyhowContext, Result};
use declarative::{Provider, ProviderBuilder};

use crate::config::ProviderConfig;
use crate::resource;

/// Build the provider from config, registering every resource
pub fn build_provider(config: &ProviderConfig) -> Result<Provider> {
    let identity = &config.provider;
    let builder = ProviderBuilder::new()
        .with_name(&identity.name)
        .with_version(&identity.version)
        .with_namespace(&identity.namespace);

    let provider = resource::register(builder)
        .build()
        .context("Failed to build provider")?;

    log::debug!(
        "Built provider {} {} serving {}",
        provider.name(),
        provider.version(),
        provider.resource_types().join(", ")
    );
    Ok(provider)
}

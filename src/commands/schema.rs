use anyhow::{Context as AnyhowContext, Result};
use declarative::Provider;

use crate::Context;

/// Print the provider schema to stdout
pub fn run(ctx: &Context) -> Result<()> {
    let provider = super::build_provider(&ctx.config)?;
    println!("{}", render(&provider)?);
    Ok(())
}

/// Pretty JSON rendering of the provider schema
pub fn render(provider: &Provider) -> Result<String> {
    serde_json::to_string_pretty(&provider.schema()).context("Failed to encode schema")
}

use anyhow::{Context as AnyhowContext, Result, bail};
use declarative::{Provider, Request, Response};
use std::io::{self, Read};

use crate::Context;

/// Handle a single request given inline or on stdin ("-")
pub fn run(ctx: &Context, request: &str) -> Result<()> {
    let raw = if request == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        buf
    } else {
        request.to_string()
    };

    let provider = super::build_provider(&ctx.config)?;
    let response = invoke(&provider, &raw)?;
    if !(ctx.quiet && response.ok) {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).context("Failed to encode response")?
        );
    }

    if let Some(error) = response.error {
        bail!("{} failed: {}", method_of(&raw), error);
    }
    Ok(())
}

/// Parse and handle one request
pub fn invoke(provider: &Provider, raw: &str) -> Result<Response> {
    let request: Request = serde_json::from_str(raw.trim()).context("Invalid request JSON")?;
    Ok(provider.handle(request))
}

fn method_of(raw: &str) -> String {
    serde_json::from_str::<Request>(raw.trim())
        .map(|r| r.method().to_string())
        .unwrap_or_else(|_| "request".to_string())
}

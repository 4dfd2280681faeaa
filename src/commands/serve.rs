//! Line-delimited JSON request loop
//!
//! Each input line is one [`Request`]; each output line is one
//! [`Response`]. Stdout carries nothing else, so logging goes to stderr.

use anyhow::{Context as AnyhowContext, Result};
use declarative::{Provider, Request, Response};
use std::io::{self, BufRead, Write};

use crate::Context;

/// Counts from one serve session
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServeSummary {
    /// Requests dispatched to the provider
    pub handled: usize,
    /// Dispatched requests that returned an error
    pub failed: usize,
    /// Lines that could not be parsed as a request
    pub malformed: usize,
}

pub fn run(ctx: &Context) -> Result<()> {
    let provider = super::build_provider(&ctx.config)?;
    log::info!(
        "Serving {} {} on stdin/stdout",
        provider.name(),
        provider.version()
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let summary = serve(&provider, stdin.lock(), stdout.lock())?;

    log::info!(
        "Input closed after {} requests ({} failed, {} malformed)",
        summary.handled,
        summary.failed,
        summary.malformed
    );
    Ok(())
}

/// Serve requests from `input` until EOF
///
/// Blank lines are skipped. A malformed line gets an error response and
/// the loop continues.
pub fn serve<R: BufRead, W: Write>(
    provider: &Provider,
    input: R,
    mut output: W,
) -> Result<ServeSummary> {
    let mut summary = ServeSummary::default();

    for line in input.split(b'\n') {
        let line = line.context("Failed to read request")?;
        let line = line.trim_ascii();
        if line.is_empty() {
            continue;
        }

        // Invalid UTF-8 surfaces as a decode error here, not a read error
        let response = match serde_json::from_slice::<Request>(line) {
            Ok(request) => {
                summary.handled += 1;
                let response = provider.handle(request);
                if !response.ok {
                    summary.failed += 1;
                }
                response
            }
            Err(e) => {
                log::warn!("Malformed request: {}", e);
                summary.malformed += 1;
                Response::failure(format!("malformed request: {}", e), Vec::new())
            }
        };

        write_response(&mut output, &response)?;
    }

    Ok(summary)
}

fn write_response<W: Write>(output: &mut W, response: &Response) -> Result<()> {
    serde_json::to_writer(&mut *output, response).context("Failed to encode response")?;
    output
        .write_all(b"\n")
        .and_then(|()| output.flush())
        .context("Failed to write response")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::build_provider;
    use crate::config::ProviderConfig;
    use serde_json::{Value, json};
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn run_lines(lines: &[Value]) -> (ServeSummary, Vec<Response>) {
        let provider = build_provider(&ProviderConfig::default()).unwrap();
        let input = lines
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join("\n");

        let mut output = Vec::new();
        let summary = serve(&provider, Cursor::new(input), &mut output).unwrap();

        let responses = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (summary, responses)
    }

    #[test]
    fn test_full_lifecycle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt").to_string_lossy().to_string();
        let state = json!({"path": path, "force": false, "content": "hi"});

        let (summary, responses) = run_lines(&[
            json!({"method": "check", "type": "file:index:File", "name": "a",
                   "news": {"path": path, "content": "hi"}}),
            json!({"method": "create", "type": "file:index:File",
                   "inputs": {"path": path, "content": "hi"}}),
            json!({"method": "create", "type": "file:index:File",
                   "inputs": {"path": path, "content": "hi"}}),
            json!({"method": "diff", "type": "file:index:File", "id": path,
                   "inputs": {"path": path, "content": "hi"}, "state": state}),
            json!({"method": "read", "type": "file:index:File", "id": path, "state": state}),
            json!({"method": "delete", "type": "file:index:File", "id": path, "state": state}),
            json!({"method": "delete", "type": "file:index:File", "id": path, "state": state}),
        ]);

        assert_eq!(summary.handled, 7);
        assert_eq!(summary.failed, 1);
        assert_eq!(responses.len(), 7);

        let check = responses[0].result.as_ref().unwrap();
        assert!(check["failures"].as_array().unwrap().is_empty());

        let created = responses[1].result.as_ref().unwrap();
        assert_eq!(created["id"], path.as_str());
        assert_eq!(created["state"], state);

        assert!(!responses[2].ok);
        assert_eq!(
            responses[2].error.as_deref(),
            Some("file exists; pass force=true to override")
        );

        let plan = responses[3].result.as_ref().unwrap();
        assert_eq!(plan["hasChanges"], false);

        let read = responses[4].result.as_ref().unwrap();
        assert_eq!(read["state"]["content"], "hi");

        assert!(responses[5].ok);
        assert!(responses[5].diagnostics.is_empty());
        assert!(responses[6].ok);
        assert_eq!(responses[6].diagnostics.len(), 1);
        assert!(!dir.path().join("a.txt").exists());
    }

    #[test]
    fn test_dry_run_create_leaves_filesystem_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        let (_, responses) = run_lines(&[json!({
            "method": "create",
            "type": "file:index:File",
            "inputs": {"path": path.to_string_lossy(), "force": true, "content": "hi"},
            "dryRun": true
        })]);

        assert!(responses[0].ok);
        assert!(responses[0].result.as_ref().unwrap()["state"].is_null());
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_malformed_line_does_not_stop_loop() {
        let provider = build_provider(&ProviderConfig::default()).unwrap();
        let input = "not json\n\n{\"method\":\"getSchema\"}\n";

        let mut output = Vec::new();
        let summary = serve(&provider, Cursor::new(input), &mut output).unwrap();

        assert_eq!(summary.malformed, 1);
        assert_eq!(summary.handled, 1);

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Response = serde_json::from_str(lines[0]).unwrap();
        assert!(first.error.unwrap().starts_with("malformed request"));

        let second: Response = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.result.unwrap()["name"], "file");
    }

    #[test]
    fn test_invalid_utf8_line_does_not_stop_loop() {
        let provider = build_provider(&ProviderConfig::default()).unwrap();
        let input: &[u8] = b"\xff\xfe\n{\"method\":\"getSchema\"}\n";

        let mut output = Vec::new();
        let summary = serve(&provider, Cursor::new(input), &mut output).unwrap();

        assert_eq!(summary.malformed, 1);
        assert_eq!(summary.handled, 1);

        let text = String::from_utf8(output).unwrap();
        let responses: Vec<Response> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 2);
        assert!(!responses[0].ok);
        assert!(
            responses[0]
                .error
                .as_deref()
                .unwrap()
                .starts_with("malformed request")
        );
        assert!(responses[1].ok);
    }
}

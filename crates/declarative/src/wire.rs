//! Request and response envelopes exchanged with the orchestrator
//!
//! Requests are JSON objects tagged by `method`:
//!
//! ```text
//! {"method":"create","type":"file:index:File","inputs":{...},"dryRun":false}
//! ```

use crate::context::Diagnostic;
use crate::types::PropertyMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A lifecycle call from the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum Request {
    /// Describe every registered resource
    GetSchema,

    Check {
        #[serde(rename = "type")]
        resource_type: String,
        name: String,
        #[serde(default)]
        news: PropertyMap,
    },

    #[serde(rename_all = "camelCase")]
    Create {
        #[serde(rename = "type")]
        resource_type: String,
        inputs: Value,
        #[serde(default)]
        dry_run: bool,
    },

    Read {
        #[serde(rename = "type")]
        resource_type: String,
        id: String,
        #[serde(default)]
        state: Option<Value>,
    },

    #[serde(rename_all = "camelCase")]
    Update {
        #[serde(rename = "type")]
        resource_type: String,
        id: String,
        inputs: Value,
        state: Value,
        #[serde(default)]
        dry_run: bool,
    },

    Delete {
        #[serde(rename = "type")]
        resource_type: String,
        id: String,
        state: Value,
    },

    Diff {
        #[serde(rename = "type")]
        resource_type: String,
        id: String,
        inputs: Value,
        state: Value,
    },
}

impl Request {
    /// Method name as it appears on the wire
    pub fn method(&self) -> &'static str {
        match self {
            Self::GetSchema => "getSchema",
            Self::Check { .. } => "check",
            Self::Create { .. } => "create",
            Self::Read { .. } => "read",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Diff { .. } => "diff",
        }
    }

    /// Whether the call runs in preview mode
    pub fn is_dry_run(&self) -> bool {
        match self {
            Self::Create { dry_run, .. } | Self::Update { dry_run, .. } => *dry_run,
            _ => false,
        }
    }
}

/// Outcome of a lifecycle call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl Response {
    pub fn success(result: Option<Value>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            ok: true,
            result,
            error: None,
            diagnostics,
        }
    }

    pub fn failure(error: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.into()),
            diagnostics,
        }
    }
}

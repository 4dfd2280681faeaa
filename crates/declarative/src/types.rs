//! Core types for lifecycle operations

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Untyped property bag as exchanged with the orchestrator
pub type PropertyMap = serde_json::Map<String, serde_json::Value>;

/// A single validation failure reported by `check`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    /// Property the failure applies to
    pub property: String,
    /// Human-readable reason
    pub reason: String,
}

impl CheckFailure {
    pub fn new(property: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            reason: reason.into(),
        }
    }
}

/// Result of `check`: normalized inputs plus any validation failures
///
/// The inputs are returned even when failures are present so callers can
/// inspect the normalization that was applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub inputs: PropertyMap,
    #[serde(default)]
    pub failures: Vec<CheckFailure>,
}

impl CheckResponse {
    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Decode the normalized inputs into a typed value
    pub fn decode<I: DeserializeOwned>(&self) -> serde_json::Result<I> {
        serde_json::from_value(serde_json::Value::Object(self.inputs.clone()))
    }
}

/// Result of `create`
///
/// `state` is `None` for previews, where only the identity is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse<S> {
    pub id: String,
    pub state: Option<S>,
}

impl<S> CreateResponse<S> {
    /// Identity only, nothing materialized
    pub fn preview(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: None,
        }
    }

    pub fn created(id: impl Into<String>, state: S) -> Self {
        Self {
            id: id.into(),
            state: Some(state),
        }
    }
}

/// Result of `update`; `None` state means nothing was materialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse<S> {
    pub state: Option<S>,
}

impl<S> UpdateResponse<S> {
    pub fn preview() -> Self {
        Self { state: None }
    }

    pub fn updated(state: S) -> Self {
        Self { state: Some(state) }
    }
}

/// Result of `read`: the refreshed desired and recorded views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResponse<I, S> {
    pub id: String,
    pub inputs: I,
    pub state: S,
}

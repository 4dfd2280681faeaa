//! Diff vocabulary for planning changes to a resource

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a single property change must be carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum DiffKind {
    /// Property is added
    Add,
    /// Property is added and the resource must be replaced
    AddReplace,
    /// Property is removed
    Delete,
    /// Property is removed and the resource must be replaced
    DeleteReplace,
    /// Property changes in place
    Update,
    /// Property changes and the resource must be replaced
    UpdateReplace,
}

impl DiffKind {
    /// Whether this kind forces destroy-then-recreate
    pub fn is_replace(&self) -> bool {
        matches!(
            self,
            Self::AddReplace | Self::DeleteReplace | Self::UpdateReplace
        )
    }
}

/// Change planned for one property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDiff {
    pub kind: DiffKind,
}

impl From<DiffKind> for PropertyDiff {
    fn from(kind: DiffKind) -> Self {
        Self { kind }
    }
}

/// Plan produced by `diff`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResponse {
    /// Replacements must delete the old resource before creating the new one
    pub delete_before_replace: bool,
    /// Whether any change exists
    pub has_changes: bool,
    /// Field name to change kind
    pub detailed_diff: BTreeMap<String, PropertyDiff>,
}

impl DiffResponse {
    /// Build a plan from per-field changes
    pub fn from_detailed(
        detailed_diff: BTreeMap<String, PropertyDiff>,
        delete_before_replace: bool,
    ) -> Self {
        Self {
            delete_before_replace,
            has_changes: !detailed_diff.is_empty(),
            detailed_diff,
        }
    }

    /// Fields whose change forces replacement
    pub fn replaces(&self) -> Vec<&str> {
        self.detailed_diff
            .iter()
            .filter(|(_, d)| d.kind.is_replace())
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Whether the plan replaces the resource
    pub fn requires_replace(&self) -> bool {
        self.detailed_diff.values().any(|d| d.kind.is_replace())
    }

    /// Kind planned for a field, if any
    pub fn kind_of(&self, field: &str) -> Option<DiffKind> {
        self.detailed_diff.get(field).map(|d| d.kind)
    }
}

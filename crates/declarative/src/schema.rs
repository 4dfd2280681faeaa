//! Resource schemas and schema-driven input validation

use crate::types::{CheckFailure, CheckResponse, PropertyMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// JSON type of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    String,
    Bool,
    Number,
    Object,
    Array,
}

impl PropertyKind {
    /// Whether a JSON value has this kind
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Bool => value.is_boolean(),
            Self::Number => value.is_number(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

fn value_kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Declaration of one input or output property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySpec {
    pub name: String,
    pub kind: PropertyKind,
    pub required: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl PropertySpec {
    pub fn required(name: &str, kind: PropertyKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            description: String::new(),
        }
    }

    pub fn optional(name: &str, kind: PropertyKind) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind)
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// Output field to the input fields it is derived from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldDependencies {
    edges: BTreeMap<String, Vec<String>>,
}

impl FieldDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `output` is invalidated when `input` changes
    pub fn output_depends_on(&mut self, output: &str, input: &str) -> &mut Self {
        let inputs = self.edges.entry(output.to_string()).or_default();
        if !inputs.iter().any(|i| i == input) {
            inputs.push(input.to_string());
        }
        self
    }

    /// Inputs an output depends on
    pub fn inputs_for(&self, output: &str) -> &[String] {
        self.edges.get(output).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Schema for one resource type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSchema {
    pub token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub inputs: Vec<PropertySpec>,
    pub outputs: Vec<PropertySpec>,
    #[serde(default, skip_serializing_if = "FieldDependencies::is_empty")]
    pub dependencies: FieldDependencies,
}

impl ResourceSchema {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            dependencies: FieldDependencies::default(),
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_input(mut self, spec: PropertySpec) -> Self {
        self.inputs.push(spec);
        self
    }

    pub fn with_output(mut self, spec: PropertySpec) -> Self {
        self.outputs.push(spec);
        self
    }

    /// Look up an input declaration
    pub fn input(&self, name: &str) -> Option<&PropertySpec> {
        self.inputs.iter().find(|p| p.name == name)
    }
}

/// Validate raw inputs against a schema
///
/// Reports missing required properties, type mismatches and unknown
/// properties. A `null` value counts as absent and is dropped from the
/// returned inputs.
pub fn default_check(schema: &ResourceSchema, mut inputs: PropertyMap) -> CheckResponse {
    let mut failures = Vec::new();

    for spec in &schema.inputs {
        match inputs.get(&spec.name) {
            None | Some(Value::Null) => {
                if spec.required {
                    failures.push(CheckFailure::new(
                        &spec.name,
                        format!("missing required property '{}'", spec.name),
                    ));
                }
            }
            Some(value) if !spec.kind.matches(value) => {
                failures.push(CheckFailure::new(
                    &spec.name,
                    format!(
                        "expected {}, got {}",
                        spec.kind.name(),
                        value_kind_name(value)
                    ),
                ));
            }
            Some(_) => {}
        }
    }

    for key in inputs.keys() {
        if schema.input(key).is_none() {
            failures.push(CheckFailure::new(
                key,
                format!("unknown property '{}'", key),
            ));
        }
    }

    inputs.retain(|_, value| !value.is_null());
    CheckResponse { inputs, failures }
}

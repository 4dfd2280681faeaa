//! Resource trait for lifecycle-managed resources
//!
//! A Resource maps each orchestrator call (check, create, read, update,
//! delete, diff) onto concrete effects, with typed inputs and state.

use crate::context::OperationContext;
use crate::diff::DiffResponse;
use crate::error::ProviderError;
use crate::schema::{FieldDependencies, ResourceSchema, default_check};
use crate::types::{CheckResponse, CreateResponse, PropertyMap, ReadResponse, UpdateResponse};
use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// Core trait for declaratively-managed resources
///
/// # Example
///
/// ```ignore
/// use declarative::{CreateResponse, OperationContext, Resource};
///
/// #[derive(Debug)]
/// struct Marker;
///
/// impl Resource for Marker {
///     type Inputs = MarkerArgs;
///     type State = MarkerState;
///
///     fn type_token(&self) -> &'static str {
///         "marker:index:Marker"
///     }
///
///     fn create(
///         &self,
///         ctx: &mut OperationContext,
///         inputs: MarkerArgs,
///     ) -> anyhow::Result<CreateResponse<MarkerState>> {
///         if ctx.is_preview() {
///             return Ok(CreateResponse::preview(&inputs.name));
///         }
///         // ...
///     }
///     // ...
/// }
/// ```
pub trait Resource: Send + Sync + fmt::Debug {
    /// Desired state supplied by the user
    type Inputs: Serialize + DeserializeOwned + Clone + fmt::Debug;

    /// Recorded state persisted by the orchestrator between operations
    ///
    /// `Default` supplies the prior state when a read has none.
    type State: Serialize + DeserializeOwned + Clone + Default + fmt::Debug;

    /// Stable type token, e.g. "file:index:File"
    fn type_token(&self) -> &'static str;

    /// Property declarations and descriptions
    fn schema(&self) -> ResourceSchema;

    /// Normalize and validate raw inputs
    ///
    /// Must not touch the system. The default runs schema validation only.
    fn check(
        &self,
        ctx: &mut OperationContext,
        name: &str,
        news: PropertyMap,
    ) -> Result<CheckResponse> {
        let _ = (ctx, name);
        Ok(default_check(&self.schema(), news))
    }

    /// Materialize the resource
    fn create(
        &self,
        ctx: &mut OperationContext,
        inputs: Self::Inputs,
    ) -> Result<CreateResponse<Self::State>>;

    /// Refresh state from the system
    fn read(
        &self,
        ctx: &mut OperationContext,
        id: &str,
        state: Self::State,
    ) -> Result<ReadResponse<Self::Inputs, Self::State>>;

    /// Converge an existing resource in place
    fn update(
        &self,
        ctx: &mut OperationContext,
        id: &str,
        inputs: Self::Inputs,
        state: Self::State,
    ) -> Result<UpdateResponse<Self::State>>;

    /// Remove the resource
    fn delete(&self, ctx: &mut OperationContext, id: &str, state: Self::State) -> Result<()>;

    /// Classify the changes between desired inputs and recorded state
    fn diff(
        &self,
        ctx: &mut OperationContext,
        id: &str,
        inputs: Self::Inputs,
        state: Self::State,
    ) -> Result<DiffResponse>;

    /// Declare which outputs are derived from which inputs
    fn wire_dependencies(&self, deps: &mut FieldDependencies) {
        let _ = deps;
    }
}

/// JSON-in/JSON-out view of a [`Resource`], used by the provider registry
pub(crate) trait ErasedResource: Send + Sync + fmt::Debug {
    fn token(&self) -> &'static str;
    fn full_schema(&self) -> ResourceSchema;
    fn check_value(&self, ctx: &mut OperationContext, name: &str, news: PropertyMap)
    -> Result<Value>;
    fn create_value(&self, ctx: &mut OperationContext, inputs: Value) -> Result<Value>;
    fn read_value(&self, ctx: &mut OperationContext, id: &str, state: Option<Value>)
    -> Result<Value>;
    fn update_value(
        &self,
        ctx: &mut OperationContext,
        id: &str,
        inputs: Value,
        state: Value,
    ) -> Result<Value>;
    fn delete_value(&self, ctx: &mut OperationContext, id: &str, state: Value) -> Result<()>;
    fn diff_value(
        &self,
        ctx: &mut OperationContext,
        id: &str,
        inputs: Value,
        state: Value,
    ) -> Result<Value>;
}

fn decode<T: DeserializeOwned>(
    value: Value,
    operation: &'static str,
    what: &'static str,
) -> std::result::Result<T, ProviderError> {
    serde_json::from_value(value).map_err(|source| ProviderError::Decode {
        operation,
        what,
        source,
    })
}

fn encode<T: Serialize>(
    value: &T,
    operation: &'static str,
) -> std::result::Result<Value, ProviderError> {
    serde_json::to_value(value).map_err(|source| ProviderError::Encode { operation, source })
}

impl<R: Resource> ErasedResource for R {
    fn token(&self) -> &'static str {
        self.type_token()
    }

    fn full_schema(&self) -> ResourceSchema {
        let mut schema = self.schema();
        self.wire_dependencies(&mut schema.dependencies);
        schema
    }

    fn check_value(
        &self,
        ctx: &mut OperationContext,
        name: &str,
        news: PropertyMap,
    ) -> Result<Value> {
        let resp = self.check(ctx, name, news)?;
        Ok(encode(&resp, "check")?)
    }

    fn create_value(&self, ctx: &mut OperationContext, inputs: Value) -> Result<Value> {
        let inputs = decode(inputs, "create", "inputs")?;
        let resp = self.create(ctx, inputs)?;
        Ok(encode(&resp, "create")?)
    }

    fn read_value(
        &self,
        ctx: &mut OperationContext,
        id: &str,
        state: Option<Value>,
    ) -> Result<Value> {
        let state = match state {
            Some(Value::Null) | None => R::State::default(),
            Some(value) => decode(value, "read", "state")?,
        };
        let resp = self.read(ctx, id, state)?;
        Ok(encode(&resp, "read")?)
    }

    fn update_value(
        &self,
        ctx: &mut OperationContext,
        id: &str,
        inputs: Value,
        state: Value,
    ) -> Result<Value> {
        let inputs = decode(inputs, "update", "inputs")?;
        let state = decode(state, "update", "state")?;
        let resp = self.update(ctx, id, inputs, state)?;
        Ok(encode(&resp, "update")?)
    }

    fn delete_value(&self, ctx: &mut OperationContext, id: &str, state: Value) -> Result<()> {
        let state = decode(state, "delete", "state")?;
        self.delete(ctx, id, state)
    }

    fn diff_value(
        &self,
        ctx: &mut OperationContext,
        id: &str,
        inputs: Value,
        state: Value,
    ) -> Result<Value> {
        let inputs = decode(inputs, "diff", "inputs")?;
        let state = decode(state, "diff", "state")?;
        let resp = self.diff(ctx, id, inputs, state)?;
        Ok(encode(&resp, "diff")?)
    }
}

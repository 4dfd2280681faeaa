//! Provider registry - routes lifecycle calls to registered resources

use crate::context::OperationContext;
use crate::error::ProviderError;
use crate::resource::{ErasedResource, Resource};
use crate::schema::ResourceSchema;
use crate::wire::{Request, Response};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Schema for every resource a provider serves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSchema {
    pub name: String,
    pub version: String,
    pub namespace: String,
    pub resources: BTreeMap<String, ResourceSchema>,
}

/// Builder collecting resources before the provider starts serving
#[derive(Debug)]
pub struct ProviderBuilder {
    name: String,
    version: String,
    namespace: String,
    resources: Vec<Box<dyn ErasedResource>>,
}

impl ProviderBuilder {
    pub fn new() -> Self {
        Self {
            name: "provider".to_string(),
            version: "0.0.0".to_string(),
            namespace: String::new(),
            resources: Vec::new(),
        }
    }

    /// Register a resource type
    pub fn with_resource<R: Resource + 'static>(mut self, resource: R) -> Self {
        self.resources.push(Box::new(resource));
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Finish registration
    ///
    /// Fails if no resources were registered or two share a type token.
    pub fn build(self) -> std::result::Result<Provider, ProviderError> {
        if self.resources.is_empty() {
            return Err(ProviderError::NoResources);
        }

        let mut resources = BTreeMap::new();
        for resource in self.resources {
            let token = resource.token();
            if resources.insert(token.to_string(), resource).is_some() {
                return Err(ProviderError::DuplicateResource(token.to_string()));
            }
        }

        Ok(Provider {
            name: self.name,
            version: self.version,
            namespace: self.namespace,
            resources,
        })
    }
}

impl Default for ProviderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A set of resources served under one provider identity
#[derive(Debug)]
pub struct Provider {
    name: String,
    version: String,
    namespace: String,
    resources: BTreeMap<String, Box<dyn ErasedResource>>,
}

impl Provider {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Registered type tokens, sorted
    pub fn resource_types(&self) -> Vec<&str> {
        self.resources.keys().map(String::as_str).collect()
    }

    pub fn schema(&self) -> ProviderSchema {
        ProviderSchema {
            name: self.name.clone(),
            version: self.version.clone(),
            namespace: self.namespace.clone(),
            resources: self
                .resources
                .iter()
                .map(|(token, r)| (token.clone(), r.full_schema()))
                .collect(),
        }
    }

    /// Handle one request, turning any error into a failure response
    pub fn handle(&self, request: Request) -> Response {
        let method = request.method();
        let mut ctx = OperationContext::new(request.is_dry_run());

        match self.dispatch(request, &mut ctx) {
            Ok(result) => Response::success(result, ctx.into_diagnostics()),
            Err(e) => {
                log::debug!("{} failed: {:#}", method, e);
                Response::failure(format!("{:#}", e), ctx.into_diagnostics())
            }
        }
    }

    fn resource(&self, token: &str) -> std::result::Result<&dyn ErasedResource, ProviderError> {
        match self.resources.get(token) {
            Some(resource) => Ok(resource.as_ref()),
            None => Err(ProviderError::UnknownResource(token.to_string())),
        }
    }

    fn dispatch(&self, request: Request, ctx: &mut OperationContext) -> Result<Option<Value>> {
        log::trace!("dispatching {}", request.method());

        match request {
            Request::GetSchema => Ok(Some(serde_json::to_value(self.schema())?)),
            Request::Check {
                resource_type,
                name,
                news,
            } => {
                let resource = self.resource(&resource_type)?;
                resource.check_value(ctx, &name, news).map(Some)
            }
            Request::Create {
                resource_type,
                inputs,
                ..
            } => {
                let resource = self.resource(&resource_type)?;
                resource.create_value(ctx, inputs).map(Some)
            }
            Request::Read {
                resource_type,
                id,
                state,
            } => {
                let resource = self.resource(&resource_type)?;
                resource.read_value(ctx, &id, state).map(Some)
            }
            Request::Update {
                resource_type,
                id,
                inputs,
                state,
                ..
            } => {
                let resource = self.resource(&resource_type)?;
                resource.update_value(ctx, &id, inputs, state).map(Some)
            }
            Request::Delete {
                resource_type,
                id,
                state,
            } => {
                let resource = self.resource(&resource_type)?;
                resource.delete_value(ctx, &id, state)?;
                Ok(None)
            }
            Request::Diff {
                resource_type,
                id,
                inputs,
                state,
            } => {
                let resource = self.resource(&resource_type)?;
                resource.diff_value(ctx, &id, inputs, state).map(Some)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{DiffKind, DiffResponse};
    use crate::schema::{FieldDependencies, PropertyKind, PropertySpec};
    use crate::types::{CreateResponse, ReadResponse, UpdateResponse};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct NoteArgs {
        title: String,
        body: String,
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct NoteState {
        title: String,
        body: String,
    }

    /// In-memory resource for exercising dispatch
    #[derive(Debug, Default)]
    struct Note {
        store: Mutex<HashMap<String, String>>,
    }

    impl Resource for Note {
        type Inputs = NoteArgs;
        type State = NoteState;

        fn type_token(&self) -> &'static str {
            "test:index:Note"
        }

        fn schema(&self) -> ResourceSchema {
            ResourceSchema::new(self.type_token())
                .with_input(PropertySpec::required("title", PropertyKind::String))
                .with_input(PropertySpec::required("body", PropertyKind::String))
        }

        fn create(
            &self,
            ctx: &mut OperationContext,
            inputs: NoteArgs,
        ) -> Result<CreateResponse<NoteState>> {
            if ctx.is_preview() {
                return Ok(CreateResponse::preview(&inputs.title));
            }
            self.store
                .lock()
                .unwrap()
                .insert(inputs.title.clone(), inputs.body.clone());
            Ok(CreateResponse::created(
                &inputs.title,
                NoteState {
                    title: inputs.title.clone(),
                    body: inputs.body,
                },
            ))
        }

        fn read(
            &self,
            _ctx: &mut OperationContext,
            id: &str,
            _state: NoteState,
        ) -> Result<ReadResponse<NoteArgs, NoteState>> {
            let body = self
                .store
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("note {} not found", id))?;
            Ok(ReadResponse {
                id: id.to_string(),
                inputs: NoteArgs {
                    title: id.to_string(),
                    body: body.clone(),
                },
                state: NoteState {
                    title: id.to_string(),
                    body,
                },
            })
        }

        fn update(
            &self,
            ctx: &mut OperationContext,
            _id: &str,
            inputs: NoteArgs,
            _state: NoteState,
        ) -> Result<UpdateResponse<NoteState>> {
            if ctx.is_preview() {
                return Ok(UpdateResponse::preview());
            }
            Ok(UpdateResponse::updated(NoteState {
                title: inputs.title,
                body: inputs.body,
            }))
        }

        fn delete(&self, ctx: &mut OperationContext, id: &str, _state: NoteState) -> Result<()> {
            if self.store.lock().unwrap().remove(id).is_none() {
                ctx.warn(format!("note {} already deleted", id));
            }
            Ok(())
        }

        fn diff(
            &self,
            _ctx: &mut OperationContext,
            _id: &str,
            inputs: NoteArgs,
            state: NoteState,
        ) -> Result<DiffResponse> {
            let mut diff = BTreeMap::new();
            if inputs.body != state.body {
                diff.insert("body".to_string(), DiffKind::Update.into());
            }
            Ok(DiffResponse::from_detailed(diff, false))
        }

        fn wire_dependencies(&self, deps: &mut FieldDependencies) {
            deps.output_depends_on("body", "body");
        }
    }

    fn provider() -> Provider {
        ProviderBuilder::new()
            .with_name("test")
            .with_version("1.2.3")
            .with_namespace("example")
            .with_resource(Note::default())
            .build()
            .unwrap()
    }

    fn request(value: Value) -> Request {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_build_requires_resources() {
        let err = ProviderBuilder::new().build().unwrap_err();
        assert!(matches!(err, ProviderError::NoResources));
    }

    #[test]
    fn test_build_rejects_duplicates() {
        let err = ProviderBuilder::new()
            .with_resource(Note::default())
            .with_resource(Note::default())
            .build()
            .unwrap_err();
        assert!(matches!(err, ProviderError::DuplicateResource(t) if t == "test:index:Note"));
    }

    #[test]
    fn test_schema_includes_dependencies() {
        let schema = provider().schema();
        assert_eq!(schema.name, "test");
        assert_eq!(schema.namespace, "example");

        let note = &schema.resources["test:index:Note"];
        assert_eq!(note.dependencies.inputs_for("body"), ["body".to_string()]);
    }

    #[test]
    fn test_unknown_resource() {
        let resp = provider().handle(request(json!({
            "method": "delete",
            "type": "test:index:Missing",
            "id": "x",
            "state": {}
        })));
        assert!(!resp.ok);
        assert_eq!(
            resp.error.as_deref(),
            Some("unknown resource type: test:index:Missing")
        );
    }

    #[test]
    fn test_check_reports_failures() {
        let resp = provider().handle(request(json!({
            "method": "check",
            "type": "test:index:Note",
            "name": "n",
            "news": {"title": "a"}
        })));
        assert!(resp.ok);
        let result = resp.result.unwrap();
        assert_eq!(result["failures"][0]["property"], "body");
    }

    #[test]
    fn test_create_then_read() {
        let provider = provider();
        let resp = provider.handle(request(json!({
            "method": "create",
            "type": "test:index:Note",
            "inputs": {"title": "a", "body": "hello"}
        })));
        assert!(resp.ok, "{:?}", resp.error);
        let result = resp.result.unwrap();
        assert_eq!(result["id"], "a");
        assert_eq!(result["state"]["body"], "hello");

        let resp = provider.handle(request(json!({
            "method": "read",
            "type": "test:index:Note",
            "id": "a"
        })));
        assert_eq!(resp.result.unwrap()["state"]["body"], "hello");
    }

    #[test]
    fn test_create_preview_has_no_state() {
        let resp = provider().handle(request(json!({
            "method": "create",
            "type": "test:index:Note",
            "inputs": {"title": "a", "body": "hello"},
            "dryRun": true
        })));
        let result = resp.result.unwrap();
        assert_eq!(result["id"], "a");
        assert!(result["state"].is_null());
    }

    #[test]
    fn test_decode_error_names_operation() {
        let resp = provider().handle(request(json!({
            "method": "create",
            "type": "test:index:Note",
            "inputs": {"title": 7}
        })));
        assert!(!resp.ok);
        assert!(resp.error.unwrap().starts_with("invalid inputs for create"));
    }

    #[test]
    fn test_delete_forwards_diagnostics() {
        let resp = provider().handle(request(json!({
            "method": "delete",
            "type": "test:index:Note",
            "id": "gone",
            "state": {"title": "gone", "body": ""}
        })));
        assert!(resp.ok);
        assert!(resp.result.is_none());
        assert_eq!(resp.diagnostics.len(), 1);
        assert_eq!(resp.diagnostics[0].message, "note gone already deleted");
    }
}

//! # Declarative
//!
//! Lifecycle contract for declaratively-managed resources.
//!
//! An orchestrator (the IaC engine) owns desired state and recorded state;
//! a provider owns the effects. This crate defines the seam between them.
//!
//! ## Core Concepts
//!
//! - **Resource**: A typed implementation of check/create/read/update/delete/diff
//! - **OperationContext**: Carries the preview flag and collects diagnostics
//! - **DiffResponse**: Per-field change classification (update vs replace)
//! - **ResourceSchema**: Property declarations used for default validation
//! - **Provider**: Registry routing JSON requests to resources by type token
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{ProviderBuilder, Request};
//!
//! let provider = ProviderBuilder::new()
//!     .with_name("file")
//!     .with_namespace("example")
//!     .with_resource(File)
//!     .build()?;
//!
//! let request: Request = serde_json::from_str(line)?;
//! let response = provider.handle(request);
//! ```
//!
//! Resources are registered once at startup; dispatch is a map lookup on
//! the type token followed by serde decoding of the typed inputs and state.

pub mod context;
pub mod diff;
pub mod error;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod types;
pub mod wire;

// Re-export main types at crate root
pub use context::{Diagnostic, OperationContext, Severity};
pub use diff::{DiffKind, DiffResponse, PropertyDiff};
pub use error::ProviderError;
pub use provider::{Provider, ProviderBuilder, ProviderSchema};
pub use resource::Resource;
pub use schema::{FieldDependencies, PropertyKind, PropertySpec, ResourceSchema, default_check};
pub use types::{
    CheckFailure, CheckResponse, CreateResponse, PropertyMap, ReadResponse, UpdateResponse,
};
pub use wire::{Request, Response};

//! File resource - a filesystem file managed through the provider lifecycle

use anyhow::Result;
use declarative::{
    CheckResponse, CreateResponse, DiffKind, DiffResponse, FieldDependencies, OperationContext,
    PropertyKind, PropertyMap, PropertySpec, ReadResponse, Resource, ResourceSchema,
    UpdateResponse, default_check,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Type token under which the resource is registered
pub const FILE_TYPE_TOKEN: &str = "file:index:File";

/// Errors raised by file lifecycle operations
#[derive(Debug, Error)]
pub enum FileError {
    /// An entry already exists and `force` is not set
    #[error("file exists; pass force=true to override")]
    PreconditionFailed { path: PathBuf },

    /// Fewer bytes reached the file than the content holds
    #[error("wrote {written}/{expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    /// Underlying filesystem failure
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    fn io(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Self::Io {
            action,
            path,
            source,
        }
    }
}

/// Desired state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileArgs {
    /// Defaults to the resource name during check
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub force: bool,
    pub content: String,
}

/// Recorded state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    pub path: String,
    #[serde(default)]
    pub force: bool,
    pub content: String,
}

impl From<FileArgs> for FileState {
    fn from(args: FileArgs) -> Self {
        Self {
            path: args.path,
            force: args.force,
            content: args.content,
        }
    }
}

/// A file projected into a declarative resource
#[derive(Debug, Clone, Copy, Default)]
pub struct File;

/// Whether anything occupies `path`
///
/// Only a definite "not found" counts as absent; any other stat failure
/// is treated as an existing entry.
fn entry_present(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(_) => true,
        Err(e) => e.kind() != io::ErrorKind::NotFound,
    }
}

fn entry_missing(path: &Path) -> bool {
    matches!(fs::metadata(path), Err(e) if e.kind() == io::ErrorKind::NotFound)
}

/// Write all of `buf`, returning how many bytes the writer accepted
///
/// Stops early if the writer reports zero bytes written.
fn write_counted<W: Write>(writer: &mut W, buf: &[u8]) -> io::Result<usize> {
    let mut written = 0;
    while written < buf.len() {
        match writer.write(&buf[written..]) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(written)
}

/// Write `content` to `writer`, failing on a short write
fn write_content<W: Write>(writer: &mut W, content: &str, path: &Path) -> Result<(), FileError> {
    let expected = content.len();
    let written =
        write_counted(writer, content.as_bytes()).map_err(FileError::io("write", path))?;
    if written != expected {
        return Err(FileError::ShortWrite { written, expected });
    }
    writer.flush().map_err(FileError::io("write", path))
}

/// Create or truncate the file at `path` and write `content` in full
fn write_file(path: &Path, content: &str) -> Result<(), FileError> {
    let mut file = fs::File::create(path).map_err(FileError::io("create", path))?;
    write_content(&mut file, content, path)
}

impl Resource for File {
    type Inputs = FileArgs;
    type State = FileState;

    fn type_token(&self) -> &'static str {
        FILE_TYPE_TOKEN
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(FILE_TYPE_TOKEN)
            .describe("A file projected into a declarative resource")
            .with_input(
                PropertySpec::optional("path", PropertyKind::String)
                    .describe("The file path. Defaults to resource name."),
            )
            .with_input(
                PropertySpec::optional("force", PropertyKind::Bool)
                    .describe("If existing file should be deleted if present."),
            )
            .with_input(
                PropertySpec::required("content", PropertyKind::String)
                    .describe("The content of the file."),
            )
            .with_output(
                PropertySpec::required("path", PropertyKind::String).describe("The file path."),
            )
            .with_output(
                PropertySpec::required("force", PropertyKind::Bool)
                    .describe("If existing file should be deleted if present."),
            )
            .with_output(
                PropertySpec::required("content", PropertyKind::String)
                    .describe("The content of the file."),
            )
    }

    fn check(
        &self,
        _ctx: &mut OperationContext,
        name: &str,
        mut news: PropertyMap,
    ) -> Result<CheckResponse> {
        if matches!(news.get("path"), None | Some(Value::Null)) {
            news.insert("path".to_string(), Value::String(name.to_string()));
        }
        Ok(default_check(&self.schema(), news))
    }

    fn create(
        &self,
        ctx: &mut OperationContext,
        inputs: FileArgs,
    ) -> Result<CreateResponse<FileState>> {
        let path = Path::new(&inputs.path);

        // Checked in preview too
        if !inputs.force && entry_present(path) {
            return Err(FileError::PreconditionFailed {
                path: path.to_path_buf(),
            }
            .into());
        }

        if ctx.is_preview() {
            return Ok(CreateResponse::preview(&inputs.path));
        }

        write_file(path, &inputs.content)?;
        ctx.debug(format!(
            "wrote {} bytes to {}",
            inputs.content.len(),
            path.display()
        ));

        Ok(CreateResponse::created(inputs.path.clone(), inputs.into()))
    }

    fn read(
        &self,
        _ctx: &mut OperationContext,
        id: &str,
        state: FileState,
    ) -> Result<ReadResponse<FileArgs, FileState>> {
        let path = Path::new(id);
        let content = fs::read_to_string(path).map_err(FileError::io("read", path))?;

        // force cannot be recovered from disk
        Ok(ReadResponse {
            id: id.to_string(),
            inputs: FileArgs {
                path: id.to_string(),
                force: state.force,
                content: content.clone(),
            },
            state: FileState {
                path: id.to_string(),
                force: state.force,
                content,
            },
        })
    }

    fn update(
        &self,
        ctx: &mut OperationContext,
        _id: &str,
        inputs: FileArgs,
        state: FileState,
    ) -> Result<UpdateResponse<FileState>> {
        if ctx.is_preview() {
            return Ok(UpdateResponse::preview());
        }

        let path = Path::new(&state.path);
        write_file(path, &inputs.content)?;
        ctx.debug(format!(
            "rewrote {} with {} bytes",
            path.display(),
            inputs.content.len()
        ));

        Ok(UpdateResponse::updated(inputs.into()))
    }

    fn delete(&self, ctx: &mut OperationContext, _id: &str, state: FileState) -> Result<()> {
        let path = Path::new(&state.path);
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                ctx.warn(format!("file \"{}\" already deleted", state.path));
                Ok(())
            }
            Err(e) => Err(FileError::io("remove", path)(e).into()),
        }
    }

    fn diff(
        &self,
        _ctx: &mut OperationContext,
        _id: &str,
        inputs: FileArgs,
        state: FileState,
    ) -> Result<DiffResponse> {
        let mut diff = BTreeMap::new();

        if inputs.content != state.content {
            diff.insert("content".to_string(), DiffKind::Update.into());
        }
        if inputs.force != state.force {
            diff.insert("force".to_string(), DiffKind::Update.into());
        }
        if inputs.path != state.path {
            diff.insert("path".to_string(), DiffKind::UpdateReplace.into());
        } else if entry_missing(Path::new(&inputs.path)) {
            diff.insert("path".to_string(), DiffKind::Add.into());
        }

        Ok(DiffResponse::from_detailed(diff, true))
    }

    fn wire_dependencies(&self, deps: &mut FieldDependencies) {
        deps.output_depends_on("content", "content")
            .output_depends_on("force", "force")
            .output_depends_on("path", "path");
    }
}

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use runway_workflow::WorkflowDefinition;

use crate::document::WorkflowDocument;
use crate::error::ResolveError;
use crate::resolver::{WorkflowResolver, apply_subset};

/// Filesystem-based workflow resolver.
///
/// Workflows are stored as one JSON document per workflow:
/// ```text
/// {root}/
/// ├── nightly_ingest.json
/// └── weekly_report.json
/// ```
///
/// Documents are read on every call, so edits (including schema changes)
/// take effect for the next resolution.
pub struct FsWorkflowResolver {
  root: PathBuf,
}

impl FsWorkflowResolver {
  /// Create a new resolver rooted at the given directory.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Get the root directory.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Path of the document for `name`, or `None` if the name cannot be a file name.
  fn document_path(&self, name: &str) -> Option<PathBuf> {
    let valid = !name.is_empty()
      && name != "."
      && name != ".."
      && !name.contains(['/', '\\']);
    valid.then(|| self.root.join(format!("{}.json", name)))
  }

  /// Read and parse the document for `name`.
  async fn read_document(&self, name: &str) -> Result<WorkflowDocument, ResolveError> {
    let not_found = || ResolveError::WorkflowNotFound {
      name: name.to_string(),
    };
    let path = self.document_path(name).ok_or_else(not_found)?;

    let content = match fs::read_to_string(&path).await {
      Ok(content) => content,
      Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
      Err(e) => return Err(e.into()),
    };

    let document: WorkflowDocument =
      serde_json::from_str(&content).map_err(|source| ResolveError::Parse {
        name: name.to_string(),
        source,
      })?;

    if document.workflow.name != name {
      debug!(
        file = %path.display(),
        declared = %document.workflow.name,
        "workflow document name differs from file name"
      );
      return Err(not_found());
    }

    Ok(document)
  }
}

#[async_trait]
impl WorkflowResolver for FsWorkflowResolver {
  async fn resolve(
    &self,
    name: &str,
    step_subset: Option<&[String]>,
  ) -> Result<WorkflowDefinition, ResolveError> {
    let workflow = self.read_document(name).await?.into_definition()?;
    debug!(workflow = name, steps = workflow.snapshot().steps.len(), "resolved workflow");
    apply_subset(workflow, step_subset)
  }
}

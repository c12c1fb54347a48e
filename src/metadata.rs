//! Binds the remote project and model ids onto the host document as shared
//! parameters, so a re-upload of the same document targets the same remote
//! model.

use std::fs;
use std::path::PathBuf;

use crate::errors::{AppError, AppResult};
use crate::host::{BindingScope, HostApplication, HostDocument, SharedParamFileGuard};

/// Name of the definition group inside the bundled shared parameter file.
pub const SCHEMA_GROUP: &str = "bimsync";

const SCHEMA_BUNDLE: &str = include_str!("resources/bimsync_shared_parameters.txt");
const SCHEMA_SCRATCH_NAME: &str = "bimsyncSharedParameter.txt";

/// The two identifying attributes carried by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    ProjectId,
    ModelId,
}

impl MetadataField {
    pub const ALL: [MetadataField; 2] = [MetadataField::ProjectId, MetadataField::ModelId];

    pub fn name(&self) -> &'static str {
        match self {
            MetadataField::ProjectId => "project_id",
            MetadataField::ModelId => "model_id",
        }
    }
}

pub struct MetadataBinder;

impl MetadataBinder {
    /// Idempotent schema provisioning. Extracts the bundled parameter
    /// definitions to a scratch file, swaps it in as the host's active shared
    /// parameter file, binds every definition in the bimsync group to the
    /// project information category (or re-scopes a binding attached to the
    /// wrong category set), then restores the original path and removes the
    /// scratch file. The original path is restored even when provisioning
    /// fails midway.
    pub fn ensure_schema(app: &mut dyn HostApplication) -> AppResult<()> {
        let scratch_path = extract_schema_bundle()?;

        let result = provision_bindings(app, &scratch_path);

        if let Err(e) = fs::remove_file(&scratch_path) {
            log::warn!(
                "Failed to remove scratch schema file {} (non-critical): {}",
                scratch_path.display(),
                e
            );
        }

        result
    }

    /// Idempotent upsert of one metadata field on the document's project
    /// information entity. A field that is absent or read-only is a silent
    /// no-op; the document may predate schema provisioning for this category.
    pub fn write(doc: &mut dyn HostDocument, field: MetadataField, value: &str) {
        let name = field.name();

        if doc.read_project_parameter(name).is_none() {
            log::debug!("Parameter {} not exposed on document, skipping write", name);
            return;
        }

        if doc.parameter_is_read_only(name) {
            log::debug!("Parameter {} is read-only, skipping write", name);
            return;
        }

        doc.write_project_parameter(name, value);
        log::debug!("Parameter {} set to {}", name, value);
    }
}

fn provision_bindings(app: &mut dyn HostApplication, scratch_path: &PathBuf) -> AppResult<()> {
    let mut guard = SharedParamFileGuard::swap(app, scratch_path);

    let definitions = guard
        .app()
        .definitions_in_group(SCHEMA_GROUP)
        .map_err(|e| AppError::schema_failure(e.to_string()))?;

    if definitions.is_empty() {
        return Err(AppError::schema_failure(format!(
            "Shared parameter group '{}' is empty or missing",
            SCHEMA_GROUP
        )));
    }

    for field in &definitions {
        match guard.app().binding_scope(field) {
            None => {
                log::info!("Binding parameter {} to project information", field);
                guard
                    .app()
                    .bind_to_project_information(field)
                    .map_err(|e| AppError::schema_failure(e.to_string()))?;
            }
            Some(BindingScope::Other) => {
                log::info!("Re-scoping parameter {} to project information", field);
                guard
                    .app()
                    .rebind_to_project_information(field)
                    .map_err(|e| AppError::schema_failure(e.to_string()))?;
            }
            Some(BindingScope::ProjectInformation) => {
                log::debug!("Parameter {} already bound", field);
            }
        }
    }

    Ok(())
}

/// Writes the bundled definitions to the scratch directory. The copy is
/// rewritten whenever its content differs from the bundle, so a definition
/// shipped with a newer version reaches the host instead of a stale copy
/// left by an earlier run.
fn extract_schema_bundle() -> AppResult<PathBuf> {
    let scratch_path = std::env::temp_dir().join(SCHEMA_SCRATCH_NAME);

    let up_to_date = matches!(fs::read_to_string(&scratch_path), Ok(existing) if existing == SCHEMA_BUNDLE);
    if !up_to_date {
        fs::write(&scratch_path, SCHEMA_BUNDLE)?;
        log::debug!("Schema bundle extracted to {}", scratch_path.display());
    }

    Ok(scratch_path)
}

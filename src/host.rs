//! Seams toward the host CAD application. The document/transaction model, the
//! IFC exporter, and the project/model picker all live on the host side; the
//! pipeline only ever talks to them through these traits.

use std::path::{Path, PathBuf};

use crate::errors::AppResult;
use crate::export::IfcExportOptions;

/// What the remote picker handed back. Immutable; consumed once per attempt.
#[derive(Debug, Clone)]
pub struct ModelSelection {
    pub project_id: String,
    pub model_id: String,
    pub comment: String,
}

/// Category a shared parameter binding is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingScope {
    ProjectInformation,
    Other,
}

/// Application-level host state: the active shared parameter file and the
/// parameter binding map.
pub trait HostApplication {
    fn shared_parameter_path(&self) -> Option<PathBuf>;
    fn set_shared_parameter_path(&mut self, path: Option<PathBuf>);

    /// Parameter definitions found in the named group of the currently active
    /// shared parameter file.
    fn definitions_in_group(&self, group: &str) -> AppResult<Vec<String>>;

    /// Scope of the existing binding for `field`, or None when unbound.
    fn binding_scope(&self, field: &str) -> Option<BindingScope>;

    /// Bind `field` as an instance parameter scoped to project information.
    fn bind_to_project_information(&mut self, field: &str) -> AppResult<()>;

    /// Re-attach an existing binding to the project information category set.
    fn rebind_to_project_information(&mut self, field: &str) -> AppResult<()>;
}

/// Document-level host state: the project information entity and the native
/// transaction.
pub trait HostDocument {
    /// Path of the document's source file; its stem names the artifact.
    fn path_name(&self) -> PathBuf;

    /// Current value of a project information parameter, None when the field
    /// is not exposed on the document.
    fn read_project_parameter(&self, field: &str) -> Option<String>;

    fn parameter_is_read_only(&self, field: &str) -> bool;

    fn write_project_parameter(&mut self, field: &str, value: &str);

    fn begin_transaction(&mut self, name: &str) -> AppResult<()>;
    fn commit_transaction(&mut self) -> AppResult<()>;
    fn rollback_transaction(&mut self);
}

/// Interactive project/model selection dialog. Returns None on dismissal.
pub trait ModelPicker {
    fn pick(&self, access_token: &str, doc: &dyn HostDocument) -> Option<ModelSelection>;
}

/// The host's IFC exporter: document + fixed options -> file on disk.
pub trait IfcExporter {
    fn export(
        &self,
        doc: &dyn HostDocument,
        options: &IfcExportOptions,
        folder: &Path,
        filename: &str,
    ) -> AppResult<()>;
}

/// Scoped document transaction. Rolls back on every exit path unless
/// `commit` was called; commit is the single success path.
pub struct TransactionGuard<'a> {
    doc: &'a mut dyn HostDocument,
    committed: bool,
}

impl<'a> TransactionGuard<'a> {
    pub fn start(doc: &'a mut dyn HostDocument, name: &str) -> AppResult<Self> {
        doc.begin_transaction(name)?;
        log::debug!("Transaction '{}' started", name);
        Ok(Self {
            doc,
            committed: false,
        })
    }

    pub fn doc(&mut self) -> &mut dyn HostDocument {
        self.doc
    }

    pub fn doc_ref(&self) -> &dyn HostDocument {
        self.doc
    }

    pub fn commit(mut self) -> AppResult<()> {
        // Marked before the call so a failed commit is not rolled back on top
        // of whatever state the host left behind.
        self.committed = true;
        self.doc.commit_transaction()?;
        log::debug!("Transaction committed");
        Ok(())
    }
}

impl<'a> Drop for TransactionGuard<'a> {
    fn drop(&mut self) {
        if !self.committed {
            log::warn!("Transaction dropped without commit, rolling back");
            self.doc.rollback_transaction();
        }
    }
}

/// Save/restore of the host's active shared parameter file path around a
/// scoped operation. The original path comes back on every exit path.
pub struct SharedParamFileGuard<'a> {
    app: &'a mut dyn HostApplication,
    original: Option<PathBuf>,
}

impl<'a> SharedParamFileGuard<'a> {
    pub fn swap(app: &'a mut dyn HostApplication, temp_path: &Path) -> Self {
        let original = app.shared_parameter_path();
        app.set_shared_parameter_path(Some(temp_path.to_path_buf()));
        Self { app, original }
    }

    pub fn app(&mut self) -> &mut dyn HostApplication {
        self.app
    }
}

impl<'a> Drop for SharedParamFileGuard<'a> {
    fn drop(&mut self) {
        self.app.set_shared_parameter_path(self.original.take());
    }
}

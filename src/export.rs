use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::errors::{AppError, AppResult};
use crate::host::{HostDocument, IfcExporter};

/// Interchange format revision handed to the host exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfcVersion {
    /// Pinned for compatibility with the remote service's processing chain.
    Ifc2x3,
}

/// Fixed export policy. These are configuration constants, not user-exposed
/// settings.
#[derive(Debug, Clone)]
pub struct IfcExportOptions {
    pub file_version: IfcVersion,
    pub export_base_quantities: bool,
    pub wall_and_column_splitting: bool,
    pub space_boundary_level: u8,
}

impl Default for IfcExportOptions {
    fn default() -> Self {
        Self {
            file_version: IfcVersion::Ifc2x3,
            export_base_quantities: true,
            wall_and_column_splitting: true,
            space_boundary_level: 1,
        }
    }
}

/// A freshly exported IFC file in the scratch directory. The orchestrator is
/// the sole owner; the file is removed when the artifact is dropped.
#[derive(Debug)]
pub struct ExportArtifact {
    path: PathBuf,
    filename: String,
}

impl ExportArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn read_bytes(&self) -> AppResult<Vec<u8>> {
        Ok(fs::read(&self.path)?)
    }
}

impl Drop for ExportArtifact {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            log::warn!(
                "Failed to remove export artifact {} (non-critical): {}",
                self.path.display(),
                e
            );
        } else {
            log::debug!("Removed export artifact {}", self.path.display());
        }
    }
}

pub struct ArtifactExporter;

impl ArtifactExporter {
    /// Runs the host exporter with the fixed option set. The filename is
    /// `{YYYYMMDDHHMMSS}_{document base name}.ifc`, unique per attempt and
    /// traceable back to the source document.
    pub fn export(
        exporter: &dyn IfcExporter,
        doc: &dyn HostDocument,
    ) -> AppResult<ExportArtifact> {
        let options = IfcExportOptions::default();
        let folder = std::env::temp_dir();

        let source = doc.path_name();
        let base_name = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Untitled".to_string());

        let filename = format!("{}_{}.ifc", Local::now().format("%Y%m%d%H%M%S"), base_name);

        log::info!("Exporting {} to {}", base_name, folder.display());

        exporter
            .export(doc, &options, &folder, &filename)
            .map_err(|e| AppError::export_failure(e.to_string()))?;

        let path = folder.join(&filename);
        if !path.exists() {
            return Err(AppError::export_failure(format!(
                "Exporter reported success but {} was not written",
                path.display()
            )));
        }

        Ok(ExportArtifact { path, filename })
    }
}

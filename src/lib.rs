//! Upload pipeline for pushing the active CAD model to bimsync as a new
//! revision of a previously selected remote model. The host application
//! provides the document, transaction, exporter, and picker through the
//! traits in [`host`]; everything else lives here.

pub mod config;
pub mod errors;
pub mod export;
pub mod host;
pub mod metadata;
pub mod security;
pub mod uploader;

pub use config::{CredentialStore, InMemoryCredentialStore, Settings, SettingsCredentialStore};
pub use errors::{AppError, AppResult, CommandOutcome};
pub use export::{ArtifactExporter, ExportArtifact, IfcExportOptions, IfcVersion};
pub use host::{
    BindingScope, HostApplication, HostDocument, IfcExporter, ModelPicker, ModelSelection,
    SharedParamFileGuard, TransactionGuard,
};
pub use metadata::{MetadataBinder, MetadataField};
pub use uploader::{Credential, TokenRefresher, UploadClient, UploadOrchestrator};

//! Sequences one upload attempt: credential refresh, selection, metadata
//! binding, IFC export, and the revision upload, all inside a single document
//! transaction. Any failure after the transaction starts rolls the local
//! mutations back; the remote call itself is outside the rollback's reach.

use uuid::Uuid;

use crate::config::{CredentialStore, Settings};
use crate::errors::{AppError, AppResult, CommandOutcome};
use crate::export::ArtifactExporter;
use crate::host::{HostApplication, HostDocument, IfcExporter, ModelPicker, TransactionGuard};
use crate::metadata::{MetadataBinder, MetadataField};
use crate::security::InputValidator;
use crate::uploader::bimsync_client::{RevisionAck, UploadClient};
use crate::uploader::token::TokenRefresher;

const TRANSACTION_NAME: &str = "Export to bimsync";

pub struct UploadOrchestrator<'a> {
    settings: Settings,
    credential_store: &'a dyn CredentialStore,
    picker: &'a dyn ModelPicker,
    exporter: &'a dyn IfcExporter,
}

impl<'a> UploadOrchestrator<'a> {
    pub fn new(
        settings: Settings,
        credential_store: &'a dyn CredentialStore,
        picker: &'a dyn ModelPicker,
        exporter: &'a dyn IfcExporter,
    ) -> Self {
        Self {
            settings,
            credential_store,
            picker,
            exporter,
        }
    }

    /// Runs one attempt end to end. Stages run strictly in order; the host
    /// only ever sees the coarse outcome plus a message.
    pub async fn run(
        &self,
        app: &mut dyn HostApplication,
        doc: &mut dyn HostDocument,
    ) -> CommandOutcome {
        let attempt_id = Uuid::new_v4();
        log::info!("[{}] Upload attempt started", attempt_id);

        match self.run_attempt(app, doc, attempt_id).await {
            Ok(ack) => {
                log::info!(
                    "[{}] Upload attempt committed (revision {})",
                    attempt_id,
                    ack.id.as_deref().unwrap_or("unknown")
                );
                CommandOutcome::Succeeded
            }
            Err(e) => {
                if e.is_cancellation() {
                    log::info!("[{}] Upload attempt cancelled at picker", attempt_id);
                } else {
                    log::error!("[{}] Upload attempt failed: {}", attempt_id, e);
                }
                e.into()
            }
        }
    }

    async fn run_attempt(
        &self,
        app: &mut dyn HostApplication,
        doc: &mut dyn HostDocument,
        attempt_id: Uuid,
    ) -> AppResult<RevisionAck> {
        // Idle: a valid bearer credential must exist before any other call.
        let current = self
            .credential_store
            .load()?
            .ok_or_else(|| AppError::auth_failure("No stored credential, sign in first"))?;

        let refresher = TokenRefresher::new(&self.settings.auth_host)?;
        let credential = refresher.refresh(&current).await?;
        self.credential_store.store(&credential)?;

        // AwaitingSelection: dismissal is terminal with nothing to undo.
        let selection = self
            .picker
            .pick(&credential.access_token, doc)
            .ok_or(AppError::UserCancelled)?;

        InputValidator::validate_remote_id("project_id", &selection.project_id)?;
        InputValidator::validate_remote_id("model_id", &selection.model_id)?;
        InputValidator::validate_comment(&selection.comment)?;

        log::info!(
            "[{}] Selected project {} model {}",
            attempt_id,
            selection.project_id,
            selection.model_id
        );

        // Exporting: local mutations begin here; the guard rolls them back on
        // every non-commit exit path.
        let mut transaction = TransactionGuard::start(doc, TRANSACTION_NAME)?;

        MetadataBinder::ensure_schema(app)?;
        MetadataBinder::write(
            transaction.doc(),
            MetadataField::ProjectId,
            &selection.project_id,
        );
        MetadataBinder::write(
            transaction.doc(),
            MetadataField::ModelId,
            &selection.model_id,
        );

        let artifact = ArtifactExporter::export(self.exporter, transaction.doc_ref())?;
        log::info!("[{}] Exported {}", attempt_id, artifact.filename());

        // Uploading
        let client = UploadClient::new(&self.settings.api_host, &self.settings.callback_url)?;
        let ack = client.upload(&artifact, &selection, &credential).await?;

        // Committed: the single success path.
        transaction.commit()?;
        Ok(ack)
    }
}

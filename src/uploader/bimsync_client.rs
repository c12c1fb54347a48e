use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{AppError, AppResult};
use crate::export::ExportArtifact;
use crate::host::ModelSelection;
use crate::uploader::token::Credential;

/// JSON object carried in the `Bimsync-Params` request header. The remote
/// service notifies `callbackUrl` once server-side processing finishes; the
/// upload call itself only confirms acceptance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BimsyncParams {
    #[serde(rename = "callbackUrl")]
    pub callback_url: String,
    pub comment: String,
    pub filename: String,
    pub model: String,
}

/// Revision acceptance response. The service returns the created revision
/// object; only the id is consumed here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevisionAck {
    pub id: Option<String>,
}

/// Issues the single authenticated POST that creates a new revision. No
/// automatic retry; a transient network failure surfaces to the caller.
pub struct UploadClient {
    client: Client,
    api_host: String,
    callback_url: String,
}

impl UploadClient {
    pub fn new(api_host: &str, callback_url: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            api_host: api_host.to_string(),
            callback_url: callback_url.to_string(),
        })
    }

    pub async fn upload(
        &self,
        artifact: &ExportArtifact,
        selection: &ModelSelection,
        credential: &Credential,
    ) -> AppResult<RevisionAck> {
        let params = BimsyncParams {
            callback_url: self.callback_url.clone(),
            comment: selection.comment.clone(),
            filename: artifact.filename().to_string(),
            model: selection.model_id.clone(),
        };
        let params_header = serde_json::to_string(&params)?;

        let body = artifact.read_bytes()?;
        let url = format!(
            "{}/v2/projects/{}/revisions",
            self.api_host, selection.project_id
        );

        log::info!(
            "Uploading {} ({} bytes) to {}",
            artifact.filename(),
            body.len(),
            url
        );

        let response = match self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", credential.access_token))
            .header("Content-Type", "application/ifc")
            .header("Bimsync-Params", params_header)
            .body(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                // The request may have reached the server before the failure;
                // a revision can exist remotely that the local rollback cannot
                // retract.
                log::warn!(
                    "Upload request failed in flight, a remote revision may still have been created: {}",
                    e
                );
                return Err(AppError::Network(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::upload_failure(status.as_u16(), error_text));
        }

        let response_text = response.text().await.unwrap_or_default();
        let ack: RevisionAck = serde_json::from_str(&response_text).unwrap_or_default();

        match &ack.id {
            Some(id) => log::info!("Revision {} accepted", id),
            None => log::info!("Revision accepted (no id in response body)"),
        }

        Ok(ack)
    }
}

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration as StdDuration;

use crate::errors::{AppError, AppResult};

/// Bearer credential for the bimsync API. Only the refresher produces new
/// values; the upload client must only ever see a just-refreshed one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
}

/// Exchanges the refresh token for a new access/refresh pair. Persistence of
/// the result is the orchestrator's job.
pub struct TokenRefresher {
    client: reqwest::Client,
    auth_endpoint: String,
}

impl TokenRefresher {
    pub fn new(auth_endpoint: &str) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            auth_endpoint: auth_endpoint.to_string(),
        })
    }

    pub async fn refresh(&self, current: &Credential) -> AppResult<Credential> {
        log::info!("Refreshing access token");

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", current.refresh_token.as_str()),
        ];

        let response = self
            .client
            .post(&self.auth_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::auth_failure(format!("Token endpoint unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::auth_failure(format!(
                "Token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::auth_failure(format!("Malformed token response: {}", e)))?;

        log::info!("Access token refreshed, valid for {}s", token.expires_in);

        Ok(Credential {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }
}

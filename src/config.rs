use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::errors::{AppError, AppResult};
use crate::uploader::token::Credential;

/// Persisted settings for the upload pipeline. The stored credential survives
/// process restarts and is overwritten after each refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub api_host: String,
    pub auth_host: String,
    pub callback_url: String,
    pub token: Option<Credential>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_host: "https://api.bimsync.com".to_string(),
            auth_host: "https://api.bimsync.com/oauth2/token".to_string(),
            callback_url: "http://127.0.0.1:63842/".to_string(),
            token: None,
        }
    }
}

fn get_settings_path() -> AppResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| AppError::Config("Could not find config directory".to_string()))?
        .join("bimsync-uploader");

    fs::create_dir_all(&config_dir)?;
    Ok(config_dir.join("settings.json"))
}

pub fn load_settings_from(path: &PathBuf) -> AppResult<Settings> {
    if path.exists() {
        let settings_str = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&settings_str).unwrap_or_else(|e| {
            log::warn!("Failed to parse settings file: {}. Using defaults.", e);
            Settings::default()
        });

        validate_settings(&settings)?;

        Ok(settings)
    } else {
        let default_settings = Settings::default();
        save_settings_to(path, &default_settings)?;
        Ok(default_settings)
    }
}

pub fn save_settings_to(path: &PathBuf, settings: &Settings) -> AppResult<()> {
    validate_settings(settings)?;

    // Keep a backup of the previous settings before overwriting
    if path.exists() {
        let backup_path = path.with_extension("json.bak");
        if let Err(e) = fs::copy(path, &backup_path) {
            log::warn!("Failed to create settings backup: {}", e);
        }
    }

    let settings_str = serde_json::to_string_pretty(settings)?;
    fs::write(path, settings_str)?;

    log::debug!("Settings saved to {}", path.display());
    Ok(())
}

pub fn load_settings() -> AppResult<Settings> {
    load_settings_from(&get_settings_path()?)
}

pub fn save_settings(settings: &Settings) -> AppResult<()> {
    save_settings_to(&get_settings_path()?, settings)
}

pub fn validate_settings(settings: &Settings) -> AppResult<()> {
    for (field, url) in [
        ("api_host", &settings.api_host),
        ("auth_host", &settings.auth_host),
        ("callback_url", &settings.callback_url),
    ] {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::validation(field, "Must be an http(s) URL"));
        }
    }

    if settings.api_host.ends_with('/') {
        return Err(AppError::validation(
            "api_host",
            "Must not carry a trailing slash",
        ));
    }

    Ok(())
}

/// Injected credential persistence. The refresher never touches storage
/// itself; the orchestrator reads the stored credential at start and writes
/// the refreshed one back through this trait.
pub trait CredentialStore: Send {
    fn load(&self) -> AppResult<Option<Credential>>;
    fn store(&self, credential: &Credential) -> AppResult<()>;
}

/// Credential store backed by the settings file.
pub struct SettingsCredentialStore {
    path: PathBuf,
}

impl SettingsCredentialStore {
    pub fn new() -> AppResult<Self> {
        Ok(Self {
            path: get_settings_path()?,
        })
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialStore for SettingsCredentialStore {
    fn load(&self) -> AppResult<Option<Credential>> {
        Ok(load_settings_from(&self.path)?.token)
    }

    fn store(&self, credential: &Credential) -> AppResult<()> {
        let mut settings = load_settings_from(&self.path)?;
        settings.token = Some(credential.clone());
        save_settings_to(&self.path, &settings)
    }
}

/// In-memory store for hosts that manage persistence themselves and for tests.
pub struct InMemoryCredentialStore {
    credential: Mutex<Option<Credential>>,
}

impl InMemoryCredentialStore {
    pub fn new(credential: Option<Credential>) -> Self {
        Self {
            credential: Mutex::new(credential),
        }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> AppResult<Option<Credential>> {
        match self.credential.lock() {
            Ok(credential) => Ok(credential.clone()),
            Err(e) => Err(AppError::Config(format!(
                "Credential store lock poisoned: {}",
                e
            ))),
        }
    }

    fn store(&self, credential: &Credential) -> AppResult<()> {
        match self.credential.lock() {
            Ok(mut slot) => {
                *slot = Some(credential.clone());
                Ok(())
            }
            Err(e) => Err(AppError::Config(format!(
                "Credential store lock poisoned: {}",
                e
            ))),
        }
    }
}

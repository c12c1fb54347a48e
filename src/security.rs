use regex::Regex;

use crate::errors::{AppError, AppResult};

pub struct InputValidator;

impl InputValidator {
    /// bimsync project and model ids are opaque tokens; reject anything that
    /// could break the request path or the Bimsync-Params JSON.
    pub fn validate_remote_id(field: &str, id: &str) -> AppResult<()> {
        let trimmed = id.trim();

        if trimmed.is_empty() {
            return Err(AppError::validation(field, "Id cannot be empty"));
        }

        if trimmed.len() > 128 {
            return Err(AppError::validation(field, "Id too long (max 128 characters)"));
        }

        let safe_chars = Regex::new(r"^[a-zA-Z0-9\-_\.]+$").unwrap();
        if !safe_chars.is_match(trimmed) {
            return Err(AppError::validation(field, "Id contains invalid characters"));
        }

        Ok(())
    }

    pub fn validate_comment(comment: &str) -> AppResult<()> {
        if comment.len() > 1024 {
            return Err(AppError::validation(
                "comment",
                "Comment too long (max 1024 characters)",
            ));
        }

        if comment.contains('"') || comment.contains('\\') || comment.contains('\n') {
            return Err(AppError::validation(
                "comment",
                "Comment contains invalid characters",
            ));
        }

        Ok(())
    }

    /// Exported artifact names are always `{YYYYMMDDHHMMSS}_{base}.ifc`.
    pub fn validate_artifact_filename(filename: &str) -> AppResult<()> {
        let pattern = Regex::new(r"^\d{14}_.+\.ifc$").unwrap();
        if !pattern.is_match(filename) {
            return Err(AppError::validation(
                "filename",
                "Artifact filename does not match the expected pattern",
            ));
        }

        Ok(())
    }
}

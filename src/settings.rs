use crate::error::AppError;
use crate::model::AppSettings;
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "truename.json";

/// Settings file inside `dir`.
pub fn settings_file_path(dir: &Path) -> PathBuf {
    dir.join(SETTINGS_FILE_NAME)
}

pub fn load_settings(path: &Path) -> Result<AppSettings, AppError> {
    if !path.exists() {
        return Ok(AppSettings::default());
    }

    let content = fs::read_to_string(path).map_err(|e| AppError::Settings(e.to_string()))?;
    let settings: AppSettings =
        serde_json::from_str(&content).map_err(|e| AppError::Settings(e.to_string()))?;
    validate_settings(&settings)?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), AppError> {
    validate_settings(settings)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AppError::Settings(e.to_string()))?;
    }
    let body =
        serde_json::to_string_pretty(settings).map_err(|e| AppError::Settings(e.to_string()))?;
    fs::write(path, body).map_err(|e| AppError::Settings(e.to_string()))
}

pub fn validate_settings(settings: &AppSettings) -> Result<(), AppError> {
    if settings.max_name_length == 0 || settings.max_term_length == 0 {
        return Err(AppError::Settings(
            "maxNameLength and maxTermLength must be positive".to_string(),
        ));
    }
    if settings.max_term_length > settings.max_name_length {
        return Err(AppError::Settings(format!(
            "maxTermLength ({}) cannot exceed maxNameLength ({})",
            settings.max_term_length, settings.max_name_length
        )));
    }
    if settings.min_term_length >= settings.max_term_length {
        return Err(AppError::Settings(
            "minTermLength must be smaller than maxTermLength".to_string(),
        ));
    }
    if settings.max_collision_attempts == 0 {
        return Err(AppError::Settings(
            "maxCollisionAttempts must be at least 1".to_string(),
        ));
    }
    if settings.max_text_chars == 0 || settings.summary_max_words == 0 {
        return Err(AppError::Settings(
            "maxTextChars and summaryMaxWords must be positive".to_string(),
        ));
    }
    Ok(())
}

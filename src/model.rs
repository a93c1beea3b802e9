use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileStatus {
    Pending,
    ContentExtracted,
    NameGenerated,
    Renamed,
    Reverted,
    Skipped,
    Failed,
}

impl FileStatus {
    /// States in which the entity carries a rename target.
    pub fn has_new_path(self) -> bool {
        matches!(self, Self::NameGenerated | Self::Renamed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    Textual,
    Image,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NamingMode {
    Frequency,
    Summary,
}

/// One line of the source/proposed-name view, derived from a single entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRow {
    pub source_path: String,
    pub candidate_name: String,
    pub new_path: Option<String>,
    pub status: FileStatus,
    pub language: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEntitiesResponse {
    pub added: usize,
    pub duplicates: usize,
    pub rejected: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDetail {
    pub source_path: String,
    pub new_path: Option<String>,
    pub status: FileStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub total: usize,
    pub generated: usize,
    pub failed: usize,
    pub skipped: usize,
    pub canceled: bool,
    pub elapsed_ms: u128,
    pub details: Vec<GenerateDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecuteStatus {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteDetail {
    pub source_path: String,
    pub destination_path: Option<String>,
    pub status: ExecuteStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub details: Vec<ExecuteDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationProgressEvent {
    pub operation: String,
    pub processed: usize,
    pub total: usize,
    pub percent: u8,
    pub current_path: Option<String>,
    pub done: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub pending: usize,
    pub generated: usize,
    pub renamed: usize,
    pub reverted: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub finished_at: DateTime<Local>,
    pub summary: BatchSummary,
    pub rows: Vec<EntityRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub naming_mode: NamingMode,
    pub max_name_length: usize,
    pub max_term_length: usize,
    pub min_term_length: usize,
    pub max_text_chars: usize,
    pub max_collision_attempts: usize,
    pub identify_language: bool,
    pub include_subfolders: bool,
    pub summary_max_words: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            naming_mode: NamingMode::Frequency,
            max_name_length: 70,
            max_term_length: 30,
            min_term_length: 2,
            max_text_chars: 1_000_000,
            max_collision_attempts: 10_000,
            identify_language: true,
            include_subfolders: false,
            summary_max_words: 8,
        }
    }
}

use crate::backends::Backends;
use crate::entity::FileEntity;
use crate::error::AppError;
use crate::model::{
    AddEntitiesResponse, AppSettings, BatchReport, BatchSummary, EntityRow, ExecuteDetail,
    ExecuteResponse, ExecuteStatus, FileStatus, GenerateDetail, GenerateResponse,
    OperationProgressEvent,
};
use crate::path_norm::absolute_normalized;
use crate::settings::validate_settings;
use chrono::Local;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Owns the files of one run and drives them through generate, rename and
/// revert. Entities are kept in insertion order, which is also display order.
#[derive(Debug)]
pub struct BatchOrchestrator {
    backends: Backends,
    settings: AppSettings,
    entities: Vec<FileEntity>,
}

impl BatchOrchestrator {
    pub fn new(backends: Backends, settings: AppSettings) -> Result<Self, AppError> {
        validate_settings(&settings)?;
        Ok(Self {
            backends,
            settings,
            entities: Vec::new(),
        })
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn entities(&self) -> &[FileEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity(&self, path: &Path) -> Option<&FileEntity> {
        let key = absolute_normalized(path).ok()?;
        self.entities
            .iter()
            .find(|entity| entity.original_path() == key)
    }

    /// Adds one entity per path, skipping paths already in the batch.
    pub fn add_entities(&mut self, paths: &[PathBuf]) -> AddEntitiesResponse {
        let mut added = 0usize;
        let mut duplicates = 0usize;
        let mut rejected = Vec::new();

        for path in paths {
            let entity = match FileEntity::new(path) {
                Ok(entity) => entity,
                Err(error) => {
                    warn!("cannot add {}: {}", path.display(), error);
                    rejected.push(path.to_string_lossy().to_string());
                    continue;
                }
            };
            if self
                .entities
                .iter()
                .any(|existing| existing.original_path() == entity.original_path())
            {
                duplicates += 1;
                continue;
            }
            self.entities.push(entity);
            added += 1;
        }

        debug!(
            "added {} file(s), {} duplicate(s), {} rejected",
            added,
            duplicates,
            rejected.len()
        );
        AddEntitiesResponse {
            added,
            duplicates,
            rejected,
        }
    }

    /// Removes the entities whose original path matches one of `paths`.
    /// Returns how many were removed.
    pub fn remove_entities(&mut self, paths: &[PathBuf]) -> usize {
        let keys = normalized_keys(paths);
        let before = self.entities.len();
        self.entities
            .retain(|entity| !keys.contains(entity.original_path()));
        before - self.entities.len()
    }

    pub fn select_all(&self) -> Vec<PathBuf> {
        self.entities
            .iter()
            .map(|entity| entity.original_path().to_path_buf())
            .collect()
    }

    /// Source/proposed-name view, derived fresh from the entity list.
    pub fn rows(&self) -> Vec<EntityRow> {
        self.entities.iter().map(FileEntity::to_row).collect()
    }

    /// Processes the selected entities in collection order.
    ///
    /// Progress is reported once after each entity. The cancel flag is only
    /// looked at between entities. Entities that are already renamed are left
    /// alone and counted as skipped.
    pub fn generate_all<FCancel, FProgress>(
        &mut self,
        selected: &[PathBuf],
        is_cancelled: FCancel,
        mut report_progress: FProgress,
    ) -> Result<GenerateResponse, AppError>
    where
        FCancel: Fn() -> bool,
        FProgress: FnMut(OperationProgressEvent),
    {
        let started = Instant::now();
        let indices = self.selected_indices(selected);
        let total = indices.len();
        let mut details = Vec::with_capacity(total);
        let mut generated = 0usize;
        let mut failed = 0usize;
        let mut skipped = 0usize;
        let mut canceled = false;

        for (position, index) in indices.into_iter().enumerate() {
            if is_cancelled() {
                canceled = true;
                info!("generation canceled after {}/{} file(s)", position, total);
                break;
            }

            let entity = &mut self.entities[index];
            info!(
                "working on file {}/{}: {}",
                position + 1,
                total,
                entity.original_path().display()
            );
            let status = if entity.status() == FileStatus::Renamed {
                FileStatus::Renamed
            } else {
                entity.process(&self.backends, &self.settings)?
            };

            match status {
                FileStatus::NameGenerated => generated += 1,
                FileStatus::Failed => failed += 1,
                _ => skipped += 1,
            }
            let current_path = entity.original_path().to_string_lossy().to_string();
            details.push(GenerateDetail {
                source_path: current_path.clone(),
                new_path: entity
                    .new_path()
                    .map(|path| path.to_string_lossy().to_string()),
                status,
                reason: if status == FileStatus::Renamed {
                    Some("already renamed".to_string())
                } else {
                    entity.failure().map(str::to_string)
                },
            });

            let completed = position + 1;
            report_progress(progress_event(
                "generate",
                completed,
                total,
                Some(current_path),
            ));
        }

        let elapsed_ms = started.elapsed().as_millis();
        info!(
            "generated {} name(s), {} failed, {} skipped in {} ms",
            generated, failed, skipped, elapsed_ms
        );
        Ok(GenerateResponse {
            total,
            generated,
            failed,
            skipped,
            canceled,
            elapsed_ms,
            details,
        })
    }

    /// Renames every selected entity that has a generated name. Other
    /// selected entities are counted as skipped without a detail line.
    pub fn rename_all<FProgress>(
        &mut self,
        selected: &[PathBuf],
        report_progress: FProgress,
    ) -> Result<ExecuteResponse, AppError>
    where
        FProgress: FnMut(OperationProgressEvent),
    {
        let max_attempts = self.settings.max_collision_attempts;
        self.execute_bulk(
            "rename",
            selected,
            FileStatus::NameGenerated,
            report_progress,
            |entity| {
                let desired = entity.new_path().map(Path::to_path_buf);
                let status = entity.rename(max_attempts)?;
                let destination = entity.new_path().map(Path::to_path_buf).or(desired);
                Ok((status == FileStatus::Renamed, destination))
            },
        )
    }

    /// Moves every selected renamed entity back to its original path.
    pub fn revert_all<FProgress>(
        &mut self,
        selected: &[PathBuf],
        report_progress: FProgress,
    ) -> Result<ExecuteResponse, AppError>
    where
        FProgress: FnMut(OperationProgressEvent),
    {
        self.execute_bulk(
            "revert",
            selected,
            FileStatus::Renamed,
            report_progress,
            |entity| {
                let status = entity.revert()?;
                Ok((
                    status == FileStatus::Reverted,
                    Some(entity.original_path().to_path_buf()),
                ))
            },
        )
    }

    fn execute_bulk<FProgress, FApply>(
        &mut self,
        operation: &str,
        selected: &[PathBuf],
        eligible: FileStatus,
        mut report_progress: FProgress,
        mut apply: FApply,
    ) -> Result<ExecuteResponse, AppError>
    where
        FProgress: FnMut(OperationProgressEvent),
        FApply: FnMut(&mut FileEntity) -> Result<(bool, Option<PathBuf>), AppError>,
    {
        let indices = self.selected_indices(selected);
        let (targets, others): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|index| self.entities[*index].status() == eligible);
        let total = targets.len();
        let skipped = others.len();
        let mut succeeded = 0usize;
        let mut failed = 0usize;
        let mut details = Vec::with_capacity(total);

        for (position, index) in targets.into_iter().enumerate() {
            let entity = &mut self.entities[index];
            let source_path = entity.current_path().to_string_lossy().to_string();
            let (ok, destination) = apply(entity)?;
            if ok {
                succeeded += 1;
            } else {
                failed += 1;
            }
            details.push(ExecuteDetail {
                source_path: source_path.clone(),
                destination_path: destination.map(|path| path.to_string_lossy().to_string()),
                status: if ok {
                    ExecuteStatus::Succeeded
                } else {
                    ExecuteStatus::Failed
                },
                reason: entity.failure().map(str::to_string),
            });
            report_progress(progress_event(
                operation,
                position + 1,
                total,
                Some(source_path),
            ));
        }

        info!(
            "{}: {} succeeded, {} failed, {} skipped",
            operation, succeeded, failed, skipped
        );
        Ok(ExecuteResponse {
            processed: succeeded + failed + skipped,
            succeeded,
            failed,
            skipped,
            details,
        })
    }

    /// Replaces the generated base name of one entity.
    pub fn edit_new_name(&mut self, path: &Path, base_name: &str) -> Result<(), AppError> {
        let key = absolute_normalized(path)?;
        let entity = self
            .entities
            .iter_mut()
            .find(|entity| entity.original_path() == key)
            .ok_or_else(|| {
                AppError::InvalidRequest(format!("`{}` is not part of the batch", path.display()))
            })?;
        entity.edit_new_name(base_name)
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total: self.entities.len(),
            ..BatchSummary::default()
        };
        for entity in &self.entities {
            match entity.status() {
                FileStatus::Pending | FileStatus::ContentExtracted => summary.pending += 1,
                FileStatus::NameGenerated => summary.generated += 1,
                FileStatus::Renamed => summary.renamed += 1,
                FileStatus::Reverted => summary.reverted += 1,
                FileStatus::Skipped => summary.skipped += 1,
                FileStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }

    pub fn report(&self) -> BatchReport {
        BatchReport {
            finished_at: Local::now(),
            summary: self.summary(),
            rows: self.rows(),
        }
    }

    fn selected_indices(&self, selected: &[PathBuf]) -> Vec<usize> {
        let keys = normalized_keys(selected);
        self.entities
            .iter()
            .enumerate()
            .filter(|(_, entity)| keys.contains(entity.original_path()))
            .map(|(index, _)| index)
            .collect()
    }
}

fn normalized_keys(paths: &[PathBuf]) -> HashSet<PathBuf> {
    paths
        .iter()
        .filter_map(|path| absolute_normalized(path).ok())
        .collect()
}

fn progress_event(
    operation: &str,
    processed: usize,
    total: usize,
    current_path: Option<String>,
) -> OperationProgressEvent {
    let percent = if total == 0 {
        100
    } else {
        (processed * 100 / total).min(100) as u8
    };
    OperationProgressEvent {
        operation: operation.to_string(),
        processed,
        total,
        percent,
        current_path,
        done: processed >= total,
    }
}

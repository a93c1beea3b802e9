use crate::error::AppError;
use crate::model::ContentKind;
use crate::path_norm::safe_canonicalize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const TEXT_EXTENSIONS: &[&str] = &["pdf"];

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg", "webp"];

#[derive(Debug, Clone)]
pub struct CollectResult {
    pub files: Vec<PathBuf>,
    pub skipped_by_extension: usize,
}

/// Case-insensitive extension classification.
pub fn classify_extension(extension: &str) -> ContentKind {
    let extension = extension.to_lowercase();
    if TEXT_EXTENSIONS.contains(&extension.as_str()) {
        ContentKind::Textual
    } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        ContentKind::Image
    } else {
        ContentKind::Unsupported
    }
}

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .map(|ext| classify_extension(&ext.to_string_lossy()) != ContentKind::Unsupported)
        .unwrap_or(false)
}

/// Expands user inputs into the files of a batch.
///
/// Files named explicitly are always kept, whatever their extension; they are
/// skipped later, at processing time. Directories contribute only their
/// supported files, descending into subfolders when `include_subfolders` is set.
pub fn collect_targets(
    input_paths: &[PathBuf],
    include_subfolders: bool,
) -> Result<CollectResult, AppError> {
    if input_paths.is_empty() {
        return Err(AppError::InvalidRequest("no input paths given".to_string()));
    }

    let mut files = BTreeSet::new();
    let mut skipped_by_extension = 0usize;
    for raw in input_paths {
        if !raw.exists() {
            return Err(AppError::InvalidRequest(format!(
                "input path does not exist: `{}`",
                raw.display()
            )));
        }
        let path = canonical(raw)?;
        if path.is_file() {
            files.insert(path);
        } else if path.is_dir() {
            skipped_by_extension += collect_from_dir(&path, include_subfolders, &mut files)?;
        }
    }

    let mut file_list: Vec<PathBuf> = files.into_iter().collect();
    file_list.sort_by(|a, b| {
        a.to_string_lossy()
            .to_lowercase()
            .cmp(&b.to_string_lossy().to_lowercase())
    });

    Ok(CollectResult {
        files: file_list,
        skipped_by_extension,
    })
}

fn collect_from_dir(
    dir: &Path,
    include_subfolders: bool,
    files: &mut BTreeSet<PathBuf>,
) -> Result<usize, AppError> {
    let mut skipped = 0usize;
    if include_subfolders {
        for entry in WalkDir::new(dir).into_iter() {
            let entry = entry.map_err(|e| {
                AppError::Io(format!("failed to walk `{}`: {}", dir.display(), e))
            })?;
            if entry.file_type().is_file() {
                if is_supported(entry.path()) {
                    files.insert(canonical(entry.path())?);
                } else {
                    skipped += 1;
                }
            }
        }
        return Ok(skipped);
    }

    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::Io(format!("failed to read `{}`: {}", dir.display(), e)))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_file() {
            if is_supported(&path) {
                files.insert(canonical(&path)?);
            } else {
                skipped += 1;
            }
        }
    }
    Ok(skipped)
}

fn canonical(path: &Path) -> Result<PathBuf, AppError> {
    safe_canonicalize(path)
        .map_err(|e| AppError::Io(format!("failed to resolve `{}`: {}", path.display(), e)))
}

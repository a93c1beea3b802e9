use crate::error::AppError;
use crate::path_norm::{safe_canonicalize, PathIdentity};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Outcome of one rename attempt. A taken target is an expected outcome that
/// drives the suffix loop, not an error.
#[derive(Debug)]
pub enum RenameAttempt {
    Success,
    TargetExists,
    OtherFailure(io::Error),
}

/// Renames `source` to `target` unless something already lives at `target`.
///
/// The existence check and the rename are two steps; the filesystem is not
/// locked in between, so callers must not race renamers over the same paths.
pub fn try_rename(source: &Path, target: &Path) -> RenameAttempt {
    if source == target {
        return RenameAttempt::Success;
    }

    match fs::symlink_metadata(target) {
        // Case-only renames on case-insensitive filesystems see the source itself.
        Ok(_) if is_case_variant_of(source, target) => {}
        Ok(_) => return RenameAttempt::TargetExists,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => return RenameAttempt::OtherFailure(error),
    }

    match fs::rename(source, target) {
        Ok(()) => RenameAttempt::Success,
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists => RenameAttempt::TargetExists,
        Err(error) => RenameAttempt::OtherFailure(error),
    }
}

/// Moves `source` to `desired`, or to `<base>_(N).<ext>` with the smallest free
/// `N` when `desired` is taken. Returns the path the file now lives at.
///
/// `max_attempts` counts the direct attempt too.
pub fn collision_safe_rename(
    source: &Path,
    desired: &Path,
    max_attempts: usize,
) -> Result<PathBuf, AppError> {
    let identity = PathIdentity::parse(desired)?;
    let mut candidate = desired.to_path_buf();

    for attempt in 0..max_attempts {
        if attempt > 0 {
            candidate = suffixed_path(&identity, attempt);
        }
        match try_rename(source, &candidate) {
            RenameAttempt::Success => {
                if attempt > 0 {
                    debug!(
                        "{} was taken, renamed to {} instead",
                        desired.display(),
                        candidate.display()
                    );
                }
                return Ok(candidate);
            }
            RenameAttempt::TargetExists => continue,
            RenameAttempt::OtherFailure(error) => {
                return Err(AppError::Rename(format!(
                    "`{}` -> `{}`: {}",
                    source.display(),
                    candidate.display(),
                    error
                )));
            }
        }
    }

    Err(AppError::CollisionExhausted {
        target: desired.to_string_lossy().to_string(),
        attempts: max_attempts,
    })
}

pub fn suffixed_path(identity: &PathIdentity, counter: usize) -> PathBuf {
    identity.with_base_name(&format!("{}_({})", identity.base_name(), counter))
}

fn is_case_variant_of(a: &Path, b: &Path) -> bool {
    if a.to_string_lossy().to_lowercase() != b.to_string_lossy().to_lowercase() {
        return false;
    }
    match (safe_canonicalize(a), safe_canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

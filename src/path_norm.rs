use crate::error::AppError;
use std::path::{Component, Path, PathBuf};

/// `canonicalize()` wrapper that strips the Windows `\\?\` prefix.
pub fn safe_canonicalize(path: &Path) -> std::io::Result<PathBuf> {
    let canonical = path.canonicalize()?;
    Ok(strip_verbatim(canonical))
}

#[cfg(windows)]
fn strip_verbatim(path: PathBuf) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(stripped) = s.strip_prefix(r"\\?\") {
        PathBuf::from(stripped)
    } else {
        path
    }
}

#[cfg(not(windows))]
fn strip_verbatim(path: PathBuf) -> PathBuf {
    path
}

/// Lexical normalization: drops `.` segments and folds `..` into the preceding
/// segment. Never touches the filesystem, so symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                normalized.push(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    normalized.pop();
                    depth -= 1;
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            Component::Normal(segment) => {
                normalized.push(segment);
                depth += 1;
            }
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

/// Absolute, normalized form of `path`, resolved against the working directory.
pub fn absolute_normalized(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize_path(path));
    }
    Ok(normalize_path(&std::env::current_dir()?.join(path)))
}

/// A path split into directory, base name and extension.
///
/// Only the last dot of the final segment separates the extension, so
/// `archive.tar.gz` has base `archive.tar` and extension `gz`. A leading dot
/// (`.bashrc`) is part of the base name. The stored extension keeps its case;
/// use [`PathIdentity::extension_key`] for comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathIdentity {
    directory: PathBuf,
    base_name: String,
    extension: String,
}

impl PathIdentity {
    pub fn parse(path: &Path) -> Result<Self, AppError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                AppError::InvalidRequest(format!("path has no file name: `{}`", path.display()))
            })?;
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let (base_name, extension) = split_extension(&file_name);

        Ok(Self {
            directory,
            base_name: base_name.to_string(),
            extension: extension.to_string(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn extension_key(&self) -> String {
        self.extension.to_lowercase()
    }

    /// Path in the same directory with `base_name` and this extension.
    pub fn with_base_name(&self, base_name: &str) -> PathBuf {
        self.directory.join(join_extension(base_name, &self.extension))
    }
}

pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(index) if index > 0 => (&file_name[..index], &file_name[index + 1..]),
        _ => (file_name, ""),
    }
}

pub fn join_extension(base_name: &str, extension: &str) -> String {
    if extension.is_empty() {
        base_name.to_string()
    } else {
        format!("{}.{}", base_name, extension)
    }
}

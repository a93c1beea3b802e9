use crate::backends::Backends;
use crate::error::AppError;
use crate::extract::truncate_chars;
use crate::file_collect::classify_extension;
use crate::fs_rename::{collision_safe_rename, try_rename, RenameAttempt};
use crate::model::{AppSettings, ContentKind, EntityRow, FileStatus, NamingMode};
use crate::path_norm::{absolute_normalized, PathIdentity};
use crate::ranker::{phrase_to_name, rank_terms, RankerLimits};
use crate::sanitize::{is_sanitized, sanitize_file_name};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub enum Content {
    #[default]
    None,
    Text(String),
    Image(DynamicImage),
    ExtractionFailed(String),
}

/// One file of a batch and everything known about it.
///
/// `new_path` is set exactly when the status is `NameGenerated` or `Renamed`.
/// After a successful rename the file lives at `new_path` and
/// `original_path` is the revert target.
#[derive(Debug, Clone)]
pub struct FileEntity {
    original_path: PathBuf,
    identity: PathIdentity,
    content: Content,
    language: Option<String>,
    candidate_name: String,
    new_path: Option<PathBuf>,
    status: FileStatus,
    failure: Option<String>,
}

impl FileEntity {
    pub fn new(path: &Path) -> Result<Self, AppError> {
        let original_path = absolute_normalized(path)?;
        let identity = PathIdentity::parse(&original_path)?;
        Ok(Self {
            original_path,
            identity,
            content: Content::None,
            language: None,
            candidate_name: String::new(),
            new_path: None,
            status: FileStatus::Pending,
            failure: None,
        })
    }

    pub fn original_path(&self) -> &Path {
        &self.original_path
    }

    pub fn identity(&self) -> &PathIdentity {
        &self.identity
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn candidate_name(&self) -> &str {
        &self.candidate_name
    }

    pub fn new_path(&self) -> Option<&Path> {
        self.new_path.as_deref()
    }

    pub fn status(&self) -> FileStatus {
        self.status
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn content_kind(&self) -> ContentKind {
        classify_extension(self.identity.extension())
    }

    /// Where the file is on disk right now.
    pub fn current_path(&self) -> &Path {
        match (&self.status, &self.new_path) {
            (FileStatus::Renamed, Some(path)) => path,
            _ => &self.original_path,
        }
    }

    /// Extracts content and builds a new name and path.
    ///
    /// Per-file problems end in `Failed` or `Skipped` and are returned as
    /// `Ok`; only calling this on an already renamed file is an error.
    pub fn process(
        &mut self,
        backends: &Backends,
        settings: &AppSettings,
    ) -> Result<FileStatus, AppError> {
        if self.status == FileStatus::Renamed {
            return Err(AppError::InvalidTransition {
                operation: "process",
                status: self.status,
            });
        }
        self.reset();

        let outcome = match self.content_kind() {
            ContentKind::Unsupported => {
                self.status = FileStatus::Skipped;
                self.failure = Some(format!(
                    "unsupported extension `{}`",
                    self.identity.extension()
                ));
                debug!("skipping {}", self.original_path.display());
                return Ok(self.status);
            }
            ContentKind::Textual => self.name_from_text(backends, settings),
            ContentKind::Image => self.name_from_image(backends, settings),
        };

        match outcome.and_then(|raw| self.accept_candidate(&raw)) {
            Ok(()) => {
                debug!(
                    "{} -> {}",
                    self.original_path.display(),
                    self.new_path
                        .as_deref()
                        .map(|path| path.display().to_string())
                        .unwrap_or_default()
                );
            }
            Err(error) => self.mark_failed(error),
        }
        Ok(self.status)
    }

    fn reset(&mut self) {
        self.content = Content::None;
        self.language = None;
        self.candidate_name.clear();
        self.new_path = None;
        self.status = FileStatus::Pending;
        self.failure = None;
    }

    fn name_from_text(
        &mut self,
        backends: &Backends,
        settings: &AppSettings,
    ) -> Result<String, AppError> {
        let mut text = match backends.text_extractor().extract_text(&self.original_path) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                let error = AppError::Extraction(format!(
                    "no text content in `{}`",
                    self.original_path.display()
                ));
                self.content = Content::ExtractionFailed(error.to_string());
                return Err(error);
            }
            Err(error) => {
                self.content = Content::ExtractionFailed(error.to_string());
                return Err(error);
            }
        };
        truncate_chars(&mut text, settings.max_text_chars);
        self.status = FileStatus::ContentExtracted;

        if settings.identify_language {
            if let Some(identifier) = backends.language_identifier() {
                self.language = identifier.identify(&text);
                debug!(
                    "language of {}: {}",
                    self.original_path.display(),
                    self.language.as_deref().unwrap_or("unknown")
                );
            }
        }

        let raw = text_to_name(&text, self.language.as_deref(), backends, settings);
        self.content = Content::Text(text);
        raw
    }

    fn name_from_image(
        &mut self,
        backends: &Backends,
        settings: &AppSettings,
    ) -> Result<String, AppError> {
        let image = match backends.image_decoder().decode_image(&self.original_path) {
            Ok(image) => image,
            Err(error) => {
                self.content = Content::ExtractionFailed(error.to_string());
                return Err(error);
            }
        };
        self.status = FileStatus::ContentExtracted;

        let caption = backends.captioner().caption(&image);
        self.content = Content::Image(image);
        let caption = caption?;
        debug!("caption of {}: {}", self.original_path.display(), caption);
        Ok(phrase_to_name(&caption, &RankerLimits::from(settings)))
    }

    fn accept_candidate(&mut self, raw: &str) -> Result<(), AppError> {
        let sanitized = sanitize_file_name(raw);
        if sanitized.is_empty() {
            return Err(AppError::Generation(format!(
                "no usable name for `{}`",
                self.original_path.display()
            )));
        }
        self.new_path = Some(self.identity.with_base_name(&sanitized));
        self.candidate_name = sanitized;
        self.status = FileStatus::NameGenerated;
        Ok(())
    }

    fn mark_failed(&mut self, error: AppError) {
        warn!("{}: {}", self.original_path.display(), error);
        self.status = FileStatus::Failed;
        self.new_path = None;
        self.failure = Some(error.to_string());
    }

    /// Moves the file to its generated path, adding a `_(N)` suffix when the
    /// path is taken. From `Reverted` the path is rebuilt from the kept name.
    pub fn rename(&mut self, max_attempts: usize) -> Result<FileStatus, AppError> {
        match self.status {
            FileStatus::NameGenerated => {}
            FileStatus::Reverted if !self.candidate_name.is_empty() => {
                self.new_path = Some(self.identity.with_base_name(&self.candidate_name));
            }
            status => {
                return Err(AppError::InvalidTransition {
                    operation: "rename",
                    status,
                })
            }
        }

        let Some(desired) = self.new_path.clone() else {
            return Err(AppError::InvalidTransition {
                operation: "rename",
                status: self.status,
            });
        };

        if !self.original_path.exists() {
            self.mark_failed(AppError::Rename(format!(
                "source file no longer exists: `{}`",
                self.original_path.display()
            )));
            return Ok(self.status);
        }

        match collision_safe_rename(&self.original_path, &desired, max_attempts) {
            Ok(actual) => {
                info!(
                    "renamed {} -> {}",
                    self.original_path.display(),
                    actual.display()
                );
                self.new_path = Some(actual);
                self.status = FileStatus::Renamed;
                self.failure = None;
            }
            Err(error) => self.mark_failed(error),
        }
        Ok(self.status)
    }

    /// Moves a renamed file back to its original path.
    ///
    /// The original path is never suffixed: if something now occupies it, or
    /// the move fails, the file stays where it is and the entity stays
    /// `Renamed` with the cause recorded.
    pub fn revert(&mut self) -> Result<FileStatus, AppError> {
        let current = match (self.status, self.new_path.clone()) {
            (FileStatus::Renamed, Some(current)) => current,
            (status, _) => {
                return Err(AppError::InvalidTransition {
                    operation: "revert",
                    status,
                })
            }
        };

        match try_rename(&current, &self.original_path) {
            RenameAttempt::Success => {
                info!(
                    "reverted {} -> {}",
                    current.display(),
                    self.original_path.display()
                );
                self.status = FileStatus::Reverted;
                self.new_path = None;
                self.failure = None;
            }
            RenameAttempt::TargetExists => {
                let reason = format!(
                    "original path is occupied: `{}`",
                    self.original_path.display()
                );
                warn!("cannot revert {}: {}", current.display(), reason);
                self.failure = Some(reason);
            }
            RenameAttempt::OtherFailure(error) => {
                warn!("cannot revert {}: {}", current.display(), error);
                self.failure = Some(error.to_string());
            }
        }
        Ok(self.status)
    }

    /// Replaces the generated base name. The name must already be a valid,
    /// sanitized file name; the directory and extension stay unchanged.
    pub fn edit_new_name(&mut self, base_name: &str) -> Result<(), AppError> {
        if self.status != FileStatus::NameGenerated {
            return Err(AppError::InvalidTransition {
                operation: "edit",
                status: self.status,
            });
        }
        if base_name.trim().is_empty() || base_name == "." || base_name == ".." {
            return Err(AppError::InvalidRequest(format!(
                "`{}` is not a valid file name",
                base_name
            )));
        }
        if !is_sanitized(base_name) {
            return Err(AppError::InvalidRequest(format!(
                "`{}` contains characters not allowed in file names (suggested: `{}`)",
                base_name,
                sanitize_file_name(base_name)
            )));
        }
        self.candidate_name = base_name.to_string();
        self.new_path = Some(self.identity.with_base_name(base_name));
        Ok(())
    }

    pub fn to_row(&self) -> EntityRow {
        EntityRow {
            source_path: self.original_path.to_string_lossy().to_string(),
            candidate_name: self.candidate_name.clone(),
            new_path: self
                .new_path
                .as_ref()
                .map(|path| path.to_string_lossy().to_string()),
            status: self.status,
            language: self.language.clone(),
            reason: self.failure.clone(),
        }
    }
}

fn text_to_name(
    text: &str,
    language: Option<&str>,
    backends: &Backends,
    settings: &AppSettings,
) -> Result<String, AppError> {
    let limits = RankerLimits::from(settings);
    if settings.naming_mode == NamingMode::Summary {
        match backends.summarizer() {
            Some(summarizer) => return Ok(phrase_to_name(&summarizer.summarize(text)?, &limits)),
            None => warn!("no summarizer registered, using frequency naming"),
        }
    }
    let terms = backends.tagger_for(language).tag(text);
    Ok(rank_terms(&terms, &limits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{Captioner, ImageDecoder, LanguageIdentifier, Tagger, TextExtractor};
    use crate::ranker::{PartOfSpeech, TaggedTerm};
    use image::RgbImage;
    use std::fs;
    use std::sync::{Arc, Mutex};

    /// Reads the file as UTF-8, so tests can write plain text into `.pdf` files.
    struct PlainText;

    impl TextExtractor for PlainText {
        fn extract_text(&self, path: &Path) -> Result<String, AppError> {
            fs::read_to_string(path).map_err(|e| AppError::Extraction(e.to_string()))
        }
    }

    struct BlankImage;

    impl ImageDecoder for BlankImage {
        fn decode_image(&self, path: &Path) -> Result<DynamicImage, AppError> {
            if fs::read(path)?.is_empty() {
                return Err(AppError::Extraction("empty image".to_string()));
            }
            Ok(DynamicImage::ImageRgb8(RgbImage::new(2, 2)))
        }
    }

    struct FixedCaption(&'static str);

    impl Captioner for FixedCaption {
        fn caption(&self, _image: &DynamicImage) -> Result<String, AppError> {
            Ok(self.0.to_string())
        }
    }

    /// Every whitespace-separated word is a proper noun.
    struct ProperWords;

    impl Tagger for ProperWords {
        fn tag(&self, text: &str) -> Vec<TaggedTerm> {
            text.split_whitespace()
                .map(|word| TaggedTerm::new(word, PartOfSpeech::ProperNoun, false))
                .collect()
        }
    }

    struct RecordingTagger(Mutex<Vec<String>>);

    impl Tagger for RecordingTagger {
        fn tag(&self, text: &str) -> Vec<TaggedTerm> {
            self.0.lock().unwrap().push(text.to_string());
            vec![TaggedTerm::new("French", PartOfSpeech::ProperNoun, false)]
        }
    }

    struct AlwaysFrench;

    impl LanguageIdentifier for AlwaysFrench {
        fn identify(&self, _text: &str) -> Option<String> {
            Some("fr".to_string())
        }
    }

    fn backends() -> Backends {
        Backends::new(
            Arc::new(PlainText),
            Arc::new(BlankImage),
            Arc::new(ProperWords),
            Arc::new(FixedCaption("a red car")),
        )
    }

    fn settings() -> AppSettings {
        AppSettings {
            min_term_length: 1,
            ..AppSettings::default()
        }
    }

    fn generated(dir: &Path, file: &str, body: &str) -> FileEntity {
        let path = dir.join(file);
        fs::write(&path, body).unwrap();
        let mut entity = FileEntity::new(&path).unwrap();
        entity.process(&backends(), &settings()).unwrap();
        entity
    }

    fn assert_new_path_invariant(entity: &FileEntity) {
        assert_eq!(
            entity.new_path().is_some(),
            entity.status().has_new_path(),
            "status {:?}",
            entity.status()
        );
    }

    #[test]
    fn textual_file_gets_ranked_name() {
        let dir = tempfile::tempdir().unwrap();
        let entity = generated(dir.path(), "report (draft).pdf", "Budget Q3 Budget");

        assert_eq!(entity.status(), FileStatus::NameGenerated);
        assert_eq!(entity.candidate_name(), "Budget_Q3");
        assert_eq!(entity.new_path(), Some(dir.path().join("Budget_Q3.pdf").as_path()));
        assert!(matches!(entity.content(), Content::Text(_)));
        assert_new_path_invariant(&entity);
    }

    #[test]
    fn image_file_is_named_from_caption() {
        let dir = tempfile::tempdir().unwrap();
        let entity = generated(dir.path(), "IMG_0042.JPG", "pixels");

        assert_eq!(entity.status(), FileStatus::NameGenerated);
        assert_eq!(
            entity.new_path(),
            Some(dir.path().join("a_red_car.JPG").as_path())
        );
        assert!(matches!(entity.content(), Content::Image(_)));
    }

    #[test]
    fn unsupported_extension_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let entity = generated(dir.path(), "notes.txt", "Budget");
        assert_eq!(entity.status(), FileStatus::Skipped);
        assert!(entity.candidate_name().is_empty());
        assert_new_path_invariant(&entity);
    }

    #[test]
    fn empty_text_and_undecodable_images_fail() {
        let dir = tempfile::tempdir().unwrap();
        let empty = generated(dir.path(), "blank.pdf", "   \n");
        assert_eq!(empty.status(), FileStatus::Failed);
        assert!(matches!(empty.content(), Content::ExtractionFailed(_)));
        assert_new_path_invariant(&empty);

        let broken = generated(dir.path(), "broken.png", "");
        assert_eq!(broken.status(), FileStatus::Failed);
        assert!(broken.failure().is_some());
    }

    #[test]
    fn no_surviving_terms_is_a_generation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let entity = generated(dir.path(), "lower.pdf", "a");
        assert_eq!(entity.status(), FileStatus::Failed);
        assert!(entity.candidate_name().is_empty());
        assert!(entity.failure().unwrap().contains("no usable name"));
    }

    #[test]
    fn candidate_is_sanitized_before_building_path() {
        let dir = tempfile::tempdir().unwrap();
        let entity = generated(dir.path(), "x.pdf", "ACME:CORP ACME:CORP");
        assert_eq!(entity.candidate_name(), "ACME_CORP");
    }

    #[test]
    fn language_picks_registered_tagger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lettre.pdf");
        fs::write(&path, "Bonjour Paris").unwrap();
        let french = Arc::new(RecordingTagger(Mutex::new(Vec::new())));
        let backends = backends()
            .with_language_identifier(Arc::new(AlwaysFrench))
            .with_tagger_for("fr", french.clone());

        let mut entity = FileEntity::new(&path).unwrap();
        entity.process(&backends, &settings()).unwrap();

        assert_eq!(entity.language(), Some("fr"));
        assert_eq!(entity.candidate_name(), "French");
        assert_eq!(french.0.lock().unwrap().as_slice(), ["Bonjour Paris"]);
    }

    #[test]
    fn text_is_truncated_before_tagging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.pdf");
        fs::write(&path, "Alpha Beta Gamma").unwrap();
        let settings = AppSettings {
            max_text_chars: 10,
            ..settings()
        };

        let mut entity = FileEntity::new(&path).unwrap();
        entity.process(&backends(), &settings).unwrap();
        assert_eq!(entity.candidate_name(), "Alpha_Beta");
    }

    #[test]
    fn summary_mode_without_summarizer_falls_back_to_ranking() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.pdf");
        fs::write(&path, "Acme Acme Lyon").unwrap();
        let settings = AppSettings {
            naming_mode: NamingMode::Summary,
            ..settings()
        };

        let mut entity = FileEntity::new(&path).unwrap();
        entity.process(&backends(), &settings).unwrap();
        assert_eq!(entity.candidate_name(), "Acme_Lyon");
    }

    #[test]
    fn rename_then_revert_restores_original() {
        let dir = tempfile::tempdir().unwrap();
        let mut entity = generated(dir.path(), "scan.pdf", "Budget Q3 Budget");
        let original = entity.original_path().to_path_buf();

        assert_eq!(entity.rename(10).unwrap(), FileStatus::Renamed);
        let renamed = dir.path().join("Budget_Q3.pdf");
        assert_eq!(entity.new_path(), Some(renamed.as_path()));
        assert_eq!(entity.current_path(), renamed.as_path());
        assert!(renamed.exists() && !original.exists());
        assert_new_path_invariant(&entity);

        assert_eq!(entity.revert().unwrap(), FileStatus::Reverted);
        assert!(original.exists() && !renamed.exists());
        assert_new_path_invariant(&entity);

        assert_eq!(entity.rename(10).unwrap(), FileStatus::Renamed);
        assert_eq!(entity.new_path(), Some(renamed.as_path()));
    }

    #[test]
    fn rename_failure_marks_entity_failed() {
        let dir = tempfile::tempdir().unwrap();
        let mut entity = generated(dir.path(), "gone.pdf", "Budget");
        fs::remove_file(dir.path().join("gone.pdf")).unwrap();

        assert_eq!(entity.rename(10).unwrap(), FileStatus::Failed);
        assert!(entity.failure().unwrap().contains("no longer exists"));
        assert_eq!(entity.candidate_name(), "Budget");
        assert_new_path_invariant(&entity);
    }

    #[test]
    fn revert_refuses_to_overwrite_reoccupied_original() {
        let dir = tempfile::tempdir().unwrap();
        let mut entity = generated(dir.path(), "scan.pdf", "Budget");
        entity.rename(10).unwrap();
        fs::write(dir.path().join("scan.pdf"), "newcomer").unwrap();

        assert_eq!(entity.revert().unwrap(), FileStatus::Renamed);
        assert!(entity.failure().unwrap().contains("occupied"));
        assert_eq!(
            fs::read_to_string(dir.path().join("scan.pdf")).unwrap(),
            "newcomer"
        );
        assert!(dir.path().join("Budget.pdf").exists());
    }

    #[test]
    fn invalid_transitions_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut pending = FileEntity::new(&dir.path().join("a.pdf")).unwrap();
        assert!(matches!(
            pending.rename(10),
            Err(AppError::InvalidTransition { operation: "rename", .. })
        ));
        assert!(matches!(
            pending.revert(),
            Err(AppError::InvalidTransition { operation: "revert", .. })
        ));

        let mut renamed = generated(dir.path(), "b.pdf", "Budget");
        renamed.rename(10).unwrap();
        assert!(matches!(
            renamed.process(&backends(), &settings()),
            Err(AppError::InvalidTransition { operation: "process", .. })
        ));
    }

    #[test]
    fn edit_accepts_only_sanitized_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut entity = generated(dir.path(), "scan.PDF", "Budget");

        assert!(matches!(
            entity.edit_new_name("bad:name"),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(entity.edit_new_name("").is_err());
        assert!(matches!(
            entity.edit_new_name("   "),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(entity.edit_new_name("\t").is_err());
        assert_eq!(entity.candidate_name(), "Budget");

        entity.edit_new_name("Annual Report").unwrap();
        assert_eq!(entity.candidate_name(), "Annual Report");
        assert_eq!(
            entity.new_path(),
            Some(dir.path().join("Annual Report.PDF").as_path())
        );
    }

    #[test]
    fn row_mirrors_entity_state() {
        let dir = tempfile::tempdir().unwrap();
        let entity = generated(dir.path(), "scan.pdf", "Budget");
        let row = entity.to_row();
        assert_eq!(row.candidate_name, "Budget");
        assert_eq!(row.status, FileStatus::NameGenerated);
        assert!(row.new_path.unwrap().ends_with("Budget.pdf"));
        assert!(row.reason.is_none());
    }
}

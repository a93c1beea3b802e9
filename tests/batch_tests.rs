use image::{DynamicImage, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use truename_lib::backends::{Captioner, ImageDecoder, Tagger, TextExtractor};
use truename_lib::model::{ExecuteStatus, OperationProgressEvent};
use truename_lib::ranker::{PartOfSpeech, TaggedTerm};
use truename_lib::{AppError, AppSettings, Backends, BatchOrchestrator, FileStatus};

/// Plain-text stand-in for a PDF reader; a file containing `FAIL` cannot be read.
struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, AppError> {
        let text = fs::read_to_string(path)?;
        if text.contains("FAIL") {
            return Err(AppError::Extraction(format!("corrupt: {}", path.display())));
        }
        Ok(text)
    }
}

struct TinyImageDecoder;

impl ImageDecoder for TinyImageDecoder {
    fn decode_image(&self, _path: &Path) -> Result<DynamicImage, AppError> {
        Ok(DynamicImage::ImageRgb8(RgbImage::new(4, 4)))
    }
}

struct FixedCaptioner;

impl Captioner for FixedCaptioner {
    fn caption(&self, _image: &DynamicImage) -> Result<String, AppError> {
        Ok("red car on a street".to_string())
    }
}

struct ProperNounTagger;

impl Tagger for ProperNounTagger {
    fn tag(&self, text: &str) -> Vec<TaggedTerm> {
        text.split_whitespace()
            .map(|word| TaggedTerm::new(word, PartOfSpeech::ProperNoun, false))
            .collect()
    }
}

fn stub_backends() -> Backends {
    Backends::new(
        Arc::new(PlainTextExtractor),
        Arc::new(TinyImageDecoder),
        Arc::new(ProperNounTagger),
        Arc::new(FixedCaptioner),
    )
}

fn settings() -> AppSettings {
    AppSettings {
        min_term_length: 1,
        ..AppSettings::default()
    }
}

fn batch_with(dir: &TempDir, files: &[(&str, &str)]) -> (BatchOrchestrator, Vec<PathBuf>) {
    let paths: Vec<PathBuf> = files
        .iter()
        .map(|(name, body)| {
            let path = dir.path().join(name);
            fs::write(&path, body).unwrap();
            path
        })
        .collect();
    let mut batch = BatchOrchestrator::new(stub_backends(), settings()).unwrap();
    batch.add_entities(&paths);
    (batch, paths)
}

fn generate_everything(batch: &mut BatchOrchestrator) -> Vec<OperationProgressEvent> {
    let mut events = Vec::new();
    let selected = batch.select_all();
    batch
        .generate_all(&selected, || false, |event| events.push(event))
        .unwrap();
    events
}

#[test]
fn budget_report_is_renamed_after_its_terms() {
    let dir = tempfile::tempdir().unwrap();
    let (mut batch, paths) = batch_with(&dir, &[("report (draft).pdf", "Budget Q3 Budget")]);

    generate_everything(&mut batch);
    let entity = batch.entity(&paths[0]).unwrap();
    assert_eq!(entity.candidate_name(), "Budget_Q3");
    assert_eq!(
        entity.new_path(),
        Some(dir.path().join("Budget_Q3.pdf").as_path())
    );

    let selected = batch.select_all();
    let response = batch.rename_all(&selected, |_| {}).unwrap();
    assert_eq!(response.succeeded, 1);
    assert!(dir.path().join("Budget_Q3.pdf").exists());
    assert!(!paths[0].exists());
}

#[test]
fn one_failed_extraction_leaves_the_rest_of_the_batch_alone() {
    let dir = tempfile::tempdir().unwrap();
    let (mut batch, paths) = batch_with(
        &dir,
        &[
            ("first.pdf", "Alpha Alpha Beta"),
            ("second.pdf", "FAIL"),
            ("third.pdf", "Gamma"),
        ],
    );

    let selected = batch.select_all();
    let response = batch
        .generate_all(&selected, || false, |_| {})
        .unwrap();

    assert_eq!(response.generated, 2);
    assert_eq!(response.failed, 1);
    assert_eq!(
        batch.entity(&paths[0]).unwrap().status(),
        FileStatus::NameGenerated
    );
    assert_eq!(batch.entity(&paths[1]).unwrap().status(), FileStatus::Failed);
    assert_eq!(
        batch.entity(&paths[2]).unwrap().status(),
        FileStatus::NameGenerated
    );
    assert_eq!(batch.entity(&paths[2]).unwrap().candidate_name(), "Gamma");
    assert!(response.details[1].reason.is_some());
}

#[test]
fn revert_restores_original_paths_and_rename_reproduces_them() {
    let dir = tempfile::tempdir().unwrap();
    let (mut batch, paths) = batch_with(
        &dir,
        &[("scan1.pdf", "Acme Invoice Acme"), ("IMG_1.jpg", "pixels")],
    );
    generate_everything(&mut batch);
    let selected = batch.select_all();

    batch.rename_all(&selected, |_| {}).unwrap();
    let renamed: Vec<PathBuf> = batch
        .entities()
        .iter()
        .map(|entity| entity.new_path().unwrap().to_path_buf())
        .collect();
    assert_eq!(
        renamed,
        vec![
            dir.path().join("Acme_Invoice.pdf"),
            dir.path().join("red_car_on_a_street.jpg"),
        ]
    );

    let reverted = batch.revert_all(&selected, |_| {}).unwrap();
    assert_eq!(reverted.succeeded, 2);
    for path in &paths {
        assert!(path.exists(), "{} was not restored", path.display());
    }
    for entity in batch.entities() {
        assert_eq!(entity.status(), FileStatus::Reverted);
        assert!(entity.new_path().is_none());
    }

    batch.rename_all(&selected, |_| {}).unwrap();
    assert_eq!(batch.summary().renamed, 0);

    for mut entity in batch.entities().to_vec() {
        entity.rename(10).unwrap();
        assert!(renamed.contains(&entity.new_path().unwrap().to_path_buf()));
    }
}

#[test]
fn progress_is_reported_once_per_entity_and_ends_at_100() {
    let dir = tempfile::tempdir().unwrap();
    let (mut batch, _) = batch_with(
        &dir,
        &[
            ("a.pdf", "Alpha"),
            ("b.pdf", "FAIL"),
            ("c.txt", "ignored"),
            ("d.png", "pixels"),
        ],
    );

    let events = generate_everything(&mut batch);

    let percents: Vec<u8> = events.iter().map(|event| event.percent).collect();
    assert_eq!(percents, vec![25, 50, 75, 100]);
    assert!(events.windows(2).all(|pair| pair[0].percent <= pair[1].percent));
    assert!(events.last().unwrap().done);
    assert!(events[..3].iter().all(|event| !event.done));
}

#[test]
fn generation_follows_collection_order_not_selection_order() {
    let dir = tempfile::tempdir().unwrap();
    let (mut batch, paths) = batch_with(
        &dir,
        &[("a.pdf", "Alpha"), ("b.pdf", "Beta"), ("c.pdf", "Gamma")],
    );

    let selection = vec![paths[2].clone(), paths[0].clone()];
    let response = batch.generate_all(&selection, || false, |_| {}).unwrap();

    let order: Vec<&str> = response
        .details
        .iter()
        .map(|detail| detail.source_path.as_str())
        .collect();
    assert_eq!(
        order,
        vec![
            paths[0].to_str().unwrap(),
            paths[2].to_str().unwrap()
        ]
    );
    assert_eq!(
        batch.entity(&paths[1]).unwrap().status(),
        FileStatus::Pending
    );
}

#[test]
fn cancellation_is_checked_between_entities() {
    let dir = tempfile::tempdir().unwrap();
    let (mut batch, paths) = batch_with(
        &dir,
        &[("a.pdf", "Alpha"), ("b.pdf", "Beta"), ("c.pdf", "Gamma")],
    );
    let checks = AtomicUsize::new(0);

    let selected = batch.select_all();
    let response = batch
        .generate_all(
            &selected,
            || checks.fetch_add(1, Ordering::SeqCst) >= 1,
            |_| {},
        )
        .unwrap();

    assert!(response.canceled);
    assert_eq!(response.details.len(), 1);
    assert_eq!(
        batch.entity(&paths[0]).unwrap().status(),
        FileStatus::NameGenerated
    );
    assert_eq!(
        batch.entity(&paths[1]).unwrap().status(),
        FileStatus::Pending
    );
}

#[test]
fn same_generated_name_gets_numbered_suffix_on_rename() {
    let dir = tempfile::tempdir().unwrap();
    let (mut batch, _) = batch_with(
        &dir,
        &[("one.pdf", "Budget"), ("two.pdf", "Budget"), ("Budget.pdf", "Other")],
    );
    generate_everything(&mut batch);

    let selected = batch.select_all();
    let response = batch.rename_all(&selected, |_| {}).unwrap();

    assert_eq!(response.succeeded, 3);
    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Budget_(1).pdf", "Budget_(2).pdf", "Other.pdf"]);
}

#[test]
fn rename_touches_only_generated_entities() {
    let dir = tempfile::tempdir().unwrap();
    let (mut batch, paths) = batch_with(
        &dir,
        &[("a.pdf", "Alpha"), ("b.pdf", "FAIL"), ("notes.txt", "x")],
    );
    generate_everything(&mut batch);

    let selected = batch.select_all();
    let response = batch.rename_all(&selected, |_| {}).unwrap();

    assert_eq!(response.succeeded, 1);
    assert_eq!(response.skipped, 2);
    assert_eq!(response.details.len(), 1);
    assert!(matches!(response.details[0].status, ExecuteStatus::Succeeded));
    assert!(paths[1].exists());
    assert!(paths[2].exists());

    let again = batch.rename_all(&selected, |_| {}).unwrap();
    assert_eq!(again.succeeded, 0);
    assert_eq!(again.skipped, 3);
}

#[test]
fn vanished_source_fails_only_that_entity() {
    let dir = tempfile::tempdir().unwrap();
    let (mut batch, paths) = batch_with(&dir, &[("a.pdf", "Alpha"), ("b.pdf", "Beta")]);
    generate_everything(&mut batch);
    fs::remove_file(&paths[0]).unwrap();

    let selected = batch.select_all();
    let response = batch.rename_all(&selected, |_| {}).unwrap();

    assert_eq!(response.failed, 1);
    assert_eq!(response.succeeded, 1);
    assert!(matches!(response.details[0].status, ExecuteStatus::Failed));
    assert_eq!(batch.entity(&paths[0]).unwrap().status(), FileStatus::Failed);
    assert!(dir.path().join("Beta.pdf").exists());

    let summary = batch.summary();
    assert_eq!(summary.renamed, 1);
    assert_eq!(summary.failed, 1);
}

#[test]
fn removing_entities_keeps_names_attached_to_their_sources() {
    let dir = tempfile::tempdir().unwrap();
    let (mut batch, paths) = batch_with(
        &dir,
        &[("a.pdf", "Alpha"), ("b.pdf", "Beta"), ("c.pdf", "Gamma")],
    );
    generate_everything(&mut batch);

    batch.remove_entities(&[paths[0].clone()]);
    let rows = batch.rows();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].source_path, paths[1].to_string_lossy());
    assert_eq!(rows[0].candidate_name, "Beta");
    assert_eq!(rows[1].source_path, paths[2].to_string_lossy());
    assert_eq!(rows[1].candidate_name, "Gamma");
}

#[test]
fn edited_name_is_used_for_rename() {
    let dir = tempfile::tempdir().unwrap();
    let (mut batch, paths) = batch_with(&dir, &[("scan.pdf", "Alpha")]);
    generate_everything(&mut batch);

    assert!(batch.edit_new_name(&paths[0], "bad/name").is_err());
    batch.edit_new_name(&paths[0], "Quarterly Review").unwrap();
    let selected = batch.select_all();
    batch.rename_all(&selected, |_| {}).unwrap();

    assert!(dir.path().join("Quarterly Review.pdf").exists());
}

#[test]
fn summary_and_report_count_every_status() {
    let dir = tempfile::tempdir().unwrap();
    let (mut batch, _) = batch_with(
        &dir,
        &[("a.pdf", "Alpha"), ("b.pdf", "FAIL"), ("c.doc", "x")],
    );
    generate_everything(&mut batch);

    let report = batch.report();
    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.generated, 1);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.skipped, 1);
    assert_eq!(report.rows.len(), 3);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["summary"]["generated"], 1);
    assert_eq!(json["rows"][0]["status"], "nameGenerated");
}

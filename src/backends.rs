//! Collaborator contracts the engine consumes, and the registry that carries
//! one instance of each into a batch.

use crate::caption::{LeadSentenceSummarizer, PaletteCaptioner};
use crate::error::AppError;
use crate::extract::{PdfTextExtractor, RasterImageDecoder};
use crate::ranker::TaggedTerm;
use crate::tagging::{HeuristicTagger, StopwordLanguageIdentifier};
use image::DynamicImage;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, path: &Path) -> Result<String, AppError>;
}

pub trait ImageDecoder: Send + Sync {
    fn decode_image(&self, path: &Path) -> Result<DynamicImage, AppError>;
}

/// Splits text into terms annotated with part of speech and stopword flag.
pub trait Tagger: Send + Sync {
    fn tag(&self, text: &str) -> Vec<TaggedTerm>;
}

pub trait Captioner: Send + Sync {
    fn caption(&self, image: &DynamicImage) -> Result<String, AppError>;
}

pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str) -> Result<String, AppError>;
}

/// Returns an ISO 639-1 code, or `None` when the language is unknown.
pub trait LanguageIdentifier: Send + Sync {
    fn identify(&self, text: &str) -> Option<String>;
}

/// Collaborator instances for one run. Built once, shared by every entity of
/// the batch, dropped with the orchestrator.
#[derive(Clone)]
pub struct Backends {
    text_extractor: Arc<dyn TextExtractor>,
    image_decoder: Arc<dyn ImageDecoder>,
    default_tagger: Arc<dyn Tagger>,
    taggers: HashMap<String, Arc<dyn Tagger>>,
    captioner: Arc<dyn Captioner>,
    summarizer: Option<Arc<dyn Summarizer>>,
    language_identifier: Option<Arc<dyn LanguageIdentifier>>,
}

impl Backends {
    pub fn new(
        text_extractor: Arc<dyn TextExtractor>,
        image_decoder: Arc<dyn ImageDecoder>,
        default_tagger: Arc<dyn Tagger>,
        captioner: Arc<dyn Captioner>,
    ) -> Self {
        Self {
            text_extractor,
            image_decoder,
            default_tagger,
            taggers: HashMap::new(),
            captioner,
            summarizer: None,
            language_identifier: None,
        }
    }

    /// Built-in collaborators: PDF text, raster decoding, English/French
    /// heuristic taggers, palette captions and lead-sentence summaries.
    pub fn heuristic(summary_max_words: usize) -> Self {
        Self::new(
            Arc::new(PdfTextExtractor),
            Arc::new(RasterImageDecoder),
            Arc::new(HeuristicTagger::english()),
            Arc::new(PaletteCaptioner::default()),
        )
        .with_tagger_for("en", Arc::new(HeuristicTagger::english()))
        .with_tagger_for("fr", Arc::new(HeuristicTagger::french()))
        .with_summarizer(Arc::new(LeadSentenceSummarizer::new(summary_max_words)))
        .with_language_identifier(Arc::new(StopwordLanguageIdentifier::default()))
    }

    pub fn with_tagger_for(mut self, language: &str, tagger: Arc<dyn Tagger>) -> Self {
        self.taggers.insert(language.to_lowercase(), tagger);
        self
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn with_language_identifier(mut self, identifier: Arc<dyn LanguageIdentifier>) -> Self {
        self.language_identifier = Some(identifier);
        self
    }

    pub fn text_extractor(&self) -> &dyn TextExtractor {
        self.text_extractor.as_ref()
    }

    pub fn image_decoder(&self) -> &dyn ImageDecoder {
        self.image_decoder.as_ref()
    }

    pub fn captioner(&self) -> &dyn Captioner {
        self.captioner.as_ref()
    }

    pub fn summarizer(&self) -> Option<&dyn Summarizer> {
        self.summarizer.as_deref()
    }

    pub fn language_identifier(&self) -> Option<&dyn LanguageIdentifier> {
        self.language_identifier.as_deref()
    }

    /// Tagger registered for `language`, falling back to the default one.
    pub fn tagger_for(&self, language: Option<&str>) -> &dyn Tagger {
        language
            .and_then(|code| self.taggers.get(&code.to_lowercase()))
            .map(|tagger| tagger.as_ref())
            .unwrap_or_else(|| self.default_tagger.as_ref())
    }
}

impl fmt::Debug for Backends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut languages: Vec<&String> = self.taggers.keys().collect();
        languages.sort();
        f.debug_struct("Backends")
            .field("tagger_languages", &languages)
            .field("summarizer", &self.summarizer.is_some())
            .field("language_identifier", &self.language_identifier.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranker::PartOfSpeech;

    struct MarkerTagger(&'static str);

    impl Tagger for MarkerTagger {
        fn tag(&self, _text: &str) -> Vec<TaggedTerm> {
            vec![TaggedTerm::new(self.0, PartOfSpeech::ProperNoun, false)]
        }
    }

    fn marker_backends() -> Backends {
        Backends::heuristic(8)
            .with_tagger_for("FR", Arc::new(MarkerTagger("French")))
            .with_tagger_for("de", Arc::new(MarkerTagger("German")))
    }

    #[test]
    fn tagger_lookup_is_case_insensitive() {
        let backends = marker_backends();
        assert_eq!(backends.tagger_for(Some("fr")).tag("x")[0].text, "French");
        assert_eq!(backends.tagger_for(Some("DE")).tag("x")[0].text, "German");
    }

    #[test]
    fn unknown_language_falls_back_to_default_tagger() {
        let backends = Backends::new(
            Arc::new(PdfTextExtractor),
            Arc::new(RasterImageDecoder),
            Arc::new(MarkerTagger("Default")),
            Arc::new(PaletteCaptioner::default()),
        )
        .with_tagger_for("fr", Arc::new(MarkerTagger("French")));

        assert_eq!(backends.tagger_for(None).tag("x")[0].text, "Default");
        assert_eq!(backends.tagger_for(Some("ja")).tag("x")[0].text, "Default");
    }

    #[test]
    fn optional_collaborators_start_unset() {
        let backends = Backends::new(
            Arc::new(PdfTextExtractor),
            Arc::new(RasterImageDecoder),
            Arc::new(HeuristicTagger::english()),
            Arc::new(PaletteCaptioner::default()),
        );
        assert!(backends.summarizer().is_none());
        assert!(backends.language_identifier().is_none());
        assert!(Backends::heuristic(8).summarizer().is_some());
    }
}

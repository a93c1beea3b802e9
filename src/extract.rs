use crate::backends::{ImageDecoder, TextExtractor};
use crate::error::AppError;
use image::{DynamicImage, ImageReader};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Text layer of a PDF document.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, AppError> {
        // The parser panics on some malformed documents instead of returning an error.
        match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text(path))) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(AppError::Extraction(format!("`{}`: {}", path.display(), e))),
            Err(payload) => Err(AppError::Extraction(format!(
                "`{}`: malformed PDF ({})",
                path.display(),
                panic_message(payload.as_ref())
            ))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "parser panicked".to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RasterImageDecoder;

impl ImageDecoder for RasterImageDecoder {
    /// The format is sniffed from the file content, not taken from the extension.
    fn decode_image(&self, path: &Path) -> Result<DynamicImage, AppError> {
        let failed = |e: &dyn std::fmt::Display| {
            AppError::Extraction(format!("`{}`: {}", path.display(), e))
        };
        ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| failed(&e))?
            .decode()
            .map_err(|e| failed(&e))
    }
}

/// Caps `text` at `max_chars` characters, cutting on a char boundary.
pub fn truncate_chars(text: &mut String, max_chars: usize) {
    if let Some((index, _)) = text.char_indices().nth(max_chars) {
        text.truncate(index);
    }
}

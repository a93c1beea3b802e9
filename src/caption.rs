use crate::backends::{Captioner, Summarizer};
use crate::error::AppError;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("gray", [128, 128, 128]),
    ("red", [200, 30, 30]),
    ("orange", [240, 140, 20]),
    ("yellow", [240, 220, 40]),
    ("green", [40, 160, 60]),
    ("teal", [0, 128, 128]),
    ("blue", [40, 80, 200]),
    ("purple", [128, 50, 160]),
    ("pink", [240, 150, 190]),
    ("brown", [120, 75, 40]),
    ("beige", [225, 205, 165]),
];

/// Describes an image by its dominant colour, brightness and orientation,
/// e.g. "dark blue landscape image".
#[derive(Debug, Clone)]
pub struct PaletteCaptioner {
    thumbnail_size: u32,
}

impl Default for PaletteCaptioner {
    fn default() -> Self {
        Self { thumbnail_size: 32 }
    }
}

impl PaletteCaptioner {
    pub fn with_thumbnail_size(mut self, size: u32) -> Self {
        self.thumbnail_size = size.max(1);
        self
    }
}

impl Captioner for PaletteCaptioner {
    fn caption(&self, image: &DynamicImage) -> Result<String, AppError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(AppError::Generation("image has no pixels".to_string()));
        }

        let thumbnail = image
            .resize(self.thumbnail_size, self.thumbnail_size, FilterType::Triangle)
            .to_rgb8();
        let mut sums = [0u64; 3];
        for pixel in thumbnail.pixels() {
            for (sum, channel) in sums.iter_mut().zip(pixel.0) {
                *sum += u64::from(channel);
            }
        }
        let count = u64::from(thumbnail.width()) * u64::from(thumbnail.height());
        let average = sums.map(|sum| (sum / count.max(1)) as u8);

        let mut words = Vec::new();
        if let Some(tone) = tone_of(average) {
            words.push(tone);
        }
        words.push(nearest_color(average));
        words.push(orientation(width, height));
        words.push("image");
        Ok(words.join(" "))
    }
}

fn luma(rgb: [u8; 3]) -> f32 {
    0.299 * f32::from(rgb[0]) + 0.587 * f32::from(rgb[1]) + 0.114 * f32::from(rgb[2])
}

fn tone_of(rgb: [u8; 3]) -> Option<&'static str> {
    let luma = luma(rgb);
    if luma < 60.0 {
        Some("dark")
    } else if luma > 200.0 {
        Some("bright")
    } else {
        None
    }
}

fn nearest_color(rgb: [u8; 3]) -> &'static str {
    NAMED_COLORS
        .iter()
        .min_by_key(|(_, reference)| {
            reference
                .iter()
                .zip(rgb)
                .map(|(a, b)| {
                    let diff = i32::from(*a) - i32::from(b);
                    diff * diff
                })
                .sum::<i32>()
        })
        .map(|(name, _)| *name)
        .unwrap_or("gray")
}

fn orientation(width: u32, height: u32) -> &'static str {
    let (width, height) = (u64::from(width), u64::from(height));
    if width * 5 > height * 6 {
        "landscape"
    } else if height * 5 > width * 6 {
        "portrait"
    } else {
        "square"
    }
}

/// First sentence with at least three words, cut to `max_words` words.
#[derive(Debug, Clone)]
pub struct LeadSentenceSummarizer {
    max_words: usize,
}

impl LeadSentenceSummarizer {
    pub fn new(max_words: usize) -> Self {
        Self {
            max_words: max_words.max(1),
        }
    }
}

impl Summarizer for LeadSentenceSummarizer {
    fn summarize(&self, text: &str) -> Result<String, AppError> {
        let sentences: Vec<Vec<&str>> = text
            .split(['.', '!', '?', '\n'])
            .map(|sentence| {
                sentence
                    .split_whitespace()
                    .map(|word| word.trim_matches(|ch: char| !ch.is_alphanumeric()))
                    .filter(|word| !word.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|words| !words.is_empty())
            .collect();

        let lead = sentences
            .iter()
            .find(|words| words.len() >= 3)
            .or_else(|| sentences.first())
            .ok_or_else(|| AppError::Generation("nothing to summarize".to_string()))?;

        Ok(lead
            .iter()
            .take(self.max_words)
            .copied()
            .collect::<Vec<_>>()
            .join(" "))
    }
}

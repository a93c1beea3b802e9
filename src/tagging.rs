//! Capitalisation-based tagging and stopword-overlap language identification.
//!
//! Neither is a linguistic model. A token is a proper noun when it is
//! capitalised in the middle of a sentence, or capitalised at the start of one
//! and seen capitalised mid-sentence elsewhere in the same text.

use crate::backends::{LanguageIdentifier, Tagger};
use crate::ranker::{PartOfSpeech, TaggedTerm};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.!?]+|[\p{L}\p{N}]+(?:['’\-][\p{L}\p{N}]+)*").expect("token pattern is valid")
});

static ENGLISH_STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be",
        "because", "been", "but", "by", "can", "could", "do", "does", "for", "from", "had", "has",
        "have", "he", "her", "his", "how", "i", "if", "in", "into", "is", "it", "its", "may",
        "more", "most", "no", "not", "of", "on", "or", "our", "she", "should", "so", "some",
        "such", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
        "those", "to", "was", "we", "were", "what", "when", "where", "which", "while", "who",
        "will", "with", "would", "you", "your",
    ]
    .into_iter()
    .collect()
});

static FRENCH_STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "à", "au", "aux", "avec", "ce", "ces", "cette", "dans", "de", "des", "du", "elle", "en",
        "est", "et", "être", "il", "ils", "je", "la", "le", "les", "leur", "lui", "mais", "me",
        "même", "mes", "moi", "mon", "ne", "nous", "on", "ou", "où", "par", "pas", "pour", "qu",
        "que", "qui", "sa", "se", "ses", "son", "sont", "sur", "ta", "te", "tes", "toi", "ton",
        "tu", "un", "une", "vos", "votre", "vous", "été", "était", "ont", "sans", "comme", "plus",
    ]
    .into_iter()
    .collect()
});

enum Token<'a> {
    SentenceEnd,
    Word(&'a str),
}

fn tokens(text: &str) -> impl Iterator<Item = Token<'_>> {
    TOKEN_RE.find_iter(text).map(|found| {
        let value = found.as_str();
        if value.starts_with(['.', '!', '?']) {
            Token::SentenceEnd
        } else {
            Token::Word(value)
        }
    })
}

fn is_capitalised(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

#[derive(Debug, Clone)]
pub struct HeuristicTagger {
    stopwords: &'static HashSet<&'static str>,
}

impl HeuristicTagger {
    pub fn english() -> Self {
        Self {
            stopwords: &ENGLISH_STOPWORDS,
        }
    }

    pub fn french() -> Self {
        Self {
            stopwords: &FRENCH_STOPWORDS,
        }
    }

    fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word.to_lowercase().as_str())
    }
}

impl Tagger for HeuristicTagger {
    fn tag(&self, text: &str) -> Vec<TaggedTerm> {
        let mut capitalised_mid_sentence = HashSet::new();
        let mut sentence_start = true;
        for token in tokens(text) {
            match token {
                Token::SentenceEnd => sentence_start = true,
                Token::Word(word) => {
                    if !sentence_start && is_capitalised(word) {
                        capitalised_mid_sentence.insert(word.to_lowercase());
                    }
                    sentence_start = false;
                }
            }
        }

        let mut terms = Vec::new();
        sentence_start = true;
        for token in tokens(text) {
            let word = match token {
                Token::SentenceEnd => {
                    sentence_start = true;
                    continue;
                }
                Token::Word(word) => word,
            };
            let is_stopword = self.is_stopword(word);
            let proper = is_capitalised(word)
                && !is_stopword
                && (!sentence_start || capitalised_mid_sentence.contains(&word.to_lowercase()));
            let pos = if proper {
                PartOfSpeech::ProperNoun
            } else {
                PartOfSpeech::Other
            };
            terms.push(TaggedTerm::new(word, pos, is_stopword));
            sentence_start = false;
        }
        terms
    }
}

/// Picks the language whose stopwords occur most often in the text.
#[derive(Debug, Clone)]
pub struct StopwordLanguageIdentifier {
    min_hits: usize,
    sample_tokens: usize,
}

impl StopwordLanguageIdentifier {
    pub fn new(min_hits: usize, sample_tokens: usize) -> Self {
        Self {
            min_hits,
            sample_tokens,
        }
    }
}

impl Default for StopwordLanguageIdentifier {
    fn default() -> Self {
        Self::new(3, 2_000)
    }
}

impl LanguageIdentifier for StopwordLanguageIdentifier {
    fn identify(&self, text: &str) -> Option<String> {
        let mut english = 0usize;
        let mut french = 0usize;
        let words = tokens(text)
            .filter_map(|token| match token {
                Token::Word(word) => Some(word.to_lowercase()),
                Token::SentenceEnd => None,
            })
            .take(self.sample_tokens);
        for word in words {
            if ENGLISH_STOPWORDS.contains(word.as_str()) {
                english += 1;
            }
            if FRENCH_STOPWORDS.contains(word.as_str()) {
                french += 1;
            }
        }

        let (code, hits) = match english.cmp(&french) {
            std::cmp::Ordering::Greater => ("en", english),
            std::cmp::Ordering::Less => ("fr", french),
            std::cmp::Ordering::Equal => return None,
        };
        (hits >= self.min_hits).then(|| code.to_string())
    }
}

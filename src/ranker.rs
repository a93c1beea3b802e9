//! Frequency-based file name synthesis from tagged terms.

use crate::model::AppSettings;
use caseless::default_case_fold_str;
use indexmap::IndexMap;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfSpeech {
    ProperNoun,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedTerm {
    pub text: String,
    pub pos: PartOfSpeech,
    pub is_stopword: bool,
}

impl TaggedTerm {
    pub fn new(text: impl Into<String>, pos: PartOfSpeech, is_stopword: bool) -> Self {
        Self {
            text: text.into(),
            pos,
            is_stopword,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankerLimits {
    /// Assembled names stay strictly shorter than this.
    pub max_name_length: usize,
    /// Terms this long or longer are never used.
    pub max_term_length: usize,
    /// Terms must be longer than this to survive filtering.
    pub min_term_length: usize,
}

impl Default for RankerLimits {
    fn default() -> Self {
        Self {
            max_name_length: 70,
            max_term_length: 30,
            min_term_length: 2,
        }
    }
}

impl From<&AppSettings> for RankerLimits {
    fn from(settings: &AppSettings) -> Self {
        Self {
            max_name_length: settings.max_name_length,
            max_term_length: settings.max_term_length,
            min_term_length: settings.min_term_length,
        }
    }
}

/// Word counts keyed by a representative casing.
///
/// Differently cased spellings of one word share a single key: the first
/// spelling seen. Iteration follows insertion order, which is also the
/// tie-break when two keys have the same count.
#[derive(Debug, Clone, Default)]
pub struct CandidateTable {
    counts: IndexMap<String, usize>,
    folded: HashMap<String, String>,
}

impl CandidateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters `terms` and merges the survivors.
    pub fn from_terms(terms: &[TaggedTerm], limits: &RankerLimits) -> Self {
        let mut table = Self::new();
        for term in terms.iter().filter(|term| is_candidate(term, limits)) {
            table.insert(&term.text);
        }
        table
    }

    /// Merges already filtered words.
    pub fn from_words<'a, I>(words: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut table = Self::new();
        for word in words {
            table.insert(word);
        }
        table
    }

    pub fn insert(&mut self, word: &str) {
        if let Some(count) = self.counts.get_mut(word) {
            *count += 1;
            return;
        }

        let folded = default_case_fold_str(word);
        let variants = [folded.clone(), capitalize(&folded), folded.to_uppercase()];
        let existing = variants
            .iter()
            .find(|variant| self.counts.contains_key(variant.as_str()))
            .cloned()
            .or_else(|| self.folded.get(&folded).cloned());

        match existing {
            Some(key) => {
                if let Some(count) = self.counts.get_mut(&key) {
                    *count += 1;
                }
            }
            None => {
                self.counts.insert(word.to_string(), 1);
                self.folded.insert(folded, word.to_string());
            }
        }
    }

    pub fn count(&self, word: &str) -> Option<usize> {
        self.counts.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(word, count)| (word.as_str(), *count))
    }

    /// Removes and returns the most frequent key, earliest inserted on ties.
    pub fn pop_most_frequent(&mut self) -> Option<(String, usize)> {
        let mut best: Option<(usize, usize)> = None;
        for (index, count) in self.counts.values().enumerate() {
            if best.map_or(true, |(_, best_count)| *count > best_count) {
                best = Some((index, *count));
            }
        }
        let (index, _) = best?;
        let (word, count) = self.counts.shift_remove_index(index)?;
        self.folded.remove(&default_case_fold_str(&word));
        Some((word, count))
    }

    /// Greedily joins the most frequent terms with `_`.
    ///
    /// Terms of `max_term_length` or more are dropped, as are terms that would
    /// bring the name to `max_name_length` or beyond. An empty result means no
    /// name could be built.
    pub fn assemble(mut self, limits: &RankerLimits) -> String {
        let mut words = Vec::new();
        while let Some((word, _)) = self.pop_most_frequent() {
            words.push(word);
        }
        join_bounded(words.iter().map(String::as_str), limits)
    }
}

/// Whether a tagged term is worth counting: not a stopword, a proper noun or
/// fully upper-case, and longer than `min_term_length`.
pub fn is_candidate(term: &TaggedTerm, limits: &RankerLimits) -> bool {
    !term.is_stopword
        && (term.pos == PartOfSpeech::ProperNoun || is_all_upper(&term.text))
        && term.text.chars().count() > limits.min_term_length
}

/// Full ranking pipeline: filter, merge, assemble.
pub fn rank_terms(terms: &[TaggedTerm], limits: &RankerLimits) -> String {
    CandidateTable::from_terms(terms, limits).assemble(limits)
}

/// Turns free text (a caption or a summary) into a name: whitespace-separated
/// words joined by `_` under the same length bounds as ranked terms.
pub fn phrase_to_name(phrase: &str, limits: &RankerLimits) -> String {
    join_bounded(phrase.split_whitespace(), limits)
}

fn join_bounded<'a, I>(words: I, limits: &RankerLimits) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut name = String::new();
    let mut name_len = 0usize;
    for word in words {
        let word_len = word.chars().count();
        if word_len == 0 || word_len >= limits.max_term_length {
            continue;
        }
        let separator = usize::from(name_len > 0);
        if name_len + separator + word_len >= limits.max_name_length {
            continue;
        }
        if separator == 1 {
            name.push('_');
        }
        name.push_str(word);
        name_len += separator + word_len;
    }
    name
}

fn is_all_upper(text: &str) -> bool {
    let mut has_cased = false;
    for ch in text.chars() {
        if ch.is_lowercase() {
            return false;
        }
        if ch.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

fn capitalize(folded: &str) -> String {
    let mut chars = folded.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

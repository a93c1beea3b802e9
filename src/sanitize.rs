use unicode_general_category::{get_general_category, GeneralCategory};
use unicode_normalization::UnicodeNormalization;

/// Characters Windows refuses in file names.
pub const FORBIDDEN_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

pub const REPLACEMENT: char = '_';

/// Makes `raw` safe to use as a file name: NFKC normalization, then control
/// characters, "symbol, other" characters and [`FORBIDDEN_CHARS`] become `_`.
///
/// Characters are replaced, never removed, so a non-empty input stays non-empty.
/// Applying the function twice gives the same result as applying it once.
pub fn sanitize_file_name(raw: &str) -> String {
    raw.nfkc()
        .map(|ch| if is_disallowed(ch) { REPLACEMENT } else { ch })
        .collect()
}

pub fn is_sanitized(name: &str) -> bool {
    sanitize_file_name(name) == name
}

fn is_disallowed(ch: char) -> bool {
    ch.is_control()
        || FORBIDDEN_CHARS.contains(&ch)
        || matches!(get_general_category(ch), GeneralCategory::OtherSymbol)
}

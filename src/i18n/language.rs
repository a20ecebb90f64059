//! Language descriptors and fuzzy tag matching.
//!
//! Translators write language tags by hand (`EN`, `eng`, `Span.`, `en/jp`),
//! so a tag is split into letter-only tokens and each token is checked
//! against the descriptor's code and as a prefix of its names.

use serde::{Deserialize, Serialize};

/// Shortest token that may match a language.
const MIN_TOKEN_LEN: usize = 2;

/// A language the user reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageDescriptor {
    /// Short canonical identifier (e.g., "en", "ja")
    pub code: String,

    /// English name (e.g., "English", "Japanese")
    pub name: String,

    /// Localized name (e.g., "English", "日本語")
    pub lang: String,
}

impl LanguageDescriptor {
    pub fn new(code: impl Into<String>, name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            lang: lang.into(),
        }
    }

    /// Method form of [`is_lang_match`].
    pub fn matches(&self, text_lang: &str) -> bool {
        is_lang_match(text_lang, self)
    }
}

/// Lower-cased, letter-only fragments of a free-text language tag.
fn candidate_tokens(text_lang: &str) -> Vec<String> {
    text_lang
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Does a free-text language tag refer to `current`?
///
/// True when any token of at least two letters
/// * is a prefix of the lower-cased English name,
/// * equals the code exactly (the code is not case-folded), or
/// * is a prefix of the lower-cased localized name.
///
/// # Example
/// ```
/// use livechat_filter::i18n::{is_lang_match, LanguageDescriptor};
///
/// let spanish = LanguageDescriptor::new("es", "Spanish", "español");
/// assert!(is_lang_match("span", &spanish));
/// assert!(is_lang_match("ES", &spanish));
/// assert!(!is_lang_match("en", &spanish));
/// ```
pub fn is_lang_match(text_lang: &str, current: &LanguageDescriptor) -> bool {
    let name = current.name.to_lowercase();
    let lang = current.lang.to_lowercase();

    candidate_tokens(text_lang).iter().any(|token| {
        token.len() >= MIN_TOKEN_LEN
            && (name.starts_with(token.as_str())
                || *token == current.code
                || lang.starts_with(token.as_str()))
    })
}

//! Language registry: catalogue of languages a reader can select.
//!
//! The registry is built once on first access (`OnceLock`) and never changes.
//! It only supplies descriptors; which one is current is up to the caller.

use crate::i18n::LanguageDescriptor;
use std::sync::OnceLock;

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageDescriptor>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language by its exact code.
    ///
    /// # Returns
    /// * `Some(&LanguageDescriptor)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageDescriptor> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Look a language up by code, English name or localized name,
    /// ignoring case.
    pub fn find(&self, text: &str) -> Option<&LanguageDescriptor> {
        let text = text.trim();
        self.languages.iter().find(|lang| {
            lang.code.eq_ignore_ascii_case(text)
                || lang.name.to_lowercase() == text.to_lowercase()
                || lang.lang.to_lowercase() == text.to_lowercase()
        })
    }

    /// Get all languages, in display order.
    pub fn list_all(&self) -> Vec<&LanguageDescriptor> {
        self.languages.iter().collect()
    }
}

/// Default language set.
fn default_languages() -> Vec<LanguageDescriptor> {
    [
        ("en", "English", "English"),
        ("ja", "Japanese", "日本語"),
        ("es", "Spanish", "Español"),
        ("zh", "Chinese", "中文"),
        ("ko", "Korean", "한국어"),
        ("id", "Indonesian", "Bahasa Indonesia"),
        ("ru", "Russian", "Русский"),
        ("fr", "French", "Français"),
        ("de", "German", "Deutsch"),
        ("pt", "Portuguese", "Português"),
        ("it", "Italian", "Italiano"),
        ("tl", "Tagalog", "Tagalog"),
        ("vi", "Vietnamese", "Tiếng Việt"),
        ("th", "Thai", "ไทย"),
    ]
    .into_iter()
    .map(|(code, name, lang)| LanguageDescriptor::new(code, name, lang))
    .collect()
}

//! Language handling for translated messages.
//!
//! # Architecture
//!
//! - `language`: `LanguageDescriptor` and the fuzzy tag matcher
//! - `registry`: catalogue of selectable languages
//!
//! # Example
//!
//! ```rust
//! use livechat_filter::i18n::{is_lang_match, LanguageRegistry};
//!
//! let japanese = LanguageRegistry::get().get_by_code("ja").unwrap();
//! assert!(is_lang_match("JP/Jap", japanese));
//! ```

mod language;
mod registry;

pub use language::{is_lang_match, LanguageDescriptor};
pub use registry::LanguageRegistry;

//! Allow/block filtering and translation-tag detection for live chat
//! messages.
//!
//! - [`filter`]: allow/block predicates built from regex fragment lists
//! - [`store`]: the subscribable lists those predicates follow
//! - [`translation`]: detects `[en] ...` / `en: ...` style translation tags
//! - [`i18n`]: language descriptors and fuzzy language-tag matching
//! - [`classifier`]: applies all of the above to a message

pub mod classifier;
pub mod config;
pub mod error;
pub mod filter;
pub mod i18n;
pub mod store;
pub mod translation;

pub use classifier::{Classification, MessageClassifier};
pub use error::FilterError;
pub use filter::{FilterKind, FilterPredicate};
pub use i18n::{is_lang_match, LanguageDescriptor};
pub use store::{FilterListStore, Subscription};
pub use translation::{parse_translation, TranslationTag};

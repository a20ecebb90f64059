//! Message classification: the allow/block filters, translation tag and
//! language check applied to one message.

use crate::error::FilterError;
use crate::filter::{FilterKind, FilterPredicate};
use crate::i18n::{is_lang_match, LanguageDescriptor};
use crate::store::{FilterListStore, Subscription};
use crate::translation::{parse_translation, TranslationTag};
use serde::Serialize;
use tracing::{debug, trace};

/// Everything the classifier found out about a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Matched the allow list
    pub allowed: bool,
    /// Matched the block list
    pub blocked: bool,
    /// Translation tag, if the message carries one
    pub translation: Option<TranslationTag>,
    /// The tag names the current language
    pub language_match: bool,
}

impl Classification {
    /// A message is shown unless blocked, and only if it is either allowed
    /// explicitly or a translation into the current language.
    pub fn should_show(&self) -> bool {
        !self.blocked && (self.allowed || self.language_match)
    }
}

/// Applies the user's filters and language to incoming messages.
///
/// A classifier built with [`MessageClassifier::new`] follows its stores
/// until it is dropped.
#[derive(Debug)]
pub struct MessageClassifier {
    allow: FilterPredicate,
    block: FilterPredicate,
    language: LanguageDescriptor,
    _subscriptions: Vec<Subscription>,
}

impl MessageClassifier {
    /// Build a classifier that follows the given allow and block stores.
    ///
    /// Fails if either store currently holds a list that does not compile.
    pub fn new(
        allow_store: &FilterListStore,
        block_store: &FilterListStore,
        language: LanguageDescriptor,
    ) -> Result<Self, FilterError> {
        let allow = FilterPredicate::new(FilterKind::Allow);
        let allow_subscription = allow.subscribe(allow_store)?;

        let block = FilterPredicate::new(FilterKind::Block);
        let block_subscription = block.subscribe(block_store)?;

        debug!(
            language = %language.code,
            allow_active = allow.is_active(),
            block_active = block.is_active(),
            "Message classifier ready"
        );

        Ok(Self {
            allow,
            block,
            language,
            _subscriptions: vec![allow_subscription, block_subscription],
        })
    }

    /// Build a classifier around predicates that are fed elsewhere, e.g. by
    /// [`FilterPredicate::watch`].
    pub fn from_predicates(
        allow: FilterPredicate,
        block: FilterPredicate,
        language: LanguageDescriptor,
    ) -> Self {
        Self {
            allow,
            block,
            language,
            _subscriptions: Vec::new(),
        }
    }

    pub fn language(&self) -> &LanguageDescriptor {
        &self.language
    }

    pub fn set_language(&mut self, language: LanguageDescriptor) {
        debug!(from = %self.language.code, to = %language.code, "Current language changed");
        self.language = language;
    }

    pub fn allow_filter(&self) -> &FilterPredicate {
        &self.allow
    }

    pub fn block_filter(&self) -> &FilterPredicate {
        &self.block
    }

    pub fn classify(&self, message: &str) -> Classification {
        let translation = parse_translation(message);
        let language_match = translation
            .as_ref()
            .is_some_and(|tag| is_lang_match(&tag.lang, &self.language));

        let classification = Classification {
            allowed: self.allow.test(message),
            blocked: self.block.test(message),
            translation,
            language_match,
        };

        trace!(
            allowed = classification.allowed,
            blocked = classification.blocked,
            language_match = classification.language_match,
            "Classified message"
        );

        classification
    }
}

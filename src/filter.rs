//! User-defined allow/block filters.
//!
//! A filter list is a set of regular-expression fragments. The fragments are
//! joined with `|` into one pattern, so a message passes the filter when any
//! fragment matches anywhere in it. An empty list never matches.
//!
//! The compiled pattern lives in a single slot that is swapped wholesale on
//! every list change. Readers clone the `Arc<Regex>` out of the slot and
//! match without holding the lock, so they see either the old or the new
//! pattern, never a mix.

use crate::error::FilterError;
use crate::store::{FilterListStore, Subscription};
use regex::Regex;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Which list a predicate was built from.
///
/// Both kinds behave the same; the kind only tells the consumer whether a
/// match means "include" or "exclude".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Allow,
    Block,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Allow => "allow",
            FilterKind::Block => "block",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Join filter fragments with `|` and compile them.
///
/// # Returns
/// * `Ok(None)` for an empty list
/// * `Ok(Some(regex))` for the combined pattern
/// * `Err(FilterError::InvalidPattern)` if the combined pattern does not compile
pub fn compile_filters<S: AsRef<str>>(filters: &[S]) -> Result<Option<Regex>, FilterError> {
    if filters.is_empty() {
        return Ok(None);
    }

    let pattern = filters
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("|");

    match Regex::new(&pattern) {
        Ok(regex) => Ok(Some(regex)),
        Err(source) => Err(FilterError::InvalidPattern { pattern, source }),
    }
}

/// A boolean test over messages, driven by a changing filter list.
///
/// Cloning is cheap and every clone shares the same matcher slot.
#[derive(Clone)]
pub struct FilterPredicate {
    kind: FilterKind,
    matcher: Arc<RwLock<Option<Arc<Regex>>>>,
}

impl FilterPredicate {
    /// Create a predicate with no active matcher.
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            matcher: Arc::new(RwLock::new(None)),
        }
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Replace the active matcher with one built from `filters`.
    ///
    /// An empty list clears the matcher. If the fragments do not compile,
    /// the error is returned and the previous matcher stays active.
    pub fn rebuild<S: AsRef<str>>(&self, filters: &[S]) -> Result<(), FilterError> {
        let compiled = match compile_filters(filters) {
            Ok(compiled) => compiled,
            Err(e) => {
                warn!(kind = %self.kind, error = %e, "Rejected filter list");
                return Err(e);
            }
        };

        debug!(
            kind = %self.kind,
            fragments = filters.len(),
            active = compiled.is_some(),
            "Rebuilt filter"
        );

        *self.matcher.write().unwrap_or_else(PoisonError::into_inner) = compiled.map(Arc::new);
        Ok(())
    }

    fn current(&self) -> Option<Arc<Regex>> {
        self.matcher
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a non-empty filter list is in effect.
    pub fn is_active(&self) -> bool {
        self.current().is_some()
    }

    /// The combined pattern currently in effect, if any.
    pub fn pattern(&self) -> Option<String> {
        self.current().map(|regex| regex.as_str().to_string())
    }

    /// Does `message` match any fragment of the current list?
    ///
    /// Always `false` while no list is active.
    pub fn test(&self, message: &str) -> bool {
        self.current().is_some_and(|regex| regex.is_match(message))
    }

    /// A standalone test function bound to this predicate's live state.
    pub fn tester(&self) -> impl Fn(&str) -> bool + Send + Sync + 'static {
        let predicate = self.clone();
        move |message| predicate.test(message)
    }

    /// Follow a `FilterListStore` for as long as the returned
    /// [`Subscription`] is kept.
    ///
    /// The store pushes its current list right away, so a compile error in
    /// the initial list is returned from here. Errors from later changes are
    /// returned to whoever changed the store.
    pub fn subscribe(&self, store: &FilterListStore) -> Result<Subscription, FilterError> {
        let predicate = self.clone();
        store.subscribe(move |filters| predicate.rebuild(filters))
    }

    /// Follow a watch channel of filter lists on a background task.
    ///
    /// The current value is applied first, then every change. The task ends
    /// with `Ok(())` once the sender is dropped, or with the first compile
    /// error.
    pub fn watch(&self, mut filters: watch::Receiver<Vec<String>>) -> FilterWatch {
        let predicate = self.clone();
        let handle: JoinHandle<Result<(), FilterError>> = tokio::spawn(async move {
            loop {
                let current = filters.borrow_and_update().clone();
                predicate.rebuild(&current)?;

                if filters.changed().await.is_err() {
                    debug!(kind = %predicate.kind, "Filter source closed");
                    return Ok(());
                }
            }
        });

        FilterWatch { handle }
    }
}

impl fmt::Debug for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterPredicate")
            .field("kind", &self.kind)
            .field("pattern", &self.pattern())
            .finish()
    }
}

/// Handle to a task started by [`FilterPredicate::watch`].
#[derive(Debug)]
pub struct FilterWatch {
    handle: JoinHandle<Result<(), FilterError>>,
}

impl FilterWatch {
    /// Wait for the follower to finish and return its outcome.
    pub async fn join(self) -> Result<(), FilterError> {
        self.handle.await?
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop following. The last applied matcher stays active.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ==================== compile_filters Tests ====================

    #[test]
    fn test_compile_empty_list_is_none() {
        let compiled = compile_filters::<&str>(&[]).unwrap();
        assert!(compiled.is_none());
    }

    #[test]
    fn test_compile_joins_with_alternation() {
        let compiled = compile_filters(&["foo", "ba+r"]).unwrap().unwrap();
        assert_eq!(compiled.as_str(), "foo|ba+r");
    }

    #[test]
    fn test_compile_invalid_fragment_reports_pattern() {
        let err = compile_filters(&["ok", "(unclosed"]).unwrap_err();
        match err {
            FilterError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "ok|(unclosed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    // ==================== test() Tests ====================

    #[test]
    fn test_new_predicate_matches_nothing() {
        let predicate = FilterPredicate::new(FilterKind::Allow);
        assert!(!predicate.is_active());
        assert!(!predicate.test("anything"));
        assert!(!predicate.test(""));
    }

    #[test]
    fn test_matches_anywhere_in_message() {
        let predicate = FilterPredicate::new(FilterKind::Block);
        predicate.rebuild(&["spam", "scam"]).unwrap();

        assert!(predicate.test("this is spam"));
        assert!(predicate.test("scammer alert"));
        assert!(!predicate.test("hello there"));
    }

    #[test]
    fn test_matching_is_case_sensitive_by_default() {
        let predicate = FilterPredicate::new(FilterKind::Allow);
        predicate.rebuild(&["Hello"]).unwrap();

        assert!(predicate.test("Hello world"));
        assert!(!predicate.test("hello world"));
    }

    #[test]
    fn test_fragment_can_embed_case_insensitivity() {
        let predicate = FilterPredicate::new(FilterKind::Allow);
        predicate.rebuild(&["(?i)hello"]).unwrap();

        assert!(predicate.test("HELLO world"));
    }

    #[test]
    fn test_fragments_keep_regex_syntax() {
        let predicate = FilterPredicate::new(FilterKind::Allow);
        predicate.rebuild(&[r"^\[en\]", r"\d{3}"]).unwrap();

        assert!(predicate.test("[en] hi"));
        assert!(predicate.test("call 555"));
        assert!(!predicate.test("hi [en]"));
    }

    // ==================== rebuild() Tests ====================

    #[test]
    fn test_empty_list_clears_matcher() {
        let predicate = FilterPredicate::new(FilterKind::Allow);
        predicate.rebuild(&["foo"]).unwrap();
        assert!(predicate.test("foo"));

        predicate.rebuild::<String>(&[]).unwrap();
        assert!(!predicate.is_active());
        assert!(!predicate.test("foo"));
    }

    #[test]
    fn test_rebuild_replaces_previous_matcher() {
        let predicate = FilterPredicate::new(FilterKind::Allow);
        predicate.rebuild(&["foo"]).unwrap();
        predicate.rebuild(&["bar"]).unwrap();

        assert!(!predicate.test("foo"));
        assert!(predicate.test("bar"));
        assert_eq!(predicate.pattern().as_deref(), Some("bar"));
    }

    #[test]
    fn test_invalid_rebuild_keeps_previous_matcher() {
        let predicate = FilterPredicate::new(FilterKind::Block);
        predicate.rebuild(&["foo"]).unwrap();

        let result = predicate.rebuild(&["foo", "[bad"]);

        assert!(matches!(result, Err(FilterError::InvalidPattern { .. })));
        assert!(predicate.test("foo"));
        assert_eq!(predicate.pattern().as_deref(), Some("foo"));
    }

    #[test]
    fn test_clones_share_state() {
        let predicate = FilterPredicate::new(FilterKind::Allow);
        let clone = predicate.clone();

        predicate.rebuild(&["shared"]).unwrap();

        assert!(clone.test("shared state"));
    }

    #[test]
    fn test_tester_sees_later_updates() {
        let predicate = FilterPredicate::new(FilterKind::Allow);
        let test = predicate.tester();
        assert!(!test("foo"));

        predicate.rebuild(&["foo"]).unwrap();
        assert!(test("foo"));
    }

    // ==================== Store Subscription Tests ====================

    #[test]
    fn test_subscribe_applies_current_store_value() {
        let store = FilterListStore::new(["foo"]);
        let predicate = FilterPredicate::new(FilterKind::Allow);

        let _subscription = predicate.subscribe(&store).unwrap();

        assert!(predicate.test("foo"));
    }

    #[test]
    fn test_subscribe_tracks_store_changes() {
        let store = FilterListStore::new(["foo"]);
        let predicate = FilterPredicate::new(FilterKind::Allow);
        let _subscription = predicate.subscribe(&store).unwrap();

        store.set(vec!["bar".to_string()]).unwrap();
        assert!(!predicate.test("foo"));
        assert!(predicate.test("bar"));

        store.set(Vec::new()).unwrap();
        assert!(!predicate.test("bar"));
    }

    #[test]
    fn test_subscribe_propagates_compile_error_from_initial_value() {
        let store = FilterListStore::new(["(oops"]);
        let predicate = FilterPredicate::new(FilterKind::Block);

        let result = predicate.subscribe(&store);

        assert!(matches!(result, Err(FilterError::InvalidPattern { .. })));
        assert!(!predicate.is_active());
    }

    #[test]
    fn test_store_set_propagates_compile_error() {
        let store = FilterListStore::new(["ok"]);
        let predicate = FilterPredicate::new(FilterKind::Block);
        let _subscription = predicate.subscribe(&store).unwrap();

        let result = store.set(vec!["*bad".to_string()]);

        assert!(result.is_err());
        assert!(predicate.test("ok"));
    }

    #[test]
    fn test_dropped_subscription_stops_tracking() {
        let store = FilterListStore::new(["foo"]);
        let predicate = FilterPredicate::new(FilterKind::Allow);
        let subscription = predicate.subscribe(&store).unwrap();

        drop(subscription);
        store.set(vec!["bar".to_string()]).unwrap();

        assert_eq!(store.listener_count(), 0);
        assert!(predicate.test("foo"));
        assert!(!predicate.test("bar"));
    }

    // ==================== Watch Channel Tests ====================

    #[tokio::test]
    async fn test_watch_applies_initial_value() {
        let (tx, rx) = watch::channel(vec!["foo".to_string()]);
        let predicate = FilterPredicate::new(FilterKind::Allow);

        let follower = predicate.watch(rx);
        drop(tx);
        follower.join().await.unwrap();

        assert!(predicate.test("foo"));
    }

    #[tokio::test]
    async fn test_watch_applies_latest_value_before_close() {
        let (tx, rx) = watch::channel(Vec::new());
        let predicate = FilterPredicate::new(FilterKind::Allow);

        let follower = predicate.watch(rx);
        tx.send(vec!["first".to_string()]).unwrap();
        tx.send(vec!["second".to_string()]).unwrap();
        drop(tx);
        follower.join().await.unwrap();

        assert!(!predicate.test("first"));
        assert!(predicate.test("second"));
    }

    #[tokio::test]
    async fn test_watch_stops_on_compile_error() {
        let (tx, rx) = watch::channel(vec!["good".to_string()]);
        let predicate = FilterPredicate::new(FilterKind::Block);

        let follower = predicate.watch(rx);
        tx.send(vec!["(bad".to_string()]).unwrap();

        let result = follower.join().await;

        assert!(matches!(result, Err(FilterError::InvalidPattern { .. })));
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn test_watch_abort_reports_task_error() {
        let (_tx, rx) = watch::channel(vec!["x".to_string()]);
        let predicate = FilterPredicate::new(FilterKind::Allow);

        let follower = predicate.watch(rx);
        follower.abort();

        let result = follower.join().await;
        assert!(matches!(result, Err(FilterError::WatchTask(_))));
    }

    // ==================== Misc Tests ====================

    #[test]
    fn test_filter_kind_display() {
        assert_eq!(FilterKind::Allow.to_string(), "allow");
        assert_eq!(FilterKind::Block.to_string(), "block");
    }

    #[test]
    fn test_debug_includes_kind_and_pattern() {
        let predicate = FilterPredicate::new(FilterKind::Block);
        predicate.rebuild(&["abc"]).unwrap();

        let debug = format!("{:?}", predicate);
        assert!(debug.contains("Block"));
        assert!(debug.contains("abc"));
    }

    // ==================== Property Tests ====================

    proptest! {
        #[test]
        fn prop_empty_list_never_matches(message in ".*") {
            let predicate = FilterPredicate::new(FilterKind::Allow);
            predicate.rebuild::<String>(&[]).unwrap();
            prop_assert!(!predicate.test(&message));
        }

        #[test]
        fn prop_literal_fragment_always_matches(
            fragments in proptest::collection::vec("[a-z0-9 ]{1,8}", 1..5),
            pick in any::<proptest::sample::Index>(),
            prefix in ".{0,10}",
            suffix in ".{0,10}",
        ) {
            let predicate = FilterPredicate::new(FilterKind::Allow);
            predicate.rebuild(&fragments).unwrap();

            let fragment = pick.get(&fragments);
            let message = format!("{prefix}{fragment}{suffix}");
            prop_assert!(predicate.test(&message));
        }
    }
}

//! Debounced search-as-you-type with a per-query result cache.
//!
//! Typing only records the query; the lookup runs once the input has been
//! quiet for the debounce interval. Responses are published only while the
//! query that produced them is still the current one, so a slow reply for an
//! older query can never overwrite fresher suggestions.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use shared::domain::Recipe;
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{config::ClientSettings, transport::SearchSource};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A record that can be offered as a suggestion.
pub trait Suggestion: Clone + Send + Sync + 'static {
    fn display_name(&self) -> &str;
}

impl Suggestion for Recipe {
    fn display_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
pub enum SuggestionEvent<T> {
    SuggestionsUpdated { query: String, suggestions: Vec<T> },
    Selected(T),
    SelectionCleared,
    PanelToggled(bool),
}

/// Render-ready snapshot of the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionView<T> {
    pub query: String,
    pub suggestions: Vec<T>,
    pub panel_open: bool,
    pub selection: Option<T>,
}

impl<T> SuggestionView<T> {
    pub fn show_suggestions(&self) -> bool {
        self.panel_open && !self.suggestions.is_empty()
    }
}

/// Waits until suggestions for `query` are published. Lagging behind the
/// channel skips ahead; `None` means the controller is gone. An update lost
/// to lag is not replayed, so callers bound this with a timeout.
pub async fn wait_for_suggestions<T: Clone>(
    events: &mut broadcast::Receiver<SuggestionEvent<T>>,
    query: &str,
) -> Option<Vec<T>> {
    loop {
        match events.recv().await {
            Ok(SuggestionEvent::SuggestionsUpdated {
                query: published,
                suggestions,
            }) if published == query => return Some(suggestions),
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "suggestion events lagged");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

struct SuggestionState<T> {
    query: String,
    suggestions: Vec<T>,
    cache: HashMap<String, Vec<T>>,
    in_flight: HashSet<String>,
    selection: Option<T>,
    panel_open: bool,
}

impl<T> Default for SuggestionState<T> {
    fn default() -> Self {
        Self {
            query: String::new(),
            suggestions: Vec::new(),
            cache: HashMap::new(),
            in_flight: HashSet::new(),
            selection: None,
            panel_open: false,
        }
    }
}

struct PendingLookup {
    generation: u64,
    handle: JoinHandle<()>,
}

struct Shared<S: SearchSource> {
    source: S,
    debounce: Duration,
    state: Mutex<SuggestionState<S::Item>>,
    pending: Mutex<Option<PendingLookup>>,
    generation: AtomicU64,
    events: broadcast::Sender<SuggestionEvent<S::Item>>,
}

impl<S: SearchSource> Shared<S> {
    fn state(&self) -> MutexGuard<'_, SuggestionState<S::Item>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pending(&self) -> MutexGuard<'_, Option<PendingLookup>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cancel_pending(&self) -> bool {
        match self.pending().take() {
            Some(pending) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Called by a timer once its quiet period elapsed. Returns false when a
    /// newer schedule already superseded it.
    fn release_pending(&self, generation: u64) -> bool {
        let mut pending = self.pending();
        match pending.as_ref() {
            Some(current) if current.generation == generation => {
                pending.take();
                true
            }
            _ => false,
        }
    }

    fn emit(&self, event: SuggestionEvent<S::Item>) {
        let _ = self.events.send(event);
    }

    fn publish(&self, query: &str, suggestions: Vec<S::Item>) -> bool {
        {
            let mut state = self.state();
            if state.query != query {
                debug!(query, current = %state.query, "discarding stale suggestions");
                return false;
            }
            state.suggestions = suggestions.clone();
        }
        self.emit(SuggestionEvent::SuggestionsUpdated {
            query: query.to_string(),
            suggestions,
        });
        true
    }

    async fn resolve(&self, query: String) -> Option<Vec<S::Item>> {
        if query.is_empty() {
            self.publish(&query, Vec::new());
            return Some(Vec::new());
        }

        let cached = {
            let mut state = self.state();
            let hit = state.cache.get(&query).cloned();
            if hit.is_none() && !state.in_flight.insert(query.clone()) {
                debug!(query = %query, "lookup already in flight");
                return None;
            }
            hit
        };
        if let Some(hit) = cached {
            debug!(query = %query, count = hit.len(), "suggestion cache hit");
            self.publish(&query, hit.clone());
            return Some(hit);
        }

        let outcome = self.source.search(&query).await;
        let results = {
            let mut state = self.state();
            state.in_flight.remove(&query);
            match outcome {
                Ok(items) => {
                    state.cache.insert(query.clone(), items.clone());
                    items
                }
                Err(err) => {
                    warn!(query = %query, error = %err, "suggestion lookup failed");
                    Vec::new()
                }
            }
        };
        self.publish(&query, results.clone());
        Some(results)
    }
}

pub struct SuggestionController<S: SearchSource> {
    shared: Arc<Shared<S>>,
}

impl<S> SuggestionController<S>
where
    S: SearchSource,
    S::Item: Suggestion,
{
    pub fn new(source: S, debounce: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                source,
                debounce,
                state: Mutex::new(SuggestionState::default()),
                pending: Mutex::new(None),
                generation: AtomicU64::new(0),
                events,
            }),
        }
    }

    pub fn from_settings(source: S, settings: &ClientSettings) -> Self {
        Self::new(source, settings.debounce())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SuggestionEvent<S::Item>> {
        self.shared.events.subscribe()
    }

    /// Records `text` as the current query and restarts the quiet period.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn set_query(&self, text: impl Into<String>) {
        let query = text.into();
        {
            let mut state = self.shared.state();
            if state.query == query {
                return;
            }
            state.query.clone_from(&query);
        }
        self.schedule(query);
    }

    fn schedule(&self, query: String) {
        let generation = self.shared.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let shared = Arc::clone(&self.shared);

        // Held across spawn so a zero-length timer cannot observe the slot early.
        let mut pending = self.shared.pending();
        if let Some(previous) = pending.take() {
            previous.handle.abort();
        }
        let handle = tokio::spawn(async move {
            tokio::time::sleep(shared.debounce).await;
            if !shared.release_pending(generation) {
                return;
            }
            shared.resolve(query).await;
        });
        *pending = Some(PendingLookup { generation, handle });
    }

    /// Resolves `query` immediately, cache first. Results are published only
    /// if `query` is the current query. Returns `None` when a lookup for the
    /// same query is already in flight.
    pub async fn fetch_suggestions(&self, query: &str) -> Option<Vec<S::Item>> {
        self.shared.resolve(query.to_string()).await
    }

    pub fn select_result(&self, item: S::Item) {
        self.shared.cancel_pending();
        let was_open = {
            let mut state = self.shared.state();
            state.selection = Some(item.clone());
            state.query.clear();
            state.suggestions.clear();
            std::mem::replace(&mut state.panel_open, false)
        };
        self.shared.emit(SuggestionEvent::Selected(item));
        if was_open {
            self.shared.emit(SuggestionEvent::PanelToggled(false));
        }
    }

    pub fn clear_selection(&self) {
        let had_selection = self.shared.state().selection.take().is_some();
        if had_selection {
            self.shared.emit(SuggestionEvent::SelectionCleared);
        }
    }

    /// Puts `item`'s name back into the search box and reopens the panel.
    pub fn request_edit(&self, item: &S::Item) {
        self.set_query(item.display_name());
        self.set_panel_open(true);
    }

    pub fn focus(&self) {
        self.set_panel_open(true);
    }

    pub fn blur(&self) {
        self.set_panel_open(false);
    }

    /// Interaction outside the search container closes the panel only.
    pub fn outside_interaction(&self) {
        self.set_panel_open(false);
    }

    fn set_panel_open(&self, open: bool) {
        let changed = {
            let mut state = self.shared.state();
            let changed = state.panel_open != open;
            state.panel_open = open;
            changed
        };
        if changed {
            self.shared.emit(SuggestionEvent::PanelToggled(open));
        }
    }

    pub fn view(&self) -> SuggestionView<S::Item> {
        let state = self.shared.state();
        SuggestionView {
            query: state.query.clone(),
            suggestions: state.suggestions.clone(),
            panel_open: state.panel_open,
            selection: state.selection.clone(),
        }
    }

    pub fn is_cached(&self, query: &str) -> bool {
        self.shared.state().cache.contains_key(query)
    }

    pub fn cached_queries(&self) -> Vec<String> {
        let mut queries: Vec<String> = self.shared.state().cache.keys().cloned().collect();
        queries.sort();
        queries
    }

    pub fn has_pending_lookup(&self) -> bool {
        self.shared.pending().is_some()
    }

    /// Cancels the pending debounce timer. In-flight lookups still finish and
    /// fill the cache.
    pub fn shutdown(&self) {
        if self.shared.cancel_pending() {
            debug!("cancelled pending suggestion lookup");
        }
    }
}

impl<S: SearchSource> Drop for SuggestionController<S> {
    fn drop(&mut self) {
        self.shared.cancel_pending();
    }
}

#[cfg(test)]
#[path = "tests/suggestion_tests.rs"]
mod tests;

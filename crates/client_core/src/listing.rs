//! Fetch-once listing split into fixed-size pages.

use shared::{domain::PageEntry, error::LoadFailure};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    config::ClientSettings,
    pagination::{generate_pagination, page_window, total_pages},
    transport::ListingSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a, T> {
    pub state: LoadState,
    pub page: usize,
    pub total_pages: usize,
    pub items: &'a [T],
    pub range: Vec<PageEntry>,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> PageView<'_, T> {
    /// The listing loaded fine but holds nothing; a failed load is not empty.
    pub fn is_empty_after_load(&self) -> bool {
        self.state == LoadState::Ready && self.total_pages == 0
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Idle | LoadState::Loading)
    }
}

pub struct PageController<L: ListingSource> {
    source: L,
    page_size: usize,
    state: watch::Sender<LoadState>,
    items: Vec<L::Item>,
    page: usize,
    failure: Option<LoadFailure>,
}

impl<L: ListingSource> PageController<L> {
    /// A `page_size` of zero is treated as one.
    pub fn new(source: L, page_size: usize) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            state: watch::Sender::new(LoadState::Idle),
            items: Vec::new(),
            page: 1,
            failure: None,
        }
    }

    pub fn from_settings(source: L, settings: &ClientSettings) -> Self {
        Self::new(source, settings.page_size)
    }

    /// Fetches the item list. Only the first call does anything.
    pub async fn load(&mut self) -> LoadState {
        let current = self.state();
        if current != LoadState::Idle {
            debug!(state = ?current, "listing already loaded; ignoring load request");
            return current;
        }

        self.state.send_replace(LoadState::Loading);
        match self.source.fetch_all().await {
            Ok(items) => {
                info!(count = items.len(), page_size = self.page_size, "listing loaded");
                self.items = items;
                self.page = 1;
                self.state.send_replace(LoadState::Ready);
            }
            Err(err) => {
                warn!(error = %err, "listing fetch failed");
                self.failure = Some(LoadFailure::from(&err));
                self.state.send_replace(LoadState::Error);
            }
        }
        self.state()
    }

    pub fn state(&self) -> LoadState {
        *self.state.borrow()
    }

    /// Follows load transitions while `load` holds the controller.
    pub fn subscribe_state(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    pub fn failure(&self) -> Option<&LoadFailure> {
        self.failure.as_ref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.items.len(), self.page_size)
    }

    pub fn items(&self) -> &[L::Item] {
        &self.items
    }

    /// Moves to page `n` when `1 <= n <= total_pages`; anything else is ignored.
    pub fn go_to_page(&mut self, n: usize) -> bool {
        let total = self.total_pages();
        if n == 0 || n > total {
            debug!(requested = n, total, "ignoring out-of-range page request");
            return false;
        }
        self.page = n;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.page + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        self.go_to_page(self.page.saturating_sub(1))
    }

    pub fn visible_items(&self) -> &[L::Item] {
        page_window(&self.items, self.page, self.page_size)
    }

    pub fn pagination_range(&self) -> Vec<PageEntry> {
        generate_pagination(self.page, self.total_pages())
    }

    pub fn view(&self) -> PageView<'_, L::Item> {
        let total_pages = self.total_pages();
        PageView {
            state: self.state(),
            page: self.page,
            total_pages,
            items: self.visible_items(),
            range: generate_pagination(self.page, total_pages),
            has_previous: self.page > 1,
            has_next: self.page < total_pages,
        }
    }
}

#[cfg(test)]
#[path = "tests/listing_tests.rs"]
mod tests;

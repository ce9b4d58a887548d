use super::*;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use tokio::sync::oneshot;

use shared::{
    domain::{PageEntry::{Ellipsis, Page}, Product, ProductId},
    error::FailureKind,
};

use crate::error::FetchError;

struct FakeCatalog {
    count: usize,
    fail: bool,
    calls: Arc<AtomicUsize>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeCatalog {
    fn with(count: usize) -> Self {
        Self {
            count,
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
            gate: Mutex::new(None),
        }
    }

    fn gated(count: usize) -> (Self, oneshot::Sender<()>) {
        let (release, gate) = oneshot::channel();
        let source = Self {
            gate: Mutex::new(Some(gate)),
            ..Self::with(count)
        };
        (source, release)
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with(0)
        }
    }
}

#[async_trait::async_trait]
impl ListingSource for FakeCatalog {
    type Item = Product;

    async fn fetch_all(&self) -> Result<Vec<Product>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().expect("gate lock").take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.fail {
            return Err(FetchError::Status {
                url: "fake://products".to_string(),
                status: 502,
            });
        }
        Ok((1..=self.count as i64)
            .map(|id| Product {
                id: ProductId(id),
                title: format!("Product {id}"),
                description: String::new(),
                price: 1.0,
                images: Vec::new(),
            })
            .collect())
    }
}

fn ids(items: &[Product]) -> Vec<i64> {
    items.iter().map(|p| p.id.0).collect()
}

#[tokio::test]
async fn starts_idle_and_loads_first_page() {
    let mut controller = PageController::new(FakeCatalog::with(100), 6);
    assert_eq!(controller.state(), LoadState::Idle);
    assert!(controller.view().is_loading());

    assert_eq!(controller.load().await, LoadState::Ready);
    let view = controller.view();
    assert_eq!(view.page, 1);
    assert_eq!(view.total_pages, 17);
    assert_eq!(ids(view.items), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(
        view.range,
        vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(17)]
    );
    assert!(!view.has_previous);
    assert!(view.has_next);
}

#[tokio::test]
async fn reports_loading_while_fetch_is_pending() {
    let (source, release) = FakeCatalog::gated(8);
    let mut controller = PageController::new(source, 6);
    let mut states = controller.subscribe_state();
    assert_eq!(*states.borrow_and_update(), LoadState::Idle);

    let observe = async {
        let seen = *states
            .wait_for(|state| *state != LoadState::Idle)
            .await
            .expect("state channel open");
        release.send(()).expect("release fetch");
        seen
    };
    let (loaded, seen) = tokio::join!(controller.load(), observe);

    assert_eq!(seen, LoadState::Loading);
    assert_eq!(loaded, LoadState::Ready);
    assert_eq!(controller.state(), LoadState::Ready);
    assert!(!controller.view().is_loading());
    assert_eq!(*states.borrow(), LoadState::Ready);
}

#[tokio::test]
async fn navigates_and_recomputes_window_and_range() {
    let mut controller = PageController::new(FakeCatalog::with(100), 6);
    controller.load().await;

    assert!(controller.go_to_page(10));
    assert_eq!(ids(controller.visible_items()), vec![55, 56, 57, 58, 59, 60]);
    assert_eq!(
        controller.pagination_range(),
        vec![Page(1), Ellipsis, Page(9), Page(10), Page(11), Ellipsis, Page(17)]
    );

    assert!(controller.go_to_page(17));
    let view = controller.view();
    assert_eq!(ids(view.items), vec![97, 98, 99, 100]);
    assert_eq!(
        view.range,
        vec![Page(1), Ellipsis, Page(14), Page(15), Page(16), Page(17)]
    );
    assert!(!view.has_next);
}

#[tokio::test]
async fn out_of_range_pages_are_ignored() {
    let mut controller = PageController::new(FakeCatalog::with(20), 6);
    controller.load().await;
    assert!(controller.go_to_page(2));

    assert!(!controller.go_to_page(0));
    assert!(!controller.go_to_page(5));
    assert!(!controller.go_to_page(usize::MAX));
    assert_eq!(controller.page(), 2);
}

#[tokio::test]
async fn previous_and_next_stop_at_the_edges() {
    let mut controller = PageController::new(FakeCatalog::with(13), 6);
    controller.load().await;

    assert!(!controller.previous_page());
    assert!(controller.next_page());
    assert!(controller.next_page());
    assert_eq!(controller.page(), 3);
    assert!(!controller.next_page());
    assert_eq!(ids(controller.visible_items()), vec![13]);
    assert!(controller.previous_page());
    assert_eq!(controller.page(), 2);
}

#[tokio::test]
async fn empty_listing_is_ready_with_no_pages() {
    let mut controller = PageController::new(FakeCatalog::with(0), 6);
    controller.load().await;

    let view = controller.view();
    assert!(view.is_empty_after_load());
    assert!(view.items.is_empty());
    assert!(view.range.is_empty());
    assert!(!controller.go_to_page(1));
    assert_eq!(controller.page(), 1);
}

#[tokio::test]
async fn failed_load_enters_error_state_without_items() {
    let mut controller = PageController::new(FakeCatalog::failing(), 6);

    assert_eq!(controller.load().await, LoadState::Error);
    let view = controller.view();
    assert!(view.items.is_empty());
    assert!(!view.is_empty_after_load());
    assert!(!view.is_loading());
    assert_eq!(
        controller.failure().map(|f| f.kind),
        Some(FailureKind::Status)
    );
    assert!(!controller.go_to_page(1));
}

#[tokio::test]
async fn listing_is_fetched_only_once() {
    let source = FakeCatalog::with(8);
    let calls = Arc::clone(&source.calls);
    let mut controller = PageController::new(source, 6);

    controller.load().await;
    controller.go_to_page(2);
    assert_eq!(controller.load().await, LoadState::Ready);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(controller.page(), 2);
}

#[tokio::test]
async fn page_size_changes_paging_not_range_shape() {
    let mut controller = PageController::new(FakeCatalog::with(100), 25);
    controller.load().await;
    assert_eq!(controller.total_pages(), 4);
    assert_eq!(
        controller.pagination_range(),
        vec![Page(1), Page(2), Page(3), Page(4)]
    );

    let zero = PageController::new(FakeCatalog::with(3), 0);
    assert_eq!(zero.page_size(), 1);
}

//! Client-side controllers for incrementally rendered lists: debounced
//! search suggestions and a paginated catalog.

pub mod config;
pub mod error;
pub mod listing;
pub mod pagination;
pub mod suggestion;
pub mod transport;

pub use config::{load_settings, ClientSettings};
pub use error::FetchError;
pub use listing::{LoadState, PageController, PageView};
pub use pagination::generate_pagination;
pub use suggestion::{
    wait_for_suggestions, Suggestion, SuggestionController, SuggestionEvent, SuggestionView,
};
pub use transport::{ListingSource, ProductCatalogClient, RecipeSearchClient, SearchSource};

use std::time::Duration;

/// Builds the reqwest client shared by both HTTP sources.
pub fn http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("gallery/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

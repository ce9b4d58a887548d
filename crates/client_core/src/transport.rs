use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::{Product, Recipe},
    protocol::{ListingQuery, ProductListResponse, RecipeSearchResponse, SearchQuery},
};

use crate::{config::ClientSettings, error::FetchError};

/// Remote collaborator answering search-as-you-type queries.
#[async_trait]
pub trait SearchSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    async fn search(&self, query: &str) -> Result<Vec<Self::Item>, FetchError>;
}

/// Remote collaborator providing the full item list for a paginated view.
#[async_trait]
pub trait ListingSource: Send + Sync {
    type Item: Clone + Send + Sync;

    async fn fetch_all(&self) -> Result<Vec<Self::Item>, FetchError>;
}

#[derive(Clone)]
pub struct RecipeSearchClient {
    http: Client,
    endpoint: String,
}

impl RecipeSearchClient {
    pub fn new(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_settings(http: Client, settings: &ClientSettings) -> Self {
        Self::new(http, settings.search_endpoint.clone())
    }
}

#[async_trait]
impl SearchSource for RecipeSearchClient {
    type Item = Recipe;

    async fn search(&self, query: &str) -> Result<Vec<Recipe>, FetchError> {
        let request = self
            .http
            .get(self.endpoint.as_str())
            .query(&SearchQuery { q: query });
        let body: RecipeSearchResponse = get_json(&self.endpoint, request).await?;
        Ok(body.recipes)
    }
}

#[derive(Clone)]
pub struct ProductCatalogClient {
    http: Client,
    endpoint: String,
    limit: u32,
}

impl ProductCatalogClient {
    pub fn new(http: Client, endpoint: impl Into<String>, limit: u32) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            limit,
        }
    }

    pub fn from_settings(http: Client, settings: &ClientSettings) -> Self {
        Self::new(
            http,
            settings.listing_endpoint.clone(),
            settings.listing_limit,
        )
    }
}

#[async_trait]
impl ListingSource for ProductCatalogClient {
    type Item = Product;

    async fn fetch_all(&self) -> Result<Vec<Product>, FetchError> {
        let request = self
            .http
            .get(self.endpoint.as_str())
            .query(&ListingQuery { limit: self.limit });
        let body: ProductListResponse = get_json(&self.endpoint, request).await?;
        Ok(body.products)
    }
}

async fn get_json<T: DeserializeOwned>(
    url: &str,
    request: reqwest::RequestBuilder,
) -> Result<T, FetchError> {
    let bytes = request
        .send()
        .await
        .map_err(|err| FetchError::from_reqwest(url, err))?
        .error_for_status()
        .map_err(|err| FetchError::from_reqwest(url, err))?
        .bytes()
        .await
        .map_err(|err| FetchError::from_reqwest(url, err))?;
    serde_json::from_slice(&bytes).map_err(|source| FetchError::MalformedBody {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;

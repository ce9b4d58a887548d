use serde::{Deserialize, Serialize};

use crate::domain::{Product, Recipe};

/// Body of `GET <search-endpoint>?q=<query>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeSearchResponse {
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Body of `GET <listing-endpoint>?limit=<N>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub skip: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery<'a> {
    pub q: &'a str,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ListingQuery {
    pub limit: u32,
}

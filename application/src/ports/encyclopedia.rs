//! Encyclopedia port
//!
//! Defines the interface for fetching category and article nodes from the
//! external encyclopedia service. Every error from this port is treated as
//! transient by the sampler, which restarts the sampling attempt with a
//! fresh seed rather than propagating.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while fetching from the encyclopedia service.
#[derive(Error, Debug)]
pub enum EncyclopediaError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Page not found: {0}")]
    NotFound(String),
}

/// A category node: its title and the titles of its member pages, in the
/// order the service lists them. Members whose title carries the
/// `Category:` prefix are subcategories; the rest are leaf articles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPage {
    pub title: String,
    pub members: Vec<String>,
}

/// A leaf article node with its plain-text body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlePage {
    pub page_id: u64,
    pub title: String,
    pub text: String,
}

/// A node in the category tree, fetched lazily by title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageNode {
    Category(CategoryPage),
    Article(ArticlePage),
}

/// Gateway to the encyclopedia service.
#[async_trait]
pub trait EncyclopediaPort: Send + Sync {
    /// Fetch the node named by `title`: a category listing for
    /// `Category:`-prefixed titles, an article otherwise.
    async fn fetch_node(&self, title: &str) -> Result<PageNode, EncyclopediaError>;
}

//! MediaWiki API client implementing the encyclopedia port.
//!
//! Two query shapes cover the whole walk: `list=categorymembers` for
//! category nodes and `prop=extracts` (plain text) for leaf articles.
//! Transport and decode failures map onto [`EncyclopediaError`]; the
//! sampler treats all of them as retryable.

use async_trait::async_trait;
use quizsmith_application::{ArticlePage, CategoryPage, EncyclopediaError, EncyclopediaPort, PageNode};
use quizsmith_domain::is_category_title;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::debug;

/// Public MediaWiki API endpoint of the English encyclopedia.
pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";

const USER_AGENT: &str = "quizsmith/0.3 (MCQ dataset generator)";

/// Category members a single request may return.
const MEMBER_LIMIT: &str = "500";

/// MediaWiki adapter for the [`EncyclopediaPort`].
pub struct MediaWikiClient {
    client: reqwest::Client,
    api_url: String,
}

impl MediaWikiClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        query: &[(&str, &str)],
    ) -> Result<T, EncyclopediaError> {
        let response = self
            .client
            .get(&self.api_url)
            .header("User-Agent", USER_AGENT)
            .query(query)
            .send()
            .await
            .map_err(|e| EncyclopediaError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EncyclopediaError::Service(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| EncyclopediaError::Service(format!("undecodable response: {e}")))
    }

    async fn fetch_category(&self, title: &str) -> Result<CategoryPage, EncyclopediaError> {
        let response: CategoryMembersResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "categorymembers"),
                ("cmtitle", title),
                ("cmlimit", MEMBER_LIMIT),
                ("format", "json"),
            ])
            .await?;

        let members = category_members(title, response)?;
        debug!(title, members = members.len(), "Fetched category node");
        Ok(CategoryPage {
            title: title.to_string(),
            members,
        })
    }

    async fn fetch_article(&self, title: &str) -> Result<ArticlePage, EncyclopediaError> {
        let response: ExtractResponse = self
            .get_json(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
            ])
            .await?;

        let article = article_page(title, response)?;
        debug!(title, page_id = article.page_id, "Fetched article node");
        Ok(article)
    }
}

#[async_trait]
impl EncyclopediaPort for MediaWikiClient {
    async fn fetch_node(&self, title: &str) -> Result<PageNode, EncyclopediaError> {
        if is_category_title(title) {
            Ok(PageNode::Category(self.fetch_category(title).await?))
        } else {
            Ok(PageNode::Article(self.fetch_article(title).await?))
        }
    }
}

// ==================== Response decoding ====================

#[derive(Debug, Deserialize)]
struct CategoryMembersResponse {
    query: Option<CategoryMembersQuery>,
}

#[derive(Debug, Deserialize)]
struct CategoryMembersQuery {
    categorymembers: Vec<CategoryMember>,
}

#[derive(Debug, Deserialize)]
struct CategoryMember {
    title: String,
}

fn category_members(
    title: &str,
    response: CategoryMembersResponse,
) -> Result<Vec<String>, EncyclopediaError> {
    let query = response
        .query
        .ok_or_else(|| EncyclopediaError::NotFound(title.to_string()))?;
    Ok(query.categorymembers.into_iter().map(|m| m.title).collect())
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    pages: HashMap<String, ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    pageid: Option<u64>,
    title: Option<String>,
    extract: Option<String>,
}

fn article_page(title: &str, response: ExtractResponse) -> Result<ArticlePage, EncyclopediaError> {
    let page = response
        .query
        .and_then(|q| q.pages.into_values().next())
        .ok_or_else(|| EncyclopediaError::NotFound(title.to_string()))?;

    // Missing pages come back without a pageid
    let Some(page_id) = page.pageid else {
        return Err(EncyclopediaError::NotFound(title.to_string()));
    };

    Ok(ArticlePage {
        page_id,
        title: page.title.unwrap_or_else(|| title.to_string()),
        text: page.extract.unwrap_or_default(),
    })
}

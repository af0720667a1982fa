//! Encyclopedia adapter: MediaWiki HTTP client.

mod client;

pub use client::{DEFAULT_API_URL, MediaWikiClient};

//! Web context gathering: search engines, website scraping, and LinkedIn
//! profile lookup. Everything here is best effort; failures degrade to empty
//! context rather than aborting a row.

pub mod linkedin;
pub mod scrape;
pub mod search;

pub use linkedin::LinkedInFinder;
pub use search::{DuckDuckGo, GoogleSearch};

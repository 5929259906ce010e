//! Source scrapers.
//!
//! A scraper turns a symbol into a downloaded, parsed page. Each one follows
//! the same split:
//!
//! 1. **Fetching**: build the source URL and download it through a [`crate::fetch::FetchPage`]
//! 2. **Parsing**: run the synchronous extractors from [`crate::extract`] over the document
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Finviz | [`finviz`] | HTML scraping | Quote page carries both news and snapshot tables |

pub mod finviz;

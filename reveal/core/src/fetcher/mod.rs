//! Search Result Fetching
//!
//! Abstracted access to the service that answers queries with a
//! [`StructuredResult`](crate::result::StructuredResult).
//!
//! # Usage
//!
//! ```ignore
//! use reveal_core::fetcher::{HttpResultFetcher, ResultFetcher};
//!
//! let fetcher = HttpResultFetcher::new("http://localhost:8001", Duration::from_secs(120))?;
//! let result = fetcher.fetch("What is Rust?").await?;
//! ```

mod http;
mod traits;

pub use http::HttpResultFetcher;
pub use traits::{FetchError, ResultFetcher};

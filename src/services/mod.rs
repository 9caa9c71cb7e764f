//! External service interactions
//!
//! - `api` - blocking REST client for the evaluation backend
//! - `fetcher` - runs requests on worker threads and collects completions

pub mod api;
pub mod fetcher;

pub use api::{ApiClient, ApiError, Payload, Request};
pub use fetcher::{Completion, Fetcher, Origin, PollTimer, RequestId, Tickets};

//! Stage 1 input: getting the listing page and pulling entries out of it.
//!
//! - [`fetch`]: one bounded HTTP GET for the page markup
//! - [`hacker_news`]: markup → [`RawEntry`](crate::models::RawEntry) extraction
//!
//! Fetch failures are fatal. Extraction never fails as a whole; malformed
//! entries are logged and skipped one at a time.

pub mod fetch;
pub mod hacker_news;

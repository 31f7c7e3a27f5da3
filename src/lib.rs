//! A small blocking Rust client for the DSpace REST API (`/RESTapi`).
//!
//! The crate maps one method to one HTTP request: list, read, create, update and
//! delete communities, collections, items, bitstreams and metadata, and resolve
//! handles. Records are passed through as [`serde_json::Value`] exactly as the
//! server returns them.
//!
//! ## Quick start
//! - Configure the account via environment variables (`DSPACE_URL`, `DSPACE_EMAIL`,
//!   `DSPACE_PASSWORD`, optionally `DSPACE_COMMUNITY_ID`) or a `.dspacerc` file
//!   (current directory or home directory).
//! - Read operations need no login. Write operations log in, send their request
//!   and log out again.
//!
//! ```no_run
//! use dspace_rest::Client;
//! use serde_json::json;
//!
//! fn main() -> dspace_rest::Result<()> {
//!     let client = Client::from_env()?;
//!
//!     let community = client.create_community(&json!({ "name": "Test" }))?;
//!     let community_id = community["uuid"].as_str().unwrap_or_default().to_string();
//!
//!     // Several writes with one token:
//!     client.with_session(|session| {
//!         let collection = session
//!             .create_community_collection(&community_id, &json!({ "name": "Reports" }))?;
//!         let collection_id = collection["uuid"].as_str().unwrap_or_default();
//!         session.create_collection_item(collection_id, &json!({ "metadata": [] }))
//!     })?;
//!     Ok(())
//! }
//! ```
//!
//! Every failure comes back as an [`Error`]; the client never retries.

#![forbid(unsafe_code)]

mod client;
mod config;
mod endpoints;
mod error;
mod session;
mod util;

pub use client::{Client, ClientConfig};
pub use error::{Error, Result};
pub use session::Session;

//! Common test infrastructure
//!
//! End-to-end tests drive a real `CatalogClient` against an in-process mock
//! of the catalog API. Tests should only import from this module.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{client_for, fixtures, Collection, MockApi};
//!
//! #[tokio::test]
//! async fn test_fetch_songs() {
//!     let api = MockApi::spawn().await;
//!     api.serve("/api/songs", Collection::new(fixtures::songs(3)));
//!
//!     let (session, _progress) = client_for(&api.base_url, 2, 2).songs().unwrap();
//!     let outcome = session.collect().await.unwrap();
//!     assert_eq!(outcome.data.len(), 3);
//! }
//! ```
#![allow(dead_code)]

mod client;
mod constants;
pub mod fixtures;
mod server;

pub use client::{authenticated_client, client_for};
pub use constants::*;
pub use server::{Collection, MockApi, RecordedRequest, Wrapper};

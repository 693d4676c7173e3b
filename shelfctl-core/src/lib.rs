//! shelfctl-core - client for the hosted library database
//!
//! This crate provides:
//! - Service configuration (config file, `.env`, `SUPABASE_URL`/`SUPABASE_KEY`)
//! - A small PostgREST request builder over a pluggable [`Transport`]
//! - One wrapper per library operation (registration, stock, circulation, reports)
//!
//! ## Architecture
//!
//! ```text
//! Library::borrow_book → RestClient::rpc → Transport::execute → backend
//!                                              ↑
//!                               HttpTransport (reqwest) | MockTransport
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod library;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod rest;

pub use config::{Overrides, ServiceConfig};
pub use error::{Entity, Result, ShelfError};
pub use http::HttpTransport;
pub use library::{Library, Report, RpcOutcome};
pub use rest::{Method, RestClient, RestRequest, Row, Transport};

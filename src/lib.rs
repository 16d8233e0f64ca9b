//! BCCh CLI Library
//!
//! Exposes the cache, the batch fetcher, the API client and the CLI glue so the
//! binary and the integration tests share one implementation.

pub mod cache;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod data;
pub mod fetch;
pub mod output;

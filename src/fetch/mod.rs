// src/fetch/mod.rs
// =============================================================================
// This module contains the page fetcher.
//
// Submodules:
// - http: the Fetcher trait, its reqwest implementation and FetchError
// =============================================================================

mod http;

pub use http::{FetchError, Fetcher, HttpFetcher};

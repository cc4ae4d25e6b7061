// src/fetch/mod.rs
// =============================================================================
// This module talks to the network.
//
// Submodules:
// - http: issues the HEAD/GET requests and classifies the outcome
// - html: pulls raw href/src values out of an HTML document
// =============================================================================

mod html;
mod http;

pub use http::{FetchOutcome, Fetcher};

//! EDITS Client - HTTP retrieval of provider metadata files
//!
//! This crate provides [`HttpFetcher`], the reqwest-backed implementation of
//! [`edits_core::RemoteFetcher`] used by the command-line interface.

pub mod http;

pub use http::HttpFetcher;

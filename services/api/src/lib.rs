//! services/api/src/lib.rs
//!
//! The library crate for the `api` service. Binaries under `src/bin/` pull the
//! adapters and web layer from here.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;

//! Domain types shared by the store, catalog, and API crates.
//!
//! This crate has no I/O: it holds the error taxonomy, the filterable
//! restaurant vocabulary (days, time slots, filter fields), review input
//! validation, name folding, and the TTL cache used for distinct-value
//! lists.

pub mod cache;
pub mod error;
pub mod filter;
pub mod restaurant;
pub mod review;
pub mod text;
pub mod types;

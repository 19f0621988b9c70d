//! Campfinder Core - Shared domain types.
//!
//! This crate provides the vocabulary used across all Campfinder components:
//! - `api` - GraphQL server for users, bootcamps and courses
//! - `cli` - Command-line tools for migrations and account bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs and emails, the career taxonomy,
//!   slugs, pagination, partial-update patches and cost aggregation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

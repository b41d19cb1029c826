//! Core domain model for playlens.
//!
//! This crate defines the enriched per-track output model, the text
//! normalization primitives used for fuzzy matching, and the genre
//! taxonomy (canonical synonyms plus the community-tag denylist).
//! Nothing in here performs I/O.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod taxonomy;
pub mod text;

pub use error::{Error, Result};

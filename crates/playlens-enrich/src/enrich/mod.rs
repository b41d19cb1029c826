//! Enrichment components.

pub mod artist;
pub mod lastfm;
pub mod lyrics;
pub mod resilience;
pub mod track;

pub mod genre;

pub use genre::{canonicalize_genre, is_denylisted};

//! Serde helper for values that arrive either natively or as strings.
//!
//! Environment variables always reach the config layer as strings, and
//! Last.fm reports tag counts as numbers or numeric strings depending on
//! the endpoint.

use std::fmt::Display;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NativeOrString<T> {
    Native(T),
    Text(String),
}

/// Deserialize `T` from its native form or from a string that parses to it.
pub(crate) fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match NativeOrString::<T>::deserialize(deserializer)? {
        NativeOrString::Native(value) => Ok(value),
        NativeOrString::Text(text) => text.trim().parse().map_err(de::Error::custom),
    }
}

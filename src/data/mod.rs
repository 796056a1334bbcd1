mod run;

pub use run::*;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::BufRead;

/// Serializes the value as pretty printed JSON.
///
/// # Errors
/// - If the value cannot be represented as JSON.
pub fn to_string<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Reads a JSON value from the reader.
///
/// # Errors
/// - If the reader fails or its content is not a valid `T`.
pub fn deserialize<T: DeserializeOwned>(reader: &mut impl BufRead) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(reader)?)
}

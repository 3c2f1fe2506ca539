//! Shared error types for the vibe coder system

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Serialization failed: {message}")]
    SerializationError { message: String },

    #[error("Deserialization failed: {message}")]
    DeserializationError { message: String },

    #[error("Invalid log filter: {message}")]
    LoggingError { message: String },
}

pub type SharedResult<T> = Result<T, SharedError>;

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            SharedError::DeserializationError { message: err.to_string() }
        } else {
            SharedError::SerializationError { message: err.to_string() }
        }
    }
}

/// Decode a JSON array of records, returning an error for anything malformed
pub fn decode_records<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> SharedResult<Vec<T>> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Encode records as a pretty-printed JSON array
pub fn encode_records<T: serde::Serialize>(records: &[T]) -> SharedResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records)?)
}

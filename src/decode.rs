//! Decode with JSON-path context in error messages.

use serde::de::DeserializeOwned;

use crate::error::ReadError;

pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, ReadError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(ReadError::Decode(format!(
                "at JSON path {path} → {}",
                err.into_inner()
            )))
        }
    }
}

pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ReadError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(ReadError::Decode(format!(
                "at JSON path {path} → {}",
                err.into_inner()
            )))
        }
    }
}

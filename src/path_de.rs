use serde::de::DeserializeOwned;
use thiserror::Error;

/// A deserialization failure located by its JSON path.
#[derive(Debug, Error)]
#[error("at JSON path {path} → {message}")]
pub struct PathError {
    pub path: String,
    pub message: String,
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, PathError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| PathError {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn error_names_the_offending_path() {
        let err = from_str_with_path::<BTreeMap<String, Vec<u32>>>(r#"{ "a": [1, "two"] }"#).unwrap_err();
        assert_eq!(err.path, "a[1]");
        assert!(err.to_string().starts_with("at JSON path a[1]"));
    }
}

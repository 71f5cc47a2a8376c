use thiserror::Error;

/// Errors raised while turning raw upstream payloads into typed records.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("raw payload could not be normalized: {0}")]
    Normalize(serde_json::Error),
    #[error("raw payload is not an object (found {0})")]
    NotAnObject(&'static str),
    #[error("unparsable date '{0}'")]
    InvalidDate(String),
    #[error("field '{field}' has an unexpected type: expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    #[error("mapped {entity} could not be hydrated: {source}")]
    Hydrate {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl MappingError {
    pub fn hydrate(entity: &'static str, source: serde_json::Error) -> Self {
        MappingError::Hydrate { entity, source }
    }
}

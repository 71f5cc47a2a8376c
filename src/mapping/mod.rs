//! Declarative field mapping from upstream payloads to internal records.
//!
//! Every entity type owns one static [`MappingTable`] listing the upstream keys
//! it cares about and where each one lands internally. A key either copies its
//! value verbatim ([`FieldTarget::Direct`]) or runs it through a typed
//! [`FieldParser`] first ([`FieldTarget::Parsed`]), e.g. to turn upstream date
//! strings into RFC 3339 timestamps or to map a nested user object.
//!
//! Mapping is lenient: unknown upstream keys are ignored, missing or `null`
//! values are left absent, and parser failures are logged and dropped rather
//! than failing the whole record.

mod error;
mod parsers;
mod tables;

pub use error::MappingError;
pub use parsers::{parse_date, parse_user};
pub use tables::{POST_MAPPING, USER_MAPPING};

use crate::models::{Post, User};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Converts one raw upstream value into its internal representation.
///
/// `Ok(None)` means the field should be left absent.
pub type FieldParser = fn(&Value) -> Result<Option<Value>, MappingError>;

/// Mapped fields keyed by internal field name.
pub type MappedFields = Map<String, Value>;

/// Where an upstream field ends up internally.
#[derive(Clone, Copy)]
pub enum FieldTarget {
    Direct(&'static str),
    Parsed(&'static str, FieldParser),
}

impl FieldTarget {
    pub fn internal_name(&self) -> &'static str {
        match self {
            FieldTarget::Direct(name) | FieldTarget::Parsed(name, _) => name,
        }
    }
}

impl std::fmt::Debug for FieldTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldTarget::Direct(name) => f.debug_tuple("Direct").field(name).finish(),
            FieldTarget::Parsed(name, _) => f.debug_tuple("Parsed").field(name).finish(),
        }
    }
}

/// One row of a mapping table.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub upstream: &'static str,
    pub target: FieldTarget,
}

impl FieldMapping {
    pub const fn direct(upstream: &'static str, internal: &'static str) -> Self {
        Self {
            upstream,
            target: FieldTarget::Direct(internal),
        }
    }

    pub const fn parsed(
        upstream: &'static str,
        internal: &'static str,
        parser: FieldParser,
    ) -> Self {
        Self {
            upstream,
            target: FieldTarget::Parsed(internal, parser),
        }
    }
}

pub type MappingTable = &'static [FieldMapping];

/// Normalize any serializable payload into a JSON object.
///
/// Upstream data may arrive as an already-decoded `serde_json::Value`, a typed
/// struct, or a map; all of them end up as the same representation.
pub fn normalize<T: Serialize + ?Sized>(raw: &T) -> Result<Map<String, Value>, MappingError> {
    match serde_json::to_value(raw).map_err(MappingError::Normalize)? {
        Value::Object(map) => Ok(map),
        Value::Null => Err(MappingError::NotAnObject("null")),
        Value::Bool(_) => Err(MappingError::NotAnObject("boolean")),
        Value::Number(_) => Err(MappingError::NotAnObject("number")),
        Value::String(_) => Err(MappingError::NotAnObject("string")),
        Value::Array(_) => Err(MappingError::NotAnObject("array")),
    }
}

/// Apply `table` to a raw payload, producing fields keyed by internal name.
pub fn transform<T: Serialize + ?Sized>(
    raw: &T,
    table: MappingTable,
) -> Result<MappedFields, MappingError> {
    let raw = normalize(raw)?;
    log::debug!("raw data to transform: {}", Value::Object(raw.clone()));

    let mut fields = MappedFields::new();
    for mapping in table {
        let value = match raw.get(mapping.upstream) {
            None | Some(Value::Null) => continue,
            Some(value) => value,
        };

        match mapping.target {
            FieldTarget::Direct(name) => {
                fields.insert(name.to_string(), value.clone());
            }
            FieldTarget::Parsed(name, parser) => match parser(value) {
                Ok(Some(parsed)) => {
                    fields.insert(name.to_string(), parsed);
                }
                Ok(None) => {}
                Err(err) => {
                    log::warn!(
                        "dropping field '{}' after parser failure: {}",
                        mapping.upstream,
                        err
                    );
                }
            },
        }
    }

    Ok(fields)
}

/// Keep the fields `T` accepts, one at a time.
///
/// A trial that only fails on a missing field means every present value
/// type-checked, so the field just added is kept.
fn well_typed_fields<T: DeserializeOwned>(fields: MappedFields) -> MappedFields {
    let mut accepted = MappedFields::new();
    for (name, value) in fields {
        accepted.insert(name.clone(), value);
        match T::deserialize(&Value::Object(accepted.clone())) {
            Ok(_) => {}
            Err(err) if err.to_string().starts_with("missing field") => {}
            Err(err) => {
                log::warn!("dropping field '{}' with unexpected shape: {}", name, err);
                accepted.remove(&name);
            }
        }
    }
    accepted
}

/// Records that can be hydrated from raw upstream payloads.
pub trait Transform: DeserializeOwned {
    /// Human-readable entity name used in error messages.
    const ENTITY: &'static str;
    const MAPPING: MappingTable;

    /// Hydrate a record, dropping any field whose value has the wrong shape.
    ///
    /// Fails only when a required field is missing or was dropped.
    fn from_fields(fields: MappedFields) -> Result<Self, MappingError> {
        let record = Value::Object(fields);
        match Self::deserialize(&record) {
            Ok(hydrated) => return Ok(hydrated),
            Err(err) => log::warn!("{} payload did not hydrate cleanly: {}", Self::ENTITY, err),
        }

        let Value::Object(fields) = record else {
            return Err(MappingError::NotAnObject(Self::ENTITY));
        };
        serde_json::from_value(Value::Object(well_typed_fields::<Self>(fields)))
            .map_err(|err| MappingError::hydrate(Self::ENTITY, err))
    }

    fn from_raw<T: Serialize + ?Sized>(raw: &T) -> Result<Self, MappingError> {
        Self::from_fields(transform(raw, Self::MAPPING)?)
    }
}

impl Transform for Post {
    const ENTITY: &'static str = "post";
    const MAPPING: MappingTable = POST_MAPPING;
}

impl Transform for User {
    const ENTITY: &'static str = "user";
    const MAPPING: MappingTable = USER_MAPPING;
}

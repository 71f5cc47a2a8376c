use super::{MappingError, Transform};
use crate::models::User;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Timestamp layout used by the upstream v1.1 API, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
const UPSTREAM_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Parse an upstream date string into an RFC 3339 UTC timestamp.
pub fn parse_date(input: &Value) -> Result<Option<Value>, MappingError> {
    let raw = match input {
        Value::Null => return Ok(None),
        Value::String(raw) => raw.trim(),
        _ => {
            return Err(MappingError::InvalidField {
                field: "created_at",
                expected: "string",
            });
        }
    };

    if raw.is_empty() {
        return Ok(None);
    }

    let parsed = DateTime::parse_from_str(raw, UPSTREAM_DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| dateparser::parse(raw))
        .map_err(|_| MappingError::InvalidDate(raw.to_string()))?;

    Ok(Some(Value::String(
        parsed.to_rfc3339_opts(SecondsFormat::AutoSi, false),
    )))
}

/// Map and hydrate a nested upstream user object through [`super::USER_MAPPING`].
pub fn parse_user(input: &Value) -> Result<Option<Value>, MappingError> {
    match input {
        Value::Null => Ok(None),
        Value::Object(map) if map.is_empty() => Ok(None),
        Value::Object(_) => {
            let user = User::from_raw(input)?;
            Ok(Some(serde_json::to_value(user).map_err(MappingError::Normalize)?))
        }
        _ => Err(MappingError::InvalidField {
            field: "user",
            expected: "object",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_date_handles_upstream_format() {
        let parsed = parse_date(&json!("Sat Mar 03 10:00:00 +0100 2018")).unwrap();
        assert_eq!(parsed, Some(json!("2018-03-03T09:00:00+00:00")));
    }

    #[test]
    fn parse_date_handles_rfc3339() {
        let parsed = parse_date(&json!("2020-01-02T03:04:05Z")).unwrap();
        assert_eq!(parsed, Some(json!("2020-01-02T03:04:05+00:00")));
    }

    #[test]
    fn parse_date_treats_null_and_blank_as_absent() {
        assert_eq!(parse_date(&Value::Null).unwrap(), None);
        assert_eq!(parse_date(&json!("   ")).unwrap(), None);
    }

    #[test]
    fn parse_date_rejects_garbage() {
        let err = parse_date(&json!("yesterday-ish")).unwrap_err();
        assert!(matches!(err, MappingError::InvalidDate(_)));
    }

    #[test]
    fn parse_user_ignores_empty_objects() {
        assert_eq!(parse_user(&json!({})).unwrap(), None);
    }

    #[test]
    fn parse_user_maps_known_fields() {
        let parsed = parse_user(&json!({ "id": 3, "followers_count": 10, "extra": true }))
            .unwrap()
            .unwrap();

        assert_eq!(parsed["id"], json!(3));
        assert_eq!(parsed["followers_count"], json!(10));
        assert!(parsed.get("extra").is_none());
    }

    #[test]
    fn parse_user_rejects_authors_without_id() {
        let err = parse_user(&json!({ "screen_name": "nobody" })).unwrap_err();
        assert!(matches!(err, MappingError::Hydrate { entity: "user", .. }));
    }
}

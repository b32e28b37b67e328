//! Maps raw HTTP exchanges onto decoded payloads or typed errors

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::transport::RawResponse;

/// Decode a 2xx response body into `T`, or map the status onto an [`Error`]
pub fn normalize<T: DeserializeOwned>(response: RawResponse) -> Result<T> {
    let response = check_status(response)?;
    decode(&response.body)
}

/// Decoding is all-or-nothing; a body that does not fit `T` yields no value at all
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(Error::Decode)
}

/// Passes 2xx responses through untouched and turns everything else into an error
pub fn check_status(response: RawResponse) -> Result<RawResponse> {
    if response.is_success() {
        return Ok(response);
    }
    Err(error_for_status(&response))
}

fn error_for_status(response: &RawResponse) -> Error {
    let status = response.status;
    let json_body = serde_json::from_slice::<Value>(&response.body)
        .ok()
        .and_then(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        });
    let message = error_message(json_body.as_ref(), &response.body);

    match status {
        401 | 403 => Error::Auth { status, message },
        404 => Error::NotFound { message },
        422 => Error::Validation {
            status,
            message,
            fields: json_body.as_ref().map(field_details).unwrap_or_default(),
        },
        400 if json_body.is_some() => Error::Validation {
            status,
            message,
            fields: json_body.as_ref().map(field_details).unwrap_or_default(),
        },
        429 => Error::RateLimited {
            retry_after: parse_retry_after(&response.headers),
            message,
        },
        500..=599 => Error::Server { status, message },
        _ => Error::Api {
            status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        },
    }
}

/// `detail` when the server sent one, the raw body otherwise
fn error_message(json_body: Option<&Map<String, Value>>, raw: &[u8]) -> String {
    match json_body.and_then(|m| m.get("detail")) {
        Some(Value::String(detail)) => detail.clone(),
        Some(other) => other.to_string(),
        None => String::from_utf8_lossy(raw).into_owned(),
    }
}

/// Every key except `detail`, with values flattened to lists of messages
fn field_details(body: &Map<String, Value>) -> BTreeMap<String, Vec<String>> {
    body.iter()
        .filter(|(key, _)| key.as_str() != "detail")
        .map(|(key, value)| {
            let messages = match value {
                Value::String(s) => vec![s.clone()],
                Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
                other => vec![other.to_string()],
            };
            (key.clone(), messages)
        })
        .collect()
}

/// `Retry-After` as delta-seconds or an HTTP-date; dates in the past mean "now"
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    let delta = at.signed_duration_since(Utc::now());
    Some(delta.to_std().unwrap_or(Duration::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use reqwest::header::HeaderValue;
    use serde::Deserialize;

    fn response(status: u16, body: &str) -> RawResponse {
        RawResponse::new(status, body.to_string())
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u64,
        name: String,
    }

    #[test]
    fn test_success_decodes() {
        let item: Item = normalize(response(200, r#"{"id": 1, "name": "a", "extra": true}"#)).unwrap();
        assert_eq!(
            item,
            Item {
                id: 1,
                name: "a".into()
            }
        );
    }

    #[test]
    fn test_malformed_success_body_is_decode_error() {
        let err = normalize::<Item>(response(200, r#"{"id": "one"}"#)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let err = normalize::<Item>(response(201, "<html>")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (401, ErrorKind::Auth),
            (403, ErrorKind::Auth),
            (404, ErrorKind::NotFound),
            (422, ErrorKind::Validation),
            (429, ErrorKind::RateLimited),
            (500, ErrorKind::Server),
            (503, ErrorKind::Server),
            (409, ErrorKind::Api),
            (302, ErrorKind::Api),
        ];
        for (status, kind) in cases {
            let err = normalize::<Item>(response(status, r#"{"detail": "nope"}"#)).unwrap_err();
            assert_eq!(err.kind(), kind, "status {}", status);
        }
    }

    #[test]
    fn test_validation_field_details() {
        let err = normalize::<Item>(response(
            422,
            r#"{"name": ["This field is required."], "queue": "Invalid hyperlink.", "detail": "Bad payload"}"#,
        ))
        .unwrap_err();

        match err {
            Error::Validation {
                status,
                message,
                fields,
            } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Bad payload");
                assert_eq!(fields["name"], vec!["This field is required."]);
                assert_eq!(fields["queue"], vec!["Invalid hyperlink."]);
                assert!(!fields.contains_key("detail"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_request_without_json_is_api_error() {
        let err = normalize::<Item>(response(400, "Bad Request")).unwrap_err();
        match err {
            Error::Api { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "Bad Request");
            }
            other => panic!("expected api error, got {:?}", other),
        }

        let err = normalize::<Item>(response(400, r#"{"url": ["Enter a valid URL."]}"#)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_rate_limited_carries_hint() {
        let mut raw = response(429, r#"{"detail": "Request was throttled."}"#);
        raw.headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));

        let err = normalize::<Item>(raw).unwrap_err();
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        assert_eq!(err.to_string(), "rate limited: Request was throttled.");
    }

    #[test]
    fn test_retry_after_http_date() {
        let mut headers = HeaderMap::new();
        let future = (Utc::now() + chrono::Duration::seconds(120)).to_rfc2822();
        headers.insert(RETRY_AFTER, HeaderValue::from_str(&future).unwrap());
        let delay = parse_retry_after(&headers).unwrap();
        assert!(delay > Duration::from_secs(100) && delay <= Duration::from_secs(120));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), Some(Duration::ZERO));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));
        assert_eq!(parse_retry_after(&headers), None);
    }
}

//! Typed resource facades.
//!
//! Each facade builds [`RequestSpec`](crate::executor::RequestSpec)s and
//! decodes the JSON returned by
//! [`RequestExecutor::execute`](crate::executor::RequestExecutor::execute). None of them
//! talk to the network directly.
//!
//! The service wraps payloads in an envelope. Single objects arrive under a
//! named key (`{"post": {...}}`) or under `data`; lists arrive under `data`,
//! under the plural key, or as a bare array.

mod agents;
mod comments;
mod communities;
mod feed;
mod posts;
mod search;

pub use agents::Agents;
pub use comments::Comments;
pub use communities::Communities;
pub use feed::Feed;
pub use posts::Posts;
pub use search::Search;

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::MoltgramError;
use crate::types::ActionResponse;

/// Percent-encode one caller-supplied path segment.
pub(crate) fn segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Decode a single object from `{key: T}`, `{data: T}` or a bare `T`.
pub(crate) fn decode_one<T: DeserializeOwned>(value: Value, key: &str) -> Result<T, MoltgramError> {
    let inner = match value {
        Value::Object(mut map) => match map.remove(key).or_else(|| map.remove("data")) {
            Some(inner) => inner,
            None => Value::Object(map),
        },
        other => other,
    };
    decode(inner, key)
}

/// Decode a list from a bare array, `{key: [...]}` or `{data: ...}`.
///
/// `null` and objects carrying neither key decode to an empty list.
pub(crate) fn decode_list<T: DeserializeOwned>(value: Value, key: &str) -> Result<Vec<T>, MoltgramError> {
    match value {
        Value::Array(_) => decode(value, key),
        Value::Object(mut map) => match map.remove(key).or_else(|| map.remove("data")) {
            Some(inner) => decode_list(inner, key),
            None => Ok(Vec::new()),
        },
        Value::Null => Ok(Vec::new()),
        other => Err(MoltgramError::invalid_response(
            200,
            format!("expected a list of {key}, got {other}"),
        )),
    }
}

/// Decode an acknowledgement; empty bodies become the default.
pub(crate) fn decode_action(value: Value) -> Result<ActionResponse, MoltgramError> {
    if value.is_null() {
        return Ok(ActionResponse::default());
    }
    decode(value, "action")
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, MoltgramError> {
    serde_json::from_value(value).map_err(|e| {
        MoltgramError::invalid_response(200, format!("failed to decode {what}: {e}"))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, CODE_INVALID_RESPONSE};
    use crate::types::Post;
    use serde_json::json;

    #[test]
    fn test_segment_encodes_reserved() {
        assert_eq!(segment("rust"), "rust");
        assert_eq!(segment("a/b c?"), "a%2Fb%20c%3F");
    }

    #[test]
    fn test_decode_one_envelopes() {
        let named: Post = decode_one(json!({"success": true, "post": {"id": "1"}}), "post").unwrap();
        let data: Post = decode_one(json!({"data": {"id": "2"}}), "post").unwrap();
        let bare: Post = decode_one(json!({"id": "3"}), "post").unwrap();
        assert_eq!(named.id, "1");
        assert_eq!(data.id, "2");
        assert_eq!(bare.id, "3");
    }

    #[test]
    fn test_decode_one_wrong_shape() {
        let err = decode_one::<Post>(json!({"post": {"title": "no id"}}), "post").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert_eq!(err.code(), Some(CODE_INVALID_RESPONSE));
    }

    #[test]
    fn test_decode_list_envelopes() {
        let bare: Vec<Post> = decode_list(json!([{"id": "1"}]), "posts").unwrap();
        let data: Vec<Post> = decode_list(json!({"data": [{"id": "1"}, {"id": "2"}]}), "posts").unwrap();
        let named: Vec<Post> = decode_list(json!({"posts": [{"id": "1"}]}), "posts").unwrap();
        let nested: Vec<Post> =
            decode_list(json!({"data": {"posts": [{"id": "1"}]}}), "posts").unwrap();
        assert_eq!(bare.len(), 1);
        assert_eq!(data.len(), 2);
        assert_eq!(named.len(), 1);
        assert_eq!(nested.len(), 1);
    }

    #[test]
    fn test_decode_list_empty_forms() {
        assert!(decode_list::<Post>(Value::Null, "posts").unwrap().is_empty());
        assert!(decode_list::<Post>(json!({"success": true}), "posts").unwrap().is_empty());
        assert!(decode_list::<Post>(json!("nope"), "posts").is_err());
    }

    #[test]
    fn test_decode_action() {
        assert_eq!(decode_action(Value::Null).unwrap(), ActionResponse::default());
        let action = decode_action(json!({"success": true, "message": "Upvoted"})).unwrap();
        assert_eq!(action.message.as_deref(), Some("Upvoted"));
    }
}

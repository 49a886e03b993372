// Response interpretation
//
// Turns a `RawResponse` into either an `Error::Http` (any status other
// than 200) or a payload of the shape the endpoint promised.

use bytes::Bytes;
use serde_json::Value;

use crate::error::Error;
use crate::transport::RawResponse;

const BODY_PREVIEW: usize = 200;

/// How a 200 body is to be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// UTF-8 JSON document.
    Json,
    /// UTF-8 text returned as-is (confirmation messages).
    Text,
    /// Opaque bytes, never decoded (archives).
    Binary,
}

/// A decoded 200 body, tagged with its shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
    Binary(Bytes),
}

impl Payload {
    pub fn kind(&self) -> ResponseKind {
        match self {
            Self::Json(_) => ResponseKind::Json,
            Self::Text(_) => ResponseKind::Text,
            Self::Binary(_) => ResponseKind::Binary,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_binary(self) -> Option<Bytes> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }
}

/// Decode `raw` according to `kind`.
pub fn interpret(raw: RawResponse, kind: ResponseKind) -> Result<Payload, Error> {
    match kind {
        ResponseKind::Json => interpret_json(raw).map(Payload::Json),
        ResponseKind::Text => interpret_text(raw).map(Payload::Text),
        ResponseKind::Binary => interpret_binary(raw).map(Payload::Binary),
    }
}

/// Parse a 200 body as JSON. An empty body decodes to `null`.
pub fn interpret_json(raw: RawResponse) -> Result<Value, Error> {
    let body = ensure_ok(raw)?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&body).map_err(|e| {
        let text = String::from_utf8_lossy(&body).into_owned();
        let preview: String = text.chars().take(BODY_PREVIEW).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: text,
        }
    })
}

/// Return a 200 body as UTF-8 text, unchanged.
pub fn interpret_text(raw: RawResponse) -> Result<String, Error> {
    let body = ensure_ok(raw)?;
    String::from_utf8(body.to_vec()).map_err(|e| Error::Deserialization {
        message: format!("response is not valid UTF-8: {e}"),
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Return a 200 body as raw bytes.
pub fn interpret_binary(raw: RawResponse) -> Result<Bytes, Error> {
    ensure_ok(raw)
}

fn ensure_ok(raw: RawResponse) -> Result<Bytes, Error> {
    if raw.status == 200 {
        return Ok(raw.body);
    }
    Err(Error::Http {
        status: raw.status,
        body: String::from_utf8_lossy(&raw.body).into_owned(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    const ALL_KINDS: [ResponseKind; 3] = [ResponseKind::Json, ResponseKind::Text, ResponseKind::Binary];

    #[test]
    fn non_200_is_http_error_for_every_kind() {
        for status in [201, 204, 301, 400, 401, 404, 500, 503] {
            for kind in ALL_KINDS {
                let raw = RawResponse::new(status, "return_text");
                match interpret(raw, kind) {
                    Err(Error::Http { status: got, body }) => {
                        assert_eq!(got, status);
                        assert_eq!(body, "return_text");
                    }
                    other => panic!("expected Http error for {status}/{kind:?}, got {other:?}"),
                }
            }
        }
    }

    #[test]
    fn json_body_is_parsed() {
        let raw = RawResponse::new(200, r#"{"test": "val"}"#);
        assert_eq!(interpret_json(raw).unwrap(), json!({"test": "val"}));
    }

    #[test]
    fn empty_json_body_is_null() {
        assert_eq!(interpret_json(RawResponse::new(200, "")).unwrap(), Value::Null);
        assert_eq!(interpret_json(RawResponse::new(200, " \n")).unwrap(), Value::Null);
    }

    #[test]
    fn malformed_json_is_deserialization_error() {
        let err = interpret_json(RawResponse::new(200, "profile added")).unwrap_err();
        match err {
            Error::Deserialization { body, .. } => assert_eq!(body, "profile added"),
            other => panic!("expected Deserialization, got {other:?}"),
        }
    }

    #[test]
    fn text_is_returned_verbatim() {
        let raw = RawResponse::new(200, "text_only\n");
        assert_eq!(interpret_text(raw).unwrap(), "text_only\n");
    }

    #[test]
    fn invalid_utf8_text_is_rejected() {
        let raw = RawResponse::new(200, vec![0x1f, 0x8b, 0xff, 0xfe]);
        assert!(matches!(
            interpret_text(raw),
            Err(Error::Deserialization { .. })
        ));
    }

    #[test]
    fn binary_keeps_gzip_bytes_intact() {
        let archive = vec![0x1f, 0x8b, 0x08, 0x00, 0xff, 0xfe, 0x00];
        let payload = interpret(RawResponse::new(200, archive.clone()), ResponseKind::Binary).unwrap();
        assert_eq!(payload.kind(), ResponseKind::Binary);
        assert_eq!(payload.into_binary().unwrap().to_vec(), archive);
    }
}

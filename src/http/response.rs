//! HTTP response building module
//!
//! Provides the JSON response builder used by every endpoint and the default
//! not-found response for unregistered paths.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::logger;

pub const JSON_CONTENT_TYPE: &str = "application/json";

const NOT_FOUND_BODY: &str = "404 page not found\n";

/// Encode a value as JSON followed by a single newline
///
/// Deterministic: the same value always encodes to the same bytes.
pub fn encode_json<T: Serialize>(body: &T) -> serde_json::Result<Bytes> {
    let mut buf = Vec::with_capacity(128);
    serde_json::to_writer(&mut buf, body)?;
    buf.push(b'\n');
    Ok(Bytes::from(buf))
}

/// Build a JSON response with the given status
///
/// Status and content type are settled before encoding. An encoding failure is
/// logged and leaves the status untouched, with an empty body.
pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let builder = Response::builder()
        .status(status)
        .header("Content-Type", JSON_CONTENT_TYPE);

    let data = encode_json(body).unwrap_or_else(|e| {
        logger::log_error(&format!("Error encoding response: {e}"));
        Bytes::new()
    });
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    builder
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response
pub fn build_404_response(is_head: bool) -> Response<Full<Bytes>> {
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from_static(NOT_FOUND_BODY.as_bytes())
    };

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("X-Content-Type-Options", "nosniff")
        .header("Content-Length", NOT_FOUND_BODY.len())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from_static(NOT_FOUND_BODY.as_bytes())))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model;
    use http_body_util::BodyExt;
    use serde::ser::Error as _;

    /// Serializer input that always fails
    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("broken pipe"))
        }
    }

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[test]
    fn test_encode_is_deterministic() {
        let value = model::Response::new("Hello, Cat! 🐱", "success");
        let first = encode_json(&value).unwrap();
        let second = encode_json(&value).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first,
            Bytes::from("{\"message\":\"Hello, Cat! 🐱\",\"status\":\"success\"}\n")
        );
    }

    #[tokio::test]
    async fn test_json_response_headers() {
        let value = model::Response::new("Service is healthy", "ok");
        let resp = json_response(StatusCode::OK, &value, false);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], JSON_CONTENT_TYPE);

        let body = body_bytes(resp).await;
        let decoded: model::Response = serde_json::from_slice(&body).unwrap();
        assert_eq!(decoded, value);
    }

    #[tokio::test]
    async fn test_encode_failure_keeps_status() {
        let resp = json_response(StatusCode::OK, &Unencodable, false);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], JSON_CONTENT_TYPE);
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_head_has_length_but_no_body() {
        let value = model::Response::new("Hello, World!", "success");
        let expected_len = encode_json(&value).unwrap().len();
        let resp = json_response(StatusCode::OK, &value, true);
        assert_eq!(
            resp.headers()["content-length"],
            expected_len.to_string().as_str()
        );
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_404_response() {
        let resp = build_404_response(false);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()["content-type"], "text/plain; charset=utf-8");
        assert_eq!(body_bytes(resp).await, Bytes::from(NOT_FOUND_BODY));
    }
}

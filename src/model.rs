//! Response body model
//!
//! Every registered endpoint answers with the same two-field JSON object.

use serde::{Deserialize, Serialize};

/// JSON body returned by every registered endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Response {
    pub message: String,
    pub status: String,
}

impl Response {
    pub fn new(message: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: status.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_verbatim() {
        let json = serde_json::to_string(&Response::new("Hello, World!", "success")).unwrap();
        assert_eq!(json, r#"{"message":"Hello, World!","status":"success"}"#);
    }

    #[test]
    fn test_extra_fields_rejected() {
        let parsed: Result<Response, _> =
            serde_json::from_str(r#"{"message":"m","status":"ok","extra":1}"#);
        assert!(parsed.is_err());
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorResponse;
use crate::types::{RequestId, Version};

/// A successful JSON-RPC response envelope.
///
/// Success responses always carry the id of the request they answer;
/// uncorrelated failures are [`ErrorResponse`]s with a `null` id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "jsonrpc")]
    pub version: Version,
    pub id: RequestId,
    pub result: Value,
}

impl Response {
    pub fn new(id: RequestId, result: Value) -> Self {
        Self {
            version: Version::V2,
            id,
            result,
        }
    }
}

/// Either a success or an error response; `result` and `error` are mutually
/// exclusive on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseMessage {
    Success(Response),
    Error(ErrorResponse),
}

impl ResponseMessage {
    pub fn success(id: RequestId, result: Value) -> Self {
        ResponseMessage::Success(Response::new(id, result))
    }

    pub fn error(error: ErrorResponse) -> Self {
        ResponseMessage::Error(error)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResponseMessage::Error(_))
    }

    pub fn id(&self) -> Option<&RequestId> {
        match self {
            ResponseMessage::Success(response) => Some(&response.id),
            ResponseMessage::Error(error) => error.id.as_ref(),
        }
    }
}

impl From<Response> for ResponseMessage {
    fn from(response: Response) -> Self {
        ResponseMessage::Success(response)
    }
}

impl From<ErrorResponse> for ResponseMessage {
    fn from(error: ErrorResponse) -> Self {
        ResponseMessage::Error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorObject;
    use serde_json::json;

    #[test]
    fn test_success_serialization() {
        let response = Response::new(RequestId::Number(1), json!("hi"));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({"jsonrpc": "2.0", "id": 1, "result": "hi"}));
    }

    #[test]
    fn test_message_exclusivity() {
        let ok = ResponseMessage::success(RequestId::Number(1), json!(true));
        let err = ResponseMessage::error(ErrorResponse::new(
            Some(RequestId::Number(2)),
            ErrorObject::method_not_found("x"),
        ));

        let ok_json = serde_json::to_value(&ok).unwrap();
        let err_json = serde_json::to_value(&err).unwrap();
        assert!(ok_json.get("result").is_some() && ok_json.get("error").is_none());
        assert!(err_json.get("error").is_some() && err_json.get("result").is_none());
    }

    #[test]
    fn test_message_id() {
        let ok = ResponseMessage::success(RequestId::from("a"), json!(null));
        assert_eq!(ok.id(), Some(&RequestId::from("a")));
        assert!(!ok.is_error());

        let err = ResponseMessage::error(ErrorResponse::parse_error());
        assert_eq!(err.id(), None);
        assert!(err.is_error());
    }
}

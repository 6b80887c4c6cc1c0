use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

/// Extracts the request payload from an API Gateway proxy event.
///
/// Events without a `body` field are treated as direct invocations and
/// returned unchanged.
pub fn normalize_apigw_event(event: Value) -> Result<Value, String> {
    let Some(object) = event.as_object() else {
        return Err("Request payload must be a JSON object".to_string());
    };

    let Some(body) = object.get("body") else {
        return Ok(event);
    };

    match body {
        Value::Null => Ok(json!({})),
        Value::Object(_) => Ok(body.clone()),
        Value::String(text) => {
            serde_json::from_str(text).map_err(|error| format!("Malformed JSON body: {error}"))
        }
        _ => Err("Request body must be a JSON object".to_string()),
    }
}

pub fn validation_error_response(message: &str) -> ApiGatewayResponse {
    error_response(
        400,
        json!({
            "error": "validation_error",
            "message": message,
        }),
    )
}

pub fn success_response(status_code: u16, payload: impl Serialize) -> ApiGatewayResponse {
    match serde_json::to_string(&payload) {
        Ok(body) => ApiGatewayResponse {
            status_code,
            headers: json!({"Content-Type": "application/json"}),
            body,
        },
        Err(error) => error_response(
            500,
            json!({
                "error": "serialization_error",
                "message": error.to_string(),
            }),
        ),
    }
}

pub fn error_response(status_code: u16, payload: Value) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: payload.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_string_body() {
        let payload = normalize_apigw_event(json!({"body": "{\"project\":\"p\"}"}))
            .expect("body should decode");
        assert_eq!(payload, json!({"project": "p"}));
    }

    #[test]
    fn passes_direct_invocation_through() {
        let event = json!({"total_coverage": 1, "project": "p", "branch": "b"});
        let payload = normalize_apigw_event(event.clone()).expect("event should pass");
        assert_eq!(payload, event);
    }

    #[test]
    fn null_body_becomes_empty_object() {
        let payload = normalize_apigw_event(json!({"body": null})).expect("event should pass");
        assert_eq!(payload, json!({}));
    }

    #[test]
    fn rejects_malformed_json_body() {
        let error = normalize_apigw_event(json!({"body": "{not json"}))
            .expect_err("malformed body should fail");
        assert!(error.starts_with("Malformed JSON body"));
    }

    #[test]
    fn rejects_non_object_event() {
        assert!(normalize_apigw_event(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn responses_carry_json_content_type() {
        let response = validation_error_response("bad input");
        assert_eq!(response.status_code, 400);
        assert_eq!(response.headers, json!({"Content-Type": "application/json"}));
        let body: Value = serde_json::from_str(&response.body).expect("body should be json");
        assert_eq!(body["message"], "bad input");
    }
}

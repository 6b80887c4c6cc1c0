//! Handler behind the rate-limited badge manager API.
//!
//! The REST API proxies every path to this function, so routing happens on
//! the HTTP method: `POST` uploads a badge, `GET` looks one up and `DELETE`
//! removes it. Lookups and deletes address the badge either by query string
//! (`?project=..&branch=..`) or by path (`/{project}/{branch}`).

use badge_core::contract::BadgeLocation;
use badge_core::storage_keys::{badge_object_key, public_badge_url};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::adapters::object_store::BadgeStore;
use crate::config::HandlerConfig;
use crate::handlers::api_gateway::{
    error_response, normalize_apigw_event, success_response, validation_error_response,
    ApiGatewayResponse,
};
use crate::handlers::uploader::upload_badge;

#[derive(Debug, Clone, PartialEq, Eq)]
struct BadgeTarget {
    project: String,
    branch: String,
}

pub fn handle_manager_event(
    event: Value,
    config: &HandlerConfig,
    store: &dyn BadgeStore,
) -> ApiGatewayResponse {
    let method = event
        .get("httpMethod")
        .and_then(Value::as_str)
        .unwrap_or("POST")
        .to_ascii_uppercase();

    match method.as_str() {
        "POST" | "PUT" => match normalize_apigw_event(event) {
            Ok(payload) => upload_badge(payload, config, store),
            Err(message) => validation_error_response(&message),
        },
        "GET" => match badge_target(&event) {
            Ok(target) => lookup_badge(&target, config, store),
            Err(message) => validation_error_response(&message),
        },
        "DELETE" => match badge_target(&event) {
            Ok(target) => delete_badge(&target, store),
            Err(message) => validation_error_response(&message),
        },
        other => error_response(
            405,
            json!({
                "error": "method_not_allowed",
                "message": format!("{other} is not supported"),
            }),
        ),
    }
}

fn lookup_badge(
    target: &BadgeTarget,
    config: &HandlerConfig,
    store: &dyn BadgeStore,
) -> ApiGatewayResponse {
    let key = badge_object_key(&target.project, &target.branch);
    match store.object_exists(&key) {
        Ok(true) => success_response(
            200,
            BadgeLocation {
                url: public_badge_url(&config.bucket, &key),
            },
        ),
        Ok(false) => error_response(
            404,
            json!({
                "error": "not_found",
                "message": format!("no badge stored at {key}"),
            }),
        ),
        Err(error) => storage_error(&key, error),
    }
}

fn delete_badge(target: &BadgeTarget, store: &dyn BadgeStore) -> ApiGatewayResponse {
    let key = badge_object_key(&target.project, &target.branch);
    match store.delete_object(&key) {
        Ok(()) => {
            info!(key = %key, "badge deleted");
            success_response(200, json!({ "deleted": key }))
        }
        Err(error) => storage_error(&key, error),
    }
}

fn storage_error(key: &str, error: String) -> ApiGatewayResponse {
    warn!(key = %key, error = %error, "badge storage call failed");
    error_response(
        502,
        json!({
            "error": "storage_error",
            "message": error,
            "key": key,
        }),
    )
}

fn badge_target(event: &Value) -> Result<BadgeTarget, String> {
    let query = event.get("queryStringParameters");
    let from_query = |name: &str| {
        query
            .and_then(|params| params.get(name))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    if let (Some(project), Some(branch)) = (from_query("project"), from_query("branch")) {
        return Ok(BadgeTarget { project, branch });
    }

    let path = event
        .get("pathParameters")
        .and_then(|params| params.get("proxy"))
        .and_then(Value::as_str)
        .or_else(|| event.get("path").and_then(Value::as_str))
        .unwrap_or_default();

    parse_badge_path(path)
}

/// Splits `/{project}/{branch}[.svg]`; everything after the first segment
/// is the branch, so `api/feature/login` is branch `feature/login`.
fn parse_badge_path(path: &str) -> Result<BadgeTarget, String> {
    let trimmed = path.trim_matches('/');
    let trimmed = trimmed.strip_suffix(".svg").unwrap_or(trimmed);

    match trimmed.split_once('/') {
        Some((project, branch)) if !project.is_empty() && !branch.trim_matches('/').is_empty() => {
            Ok(BadgeTarget {
                project: project.to_string(),
                branch: branch.trim_matches('/').to_string(),
            })
        }
        _ => Err("project and branch are required".to_string()),
    }
}

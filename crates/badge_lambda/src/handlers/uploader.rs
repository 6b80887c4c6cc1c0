use badge_core::contract::{normalize_report, BadgeLocation, CoverageReport};
use badge_core::render::coverage_badge;
use badge_core::storage_keys::{badge_object_key, public_badge_url, BADGE_CONTENT_TYPE};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::adapters::object_store::BadgeStore;
use crate::config::HandlerConfig;
use crate::handlers::api_gateway::{
    error_response, normalize_apigw_event, success_response, validation_error_response,
    ApiGatewayResponse,
};

pub fn handle_upload_event(
    event: Value,
    config: &HandlerConfig,
    store: &dyn BadgeStore,
) -> ApiGatewayResponse {
    let payload = match normalize_apigw_event(event) {
        Ok(value) => value,
        Err(message) => return validation_error_response(&message),
    };

    upload_badge(payload, config, store)
}

/// Renders and stores the badge for a decoded request payload.
///
/// The write is a single attempt; a storage failure is reported as a 502
/// and the previous badge (if any) stays in place.
pub fn upload_badge(
    payload: Value,
    config: &HandlerConfig,
    store: &dyn BadgeStore,
) -> ApiGatewayResponse {
    let report = match serde_json::from_value::<CoverageReport>(payload) {
        Ok(value) => value,
        Err(error) => return validation_error_response(&format!("Malformed request: {error}")),
    };

    let report = match normalize_report(report) {
        Ok(value) => value,
        Err(error) => return validation_error_response(error.message()),
    };

    let key = badge_object_key(&report.project, &report.branch);
    let svg = coverage_badge(report.total_coverage);

    if let Err(error) = store.write_object(&key, svg.as_bytes(), BADGE_CONTENT_TYPE) {
        warn!(key = %key, error = %error, "badge upload failed");
        return error_response(
            502,
            json!({
                "error": "storage_error",
                "message": error,
                "key": key,
            }),
        );
    }

    info!(
        project = %report.project,
        branch = %report.branch,
        total_coverage = report.total_coverage,
        key = %key,
        "badge uploaded"
    );

    success_response(
        200,
        BadgeLocation {
            url: public_badge_url(&config.bucket, &key),
        },
    )
}

#[cfg(test)]
mod tests {
    use badge_core::color::BadgeColor;

    use super::*;
    use crate::handlers::test_support::MemoryBadgeStore;

    fn config() -> HandlerConfig {
        HandlerConfig {
            bucket: "badge-uploader-test".to_string(),
            region: Some("eu-west-1".to_string()),
        }
    }

    fn body(response: &ApiGatewayResponse) -> Value {
        serde_json::from_str(&response.body).expect("response body should be json")
    }

    #[test]
    fn uploads_badge_and_returns_public_url() {
        let store = MemoryBadgeStore::new();
        let event = json!({
            "body": json!({
                "total_coverage": 1,
                "branch": "branch",
                "project": "project"
            })
            .to_string()
        });

        let response = handle_upload_event(event, &config(), &store);

        assert_eq!(response.status_code, 200);
        assert_eq!(response.headers, json!({"Content-Type": "application/json"}));
        assert_eq!(
            body(&response),
            json!({"url": "https://s3.amazonaws.com/badge-uploader-test/project/branch.svg"})
        );
        let svg = store
            .object("project/branch.svg")
            .expect("badge should be stored");
        assert!(svg.contains(">1%</text>"));
        assert!(svg.contains(BadgeColor::Red.hex()));
    }

    #[test]
    fn repeated_uploads_overwrite_the_same_key() {
        let store = MemoryBadgeStore::new();
        for coverage in [35, 92] {
            let event = json!({
                "body": {"total_coverage": coverage, "project": "project", "branch": "main"}
            });
            let response = handle_upload_event(event, &config(), &store);
            assert_eq!(response.status_code, 200);
        }

        assert_eq!(store.keys(), vec!["project/main.svg".to_string()]);
        assert_eq!(store.writes().len(), 2);
        let svg = store.object("project/main.svg").expect("badge should be stored");
        assert!(svg.contains(">92%</text>"));
        assert!(svg.contains(BadgeColor::Green.hex()));
    }

    #[test]
    fn missing_field_is_rejected_without_writing() {
        let store = MemoryBadgeStore::new();
        let event = json!({"body": "{\"total_coverage\": 50, \"project\": \"project\"}"});

        let response = handle_upload_event(event, &config(), &store);

        assert_eq!(response.status_code, 400);
        assert_eq!(body(&response)["error"], "validation_error");
        assert!(store.writes().is_empty());
    }

    #[test]
    fn out_of_range_coverage_is_rejected() {
        let store = MemoryBadgeStore::new();
        let event = json!({"total_coverage": 140, "project": "project", "branch": "main"});

        let response = handle_upload_event(event, &config(), &store);

        assert_eq!(response.status_code, 400);
        assert!(store.writes().is_empty());
    }

    #[test]
    fn storage_failure_maps_to_bad_gateway() {
        let store = MemoryBadgeStore::failing();
        let event = json!({"total_coverage": 75.5, "project": "project", "branch": "main"});

        let response = handle_upload_event(event, &config(), &store);

        assert_eq!(response.status_code, 502);
        let payload = body(&response);
        assert_eq!(payload["error"], "storage_error");
        assert_eq!(payload["key"], "project/main.svg");
    }
}

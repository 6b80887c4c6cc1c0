use badge_core::environment::{MANAGER_BUCKET_VAR, REGION_VAR, UPLOADER_BUCKET_VAR};
use badge_core::storage_keys::PUBLIC_S3_ENDPOINT;
use serde_json::{json, Map};

use crate::constructs::{
    api_key_with_usage_plan, code_bucket_parameter, code_key_parameter, function,
    grant_read_write, lambda_rest_api, public_read_bucket, ThrottleSettings,
};
use crate::template::{attribute, reference, Parameter, Stack};

pub const BADGE_MANAGER_STACK: &str = "badge-manager";
pub const BADGE_UPLOADER_STACK: &str = "badge-uploader";
pub const BADGE_MANAGER_API_NAME: &str = "BadgeManagerApi";
pub const API_STAGE: &str = "prod";
pub const BADGE_OBJECTS_PATTERN: &str = "*.svg";

pub const API_THROTTLE: ThrottleSettings = ThrottleSettings {
    burst_limit: 2,
    rate_limit: 10,
};

const BUCKET_ID: &str = "Bucket";
const HANDLER_ID: &str = "Handler";
const API_ID: &str = "Api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSettings {
    pub runtime: String,
    pub handler: String,
    pub architecture: String,
    pub memory_size_mb: u32,
    pub timeout_seconds: u32,
    /// Async invocation retries; zero means a failed upload is not replayed.
    pub retry_attempts: u32,
    /// Default object key of the packaged function code.
    pub code_key: String,
}

impl FunctionSettings {
    pub fn rust_function(code_key: impl Into<String>) -> Self {
        Self {
            runtime: "provided.al2023".to_string(),
            handler: "bootstrap".to_string(),
            architecture: "x86_64".to_string(),
            memory_size_mb: 1024,
            timeout_seconds: 60,
            retry_attempts: 0,
            code_key: code_key.into(),
        }
    }
}

pub fn badge_manager_stack(settings: &FunctionSettings) -> Stack {
    let mut stack = Stack::new(
        BADGE_MANAGER_STACK,
        "Badge manager: public badge bucket behind a rate-limited REST API",
    );
    add_function_with_bucket(&mut stack, settings, MANAGER_BUCKET_VAR);

    for resource in lambda_rest_api(API_ID, BADGE_MANAGER_API_NAME, HANDLER_ID, API_STAGE) {
        stack.add(resource);
    }
    for resource in api_key_with_usage_plan(API_ID, API_THROTTLE) {
        stack.add(resource);
    }

    stack.add_output(
        "ApiEndpoint",
        json!({
            "Fn::Sub": format!(
                "https://${{{API_ID}}}.execute-api.${{AWS::Region}}.${{AWS::URLSuffix}}/{API_STAGE}/"
            )
        }),
    );
    stack.add_output("ApiKeyId", reference(&format!("{API_ID}Key")));
    stack
}

pub fn badge_uploader_stack(settings: &FunctionSettings) -> Stack {
    let mut stack = Stack::new(
        BADGE_UPLOADER_STACK,
        "Badge uploader: renders coverage badges into a public bucket",
    );
    add_function_with_bucket(&mut stack, settings, UPLOADER_BUCKET_VAR);
    stack.add_output("HandlerArn", attribute(HANDLER_ID, "Arn"));
    stack
}

fn add_function_with_bucket(stack: &mut Stack, settings: &FunctionSettings, bucket_var: &str) {
    for resource in public_read_bucket(BUCKET_ID) {
        stack.add(resource);
    }

    stack.add_parameter(
        code_bucket_parameter(HANDLER_ID),
        Parameter {
            parameter_type: "String".to_string(),
            description: "Bucket holding the packaged handler code".to_string(),
            default: None,
        },
    );
    stack.add_parameter(
        code_key_parameter(HANDLER_ID),
        Parameter {
            parameter_type: "String".to_string(),
            description: "Object key of the packaged handler code".to_string(),
            default: Some(settings.code_key.clone()),
        },
    );

    let mut environment = Map::new();
    environment.insert(bucket_var.to_string(), reference(BUCKET_ID));
    environment.insert(REGION_VAR.to_string(), reference("AWS::Region"));
    // The handler must not start before it can reach the bucket.
    let grant = grant_read_write(HANDLER_ID, BUCKET_ID, BADGE_OBJECTS_PATTERN);
    for resource in function(HANDLER_ID, settings, environment) {
        if resource.logical_id == HANDLER_ID {
            stack.add(resource.depends_on(grant.logical_id.clone()));
        } else {
            stack.add(resource);
        }
    }
    stack.add(grant);

    stack.add_output("BucketName", reference(BUCKET_ID));
    stack.add_output(
        "BadgeBaseUrl",
        json!({
            "Fn::Sub": format!("{PUBLIC_S3_ENDPOINT}/${{{BUCKET_ID}}}")
        }),
    );
}

//! Resource builders mirroring the higher-level constructs the stacks use.

use serde_json::{json, Map, Value};

use crate::stacks::FunctionSettings;
use crate::template::{attribute, reference, Resource};

pub const LAMBDA_BASIC_EXECUTION_POLICY: &str =
    "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";

/// Bucket plus the policy that makes every object publicly readable.
pub fn public_read_bucket(logical_id: &str) -> Vec<Resource> {
    let bucket = Resource::new(
        logical_id,
        "AWS::S3::Bucket",
        json!({
            "PublicAccessBlockConfiguration": {
                "BlockPublicAcls": true,
                "IgnorePublicAcls": true,
                "BlockPublicPolicy": false,
                "RestrictPublicBuckets": false
            }
        }),
    );

    let policy = Resource::new(
        format!("{logical_id}Policy"),
        "AWS::S3::BucketPolicy",
        json!({
            "Bucket": reference(logical_id),
            "PolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": {"AWS": "*"},
                    "Action": "s3:GetObject",
                    "Resource": {"Fn::Join": ["", [attribute(logical_id, "Arn"), "/*"]]}
                }]
            }
        }),
    );

    vec![bucket, policy]
}

/// Execution role, function and async invoke config for a handler.
pub fn function(
    logical_id: &str,
    settings: &FunctionSettings,
    environment: Map<String, Value>,
) -> Vec<Resource> {
    let role_id = format!("{logical_id}ServiceRole");

    let role = Resource::new(
        role_id.clone(),
        "AWS::IAM::Role",
        json!({
            "AssumeRolePolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": {"Service": "lambda.amazonaws.com"},
                    "Action": "sts:AssumeRole"
                }]
            },
            "ManagedPolicyArns": [LAMBDA_BASIC_EXECUTION_POLICY]
        }),
    );

    let function = Resource::new(
        logical_id,
        "AWS::Lambda::Function",
        json!({
            "Code": {
                "S3Bucket": reference(&code_bucket_parameter(logical_id)),
                "S3Key": reference(&code_key_parameter(logical_id))
            },
            "Handler": settings.handler,
            "Runtime": settings.runtime,
            "Architectures": [settings.architecture],
            "MemorySize": settings.memory_size_mb,
            "Timeout": settings.timeout_seconds,
            "Role": attribute(&role_id, "Arn"),
            "Environment": {"Variables": Value::Object(environment)}
        }),
    )
    .depends_on(role_id);

    let invoke_config = Resource::new(
        format!("{logical_id}EventInvokeConfig"),
        "AWS::Lambda::EventInvokeConfig",
        json!({
            "FunctionName": reference(logical_id),
            "Qualifier": "$LATEST",
            "MaximumRetryAttempts": settings.retry_attempts
        }),
    );

    vec![role, function, invoke_config]
}

pub fn code_bucket_parameter(function_id: &str) -> String {
    format!("{function_id}CodeS3Bucket")
}

pub fn code_key_parameter(function_id: &str) -> String {
    format!("{function_id}CodeS3Key")
}

/// Read/write access for a function role on the bucket objects matching
/// `objects_key_pattern`.
pub fn grant_read_write(
    function_id: &str,
    bucket_id: &str,
    objects_key_pattern: &str,
) -> Resource {
    let role_id = format!("{function_id}ServiceRole");
    Resource::new(
        format!("{role_id}DefaultPolicy"),
        "AWS::IAM::Policy",
        json!({
            "PolicyName": format!("{role_id}DefaultPolicy"),
            "Roles": [reference(&role_id)],
            "PolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Action": [
                        "s3:GetObject*",
                        "s3:GetBucket*",
                        "s3:List*",
                        "s3:DeleteObject*",
                        "s3:PutObject",
                        "s3:Abort*"
                    ],
                    "Resource": [
                        attribute(bucket_id, "Arn"),
                        {"Fn::Join": [
                            "",
                            [attribute(bucket_id, "Arn"), format!("/{objects_key_pattern}")]
                        ]}
                    ]
                }]
            }
        }),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleSettings {
    pub burst_limit: u32,
    pub rate_limit: u32,
}

/// REST API that proxies every path and method to `function_id`, with an
/// API key required on each method.
pub fn lambda_rest_api(
    api_id: &str,
    api_name: &str,
    function_id: &str,
    stage: &str,
) -> Vec<Resource> {
    let integration = json!({
        "Type": "AWS_PROXY",
        "IntegrationHttpMethod": "POST",
        "Uri": {
            "Fn::Sub": format!(
                "arn:${{AWS::Partition}}:apigateway:${{AWS::Region}}:lambda:path/2015-03-31/functions/${{{function_id}.Arn}}/invocations"
            )
        }
    });
    let proxy_id = format!("{api_id}Proxy");
    let root_method_id = format!("{api_id}RootAnyMethod");
    let proxy_method_id = format!("{api_id}ProxyAnyMethod");
    let deployment_id = format!("{api_id}Deployment");

    vec![
        Resource::new(api_id, "AWS::ApiGateway::RestApi", json!({ "Name": api_name })),
        Resource::new(
            proxy_id.clone(),
            "AWS::ApiGateway::Resource",
            json!({
                "RestApiId": reference(api_id),
                "ParentId": attribute(api_id, "RootResourceId"),
                "PathPart": "{proxy+}"
            }),
        ),
        Resource::new(
            root_method_id.clone(),
            "AWS::ApiGateway::Method",
            json!({
                "RestApiId": reference(api_id),
                "ResourceId": attribute(api_id, "RootResourceId"),
                "HttpMethod": "ANY",
                "AuthorizationType": "NONE",
                "ApiKeyRequired": true,
                "Integration": integration.clone()
            }),
        ),
        Resource::new(
            proxy_method_id.clone(),
            "AWS::ApiGateway::Method",
            json!({
                "RestApiId": reference(api_id),
                "ResourceId": reference(&proxy_id),
                "HttpMethod": "ANY",
                "AuthorizationType": "NONE",
                "ApiKeyRequired": true,
                "Integration": integration
            }),
        ),
        Resource::new(
            deployment_id.clone(),
            "AWS::ApiGateway::Deployment",
            json!({ "RestApiId": reference(api_id) }),
        )
        .depends_on(root_method_id)
        .depends_on(proxy_method_id),
        Resource::new(
            format!("{api_id}Stage"),
            "AWS::ApiGateway::Stage",
            json!({
                "RestApiId": reference(api_id),
                "DeploymentId": reference(&deployment_id),
                "StageName": stage
            }),
        ),
        Resource::new(
            format!("{api_id}InvokePermission"),
            "AWS::Lambda::Permission",
            json!({
                "Action": "lambda:InvokeFunction",
                "FunctionName": attribute(function_id, "Arn"),
                "Principal": "apigateway.amazonaws.com",
                "SourceArn": {
                    "Fn::Sub": format!(
                        "arn:${{AWS::Partition}}:execute-api:${{AWS::Region}}:${{AWS::AccountId}}:${{{api_id}}}/*/*"
                    )
                }
            }),
        ),
    ]
}

/// API key plus a usage plan binding it to the API stage with a throttle.
pub fn api_key_with_usage_plan(api_id: &str, throttle: ThrottleSettings) -> Vec<Resource> {
    let key_id = format!("{api_id}Key");
    let plan_id = format!("{api_id}UsagePlan");
    let stage_id = format!("{api_id}Stage");

    vec![
        Resource::new(
            key_id.clone(),
            "AWS::ApiGateway::ApiKey",
            json!({ "Enabled": true }),
        )
        .depends_on(stage_id.clone()),
        Resource::new(
            plan_id.clone(),
            "AWS::ApiGateway::UsagePlan",
            json!({
                "ApiStages": [{
                    "ApiId": reference(api_id),
                    "Stage": reference(&stage_id)
                }],
                "Throttle": {
                    "BurstLimit": throttle.burst_limit,
                    "RateLimit": throttle.rate_limit
                }
            }),
        ),
        Resource::new(
            format!("{plan_id}Key"),
            "AWS::ApiGateway::UsagePlanKey",
            json!({
                "KeyId": reference(&key_id),
                "KeyType": "API_KEY",
                "UsagePlanId": reference(&plan_id)
            }),
        ),
    ]
}

use badge_lambda::adapters::s3_store::S3BadgeStore;
use badge_lambda::config::{HandlerConfig, UPLOADER_BUCKET_VAR};
use badge_lambda::handlers::uploader::handle_upload_event;
use badge_lambda::handlers::ApiGatewayResponse;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

async fn handle_request(
    event: LambdaEvent<Value>,
    config: &HandlerConfig,
    store: &S3BadgeStore,
) -> Result<ApiGatewayResponse, Error> {
    Ok(handle_upload_event(event.payload, config, store))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();

    let config = HandlerConfig::from_env(UPLOADER_BUCKET_VAR).map_err(Error::from)?;
    let store = S3BadgeStore::from_config(&config).await;
    tracing::info!(bucket = %config.bucket, "badge uploader ready");

    lambda_runtime::run(service_fn(|event| handle_request(event, &config, &store))).await
}

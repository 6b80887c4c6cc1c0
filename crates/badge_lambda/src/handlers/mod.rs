pub mod api_gateway;
pub mod manager;
pub mod uploader;

pub use api_gateway::ApiGatewayResponse;

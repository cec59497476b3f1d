use crate::config::transport::TransportConfig;
use aws_config::SdkConfig;

/// An SDK client that a [`Service`](crate::core::service::Service) can build and cache.
///
/// Implemented for the S3, Kinesis and SESv2 clients in their adapter modules.
pub trait ServiceClient: Clone + Send + Sync + std::fmt::Debug + 'static {
    /// SDK service identifier of the client.
    const SERVICE_NAME: &'static str;

    fn from_sdk_config(config: &SdkConfig, transport: Option<&TransportConfig>) -> Self;
}

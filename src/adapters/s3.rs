use crate::config::transport::TransportConfig;
use crate::core::service::Service;
use crate::domain::base::Base;
use crate::domain::ports::ServiceClient;
use crate::utils::error::Result;
use aws_config::SdkConfig;
use aws_sdk_s3::operation::get_object::builders::GetObjectFluentBuilder;
use aws_sdk_s3::operation::get_object::GetObjectOutput;
use aws_sdk_s3::operation::put_object::builders::PutObjectFluentBuilder;
use aws_sdk_s3::operation::put_object::PutObjectOutput;
use aws_sdk_s3::primitives::{ByteStream, DateTime};
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use chrono::Utc;
use serde::Serialize;

const JSON_CONTENT_TYPE: &str = "application/json";

impl ServiceClient for Client {
    const SERVICE_NAME: &'static str = "s3";

    fn from_sdk_config(config: &SdkConfig, transport: Option<&TransportConfig>) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(config);
        if let Some(path_style) = transport.and_then(|t| t.force_path_style) {
            builder = builder.force_path_style(path_style);
        }
        Client::from_conf(builder.build())
    }
}

/// Object storage addressed through `<NAME>_ENDPOINT_URL` (name `s3` by default).
#[derive(Debug)]
pub struct S3 {
    service: Service<Client>,
}

impl S3 {
    pub const DEFAULT_NAME: &'static str = "s3";

    pub fn new() -> Self {
        Self::named(Self::DEFAULT_NAME)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::from_service(Service::new(name))
    }

    pub fn from_service(service: Service<Client>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Service<Client> {
        &self.service
    }

    pub async fn client(&self) -> Result<&Client> {
        self.service.client().await
    }

    /// Fetches `key` from `bucket`, at `version` when one is given.
    pub async fn get(
        &self,
        key: &str,
        bucket: &str,
        version: Option<&str>,
    ) -> Result<GetObjectOutput> {
        let request = get_object_request(self.client().await?, key, bucket, version);
        tracing::debug!(bucket, key, version, "GetObject");
        Ok(request.send().await?)
    }

    /// Stores `body` under `key`. `acl` and `expires` are sent only when given.
    pub async fn put(
        &self,
        key: &str,
        bucket: &str,
        body: impl Into<ByteStream>,
        acl: Option<ObjectCannedAcl>,
        expires: Option<chrono::DateTime<Utc>>,
    ) -> Result<PutObjectOutput> {
        let request = put_object_request(self.client().await?, key, bucket, body, acl, expires);
        tracing::debug!(bucket, key, "PutObject");
        Ok(request.send().await?)
    }

    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        bucket: &str,
        value: &T,
        indent: Option<usize>,
    ) -> Result<PutObjectOutput> {
        let request = put_json_request(self.client().await?, key, bucket, value, indent)?;
        tracing::debug!(bucket, key, "PutObject (json)");
        Ok(request.send().await?)
    }
}

impl Default for S3 {
    fn default() -> Self {
        Self::new()
    }
}

pub fn get_object_request(
    client: &Client,
    key: &str,
    bucket: &str,
    version: Option<&str>,
) -> GetObjectFluentBuilder {
    let request = client.get_object().bucket(bucket).key(key);
    match version {
        Some(version) => request.version_id(version),
        None => request,
    }
}

pub fn put_object_request(
    client: &Client,
    key: &str,
    bucket: &str,
    body: impl Into<ByteStream>,
    acl: Option<ObjectCannedAcl>,
    expires: Option<chrono::DateTime<Utc>>,
) -> PutObjectFluentBuilder {
    let mut request = client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(body.into());
    if let Some(acl) = acl {
        request = request.acl(acl);
    }
    if let Some(expires) = expires {
        request = request.expires(DateTime::from_millis(expires.timestamp_millis()));
    }
    request
}

/// `value` serialized with [`Base::serialize`] and tagged `application/json`.
pub fn put_json_request<T: Serialize + ?Sized>(
    client: &Client,
    key: &str,
    bucket: &str,
    value: &T,
    indent: Option<usize>,
) -> Result<PutObjectFluentBuilder> {
    let body = Base::serialize(value, indent)?;
    Ok(put_object_request(client, key, bucket, body, None, None).content_type(JSON_CONTENT_TYPE))
}

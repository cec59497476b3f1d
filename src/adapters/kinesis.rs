use crate::config::transport::TransportConfig;
use crate::core::service::Service;
use crate::domain::base::Base;
use crate::domain::ports::ServiceClient;
use crate::utils::error::Result;
use aws_config::SdkConfig;
use aws_sdk_kinesis::operation::put_record::builders::PutRecordFluentBuilder;
use aws_sdk_kinesis::operation::put_record::PutRecordOutput;
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::Client;
use serde::Serialize;

impl ServiceClient for Client {
    const SERVICE_NAME: &'static str = "kinesis";

    fn from_sdk_config(config: &SdkConfig, _transport: Option<&TransportConfig>) -> Self {
        Client::new(config)
    }
}

/// Data stream addressed as `/{region}/{folder}/{database}/{stream}`.
///
/// Folder, database and stream name come from `<NAME>_FOLDER`, `<NAME>_DATABASE` and
/// `<NAME>_STREAM_NAME`. The path is fixed when the value is built.
#[derive(Debug)]
pub struct Kinesis {
    service: Service<Client>,
    stream: String,
}

impl Kinesis {
    pub const DEFAULT_NAME: &'static str = "kinesis";
    pub const DEFAULT_PARTITION_KEY: &'static str = "1";

    /// Unauthenticated by default: the SDK default provider chain supplies credentials,
    /// if any.
    pub fn new() -> Self {
        Self::named(Self::DEFAULT_NAME)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::from_service(Service::new(name).with_auth(false))
    }

    pub fn from_service(service: Service<Client>) -> Self {
        let stream = stream_path(service.base());
        Self { service, stream }
    }

    pub fn service(&self) -> &Service<Client> {
        &self.service
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    pub async fn client(&self) -> Result<&Client> {
        self.service.client().await
    }

    /// Writes one record. `key` defaults to [`Kinesis::DEFAULT_PARTITION_KEY`].
    pub async fn put(
        &self,
        message: impl Into<Vec<u8>>,
        key: Option<&str>,
    ) -> Result<PutRecordOutput> {
        let key = key.unwrap_or(Self::DEFAULT_PARTITION_KEY);
        let request = put_record_request(self.client().await?, &self.stream, message, key);
        tracing::debug!(stream = %self.stream, partition_key = key, "PutRecord");
        Ok(request.send().await?)
    }

    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        value: &T,
        key: Option<&str>,
    ) -> Result<PutRecordOutput> {
        let key = key.unwrap_or(Self::DEFAULT_PARTITION_KEY);
        let request = put_json_record_request(self.client().await?, &self.stream, value, key)?;
        tracing::debug!(stream = %self.stream, partition_key = key, "PutRecord (json)");
        Ok(request.send().await?)
    }
}

impl Default for Kinesis {
    fn default() -> Self {
        Self::new()
    }
}

pub fn put_record_request(
    client: &Client,
    stream: &str,
    message: impl Into<Vec<u8>>,
    key: &str,
) -> PutRecordFluentBuilder {
    client
        .put_record()
        .stream_name(stream)
        .data(Blob::new(message))
        .partition_key(key)
}

/// `value` as compact JSON.
pub fn put_json_record_request<T: Serialize + ?Sized>(
    client: &Client,
    stream: &str,
    value: &T,
    key: &str,
) -> Result<PutRecordFluentBuilder> {
    Ok(put_record_request(client, stream, Base::serialize(value, None)?, key))
}

fn stream_path(base: &Base) -> String {
    let segment = |value: Option<String>, var: String| {
        value.unwrap_or_else(|| {
            tracing::warn!(variable = %var, name = base.name(), "Stream path segment is not set");
            String::new()
        })
    };

    let region = segment(
        base.region().map(str::to_string),
        crate::domain::base::REGION_VAR.to_string(),
    );
    let folder = segment(base.env(&["folder"], None), base.env_key(&["folder"]));
    let database = segment(base.env(&["database"], None), base.env_key(&["database"]));
    let stream = segment(base.env(&["stream_name"], None), base.env_key(&["stream_name"]));

    format!("/{}/{}/{}/{}", region, folder, database, stream)
}

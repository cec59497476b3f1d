use crate::config::transport::TransportConfig;
use crate::domain::base::{Base, ACCESS_KEY_ID_VAR, SECRET_ACCESS_KEY_VAR};
use crate::domain::env::Environment;
use crate::domain::ports::ServiceClient;
use crate::utils::error::{Result, WrapperError};
use crate::utils::validation::validate_url;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

const CREDENTIALS_SOURCE: &str = "environment";

/// Key id and secret taken from `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct CredentialPair {
    pub access_key_id: Option<String>,
    #[serde(serialize_with = "redact")]
    pub secret_access_key: Option<String>,
}

impl CredentialPair {
    /// Static credentials when both halves are set, `None` (SDK default provider chain)
    /// when neither is.
    pub fn resolve(&self) -> Result<Option<Credentials>> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(key_id), Some(secret)) => Ok(Some(Credentials::new(
                key_id,
                secret,
                None,
                None,
                CREDENTIALS_SOURCE,
            ))),
            (None, None) => Ok(None),
            (Some(_), None) => Err(WrapperError::PartialCredentials {
                present: ACCESS_KEY_ID_VAR,
                missing: SECRET_ACCESS_KEY_VAR,
            }),
            (None, Some(_)) => Err(WrapperError::PartialCredentials {
                present: SECRET_ACCESS_KEY_VAR,
                missing: ACCESS_KEY_ID_VAR,
            }),
        }
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

fn redact<S: Serializer>(value: &Option<String>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(_) => serializer.serialize_str("<redacted>"),
        None => serializer.serialize_none(),
    }
}

/// Everything needed to build an SDK handle for one service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientParams {
    pub service_name: &'static str,
    pub endpoint_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<TransportConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<CredentialPair>,
}

impl ClientParams {
    /// Loads the shared SDK configuration, layering these parameters over the SDK defaults.
    pub async fn load_sdk_config(&self) -> Result<SdkConfig> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(url) = &self.endpoint_url {
            validate_url("endpoint_url", url)?;
            loader = loader.endpoint_url(url);
        }
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let credentials = match &self.credentials {
            Some(pair) => pair.resolve()?,
            None => None,
        };
        if let Some(credentials) = credentials {
            loader = loader.credentials_provider(credentials);
        }
        if let Some(config) = &self.config {
            if let Some(timeouts) = config.timeout_config() {
                loader = loader.timeout_config(timeouts);
            }
            if let Some(retry) = config.retry_config() {
                loader = loader.retry_config(retry);
            }
        }

        Ok(loader.load().await)
    }
}

/// One named cloud service: environment-derived parameters plus lazily built handles.
///
/// `resource()` and `client()` are each built on first use and then reused for the
/// lifetime of the value. Concurrent first calls still build exactly one handle. There
/// is no way to rebuild them; later environment changes are not observed.
pub struct Service<C: ServiceClient> {
    base: Base,
    auth: bool,
    config: Option<TransportConfig>,
    endpoint: Option<String>,
    resource: OnceCell<SdkConfig>,
    client: OnceCell<C>,
}

impl<C: ServiceClient> Service<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_base(Base::new(name))
    }

    /// See [`Base::with_env`]: a region or key pair absent from `env` is left to the SDK
    /// default chain, not forced empty.
    pub fn with_env(name: impl Into<String>, env: Arc<dyn Environment>) -> Self {
        Self::from_base(Base::with_env(name, env))
    }

    pub fn from_base(base: Base) -> Self {
        let endpoint = base.env(&["endpoint_url"], None);
        Self {
            base,
            auth: true,
            config: None,
            endpoint,
            resource: OnceCell::new(),
            client: OnceCell::new(),
        }
    }

    /// Whether the environment credential pair is passed to the SDK.
    pub fn with_auth(mut self, auth: bool) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_config(mut self, config: TransportConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn base(&self) -> &Base {
        &self.base
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn auth(&self) -> bool {
        self.auth
    }

    pub fn config(&self) -> Option<&TransportConfig> {
        self.config.as_ref()
    }

    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Builds a fresh parameter set on every call.
    pub fn params(&self) -> ClientParams {
        ClientParams {
            service_name: C::SERVICE_NAME,
            endpoint_url: self.endpoint.clone(),
            config: self.config.clone(),
            region: self.base.region().map(str::to_string),
            credentials: self.auth.then(|| CredentialPair {
                access_key_id: self.base.key_id().map(str::to_string),
                secret_access_key: self.base.secret().map(str::to_string),
            }),
        }
    }

    /// Shared SDK configuration, the handle every client of this service is built from.
    pub async fn resource(&self) -> Result<&SdkConfig> {
        self.resource
            .get_or_try_init(|| async {
                tracing::debug!(
                    name = self.name(),
                    service = C::SERVICE_NAME,
                    endpoint = self.endpoint_url().unwrap_or("<default>"),
                    "Loading SDK configuration"
                );
                self.params().load_sdk_config().await
            })
            .await
    }

    pub async fn client(&self) -> Result<&C> {
        self.client
            .get_or_try_init(|| async {
                let sdk_config = self.resource().await?;
                tracing::debug!(name = self.name(), service = C::SERVICE_NAME, "Building client");
                Ok::<_, WrapperError>(C::from_sdk_config(sdk_config, self.config.as_ref()))
            })
            .await
    }
}

impl<C: ServiceClient> fmt::Debug for Service<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("base", &self.base)
            .field("service_name", &C::SERVICE_NAME)
            .field("auth", &self.auth)
            .field("config", &self.config)
            .field("endpoint", &self.endpoint)
            .field("resource_ready", &self.resource.initialized())
            .field("client_ready", &self.client.initialized())
            .finish()
    }
}

use crate::core::service::Service;
use crate::domain::ports::ServiceClient;
use crate::utils::error::{Result, WrapperError};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// A service client bound to one configured path (mailbox address, topic, queue).
#[derive(Debug, Clone)]
pub struct DynamicClient<C> {
    client: C,
    path: String,
}

impl<C> DynamicClient<C> {
    pub fn new(client: C, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Looks up per-item clients by logical name.
///
/// The path for `item` is read from `<NAME>_<PREFIX>_<ITEM>`; clients are created on first
/// request and cached by lower-cased item name. All clients share the service's single SDK
/// client.
pub struct DynamicService<C: ServiceClient> {
    service: Service<C>,
    prefix: String,
    clients: Mutex<HashMap<String, DynamicClient<C>>>,
}

impl<C: ServiceClient> DynamicService<C> {
    pub fn new(service: Service<C>, prefix: impl Into<String>) -> Self {
        Self {
            service,
            prefix: prefix.into(),
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn service(&self) -> &Service<C> {
        &self.service
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Configured path for `item`, without touching the cache.
    pub fn path_for(&self, item: &str) -> Result<String> {
        let parts = [self.prefix.as_str(), item];
        self.service
            .base()
            .env(&parts, None)
            .ok_or_else(|| WrapperError::MissingConfigError {
                field: self.service.base().env_key(&parts),
            })
    }

    pub async fn get(&self, item: &str) -> Result<DynamicClient<C>> {
        let key = item.to_lowercase();
        let mut clients = self.clients.lock().await;
        if let Some(existing) = clients.get(&key) {
            return Ok(existing.clone());
        }

        let path = self.path_for(item)?;
        let client = self.service.client().await?.clone();
        tracing::debug!(name = self.service.name(), item = %key, path = %path, "Registered client");

        let entry = DynamicClient::new(client, path);
        clients.insert(key, entry.clone());
        Ok(entry)
    }

    /// Item names that already have a cached client, sorted.
    pub async fn items(&self) -> Vec<String> {
        let mut names: Vec<String> = self.clients.lock().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::env::Environment;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn service(vars: &[(&str, &str)]) -> Service<aws_sdk_sesv2::Client> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let env: Arc<dyn Environment> = Arc::new(map);
        Service::with_env("sesv2", env)
    }

    #[tokio::test]
    async fn test_get_reads_prefixed_path_and_caches() {
        let dynamic = DynamicService::new(
            service(&[
                ("AWS_REGION", "ru-central1"),
                ("AWS_ACCESS_KEY_ID", "key"),
                ("AWS_SECRET_ACCESS_KEY", "secret"),
                ("SESV2_MAILBOX_NOREPLY", "noreply@example.com"),
            ]),
            "MAILBOX",
        );

        let first = dynamic.get("noreply").await.unwrap();
        assert_eq!(first.path(), "noreply@example.com");

        let second = dynamic.get("NoReply").await.unwrap();
        assert_eq!(second.path(), first.path());
        assert_eq!(dynamic.items().await, vec!["noreply".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_path_names_the_variable() {
        let dynamic = DynamicService::new(service(&[("AWS_REGION", "ru-central1")]), "MAILBOX");

        match dynamic.get("support").await {
            Err(WrapperError::MissingConfigError { field }) => {
                assert_eq!(field, "SESV2_MAILBOX_SUPPORT")
            }
            other => panic!("unexpected result: {:?}", other.map(|c| c.path().to_string())),
        }
        assert!(dynamic.items().await.is_empty());
    }
}

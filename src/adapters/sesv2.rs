use crate::config::transport::TransportConfig;
use crate::core::dynamic::{DynamicClient, DynamicService};
use crate::core::service::Service;
use crate::domain::ports::ServiceClient;
use crate::utils::error::{Result, WrapperError};
use aws_config::SdkConfig;
use aws_sdk_sesv2::error::ProvideErrorMetadata;
use aws_sdk_sesv2::operation::send_email::builders::SendEmailFluentBuilder;
use aws_sdk_sesv2::operation::send_email::SendEmailOutput;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client;
use std::collections::HashSet;
use std::sync::Arc;

impl ServiceClient for Client {
    const SERVICE_NAME: &'static str = "sesv2";

    fn from_sdk_config(config: &SdkConfig, _transport: Option<&TransportConfig>) -> Self {
        Client::new(config)
    }
}

pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Destination addresses. A single address becomes a one-element list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipients(Vec<String>);

impl Recipients {
    pub fn addresses(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Recipients {
    fn from(address: &str) -> Self {
        Self(vec![address.to_string()])
    }
}

impl From<String> for Recipients {
    fn from(address: String) -> Self {
        Self(vec![address])
    }
}

impl From<Vec<String>> for Recipients {
    fn from(addresses: Vec<String>) -> Self {
        Self(addresses)
    }
}

impl From<Vec<&str>> for Recipients {
    fn from(addresses: Vec<&str>) -> Self {
        Self(addresses.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Recipients {
    fn from(addresses: &[&str]) -> Self {
        Self(addresses.iter().map(|a| a.to_string()).collect())
    }
}

/// Transactional email, one sender address per mailbox.
///
/// Sender addresses are read from `<NAME>_MAILBOX_<ITEM>`, e.g. `SESV2_MAILBOX_NOREPLY`.
pub struct Sesv2 {
    mailboxes: DynamicService<Client>,
    suppress_codes: Arc<HashSet<String>>,
}

impl Sesv2 {
    pub const DEFAULT_NAME: &'static str = "sesv2";
    pub const DEFAULT_PREFIX: &'static str = "MAILBOX";

    pub fn new() -> Self {
        Self::from_service(Service::new(Self::DEFAULT_NAME))
    }

    pub fn from_service(service: Service<Client>) -> Self {
        Self::with_prefix(service, Self::DEFAULT_PREFIX)
    }

    pub fn with_prefix(service: Service<Client>, prefix: impl Into<String>) -> Self {
        Self {
            mailboxes: DynamicService::new(service, prefix),
            suppress_codes: Arc::new(HashSet::new()),
        }
    }

    /// Provider error codes for which `send` returns `Ok(None)` instead of failing.
    /// Empty unless set here.
    pub fn with_suppressed_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suppress_codes = Arc::new(codes.into_iter().map(Into::into).collect());
        self
    }

    pub fn service(&self) -> &Service<Client> {
        self.mailboxes.service()
    }

    pub async fn mailbox(&self, item: &str) -> Result<Mailbox> {
        let inner = self.mailboxes.get(item).await?;
        Ok(Mailbox {
            inner,
            suppress_codes: Arc::clone(&self.suppress_codes),
        })
    }
}

impl Default for Sesv2 {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct Mailbox {
    inner: DynamicClient<Client>,
    suppress_codes: Arc<HashSet<String>>,
}

impl Mailbox {
    /// Sender address.
    pub fn address(&self) -> &str {
        self.inner.path()
    }

    pub fn send_request(
        &self,
        to: impl Into<Recipients>,
        title: &str,
        message: &str,
        charset: &str,
    ) -> Result<SendEmailFluentBuilder> {
        let destination = Destination::builder()
            .set_to_addresses(Some(to.into().into_vec()))
            .build();

        let subject = Content::builder().data(title).charset(charset).build()?;
        let text = Content::builder().data(message).charset(charset).build()?;
        let simple = Message::builder()
            .subject(subject)
            .body(Body::builder().text(text).build())
            .build();

        Ok(self
            .inner
            .client()
            .send_email()
            .from_email_address(self.address())
            .destination(destination)
            .content(EmailContent::builder().simple(simple).build()))
    }

    pub async fn send(
        &self,
        to: impl Into<Recipients>,
        title: &str,
        message: &str,
    ) -> Result<Option<SendEmailOutput>> {
        self.send_with_charset(to, title, message, DEFAULT_CHARSET)
            .await
    }

    pub async fn send_with_charset(
        &self,
        to: impl Into<Recipients>,
        title: &str,
        message: &str,
        charset: &str,
    ) -> Result<Option<SendEmailOutput>> {
        let request = self.send_request(to, title, message, charset)?;
        tracing::debug!(from = self.address(), "SendEmail");

        match request.send().await {
            Ok(output) => Ok(Some(output)),
            Err(err) => {
                let suppressed = err
                    .code()
                    .filter(|code| self.suppress_codes.contains(*code))
                    .map(str::to_string);
                match suppressed {
                    Some(code) => {
                        tracing::warn!(from = self.address(), code = %code, "SendEmail error suppressed");
                        Ok(None)
                    }
                    None => Err(WrapperError::from(err)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::env::Environment;
    use std::collections::HashMap;

    fn sesv2() -> Sesv2 {
        sesv2_at("https://postbox.cloud.yandex.net")
    }

    fn sesv2_at(endpoint: &str) -> Sesv2 {
        let map: HashMap<String, String> = [
            ("AWS_REGION", "ru-central1"),
            ("AWS_ACCESS_KEY_ID", "key"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("SESV2_ENDPOINT_URL", endpoint),
            ("SESV2_MAILBOX_NOREPLY", "noreply@example.com"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let env: Arc<dyn Environment> = Arc::new(map);
        let service = Service::with_env(Sesv2::DEFAULT_NAME, env).with_config(TransportConfig {
            max_attempts: Some(1),
            ..TransportConfig::default()
        });
        Sesv2::from_service(service)
    }

    /// Local HTTP endpoint that answers every request with a 400 `MessageRejected`.
    async fn rejecting_endpoint() -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut chunk = [0u8; 4096];
                    loop {
                        let n = socket.read(&mut chunk).await.unwrap_or(0);
                        if n == 0 {
                            return;
                        }
                        request.extend_from_slice(&chunk[..n]);
                        if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                            let head = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
                            let length = head
                                .lines()
                                .find_map(|line| line.strip_prefix("content-length:"))
                                .and_then(|v| v.trim().parse::<usize>().ok())
                                .unwrap_or(0);
                            if request.len() >= end + 4 + length {
                                break;
                            }
                        }
                    }

                    let body = r#"{"message":"Sender address is not verified"}"#;
                    let response = format!(
                        "HTTP/1.1 400 Bad Request\r\n\
                         x-amzn-ErrorType: MessageRejected\r\n\
                         content-type: application/json\r\n\
                         content-length: {}\r\n\
                         connection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_single_address_becomes_list() {
        assert_eq!(
            Recipients::from("a@example.com").addresses(),
            ["a@example.com".to_string()]
        );
        assert_eq!(
            Recipients::from("a@example.com".to_string()).into_vec(),
            vec!["a@example.com".to_string()]
        );
    }

    #[test]
    fn test_list_passes_through() {
        let list = vec!["a@example.com".to_string(), "b@example.com".to_string()];
        assert_eq!(Recipients::from(list.clone()).into_vec(), list);
        assert_eq!(
            Recipients::from(vec!["a@example.com", "b@example.com"]).into_vec(),
            list
        );
        assert!(Recipients::from(Vec::<String>::new()).addresses().is_empty());
    }

    #[tokio::test]
    async fn test_send_request_shape() {
        let sesv2 = sesv2();
        let mailbox = sesv2.mailbox("noreply").await.unwrap();
        assert_eq!(mailbox.address(), "noreply@example.com");

        let request = mailbox
            .send_request("user@example.com", "Hello", "Body text", DEFAULT_CHARSET)
            .unwrap();

        assert_eq!(
            request.get_from_email_address().as_deref(),
            Some("noreply@example.com")
        );
        let destination = request.get_destination().as_ref().unwrap();
        assert_eq!(destination.to_addresses(), ["user@example.com".to_string()]);

        let simple = request
            .get_content()
            .as_ref()
            .and_then(|c| c.simple())
            .unwrap();
        let subject = simple.subject().unwrap();
        assert_eq!(subject.data(), "Hello");
        assert_eq!(subject.charset(), Some("UTF-8"));
        let text = simple.body().and_then(|b| b.text()).unwrap();
        assert_eq!(text.data(), "Body text");
        assert_eq!(text.charset(), Some("UTF-8"));
    }

    #[tokio::test]
    async fn test_mailboxes_share_one_client() {
        let sesv2 = sesv2();
        sesv2.mailbox("noreply").await.unwrap();
        let first = sesv2.service().client().await.unwrap();
        sesv2.mailbox("NOREPLY").await.unwrap();
        assert!(std::ptr::eq(first, sesv2.service().client().await.unwrap()));
    }

    #[tokio::test]
    async fn test_unknown_mailbox_is_config_error() {
        let sesv2 = sesv2().with_suppressed_codes(["MessageRejected"]);
        assert!(matches!(
            sesv2.mailbox("billing").await,
            Err(WrapperError::MissingConfigError { .. })
        ));
    }

    #[tokio::test]
    async fn test_provider_error_propagates_by_default() {
        let sesv2 = sesv2_at(&rejecting_endpoint().await);
        let mailbox = sesv2.mailbox("noreply").await.unwrap();

        let err = mailbox
            .send("user@example.com", "Hello", "Body text")
            .await
            .unwrap_err();
        assert!(matches!(err, WrapperError::SesSendEmail(_)));
        assert_eq!(err.service_code(), Some("MessageRejected"));
    }

    #[tokio::test]
    async fn test_suppressed_provider_error_returns_none() {
        let sesv2 =
            sesv2_at(&rejecting_endpoint().await).with_suppressed_codes(["MessageRejected"]);
        let mailbox = sesv2.mailbox("noreply").await.unwrap();

        let sent = mailbox
            .send("user@example.com", "Hello", "Body text")
            .await
            .unwrap();
        assert!(sent.is_none());

        let other = sesv2_at(&rejecting_endpoint().await).with_suppressed_codes(["Throttling"]);
        let mailbox = other.mailbox("noreply").await.unwrap();
        assert!(mailbox
            .send("user@example.com", "Hello", "Body text")
            .await
            .is_err());
    }
}

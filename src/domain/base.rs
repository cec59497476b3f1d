use crate::domain::env::{Environment, ProcessEnv};
use crate::utils::error::Result;
use serde::Serialize;
use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

pub const REGION_VAR: &str = "AWS_REGION";
pub const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";

/// Settings shared by every service: a logical name used to namespace environment
/// lookups, plus the process-wide region and credential pair.
///
/// Region and credentials are read once, when the value is built.
#[derive(Clone)]
pub struct Base {
    name: String,
    region: Option<String>,
    key_id: Option<String>,
    secret: Option<String>,
    env: Arc<dyn Environment>,
}

impl Base {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_env(name, Arc::new(ProcessEnv))
    }

    /// Reads every `<NAME>_*` variable and the AWS variables from `env` instead of the
    /// process environment.
    ///
    /// `env` only supplies explicit overrides. When it has no `AWS_REGION` (or no key
    /// pair), the SDK still resolves those from its own default chain, which includes
    /// the process environment and the shared profile files.
    pub fn with_env(name: impl Into<String>, env: Arc<dyn Environment>) -> Self {
        Self {
            name: name.into(),
            region: env.var(REGION_VAR),
            key_id: env.var(ACCESS_KEY_ID_VAR),
            secret: env.var(SECRET_ACCESS_KEY_VAR),
            env,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    /// Variable name for `parts` under this name: `FOO_ENDPOINT_URL` for name `foo`
    /// and parts `["endpoint_url"]`.
    pub fn env_key<S: AsRef<str>>(&self, parts: &[S]) -> String {
        std::iter::once(self.name.as_str())
            .chain(parts.iter().map(AsRef::as_ref))
            .map(str::to_uppercase)
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Looks up the name-prefixed variable, falling back to `default` when it is unset.
    pub fn env<S: AsRef<str>>(&self, parts: &[S], default: Option<&str>) -> Option<String> {
        self.env
            .var(&self.env_key(parts))
            .or_else(|| default.map(str::to_string))
    }

    /// Encodes `items` as UTF-8 JSON. `indent` switches to pretty output with that many
    /// spaces per nesting level.
    pub fn serialize<T: Serialize + ?Sized>(items: &T, indent: Option<usize>) -> Result<Vec<u8>> {
        let Some(width) = indent else {
            return Ok(serde_json::to_vec(items)?);
        };

        let indent = vec![b' '; width];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
        let mut out = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        items.serialize(&mut serializer)?;
        Ok(out)
    }

    /// Same bytes as [`Base::serialize`], in a cursor positioned at the start.
    pub fn buffer<T: Serialize + ?Sized>(
        items: &T,
        indent: Option<usize>,
    ) -> Result<Cursor<Vec<u8>>> {
        Ok(Cursor::new(Self::serialize(items, indent)?))
    }
}

impl fmt::Debug for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Base")
            .field("name", &self.name)
            .field("region", &self.region)
            .field("key_id", &self.key_id)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::io::Read;

    fn base(name: &str, vars: &[(&str, &str)]) -> Base {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Base::with_env(name, Arc::new(env))
    }

    #[test]
    fn test_env_key_upper_cases_and_joins() {
        let base = base("foo", &[]);
        assert_eq!(base.env_key(&["x"]), "FOO_X");
        assert_eq!(base.env_key(&["mailbox", "noreply"]), "FOO_MAILBOX_NOREPLY");
        assert_eq!(base.env_key::<&str>(&[]), "FOO");
    }

    #[test]
    fn test_env_reads_prefixed_variable() {
        let base = base("foo", &[("FOO_X", "42"), ("X", "wrong")]);
        assert_eq!(base.env(&["x"], None).as_deref(), Some("42"));
        assert_eq!(base.env(&["y"], None), None);
        assert_eq!(base.env(&["y"], Some("fallback")).as_deref(), Some("fallback"));
    }

    #[test]
    fn test_region_and_credentials_read_at_construction() {
        let base = base(
            "s3",
            &[
                ("AWS_REGION", "ru-central1"),
                ("AWS_ACCESS_KEY_ID", "key"),
                ("AWS_SECRET_ACCESS_KEY", "secret"),
            ],
        );
        assert_eq!(base.region(), Some("ru-central1"));
        assert_eq!(base.key_id(), Some("key"));
        assert_eq!(base.secret(), Some("secret"));
        assert!(!format!("{:?}", base).contains("secret\""));
    }

    #[test]
    fn test_serialize_compact_and_indented() {
        let items = json!({"name": "Привет", "values": [1, 2]});

        let compact = Base::serialize(&items, None).unwrap();
        let text = String::from_utf8(compact).unwrap();
        assert!(!text.contains('\n'));
        assert_eq!(serde_json::from_str::<serde_json::Value>(&text).unwrap(), items);

        let pretty = String::from_utf8(Base::serialize(&items, Some(4)).unwrap()).unwrap();
        assert!(pretty.contains("\n    \"name\""));
        assert_eq!(serde_json::from_str::<serde_json::Value>(&pretty).unwrap(), items);
    }

    #[test]
    fn test_serialize_rejects_non_string_keys() {
        let items: HashMap<Vec<u8>, u8> = HashMap::from([(vec![1], 1)]);
        assert!(Base::serialize(&items, None).is_err());
    }

    #[test]
    fn test_buffer_is_rewound() {
        let mut buffer = Base::buffer(&json!({"a": 1}), None).unwrap();
        assert_eq!(buffer.position(), 0);
        let mut text = String::new();
        buffer.read_to_string(&mut text).unwrap();
        assert_eq!(text, r#"{"a":1}"#);
    }
}

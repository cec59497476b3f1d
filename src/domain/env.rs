use std::collections::HashMap;

/// Source of environment variables.
///
/// Services read their settings through this trait instead of `std::env` so a fixed
/// environment can be injected (tests, embedding in a larger application).
pub trait Environment: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment. Variables that are not valid unicode are treated as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

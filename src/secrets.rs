use std::env;
use std::fmt;

/// Env var holding the Gemini API credential.
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// An opaque credential value. Never printed; `Debug` is redacted so the
/// key cannot leak through logs or error chains.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

pub trait SecretStore: Send + Sync {
    fn get(&self, name: &str) -> Option<Secret>;
}

/// Reads secrets from the process environment. `.env` files are loaded
/// once at startup via `dotenvy` in `Config::from_env`.
pub struct EnvSecretStore;

impl SecretStore for EnvSecretStore {
    fn get(&self, name: &str) -> Option<Secret> {
        env::var(name).ok().filter(|v| !v.is_empty()).map(Secret)
    }
}

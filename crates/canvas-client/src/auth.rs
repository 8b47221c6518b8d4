//! Bearer token sources.
//!
//! The client asks its [`TokenProvider`] for a token once per request, at call
//! time. No token means the request goes out without an `Authorization` header.

use async_trait::async_trait;

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Option<String>;
}

/// Never supplies a token.
pub struct NoToken;

#[async_trait]
impl TokenProvider for NoToken {
    async fn token(&self) -> Option<String> {
        None
    }
}

/// A fixed token; an empty string counts as absent.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Option<String> {
        (!self.0.is_empty()).then(|| self.0.clone())
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads an environment variable on every request.
pub struct EnvToken {
    var: String,
    lookup: EnvLookup,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self::with_lookup(var, |name| std::env::var(name).ok())
    }

    /// Resolve `var` through `lookup` instead of the process environment.
    pub fn with_lookup(
        var: impl Into<String>,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            var: var.into(),
            lookup: Box::new(lookup),
        }
    }
}

#[async_trait]
impl TokenProvider for EnvToken {
    async fn token(&self) -> Option<String> {
        (self.lookup)(&self.var).filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        assert_eq!(StaticToken::new("abc").token().await.as_deref(), Some("abc"));
        assert_eq!(StaticToken::new("").token().await, None);
        assert_eq!(NoToken.token().await, None);
    }

    #[tokio::test]
    async fn test_env_token_read_at_call_time() {
        use std::sync::{Arc, Mutex};

        let env = Arc::new(Mutex::new(None::<String>));
        let source = env.clone();
        let provider = EnvToken::with_lookup("CANVAS_TOKEN", move |name| {
            assert_eq!(name, "CANVAS_TOKEN");
            source.lock().unwrap().clone()
        });
        assert_eq!(provider.token().await, None);

        *env.lock().unwrap() = Some("later".into());
        assert_eq!(provider.token().await.as_deref(), Some("later"));

        *env.lock().unwrap() = Some(String::new());
        assert_eq!(provider.token().await, None);
    }
}

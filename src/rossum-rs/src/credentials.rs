use std::fmt;

/// Source of the bearer token attached to every request
///
/// The token is read-only once the client is built; concurrent calls share it.
pub trait CredentialProvider: Send + Sync + fmt::Debug {
    fn bearer_token(&self) -> &str;
}

/// A token known up front (API key, or the result of a login exchange)
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

//! Access-token lookup. Login flows and credential storage live elsewhere;
//! commands only ever see an [`Authenticator`].

use std::path::PathBuf;
use thiserror::Error;

pub const ACCESS_TOKEN_ENV: &str = "STACKIT_ACCESS_TOKEN";
pub const SERVICE_ACCOUNT_TOKEN_ENV: &str = "STACKIT_SERVICE_ACCOUNT_TOKEN";
pub const SERVICE_ACCOUNT_TOKEN_PATH_ENV: &str = "STACKIT_SERVICE_ACCOUNT_TOKEN_PATH";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no access token found")]
    MissingToken,

    #[error("read token file {path}: {source}")]
    ReadTokenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("the API rejected the access token: {0}")]
    Rejected(String),
}

pub trait Authenticator: Send + Sync {
    /// Bearer token to attach to API requests.
    fn access_token(&self) -> Result<String, AuthError>;
}

/// Resolves a token from the environment: an explicit access token first, then
/// a service account token, then a file holding one.
pub struct EnvAuthenticator {
    lookup: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl EnvAuthenticator {
    pub fn new() -> Self {
        Self::with_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }

    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }
}

impl Default for EnvAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

impl Authenticator for EnvAuthenticator {
    fn access_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.var(ACCESS_TOKEN_ENV) {
            return Ok(token.trim().to_string());
        }
        if let Some(token) = self.var(SERVICE_ACCOUNT_TOKEN_ENV) {
            return Ok(token.trim().to_string());
        }
        if let Some(path) = self.var(SERVICE_ACCOUNT_TOKEN_PATH_ENV) {
            let path = PathBuf::from(path);
            let token = std::fs::read_to_string(&path)
                .map_err(|source| AuthError::ReadTokenFile { path, source })?;
            let token = token.trim();
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }
        Err(AuthError::MissingToken)
    }
}

/// Fixed token, mostly useful in tests.
pub struct StaticAuthenticator(pub String);

impl Authenticator for StaticAuthenticator {
    fn access_token(&self) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn access_token_wins_over_service_account() {
        let auth = EnvAuthenticator::with_lookup(|k| match k {
            ACCESS_TOKEN_ENV => Some(" user-token\n".into()),
            SERVICE_ACCOUNT_TOKEN_ENV => Some("sa-token".into()),
            _ => None,
        });
        assert_eq!(auth.access_token().unwrap(), "user-token");
    }

    #[test]
    fn token_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "file-token").unwrap();
        let path = file.path().to_string_lossy().into_owned();
        let auth = EnvAuthenticator::with_lookup(move |k| {
            (k == SERVICE_ACCOUNT_TOKEN_PATH_ENV).then(|| path.clone())
        });
        assert_eq!(auth.access_token().unwrap(), "file-token");
    }

    #[test]
    fn missing_token_is_an_error() {
        let auth = EnvAuthenticator::with_lookup(|_| Some("  ".into()));
        assert!(matches!(auth.access_token(), Err(AuthError::MissingToken)));
    }
}

//! Client configuration: where requests go and how they authenticate.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use url::Url;

use crate::error::HarvestError;

const DEFAULT_USER_AGENT: &str = concat!("harvest-core/", env!("CARGO_PKG_VERSION"));

/// Credentials attached to every request as an `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// HTTP basic auth with the account email and password.
    Basic { username: String, password: String },
    /// An OAuth access token sent as a bearer token.
    Token(String),
}

impl Credentials {
    pub(crate) fn authorization(&self) -> String {
        match self {
            Credentials::Basic { username, password } => {
                format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
            }
            Credentials::Token(token) => format!("Bearer {token}"),
        }
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Credentials::Token(_) => f.debug_tuple("Token").field(&"***").finish(),
        }
    }
}

/// Immutable settings shared by every request a client makes.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    base_url: String,
    credentials: Option<Credentials>,
    user_agent: String,
}

impl HarvestConfig {
    /// Unauthenticated configuration against `base_url`. A trailing `/` is
    /// stripped.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn builder() -> HarvestConfigBuilder {
        HarvestConfigBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// Builder for [`HarvestConfig`].
///
/// Either a subdomain (`acme` → `https://acme.harvestapp.com`) or an explicit
/// base URL is required; an explicit base URL wins when both are set.
#[derive(Debug, Default, Clone)]
pub struct HarvestConfigBuilder {
    subdomain: Option<String>,
    base_url: Option<String>,
    credentials: Option<Credentials>,
    user_agent: Option<String>,
}

impl HarvestConfigBuilder {
    pub fn subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.subdomain = Some(subdomain.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::Basic {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::Token(token.into()));
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Result<HarvestConfig, HarvestError> {
        let base_url = match (self.base_url, self.subdomain) {
            (Some(url), _) => url,
            (None, Some(subdomain)) if !subdomain.trim().is_empty() => {
                format!("https://{}.harvestapp.com", subdomain.trim())
            }
            _ => {
                return Err(HarvestError::invalid(
                    "either a subdomain or a base url is required",
                ))
            }
        };

        Url::parse(&base_url)
            .map_err(|e| HarvestError::invalid(format!("invalid base url {base_url:?}: {e}")))?;

        Ok(HarvestConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: self.credentials,
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }
}

//! Dataverse connection string parsing
//!
//! Connection strings follow the `Key=Value;Key=Value` form used by Dataverse
//! tooling, for example:
//!
//! ```text
//! AuthType=ClientSecret;Url=https://org.crm.dynamics.com;ClientId=<app id>;ClientSecret=<secret>
//! AuthType=OAuth;Url=https://org.crm.dynamics.com;Username=user@org.com;Password=<password>
//! ```
//!
//! Keys are case-insensitive and values may be wrapped in single or double
//! quotes (needed when a value contains `;`).

use crate::config::{secret_string, SecretString};
use crate::domain::ConnectionError;
use secrecy::ExposeSecret;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Web API path appended to the organization URL
pub const API_PATH: &str = "api/data/v9.2";

/// Public client id used for the password grant when none is configured
pub const DEFAULT_PUBLIC_CLIENT_ID: &str = "51f81489-12ee-4a9e-aaae-a2591f45987d";

/// Authentication flow selected by `AuthType`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    /// Application user with a client secret (client credentials grant)
    ClientSecret,
    /// Interactive user account with username and password (password grant)
    OAuth,
}

impl FromStr for AuthType {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clientsecret" => Ok(AuthType::ClientSecret),
            "oauth" => Ok(AuthType::OAuth),
            other => Err(ConnectionError::InvalidConnectionString(format!(
                "Unsupported AuthType '{other}'. Supported: ClientSecret, OAuth"
            ))),
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthType::ClientSecret => write!(f, "ClientSecret"),
            AuthType::OAuth => write!(f, "OAuth"),
        }
    }
}

/// Parsed connection string
///
/// `Display` renders the connection string with secrets masked, so it is safe
/// to log.
#[derive(Debug, Clone)]
pub struct ConnectionString {
    /// Authentication flow
    pub auth_type: AuthType,

    /// Organization URL (e.g. `https://org.crm.dynamics.com`)
    pub url: Url,

    /// Application (client) id
    pub client_id: String,

    /// Client secret, required for `ClientSecret`
    pub client_secret: Option<SecretString>,

    /// User name, required for `OAuth`
    pub username: Option<String>,

    /// Password, required for `OAuth`
    pub password: Option<SecretString>,

    /// Azure AD tenant id
    pub tenant_id: Option<String>,

    /// Full authority URL; takes precedence over `tenant_id`
    pub authority: Option<String>,
}

impl ConnectionString {
    /// Parse a raw connection string
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::InvalidConnectionString` if a segment is
    /// malformed, the URL is invalid, or a key required by the selected
    /// `AuthType` is missing. Error messages never include secret values.
    pub fn parse(raw: &str) -> Result<Self, ConnectionError> {
        let mut auth_type = None;
        let mut url = None;
        let mut client_id = None;
        let mut client_secret = None;
        let mut username = None;
        let mut password = None;
        let mut tenant_id = None;
        let mut authority = None;

        for (index, segment) in split_segments(raw).iter().enumerate() {
            if segment.trim().is_empty() {
                continue;
            }

            let (key, value) = segment.split_once('=').ok_or_else(|| {
                ConnectionError::InvalidConnectionString(format!(
                    "segment {} is not a Key=Value pair",
                    index + 1
                ))
            })?;
            let value = unquote(value.trim());

            match key.trim().to_ascii_lowercase().as_str() {
                "authtype" | "auth type" => auth_type = Some(value.parse::<AuthType>()?),
                "url" | "serviceuri" | "service uri" | "server" => url = Some(value),
                "clientid" | "appid" | "client id" => client_id = Some(value),
                "clientsecret" | "secret" | "client secret" => {
                    client_secret = Some(secret_string(value))
                }
                "username" | "user name" => username = Some(value),
                "password" => password = Some(secret_string(value)),
                "tenantid" | "tenant id" => tenant_id = Some(value),
                "authority" => authority = Some(value),
                other => {
                    tracing::debug!(key = %other, "Ignoring unsupported connection string key");
                }
            }
        }

        let auth_type = auth_type.ok_or_else(|| missing("AuthType"))?;
        let url = url.filter(|u| !u.is_empty()).ok_or_else(|| missing("Url"))?;
        let url = Url::parse(&url).map_err(|e| {
            ConnectionError::InvalidConnectionString(format!("Url '{url}' is not valid: {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConnectionError::InvalidConnectionString(format!(
                "Url must use http or https, got '{}'",
                url.scheme()
            )));
        }

        let client_id = match auth_type {
            AuthType::ClientSecret => {
                if client_secret.is_none() {
                    return Err(missing("ClientSecret"));
                }
                client_id
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| missing("ClientId"))?
            }
            AuthType::OAuth => {
                if username.as_deref().map_or(true, str::is_empty) {
                    return Err(missing("Username"));
                }
                if password.is_none() {
                    return Err(missing("Password"));
                }
                client_id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| DEFAULT_PUBLIC_CLIENT_ID.to_string())
            }
        };

        Ok(Self {
            auth_type,
            url,
            client_id,
            client_secret,
            username,
            password,
            tenant_id: tenant_id.filter(|t| !t.is_empty()),
            authority: authority.filter(|a| !a.is_empty()),
        })
    }

    /// Organization URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }

    /// Web API root (`{url}/api/data/v9.2`)
    pub fn api_base(&self) -> String {
        format!("{}/{}", self.base_url(), API_PATH)
    }

    /// OAuth scope granting access to the organization
    pub fn scope(&self) -> String {
        format!("{}/.default", self.url.origin().ascii_serialization())
    }
}

impl FromStr for ConnectionString {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AuthType={};Url={};ClientId={}",
            self.auth_type,
            self.base_url(),
            self.client_id
        )?;
        if self.client_secret.is_some() {
            write!(f, ";ClientSecret=***")?;
        }
        if let Some(username) = &self.username {
            write!(f, ";Username={username}")?;
        }
        if self.password.is_some() {
            write!(f, ";Password=***")?;
        }
        if let Some(tenant_id) = &self.tenant_id {
            write!(f, ";TenantId={tenant_id}")?;
        }
        if let Some(authority) = &self.authority {
            write!(f, ";Authority={authority}")?;
        }
        Ok(())
    }
}

/// Parse the connection string held in a secret
pub fn parse_secret(raw: &SecretString) -> Result<ConnectionString, ConnectionError> {
    ConnectionString::parse(raw.expose_secret().as_str())
}

fn missing(key: &str) -> ConnectionError {
    ConnectionError::InvalidConnectionString(format!("{key} is required"))
}

// Splits on `;` outside quotes.
fn split_segments(raw: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in raw.chars() {
        match quote {
            Some(q) if ch == q => {
                quote = None;
                current.push(ch);
            }
            Some(_) => current.push(ch),
            None if ch == '\'' || ch == '"' => {
                quote = Some(ch);
                current.push(ch);
            }
            None if ch == ';' => segments.push(std::mem::take(&mut current)),
            None => current.push(ch),
        }
    }
    segments.push(current);
    segments
}

fn unquote(value: &str) -> String {
    for q in ['\'', '"'] {
        if value.len() >= 2 && value.starts_with(q) && value.ends_with(q) {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}

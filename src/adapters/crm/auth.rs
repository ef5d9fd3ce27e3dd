//! OAuth2 token acquisition for Dataverse
//!
//! The authority is taken from the connection string (`Authority`, then
//! `TenantId`) or discovered from the `WWW-Authenticate` challenge the Web
//! API returns for an anonymous request.

use super::connection::{AuthType, ConnectionString};
use crate::config::{secret_string, SecretString};
use crate::domain::ConnectionError;
use regex::Regex;
use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Azure AD login host used when only a tenant id is configured
pub const LOGIN_HOST: &str = "https://login.microsoftonline.com";

/// Tokens this close to expiry are refreshed before use
const EXPIRY_MARGIN: Duration = Duration::from_secs(120);

/// Bearer token with its expiry
#[derive(Debug)]
pub struct AccessToken {
    value: SecretString,
    expires_at: Option<Instant>,
}

impl AccessToken {
    /// Create a token that expires `expires_in` from now
    pub fn new(value: String, expires_in: Option<Duration>) -> Self {
        Self {
            value: secret_string(value),
            expires_at: expires_in.map(|d| Instant::now() + d),
        }
    }

    /// Whether the token should be refreshed before the next request
    pub fn is_expiring(&self) -> bool {
        self.expires_at
            .map_or(false, |at| Instant::now() + EXPIRY_MARGIN >= at)
    }

    /// `Authorization` header value
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.value.expose_secret().as_str())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Resolve the authority URL for a connection
///
/// # Errors
///
/// Returns an error if discovery is needed and the Web API does not answer
/// with a usable challenge.
pub async fn resolve_authority(
    client: &Client,
    connection: &ConnectionString,
) -> Result<String, ConnectionError> {
    if let Some(authority) = &connection.authority {
        return Ok(authority.trim_end_matches('/').to_string());
    }

    if let Some(tenant_id) = &connection.tenant_id {
        return Ok(format!("{LOGIN_HOST}/{tenant_id}"));
    }

    discover_authority(client, &connection.api_base()).await
}

async fn discover_authority(client: &Client, api_base: &str) -> Result<String, ConnectionError> {
    tracing::debug!(api_base = %api_base, "Discovering authority from Web API challenge");

    let response = client
        .get(format!("{api_base}/"))
        .header(AUTHORIZATION, "Bearer")
        .send()
        .await
        .map_err(|e| ConnectionError::Transport(e.to_string()))?;

    let challenge = response
        .headers()
        .get(WWW_AUTHENTICATE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            ConnectionError::Authentication(format!(
                "Web API returned {} without an authentication challenge; set TenantId or Authority",
                response.status()
            ))
        })?;

    parse_challenge_authority(challenge).ok_or_else(|| {
        ConnectionError::Authentication(format!(
            "Could not find authorization_uri in challenge '{challenge}'"
        ))
    })
}

/// Extract the authority from a `WWW-Authenticate: Bearer authorization_uri=...` header
pub fn parse_challenge_authority(challenge: &str) -> Option<String> {
    let re = Regex::new(r#"authorization_uri="?([^",\s]+)"?"#).ok()?;
    let uri = re.captures(challenge)?.get(1)?.as_str().trim_end_matches('/');

    let authority = uri
        .strip_suffix("/oauth2/authorize")
        .or_else(|| uri.strip_suffix("/oauth2/v2.0/authorize"))
        .unwrap_or(uri);

    Some(authority.to_string())
}

/// Acquire an access token for the organization
///
/// # Errors
///
/// Returns `ConnectionError::Transport` if the token endpoint cannot be
/// reached and `ConnectionError::Authentication` if it refuses the request.
pub async fn acquire_token(
    client: &Client,
    authority: &str,
    connection: &ConnectionString,
) -> Result<AccessToken, ConnectionError> {
    let token_url = format!("{authority}/oauth2/v2.0/token");

    let mut form: Vec<(&str, String)> = vec![
        ("client_id", connection.client_id.clone()),
        ("scope", connection.scope()),
    ];

    match connection.auth_type {
        AuthType::ClientSecret => {
            let secret = connection
                .client_secret
                .as_ref()
                .ok_or_else(|| ConnectionError::Authentication("ClientSecret not set".to_string()))?;
            form.push(("grant_type", "client_credentials".to_string()));
            form.push(("client_secret", secret.expose_secret().as_str().to_string()));
        }
        AuthType::OAuth => {
            let username = connection
                .username
                .clone()
                .ok_or_else(|| ConnectionError::Authentication("Username not set".to_string()))?;
            let password = connection
                .password
                .as_ref()
                .ok_or_else(|| ConnectionError::Authentication("Password not set".to_string()))?;
            form.push(("grant_type", "password".to_string()));
            form.push(("username", username));
            form.push(("password", password.expose_secret().as_str().to_string()));
        }
    }

    tracing::debug!(
        token_url = %token_url,
        auth_type = %connection.auth_type,
        "Requesting access token"
    );

    let response = client
        .post(&token_url)
        .form(&form)
        .send()
        .await
        .map_err(|e| ConnectionError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<TokenErrorResponse>(&body)
            .map(|e| match e.error_description {
                Some(description) => format!("{}: {}", e.error, description),
                None => e.error,
            })
            .unwrap_or(body);
        return Err(ConnectionError::Authentication(format!(
            "Token request failed with status {status}: {message}"
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| ConnectionError::Authentication(format!("Invalid token response: {e}")))?;

    Ok(AccessToken::new(
        token.access_token,
        token.expires_in.map(Duration::from_secs),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_challenge_authority() {
        let challenge = "Bearer authorization_uri=https://login.microsoftonline.com/0f1e2d3c/oauth2/authorize, resource_id=https://org.crm.dynamics.com/";
        assert_eq!(
            parse_challenge_authority(challenge).as_deref(),
            Some("https://login.microsoftonline.com/0f1e2d3c")
        );
    }

    #[test]
    fn test_parse_challenge_authority_quoted() {
        let challenge = r#"Bearer authorization_uri="https://login.microsoftonline.com/tid/oauth2/v2.0/authorize""#;
        assert_eq!(
            parse_challenge_authority(challenge).as_deref(),
            Some("https://login.microsoftonline.com/tid")
        );
    }

    #[test]
    fn test_parse_challenge_without_uri() {
        assert!(parse_challenge_authority("Bearer realm=\"dynamics\"").is_none());
    }

    #[test]
    fn test_access_token_expiry() {
        let fresh = AccessToken::new("t".to_string(), Some(Duration::from_secs(3600)));
        assert!(!fresh.is_expiring());

        let stale = AccessToken::new("t".to_string(), Some(Duration::from_secs(30)));
        assert!(stale.is_expiring());

        let unbounded = AccessToken::new("t".to_string(), None);
        assert!(!unbounded.is_expiring());
        assert_eq!(unbounded.header_value(), "Bearer t");
    }

    #[tokio::test]
    async fn test_resolve_authority_prefers_explicit() {
        let client = Client::new();
        let connection = ConnectionString::parse(
            "AuthType=ClientSecret;Url=https://org.crm.dynamics.com;ClientId=a;ClientSecret=b;TenantId=tid;Authority=https://login.example.com/custom/",
        )
        .unwrap();

        let authority = resolve_authority(&client, &connection).await.unwrap();
        assert_eq!(authority, "https://login.example.com/custom");
    }

    #[tokio::test]
    async fn test_resolve_authority_from_tenant() {
        let client = Client::new();
        let connection = ConnectionString::parse(
            "AuthType=ClientSecret;Url=https://org.crm.dynamics.com;ClientId=a;ClientSecret=b;TenantId=tid",
        )
        .unwrap();

        let authority = resolve_authority(&client, &connection).await.unwrap();
        assert_eq!(authority, "https://login.microsoftonline.com/tid");
    }
}

use std::collections::HashMap;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use turnstile_core::ValueMap;
use crate::services::{FederatedIdentity, IdentityProviderClient, ServiceError};

/// OAuth2 endpoints and client credentials for one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdpEndpoint {
    /// Authorization endpoint the user agent visits
    pub authorize_url: String,
    /// Token endpoint
    pub token_url: String,
    /// Userinfo endpoint
    pub userinfo_url: String,
    /// OAuth2 client ID
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Callback registered with the provider
    pub redirect_uri: String,
    /// Requested scopes
    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_scope() -> String {
    "openid email profile".to_string()
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Authorization-code client over plain HTTP
#[derive(Debug, Clone)]
pub struct HttpIdentityProviderClient {
    client: Client,
    providers: HashMap<String, IdpEndpoint>,
}

impl HttpIdentityProviderClient {
    /// Create a client for the given providers, keyed by IdP name
    pub fn new(providers: HashMap<String, IdpEndpoint>) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self { client, providers })
    }

    fn endpoint(&self, idp_name: &str) -> Result<&IdpEndpoint, ServiceError> {
        self.providers
            .get(idp_name)
            .ok_or_else(|| ServiceError::Misconfigured(format!("unknown identity provider '{}'", idp_name)))
    }
}

#[async_trait]
impl IdentityProviderClient for HttpIdentityProviderClient {
    fn authorization_url(&self, idp_name: &str, state: &str) -> Result<String, ServiceError> {
        let endpoint = self.endpoint(idp_name)?;
        let url = Url::parse_with_params(
            &endpoint.authorize_url,
            &[
                ("response_type", "code"),
                ("client_id", endpoint.client_id.as_str()),
                ("redirect_uri", endpoint.redirect_uri.as_str()),
                ("scope", endpoint.scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| ServiceError::Misconfigured(format!("bad authorize URL for '{}': {}", idp_name, e)))?;
        Ok(url.to_string())
    }

    async fn exchange_code(&self, idp_name: &str, code: &str) -> Result<FederatedIdentity, ServiceError> {
        let endpoint = self.endpoint(idp_name)?;

        let response = self
            .client
            .post(&endpoint.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", endpoint.redirect_uri.as_str()),
                ("client_id", endpoint.client_id.as_str()),
                ("client_secret", endpoint.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Rejected(body));
        }
        if !status.is_success() {
            return Err(ServiceError::Unavailable(format!(
                "token endpoint returned {}",
                status
            )));
        }
        let token: TokenResponse = response.json().await?;
        debug!(idp = idp_name, "Exchanged authorization code");

        let response = self
            .client
            .get(&endpoint.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ServiceError::Unavailable(format!(
                "userinfo endpoint returned {}",
                response.status()
            )));
        }

        let mut claims: ValueMap = response.json().await?;
        let subject = match claims.remove("sub") {
            Some(Value::String(sub)) if !sub.is_empty() => sub,
            _ => return Err(ServiceError::Unavailable("userinfo response has no subject".to_string())),
        };
        let email = claims.get("email").and_then(Value::as_str).map(str::to_string);

        Ok(FederatedIdentity {
            subject,
            email,
            claims,
        })
    }
}

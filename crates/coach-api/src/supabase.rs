//! # Supabase Account Backends
//!
//! Account resolution through Supabase Auth and customer links in the
//! `stripe_customers` table through PostgREST. Rows with a `deleted_at`
//! timestamp are ignored.

use async_trait::async_trait;
use coach_core::{Account, AccountResolver, CustomerStore, PaymentError, PaymentResult};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const CUSTOMERS_TABLE: &str = "/rest/v1/stripe_customers";

/// Supabase project settings
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL (https://<ref>.supabase.co)
    pub url: String,
    /// Service-role key; bypasses row-level security
    pub service_role_key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, service_role_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            service_role_key: service_role_key.into(),
        }
    }

    /// `SUPABASE_URL` and `SUPABASE_SERVICE_ROLE_KEY`, if both are set
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("SUPABASE_URL").ok().filter(|v| !v.is_empty())?;
        let key = std::env::var("SUPABASE_SERVICE_ROLE_KEY")
            .ok()
            .filter(|v| !v.is_empty())?;
        Some(Self::new(url, key))
    }
}

/// Shared HTTP client for the Supabase APIs
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    config: SupabaseConfig,
    http: Client,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> PaymentResult<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self { config, http })
    }

    pub fn base_url(&self) -> &str {
        &self.config.url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.url, path)
    }

    fn service_auth(&self) -> String {
        format!("Bearer {}", self.config.service_role_key)
    }
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Resolves bearer tokens with `GET /auth/v1/user`
#[derive(Debug, Clone)]
pub struct SupabaseAccounts {
    client: SupabaseClient,
}

impl SupabaseAccounts {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AccountResolver for SupabaseAccounts {
    #[instrument(skip_all)]
    async fn resolve(&self, token: &str) -> PaymentResult<Option<Account>> {
        let response = self
            .client
            .http
            .get(self.client.url("/auth/v1/user"))
            .header("apikey", &self.client.config.service_role_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        // The public anon key and expired sessions land here
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            debug!("Bearer token does not belong to a user");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::AccountLookup(format!("HTTP {}: {}", status, body)));
        }

        let user: AuthUser = response
            .json()
            .await
            .map_err(|e| PaymentError::Serialization(format!("Failed to parse user: {}", e)))?;

        Ok(Some(Account {
            id: user.id,
            email: user.email,
        }))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CustomerRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    customer_id: String,
}

/// Customer links in the `stripe_customers` table
#[derive(Debug, Clone)]
pub struct SupabaseCustomerStore {
    client: SupabaseClient,
}

impl SupabaseCustomerStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CustomerStore for SupabaseCustomerStore {
    #[instrument(skip(self))]
    async fn customer_id(&self, account_id: &str) -> PaymentResult<Option<String>> {
        let user_filter = format!("eq.{}", account_id);
        let response = self
            .client
            .http
            .get(self.client.url(CUSTOMERS_TABLE))
            .header("apikey", &self.client.config.service_role_key)
            .header("Authorization", self.client.service_auth())
            .query(&[
                ("select", "customer_id"),
                ("user_id", user_filter.as_str()),
                ("deleted_at", "is.null"),
                ("limit", "1"),
            ])
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Storage(format!("HTTP {}: {}", status, body)));
        }

        let rows: Vec<CustomerRow> = response
            .json()
            .await
            .map_err(|e| PaymentError::Serialization(format!("Failed to parse rows: {}", e)))?;

        Ok(rows.into_iter().next().map(|row| row.customer_id))
    }

    #[instrument(skip(self))]
    async fn save_customer_id(&self, account_id: &str, customer_id: &str) -> PaymentResult<()> {
        let row = CustomerRow {
            user_id: Some(account_id.to_string()),
            customer_id: customer_id.to_string(),
        };

        let response = self
            .client
            .http
            .post(self.client.url(CUSTOMERS_TABLE))
            .header("apikey", &self.client.config.service_role_key)
            .header("Authorization", self.client.service_auth())
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Storage(format!("HTTP {}: {}", status, body)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(SupabaseConfig::new(server.uri(), "service_key")).unwrap()
    }

    #[test]
    fn test_config_trims_url() {
        let config = SupabaseConfig::new("https://abc.supabase.co/", "key");
        assert_eq!(config.url, "https://abc.supabase.co");
    }

    #[tokio::test]
    async fn test_resolve_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("Authorization", "Bearer user_jwt"))
            .and(header("apikey", "service_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "7b6f0c1e",
                "email": "client@coach.example",
                "role": "authenticated"
            })))
            .mount(&server)
            .await;

        let accounts = SupabaseAccounts::new(client(&server));
        let account = accounts.resolve("user_jwt").await.unwrap().unwrap();

        assert_eq!(account.id, "7b6f0c1e");
        assert_eq!(account.email.as_deref(), Some("client@coach.example"));
    }

    #[tokio::test]
    async fn test_unknown_token_is_no_account() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"msg": "invalid JWT"})))
            .mount(&server)
            .await;

        let accounts = SupabaseAccounts::new(client(&server));
        assert!(accounts.resolve("anon_key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_customer_lookup_and_insert() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CUSTOMERS_TABLE))
            .and(query_param("user_id", "eq.user_1"))
            .and(query_param("deleted_at", "is.null"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"customer_id": "cus_1"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(CUSTOMERS_TABLE))
            .and(query_param("user_id", "eq.user_2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(CUSTOMERS_TABLE))
            .and(body_json(json!({"user_id": "user_2", "customer_id": "cus_2"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let store = SupabaseCustomerStore::new(client(&server));
        assert_eq!(store.customer_id("user_1").await.unwrap().as_deref(), Some("cus_1"));
        assert!(store.customer_id("user_2").await.unwrap().is_none());
        store.save_customer_id("user_2", "cus_2").await.unwrap();
    }

    #[tokio::test]
    async fn test_storage_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CUSTOMERS_TABLE))
            .respond_with(ResponseTemplate::new(409).set_body_string("duplicate key"))
            .mount(&server)
            .await;

        let store = SupabaseCustomerStore::new(client(&server));
        let err = store.save_customer_id("user_1", "cus_1").await.unwrap_err();
        assert!(matches!(err, PaymentError::Storage(_)));
    }
}

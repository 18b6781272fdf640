//! # Accounts and Customer Mapping
//!
//! A bearer credential may identify a known account. Each account can be
//! linked to one provider customer; the link is kept in a `CustomerStore`.
//!
//! Lookup-then-insert is not locked. Two first-time checkouts racing for the
//! same account may both create a provider customer; the later write wins.

use crate::error::{PaymentError, PaymentResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A signed-in account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Account {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }

    /// Builder: set email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Resolves a bearer token to an account.
///
/// `Ok(None)` means the token is well-formed but names nobody.
#[async_trait]
pub trait AccountResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> PaymentResult<Option<Account>>;
}

/// Resolver for deployments without accounts: everyone is a guest
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAccounts;

#[async_trait]
impl AccountResolver for NoAccounts {
    async fn resolve(&self, _token: &str) -> PaymentResult<Option<Account>> {
        Ok(None)
    }
}

/// Fixed token → account table (local development and tests)
#[derive(Debug, Clone, Default)]
pub struct StaticAccounts {
    accounts: HashMap<String, Account>,
}

impl StaticAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register a token
    pub fn with_token(mut self, token: impl Into<String>, account: Account) -> Self {
        self.accounts.insert(token.into(), account);
        self
    }
}

#[async_trait]
impl AccountResolver for StaticAccounts {
    async fn resolve(&self, token: &str) -> PaymentResult<Option<Account>> {
        Ok(self.accounts.get(token).cloned())
    }
}

/// Persistence for account → provider customer links
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Get the provider customer linked to an account
    async fn customer_id(&self, account_id: &str) -> PaymentResult<Option<String>>;

    /// Link an account to a provider customer
    async fn save_customer_id(&self, account_id: &str, customer_id: &str) -> PaymentResult<()>;
}

/// In-memory customer store.
///
/// Wraps data in Arc for cheap cloning.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustomerStore {
    links: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: seed a link
    pub fn with_link(self, account_id: impl Into<String>, customer_id: impl Into<String>) -> Self {
        if let Ok(mut links) = self.links.write() {
            links.insert(account_id.into(), customer_id.into());
        }
        self
    }

    pub fn len(&self) -> usize {
        self.links.read().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn customer_id(&self, account_id: &str) -> PaymentResult<Option<String>> {
        let links = self
            .links
            .read()
            .map_err(|_| PaymentError::Storage("customer links lock poisoned".to_string()))?;
        Ok(links.get(account_id).cloned())
    }

    async fn save_customer_id(&self, account_id: &str, customer_id: &str) -> PaymentResult<()> {
        let mut links = self
            .links
            .write()
            .map_err(|_| PaymentError::Storage("customer links lock poisoned".to_string()))?;
        links.insert(account_id.to_string(), customer_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryCustomerStore::new();
        assert!(store.customer_id("user_1").await.unwrap().is_none());

        store.save_customer_id("user_1", "cus_1").await.unwrap();
        assert_eq!(
            store.customer_id("user_1").await.unwrap().as_deref(),
            Some("cus_1")
        );

        // clones share the same links
        let clone = store.clone();
        clone.save_customer_id("user_2", "cus_2").await.unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_static_accounts() {
        let accounts = StaticAccounts::new()
            .with_token("tok_1", Account::new("user_1").with_email("a@coach.example"));

        let account = accounts.resolve("tok_1").await.unwrap().unwrap();
        assert_eq!(account.id, "user_1");
        assert!(accounts.resolve("tok_2").await.unwrap().is_none());
        assert!(NoAccounts.resolve("tok_1").await.unwrap().is_none());
    }
}

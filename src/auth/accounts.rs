use crate::core::{AuthFailure, FilmError, Result};
use crate::storage::DocumentStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Manager account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    pub email: String,
    #[serde(rename = "password")]
    password_hash: String,
    #[serde(rename = "super", default)]
    pub is_super: bool,
}

impl Account {
    /// Returns the password hash (internal use only)
    pub(crate) fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

/// Registration and login over the persisted account list
pub struct AccountStore {
    accounts: RwLock<Vec<Account>>,
    documents: Arc<dyn DocumentStore<Vec<Account>>>,
    bcrypt_cost: u32,
}

impl AccountStore {
    /// Loads accounts from `documents`. A missing or unreadable document
    /// starts an empty list.
    pub async fn open(documents: Arc<dyn DocumentStore<Vec<Account>>>, bcrypt_cost: u32) -> Self {
        let accounts = match documents.load().await {
            Ok(accounts) => accounts.unwrap_or_default(),
            Err(err) => {
                error!(error = %err, "failed to read accounts, starting with none");
                Vec::new()
            }
        };
        info!(accounts = accounts.len(), "accounts loaded");

        Self {
            accounts: RwLock::new(accounts),
            documents,
            bcrypt_cost,
        }
    }

    /// Hashes a password using bcrypt on the blocking pool
    async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await?
            .map_err(|err| FilmError::Internal(format!("Failed to hash password: {err}")))
    }

    /// Verifies password against bcrypt hash
    ///
    /// A malformed hash counts as a mismatch.
    async fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        Ok(
            tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
                .await?,
        )
    }

    /// Creates a new account
    pub async fn register(&self, email: &str, password: &str) -> Result<Account> {
        let email = email.trim();
        Self::validate_credentials(email, password)?;

        if self.email_taken(email).await {
            return Err(FilmError::validation("Email already exists"));
        }

        let password_hash = self.hash_password(password).await?;

        let mut accounts = self.accounts.write().await;

        // Re-check under the write lock, another registration may have won.
        if accounts.iter().any(|account| account.email == email) {
            return Err(FilmError::validation("Email already exists"));
        }

        let account = Account {
            id: accounts.last().map_or(1, |last| last.id + 1),
            email: email.to_string(),
            password_hash,
            is_super: false,
        };

        let mut working = accounts.clone();
        working.push(account.clone());
        if let Err(err) = self.documents.save(&working).await {
            error!(error = %err, "failed to persist accounts");
            return Err(err);
        }
        *accounts = working;

        info!(id = account.id, "account registered");
        Ok(account)
    }

    /// Authenticates an account
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account> {
        let account = self
            .find_by_email(email.trim())
            .await
            .ok_or(FilmError::Auth(AuthFailure::InvalidCredentials))?;

        if !Self::verify_password(password, account.password_hash()).await? {
            return Err(FilmError::Auth(AuthFailure::InvalidCredentials));
        }

        Ok(account)
    }

    pub async fn find_by_email(&self, email: &str) -> Option<Account> {
        self.accounts
            .read()
            .await
            .iter()
            .find(|account| account.email == email)
            .cloned()
    }

    async fn email_taken(&self, email: &str) -> bool {
        self.find_by_email(email).await.is_some()
    }

    /// Returns the number of accounts
    pub async fn count(&self) -> usize {
        self.accounts.read().await.len()
    }

    fn validate_credentials(email: &str, password: &str) -> Result<()> {
        if email.is_empty() || password.is_empty() {
            return Err(FilmError::validation("Email and password are required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryDocumentStore;

    const TEST_COST: u32 = 4;

    async fn store() -> (AccountStore, Arc<MemoryDocumentStore<Vec<Account>>>) {
        let documents = Arc::new(MemoryDocumentStore::<Vec<Account>>::new());
        let store = AccountStore::open(documents.clone(), TEST_COST).await;
        (store, documents)
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let (accounts, documents) = store().await;

        let account = accounts.register("alice@example.com", "secret").await.unwrap();
        assert_eq!(account.id, 1);
        assert!(!account.is_super);
        assert_ne!(account.password_hash(), "secret");

        let logged_in = accounts
            .authenticate("alice@example.com", "secret")
            .await
            .unwrap();
        assert_eq!(logged_in.id, 1);
        assert_eq!(documents.snapshot().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ids_follow_last_account() {
        let (accounts, _) = store().await;
        accounts.register("a@example.com", "pw").await.unwrap();
        let second = accounts.register("b@example.com", "pw").await.unwrap();
        assert_eq!(second.id, 2);
        assert_eq!(accounts.count().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let (accounts, _) = store().await;
        accounts.register("bob@example.com", "pw1").await.unwrap();

        let result = accounts.register("bob@example.com", "pw2").await;
        assert!(matches!(result, Err(FilmError::Validation(msg)) if msg == "Email already exists"));
    }

    #[tokio::test]
    async fn test_invalid_credentials() {
        let (accounts, _) = store().await;
        accounts.register("carol@example.com", "right").await.unwrap();

        assert!(matches!(
            accounts.authenticate("carol@example.com", "wrong").await,
            Err(FilmError::Auth(AuthFailure::InvalidCredentials))
        ));
        assert!(matches!(
            accounts.authenticate("nobody@example.com", "right").await,
            Err(FilmError::Auth(AuthFailure::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_empty_credentials_rejected() {
        let (accounts, _) = store().await;
        assert!(accounts.register("", "pw").await.is_err());
        assert!(accounts.register("dan@example.com", "").await.is_err());
        assert_eq!(accounts.count().await, 0);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_memory_unchanged() {
        let (accounts, documents) = store().await;
        documents.set_fail_writes(true);

        assert!(accounts.register("eve@example.com", "pw").await.is_err());
        assert_eq!(accounts.count().await, 0);
    }

    #[test]
    fn test_account_document_shape() {
        let account = Account {
            id: 3,
            email: "x@example.com".to_string(),
            password_hash: "$2b$hash".to_string(),
            is_super: true,
        };
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["password"], "$2b$hash");
        assert_eq!(json["super"], true);
    }
}

//! User repository for document store operations.

use dyf_core::{Email, Rut, UserId};

use super::{DocumentStore, Filter, RepositoryError, USERS, decode};
use crate::models::{User, UserPatch};
use crate::password::verify_password;

/// Repository for user accounts.
pub struct UserRepository<'a> {
    store: &'a DocumentStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// Store a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the id, email or RUT is taken.
    pub async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        let data = serde_json::to_value(user)?;
        self.store
            .insert(USERS, &user.id.to_string(), &data)
            .await
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored document is invalid.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.store
            .get(USERS, &id.to_string())
            .await?
            .map(decode)
            .transpose()
    }

    /// Get a user by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored document is invalid.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        self.find_one(&Filter::eq("email", email.as_str())).await
    }

    /// Get a user by RUT.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored document is invalid.
    pub async fn find_by_rut(&self, rut: &Rut) -> Result<Option<User>, RepositoryError> {
        self.find_one(&Filter::eq("rut", rut.as_str())).await
    }

    /// Get the user with this email whose password matches `password`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_credentials(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .find_by_email(email)
            .await?
            .filter(|user| verify_password(password, &user.password_hash).is_ok()))
    }

    /// Whether an account uses this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_registered(&self, email: &Email) -> Result<bool, RepositoryError> {
        Ok(!self
            .store
            .find(USERS, &Filter::eq("email", email.as_str()))
            .await?
            .is_empty())
    }

    /// Whether an account uses this RUT.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn rut_registered(&self, rut: &Rut) -> Result<bool, RepositoryError> {
        Ok(!self
            .store
            .find(USERS, &Filter::eq("rut", rut.as_str()))
            .await?
            .is_empty())
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let patch = UserPatch {
            password_hash: Some(password_hash.to_owned()),
            ..UserPatch::default()
        };
        self.update(id, &patch).await
    }

    /// Apply a partial update to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Conflict` if the new RUT belongs to another account.
    pub async fn update(&self, id: UserId, patch: &UserPatch) -> Result<(), RepositoryError> {
        let data = serde_json::to_value(patch)?;
        self.store.update(USERS, &id.to_string(), &data).await
    }

    /// Apply a partial update to the user with this email and return the
    /// updated user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this email.
    /// Returns `RepositoryError::Conflict` if the new RUT belongs to another account.
    pub async fn update_by_email(
        &self,
        email: &Email,
        patch: &UserPatch,
    ) -> Result<User, RepositoryError> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        self.update(user.id, patch).await?;
        self.get(user.id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<User>, RepositoryError> {
        self.store
            .find(USERS, filter)
            .await?
            .into_iter()
            .next()
            .map(decode)
            .transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dyf_core::Role;

    use super::*;
    use crate::password::hash_password;

    fn user(email: &str, rut: &str) -> User {
        User {
            id: UserId::generate(),
            rut: Rut::parse(rut).unwrap(),
            name: "Ana".to_string(),
            email: Email::parse(email).unwrap(),
            password_hash: hash_password("Qwerty123$").unwrap(),
            phone: "912345678".to_string(),
            shipping_address: "Av. Siempre Viva 742".to_string(),
            role: Role::Customer,
        }
    }

    #[tokio::test]
    async fn test_lookups() {
        let store = DocumentStore::memory();
        let users = UserRepository::new(&store);
        let ana = user("ana@dyf.cl", "11111111-1");
        users.create(&ana).await.unwrap();

        assert_eq!(users.get(ana.id).await.unwrap(), Some(ana.clone()));
        assert_eq!(
            users.find_by_email(&ana.email).await.unwrap(),
            Some(ana.clone())
        );
        assert_eq!(users.find_by_rut(&ana.rut).await.unwrap(), Some(ana.clone()));
        assert!(users.email_registered(&ana.email).await.unwrap());
        assert!(
            !users
                .rut_registered(&Rut::parse("12345678-5").unwrap())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_find_by_credentials() {
        let store = DocumentStore::memory();
        let users = UserRepository::new(&store);
        let ana = user("ana@dyf.cl", "11111111-1");
        users.create(&ana).await.unwrap();

        assert!(
            users
                .find_by_credentials(&ana.email, "Qwerty123$")
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            users
                .find_by_credentials(&ana.email, "wrong")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = DocumentStore::memory();
        let users = UserRepository::new(&store);
        users.create(&user("ana@dyf.cl", "11111111-1")).await.unwrap();

        let err = users
            .create(&user("ana@dyf.cl", "12345678-5"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_by_email_and_password() {
        let store = DocumentStore::memory();
        let users = UserRepository::new(&store);
        let ana = user("ana@dyf.cl", "11111111-1");
        users.create(&ana).await.unwrap();

        let patch = UserPatch {
            phone: Some("987654321".to_string()),
            ..UserPatch::default()
        };
        let updated = users.update_by_email(&ana.email, &patch).await.unwrap();
        assert_eq!(updated.phone, "987654321");
        assert_eq!(updated.name, "Ana");

        users.update_password(ana.id, "new-hash").await.unwrap();
        let stored = users.get(ana.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "new-hash");

        let missing = users
            .update_by_email(&Email::parse("nadie@dyf.cl").unwrap(), &patch)
            .await;
        assert!(matches!(missing, Err(RepositoryError::NotFound)));
    }
}

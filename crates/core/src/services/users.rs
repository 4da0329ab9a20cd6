//! User account service.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::{DomainError, DomainResult, StorageError};
use crate::metrics::record_user_registered;
use crate::models::{
    NewUser, NewUserMetadata, RegisterUser, User, UserMetadata, UserMetadataUpdate,
};
use crate::ports::{PasswordHasher, Repositories};

/// Business logic for user accounts.
///
/// All collaborators are injected explicitly; the service never resolves
/// repositories from global state. Registration is the one write path
/// with a cross-table side effect (the metadata row), performed atomically
/// by the repository layer.
pub struct UserService {
    repositories: Arc<dyn Repositories>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(repositories: Arc<dyn Repositories>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            repositories,
            hasher,
        }
    }

    /// Register a new account with its profile metadata.
    ///
    /// The metadata row is seeded from the caller-supplied profile fields
    /// and inserted in the same transaction as the user row.
    #[instrument(skip_all, fields(email = %input.email))]
    pub async fn register(&self, input: RegisterUser) -> DomainResult<(User, UserMetadata)> {
        if !input.email.contains('@') {
            return Err(DomainError::ValidationError(format!(
                "'{}' is not an email address",
                input.email
            )));
        }
        if input.password.is_empty() {
            return Err(DomainError::ValidationError(
                "password cannot be empty".to_string(),
            ));
        }

        let password_hash = self.hasher.hash(&input.password)?;

        let user = NewUser {
            email: input.email.clone(),
            password_hash,
            role: input.role,
        };
        let metadata = NewUserMetadata {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email.clone(),
            country: input.country,
            postal_code: input.postal_code,
            address: input.address,
            phone: input.phone,
            signup_id: input.signup_id,
            unit_no: input.unit_no,
            state_province: input.state_province,
        };

        let result = self
            .repositories
            .create_user_with_metadata(user, metadata)
            .await;

        match result {
            Ok((user, metadata)) => {
                record_user_registered();
                debug!(user_id = user.id, "User registered");
                Ok((user, metadata))
            }
            Err(StorageError::ConstraintViolation(_)) => Err(DomainError::EmailTaken(input.email)),
            Err(e) => Err(e.into()),
        }
    }

    /// Check a plain-text password candidate against the stored hash.
    pub async fn check_password(&self, user_id: i64, candidate: &str) -> DomainResult<bool> {
        let hash = self
            .repositories
            .users()
            .get_password_hash(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;

        self.hasher.verify(candidate, &hash)
    }

    /// Update the profile metadata of an existing user.
    pub async fn update_profile(
        &self,
        user_id: i64,
        update: UserMetadataUpdate,
    ) -> DomainResult<UserMetadata> {
        self.repositories
            .metadata()
            .update_metadata(user_id, update)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))
    }

    /// Mark a user's email address as verified.
    pub async fn verify_user(&self, user_id: i64) -> DomainResult<User> {
        let update = crate::models::UserUpdate {
            verified: Some(true),
            ..Default::default()
        };
        self.repositories
            .users()
            .update_user(user_id, update)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))
    }

    /// Delete an account. Metadata rows are removed in the same statement
    /// through the cascading foreign key.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, user_id: i64) -> DomainResult<()> {
        let removed = self.repositories.users().delete_user(user_id).await?;
        if !removed {
            return Err(DomainError::UserNotFound(user_id));
        }
        debug!(user_id, "Account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use crate::error::{PaginationResult, StorageResult};
    use crate::models::{UserRole, UserUpdate};
    use crate::pagination::{Connection, CursorArgs, Page, PageArgs};
    use crate::ports::{
        OrderDirection, UserFilter, UserMetadataRepository, UserRepository,
    };

    /// Fake in-memory repositories, just enough for the service paths.
    #[derive(Default)]
    struct FakeRepos {
        state: Mutex<FakeState>,
    }

    #[derive(Default)]
    struct FakeState {
        users: Vec<(User, String)>,
        metadata: Vec<UserMetadata>,
        next_id: i64,
    }

    fn make_user(id: i64, email: &str) -> User {
        User {
            id,
            email: email.to_string(),
            role: UserRole::Client,
            verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[async_trait]
    impl UserRepository for FakeRepos {
        async fn create_user(&self, _user: NewUser) -> StorageResult<User> {
            unimplemented!("not used by the service")
        }

        async fn get_user(&self, id: i64) -> StorageResult<Option<User>> {
            let state = self.state.lock().unwrap();
            Ok(state.users.iter().find(|(u, _)| u.id == id).map(|(u, _)| u.clone()))
        }

        async fn get_user_by_email(&self, email: &str) -> StorageResult<Option<User>> {
            let state = self.state.lock().unwrap();
            Ok(state
                .users
                .iter()
                .find(|(u, _)| u.email == email)
                .map(|(u, _)| u.clone()))
        }

        async fn get_password_hash(&self, id: i64) -> StorageResult<Option<String>> {
            let state = self.state.lock().unwrap();
            Ok(state
                .users
                .iter()
                .find(|(u, _)| u.id == id)
                .map(|(_, h)| h.clone()))
        }

        async fn list_users(
            &self,
            _filter: UserFilter,
            _args: CursorArgs,
            _order: OrderDirection,
        ) -> PaginationResult<Connection<User>> {
            unimplemented!("not used by the service")
        }

        async fn paginate_users(
            &self,
            _filter: UserFilter,
            _args: PageArgs,
        ) -> PaginationResult<Page<User>> {
            unimplemented!("not used by the service")
        }

        async fn count_users(&self) -> StorageResult<u64> {
            Ok(self.state.lock().unwrap().users.len() as u64)
        }

        async fn update_user(&self, id: i64, update: UserUpdate) -> StorageResult<Option<User>> {
            let mut state = self.state.lock().unwrap();
            Ok(state.users.iter_mut().find(|(u, _)| u.id == id).map(|(u, _)| {
                if let Some(verified) = update.verified {
                    u.verified = verified;
                }
                if let Some(email) = update.email.clone() {
                    u.email = email;
                }
                if let Some(role) = update.role {
                    u.role = role;
                }
                u.clone()
            }))
        }

        async fn delete_user(&self, id: i64) -> StorageResult<bool> {
            let mut state = self.state.lock().unwrap();
            let before = state.users.len();
            state.users.retain(|(u, _)| u.id != id);
            state.metadata.retain(|m| m.user_id != id);
            Ok(state.users.len() < before)
        }
    }

    #[async_trait]
    impl UserMetadataRepository for FakeRepos {
        async fn create_metadata(
            &self,
            _user_id: i64,
            _metadata: NewUserMetadata,
        ) -> StorageResult<UserMetadata> {
            unimplemented!("not used by the service")
        }

        async fn get_metadata_for_user(&self, user_id: i64) -> StorageResult<Option<UserMetadata>> {
            let state = self.state.lock().unwrap();
            Ok(state.metadata.iter().find(|m| m.user_id == user_id).cloned())
        }

        async fn list_metadata(
            &self,
            _args: CursorArgs,
        ) -> PaginationResult<Connection<UserMetadata>> {
            unimplemented!("not used by the service")
        }

        async fn count_metadata(&self) -> StorageResult<u64> {
            Ok(self.state.lock().unwrap().metadata.len() as u64)
        }

        async fn update_metadata(
            &self,
            user_id: i64,
            update: UserMetadataUpdate,
        ) -> StorageResult<Option<UserMetadata>> {
            let mut state = self.state.lock().unwrap();
            Ok(state
                .metadata
                .iter_mut()
                .find(|m| m.user_id == user_id)
                .map(|m| {
                    if let Some(first_name) = update.first_name.clone() {
                        m.first_name = first_name;
                    }
                    if let Some(country) = update.country.clone() {
                        m.country = country;
                    }
                    m.clone()
                }))
        }

        async fn delete_metadata_for_user(&self, user_id: i64) -> StorageResult<bool> {
            let mut state = self.state.lock().unwrap();
            let before = state.metadata.len();
            state.metadata.retain(|m| m.user_id != user_id);
            Ok(state.metadata.len() < before)
        }
    }

    #[async_trait]
    impl Repositories for FakeRepos {
        fn users(&self) -> &dyn UserRepository {
            self
        }

        fn metadata(&self) -> &dyn UserMetadataRepository {
            self
        }

        async fn create_user_with_metadata(
            &self,
            user: NewUser,
            metadata: NewUserMetadata,
        ) -> StorageResult<(User, UserMetadata)> {
            let mut state = self.state.lock().unwrap();
            if state.users.iter().any(|(u, _)| u.email == user.email) {
                return Err(StorageError::ConstraintViolation(
                    "users_email_key".into(),
                ));
            }
            state.next_id += 1;
            let id = state.next_id;
            let created = make_user(id, &user.email);
            let row = UserMetadata {
                id,
                user_id: id,
                first_name: metadata.first_name,
                last_name: metadata.last_name,
                email: metadata.email,
                country: metadata.country,
                postal_code: metadata.postal_code,
                address: metadata.address,
                phone: metadata.phone,
                signup_id: metadata.signup_id,
                unit_no: metadata.unit_no,
                state_province: metadata.state_province,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            state.users.push((created.clone(), user.password_hash));
            state.metadata.push(row.clone());
            Ok((created, row))
        }
    }

    /// Reversible toy hasher; real hashing lives behind the port.
    struct FakeHasher;

    impl PasswordHasher for FakeHasher {
        fn hash(&self, plain: &str) -> DomainResult<String> {
            Ok(format!("hashed:{plain}"))
        }

        fn verify(&self, plain: &str, hash: &str) -> DomainResult<bool> {
            Ok(hash == format!("hashed:{plain}"))
        }
    }

    fn service() -> (UserService, Arc<FakeRepos>) {
        let repos = Arc::new(FakeRepos::default());
        let svc = UserService::new(repos.clone(), Arc::new(FakeHasher));
        (svc, repos)
    }

    fn register_input(email: &str) -> RegisterUser {
        RegisterUser {
            email: email.to_string(),
            password: "hunter2".into(),
            role: UserRole::Client,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            country: "UK".into(),
            postal_code: "SW1".into(),
            address: "1 Analytical Row".into(),
            phone: None,
            signup_id: None,
            unit_no: None,
            state_province: None,
        }
    }

    // Test critique: l'inscription crée l'utilisateur ET ses métadonnées,
    // avec les vraies valeurs du profil (pas de valeurs de remplissage)
    #[tokio::test]
    async fn test_register_creates_user_and_metadata() {
        let (svc, repos) = service();
        let (user, metadata) = svc.register(register_input("ada@example.com")).await.unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(metadata.user_id, user.id);
        assert_eq!(metadata.first_name, "Ada");
        assert_eq!(metadata.email, "ada@example.com");

        let stored = repos.get_metadata_for_user(user.id).await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let (svc, repos) = service();

        let mut input = register_input("not-an-address");
        let err = svc.register(input).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));

        input = register_input("ada@example.com");
        input.password = String::new();
        let err = svc.register(input).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));

        // Rien n'a été inséré
        assert_eq!(repos.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_domain_error() {
        let (svc, _) = service();
        svc.register(register_input("ada@example.com")).await.unwrap();

        let err = svc
            .register(register_input("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EmailTaken(email) if email == "ada@example.com"));
    }

    #[tokio::test]
    async fn test_check_password() {
        let (svc, _) = service();
        let (user, _) = svc.register(register_input("ada@example.com")).await.unwrap();

        assert!(svc.check_password(user.id, "hunter2").await.unwrap());
        assert!(!svc.check_password(user.id, "wrong").await.unwrap());

        let err = svc.check_password(999, "hunter2").await.unwrap_err();
        assert!(matches!(err, DomainError::UserNotFound(999)));
    }

    #[tokio::test]
    async fn test_verify_and_delete() {
        let (svc, repos) = service();
        let (user, _) = svc.register(register_input("ada@example.com")).await.unwrap();
        assert!(!user.verified);

        let verified = svc.verify_user(user.id).await.unwrap();
        assert!(verified.verified);

        svc.delete_account(user.id).await.unwrap();
        assert_eq!(repos.count_users().await.unwrap(), 0);
        assert_eq!(repos.count_metadata().await.unwrap(), 0);

        let err = svc.delete_account(user.id).await.unwrap_err();
        assert!(matches!(err, DomainError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let (svc, _) = service();
        let (user, _) = svc.register(register_input("ada@example.com")).await.unwrap();

        let update = UserMetadataUpdate {
            country: Some("FR".into()),
            ..Default::default()
        };
        let updated = svc.update_profile(user.id, update).await.unwrap();
        assert_eq!(updated.country, "FR");
    }
}

//! User management service

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::{
    DomainError, DomainResult, RepositoryProvider, User, UserFilter, UserRole,
};
use crate::shared::types::{PaginatedResult, PaginationParams};

/// Request to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub role: UserRole,
}

/// Patch for an existing user. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

pub struct UserService {
    repos: Arc<dyn RepositoryProvider>,
}

impl UserService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn create(&self, request: NewUser) -> DomainResult<User> {
        let email = request.email.trim().to_lowercase();
        if self.repos.users().find_by_email(&email).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "user with email {} already exists",
                email
            )));
        }

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| DomainError::Storage(format!("password hashing failed: {}", e)))?;

        let user = User::new(
            email,
            request.first_name,
            request.last_name,
            password_hash,
            request.role,
        );
        let user = self.repos.users().insert(user).await?;
        info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<User> {
        self.repos
            .users()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: id.to_string(),
            })
    }

    pub async fn update(&self, id: Uuid, patch: UserPatch) -> DomainResult<User> {
        let mut user = self.get(id).await?;
        if let Some(first_name) = patch.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            user.last_name = last_name;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(is_active) = patch.is_active {
            user.is_active = is_active;
        }
        user.updated_at = chrono::Utc::now();
        self.repos.users().update(user.clone()).await?;
        Ok(user)
    }

    /// Delete a user and everything it owns.
    ///
    /// There is no database-level cascade; the repository removes
    /// refresh tokens, payments and bookings before the user row, all
    /// in one transaction.
    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        // Surface NotFound before attempting the cascade.
        self.get(id).await?;
        self.repos.users().delete_cascade(id).await?;
        info!(user_id = %id, "User deleted with owned bookings, payments and tokens");
        Ok(())
    }

    pub async fn list(
        &self,
        filter: UserFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<User>> {
        let (items, total) = self
            .repos
            .users()
            .list(filter, pagination.page, pagination.limit)
            .await?;
        Ok(PaginatedResult::new(
            items,
            total,
            pagination.page,
            pagination.limit,
        ))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use crate::domain::{
        Booking, Payment, PaymentMethod, RefreshToken, Resource,
    };
    use crate::infrastructure::memory::InMemoryRepositoryProvider;

    fn service() -> (Arc<dyn RepositoryProvider>, UserService) {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let service = UserService::new(repos.clone());
        (repos, service)
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Byron".to_string(),
            password: "correct-horse-battery".to_string(),
            role: UserRole::User,
        }
    }

    #[tokio::test]
    async fn create_normalizes_email_and_hashes_password() {
        let (_, service) = service();
        let user = service.create(new_user("  Ada@Example.ORG ")).await.unwrap();
        assert_eq!(user.email, "ada@example.org");
        assert_ne!(user.password_hash, "correct-horse-battery");
        assert!(bcrypt::verify("correct-horse-battery", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let (_, service) = service();
        service.create(new_user("ada@example.org")).await.unwrap();
        let err = service.create(new_user("ada@example.org")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_patches_selected_fields() {
        let (_, service) = service();
        let user = service.create(new_user("ada@example.org")).await.unwrap();
        let updated = service
            .update(
                user.id,
                UserPatch {
                    role: Some(UserRole::CommunityManager),
                    is_active: Some(false),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, UserRole::CommunityManager);
        assert!(!updated.is_active);
        assert_eq!(updated.first_name, "Ada");
    }

    #[tokio::test]
    async fn delete_cascades_over_owned_rows() {
        let (repos, service) = service();
        let user = service.create(new_user("ada@example.org")).await.unwrap();

        let resource = Resource::new("Sala", 10, Decimal::new(5, 0));
        repos.resources().insert(resource.clone()).await.unwrap();

        let start = Utc::now() + Duration::hours(24);
        let booking = Booking::new(
            resource.id,
            Some(user.id),
            "Assemblea",
            start,
            start + Duration::hours(1),
            5,
        )
        .unwrap();
        let booking = repos.bookings().insert_checked(booking).await.unwrap();

        let payment = Payment::new(
            booking.id,
            Some(user.id),
            Decimal::new(5, 0),
            "EUR",
            PaymentMethod::BankTransfer,
        );
        let payment = repos.payments().insert(payment).await.unwrap();

        repos
            .refresh_tokens()
            .insert(RefreshToken {
                id: uuid::Uuid::new_v4(),
                user_id: user.id,
                token_hash: "hash".to_string(),
                expires_at: Utc::now() + Duration::days(30),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        service.delete(user.id).await.unwrap();

        assert!(repos.users().find_by_id(user.id).await.unwrap().is_none());
        assert!(repos
            .bookings()
            .find_by_id(booking.id)
            .await
            .unwrap()
            .is_none());
        assert!(repos
            .payments()
            .find_by_id(payment.id)
            .await
            .unwrap()
            .is_none());
        assert!(repos
            .refresh_tokens()
            .find_for_user(user.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn delete_missing_user_is_not_found() {
        let (_, service) = service();
        let err = service.delete(uuid::Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_filters_by_search_and_role() {
        let (_, service) = service();
        service.create(new_user("ada@example.org")).await.unwrap();
        let mut staff = new_user("manager@example.org");
        staff.role = UserRole::CommunityManager;
        staff.first_name = "Grace".to_string();
        service.create(staff).await.unwrap();

        let result = service
            .list(
                UserFilter {
                    search: Some("grace".to_string()),
                    role: None,
                },
                PaginationParams::clamped(1, 50),
            )
            .await
            .unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].email, "manager@example.org");

        let result = service
            .list(
                UserFilter {
                    search: None,
                    role: Some(UserRole::CommunityManager),
                },
                PaginationParams::clamped(1, 50),
            )
            .await
            .unwrap();
        assert_eq!(result.total, 1);
    }
}

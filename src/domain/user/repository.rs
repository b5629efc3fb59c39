//! User repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{User, UserRole};
use crate::domain::DomainResult;

/// Filter for user listings.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Substring match on email or name
    pub search: Option<String>,
    pub role: Option<UserRole>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. `Conflict` when the email is taken.
    async fn insert(&self, user: User) -> DomainResult<User>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    async fn update(&self, user: User) -> DomainResult<()>;

    async fn list(
        &self,
        filter: UserFilter,
        page: u64,
        limit: u64,
    ) -> DomainResult<(Vec<User>, u64)>;

    /// Delete the user together with its refresh tokens, payments and
    /// bookings, in one transaction. There is no database-level
    /// cascade; children are removed explicitly, children first.
    async fn delete_cascade(&self, id: Uuid) -> DomainResult<()>;
}

//! Resource repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::Resource;
use crate::domain::DomainResult;

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn insert(&self, resource: Resource) -> DomainResult<Resource>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Resource>>;

    /// All resources, active first, then by name.
    async fn find_all(&self) -> DomainResult<Vec<Resource>>;

    async fn update(&self, resource: Resource) -> DomainResult<()>;
}

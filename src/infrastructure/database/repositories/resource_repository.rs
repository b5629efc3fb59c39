//! SeaORM implementation of ResourceRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::domain::resource::{Resource, ResourceRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::resource;

use super::booking_repository::db_err;

pub struct SeaOrmResourceRepository {
    db: DatabaseConnection,
}

impl SeaOrmResourceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: resource::Model) -> Resource {
    Resource {
        id: m.id,
        name: m.name,
        description: m.description,
        capacity: m.capacity,
        hourly_price: m.hourly_price,
        is_active: m.is_active,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn domain_to_active(r: &Resource) -> resource::ActiveModel {
    resource::ActiveModel {
        id: Set(r.id),
        name: Set(r.name.clone()),
        description: Set(r.description.clone()),
        capacity: Set(r.capacity),
        hourly_price: Set(r.hourly_price),
        is_active: Set(r.is_active),
        created_at: Set(r.created_at),
        updated_at: Set(r.updated_at),
    }
}

#[async_trait]
impl ResourceRepository for SeaOrmResourceRepository {
    async fn insert(&self, r: Resource) -> DomainResult<Resource> {
        debug!("Saving resource: {}", r.id);
        domain_to_active(&r).insert(&self.db).await.map_err(db_err)?;
        Ok(r)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Resource>> {
        let model = resource::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_all(&self) -> DomainResult<Vec<Resource>> {
        let models = resource::Entity::find()
            .order_by_desc(resource::Column::IsActive)
            .order_by_asc(resource::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update(&self, r: Resource) -> DomainResult<()> {
        let existing = resource::Entity::find_by_id(r.id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if existing.is_none() {
            return Err(DomainError::NotFound {
                entity: "Resource",
                field: "id",
                value: r.id.to_string(),
            });
        }
        domain_to_active(&r).update(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}

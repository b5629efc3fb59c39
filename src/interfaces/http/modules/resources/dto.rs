//! Resource DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::Resource;

/// Resource API representation
#[derive(Debug, Serialize, ToSchema)]
pub struct ResourceDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub capacity: i32,
    pub hourly_price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Resource> for ResourceDto {
    fn from(r: Resource) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            capacity: r.capacity,
            hourly_price: r.hourly_price,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Create resource request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateResourceRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub capacity: i32,
    /// Price per started hour
    pub hourly_price: Decimal,
}

/// Update resource request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateResourceRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    pub hourly_price: Option<Decimal>,
    pub is_active: Option<bool>,
}

//! Resource domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A bookable asset (room, space, or equipment)
#[derive(Debug, Clone)]
pub struct Resource {
    /// Unique resource ID
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Maximum number of people the resource holds
    pub capacity: i32,
    /// Price per started hour
    pub hourly_price: Decimal,
    /// Inactive resources are hidden from the public calendar
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    pub fn new(name: impl Into<String>, capacity: i32, hourly_price: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            capacity,
            hourly_price,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

//! Booking entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub resource_id: Uuid,

    #[sea_orm(nullable)]
    pub requester_id: Option<Uuid>,

    pub title: String,

    #[sea_orm(nullable)]
    pub description: Option<String>,

    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,
    pub attendees: i32,

    /// Booking status: pending, approved, rejected, paid, cancelled
    pub status: String,

    #[sea_orm(nullable)]
    pub rejection_reason: Option<String>,

    #[sea_orm(nullable)]
    pub cancellation_reason: Option<String>,

    #[sea_orm(nullable)]
    pub admin_note: Option<String>,

    pub is_private: bool,

    #[sea_orm(nullable)]
    pub guest_name: Option<String>,

    #[sea_orm(nullable)]
    pub guest_email: Option<String>,

    #[sea_orm(nullable)]
    pub guest_phone: Option<String>,

    #[sea_orm(nullable)]
    pub approved_at: Option<DateTimeUtc>,

    pub reminder_sent: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::resource::Entity",
        from = "Column::ResourceId",
        to = "super::resource::Column::Id"
    )]
    Resource,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RequesterId",
        to = "super::user::Column::Id"
    )]
    Requester,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
    #[sea_orm(has_many = "super::booking_resource::Entity")]
    AdditionalResources,
}

impl Related<super::resource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resource.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requester.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::booking_resource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdditionalResources.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

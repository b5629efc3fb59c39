//! Create bookings table
//!
//! Stores bookings through their whole lifecycle; cancellation is a
//! status change, not a delete. Indexed for the overlap query
//! (resource + status + window) and the requester cascade.

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users::Users;
use super::m20250301_000002_create_resources::Resources;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookings::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bookings::ResourceId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::RequesterId).uuid())
                    .col(ColumnDef::new(Bookings::Title).string().not_null())
                    .col(ColumnDef::new(Bookings::Description).string())
                    .col(
                        ColumnDef::new(Bookings::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::Attendees).integer().not_null())
                    .col(
                        ColumnDef::new(Bookings::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Bookings::RejectionReason).string())
                    .col(ColumnDef::new(Bookings::CancellationReason).string())
                    .col(ColumnDef::new(Bookings::AdminNote).string())
                    .col(
                        ColumnDef::new(Bookings::IsPrivate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Bookings::GuestName).string())
                    .col(ColumnDef::new(Bookings::GuestEmail).string())
                    .col(ColumnDef::new(Bookings::GuestPhone).string())
                    .col(ColumnDef::new(Bookings::ApprovedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Bookings::ReminderSent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_resource")
                            .from(Bookings::Table, Bookings::ResourceId)
                            .to(Resources::Table, Resources::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_requester")
                            .from(Bookings::Table, Bookings::RequesterId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_resource_status")
                    .table(Bookings::Table)
                    .col(Bookings::ResourceId)
                    .col(Bookings::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_start_time")
                    .table(Bookings::Table)
                    .col(Bookings::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_requester")
                    .table(Bookings::Table)
                    .col(Bookings::RequesterId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Bookings {
    Table,
    Id,
    ResourceId,
    RequesterId,
    Title,
    Description,
    StartTime,
    EndTime,
    Attendees,
    Status,
    RejectionReason,
    CancellationReason,
    AdminNote,
    IsPrivate,
    GuestName,
    GuestEmail,
    GuestPhone,
    ApprovedAt,
    ReminderSent,
    CreatedAt,
    UpdatedAt,
}

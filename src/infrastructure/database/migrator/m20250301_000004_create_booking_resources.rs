//! Create booking_resources table

use sea_orm_migration::prelude::*;

use super::m20250301_000002_create_resources::Resources;
use super::m20250301_000003_create_bookings::Bookings;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BookingResources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BookingResources::BookingId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BookingResources::ResourceId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BookingResources::Quantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .primary_key(
                        Index::create()
                            .col(BookingResources::BookingId)
                            .col(BookingResources::ResourceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_resources_booking")
                            .from(BookingResources::Table, BookingResources::BookingId)
                            .to(Bookings::Table, Bookings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_resources_resource")
                            .from(BookingResources::Table, BookingResources::ResourceId)
                            .to(Resources::Table, Resources::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BookingResources::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum BookingResources {
    Table,
    BookingId,
    ResourceId,
    Quantity,
}

//! Create payment_settings table (singleton row)

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PaymentSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentSettings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PaymentSettings::BankName).string())
                    .col(ColumnDef::new(PaymentSettings::AccountHolder).string())
                    .col(ColumnDef::new(PaymentSettings::Iban).string())
                    .col(
                        ColumnDef::new(PaymentSettings::BankTransferEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(PaymentSettings::StripeEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PaymentSettings::PaymentDeadlineDays)
                            .integer()
                            .not_null()
                            .default(14),
                    )
                    .col(
                        ColumnDef::new(PaymentSettings::Currency)
                            .string()
                            .not_null()
                            .default("EUR"),
                    )
                    .col(
                        ColumnDef::new(PaymentSettings::TaxRate)
                            .decimal_len(6, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentSettings::InvoicePrefix)
                            .string()
                            .not_null()
                            .default("BS-"),
                    )
                    .col(
                        ColumnDef::new(PaymentSettings::InvoiceStartNumber)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(PaymentSettings::InvoiceCurrentNumber)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(PaymentSettings::RemindersEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(PaymentSettings::ReminderDaysBefore)
                            .integer()
                            .not_null()
                            .default(3),
                    )
                    .col(
                        ColumnDef::new(PaymentSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PaymentSettings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum PaymentSettings {
    Table,
    Id,
    BankName,
    AccountHolder,
    Iban,
    BankTransferEnabled,
    StripeEnabled,
    PaymentDeadlineDays,
    Currency,
    TaxRate,
    InvoicePrefix,
    InvoiceStartNumber,
    InvoiceCurrentNumber,
    RemindersEnabled,
    ReminderDaysBefore,
    UpdatedAt,
}

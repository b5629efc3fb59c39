//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;
mod m20250301_000002_create_resources;
mod m20250301_000003_create_bookings;
mod m20250301_000004_create_booking_resources;
mod m20250301_000005_create_payments;
mod m20250301_000006_create_refresh_tokens;
mod m20250301_000007_create_payment_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_resources::Migration),
            Box::new(m20250301_000003_create_bookings::Migration),
            Box::new(m20250301_000004_create_booking_resources::Migration),
            Box::new(m20250301_000005_create_payments::Migration),
            Box::new(m20250301_000006_create_refresh_tokens::Migration),
            Box::new(m20250301_000007_create_payment_settings::Migration),
        ]
    }
}

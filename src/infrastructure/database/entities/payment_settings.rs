//! Payment settings entity (singleton row, id = 1)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    #[sea_orm(nullable)]
    pub bank_name: Option<String>,

    #[sea_orm(nullable)]
    pub account_holder: Option<String>,

    #[sea_orm(nullable)]
    pub iban: Option<String>,

    pub bank_transfer_enabled: bool,
    pub stripe_enabled: bool,

    pub payment_deadline_days: i32,
    pub currency: String,

    /// Fraction applied to the subtotal, e.g. 0.22
    pub tax_rate: Decimal,

    pub invoice_prefix: String,
    pub invoice_start_number: i32,
    pub invoice_current_number: i32,

    pub reminders_enabled: bool,
    pub reminder_days_before: i32,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

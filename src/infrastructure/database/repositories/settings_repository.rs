//! SeaORM implementation of PaymentSettingsRepository
//!
//! The settings live in a singleton row with id 1; reads go through
//! find-or-create so a fresh database behaves like one configured
//! with the defaults.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};

use crate::domain::settings::{PaymentSettings, PaymentSettingsRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::payment_settings;

use super::booking_repository::{db_err, txn_err};

/// Fixed primary key of the singleton row.
const SINGLETON_ID: i32 = 1;

pub struct SeaOrmPaymentSettingsRepository {
    db: DatabaseConnection,
}

impl SeaOrmPaymentSettingsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: payment_settings::Model) -> PaymentSettings {
    PaymentSettings {
        bank_name: m.bank_name,
        account_holder: m.account_holder,
        iban: m.iban,
        bank_transfer_enabled: m.bank_transfer_enabled,
        stripe_enabled: m.stripe_enabled,
        payment_deadline_days: m.payment_deadline_days,
        currency: m.currency,
        tax_rate: m.tax_rate,
        invoice_prefix: m.invoice_prefix,
        invoice_start_number: m.invoice_start_number,
        invoice_current_number: m.invoice_current_number,
        reminders_enabled: m.reminders_enabled,
        reminder_days_before: m.reminder_days_before,
        updated_at: m.updated_at,
    }
}

fn domain_to_active(s: &PaymentSettings) -> payment_settings::ActiveModel {
    payment_settings::ActiveModel {
        id: Set(SINGLETON_ID),
        bank_name: Set(s.bank_name.clone()),
        account_holder: Set(s.account_holder.clone()),
        iban: Set(s.iban.clone()),
        bank_transfer_enabled: Set(s.bank_transfer_enabled),
        stripe_enabled: Set(s.stripe_enabled),
        payment_deadline_days: Set(s.payment_deadline_days),
        currency: Set(s.currency.clone()),
        tax_rate: Set(s.tax_rate),
        invoice_prefix: Set(s.invoice_prefix.clone()),
        invoice_start_number: Set(s.invoice_start_number),
        invoice_current_number: Set(s.invoice_current_number),
        reminders_enabled: Set(s.reminders_enabled),
        reminder_days_before: Set(s.reminder_days_before),
        updated_at: Set(s.updated_at),
    }
}

// ── PaymentSettingsRepository impl ──────────────────────────────

#[async_trait]
impl PaymentSettingsRepository for SeaOrmPaymentSettingsRepository {
    async fn get_or_create(&self) -> DomainResult<PaymentSettings> {
        self.db
            .transaction::<_, PaymentSettings, DomainError>(|txn| {
                Box::pin(async move {
                    if let Some(model) = payment_settings::Entity::find_by_id(SINGLETON_ID)
                        .one(txn)
                        .await
                        .map_err(db_err)?
                    {
                        return Ok(model_to_domain(model));
                    }

                    let defaults = PaymentSettings::default();
                    domain_to_active(&defaults)
                        .insert(txn)
                        .await
                        .map_err(db_err)?;
                    Ok(defaults)
                })
            })
            .await
            .map_err(txn_err)
    }

    async fn update(&self, settings: PaymentSettings) -> DomainResult<()> {
        // Make sure the row exists before the update.
        drop(self.get_or_create().await?);
        domain_to_active(&settings)
            .update(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn next_invoice_number(&self) -> DomainResult<i32> {
        self.db
            .transaction::<_, i32, DomainError>(|txn| {
                Box::pin(async move {
                    let model = match payment_settings::Entity::find_by_id(SINGLETON_ID)
                        .one(txn)
                        .await
                        .map_err(db_err)?
                    {
                        Some(model) => model,
                        None => {
                            let defaults = PaymentSettings::default();
                            domain_to_active(&defaults).insert(txn).await.map_err(db_err)?
                        }
                    };

                    let claimed = model.invoice_current_number;
                    let mut active: payment_settings::ActiveModel = model.into();
                    active.invoice_current_number = Set(claimed + 1);
                    active.updated_at = Set(Utc::now());
                    active.update(txn).await.map_err(db_err)?;
                    Ok(claimed)
                })
            })
            .await
            .map_err(txn_err)
    }
}

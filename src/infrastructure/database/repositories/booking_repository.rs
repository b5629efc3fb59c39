//! SeaORM implementation of BookingRepository
//!
//! The overlap check and the write it guards always share one
//! transaction, and status transitions are conditional UPDATEs
//! filtered on the expected prior status. SQLite serializes writing
//! transactions; on Postgres the same code relies on the transaction
//! isolation plus the conditional-update backstop.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionError, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::booking::{
    AdditionalResource, Booking, BookingFilter, BookingRepository, BookingStatus, CancelOutcome,
    RejectionReason, StatusChange,
};
use crate::domain::payment::PaymentStatus;
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{booking, booking_resource, payment};

use super::payment_repository::payment_model_to_domain;

const OCCUPYING_STATUSES: [&str; 2] = ["approved", "paid"];

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(super) fn db_err(e: DbErr) -> DomainError {
    DomainError::Storage(e.to_string())
}

pub(super) fn txn_err(e: TransactionError<DomainError>) -> DomainError {
    match e {
        TransactionError::Connection(e) => db_err(e),
        TransactionError::Transaction(e) => e,
    }
}

fn status_from_db(s: &str) -> DomainResult<BookingStatus> {
    BookingStatus::parse(s)
        .ok_or_else(|| DomainError::Storage(format!("unknown booking status '{}'", s)))
}

fn model_to_domain(
    m: booking::Model,
    extras: Vec<booking_resource::Model>,
) -> DomainResult<Booking> {
    Ok(Booking {
        id: m.id,
        resource_id: m.resource_id,
        requester_id: m.requester_id,
        title: m.title,
        description: m.description,
        start_time: m.start_time,
        end_time: m.end_time,
        attendees: m.attendees,
        status: status_from_db(&m.status)?,
        additional_resources: extras
            .into_iter()
            .map(|e| AdditionalResource {
                resource_id: e.resource_id,
                quantity: e.quantity,
            })
            .collect(),
        rejection_reason: m.rejection_reason.as_deref().and_then(RejectionReason::parse),
        cancellation_reason: m.cancellation_reason,
        admin_note: m.admin_note,
        is_private: m.is_private,
        guest_name: m.guest_name,
        guest_email: m.guest_email,
        guest_phone: m.guest_phone,
        approved_at: m.approved_at,
        reminder_sent: m.reminder_sent,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn domain_to_active(b: &Booking) -> booking::ActiveModel {
    booking::ActiveModel {
        id: Set(b.id),
        resource_id: Set(b.resource_id),
        requester_id: Set(b.requester_id),
        title: Set(b.title.clone()),
        description: Set(b.description.clone()),
        start_time: Set(b.start_time),
        end_time: Set(b.end_time),
        attendees: Set(b.attendees),
        status: Set(b.status.as_str().to_string()),
        rejection_reason: Set(b.rejection_reason.map(|r| r.as_str().to_string())),
        cancellation_reason: Set(b.cancellation_reason.clone()),
        admin_note: Set(b.admin_note.clone()),
        is_private: Set(b.is_private),
        guest_name: Set(b.guest_name.clone()),
        guest_email: Set(b.guest_email.clone()),
        guest_phone: Set(b.guest_phone.clone()),
        approved_at: Set(b.approved_at),
        reminder_sent: Set(b.reminder_sent),
        created_at: Set(b.created_at),
        updated_at: Set(b.updated_at),
    }
}

/// Strict interval overlap against confirmed-occupying bookings:
/// `existing.start < end AND existing.end > start`. Back-to-back
/// windows do not match.
async fn overlapping_models<C: ConnectionTrait>(
    conn: &C,
    resource_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> Result<Vec<booking::Model>, DbErr> {
    let mut query = booking::Entity::find()
        .filter(booking::Column::ResourceId.eq(resource_id))
        .filter(booking::Column::Status.is_in(OCCUPYING_STATUSES))
        .filter(booking::Column::StartTime.lt(end))
        .filter(booking::Column::EndTime.gt(start));
    if let Some(id) = exclude {
        query = query.filter(booking::Column::Id.ne(id));
    }
    query.all(conn).await
}

async fn load_extras<C: ConnectionTrait>(
    conn: &C,
    booking_id: Uuid,
) -> Result<Vec<booking_resource::Model>, DbErr> {
    booking_resource::Entity::find()
        .filter(booking_resource::Column::BookingId.eq(booking_id))
        .all(conn)
        .await
}

async fn replace_extras<C: ConnectionTrait>(
    conn: &C,
    booking_id: Uuid,
    extras: &[AdditionalResource],
) -> Result<(), DbErr> {
    booking_resource::Entity::delete_many()
        .filter(booking_resource::Column::BookingId.eq(booking_id))
        .exec(conn)
        .await?;
    for extra in extras {
        booking_resource::ActiveModel {
            booking_id: Set(booking_id),
            resource_id: Set(extra.resource_id),
            quantity: Set(extra.quantity),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

// ── BookingRepository impl ──────────────────────────────────────

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn insert_checked(&self, b: Booking) -> DomainResult<Booking> {
        debug!("Inserting booking: {}", b.id);

        self.db
            .transaction::<_, Booking, DomainError>(|txn| {
                Box::pin(async move {
                    let taken = overlapping_models(txn, b.resource_id, b.start_time, b.end_time, None)
                        .await
                        .map_err(db_err)?;
                    if !taken.is_empty() {
                        return Err(DomainError::SlotUnavailable {
                            resource_id: b.resource_id,
                            start: b.start_time,
                            end: b.end_time,
                        });
                    }

                    domain_to_active(&b).insert(txn).await.map_err(db_err)?;
                    replace_extras(txn, b.id, &b.additional_resources)
                        .await
                        .map_err(db_err)?;
                    Ok(b)
                })
            })
            .await
            .map_err(txn_err)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Booking>> {
        let Some(model) = booking::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        let extras = load_extras(&self.db, id).await.map_err(db_err)?;
        Ok(Some(model_to_domain(model, extras)?))
    }

    async fn find_overlapping(
        &self,
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> DomainResult<Vec<Booking>> {
        let models = overlapping_models(&self.db, resource_id, start, end, exclude)
            .await
            .map_err(db_err)?;
        models
            .into_iter()
            .map(|m| model_to_domain(m, Vec::new()))
            .collect()
    }

    async fn update_pending(&self, b: Booking) -> DomainResult<Booking> {
        debug!("Updating pending booking: {}", b.id);

        self.db
            .transaction::<_, Booking, DomainError>(|txn| {
                Box::pin(async move {
                    let stored = booking::Entity::find_by_id(b.id)
                        .one(txn)
                        .await
                        .map_err(db_err)?
                        .ok_or(DomainError::NotFound {
                            entity: "Booking",
                            field: "id",
                            value: b.id.to_string(),
                        })?;
                    if status_from_db(&stored.status)? != BookingStatus::Pending {
                        return Err(DomainError::BookingLocked {
                            id: b.id,
                            status: status_from_db(&stored.status)?,
                        });
                    }

                    let taken =
                        overlapping_models(txn, b.resource_id, b.start_time, b.end_time, Some(b.id))
                            .await
                            .map_err(db_err)?;
                    if !taken.is_empty() {
                        return Err(DomainError::SlotUnavailable {
                            resource_id: b.resource_id,
                            start: b.start_time,
                            end: b.end_time,
                        });
                    }

                    domain_to_active(&b).update(txn).await.map_err(db_err)?;
                    replace_extras(txn, b.id, &b.additional_resources)
                        .await
                        .map_err(db_err)?;
                    Ok(b)
                })
            })
            .await
            .map_err(txn_err)
    }

    async fn set_status_checked(
        &self,
        id: Uuid,
        expected: BookingStatus,
        to: BookingStatus,
        change: StatusChange,
    ) -> DomainResult<bool> {
        let mut query = booking::Entity::update_many()
            .col_expr(booking::Column::Status, Expr::value(to.as_str()))
            .col_expr(booking::Column::UpdatedAt, Expr::value(Utc::now()));
        if let Some(reason) = change.rejection_reason {
            query = query.col_expr(
                booking::Column::RejectionReason,
                Expr::value(reason.as_str()),
            );
        }
        if let Some(reason) = change.cancellation_reason {
            query = query.col_expr(booking::Column::CancellationReason, Expr::value(reason));
        }
        if let Some(note) = change.admin_note {
            query = query.col_expr(booking::Column::AdminNote, Expr::value(note));
        }
        if let Some(at) = change.approved_at {
            query = query.col_expr(booking::Column::ApprovedAt, Expr::value(at));
        }

        let result = query
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected == 1)
    }

    async fn record_payment_checked(
        &self,
        id: Uuid,
        p: crate::domain::Payment,
    ) -> DomainResult<bool> {
        self.db
            .transaction::<_, bool, DomainError>(|txn| {
                Box::pin(async move {
                    let result = booking::Entity::update_many()
                        .col_expr(
                            booking::Column::Status,
                            Expr::value(BookingStatus::Paid.as_str()),
                        )
                        .col_expr(booking::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(booking::Column::Id.eq(id))
                        .filter(
                            booking::Column::Status.eq(BookingStatus::Approved.as_str()),
                        )
                        .exec(txn)
                        .await
                        .map_err(db_err)?;
                    if result.rows_affected != 1 {
                        return Ok(false);
                    }

                    payment::ActiveModel {
                        id: Set(p.id),
                        booking_id: Set(p.booking_id),
                        user_id: Set(p.user_id),
                        amount: Set(p.amount),
                        currency: Set(p.currency.clone()),
                        method: Set(p.method.as_str().to_string()),
                        status: Set(p.status.as_str().to_string()),
                        provider_reference: Set(p.provider_reference.clone()),
                        invoice_number: Set(p.invoice_number.clone()),
                        created_at: Set(p.created_at),
                        updated_at: Set(p.updated_at),
                    }
                    .insert(txn)
                    .await
                    .map_err(db_err)?;
                    Ok(true)
                })
            })
            .await
            .map_err(txn_err)
    }

    async fn cancel_checked(
        &self,
        id: Uuid,
        reason: String,
    ) -> DomainResult<Option<CancelOutcome>> {
        self.db
            .transaction::<_, Option<CancelOutcome>, DomainError>(|txn| {
                Box::pin(async move {
                    let Some(stored) = booking::Entity::find_by_id(id)
                        .one(txn)
                        .await
                        .map_err(db_err)?
                    else {
                        return Ok(None);
                    };
                    let previous_status = status_from_db(&stored.status)?;
                    if previous_status
                        .next(crate::domain::BookingEvent::Cancel)
                        .is_err()
                    {
                        return Ok(None);
                    }

                    let mut active: booking::ActiveModel = stored.into();
                    active.status = Set(BookingStatus::Cancelled.as_str().to_string());
                    active.cancellation_reason = Set(Some(reason));
                    active.updated_at = Set(Utc::now());
                    let updated = active.update(txn).await.map_err(db_err)?;

                    // Flag settled payments for refund in the same
                    // transaction as the status change.
                    let completed = payment::Entity::find()
                        .filter(payment::Column::BookingId.eq(id))
                        .filter(
                            payment::Column::Status.eq(PaymentStatus::Completed.as_str()),
                        )
                        .all(txn)
                        .await
                        .map_err(db_err)?;

                    let mut refundable = Vec::with_capacity(completed.len());
                    for model in completed {
                        let mut active: payment::ActiveModel = model.into();
                        active.status =
                            Set(PaymentStatus::RefundInitiated.as_str().to_string());
                        active.updated_at = Set(Utc::now());
                        let updated_payment = active.update(txn).await.map_err(db_err)?;
                        refundable.push(payment_model_to_domain(updated_payment)?);
                    }

                    let extras = load_extras(txn, id).await.map_err(db_err)?;
                    Ok(Some(CancelOutcome {
                        booking: model_to_domain(updated, extras)?,
                        previous_status,
                        refundable,
                    }))
                })
            })
            .await
            .map_err(txn_err)
    }

    async fn list(
        &self,
        filter: BookingFilter,
        page: u64,
        limit: u64,
    ) -> DomainResult<(Vec<Booking>, u64)> {
        let mut query = booking::Entity::find();
        if let Some(resource_id) = filter.resource_id {
            query = query.filter(booking::Column::ResourceId.eq(resource_id));
        }
        if let Some(requester_id) = filter.requester_id {
            query = query.filter(booking::Column::RequesterId.eq(requester_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(booking::Column::Status.eq(status.as_str()));
        }

        let paginator = query
            .order_by_desc(booking::Column::CreatedAt)
            .paginate(&self.db, limit.max(1));
        let total = paginator.num_items().await.map_err(db_err)?;
        let models = paginator
            .fetch_page(page.max(1) - 1)
            .await
            .map_err(db_err)?;

        let mut items = Vec::with_capacity(models.len());
        for model in models {
            let extras = load_extras(&self.db, model.id).await.map_err(db_err)?;
            items.push(model_to_domain(model, extras)?);
        }
        Ok((items, total))
    }

    async fn find_needing_payment_reminder(
        &self,
        approved_before: DateTime<Utc>,
    ) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::Status.eq(BookingStatus::Approved.as_str()))
            .filter(booking::Column::ReminderSent.eq(false))
            .filter(booking::Column::ApprovedAt.lte(approved_before))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models
            .into_iter()
            .map(|m| model_to_domain(m, Vec::new()))
            .collect()
    }

    async fn mark_reminder_sent(&self, id: Uuid) -> DomainResult<()> {
        let result = booking::Entity::update_many()
            .col_expr(booking::Column::ReminderSent, Expr::value(true))
            .filter(booking::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound {
                entity: "Booking",
                field: "id",
                value: id.to_string(),
            });
        }
        Ok(())
    }
}

//! In-memory repositories for development and testing
//!
//! Backed by `DashMap`s behind one shared store. Multi-row operations
//! that the database implementation runs in a transaction are
//! serialized here with a store-wide mutex, which gives the same
//! observable atomicity to callers.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{
    Booking, BookingFilter, BookingRepository, BookingStatus, CancelOutcome, DomainError,
    DomainResult, Payment, PaymentRepository, PaymentSettings, PaymentSettingsRepository,
    PaymentStatus, RefreshToken, RefreshTokenRepository, RepositoryProvider, Resource,
    ResourceRepository, StatusChange, User, UserFilter, UserRepository,
};

struct Store {
    bookings: DashMap<Uuid, Booking>,
    resources: DashMap<Uuid, Resource>,
    users: DashMap<Uuid, User>,
    payments: DashMap<Uuid, Payment>,
    refresh_tokens: DashMap<Uuid, RefreshToken>,
    settings: Mutex<Option<PaymentSettings>>,
    invoice_counter: AtomicI32,
    // Serializes check-then-write operations (the DB impl uses
    // transactions for these).
    write_guard: Mutex<()>,
}

impl Store {
    fn new() -> Self {
        Self {
            bookings: DashMap::new(),
            resources: DashMap::new(),
            users: DashMap::new(),
            payments: DashMap::new(),
            refresh_tokens: DashMap::new(),
            settings: Mutex::new(None),
            invoice_counter: AtomicI32::new(0),
            write_guard: Mutex::new(()),
        }
    }

    fn overlapping(
        &self,
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|entry| {
                let b = entry.value();
                b.resource_id == resource_id
                    && Some(b.id) != exclude
                    && b.status.occupies_slot()
                    && b.start_time < end
                    && b.end_time > start
            })
            .map(|entry| entry.value().clone())
            .collect()
    }
}

// ── Booking repository ─────────────────────────────────────────

pub struct InMemoryBookingRepository {
    store: Arc<Store>,
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert_checked(&self, booking: Booking) -> DomainResult<Booking> {
        let _guard = self.store.write_guard.lock().unwrap();
        if !self
            .store
            .overlapping(
                booking.resource_id,
                booking.start_time,
                booking.end_time,
                None,
            )
            .is_empty()
        {
            return Err(DomainError::SlotUnavailable {
                resource_id: booking.resource_id,
                start: booking.start_time,
                end: booking.end_time,
            });
        }
        self.store.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Booking>> {
        Ok(self.store.bookings.get(&id).map(|b| b.clone()))
    }

    async fn find_overlapping(
        &self,
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> DomainResult<Vec<Booking>> {
        Ok(self.store.overlapping(resource_id, start, end, exclude))
    }

    async fn update_pending(&self, booking: Booking) -> DomainResult<Booking> {
        let _guard = self.store.write_guard.lock().unwrap();
        let stored_status = self
            .store
            .bookings
            .get(&booking.id)
            .map(|b| b.status)
            .ok_or(DomainError::NotFound {
                entity: "Booking",
                field: "id",
                value: booking.id.to_string(),
            })?;
        if stored_status != BookingStatus::Pending {
            return Err(DomainError::BookingLocked {
                id: booking.id,
                status: stored_status,
            });
        }
        if !self
            .store
            .overlapping(
                booking.resource_id,
                booking.start_time,
                booking.end_time,
                Some(booking.id),
            )
            .is_empty()
        {
            return Err(DomainError::SlotUnavailable {
                resource_id: booking.resource_id,
                start: booking.start_time,
                end: booking.end_time,
            });
        }
        self.store.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn set_status_checked(
        &self,
        id: Uuid,
        expected: BookingStatus,
        to: BookingStatus,
        change: StatusChange,
    ) -> DomainResult<bool> {
        let Some(mut entry) = self.store.bookings.get_mut(&id) else {
            return Ok(false);
        };
        if entry.status != expected {
            return Ok(false);
        }
        entry.status = to;
        if change.rejection_reason.is_some() {
            entry.rejection_reason = change.rejection_reason;
        }
        if change.cancellation_reason.is_some() {
            entry.cancellation_reason = change.cancellation_reason;
        }
        if change.admin_note.is_some() {
            entry.admin_note = change.admin_note;
        }
        if change.approved_at.is_some() {
            entry.approved_at = change.approved_at;
        }
        entry.updated_at = Utc::now();
        Ok(true)
    }

    async fn record_payment_checked(&self, id: Uuid, payment: Payment) -> DomainResult<bool> {
        let _guard = self.store.write_guard.lock().unwrap();
        let Some(mut entry) = self.store.bookings.get_mut(&id) else {
            return Ok(false);
        };
        if entry.status != BookingStatus::Approved {
            return Ok(false);
        }
        entry.status = BookingStatus::Paid;
        entry.updated_at = Utc::now();
        drop(entry);
        self.store.payments.insert(payment.id, payment);
        Ok(true)
    }

    async fn cancel_checked(
        &self,
        id: Uuid,
        reason: String,
    ) -> DomainResult<Option<CancelOutcome>> {
        let _guard = self.store.write_guard.lock().unwrap();
        let Some(mut entry) = self.store.bookings.get_mut(&id) else {
            return Ok(None);
        };
        let previous_status = entry.status;
        if previous_status.next(crate::domain::BookingEvent::Cancel).is_err() {
            return Ok(None);
        }
        entry.status = BookingStatus::Cancelled;
        entry.cancellation_reason = Some(reason);
        entry.updated_at = Utc::now();
        let booking = entry.clone();
        drop(entry);

        let mut refundable = Vec::new();
        for mut payment in self.store.payments.iter_mut() {
            if payment.booking_id == id && payment.is_refundable() {
                payment.status = PaymentStatus::RefundInitiated;
                payment.updated_at = Utc::now();
                refundable.push(payment.clone());
            }
        }

        Ok(Some(CancelOutcome {
            booking,
            previous_status,
            refundable,
        }))
    }

    async fn list(
        &self,
        filter: BookingFilter,
        page: u64,
        limit: u64,
    ) -> DomainResult<(Vec<Booking>, u64)> {
        let mut items: Vec<Booking> = self
            .store
            .bookings
            .iter()
            .filter(|entry| {
                let b = entry.value();
                filter.resource_id.is_none_or(|r| b.resource_id == r)
                    && filter.requester_id.is_none_or(|u| b.requester_id == Some(u))
                    && filter.status.is_none_or(|s| b.status == s)
            })
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = items.len() as u64;
        let offset = ((page.max(1) - 1) * limit) as usize;
        let items = items.into_iter().skip(offset).take(limit as usize).collect();
        Ok((items, total))
    }

    async fn find_needing_payment_reminder(
        &self,
        approved_before: DateTime<Utc>,
    ) -> DomainResult<Vec<Booking>> {
        Ok(self
            .store
            .bookings
            .iter()
            .filter(|entry| {
                let b = entry.value();
                b.status == BookingStatus::Approved
                    && !b.reminder_sent
                    && b.approved_at.is_some_and(|at| at <= approved_before)
            })
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn mark_reminder_sent(&self, id: Uuid) -> DomainResult<()> {
        let mut entry = self
            .store
            .bookings
            .get_mut(&id)
            .ok_or(DomainError::NotFound {
                entity: "Booking",
                field: "id",
                value: id.to_string(),
            })?;
        entry.reminder_sent = true;
        Ok(())
    }
}

// ── Resource repository ────────────────────────────────────────

pub struct InMemoryResourceRepository {
    store: Arc<Store>,
}

#[async_trait]
impl ResourceRepository for InMemoryResourceRepository {
    async fn insert(&self, resource: Resource) -> DomainResult<Resource> {
        self.store.resources.insert(resource.id, resource.clone());
        Ok(resource)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Resource>> {
        Ok(self.store.resources.get(&id).map(|r| r.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Resource>> {
        let mut items: Vec<Resource> = self
            .store
            .resources
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by(|a, b| {
            b.is_active
                .cmp(&a.is_active)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(items)
    }

    async fn update(&self, resource: Resource) -> DomainResult<()> {
        if !self.store.resources.contains_key(&resource.id) {
            return Err(DomainError::NotFound {
                entity: "Resource",
                field: "id",
                value: resource.id.to_string(),
            });
        }
        self.store.resources.insert(resource.id, resource);
        Ok(())
    }
}

// ── User repository ────────────────────────────────────────────

pub struct InMemoryUserRepository {
    store: Arc<Store>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: User) -> DomainResult<User> {
        let _guard = self.store.write_guard.lock().unwrap();
        let taken = self
            .store
            .users
            .iter()
            .any(|entry| entry.value().email == user.email);
        if taken {
            return Err(DomainError::Conflict(format!(
                "user with email {} already exists",
                user.email
            )));
        }
        self.store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        Ok(self.store.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self
            .store
            .users
            .iter()
            .find(|entry| entry.value().email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn update(&self, user: User) -> DomainResult<()> {
        if !self.store.users.contains_key(&user.id) {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: user.id.to_string(),
            });
        }
        self.store.users.insert(user.id, user);
        Ok(())
    }

    async fn list(
        &self,
        filter: UserFilter,
        page: u64,
        limit: u64,
    ) -> DomainResult<(Vec<User>, u64)> {
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut items: Vec<User> = self
            .store
            .users
            .iter()
            .filter(|entry| {
                let u = entry.value();
                let matches_search = needle.as_deref().is_none_or(|s| {
                    u.email.to_lowercase().contains(s)
                        || u.first_name.to_lowercase().contains(s)
                        || u.last_name.to_lowercase().contains(s)
                });
                matches_search && filter.role.is_none_or(|r| u.role == r)
            })
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by(|a, b| a.email.cmp(&b.email));
        let total = items.len() as u64;
        let offset = ((page.max(1) - 1) * limit) as usize;
        let items = items.into_iter().skip(offset).take(limit as usize).collect();
        Ok((items, total))
    }

    async fn delete_cascade(&self, id: Uuid) -> DomainResult<()> {
        let _guard = self.store.write_guard.lock().unwrap();
        if !self.store.users.contains_key(&id) {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: id.to_string(),
            });
        }
        // Children first, then the user row; mirrors the transactional
        // order of the database implementation.
        self.store.refresh_tokens.retain(|_, t| t.user_id != id);
        self.store.payments.retain(|_, p| p.user_id != Some(id));
        self.store.bookings.retain(|_, b| b.requester_id != Some(id));
        self.store.users.remove(&id);
        Ok(())
    }
}

// ── Payment repository ─────────────────────────────────────────

pub struct InMemoryPaymentRepository {
    store: Arc<Store>,
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn insert(&self, payment: Payment) -> DomainResult<Payment> {
        self.store.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Payment>> {
        Ok(self.store.payments.get(&id).map(|p| p.clone()))
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> DomainResult<Vec<Payment>> {
        let mut items: Vec<Payment> = self
            .store
            .payments
            .iter()
            .filter(|entry| entry.value().booking_id == booking_id)
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(items)
    }

    async fn set_status(&self, id: Uuid, status: PaymentStatus) -> DomainResult<()> {
        let mut entry = self
            .store
            .payments
            .get_mut(&id)
            .ok_or(DomainError::NotFound {
                entity: "Payment",
                field: "id",
                value: id.to_string(),
            })?;
        entry.status = status;
        entry.updated_at = Utc::now();
        Ok(())
    }
}

// ── Refresh token repository ───────────────────────────────────

pub struct InMemoryRefreshTokenRepository {
    store: Arc<Store>,
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn insert(&self, token: RefreshToken) -> DomainResult<()> {
        self.store.refresh_tokens.insert(token.id, token);
        Ok(())
    }

    async fn find_for_user(&self, user_id: Uuid) -> DomainResult<Vec<RefreshToken>> {
        Ok(self
            .store
            .refresh_tokens
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect())
    }
}

// ── Payment settings repository ────────────────────────────────

pub struct InMemoryPaymentSettingsRepository {
    store: Arc<Store>,
}

#[async_trait]
impl PaymentSettingsRepository for InMemoryPaymentSettingsRepository {
    async fn get_or_create(&self) -> DomainResult<PaymentSettings> {
        let mut slot = self.store.settings.lock().unwrap();
        if slot.is_none() {
            let defaults = PaymentSettings::default();
            self.store
                .invoice_counter
                .store(defaults.invoice_start_number, Ordering::SeqCst);
            *slot = Some(defaults);
        }
        let mut settings = slot.clone().unwrap();
        settings.invoice_current_number = self.store.invoice_counter.load(Ordering::SeqCst);
        Ok(settings)
    }

    async fn update(&self, settings: PaymentSettings) -> DomainResult<()> {
        let mut slot = self.store.settings.lock().unwrap();
        *slot = Some(settings);
        Ok(())
    }

    async fn next_invoice_number(&self) -> DomainResult<i32> {
        // Make sure the singleton (and counter) exists.
        drop(self.get_or_create().await?);
        Ok(self.store.invoice_counter.fetch_add(1, Ordering::SeqCst))
    }
}

// ── Provider ───────────────────────────────────────────────────

/// In-memory repository provider; every accessor shares one store.
pub struct InMemoryRepositoryProvider {
    bookings: InMemoryBookingRepository,
    resources: InMemoryResourceRepository,
    users: InMemoryUserRepository,
    payments: InMemoryPaymentRepository,
    refresh_tokens: InMemoryRefreshTokenRepository,
    settings: InMemoryPaymentSettingsRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        let store = Arc::new(Store::new());
        Self {
            bookings: InMemoryBookingRepository {
                store: store.clone(),
            },
            resources: InMemoryResourceRepository {
                store: store.clone(),
            },
            users: InMemoryUserRepository {
                store: store.clone(),
            },
            payments: InMemoryPaymentRepository {
                store: store.clone(),
            },
            refresh_tokens: InMemoryRefreshTokenRepository {
                store: store.clone(),
            },
            settings: InMemoryPaymentSettingsRepository { store },
        }
    }
}

impl Default for InMemoryRepositoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn resources(&self) -> &dyn ResourceRepository {
        &self.resources
    }

    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn payments(&self) -> &dyn PaymentRepository {
        &self.payments
    }

    fn refresh_tokens(&self) -> &dyn RefreshTokenRepository {
        &self.refresh_tokens
    }

    fn settings(&self) -> &dyn PaymentSettingsRepository {
        &self.settings
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_booking() -> Booking {
        let start = Utc::now() + Duration::hours(24);
        Booking::new(
            Uuid::new_v4(),
            None,
            "Assemblea",
            start,
            start + Duration::hours(1),
            5,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn status_cas_rejects_stale_expectation() {
        let provider = InMemoryRepositoryProvider::new();
        let booking = provider
            .bookings()
            .insert_checked(sample_booking())
            .await
            .unwrap();

        // First transition wins.
        let applied = provider
            .bookings()
            .set_status_checked(
                booking.id,
                BookingStatus::Pending,
                BookingStatus::Approved,
                StatusChange::default(),
            )
            .await
            .unwrap();
        assert!(applied);

        // A second writer that still believes the booking is pending loses.
        let applied = provider
            .bookings()
            .set_status_checked(
                booking.id,
                BookingStatus::Pending,
                BookingStatus::Rejected,
                StatusChange::default(),
            )
            .await
            .unwrap();
        assert!(!applied);

        let current = provider
            .bookings()
            .find_by_id(booking.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.status, BookingStatus::Approved);
    }

    #[tokio::test]
    async fn record_payment_cas_requires_approved() {
        let provider = InMemoryRepositoryProvider::new();
        let booking = provider
            .bookings()
            .insert_checked(sample_booking())
            .await
            .unwrap();

        let payment = Payment::new(
            booking.id,
            None,
            rust_decimal::Decimal::ONE,
            "EUR",
            crate::domain::PaymentMethod::Card,
        );
        let applied = provider
            .bookings()
            .record_payment_checked(booking.id, payment)
            .await
            .unwrap();
        assert!(!applied);
        assert!(provider
            .payments()
            .find_by_booking(booking.id)
            .await
            .unwrap()
            .is_empty());
    }
}

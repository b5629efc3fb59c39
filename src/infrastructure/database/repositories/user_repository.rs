//! SeaORM implementation of UserRepository
//!
//! User deletion removes the user's refresh tokens, payments and
//! bookings before the user row itself, all in one transaction; the
//! schema declares no ON DELETE CASCADE for these relations.

use async_trait::async_trait;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::user::{User, UserFilter, UserRepository, UserRole};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{
    booking, booking_resource, payment, refresh_token, user,
};

use super::booking_repository::{db_err, txn_err};

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: user::Model) -> DomainResult<User> {
    Ok(User {
        id: m.id,
        email: m.email,
        first_name: m.first_name,
        last_name: m.last_name,
        password_hash: m.password_hash,
        role: UserRole::parse(&m.role)
            .ok_or_else(|| DomainError::Storage(format!("unknown user role '{}'", m.role)))?,
        is_active: m.is_active,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn domain_to_active(u: &User) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(u.id),
        email: Set(u.email.clone()),
        first_name: Set(u.first_name.clone()),
        last_name: Set(u.last_name.clone()),
        password_hash: Set(u.password_hash.clone()),
        role: Set(u.role.as_str().to_string()),
        is_active: Set(u.is_active),
        created_at: Set(u.created_at),
        updated_at: Set(u.updated_at),
    }
}

// ── UserRepository impl ─────────────────────────────────────────

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn insert(&self, u: User) -> DomainResult<User> {
        debug!("Saving user: {}", u.id);

        let taken = user::Entity::find()
            .filter(user::Column::Email.eq(u.email.clone()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if taken.is_some() {
            return Err(DomainError::Conflict(format!(
                "user with email {} already exists",
                u.email
            )));
        }

        domain_to_active(&u).insert(&self.db).await.map_err(db_err)?;
        Ok(u)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn update(&self, u: User) -> DomainResult<()> {
        let existing = user::Entity::find_by_id(u.id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if existing.is_none() {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: u.id.to_string(),
            });
        }
        domain_to_active(&u).update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn list(
        &self,
        filter: UserFilter,
        page: u64,
        limit: u64,
    ) -> DomainResult<(Vec<User>, u64)> {
        let mut query = user::Entity::find();
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim().to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(Expr::cust_with_values("LOWER(email) LIKE ?", [pattern.clone()]))
                    .add(Expr::cust_with_values(
                        "LOWER(first_name) LIKE ?",
                        [pattern.clone()],
                    ))
                    .add(Expr::cust_with_values("LOWER(last_name) LIKE ?", [pattern])),
            );
        }
        if let Some(role) = filter.role {
            query = query.filter(user::Column::Role.eq(role.as_str()));
        }

        let paginator = query
            .order_by_asc(user::Column::Email)
            .paginate(&self.db, limit.max(1));
        let total = paginator.num_items().await.map_err(db_err)?;
        let models = paginator
            .fetch_page(page.max(1) - 1)
            .await
            .map_err(db_err)?;
        let items = models
            .into_iter()
            .map(model_to_domain)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok((items, total))
    }

    async fn delete_cascade(&self, id: Uuid) -> DomainResult<()> {
        debug!("Deleting user with owned rows: {}", id);

        self.db
            .transaction::<_, (), DomainError>(move |txn| {
                Box::pin(async move {
                    let existing = user::Entity::find_by_id(id)
                        .one(txn)
                        .await
                        .map_err(db_err)?;
                    if existing.is_none() {
                        return Err(DomainError::NotFound {
                            entity: "User",
                            field: "id",
                            value: id.to_string(),
                        });
                    }

                    refresh_token::Entity::delete_many()
                        .filter(refresh_token::Column::UserId.eq(id))
                        .exec(txn)
                        .await
                        .map_err(db_err)?;

                    payment::Entity::delete_many()
                        .filter(payment::Column::UserId.eq(id))
                        .exec(txn)
                        .await
                        .map_err(db_err)?;

                    let booking_ids: Vec<Uuid> = booking::Entity::find()
                        .filter(booking::Column::RequesterId.eq(id))
                        .all(txn)
                        .await
                        .map_err(db_err)?
                        .into_iter()
                        .map(|b| b.id)
                        .collect();
                    if !booking_ids.is_empty() {
                        booking_resource::Entity::delete_many()
                            .filter(
                                booking_resource::Column::BookingId.is_in(booking_ids.clone()),
                            )
                            .exec(txn)
                            .await
                            .map_err(db_err)?;
                        booking::Entity::delete_many()
                            .filter(booking::Column::Id.is_in(booking_ids))
                            .exec(txn)
                            .await
                            .map_err(db_err)?;
                    }

                    user::Entity::delete_by_id(id)
                        .exec(txn)
                        .await
                        .map_err(db_err)?;
                    Ok(())
                })
            })
            .await
            .map_err(txn_err)
    }
}

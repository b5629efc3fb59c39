//! Resource HTTP handlers

use axum::extract::{Path, State};
use axum::Json;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{DomainError, Resource};
use crate::interfaces::http::common::{Actor, ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::ApiState;

use super::dto::*;

#[utoipa::path(
    post,
    path = "/api/v1/resources",
    tag = "Resources",
    request_body = CreateResourceRequest,
    responses(
        (status = 200, description = "Resource created", body = ApiResponse<ResourceDto>),
        (status = 422, description = "Invalid request")
    )
)]
pub async fn create_resource(
    State(state): State<ApiState>,
    _actor: Actor,
    ValidatedJson(request): ValidatedJson<CreateResourceRequest>,
) -> Result<Json<ApiResponse<ResourceDto>>, ApiError> {
    if request.hourly_price < Decimal::ZERO {
        return Err(DomainError::Validation("hourly_price must not be negative".to_string()).into());
    }
    let mut resource = Resource::new(request.name, request.capacity, request.hourly_price);
    resource.description = request.description;
    let resource = state.repos.resources().insert(resource).await?;
    Ok(Json(ApiResponse::success(resource.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/resources",
    tag = "Resources",
    responses(
        (status = 200, description = "All resources", body = ApiResponse<Vec<ResourceDto>>)
    )
)]
pub async fn list_resources(
    State(state): State<ApiState>,
) -> Result<Json<ApiResponse<Vec<ResourceDto>>>, ApiError> {
    let resources = state.repos.resources().find_all().await?;
    Ok(Json(ApiResponse::success(
        resources.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/resources/{resource_id}",
    tag = "Resources",
    params(("resource_id" = Uuid, Path, description = "Resource ID")),
    responses(
        (status = 200, description = "Resource", body = ApiResponse<ResourceDto>),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn get_resource(
    State(state): State<ApiState>,
    Path(resource_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ResourceDto>>, ApiError> {
    let resource = state
        .repos
        .resources()
        .find_by_id(resource_id)
        .await?
        .ok_or(DomainError::NotFound {
            entity: "Resource",
            field: "id",
            value: resource_id.to_string(),
        })?;
    Ok(Json(ApiResponse::success(resource.into())))
}

#[utoipa::path(
    patch,
    path = "/api/v1/resources/{resource_id}",
    tag = "Resources",
    params(("resource_id" = Uuid, Path, description = "Resource ID")),
    request_body = UpdateResourceRequest,
    responses(
        (status = 200, description = "Resource updated", body = ApiResponse<ResourceDto>),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn update_resource(
    State(state): State<ApiState>,
    _actor: Actor,
    Path(resource_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateResourceRequest>,
) -> Result<Json<ApiResponse<ResourceDto>>, ApiError> {
    let mut resource = state
        .repos
        .resources()
        .find_by_id(resource_id)
        .await?
        .ok_or(DomainError::NotFound {
            entity: "Resource",
            field: "id",
            value: resource_id.to_string(),
        })?;

    if let Some(name) = request.name {
        resource.name = name;
    }
    if let Some(description) = request.description {
        resource.description = Some(description);
    }
    if let Some(capacity) = request.capacity {
        resource.capacity = capacity;
    }
    if let Some(hourly_price) = request.hourly_price {
        if hourly_price < Decimal::ZERO {
            return Err(
                DomainError::Validation("hourly_price must not be negative".to_string()).into(),
            );
        }
        resource.hourly_price = hourly_price;
    }
    if let Some(is_active) = request.is_active {
        resource.is_active = is_active;
    }
    resource.updated_at = chrono::Utc::now();

    state.repos.resources().update(resource.clone()).await?;
    Ok(Json(ApiResponse::success(resource.into())))
}

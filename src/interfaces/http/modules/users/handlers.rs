//! User HTTP handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use crate::application::services::{NewUser, UserPatch};
use crate::domain::{DomainError, UserFilter, UserRole};
use crate::interfaces::http::common::{
    Actor, ApiError, ApiResponse, EmptyData, PaginatedResponse, ValidatedJson,
};
use crate::interfaces::http::ApiState;
use crate::shared::types::PaginationParams;

use super::dto::*;

fn parse_role(s: &str) -> Result<UserRole, DomainError> {
    UserRole::parse(s).ok_or(DomainError::Validation(format!("unknown role '{}'", s)))
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = ApiResponse<UserDto>),
        (status = 409, description = "Email already taken"),
        (status = 422, description = "Invalid request")
    )
)]
pub async fn create_user(
    State(state): State<ApiState>,
    _actor: Actor,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let role = parse_role(&request.role)?;
    let user = state
        .users
        .create(NewUser {
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            password: request.password,
            role,
        })
        .await?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "Users",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = ApiResponse<UserDto>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<ApiState>,
    _actor: Actor,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.users.get(user_id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/{user_id}",
    tag = "Users",
    params(("user_id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserDto>),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<ApiState>,
    _actor: Actor,
    Path(user_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let role = request.role.as_deref().map(parse_role).transpose()?;
    let user = state
        .users
        .update(
            user_id,
            UserPatch {
                first_name: request.first_name,
                last_name: request.last_name,
                role,
                is_active: request.is_active,
            },
        )
        .await?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "Users",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User and owned rows deleted", body = ApiResponse<EmptyData>),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<ApiState>,
    _actor: Actor,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError> {
    state.users.delete(user_id).await?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    params(ListUsersParams),
    responses(
        (status = 200, description = "Users page", body = ApiResponse<PaginatedResponse<UserDto>>)
    )
)]
pub async fn list_users(
    State(state): State<ApiState>,
    _actor: Actor,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<UserDto>>>, ApiError> {
    let role = params.role.as_deref().map(parse_role).transpose()?;
    let result = state
        .users
        .list(
            UserFilter {
                search: params.search,
                role,
            },
            PaginationParams::clamped(params.page, params.limit),
        )
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(
        result,
    ))))
}

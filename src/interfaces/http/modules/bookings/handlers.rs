//! Booking HTTP handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use crate::domain::{
    AdditionalResource, BookingFilter, BookingStatus, DomainError, PaymentMethod, RejectionReason,
};
use crate::application::services::{BookingPatch, NewBooking};
use crate::interfaces::http::common::{Actor, ApiError, ApiResponse, PaginatedResponse, ValidatedJson};
use crate::interfaces::http::ApiState;
use crate::shared::types::PaginationParams;

use super::dto::*;

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Booking created", body = ApiResponse<BookingDto>),
        (status = 409, description = "Slot unavailable"),
        (status = 422, description = "Invalid request")
    )
)]
pub async fn create_booking(
    State(state): State<ApiState>,
    actor: Actor,
    ValidatedJson(request): ValidatedJson<CreateBookingRequest>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    let booking = state
        .bookings
        .create(NewBooking {
            resource_id: request.resource_id,
            requester_id: Some(actor.id),
            title: request.title,
            description: request.description,
            start_time: request.start_time,
            end_time: request.end_time,
            attendees: request.attendees,
            additional_resources: request
                .additional_resources
                .into_iter()
                .map(AdditionalResource::from)
                .collect(),
            is_private: request.is_private,
            guest_name: None,
            guest_email: None,
            guest_phone: None,
            auto_approve: false,
        })
        .await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/manual",
    tag = "Bookings",
    request_body = CreateManualBookingRequest,
    responses(
        (status = 200, description = "Manual booking created", body = ApiResponse<BookingDto>),
        (status = 409, description = "Slot unavailable"),
        (status = 422, description = "Invalid request")
    )
)]
pub async fn create_manual_booking(
    State(state): State<ApiState>,
    _actor: Actor,
    ValidatedJson(request): ValidatedJson<CreateManualBookingRequest>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    let booking = state
        .bookings
        .create_manual(NewBooking {
            resource_id: request.resource_id,
            requester_id: None,
            title: request.title,
            description: request.description,
            start_time: request.start_time,
            end_time: request.end_time,
            attendees: request.attendees,
            additional_resources: request
                .additional_resources
                .into_iter()
                .map(AdditionalResource::from)
                .collect(),
            is_private: request.is_private,
            guest_name: Some(request.guest_name),
            guest_email: request.guest_email,
            guest_phone: request.guest_phone,
            auto_approve: request.auto_approve,
        })
        .await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{booking_id}",
    tag = "Bookings",
    params(("booking_id" = Uuid, Path, description = "Booking ID")),
    request_body = UpdateBookingRequest,
    responses(
        (status = 200, description = "Booking updated", body = ApiResponse<BookingDto>),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking locked or slot unavailable")
    )
)]
pub async fn update_booking(
    State(state): State<ApiState>,
    _actor: Actor,
    Path(booking_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateBookingRequest>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    let booking = state
        .bookings
        .update(
            booking_id,
            BookingPatch {
                title: request.title,
                description: request.description,
                start_time: request.start_time,
                end_time: request.end_time,
                attendees: request.attendees,
                is_private: request.is_private,
                additional_resources: request
                    .additional_resources
                    .map(|extras| extras.into_iter().map(AdditionalResource::from).collect()),
            },
        )
        .await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{booking_id}/approve",
    tag = "Bookings",
    params(("booking_id" = Uuid, Path, description = "Booking ID")),
    request_body = ApproveBookingRequest,
    responses(
        (status = 200, description = "Booking approved", body = ApiResponse<BookingDto>),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Invalid transition or slot unavailable")
    )
)]
pub async fn approve_booking(
    State(state): State<ApiState>,
    _actor: Actor,
    Path(booking_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<ApproveBookingRequest>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    let booking = state.bookings.approve(booking_id, request.note).await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{booking_id}/reject",
    tag = "Bookings",
    params(("booking_id" = Uuid, Path, description = "Booking ID")),
    request_body = RejectBookingRequest,
    responses(
        (status = 200, description = "Booking rejected", body = ApiResponse<BookingDto>),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Invalid transition")
    )
)]
pub async fn reject_booking(
    State(state): State<ApiState>,
    _actor: Actor,
    Path(booking_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<RejectBookingRequest>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    let reason = RejectionReason::parse(&request.reason).ok_or(DomainError::Validation(format!(
        "unknown rejection reason '{}'",
        request.reason
    )))?;
    let booking = state
        .bookings
        .reject(booking_id, reason, request.note)
        .await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{booking_id}/cancel",
    tag = "Bookings",
    params(("booking_id" = Uuid, Path, description = "Booking ID")),
    request_body = CancelBookingRequest,
    responses(
        (status = 200, description = "Booking cancelled", body = ApiResponse<BookingDto>),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Invalid transition")
    )
)]
pub async fn cancel_booking(
    State(state): State<ApiState>,
    _actor: Actor,
    Path(booking_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CancelBookingRequest>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    let booking = state.bookings.cancel(booking_id, request.reason).await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{booking_id}/payment",
    tag = "Bookings",
    params(("booking_id" = Uuid, Path, description = "Booking ID")),
    request_body = RecordPaymentRequest,
    responses(
        (status = 200, description = "Payment recorded", body = ApiResponse<BookingDto>),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Invalid transition"),
        (status = 422, description = "Amount mismatch")
    )
)]
pub async fn record_payment(
    State(state): State<ApiState>,
    _actor: Actor,
    Path(booking_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<RecordPaymentRequest>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    let method = PaymentMethod::parse(&request.method).ok_or(DomainError::Validation(format!(
        "unknown payment method '{}'",
        request.method
    )))?;
    let booking = state
        .bookings
        .record_payment(booking_id, request.amount, method, request.provider_reference)
        .await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{booking_id}",
    tag = "Bookings",
    params(("booking_id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking with payments", body = ApiResponse<BookingDetailDto>),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    State(state): State<ApiState>,
    _actor: Actor,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingDetailDto>>, ApiError> {
    let booking = state.bookings.get(booking_id).await?;
    let payments = state.repos.payments().find_by_booking(booking_id).await?;
    Ok(Json(ApiResponse::success(BookingDetailDto {
        booking: booking.into(),
        payments: payments.into_iter().map(Into::into).collect(),
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{booking_id}/quote",
    tag = "Bookings",
    params(("booking_id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Price breakdown", body = ApiResponse<QuoteDto>),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_quote(
    State(state): State<ApiState>,
    _actor: Actor,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<ApiResponse<QuoteDto>>, ApiError> {
    let quote = state.bookings.quote(booking_id).await?;
    Ok(Json(ApiResponse::success(quote.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "Bookings",
    params(ListBookingsParams),
    responses(
        (status = 200, description = "Bookings page", body = ApiResponse<PaginatedResponse<BookingDto>>)
    )
)]
pub async fn list_bookings(
    State(state): State<ApiState>,
    _actor: Actor,
    Query(params): Query<ListBookingsParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<BookingDto>>>, ApiError> {
    let status = match params.status.as_deref() {
        Some(s) => Some(BookingStatus::parse(s).ok_or(DomainError::Validation(format!(
            "unknown booking status '{}'",
            s
        )))?),
        None => None,
    };
    let result = state
        .bookings
        .list(
            BookingFilter {
                resource_id: params.resource_id,
                requester_id: params.requester_id,
                status,
            },
            PaginationParams::clamped(params.page, params.limit),
        )
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(
        result,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/availability",
    tag = "Bookings",
    params(AvailabilityParams),
    responses(
        (status = 200, description = "Availability result", body = ApiResponse<AvailabilityResponse>),
        (status = 422, description = "Invalid window")
    )
)]
pub async fn check_availability(
    State(state): State<ApiState>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<ApiResponse<AvailabilityResponse>>, ApiError> {
    let available = state
        .bookings
        .check_availability(params.resource_id, params.start, params.end)
        .await?;
    Ok(Json(ApiResponse::success(AvailabilityResponse { available })))
}

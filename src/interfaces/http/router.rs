//! API Router with Swagger UI

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::{bookings, health, resources, settings, users};
use super::ApiState;

/// OpenAPI documentation for the booking console API.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::handlers::health_check,
        bookings::handlers::create_booking,
        bookings::handlers::create_manual_booking,
        bookings::handlers::update_booking,
        bookings::handlers::approve_booking,
        bookings::handlers::reject_booking,
        bookings::handlers::cancel_booking,
        bookings::handlers::record_payment,
        bookings::handlers::get_booking,
        bookings::handlers::get_quote,
        bookings::handlers::list_bookings,
        bookings::handlers::check_availability,
        users::handlers::create_user,
        users::handlers::get_user,
        users::handlers::update_user,
        users::handlers::delete_user,
        users::handlers::list_users,
        resources::handlers::create_resource,
        resources::handlers::list_resources,
        resources::handlers::get_resource,
        resources::handlers::update_resource,
        settings::handlers::get_payment_settings,
        settings::handlers::update_payment_settings,
    ),
    components(schemas(
        bookings::dto::AdditionalResourceDto,
        bookings::dto::CreateBookingRequest,
        bookings::dto::CreateManualBookingRequest,
        bookings::dto::UpdateBookingRequest,
        bookings::dto::ApproveBookingRequest,
        bookings::dto::RejectBookingRequest,
        bookings::dto::CancelBookingRequest,
        bookings::dto::RecordPaymentRequest,
        bookings::dto::BookingDto,
        bookings::dto::BookingDetailDto,
        bookings::dto::PaymentDto,
        bookings::dto::AvailabilityResponse,
        bookings::dto::QuoteDto,
        users::dto::UserDto,
        users::dto::CreateUserRequest,
        users::dto::UpdateUserRequest,
        resources::dto::ResourceDto,
        resources::dto::CreateResourceRequest,
        resources::dto::UpdateResourceRequest,
        settings::dto::PaymentSettingsDto,
        settings::dto::UpdatePaymentSettingsRequest,
        health::handlers::HealthStatus,
    )),
    tags(
        (name = "Bookings", description = "Booking lifecycle and availability"),
        (name = "Users", description = "User management"),
        (name = "Resources", description = "Bookable resources"),
        (name = "Settings", description = "Payment configuration"),
        (name = "Health", description = "Service health")
    )
)]
struct ApiDoc;

/// Build the REST API router.
pub fn create_api_router(state: ApiState, prometheus_handle: PrometheusHandle) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(health::handlers::health_check))
        .route(
            "/bookings",
            post(bookings::handlers::create_booking).get(bookings::handlers::list_bookings),
        )
        .route(
            "/bookings/manual",
            post(bookings::handlers::create_manual_booking),
        )
        .route(
            "/bookings/{booking_id}",
            get(bookings::handlers::get_booking).patch(bookings::handlers::update_booking),
        )
        .route(
            "/bookings/{booking_id}/approve",
            post(bookings::handlers::approve_booking),
        )
        .route(
            "/bookings/{booking_id}/reject",
            post(bookings::handlers::reject_booking),
        )
        .route(
            "/bookings/{booking_id}/cancel",
            post(bookings::handlers::cancel_booking),
        )
        .route(
            "/bookings/{booking_id}/payment",
            post(bookings::handlers::record_payment),
        )
        .route(
            "/bookings/{booking_id}/quote",
            get(bookings::handlers::get_quote),
        )
        .route("/availability", get(bookings::handlers::check_availability))
        .route(
            "/users",
            post(users::handlers::create_user).get(users::handlers::list_users),
        )
        .route(
            "/users/{user_id}",
            get(users::handlers::get_user)
                .patch(users::handlers::update_user)
                .delete(users::handlers::delete_user),
        )
        .route(
            "/resources",
            post(resources::handlers::create_resource).get(resources::handlers::list_resources),
        )
        .route(
            "/resources/{resource_id}",
            get(resources::handlers::get_resource).patch(resources::handlers::update_resource),
        )
        .route(
            "/settings/payments",
            get(settings::handlers::get_payment_settings)
                .put(settings::handlers::update_payment_settings),
        )
        .with_state(state);

    let metrics_router = Router::new()
        .route("/metrics", get(prometheus_metrics))
        .with_state(MetricsState {
            handle: prometheus_handle,
        });

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/v1", api)
        .merge(metrics_router)
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

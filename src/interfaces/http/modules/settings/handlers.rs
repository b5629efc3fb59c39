//! Payment settings HTTP handlers

use axum::extract::State;
use axum::Json;

use crate::application::services::SettingsPatch;
use crate::interfaces::http::common::{Actor, ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::ApiState;

use super::dto::*;

#[utoipa::path(
    get,
    path = "/api/v1/settings/payments",
    tag = "Settings",
    responses(
        (status = 200, description = "Payment settings", body = ApiResponse<PaymentSettingsDto>)
    )
)]
pub async fn get_payment_settings(
    State(state): State<ApiState>,
    _actor: Actor,
) -> Result<Json<ApiResponse<PaymentSettingsDto>>, ApiError> {
    let settings = state.settings.get().await?;
    Ok(Json(ApiResponse::success(settings.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/settings/payments",
    tag = "Settings",
    request_body = UpdatePaymentSettingsRequest,
    responses(
        (status = 200, description = "Settings updated", body = ApiResponse<PaymentSettingsDto>),
        (status = 422, description = "Invalid request")
    )
)]
pub async fn update_payment_settings(
    State(state): State<ApiState>,
    _actor: Actor,
    ValidatedJson(request): ValidatedJson<UpdatePaymentSettingsRequest>,
) -> Result<Json<ApiResponse<PaymentSettingsDto>>, ApiError> {
    let settings = state
        .settings
        .update(SettingsPatch {
            bank_name: request.bank_name,
            account_holder: request.account_holder,
            iban: request.iban,
            bank_transfer_enabled: request.bank_transfer_enabled,
            stripe_enabled: request.stripe_enabled,
            payment_deadline_days: request.payment_deadline_days,
            currency: request.currency,
            tax_rate: request.tax_rate,
            invoice_prefix: request.invoice_prefix,
            reminders_enabled: request.reminders_enabled,
            reminder_days_before: request.reminder_days_before,
        })
        .await?;
    Ok(Json(ApiResponse::success(settings.into())))
}

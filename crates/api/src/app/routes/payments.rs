use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use vidaplena_auth::Permission;
use vidaplena_storefront::{ConfigurePayments, PaymentSettings, PaymentSettingsId, PaymentsCommand};

use crate::app::routes::common::CmdAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", get(get_payments).put(set_payments))
}

/// Full channel configuration (including disabled channels); the public
/// landing document only carries the enabled identifiers.
pub async fn get_payments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    let channels = services.payment_channels(tenant.tenant_id());
    (StatusCode::OK, Json(channels)).into_response()
}

pub async fn set_payments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<dto::ConfigurePaymentsRequest>,
) -> axum::response::Response {
    let settings_id = PaymentSettingsId::for_tenant(tenant.tenant_id());

    let cmd = PaymentsCommand::ConfigurePayments(ConfigurePayments {
        tenant_id: tenant.tenant_id(),
        settings_id,
        channels: body.channels,
        occurred_at: Utc::now(),
    });

    let cmd_auth = CmdAuth {
        inner: cmd,
        required: vec![Permission::new("payments.write")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let committed = match services.dispatch::<PaymentSettings>(
        tenant.tenant_id(),
        settings_id.0,
        "storefront.payments",
        cmd_auth.inner,
        |_t, aggregate_id| PaymentSettings::empty(PaymentSettingsId::new(aggregate_id)),
    ) {
        Ok(c) => c,
        Err(e) => return errors::dispatch_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "id": settings_id.to_string(),
            "events_committed": committed.len(),
        })),
    )
        .into_response()
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use chrono::Utc;

use vidaplena_auth::Permission;
use vidaplena_storefront::{
    LandingCommand, LandingConfig, LandingConfigId, SetContactForm, SetHeader,
};

use crate::app::routes::common::CmdAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/header", get(get_header).put(set_header))
        .route("/form", put(set_form))
}

pub async fn get_header(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    let doc = services.landing_document(tenant.tenant_id());
    (StatusCode::OK, Json(doc.header)).into_response()
}

pub async fn set_header(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<dto::SetHeaderRequest>,
) -> axum::response::Response {
    let landing_id = LandingConfigId::for_tenant(tenant.tenant_id());

    let cmd = LandingCommand::SetHeader(SetHeader {
        tenant_id: tenant.tenant_id(),
        landing_id,
        header: body.header,
        occurred_at: Utc::now(),
    });

    dispatch_landing(&services, &tenant, &principal, cmd).await
}

pub async fn set_form(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<dto::SetContactFormRequest>,
) -> axum::response::Response {
    let landing_id = LandingConfigId::for_tenant(tenant.tenant_id());

    let cmd = LandingCommand::SetContactForm(SetContactForm {
        tenant_id: tenant.tenant_id(),
        landing_id,
        schema: body.schema,
        occurred_at: Utc::now(),
    });

    dispatch_landing(&services, &tenant, &principal, cmd).await
}

async fn dispatch_landing(
    services: &AppServices,
    tenant: &crate::context::TenantContext,
    principal: &crate::context::PrincipalContext,
    cmd: LandingCommand,
) -> axum::response::Response {
    let landing_id = LandingConfigId::for_tenant(tenant.tenant_id());

    let cmd_auth = CmdAuth {
        inner: cmd,
        required: vec![Permission::new("landing.write")],
    };
    if let Err(e) = crate::authz::authorize_command(tenant, principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let committed = match services.dispatch::<LandingConfig>(
        tenant.tenant_id(),
        landing_id.0,
        "storefront.landing",
        cmd_auth.inner,
        |_t, aggregate_id| LandingConfig::empty(LandingConfigId::new(aggregate_id)),
    ) {
        Ok(c) => c,
        Err(e) => return errors::dispatch_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "id": landing_id.to_string(),
            "events_committed": committed.len(),
        })),
    )
        .into_response()
}

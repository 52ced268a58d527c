//! Platform administration surface.
//!
//! Every admin stream lives under the reserved platform tenant, regardless
//! of the tenant in the caller's token; access is gated on `admin.*`
//! permissions instead.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::Utc;

use vidaplena_auth::Permission;
use vidaplena_core::{AggregateId, TenantId, UserId};
use vidaplena_directory::{
    Business, BusinessCommand, ChangeUserRole, DeleteUser, GlobalConfig, GlobalConfigCommand,
    PlatformUser, ReactivateBusiness, RegisterBusiness, RegisterUser, SetMaintenanceMode,
    SetModule, SetSetting, SuspendBusiness, UserCommand,
};

use crate::app::routes::common::CmdAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/businesses", post(register_business).get(list_businesses))
        .route("/businesses/:id/suspend", post(suspend_business))
        .route("/businesses/:id/reactivate", post(reactivate_business))
        .route("/businesses/:id/modules", post(set_module))
        .route("/users", post(register_user).get(list_users))
        .route("/users/:id/role", post(change_user_role))
        .route("/users/:id", delete(delete_user))
        .route("/config", get(get_config).put(set_setting))
        .route("/config/maintenance", put(set_maintenance_mode))
}

fn guard(
    tenant: &crate::context::TenantContext,
    principal: &crate::context::PrincipalContext,
    permission: &'static str,
) -> Result<(), axum::response::Response> {
    let cmd_auth = CmdAuth {
        inner: (),
        required: vec![Permission::new(permission)],
    };
    crate::authz::authorize_command(tenant, principal, &cmd_auth)
        .map_err(|e| errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()))
}

fn parse_business(raw: &str) -> Result<TenantId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid business id")
    })
}

fn parse_user(raw: &str) -> Result<UserId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"))
}

fn dispatch_business(
    services: &AppServices,
    business_id: TenantId,
    cmd: BusinessCommand,
) -> axum::response::Response {
    let agg = AggregateId::from_uuid(*business_id.as_uuid());

    let committed = match services.dispatch::<Business>(
        TenantId::platform(),
        agg,
        "directory.business",
        cmd,
        |_t, aggregate_id| Business::empty(TenantId::from_uuid(*aggregate_id.as_uuid())),
    ) {
        Ok(c) => c,
        Err(e) => return errors::dispatch_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "id": business_id.to_string(),
            "events_committed": committed.len(),
        })),
    )
        .into_response()
}

fn dispatch_user(
    services: &AppServices,
    user_id: UserId,
    cmd: UserCommand,
) -> axum::response::Response {
    let agg = AggregateId::from_uuid(*user_id.as_uuid());

    let committed = match services.dispatch::<PlatformUser>(
        TenantId::platform(),
        agg,
        "directory.user",
        cmd,
        |_t, aggregate_id| PlatformUser::empty(UserId::from_uuid(*aggregate_id.as_uuid())),
    ) {
        Ok(c) => c,
        Err(e) => return errors::dispatch_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "id": user_id.to_string(),
            "events_committed": committed.len(),
        })),
    )
        .into_response()
}

// -------------------------
// Businesses
// -------------------------

pub async fn register_business(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<dto::RegisterBusinessRequest>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal, "admin.businesses") {
        return resp;
    }

    let business_id = TenantId::new();
    let cmd = BusinessCommand::RegisterBusiness(RegisterBusiness {
        business_id,
        name: body.name,
        slug: body.slug,
        occurred_at: Utc::now(),
    });

    let response = dispatch_business(&services, business_id, cmd);
    if response.status() == StatusCode::OK {
        return (
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": business_id.to_string() })),
        )
            .into_response();
    }
    response
}

pub async fn list_businesses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal, "admin.businesses") {
        return resp;
    }

    let items = services.businesses_list();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn suspend_business(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal, "admin.businesses") {
        return resp;
    }
    let business_id = match parse_business(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = BusinessCommand::SuspendBusiness(SuspendBusiness {
        business_id,
        occurred_at: Utc::now(),
    });
    dispatch_business(&services, business_id, cmd)
}

pub async fn reactivate_business(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal, "admin.businesses") {
        return resp;
    }
    let business_id = match parse_business(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = BusinessCommand::ReactivateBusiness(ReactivateBusiness {
        business_id,
        occurred_at: Utc::now(),
    });
    dispatch_business(&services, business_id, cmd)
}

pub async fn set_module(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetModuleRequest>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal, "admin.businesses") {
        return resp;
    }
    let business_id = match parse_business(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = BusinessCommand::SetModule(SetModule {
        business_id,
        module: body.module,
        enabled: body.enabled,
        occurred_at: Utc::now(),
    });
    dispatch_business(&services, business_id, cmd)
}

// -------------------------
// Users
// -------------------------

pub async fn register_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<dto::RegisterUserRequest>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal, "admin.users") {
        return resp;
    }

    let user_id = UserId::new();
    let cmd = UserCommand::RegisterUser(RegisterUser {
        user_id,
        email: body.email,
        display_name: body.display_name,
        role: body.role,
        occurred_at: Utc::now(),
    });

    let response = dispatch_user(&services, user_id, cmd);
    if response.status() == StatusCode::OK {
        return (
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": user_id.to_string() })),
        )
            .into_response();
    }
    response
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal, "admin.users") {
        return resp;
    }

    let items = services.users_list();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn change_user_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ChangeUserRoleRequest>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal, "admin.users") {
        return resp;
    }
    let user_id = match parse_user(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = UserCommand::ChangeUserRole(ChangeUserRole {
        user_id,
        role: body.role,
        occurred_at: Utc::now(),
    });
    dispatch_user(&services, user_id, cmd)
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal, "admin.users") {
        return resp;
    }
    let user_id = match parse_user(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = UserCommand::DeleteUser(DeleteUser {
        user_id,
        occurred_at: Utc::now(),
    });
    dispatch_user(&services, user_id, cmd)
}

// -------------------------
// Global config
// -------------------------

pub async fn get_config(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal, "admin.config") {
        return resp;
    }

    let config = match services.global_config() {
        Ok(c) => c,
        Err(e) => return errors::dispatch_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "settings": config.settings(),
            "maintenance_mode": config.maintenance_mode(),
        })),
    )
        .into_response()
}

pub async fn set_setting(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<dto::SetSettingRequest>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal, "admin.config") {
        return resp;
    }

    let cmd = GlobalConfigCommand::SetSetting(SetSetting {
        key: body.key,
        value: body.value,
        occurred_at: Utc::now(),
    });
    dispatch_config(&services, cmd)
}

pub async fn set_maintenance_mode(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<dto::SetMaintenanceModeRequest>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal, "admin.config") {
        return resp;
    }

    let cmd = GlobalConfigCommand::SetMaintenanceMode(SetMaintenanceMode {
        enabled: body.enabled,
        occurred_at: Utc::now(),
    });
    dispatch_config(&services, cmd)
}

fn dispatch_config(services: &AppServices, cmd: GlobalConfigCommand) -> axum::response::Response {
    let committed = match services.dispatch::<GlobalConfig>(
        TenantId::platform(),
        GlobalConfig::singleton_id(),
        "directory.config",
        cmd,
        |_t, _aggregate_id| GlobalConfig::empty(),
    ) {
        Ok(c) => c,
        Err(e) => return errors::dispatch_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({ "events_committed": committed.len() })),
    )
        .into_response()
}

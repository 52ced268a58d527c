use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use vidaplena_auth::Permission;
use vidaplena_core::AggregateId;
use vidaplena_messages::{ContactCommand, ContactThread, ContactThreadId, MarkThreadRead};

use crate::app::routes::common::CmdAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_inbox))
        .route("/:id/read", post(mark_read))
}

pub async fn list_inbox(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
) -> axum::response::Response {
    // Reads carry a permission too: the inbox holds customer PII.
    let guard = CmdAuth {
        inner: (),
        required: vec![Permission::new("inbox.read")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &guard) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let items = services
        .inbox_list(tenant.tenant_id())
        .into_iter()
        .map(dto::inbox_entry_to_json)
        .collect::<Vec<_>>();
    let unread = services.inbox_unread_count(tenant.tenant_id());

    (
        StatusCode::OK,
        Json(serde_json::json!({ "items": items, "unread": unread })),
    )
        .into_response()
}

pub async fn mark_read(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let agg: AggregateId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid thread id"),
    };
    let thread_id = ContactThreadId::new(agg);

    let cmd = ContactCommand::MarkThreadRead(MarkThreadRead {
        tenant_id: tenant.tenant_id(),
        thread_id,
        occurred_at: Utc::now(),
    });

    let cmd_auth = CmdAuth {
        inner: cmd,
        required: vec![Permission::new("inbox.read")],
    };
    if let Err(e) = crate::authz::authorize_command(&tenant, &principal, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let committed = match services.dispatch::<ContactThread>(
        tenant.tenant_id(),
        agg,
        "messages.contact",
        cmd_auth.inner,
        |_t, aggregate_id| ContactThread::empty(ContactThreadId::new(aggregate_id)),
    ) {
        Ok(c) => c,
        Err(e) => return errors::dispatch_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "id": agg.to_string(),
            "events_committed": committed.len(),
        })),
    )
        .into_response()
}

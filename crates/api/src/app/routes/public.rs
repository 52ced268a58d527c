//! Unauthenticated storefront surface: projected documents plus the three
//! public intake operations (rate, order, contact).

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use vidaplena_catalog::{Product, ProductCommand, ProductId, RateProduct};
use vidaplena_core::{AggregateId, TenantId};
use vidaplena_messages::{ContactCommand, ContactThread, ContactThreadId, SubmitContact};
use vidaplena_orders::{Order, OrderCommand, OrderId, PlaceOrder, ProductSnapshot};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/catalog/:business_id", get(get_catalog))
        .route("/catalog/:business_id/products/:id/rate", post(rate_product))
        .route("/catalog/:business_id/orders", post(place_order))
        .route("/landing/:business_id", get(get_landing))
        .route("/landing/:business_id/contact", post(submit_contact))
}

fn parse_business_id(raw: &str) -> Result<TenantId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid business id")
    })
}

pub async fn get_catalog(
    Extension(services): Extension<Arc<AppServices>>,
    Path(business_id): Path<String>,
) -> axum::response::Response {
    let tenant = match parse_business_id(&business_id) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    match services.catalog_document(tenant) {
        Some(doc) => (StatusCode::OK, Json(doc)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "catalog not found"),
    }
}

pub async fn get_landing(
    Extension(services): Extension<Arc<AppServices>>,
    Path(business_id): Path<String>,
) -> axum::response::Response {
    let tenant = match parse_business_id(&business_id) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    // Tenants that never configured anything get the default document.
    (StatusCode::OK, Json(services.landing_document(tenant))).into_response()
}

pub async fn rate_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path((business_id, id)): Path<(String, String)>,
    Json(body): Json<dto::RateProductRequest>,
) -> axum::response::Response {
    let tenant = match parse_business_id(&business_id) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let agg: AggregateId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };
    let product_id = ProductId::new(agg);

    let cmd = ProductCommand::RateProduct(RateProduct {
        tenant_id: tenant,
        product_id,
        rating: body.rating,
        rater: body.rater,
        occurred_at: Utc::now(),
    });

    let committed = match services.dispatch::<Product>(
        tenant,
        agg,
        "catalog.product",
        cmd,
        |_t, aggregate_id| Product::empty(ProductId::new(aggregate_id)),
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

pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(business_id): Path<String>,
    Json(body): Json<dto::PlaceOrderRequest>,
) -> axum::response::Response {
    let tenant = match parse_business_id(&business_id) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let product_agg: AggregateId = match body.product_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };
    let product_id = ProductId::new(product_agg);

    // Snapshot name and unit price from the public catalog at intake time;
    // the order freezes them from here on.
    let Some(doc) = services.catalog_document(tenant) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "catalog not found");
    };
    let Some(listed) = doc.products.iter().find(|p| p.product_id == product_id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found");
    };

    let agg = AggregateId::new();
    let order_id = OrderId::new(agg);

    let cmd = OrderCommand::PlaceOrder(PlaceOrder {
        tenant_id: tenant,
        order_id,
        customer: body.customer,
        product: ProductSnapshot {
            product_id: product_agg,
            name: listed.name.clone(),
            unit_price: listed.price,
        },
        quantity: body.quantity,
        payment_channel: body.payment_channel,
        occurred_at: Utc::now(),
    });

    let committed = match services.dispatch::<Order>(tenant, agg, "orders.order", cmd, |_t, id| {
        Order::empty(OrderId::new(id))
    }) {
        Ok(c) => c,
        Err(e) => return errors::dispatch_error_to_response(e),
    };

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": agg.to_string(),
            "events_committed": committed.len(),
        })),
    )
        .into_response()
}

pub async fn submit_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Path(business_id): Path<String>,
    Json(body): Json<dto::ContactSubmissionRequest>,
) -> axum::response::Response {
    let tenant = match parse_business_id(&business_id) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    // Validate against the tenant's configured schema before anything is
    // dispatched; a rejected submission leaves no trace.
    let schema = services.landing_document(tenant).form;
    if let Err(e) = schema.validate(&body.values) {
        return errors::form_validation_to_response(e);
    }

    let agg = AggregateId::new();
    let thread_id = ContactThreadId::new(agg);

    let cmd = ContactCommand::SubmitContact(SubmitContact {
        tenant_id: tenant,
        thread_id,
        values: body.values,
        occurred_at: Utc::now(),
    });

    let committed =
        match services.dispatch::<ContactThread>(tenant, agg, "messages.contact", cmd, |_t, id| {
            ContactThread::empty(ContactThreadId::new(id))
        }) {
            Ok(c) => c,
            Err(e) => return errors::dispatch_error_to_response(e),
        };

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": agg.to_string(),
            "events_committed": committed.len(),
        })),
    )
        .into_response()
}

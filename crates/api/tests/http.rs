//! End-to-end HTTP tests over the in-memory wiring.
//!
//! Projections are fed by a background subscriber, so reads after a write
//! poll until the read model catches up.

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

use vidaplena_api::app::build_app;
use vidaplena_auth::{Hs256JwtValidator, JwtClaims, PrincipalId, Role};
use vidaplena_core::TenantId;

const SECRET: &[u8] = b"test-secret";

async fn app() -> Router {
    build_app("test-secret".to_string()).await
}

fn token(tenant: TenantId, role: &'static str) -> String {
    let now = Utc::now();
    Hs256JwtValidator::new(SECRET.to_vec())
        .issue(&JwtClaims {
            sub: PrincipalId::new(),
            tenant_id: tenant,
            roles: vec![Role::new(role)],
            issued_at: now - ChronoDuration::minutes(1),
            expires_at: now + ChronoDuration::hours(1),
        })
        .unwrap()
}

fn request(method: &str, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

/// Poll a GET endpoint until `pred` holds (the projections run behind a bus).
async fn get_until(
    app: &Router,
    uri: &str,
    bearer: Option<&str>,
    pred: impl Fn(&Value) -> bool,
) -> Value {
    for _ in 0..100 {
        let (status, body) = send(app, request("GET", uri, bearer, None)).await;
        if status == StatusCode::OK && pred(&body) {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("projection never converged for {uri}");
}

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let (status, _) = send(&app, request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn tenant_routes_require_a_token() {
    let app = app().await;
    let (status, _) = send(&app, request("GET", "/products", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        request("GET", "/products", Some("not-a-jwt"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ratings_flow_into_the_public_catalog() {
    let app = app().await;
    let tenant = TenantId::new();
    let owner = token(tenant, "owner");

    let (status, created) = send(
        &app,
        request(
            "POST",
            "/products",
            Some(&owner),
            Some(json!({
                "name": "Herbal Tea",
                "description": "Loose-leaf blend",
                "price": 1250,
                "stock": 40,
                "category": "beverages",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = created["id"].as_str().unwrap().to_string();

    let catalog_uri = format!("/public/catalog/{tenant}");
    get_until(&app, &catalog_uri, None, |doc| {
        doc["products"].as_array().is_some_and(|p| p.len() == 1)
    })
    .await;

    for rating in [4, 5] {
        let (status, _) = send(
            &app,
            request(
                "POST",
                &format!("/public/catalog/{tenant}/products/{product_id}/rate"),
                None,
                Some(json!({ "rating": rating })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let doc = get_until(&app, &catalog_uri, None, |doc| {
        doc["products"][0]["rating_count"].as_u64() == Some(2)
    })
    .await;
    assert_eq!(doc["products"][0]["average_rating"].as_f64(), Some(4.5));
}

#[tokio::test]
async fn out_of_range_rating_is_rejected() {
    let app = app().await;
    let tenant = TenantId::new();
    let owner = token(tenant, "owner");

    let (_, created) = send(
        &app,
        request(
            "POST",
            "/products",
            Some(&owner),
            Some(json!({
                "name": "Candle",
                "price": 900,
                "stock": 5,
                "category": "home",
            })),
        ),
    )
    .await;
    let product_id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        request(
            "POST",
            &format!("/public/catalog/{tenant}/products/{product_id}/rate"),
            None,
            Some(json!({ "rating": 6 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn order_intake_snapshots_the_listed_price() {
    let app = app().await;
    let tenant = TenantId::new();
    let owner = token(tenant, "owner");

    let (_, created) = send(
        &app,
        request(
            "POST",
            "/products",
            Some(&owner),
            Some(json!({
                "name": "Herbal Tea",
                "price": 1250,
                "stock": 40,
                "category": "beverages",
            })),
        ),
    )
    .await;
    let product_id = created["id"].as_str().unwrap().to_string();

    get_until(&app, &format!("/public/catalog/{tenant}"), None, |doc| {
        doc["products"].as_array().is_some_and(|p| !p.is_empty())
    })
    .await;

    let (status, placed) = send(
        &app,
        request(
            "POST",
            &format!("/public/catalog/{tenant}/orders"),
            None,
            Some(json!({
                "customer": {
                    "name": "Ana Pérez",
                    "email": "ana@example.com",
                    "phone": "999111222",
                    "address": "Av. Siempre Viva 123",
                },
                "product_id": product_id,
                "quantity": 3,
                "payment_channel": "bank_transfer",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = placed["id"].as_str().unwrap().to_string();

    let orders = get_until(&app, "/orders", Some(&owner), |body| {
        body["items"].as_array().is_some_and(|o| o.len() == 1)
    })
    .await;
    assert_eq!(orders["items"][0]["subtotal"].as_u64(), Some(3750));
    assert_eq!(orders["items"][0]["status"], "Pendiente");

    let (status, _) = send(
        &app,
        request(
            "POST",
            &format!("/orders/{order_id}/status"),
            Some(&owner),
            Some(json!({ "status": "Enviado" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    get_until(&app, &format!("/orders/{order_id}"), Some(&owner), |body| {
        body["status"] == "Enviado"
    })
    .await;
}

#[tokio::test]
async fn contact_form_is_validated_against_the_schema() {
    let app = app().await;
    let tenant = TenantId::new();
    let owner = token(tenant, "owner");

    // Default schema: Nombre, Email, Mensaje. Missing fields are rejected
    // and never reach the inbox.
    let (status, body) = send(
        &app,
        request(
            "POST",
            &format!("/public/landing/{tenant}/contact"),
            None,
            Some(json!({ "values": { "Nombre": "Ana" } })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "form_validation");
    assert!(body["fields"].as_array().is_some_and(|f| !f.is_empty()));

    let (status, _) = send(
        &app,
        request(
            "POST",
            &format!("/public/landing/{tenant}/contact"),
            None,
            Some(json!({
                "values": {
                    "Nombre": "Ana",
                    "Email": "ana@example.com",
                    "Mensaje": "Quisiera más información.",
                }
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let inbox = get_until(&app, "/inbox", Some(&owner), |body| {
        body["items"].as_array().is_some_and(|i| i.len() == 1)
    })
    .await;
    assert_eq!(inbox["unread"].as_u64(), Some(1));
}

#[tokio::test]
async fn staff_cannot_configure_payments() {
    let app = app().await;
    let tenant = TenantId::new();
    let staff = token(tenant, "staff");

    let (status, body) = send(
        &app,
        request(
            "PUT",
            "/payments",
            Some(&staff),
            Some(json!({
                "channels": {
                    "bank_transfer": {
                        "enabled": true,
                        "bank_name": "BCP",
                        "account_holder": "EcoSalud SAC",
                        "account_number": "123-456789",
                    },
                    "mobile_wallet": { "enabled": false, "provider": "", "phone_number": "" },
                    "cash_on_delivery": { "enabled": false, "instructions": "" },
                }
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn payments_round_trip_and_show_up_on_the_landing() {
    let app = app().await;
    let tenant = TenantId::new();
    let owner = token(tenant, "owner");

    let (status, _) = send(
        &app,
        request(
            "PUT",
            "/payments",
            Some(&owner),
            Some(json!({
                "channels": {
                    "bank_transfer": {
                        "enabled": true,
                        "bank_name": "BCP",
                        "account_holder": "EcoSalud SAC",
                        "account_number": "123-456789",
                    },
                    "mobile_wallet": { "enabled": false, "provider": "", "phone_number": "" },
                    "cash_on_delivery": { "enabled": false, "instructions": "" },
                }
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Tenant view keeps the full configuration.
    let channels = get_until(&app, "/payments", Some(&owner), |body| {
        body["bank_transfer"]["enabled"] == true
    })
    .await;
    assert_eq!(channels["bank_transfer"]["bank_name"], "BCP");

    // Public landing only lists the enabled identifiers.
    let landing = get_until(&app, &format!("/public/landing/{tenant}"), None, |body| {
        body["payment_channels"].as_array().is_some_and(|c| !c.is_empty())
    })
    .await;
    assert_eq!(landing["payment_channels"], json!(["bank_transfer"]));
}

#[tokio::test]
async fn admin_manages_the_business_directory() {
    let app = app().await;
    let admin = token(TenantId::platform(), "admin");

    let (status, created) = send(
        &app,
        request(
            "POST",
            "/admin/businesses",
            Some(&admin),
            Some(json!({ "name": "EcoSalud", "slug": "ecosalud" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let business_id = created["id"].as_str().unwrap().to_string();

    let listed = get_until(&app, "/admin/businesses", Some(&admin), |body| {
        body["items"].as_array().is_some_and(|b| b.len() == 1)
    })
    .await;
    assert_eq!(listed["items"][0]["slug"], "ecosalud");
    assert_eq!(listed["items"][0]["suspended"], false);

    let (status, _) = send(
        &app,
        request(
            "POST",
            &format!("/admin/businesses/{business_id}/suspend"),
            Some(&admin),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    get_until(&app, "/admin/businesses", Some(&admin), |body| {
        body["items"][0]["suspended"] == true
    })
    .await;

    // An owner token is not enough for the admin surface.
    let owner = token(TenantId::new(), "owner");
    let (status, _) = send(&app, request("GET", "/admin/businesses", Some(&owner), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_config_round_trips() {
    let app = app().await;
    let admin = token(TenantId::platform(), "admin");

    let (status, _) = send(
        &app,
        request(
            "PUT",
            "/admin/config",
            Some(&admin),
            Some(json!({ "key": "support_email", "value": "soporte@vidaplena.pe" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        request(
            "PUT",
            "/admin/config/maintenance",
            Some(&admin),
            Some(json!({ "enabled": true })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Config reads rehydrate from the store directly, no projection lag.
    let (status, config) = send(&app, request("GET", "/admin/config", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(config["settings"]["support_email"], "soporte@vidaplena.pe");
    assert_eq!(config["maintenance_mode"], true);
}

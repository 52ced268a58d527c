use std::collections::BTreeMap;

use serde::Deserialize;

use vidaplena_infra::projections::{InboxEntry, OrderReadModel};
use vidaplena_messages::FormSchema;
use vidaplena_orders::{CustomerInfo, OrderStatus};
use vidaplena_storefront::{HeaderConfig, PaymentChannels};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: u64,
    pub stock: i64,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SetStockRequest {
    pub stock: i64,
}

#[derive(Debug, Deserialize)]
pub struct RateProductRequest {
    pub rating: u8,
    /// Opaque rater key (device or session); repeat votes under the same key
    /// are rejected.
    pub rater: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer: CustomerInfo,
    pub product_id: String,
    pub quantity: u32,
    pub payment_channel: String,
}

#[derive(Debug, Deserialize)]
pub struct SetOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct ContactSubmissionRequest {
    pub values: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct SetHeaderRequest {
    pub header: HeaderConfig,
}

#[derive(Debug, Deserialize)]
pub struct SetContactFormRequest {
    pub schema: FormSchema,
}

#[derive(Debug, Deserialize)]
pub struct ConfigurePaymentsRequest {
    pub channels: PaymentChannels,
}

#[derive(Debug, Deserialize)]
pub struct RegisterBusinessRequest {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub struct SetModuleRequest {
    pub module: String,
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub display_name: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeUserRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct SetSettingRequest {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct SetMaintenanceModeRequest {
    pub enabled: bool,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn order_to_json(rm: OrderReadModel) -> serde_json::Value {
    serde_json::json!({
        "id": rm.order_id.0.to_string(),
        "customer": rm.customer,
        "product": {
            "product_id": rm.product.product_id.to_string(),
            "name": rm.product.name,
            "unit_price": rm.product.unit_price,
        },
        "quantity": rm.quantity,
        "subtotal": rm.subtotal,
        "payment_channel": rm.payment_channel,
        "status": rm.status,
        "placed_at": rm.placed_at,
    })
}

pub fn inbox_entry_to_json(entry: InboxEntry) -> serde_json::Value {
    serde_json::json!({
        "id": entry.thread_id.0.to_string(),
        "values": entry.values,
        "read": entry.read,
        "submitted_at": entry.submitted_at,
    })
}

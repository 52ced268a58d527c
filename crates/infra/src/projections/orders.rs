//! Orders read model (tenant back office list/detail).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use vidaplena_core::TenantId;
use vidaplena_events::EventEnvelope;
use vidaplena_orders::{CustomerInfo, OrderEvent, OrderId, OrderStatus, ProductSnapshot};

use crate::projections::{ProjectionError, SequenceCursors};
use crate::read_model::TenantStore;

pub const ORDER_AGGREGATE: &str = "orders.order";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReadModel {
    pub order_id: OrderId,
    pub customer: CustomerInfo,
    pub product: ProductSnapshot,
    pub quantity: u32,
    pub subtotal: u64,
    pub payment_channel: String,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct OrdersProjection<S>
where
    S: TenantStore<OrderId, OrderReadModel>,
{
    store: S,
    cursors: SequenceCursors,
}

impl<S> OrdersProjection<S>
where
    S: TenantStore<OrderId, OrderReadModel>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            cursors: SequenceCursors::new(),
        }
    }

    pub fn get(&self, tenant_id: TenantId, order_id: &OrderId) -> Option<OrderReadModel> {
        self.store.get(tenant_id, order_id)
    }

    /// All orders for a tenant, newest first.
    pub fn list(&self, tenant_id: TenantId) -> Vec<OrderReadModel> {
        let mut orders = self.store.list(tenant_id);
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        orders
    }

    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<JsonValue>,
    ) -> Result<(), ProjectionError> {
        if envelope.aggregate_type() != ORDER_AGGREGATE {
            return Ok(());
        }

        let tenant_id = envelope.tenant_id();
        let aggregate_id = envelope.aggregate_id();
        let seq = envelope.sequence_number();

        if !self.cursors.check(tenant_id, aggregate_id, seq)? {
            return Ok(());
        }

        let ev: OrderEvent = serde_json::from_value(envelope.payload().clone())
            .map_err(|e| ProjectionError::Deserialize(e.to_string()))?;

        let (event_tenant, order_id) = match &ev {
            OrderEvent::OrderPlaced(e) => (e.tenant_id, e.order_id),
            OrderEvent::OrderStatusChanged(e) => (e.tenant_id, e.order_id),
        };
        if event_tenant != tenant_id {
            return Err(ProjectionError::TenantIsolation(
                "event tenant_id does not match envelope tenant_id".to_string(),
            ));
        }
        if order_id.0 != aggregate_id {
            return Err(ProjectionError::TenantIsolation(
                "event order_id does not match envelope aggregate_id".to_string(),
            ));
        }

        match ev {
            OrderEvent::OrderPlaced(e) => {
                self.store.upsert(
                    tenant_id,
                    e.order_id,
                    OrderReadModel {
                        order_id: e.order_id,
                        customer: e.customer,
                        product: e.product,
                        quantity: e.quantity,
                        subtotal: e.subtotal,
                        payment_channel: e.payment_channel,
                        status: OrderStatus::Pending,
                        placed_at: e.occurred_at,
                    },
                );
            }
            OrderEvent::OrderStatusChanged(e) => {
                if let Some(mut rm) = self.store.get(tenant_id, &e.order_id) {
                    rm.status = e.status;
                    self.store.upsert(tenant_id, e.order_id, rm);
                }
            }
        }

        self.cursors.commit(tenant_id, aggregate_id, seq);
        Ok(())
    }
}

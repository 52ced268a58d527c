use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vidaplena_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId};
use vidaplena_events::Event;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub AggregateId);

impl OrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order lifecycle status.
///
/// Serialized with the storefront's customer-facing Spanish labels; those
/// labels are the wire format, not just display strings. Any status can be
/// set from any status; operators correct mistakes directly instead of
/// walking a transition graph.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "Pendiente")]
    Pending,
    #[serde(rename = "En proceso")]
    InProcess,
    #[serde(rename = "Enviado")]
    Shipped,
    #[serde(rename = "Entregado")]
    Delivered,
    #[serde(rename = "Cancelado")]
    Cancelled,
}

/// Customer contact details captured at intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Product data frozen into the order at placement time.
///
/// Later catalog edits (price changes, deletion) never touch placed orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product_id: AggregateId,
    pub name: String,
    /// Unit price in smallest currency unit at the moment of placement.
    pub unit_price: u64,
}

/// Aggregate root: Order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    tenant_id: Option<TenantId>,
    customer: Option<CustomerInfo>,
    product: Option<ProductSnapshot>,
    quantity: u32,
    subtotal: u64,
    payment_channel: String,
    status: OrderStatus,
    version: u64,
    placed: bool,
}

impl Order {
    pub fn empty(id: OrderId) -> Self {
        Self {
            id,
            tenant_id: None,
            customer: None,
            product: None,
            quantity: 0,
            subtotal: 0,
            payment_channel: String::new(),
            status: OrderStatus::Pending,
            version: 0,
            placed: false,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn customer(&self) -> Option<&CustomerInfo> {
        self.customer.as_ref()
    }

    pub fn product(&self) -> Option<&ProductSnapshot> {
        self.product.as_ref()
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn subtotal(&self) -> u64 {
        self.subtotal
    }

    pub fn payment_channel(&self) -> &str {
        &self.payment_channel
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: PlaceOrder (public storefront intake).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub tenant_id: TenantId,
    pub order_id: OrderId,
    pub customer: CustomerInfo,
    pub product: ProductSnapshot,
    pub quantity: u32,
    pub payment_channel: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetOrderStatus (tenant back office).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetOrderStatus {
    pub tenant_id: TenantId,
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderCommand {
    PlaceOrder(PlaceOrder),
    SetOrderStatus(SetOrderStatus),
}

/// Event: OrderPlaced. Carries the frozen subtotal, never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub tenant_id: TenantId,
    pub order_id: OrderId,
    pub customer: CustomerInfo,
    pub product: ProductSnapshot,
    pub quantity: u32,
    pub subtotal: u64,
    pub payment_channel: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderStatusChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    pub tenant_id: TenantId,
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderPlaced(OrderPlaced),
    OrderStatusChanged(OrderStatusChanged),
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "orders.order.placed",
            OrderEvent::OrderStatusChanged(_) => "orders.order.status_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderPlaced(e) => e.occurred_at,
            OrderEvent::OrderStatusChanged(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Order {
    type Command = OrderCommand;
    type Event = OrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::OrderPlaced(e) => {
                self.id = e.order_id;
                self.tenant_id = Some(e.tenant_id);
                self.customer = Some(e.customer.clone());
                self.product = Some(e.product.clone());
                self.quantity = e.quantity;
                self.subtotal = e.subtotal;
                self.payment_channel = e.payment_channel.clone();
                self.status = OrderStatus::Pending;
                self.placed = true;
            }
            OrderEvent::OrderStatusChanged(e) => {
                self.status = e.status;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::PlaceOrder(cmd) => self.handle_place(cmd),
            OrderCommand::SetOrderStatus(cmd) => self.handle_set_status(cmd),
        }
    }
}

impl Order {
    fn ensure_tenant(&self, tenant_id: TenantId) -> Result<(), DomainError> {
        if !self.placed {
            return Ok(());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        Ok(())
    }

    fn ensure_order_id(&self, order_id: OrderId) -> Result<(), DomainError> {
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        Ok(())
    }

    fn handle_place(&self, cmd: &PlaceOrder) -> Result<Vec<OrderEvent>, DomainError> {
        if self.placed {
            return Err(DomainError::conflict("order already placed"));
        }

        if cmd.customer.name.trim().is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }
        if cmd.product.name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if cmd.quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }

        let subtotal = cmd
            .product
            .unit_price
            .checked_mul(u64::from(cmd.quantity))
            .ok_or_else(|| DomainError::validation("subtotal overflows"))?;

        Ok(vec![OrderEvent::OrderPlaced(OrderPlaced {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            customer: cmd.customer.clone(),
            product: cmd.product.clone(),
            quantity: cmd.quantity,
            subtotal,
            payment_channel: cmd.payment_channel.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_status(&self, cmd: &SetOrderStatus) -> Result<Vec<OrderEvent>, DomainError> {
        if !self.placed {
            return Err(DomainError::not_found());
        }
        self.ensure_tenant(cmd.tenant_id)?;
        self.ensure_order_id(cmd.order_id)?;

        // Setting the same status again is a no-op.
        if cmd.status == self.status {
            return Ok(vec![]);
        }

        Ok(vec![OrderEvent::OrderStatusChanged(OrderStatusChanged {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            status: cmd.status,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_tenant_id() -> TenantId {
        TenantId::new()
    }

    fn test_order_id() -> OrderId {
        OrderId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "Ana Pérez".to_string(),
            email: "ana@example.com".to_string(),
            phone: "+51 999 111 222".to_string(),
            address: "Av. Siempre Viva 123".to_string(),
        }
    }

    fn snapshot(unit_price: u64) -> ProductSnapshot {
        ProductSnapshot {
            product_id: AggregateId::new(),
            name: "Herbal Tea".to_string(),
            unit_price,
        }
    }

    fn place_cmd(tenant_id: TenantId, order_id: OrderId, unit_price: u64, quantity: u32) -> PlaceOrder {
        PlaceOrder {
            tenant_id,
            order_id,
            customer: customer(),
            product: snapshot(unit_price),
            quantity,
            payment_channel: "bank_transfer".to_string(),
            occurred_at: test_time(),
        }
    }

    fn placed_order(tenant_id: TenantId, order_id: OrderId) -> Order {
        let mut order = Order::empty(order_id);
        let events = order
            .handle(&OrderCommand::PlaceOrder(place_cmd(tenant_id, order_id, 1250, 3)))
            .unwrap();
        order.apply(&events[0]);
        order
    }

    #[test]
    fn place_order_freezes_subtotal_and_starts_pending() {
        let tenant_id = test_tenant_id();
        let order_id = test_order_id();
        let order = placed_order(tenant_id, order_id);

        assert_eq!(order.subtotal(), 3750);
        assert_eq!(order.quantity(), 3);
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.tenant_id(), Some(tenant_id));
    }

    #[test]
    fn place_order_rejects_zero_quantity() {
        let order = Order::empty(test_order_id());
        let err = order
            .handle(&OrderCommand::PlaceOrder(place_cmd(
                test_tenant_id(),
                order.id_typed(),
                1250,
                0,
            )))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn place_order_rejects_empty_customer_name() {
        let order = Order::empty(test_order_id());
        let mut cmd = place_cmd(test_tenant_id(), order.id_typed(), 1250, 1);
        cmd.customer.name = "  ".to_string();

        let err = order.handle(&OrderCommand::PlaceOrder(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn place_order_rejects_subtotal_overflow() {
        let order = Order::empty(test_order_id());
        let err = order
            .handle(&OrderCommand::PlaceOrder(place_cmd(
                test_tenant_id(),
                order.id_typed(),
                u64::MAX,
                2,
            )))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn placing_twice_is_a_conflict() {
        let tenant_id = test_tenant_id();
        let order_id = test_order_id();
        let order = placed_order(tenant_id, order_id);

        let err = order
            .handle(&OrderCommand::PlaceOrder(place_cmd(tenant_id, order_id, 1250, 1)))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn any_status_can_follow_any_status() {
        let tenant_id = test_tenant_id();
        let order_id = test_order_id();
        let mut order = placed_order(tenant_id, order_id);

        for status in [
            OrderStatus::Delivered,
            OrderStatus::Pending,
            OrderStatus::Cancelled,
            OrderStatus::InProcess,
        ] {
            let events = order
                .handle(&OrderCommand::SetOrderStatus(SetOrderStatus {
                    tenant_id,
                    order_id,
                    status,
                    occurred_at: test_time(),
                }))
                .unwrap();
            order.apply(&events[0]);
            assert_eq!(order.status(), status);
        }
    }

    #[test]
    fn setting_current_status_is_a_no_op() {
        let tenant_id = test_tenant_id();
        let order_id = test_order_id();
        let order = placed_order(tenant_id, order_id);

        let events = order
            .handle(&OrderCommand::SetOrderStatus(SetOrderStatus {
                tenant_id,
                order_id,
                status: OrderStatus::Pending,
                occurred_at: test_time(),
            }))
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn status_change_on_missing_order_is_not_found() {
        let order = Order::empty(test_order_id());
        let err = order
            .handle(&OrderCommand::SetOrderStatus(SetOrderStatus {
                tenant_id: test_tenant_id(),
                order_id: order.id_typed(),
                status: OrderStatus::Shipped,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn status_change_from_wrong_tenant_is_rejected() {
        let order_id = test_order_id();
        let order = placed_order(test_tenant_id(), order_id);

        let err = order
            .handle(&OrderCommand::SetOrderStatus(SetOrderStatus {
                tenant_id: test_tenant_id(),
                order_id,
                status: OrderStatus::Shipped,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn snapshot_survives_status_changes() {
        let tenant_id = test_tenant_id();
        let order_id = test_order_id();
        let mut order = placed_order(tenant_id, order_id);
        let snapshot_before = order.product().unwrap().clone();

        let events = order
            .handle(&OrderCommand::SetOrderStatus(SetOrderStatus {
                tenant_id,
                order_id,
                status: OrderStatus::Delivered,
                occurred_at: test_time(),
            }))
            .unwrap();
        order.apply(&events[0]);

        assert_eq!(order.product(), Some(&snapshot_before));
        assert_eq!(order.subtotal(), 3750);
    }

    #[test]
    fn status_serializes_with_spanish_labels() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            "\"Pendiente\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::InProcess).unwrap(),
            "\"En proceso\""
        );
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"En proceso\"").unwrap(),
            OrderStatus::InProcess
        );
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"Cancelado\"").unwrap(),
            OrderStatus::Cancelled
        );
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the frozen subtotal is exactly unit price times
            /// quantity whenever the product does not overflow.
            #[test]
            fn subtotal_is_exact_product(unit_price in 0u64..10_000_000, quantity in 1u32..10_000) {
                let tenant_id = test_tenant_id();
                let order_id = test_order_id();
                let order = Order::empty(order_id);

                let events = order
                    .handle(&OrderCommand::PlaceOrder(place_cmd(
                        tenant_id, order_id, unit_price, quantity,
                    )))
                    .unwrap();

                match &events[0] {
                    OrderEvent::OrderPlaced(e) => {
                        prop_assert_eq!(e.subtotal, unit_price * u64::from(quantity));
                    }
                    _ => prop_assert!(false, "expected OrderPlaced"),
                }
            }

            /// Property: status round-trips through its wire labels.
            #[test]
            fn status_round_trips(idx in 0usize..5) {
                let all = [
                    OrderStatus::Pending,
                    OrderStatus::InProcess,
                    OrderStatus::Shipped,
                    OrderStatus::Delivered,
                    OrderStatus::Cancelled,
                ];
                let status = all[idx];
                let json = serde_json::to_string(&status).unwrap();
                prop_assert_eq!(serde_json::from_str::<OrderStatus>(&json).unwrap(), status);
            }
        }
    }
}

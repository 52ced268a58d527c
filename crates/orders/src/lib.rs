//! Order intake and status tracking.
//!
//! Owns the `Order` aggregate: placement with an immutable product snapshot
//! and a frozen subtotal, plus free-form status changes.

pub mod order;

pub use order::{
    CustomerInfo, Order, OrderCommand, OrderEvent, OrderId, OrderStatus, PlaceOrder,
    ProductSnapshot, SetOrderStatus,
};
